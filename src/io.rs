use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, WriterBuilder};

use crate::model::{Person, PersonAssignment, ScheduleHistory, ShiftDefinition};

/// Import de personnes depuis CSV: header `name,employee_id[,group]`
pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Person>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let employee_id = rec.get(1).context("missing employee_id")?.trim();
        if name.is_empty() || employee_id.is_empty() {
            bail!("invalid staff row (empty)");
        }
        let mut person = Person::new(name, employee_id);
        if let Some(group) = rec.get(2) {
            person.group = group.trim().to_owned();
        }
        out.push(person);
    }
    Ok(out)
}

/// Import de définitions de créneaux: header `name,start,end[,color]`
/// (heures `HH:MM` ou `HH:MM:SS`)
pub fn import_shift_definitions_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ShiftDefinition>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid shift row (empty name)");
        }
        let start = parse_time(rec.get(1).context("missing start")?.trim())?;
        let end = parse_time(rec.get(2).context("missing end")?.trim())?;
        let mut shift = ShiftDefinition::new(name, start, end);
        if let Some(color) = rec.get(3) {
            shift.color = color.trim().to_owned();
        }
        out.push(shift);
    }
    Ok(out)
}

fn parse_time(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .with_context(|| format!("invalid time of day: {raw}"))
}

/// Import d'historique pré-période: header `person,date,shift`
/// (dates ISO `yyyy-MM-dd`)
pub fn import_history_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<ScheduleHistory> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = ScheduleHistory::new();
    for rec in rdr.records() {
        let rec = rec?;
        let person = rec.get(0).context("missing person")?.trim();
        let date = rec.get(1).context("missing date")?.trim();
        let shift = rec.get(2).context("missing shift")?.trim();
        if person.is_empty() || shift.is_empty() {
            bail!("invalid history row (empty)");
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid date: {date}"))?;
        out.entry(person.to_owned())
            .or_default()
            .insert(date, shift.to_owned());
    }
    Ok(out)
}

/// Export JSON de la vue par date (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(
    path: P,
    schedule: &BTreeMap<NaiveDate, Vec<PersonAssignment>>,
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(schedule)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV de la vue par date: header `date,person,shift`
pub fn export_schedule_csv<P: AsRef<Path>>(
    path: P,
    schedule: &BTreeMap<NaiveDate, Vec<PersonAssignment>>,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "person", "shift"])?;
    for (date, assignments) in schedule {
        let date = date.format("%Y-%m-%d").to_string();
        for pa in assignments {
            w.write_record([date.as_str(), pa.person.as_str(), pa.shift.as_str()])?;
        }
    }
    w.flush()?;
    Ok(())
}
