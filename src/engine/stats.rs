use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::config::Rules;
use crate::model::Assignment;

/// Compteurs d'une personne : occurrences par nom de shift + crédit repos.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffStatistics {
    pub shift_counts: HashMap<String, f64>,
    pub rest_equivalent: f64,
}

/// Compteurs d'une date : occurrences par nom de shift (repos inclus).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyStatistics {
    pub shift_counts: HashMap<String, f64>,
}

/// Cache dérivé des affectations commises.
///
/// Le planning reste la source de vérité : le moteur enregistre chaque pose
/// et chaque retrait pour garder les compteurs alignés.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    staff: BTreeMap<String, StaffStatistics>,
    daily: BTreeMap<NaiveDate, DailyStatistics>,
}

impl Statistics {
    pub fn record(&mut self, person: &str, date: NaiveDate, assignment: &Assignment, rules: &Rules) {
        self.bump(person, date, assignment, rules, 1.0);
    }

    pub fn retract(
        &mut self,
        person: &str,
        date: NaiveDate,
        assignment: &Assignment,
        rules: &Rules,
    ) {
        self.bump(person, date, assignment, rules, -1.0);
    }

    fn bump(
        &mut self,
        person: &str,
        date: NaiveDate,
        assignment: &Assignment,
        rules: &Rules,
        sign: f64,
    ) {
        let key = match assignment {
            Assignment::Unresolved => return,
            Assignment::Rest => rules.rest_shift_name.as_str(),
            Assignment::Work(name) => name.as_str(),
        };

        let staff = self.staff.entry(person.to_owned()).or_default();
        *staff.shift_counts.entry(key.to_owned()).or_insert(0.0) += sign;
        match assignment {
            Assignment::Rest => staff.rest_equivalent += sign,
            Assignment::Work(name) if rules.is_half_day(name) => {
                staff.rest_equivalent += 0.5 * sign;
            }
            _ => {}
        }

        let daily = self.daily.entry(date).or_default();
        *daily.shift_counts.entry(key.to_owned()).or_insert(0.0) += sign;
    }

    /// Têtes affectées sur un shift à une date.
    pub fn assigned_on(&self, date: NaiveDate, shift: &str) -> u32 {
        self.daily
            .get(&date)
            .and_then(|d| d.shift_counts.get(shift))
            .copied()
            .unwrap_or(0.0)
            .round() as u32
    }

    pub fn rest_on(&self, date: NaiveDate, rules: &Rules) -> u32 {
        self.assigned_on(date, &rules.rest_shift_name)
    }

    /// Crédit repos d'une personne (1.0 par repos, 0.5 par demi-journée).
    pub fn rest_equivalent(&self, person: &str) -> f64 {
        self.staff
            .get(person)
            .map(|s| s.rest_equivalent)
            .unwrap_or(0.0)
    }

    pub fn shift_count(&self, person: &str, shift: &str) -> f64 {
        self.staff
            .get(person)
            .and_then(|s| s.shift_counts.get(shift))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn staff_statistics(&self, person: &str) -> Option<&StaffStatistics> {
        self.staff.get(person)
    }

    pub fn daily_statistics(&self, date: NaiveDate) -> Option<&DailyStatistics> {
        self.daily.get(&date)
    }
}
