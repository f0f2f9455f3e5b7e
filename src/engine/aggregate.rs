use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::resolve_rules;
use crate::config::Rules;
use crate::model::{Assignment, Person, PersonAssignment, Schedule};

/// Vue par date (reporting/export) d'un planning indexé par personne.
///
/// Ne s'applique qu'à un planning terminé : chaque case se réduit à un nom de
/// shift ou au nom du repos, jamais à la sentinelle vide.
pub fn to_date_view(
    schedule: &Schedule,
    rules: &Rules,
) -> BTreeMap<NaiveDate, Vec<PersonAssignment>> {
    let mut out: BTreeMap<NaiveDate, Vec<PersonAssignment>> = BTreeMap::new();
    for (person, entry) in schedule {
        for (date, assignment) in &entry.days {
            out.entry(*date).or_default().push(PersonAssignment {
                person: person.clone(),
                shift: assignment.as_name(&rules.rest_shift_name).to_owned(),
            });
        }
    }
    out
}

/// Écart constaté entre une exigence et la couverture obtenue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    pub date: NaiveDate,
    pub rule: String,
    pub shift: String,
    pub required: u32,
    pub assigned: u32,
}

/// Compare la couverture d'un planning terminé aux exigences, règle par règle
/// et date par date. Lecture seule, sur la même résolution de règles que le
/// moteur.
pub fn audit_coverage(
    schedule: &Schedule,
    staff: &[Person],
    rules: &Rules,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<CoverageGap> {
    let mut gaps = Vec::new();
    for rule in resolve_rules(rules, staff) {
        let mut date = start;
        while date <= end {
            let requirements = match rules.day_class(date) {
                crate::model::DayClass::Holiday => rule.holiday,
                crate::model::DayClass::Weekday => rule.weekday,
            };
            for req in requirements {
                let assigned = rule
                    .staff
                    .iter()
                    .filter(|p| {
                        schedule.get(&p.name).is_some_and(|entry| {
                            matches!(
                                entry.get(date),
                                Assignment::Work(name) if name.as_str() == req.shift
                            )
                        })
                    })
                    .count() as u32;
                if assigned != req.headcount {
                    gaps.push(CoverageGap {
                        date,
                        rule: rule.name.to_owned(),
                        shift: req.shift.clone(),
                        required: req.headcount,
                        assigned,
                    });
                }
            }
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
    }
    gaps
}
