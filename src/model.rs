use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::Rules;

/// Nom réservé du jour de repos (remplaçable via `Rules::rest_shift_name`).
pub const DEFAULT_REST_NAME: &str = "rest";

/// Personne (membre du planning). Le nom est la clé naturelle, unique par run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub employee_id: String,
    #[serde(default)]
    pub group: String,
}

impl Person {
    pub fn new<N: Into<String>, E: Into<String>>(name: N, employee_id: E) -> Self {
        Self {
            name: name.into(),
            employee_id: employee_id.into(),
            group: String::new(),
        }
    }

    pub fn with_group<G: Into<String>>(mut self, group: G) -> Self {
        self.group = group.into();
        self
    }
}

/// Définition d'un créneau : heures de prise/fin et couleur d'affichage.
/// Une fin antérieure au début décrit un créneau chevauchant minuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub color: String,
}

impl ShiftDefinition {
    pub fn new<N: Into<String>>(name: N, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time,
            color: String::new(),
        }
    }
}

/// Classification binaire d'une date : férié (liste custom) ou jour ouvré.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayClass {
    Weekday,
    Holiday,
}

/// État d'une case du planning.
///
/// `Unresolved` n'existe que pendant la construction ; un planning terminé ne
/// contient que `Work` et `Rest`. La forme chaîne ("" / nom du repos) ne sert
/// qu'à la frontière d'export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assignment {
    #[default]
    Unresolved,
    Work(String),
    Rest,
}

impl Assignment {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Assignment::Unresolved)
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Assignment::Rest)
    }

    pub fn is_work(&self) -> bool {
        matches!(self, Assignment::Work(_))
    }

    pub fn shift_name(&self) -> Option<&str> {
        match self {
            Assignment::Work(name) => Some(name),
            _ => None,
        }
    }

    /// Forme chaîne pour l'export ; "" reste la sentinelle interne.
    pub fn as_name<'a>(&'a self, rest_name: &'a str) -> &'a str {
        match self {
            Assignment::Unresolved => "",
            Assignment::Work(name) => name,
            Assignment::Rest => rest_name,
        }
    }

    pub fn from_name(name: &str, rest_name: &str) -> Self {
        if name.is_empty() {
            Assignment::Unresolved
        } else if name == rest_name {
            Assignment::Rest
        } else {
            Assignment::Work(name.to_owned())
        }
    }
}

/// Planning d'une personne : une affectation par date de la période.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub days: BTreeMap<NaiveDate, Assignment>,
}

impl ScheduleEntry {
    pub fn get(&self, date: NaiveDate) -> &Assignment {
        self.days.get(&date).unwrap_or(&Assignment::Unresolved)
    }

    pub fn set(&mut self, date: NaiveDate, assignment: Assignment) {
        self.days.insert(date, assignment);
    }

    /// Crédit de repos cumulé : 1.0 par repos, 0.5 par demi-journée travaillée.
    pub fn rest_equivalent(&self, rules: &Rules) -> f64 {
        self.days
            .values()
            .map(|a| match a {
                Assignment::Rest => 1.0,
                Assignment::Work(name) if rules.is_half_day(name) => 0.5,
                _ => 0.0,
            })
            .sum()
    }
}

/// Ligne de la vue par date (reporting/export).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonAssignment {
    pub person: String,
    pub shift: String,
}

/// Planning complet, indexé par nom de personne.
pub type Schedule = BTreeMap<String, ScheduleEntry>;

/// Historique pré-période : personne → date → nom de shift. Jamais muté.
pub type ScheduleHistory = BTreeMap<String, BTreeMap<NaiveDate, String>>;
