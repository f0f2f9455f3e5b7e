use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::config::Rules;
use crate::model::{Assignment, ScheduleEntry};

/// Fenêtre (en jours) examinée de part et d'autre d'une date pour la
/// contrainte d'enchaînement maximal.
pub(super) const CONSTRAINT_WINDOW_DAYS: u64 = 14;
/// Longueur d'enchaînement travaillé à partir de laquelle un repos est
/// toujours admis, même après un repos la veille.
const LONG_RUN_THRESHOLD: u32 = 5;
/// Profondeur de recherche du repos antérieur le plus proche.
const REST_LOOKBACK_DAYS: u64 = 5;

/// Vue combinée pour une personne : historique pré-période + planning en
/// cours. Les contraintes qui franchissent le bord de période passent par ici.
pub struct PersonView<'a> {
    entry: &'a ScheduleEntry,
    history: Option<&'a BTreeMap<NaiveDate, String>>,
    rules: &'a Rules,
}

impl<'a> PersonView<'a> {
    pub fn new(
        entry: &'a ScheduleEntry,
        history: Option<&'a BTreeMap<NaiveDate, String>>,
        rules: &'a Rules,
    ) -> Self {
        Self {
            entry,
            history,
            rules,
        }
    }

    /// Affectation connue à une date, côté période ou côté historique.
    fn assignment_on(&self, date: NaiveDate) -> Assignment {
        if let Some(assignment) = self.entry.days.get(&date) {
            return assignment.clone();
        }
        match self.history.and_then(|h| h.get(&date)) {
            Some(name) => Assignment::from_name(name, &self.rules.rest_shift_name),
            None => Assignment::Unresolved,
        }
    }

    /// Poids d'une journée dans un enchaînement : 0.5 pour une demi-journée,
    /// 1.0 pour un shift plein, None pour tout ce qui casse l'enchaînement.
    fn workday_weight(&self, assignment: &Assignment) -> Option<f64> {
        match assignment {
            Assignment::Work(name) if self.rules.is_half_day(name) => Some(0.5),
            Assignment::Work(_) => Some(1.0),
            _ => None,
        }
    }

    fn is_rest(&self, date: NaiveDate) -> bool {
        self.assignment_on(date).is_rest()
    }

    fn is_full_workday(&self, date: NaiveDate) -> bool {
        matches!(self.assignment_on(date), Assignment::Work(name) if !self.rules.is_half_day(&name))
    }
}

/// Une personne peut-elle recevoir `shift` à `date` ?
///
/// Pose hypothétiquement le shift puis mesure le plus long enchaînement de
/// journées travaillées sur la fenêtre [date−14, date+14].
pub fn can_assign_shift(view: &PersonView<'_>, shift: &str, date: NaiveDate) -> bool {
    if !view.assignment_on(date).is_unresolved() {
        return false;
    }

    let window_start = date
        .checked_sub_days(Days::new(CONSTRAINT_WINDOW_DAYS))
        .unwrap_or(date);
    let window_end = date
        .checked_add_days(Days::new(CONSTRAINT_WINDOW_DAYS))
        .unwrap_or(date);
    let candidate = Assignment::Work(shift.to_owned());

    let mut run = 0.0_f64;
    let mut max_run = 0.0_f64;
    let mut day = window_start;
    while day <= window_end {
        let assignment = if day == date {
            candidate.clone()
        } else {
            view.assignment_on(day)
        };
        match view.workday_weight(&assignment) {
            Some(weight) => {
                run += weight;
                max_run = max_run.max(run);
            }
            None => run = 0.0,
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    max_run <= f64::from(view.rules.max_consecutive_days)
}

/// Une personne peut-elle recevoir un repos à `date` ?
///
/// Quatre règles en ordre fixe, premier rejet gagnant :
/// repos consécutif (avec dérogation après un long enchaînement), journée
/// travaillée isolée entre deux repos, séparation d'un motif de repos groupé,
/// puis acceptation par défaut.
pub fn can_assign_rest(view: &PersonView<'_>, date: NaiveDate) -> bool {
    if !view.assignment_on(date).is_unresolved() {
        return false;
    }

    match nearest_prior_rest(view, date) {
        // Repos la veille : admis seulement si ce repos cassait un
        // enchaînement d'au moins LONG_RUN_THRESHOLD journées travaillées.
        Some(1) => prior_run_broken_by_rest(view, date),
        // Une seule journée travaillée prise en sandwich entre deux repos.
        Some(2) => false,
        // 2 à 4 journées intermédiaires dont au moins une pleine : poser un
        // repos ici éclaterait le motif de repos groupé.
        Some(offset @ 3..=REST_LOOKBACK_DAYS) => !has_full_workday_between(view, date, offset),
        _ => true,
    }
}

/// Décalage (en jours) du repos antérieur le plus proche, limité aux
/// `REST_LOOKBACK_DAYS` dates précédentes.
fn nearest_prior_rest(view: &PersonView<'_>, date: NaiveDate) -> Option<u64> {
    (1..=REST_LOOKBACK_DAYS).find(|&offset| {
        date.checked_sub_days(Days::new(offset))
            .is_some_and(|d| view.is_rest(d))
    })
}

/// Vrai si, en remontant depuis l'avant-veille, on trouve un enchaînement
/// ininterrompu d'au moins `LONG_RUN_THRESHOLD` shifts travaillés.
fn prior_run_broken_by_rest(view: &PersonView<'_>, date: NaiveDate) -> bool {
    let mut run = 0_u32;
    let mut day = date.checked_sub_days(Days::new(2));
    while let Some(current) = day {
        if view.workday_weight(&view.assignment_on(current)).is_none() {
            break;
        }
        run += 1;
        if run >= LONG_RUN_THRESHOLD {
            return true;
        }
        day = current.checked_sub_days(Days::new(1));
    }
    false
}

fn has_full_workday_between(view: &PersonView<'_>, date: NaiveDate, offset: u64) -> bool {
    (1..offset).any(|back| {
        date.checked_sub_days(Days::new(back))
            .is_some_and(|d| view.is_full_workday(d))
    })
}

/// Plus long enchaînement de journées travaillées sur [from, to], sans pose
/// hypothétique. Sert à re-valider la contrainte après une conversion.
pub fn max_consecutive_run(view: &PersonView<'_>, from: NaiveDate, to: NaiveDate) -> f64 {
    let mut run = 0.0_f64;
    let mut max_run = 0.0_f64;
    let mut day = from;
    while day <= to {
        match view.workday_weight(&view.assignment_on(day)) {
            Some(weight) => {
                run += weight;
                max_run = max_run.max(run);
            }
            None => run = 0.0,
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    max_run
}
