use chrono::NaiveDate;

use super::{Engine, ResolvedRule};
use crate::config::ShiftRequirement;
use crate::model::{Assignment, DayClass, Person};

impl<'a> Engine<'a> {
    /// Passe 2 : amène le crédit repos de chaque personne vers la cible
    /// `total_rest_days`, sous plafond journalier de repos.
    ///
    /// Les plafonds `average − 1` (semaine) et `average + 2` (férié), avec
    /// `average = floor(effectif × cible ÷ jours de période)`, sont repris
    /// tels quels de la politique produit.
    pub(super) fn balance_pass(&mut self, rule: &ResolvedRule<'a>) {
        if self.dates.is_empty() || rule.staff.is_empty() {
            return;
        }
        let target = f64::from(self.rules.total_rest_days);
        let average = (rule.staff.len() as i64 * i64::from(self.rules.total_rest_days))
            / self.dates.len() as i64;
        let weekday_ceiling = average - 1;
        let holiday_ceiling = average + 2;

        for pi in 0..rule.staff.len() {
            let person = rule.staff[pi];
            let current = self.rest_equivalent(&person.name);
            if current < target {
                self.raise_rest_to_target(rule, person, target, weekday_ceiling, holiday_ceiling);
            } else if current > target {
                self.lower_rest_to_target(rule, person, target);
            }
        }
    }

    /// Convertit en repos des journées non résolues ou affectées à un shift
    /// flexible, dans l'ordre des dates, jusqu'à la cible.
    fn raise_rest_to_target(
        &mut self,
        rule: &ResolvedRule<'a>,
        person: &'a Person,
        target: f64,
        weekday_ceiling: i64,
        holiday_ceiling: i64,
    ) {
        for di in 0..self.dates.len() {
            if self.rest_equivalent(&person.name) >= target {
                break;
            }
            let date = self.dates[di];
            let ceiling = match self.rules.day_class(date) {
                DayClass::Holiday => holiday_ceiling,
                DayClass::Weekday => weekday_ceiling,
            };
            if i64::from(self.rest_count_on(date)) >= ceiling {
                continue;
            }
            if !self.convertible_to_rest(rule, person, date) {
                continue;
            }
            let previous = self.clear(&person.name, date);
            if self.eligible_for_rest(&person.name, date) {
                self.place(&person.name, date, Assignment::Rest);
            } else if !previous.is_unresolved() {
                self.place(&person.name, date, previous);
            }
        }
    }

    /// Une journée est convertible si elle est non résolue, ou affectée à un
    /// shift dont l'exigence du jour ne porte pas de priorité explicite.
    fn convertible_to_rest(
        &self,
        rule: &ResolvedRule<'a>,
        person: &Person,
        date: NaiveDate,
    ) -> bool {
        match self.assignment(&person.name, date) {
            Assignment::Unresolved => true,
            Assignment::Rest => false,
            Assignment::Work(name) => !self
                .requirements_for(rule, date)
                .iter()
                .any(|r| r.shift == *name && r.priority.is_some()),
        }
    }

    /// Réaffecte des repos excédentaires vers un shift flexible encore
    /// déficitaire ; un repos sans réaffectation valide reste en place.
    fn lower_rest_to_target(&mut self, rule: &ResolvedRule<'a>, person: &'a Person, target: f64) {
        for di in 0..self.dates.len() {
            if self.rest_equivalent(&person.name) <= target {
                break;
            }
            let date = self.dates[di];
            if !self.assignment(&person.name, date).is_rest() {
                continue;
            }
            let flexible: Vec<&'a ShiftRequirement> = self
                .requirements_for(rule, date)
                .iter()
                .filter(|r| r.priority.is_none())
                .collect();

            self.clear(&person.name, date);
            let mut placed = false;
            for req in flexible {
                if !self.known_shifts.contains(req.shift.as_str()) {
                    continue;
                }
                if self.assigned_count(date, &req.shift) >= req.headcount {
                    continue;
                }
                if self.eligible_for_shift(&person.name, &req.shift, date) {
                    self.place(&person.name, date, Assignment::Work(req.shift.clone()));
                    placed = true;
                    break;
                }
            }
            if !placed {
                self.place(&person.name, date, Assignment::Rest);
            }
        }
    }

    /// Chemin hérité uniquement : force la cible de repos en convertissant des
    /// journées travaillées, en re-validant la contrainte d'enchaînement après
    /// chaque conversion et en annulant celles qui la violeraient.
    pub(super) fn enforce_total_rest_days(&mut self, rule: &ResolvedRule<'a>) {
        let target = f64::from(self.rules.total_rest_days);
        let limit = f64::from(self.rules.max_consecutive_days);
        for pi in 0..rule.staff.len() {
            let person = rule.staff[pi];
            for di in 0..self.dates.len() {
                if self.rest_equivalent(&person.name) >= target {
                    break;
                }
                let date = self.dates[di];
                if !self.assignment(&person.name, date).is_work() {
                    continue;
                }
                let previous = self.clear(&person.name, date);
                self.place(&person.name, date, Assignment::Rest);
                if self.max_run_with_history(&person.name) > limit {
                    self.clear(&person.name, date);
                    self.place(&person.name, date, previous);
                }
            }
        }
    }
}
