use chrono::NaiveDate;

use super::{Engine, ResolvedRule};
use crate::config::ShiftRequirement;
use crate::model::{Assignment, Person};

impl<'a> Engine<'a> {
    /// Passe 3 : complète les exigences flexibles encore déficitaires, puis
    /// résout chaque case restante de la période pour l'effectif de la règle.
    pub(super) fn fill_pass(&mut self, rule: &ResolvedRule<'a>) {
        for di in 0..self.dates.len() {
            let date = self.dates[di];
            let flexible: Vec<&'a ShiftRequirement> = self
                .requirements_for(rule, date)
                .iter()
                .filter(|r| r.priority.is_none())
                .collect();

            for req in &flexible {
                if !self.known_shifts.contains(req.shift.as_str()) {
                    continue;
                }
                let assigned = self.assigned_count(date, &req.shift);
                if assigned < req.headcount {
                    self.fill_requirement(rule, date, req, req.headcount - assigned);
                }
            }

            self.resolve_remaining(rule, date, &flexible);
        }
    }

    /// Chaque personne encore non résolue reçoit un shift flexible qui a de la
    /// place ; à quota de repos atteint, un shift même complet est préféré à
    /// un repos excédentaire ; à défaut de tout, la journée devient un repos.
    fn resolve_remaining(
        &mut self,
        rule: &ResolvedRule<'a>,
        date: NaiveDate,
        flexible: &[&'a ShiftRequirement],
    ) {
        let target = f64::from(self.rules.total_rest_days);
        for pi in 0..rule.staff.len() {
            let person = rule.staff[pi];
            if !self.assignment(&person.name, date).is_unresolved() {
                continue;
            }
            if self.assign_flexible_shift(rule, person, date, flexible, false) {
                continue;
            }
            if self.rest_equivalent(&person.name) >= target
                && self.assign_flexible_shift(rule, person, date, flexible, true)
            {
                continue;
            }
            self.place(&person.name, date, Assignment::Rest);
        }
    }

    fn assign_flexible_shift(
        &mut self,
        rule: &ResolvedRule<'a>,
        person: &'a Person,
        date: NaiveDate,
        flexible: &[&'a ShiftRequirement],
        ignore_headcount: bool,
    ) -> bool {
        for req in flexible {
            if !self.known_shifts.contains(req.shift.as_str()) {
                continue;
            }
            if !ignore_headcount && self.assigned_count(date, &req.shift) >= req.headcount {
                continue;
            }
            if self.eligible_for_shift(&person.name, &req.shift, date) {
                self.place(&person.name, date, Assignment::Work(req.shift.clone()));
                if self.rules.is_half_day(&req.shift) {
                    self.try_extend_half_day(rule, &person.name, &req.shift, date);
                }
                return true;
            }
        }
        false
    }
}
