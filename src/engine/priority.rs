use chrono::NaiveDate;

use super::{rotate_staff_for_fair_distribution, Engine, ResolvedRule};
use crate::config::ShiftRequirement;
use crate::model::{Assignment, Person};

impl<'a> Engine<'a> {
    /// Passe 1 : sert chaque exigence date par date, priorités explicites
    /// d'abord (numéro croissant), puis les flexibles ; résorbe au passage les
    /// excédents hérités d'un état antérieur.
    pub(super) fn priority_pass(&mut self, rule: &ResolvedRule<'a>) {
        for di in 0..self.dates.len() {
            let date = self.dates[di];
            let mut requirements: Vec<&'a ShiftRequirement> =
                self.requirements_for(rule, date).iter().collect();
            requirements.sort_by_key(|r| (r.priority.is_none(), r.priority));

            for req in requirements {
                if !self.known_shifts.contains(req.shift.as_str()) {
                    continue;
                }
                let assigned = self.assigned_count(date, &req.shift);
                if assigned < req.headcount {
                    self.fill_requirement(rule, date, req, req.headcount - assigned);
                } else if assigned > req.headcount {
                    self.clear_excess(rule, date, &req.shift, assigned - req.headcount);
                }
            }
        }
    }

    /// Affecte jusqu'à `missing` candidats éligibles sur l'exigence, dans
    /// l'ordre de rotation équitable du jour.
    pub(super) fn fill_requirement(
        &mut self,
        rule: &ResolvedRule<'a>,
        date: NaiveDate,
        req: &ShiftRequirement,
        missing: u32,
    ) {
        let candidates: Vec<&'a Person> = rule
            .staff
            .iter()
            .copied()
            .filter(|p| {
                self.assignment(&p.name, date).is_unresolved()
                    && self.eligible_for_shift(&p.name, &req.shift, date)
            })
            .collect();

        let mut remaining = missing;
        for person in rotate_staff_for_fair_distribution(&candidates, date) {
            if remaining == 0 {
                break;
            }
            self.place(&person.name, date, Assignment::Work(req.shift.clone()));
            remaining -= 1;
            if self.rules.is_half_day(&req.shift) {
                self.try_extend_half_day(rule, &person.name, &req.shift, date);
            }
        }
    }

    /// Libère `excess` affectations du shift, par ordre d'énumération de
    /// l'effectif.
    fn clear_excess(&mut self, rule: &ResolvedRule<'a>, date: NaiveDate, shift: &str, excess: u32) {
        let mut remaining = excess;
        for pi in 0..rule.staff.len() {
            if remaining == 0 {
                break;
            }
            let person = rule.staff[pi];
            let holds_shift = matches!(
                self.assignment(&person.name, date),
                Assignment::Work(name) if name.as_str() == shift
            );
            if holds_shift {
                self.clear(&person.name, date);
                remaining -= 1;
            }
        }
    }
}
