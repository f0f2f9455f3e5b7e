mod aggregate;
mod balance;
pub mod eligibility;
mod fill;
mod priority;
pub mod stats;
mod util;

pub use aggregate::{audit_coverage, to_date_view, CoverageGap};
pub use util::rotate_staff_for_fair_distribution;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
#[cfg(feature = "logging")]
use tracing::debug;

use crate::config::{Rules, ShiftRequirement};
use crate::model::{
    Assignment, DayClass, Person, PersonAssignment, Schedule, ScheduleEntry, ScheduleHistory,
    ShiftDefinition,
};

use eligibility::PersonView;

/// Tuple résolu servi au pipeline de passes : exigences semaine/férié et
/// effectif couvert. Le chemin hérité (listes racine, tout l'effectif) passe
/// par la même forme que les règles nommées.
struct ResolvedRule<'a> {
    name: &'a str,
    weekday: &'a [ShiftRequirement],
    holiday: &'a [ShiftRequirement],
    staff: Vec<&'a Person>,
    legacy: bool,
}

fn resolve_rules<'a>(rules: &'a Rules, staff: &'a [Person]) -> Vec<ResolvedRule<'a>> {
    if rules.scheduling_rules.is_empty() {
        return vec![ResolvedRule {
            name: "default",
            weekday: &rules.weekday_requirements,
            holiday: &rules.holiday_requirements,
            staff: staff.iter().collect(),
            legacy: true,
        }];
    }

    let claimed: BTreeSet<&str> = rules
        .scheduling_rules
        .iter()
        .flat_map(|r| r.applicable_staff.iter().map(String::as_str))
        .collect();

    rules
        .scheduling_rules
        .iter()
        .map(|rule| ResolvedRule {
            name: &rule.name,
            weekday: &rule.weekday_requirements,
            holiday: &rule.holiday_requirements,
            staff: if rule.applicable_staff.is_empty() {
                staff
                    .iter()
                    .filter(|p| !claimed.contains(p.name.as_str()))
                    .collect()
            } else {
                staff
                    .iter()
                    .filter(|p| rule.applicable_staff.contains(&p.name))
                    .collect()
            },
            legacy: false,
        })
        .collect()
}

/// Moteur d'affectation : possède tout l'état de travail d'un run, n'en
/// expose rien au-delà, et ne persiste rien lui-même.
#[derive(Debug)]
pub struct Engine<'a> {
    staff: &'a [Person],
    rules: &'a Rules,
    history: &'a ScheduleHistory,
    start: NaiveDate,
    end: NaiveDate,
    known_shifts: BTreeSet<&'a str>,
    dates: Vec<NaiveDate>,
    schedule: Schedule,
    stats: stats::Statistics,
}

impl<'a> Engine<'a> {
    pub fn new(
        staff: &'a [Person],
        shifts: &'a [ShiftDefinition],
        rules: &'a Rules,
        history: &'a ScheduleHistory,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let dates = util::date_range(start, end);
        let mut schedule = Schedule::new();
        for person in staff {
            let mut entry = ScheduleEntry::default();
            for date in &dates {
                entry.days.insert(*date, Assignment::Unresolved);
            }
            schedule.insert(person.name.clone(), entry);
        }
        Self {
            staff,
            rules,
            history,
            start,
            end,
            known_shifts: shifts.iter().map(|s| s.name.as_str()).collect(),
            dates,
            schedule,
            stats: stats::Statistics::default(),
        }
    }

    /// Déroule le pipeline complet et rend le planning figé.
    ///
    /// Le message de diagnostic est vide en fin de run normale, y compris en
    /// cas de couverture partielle ; une période invalide rend un planning
    /// vide plutôt qu'une erreur.
    pub fn run(mut self) -> (Schedule, String) {
        if self.end < self.start {
            return (Schedule::new(), String::new());
        }

        let resolved = resolve_rules(self.rules, self.staff);
        for rule in &resolved {
            #[cfg(feature = "logging")]
            debug!(rule = rule.name, staff = rule.staff.len(), "processing rule");
            self.priority_pass(rule);
            self.balance_pass(rule);
            self.fill_pass(rule);
            if rule.legacy {
                self.enforce_total_rest_days(rule);
            }
        }
        self.finalize();

        #[cfg(feature = "logging")]
        debug!(persons = self.schedule.len(), days = self.dates.len(), "run complete");

        (self.schedule, String::new())
    }

    /// Toute case encore non résolue devient un repos : aucune sentinelle ne
    /// doit survivre au run, même pour une personne couverte par aucune règle.
    fn finalize(&mut self) {
        let names: Vec<String> = self.schedule.keys().cloned().collect();
        for person in &names {
            for di in 0..self.dates.len() {
                let date = self.dates[di];
                if self.assignment(person, date).is_unresolved() {
                    self.place(person, date, Assignment::Rest);
                }
            }
        }
    }

    fn requirements_for(
        &self,
        rule: &ResolvedRule<'a>,
        date: NaiveDate,
    ) -> &'a [ShiftRequirement] {
        match self.rules.day_class(date) {
            DayClass::Holiday => rule.holiday,
            DayClass::Weekday => rule.weekday,
        }
    }

    fn assignment(&self, person: &str, date: NaiveDate) -> &Assignment {
        self.schedule
            .get(person)
            .map(|entry| entry.get(date))
            .unwrap_or(&Assignment::Unresolved)
    }

    /// Pose une affectation sur une case non résolue et crédite le cache.
    fn place(&mut self, person: &str, date: NaiveDate, assignment: Assignment) {
        debug_assert!(!assignment.is_unresolved());
        let Some(entry) = self.schedule.get_mut(person) else {
            debug_assert!(false, "person missing from schedule map: {person}");
            return;
        };
        let slot = entry.days.entry(date).or_default();
        debug_assert!(slot.is_unresolved(), "overwriting a committed assignment");
        *slot = assignment.clone();
        self.stats.record(person, date, &assignment, self.rules);
    }

    /// Remet une case à l'état non résolu et débite le cache.
    fn clear(&mut self, person: &str, date: NaiveDate) -> Assignment {
        let Some(entry) = self.schedule.get_mut(person) else {
            debug_assert!(false, "person missing from schedule map: {person}");
            return Assignment::Unresolved;
        };
        let previous = entry
            .days
            .insert(date, Assignment::Unresolved)
            .unwrap_or_default();
        if !previous.is_unresolved() {
            self.stats.retract(person, date, &previous, self.rules);
        }
        previous
    }

    fn person_view(&self, person: &str) -> Option<PersonView<'_>> {
        let entry = self.schedule.get(person)?;
        Some(PersonView::new(entry, self.history.get(person), self.rules))
    }

    fn eligible_for_shift(&self, person: &str, shift: &str, date: NaiveDate) -> bool {
        self.person_view(person)
            .map(|view| eligibility::can_assign_shift(&view, shift, date))
            .unwrap_or(false)
    }

    fn eligible_for_rest(&self, person: &str, date: NaiveDate) -> bool {
        self.person_view(person)
            .map(|view| eligibility::can_assign_rest(&view, date))
            .unwrap_or(false)
    }

    /// Plus long enchaînement travaillé, historique compris.
    fn max_run_with_history(&self, person: &str) -> f64 {
        let Some(view) = self.person_view(person) else {
            return 0.0;
        };
        let from = self
            .start
            .checked_sub_days(Days::new(eligibility::CONSTRAINT_WINDOW_DAYS))
            .unwrap_or(self.start);
        eligibility::max_consecutive_run(&view, from, self.end)
    }

    fn assigned_count(&self, date: NaiveDate, shift: &str) -> u32 {
        self.stats.assigned_on(date, shift)
    }

    fn rest_count_on(&self, date: NaiveDate) -> u32 {
        self.stats.rest_on(date, self.rules)
    }

    fn rest_equivalent(&self, person: &str) -> f64 {
        self.stats.rest_equivalent(person)
    }

    /// Continuité des demi-journées : une seule extension contiguë est tentée
    /// sur le lendemain, et seulement tant que l'exigence du lendemain liste
    /// encore le même shift.
    fn try_extend_half_day(
        &mut self,
        rule: &ResolvedRule<'a>,
        person: &str,
        shift: &str,
        date: NaiveDate,
    ) {
        let Some(next) = date.succ_opt() else { return };
        if next > self.end {
            return;
        }
        if !self
            .requirements_for(rule, next)
            .iter()
            .any(|r| r.shift == shift)
        {
            return;
        }
        if !self.assignment(person, next).is_unresolved() {
            return;
        }
        if !self.eligible_for_shift(person, shift, next) {
            return;
        }
        self.place(person, next, Assignment::Work(shift.to_owned()));
    }
}

/// Vue native du moteur : planning indexé par personne.
pub fn generate_person_schedule(
    staff: &[Person],
    shifts: &[ShiftDefinition],
    rules: &Rules,
    history: &ScheduleHistory,
    start: NaiveDate,
    end: NaiveDate,
) -> Schedule {
    Engine::new(staff, shifts, rules, history, start, end).run().0
}

/// Vue par date pour le reporting/export, plus le message de diagnostic.
pub fn generate_schedule(
    staff: &[Person],
    shifts: &[ShiftDefinition],
    rules: &Rules,
    history: &ScheduleHistory,
    start: NaiveDate,
    end: NaiveDate,
) -> (BTreeMap<NaiveDate, Vec<PersonAssignment>>, String) {
    let (schedule, diagnostic) = Engine::new(staff, shifts, rules, history, start, end).run();
    (to_date_view(&schedule, rules), diagnostic)
}
