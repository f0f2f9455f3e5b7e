#![forbid(unsafe_code)]
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use roulement::{
    generate_person_schedule, generate_schedule, Assignment, Person, Rules, ScheduleHistory,
    ShiftDefinition, ShiftRequirement,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn shift(name: &str) -> ShiftDefinition {
    ShiftDefinition::new(
        name,
        NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    )
}

fn crew(names: &[&str]) -> Vec<Person> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Person::new(*name, format!("E{i:03}")))
        .collect()
}

fn on_shift(schedule: &roulement::Schedule, day: NaiveDate, shift: &str) -> usize {
    schedule
        .values()
        .filter(|entry| matches!(entry.get(day), Assignment::Work(n) if n == shift))
        .count()
}

#[test]
fn priority_requirement_filled_exactly_every_day() {
    let staff = crew(&["alice", "bob", "chloe", "david"]);
    let shifts = vec![shift("day")];
    let mut rules = Rules {
        max_consecutive_days: 5,
        total_rest_days: 1,
        ..Rules::default()
    };
    rules.weekday_requirements = vec![ShiftRequirement::new("day", 2).with_priority(1)];
    let history = ScheduleHistory::new();
    let start = date(2025, 3, 3);
    let end = date(2025, 3, 9);

    let schedule = generate_person_schedule(&staff, &shifts, &rules, &history, start, end);
    assert_eq!(schedule.len(), 4);

    let mut day = start;
    while day <= end {
        assert_eq!(on_shift(&schedule, day, "day"), 2, "two on duty on {day}");
        day = day.succ_opt().unwrap();
    }

    for (person, entry) in &schedule {
        assert!(
            entry.days.values().all(|a| !a.is_unresolved()),
            "{person} has an unresolved day"
        );
        assert!(
            entry.rest_equivalent(&rules) >= 1.0,
            "{person} is under the rest target"
        );
    }
}

#[test]
fn max_consecutive_constraint_holds_across_history() {
    let staff = crew(&["alice"]);
    let shifts = vec![shift("day")];
    let mut rules = Rules {
        max_consecutive_days: 5,
        total_rest_days: 0,
        ..Rules::default()
    };
    rules.weekday_requirements = vec![ShiftRequirement::new("day", 1).with_priority(1)];

    // quatre journées travaillées juste avant la période
    let mut history = ScheduleHistory::new();
    let mut prior = BTreeMap::new();
    for day in 24..=27 {
        prior.insert(date(2025, 2, day), "day".to_owned());
    }
    history.insert("alice".to_owned(), prior);

    let start = date(2025, 2, 28);
    let end = date(2025, 3, 6);
    let schedule = generate_person_schedule(&staff, &shifts, &rules, &history, start, end);
    let entry = &schedule["alice"];

    let mut run = 4.0; // enchaînement hérité de l'historique
    let mut max_run: f64 = run;
    let mut day = start;
    while day <= end {
        match entry.get(day) {
            Assignment::Work(_) => {
                run += 1.0;
                max_run = max_run.max(run);
            }
            _ => run = 0.0,
        }
        day = day.succ_opt().unwrap();
    }
    assert!(max_run <= 5.0, "longest run was {max_run}");
}

#[test]
fn regeneration_is_deterministic() {
    let staff = crew(&["alice", "bob", "chloe"]);
    let shifts = vec![shift("day"), shift("night")];
    let mut rules = Rules {
        max_consecutive_days: 4,
        total_rest_days: 2,
        ..Rules::default()
    };
    rules.weekday_requirements = vec![
        ShiftRequirement::new("day", 1).with_priority(1),
        ShiftRequirement::new("night", 1),
    ];
    let history = ScheduleHistory::new();
    let start = date(2025, 4, 7);
    let end = date(2025, 4, 20);

    let first = generate_person_schedule(&staff, &shifts, &rules, &history, start, end);
    let second = generate_person_schedule(&staff, &shifts, &rules, &history, start, end);
    assert_eq!(first, second);
}

#[test]
fn holiday_dates_follow_holiday_requirements() {
    let staff = crew(&["alice", "bob"]);
    let shifts = vec![shift("day"), shift("cover")];
    let mut rules = Rules {
        max_consecutive_days: 6,
        total_rest_days: 0,
        ..Rules::default()
    };
    rules.custom_holidays.insert(date(2025, 5, 1));
    rules.weekday_requirements = vec![ShiftRequirement::new("day", 1).with_priority(1)];
    rules.holiday_requirements = vec![ShiftRequirement::new("cover", 1).with_priority(1)];
    let history = ScheduleHistory::new();

    let schedule = generate_person_schedule(
        &staff,
        &shifts,
        &rules,
        &history,
        date(2025, 4, 30),
        date(2025, 5, 2),
    );

    assert_eq!(on_shift(&schedule, date(2025, 5, 1), "cover"), 1);
    assert_eq!(on_shift(&schedule, date(2025, 5, 1), "day"), 0);
    assert_eq!(on_shift(&schedule, date(2025, 4, 30), "day"), 1);
    assert_eq!(on_shift(&schedule, date(2025, 4, 30), "cover"), 0);
    assert_eq!(on_shift(&schedule, date(2025, 5, 2), "day"), 1);
}

#[test]
fn half_day_shift_extends_and_counts_half() {
    let staff = crew(&["alice"]);
    let shifts = vec![shift("am")];
    let mut rules = Rules {
        max_consecutive_days: 5,
        total_rest_days: 0,
        ..Rules::default()
    };
    rules.half_day_shifts.insert("am".to_owned());
    rules.weekday_requirements = vec![ShiftRequirement::new("am", 1).with_priority(1)];
    let history = ScheduleHistory::new();

    let schedule = generate_person_schedule(
        &staff,
        &shifts,
        &rules,
        &history,
        date(2025, 6, 2),
        date(2025, 6, 4),
    );
    let entry = &schedule["alice"];

    let mut day = date(2025, 6, 2);
    while day <= date(2025, 6, 4) {
        assert_eq!(entry.get(day), &Assignment::Work("am".to_owned()));
        day = day.succ_opt().unwrap();
    }
    assert_eq!(entry.rest_equivalent(&rules), 1.5);
}

#[test]
fn named_rules_partition_the_staff() {
    let staff = crew(&["alice", "bob", "chloe", "david"]);
    let shifts = vec![shift("desk"), shift("floor")];
    let mut rules = Rules {
        max_consecutive_days: 6,
        total_rest_days: 0,
        ..Rules::default()
    };
    let mut desk = roulement::SchedulingRule::new("desk crew");
    desk.weekday_requirements = vec![ShiftRequirement::new("desk", 1).with_priority(1)];
    desk.applicable_staff.insert("alice".to_owned());
    desk.applicable_staff.insert("bob".to_owned());
    let mut floor = roulement::SchedulingRule::new("floor crew");
    floor.weekday_requirements = vec![ShiftRequirement::new("floor", 1).with_priority(1)];
    rules.scheduling_rules = vec![desk, floor];
    let history = ScheduleHistory::new();

    let start = date(2025, 7, 7);
    let end = date(2025, 7, 9);
    let schedule = generate_person_schedule(&staff, &shifts, &rules, &history, start, end);

    let mut day = start;
    while day <= end {
        assert_eq!(on_shift(&schedule, day, "desk"), 1);
        assert_eq!(on_shift(&schedule, day, "floor"), 1);
        day = day.succ_opt().unwrap();
    }
    // la règle au sous-ensemble vide ne couvre que les personnes non réclamées
    for person in ["chloe", "david"] {
        let entry = &schedule[person];
        assert!(entry
            .days
            .values()
            .all(|a| !matches!(a, Assignment::Work(n) if n == "desk")));
    }
    for person in ["alice", "bob"] {
        let entry = &schedule[person];
        assert!(entry
            .days
            .values()
            .all(|a| !matches!(a, Assignment::Work(n) if n == "floor")));
    }
}

#[test]
fn end_before_start_yields_empty_schedule() {
    let staff = crew(&["alice"]);
    let shifts = vec![shift("day")];
    let rules = Rules::default();
    let history = ScheduleHistory::new();

    let (view, diagnostic) = generate_schedule(
        &staff,
        &shifts,
        &rules,
        &history,
        date(2025, 3, 9),
        date(2025, 3, 3),
    );
    assert!(view.is_empty());
    assert!(diagnostic.is_empty());
}

#[test]
fn empty_staff_yields_empty_schedule() {
    let shifts = vec![shift("day")];
    let rules = Rules::default();
    let history = ScheduleHistory::new();

    let schedule = generate_person_schedule(
        &[],
        &shifts,
        &rules,
        &history,
        date(2025, 3, 3),
        date(2025, 3, 9),
    );
    assert!(schedule.is_empty());
}

#[test]
fn date_view_collapses_rest_to_configured_name() {
    let staff = crew(&["alice"]);
    let shifts: Vec<ShiftDefinition> = Vec::new();
    let rules = Rules {
        max_consecutive_days: 5,
        rest_shift_name: "off".to_owned(),
        ..Rules::default()
    };
    let history = ScheduleHistory::new();

    let (view, _) = generate_schedule(
        &staff,
        &shifts,
        &rules,
        &history,
        date(2025, 3, 3),
        date(2025, 3, 5),
    );
    assert_eq!(view.len(), 3);
    for assignments in view.values() {
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].shift, "off");
        assert!(!assignments[0].shift.is_empty());
    }
}
