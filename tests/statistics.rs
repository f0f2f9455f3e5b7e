#![forbid(unsafe_code)]
use chrono::NaiveDate;
use roulement::engine::stats::Statistics;
use roulement::{Assignment, Rules};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
}

fn half_day_rules() -> Rules {
    let mut rules = Rules::default();
    rules.half_day_shifts.insert("am".to_owned());
    rules
}

#[test]
fn half_days_credit_half_a_rest_day() {
    let rules = half_day_rules();
    let mut stats = Statistics::default();

    // deux demi-journées puis repos sur le reste d'une période de dix jours
    stats.record("alice", date(1), &Assignment::Work("am".to_owned()), &rules);
    stats.record("alice", date(2), &Assignment::Work("am".to_owned()), &rules);
    for d in 3..=10 {
        stats.record("alice", date(d), &Assignment::Rest, &rules);
    }

    assert_eq!(stats.rest_equivalent("alice"), 2.0 * 0.5 + 8.0);
    assert_eq!(stats.shift_count("alice", "am"), 2.0);
    assert_eq!(stats.assigned_on(date(1), "am"), 1);
    assert_eq!(stats.rest_on(date(3), &rules), 1);
}

#[test]
fn retract_reverses_record_exactly() {
    let rules = half_day_rules();
    let mut stats = Statistics::default();

    let am = Assignment::Work("am".to_owned());
    stats.record("alice", date(1), &am, &rules);
    stats.record("alice", date(2), &Assignment::Rest, &rules);
    stats.retract("alice", date(1), &am, &rules);
    stats.retract("alice", date(2), &Assignment::Rest, &rules);

    assert_eq!(stats.rest_equivalent("alice"), 0.0);
    assert_eq!(stats.shift_count("alice", "am"), 0.0);
    assert_eq!(stats.assigned_on(date(1), "am"), 0);
}

#[test]
fn unresolved_is_never_counted() {
    let rules = half_day_rules();
    let mut stats = Statistics::default();
    stats.record("alice", date(1), &Assignment::Unresolved, &rules);
    assert!(stats.staff_statistics("alice").is_none());
    assert!(stats.daily_statistics(date(1)).is_none());
}

#[test]
fn counters_are_tracked_per_person_and_per_date() {
    let rules = Rules::default();
    let mut stats = Statistics::default();
    let day = Assignment::Work("day".to_owned());
    stats.record("alice", date(1), &day, &rules);
    stats.record("bob", date(1), &day, &rules);
    stats.record("alice", date(2), &day, &rules);

    assert_eq!(stats.assigned_on(date(1), "day"), 2);
    assert_eq!(stats.assigned_on(date(2), "day"), 1);
    assert_eq!(stats.shift_count("alice", "day"), 2.0);
    assert_eq!(stats.shift_count("bob", "day"), 1.0);
    assert_eq!(stats.rest_equivalent("alice"), 0.0);
}
