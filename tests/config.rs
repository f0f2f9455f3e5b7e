#![forbid(unsafe_code)]
use chrono::NaiveTime;
use roulement::{
    ConfigError, Person, RuleSetStore, Rules, SchedulingRule, ShiftDefinition, ShiftRequirement,
};
use tempfile::tempdir;

fn sample_rules() -> Rules {
    let mut rules = Rules {
        max_consecutive_days: 5,
        total_rest_days: 2,
        ..Rules::default()
    };
    rules.weekday_requirements = vec![ShiftRequirement::new("day", 2).with_priority(1)];
    rules.holiday_requirements = vec![ShiftRequirement::new("day", 1)];
    rules
}

#[test]
fn save_and_load_rule_set_roundtrip() {
    let dir = tempdir().unwrap();
    let store = RuleSetStore::new(dir.path());
    let rules = sample_rules();
    store.save("default", &rules).unwrap();

    let loaded = store.load("default").unwrap();
    assert_eq!(loaded, rules);
}

#[test]
fn list_returns_rule_sets_sorted_by_name() {
    let dir = tempdir().unwrap();
    let store = RuleSetStore::new(dir.path());
    store.save("weekend", &sample_rules()).unwrap();
    store.save("default", &sample_rules()).unwrap();

    let infos = store.list().unwrap();
    let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["default", "weekend"]);
}

#[test]
fn zero_max_consecutive_is_rejected() {
    let rules = Rules {
        max_consecutive_days: 0,
        ..Rules::default()
    };
    assert!(matches!(
        rules.validate(),
        Err(ConfigError::InvalidMaxConsecutive)
    ));
}

#[test]
fn a_person_cannot_belong_to_two_rules() {
    let mut rules = sample_rules();
    let mut first = SchedulingRule::new("desk");
    first.applicable_staff.insert("alice".to_owned());
    let mut second = SchedulingRule::new("floor");
    second.applicable_staff.insert("alice".to_owned());
    rules.scheduling_rules = vec![first, second];

    assert!(matches!(
        rules.validate(),
        Err(ConfigError::OverlappingApplicableStaff(name)) if name == "alice"
    ));
}

#[test]
fn unknown_requirement_shift_is_rejected() {
    let rules = sample_rules();
    let staff = vec![Person::new("alice", "E001")];
    let shifts = vec![ShiftDefinition::new(
        "night",
        NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
    )];
    assert!(matches!(
        rules.validate_against(&staff, &shifts),
        Err(ConfigError::UnknownShift(name)) if name == "day"
    ));
}

#[test]
fn duplicate_person_names_are_rejected() {
    let rules = Rules::default();
    let staff = vec![Person::new("alice", "E001"), Person::new("alice", "E002")];
    assert!(matches!(
        rules.validate_against(&staff, &[]),
        Err(ConfigError::DuplicatePerson(name)) if name == "alice"
    ));
}

#[test]
fn unknown_half_day_shift_is_rejected() {
    let mut rules = Rules::default();
    rules.half_day_shifts.insert("am".to_owned());
    assert!(matches!(
        rules.validate_against(&[], &[]),
        Err(ConfigError::UnknownHalfDayShift(name)) if name == "am"
    ));
}
