#![forbid(unsafe_code)]
//! Roulement — bibliothèque de génération de plannings d'équipe locale (sans BD).
//!
//! - Stockage fichiers (JSON/CSV).
//! - Moteur à trois passes : exigences prioritaires, équilibrage des repos,
//!   complétion.
//! - Quotas de repos, enchaînement maximal, rotation équitable, continuité
//!   des demi-journées.
//! - Dates calendaires naïves ; parsing ISO `yyyy-MM-dd` ; aucun fuseau dans
//!   la lib.

pub mod config;
pub mod engine;
pub mod io;
pub mod model;
pub mod storage;

pub use config::{
    export_rules_json, load_rules_from_file, ConfigError, RuleSetInfo, RuleSetStore, Rules,
    SchedulingRule, ShiftRequirement,
};
pub use engine::{
    audit_coverage, generate_person_schedule, generate_schedule,
    rotate_staff_for_fair_distribution, to_date_view, CoverageGap, Engine,
};
pub use model::{
    Assignment, DayClass, Person, PersonAssignment, Schedule, ScheduleEntry, ScheduleHistory,
    ShiftDefinition,
};
pub use storage::{JsonStorage, PlanningFile, Storage};
