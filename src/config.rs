use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{DayClass, Person, ShiftDefinition, DEFAULT_REST_NAME};

/// Erreurs de validation d'un jeu de règles.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max_consecutive_days must be >= 1")]
    InvalidMaxConsecutive,
    #[error("scheduling rule name cannot be empty")]
    EmptyRuleName,
    #[error("person {0} appears in more than one applicable_staff set")]
    OverlappingApplicableStaff(String),
    #[error("duplicate person name: {0}")]
    DuplicatePerson(String),
    #[error("requirement references unknown shift: {0}")]
    UnknownShift(String),
    #[error("half-day entry references unknown shift: {0}")]
    UnknownHalfDayShift(String),
}

/// Exigence de couverture pour une classe de jour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRequirement {
    pub shift: String,
    pub headcount: u32,
    /// Priorité explicite : plus petite = servie d'abord. Absente = flexible,
    /// servie après toutes les exigences prioritaires.
    #[serde(default)]
    pub priority: Option<i32>,
}

impl ShiftRequirement {
    pub fn new<S: Into<String>>(shift: S, headcount: u32) -> Self {
        Self {
            shift: shift.into(),
            headcount,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Règle nommée : exigences semaine/férié et sous-ensemble d'effectif couvert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingRule {
    pub name: String,
    #[serde(default)]
    pub weekday_requirements: Vec<ShiftRequirement>,
    #[serde(default)]
    pub holiday_requirements: Vec<ShiftRequirement>,
    /// Vide = toutes les personnes non réclamées par une autre règle.
    #[serde(default)]
    pub applicable_staff: BTreeSet<String>,
}

impl SchedulingRule {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            weekday_requirements: Vec::new(),
            holiday_requirements: Vec::new(),
            applicable_staff: BTreeSet::new(),
        }
    }
}

/// Configuration statique d'un run de génération.
///
/// Les listes `weekday_requirements` / `holiday_requirements` au niveau racine
/// sont le chemin hérité : elles ne servent que si `scheduling_rules` est vide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub max_consecutive_days: u32,
    #[serde(default)]
    pub total_rest_days: u32,
    #[serde(default)]
    pub custom_holidays: BTreeSet<NaiveDate>,
    /// Shifts comptant pour 0.5 journée travaillée et 0.5 crédit repos.
    #[serde(default)]
    pub half_day_shifts: BTreeSet<String>,
    #[serde(default)]
    pub scheduling_rules: Vec<SchedulingRule>,
    #[serde(default)]
    pub weekday_requirements: Vec<ShiftRequirement>,
    #[serde(default)]
    pub holiday_requirements: Vec<ShiftRequirement>,
    #[serde(default = "default_rest_name")]
    pub rest_shift_name: String,
}

fn default_rest_name() -> String {
    DEFAULT_REST_NAME.to_owned()
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_consecutive_days: 5,
            total_rest_days: 0,
            custom_holidays: BTreeSet::new(),
            half_day_shifts: BTreeSet::new(),
            scheduling_rules: Vec::new(),
            weekday_requirements: Vec::new(),
            holiday_requirements: Vec::new(),
            rest_shift_name: default_rest_name(),
        }
    }
}

impl Rules {
    pub fn day_class(&self, date: NaiveDate) -> DayClass {
        if self.custom_holidays.contains(&date) {
            DayClass::Holiday
        } else {
            DayClass::Weekday
        }
    }

    pub fn is_half_day(&self, shift: &str) -> bool {
        self.half_day_shifts.contains(shift)
    }

    /// Contrôles structurels, sans contexte effectif/créneaux.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_consecutive_days == 0 {
            return Err(ConfigError::InvalidMaxConsecutive);
        }
        let mut claimed: BTreeSet<&str> = BTreeSet::new();
        for rule in &self.scheduling_rules {
            if rule.name.trim().is_empty() {
                return Err(ConfigError::EmptyRuleName);
            }
            for person in &rule.applicable_staff {
                if !claimed.insert(person.as_str()) {
                    return Err(ConfigError::OverlappingApplicableStaff(person.clone()));
                }
            }
        }
        Ok(())
    }

    /// Contrôles croisés avec l'effectif et les créneaux connus.
    pub fn validate_against(
        &self,
        staff: &[Person],
        shifts: &[ShiftDefinition],
    ) -> Result<(), ConfigError> {
        self.validate()?;

        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for person in staff {
            if !seen.insert(person.name.as_str()) {
                return Err(ConfigError::DuplicatePerson(person.name.clone()));
            }
        }

        let known: BTreeSet<&str> = shifts.iter().map(|s| s.name.as_str()).collect();
        for name in &self.half_day_shifts {
            if !known.contains(name.as_str()) {
                return Err(ConfigError::UnknownHalfDayShift(name.clone()));
            }
        }
        let named = self
            .scheduling_rules
            .iter()
            .flat_map(|r| r.weekday_requirements.iter().chain(&r.holiday_requirements));
        let legacy = self
            .weekday_requirements
            .iter()
            .chain(&self.holiday_requirements);
        for req in named.chain(legacy) {
            if !known.contains(req.shift.as_str()) {
                return Err(ConfigError::UnknownShift(req.shift.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RuleSetInfo {
    pub name: String,
    pub rules: Rules,
    pub path: PathBuf,
}

/// Gestion simple de jeux de règles nommés persistés sur disque.
#[derive(Debug, Clone)]
pub struct RuleSetStore {
    base_dir: PathBuf,
}

impl RuleSetStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            base_dir: dir.as_ref().to_path_buf(),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("creating rule-set directory {}", self.base_dir.display()))
    }

    pub fn save(&self, name: &str, rules: &Rules) -> Result<PathBuf> {
        rules.validate()?;
        self.ensure_dir()?;
        let path = self.base_dir.join(format!("{name}.json"));
        let json = serde_json::to_string_pretty(rules)?;
        fs::write(&path, json).with_context(|| format!("writing rule set {}", path.display()))?;
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<Rules> {
        let path = self.base_dir.join(format!("{name}.json"));
        let data =
            fs::read(&path).with_context(|| format!("reading rule set {}", path.display()))?;
        let rules: Rules = serde_json::from_slice(&data)
            .with_context(|| format!("parsing rule set {}", path.display()))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn list(&self) -> Result<Vec<RuleSetInfo>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }
        let mut infos = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let data = fs::read(&path)?;
            let rules: Rules = match serde_json::from_slice(&data) {
                Ok(r) => r,
                Err(err) => {
                    eprintln!("Warning: could not parse rule set {}: {err}", path.display());
                    continue;
                }
            };
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_owned();
            infos.push(RuleSetInfo { name, rules, path });
        }
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }
}

pub fn export_rules_json<P: AsRef<Path>>(path: P, rules: &Rules) -> Result<()> {
    let json = serde_json::to_string_pretty(rules)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_rules_from_file<P: AsRef<Path>>(path: P) -> Result<Rules> {
    let data = fs::read(&path)?;
    let rules: Rules = serde_json::from_slice(&data)?;
    rules.validate()?;
    Ok(rules)
}
