use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::config::Rules;
use crate::model::{Person, ScheduleHistory, ShiftDefinition};

/// Collaborateurs de lecture du cœur. L'implémentation (fichier, base, etc.)
/// reste hors du moteur : lui ne voit que ces quatre chargements.
pub trait Storage {
    fn load_staff(&self) -> anyhow::Result<Vec<Person>>;
    fn load_shift_definitions(&self) -> anyhow::Result<Vec<ShiftDefinition>>;
    fn load_rules(&self) -> anyhow::Result<Rules>;
    /// Historique strictement antérieur à `before`.
    fn load_schedule_history(&self, before: NaiveDate) -> anyhow::Result<ScheduleHistory>;
}

/// Contenu du fichier de données unique (JSON).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningFile {
    #[serde(default)]
    pub staff: Vec<Person>,
    #[serde(default)]
    pub shift_definitions: Vec<ShiftDefinition>,
    #[serde(default)]
    pub rules: Rules,
    /// personne → date → nom de shift, pour les contraintes qui franchissent
    /// le bord de période.
    #[serde(default)]
    pub history: ScheduleHistory,
    /// Dernier planning généré, sous forme réduite (noms de shift).
    #[serde(default)]
    pub schedule: BTreeMap<String, BTreeMap<NaiveDate, String>>,
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn load_file(&self) -> anyhow::Result<PlanningFile> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let file: PlanningFile =
            serde_json::from_slice(&data).with_context(|| "parsing planning file")?;
        Ok(file)
    }

    /// Sauvegarde atomique (fichier temporaire + renommage).
    pub fn save_file(&self, file: &PlanningFile) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(file)?;
        let mut tmp = NamedTempFile::new_in(self.path.parent().unwrap_or_else(|| Path::new(".")))
            .with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

impl Storage for JsonStorage {
    fn load_staff(&self) -> anyhow::Result<Vec<Person>> {
        Ok(self.load_file()?.staff)
    }

    fn load_shift_definitions(&self) -> anyhow::Result<Vec<ShiftDefinition>> {
        Ok(self.load_file()?.shift_definitions)
    }

    fn load_rules(&self) -> anyhow::Result<Rules> {
        Ok(self.load_file()?.rules)
    }

    fn load_schedule_history(&self, before: NaiveDate) -> anyhow::Result<ScheduleHistory> {
        let mut history = self.load_file()?.history;
        for days in history.values_mut() {
            days.retain(|date, _| *date < before);
        }
        history.retain(|_, days| !days.is_empty());
        Ok(history)
    }
}
