#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use roulement::{
    audit_coverage, engine::to_date_view, io, load_rules_from_file,
    model::{Assignment, Schedule, ScheduleEntry},
    storage::{JsonStorage, PlanningFile, Storage},
    Engine,
};
use std::collections::BTreeMap;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de génération de plannings (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de données de planification
    #[arg(long, global = true, default_value = "planning.json")]
    data: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer l'effectif depuis un CSV (`name,employee_id[,group]`)
    ImportStaff {
        #[arg(long)]
        csv: String,
    },

    /// Importer les définitions de créneaux depuis un CSV (`name,start,end[,color]`)
    ImportShifts {
        #[arg(long)]
        csv: String,
    },

    /// Importer l'historique pré-période depuis un CSV (`person,date,shift`)
    ImportHistory {
        #[arg(long)]
        csv: String,
    },

    /// Charger un jeu de règles depuis un fichier JSON
    SetRules {
        #[arg(long)]
        json: String,
    },

    /// Générer le planning de la période (bornes ISO `yyyy-MM-dd` incluses)
    Generate {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },

    /// Lister le dernier planning généré et optionnellement l'exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier la couverture du dernier planning sur une période
    Check {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Export CSV des écarts (optionnel)
        #[arg(long)]
        report: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.data)?;

    let code = match cli.cmd {
        Commands::ImportStaff { csv } => {
            let staff = io::import_staff_csv(csv)?;
            let mut file = storage.load_file().unwrap_or_default();
            file.staff.extend(staff);
            storage.save_file(&file)?;
            0
        }
        Commands::ImportShifts { csv } => {
            let shifts = io::import_shift_definitions_csv(csv)?;
            let mut file = storage.load_file().unwrap_or_default();
            file.shift_definitions.extend(shifts);
            storage.save_file(&file)?;
            0
        }
        Commands::ImportHistory { csv } => {
            let history = io::import_history_csv(csv)?;
            let mut file = storage.load_file().unwrap_or_default();
            for (person, days) in history {
                file.history.entry(person).or_default().extend(days);
            }
            storage.save_file(&file)?;
            0
        }
        Commands::SetRules { json } => {
            let rules = load_rules_from_file(json)?;
            let mut file = storage.load_file().unwrap_or_default();
            rules.validate_against(&file.staff, &file.shift_definitions)?;
            file.rules = rules;
            storage.save_file(&file)?;
            0
        }
        Commands::Generate { start, end } => {
            let start: NaiveDate = start.parse()?;
            let end: NaiveDate = end.parse()?;
            let staff = storage.load_staff()?;
            let shifts = storage.load_shift_definitions()?;
            let rules = storage.load_rules()?;
            let history = storage.load_schedule_history(start)?;
            if staff.is_empty() {
                bail!("aucun membre importé (import-staff d'abord)");
            }
            rules.validate_against(&staff, &shifts)?;

            let (schedule, diagnostic) =
                Engine::new(&staff, &shifts, &rules, &history, start, end).run();
            if !diagnostic.is_empty() {
                eprintln!("engine diagnostic: {diagnostic}");
            }

            // persiste sous forme réduite (noms de shift)
            let mut file = storage.load_file()?;
            file.schedule = schedule
                .iter()
                .map(|(person, entry)| {
                    let days = entry
                        .days
                        .iter()
                        .map(|(date, a)| (*date, a.as_name(&rules.rest_shift_name).to_owned()))
                        .collect();
                    (person.clone(), days)
                })
                .collect();
            storage.save_file(&file)?;

            // impression compacte par date
            for (date, assignments) in to_date_view(&schedule, &rules) {
                let line = assignments
                    .iter()
                    .map(|pa| format!("{}={}", pa.person, pa.shift))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{date} | {line}");
            }

            let gaps = audit_coverage(&schedule, &staff, &rules, start, end);
            if gaps.is_empty() {
                0
            } else {
                eprintln!("Found {} coverage gap(s)", gaps.len());
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::List { out_json, out_csv } => {
            let file = storage.load_file()?;
            let schedule = stored_schedule(&file);
            let view = to_date_view(&schedule, &file.rules);
            if let Some(path) = out_json {
                io::export_schedule_json(path, &view)?;
            }
            if let Some(path) = out_csv {
                io::export_schedule_csv(path, &view)?;
            }
            for (date, assignments) in &view {
                for pa in assignments {
                    println!("{date} | {} | {}", pa.person, pa.shift);
                }
            }
            0
        }
        Commands::Check { start, end, report } => {
            let start: NaiveDate = start.parse()?;
            let end: NaiveDate = end.parse()?;
            let file = storage.load_file()?;
            let schedule = stored_schedule(&file);
            let gaps = audit_coverage(&schedule, &file.staff, &file.rules, start, end);
            if gaps.is_empty() {
                println!("OK: full coverage");
                0
            } else {
                eprintln!("Found {} coverage gap(s)", gaps.len());
                if let Some(path) = report {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["date", "rule", "shift", "required", "assigned"])?;
                    for gap in &gaps {
                        w.write_record([
                            gap.date.format("%Y-%m-%d").to_string().as_str(),
                            gap.rule.as_str(),
                            gap.shift.as_str(),
                            gap.required.to_string().as_str(),
                            gap.assigned.to_string().as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                2
            }
        }
    };

    std::process::exit(code);
}

/// Reconstruit le planning typé depuis la forme réduite persistée.
fn stored_schedule(file: &PlanningFile) -> Schedule {
    file.schedule
        .iter()
        .map(|(person, days)| {
            let days: BTreeMap<NaiveDate, Assignment> = days
                .iter()
                .map(|(date, name)| {
                    (*date, Assignment::from_name(name, &file.rules.rest_shift_name))
                })
                .collect();
            (person.clone(), ScheduleEntry { days })
        })
        .collect()
}
