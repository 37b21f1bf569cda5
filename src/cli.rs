//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvContractSource;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::spread_csv_adapter::CsvSpreadStore;
use crate::domain::batch::{count_completed, FamilyOutcome};
use crate::domain::config_validation::validate_config;
use crate::domain::error::SpreadError;
use crate::domain::family::{parse_families, InstrumentFamily};
use crate::domain::spread::{build_families, SpreadTable};
use crate::domain::stationarity::{analyze_families, AdfSettings};
use crate::domain::stats::format_describe;
use crate::domain::summary::{build_summary, render_table, Locale, SummaryRow};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::ContractSource;
use crate::ports::report_port::ReportPort;
use crate::ports::spread_port::SpreadStore;

pub const DEFAULT_RAW_DIR: &str = ".";
pub const DEFAULT_SPREAD_DIR: &str = "data";
pub const DEFAULT_OUTPUT: &str = "cointegration_results.csv";

#[derive(Parser, Debug)]
#[command(
    name = "spreadcheck",
    about = "Stationarity tests for futures calendar spreads"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Join per-leg price files and persist each family's spread table
    Build {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma-separated family symbols, e.g. if,ih
        #[arg(long)]
        families: Option<String>,
    },
    /// Run ADF tests on persisted spread tables and write the summary report
    Analyze {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        families: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build, then analyze
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        families: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub raw_dir: PathBuf,
    pub spread_dir: PathBuf,
    pub families: Vec<InstrumentFamily>,
    pub adf: AdfSettings,
    pub output: PathBuf,
    pub locale: Locale,
    pub describe: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    let (config, families, output, build, analyze) = match cli.command {
        Command::Build { config, families } => (config, families, None, true, false),
        Command::Analyze {
            config,
            families,
            output,
        } => (config, families, output, false, true),
        Command::Run {
            config,
            families,
            output,
        } => (config, families, output, true, true),
    };

    let adapter = match load_config(config.as_ref()) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings = match build_settings(&adapter, families.as_deref(), output.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let source = CsvContractSource::new(settings.raw_dir.clone());
    let store = CsvSpreadStore::new(settings.spread_dir.clone());
    execute(&source, &store, &CsvReportAdapter, settings, build, analyze)
}

/// Run the requested stages against the given ports. When both stages run,
/// only families whose table was rebuilt are analyzed; a stale table left
/// by an earlier run is never reported.
pub fn execute(
    source: &dyn ContractSource,
    store: &dyn SpreadStore,
    report: &dyn ReportPort,
    mut settings: RunSettings,
    build: bool,
    analyze: bool,
) -> ExitCode {
    if build {
        let outcomes = run_build_stage(source, store, &settings);
        if count_completed(&outcomes) == 0 {
            error!("no spread tables were built");
            return ExitCode::from(3);
        }
        settings.families = outcomes
            .iter()
            .filter(|o| o.is_completed())
            .map(|o| o.family().clone())
            .collect();
    }

    if analyze {
        return match run_analyze_stage(store, report, &settings) {
            Ok(rows) if rows.is_empty() => {
                error!("no family could be analyzed");
                ExitCode::from(5)
            }
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("failed to write report: {e}");
                (&e).into()
            }
        };
    }

    ExitCode::SUCCESS
}

/// Load the INI file at `path`, or an empty config when none is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SpreadError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        error!("{err}");
        ExitCode::from(&err)
    })
}

pub fn build_settings(
    config: &dyn ConfigPort,
    families_override: Option<&str>,
    output_override: Option<&PathBuf>,
) -> Result<RunSettings, SpreadError> {
    validate_config(config)?;

    let families = match families_override.map(str::to_string).or_else(|| config.get_string("analysis", "families")) {
        Some(list) => parse_families(&list).map_err(|e| SpreadError::ConfigInvalid {
            section: "analysis".into(),
            key: "families".into(),
            reason: e.to_string(),
        })?,
        None => InstrumentFamily::defaults(),
    };

    let max_lag = config
        .get_string("analysis", "max_lag")
        .map(|v| v.trim().parse::<usize>())
        .transpose()
        .map_err(|e| SpreadError::ConfigInvalid {
            section: "analysis".into(),
            key: "max_lag".into(),
            reason: e.to_string(),
        })?;

    let locale = config
        .get_string("report", "locale")
        .map(|l| l.parse::<Locale>())
        .transpose()
        .map_err(|reason| SpreadError::ConfigInvalid {
            section: "report".into(),
            key: "locale".into(),
            reason,
        })?
        .unwrap_or_default();

    let output = output_override.cloned().unwrap_or_else(|| {
        PathBuf::from(
            config
                .get_string("report", "output")
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
        )
    });

    Ok(RunSettings {
        raw_dir: path_or(config, "data", "raw_dir", DEFAULT_RAW_DIR),
        spread_dir: path_or(config, "data", "spread_dir", DEFAULT_SPREAD_DIR),
        families,
        adf: AdfSettings { max_lag },
        output,
        locale,
        describe: config.get_bool("build", "describe", true),
    })
}

fn path_or(config: &dyn ConfigPort, section: &str, key: &str, default: &str) -> PathBuf {
    PathBuf::from(
        config
            .get_string(section, key)
            .unwrap_or_else(|| default.to_string()),
    )
}

/// Build every family's spread table and persist the ones that succeed. A
/// table that cannot be saved counts as a failed family.
pub fn run_build_stage(
    source: &dyn ContractSource,
    store: &dyn SpreadStore,
    settings: &RunSettings,
) -> Vec<FamilyOutcome<SpreadTable>> {
    build_families(source, &settings.families)
        .into_iter()
        .map(|outcome| match outcome {
            FamilyOutcome::Completed { family, value } => {
                if settings.describe {
                    println!("\n{family} descriptive statistics:");
                    print!("{}", format_describe(&value));
                }
                match store.save(&value) {
                    Ok(()) => {
                        info!(family = %family, "spread table saved");
                        FamilyOutcome::Completed { family, value }
                    }
                    Err(error) => {
                        warn!(family = %family, %error, "failed to save spread table");
                        FamilyOutcome::Failed { family, error }
                    }
                }
            }
            failed => failed,
        })
        .collect()
}

/// Test every family's persisted spreads, print the summary table and write
/// the report. Returns the summary rows that were written.
pub fn run_analyze_stage(
    store: &dyn SpreadStore,
    report: &dyn ReportPort,
    settings: &RunSettings,
) -> Result<Vec<SummaryRow>, SpreadError> {
    let outcomes = analyze_families(store, &settings.families, &settings.adf);
    let failed: Vec<String> = outcomes
        .iter()
        .filter(|o| !o.is_completed())
        .map(|o| o.family().to_string())
        .collect();
    if !failed.is_empty() {
        warn!(families = %failed.join(","), "excluded from summary");
    }

    let rows = build_summary(&outcomes, settings.locale);

    let rule = "=".repeat(80);
    println!("\n{rule}");
    println!("{}", summary_title(settings.locale));
    println!("{}", "-".repeat(80));
    print!("{}", render_table(&rows, settings.locale));
    println!("{rule}\n");

    write_report(report, &rows, settings.locale, &settings.output)?;
    Ok(rows)
}

fn write_report(
    report: &dyn ReportPort,
    rows: &[SummaryRow],
    locale: Locale,
    output: &Path,
) -> Result<(), SpreadError> {
    report.write(rows, locale, output)?;
    info!("report written to {}", output.display());
    Ok(())
}

fn summary_title(locale: Locale) -> &'static str {
    match locale {
        Locale::Zh => "期货价差平稳性检验结果汇总:",
        Locale::En => "Futures spread stationarity summary:",
    }
}
