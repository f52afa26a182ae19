use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use quality_engine::config::AppConfig;
use quality_engine::error::AppError;
use quality_engine::telemetry;
use quality_engine::templates::import::defects_from_path;
use quality_engine::templates::presets::{self, PresetKind};
use quality_engine::templates::{
    calculate_taint_fault_stats, AspectConfiguration, DefectCategory, DefectThresholds,
    QualityTemplate, TemplateValidator, ValidatorSettings,
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "quality-engine",
    about = "Validate coffee quality templates and browse the reference presets",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a quality template stored as JSON
    Validate(ValidateArgs),
    /// List the built-in presets
    Presets {
        /// Only list presets of this kind (defects, taint-fault, green-aspect, roast-aspect, cupping)
        #[arg(long)]
        kind: Option<String>,
    },
    /// Print one preset as JSON
    Preset {
        /// Preset kind
        kind: String,
        /// Preset key as shown by `presets`
        key: String,
    },
    /// Build a defect configuration from a laboratory CSV export (name,category,weight)
    ImportDefects(ImportDefectsArgs),
    /// Summarise the contents of a quality template
    Stats {
        /// Template JSON file
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Template JSON file
    file: PathBuf,
    /// Print the validation outcome as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ImportDefectsArgs {
    /// CSV file with name, category and weight columns
    csv: PathBuf,
    #[arg(long)]
    max_primary: Option<u32>,
    #[arg(long)]
    max_secondary: Option<u32>,
    #[arg(long)]
    max_total: Option<u32>,
}

#[derive(Debug, Serialize)]
struct TemplateSummary<'a> {
    name: Option<&'a str>,
    origin: &'a str,
    version: u32,
    is_active: bool,
    screen_sizes: usize,
    primary_defects: usize,
    secondary_defects: usize,
    green_aspect_wordings: usize,
    roast_aspect_wordings: usize,
    cupping_attributes: usize,
    required_cupping_attributes: usize,
    taints: usize,
    faults: usize,
    taint_fault_rules_active: bool,
    micro_region_requirements: usize,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Validate(args) => {
            let settings = ValidatorSettings::from(&config.engine);
            validate(args, settings, &config.engine.default_locale)
        }
        Command::Presets { kind } => list_presets(kind.as_deref()),
        Command::Preset { kind, key } => show_preset(&kind, &key),
        Command::ImportDefects(args) => import_defects(args),
        Command::Stats { file } => stats(&file, &config.engine.default_locale),
    }
}

fn read_template(path: &Path) -> Result<QualityTemplate, AppError> {
    let raw = fs::read_to_string(path)?;
    let template = serde_json::from_str(&raw)?;
    Ok(template)
}

fn validate(args: ValidateArgs, settings: ValidatorSettings, locale: &str) -> Result<(), AppError> {
    let template = read_template(&args.file)?;
    let outcome = TemplateValidator::new(settings).validate(&template);
    info!(
        file = %args.file.display(),
        valid = outcome.is_valid(),
        "validated template file"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "{} ({}, version {})",
            template.display_name(locale).unwrap_or("<unnamed>"),
            template.origin,
            template.version
        );
        for warning in &outcome.warnings {
            println!("warning: {warning}");
        }
        if outcome.is_valid() {
            println!("template is valid");
        }
    }

    if outcome.is_valid() {
        Ok(())
    } else {
        Err(AppError::InvalidTemplate(outcome.errors))
    }
}

fn list_presets(kind: Option<&str>) -> Result<(), AppError> {
    let filter = match kind {
        Some(raw) => Some(PresetKind::parse(raw).ok_or_else(|| AppError::UnknownPreset {
            kind: raw.to_string(),
            key: "*".to_string(),
        })?),
        None => None,
    };

    for info in presets::catalogue()
        .iter()
        .filter(|info| filter.map_or(true, |kind| info.kind == kind))
    {
        println!("{:<13} {:<23} {}", info.kind.label(), info.key, info.name);
    }
    Ok(())
}

fn show_preset(kind: &str, key: &str) -> Result<(), AppError> {
    let unknown = || AppError::UnknownPreset {
        kind: kind.to_string(),
        key: key.to_string(),
    };
    let parsed = PresetKind::parse(kind).ok_or_else(unknown)?;

    let rendered = match parsed {
        PresetKind::Defects => {
            serde_json::to_string_pretty(&presets::defect_preset(key).ok_or_else(unknown)?)?
        }
        PresetKind::TaintFault => {
            serde_json::to_string_pretty(&presets::taint_fault_preset(key).ok_or_else(unknown)?)?
        }
        PresetKind::GreenAspect | PresetKind::RoastAspect => {
            let preset = presets::presets_of(parsed)
                .find(|info| info.key == key)
                .and_then(|info| presets::aspect_preset(info.key))
                .ok_or_else(unknown)?;
            serde_json::to_string_pretty(&preset)?
        }
        PresetKind::Cupping => {
            serde_json::to_string_pretty(&presets::cupping_template(key).ok_or_else(unknown)?)?
        }
    };
    println!("{rendered}");
    Ok(())
}

fn import_defects(args: ImportDefectsArgs) -> Result<(), AppError> {
    let thresholds = DefectThresholds {
        max_primary: args.max_primary,
        max_secondary: args.max_secondary,
        max_total: args.max_total,
    };
    let config = defects_from_path(&args.csv, thresholds)?;

    for warning in config.thresholds.warnings() {
        warn!(file = %args.csv.display(), "{warning}");
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn stats(path: &Path, locale: &str) -> Result<(), AppError> {
    let template = read_template(path)?;
    let parameters = &template.parameters;

    let (primary_defects, secondary_defects) = parameters
        .defect_configuration
        .as_ref()
        .map_or((0, 0), |defects| {
            (
                defects.defects_in(DefectCategory::Primary).count(),
                defects.defects_in(DefectCategory::Secondary).count(),
            )
        });
    let taint_fault = parameters
        .taint_fault_configuration
        .as_ref()
        .map(calculate_taint_fault_stats);
    let wordings = |aspect: Option<&AspectConfiguration>| {
        aspect.map_or(0, |aspect| aspect.wordings.len())
    };

    let summary = TemplateSummary {
        name: template.display_name(locale),
        origin: &template.origin,
        version: template.version,
        is_active: template.is_active,
        screen_sizes: parameters.screen_size_requirements.len(),
        primary_defects,
        secondary_defects,
        green_aspect_wordings: wordings(parameters.green_aspect_configuration.as_ref()),
        roast_aspect_wordings: wordings(parameters.roast_aspect_configuration.as_ref()),
        cupping_attributes: parameters.cupping_attributes.attributes.len(),
        required_cupping_attributes: parameters.cupping_attributes.required_attributes().count(),
        taints: taint_fault.map_or(0, |stats| stats.taint_count),
        faults: taint_fault.map_or(0, |stats| stats.fault_count),
        taint_fault_rules_active: taint_fault.map_or(false, |stats| stats.has_active_rules),
        micro_region_requirements: parameters
            .micro_region_configuration
            .as_ref()
            .map_or(0, |config| config.requirements.len()),
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
