use crate::catalogue::ScryfallClient;
use crate::config::{check_labels_per_sheet, load_config};
use crate::generator::LabelGenerator;
use crate::symbols::LabelKind;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "mtglabels", version, about = "Printable MTG collection labels")]
pub struct Args {
    /// Set codes to print; implies no set filtering. Only used with --type sets
    #[arg(value_name = "SET")]
    pub sets: Vec<String>,

    /// Labels per sheet
    #[arg(long = "labels-per-sheet", value_parser = parse_labels_per_sheet)]
    pub labels_per_sheet: Option<usize>,

    /// Which labels to print
    #[arg(short = 't', long = "type", value_enum)]
    pub kind: Option<LabelKind>,

    /// Vertical print offset, in tenths of a millimetre
    #[arg(long = "offset-y", allow_negative_numbers = true)]
    pub offset_y: Option<f32>,

    /// Repeat the labels until the last sheet is full
    #[arg(long)]
    pub repeat: bool,

    /// Draw label boundaries for calibration prints
    #[arg(long)]
    pub outline: bool,

    /// Output directory
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Config JSON file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn parse_labels_per_sheet(value: &str) -> Result<usize, String> {
    let parsed: usize = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    check_labels_per_sheet(parsed).map_err(|err| err.to_string())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "mtg_labels=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Keep a subscriber that is already installed.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())
        .with_context(|| match &args.config {
            Some(path) => format!("failed to load config {}", path.display()),
            None => "failed to load config".to_string(),
        })?;
    if let Some(value) = args.labels_per_sheet {
        config.sheet.labels_per_sheet = value;
    }
    if let Some(value) = args.offset_y {
        config.sheet.offset_y = value;
    }
    if let Some(kind) = args.kind {
        config.render.kind = kind;
    }
    if let Some(dir) = &args.output_dir {
        config.render.output_dir = dir.clone();
    }
    config.render.repeat |= args.repeat;
    config.render.outline |= args.outline;

    if !args.sets.is_empty() && config.render.kind != LabelKind::Sets {
        warn!("Set codes are only used with --type sets; ignoring them");
    }

    let client = ScryfallClient::new(&config.assets)?;
    let mut generator = LabelGenerator::new(config, &client);
    if let Some(path) = &args.dump_layout {
        generator = generator.with_layout_dump(path);
    }

    let report = generator.generate(&args.sets)?;
    match &report.combined {
        Some(path) => info!(
            "{} labels on {} pages, combined into {}",
            report.labels,
            report.pages,
            path.display()
        ),
        None => info!("{} labels on {} pages", report.labels, report.pages),
    }
    if report.skipped > 0 {
        warn!("{} labels skipped for missing artwork", report.skipped);
    }
    Ok(())
}
