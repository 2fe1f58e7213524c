use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use mpi_cli::logging::redact_value;
use mpi_cli::output::{OutputPaths, write_outputs};
use mpi_core::{FederationConfig, FederationError, FederationOutput, run_federation};

use crate::cli::{CheckArgs, IntegrateArgs};
use crate::summary::print_config;

pub struct IntegrateResult {
    pub federation: Option<String>,
    pub output: FederationOutput,
    pub failures: Vec<FederationError>,
    /// `None` on a dry run.
    pub outputs: Option<OutputPaths>,
}

impl IntegrateResult {
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub fn run_integrate(args: &IntegrateArgs) -> Result<IntegrateResult> {
    let config = load_config(&args.config)?;
    let span = info_span!(
        "integrate",
        federation = config.name.as_deref().unwrap_or("unnamed")
    );
    let _guard = span.enter();

    let (output, failures) = run_federation(&config);
    for link in output.links() {
        let (Some(left), Some(right)) = (
            output.records.get(link.left.index()),
            output.records.get(link.right.index()),
        ) else {
            continue;
        };
        let left_name = left.full_name().unwrap_or_default();
        let right_name = right.full_name().unwrap_or_default();
        debug!(
            left = %link.left,
            right = %link.right,
            left_name = redact_value(&left_name),
            right_name = redact_value(&right_name),
            outcome = link.decision.outcome.as_str(),
            score = link.decision.score,
            "linked pair"
        );
    }

    let outputs = if args.dry_run {
        info!("dry run, skipping output files");
        None
    } else {
        let dir = output_dir(args);
        let paths = write_outputs(&dir, &output, config.name.as_deref(), chrono::Utc::now())?;
        info!(dir = %dir.display(), "outputs written");
        Some(paths)
    };

    Ok(IntegrateResult {
        federation: config.name,
        output,
        failures,
        outputs,
    })
}

pub fn run_check(args: &CheckArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    if let Some(name) = &config.name {
        println!("Federation: {name}");
    }
    print_config(&config);
    Ok(())
}

fn load_config(path: &Path) -> Result<FederationConfig> {
    FederationConfig::load(path)
        .with_context(|| format!("load federation config {}", path.display()))
}

fn output_dir(args: &IntegrateArgs) -> PathBuf {
    args.output_dir.clone().unwrap_or_else(|| {
        args.config
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("output")
    })
}
