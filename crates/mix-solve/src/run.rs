//! Solver hand-off.
//!
//! The core does not optimize; it prepares the model directory (option
//! files, serialized solver input with a version marker), builds the
//! runner's argument list, and classifies the outcome. The runner itself
//! is backend-supplied and opaque.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use mix_core::registry::registry;
use mix_core::{MixError, Scenario, Scheme};

use crate::options::CplexOptions;

/// Version marker written into every solver input; the external model
/// rejects inputs from an incompatible core.
pub const MESSAGE_IX_VERSION: (u32, u32) = (2, 0);

/// Runner return codes classified as infeasibility rather than
/// infrastructure failure (GAMS model statuses 4, 5, 19 as mapped by the
/// runner).
const INFEASIBLE_RETURN_CODES: &[i32] = &[4, 5, 19];

/// Solver outcome classification.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("model is infeasible (solver return code {code}, {elapsed:?})")]
    Infeasible { code: i32, elapsed: Duration },
    #[error("solver infrastructure failure (return code {code}, {elapsed:?})")]
    Infrastructure { code: i32, elapsed: Duration },
    #[error("solver input rejected: {0}")]
    Input(#[from] MixError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Successful solve metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveReport {
    pub return_code: i32,
    pub elapsed: Duration,
}

/// Backend-supplied solver process.
pub trait SolverRunner {
    /// Run the solver with the prepared argument list; returns the solver
    /// return code.
    fn run(&mut self, args: &[String]) -> std::io::Result<i32>;
}

/// MACRO iteration settings, passed through as scheme-specific flags.
#[derive(Debug, Clone, Default)]
pub struct MacroSettings {
    pub concurrent: bool,
    pub cap_comm: bool,
    pub convergence_criterion: Option<f64>,
    pub max_adjustment: Option<f64>,
    pub max_iteration: Option<u32>,
}

/// One solve invocation.
#[derive(Debug, Clone)]
pub struct SolveConfig {
    /// Backend model directory; option files and solver I/O live here.
    pub model_dir: PathBuf,
    pub options: CplexOptions,
    pub macro_settings: MacroSettings,
}

impl SolveConfig {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            options: CplexOptions::default(),
            macro_settings: MacroSettings::default(),
        }
    }

    fn stem(&self, scn: &Scenario) -> PathBuf {
        self.model_dir
            .join(format!("{}_{}", sanitize(&scn.model), sanitize(&scn.scenario)))
    }

    pub fn input_path(&self, scn: &Scenario) -> PathBuf {
        self.stem(scn).with_extension("in.json")
    }

    pub fn output_path(&self, scn: &Scenario) -> PathBuf {
        self.stem(scn).with_extension("out.json")
    }

    pub fn iteration_path(&self, scn: &Scenario) -> PathBuf {
        self.stem(scn).with_extension("iter.json")
    }
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Check the storage items before building solver input. Non-empty items
/// with dimension names diverging from the registry are fatal; empty
/// divergent ones are dropped and re-initialized.
pub fn preflight_storage_items(scn: &mut Scenario) -> Result<(), MixError> {
    scn.transact("re-initialize divergent storage items", |scn| {
        for name in ["storage_initial", "storage_self_discharge", "map_tec_storage"] {
            let Some(item) = registry().lookup(name) else {
                continue;
            };
            let Some(existing) = scn.item(name) else {
                continue;
            };
            if existing.dims() == item.dims.as_slice() {
                continue;
            }
            if existing.is_empty() {
                warn!(item = name, "empty storage item has divergent dims; re-initializing");
                scn.drop_item(name)?;
                scn.init_item(item)?;
            } else {
                return Err(MixError::Schema(format!(
                    "storage item '{name}' has dimension names {:?} but the registry \
                     requires {:?}; migrate or clear the data before solving",
                    existing.dims(),
                    item.dims
                )));
            }
        }
        Ok(())
    })
}

/// Serialize the scenario plus the version marker as solver input.
pub fn write_solver_input(scn: &Scenario, path: &Path) -> Result<()> {
    let payload = json!({
        "MESSAGE_ix_version": {
            "major": MESSAGE_IX_VERSION.0,
            "minor": MESSAGE_IX_VERSION.1,
        },
        "scenario": scn,
    });
    let text = serde_json::to_string_pretty(&payload)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// The runner's argument list for one scenario.
pub fn solver_args(scn: &Scenario, config: &SolveConfig) -> Vec<String> {
    let mut args = vec![
        format!("--in={}", config.input_path(scn).display()),
        format!("--out={}", config.output_path(scn).display()),
        format!("--iter={}", config.iteration_path(scn).display()),
    ];
    if scn.scheme() == Scheme::MessageMacro {
        let m = &config.macro_settings;
        args.push(format!("--MACRO_CONCURRENT={}", m.concurrent as u8));
        args.push(format!("--MESSAGE_CAP_COMM={}", m.cap_comm as u8));
        if let Some(criterion) = m.convergence_criterion {
            args.push(format!("--CONVERGENCE_CRITERION={criterion}"));
        }
        if let Some(adjustment) = m.max_adjustment {
            args.push(format!("--MAX_ADJUSTMENT={adjustment}"));
        }
        if let Some(iterations) = m.max_iteration {
            args.push(format!("--MAX_ITERATION={iterations}"));
        }
    }
    args
}

/// Prepare the model directory and invoke the runner.
///
/// The scenario must be committed. Option files in a shared model
/// directory race between concurrent solves with last-writer-wins
/// semantics; callers accepting that run concurrently at their own risk.
pub fn solve(
    scn: &mut Scenario,
    runner: &mut dyn SolverRunner,
    config: &SolveConfig,
) -> Result<SolveReport, SolveError> {
    if scn.is_checked_out() {
        return Err(MixError::Transaction(format!(
            "scenario {} must be committed before solving",
            scn.id()
        ))
        .into());
    }
    preflight_storage_items(scn).map_err(SolveError::Input)?;
    config
        .options
        .write(&config.model_dir)
        .map_err(|err| SolveError::Input(MixError::Other(err.to_string())))?;
    write_solver_input(scn, &config.input_path(scn))
        .map_err(|err| SolveError::Input(MixError::Other(err.to_string())))?;

    let args = solver_args(scn, config);
    let start = Instant::now();
    let code = runner.run(&args)?;
    let elapsed = start.elapsed();

    if code == 0 {
        info!(scenario = %scn.id(), ?elapsed, "solve finished");
        Ok(SolveReport {
            return_code: code,
            elapsed,
        })
    } else if INFEASIBLE_RETURN_CODES.contains(&code) {
        Err(SolveError::Infeasible { code, elapsed })
    } else {
        Err(SolveError::Infrastructure { code, elapsed })
    }
}
