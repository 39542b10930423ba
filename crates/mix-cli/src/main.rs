use std::path::PathBuf;
use std::process::exit;

use clap::{ArgAction, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use mix_core::MixError;
use mix_store::{FsBackend, Platform, ScenarioUrl, VersionRef};
use mix_transform::{add_years, AddYearsOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scenario construction and evolution tools", long_about = None)]
struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// Root directory of the scenario store
    #[arg(long, default_value = "store")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extend a scenario's period horizon with new years
    AddYears {
        /// Base scenario URL: <platform>/<model>/<scenario>[#<version>]
        base: String,
        /// New periods, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        years_new: Vec<i32>,
        /// Model name of the extended scenario (defaults to the base model)
        #[arg(long)]
        model_new: Option<String>,
        /// Scenario name of the extended scenario
        #[arg(long, default_value = "extended")]
        scen_new: String,
        /// Re-point the first optimization period
        #[arg(long)]
        firstyear_new: Option<i32>,
        /// Re-point the last optimization period
        #[arg(long)]
        lastyear_new: Option<i32>,
        /// Restrict to these parameters (repeatable)
        #[arg(long = "parameter")]
        parameters: Vec<String>,
        /// Restrict to these regions (repeatable)
        #[arg(long = "region")]
        regions: Vec<String>,
        /// Overwrite parameters already populated on the target
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        rewrite: bool,
        /// Coerce commodity values to the modal unit before interpolation
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        unit_check: bool,
        /// Damping factor for sign-flipped extrapolations
        #[arg(long)]
        extrapol_neg: Option<f64>,
        /// Copy single data points instead of refusing to extrapolate
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        bound_extend: bool,
        /// Print the resolved arguments and exit without touching the store
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let Commands::AddYears {
        base,
        years_new,
        model_new,
        scen_new,
        firstyear_new,
        lastyear_new,
        parameters,
        regions,
        rewrite,
        unit_check,
        extrapol_neg,
        bound_extend,
        dry_run,
    } = cli.command;

    let url = match ScenarioUrl::parse(&base) {
        Ok(url) => url,
        Err(err) => {
            error!("invalid base scenario URL: {err}");
            exit(2);
        }
    };
    if url.version == VersionRef::New {
        error!("the base scenario must already exist; '#new' is not a valid base");
        exit(2);
    }

    let opts = AddYearsOptions {
        years_new: years_new.clone(),
        firstyear_new,
        lastyear_new,
        macro_mode: false,
        parameters: (!parameters.is_empty()).then_some(parameters),
        regions: (!regions.is_empty()).then_some(regions),
        rewrite,
        unit_check,
        extrapol_neg,
        bound_extend,
    };
    let model_new = model_new.unwrap_or_else(|| url.model.clone());

    if dry_run {
        println!("base     : {base}");
        println!("target   : {model_new}/{scen_new}");
        println!("options  : {opts:#?}");
        return;
    }

    if let Err(err) = run(&cli.store, &url, &model_new, &scen_new, &opts) {
        match err.downcast_ref::<MixError>() {
            Some(MixError::NotFound(what)) => {
                error!("base scenario not found: {what}");
                exit(2);
            }
            _ => {
                error!("add-years failed: {err:?}");
                exit(1);
            }
        }
    }
}

fn run(
    store: &PathBuf,
    url: &ScenarioUrl,
    model_new: &str,
    scen_new: &str,
    opts: &AddYearsOptions,
) -> anyhow::Result<()> {
    let backend = FsBackend::new(store)?;
    let mut platform = Platform::open(backend)?;

    let version = match url.version {
        VersionRef::Number(v) => Some(v),
        _ => None,
    };
    let source = platform.open_scenario(&url.model, &url.scenario, version)?;
    info!(source = %source.id(), "loaded base scenario");

    let mut target = platform.create(model_new, scen_new, source.scheme())?;
    target.commit("created by add-years")?;
    add_years(&source, &mut target, opts)?;
    platform.store(&target)?;
    info!(target = %target.id(), "extended scenario stored");
    Ok(())
}
