//! HondaTune - command line front end
//!
//! Validates datalog exports, produces simulated logs and builds or runs tuning
//! analysis requests. Logs go to stderr so stdout stays usable in pipes.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use hondatune::analysis::{
    AnalysisRequest, Analyst, EngineType, HardwareSetup, OfflineBackend,
};
use hondatune::datalog::Datalog;
use hondatune::settings::AiSettings;
use hondatune::simulator::{self, catalogue, Scenario};

#[derive(Parser)]
#[command(name = "hondatune", version, about = "Hondata datalog validation and tuning assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the simulated fault scenarios
    Scenarios,

    /// Generate a simulated datalog
    Simulate {
        /// Scenario identifier (see `scenarios`)
        scenario: Scenario,

        /// Seed for reproducible jitter
        #[arg(long)]
        seed: Option<u64>,

        /// Write the CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a datalog CSV file
    Validate {
        file: PathBuf,

        /// Print the valid rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the analysis prompt for a datalog
    Prompt(RequestArgs),

    /// Run tuning analysis on a datalog
    Analyze(RequestArgs),

    /// Show or change AI settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the current provider and credential status
    Show,
    /// Store the Gemini API key
    SetKey { key: String },
    /// Select the AI provider (cloud or local)
    SetProvider { provider: String },
    /// Set the path to the local model file
    SetModelPath { path: PathBuf },
}

#[derive(Args)]
struct RequestArgs {
    /// Datalog CSV file
    #[arg(required_unless_present = "scenario", conflicts_with = "scenario")]
    file: Option<PathBuf>,

    /// Use a simulated datalog instead of a file
    #[arg(long)]
    scenario: Option<Scenario>,

    /// Seed for the simulated datalog
    #[arg(long, requires = "scenario")]
    seed: Option<u64>,

    #[arg(long, default_value = "na")]
    engine_type: EngineType,

    /// Engine details (displacement, cams, injectors, ...)
    #[arg(long, default_value = "")]
    engine_setup: String,

    /// Turbo or induction details
    #[arg(long, default_value = "")]
    turbo_setup: String,
}

impl RequestArgs {
    fn load_csv(&self) -> Result<String> {
        match (&self.file, self.scenario) {
            (Some(path), _) => read_datalog(path),
            (None, Some(scenario)) => Ok(simulate(scenario, self.seed)),
            (None, None) => bail!("Please upload or generate a datalog file first."),
        }
    }

    fn to_request(&self) -> Result<AnalysisRequest> {
        let setup = HardwareSetup {
            engine_type: self.engine_type,
            engine_setup: self.engine_setup.clone(),
            turbo_setup: self.turbo_setup.clone(),
        };
        Ok(AnalysisRequest::new(self.load_csv()?, setup)?)
    }
}

fn read_datalog(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn simulate(scenario: Scenario, seed: Option<u64>) -> String {
    match seed {
        Some(seed) => simulator::simulate_seeded(scenario, seed),
        None => simulator::simulate(scenario),
    }
}

fn run_validate(file: &Path, json: bool) -> Result<()> {
    let text = read_datalog(file)?;
    let log = match Datalog::parse(&text) {
        Ok(log) => log,
        Err(e) => {
            tracing::warn!("{}", e);
            bail!("{}", e.user_hint());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&log.ordered_rows())?);
        return Ok(());
    }

    println!(
        "{}: {} valid rows ({} dropped), {} columns",
        file.display(),
        log.len(),
        log.dropped(),
        log.columns().len()
    );
    for summary in log.summarize() {
        println!(
            "  {:<16} min {:>9.2}  max {:>9.2}  avg {:>9.2}",
            summary.name, summary.min, summary.max, summary.avg
        );
    }
    Ok(())
}

fn run_config(command: ConfigCommand) -> Result<()> {
    let mut settings = AiSettings::load();

    match command {
        ConfigCommand::Show => {
            let status = settings.status();
            println!("provider:        {}", status.current_provider);
            println!("gemini key:      {}", if status.has_gemini_key { "configured" } else { "not set" });
            match settings.local_model_path() {
                Some(path) => println!(
                    "local model:     {} ({})",
                    path.display(),
                    if status.has_local_model { "found" } else { "missing" }
                ),
                None => println!("local model:     not set"),
            }
            return Ok(());
        }
        ConfigCommand::SetKey { key } => settings.set_gemini_key(&key)?,
        ConfigCommand::SetProvider { provider } => settings.set_provider_name(&provider)?,
        ConfigCommand::SetModelPath { path } => settings.set_local_model_path(path),
    }

    let path = settings.save()?;
    println!("Saved settings to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Scenarios => {
            for descriptor in catalogue() {
                println!(
                    "{:<22} {:<22} {}",
                    descriptor.scenario.as_ref(), descriptor.name, descriptor.description
                );
            }
        }
        Command::Simulate {
            scenario,
            seed,
            output,
        } => {
            let csv = simulate(scenario, seed);
            match output {
                Some(path) => {
                    std::fs::write(&path, &csv)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Wrote {} datalog to {:?}", scenario, path);
                }
                None => println!("{}", csv),
            }
        }
        Command::Validate { file, json } => run_validate(&file, json)?,
        Command::Prompt(args) => println!("{}", args.to_request()?.to_prompt_text()),
        Command::Analyze(args) => {
            let request = args.to_request()?;
            let settings = AiSettings::load();
            let suggestions = Analyst::new(&settings).run(&request, &OfflineBackend)?;
            print!("{}", suggestions);
        }
        Command::Config(command) => run_config(command)?,
    }

    Ok(())
}
