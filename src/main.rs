//! Circuit Sound CLI
//!
//! Command-line interface for the circuit labs.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use circuit_sound::cli::{commands, Cli, Commands};
use circuit_sound::config::LabConfig;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("Circuit Sound v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(cli) {
        error!("{:#}", err);
        if let Some(lab_err) = err.downcast_ref::<circuit_sound::LabError>() {
            eprintln!("[{}] {}", lab_err.error_code(), lab_err.recovery_hint());
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = LabConfig::load_or_default(cli.config.as_deref())
        .with_context(|| format!("failed to load configuration {:?}", cli.config))?;

    match cli.command {
        Commands::LowPass {
            sample,
            resistance,
            capacitance_uf,
            output,
        } => commands::low_pass(&config, sample.as_deref(), resistance, capacitance_uf, &output)?,
        Commands::Resonance {
            sample,
            inductance_mh,
            capacitance_uf,
            output,
        } => commands::resonance(
            &config,
            sample.as_deref(),
            inductance_mh,
            capacitance_uf,
            &output,
        )?,
        Commands::Thermal {
            circuit,
            note,
            frequency,
            output,
        } => commands::thermal(&config, &circuit, note, frequency, &output)?,
        Commands::Keys {
            keys,
            interval_ms,
            circuit,
            output,
        } => commands::keys(&config, &keys, interval_ms, &circuit, &output)?,
        Commands::Run { preset, output } => commands::run_preset(&config, &preset, &output)
            .with_context(|| format!("preset {}", preset.display()))?,
        Commands::Notes => commands::list_notes()?,
        Commands::InitConfig { path } => commands::init_config(&path)?,
    }

    Ok(())
}
