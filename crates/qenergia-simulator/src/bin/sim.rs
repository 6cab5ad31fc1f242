// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of QEnergia.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use qenergia_core::catalog::Catalog;
use qenergia_core::format::NumberFormat;
use qenergia_core::simulator::{SimulationOutcome, Simulator};
use qenergia_i18n::{I18n, Language};
use qenergia_simulator::cli::{Cli, Commands, CsvFormatter, QuoteArgs, SweepArgs, TableFormatter};
use qenergia_simulator::run_sweep;
use qenergia_types::{ConsumptionInput, SimulationRequest};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let language: Language = cli.language.parse()?;
    let i18n = I18n::new(language)?;
    let catalog = load_catalog(cli.catalog.as_deref())?;
    let simulator = Simulator::new(Arc::new(catalog));

    match cli.command {
        Commands::Quote(args) => quote_command(&simulator, &i18n, &args),
        Commands::Kits => {
            print!("{}", TableFormatter::new(&i18n).format_kits(simulator.catalog()));
            Ok(())
        }
        Commands::Sweep(args) => sweep_command(&simulator, &i18n, &args),
    }
}

fn load_catalog(path: Option<&str>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::standard());
    };

    let catalog = Catalog::from_toml_file(path)
        .with_context(|| format!("Failed to load kit catalog from {path}"))?;
    for warning in catalog.warnings() {
        warn!(%warning, "Kit catalog convention breached");
    }
    Ok(catalog)
}

fn quote_command(simulator: &Simulator, i18n: &I18n, args: &QuoteArgs) -> Result<()> {
    let request = SimulationRequest {
        name: args.name.clone(),
        city: args.city.clone(),
        consumption: if args.bill {
            ConsumptionInput::Bill(args.consumption)
        } else {
            ConsumptionInput::Energy(args.consumption)
        },
        roof_type: args.roof.clone(),
    };

    let input = match simulator.validate(&request) {
        Ok(input) => input,
        Err(report) => {
            eprintln!("{}", i18n.text("validation-summary"));
            for issue in report.localize(i18n) {
                eprintln!("  - {}: {}", issue.field, issue.message);
            }
            bail!("invalid input");
        }
    };

    match simulator.simulate(&input) {
        SimulationOutcome::Quoted(result) => {
            print!("{}", TableFormatter::new(i18n).format_quote(&input, &result));
        }
        SimulationOutcome::CustomQuoteRequired {
            required_generation_kwh,
        } => {
            let numbers = NumberFormat::for_language(i18n.language());
            println!("{}", i18n.text("outcome-custom-quote"));
            println!(
                "{}: {} {}",
                i18n.text("results-required-generation"),
                numbers.number(f64::from(required_generation_kwh)),
                i18n.text("unit-kwh-month")
            );
        }
    }
    Ok(())
}

fn sweep_command(simulator: &Simulator, i18n: &I18n, args: &SweepArgs) -> Result<()> {
    if args.output != "table" && args.csv_path.is_none() {
        bail!("--csv-path is required when --output is '{}'", args.output);
    }

    let rows = run_sweep(simulator, args.from, args.to, args.step)?;

    if args.output == "table" || args.output == "both" {
        print!("{}", TableFormatter::new(i18n).format_sweep(&rows));
    }
    if args.output != "table" {
        if let Some(path) = args.csv_path.as_deref() {
            CsvFormatter::write_sweep(&rows, path)?;
            println!("CSV written to {path}");
        }
    }
    Ok(())
}
