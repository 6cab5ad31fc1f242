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

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qenergia-sim")]
#[command(about = "Solar kit quotes from the command line", version)]
#[command(
    long_about = "Run the QEnergia quote engine without the web front end.\n\
    \nQuotes a single consumption, lists the kit catalog, or sweeps a range of\n\
    consumptions to see where the recommended kit changes.\n\
    \nExamples:\n  \
    qenergia-sim quote --consumption 450\n  \
    qenergia-sim quote --consumption 337.50 --bill --roof metal\n  \
    qenergia-sim kits --catalog kits.toml\n  \
    qenergia-sim sweep --from 100 --to 5000 --step 250 --output both --csv-path sweep.csv"
)]
pub struct Cli {
    /// Kit catalog in TOML; the standard catalog when omitted
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog: Option<String>,

    /// Output language (pt-br, en)
    #[arg(long, global = true, default_value = "pt-br")]
    pub language: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quote a single consumption
    #[command(
        long_about = "Validate the input exactly like the web form and print the quote.\n\
        \nExamples:\n  \
        qenergia-sim quote --consumption 450 --name \"Maria Souza\" --city Fortaleza\n  \
        qenergia-sim quote --consumption 337.50 --bill"
    )]
    Quote(QuoteArgs),

    /// Print the kit catalog
    Kits,

    /// Quote a range of monthly consumptions
    #[command(
        long_about = "Simulate every consumption from --from to --to in --step increments.\n\
        \nConsumptions no kit can cover are reported as custom quotes.\n\
        \nExamples:\n  \
        qenergia-sim sweep --from 100 --to 2000 --step 100\n  \
        qenergia-sim sweep --from 1000 --to 15000 --step 500 --output csv --csv-path big.csv"
    )]
    Sweep(SweepArgs),
}

#[derive(Parser)]
pub struct QuoteArgs {
    /// Monthly consumption in kWh, or the bill in BRL with --bill
    #[arg(long)]
    pub consumption: f64,

    /// Treat --consumption as the monthly bill amount
    #[arg(long, default_value_t = false)]
    pub bill: bool,

    #[arg(long, default_value = "Cliente")]
    pub name: String,

    #[arg(long, default_value = "Fortaleza")]
    pub city: String,

    /// Roof type (ceramic_tile, fiber_cement, metal)
    #[arg(long, default_value = "ceramic_tile")]
    pub roof: String,
}

#[derive(Parser)]
pub struct SweepArgs {
    /// First consumption (kWh/month)
    #[arg(long, default_value_t = 100.0)]
    pub from: f64,

    /// Last consumption (kWh/month), inclusive
    #[arg(long, default_value_t = 5000.0)]
    pub to: f64,

    /// Increment between consumptions (kWh/month)
    #[arg(long, default_value_t = 100.0)]
    pub step: f64,

    /// Output format: table, csv, or both
    #[arg(long, default_value = "table",
          value_parser = ["table", "csv", "both"],
          help = "How to display results")]
    pub output: String,

    /// CSV file path (required when output is csv or both)
    #[arg(long, value_name = "PATH")]
    pub csv_path: Option<String>,
}
