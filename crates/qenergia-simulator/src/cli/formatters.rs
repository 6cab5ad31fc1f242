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

use std::fmt::Write as _;

use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, presets::UTF8_FULL};
use qenergia_core::catalog::Catalog;
use qenergia_core::format::NumberFormat;
use qenergia_core::pipeline::share_message;
use qenergia_i18n::I18n;
use qenergia_types::{SimulationInput, SimulationResult};

use crate::sweep::SweepRow;

/// Formatter for pretty ASCII tables
#[derive(Debug)]
pub struct TableFormatter<'a> {
    i18n: &'a I18n,
    numbers: NumberFormat,
}

/// Formatter for CSV export
#[derive(Debug)]
pub struct CsvFormatter;

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(label).add_attribute(Attribute::Bold))
        .collect()
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

impl<'a> TableFormatter<'a> {
    pub fn new(i18n: &'a I18n) -> Self {
        Self {
            i18n,
            numbers: NumberFormat::for_language(i18n.language()),
        }
    }

    fn label(&self, key: &str) -> String {
        self.i18n.text(key)
    }

    /// Two-column breakdown of one quote.
    pub fn format_quote(&self, input: &SimulationInput, result: &SimulationResult) -> String {
        let n = &self.numbers;
        let kit = &result.selected_kit;
        let kwh_month = self.label("unit-kwh-month");
        let kwp = self.label("unit-kwp");

        let payback = if result.payback_years > 0.0 {
            format!("{} {}", n.fixed(result.payback_years, 1), self.label("unit-years"))
        } else {
            self.label("results-payback-unavailable")
        };

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&[
            self.label("results-proposal").as_str(),
            result.proposal_number.as_str(),
        ]));

        let rows = [
            ("results-client", input.client_name.clone()),
            ("results-city", input.city.clone()),
            ("results-roof", self.label(input.roof_type.label_key())),
            (
                "results-consumption",
                format!("{} {kwh_month}", n.number(input.monthly_consumption_kwh)),
            ),
            (
                "results-required-generation",
                format!("{} {kwh_month}", n.number(f64::from(result.required_generation_kwh))),
            ),
            ("results-kit", kit.name.clone()),
            ("results-modules", kit.modules.to_string()),
            ("results-power", format!("{} {kwp}", n.number(kit.total_power_kwp))),
            ("results-inverters", kit.inverters.to_string()),
            ("results-area", format!("{} m²", n.number(kit.area_required_m2))),
            ("results-structure", kit.structure_type.clone()),
            (
                "results-production",
                format!("{} {kwh_month}", n.number(f64::from(kit.estimated_production_kwh))),
            ),
            ("results-price", n.currency(kit.price)),
            ("results-current-cost", n.currency(result.current_monthly_cost)),
            ("results-new-cost", n.currency(result.new_monthly_cost)),
            ("results-payback", payback),
        ];
        for (key, value) in rows {
            table.add_row(vec![Cell::new(self.label(key)), right(value)]);
        }
        table.add_row(vec![
            Cell::new(self.label("results-annual-savings")).add_attribute(Attribute::Bold),
            right(n.currency(result.annual_savings))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&share_message(self.i18n, result.annual_savings));
        output.push('\n');
        output
    }

    pub fn format_kits(&self, catalog: &Catalog) -> String {
        let n = &self.numbers;
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&[
            "#",
            self.label("col-kit").as_str(),
            self.label("results-modules").as_str(),
            self.label("results-power").as_str(),
            self.label("results-inverters").as_str(),
            self.label("results-area").as_str(),
            self.label("results-structure").as_str(),
            self.label("results-production").as_str(),
            self.label("col-price").as_str(),
        ]));

        for kit in catalog.iter() {
            table.add_row(vec![
                Cell::new(kit.id),
                Cell::new(&kit.name),
                right(kit.modules.to_string()),
                right(format!("{} kWp", n.number(kit.total_power_kwp))),
                right(kit.inverters.to_string()),
                right(format!("{} m²", n.number(kit.area_required_m2))),
                Cell::new(&kit.structure_type),
                right(format!("{} kWh", n.number(f64::from(kit.estimated_production_kwh)))),
                right(n.currency(kit.price)),
            ]);
        }

        let mut output = table.to_string();
        output.push('\n');
        let _ = writeln!(output, "{} kits", catalog.len());
        output
    }

    pub fn format_sweep(&self, rows: &[SweepRow]) -> String {
        let n = &self.numbers;
        let custom = self.label("outcome-custom-quote");
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(&[
            self.label("results-consumption").as_str(),
            self.label("results-required-generation").as_str(),
            self.label("col-kit").as_str(),
            self.label("col-price").as_str(),
            self.label("results-current-cost").as_str(),
            self.label("results-new-cost").as_str(),
            self.label("results-annual-savings").as_str(),
            self.label("col-payback").as_str(),
        ]));

        let mut previous_kit = None;
        for row in rows {
            let consumption = right(n.number(row.consumption_kwh));
            let required = right(n.number(f64::from(row.required_generation_kwh)));

            let (
                Some(kit_name),
                Some(price),
                Some(current),
                Some(new),
                Some(savings),
                Some(payback),
            ) = (
                row.kit_name.as_deref(),
                row.kit_price,
                row.current_monthly_cost,
                row.new_monthly_cost,
                row.annual_savings,
                row.payback_years,
            ) else {
                table.add_row(vec![
                    consumption,
                    required,
                    Cell::new(&custom).fg(Color::Yellow),
                ]);
                continue;
            };

            // Highlight the first row of each new kit
            let kit_cell = if previous_kit == row.kit_id {
                Cell::new(kit_name)
            } else {
                Cell::new(kit_name).fg(Color::Green).add_attribute(Attribute::Bold)
            };
            previous_kit = row.kit_id;

            table.add_row(vec![
                consumption,
                required,
                kit_cell,
                right(n.currency(price)),
                right(n.currency(current)),
                right(n.currency(new)),
                right(n.currency(savings)),
                right(n.fixed(payback, 1)),
            ]);
        }

        let mut output = table.to_string();
        output.push('\n');
        let custom_count = rows.iter().filter(|r| r.is_custom_quote()).count();
        let _ = writeln!(
            output,
            "{} rows, {} quoted, {} custom",
            rows.len(),
            rows.len() - custom_count,
            custom_count
        );
        output
    }
}

impl CsvFormatter {
    /// Write sweep rows to `path`, one record per consumption.
    pub fn write_sweep(rows: &[SweepRow], path: &str) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file {path}"))?;
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to write CSV row to {path}"))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush CSV file {path}"))?;
        Ok(())
    }
}
