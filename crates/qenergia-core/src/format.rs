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

//! Locale-aware number and currency rendering for display.

use qenergia_i18n::Language;

/// Fraction digits kept by [`NumberFormat::number`]
const MAX_FRACTION_DIGITS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub group_separator: char,
    pub currency_symbol: &'static str,
    /// Placed between the currency symbol and the amount
    pub symbol_spacing: &'static str,
}

/// Brazilian Portuguese: `R$ 1.234,56`
pub const PT_BR: NumberFormat = NumberFormat {
    decimal_separator: ',',
    group_separator: '.',
    currency_symbol: "R$",
    symbol_spacing: "\u{a0}",
};

/// English: `R$1,234.56`
pub const EN: NumberFormat = NumberFormat {
    decimal_separator: '.',
    group_separator: ',',
    currency_symbol: "R$",
    symbol_spacing: "",
};

impl NumberFormat {
    #[must_use]
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Portuguese => PT_BR,
            Language::English => EN,
        }
    }

    /// Render `value` as BRL with two fraction digits.
    #[must_use]
    pub fn currency(&self, value: f64) -> String {
        if !value.is_finite() {
            return non_finite(value);
        }
        let rendered = format!("{:.2}", value.abs());
        let sign = if value < 0.0 && rendered != "0.00" { "-" } else { "" };
        format!(
            "{sign}{}{}{}",
            self.currency_symbol,
            self.symbol_spacing,
            self.localize(&rendered)
        )
    }

    /// Render `value` with grouping and up to three fraction digits.
    #[must_use]
    pub fn number(&self, value: f64) -> String {
        if !value.is_finite() {
            return non_finite(value);
        }
        let rendered = format!("{:.prec$}", value.abs(), prec = MAX_FRACTION_DIGITS);
        let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
        let sign = if value < 0.0 && trimmed != "0" { "-" } else { "" };
        format!("{sign}{}", self.localize(trimmed))
    }

    /// Render a fixed number of fraction digits, e.g. payback years.
    #[must_use]
    pub fn fixed(&self, value: f64, fraction_digits: usize) -> String {
        if !value.is_finite() {
            return non_finite(value);
        }
        let rendered = format!("{:.fraction_digits$}", value.abs());
        let is_zero = rendered.bytes().all(|b| b == b'0' || b == b'.');
        let sign = if value < 0.0 && !is_zero { "-" } else { "" };
        format!("{sign}{}", self.localize(&rendered))
    }

    /// Swap separators on an unsigned `1234.5` style rendering.
    fn localize(&self, plain: &str) -> String {
        let (int_part, frac_part) = match plain.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (plain, None),
        };
        let mut out = group_digits(int_part, self.group_separator);
        if let Some(frac) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(frac);
        }
        out
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len.saturating_mul(2));
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

fn non_finite(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value.is_sign_negative() {
        "-∞".to_owned()
    } else {
        "∞".to_owned()
    }
}

/// Format as BRL using pt-BR conventions.
#[must_use]
pub fn format_currency(value: f64) -> String {
    PT_BR.currency(value)
}

/// Format a grouped number using pt-BR conventions.
#[must_use]
pub fn format_number(value: f64) -> String {
    PT_BR.number(value)
}
