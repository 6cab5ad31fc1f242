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

//! Translations for QEnergia user-facing text.
//!
//! Resources are embedded Fluent files, one per language and domain:
//! `main` carries validation, outcome and label strings shared by every
//! front end, `web` carries the page labels rendered by the server.

use std::collections::HashMap;

use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use thiserror::Error;
use unic_langid::LanguageIdentifier;

pub use fluent_bundle::FluentValue;

/// Supported languages
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default,
)]
pub enum Language {
    /// Brazilian Portuguese (default)
    #[default]
    #[serde(rename = "pt-br", alias = "pt", alias = "pt-BR")]
    Portuguese,
    /// English
    #[serde(rename = "en", alias = "english")]
    English,
}

impl Language {
    /// Get the language identifier string (e.g., "pt-BR", "en")
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Portuguese => "pt-BR",
            Self::English => "en",
        }
    }

    /// Get the language display name
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Portuguese => "Português (Brasil)",
            Self::English => "English",
        }
    }

    /// List all supported languages
    pub const ALL: [Language; 2] = [Language::Portuguese, Language::English];

    /// Parse language from string code
    ///
    /// # Errors
    ///
    /// Returns `I18nError::UnsupportedLanguage` if the language code is not supported.
    pub fn from_code(code: &str) -> Result<Self, I18nError> {
        match code.to_lowercase().as_str() {
            "pt" | "pt-br" | "pt_br" | "portuguese" => Ok(Self::Portuguese),
            "en" | "en-us" | "english" => Ok(Self::English),
            _ => Err(I18nError::UnsupportedLanguage(code.to_owned())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = I18nError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

/// Translation errors
#[derive(Debug, Error)]
pub enum I18nError {
    /// Translation key not found
    #[error("Translation key not found: {0}")]
    KeyNotFound(String),

    /// Failed to load translation resource
    #[error("Failed to load translation resource: {0}")]
    LoadError(String),

    /// Unsupported language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Formatting error
    #[error("Failed to format translation: {0}")]
    FormatError(String),
}

const DOMAINS: [&str; 2] = ["main", "web"];

/// Main i18n interface
///
/// Bundles are the concurrent Fluent flavour, so an `I18n` can be shared
/// across request handlers behind an `Arc` without extra locking.
pub struct I18n {
    bundles: HashMap<&'static str, FluentBundle<FluentResource>>,
    language: Language,
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18n")
            .field("language", &self.language)
            .field("bundles", &"<FluentBundle>")
            .finish()
    }
}

impl I18n {
    /// Create a new i18n instance for the specified language
    ///
    /// # Errors
    ///
    /// Returns `I18nError::LoadError` if translation files cannot be loaded.
    pub fn new(language: Language) -> Result<Self, I18nError> {
        let mut i18n = Self {
            bundles: HashMap::new(),
            language,
        };

        for domain in DOMAINS {
            i18n.load_domain(domain)?;
        }

        Ok(i18n)
    }

    fn load_domain(&mut self, domain: &'static str) -> Result<(), I18nError> {
        let lang_code = self.language.code();
        let ftl_content = Self::load_ftl_file(lang_code, domain)?;

        let resource = FluentResource::try_new(ftl_content)
            .map_err(|e| I18nError::LoadError(format!("Failed to parse {domain}.ftl: {:?}", e.1)))?;

        let lang_id: LanguageIdentifier = lang_code
            .parse()
            .map_err(|e| I18nError::LoadError(format!("Invalid language ID: {e}")))?;

        let mut bundle = FluentBundle::new_concurrent(vec![lang_id]);
        // Plain text output; callers embed strings in HTML, JSON and terminals
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|e| I18nError::LoadError(format!("Failed to add resource: {e:?}")))?;

        self.bundles.insert(domain, bundle);
        Ok(())
    }

    fn load_ftl_file(lang_code: &str, domain: &str) -> Result<String, I18nError> {
        match (lang_code, domain) {
            ("pt-BR", "main") => Ok(include_str!("../locales/pt-BR/main.ftl").to_owned()),
            ("pt-BR", "web") => Ok(include_str!("../locales/pt-BR/web.ftl").to_owned()),
            ("en", "main") => Ok(include_str!("../locales/en/main.ftl").to_owned()),
            ("en", "web") => Ok(include_str!("../locales/en/web.ftl").to_owned()),
            _ => Err(I18nError::LoadError(format!(
                "Translation file not found: {lang_code}/{domain}.ftl"
            ))),
        }
    }

    /// Get a translated string by key
    ///
    /// # Errors
    ///
    /// Returns `I18nError::KeyNotFound` if the translation key is not found in any domain.
    pub fn get(&self, key: &str) -> Result<String, I18nError> {
        self.format(key, None)
    }

    /// Format a translated string with arguments
    ///
    /// # Errors
    ///
    /// Returns `I18nError::KeyNotFound` if the translation key is not found.
    /// Returns `I18nError::FormatError` if formatting fails.
    pub fn format(&self, key: &str, args: Option<&FluentArgs<'_>>) -> Result<String, I18nError> {
        for domain in DOMAINS {
            let Some(bundle) = self.bundles.get(domain) else {
                continue;
            };
            if let Some(pattern) = bundle.get_message(key).and_then(|msg| msg.value()) {
                let mut errors = vec![];
                let value = bundle.format_pattern(pattern, args, &mut errors);

                if !errors.is_empty() {
                    return Err(I18nError::FormatError(format!(
                        "Formatting errors: {errors:?}"
                    )));
                }

                return Ok(value.into_owned());
            }
        }

        Err(I18nError::KeyNotFound(key.to_owned()))
    }

    /// Translate `key`, falling back to the key itself when it is missing.
    ///
    /// Used on display paths where a missing string must not fail a request.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_else(|_| key.to_owned())
    }

    /// Like [`I18n::text`] but with arguments.
    #[must_use]
    pub fn text_with(&self, key: &str, args: &FluentArgs<'_>) -> String {
        self.format(key, Some(args))
            .unwrap_or_else(|_| key.to_owned())
    }

    /// Get the current language
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }
}

/// Build a [`FluentArgs`] from string pairs.
#[must_use]
pub fn args<'a>(pairs: &[(&'a str, String)]) -> FluentArgs<'a> {
    let mut args = FluentArgs::new();
    for (name, value) in pairs {
        args.set(*name, FluentValue::from(value.clone()));
    }
    args
}
