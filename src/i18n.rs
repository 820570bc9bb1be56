//! Locale catalog lookup for user-facing strings.
//!
//! Every user-facing string is resolved by key from a per-locale TOML
//! catalog embedded at compile time. Lookup falls back to the default
//! locale, then to the key itself so a missing entry is visible in chat
//! instead of panicking.

use std::collections::HashMap;

use crate::{AppError, Result};

const EN_CATALOG: &str = include_str!("../locales/en.toml");
const RU_CATALOG: &str = include_str!("../locales/ru.toml");

/// Immutable lookup table of locale → key → template.
#[derive(Debug)]
pub struct Catalog {
    locales: HashMap<String, HashMap<String, String>>,
    default_locale: String,
}

impl Catalog {
    /// Build the catalog from the embedded locale files.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a catalog file is not valid TOML or
    /// the default locale is not among the embedded ones.
    pub fn embedded(default_locale: &str) -> Result<Self> {
        let mut locales = HashMap::new();
        for (name, raw) in [("en", EN_CATALOG), ("ru", RU_CATALOG)] {
            let entries: HashMap<String, String> = toml::from_str(raw)
                .map_err(|err| AppError::Config(format!("locale {name}: {err}")))?;
            locales.insert(name.to_owned(), entries);
        }
        if !locales.contains_key(default_locale) {
            return Err(AppError::Config(format!(
                "default locale {default_locale} is not embedded"
            )));
        }
        Ok(Self {
            locales,
            default_locale: default_locale.to_owned(),
        })
    }

    /// Look up a key for the given locale, falling back to the default
    /// locale and finally to the key itself.
    #[must_use]
    pub fn text(&self, locale: Option<&str>, key: &str) -> String {
        let preferred = locale
            .and_then(|code| self.locales.get(code))
            .and_then(|entries| entries.get(key));
        if let Some(template) = preferred {
            return template.clone();
        }
        self.locales
            .get(&self.default_locale)
            .and_then(|entries| entries.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }

    /// Look up a key and substitute `{name}`-style placeholders.
    #[must_use]
    pub fn text_with(&self, locale: Option<&str>, key: &str, args: &[(&str, &str)]) -> String {
        let mut rendered = self.text(locale, key);
        for (name, value) in args {
            rendered = rendered.replace(&format!("{{{name}}}"), value);
        }
        rendered
    }

    /// Locales the catalog can serve.
    #[must_use]
    pub fn supported(&self) -> Vec<&str> {
        self.locales.keys().map(String::as_str).collect()
    }
}
