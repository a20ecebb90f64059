use crate::i18n::{LanguageDescriptor, LanguageRegistry};
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Config {
    // Language
    pub language: LanguageDescriptor,

    // Filtering
    pub allow_patterns: Vec<String>,
    pub block_patterns: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let code = std::env::var("LIVECHAT_LANGUAGE").unwrap_or_else(|_| "en".to_string());
        let language = LanguageRegistry::get()
            .find(&code)
            .cloned()
            .with_context(|| format!("Unknown language in LIVECHAT_LANGUAGE: '{}'", code))?;

        Ok(Self {
            language,

            // Filtering - optional pattern files, one fragment per line
            allow_patterns: patterns_from_env("LIVECHAT_ALLOW_FILE")?,
            block_patterns: patterns_from_env("LIVECHAT_BLOCK_FILE")?,
        })
    }

    /// Read a pattern file: one fragment per line, blank lines and `#`
    /// comments skipped. Surrounding whitespace is kept, since it is part of
    /// the pattern.
    pub fn load_patterns(path: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern file {}", path.display()))?;

        Ok(contents
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
            .map(str::to_string)
            .collect())
    }
}

fn patterns_from_env(var: &str) -> Result<Vec<String>> {
    match std::env::var(var) {
        Ok(path) if !path.trim().is_empty() => {
            Config::load_patterns(&path).with_context(|| format!("{} is invalid", var))
        }
        _ => Ok(Vec::new()),
    }
}
