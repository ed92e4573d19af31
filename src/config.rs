use crate::error::EngineError;
use anyhow::{Context, Result};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound for `trailer_lookahead`; keeps the scan linear in input size.
pub const MAX_TRAILER_LOOKAHEAD: usize = 8;

/// Read-only settings injected into the parser at construction time.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Courier names, matched case-insensitively as whole words.
    pub drivers: Vec<String>,
    /// Weekday names as written in the chat, mapped to the weekday they mean.
    pub weekdays: BTreeMap<String, Weekday>,
    /// Glyph that terminates a delivery block.
    pub marker: String,
    /// Lines at least this long (in chars) never become trailers through
    /// the bare weekday/date rule.
    pub trailer_max_chars: usize,
    /// How many lines after a trailer may still contribute a missing
    /// driver or date.
    pub trailer_lookahead: usize,
    /// Phrases that close a session ("these were ...").
    pub closing_phrases: Vec<String>,
    /// System notices from the chat export that carry no content.
    pub system_notices: Vec<String>,
    /// Words that make up a pure greeting/acknowledgement message.
    pub greetings: Vec<String>,
    /// Message bodies with fewer visible chars are discarded.
    pub min_content_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        let weekdays = [
            ("segunda", Weekday::Mon),
            ("terça", Weekday::Tue),
            ("terca", Weekday::Tue),
            ("quarta", Weekday::Wed),
            ("quinta", Weekday::Thu),
            ("sexta", Weekday::Fri),
            ("sábado", Weekday::Sat),
            ("sabado", Weekday::Sat),
            ("domingo", Weekday::Sun),
        ]
        .into_iter()
        .map(|(name, day)| (name.to_string(), day))
        .collect();

        Self {
            drivers: to_strings(&["RAFA", "FRANCIS", "RODRIGO", "KAROL", "ARTHUR"]),
            weekdays,
            marker: "🏎️".to_string(),
            trailer_max_chars: 30,
            trailer_lookahead: 2,
            closing_phrases: to_strings(&[
                "essas foram",
                "estas foram",
                "esses foram",
                "saídas d",
                "saidas d",
                "these were",
                "outputs from",
            ]),
            system_notices: to_strings(&[
                "sticker omitted",
                "media omitted",
                "document omitted",
                "image omitted",
                "video omitted",
                "audio omitted",
                "mídia oculta",
                "figurinha omitida",
                "this message was deleted",
                "mensagem apagada",
            ]),
            greetings: to_strings(&[
                "salve", "opa", "blz", "beleza", "ok", "okay", "👍", "kk", "kkk", "kkkk", "valeu",
                "vlw", "bom", "dia", "boa", "tarde", "noite",
            ]),
            min_content_chars: 3,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from ~/.config/courierlog/config.toml
    ///
    /// - File missing: returns default config (Ok)
    /// - File exists but invalid TOML: returns Err so caller can show warning
    /// - Keys missing: filled from defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check the invariants the parser relies on.
    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        if self.marker.trim().trim_matches('\u{FE0F}').is_empty() {
            return Err(EngineError::InvalidConfig(
                "marker must not be empty".to_string(),
            ));
        }
        if self.weekdays.is_empty() {
            return Err(EngineError::InvalidConfig(
                "weekdays table must not be empty".to_string(),
            ));
        }
        if self.trailer_max_chars == 0 {
            return Err(EngineError::InvalidConfig(
                "trailer_max_chars must be greater than zero".to_string(),
            ));
        }
        if self.trailer_lookahead > MAX_TRAILER_LOOKAHEAD {
            return Err(EngineError::InvalidConfig(format!(
                "trailer_lookahead must be at most {} (got {})",
                MAX_TRAILER_LOOKAHEAD, self.trailer_lookahead
            )));
        }
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|d| d.join(".config").join("courierlog").join("config.toml"))
    }
}
