use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::export::PdfLayout;
use crate::store::DEFAULT_HISTORY_CAP;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardroomConfig {
    /// Undo depth per screen.
    pub history_cap: usize,
    pub csv_delimiter: char,
    pub export_dir: PathBuf,
    /// Fixes the board tip picks when set.
    pub narrative_seed: Option<u64>,
    pub pdf: PdfLayout,
}

impl Default for BoardroomConfig {
    fn default() -> Self {
        Self {
            history_cap: DEFAULT_HISTORY_CAP,
            csv_delimiter: ',',
            export_dir: PathBuf::from("exports"),
            narrative_seed: None,
            pdf: PdfLayout::default(),
        }
    }
}

impl BoardroomConfig {
    /// Reads the optional JSON file, then applies `COURTEVO_*` overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(dir) = lookup("COURTEVO_EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(cap) = lookup("COURTEVO_HISTORY_CAP") {
            self.history_cap = cap
                .trim()
                .parse()
                .with_context(|| format!("COURTEVO_HISTORY_CAP must be a number (got {cap:?})"))?;
        }
        if let Some(seed) = lookup("COURTEVO_NARRATIVE_SEED") {
            let seed = seed.trim().parse().with_context(|| {
                format!("COURTEVO_NARRATIVE_SEED must be a number (got {seed:?})")
            })?;
            self.narrative_seed = Some(seed);
        }
        if let Some(delimiter) = lookup("COURTEVO_CSV_DELIMITER") {
            let mut chars = delimiter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => self.csv_delimiter = c,
                _ => bail!("COURTEVO_CSV_DELIMITER must be one character (got {delimiter:?})"),
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.history_cap == 0 {
            bail!("history_cap must be at least 1");
        }
        if !self.csv_delimiter.is_ascii() || matches!(self.csv_delimiter, '"' | '\n' | '\r') {
            bail!(
                "csv_delimiter must be ASCII and not a quote or line break (got {:?})",
                self.csv_delimiter
            );
        }
        if self.pdf.line_height <= 0.0
            || self.pdf.page_height <= self.pdf.banner_height + 2.0 * self.pdf.margin
        {
            bail!("pdf layout leaves no room for content");
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.csv_delimiter as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = BoardroomConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delimiter_byte(), b',');
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = BoardroomConfig::default();
        config
            .apply_env(env(&[
                ("COURTEVO_HISTORY_CAP", "3"),
                ("COURTEVO_NARRATIVE_SEED", "42"),
                ("COURTEVO_CSV_DELIMITER", "|"),
                ("COURTEVO_EXPORT_DIR", "/tmp/board"),
            ]))
            .unwrap();
        assert_eq!(config.history_cap, 3);
        assert_eq!(config.narrative_seed, Some(42));
        assert_eq!(config.delimiter_byte(), b'|');
        assert_eq!(config.export_dir, PathBuf::from("/tmp/board"));
    }

    #[test]
    fn bad_env_values_are_rejected() {
        let mut config = BoardroomConfig::default();
        assert!(config
            .apply_env(env(&[("COURTEVO_HISTORY_CAP", "many")]))
            .is_err());
        assert!(config
            .apply_env(env(&[("COURTEVO_CSV_DELIMITER", "||")]))
            .is_err());
    }

    #[test]
    fn line_break_delimiters_are_rejected() {
        for delimiter in ["\n", "\r"] {
            let mut config = BoardroomConfig::default();
            config
                .apply_env(env(&[("COURTEVO_CSV_DELIMITER", delimiter)]))
                .unwrap();
            assert!(config.validate().is_err(), "{delimiter:?}");
        }
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let raw = r#"{ "history_cap": 4, "pdf": { "margin": 30.0 } }"#;
        let mut config: BoardroomConfig = serde_json::from_str(raw).unwrap();
        config.apply_env(|_| None).unwrap();
        config.validate().unwrap();

        assert_eq!(config.history_cap, 4);
        assert_eq!(config.csv_delimiter, ',');
        assert_eq!(config.pdf.margin, 30.0);
        assert_eq!(config.pdf.page_height, 842.0);
    }

    #[test]
    fn zero_history_cap_is_invalid() {
        let config = BoardroomConfig {
            history_cap: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
