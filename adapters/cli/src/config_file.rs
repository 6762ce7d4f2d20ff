use std::{fs, path::Path};

use anyhow::{Context, Result};
use nightmare_dorm_core::{MemoryStore, Talents};
use nightmare_dorm_session::SessionConfig;
use serde::Deserialize;

/// Contents of a TOML run file. Every section is optional.
///
/// ```toml
/// bee_coins = 40
///
/// [talents]
/// door_hp = 2
///
/// [session]
/// seed = 7
/// survival_secs = 120.0
///
/// [session.waves]
/// delay_secs = 10.0
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct RunFile {
    /// Session tunables.
    pub(crate) session: SessionConfig,
    /// Talent levels applied to the in-memory progress store.
    pub(crate) talents: Talents,
    /// Bee coins held before the run.
    pub(crate) bee_coins: u64,
}

impl RunFile {
    /// Reads and parses a run file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read run file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid run file {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Progress store seeded from the file.
    #[must_use]
    pub(crate) fn store(&self) -> MemoryStore {
        MemoryStore::new(self.bee_coins, self.talents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_sections_keep_defaults() {
        let file = RunFile::parse(
            r#"
            bee_coins = 12

            [talents]
            start_gold = 3

            [session]
            seed = 99

            [session.waves]
            delay_secs = 5.0
            "#,
        )
        .expect("valid toml");

        assert_eq!(file.bee_coins, 12);
        assert_eq!(file.talents.start_gold, 3);
        assert_eq!(file.talents.door_hp, 0);
        assert_eq!(file.session.seed, 99);
        assert_eq!(file.session.waves.delay_secs, 5.0);
        assert_eq!(file.session.waves.interval_secs, 15.0);
        assert_eq!(file.session.survival_secs, 180.0);
        assert_eq!(file.store().bee_coins(), 12);
    }

    #[test]
    fn unknown_types_are_reported() {
        assert!(RunFile::parse("bee_coins = \"many\"").is_err());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(RunFile::parse("").expect("empty toml"), RunFile::default());
    }
}
