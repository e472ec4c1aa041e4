#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Path Defence session.
//!
//! Session files are TOML documents mirroring [`SessionConfig`]. Every key is
//! optional; omitted keys keep their defaults.

use std::{fs, io, path::Path, path::PathBuf};

use path_defence_core::{ConfigError, SessionConfig, WELCOME_BANNER};
use path_defence_world::World;
use thiserror::Error;

/// Reasons a session configuration could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The configuration file could not be read.
    #[error("failed to read session config at {}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse session config toml contents")]
    Parse(#[from] toml::de::Error),
    /// The document parsed but describes an unplayable session.
    #[error("session config is invalid")]
    Invalid(#[from] ConfigError),
}

/// Produces the data required to start a session.
#[derive(Debug, Default)]
pub struct Bootstrap {
    config: SessionConfig,
}

impl Bootstrap {
    /// Uses the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML session document.
    pub fn from_toml_str(contents: &str) -> Result<Self, LoadError> {
        let config: SessionConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(Self { config })
    }

    /// Reads, parses and validates the TOML session file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        WELCOME_BANNER
    }

    /// Exposes the validated configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Builds a fresh world from the configuration.
    pub fn world(&self) -> Result<World, ConfigError> {
        World::with_config(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use path_defence_core::{EnemyKind, GameStatus};
    use path_defence_world::query;

    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        let bootstrap = Bootstrap::from_toml_str("").expect("empty document parses");
        assert_eq!(bootstrap.config(), &SessionConfig::default());
    }

    #[test]
    fn partial_document_overrides_selected_values() {
        let bootstrap = Bootstrap::from_toml_str(
            r#"
            columns = 12
            starting_money = 500
            first_wave_delay = 1.5
            waves = [["fast", "tank"], ["basic"]]

            [towers.sniper]
            cost = 120
            damage = 60
            range = 250.0
            fire_rate = 0.4
            "#,
        )
        .expect("document parses");

        let config = bootstrap.config();
        assert_eq!(config.columns, 12);
        assert_eq!(config.rows, 15);
        assert_eq!(config.starting_money, 500);
        assert_eq!(config.first_wave_delay, Duration::from_millis(1_500));
        assert_eq!(
            config.waves,
            vec![vec![EnemyKind::Fast, EnemyKind::Tank], vec![EnemyKind::Basic]]
        );
        assert_eq!(config.towers.sniper.cost, 120);
        assert_eq!(config.towers.basic.cost, 50);
    }

    #[test]
    fn unknown_archetype_is_a_parse_error() {
        let result = Bootstrap::from_toml_str(r#"waves = [["dragon"]]"#);
        assert!(matches!(result, Err(LoadError::Parse(_))));
    }

    #[test]
    fn invalid_values_are_rejected_after_parsing() {
        let result = Bootstrap::from_toml_str("rows = 2");
        assert!(matches!(
            result,
            Err(LoadError::Invalid(ConfigError::GridTooSmall { rows: 2, .. }))
        ));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = Path::new("definitely/not/here.toml");
        match Bootstrap::from_path(path) {
            Err(LoadError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn bootstrap_builds_a_running_world() {
        let bootstrap = Bootstrap::from_toml_str("starting_lives = 3").expect("document parses");
        let world = bootstrap.world().expect("valid config");

        assert_eq!(bootstrap.welcome_banner(), "Welcome to Path Defence.");
        assert_eq!(query::economy(&world).lives, 3);
        assert_eq!(query::status(&world), GameStatus::Running);
    }
}
