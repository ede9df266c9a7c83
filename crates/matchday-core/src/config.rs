//! Configuration loading and typed config structures for the Matchday simulation.
//!
//! The canonical configuration lives in `matchday-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and parses the file. Every
//! field has a default, so any subset of keys (or an empty file) is valid.

use std::path::Path;
use std::time::Duration;

use matchday_match::MatchRules;
use serde::Deserialize;

/// Environment variable that overrides `simulation.seed`.
pub const SEED_ENV: &str = "MATCHDAY_SEED";

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "MATCHDAY_LOG_LEVEL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `matchday-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Name and random seed.
    #[serde(default)]
    pub simulation: GeneralConfig,

    /// Periodic task intervals and the post-match pause.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Scheduling and season parameters.
    #[serde(default)]
    pub league: LeagueConfig,

    /// Rules applied inside every match.
    #[serde(default)]
    pub match_rules: MatchRules,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `MATCHDAY_SEED` overrides `simulation.seed`
    /// - `MATCHDAY_LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Values that do not parse are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup(SEED_ENV).and_then(|v| v.trim().parse().ok()) {
            self.simulation.seed = seed;
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level;
        }
    }
}

/// Simulation-wide identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneralConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: default_seed(),
        }
    }
}

/// How often each periodic task runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Match sweep interval in milliseconds.
    #[serde(default = "default_match_tick_ms")]
    pub match_tick_ms: u64,

    /// Season completion check interval in seconds.
    #[serde(default = "default_season_check_secs")]
    pub season_check_secs: u64,

    /// Player statistics batch interval in seconds.
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,

    /// Global aggregate refresh interval in seconds.
    #[serde(default = "default_global_stats_interval_secs")]
    pub global_stats_interval_secs: u64,

    /// Pause between full time and archival, in seconds.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Nominal gap between matchdays, in hours.
    #[serde(default = "default_fixture_spacing_hours")]
    pub fixture_spacing_hours: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            match_tick_ms: default_match_tick_ms(),
            season_check_secs: default_season_check_secs(),
            stats_interval_secs: default_stats_interval_secs(),
            global_stats_interval_secs: default_global_stats_interval_secs(),
            cooldown_secs: default_cooldown_secs(),
            fixture_spacing_hours: default_fixture_spacing_hours(),
        }
    }
}

/// Shortest period handed to a timer; zero would spin.
const MIN_PERIOD: Duration = Duration::from_millis(1);

impl TimingConfig {
    /// Match sweep period.
    pub fn match_tick(&self) -> Duration {
        Duration::from_millis(self.match_tick_ms).max(MIN_PERIOD)
    }

    /// Season check period.
    pub fn season_check(&self) -> Duration {
        Duration::from_secs(self.season_check_secs).max(MIN_PERIOD)
    }

    /// Statistics batch period.
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs).max(MIN_PERIOD)
    }

    /// Global aggregate period.
    pub fn global_stats_interval(&self) -> Duration {
        Duration::from_secs(self.global_stats_interval_secs).max(MIN_PERIOD)
    }

    /// Post-match pause. Zero is allowed.
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Gap between matchdays as a chrono duration.
    pub fn fixture_spacing(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.fixture_spacing_hours))
    }
}

/// Scheduling and season parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeagueConfig {
    /// Maximum matches per league in the active set.
    #[serde(default = "default_max_simultaneous_matches")]
    pub max_simultaneous_matches: usize,

    /// How far above the league minimum a team's played count may be for a
    /// fixture to count as fair.
    #[serde(default = "default_fairness_tolerance")]
    pub fairness_tolerance: u32,

    /// Completed seasons kept in the history.
    #[serde(default = "default_season_history_cap")]
    pub season_history_cap: usize,

    /// Players generated per club.
    #[serde(default = "default_squad_size")]
    pub squad_size: u32,

    /// Appearances needed to be considered for player of the season.
    #[serde(default = "default_min_appearances_for_award")]
    pub min_appearances_for_award: u32,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            max_simultaneous_matches: default_max_simultaneous_matches(),
            fairness_tolerance: default_fairness_tolerance(),
            season_history_cap: default_season_history_cap(),
            squad_size: default_squad_size(),
            min_appearances_for_award: default_min_appearances_for_award(),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_name() -> String {
    String::from("Matchday")
}

const fn default_seed() -> u64 {
    42
}

const fn default_match_tick_ms() -> u64 {
    2000
}

const fn default_season_check_secs() -> u64 {
    10
}

const fn default_stats_interval_secs() -> u64 {
    30
}

const fn default_global_stats_interval_secs() -> u64 {
    5
}

const fn default_cooldown_secs() -> u64 {
    60
}

const fn default_fixture_spacing_hours() -> u32 {
    24
}

const fn default_max_simultaneous_matches() -> usize {
    4
}

const fn default_fairness_tolerance() -> u32 {
    1
}

const fn default_season_history_cap() -> usize {
    10
}

const fn default_squad_size() -> u32 {
    25
}

const fn default_min_appearances_for_award() -> u32 {
    10
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.timing.match_tick_ms, 2000);
        assert_eq!(config.timing.cooldown_secs, 60);
        assert_eq!(config.league.max_simultaneous_matches, 4);
        assert_eq!(config.league.fairness_tolerance, 1);
        assert_eq!(config.match_rules, MatchRules::default());
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
simulation:
  name: "Test League"
  seed: 123

timing:
  match_tick_ms: 500
  season_check_secs: 3
  stats_interval_secs: 7
  global_stats_interval_secs: 2
  cooldown_secs: 5
  fixture_spacing_hours: 48

league:
  max_simultaneous_matches: 2
  fairness_tolerance: 0
  season_history_cap: 3
  squad_size: 18
  min_appearances_for_award: 4

match_rules:
  event_chance: 0.4
  red_card_share: 0.2
  commentary_cap: 12
  halftime_break_secs: 5

logging:
  level: "debug"
  format: "json"
"#;

        let config = SimulationConfig::parse(yaml).unwrap();

        assert_eq!(config.simulation.name, "Test League");
        assert_eq!(config.timing.match_tick_ms, 500);
        assert_eq!(config.timing.fixture_spacing().num_hours(), 48);
        assert_eq!(config.league.max_simultaneous_matches, 2);
        assert_eq!(config.league.squad_size, 18);
        assert_eq!(config.match_rules.commentary_cap, 12);
        assert_eq!(config.match_rules.halftime_break_secs, 5);
        assert_eq!(config.match_rules.max_substitutions, 5);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "league:\n  max_simultaneous_matches: 1\n";
        let config = SimulationConfig::parse(yaml).unwrap();

        assert_eq!(config.league.max_simultaneous_matches, 1);
        // Everything else uses defaults
        assert_eq!(config.league.season_history_cap, 10);
        assert_eq!(config.timing, TimingConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = SimulationConfig::parse("timing: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn env_overrides_replace_seed_and_level() {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides(|key| match key {
            SEED_ENV => Some(String::from("9001")),
            LOG_LEVEL_ENV => Some(String::from("matchday_core=trace")),
            _ => None,
        });
        assert_eq!(config.simulation.seed, 9001);
        assert_eq!(config.logging.level, "matchday_core=trace");
    }

    #[test]
    fn unparsable_seed_override_is_ignored() {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides(|key| (key == SEED_ENV).then(|| String::from("lots")));
        assert_eq!(config.simulation.seed, 42);
    }

    #[test]
    fn zero_periods_are_clamped() {
        let timing = TimingConfig {
            match_tick_ms: 0,
            season_check_secs: 0,
            ..TimingConfig::default()
        };
        assert_eq!(timing.match_tick(), Duration::from_millis(1));
        assert_eq!(timing.season_check(), Duration::from_millis(1));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("matchday-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
