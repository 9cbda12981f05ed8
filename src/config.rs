use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::dataset::DEFAULT_DATASET_FILE;

const DEFAULT_TICK_MS: u64 = 250;
const MIN_TICK_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub dataset_path: PathBuf,
    pub export_dir: PathBuf,
    pub tick_rate: Duration,
}

impl Config {
    /// Reads `.env.local`, then `.env`, then the process environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let dataset_path = lookup_path(&lookup, "EURO_DATASET_PATH")
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_FILE));
        let export_dir =
            lookup_path(&lookup, "EURO_EXPORT_DIR").unwrap_or_else(|| PathBuf::from("."));
        let tick_ms = lookup("EURO_TICK_MS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TICK_MS)
            .max(MIN_TICK_MS);
        Self {
            dataset_path,
            export_dir,
            tick_rate: Duration::from_millis(tick_ms),
        }
    }
}

fn lookup_path(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<PathBuf> {
    lookup(key)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.dataset_path, PathBuf::from(DEFAULT_DATASET_FILE));
        assert_eq!(cfg.export_dir, PathBuf::from("."));
        assert_eq!(cfg.tick_rate, Duration::from_millis(DEFAULT_TICK_MS));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = config_from(&[("EURO_DATASET_PATH", "   "), ("EURO_EXPORT_DIR", "")]);
        assert_eq!(cfg.dataset_path, PathBuf::from(DEFAULT_DATASET_FILE));
        assert_eq!(cfg.export_dir, PathBuf::from("."));
    }

    #[test]
    fn values_are_trimmed() {
        let cfg = config_from(&[
            ("EURO_DATASET_PATH", "  data/stats.csv "),
            ("EURO_EXPORT_DIR", " out "),
            ("EURO_TICK_MS", " 120 "),
        ]);
        assert_eq!(cfg.dataset_path, PathBuf::from("data/stats.csv"));
        assert_eq!(cfg.export_dir, PathBuf::from("out"));
        assert_eq!(cfg.tick_rate, Duration::from_millis(120));
    }

    #[test]
    fn tick_has_a_floor() {
        let cfg = config_from(&[("EURO_TICK_MS", "10")]);
        assert_eq!(cfg.tick_rate, Duration::from_millis(MIN_TICK_MS));
    }

    #[test]
    fn non_numeric_tick_uses_default() {
        let cfg = config_from(&[("EURO_TICK_MS", "fast")]);
        assert_eq!(cfg.tick_rate, Duration::from_millis(DEFAULT_TICK_MS));
    }
}
