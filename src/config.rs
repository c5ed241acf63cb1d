//! Process configuration from the environment

use crate::classifier::{KeywordTable, KeywordTableError};
use crate::disclosure::DEFAULT_STEP_DELAY;
use crate::gateway::GatewayConfig;
use crate::state_machine::state::DEFAULT_DELIVERY_DELAY;
use crate::view::{UnknownElement, ViewElement};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;

/// Timing of the simulated reasoning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub step_delay: Duration,
    pub delivery_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
            delivery_delay: DEFAULT_DELIVERY_DELAY,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid keyword table: {0}")]
    Keywords(#[from] KeywordTableError),
    #[error("Invalid DVNC_UNBOUND_ELEMENTS: {0}")]
    Elements(#[from] UnknownElement),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub gateway: GatewayConfig,
    pub pacing: Pacing,
    /// Initial value of the "show process" toggle
    pub show_reasoning: bool,
    /// Replacement free-text keyword table (JSON)
    pub keywords_path: Option<PathBuf>,
    /// Comma-separated view elements the front end does not render
    pub unbound_elements: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Pacing::default();
        Self {
            port: env_parse("DVNC_PORT").unwrap_or(DEFAULT_PORT),
            gateway: GatewayConfig::from_env(),
            pacing: Pacing {
                step_delay: env_parse("DVNC_STEP_DELAY_MS")
                    .map_or(defaults.step_delay, Duration::from_millis),
                delivery_delay: env_parse("DVNC_DELIVERY_DELAY_MS")
                    .map_or(defaults.delivery_delay, Duration::from_millis),
            },
            show_reasoning: std::env::var("DVNC_SHOW_REASONING")
                .is_ok_and(|v| matches!(v.as_str(), "1" | "true" | "yes")),
            keywords_path: std::env::var("DVNC_KEYWORDS_PATH").ok().map(PathBuf::from),
            unbound_elements: std::env::var("DVNC_UNBOUND_ELEMENTS").ok(),
        }
    }

    /// Free-text keyword table: the configured file, or the built-in one
    pub fn keyword_table(&self) -> Result<KeywordTable, ConfigError> {
        match &self.keywords_path {
            Some(path) => Ok(KeywordTable::load(path)?),
            None => Ok(KeywordTable::free_text()),
        }
    }

    pub fn unbound_elements(&self) -> Result<Vec<ViewElement>, ConfigError> {
        let Some(raw) = &self.unbound_elements else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .filter(|name| !name.trim().is_empty())
            .map(|name| name.parse::<ViewElement>().map_err(ConfigError::from))
            .collect()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Topic;
    use std::io::Write;

    fn test_config() -> AppConfig {
        AppConfig {
            port: DEFAULT_PORT,
            gateway: GatewayConfig::default(),
            pacing: Pacing::default(),
            show_reasoning: false,
            keywords_path: None,
            unbound_elements: None,
        }
    }

    #[test]
    fn test_default_pacing() {
        let pacing = Pacing::default();
        assert_eq!(pacing.step_delay, Duration::from_millis(400));
        assert_eq!(pacing.delivery_delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_keyword_table_defaults_to_builtin() {
        assert_eq!(test_config().keyword_table().unwrap(), KeywordTable::free_text());
    }

    #[test]
    fn test_keyword_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"entries":[{{"topic":"structural","keywords":["arch"]}}]}}"#
        )
        .unwrap();

        let config = AppConfig {
            keywords_path: Some(file.path().to_path_buf()),
            ..test_config()
        };
        let table = config.keyword_table().unwrap();
        assert_eq!(table.entries[0].topic, Topic::Structural);
    }

    #[test]
    fn test_invalid_keyword_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(&path, r#"{"entries":[{"topic":"hydraulic","keywords":["pump"," "]}]}"#)
            .unwrap();

        let config = AppConfig {
            keywords_path: Some(path),
            ..test_config()
        };
        assert!(matches!(
            config.keyword_table(),
            Err(ConfigError::Keywords(KeywordTableError::BlankKeyword(Topic::Hydraulic)))
        ));
    }

    #[test]
    fn test_missing_keyword_file_is_error() {
        let config = AppConfig {
            keywords_path: Some(PathBuf::from("/nonexistent/dvnc/keywords.json")),
            ..test_config()
        };
        assert!(matches!(
            config.keyword_table(),
            Err(ConfigError::Keywords(KeywordTableError::Read { .. }))
        ));
    }

    #[test]
    fn test_unbound_elements() {
        assert!(test_config().unbound_elements().unwrap().is_empty());

        let config = AppConfig {
            unbound_elements: Some("context_bar, context_items,".to_string()),
            ..test_config()
        };
        assert_eq!(
            config.unbound_elements().unwrap(),
            vec![ViewElement::ContextBar, ViewElement::ContextItems]
        );

        let config = AppConfig {
            unbound_elements: Some("sidebar".to_string()),
            ..config
        };
        assert!(matches!(
            config.unbound_elements(),
            Err(ConfigError::Elements(_))
        ));
    }
}
