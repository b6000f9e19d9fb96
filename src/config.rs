use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{ForecastMethod, SourceKind};

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_lookback_days() -> usize {
    330
}

fn default_horizon_days() -> usize {
    252
}

fn default_watch_interval_minutes() -> u64 {
    1440
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub instruments: Vec<InstrumentConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: usize,
    #[serde(default = "default_horizon_days")]
    pub forecast_horizon_days: usize,
    #[serde(default = "default_watch_interval_minutes")]
    pub watch_interval_minutes: u64,
}

#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    /// One of `"chart"` | `"gold"`.
    pub name: String,
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    /// Name of a `[[sources]]` entry.
    pub source: String,
    #[serde(default = "default_true")]
    pub include_forecast: bool,
    /// `"linear_trend"` | `"feature_model"`; defaults to linear trend.
    pub forecaster: Option<String>,
    /// Override of `general.forecast_horizon_days` for this instrument.
    pub horizon_days: Option<usize>,
    /// Deliver only when the verdict is BUY or SELL.
    #[serde(default)]
    pub alert_only: bool,
}

impl InstrumentConfig {
    pub fn forecast_method(&self) -> ForecastMethod {
        self.forecaster
            .as_deref()
            .and_then(ForecastMethod::from_str)
            .unwrap_or(ForecastMethod::LinearTrend)
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(config)?;
    validate_source_names(config)?;
    validate_instrument_references(config)?;
    validate_forecasters(config)?;
    validate_symbols_unique(config)?;
    Ok(())
}

fn validate_general(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.general.lookback_days == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "general.lookback_days must be > 0".into(),
        }));
    }
    if config.general.watch_interval_minutes == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "general.watch_interval_minutes must be > 0".into(),
        }));
    }
    Ok(())
}

fn validate_source_names(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    for source in &config.sources {
        if SourceKind::from_str(&source.name).is_none() {
            return Err(Report::new(ConfigError::Validation {
                field: format!("sources: unknown source kind \"{}\"", source.name),
            }));
        }
        if source.name == "gold" && source.api_key.is_none() {
            return Err(Report::new(ConfigError::Validation {
                field: "sources[gold].api_key is required".into(),
            }));
        }
    }
    Ok(())
}

fn validate_instrument_references(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let source_names: std::collections::HashSet<&str> =
        config.sources.iter().map(|s| s.name.as_str()).collect();

    for instrument in &config.instruments {
        if !source_names.contains(instrument.source.as_str()) {
            return Err(Report::new(ConfigError::Validation {
                field: format!(
                    "instruments[symbol={}].source \"{}\" does not match any source name",
                    instrument.symbol, instrument.source
                ),
            }));
        }
    }
    Ok(())
}

fn validate_forecasters(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    for instrument in &config.instruments {
        if let Some(name) = &instrument.forecaster
            && ForecastMethod::from_str(name).is_none()
        {
            return Err(Report::new(ConfigError::Validation {
                field: format!(
                    "instruments[symbol={}].forecaster \"{}\" is not valid",
                    instrument.symbol, name
                ),
            }));
        }
    }
    Ok(())
}

fn validate_symbols_unique(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let mut seen = std::collections::HashSet::new();
    for instrument in &config.instruments {
        if !seen.insert((instrument.source.as_str(), instrument.symbol.as_str())) {
            return Err(Report::new(ConfigError::Validation {
                field: format!(
                    "instruments: duplicate symbol \"{}\" for source \"{}\"",
                    instrument.symbol, instrument.source
                ),
            }));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("parse failed")
    }

    #[test]
    fn valid_full_config_parses() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"
lookback_days = 200
forecast_horizon_days = 120
watch_interval_minutes = 60

[[sources]]
name = "chart"
base_url = "https://chart-api.example.com/pbRltCharts"

[[sources]]
name = "gold"
base_url = "https://www.goldapi.example/api"
api_key = "secret"

[telegram]
bot_token = "123:abc"
chat_id = "-100200300"

[[instruments]]
symbol = "FPT"
source = "chart"
forecaster = "feature_model"

[[instruments]]
symbol = "XAU"
source = "gold"
include_forecast = false
alert_only = true
"#;
        let config = parse(toml);
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.lookback_days, 200);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.instruments.len(), 2);
        assert_eq!(
            config.instruments[0].forecast_method(),
            ForecastMethod::FeatureModel
        );
        assert!(config.instruments[1].alert_only);
        assert!(config.telegram.is_some());
    }

    #[test]
    fn defaults_applied_when_fields_omitted() {
        let config = parse("[general]\n");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.general.lookback_days, 330);
        assert_eq!(config.general.forecast_horizon_days, 252);
        assert_eq!(config.general.watch_interval_minutes, 1440);
        assert!(config.sources.is_empty());
        assert!(config.instruments.is_empty());
        assert!(config.telegram.is_none());
    }

    #[test]
    fn instrument_defaults() {
        let toml = r#"
[general]

[[sources]]
name = "chart"
base_url = "https://chart-api.example.com"

[[instruments]]
symbol = "FPT"
source = "chart"
"#;
        let config = parse(toml);
        let instrument = &config.instruments[0];
        assert!(instrument.include_forecast);
        assert!(!instrument.alert_only);
        assert_eq!(instrument.forecast_method(), ForecastMethod::LinearTrend);
        assert_eq!(instrument.horizon_days, None);
    }

    #[test]
    fn unknown_source_kind_rejected() {
        let toml = r#"
[general]

[[sources]]
name = "bond"
base_url = "https://example.com"
"#;
        assert!(validate(&parse(toml)).is_err());
    }

    #[test]
    fn gold_source_requires_api_key() {
        let toml = r#"
[general]

[[sources]]
name = "gold"
base_url = "https://www.goldapi.example/api"
"#;
        assert!(validate(&parse(toml)).is_err());
    }

    #[test]
    fn dangling_instrument_source_rejected() {
        let toml = r#"
[general]

[[sources]]
name = "chart"
base_url = "https://example.com"

[[instruments]]
symbol = "FPT"
source = "gold"
"#;
        assert!(validate(&parse(toml)).is_err());
    }

    #[test]
    fn invalid_forecaster_rejected() {
        let toml = r#"
[general]

[[sources]]
name = "chart"
base_url = "https://example.com"

[[instruments]]
symbol = "FPT"
source = "chart"
forecaster = "arima"
"#;
        assert!(validate(&parse(toml)).is_err());
    }

    #[test]
    fn duplicate_symbols_rejected() {
        let toml = r#"
[general]

[[sources]]
name = "chart"
base_url = "https://example.com"

[[instruments]]
symbol = "FPT"
source = "chart"

[[instruments]]
symbol = "FPT"
source = "chart"
"#;
        assert!(validate(&parse(toml)).is_err());
    }

    #[test]
    fn zero_lookback_rejected() {
        let toml = r#"
[general]
lookback_days = 0
"#;
        assert!(validate(&parse(toml)).is_err());
    }
}
