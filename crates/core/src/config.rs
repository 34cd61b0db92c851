use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkout::catalog::{Catalog, CatalogError};
use crate::checkout::pricing::{
    PricingPolicy, BASE_DELIVERY_PRICE, DELIVERY_BUNDLE_SIZE, SELLING_ROUND_STEP,
};

pub const CONFIG_FILE_NAME: &str = "dropcart.toml";
pub const NESTED_CONFIG_FILE: &str = "config/dropcart.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogConfig {
    /// Catalog JSON file. The bundled catalog is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub base_delivery_price: Decimal,
    pub delivery_bundle_size: u32,
    pub selling_round_step: Decimal,
    pub currency_symbol: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub base_delivery_price: Option<Decimal>,
    pub currency_symbol: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_delivery_price: Decimal::from(BASE_DELIVERY_PRICE),
            delivery_bundle_size: DELIVERY_BUNDLE_SIZE,
            selling_round_step: Decimal::from(SELLING_ROUND_STEP),
            currency_symbol: "€".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            pricing: PricingConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Pricing constants for the pack pricing engine. Only fails for a config
    /// that skipped `validate`.
    pub fn pricing_policy(&self) -> Result<PricingPolicy, ConfigError> {
        PricingPolicy::new(
            self.pricing.base_delivery_price,
            self.pricing.delivery_bundle_size,
            self.pricing.selling_round_step,
        )
        .map_err(|error| ConfigError::Validation(error.to_string()))
    }

    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        let catalog = match &self.catalog.path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin()?,
        };
        Ok(catalog)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = Some(path);
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(base_delivery_price) = pricing.base_delivery_price {
                self.pricing.base_delivery_price = base_delivery_price;
            }
            if let Some(delivery_bundle_size) = pricing.delivery_bundle_size {
                self.pricing.delivery_bundle_size = delivery_bundle_size;
            }
            if let Some(selling_round_step) = pricing.selling_round_step {
                self.pricing.selling_round_step = selling_round_step;
            }
            if let Some(currency_symbol) = pricing.currency_symbol {
                self.pricing.currency_symbol = currency_symbol;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("DROPCART_CATALOG_PATH") {
            self.catalog.path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("DROPCART_PRICING_BASE_DELIVERY_PRICE") {
            self.pricing.base_delivery_price =
                parse_decimal("DROPCART_PRICING_BASE_DELIVERY_PRICE", &value)?;
        }
        if let Some(value) = read_env("DROPCART_PRICING_DELIVERY_BUNDLE_SIZE") {
            self.pricing.delivery_bundle_size =
                parse_u32("DROPCART_PRICING_DELIVERY_BUNDLE_SIZE", &value)?;
        }
        if let Some(value) = read_env("DROPCART_PRICING_SELLING_ROUND_STEP") {
            self.pricing.selling_round_step =
                parse_decimal("DROPCART_PRICING_SELLING_ROUND_STEP", &value)?;
        }
        if let Some(value) = read_env("DROPCART_PRICING_CURRENCY_SYMBOL") {
            self.pricing.currency_symbol = value;
        }

        let log_level =
            read_env("DROPCART_LOGGING_LEVEL").or_else(|| read_env("DROPCART_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("DROPCART_LOGGING_FORMAT").or_else(|| read_env("DROPCART_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = Some(catalog_path);
        }
        if let Some(base_delivery_price) = overrides.base_delivery_price {
            self.pricing.base_delivery_price = base_delivery_price;
        }
        if let Some(currency_symbol) = overrides.currency_symbol {
            self.pricing.currency_symbol = currency_symbol;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if let Some(path) = &catalog.path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "catalog.path must not be empty when set (unset it to use the bundled catalog)"
                    .to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if pricing.base_delivery_price <= Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.base_delivery_price must be greater than zero".to_string(),
        ));
    }

    if pricing.delivery_bundle_size == 0 {
        return Err(ConfigError::Validation(
            "pricing.delivery_bundle_size must be greater than zero".to_string(),
        ));
    }

    if pricing.selling_round_step <= Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.selling_round_step must be greater than zero".to_string(),
        ));
    }

    if pricing.currency_symbol.trim().is_empty() {
        return Err(ConfigError::Validation(
            "pricing.currency_symbol must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    base_delivery_price: Option<Decimal>,
    delivery_bundle_size: Option<u32>,
    selling_round_step: Option<Decimal>,
    currency_symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
