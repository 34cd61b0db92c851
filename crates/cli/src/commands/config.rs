use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dropcart_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let catalog_path = config
        .catalog
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<bundled>".to_string());
    lines.push(render_line(
        "catalog.path",
        &catalog_path,
        source("catalog.path", &["DROPCART_CATALOG_PATH"]),
    ));

    lines.push(render_line(
        "pricing.base_delivery_price",
        &config.pricing.base_delivery_price.normalize().to_string(),
        source("pricing.base_delivery_price", &["DROPCART_PRICING_BASE_DELIVERY_PRICE"]),
    ));
    lines.push(render_line(
        "pricing.delivery_bundle_size",
        &config.pricing.delivery_bundle_size.to_string(),
        source("pricing.delivery_bundle_size", &["DROPCART_PRICING_DELIVERY_BUNDLE_SIZE"]),
    ));
    lines.push(render_line(
        "pricing.selling_round_step",
        &config.pricing.selling_round_step.normalize().to_string(),
        source("pricing.selling_round_step", &["DROPCART_PRICING_SELLING_ROUND_STEP"]),
    ));
    lines.push(render_line(
        "pricing.currency_symbol",
        &config.pricing.currency_symbol,
        source("pricing.currency_symbol", &["DROPCART_PRICING_CURRENCY_SYMBOL"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["DROPCART_LOGGING_LEVEL", "DROPCART_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["DROPCART_LOGGING_FORMAT", "DROPCART_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    for env_key in env_keys {
        let set = env::var(env_key).map(|value| !value.trim().is_empty()).unwrap_or(false);
        if set {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::{contains_path, render_line};

    #[test]
    fn nested_keys_are_found_in_toml_documents() {
        let doc: toml::Value =
            "[pricing]\nbase_delivery_price = 4\n".parse().expect("toml document");

        assert!(contains_path(&doc, "pricing.base_delivery_price"));
        assert!(!contains_path(&doc, "pricing.currency_symbol"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn rendered_line_names_the_source() {
        assert_eq!(
            render_line("logging.level", "info", "default".to_string()),
            "- logging.level = info (source: default)"
        );
    }
}
