use anyhow::Context;
use dropcart_core::config::AppConfig;
use dropcart_core::Catalog;

use crate::commands::{format_amount, interface_failure, load_config, CommandResult};

pub fn run(json_output: bool) -> CommandResult {
    let config = match load_config("catalog") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let catalog = match config.load_catalog() {
        Ok(catalog) => catalog,
        Err(error) => return interface_failure("catalog", "catalog_ingestion", error, 3),
    };
    tracing::info!(
        event_name = "catalog.loaded",
        product_count = catalog.len(),
        "catalog loaded"
    );

    if !json_output {
        return CommandResult::plain(render_human(&catalog, &config));
    }

    match serde_json::to_value(catalog.products()).context("serializing catalog products") {
        Ok(data) => CommandResult::success_with_data(
            "catalog",
            format!("{} products", catalog.len()),
            Some(data),
        ),
        Err(error) => CommandResult::failure("catalog", "serialization", format!("{error:#}"), 5),
    }
}

fn render_human(catalog: &Catalog, config: &AppConfig) -> String {
    let symbol = &config.pricing.currency_symbol;
    let mut lines = vec![format!("catalog ({} products):", catalog.len())];

    for product in catalog.products() {
        lines.push(format!(
            "- {} {} [{}] base {} / pack {}",
            product.id,
            product.name,
            product.product_type,
            format_amount(product.price.base, symbol),
            format_amount(product.price.pack, symbol),
        ));
    }

    lines.join("\n")
}
