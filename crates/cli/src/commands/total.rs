use std::fmt;
use std::str::FromStr;

use dropcart_core::checkout::CartView;
use dropcart_core::{ApplicationError, CartOperation, CartSession, PackPricingEngine, ProductId};

use crate::commands::{format_amount, interface_failure, load_config, CommandResult};

/// Largest repeat count accepted for a single step.
pub const MAX_STEP_COUNT: u32 = 10_000;

/// One `add:<id>[:<count>]` or `remove:<id>[:<count>]` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartStep {
    pub operation: CartOperation,
    pub product_id: ProductId,
    pub count: u32,
}

impl FromStr for CartStep {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.trim().splitn(3, ':');
        let operation = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("add") => CartOperation::Add,
            Some("remove") | Some("rm") => CartOperation::Remove,
            _ => {
                return Err(format!(
                    "invalid step `{value}` (expected add:<product-id>[:<count>] or remove:<product-id>[:<count>])"
                ))
            }
        };

        let product_id = match parts.next().map(str::trim) {
            Some(id) if !id.is_empty() => ProductId(id.to_string()),
            _ => return Err(format!("step `{value}` is missing a product id")),
        };

        let count = match parts.next() {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(count) if count > MAX_STEP_COUNT => {
                    return Err(format!(
                        "step `{value}` repeats {count} times (at most {MAX_STEP_COUNT} allowed)"
                    ))
                }
                Ok(count) if count > 0 => count,
                _ => return Err(format!("step `{value}` has an invalid count `{raw}`")),
            },
            None => 1,
        };

        Ok(Self { operation, product_id, count })
    }
}

impl fmt::Display for CartStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operation = match self.operation {
            CartOperation::Add => "add",
            CartOperation::Remove => "remove",
        };
        write!(f, "{operation}:{}:{}", self.product_id, self.count)
    }
}

pub fn run(steps: &[CartStep], json_output: bool) -> CommandResult {
    let config = match load_config("total") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let catalog = match config.load_catalog() {
        Ok(catalog) => catalog,
        Err(error) => return interface_failure("total", "catalog_ingestion", error, 3),
    };

    let policy = match config.pricing_policy() {
        Ok(policy) => policy,
        Err(error) => return interface_failure("total", "config_validation", error, 2),
    };

    let mut session = CartSession::new(catalog, PackPricingEngine::new(policy));
    for step in steps {
        for _ in 0..step.count {
            match session.apply(&step.product_id, step.operation) {
                Ok(quantity) => tracing::debug!(
                    event_name = "cart.step_applied",
                    product_id = %step.product_id,
                    operation = ?step.operation,
                    quantity,
                    "cart step applied"
                ),
                Err(error) => {
                    let interface = ApplicationError::from(error).into_interface(step.to_string());
                    return CommandResult::failure(
                        "total",
                        "unknown_product",
                        format!("{interface} ({})", interface.user_message()),
                        4,
                    );
                }
            }
        }
    }

    let view = session.view();
    tracing::info!(
        event_name = "pricing.breakdown_computed",
        items = session.cart().len(),
        packs = view.breakdown.packs,
        grand_total = %view.breakdown.grand_total,
        "cart priced"
    );

    if !json_output {
        return CommandResult::plain(render_human(&view, &config.pricing.currency_symbol));
    }

    let summary = format!(
        "total {}",
        format_amount(view.breakdown.rounded_selling_total, &config.pricing.currency_symbol)
    );
    match serde_json::to_value(&view) {
        Ok(data) => CommandResult::success_with_data("total", summary, Some(data)),
        Err(error) => CommandResult::failure("total", "serialization", error.to_string(), 5),
    }
}

fn render_human(view: &CartView, symbol: &str) -> String {
    let mut lines = Vec::new();

    for line in view.lines.iter().filter(|line| line.quantity > 0) {
        lines.push(format!("- {} x{}", line.name, line.quantity));
    }
    if lines.is_empty() {
        lines.push("cart is empty".to_string());
    }

    let breakdown = &view.breakdown;
    lines.push(format!("Products: {}", format_amount(breakdown.products_total, symbol)));
    lines.push(format!("Delivery: {}", format_amount(breakdown.delivery_total, symbol)));
    lines.push(format!("Total: {}", format_amount(breakdown.grand_total, symbol)));
    lines.push(format!("Selling total: {}", format_amount(breakdown.rounded_selling_total, symbol)));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use dropcart_core::{CartOperation, ProductId};

    use super::{CartStep, MAX_STEP_COUNT};

    #[test]
    fn parses_step_with_and_without_count() {
        let single: CartStep = "add:ice-2kg".parse().expect("valid step");
        assert_eq!(
            single,
            CartStep {
                operation: CartOperation::Add,
                product_id: ProductId("ice-2kg".to_string()),
                count: 1
            }
        );

        let repeated: CartStep = "remove:gin-70cl:3".parse().expect("valid step");
        assert_eq!(repeated.operation, CartOperation::Remove);
        assert_eq!(repeated.count, 3);
    }

    #[test]
    fn rejects_malformed_steps() {
        assert!("buy:ice-2kg".parse::<CartStep>().is_err());
        assert!("add:".parse::<CartStep>().is_err());
        assert!("add:ice-2kg:0".parse::<CartStep>().is_err());
        assert!("add:ice-2kg:many".parse::<CartStep>().is_err());
    }

    #[test]
    fn rejects_counts_above_the_step_limit() {
        let error = "add:vodka-70cl:4000000000".parse::<CartStep>().expect_err("count too large");
        assert!(error.contains("at most"));

        let at_limit: CartStep =
            format!("add:vodka-70cl:{MAX_STEP_COUNT}").parse().expect("limit is accepted");
        assert_eq!(at_limit.count, MAX_STEP_COUNT);
    }

    #[test]
    fn display_round_trips_through_parse() {
        let step: CartStep = "rm:tonic-1l:2".parse().expect("valid step");
        assert_eq!(step.to_string(), "remove:tonic-1l:2");
    }
}
