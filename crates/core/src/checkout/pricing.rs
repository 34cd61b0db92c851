use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checkout::categories::{category_quantity, reduce_categories};
use crate::domain::cart::Cart;
use crate::domain::product::ProductType;
use crate::errors::DomainError;

pub const BASE_DELIVERY_PRICE: u32 = 5;
pub const DELIVERY_BUNDLE_SIZE: u32 = 5;
pub const SELLING_ROUND_STEP: u32 = 5;

/// Delivery and rounding constants used by the pack pricing rule. All
/// amounts are strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PricingPolicy {
    base_delivery_price: Decimal,
    delivery_bundle_size: u32,
    selling_round_step: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            base_delivery_price: Decimal::from(BASE_DELIVERY_PRICE),
            delivery_bundle_size: DELIVERY_BUNDLE_SIZE,
            selling_round_step: Decimal::from(SELLING_ROUND_STEP),
        }
    }
}

impl PricingPolicy {
    pub fn new(
        base_delivery_price: Decimal,
        delivery_bundle_size: u32,
        selling_round_step: Decimal,
    ) -> Result<Self, DomainError> {
        if base_delivery_price <= Decimal::ZERO {
            return Err(DomainError::InvariantViolation(
                "base delivery price must be greater than zero".to_owned(),
            ));
        }
        if delivery_bundle_size == 0 {
            return Err(DomainError::InvariantViolation(
                "delivery bundle size must be greater than zero".to_owned(),
            ));
        }
        if selling_round_step <= Decimal::ZERO {
            return Err(DomainError::InvariantViolation(
                "selling round step must be greater than zero".to_owned(),
            ));
        }

        Ok(Self { base_delivery_price, delivery_bundle_size, selling_round_step })
    }

    pub fn base_delivery_price(&self) -> Decimal {
        self.base_delivery_price
    }

    pub fn delivery_bundle_size(&self) -> u32 {
        self.delivery_bundle_size
    }

    pub fn selling_round_step(&self) -> Decimal {
        self.selling_round_step
    }

    /// Product value covered by one delivery fee when no bottles are ordered.
    fn delivery_bundle_value(&self) -> Decimal {
        self.base_delivery_price.saturating_mul(Decimal::from(self.delivery_bundle_size))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum DeliveryRule {
    PerBottle { bottles: u64 },
    ByProductValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub products_total: Decimal,
    pub delivery_total: Decimal,
    pub grand_total: Decimal,
    pub rounded_selling_total: Decimal,
    pub packs: u64,
    pub delivery_rule: DeliveryRule,
    pub trace: Vec<PricingTraceStep>,
}

pub trait PricingEngine: Send + Sync {
    fn price(&self, cart: &Cart) -> PriceBreakdown;
}

#[derive(Clone, Debug, Default)]
pub struct PackPricingEngine {
    policy: PricingPolicy,
}

impl PackPricingEngine {
    pub fn new(policy: PricingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }
}

impl PricingEngine for PackPricingEngine {
    fn price(&self, cart: &Cart) -> PriceBreakdown {
        price_cart_with_trace(cart, &self.policy)
    }
}

/// Number of complete bottle + ice + mixer packs the cart can form.
pub fn count_packs(cart: &Cart) -> u64 {
    let categories = reduce_categories(cart);
    ProductType::PACK_CATEGORIES
        .iter()
        .map(|category| category_quantity(&categories, category).unwrap_or(0))
        .min()
        .unwrap_or(0)
}

pub fn price_cart(cart: &Cart, policy: &PricingPolicy) -> (Decimal, Decimal) {
    let breakdown = price_cart_with_trace(cart, policy);
    (breakdown.products_total, breakdown.delivery_total)
}

/// Prices a cart and records each intermediate amount. Decimal arithmetic
/// saturates at `Decimal::MAX` instead of panicking on absurd quantities or
/// prices.
pub fn price_cart_with_trace(cart: &Cart, policy: &PricingPolicy) -> PriceBreakdown {
    let categories = reduce_categories(cart);
    let mut trace = Vec::new();

    let mut packs = u64::MAX;
    for category in ProductType::PACK_CATEGORIES.iter() {
        let quantity = category_quantity(&categories, category).unwrap_or(0);
        trace.push(PricingTraceStep {
            stage: "category_quantity".to_owned(),
            detail: format!("{category} units"),
            amount: Decimal::from(quantity),
        });
        packs = packs.min(quantity);
    }
    trace.push(PricingTraceStep {
        stage: "packs".to_owned(),
        detail: "min(bottle, ice, mixer)".to_owned(),
        amount: Decimal::from(packs),
    });

    // Every item claims the full pack count on its own; there is no shared
    // pack budget across items of one category.
    let mut products_total = Decimal::ZERO;
    for category in &categories {
        for item in &category.items {
            let product_packs = packs;
            let product_base = u64::from(item.quantity).saturating_sub(product_packs);
            let item_cost = Decimal::from(product_base)
                .saturating_mul(item.product.price.base)
                .saturating_add(Decimal::from(product_packs).saturating_mul(item.product.price.pack));

            trace.push(PricingTraceStep {
                stage: "item".to_owned(),
                detail: format!(
                    "{} ({}): {product_base} x base + {product_packs} x pack",
                    item.product.id, category.product_type
                ),
                amount: item_cost,
            });
            products_total = products_total.saturating_add(item_cost);
        }
    }
    trace.push(PricingTraceStep {
        stage: "products_total".to_owned(),
        detail: "sum(item cost)".to_owned(),
        amount: products_total,
    });

    let (delivery_rule, delivery_total) =
        match category_quantity(&categories, &ProductType::Bottle) {
            Some(bottles) => (
                DeliveryRule::PerBottle { bottles },
                Decimal::from(bottles).saturating_mul(policy.base_delivery_price),
            ),
            None => (
                DeliveryRule::ByProductValue,
                ceil_div(products_total, policy.delivery_bundle_value())
                    .saturating_mul(policy.base_delivery_price),
            ),
        };
    trace.push(PricingTraceStep {
        stage: "delivery_total".to_owned(),
        detail: match delivery_rule {
            DeliveryRule::PerBottle { .. } => "bottles x base delivery price".to_owned(),
            DeliveryRule::ByProductValue => {
                "ceil(products / delivery bundle value) x base delivery price".to_owned()
            }
        },
        amount: delivery_total,
    });

    let grand_total = products_total.saturating_add(delivery_total);
    let rounded_selling_total = ceil_div(grand_total, policy.selling_round_step)
        .saturating_mul(policy.selling_round_step);
    trace.push(PricingTraceStep {
        stage: "grand_total".to_owned(),
        detail: "products + delivery".to_owned(),
        amount: grand_total,
    });
    trace.push(PricingTraceStep {
        stage: "rounded_selling_total".to_owned(),
        detail: "grand total rounded up to the selling step".to_owned(),
        amount: rounded_selling_total,
    });

    PriceBreakdown {
        products_total,
        delivery_total,
        grand_total,
        rounded_selling_total,
        packs,
        delivery_rule,
        trace,
    }
}

/// `ceil(amount / divisor)`; a quotient too large for `Decimal` saturates.
fn ceil_div(amount: Decimal, divisor: Decimal) -> Decimal {
    amount.checked_div(divisor).map(|quotient| quotient.ceil()).unwrap_or(Decimal::MAX)
}
