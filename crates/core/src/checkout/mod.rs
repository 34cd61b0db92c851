pub mod catalog;
pub mod categories;
pub mod pricing;
pub mod session;

pub use catalog::{Catalog, CatalogError};
pub use categories::{reduce_categories, ReducedCategory};
pub use pricing::{
    count_packs, price_cart, price_cart_with_trace, DeliveryRule, PackPricingEngine,
    PriceBreakdown, PricingEngine, PricingPolicy, PricingTraceStep, BASE_DELIVERY_PRICE,
};
pub use session::{CartSession, CartView, CartViewLine};
