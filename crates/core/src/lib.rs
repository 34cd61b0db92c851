pub mod checkout;
pub mod config;
pub mod domain;
pub mod errors;

pub use checkout::{
    Catalog, CatalogError, CartSession, CartView, PackPricingEngine, PriceBreakdown,
    PricingEngine, PricingPolicy,
};
pub use domain::cart::{Cart, CartItem, CartOperation};
pub use domain::product::{CustomTag, Price, Product, ProductId, ProductType};
pub use errors::{ApplicationError, DomainError, InterfaceError};
