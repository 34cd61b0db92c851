use serde::{Deserialize, Serialize};

use crate::checkout::catalog::Catalog;
use crate::checkout::pricing::{PackPricingEngine, PriceBreakdown, PricingEngine};
use crate::domain::cart::{Cart, CartOperation};
use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartViewLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
}

/// Everything a cart screen renders: one line per catalog product with its
/// current quantity, and the price breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartView {
    pub lines: Vec<CartViewLine>,
    pub breakdown: PriceBreakdown,
}

/// Owns the catalog, the current cart and the pricing engine for a single
/// shopper. Product ids coming from the presentation layer are resolved
/// against the catalog here.
pub struct CartSession<E = PackPricingEngine> {
    catalog: Catalog,
    cart: Cart,
    engine: E,
}

impl CartSession<PackPricingEngine> {
    pub fn with_default_pricing(catalog: Catalog) -> Self {
        Self::new(catalog, PackPricingEngine::default())
    }
}

impl<E> CartSession<E>
where
    E: PricingEngine,
{
    pub fn new(catalog: Catalog, engine: E) -> Self {
        Self { catalog, cart: Cart::new(), engine }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Applies one add or remove step and returns the product's new quantity.
    pub fn apply(
        &mut self,
        product_id: &ProductId,
        operation: CartOperation,
    ) -> Result<u32, DomainError> {
        let product = self
            .catalog
            .find(product_id)
            .ok_or_else(|| DomainError::UnknownProduct { product_id: product_id.clone() })?;

        self.cart = self.cart.apply(product, operation);
        Ok(self.cart.quantity_of(product_id))
    }

    pub fn add(&mut self, product_id: &ProductId) -> Result<u32, DomainError> {
        self.apply(product_id, CartOperation::Add)
    }

    pub fn remove(&mut self, product_id: &ProductId) -> Result<u32, DomainError> {
        self.apply(product_id, CartOperation::Remove)
    }

    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.cart.quantity_of(product_id)
    }

    pub fn breakdown(&self) -> PriceBreakdown {
        self.engine.price(&self.cart)
    }

    pub fn view(&self) -> CartView {
        let lines = self
            .catalog
            .products()
            .iter()
            .map(|product| CartViewLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity: self.cart.quantity_of(&product.id),
            })
            .collect();

        CartView { lines, breakdown: self.breakdown() }
    }

    pub fn clear(&mut self) {
        self.cart = Cart::new();
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::checkout::catalog::Catalog;
    use crate::checkout::pricing::{PriceBreakdown, PricingEngine};
    use crate::domain::cart::Cart;
    use crate::domain::product::ProductId;
    use crate::errors::DomainError;

    use super::CartSession;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"[
                {"id":"vodka","name":"Vodka","type":"bottle","price":{"base":2,"pack":1.5}},
                {"id":"ice","name":"Ice","type":"ice","price":{"base":1,"pack":0.8}},
                {"id":"tonic","name":"Tonic","type":"mixer","price":{"base":3,"pack":2}}
            ]"#,
        )
        .expect("fixture catalog")
    }

    fn id(value: &str) -> ProductId {
        ProductId(value.to_owned())
    }

    #[test]
    fn taps_drive_quantities_and_breakdown() {
        let mut session = CartSession::with_default_pricing(catalog());
        for _ in 0..3 {
            session.add(&id("vodka")).expect("known product");
        }
        for _ in 0..5 {
            session.add(&id("ice")).expect("known product");
        }
        session.add(&id("tonic")).expect("known product");
        assert_eq!(session.add(&id("tonic")).expect("known product"), 2);

        let view = session.view();
        let quantities: Vec<u32> = view.lines.iter().map(|line| line.quantity).collect();
        assert_eq!(quantities, vec![3, 5, 2]);
        assert_eq!(view.breakdown.products_total, "13.6".parse::<Decimal>().expect("decimal"));
        assert_eq!(view.breakdown.rounded_selling_total, Decimal::from(30));
    }

    #[test]
    fn view_lists_untouched_products_with_zero_quantity() {
        let session = CartSession::with_default_pricing(catalog());
        let view = session.view();

        assert_eq!(view.lines.len(), 3);
        assert!(view.lines.iter().all(|line| line.quantity == 0));
        assert_eq!(view.breakdown.grand_total, Decimal::ZERO);
    }

    #[test]
    fn unknown_product_ids_are_rejected() {
        let mut session = CartSession::with_default_pricing(catalog());
        let error = session.add(&id("absinthe")).expect_err("not in catalog");

        assert_eq!(error, DomainError::UnknownProduct { product_id: id("absinthe") });
        assert!(session.cart().is_empty());
    }

    #[test]
    fn removing_a_product_not_in_the_cart_keeps_it_empty() {
        let mut session = CartSession::with_default_pricing(catalog());
        assert_eq!(session.remove(&id("vodka")).expect("known product"), 0);
        assert!(session.cart().is_empty());
    }

    #[test]
    fn session_uses_the_supplied_engine() {
        struct FlatEngine;

        impl PricingEngine for FlatEngine {
            fn price(&self, cart: &Cart) -> PriceBreakdown {
                let total = Decimal::from(cart.total_units());
                PriceBreakdown {
                    products_total: total,
                    delivery_total: Decimal::ZERO,
                    grand_total: total,
                    rounded_selling_total: total,
                    packs: 0,
                    delivery_rule: crate::checkout::pricing::DeliveryRule::ByProductValue,
                    trace: Vec::new(),
                }
            }
        }

        let mut session = CartSession::new(catalog(), FlatEngine);
        session.add(&id("vodka")).expect("known product");
        session.add(&id("ice")).expect("known product");

        assert_eq!(session.breakdown().grand_total, Decimal::from(2));

        session.clear();
        assert_eq!(session.breakdown().grand_total, Decimal::ZERO);
    }
}
