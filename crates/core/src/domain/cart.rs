use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartOperation {
    Add,
    Remove,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

/// Insertion-ordered selection of products. Every item has a quantity of at
/// least one and product ids are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from items supplied by a host, rejecting zero
    /// quantities and repeated product ids.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(DomainError::InvalidQuantity { product_id: item.product.id.clone() });
            }
            if !seen.insert(&item.product.id) {
                return Err(DomainError::DuplicateCartItem { product_id: item.product.id.clone() });
            }
        }

        Ok(Self { items })
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.position(product_id).map(|index| self.items[index].quantity).unwrap_or(0)
    }

    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Returns the cart that results from adding or removing one unit of
    /// `product`. Removing a product that is not in the cart is a no-op and
    /// adding to an item already at `u32::MAX` leaves it there.
    pub fn apply(&self, product: &Product, operation: CartOperation) -> Cart {
        let mut next = self.clone();
        next.apply_in_place(product, operation);
        next
    }

    pub fn apply_in_place(&mut self, product: &Product, operation: CartOperation) {
        let index = self.position(&product.id);

        match (operation, index) {
            (CartOperation::Add, None) => {
                self.items.push(CartItem { product: product.clone(), quantity: 1 });
            }
            (CartOperation::Add, Some(index)) => {
                self.items[index].quantity = self.items[index].quantity.saturating_add(1);
            }
            (CartOperation::Remove, None) => {}
            (CartOperation::Remove, Some(index)) => {
                let item = &mut self.items[index];
                item.quantity -= 1;
                if item.quantity == 0 {
                    self.items.remove(index);
                }
            }
        }
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| &item.product.id == product_id)
    }
}
