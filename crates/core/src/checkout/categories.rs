use serde::{Deserialize, Serialize};

use crate::domain::cart::{Cart, CartItem};
use crate::domain::product::ProductType;

/// Per-category view of a cart: total units and the items ordered from the
/// highest to the lowest base price. The unit total is widened to `u64` so
/// several items at the `u32` ceiling still add up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducedCategory {
    pub product_type: ProductType,
    pub quantity: u64,
    pub items: Vec<CartItem>,
}

/// Groups cart items by category in order of first appearance. Items that
/// share a base price keep their cart order.
pub fn reduce_categories(cart: &Cart) -> Vec<ReducedCategory> {
    let mut categories: Vec<ReducedCategory> = Vec::new();

    for item in cart.items() {
        let existing =
            categories.iter().position(|category| category.product_type == item.product.product_type);
        match existing {
            Some(index) => {
                let category = &mut categories[index];
                category.quantity += u64::from(item.quantity);
                category.items.push(item.clone());
            }
            None => categories.push(ReducedCategory {
                product_type: item.product.product_type.clone(),
                quantity: u64::from(item.quantity),
                items: vec![item.clone()],
            }),
        }
    }

    for category in &mut categories {
        // `sort_by` is stable
        category.items.sort_by(|a, b| b.product.price.base.cmp(&a.product.price.base));
    }

    categories
}

pub fn category_quantity(categories: &[ReducedCategory], product_type: &ProductType) -> Option<u64> {
    categories
        .iter()
        .find(|category| &category.product_type == product_type)
        .map(|category| category.quantity)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::cart::{Cart, CartItem, CartOperation};
    use crate::domain::product::{Price, Product, ProductId, ProductType};

    use super::{category_quantity, reduce_categories};

    fn product(id: &str, product_type: &str, base: i64) -> Product {
        Product {
            id: ProductId(id.to_owned()),
            name: id.to_owned(),
            product_type: ProductType::from(product_type),
            price: Price { base: Decimal::new(base, 0), pack: Decimal::new(base, 0) },
        }
    }

    fn add(cart: Cart, product: &Product, times: u32) -> Cart {
        (0..times).fold(cart, |cart, _| cart.apply(product, CartOperation::Add))
    }

    #[test]
    fn groups_by_category_in_first_appearance_order() {
        let cart = add(Cart::new(), &product("ice", "ice", 1), 2);
        let cart = add(cart, &product("gin", "bottle", 18), 1);
        let cart = add(cart, &product("vodka", "bottle", 16), 3);

        let categories = reduce_categories(&cart);
        let tags: Vec<&str> = categories.iter().map(|c| c.product_type.as_str()).collect();

        assert_eq!(tags, vec!["ice", "bottle"]);
        assert_eq!(category_quantity(&categories, &ProductType::Bottle), Some(4));
        assert_eq!(category_quantity(&categories, &ProductType::Ice), Some(2));
        assert_eq!(category_quantity(&categories, &ProductType::Mixer), None);
    }

    #[test]
    fn items_sort_by_descending_base_price() {
        let cart = add(Cart::new(), &product("cheap", "bottle", 10), 1);
        let cart = add(cart, &product("premium", "bottle", 30), 1);
        let cart = add(cart, &product("mid", "bottle", 20), 1);

        let categories = reduce_categories(&cart);
        let order: Vec<&str> =
            categories[0].items.iter().map(|item| item.product.id.as_str()).collect();

        assert_eq!(order, vec!["premium", "mid", "cheap"]);
    }

    #[test]
    fn equal_prices_keep_insertion_order() {
        let cart = add(Cart::new(), &product("tonic", "mixer", 3), 1);
        let cart = add(cart, &product("premium", "mixer", 5), 1);
        let cart = add(cart, &product("cola", "mixer", 3), 1);

        let categories = reduce_categories(&cart);
        let order: Vec<&str> =
            categories[0].items.iter().map(|item| item.product.id.as_str()).collect();

        assert_eq!(order, vec!["premium", "tonic", "cola"]);
    }

    #[test]
    fn category_totals_do_not_wrap_at_item_quantity_limit() {
        let half = u32::MAX / 2 + 1;
        let cart = Cart::from_items(vec![
            CartItem { product: product("gin", "bottle", 18), quantity: half },
            CartItem { product: product("vodka", "bottle", 16), quantity: half },
        ])
        .expect("valid cart");

        let categories = reduce_categories(&cart);
        assert_eq!(
            category_quantity(&categories, &ProductType::Bottle),
            Some(u64::from(half) * 2)
        );
    }

    #[test]
    fn empty_cart_has_no_categories() {
        assert!(reduce_categories(&Cart::new()).is_empty());
    }
}
