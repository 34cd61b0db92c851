use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Category tag of a product. The three pack categories are modelled
/// explicitly; any other tag is carried through trimmed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
    Bottle,
    Ice,
    Mixer,
    Other(CustomTag),
}

/// Tag of a category outside the pack rule. Only built through
/// `ProductType::from`, so it never spells a pack category.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CustomTag(String);

impl CustomTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ProductType {
    /// Categories that together form one discounted pack, in evaluation order.
    pub const PACK_CATEGORIES: [ProductType; 3] =
        [ProductType::Bottle, ProductType::Ice, ProductType::Mixer];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Bottle => "bottle",
            Self::Ice => "ice",
            Self::Mixer => "mixer",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

impl From<String> for ProductType {
    fn from(value: String) -> Self {
        let tag = value.trim();
        if tag.eq_ignore_ascii_case("bottle") {
            Self::Bottle
        } else if tag.eq_ignore_ascii_case("ice") {
            Self::Ice
        } else if tag.eq_ignore_ascii_case("mixer") {
            Self::Mixer
        } else {
            Self::Other(CustomTag(tag.to_owned()))
        }
    }
}

impl From<&str> for ProductType {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<ProductType> for String {
    fn from(value: ProductType) -> Self {
        match value {
            ProductType::Other(tag) => tag.0,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Per-unit price outside a pack.
    pub base: Decimal,
    /// Per-unit price when the unit is part of a matched pack.
    pub pack: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub price: Price,
}
