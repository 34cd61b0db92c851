use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::product::{Product, ProductId};

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// Highest accepted unit price, base or pack.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog lists product `{product_id}` more than once")]
    DuplicateProductId { product_id: ProductId },
    #[error("catalog entry #{index} has an empty `{field}`")]
    EmptyField { index: usize, field: &'static str },
    #[error("product `{product_id}` has a negative {field} price")]
    NegativePrice { product_id: ProductId, field: &'static str },
    #[error("product `{product_id}` has a {field} price above {max}")]
    PriceTooLarge { product_id: ProductId, field: &'static str, max: Decimal },
}

/// Ordered, read-only product catalog supplied by the host.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Validates catalog preconditions; the cart and pricing code rely on
    /// them and do not check again.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());

        for (index, product) in products.iter().enumerate() {
            if product.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyField { index, field: "id" });
            }
            if product.name.trim().is_empty() {
                return Err(CatalogError::EmptyField { index, field: "name" });
            }
            if product.product_type.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyField { index, field: "type" });
            }
            if product.price.base < Decimal::ZERO {
                return Err(CatalogError::NegativePrice {
                    product_id: product.id.clone(),
                    field: "base",
                });
            }
            if product.price.pack < Decimal::ZERO {
                return Err(CatalogError::NegativePrice {
                    product_id: product.id.clone(),
                    field: "pack",
                });
            }
            for (field, price) in [("base", product.price.base), ("pack", product.price.pack)] {
                if price > MAX_UNIT_PRICE {
                    return Err(CatalogError::PriceTooLarge {
                        product_id: product.id.clone(),
                        field,
                        max: MAX_UNIT_PRICE,
                    });
                }
            }
            if !seen.insert(&product.id) {
                return Err(CatalogError::DuplicateProductId { product_id: product.id.clone() });
            }
        }

        Ok(Self { products })
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(raw)?;
        Self::new(products)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&raw)
    }

    /// Catalog bundled with the crate, used when no catalog path is configured.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::domain::product::{ProductId, ProductType};

    use super::{Catalog, CatalogError, MAX_UNIT_PRICE};

    #[test]
    fn builtin_catalog_covers_every_pack_category() {
        let catalog = Catalog::builtin().expect("builtin catalog must be valid");

        for category in ProductType::PACK_CATEGORIES {
            assert!(
                catalog.products().iter().any(|product| product.product_type == category),
                "builtin catalog is missing a {category} product"
            );
        }
    }

    #[test]
    fn catalog_preserves_source_order() {
        let catalog = Catalog::from_json(
            r#"[
                {"id":"b","name":"B","type":"ice","price":{"base":1,"pack":0.8}},
                {"id":"a","name":"A","type":"bottle","price":{"base":2,"pack":1.5}}
            ]"#,
        )
        .expect("valid catalog");

        let ids: Vec<&str> = catalog.products().iter().map(|product| product.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(catalog.find(&ProductId("a".to_owned())).is_some());
        assert!(catalog.find(&ProductId("c".to_owned())).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let error = Catalog::from_json(
            r#"[
                {"id":"a","name":"A","type":"ice","price":{"base":1,"pack":0.8}},
                {"id":"a","name":"A again","type":"ice","price":{"base":1,"pack":0.8}}
            ]"#,
        )
        .expect_err("duplicates must fail");

        assert!(matches!(error, CatalogError::DuplicateProductId { .. }));
    }

    #[test]
    fn negative_prices_are_rejected() {
        let error = Catalog::from_json(
            r#"[{"id":"a","name":"A","type":"ice","price":{"base":1,"pack":-0.5}}]"#,
        )
        .expect_err("negative pack price must fail");

        assert!(matches!(error, CatalogError::NegativePrice { field: "pack", .. }));
    }

    #[test]
    fn prices_above_the_unit_cap_are_rejected() {
        let error = Catalog::from_json(
            r#"[{"id":"cask","name":"Cask","type":"drink","price":{"base":2000000,"pack":1}}]"#,
        )
        .expect_err("oversized base price must fail");
        assert!(matches!(error, CatalogError::PriceTooLarge { field: "base", .. }));

        let at_cap = format!(
            r#"[{{"id":"cask","name":"Cask","type":"drink","price":{{"base":{MAX_UNIT_PRICE},"pack":{MAX_UNIT_PRICE}}}}}]"#
        );
        assert!(Catalog::from_json(&at_cap).is_ok());
    }

    #[test]
    fn padded_type_tags_still_join_their_pack_category() {
        let catalog = Catalog::from_json(
            r#"[{"id":"gin","name":"Gin","type":" bottle","price":{"base":18,"pack":16}}]"#,
        )
        .expect("valid catalog");

        assert_eq!(catalog.products()[0].product_type, ProductType::Bottle);
    }

    #[test]
    fn missing_price_fields_fail_to_parse() {
        let error = Catalog::from_json(r#"[{"id":"a","name":"A","type":"ice","price":{"base":1}}]"#)
            .expect_err("missing pack price must fail");

        assert!(matches!(error, CatalogError::Parse(_)));
    }

    #[test]
    fn empty_names_are_rejected() {
        let error = Catalog::from_json(
            r#"[{"id":"a","name":"  ","type":"ice","price":{"base":1,"pack":1}}]"#,
        )
        .expect_err("blank name must fail");

        assert!(matches!(error, CatalogError::EmptyField { index: 0, field: "name" }));
    }

    #[test]
    fn load_reads_catalog_from_disk() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(&path, r#"[{"id":"tonic","name":"Tonic","type":"mixer","price":{"base":3,"pack":2}}]"#)
            .expect("write catalog");

        let catalog = Catalog::load(&path).expect("catalog loads");
        assert_eq!(catalog.len(), 1);

        let missing = Catalog::load(&dir.path().join("absent.json")).expect_err("missing file");
        assert!(matches!(missing, CatalogError::Read { .. }));
    }
}
