use thiserror::Error;

use crate::{checkout::catalog::CatalogError, config::ConfigError, domain::product::ProductId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("cart item `{product_id}` must have a quantity of at least one")]
    InvalidQuantity { product_id: ProductId },
    #[error("cart already contains an item for product `{product_id}`")]
    DuplicateCartItem { product_id: ProductId },
    #[error("product `{product_id}` is not in the catalog")]
    UnknownProduct { product_id: ProductId },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::Catalog(error) => Self::Catalog(error),
            other => Self::Configuration(other.to_string()),
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::UnknownProduct { product_id }) => {
                Self::BadRequest {
                    message: format!("unknown product `{product_id}`"),
                    correlation_id: "unassigned".to_owned(),
                }
            }
            ApplicationError::Domain(_) => Self::BadRequest {
                message: "domain validation failed".to_owned(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Catalog(error) => {
                Self::Internal { message: error.to_string(), correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::checkout::catalog::CatalogError;
    use crate::config::ConfigError;
    use crate::domain::product::ProductId;
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn unknown_product_maps_to_bad_request_naming_the_product() {
        let interface = ApplicationError::from(DomainError::UnknownProduct {
            product_id: ProductId("rum-1l".to_owned()),
        })
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest { ref message, ref correlation_id }
                if message.contains("rum-1l") && correlation_id == "req-1"
        ));
    }

    #[test]
    fn bad_request_has_user_safe_message() {
        let interface = ApplicationError::from(DomainError::InvariantViolation(
            "cart item quantity underflow".to_owned(),
        ))
        .into_interface("req-2");

        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn catalog_error_maps_to_internal() {
        let interface = ApplicationError::from(CatalogError::DuplicateProductId {
            product_id: ProductId("ice-2kg".to_owned()),
        })
        .into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface = ApplicationError::Configuration("catalog path unreadable".to_owned())
            .into_interface("req-4");

        assert!(matches!(interface, InterfaceError::Internal { ref correlation_id, .. } if correlation_id == "req-4"));
    }

    #[test]
    fn config_errors_split_into_catalog_and_configuration_failures() {
        let catalog = ApplicationError::from(ConfigError::Catalog(CatalogError::DuplicateProductId {
            product_id: ProductId("ice-2kg".to_owned()),
        }));
        assert!(matches!(catalog, ApplicationError::Catalog(_)));

        let interface = ApplicationError::from(ConfigError::Validation(
            "logging.level must be one of trace, debug, info, warn, error".to_owned(),
        ))
        .into_interface("total");
        assert!(matches!(
            interface,
            InterfaceError::Internal { ref message, ref correlation_id }
                if message.contains("logging.level") && correlation_id == "total"
        ));
    }
}
