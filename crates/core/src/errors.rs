use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::key::Product;
use crate::geo::GeoError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unsupported price key `{key}`: {reason}")]
    KeyFormat { key: String, reason: String },
    #[error("incomplete {product} key cannot be serialized: variant and deductible are required")]
    IncompleteKey { product: Product },
    #[error("constraint references `{key}` which has no price in the table")]
    MissingPrice { key: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub(crate) fn key_format(key: &str, reason: impl Into<String>) -> Self {
        Self::KeyFormat { key: key.to_owned(), reason: reason.into() }
    }

    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::KeyFormat { .. } | Self::IncompleteKey { .. })
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid input: {0}")]
    Input(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<ConfigError> for ApplicationError {
    fn from(error: ConfigError) -> Self {
        Self::Configuration(error.to_string())
    }
}

impl From<GeoError> for ApplicationError {
    fn from(error: GeoError) -> Self {
        Self::Configuration(error.to_string())
    }
}

impl ApplicationError {
    /// Stable machine-readable class used in CLI payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(error) if error.is_format_error() => "key_format",
            Self::Domain(_) => "domain_invariant",
            Self::Input(_) => "input",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Input(_) => 3,
            Self::Domain(_) => 4,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(error) if error.is_format_error() => {
                "The price table contains a key that could not be parsed. Fix the input and retry."
            }
            Self::Domain(_) => "The price table could not be repaired consistently.",
            Self::Input(_) => "The input file could not be read as a JSON price table.",
            Self::Configuration(_) => "The configuration is invalid. Run `tariff config` to inspect it.",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::key::Product;
    use crate::errors::{ApplicationError, DomainError};
    use crate::geo::GeoError;

    #[test]
    fn key_format_error_maps_to_key_format_class() {
        let error = ApplicationError::from(DomainError::key_format("casco", "missing variant"));

        assert_eq!(error.error_class(), "key_format");
        assert_eq!(error.exit_code(), 4);
        assert!(error.to_string().contains("`casco`"));
    }

    #[test]
    fn incomplete_key_counts_as_format_error() {
        let error = DomainError::IncompleteKey { product: Product::Casco };

        assert!(error.is_format_error());
        assert_eq!(
            error.to_string(),
            "incomplete casco key cannot be serialized: variant and deductible are required"
        );
    }

    #[test]
    fn missing_price_is_an_invariant_class() {
        let error =
            ApplicationError::from(DomainError::MissingPrice { key: "casco_basic_100".to_owned() });

        assert_eq!(error.error_class(), "domain_invariant");
        assert_eq!(error.user_message(), "The price table could not be repaired consistently.");
    }

    #[test]
    fn input_and_configuration_errors_have_distinct_exit_codes() {
        assert_eq!(ApplicationError::Input("bad json".to_owned()).exit_code(), 3);
        assert_eq!(ApplicationError::Configuration("bad alpha".to_owned()).exit_code(), 2);
        assert_eq!(
            ApplicationError::Configuration("bad alpha".to_owned()).error_class(),
            "config_validation"
        );
    }

    #[test]
    fn geo_errors_surface_as_configuration_failures() {
        let error = ApplicationError::from(GeoError::UnknownReferenceCountry("XX".to_owned()));

        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("`XX`"));
    }
}
