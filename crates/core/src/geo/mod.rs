//! Geographic projection of a repaired price table: country relativities
//! from wages, then city relativities from accident statistics.

pub mod city;
pub mod country;
pub mod data;

use thiserror::Error;

pub use city::{
    adjust_prices_for_city, city_deductible_multiplier, compute_city_factors, CityFactorParams,
    NationalTotals,
};
pub use country::{adjust_prices_for_country, compute_country_factors};

/// Grid for geo-adjusted prices (EUR).
pub const GEO_ROUNDING_STEP: f64 = 5.0;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("no wage figure for reference country `{0}`")]
    UnknownReferenceCountry(String),
    #[error("reference wage for `{country}` must be positive, got {wage}")]
    NonPositiveReferenceWage { country: String, wage: f64 },
}
