pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod geo;
pub mod repair;

pub use audit::{ChangeStage, PriceChange};
pub use domain::constraint::Constraint;
pub use domain::key::{PriceKey, Product, Variant};
pub use domain::table::{PriceTable, RawPriceTable};
pub use errors::{ApplicationError, DomainError};
pub use geo::{
    adjust_prices_for_city, adjust_prices_for_country, compute_city_factors,
    compute_country_factors, CityFactorParams, GeoError, NationalTotals,
};
pub use repair::{
    repair_price_table, validate_and_fix_prices, PriceRepair, RepairPipeline, RepairReport,
};
