use std::collections::BTreeMap;

use tracing::info;

use crate::domain::table::RawPriceTable;
use crate::geo::{GeoError, GEO_ROUNDING_STEP};
use crate::repair::rounding::round_half_up;

/// `factor[c] = (wage[c] / wage[reference]) ^ alpha`.
///
/// `alpha` below 1 compresses the spread between countries; the reference
/// country always ends up at 1.0.
pub fn compute_country_factors(
    wages: &BTreeMap<String, f64>,
    reference_country: &str,
    alpha: f64,
) -> Result<BTreeMap<String, f64>, GeoError> {
    let reference_wage = *wages
        .get(reference_country)
        .ok_or_else(|| GeoError::UnknownReferenceCountry(reference_country.to_owned()))?;
    if reference_wage <= 0.0 {
        return Err(GeoError::NonPositiveReferenceWage {
            country: reference_country.to_owned(),
            wage: reference_wage,
        });
    }

    Ok(wages
        .iter()
        .map(|(country, wage)| (country.clone(), (wage / reference_wage).powf(alpha)))
        .collect())
}

/// Scales every price by the country's factor (1.0 when unknown) and rounds
/// to the nearest 5 EUR.
pub fn adjust_prices_for_country(
    prices: &RawPriceTable,
    country_code: &str,
    country_factors: &BTreeMap<String, f64>,
) -> RawPriceTable {
    let factor = country_factors.get(country_code).copied().unwrap_or(1.0);
    info!(
        event_name = "geo.country.projected",
        country = country_code,
        factor,
        keys = prices.len(),
        "price table projected to country"
    );

    prices
        .iter()
        .map(|(key, price)| (key.clone(), round_half_up(price * factor, GEO_ROUNDING_STEP)))
        .collect()
}
