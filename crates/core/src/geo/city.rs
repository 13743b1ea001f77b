use std::collections::BTreeMap;

use tracing::info;

use crate::domain::key::STANDARD_DEDUCTIBLES;
use crate::domain::table::RawPriceTable;
use crate::geo::data::{BASE_DEDUCTIBLE_FACTORS, CITY_DEDUCTIBLE_FACTORS_RS};
use crate::geo::GEO_ROUNDING_STEP;
use crate::repair::rounding::round_half_up;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CityFactorParams {
    pub min_factor: f64,
    pub max_factor: f64,
    /// How strongly a risk difference turns into a price difference.
    pub gamma: f64,
}

impl Default for CityFactorParams {
    fn default() -> Self {
        Self { min_factor: 0.9, max_factor: 1.2, gamma: 0.2 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NationalTotals {
    pub population: u64,
    pub accidents: u64,
}

/// Relative risk factor per city.
///
/// With accident counts: `clamp(1 + gamma * (rate_city / avg_rate - 1))`, where
/// `avg_rate` comes from the national totals when given and from the pooled
/// cities otherwise. A city without population or accidents is treated as
/// average. Without accident counts the factor spreads linearly over
/// `[min_factor, max_factor]` by population.
pub fn compute_city_factors(
    populations: &BTreeMap<String, u64>,
    accidents: Option<&BTreeMap<String, u64>>,
    params: CityFactorParams,
    national: Option<NationalTotals>,
) -> BTreeMap<String, f64> {
    match accidents.filter(|accidents| !accidents.is_empty()) {
        Some(accidents) => accident_factors(populations, accidents, params, national),
        None => population_factors(populations, params),
    }
}

fn population_factors(
    populations: &BTreeMap<String, u64>,
    params: CityFactorParams,
) -> BTreeMap<String, f64> {
    let (Some(pop_min), Some(pop_max)) =
        (populations.values().min().copied(), populations.values().max().copied())
    else {
        return BTreeMap::new();
    };

    let range = pop_max - pop_min;
    if range == 0 {
        return uniform(populations);
    }

    populations
        .iter()
        .map(|(city, population)| {
            let fraction = (population - pop_min) as f64 / range as f64;
            let factor = params.min_factor + fraction * (params.max_factor - params.min_factor);
            (city.clone(), factor)
        })
        .collect()
}

fn accident_factors(
    populations: &BTreeMap<String, u64>,
    accidents: &BTreeMap<String, u64>,
    params: CityFactorParams,
    national: Option<NationalTotals>,
) -> BTreeMap<String, f64> {
    let mut rates = BTreeMap::new();
    let mut pooled_population = 0_u64;
    let mut pooled_accidents = 0_u64;

    for (city, &population) in populations {
        let city_accidents = accidents.get(city).copied().unwrap_or(0);
        let rate = if population > 0 && city_accidents > 0 {
            pooled_population += population;
            pooled_accidents += city_accidents;
            Some(city_accidents as f64 / population as f64)
        } else {
            None
        };
        rates.insert(city.clone(), rate);
    }

    let average_rate = match national.filter(|totals| totals.population > 0) {
        Some(totals) => totals.accidents as f64 / totals.population as f64,
        None if pooled_population == 0 || pooled_accidents == 0 => return uniform(populations),
        None => pooled_accidents as f64 / pooled_population as f64,
    };

    rates
        .into_iter()
        .map(|(city, rate)| {
            let raw_risk = match rate {
                Some(rate) if average_rate > 0.0 => rate / average_rate,
                _ => 1.0,
            };
            let factor = 1.0 + params.gamma * (raw_risk - 1.0);
            (city, factor.clamp(params.min_factor, params.max_factor))
        })
        .collect()
}

fn uniform(populations: &BTreeMap<String, u64>) -> BTreeMap<String, f64> {
    populations.keys().map(|city| (city.clone(), 1.0)).collect()
}

/// City deductible factor over the country factor, 1.0 for an unknown city or
/// deductible.
pub fn city_deductible_multiplier(city: &str, deductible: u32) -> f64 {
    let Some((_, city_factors)) = CITY_DEDUCTIBLE_FACTORS_RS.iter().find(|(name, _)| *name == city)
    else {
        return 1.0;
    };

    let base_factor = lookup(&BASE_DEDUCTIBLE_FACTORS, deductible).unwrap_or(1.0);
    let city_factor = lookup(city_factors, deductible).unwrap_or(base_factor);
    if base_factor == 0.0 {
        return 1.0;
    }
    city_factor / base_factor
}

fn lookup(factors: &[(u32, f64)], deductible: u32) -> Option<f64> {
    factors.iter().find(|(candidate, _)| *candidate == deductible).map(|(_, factor)| *factor)
}

/// Applies the city risk factor, then the city deductible multiplier for keys
/// ending in a standard deductible, and rounds to the nearest 5 EUR.
pub fn adjust_prices_for_city(
    country_prices: &RawPriceTable,
    city: &str,
    city_factors: &BTreeMap<String, f64>,
) -> RawPriceTable {
    let city_factor = city_factors.get(city).copied().unwrap_or(1.0);
    info!(
        event_name = "geo.city.projected",
        city,
        factor = city_factor,
        keys = country_prices.len(),
        "price table projected to city"
    );

    country_prices
        .iter()
        .map(|(key, price)| {
            let mut adjusted = price * city_factor;
            if let Some(deductible) = deductible_suffix(key) {
                adjusted *= city_deductible_multiplier(city, deductible);
            }
            (key.clone(), round_half_up(adjusted, GEO_ROUNDING_STEP))
        })
        .collect()
}

fn deductible_suffix(key: &str) -> Option<u32> {
    key.rsplit('_')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .filter(|deductible| STANDARD_DEDUCTIBLES.contains(deductible))
}
