use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tariff_core::config::AppConfig;
use tariff_core::geo::data::{
    average_net_wages, serbian_city_accidents, serbian_city_populations, SERBIA_ACCIDENTS_2020,
    SERBIA_POPULATION_2022,
};
use tariff_core::{
    adjust_prices_for_city, adjust_prices_for_country, compute_city_factors,
    compute_country_factors, validate_and_fix_prices, ApplicationError, NationalTotals,
    RawPriceTable,
};

use crate::commands::{load_config, load_price_table, render_json, CommandResult};

#[derive(Debug, Serialize)]
struct ProjectOutput {
    command: &'static str,
    status: &'static str,
    reference_country: String,
    country: String,
    country_factor: f64,
    city: Option<String>,
    city_factor: Option<f64>,
    issues: Vec<String>,
    prices: RawPriceTable,
}

pub fn run(input: &Path, country: &str, city: Option<&str>) -> CommandResult {
    match project(input, country, city) {
        Ok(output) => render_json("project", &output),
        Err(error) => CommandResult::from_error("project", &error),
    }
}

fn project(
    input: &Path,
    country: &str,
    city: Option<&str>,
) -> Result<ProjectOutput, ApplicationError> {
    let config = load_config()?;
    let raw = load_price_table(input)?;
    let (fixed, issues) = validate_and_fix_prices(&raw)?;

    let country_factors = compute_country_factors(
        &average_net_wages(),
        &config.geo.reference_country,
        config.geo.country_alpha,
    )?;
    let country_factor = country_factors.get(country).copied().unwrap_or(1.0);
    let mut prices = adjust_prices_for_country(&fixed, country, &country_factors);

    let mut city_factor = None;
    if let Some(city) = city {
        let city_factors = serbian_city_factors(&config);
        city_factor = Some(city_factors.get(city).copied().unwrap_or(1.0));
        prices = adjust_prices_for_city(&prices, city, &city_factors);
    }

    Ok(ProjectOutput {
        command: "project",
        status: "ok",
        reference_country: config.geo.reference_country,
        country: country.to_string(),
        country_factor,
        city: city.map(str::to_string),
        city_factor,
        issues,
        prices,
    })
}

pub(crate) fn serbian_city_factors(config: &AppConfig) -> BTreeMap<String, f64> {
    compute_city_factors(
        &serbian_city_populations(),
        Some(&serbian_city_accidents()),
        config.geo.city_params(),
        Some(NationalTotals {
            population: SERBIA_POPULATION_2022,
            accidents: SERBIA_ACCIDENTS_2020,
        }),
    )
}
