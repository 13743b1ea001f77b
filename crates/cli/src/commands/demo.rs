use tariff_core::geo::data::{average_net_wages, CITY_POPULATION_RS};
use tariff_core::{
    adjust_prices_for_city, adjust_prices_for_country, compute_country_factors,
    validate_and_fix_prices, ApplicationError, RawPriceTable,
};

use crate::commands::project::serbian_city_factors;
use crate::commands::{load_config, render_table, CommandResult};

pub const DEMO_TARGET_COUNTRY: &str = "RS";

/// Reference-market tariff with deliberately inverted deductible ladders and
/// casco priced below limited casco.
pub fn base_prices() -> RawPriceTable {
    [
        ("mtpl", 400.0),
        ("limited_casco_compact_100", 820.0),
        ("limited_casco_compact_200", 840.0),
        ("limited_casco_compact_500", 870.0),
        ("limited_casco_basic_100", 800.0),
        ("limited_casco_basic_200", 820.0),
        ("limited_casco_basic_500", 850.0),
        ("limited_casco_comfort_100", 900.0),
        ("limited_casco_comfort_200", 920.0),
        ("limited_casco_comfort_500", 950.0),
        ("limited_casco_premium_100", 1_000.0),
        ("limited_casco_premium_200", 1_020.0),
        ("limited_casco_premium_500", 1_050.0),
        ("casco_basic_100", 780.0),
        ("casco_premium_100", 1_070.0),
    ]
    .into_iter()
    .map(|(key, price)| (key.to_string(), price))
    .collect()
}

pub fn run() -> CommandResult {
    match render() {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::from_error("demo", &error),
    }
}

fn render() -> Result<String, ApplicationError> {
    let config = load_config()?;
    let reference = config.geo.reference_country.as_str();
    let mut lines = Vec::new();

    let (fixed, issues) = validate_and_fix_prices(&base_prices())?;
    lines.push(format!("base prices ({reference}) after repair:"));
    lines.extend(render_table(&fixed));
    lines.push(format!("issues ({}):", issues.len()));
    lines.extend(issues.iter().map(|issue| format!("- {issue}")));

    let country_factors =
        compute_country_factors(&average_net_wages(), reference, config.geo.country_alpha)?;
    let country_factor = country_factors.get(DEMO_TARGET_COUNTRY).copied().unwrap_or(1.0);
    let country_prices = adjust_prices_for_country(&fixed, DEMO_TARGET_COUNTRY, &country_factors);
    lines.push(String::new());
    lines.push(format!("{DEMO_TARGET_COUNTRY} prices (factor {country_factor:.4}):"));
    lines.extend(render_table(&country_prices));

    let city_factors = serbian_city_factors(&config);
    for (city, _) in CITY_POPULATION_RS {
        let city_factor = city_factors.get(city).copied().unwrap_or(1.0);
        let city_prices = adjust_prices_for_city(&country_prices, city, &city_factors);
        lines.push(String::new());
        lines.push(format!("{city} prices (city factor {city_factor:.4}):"));
        lines.extend(render_table(&city_prices));
    }

    Ok(lines.join("\n"))
}
