//! Reference figures used by the demo projection (ES base market, Serbian cities).

use std::collections::BTreeMap;

/// Average monthly net wage in EUR, used as an affordability proxy.
pub const AVERAGE_NET_WAGE_EUR: [(&str, f64); 3] = [("RS", 930.0), ("HU", 1_113.0), ("ES", 2_000.0)];

/// Census 2022 populations.
pub const CITY_POPULATION_RS: [(&str, u64); 2] = [("Beograd", 1_685_563), ("Novi Sad", 368_967)];

/// Traffic accidents recorded in 2020.
pub const CITY_ACCIDENTS_RS_2020: [(&str, u64); 2] = [("Beograd", 9_061), ("Novi Sad", 1_316)];

pub const SERBIA_POPULATION_2022: u64 = 6_664_449;
pub const SERBIA_ACCIDENTS_2020: u64 = 19_481;

/// Country level deductible factors relative to the 100 EUR price.
pub const BASE_DEDUCTIBLE_FACTORS: [(u32, f64); 3] = [(100, 1.00), (200, 0.90), (500, 0.80)];

/// Per-city deductible factors. A higher share of small material-damage claims
/// makes high deductibles worth more, so Beograd discounts more and Novi Sad less.
pub const CITY_DEDUCTIBLE_FACTORS_RS: [(&str, [(u32, f64); 3]); 2] = [
    ("Beograd", [(100, 1.00), (200, 0.88), (500, 0.76)]),
    ("Novi Sad", [(100, 1.00), (200, 0.9133), (500, 0.8266)]),
];

pub fn average_net_wages() -> BTreeMap<String, f64> {
    to_map(&AVERAGE_NET_WAGE_EUR)
}

pub fn serbian_city_populations() -> BTreeMap<String, u64> {
    to_map(&CITY_POPULATION_RS)
}

pub fn serbian_city_accidents() -> BTreeMap<String, u64> {
    to_map(&CITY_ACCIDENTS_RS_2020)
}

fn to_map<T: Copy>(entries: &[(&str, T)]) -> BTreeMap<String, T> {
    entries.iter().map(|(name, value)| ((*name).to_owned(), *value)).collect()
}
