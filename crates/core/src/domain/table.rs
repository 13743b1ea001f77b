use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::key::PriceKey;
use crate::errors::DomainError;

/// Flat table as supplied by callers: raw key string to price in EUR.
pub type RawPriceTable = BTreeMap<String, f64>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    prices: BTreeMap<PriceKey, f64>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every raw key. Keys only parse in their canonical spelling, so
    /// [`PriceTable::to_raw`] gives back exactly the input's key set.
    pub fn from_raw(raw: &RawPriceTable) -> Result<Self, DomainError> {
        let prices = raw
            .iter()
            .map(|(raw_key, price)| Ok((PriceKey::parse(raw_key)?, *price)))
            .collect::<Result<_, DomainError>>()?;
        Ok(Self { prices })
    }

    pub fn to_raw(&self) -> Result<RawPriceTable, DomainError> {
        self.prices.iter().map(|(key, price)| Ok((key.to_raw()?, *price))).collect()
    }

    pub fn get(&self, key: &PriceKey) -> Option<f64> {
        self.prices.get(key).copied()
    }

    pub fn price(&self, key: &PriceKey) -> Result<f64, DomainError> {
        self.get(key).ok_or_else(|| DomainError::MissingPrice { key: key.to_string() })
    }

    pub fn contains(&self, key: &PriceKey) -> bool {
        self.prices.contains_key(key)
    }

    pub fn insert(&mut self, key: PriceKey, price: f64) -> Option<f64> {
        self.prices.insert(key, price)
    }

    pub fn keys(&self) -> impl Iterator<Item = &PriceKey> + '_ {
        self.prices.keys()
    }

    pub fn key_set(&self) -> BTreeSet<PriceKey> {
        self.prices.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PriceKey, f64)> + '_ {
        self.prices.iter().map(|(key, price)| (key, *price))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(PriceKey, f64)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (PriceKey, f64)>>(iter: I) -> Self {
        Self { prices: iter.into_iter().collect() }
    }
}
