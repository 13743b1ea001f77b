use serde::{Deserialize, Serialize};

use crate::domain::key::PriceKey;

/// `left` must be priced below `right`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub left: PriceKey,
    pub right: PriceKey,
    pub description: String,
}

impl Constraint {
    pub fn new(left: PriceKey, right: PriceKey, description: impl Into<String>) -> Self {
        Self { left, right, description: description.into() }
    }
}
