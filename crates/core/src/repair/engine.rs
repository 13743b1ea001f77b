use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audit::PriceChange;
use crate::domain::constraint::Constraint;
use crate::domain::table::PriceTable;
use crate::errors::DomainError;
use crate::repair::rounding::{lift_to_grid, PRICE_ROUNDING_STEP, PRICE_TOLERANCE};

/// Minimum premium between product levels (mtpl, limited casco, casco).
pub const PRODUCT_MARGIN: f64 = 0.10;

/// Minimum premium between consecutive variants of one product.
pub const VARIANT_MARGIN: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Product,
    Variant,
}

impl RuleKind {
    /// Classifies a rule from its description wording.
    pub fn classify(description: &str) -> Self {
        let description = description.to_lowercase();
        if description.contains("mtpl must be cheaper")
            || description.contains("casco must be more expensive than limited casco")
        {
            Self::Product
        } else {
            Self::Variant
        }
    }

    pub const fn margin(self) -> f64 {
        match self {
            Self::Product => PRODUCT_MARGIN,
            Self::Variant => VARIANT_MARGIN,
        }
    }
}

/// Stable sort by the rank of the cheaper side.
pub fn sort_constraints(constraints: &mut [Constraint]) {
    constraints.sort_by_key(|constraint| constraint.left.rank());
}

/// Walks `constraints` in rank order and lifts every price that sits below
/// `left * (1 + margin)`. Raised prices are written back immediately, so later
/// constraints see them.
pub fn enforce_constraints(
    table: &mut PriceTable,
    mut constraints: Vec<Constraint>,
) -> Result<Vec<PriceChange>, DomainError> {
    sort_constraints(&mut constraints);

    let mut changes = Vec::new();
    for constraint in constraints {
        let left_price = table.price(&constraint.left)?;
        let right_price = table.price(&constraint.right)?;

        let margin = RuleKind::classify(&constraint.description).margin();
        let required = left_price * (1.0 + margin);
        if right_price >= required - PRICE_TOLERANCE {
            continue;
        }

        let new_price = lift_to_grid(required, PRICE_ROUNDING_STEP);
        table.insert(constraint.right, new_price);
        debug!(
            event_name = "pricing.repair.lifted",
            key = %constraint.right,
            old_price = right_price,
            new_price,
            left = %constraint.left,
            left_price,
            margin,
            "price lifted to satisfy ordering rule"
        );
        changes.push(PriceChange::constraint_repair(
            constraint.right,
            right_price,
            new_price,
            constraint.description,
            constraint.left,
            left_price,
            margin,
        ));
    }

    Ok(changes)
}
