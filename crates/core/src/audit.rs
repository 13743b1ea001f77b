use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::key::PriceKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStage {
    DeductibleLadder,
    ConstraintRepair,
}

/// One price rewritten by the pipeline.
///
/// `reference` is the key the new price was derived from: the 100 deductible
/// anchor for ladder alignment, the cheaper side of the constraint for repairs.
/// The `Display` form is the issue line reported to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub key: PriceKey,
    pub old_price: f64,
    pub new_price: f64,
    pub stage: ChangeStage,
    pub rule: String,
    pub reference: PriceKey,
    pub reference_price: f64,
    pub margin: Option<f64>,
}

impl PriceChange {
    pub fn ladder_alignment(
        key: PriceKey,
        old_price: f64,
        new_price: f64,
        rule: impl Into<String>,
        anchor: PriceKey,
        anchor_price: f64,
    ) -> Self {
        Self {
            key,
            old_price,
            new_price,
            stage: ChangeStage::DeductibleLadder,
            rule: rule.into(),
            reference: anchor,
            reference_price: anchor_price,
            margin: None,
        }
    }

    pub fn constraint_repair(
        key: PriceKey,
        old_price: f64,
        new_price: f64,
        rule: impl Into<String>,
        left: PriceKey,
        left_price: f64,
        margin: f64,
    ) -> Self {
        Self {
            key,
            old_price,
            new_price,
            stage: ChangeStage::ConstraintRepair,
            rule: rule.into(),
            reference: left,
            reference_price: left_price,
            margin: Some(margin),
        }
    }
}

impl fmt::Display for PriceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            ChangeStage::DeductibleLadder => write!(
                f,
                "Aligned {} from {:.2} to {:.2} to enforce {} (100=base, 200≈-10%, 500≈-20%) using base {}={:.2}.",
                self.key,
                self.old_price,
                self.new_price,
                self.rule,
                self.reference,
                self.reference_price,
            ),
            ChangeStage::ConstraintRepair => write!(
                f,
                "Adjusted {} from {:.2} to {:.2} to satisfy rule: {} with at least {:.0}% premium over {} (={:.2})",
                self.key,
                self.old_price,
                self.new_price,
                self.rule,
                self.margin.unwrap_or_default() * 100.0,
                self.reference,
                self.reference_price,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::audit::{ChangeStage, PriceChange};
    use crate::domain::key::PriceKey;

    fn key(raw: &str) -> PriceKey {
        PriceKey::parse(raw).expect("valid key")
    }

    #[test]
    fn ladder_alignment_names_key_prices_and_anchor() {
        let change = PriceChange::ladder_alignment(
            key("limited_casco_basic_200"),
            820.0,
            720.0,
            "deductible ladder anchored at 100",
            key("limited_casco_basic_100"),
            800.0,
        );

        assert_eq!(
            change.to_string(),
            "Aligned limited_casco_basic_200 from 820.00 to 720.00 to enforce deductible ladder \
             anchored at 100 (100=base, 200≈-10%, 500≈-20%) using base limited_casco_basic_100=800.00."
        );
    }

    #[test]
    fn constraint_repair_reports_margin_percentage() {
        let change = PriceChange::constraint_repair(
            key("casco_basic_100"),
            780.0,
            880.0,
            "Casco must be more expensive than Limited Casco for the same variant and deductible",
            key("limited_casco_basic_100"),
            800.0,
            0.10,
        );

        assert_eq!(change.stage, ChangeStage::ConstraintRepair);
        assert_eq!(
            change.to_string(),
            "Adjusted casco_basic_100 from 780.00 to 880.00 to satisfy rule: Casco must be more \
             expensive than Limited Casco for the same variant and deductible with at least 10% \
             premium over limited_casco_basic_100 (=800.00)"
        );
    }

    #[test]
    fn serializes_keys_as_flat_strings() {
        let change = PriceChange::ladder_alignment(
            key("casco_comfort_500"),
            950.0,
            720.0,
            "deductible ladder anchored at 100",
            key("casco_comfort_100"),
            900.0,
        );

        let json = serde_json::to_value(&change).expect("serialize");
        assert_eq!(json["key"], "casco_comfort_500");
        assert_eq!(json["stage"], "deductible_ladder");
        assert_eq!(json["margin"], serde_json::Value::Null);
    }
}
