use tracing::debug;

use crate::audit::PriceChange;
use crate::domain::key::{PriceKey, Product, Variant};
use crate::domain::table::PriceTable;
use crate::repair::rounding::{round_to_grid, PRICE_ROUNDING_STEP, PRICE_TOLERANCE};

pub const ANCHOR_DEDUCTIBLE: u32 = 100;

pub const DEDUCTIBLE_LADDER_RULE: &str = "deductible ladder anchored at 100";

/// Price factor per deductible relative to the 100 EUR anchor.
pub const DEDUCTIBLE_DISCOUNTS: [(u32, f64); 3] = [(100, 1.00), (200, 0.90), (500, 0.80)];

/// Smallest anchor price whose 100 / 200 / 500 ladder stays strictly ordered
/// after grid rounding.
pub const STRICT_LADDER_MIN_ANCHOR: f64 = 95.0;

/// Rewrites prices in place before constraint repair runs.
pub trait LadderNormalizer: Send + Sync {
    fn normalize(&self, table: &mut PriceTable) -> Vec<PriceChange>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeductibleLadder;

impl LadderNormalizer for DeductibleLadder {
    fn normalize(&self, table: &mut PriceTable) -> Vec<PriceChange> {
        apply_deductible_structure(table)
    }
}

/// Rebuilds every (product, variant) deductible ladder from its 100 EUR price.
///
/// Only deductibles already present in the table are rewritten; pairs without
/// an anchor are left alone.
///
/// The grid keeps the ladder strictly ordered for anchors of at least
/// [`STRICT_LADDER_MIN_ANCHOR`]. Below that, neighbouring steps can round to the
/// same value (an anchor of 50 gives 50 / 40 / 40) and are left equal.
pub fn apply_deductible_structure(table: &mut PriceTable) -> Vec<PriceChange> {
    let mut changes = Vec::new();

    for product in Product::WITH_VARIANTS {
        for variant in Variant::ALL {
            let anchor = PriceKey::with_cover(product, variant, ANCHOR_DEDUCTIBLE);
            let Some(anchor_price) = table.get(&anchor) else {
                continue;
            };

            for (deductible, factor) in DEDUCTIBLE_DISCOUNTS {
                let key = PriceKey::with_cover(product, variant, deductible);
                let Some(old_price) = table.get(&key) else {
                    continue;
                };

                let new_price = round_to_grid(anchor_price * factor, PRICE_ROUNDING_STEP);
                if (new_price - old_price).abs() <= PRICE_TOLERANCE {
                    continue;
                }

                table.insert(key, new_price);
                debug!(
                    event_name = "pricing.ladder.aligned",
                    key = %key,
                    old_price,
                    new_price,
                    anchor = %anchor,
                    anchor_price,
                    "deductible price aligned to anchor"
                );
                changes.push(PriceChange::ladder_alignment(
                    key,
                    old_price,
                    new_price,
                    DEDUCTIBLE_LADDER_RULE,
                    anchor,
                    anchor_price,
                ));
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::{apply_deductible_structure, DEDUCTIBLE_LADDER_RULE, STRICT_LADDER_MIN_ANCHOR};
    use crate::audit::ChangeStage;
    use crate::domain::key::PriceKey;
    use crate::domain::table::PriceTable;

    fn table(entries: &[(&str, f64)]) -> PriceTable {
        entries.iter().map(|(key, price)| (PriceKey::parse(key).expect("valid key"), *price)).collect()
    }

    fn price(table: &PriceTable, raw: &str) -> f64 {
        table.get(&PriceKey::parse(raw).expect("valid key")).expect("price present")
    }

    #[test]
    fn rebuilds_inverted_ladder_from_anchor() {
        let mut prices = table(&[
            ("limited_casco_basic_100", 800.0),
            ("limited_casco_basic_200", 820.0),
            ("limited_casco_basic_500", 850.0),
        ]);

        let changes = apply_deductible_structure(&mut prices);

        assert_eq!(price(&prices, "limited_casco_basic_200"), 720.0);
        assert_eq!(price(&prices, "limited_casco_basic_500"), 640.0);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|change| change.stage == ChangeStage::DeductibleLadder
            && change.rule == DEDUCTIBLE_LADDER_RULE
            && change.reference.to_string() == "limited_casco_basic_100"
            && change.reference_price == 800.0));
        assert_eq!(changes[0].key.to_string(), "limited_casco_basic_200");
        assert_eq!(changes[0].old_price, 820.0);
    }

    #[test]
    fn pairs_without_anchor_are_untouched() {
        let mut prices = table(&[("casco_comfort_200", 990.0), ("casco_comfort_500", 1_200.0)]);
        let before = prices.clone();

        let changes = apply_deductible_structure(&mut prices);

        assert!(changes.is_empty());
        assert_eq!(prices, before);
    }

    #[test]
    fn compliant_ladder_produces_no_changes() {
        let mut prices = table(&[
            ("casco_premium_100", 1_200.0),
            ("casco_premium_200", 1_080.0),
            ("casco_premium_500", 960.0),
        ]);

        assert!(apply_deductible_structure(&mut prices).is_empty());
    }

    #[test]
    fn off_grid_anchor_is_snapped_and_derived_from_unsnapped_price() {
        let mut prices = table(&[("casco_basic_100", 805.0), ("casco_basic_200", 700.0)]);

        let changes = apply_deductible_structure(&mut prices);

        // 805 snaps to 800 (half to even); 200 uses 805 * 0.9 = 724.5 -> 720.
        assert_eq!(price(&prices, "casco_basic_100"), 800.0);
        assert_eq!(price(&prices, "casco_basic_200"), 720.0);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|change| change.reference_price == 805.0));
    }

    #[test]
    fn small_anchors_collapse_onto_one_grid_step() {
        let mut prices =
            table(&[("casco_basic_100", 50.0), ("casco_basic_200", 45.0), ("casco_basic_500", 40.0)]);

        let changes = apply_deductible_structure(&mut prices);

        // 45 ties to 40 and 40 stays 40, so 200 and 500 end up equal.
        assert_eq!(price(&prices, "casco_basic_100"), 50.0);
        assert_eq!(price(&prices, "casco_basic_200"), 40.0);
        assert_eq!(price(&prices, "casco_basic_500"), 40.0);
        assert_eq!(changes.len(), 1);
        assert!(changes[0].to_string().starts_with("Aligned casco_basic_200 from 45.00 to 40.00"));
    }

    #[test]
    fn ladders_from_the_minimum_anchor_up_stay_strict() {
        let below = STRICT_LADDER_MIN_ANCHOR - 1.0;
        let mut prices =
            table(&[("casco_basic_100", below), ("casco_basic_200", below), ("casco_basic_500", below)]);
        apply_deductible_structure(&mut prices);
        assert_eq!(price(&prices, "casco_basic_200"), price(&prices, "casco_basic_500"));

        for anchor in (STRICT_LADDER_MIN_ANCHOR as u32)..2_000 {
            let anchor = f64::from(anchor);
            let mut prices = table(&[
                ("casco_basic_100", anchor),
                ("casco_basic_200", anchor),
                ("casco_basic_500", anchor),
            ]);

            apply_deductible_structure(&mut prices);

            let p100 = price(&prices, "casco_basic_100");
            let p200 = price(&prices, "casco_basic_200");
            let p500 = price(&prices, "casco_basic_500");
            assert!(p500 < p200 && p200 < p100, "anchor {anchor}: {p100} / {p200} / {p500}");
        }
    }

    #[test]
    fn missing_deductibles_are_not_created() {
        let mut prices = table(&[("limited_casco_compact_100", 820.0), ("limited_casco_compact_500", 870.0)]);

        apply_deductible_structure(&mut prices);

        assert_eq!(prices.len(), 2);
        assert_eq!(price(&prices, "limited_casco_compact_500"), 660.0);
    }
}
