pub mod deductible;
pub mod engine;
pub mod rounding;
pub mod rules;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audit::{ChangeStage, PriceChange};
use crate::domain::table::{PriceTable, RawPriceTable};
use crate::errors::DomainError;
use crate::repair::rounding::PRICE_TOLERANCE;

use self::{
    deductible::{DeductibleLadder, LadderNormalizer},
    engine::enforce_constraints,
    rules::{BusinessRuleGenerator, ConstraintGenerator},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    pub table: PriceTable,
    pub changes: Vec<PriceChange>,
}

impl RepairReport {
    /// Human-readable issue lines, in the order the changes were applied.
    pub fn issues(&self) -> Vec<String> {
        self.changes.iter().map(ToString::to_string).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn count_for(&self, stage: ChangeStage) -> usize {
        self.changes.iter().filter(|change| change.stage == stage).count()
    }
}

pub trait PriceRepair: Send + Sync {
    fn repair(&self, table: &PriceTable) -> Result<RepairReport, DomainError>;
}

/// Normalize, generate constraints, then lift violations in rank order.
pub struct RepairPipeline<G, N> {
    generator: G,
    normalizer: N,
}

impl<G, N> RepairPipeline<G, N> {
    pub fn new(generator: G, normalizer: N) -> Self {
        Self { generator, normalizer }
    }
}

impl Default for RepairPipeline<BusinessRuleGenerator, DeductibleLadder> {
    fn default() -> Self {
        Self::new(BusinessRuleGenerator, DeductibleLadder)
    }
}

impl<G, N> PriceRepair for RepairPipeline<G, N>
where
    G: ConstraintGenerator,
    N: LadderNormalizer,
{
    fn repair(&self, input: &PriceTable) -> Result<RepairReport, DomainError> {
        let mut table = input.clone();

        let mut changes = self.normalizer.normalize(&mut table);
        let constraints = self.generator.generate(&table.key_set());
        let constraint_count = constraints.len();
        changes.extend(enforce_constraints(&mut table, constraints)?);
        // A ladder cut undone by a later lift leaves the price as supplied.
        changes.retain(|change| !ends_where_it_started(input, &table, change));

        let report = RepairReport { table, changes };
        info!(
            event_name = "pricing.repair.completed",
            keys = report.table.len(),
            constraints = constraint_count,
            ladder_changes = report.count_for(ChangeStage::DeductibleLadder),
            repair_changes = report.count_for(ChangeStage::ConstraintRepair),
            "price table repaired"
        );
        Ok(report)
    }
}

fn ends_where_it_started(input: &PriceTable, repaired: &PriceTable, change: &PriceChange) -> bool {
    match (input.get(&change.key), repaired.get(&change.key)) {
        (Some(before), Some(after)) => (after - before).abs() <= PRICE_TOLERANCE,
        _ => false,
    }
}

pub fn repair_price_table(table: &PriceTable) -> Result<RepairReport, DomainError> {
    RepairPipeline::default().repair(table)
}

/// Validates and repairs a flat price table.
///
/// Returns the repaired table (same keys as the input) and one issue line per
/// price change. Changes to a key whose final price equals its input price
/// are not reported, so an empty issue list means the table came back
/// unchanged.
///
/// The table is repaired in one pass, so an empty list does not promise that
/// every deductible ladder is strictly ordered: a product lift can flatten a
/// ladder, and anchors below 95 EUR collapse on the 10 EUR grid.
pub fn validate_and_fix_prices(
    raw_prices: &RawPriceTable,
) -> Result<(RawPriceTable, Vec<String>), DomainError> {
    let table = PriceTable::from_raw(raw_prices)?;
    let report = repair_price_table(&table)?;
    Ok((report.table.to_raw()?, report.issues()))
}
