use std::collections::BTreeSet;

use crate::domain::constraint::Constraint;
use crate::domain::key::{PriceKey, Product, Variant, STANDARD_DEDUCTIBLES};

pub const MTPL_BELOW_LIMITED_CASCO: &str = "MTPL must be cheaper than Limited Casco";
pub const LIMITED_CASCO_BELOW_CASCO: &str =
    "Casco must be more expensive than Limited Casco for the same variant and deductible";

/// Builds pairwise ordering constraints from the keys present in a table.
pub trait ConstraintGenerator: Send + Sync {
    fn generate(&self, keys: &BTreeSet<PriceKey>) -> Vec<Constraint>;
}

/// Product ladder `mtpl < limited_casco < casco` and variant ladder
/// `compact/basic < comfort < premium`. Compact against basic is left open.
#[derive(Clone, Copy, Debug, Default)]
pub struct BusinessRuleGenerator;

impl ConstraintGenerator for BusinessRuleGenerator {
    fn generate(&self, keys: &BTreeSet<PriceKey>) -> Vec<Constraint> {
        build_constraints(keys)
    }
}

pub fn build_constraints(keys: &BTreeSet<PriceKey>) -> Vec<Constraint> {
    let mut constraints = Vec::new();
    add_product_constraints(keys, &mut constraints);
    add_variant_constraints(keys, &mut constraints);
    constraints
}

fn add_product_constraints(keys: &BTreeSet<PriceKey>, constraints: &mut Vec<Constraint>) {
    let limited_keys = || keys.iter().filter(|key| key.product() == Product::LimitedCasco);

    let mtpl = PriceKey::mtpl();
    if keys.contains(&mtpl) {
        for limited in limited_keys() {
            constraints.push(Constraint::new(mtpl, *limited, MTPL_BELOW_LIMITED_CASCO));
        }
    }

    for limited in limited_keys() {
        let Some(casco) = limited.for_product(Product::Casco) else {
            continue;
        };
        if keys.contains(&casco) {
            constraints.push(Constraint::new(*limited, casco, LIMITED_CASCO_BELOW_CASCO));
        }
    }
}

fn add_variant_constraints(keys: &BTreeSet<PriceKey>, constraints: &mut Vec<Constraint>) {
    const LADDER: [(Variant, Variant); 3] = [
        (Variant::Compact, Variant::Comfort),
        (Variant::Basic, Variant::Comfort),
        (Variant::Comfort, Variant::Premium),
    ];

    for product in Product::WITH_VARIANTS {
        for deductible in STANDARD_DEDUCTIBLES {
            for (cheaper, pricier) in LADDER {
                let left = PriceKey::with_cover(product, cheaper, deductible);
                let right = PriceKey::with_cover(product, pricier, deductible);
                if keys.contains(&left) && keys.contains(&right) {
                    constraints.push(Constraint::new(
                        left,
                        right,
                        variant_rule_description(product, cheaper, pricier, deductible),
                    ));
                }
            }
        }
    }
}

fn variant_rule_description(
    product: Product,
    cheaper: Variant,
    pricier: Variant,
    deductible: u32,
) -> String {
    format!(
        "{} must be more expensive than {} for {product} with deductible {deductible}",
        title_case(pricier),
        title_case(cheaper),
    )
}

fn title_case(variant: Variant) -> &'static str {
    match variant {
        Variant::Compact => "Compact",
        Variant::Basic => "Basic",
        Variant::Comfort => "Comfort",
        Variant::Premium => "Premium",
    }
}
