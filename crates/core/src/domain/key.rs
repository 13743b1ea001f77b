use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const MTPL_KEY: &str = "mtpl";
const LIMITED_CASCO_PREFIX: &str = "limited_casco_";
const CASCO_PREFIX: &str = "casco_";

/// Deductibles that form the standard ladder, cheapest cover first.
pub const STANDARD_DEDUCTIBLES: [u32; 3] = [100, 200, 500];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Mtpl,
    LimitedCasco,
    Casco,
}

impl Product {
    pub const ALL: [Self; 3] = [Self::Mtpl, Self::LimitedCasco, Self::Casco];

    /// Products priced per variant and deductible.
    pub const WITH_VARIANTS: [Self; 2] = [Self::LimitedCasco, Self::Casco];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mtpl => "mtpl",
            Self::LimitedCasco => "limited_casco",
            Self::Casco => "casco",
        }
    }

    pub const fn rank(self) -> u32 {
        match self {
            Self::Mtpl => 0,
            Self::LimitedCasco => 1,
            Self::Casco => 2,
        }
    }

    pub const fn has_variants(self) -> bool {
        !matches!(self, Self::Mtpl)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Compact,
    Basic,
    Comfort,
    Premium,
}

impl Variant {
    pub const ALL: [Self; 4] = [Self::Compact, Self::Basic, Self::Comfort, Self::Premium];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Basic => "basic",
            Self::Comfort => "comfort",
            Self::Premium => "premium",
        }
    }

    /// Compact and basic share a rank: their relative order is not a business rule.
    pub const fn rank(self) -> u32 {
        match self {
            Self::Compact | Self::Basic => 1,
            Self::Comfort => 2,
            Self::Premium => 3,
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|variant| variant.as_str() == segment)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const fn deductible_rank(deductible: Option<u32>) -> u32 {
    match deductible {
        Some(500) => 1,
        Some(200) => 2,
        Some(100) => 3,
        _ => 0,
    }
}

/// Structured form of a flat price table key such as `limited_casco_basic_100`.
///
/// `mtpl` carries neither variant nor deductible; every other product carries
/// both. The constructors keep that invariant, so a `PriceKey` obtained from
/// [`PriceKey::parse`] or [`PriceKey::with_cover`] always serializes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PriceKey {
    product: Product,
    variant: Option<Variant>,
    deductible: Option<u32>,
}

impl PriceKey {
    pub const fn mtpl() -> Self {
        Self { product: Product::Mtpl, variant: None, deductible: None }
    }

    /// Key for a product with cover options. `mtpl` has no cover options, so
    /// they are dropped for it.
    pub const fn with_cover(product: Product, variant: Variant, deductible: u32) -> Self {
        match product {
            Product::Mtpl => Self::mtpl(),
            _ => Self { product, variant: Some(variant), deductible: Some(deductible) },
        }
    }

    pub fn new(
        product: Product,
        variant: Option<Variant>,
        deductible: Option<u32>,
    ) -> Result<Self, DomainError> {
        match (product, variant, deductible) {
            (Product::Mtpl, None, None) => Ok(Self::mtpl()),
            (Product::Mtpl, _, _) => Err(DomainError::InvariantViolation(
                "mtpl keys carry no variant or deductible".to_owned(),
            )),
            (_, Some(variant), Some(deductible)) => {
                Ok(Self::with_cover(product, variant, deductible))
            }
            _ => Err(DomainError::IncompleteKey { product }),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw == MTPL_KEY {
            return Ok(Self::mtpl());
        }

        let (product, rest) = if let Some(rest) = raw.strip_prefix(LIMITED_CASCO_PREFIX) {
            (Product::LimitedCasco, rest)
        } else if let Some(rest) = raw.strip_prefix(CASCO_PREFIX) {
            (Product::Casco, rest)
        } else {
            return Err(DomainError::key_format(
                raw,
                "expected `mtpl`, `limited_casco_<variant>_<deductible>` or `casco_<variant>_<deductible>`",
            ));
        };

        let Some((variant, deductible)) = rest.split_once('_') else {
            return Err(DomainError::key_format(raw, "missing variant or deductible segment"));
        };
        if variant.is_empty() {
            return Err(DomainError::key_format(raw, "missing variant segment"));
        }

        let variant = Variant::from_segment(variant)
            .ok_or_else(|| DomainError::key_format(raw, format!("unknown variant `{variant}`")))?;
        let segment = deductible;
        let deductible = segment.parse::<u32>().map_err(|_| {
            DomainError::key_format(raw, format!("deductible `{segment}` is not an integer"))
        })?;
        // Only the canonical spelling parses, so every key serializes back to its input.
        if deductible.to_string() != segment {
            return Err(DomainError::key_format(
                raw,
                format!("deductible `{segment}` is not written as `{deductible}`"),
            ));
        }

        Ok(Self::with_cover(product, variant, deductible))
    }

    /// Flat string form, the inverse of [`PriceKey::parse`].
    pub fn to_raw(&self) -> Result<String, DomainError> {
        match (self.product, self.variant, self.deductible) {
            (Product::Mtpl, _, _) => Ok(MTPL_KEY.to_owned()),
            (product, Some(variant), Some(deductible)) => {
                Ok(format!("{product}_{variant}_{deductible}"))
            }
            (product, _, _) => Err(DomainError::IncompleteKey { product }),
        }
    }

    pub const fn product(&self) -> Product {
        self.product
    }

    pub const fn variant(&self) -> Option<Variant> {
        self.variant
    }

    pub const fn deductible(&self) -> Option<u32> {
        self.deductible
    }

    /// Processing rank: product dominates variant, which dominates deductible.
    pub const fn rank(&self) -> u32 {
        let variant_rank = match self.variant {
            Some(variant) => variant.rank(),
            None => 0,
        };
        self.product.rank() * 100 + variant_rank * 10 + deductible_rank(self.deductible)
    }

    /// Same variant and deductible under another product.
    pub const fn for_product(&self, product: Product) -> Option<Self> {
        match (self.variant, self.deductible) {
            (Some(variant), Some(deductible)) => {
                Some(Self::with_cover(product, variant, deductible))
            }
            _ => None,
        }
    }
}

impl fmt::Display for PriceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.product.as_str())?;
        if self.product.has_variants() {
            if let Some(variant) = self.variant {
                write!(f, "_{variant}")?;
            }
            if let Some(deductible) = self.deductible {
                write!(f, "_{deductible}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for PriceKey {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for PriceKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PriceKey> for String {
    fn from(value: PriceKey) -> Self {
        value.to_string()
    }
}
