use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{PortalError, Result};

/// one principal tier of the fixed-rate table
///
/// Each tier carries a single-letter loan type code, one fixed monthly EMI
/// amount, and the set of term lengths it may be booked with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiTier {
    pub code: char,
    pub principal: Money,
    pub monthly_emi: Money,
    pub allowed_terms: Vec<u32>,
}

/// fixed EMI rate table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    tiers: Vec<EmiTier>,
}

impl RateTable {
    /// the five supported principal tiers
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                EmiTier {
                    code: 'E',
                    principal: Money::from_major(10_000),
                    monthly_emi: Money::from_major(1_135),
                    allowed_terms: vec![12],
                },
                EmiTier {
                    code: 'J',
                    principal: Money::from_major(20_000),
                    monthly_emi: Money::from_major(2_270),
                    allowed_terms: vec![12],
                },
                EmiTier {
                    code: 'O',
                    principal: Money::from_major(30_000),
                    monthly_emi: Money::from_major(2_750),
                    allowed_terms: vec![15],
                },
                EmiTier {
                    code: 'T',
                    principal: Money::from_major(40_000),
                    monthly_emi: Money::from_major(3_225),
                    allowed_terms: vec![18],
                },
                EmiTier {
                    code: 'Y',
                    principal: Money::from_major(50_000),
                    monthly_emi: Money::from_major(3_385),
                    allowed_terms: vec![24],
                },
            ],
        }
    }

    pub fn tiers(&self) -> &[EmiTier] {
        &self.tiers
    }

    /// look up the tier for a principal amount
    pub fn tier_for(&self, principal: Money) -> Result<&EmiTier> {
        self.tiers
            .iter()
            .find(|t| t.principal == principal)
            .ok_or(PortalError::UnknownPrincipalTier { principal })
    }

    /// validate a (principal, term) combination before anything is written
    pub fn validate(&self, principal: Money, term_months: u32) -> Result<&EmiTier> {
        let tier = self.tier_for(principal)?;
        if !tier.allowed_terms.contains(&term_months) {
            return Err(PortalError::InvalidTermLength {
                principal,
                requested: term_months,
                allowed: tier.allowed_terms.clone(),
            });
        }
        Ok(tier)
    }
}

/// registration-order position bucket
///
/// Positions are grouped into ten ranges of width 10; each range carries a
/// fixed due-day-of-month and a single-letter category tag. Positions above
/// 100 fall into the overflow bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionBucket {
    pub category: char,
    pub due_day: u32,
}

/// overflow bucket for positions above 100
pub const OVERFLOW_BUCKET: PositionBucket = PositionBucket {
    category: 'X',
    due_day: 15,
};

const BUCKETS: [PositionBucket; 10] = [
    PositionBucket { category: 'A', due_day: 2 },
    PositionBucket { category: 'B', due_day: 10 },
    PositionBucket { category: 'C', due_day: 4 },
    PositionBucket { category: 'D', due_day: 6 },
    PositionBucket { category: 'E', due_day: 8 },
    PositionBucket { category: 'F', due_day: 1 },
    PositionBucket { category: 'G', due_day: 3 },
    PositionBucket { category: 'H', due_day: 5 },
    PositionBucket { category: 'I', due_day: 7 },
    PositionBucket { category: 'J', due_day: 9 },
];

impl PositionBucket {
    /// bucket for a registration-order position
    ///
    /// Positions start at 1; zero is rejected. Positions above 100 map to
    /// the overflow bucket instead of failing.
    pub fn for_position(position: u32) -> Result<PositionBucket> {
        match position {
            0 => Err(PortalError::InvalidPosition { position }),
            1..=100 => Ok(BUCKETS[((position - 1) / 10) as usize]),
            _ => Ok(OVERFLOW_BUCKET),
        }
    }
}

/// portal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub rate_table: RateTable,
    /// notifications are removed this long after creation
    pub notification_ttl_minutes: i64,
}

impl PortalConfig {
    pub fn standard() -> Self {
        Self {
            rate_table: RateTable::standard(),
            notification_ttl_minutes: 30,
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::standard()
    }
}
