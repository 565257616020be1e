use rust_decimal::Decimal;
use thiserror::Error;
use tillroll_core::Money;

use crate::config::ItemLimits;

/// Aggregate-row terms that may never appear in an item name.
const AGGREGATE_KEYWORDS: &[&str] = &[
    "小计", "合计", "总计", "总额", "找零", "应收", "实收", "应付", "实付", "优惠", "折扣",
    "subtotal", "total", "change", "due", "discount",
];

/// Why a candidate item was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("name is empty")]
    EmptyName,
    #[error("name is {0} characters long")]
    NameTooLong(usize),
    #[error("price or quantity is not positive")]
    NonPositive,
    #[error("unit price {0} exceeds ceiling")]
    UnitPriceCeiling(Money),
    #[error("line total {0} exceeds ceiling")]
    TotalPriceCeiling(Money),
    #[error("line total {total} is inconsistent with {unit} x {quantity}")]
    Inconsistent { unit: Money, quantity: u32, total: Money },
    #[error("name contains aggregate keyword '{0}'")]
    AggregateKeyword(&'static str),
}

/// The one gate every extraction strategy's candidate must pass.
#[derive(Debug, Clone, Default)]
pub struct ItemValidator {
    limits: ItemLimits,
}

impl ItemValidator {
    pub fn new(limits: ItemLimits) -> Self {
        Self { limits }
    }

    pub fn is_valid_item(&self, name: &str, unit_price: Money, quantity: u32, total_price: Money) -> bool {
        self.check(name, unit_price, quantity, total_price).is_ok()
    }

    pub fn check(
        &self,
        name: &str,
        unit_price: Money,
        quantity: u32,
        total_price: Money,
    ) -> Result<(), Rejection> {
        let name = name.trim();
        let chars = name.chars().count();
        if chars == 0 {
            return Err(Rejection::EmptyName);
        }
        if chars > self.limits.max_name_chars {
            return Err(Rejection::NameTooLong(chars));
        }

        if !unit_price.is_positive() || quantity < 1 || !total_price.is_positive() {
            return Err(Rejection::NonPositive);
        }

        if unit_price.as_decimal() > self.limits.max_unit_price {
            return Err(Rejection::UnitPriceCeiling(unit_price));
        }
        if total_price.as_decimal() > self.limits.max_total_price {
            return Err(Rejection::TotalPriceCeiling(total_price));
        }

        let inconsistent = Rejection::Inconsistent { unit: unit_price, quantity, total: total_price };
        let expected = unit_price.checked_mul(quantity).ok_or_else(|| inconsistent.clone())?.as_decimal();
        let tolerance = self
            .limits
            .rel_tolerance
            .checked_mul(expected)
            .unwrap_or(Decimal::MAX)
            .max(self.limits.min_abs_tolerance);
        match total_price.as_decimal().checked_sub(expected) {
            Some(diff) if diff.abs() <= tolerance => {}
            _ => return Err(inconsistent),
        }

        let lowered = name.to_lowercase();
        if let Some(keyword) = AGGREGATE_KEYWORDS.iter().find(|k| lowered.contains(*k)) {
            return Err(Rejection::AggregateKeyword(*keyword));
        }

        Ok(())
    }
}
