use rust_decimal::Decimal;
use tillroll_core::Money;

use crate::types::{LineItem, TotalSource};

// `sub` is captured so that `Sub-Total` / `Sub Total` lines can be skipped.
re!(re_label_amount,
    r"(?i)(?:合计|总计|应收|实收|总额|金额|(?:^|[^a-z])(?P<sub>sub[\s-]*)?total)\s*[:：]?\s*[¥￥]?\s*(?P<amount>\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)");
re!(re_amount_label,
    r"(?i)[¥￥]\s*(?P<amount>\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)\s*(?:合计|总计|total)");

/// Reconciles the receipt total: a labeled total line if one is printed,
/// otherwise the sum of the accepted items.
#[derive(Debug, Clone)]
pub struct TotalExtractor {
    max_declared_total: Decimal,
}

impl Default for TotalExtractor {
    fn default() -> Self {
        Self { max_declared_total: Decimal::from(100_000) }
    }
}

impl TotalExtractor {
    pub fn new(max_declared_total: Decimal) -> Self {
        Self { max_declared_total }
    }

    /// First labeled amount in document order inside `(0, max_declared_total)`.
    /// Noise lines are scanned too; the total line is itself noise.
    pub fn extract_declared_total(&self, lines: &[String]) -> Option<Money> {
        lines.iter().find_map(|line| {
            [re_label_amount(), re_amount_label()]
                .into_iter()
                .flat_map(|re| re.captures_iter(line))
                .filter(|c| c.name("sub").is_none())
                .filter_map(|c| c.name("amount")?.as_str().parse::<Money>().ok())
                .find(|amount| self.is_admissible(*amount))
        })
    }

    pub fn extract_total(&self, lines: &[String], items: &[LineItem]) -> Money {
        self.reconcile(lines, items).0
    }

    /// The total together with the path that produced it. The two paths
    /// are never mixed.
    pub fn reconcile(&self, lines: &[String], items: &[LineItem]) -> (Money, TotalSource) {
        match self.extract_declared_total(lines) {
            Some(declared) => {
                tracing::debug!(total = %declared, "declared total found");
                (declared, TotalSource::Declared)
            }
            None => {
                let summed: Money = items.iter().map(|i| i.total_price).sum();
                tracing::debug!(total = %summed, items = items.len(), "no declared total, summing items");
                (summed, TotalSource::Summed)
            }
        }
    }

    fn is_admissible(&self, amount: Money) -> bool {
        amount.is_positive() && amount.as_decimal() < self.max_declared_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn item(unit: i64, quantity: u32, total: i64) -> LineItem {
        LineItem {
            name: "item".into(),
            unit_price: Money::from_cents(unit),
            quantity,
            total_price: Money::from_cents(total),
        }
    }

    fn declared(text: &[&str]) -> Option<Money> {
        TotalExtractor::default().extract_declared_total(&lines(text))
    }

    #[test]
    fn label_then_amount_variants() {
        assert_eq!(declared(&["合计: ¥25.50"]), Some(Money::from_cents(2550)));
        assert_eq!(declared(&["总计 88"]), Some(Money::from_cents(8800)));
        assert_eq!(declared(&["应收：￥ 12.30"]), Some(Money::from_cents(1230)));
        assert_eq!(declared(&["TOTAL 48.60"]), Some(Money::from_cents(4860)));
        assert_eq!(declared(&["Grand Total: 99.99"]), Some(Money::from_cents(9999)));
    }

    #[test]
    fn amount_then_label_variant() {
        assert_eq!(declared(&["¥66.00 合计"]), Some(Money::from_cents(6600)));
    }

    #[test]
    fn subtotal_is_not_a_declared_total() {
        assert_eq!(declared(&["Subtotal 45.00"]), None);
        assert_eq!(declared(&["Subtotal 45.00", "Total 48.60"]), Some(Money::from_cents(4860)));
    }

    #[test]
    fn separated_subtotal_is_not_a_declared_total() {
        assert_eq!(declared(&["Sub-Total 45.00"]), None);
        assert_eq!(declared(&["SUB TOTAL: 45.00"]), None);
        assert_eq!(declared(&["Sub - Total 45.00"]), None);
        assert_eq!(
            declared(&["Sub-Total 45.00", "Tax 3.60", "Total 48.60"]),
            Some(Money::from_cents(4860))
        );
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(declared(&["Total: 1,299.00"]), Some(Money::from_cents(129900)));
        assert_eq!(declared(&["合计 ¥12,345.60"]), Some(Money::from_cents(1234560)));
        assert_eq!(declared(&["¥1,299.00 合计"]), Some(Money::from_cents(129900)));
        assert_eq!(declared(&["Total 1299"]), Some(Money::from_cents(129900)));
    }

    #[test]
    fn first_admissible_line_wins() {
        assert_eq!(
            declared(&["合计 30.00", "实收 100.00"]),
            Some(Money::from_cents(3000))
        );
    }

    #[test]
    fn implausible_amounts_are_skipped() {
        assert_eq!(declared(&["合计 0.00", "总计 12.00"]), Some(Money::from_cents(1200)));
        assert_eq!(declared(&["合计 100000", "应收 18.00"]), Some(Money::from_cents(1800)));
        assert_eq!(declared(&["合计 250000.00"]), None);
    }

    #[test]
    fn upper_bound_is_configurable() {
        let t = TotalExtractor::new(Decimal::from(50));
        assert_eq!(t.extract_declared_total(&lines(&["合计 60.00"])), None);
        assert_eq!(t.extract_declared_total(&lines(&["合计 40.00"])), Some(Money::from_cents(4000)));
    }

    #[test]
    fn declared_total_beats_item_sum() {
        let items = [item(1000, 2, 2000), item(1000, 1, 1000)];
        let (total, source) = TotalExtractor::default().reconcile(&lines(&["合计: ¥25.50"]), &items);
        assert_eq!(total, Money::from_cents(2550));
        assert_eq!(source, TotalSource::Declared);
    }

    #[test]
    fn falls_back_to_exact_item_sum() {
        let items = [item(1000, 2, 2000), item(500, 1, 500)];
        let (total, source) = TotalExtractor::default().reconcile(&lines(&["谢谢惠顾"]), &items);
        assert_eq!(total, Money::from_cents(2500));
        assert_eq!(source, TotalSource::Summed);
    }

    #[test]
    fn nothing_found_is_zero() {
        let total = TotalExtractor::default().extract_total(&[], &[]);
        assert_eq!(total, Money::zero());
        assert_eq!(total.to_string(), "0.00");
    }
}
