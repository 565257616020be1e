use tillroll_core::Money;

use crate::types::LineItem;
use crate::validate::ItemValidator;

// Amounts: `1299.00`, `1,299.00`, `88`.
re!(re_full_record,
    r"^(.+?)\s+[¥￥]?(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)\s+(\d+)\s+[¥￥]?(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)$");
re!(re_name_price,
    r"^(.+?)\s+[¥￥]?(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)$");
re!(re_quantity_marker,
    r"(?i)(?:^|[^a-z])(?:数量|quantity|qty|x|×)\s*[:：]?\s*(\d+)\b");
re!(re_marker_line,
    r"(?i)^(?:数量|quantity|qty|x|×)\s*[:：]?\s*\d+$");
re!(re_bare_amount,
    r"^[¥￥$]?\s*(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)$");
re!(re_letter,
    r"\p{L}");
re!(re_numeric_only,
    r"^[\d\s.,:¥￥$-]+$");

/// A line plus its neighbours, as seen by one strategy.
struct LineContext<'a> {
    lines: &'a [String],
    index: usize,
}

impl<'a> LineContext<'a> {
    fn current(&self) -> &'a str {
        self.lines[self.index].trim()
    }

    fn previous(&self) -> Option<&'a str> {
        self.index.checked_sub(1).map(|i| self.lines[i].trim())
    }

    fn next(&self) -> Option<&'a str> {
        self.lines.get(self.index + 1).map(|l| l.trim())
    }
}

type Strategy = fn(&LineContext) -> Option<LineItem>;

/// Tried top-down on every non-noise line; the first candidate the
/// validator accepts wins.
const STRATEGIES: [(&str, Strategy); 3] = [
    ("full_record", full_record),
    ("name_price", name_price),
    ("two_line", two_line),
];

/// `<name> <price> <qty> <price>` on one line.
fn full_record(ctx: &LineContext) -> Option<LineItem> {
    let c = re_full_record().captures(ctx.current())?;
    Some(LineItem {
        name: c.get(1)?.as_str().trim().to_string(),
        unit_price: c.get(2)?.as_str().parse().ok()?,
        quantity: c.get(3)?.as_str().parse().ok()?,
        total_price: c.get(4)?.as_str().parse().ok()?,
    })
}

/// `<name> <price>` with the quantity taken from a marker on the line
/// above, else the line below, else 1.
fn name_price(ctx: &LineContext) -> Option<LineItem> {
    let c = re_name_price().captures(ctx.current())?;
    let unit_price: Money = c.get(2)?.as_str().parse().ok()?;
    let quantity = ctx
        .previous()
        .and_then(quantity_marker)
        .or_else(|| ctx.next().and_then(quantity_marker))
        .unwrap_or(1);
    Some(LineItem {
        name: c.get(1)?.as_str().trim().to_string(),
        unit_price,
        quantity,
        total_price: unit_price.checked_mul(quantity)?,
    })
}

/// A product name on this line and a bare amount on the next.
fn two_line(ctx: &LineContext) -> Option<LineItem> {
    let name = ctx.current();
    if !is_plausible_name(name) {
        return None;
    }
    let c = re_bare_amount().captures(ctx.next()?)?;
    let unit_price: Money = c.get(1)?.as_str().parse().ok()?;
    Some(LineItem {
        name: name.to_string(),
        unit_price,
        quantity: 1,
        total_price: unit_price,
    })
}

fn quantity_marker(line: &str) -> Option<u32> {
    re_quantity_marker().captures(line)?.get(1)?.as_str().parse().ok()
}

fn is_plausible_name(line: &str) -> bool {
    let chars = line.chars().count();
    (2..=50).contains(&chars)
        && re_letter().is_match(line)
        && !re_numeric_only().is_match(line)
        && quantity_marker(line).is_none()
}

/// Walks classified lines in order and emits at most one item per line.
#[derive(Debug, Clone, Default)]
pub struct LineItemExtractor {
    validator: ItemValidator,
}

impl LineItemExtractor {
    pub fn new(validator: ItemValidator) -> Self {
        Self { validator }
    }

    /// `noise[i]` marks `lines[i]` as excluded; missing flags count as
    /// not noise.
    pub fn extract(&self, lines: &[String], noise: &[bool]) -> Vec<LineItem> {
        (0..lines.len())
            .filter(|&i| !noise.get(i).copied().unwrap_or(false))
            .filter_map(|index| self.extract_line(&LineContext { lines, index }))
            .collect()
    }

    fn extract_line(&self, ctx: &LineContext) -> Option<LineItem> {
        // Bare quantity markers and bare amounts only ever annotate their
        // neighbours.
        let line = ctx.current();
        if re_marker_line().is_match(line) || re_bare_amount().is_match(line) {
            return None;
        }
        STRATEGIES.iter().find_map(|(strategy, apply)| {
            let item = apply(ctx)?;
            match self.validator.check(&item.name, item.unit_price, item.quantity, item.total_price) {
                Ok(()) => {
                    tracing::debug!(strategy, name = %item.name, total = %item.total_price, "line item accepted");
                    Some(item)
                }
                Err(reason) => {
                    tracing::trace!(strategy, line = ctx.current(), %reason, "candidate rejected");
                    None
                }
            }
        })
    }
}
