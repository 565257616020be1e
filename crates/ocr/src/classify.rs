use regex::{Regex, RegexBuilder};

use crate::config::{ConfigError, ParserConfig};

re!(re_header,
    r"(?i)^(?:收据|发票|小票|购物小票|销售单|结账单|(?:receipt|invoice|ticket|sales\s+slip)\b)|(?:单号|流水号|订单号|票号|(?:order|receipt|trans(?:action)?)\s*(?:no\b\.?|#))|^(?:品名|商品名称|商品|名称)\s+(?:单价|数量|金额)|^(?:item|description)\s+(?:qty|price|amount)\b");
re!(re_store,
    r"(?i)^(?:店名|门店|商店|店铺|分店|地址|电话|联系电话|(?:tel|phone|address|store|shop)\b)|\d{3,4}-\d{7,8}|\b1[3-9]\d{9}\b|\(\d{3}\)\s*\d{3}-\d{4}");
re!(re_timestamp,
    r"\d{4}[-/.年]\d{1,2}[-/.月]\d{1,2}|\b\d{1,2}/\d{1,2}/\d{2,4}\b|\b\d{1,2}:\d{2}(?::\d{2})?\b");
re!(re_cashier,
    r"(?i)收银员|收银台|收银机|操作员|营业员|\b(?:cashier|operator|clerk)\b|served\s+by");
re!(re_aggregate,
    r"(?i)^(?:小计|合计|总计|总额|总价|应收|实收|应付|实付|找零|找赎|优惠|折扣|(?:subtotal|sub-total|sub\s+total|total|change|amount\s+due|balance\s+due|tax)\b)");
re!(re_courtesy,
    r"(?i)谢谢|欢迎|感谢|多谢|\b(?:thank|welcome)|see\s+you");
re!(re_separator,
    r"^[-=*_](?:\s*[-=*_]){2,}$");
re!(re_loyalty,
    r"(?i)会员|积分|\b(?:member|points|loyalty)");

/// Why a line was excluded from item extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseCategory {
    Header,
    StoreIdentity,
    Timestamp,
    Cashier,
    Aggregate,
    Courtesy,
    Separator,
    Loyalty,
    /// Matched one of the configured `extra_noise_patterns`.
    Custom,
}

impl std::fmt::Display for NoiseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NoiseCategory::Header => "header",
            NoiseCategory::StoreIdentity => "store_identity",
            NoiseCategory::Timestamp => "timestamp",
            NoiseCategory::Cashier => "cashier",
            NoiseCategory::Aggregate => "aggregate",
            NoiseCategory::Courtesy => "courtesy",
            NoiseCategory::Separator => "separator",
            NoiseCategory::Loyalty => "loyalty",
            NoiseCategory::Custom => "custom",
        };
        f.write_str(s)
    }
}

const CATEGORIES: [(NoiseCategory, fn() -> &'static Regex); 8] = [
    (NoiseCategory::Header, re_header),
    (NoiseCategory::StoreIdentity, re_store),
    (NoiseCategory::Timestamp, re_timestamp),
    (NoiseCategory::Cashier, re_cashier),
    (NoiseCategory::Aggregate, re_aggregate),
    (NoiseCategory::Courtesy, re_courtesy),
    (NoiseCategory::Separator, re_separator),
    (NoiseCategory::Loyalty, re_loyalty),
];

/// Flags header, metadata, aggregate and closing lines so they never reach
/// item extraction.
#[derive(Debug, Clone, Default)]
pub struct LineClassifier {
    extra: Vec<Regex>,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in categories plus caller-supplied patterns, matched
    /// case-insensitively.
    pub fn with_patterns<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra = patterns
            .into_iter()
            .map(|p| RegexBuilder::new(p.as_ref()).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { extra })
    }

    pub fn from_config(config: &ParserConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_patterns(&config.extra_noise_patterns)?)
    }

    /// First matching category, in declaration order.
    pub fn classify(&self, line: &str) -> Option<NoiseCategory> {
        let line = line.trim();
        CATEGORIES
            .iter()
            .find(|(_, re)| re().is_match(line))
            .map(|(category, _)| *category)
            .or_else(|| {
                self.extra
                    .iter()
                    .any(|re| re.is_match(line))
                    .then_some(NoiseCategory::Custom)
            })
    }

    pub fn is_noise_line(&self, line: &str) -> bool {
        self.classify(line).is_some()
    }

    /// One flag per line, `true` for noise.
    pub fn noise_mask(&self, lines: &[String]) -> Vec<bool> {
        lines
            .iter()
            .map(|line| match self.classify(line) {
                Some(category) => {
                    tracing::trace!(%category, line = line.as_str(), "noise line");
                    true
                }
                None => false,
            })
            .collect()
    }
}
