use serde::{Deserialize, Serialize};
use tillroll_core::Money;

/// Text and self-reported confidence (0–100) from one recognition call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecognition {
    pub text: String,
    pub confidence: f32,
}

impl RawRecognition {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence: confidence.clamp(0.0, 100.0) }
    }
}

/// One purchased line that survived validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub total_price: Money,
}

/// Where `ParseResult::total_amount` came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TotalSource {
    /// A labeled total line printed on the receipt.
    Declared,
    /// Sum of the accepted items' line totals.
    Summed,
}

impl std::fmt::Display for TotalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TotalSource::Declared => write!(f, "declared"),
            TotalSource::Summed => write!(f, "summed"),
        }
    }
}

/// Structured result of one receipt parse, handed to the caller for review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseResult {
    /// Items in receipt print order.
    pub items: Vec<LineItem>,
    pub total_amount: Money,
    pub total_source: TotalSource,
    pub raw_text: String,
    pub confidence: f32,
}

impl ParseResult {
    /// Whether a human should look at this before it is committed.
    pub fn needs_review(&self, review_below_confidence: f32) -> bool {
        self.items.is_empty() || self.confidence < review_below_confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(confidence: f32, items: Vec<LineItem>) -> ParseResult {
        ParseResult {
            items,
            total_amount: Money::zero(),
            total_source: TotalSource::Summed,
            raw_text: String::new(),
            confidence,
        }
    }

    #[test]
    fn raw_recognition_clamps_confidence() {
        assert_eq!(RawRecognition::new("x", 150.0).confidence, 100.0);
        assert_eq!(RawRecognition::new("x", -3.0).confidence, 0.0);
        assert_eq!(RawRecognition::new("x", 42.5).confidence, 42.5);
    }

    #[test]
    fn total_source_display() {
        assert_eq!(TotalSource::Declared.to_string(), "declared");
        assert_eq!(TotalSource::Summed.to_string(), "summed");
    }

    #[test]
    fn needs_review_threshold() {
        let item = LineItem {
            name: "苹果".into(),
            unit_price: Money::from_cents(500),
            quantity: 1,
            total_price: Money::from_cents(500),
        };
        assert!(result(50.0, vec![item.clone()]).needs_review(70.0));
        assert!(!result(90.0, vec![item]).needs_review(70.0));
        // Nothing extracted always goes to a human.
        assert!(result(99.0, vec![]).needs_review(70.0));
    }

    #[test]
    fn serializes_snake_case_source() {
        let json = serde_json::to_value(result(80.0, vec![])).unwrap();
        assert_eq!(json["total_source"], "summed");
        assert_eq!(json["total_amount"], "0.00");
    }
}
