use crate::classify::LineClassifier;
use crate::config::{ConfigError, ParserConfig};
use crate::items::LineItemExtractor;
use crate::total::TotalExtractor;
use crate::types::{ParseResult, RawRecognition};
use crate::validate::ItemValidator;

/// Trimmed, non-blank lines of a transcript in their original order.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// The transcript-to-items engine. Holds only immutable configuration, so
/// one instance can serve any number of receipts concurrently.
#[derive(Debug, Clone, Default)]
pub struct ReceiptTextParser {
    classifier: LineClassifier,
    extractor: LineItemExtractor,
    totals: TotalExtractor,
}

impl ReceiptTextParser {
    pub fn new(config: &ParserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier: LineClassifier::from_config(config)?,
            extractor: LineItemExtractor::new(ItemValidator::new(config.limits.clone())),
            totals: TotalExtractor::new(config.max_declared_total),
        })
    }

    /// Never fails: lines nothing can be made of are dropped.
    pub fn parse(&self, recognition: &RawRecognition) -> ParseResult {
        let lines = split_lines(&recognition.text);
        let noise = self.classifier.noise_mask(&lines);
        let items = self.extractor.extract(&lines, &noise);
        let (total_amount, total_source) = self.totals.reconcile(&lines, &items);

        tracing::debug!(
            lines = lines.len(),
            noise = noise.iter().filter(|n| **n).count(),
            items = items.len(),
            total = %total_amount,
            source = %total_source,
            "transcript parsed"
        );

        ParseResult {
            items,
            total_amount,
            total_source,
            raw_text: recognition.text.clone(),
            confidence: recognition.confidence,
        }
    }
}
