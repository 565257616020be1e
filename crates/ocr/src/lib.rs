//! Receipt transcript parsing: noise classification, item extraction,
//! total reconciliation and the recognition retry policy around them.

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod classify;
pub mod config;
pub mod items;
pub mod parser;
pub mod pipeline;
pub mod recognizer;
pub mod total;
pub mod types;
pub mod validate;

pub use classify::{LineClassifier, NoiseCategory};
pub use config::{ConfigError, ItemLimits, ParserConfig};
pub use items::LineItemExtractor;
pub use parser::{split_lines, ReceiptTextParser};
pub use pipeline::ReceiptParser;
pub use recognizer::{MockRecognizer, OcrBackend, RecognitionError};
pub use total::TotalExtractor;
pub use types::{LineItem, ParseResult, RawRecognition, TotalSource};
pub use validate::{ItemValidator, Rejection};
