use std::path::Path;
use std::sync::Arc;

use crate::config::{ConfigError, ParserConfig};
use crate::parser::ReceiptTextParser;
use crate::recognizer::{OcrBackend, RecognitionError};
use crate::types::{ParseResult, RawRecognition};

/// Orchestrates: recognize → (retry on low confidence) → classify → extract → total.
pub struct ReceiptParser<R: OcrBackend> {
    recognizer: Arc<R>,
    parser: ReceiptTextParser,
    policy: RetryPolicy,
}

/// When and how the backend is called for one image.
#[derive(Debug, Clone)]
struct RetryPolicy {
    language_hint: String,
    retry_below_confidence: f32,
}

impl RetryPolicy {
    /// At most two backend calls. Backend errors are returned as-is.
    fn recognize<R: OcrBackend>(&self, backend: &R, image_bytes: &[u8]) -> Result<RawRecognition, RecognitionError> {
        let first = backend.recognize(image_bytes, &self.language_hint)?;
        if first.confidence >= self.retry_below_confidence {
            return Ok(first);
        }

        // A better score is adopted, but parsing stays on the first pass's text.
        // TODO: decide whether a higher-scoring retry should replace the text as well.
        tracing::info!(
            confidence = first.confidence,
            threshold = self.retry_below_confidence,
            "low recognition confidence, retrying once"
        );
        let second = backend.recognize(image_bytes, &self.language_hint)?;
        if second.confidence > first.confidence {
            tracing::info!(from = first.confidence, to = second.confidence, "adopting retry confidence");
            Ok(RawRecognition { confidence: second.confidence, ..first })
        } else {
            Ok(first)
        }
    }
}

impl<R: OcrBackend> ReceiptParser<R> {
    pub fn new(recognizer: R, config: &ParserConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            recognizer: Arc::new(recognizer),
            parser: ReceiptTextParser::new(config)?,
            policy: RetryPolicy {
                language_hint: config.language_hint.clone(),
                retry_below_confidence: config.retry_below_confidence,
            },
        })
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Synchronous entry point; the backend runs on the calling thread.
    /// No partial result is produced when the backend fails.
    pub fn parse_bytes(&self, image_bytes: &[u8]) -> Result<ParseResult, RecognitionError> {
        let recognition = self.policy.recognize(self.recognizer.as_ref(), image_bytes)?;
        Ok(self.parser.parse(&recognition))
    }
}

impl<R: OcrBackend + 'static> ReceiptParser<R> {
    /// Read an image from disk and parse it. Recognition runs on the
    /// blocking pool. An unreadable file is a recognition failure like any
    /// other.
    pub async fn parse_file(&self, path: &Path) -> Result<ParseResult, RecognitionError> {
        let bytes = tokio::fs::read(path).await?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "parsing receipt image");

        let recognizer = Arc::clone(&self.recognizer);
        let policy = self.policy.clone();
        let recognition = tokio::task::spawn_blocking(move || policy.recognize(recognizer.as_ref(), &bytes))
            .await
            .map_err(|e| RecognitionError::Engine(format!("recognition task failed: {e}")))??;
        Ok(self.parser.parse(&recognition))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
