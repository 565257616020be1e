use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::types::RawRecognition;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Failed to read image: {0}")]
    ImageRead(#[from] std::io::Error),
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over an OCR engine.
/// Implementations accept raw PNG/JPEG image bytes plus a language hint and
/// return the recognized text with the engine's own confidence (0–100).
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8], language_hint: &str) -> Result<RawRecognition, RecognitionError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Replays scripted results in order, repeating the last one once the
/// script runs out. Lets the parsing pipeline run without Tesseract.
#[derive(Debug)]
pub struct MockRecognizer {
    script: Vec<RawRecognition>,
    calls: AtomicUsize,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self::sequence(vec![RawRecognition::new(text, confidence)])
    }

    pub fn sequence(script: Vec<RawRecognition>) -> Self {
        Self { script, calls: AtomicUsize::new(0) }
    }

    /// How many times `recognize` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8], _language_hint: &str) -> Result<RawRecognition, RecognitionError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .get(n)
            .or_else(|| self.script.last())
            .cloned()
            .ok_or_else(|| RecognitionError::Engine("mock recognizer has no scripted result".into()))
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, RecognitionError};
    use crate::types::RawRecognition;
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>) -> Self {
            Self { data_path }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8], language_hint: &str) -> Result<RawRecognition, RecognitionError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), language_hint)
                .map_err(|e| RecognitionError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| RecognitionError::ImageDecode(e.to_string()))?;
            let text = lt.get_utf8_text().map_err(|e| RecognitionError::Engine(e.to_string()))?;
            let confidence = lt.mean_text_conf() as f32;
            Ok(RawRecognition::new(text, confidence))
        }
    }
}
