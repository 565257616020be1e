use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tillroll_ocr::{ParseResult, ParserConfig, RawRecognition, ReceiptTextParser};

#[derive(Parser, Debug)]
#[command(name = "tillroll")]
#[command(about = "Extract line items and totals from receipt OCR output")]
#[command(version)]
struct Cli {
    /// Parser configuration (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the result as single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse an OCR transcript that was produced elsewhere ("-" reads stdin)
    Text {
        input: PathBuf,
        /// Confidence reported by the engine that produced the transcript
        #[arg(long, default_value_t = 100.0)]
        confidence: f32,
    },
    /// Recognize a receipt image with Tesseract and parse the result
    Scan {
        image: PathBuf,
        /// Directory holding Tesseract traineddata files
        #[arg(long)]
        tessdata: Option<String>,
    },
}

/// What gets printed: the parse result plus the review flag.
#[derive(Debug, Serialize)]
struct Report {
    #[serde(flatten)]
    result: ParseResult,
    needs_review: bool,
}

impl Report {
    fn new(result: ParseResult, config: &ParserConfig) -> Self {
        let needs_review = result.needs_review(config.review_below_confidence);
        Self { result, needs_review }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let result = match &cli.command {
        Commands::Text { input, confidence } => {
            let text = read_transcript(input)?;
            let parser = ReceiptTextParser::new(&config)?;
            parser.parse(&RawRecognition::new(text, *confidence))
        }
        Commands::Scan { image, tessdata } => scan(image, tessdata.clone(), &config).await?,
    };

    tracing::info!(
        items = result.items.len(),
        total = %result.total_amount,
        source = %result.total_source,
        "receipt parsed"
    );

    let report = Report::new(result, &config);
    let json = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{json}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ParserConfig> {
    match path {
        Some(p) => ParserConfig::load(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(ParserConfig::default()),
    }
}

fn read_transcript(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("reading transcript from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading transcript {}", input.display()))
    }
}

#[cfg(feature = "tesseract")]
async fn scan(image: &Path, tessdata: Option<String>, config: &ParserConfig) -> Result<ParseResult> {
    use tillroll_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    use tillroll_ocr::ReceiptParser;

    let parser = ReceiptParser::new(TesseractRecognizer::new(tessdata), config)?;
    Ok(parser.parse_file(image).await?)
}

#[cfg(not(feature = "tesseract"))]
async fn scan(_image: &Path, _tessdata: Option<String>, _config: &ParserConfig) -> Result<ParseResult> {
    Err(tillroll_ocr::RecognitionError::NotAvailable.into())
}
