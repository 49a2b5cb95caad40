#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use tenderlens::analysis::TenderAnalyzer;
use tenderlens::document::{
    DocumentMetadata, ExtractedDocument, TextExtractor, UnsupportedFormatError,
};
use tenderlens::gateway::{ProviderGateway, ProviderRegistry, StderrUsageSink};

#[derive(Parser)]
#[command(name = "tenderlens", version, about = "Tender document analysis CLI")]
struct Cli {
    /// Document to analyze (plain text or markdown).
    file: PathBuf,

    /// Write the report JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Plain-text extractor: the CLI handles txt/md only; richer formats come
/// from external extraction tooling.
struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ExtractedDocument, UnsupportedFormatError> {
        let extension = file_name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if extension != "txt" && extension != "md" {
            return Err(UnsupportedFormatError::new(file_name));
        }

        let text = String::from_utf8_lossy(bytes).into_owned();
        let metadata = DocumentMetadata {
            file_name: file_name.to_string(),
            file_type: extension,
            page_count: None,
            word_count: text.split_whitespace().count() as u32,
            language: None,
        };
        Ok(ExtractedDocument { text, metadata })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file_name = cli
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    let bytes = fs::read(&cli.file)?;
    let document = PlainTextExtractor.extract(&file_name, &bytes)?;

    let registry = ProviderRegistry::from_env()?;
    let gateway = ProviderGateway::new(registry, Arc::new(StderrUsageSink))?;
    let analyzer = TenderAnalyzer::new(gateway);

    let mut print_progress = |percent: u8| eprintln!("progress: {percent}%");
    let result = analyzer
        .analyze(&document.text, &document.metadata, Some(&mut print_progress))
        .await?;

    let json = serde_json::to_string_pretty(&result)?;
    match cli.out {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
