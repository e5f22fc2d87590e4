use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use invoicexpert::document::InvoiceDocument;
use invoicexpert::inference::LayoutLmv3;
use invoicexpert::invoice::{extract_document, ExtractionOptions};
use invoicexpert::ocr::OcrWord;
use invoicexpert::server;
use invoicexpert::utils::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "invoicexpert")]
#[command(about = "Invoice field extraction with LayoutLMv3")]
struct Args {
    /// Configuration file (defaults to config/app_config.json when present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Bind address, overrides `host_url` from the configuration
        #[arg(long)]
        addr: Option<String>,
    },
    /// Extract fields from one invoice and print them as JSON
    Extract {
        /// Invoice file (png, jpg, jpeg or pdf)
        input: PathBuf,

        /// Where to write the annotated page as PNG
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// JSON file with page words (`[{"text": .., "bbox": [x0, y0, x1, y1]}]`)
        #[arg(long)]
        words: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoicexpert=info,tower_http=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::init_from(args.config.as_deref())?;

    setup_ort()?;

    match args.command {
        Command::Serve { addr } => run_server(config, addr).await,
        Command::Extract {
            input,
            output,
            words,
        } => run_extract(config, &input, output.as_deref(), words.as_deref()),
    }
}

fn setup_ort() -> Result<(), Box<dyn std::error::Error>> {
    let dylib_path =
        env::var("ORT_DYLIB_PATH").unwrap_or_else(|_| "/usr/lib/libonnxruntime.so".to_string());

    ort::init_from(dylib_path)
        .with_execution_providers([ort::execution_providers::CUDAExecutionProvider::default()
            .with_device_id(0)
            .build()])
        .commit()?;

    Ok(())
}

async fn run_server(
    config: &AppConfig,
    addr: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = addr.unwrap_or_else(|| config.host_url.to_string());
    let socket_addr: std::net::SocketAddr = addr.parse()?;

    server::initialize_models().await?;

    server::start_server(socket_addr).await?;

    Ok(())
}

fn run_extract(
    config: &AppConfig,
    input: &Path,
    output: Option<&Path>,
    words: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let filename = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let document = InvoiceDocument::new(&bytes, filename)?;

    let supplied_words = match words {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(serde_json::from_str::<Vec<OcrWord>>(&content)?)
        }
        None => None,
    };

    let options = ExtractionOptions::from_config(config)?;
    let extracted = LayoutLmv3::with_instance(|model| {
        extract_document(
            document,
            supplied_words,
            model,
            &options,
            &config.ocr_language,
        )
    })?;

    if let Some(path) = output {
        extracted.image.save(path)?;
        tracing::info!(path = %path.display(), "Wrote annotated invoice");
    }

    println!("{}", serde_json::to_string_pretty(&extracted.fields)?);

    Ok(())
}

