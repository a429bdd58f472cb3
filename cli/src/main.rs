//! Command-line entry point for the CRPT document client.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use crpt_core::config::{DEFAULT_BASE_URL, DEFAULT_REQUEST_LIMIT, DEFAULT_TIMEOUT_SECS, DEFAULT_WINDOW_MS};
use crpt_core::{ApiConfig, CrptApi, Description, DocType, Document, Product};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "crpt", version, about = "Submit goods-introduction documents to the CRPT registry")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Registry base URL.
    #[arg(long, env = "CRPT_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Maximum requests per window.
    #[arg(long, env = "CRPT_REQUEST_LIMIT", default_value_t = DEFAULT_REQUEST_LIMIT, global = true)]
    request_limit: u32,

    /// Rate limit window in milliseconds.
    #[arg(long, env = "CRPT_WINDOW_MS", default_value_t = DEFAULT_WINDOW_MS, global = true)]
    window_ms: u64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "CRPT_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,
}

impl From<ConfigArgs> for ApiConfig {
    fn from(args: ConfigArgs) -> Self {
        Self {
            base_url: args.base_url,
            timeout_secs: args.timeout_secs,
            request_limit: args.request_limit,
            window_ms: args.window_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a document read from a JSON file.
    Create {
        /// Path to the document JSON.
        #[arg(long, short)]
        document: PathBuf,
        /// Detached signature sent in the Authorization header.
        #[arg(long, env = "CRPT_SIGNATURE")]
        signature: String,
    },
    /// Show the processing state of a submitted document.
    Info {
        doc_id: String,
        #[arg(long, env = "CRPT_SIGNATURE")]
        signature: String,
    },
    /// Print a sample document to use as a template.
    Sample,
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if result.is_err() {
        tracing::debug!("global tracing subscriber already initialized");
    }
}

fn sample_document() -> Document {
    let date = NaiveDate::from_ymd_opt(2020, 1, 23).unwrap_or_default();
    Document {
        description: Some(Description {
            participant_inn: "7700000000".to_string(),
        }),
        doc_id: "doc-0001".to_string(),
        doc_status: "NEW".to_string(),
        doc_type: DocType::LpIntroduceGoods,
        import_request: true,
        owner_inn: "7700000000".to_string(),
        participant_inn: "7700000000".to_string(),
        producer_inn: "7700000000".to_string(),
        production_date: date,
        production_type: "OWN_PRODUCTION".to_string(),
        products: vec![Product {
            certificate_document: Some("CONFORMITY_CERTIFICATE".to_string()),
            certificate_document_date: Some(date),
            certificate_document_number: Some("RU-0001".to_string()),
            owner_inn: "7700000000".to_string(),
            producer_inn: "7700000000".to_string(),
            production_date: date,
            tnved_code: "6401100000".to_string(),
            uit_code: Some("010460043993125621JgXJ5.T".to_string()),
            uitu_code: None,
        }],
        reg_date: Some(date),
        reg_number: Some("0001".to_string()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match cli.command {
        Command::Sample => {
            println!("{}", serde_json::to_string_pretty(&sample_document())?);
        }
        Command::Create { document, signature } => {
            let raw = fs::read_to_string(&document)
                .with_context(|| format!("reading {}", document.display()))?;
            let doc: Document = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", document.display()))?;
            let api = CrptApi::from_config(&cli.config.into()).context("configuring client")?;
            let id = api.create_document(&doc, &signature)?;
            println!("{}", id.value);
        }
        Command::Info { doc_id, signature } => {
            let api = CrptApi::from_config(&cli.config.into()).context("configuring client")?;
            let info = api.document_info(&doc_id, &signature)?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }
    Ok(())
}
