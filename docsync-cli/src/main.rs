use clap::{Args, Parser, Subcommand};
use docsync::{ClientConfig, ElasticClient, IndexUpdater, Mutator, UpdateReport, WriteConfig};
use serde_json::{json, Value};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docsync", about = "Compile and apply document updates to a search index")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding docsync.json
    #[arg(long, env = "DOCSYNC_CONFIG_DIR", default_value = ".")]
    config_dir: PathBuf,

    /// Overrides the configured host
    #[arg(long)]
    host: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the update script for a mutator (argument or stdin)
    Compile { mutator: Option<String> },
    /// Apply a mutator to the documents a selector names
    PartialUpdate {
        #[arg(long)]
        selector: String,
        #[arg(long)]
        mutator: String,
        /// Update every matched document, not only the first
        #[arg(long)]
        multi: bool,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Index a full document (argument or stdin)
    Insert {
        doc: Option<String>,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Merge a document into the indexed one with the same _id
    Update {
        doc: Option<String>,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Run a query and print the raw response
    Search {
        query: Option<String>,
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args)]
struct TargetArgs {
    #[arg(long)]
    index: Option<String>,
    #[arg(long = "type")]
    doc_type: Option<String>,
    /// Comma-separated top-level fields mirrored into the index
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,
}

impl TargetArgs {
    fn write_config(&self) -> WriteConfig {
        let mut config = WriteConfig::new();
        config.index = self.index.clone();
        config.doc_type = self.doc_type.clone();
        if !self.fields.is_empty() {
            config = config.fields_to_include(self.fields.iter().cloned());
        }
        config
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_json(arg: Option<String>, what: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = match arg {
        Some(raw) => raw,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    serde_json::from_str(&raw).map_err(|e| format!("invalid {} JSON: {}", what, e).into())
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report_json(report: &UpdateReport) -> Value {
    let outcomes: Vec<Value> = report
        .outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(_) => json!({"id": o.id, "ok": true}),
            Err(e) => json!({"id": o.id, "ok": false, "error": e.to_string()}),
        })
        .collect();
    json!({
        "skipped": report.skipped.map(|r| format!("{:?}", r)),
        "script": report.script,
        "succeeded": report.succeeded(),
        "failed": report.failed(),
        "outcomes": outcomes,
    })
}

fn updater(cli: &Cli) -> Result<IndexUpdater<ElasticClient>, Box<dyn std::error::Error>> {
    let mut config = ClientConfig::load_or_default(&cli.config_dir);
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    let client = ElasticClient::new(&config)?;
    Ok(IndexUpdater::new(client, config))
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Compile { mutator } => {
            let mutator = read_json(mutator.clone(), "mutator")?;
            let compiled = docsync::compile_json(&mutator)?;
            print_json(&serde_json::to_value(compiled)?)?;
            Ok(true)
        }
        Command::PartialUpdate {
            selector,
            mutator,
            multi,
            target,
        } => {
            let selector = read_json(Some(selector.clone()), "selector")?;
            let mutator = Mutator::from_json(&read_json(Some(mutator.clone()), "mutator")?)?;
            let config = target.write_config().multi(*multi);
            let report = updater(&cli)?
                .partial_update(&selector, &mutator, &config)
                .await?;
            print_json(&report_json(&report))?;
            Ok(report.failed() == 0)
        }
        Command::Insert { doc, target } => {
            let doc = read_json(doc.clone(), "document")?;
            let resp = updater(&cli)?.insert(&doc, &target.write_config()).await?;
            print_json(&resp)?;
            Ok(true)
        }
        Command::Update { doc, target } => {
            let doc = read_json(doc.clone(), "document")?;
            let resp = updater(&cli)?.update(&doc, &target.write_config()).await?;
            print_json(&resp)?;
            Ok(true)
        }
        Command::Search { query, target } => {
            let query = read_json(query.clone(), "query")?;
            let resp = updater(&cli)?.search(&query, &target.write_config()).await?;
            print_json(&resp)?;
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
