use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use sugang_recommend::{summarize, CompletedCourse, RecommendConfig, Recommender, StudentRequest};
use sugang_schema::{SchemaKind, Vectorizer};

/// Lecture recommendations from student preferences
#[derive(Parser, Debug)]
#[command(name = "sugang")]
#[command(about = "Preference-based lecture recommender", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the category lists for a request
    Recommend {
        /// Request JSON (profile, preferences, history)
        #[arg(short, long)]
        request: PathBuf,

        /// Recommender config; built-in pools when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding pool files, overrides the config
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Curriculum catalog, overrides the config
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print the preference vector a request encodes to
    Vectorize {
        #[arg(short, long)]
        request: PathBuf,

        #[arg(short, long, default_value = "liberal")]
        schema: SchemaKind,
    },

    /// Print the dimension table of a schema
    Schema {
        #[arg(default_value = "liberal")]
        schema: SchemaKind,
    },

    /// Credit progress for a request's history
    Credits {
        #[arg(short, long)]
        request: PathBuf,
    },
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

fn read_request(path: &Path) -> anyhow::Result<StudentRequest> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("Invalid request in {:?}", path))
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn run_recommend(
    request: &Path,
    config: Option<&Path>,
    data_dir: Option<PathBuf>,
    catalog: Option<PathBuf>,
    pretty: bool,
) -> anyhow::Result<()> {
    let mut config = match config {
        Some(path) => RecommendConfig::load_json(path).with_context(|| format!("Failed to load config {:?}", path))?,
        None => RecommendConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if catalog.is_some() {
        config.catalog = catalog;
    }
    info!("Data directory: {:?}", config.data_dir);

    let request = read_request(request)?;
    let recommender = Recommender::load(config).context("Failed to load candidate pools")?;
    let recommendations = recommender.recommend(&request)?;
    emit(&recommendations, pretty)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the JSON result
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("sugang v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Recommend {
            request,
            config,
            data_dir,
            catalog,
        } => run_recommend(&request, config.as_deref(), data_dir, catalog, args.pretty),
        Command::Vectorize { request, schema } => {
            let request = read_request(&request)?;
            let vectorizer = Vectorizer::new(schema.schema());
            emit(&vectorizer.vectorize(&request.preferences), args.pretty)
        }
        Command::Schema { schema } => emit(&schema.schema().describe(), args.pretty),
        Command::Credits { request } => {
            // a bare array of courses or a full request
            let value = read_json(&request)?;
            let history: Vec<CompletedCourse> = if value.is_array() {
                serde_json::from_value(value)?
            } else {
                serde_json::from_value::<StudentRequest>(value)?.history
            };
            emit(&summarize(&history), args.pretty)
        }
    }
}
