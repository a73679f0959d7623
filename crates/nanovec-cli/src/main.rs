//! `nanovec` CLI — create, inspect, and query nanovec stores from a shell.
//!
//! Usage:
//!   `nanovec create ./docs.nvdb --dimension 4 --metric cosine`
//!   `nanovec insert ./docs.nvdb --id 1 --vector 0.1,0.2,0.3,0.4`
//!   `nanovec search ./docs.nvdb --query 0.1,0.2,0.3,0.4 --k 5`

mod cli_config;

use clap::{Parser, Subcommand, ValueEnum};
use cli_config::{CliSettings, OutputFormat};
use nanovec_core::{Engine, EngineConfig, Metric, SearchHit, VectorRecord};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nanovec")]
#[command(author, version, about = "Embeddable vector database command-line tool")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format; defaults to the value in `nanovec.toml` or `plain`.
    #[arg(long, global = true)]
    format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    Cosine,
    Dot,
    Euclidean,
}

impl From<MetricArg> for Metric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Cosine => Self::Cosine,
            MetricArg::Dot => Self::Dot,
            MetricArg::Euclidean => Self::Euclidean,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new store.
    Create {
        /// Path to the store file.
        path: PathBuf,
        /// Vector dimension.
        #[arg(long)]
        dimension: usize,
        /// Similarity metric.
        #[arg(long, value_enum, default_value_t = MetricArg::Cosine)]
        metric: MetricArg,
        /// Optional cap on live vector count.
        #[arg(long)]
        max_vectors: Option<u64>,
    },
    /// Insert a vector under an id.
    Insert {
        /// Path to the store file.
        path: PathBuf,
        /// Vector id.
        #[arg(long)]
        id: u64,
        /// Comma-separated vector components.
        #[arg(long)]
        vector: String,
    },
    /// Read back the vector stored under an id.
    Get {
        /// Path to the store file.
        path: PathBuf,
        /// Vector id.
        #[arg(long)]
        id: u64,
    },
    /// Delete the vector stored under an id.
    Delete {
        /// Path to the store file.
        path: PathBuf,
        /// Vector id.
        #[arg(long)]
        id: u64,
    },
    /// Find the k nearest vectors to a query.
    Search {
        /// Path to the store file.
        path: PathBuf,
        /// Comma-separated query vector components.
        #[arg(long)]
        query: String,
        /// Number of results to return.
        #[arg(long)]
        k: Option<usize>,
        /// Minimum score to keep a result; 0.0 disables filtering.
        #[arg(long, default_value_t = 0.0)]
        min_similarity: f32,
    },
    /// Print live count, on-disk size, dimension, metric, and operational
    /// counters.
    Stats {
        /// Path to the store file.
        path: PathBuf,
    },
    /// Print a random vector of the given dimension, for quick smoke tests.
    Generate {
        /// Vector dimension.
        #[arg(long)]
        dimension: usize,
        /// How many vectors to print, one per line.
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// Random seed, for reproducible output.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Delete a store's backing file.
    Drop {
        /// Path to the store file.
        path: PathBuf,
    },
}

fn parse_vector(raw: &str) -> anyhow::Result<Vec<f32>> {
    raw.split(',')
        .map(|s| s.trim().parse::<f32>().map_err(anyhow::Error::from))
        .collect()
}

fn print_record(record: &VectorRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record).unwrap());
        }
        OutputFormat::Plain => {
            println!("id={} timestamp={} vector={:?}", record.id, record.timestamp, record.vector);
        }
    }
}

fn print_hits(hits: &[SearchHit], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(hits).unwrap());
        }
        OutputFormat::Plain => {
            for hit in hits {
                println!("{}\t{:.6}", hit.id, hit.score);
            }
        }
    }
}

fn run(cli: Cli, settings: &CliSettings) -> anyhow::Result<()> {
    let format = cli.format.unwrap_or(settings.format);

    match cli.command {
        Commands::Create {
            path,
            dimension,
            metric,
            max_vectors,
        } => {
            let mut config = EngineConfig::new("cli", path, dimension, metric.into());
            if let Some(max) = max_vectors {
                config = config.with_max_vectors(max);
            }
            let engine = Engine::create(config)?;
            engine.close()?;
            println!("created store");
        }
        Commands::Insert { path, id, vector } => {
            let vector = parse_vector(&vector)?;
            let engine = Engine::open_path("cli", path)?;
            engine.insert(id, vector)?;
            engine.close()?;
            println!("inserted id={id}");
        }
        Commands::Get { path, id } => {
            let engine = Engine::open_path("cli", path)?;
            let record = engine.get(id)?;
            print_record(&record, format);
            engine.close()?;
        }
        Commands::Delete { path, id } => {
            let engine = Engine::open_path("cli", path)?;
            engine.delete(id)?;
            engine.close()?;
            println!("deleted id={id}");
        }
        Commands::Search {
            path,
            query,
            k,
            min_similarity,
        } => {
            let query = parse_vector(&query)?;
            let engine = Engine::open_path("cli", path)?;
            let k = k.unwrap_or(settings.default_k);
            let hits = engine.search(&query, k, min_similarity)?;
            print_hits(&hits, format);
            engine.close()?;
        }
        Commands::Stats { path } => {
            let engine = Engine::open_path("cli", path)?;
            let stats = engine.stats()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Plain => {
                    println!("live_count={}", stats.live_count);
                    println!("on_disk_size={}", stats.on_disk_size);
                    println!("dimension={}", stats.dimension);
                    println!("path={}", stats.path.display());
                    println!("inserts={}", stats.counters.inserts);
                    println!("searches={}", stats.counters.searches);
                    println!("deletes={}", stats.counters.deletes);
                    println!(
                        "distance_computations={}",
                        stats.counters.distance_computations
                    );
                    println!("memory_used_bytes={}", stats.counters.memory_used_bytes);
                }
            }
            engine.close()?;
        }
        Commands::Generate {
            dimension,
            count,
            seed,
        } => {
            use rand::rngs::StdRng;
            use rand::{Rng, SeedableRng};
            let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
            for _ in 0..count {
                let vector: Vec<f32> = (0..dimension).map(|_| rng.gen_range(-1.0..1.0)).collect();
                println!(
                    "{}",
                    vector
                        .iter()
                        .map(|v| format!("{v:.6}"))
                        .collect::<Vec<_>>()
                        .join(",")
                );
            }
        }
        Commands::Drop { path } => {
            Engine::drop_path(path)?;
            println!("dropped store");
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let settings = CliSettings::load()?;
    if let Err(e) = run(cli, &settings) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    Ok(())
}
