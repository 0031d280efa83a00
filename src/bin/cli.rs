use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vaycay_sampler::{
    store::SqliteStore, Bounds, CityPayload, Sample, SampleResponse, SamplerConfig, SamplingEngine,
    SqliteCache, SystemClock,
};

#[derive(Parser)]
#[command(name = "vaycay-sampler")]
#[command(about = "Fair geographic sampling over the Vaycay city database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database path (candidates table and sample cache)
    #[arg(short, long, default_value = "vaycay.db")]
    db: String,

    /// Optional YAML config file
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample the whole pool for a date
    Global {
        /// Date key, e.g. 2020-01-15
        date: String,

        /// Maximum results (defaults to the configured budget)
        #[arg(short, long)]
        budget: Option<usize>,
    },

    /// Sample inside a bounding box
    Bounds {
        /// Date key, e.g. 2020-01-15
        date: String,

        #[arg(long, allow_hyphen_values = true)]
        min_lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        max_lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        min_long: f64,

        #[arg(long, allow_hyphen_values = true)]
        max_long: f64,

        /// Expansion fraction (defaults to the configured buffer)
        #[arg(long)]
        buffer: Option<f64>,

        /// Maximum results (defaults to the configured budget)
        #[arg(short, long)]
        budget: Option<usize>,
    },

    /// Get cache statistics
    Stats,

    /// Remove expired cache entries
    Sweep,

    /// Remove every cache entry
    Clear,
}

fn print_sample(response: &SampleResponse<CityPayload>) {
    println!("\n✅ {}", response.display());
    println!("   Key: {}", response.cache_key);
    println!("   Latency: {:.2}ms", response.latency_ms);

    if !response.candidates().is_empty() {
        println!("\n📋 Candidates:");
        for (i, c) in response.candidates().iter().enumerate() {
            println!(
                "   {}. {} ({}) pop={} @ {:.3},{:.3}",
                i + 1,
                c.payload.city(),
                c.category,
                c.weight.map(|w| format!("{:.0}", w)).unwrap_or_else(|| "N/A".to_string()),
                c.lat,
                c.long
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SamplerConfig::load(path)?,
        None => SamplerConfig::default(),
    };

    let store = Arc::new(SqliteStore::<CityPayload>::open(&cli.db)?);
    let cache = Arc::new(SqliteCache::<Sample<CityPayload>>::new(&cli.db)?);
    let engine = SamplingEngine::<CityPayload>::with_cache(store, cache, Arc::new(SystemClock), config)?;

    match cli.command {
        Commands::Global { date, budget } => {
            let budget = budget.unwrap_or(engine.config().budget);
            println!("🌍 Sampling {} (budget {})", date, budget);

            let response = engine.sample_global(&date, budget).await?;
            print_sample(&response);
        }

        Commands::Bounds {
            date,
            min_lat,
            max_lat,
            min_long,
            max_long,
            buffer,
            budget,
        } => {
            let bounds = Bounds::new(min_lat, max_lat, min_long, max_long);
            let buffer = buffer.unwrap_or(engine.config().buffer_percent);
            let budget = budget.unwrap_or(engine.config().budget);
            println!("🗺️  Sampling {} in {} (budget {})", date, bounds, budget);

            let response = engine.sample_in_bounds(&date, bounds, buffer, budget).await?;
            print_sample(&response);
        }

        Commands::Stats => {
            let stats = engine.cache_stats().await?;

            println!("📊 Cache Statistics ({}):", stats.backend);
            println!("   Total entries: {}", stats.entries);
            println!("   Hits: {}", stats.hits);
            println!("   Misses: {}", stats.misses);
            println!("   Hit rate: {:.1}%", stats.hit_rate());
        }

        Commands::Sweep => {
            println!("🧹 Removing expired entries...");

            let removed = engine.sweep_cache().await?;

            println!("✅ Removed {} entries", removed);
        }

        Commands::Clear => {
            println!("🧹 Clearing cache...");

            let removed = engine.clear_cache().await?;

            println!("✅ Removed {} entries", removed);
        }
    }

    Ok(())
}
