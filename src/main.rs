use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::{
    error::Error,
    path::{Path, PathBuf},
};
use survey_tour::sdk::{
    config::{OrsBackend, OrsConfig},
    points::{load_points, save_tour_csv, save_tour_json, Point},
    routing::{
        CachedMetric, DistanceCache, DistanceMetric, HaversineMetric, LocalOrsProvider,
        RemoteOrsProvider,
    },
    tour::{Tour, TourBuilder},
    util::{log::init_logging, rate_limit::ors_limiter},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MetricChoice {
    /// Great-circle distance, no network
    Haversine,
    /// Road distance from OpenRouteService, Haversine where a lookup fails
    Road,
}

/// Orders survey points into a closed tour that starts and ends at the block headquarters
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Points file: .csv (latitude,longitude,place,type) or .json
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the tour as JSON
    #[arg(short, long, default_value = "tour.json")]
    output: PathBuf,

    /// Distance metric used to pick the nearest point
    #[arg(short, long, value_enum, default_value_t = MetricChoice::Haversine)]
    metric: MetricChoice,

    /// [Optional] Also write the stops as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Road distance cache, reused between runs
    #[arg(long, default_value = "distance_cache.json")]
    cache: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging("info");
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let points = load_points(&cli.input)?;
    log::info!("Loaded {} points from {}", points.len(), cli.input.display());

    let tour = match cli.metric {
        MetricChoice::Haversine => TourBuilder::new(HaversineMetric).build(&points).await?,
        MetricChoice::Road => road_tour(&points, &cli.cache).await?,
    };

    for stop in &tour.stops {
        log::info!("  {:>3}. {}", stop.sequence, stop.point.label());
    }
    log::info!(
        "Total distance {:.2} km ({} of {} legs estimated with Haversine)",
        tour.total_distance_km(),
        tour.fallback_legs(),
        tour.legs.len()
    );

    save_tour_json(&tour, &cli.output)?;
    log::info!("✅ Tour written to {}", cli.output.display());

    if let Some(csv_path) = &cli.csv {
        save_tour_csv(&tour, csv_path)?;
        log::info!("✅ Stops written to {}", csv_path.display());
    }

    Ok(())
}

async fn road_tour(points: &[Point], cache_path: &Path) -> anyhow::Result<Tour> {
    let config = OrsConfig::from_env()?;
    let cache = DistanceCache::load_from_file(cache_path)
        .with_context(|| format!("Failed to load distance cache {}", cache_path.display()))?;

    match config.backend {
        OrsBackend::Remote { api_key, base_url } => {
            let limiter = ors_limiter(config.requests_per_minute);
            let provider = RemoteOrsProvider::new(api_key, &base_url, &config.profile, limiter)?;
            cached_tour(provider, cache, points, cache_path).await
        }
        OrsBackend::Local { base_url } => {
            let provider = LocalOrsProvider::new(&base_url, &config.profile)?;
            cached_tour(provider, cache, points, cache_path).await
        }
        OrsBackend::Offline => {
            log::warn!(
                "Neither ORS_API_KEY nor ORS_LOCAL_URL is set; using Haversine distances"
            );
            Ok(TourBuilder::new(HaversineMetric).build(points).await?)
        }
    }
}

async fn cached_tour<M: DistanceMetric>(
    provider: M,
    cache: DistanceCache,
    points: &[Point],
    cache_path: &Path,
) -> anyhow::Result<Tour> {
    let builder = TourBuilder::new(CachedMetric::new(provider, cache));
    let tour = builder.build(points).await?;

    builder
        .metric()
        .save_to_file(cache_path)
        .with_context(|| format!("Failed to save distance cache {}", cache_path.display()))?;
    log::info!(
        "💾 {} road distances cached in {}",
        builder.metric().cached_pairs(),
        cache_path.display()
    );
    Ok(tour)
}
