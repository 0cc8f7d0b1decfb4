use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use tag_clustering_lib::clustering::harvest::{DiversityFilter, HarvestFilter};
use tag_clustering_lib::clustering::similarity::{SimilarityLog, SimilaritySinks};
use tag_clustering_lib::clustering::tag_clustering::run_tag_clustering;
use tag_clustering_lib::storage::{load_records, write_clusters_json, write_similarity_csv, RecordFields};
use tag_clustering_lib::utils::clustering_config::ClusteringConfig;
use tag_clustering_lib::utils::constants::DEFAULT_TAGS_FIELD;
use tag_clustering_lib::utils::env::load_env;
use tag_clustering_lib::utils::get_memory_usage;
use tag_clustering_lib::utils::progress_bars::progress_config::ProgressConfig;

/// Groups tagged records into clusters by greedy tag-overlap merging
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Records file: JSON array, or JSON lines for .jsonl/.ndjson
    #[arg(long)]
    input: PathBuf,

    /// Where to write the clusters (JSON)
    #[arg(long)]
    output: PathBuf,

    /// Attribute holding each record's tags
    #[arg(long, default_value = DEFAULT_TAGS_FIELD)]
    tags_field: String,

    /// Attribute whose distinct values a harvested cluster must span (enables the diversity filter)
    #[arg(long)]
    diversity_field: Option<String>,

    /// Minimum records per harvested cluster (overrides CLUSTERING_MIN_ELEMENTS)
    #[arg(long)]
    min_elements: Option<usize>,

    /// Record-level threshold for the first round (overrides CLUSTERING_MIN_SIMILARITY_FIRST)
    #[arg(long)]
    min_similarity_first: Option<f64>,

    /// Cluster-level threshold for merge rounds (overrides CLUSTERING_MIN_SIMILARITY_NEXT)
    #[arg(long)]
    min_similarity_next: Option<f64>,

    /// Directory for CSV dumps of the similarity samples
    #[arg(long)]
    similarity_log_dir: Option<PathBuf>,

    /// Compute similarities on a single thread
    #[arg(long)]
    sequential: bool,

    /// Debug-level logging unless RUST_LOG is set
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
    info!("Starting tag clustering");
    load_env();

    let mut config = ClusteringConfig::from_env();
    if let Some(min_elements) = args.min_elements {
        config.min_elements_in_cluster = min_elements;
    }
    if let Some(first) = args.min_similarity_first {
        config.min_similarity_first_round = first;
    }
    if let Some(next) = args.min_similarity_next {
        config.min_similarity_next_rounds = Some(next);
    }
    if args.sequential {
        config.parallel = false;
    }
    config.validate().context("Invalid clustering parameters")?;
    config.log_config();

    let progress_config = ProgressConfig::from_env();
    info!(
        "Progress tracking: enabled={}, detailed={}",
        progress_config.enabled, progress_config.detailed
    );
    let multi_progress = progress_config.create_multi_progress();

    let fields = RecordFields::new(args.tags_field.clone(), args.diversity_field.clone());
    let records = load_records(&args.input, &fields)
        .with_context(|| format!("Failed to load records from {}", args.input.display()))?;
    if progress_config.should_show_memory() {
        info!("Memory after loading records: {} MB", get_memory_usage());
    }

    let diversity_filter = args
        .diversity_field
        .as_ref()
        .map(|_| DiversityFilter::from_records(&records, config.min_elements_in_cluster));
    if let Some(filter) = &diversity_filter {
        info!(
            "Harvest filter '{}': clusters must span at least {} distinct values",
            filter.name(),
            filter.min_distinct()
        );
    }

    let (sinks, logs) = match &args.similarity_log_dir {
        Some(_) => {
            let first = SimilarityLog::new();
            let next = SimilarityLog::new();
            (
                SimilaritySinks::new(Some(first.observer()), Some(next.observer())),
                Some((first, next)),
            )
        }
        None => (SimilaritySinks::none(), None),
    };

    let result = run_tag_clustering(
        &records,
        &config,
        &sinks,
        diversity_filter.as_ref().map(|f| f as &dyn HarvestFilter),
        multi_progress,
        &progress_config,
    )
    .context("Clustering failed")?;

    write_clusters_json(&args.output, &result.clusters)?;

    if let (Some(dir), Some((first, next))) = (&args.similarity_log_dir, logs) {
        let parameters = vec![
            ("input", args.input.display().to_string()),
            ("min_elements_in_cluster", config.min_elements_in_cluster.to_string()),
            ("min_similarity_first_round", config.min_similarity_first_round.to_string()),
            ("min_similarity_next_rounds", config.next_round_threshold().to_string()),
            ("run_id", result.stats.run_id.to_string()),
        ];
        write_similarity_csv(dir, "first_round", &first.samples(), &parameters)?;
        write_similarity_csv(dir, "next_rounds", &next.samples(), &parameters)?;
    }

    if result.clusters.is_empty() {
        warn!("No clusters produced");
    }
    info!(
        "Run {} finished: {} records → {} clusters in {:.2}s (signature {})",
        result.stats.run_id,
        result.stats.records_in,
        result.stats.total_clusters,
        result.stats.elapsed_secs,
        result.stats.signature
    );
    if log::log_enabled!(log::Level::Debug) {
        let summary = serde_json::to_string_pretty(&result.stats).context("Failed to serialize run stats")?;
        log::debug!("Run stats:\n{}", summary);
    }

    Ok(())
}
