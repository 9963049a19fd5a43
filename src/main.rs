use anyhow::Result;
use clap::Parser;
use crossbeam::channel;
use ego_metrics::aggregator::{partition_users, run_batch, BatchContext, UserResult};
use ego_metrics::config::{Config, EgoConfig, LouvainConfig, MetricSelection};
use ego_metrics::data::{self, parquet::ParquetColumns, LoadOptions};
use ego_metrics::storage::{self, ResultWriter, SummaryBuilder, METRICS_FILE};
use std::path::PathBuf;
use std::thread;

#[derive(Parser, Debug)]
#[clap(
    name = "ego-metrics",
    about = "Ego network structural metrics and community detection for social graphs"
)]
struct Cli {
    /// Path to input edge list (.csv or .parquet)
    #[clap(long)]
    input: PathBuf,

    /// File with one user ID per line (defaults to every node in the graph)
    #[clap(long)]
    users: Option<PathBuf>,

    /// Individual user IDs to process
    #[clap(long = "user")]
    user_ids: Vec<String>,

    /// Output directory for results
    #[clap(long, default_value = "ego_metrics_results")]
    output_dir: PathBuf,

    /// Ego network radius in hops
    #[clap(long, default_value = "2")]
    radius: usize,

    /// Follow out-edges only when extracting ego networks
    #[clap(long)]
    no_bidirectional: bool,

    /// Drop the center node from the extracted ego network
    #[clap(long)]
    exclude_center: bool,

    /// Metrics to compute: 1 density, 2 clustering, 3 neighbor degree,
    /// 4 betweenness, 5 spectral radius, 6 modularity
    #[clap(long, value_delimiter = ',', default_value = "1,2,3,5,6")]
    metrics: Vec<u8>,

    /// Also compute betweenness centrality
    #[clap(long)]
    betweenness: bool,

    /// Minimum modularity gain between Louvain levels
    #[clap(long, default_value = "0.001")]
    threshold: f64,

    /// Maximum local-moving passes per Louvain level
    #[clap(long, default_value = "100")]
    max_iterations: usize,

    /// Maximum Louvain coarsening levels
    #[clap(long, default_value = "10")]
    max_levels: usize,

    /// Passes with the same move count treated as oscillation
    #[clap(long, default_value = "3")]
    oscillation_window: usize,

    /// Skip ego networks with fewer nodes than this
    #[clap(long, default_value = "2")]
    min_ego_nodes: usize,

    /// Collapse duplicate edges on load
    #[clap(long)]
    dedup: bool,

    /// Treat the edge list as undirected
    #[clap(long)]
    undirected: bool,

    /// Source column of a Parquet edge list
    #[clap(long, default_value = "source")]
    source_column: String,

    /// Target column of a Parquet edge list
    #[clap(long, default_value = "target")]
    target_column: String,

    /// Weight column of a Parquet edge list, used when present
    #[clap(long, default_value = "weight")]
    weight_column: String,

    /// Keep only Parquet rows whose link type column equals this value
    #[clap(long)]
    link_type: Option<String>,

    /// Column holding the link type compared against --link-type
    #[clap(long, default_value = "LinkType")]
    link_type_column: String,

    /// Write ego network summaries next to the metrics
    #[clap(long)]
    emit_ego_info: bool,

    /// Skip users already present in the output and append to it
    #[clap(long)]
    resume: bool,

    /// Users per batch
    #[clap(long, default_value = "1000")]
    batch_size: usize,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut metrics = MetricSelection::from_numbers(&self.metrics)?;
        metrics.betweenness |= self.betweenness;

        let ego = EgoConfig {
            radius: self.radius,
            bidirectional: !self.no_bidirectional,
            include_center: !self.exclude_center,
            ..EgoConfig::default()
        };
        let louvain = LouvainConfig {
            threshold: self.threshold,
            max_iterations: self.max_iterations,
            max_levels: self.max_levels,
            oscillation_window: self.oscillation_window,
        };

        let mut config = Config::new(ego, louvain, metrics, self.min_ego_nodes);
        config.emit_ego_info = self.emit_ego_info;
        config.validate()?;
        Ok(config)
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            directed: !self.undirected,
            dedup: self.dedup,
        }
    }

    fn parquet_columns(&self) -> ParquetColumns {
        ParquetColumns {
            source: self.source_column.clone(),
            target: self.target_column.clone(),
            weight: Some(self.weight_column.clone()),
            link_filter: self
                .link_type
                .as_ref()
                .map(|value| (self.link_type_column.clone(), value.clone())),
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let config = args.config()?;

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting ego network analysis");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output_dir.display());

    std::fs::create_dir_all(&args.output_dir)?;

    // 1. Load graph
    let graph = load_graph(&args)?;
    log::info!(
        "Loaded graph with {} nodes and {} edges (~{} MB)",
        graph.node_count,
        graph.edge_count(),
        graph.memory_usage() / (1024 * 1024)
    );

    // 2. Resolve users
    let users = resolve_users(&args, &graph)?;
    let ctx = if args.resume {
        let completed = data::load_completed_users(args.output_dir.join(METRICS_FILE))?;
        BatchContext::with_completed(completed)
    } else {
        BatchContext::new()
    };
    log::info!(
        "Processing {} users ({} already completed)",
        users.len(),
        ctx.completed_count()
    );

    // 3. Compute metrics, streaming results to the writer thread
    let (tx, rx) = channel::bounded::<Vec<UserResult>>(4);
    let writer = ResultWriter::create(&args.output_dir, config.emit_ego_info, args.resume)?;
    let writer_handle = thread::spawn(move || write_results(writer, rx));

    for (batch, chunk) in partition_users(&users, args.batch_size).enumerate() {
        log::debug!("Starting batch {} with {} users", batch, chunk.len());
        let results = run_batch(&graph, chunk, &config, &ctx);
        if tx.send(results).is_err() {
            log::warn!("Writer stopped early; abandoning remaining batches");
            break;
        }
    }
    drop(tx);

    let summary = writer_handle
        .join()
        .map_err(|_| anyhow::anyhow!("Writer thread panicked"))??;

    // 4. Save summary
    let summary = summary.finish(&ctx, users.len());
    for id in ctx.missing().iter().take(10) {
        log::warn!("User {} not found in graph", id);
    }
    log::info!(
        "Computed {} users, {} missing, {} too small, {} already completed",
        summary.computed_users,
        summary.missing_users,
        summary.skipped_small,
        summary.skipped_completed
    );
    storage::save_summary(&summary, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}

fn load_graph(args: &Cli) -> Result<ego_metrics::CompressedGraph> {
    let is_parquet = args.input.extension().and_then(|e| e.to_str()) == Some("parquet");
    if is_parquet {
        data::parquet::load_edges(&args.input, &args.parquet_columns(), args.load_options())
    } else {
        data::load_graph(&args.input, args.load_options())
    }
}

fn resolve_users(args: &Cli, graph: &ego_metrics::CompressedGraph) -> Result<Vec<String>> {
    let listed = match &args.users {
        Some(path) => data::load_user_list(path)?,
        None => Vec::new(),
    };
    let mut users = data::merge_user_ids(listed, &args.user_ids);

    if users.is_empty() && args.users.is_none() {
        log::info!("No users given; processing every node in the graph");
        users = (0..graph.node_count as u32)
            .filter_map(|n| graph.node_id(n).map(str::to_string))
            .collect();
    }
    Ok(users)
}

fn write_results(
    mut writer: ResultWriter,
    rx: channel::Receiver<Vec<UserResult>>,
) -> Result<SummaryBuilder> {
    let mut summary = SummaryBuilder::default();
    for batch in rx {
        for result in &batch {
            writer.write(result)?;
            summary.observe(&result.record);
        }
        writer.flush()?;
        log::debug!("Wrote {} records so far", writer.written());
    }
    Ok(summary)
}
