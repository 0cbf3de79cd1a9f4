use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use flatfoot::{
    chart::{self, Chart},
    diff::series_label,
    frame_deltas, results, sequence_deltas,
    utils::expand_path,
    Configuration, Dimension, PerformanceReport, SequenceScores,
};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "flatfoot",
    about = "Compare a baseline and an experimental tracker on benchmark results",
    version
)]
struct Args {
    /// Configuration file. Without it, .flatfoot, .flatfoot.yml and
    /// .flatfoot.yaml are searched in the working directory
    #[arg(long, global = true)]
    configuration: Option<PathBuf>,

    /// List the trackers in the configuration, then exit
    #[arg(long)]
    list_trackers: bool,

    /// List the benchmarks in the configuration, then exit
    #[arg(long)]
    list_benchmarks: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Per-frame bounding box differences on one sequence
    Boxes {
        /// Directory holding one results directory per tracker, or the
        /// parent of the benchmark child directories when --experiment is set
        #[arg(long, default_value = "./results")]
        results_dir: PathBuf,

        /// Benchmark child directory of --results-dir, such as OTBtb100
        #[arg(long)]
        experiment: Option<String>,

        /// Sequence to compare
        sequence: String,

        /// Reference tracker
        baseline: String,

        /// Tracker measured against the baseline
        experimental: String,

        /// Benchmark from the configuration providing ground truth
        #[arg(long, conflicts_with = "ground_truth")]
        benchmark: Option<String>,

        /// Ground truth file for per-frame overlap differences
        #[arg(long)]
        ground_truth: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Per-sequence success score differences from a performance report
    Sequences {
        /// JSON performance report
        performance_file: PathBuf,

        /// Reference tracker
        baseline: String,

        /// Tracker measured against the baseline
        experimental: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Write the charts as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Render the charts to this image file, or "-" for a window
    #[cfg(feature = "render")]
    #[arg(long)]
    render: Option<String>,
}

fn load_configuration(path: Option<&PathBuf>) -> Result<Option<Configuration>> {
    match path {
        Some(path) => {
            let path = expand_path(path);
            let cfg = Configuration::from_file(&path)
                .with_context(|| format!("failed to load configuration {:?}", path))?;
            Ok(Some(cfg))
        }
        None => match Configuration::discover(std::env::current_dir()?) {
            Ok(cfg) => Ok(Some(cfg)),
            Err(flatfoot::Error::ConfigNotFound { .. }) => Ok(None),
            Err(e) => Err(e).context("failed to load configuration"),
        },
    }
}

fn list(args: &Args, cfg: Option<&Configuration>) -> Result<()> {
    let cfg = cfg.context("no configuration file found to list from")?;
    if args.list_trackers {
        println!("Trackers:");
        for tracker in &cfg.trackers {
            println!(
                "  {}: module {} in {}",
                tracker.class_name,
                tracker.module().unwrap_or("?"),
                tracker.directory().display()
            );
        }
    }
    if args.list_benchmarks {
        println!("Benchmarks:");
        for benchmark in &cfg.benchmarks {
            println!("  {} ({})", benchmark.name, benchmark.path.display());
        }
    }
    Ok(())
}

fn check_trackers(cfg: Option<&Configuration>, trackers: [&str; 2]) {
    if let Some(cfg) = cfg {
        for tracker in trackers {
            if cfg.tracker(tracker).is_none() {
                warn!("Tracker {} is not listed in the configuration", tracker);
            }
        }
    }
}

fn report_tracker<'a>(report: &'a PerformanceReport, name: &str) -> Result<&'a SequenceScores> {
    report.tracker(name).with_context(|| {
        format!(
            "available trackers: {}",
            report.tracker_names().collect::<Vec<_>>().join(", ")
        )
    })
}

fn emit(charts: &[Chart], output: &OutputArgs) -> Result<()> {
    for chart in charts {
        println!("{}\n", chart);
    }

    if let Some(path) = &output.output {
        let path = expand_path(path);
        fs::write(&path, chart::to_json(charts)?)
            .with_context(|| format!("failed to write {:?}", path))?;
        info!("Charts written to {:?}", path);
    }

    render(charts, output)
}

#[cfg(feature = "render")]
fn render(charts: &[Chart], output: &OutputArgs) -> Result<()> {
    use flatfoot::visualization;

    if let Some(target) = &output.render {
        let img = visualization::render_charts(charts, 1200, 420)?;
        if target == "-" {
            visualization::show(&img, "flatfoot")?;
        } else {
            let path = expand_path(target);
            visualization::save(&img, &path)?;
            info!("Rendered charts saved to {:?}", path);
        }
    }
    Ok(())
}

#[cfg(not(feature = "render"))]
fn render(_charts: &[Chart], _output: &OutputArgs) -> Result<()> {
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = load_configuration(args.configuration.as_ref())?;

    if args.list_trackers || args.list_benchmarks {
        return list(&args, cfg.as_ref());
    }

    let Some(command) = &args.command else {
        bail!("no command given, see --help");
    };

    match command {
        Command::Boxes {
            results_dir,
            experiment,
            sequence,
            baseline,
            experimental,
            benchmark,
            ground_truth,
            output,
        } => {
            check_trackers(cfg.as_ref(), [baseline.as_str(), experimental.as_str()]);
            let results_dir =
                results::experiment_results_dir(expand_path(results_dir), experiment.as_deref());
            info!("Comparing {} against {} on {}", experimental, baseline, sequence);

            let (baseline_boxes, experimental_boxes) =
                results::load_tracking_boxes(&results_dir, sequence, baseline, experimental)?;
            let mut deltas = frame_deltas(&baseline_boxes, &experimental_boxes)?
                .with_label(&series_label(baseline, experimental));

            let ground_truth = match (benchmark, ground_truth) {
                (Some(name), _) => {
                    let benchmark = cfg
                        .as_ref()
                        .and_then(|cfg| cfg.benchmark(name))
                        .with_context(|| {
                            format!("benchmark {} is not in the configuration", name)
                        })?;
                    Some(results::ground_truth_path(&benchmark.path, sequence))
                }
                (None, Some(path)) => Some(expand_path(path)),
                (None, None) => None,
            };
            if let Some(path) = ground_truth {
                let truth = results::load_ground_truth(&path)?;
                deltas = deltas.with_overlap(&truth, &baseline_boxes, &experimental_boxes)?;
            }

            let mut charts = Vec::new();
            for dimension in [Dimension::Width, Dimension::Height] {
                let series = deltas.dimension(dimension);
                charts.push(Chart::frame_dimension(sequence, dimension, series)?);
            }
            if let Some(overlap) = deltas.overlap() {
                let summary = overlap.summary()?;
                info!(
                    "Overlap: {} frames better, {} worse, mean {:+.4}",
                    summary.positive, summary.negative, summary.mean
                );
                charts.push(Chart::frame_overlap(sequence, overlap)?);
            }
            emit(&charts, output)
        }
        Command::Sequences {
            performance_file,
            baseline,
            experimental,
            output,
        } => {
            check_trackers(cfg.as_ref(), [baseline.as_str(), experimental.as_str()]);
            let report = results::load_performance(expand_path(performance_file))?;
            info!(
                "Loaded {:?} with trackers {}",
                report.path(),
                report.tracker_names().collect::<Vec<_>>().join(", ")
            );
            let deltas = sequence_deltas(
                report_tracker(&report, baseline)?,
                report_tracker(&report, experimental)?,
            )?
            .with_label(series_label(baseline, experimental));

            let summary = deltas.summary()?;
            info!(
                "{} of {} sequences improved, {} regressed, mean {:+.4} (min {:+.4}, max {:+.4})",
                summary.positive,
                summary.count,
                summary.negative,
                summary.mean,
                summary.min,
                summary.max
            );
            emit(&[Chart::sequence_scores(&deltas)?], output)
        }
    }
}
