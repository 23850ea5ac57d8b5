use crate::{
    backend::OpenAiCompatBackend,
    config::Config,
    extract::LocalExtractor,
    options::{Difficulty, ExecutionMode, FeatureOptions, SummaryStrategy},
    orchestrator::Orchestrator,
    pipeline::Pipeline,
    segmenter::SegmentPlan,
    util::{ensure_dir, hash_file, sha256_hex},
};
use anyhow::{Context, Result, anyhow};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "paper-explainer")]
#[command(about = "Explain a research paper segment by segment with an LLM backend")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./paper-explainer.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the cleaned text of a document.
    Extract {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the segmentation plan as JSON.
    Segment {
        #[arg(long)]
        input: PathBuf,
        /// Use the coarse (summarization) sizes instead of the aspect sizes.
        #[arg(long)]
        coarse: bool,
    },
    /// Summarize, explain and assemble a document.
    Explain {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[command(flatten)]
        features: FeatureArgs,
    },
}

#[derive(ClapArgs, Debug, Default)]
pub struct FeatureArgs {
    #[arg(long, value_enum)]
    pub difficulty: Option<DifficultyArg>,
    #[arg(long)]
    pub examples: bool,
    #[arg(long)]
    pub prereq: bool,
    #[arg(long)]
    pub math: bool,
    #[arg(long)]
    pub similar: bool,
    #[arg(long)]
    pub similar_summary: bool,
    /// Run aspects one at a time instead of concurrently.
    #[arg(long)]
    pub sequential: bool,
    /// Seconds to pause between aspect groups in sequential mode.
    #[arg(long)]
    pub throttle: Option<f64>,
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DifficultyArg {
    HighSchool,
    Undergraduate,
    Graduate,
    Expert,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MethodArg {
    MapReduce,
    Refine,
    Stuff,
}

impl FeatureArgs {
    /// Flags only ever switch features on; config supplies the baseline.
    pub fn apply(&self, base: &FeatureOptions) -> FeatureOptions {
        let mut opts = base.clone();
        if let Some(d) = self.difficulty {
            opts.difficulty = match d {
                DifficultyArg::HighSchool => Difficulty::HighSchool,
                DifficultyArg::Undergraduate => Difficulty::Undergraduate,
                DifficultyArg::Graduate => Difficulty::Graduate,
                DifficultyArg::Expert => Difficulty::Expert,
            };
        }
        opts.include_examples |= self.examples;
        opts.explain_prereq |= self.prereq;
        opts.explain_math |= self.math;
        opts.find_similar_papers |= self.similar || self.similar_summary;
        opts.include_paper_summary_of_similar |= self.similar_summary;
        if self.sequential || self.throttle.is_some() {
            opts.execution_mode = ExecutionMode::SequentialThrottled;
        }
        if let Some(t) = self.throttle {
            opts.throttle_delay_seconds = t;
        }
        if let Some(m) = self.method {
            opts.summarization_method = match m {
                MethodArg::MapReduce => SummaryStrategy::MapReduce,
                MethodArg::Refine => SummaryStrategy::Refine,
                MethodArg::Stuff => SummaryStrategy::Stuff,
            };
        }
        opts
    }
}

pub async fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;

    match &args.cmd {
        Command::Extract { input } => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            extract(&cfg, input)
        }
        Command::Segment { input, coarse } => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            segment(&cfg, input, *coarse)
        }
        Command::Explain {
            input,
            out_dir,
            features,
        } => explain(&args, &cfg, input, out_dir.as_deref(), features).await,
    }
}

/// Log the error chain, or print it to stderr when it happened before a
/// subscriber was installed.
pub fn report_failure(err: &anyhow::Error) {
    if tracing::dispatcher::has_been_set() {
        error!("{:#}", err);
    } else {
        eprintln!("error: {err:#}");
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("paper-explainer.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("paper-explainer.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn extract(cfg: &Config, input: &Path) -> Result<()> {
    let text = load_text(cfg, input)?;
    println!("{text}");
    Ok(())
}

fn segment(cfg: &Config, input: &Path, coarse: bool) -> Result<()> {
    let text = load_text(cfg, input)?;
    let (size, overlap) = if coarse {
        (cfg.segmentation.summary_chunk_size, cfg.segmentation.summary_overlap)
    } else {
        (cfg.segmentation.aspect_chunk_size, cfg.segmentation.aspect_overlap)
    };
    let plan = SegmentPlan::build(&text, size, overlap)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn load_text(cfg: &Config, input: &Path) -> Result<String> {
    crate::pipeline::load_text(cfg, &LocalExtractor::new(cfg), input)
}

async fn explain(
    args: &Args,
    cfg: &Config,
    input: &Path,
    out_override: Option<&Path>,
    features: &FeatureArgs,
) -> Result<()> {
    crate::extract::validate_input(cfg, input)?;
    let options = features.apply(&cfg.options);

    let mut effective = cfg.clone();
    effective.options = options.clone();
    let cfg_hash = sha256_hex(effective.normalized_for_hash().as_bytes());
    let input_hash =
        hash_file(input).with_context(|| format!("hashing input: {}", input.display()))?;
    let run_id = sha256_hex(format!("{}:{}", cfg_hash, input_hash).as_bytes());

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.output.out_dir));
    let run_dir = out_root.join(&run_id);
    ensure_dir(&run_dir)?;
    ensure_dir(&run_dir.join("logs"))?;

    let log_path = resolve_log_path(cfg, Some(&run_dir));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    info!("run_id={run_id} out={}", run_dir.display());

    if cfg.output.dump_effective_config {
        std::fs::write(
            run_dir.join("effective-config.toml"),
            toml::to_string(&effective).unwrap_or_default(),
        )?;
    }

    let backend = OpenAiCompatBackend::from_config(&cfg.backend)?;
    let orchestrator = Orchestrator::new(
        Arc::new(backend),
        cfg.segmentation.clone(),
        cfg.summarization.clone(),
    );
    let pipeline = Pipeline::new(cfg, LocalExtractor::new(cfg), orchestrator);

    let result = pipeline.run_job(input, &options, &run_id).await?;

    if cfg.output.write_markdown {
        std::fs::write(run_dir.join(&cfg.output.markdown_filename), &result.markdown)?;
    }
    if cfg.output.write_text {
        std::fs::write(run_dir.join(&cfg.output.text_filename), &result.text)?;
    }
    if cfg.output.write_document_json {
        std::fs::write(
            run_dir.join(&cfg.output.document_filename),
            serde_json::to_string_pretty(&result.document)?,
        )?;
    }
    if cfg.output.write_report_json {
        std::fs::write(
            run_dir.join(&cfg.output.report_filename),
            serde_json::to_string_pretty(&result.report)?,
        )?;
    }

    if cfg.output.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "run_id": run_id,
                "run_dir": run_dir,
                "segments": result.report.aspect_segments,
                "aspects": result.report.aspects,
                "unavailable": result.report.unavailable,
                "status": "ok"
            }))?
        );
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config, run_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    if let Some(run_dir) = run_dir {
        return Some(run_dir.join("logs").join("paper-explainer.log"));
    }

    Some(PathBuf::from(&cfg.output.out_dir).join("paper-explainer.log"))
}
