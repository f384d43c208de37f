use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use content_signals::{
    builtin, DetectionRule, Detector, EngineConfig, IndexedPage, LinkRanker, RankOptions,
    RelevanceScorer, RuleSet, TopicExtractor,
};

#[derive(Parser)]
#[command(
    name = "content-signals",
    about = "Detect AI-tell patterns in prose and suggest internal links",
    version
)]
struct Cli {
    /// Engine configuration (JSON); missing fields fall back to defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan prose for AI-tell patterns
    Detect(DetectArgs),
    /// Extract frequency topics from prose
    Topics(TopicsArgs),
    /// Rank indexed pages as link targets for an article
    Suggest(SuggestArgs),
}

#[derive(Args)]
struct DetectArgs {
    /// File paths to analyze (reads stdin if none provided)
    files: Vec<PathBuf>,

    /// Detection rules (JSON array); the built-in set is used when omitted
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Override the density at which the score saturates
    #[arg(long)]
    saturation: Option<f64>,

    /// Fail instead of skipping rules that do not compile
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args)]
struct TopicsArgs {
    /// File to analyze (reads stdin if omitted)
    file: Option<PathBuf>,

    #[arg(long)]
    max_topics: Option<usize>,
}

#[derive(Args)]
struct SuggestArgs {
    /// Article file (reads stdin if omitted)
    file: Option<PathBuf>,

    /// Indexed pages (JSON array)
    #[arg(long)]
    pages: PathBuf,

    /// Article title
    #[arg(long, default_value = "")]
    title: String,

    #[arg(long, default_value_t = 20)]
    min_score: u32,

    #[arg(long, default_value_t = 10)]
    max_results: usize,

    /// URL to leave out of the suggestions (repeatable)
    #[arg(long = "exclude-url")]
    exclude_urls: Vec<String>,
}

#[derive(Serialize)]
struct FileReport<T: Serialize> {
    source: String,
    #[serde(flatten)]
    report: T,
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Detect(args) => run_detect(args, config),
        Commands::Topics(args) => run_topics(args, config),
        Commands::Suggest(args) => run_suggest(args, config),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let config: EngineConfig = read_json(path)?;
    config
        .validate()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    debug!(path = %path.display(), "loaded engine config");
    Ok(config)
}

fn run_detect(args: DetectArgs, mut config: EngineConfig) -> Result<()> {
    if let Some(saturation) = args.saturation {
        config.detection.saturation_density = saturation;
    }
    let detector = Detector::new(config.detection).context("invalid detection config")?;

    let rules: Vec<DetectionRule> = match &args.rules {
        Some(path) => read_json(path)?,
        None => builtin::default_rules(),
    };
    let rule_set = if args.strict {
        RuleSet::compile_strict(&rules).context("rule set failed to compile")?
    } else {
        RuleSet::compile(&rules)
    };
    for skipped in rule_set.skipped() {
        warn!(rule_id = %skipped.rule_id, reason = %skipped.reason, "skipping rule");
    }
    info!(
        configured = rules.len(),
        compiled = rule_set.len(),
        "rules ready"
    );

    for (source, text) in read_inputs(&args.files)? {
        let result = detector.detect_with(&text, &rule_set);
        info!(
            source = %source,
            matches = result.total_matches,
            ai_score = result.ai_score,
            "scan complete"
        );
        print_json(&FileReport {
            source,
            report: result,
        })?;
    }
    Ok(())
}

fn run_topics(args: TopicsArgs, config: EngineConfig) -> Result<()> {
    let extractor = TopicExtractor::new(config.topics).context("invalid topic config")?;
    let text = read_input(args.file.as_deref())?;
    let max = args
        .max_topics
        .unwrap_or(extractor.config().default_max_topics);
    let topics = extractor.extract(&text, max);
    info!(topics = topics.len(), "topics extracted");
    print_json(&topics)
}

fn run_suggest(args: SuggestArgs, config: EngineConfig) -> Result<()> {
    let scorer = RelevanceScorer::new(config.relevance).context("invalid relevance config")?;
    let extractor = TopicExtractor::new(config.topics).context("invalid topic config")?;
    let ranker = LinkRanker::new(scorer, extractor);

    let pages: Vec<IndexedPage> = read_json(&args.pages)?;
    let content = read_input(args.file.as_deref())?;
    let opts = RankOptions {
        min_score: args.min_score,
        max_results: args.max_results,
        exclude_urls: args.exclude_urls,
    };

    let planned = ranker
        .plan(&content, &args.title, &pages, &opts)
        .context("failed to rank pages")?;
    info!(
        candidates = pages.len(),
        suggestions = planned.len(),
        "link suggestions ready"
    );
    print_json(&planned)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse json: {}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<(String, String)>> {
    if files.is_empty() {
        return Ok(vec![("<stdin>".to_string(), read_input(None)?)]);
    }
    files
        .iter()
        .map(|path| -> Result<(String, String)> {
            Ok((path.display().to_string(), read_input(Some(path))?))
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
