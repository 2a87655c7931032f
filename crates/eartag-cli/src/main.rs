//! Command-line driver that reads the printed number off livestock ear-tag photos.

use clap::{Args, Parser, Subcommand};
use eartag::metrics::{mean_iou, DigitScore};
use eartag::{
    BatchRequest, Detection, RecognizerConfig, TagBatchRecognizer, TagKind, TesseractEngine,
};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "eartag")]
#[command(about = "Extract the digit string printed on livestock ear tags")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize tags in images or a folder and emit JSON records.
    Recognize(CliRecognizeArgs),

    /// List registered tag kinds.
    Kinds,

    /// Score recognition of a folder against ground-truth records.
    Evaluate(CliEvaluateArgs),
}

#[derive(Debug, Clone, Args)]
struct CliEngineArgs {
    /// Tag kind, by name or numeric id.
    #[arg(long, default_value = "cow")]
    kind: String,

    /// JSON file overriding recognizer tunables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tesseract language (overrides the config file).
    #[arg(long)]
    lang: Option<String>,

    /// Tesseract DPI hint for the rendered bitmap.
    #[arg(long)]
    dpi: Option<i32>,
}

impl CliEngineArgs {
    fn batch(&self) -> CliResult<TagBatchRecognizer> {
        let kind: TagKind = self.kind.parse()?;
        let mut config = match &self.config {
            Some(path) => RecognizerConfig::from_json_file(path)?,
            None => RecognizerConfig::default(),
        };
        if let Some(lang) = &self.lang {
            config.ocr.language = lang.clone();
        }

        let mut engine = TesseractEngine::new();
        if let Some(dpi) = self.dpi {
            engine = engine.with_dpi(dpi);
        }
        tracing::info!("Using {} recognizer ({})", kind, kind.description());
        Ok(TagBatchRecognizer::for_kind(kind, &config, Box::new(engine))?)
    }
}

#[derive(Debug, Clone, Args)]
struct CliRecognizeArgs {
    #[command(flatten)]
    engine: CliEngineArgs,

    /// Image files to recognize.
    #[arg(long, num_args = 1.., conflicts_with = "folder")]
    images: Option<Vec<PathBuf>>,

    /// Folder whose images are recognized in file-name order.
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Write the JSON array here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliEvaluateArgs {
    #[command(flatten)]
    engine: CliEngineArgs,

    /// Folder holding the tag photographs.
    #[arg(long)]
    folder: PathBuf,

    /// JSON array of reference detection records; identifiers are file names.
    #[arg(long)]
    ground_truth: PathBuf,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recognize(args) => run_recognize(&args),
        Commands::Kinds => run_kinds(),
        Commands::Evaluate(args) => run_evaluate(&args),
    }
}

// ── kinds ──────────────────────────────────────────────────────────────

fn run_kinds() -> CliResult<()> {
    println!("registered tag kinds");
    for kind in TagKind::ALL {
        println!("  {:>3}  {:<8} {}", kind.id(), kind.name(), kind.description());
    }
    Ok(())
}

// ── recognize ──────────────────────────────────────────────────────────

fn run_recognize(args: &CliRecognizeArgs) -> CliResult<()> {
    let request = BatchRequest::from_parts(args.folder.clone(), args.images.clone())?;
    let batch = args.engine.batch()?;

    let json = batch.process(&request)?;

    match &args.out {
        Some(out) => {
            std::fs::write(out, &json)?;
            tracing::info!("Results written to {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

// ── evaluate ───────────────────────────────────────────────────────────

fn load_ground_truth(path: &Path) -> CliResult<Vec<Detection>> {
    let text = std::fs::read_to_string(path).map_err(|e| -> CliError {
        format!("Failed to read ground truth {}: {}", path.display(), e).into()
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn run_evaluate(args: &CliEvaluateArgs) -> CliResult<()> {
    let truth = load_ground_truth(&args.ground_truth)?;
    let batch = args.engine.batch()?;

    let mut score = DigitScore::default();
    let mut ious = Vec::new();
    let mut failures = 0usize;

    for expected in &truth {
        let name = Path::new(&expected.identifier)
            .file_name()
            .ok_or_else(|| -> CliError {
                format!("ground-truth identifier has no file name: {}", expected.identifier).into()
            })?;
        let path = args.folder.join(name);

        match batch.recognize_image(&path) {
            Ok(det) => {
                score.record(&det.digits, &expected.digits);
                if let Some(v) = mean_iou(&det.bounding_rects, &expected.bounding_rects) {
                    ious.push(v);
                }
                tracing::debug!(
                    "{}: read {:?}, expected {:?}",
                    path.display(),
                    det.digits,
                    expected.digits
                );
            }
            Err(e) if e.detection_failure().is_some() => {
                tracing::warn!("{}: {}", path.display(), e);
                failures += 1;
                score.record("", &expected.digits);
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("eartag evaluation over {} tags", score.total());
    println!("  true positives:   {}", score.true_positives);
    println!("  false positives:  {}", score.false_positives);
    println!("  false negatives:  {}", score.false_negatives);
    println!("  detection faults: {}", failures);
    match score.precision() {
        Some(p) => println!("  precision:        {:.3}", p),
        None => println!("  precision:        n/a"),
    }
    match score.read_rate() {
        Some(r) => println!("  read rate:        {:.3}", r),
        None => println!("  read rate:        n/a"),
    }
    if ious.is_empty() {
        println!("  mean box IoU:     n/a");
    } else {
        let mean = ious.iter().sum::<f64>() / ious.len() as f64;
        println!("  mean box IoU:     {:.3} over {} tags", mean, ious.len());
    }

    Ok(())
}
