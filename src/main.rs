use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chatintent::corpus::{load_corpus, LabelMode};
use chatintent::{ClassifierError, EngineConfig, ResponseTable, WeightSnapshot};

#[derive(Parser)]
#[command(
    name = "chatintent",
    about = "Bag-of-words intent classifier for short chat messages."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a network on a labelled corpus and write the weight snapshot
    Train {
        /// Chat-format corpus (`#text (label)`) or a JSON category map
        #[arg(long)]
        corpus: PathBuf,

        /// Where to write the snapshot
        #[arg(long, default_value = "model.json")]
        out: PathBuf,

        /// TOML engine configuration
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        hidden_size: Option<usize>,

        #[arg(long)]
        learning_rate: Option<f64>,

        /// Last epoch index (the loop runs epochs + 1 times)
        #[arg(long)]
        epochs: Option<usize>,

        /// Enable the hidden-layer training mask
        #[arg(long)]
        dropout: bool,

        /// Seed for weight initialization (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// File comma-joined labels such as `food,order,pizza` under each
        /// individual label, matching the legacy chatbot's corpus loader;
        /// by default the whole string is one category
        #[arg(long)]
        split_labels: bool,
    },

    /// Classify a sentence with a trained snapshot
    Classify {
        /// Snapshot written by `train`
        #[arg(long)]
        model: PathBuf,

        /// Sentence to classify
        #[arg(long)]
        input: String,

        /// TOML engine configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Minimum activation for a category to be reported
        #[arg(long)]
        threshold: Option<f64>,

        /// Intents file with canned replies per category
        #[arg(long)]
        responses: Option<PathBuf>,

        /// Output format: json or summary
        #[arg(long, default_value = "summary")]
        format: String,
    },
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::from_toml_file(p)
            .wrap_err_with(|| format!("Failed to load config {}", p.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_train(
    corpus_path: PathBuf,
    out: PathBuf,
    config: Option<PathBuf>,
    hidden_size: Option<usize>,
    learning_rate: Option<f64>,
    epochs: Option<usize>,
    dropout: bool,
    seed: Option<u64>,
    split_labels: bool,
) -> Result<()> {
    let mut cfg = load_config(config.as_deref())?;
    if let Some(h) = hidden_size {
        cfg.train.hidden_size = h;
    }
    if let Some(lr) = learning_rate {
        cfg.train.learning_rate = lr;
    }
    if let Some(e) = epochs {
        cfg.train.max_epochs = e;
    }
    cfg.train.dropout |= dropout;
    cfg.validate()?;

    let mode = if split_labels {
        LabelMode::Split
    } else {
        LabelMode::Compound
    };
    let corpus = load_corpus(&corpus_path, mode)
        .wrap_err_with(|| format!("Failed to load corpus {}", corpus_path.display()))?;

    let mut rng = rng_from_seed(seed);
    let start = Instant::now();
    let (snapshot, report) = chatintent::train_from_corpus(&corpus, &cfg.train, &mut rng)?;
    let elapsed = start.elapsed();

    snapshot
        .save(&out)
        .wrap_err_with(|| format!("Failed to write snapshot {}", out.display()))?;

    println!("Training Results");
    println!("================");
    println!("Categories:     {}", snapshot.categories().len());
    println!("Vocabulary:     {} words", snapshot.vocabulary().len());
    println!("Hidden units:   {}", snapshot.hidden_size());
    println!(
        "Epochs:         {}{}",
        report.epochs_run,
        if report.stopped_early {
            " (stopped early)"
        } else {
            ""
        }
    );
    if let Some(err) = report.best_mean_error {
        println!("Best error:     {:.6}", err);
    }
    println!(
        "Direction flips: W0 {}, W1 {}",
        report.direction_changes_w0, report.direction_changes_w1
    );
    println!("Elapsed:        {:.2?}", elapsed);
    println!();
    println!("Snapshot:       {}", out.display());
    println!("Fingerprint:    {}", snapshot.fingerprint());

    Ok(())
}

fn cmd_classify(
    model: PathBuf,
    input: String,
    config: Option<PathBuf>,
    threshold: Option<f64>,
    responses: Option<PathBuf>,
    format: String,
) -> Result<()> {
    let mut cfg = load_config(config.as_deref())?;
    if let Some(t) = threshold {
        cfg.classify.confidence_threshold = t;
    }
    cfg.validate()?;

    let snapshot = WeightSnapshot::load(&model)
        .wrap_err_with(|| format!("Failed to load snapshot {}", model.display()))?;
    let table = responses
        .as_deref()
        .map(|p| {
            ResponseTable::load(p)
                .wrap_err_with(|| format!("Failed to load responses {}", p.display()))
        })
        .transpose()?;

    let predictions =
        chatintent::classify(&input, &snapshot, cfg.classify.confidence_threshold)?;
    let reply = table
        .as_ref()
        .and_then(|t| t.respond(&predictions, &mut StdRng::from_entropy()));

    match format.as_str() {
        "json" => {
            let result = serde_json::json!({
                "input": input,
                "predictions": predictions,
                "reply": reply,
                "threshold": cfg.classify.confidence_threshold,
                "fingerprint": snapshot.fingerprint(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            println!("Input: {}", input);
            println!();
            if predictions.is_empty() {
                println!(
                    "No category above {:.2}",
                    cfg.classify.confidence_threshold
                );
            }
            for p in &predictions {
                println!("  {:<24} {:.1}%", p.category, p.confidence * 100.0);
            }
            if let Some(r) = &reply {
                println!();
                println!("Reply ({}): {}", r.category, r.text);
            }
            println!();
            println!("Fingerprint: {}", snapshot.fingerprint());
        }
    }

    Ok(())
}

/// Exit status for a failed command: the classifier error kind when one is
/// in the chain, 1 otherwise.
fn exit_code(report: &eyre::Report) -> i32 {
    report
        .chain()
        .find_map(|e| e.downcast_ref::<ClassifierError>())
        .map(ClassifierError::exit_code)
        .unwrap_or(1)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Train {
            corpus,
            out,
            config,
            hidden_size,
            learning_rate,
            epochs,
            dropout,
            seed,
            split_labels,
        } => cmd_train(
            corpus,
            out,
            config,
            hidden_size,
            learning_rate,
            epochs,
            dropout,
            seed,
            split_labels,
        ),
        Commands::Classify {
            model,
            input,
            config,
            threshold,
            responses,
            format,
        } => cmd_classify(model, input, config, threshold, responses, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:?}");
        std::process::exit(exit_code(&e));
    }
}
