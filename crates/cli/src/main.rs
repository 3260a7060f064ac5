//! Elocute CLI: pronunciation assessment, progress statistics and
//! adaptive practice material.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use elocute_core::config::AssessConfig;
use elocute_core::history::stats::{analyze_history, summarize};
use elocute_core::history::HistoryStore;
use elocute_core::language::g2p::{IpaAdapter, LexiconConverter};
use elocute_core::practice::{ContentSelector, ErrorProfile, SentenceCorpus};
use elocute_core::Assessor;

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "elocute",
    about = "Pronunciation assessment against speech-to-text transcripts",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assess a spoken attempt against its reference text
    Assess(AssessArgs),
    /// Progress report over recent assessments
    Stats(StatsArgs),
    /// Summary of the whole assessment history
    Summary(SummaryArgs),
    /// Pick the next practice sentence
    NextSentence(PracticeArgs),
    /// Pick the next practice word
    NextWord(PracticeArgs),
}

// ─── Shared arguments (embedded in each subcommand) ──────────────

#[derive(Parser, Debug)]
struct SharedArgs {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// History log (overrides the config file)
    #[arg(long)]
    history: Option<PathBuf>,

    /// CMU-format pronouncing dictionary (overrides the config file)
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl SharedArgs {
    /// Config file (or defaults) with command-line overrides applied.
    fn load_config(&self) -> Result<AssessConfig> {
        let mut config = match &self.config {
            Some(path) => AssessConfig::load(path)?,
            None => AssessConfig::default(),
        };
        if let Some(history) = &self.history {
            config.history_path = Some(history.clone());
        }
        if let Some(lexicon) = &self.lexicon {
            config.lexicon_path = Some(lexicon.clone());
        }
        Ok(config)
    }
}

// ─── Assess ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct AssessArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Text the learner was asked to say
    #[arg(long)]
    reference: String,

    /// What the recognizer heard
    #[arg(long, conflicts_with = "audio")]
    transcript: Option<String>,

    /// Mono 16-bit WAV recording to transcribe instead
    #[arg(long, requires = "model")]
    audio: Option<PathBuf>,

    /// Local Whisper GGML model for --audio
    #[arg(long)]
    model: Option<PathBuf>,

    /// Spoken language for --audio
    #[arg(long, default_value = "en")]
    language: String,

    /// Do not record the result in the history log
    #[arg(long, default_value_t = false)]
    no_save: bool,

    /// Print errors as JSON instead of the report
    #[arg(long, default_value_t = false)]
    json: bool,
}

// ─── Stats / Summary ─────────────────────────────────────────────

#[derive(Parser, Debug)]
struct StatsArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Number of recent assessments to analyze
    #[arg(long)]
    window: Option<usize>,

    /// Keep records older than the window
    #[arg(long, default_value_t = false)]
    no_truncate: bool,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

// ─── Practice ────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct PracticeArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Tab-separated sentence corpus (sentence in the third column)
    #[arg(long)]
    corpus: PathBuf,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Init logging
    let verbose = match &cli.command {
        Command::Assess(a) => a.shared.verbose,
        Command::Stats(a) => a.shared.verbose,
        Command::Summary(a) => a.shared.verbose,
        Command::NextSentence(a) | Command::NextWord(a) => a.shared.verbose,
    };
    let log_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Assess(args) => run_assess(args),
        Command::Stats(args) => run_stats(args),
        Command::Summary(args) => run_summary(args),
        Command::NextSentence(args) => run_next(args, false),
        Command::NextWord(args) => run_next(args, true),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

fn ipa_adapter(config: &AssessConfig) -> Result<IpaAdapter> {
    Ok(match &config.lexicon_path {
        Some(path) => IpaAdapter::new(LexiconConverter::from_path(path)?),
        None => IpaAdapter::default(),
    })
}

#[cfg(feature = "whisper-native")]
fn transcribe_audio(audio: &std::path::Path, model: &std::path::Path, language: &str) -> Result<String> {
    use elocute_core::language::transcribe::{transcribe_file, WhisperTranscriber};

    let transcriber = WhisperTranscriber::new(model, language)?;
    let text = transcribe_file(&transcriber, audio)
        .with_context(|| format!("Transcription failed for {}", audio.display()))?;
    Ok(text)
}

#[cfg(not(feature = "whisper-native"))]
fn transcribe_audio(_audio: &std::path::Path, _model: &std::path::Path, _language: &str) -> Result<String> {
    bail!("Audio input requires building with the whisper-native feature; pass --transcript instead")
}

// ─── Runners ─────────────────────────────────────────────────────

fn run_assess(args: AssessArgs) -> Result<()> {
    let config = args.shared.load_config()?;

    let transcript = match (&args.transcript, &args.audio, &args.model) {
        (Some(text), _, _) => text.clone(),
        (None, Some(audio), Some(model)) => transcribe_audio(audio, model, &args.language)?,
        _ => bail!("Either --transcript or --audio with --model is required"),
    };

    let assessor = Assessor::from_config(&config)?;
    let result = assessor.assess_pronunciation(&args.reference, &transcript, !args.no_save);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.errors).context("Failed to encode errors")?
        );
    } else {
        println!("Heard: {}", transcript);
        println!();
        println!("{}", result.rendered_report);
    }

    if let Some(e) = result.persistence_error() {
        bail!("Result was not saved: {}", e);
    }
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<()> {
    let config = args.shared.load_config()?;
    let window = args.window.unwrap_or(config.window_size);
    let truncate = config.truncate_history && !args.no_truncate;

    let store = HistoryStore::new(config.history_path());
    match analyze_history(&store, window, truncate) {
        Ok(report) if args.json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Ok(report) => println!("{}", report),
        Err(e) if e.is_insufficient_data() => {
            println!("Not enough data yet: {}", e);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<()> {
    let config = args.shared.load_config()?;
    let records = HistoryStore::new(config.history_path()).load()?;
    let stats = summarize(&records);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats);
    }
    Ok(())
}

fn run_next(args: PracticeArgs, word: bool) -> Result<()> {
    let config = args.shared.load_config()?;
    let records = HistoryStore::new(config.history_path()).load()?;
    let profile = ErrorProfile::from_history(&records, config.window_size);

    let selector = ContentSelector::new(
        SentenceCorpus::new(&args.corpus),
        ipa_adapter(&config)?,
        profile,
    );
    let mut rng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let pick = if word {
        selector.next_word(&mut rng)?
    } else {
        selector.next_sentence(&mut rng)?
    };
    println!("{}", pick);
    Ok(())
}
