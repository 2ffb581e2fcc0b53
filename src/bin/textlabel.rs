//! textlabel — label texts with an LLM
//!
//! Sentiment classification, named-entity extraction and reporting over the
//! resulting entity table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use textlabel::batch::{self, BatchSummary, Pacing};
use textlabel::config::Secrets;
use textlabel::{
    BatchRow, Config, Entity, Extractor, Judgment, OpenAiClient, SentimentRecord, report, table,
};
use tracing::warn;

/// Texts used by `sentiment` when the input file is missing or empty.
const SAMPLE_SENTIMENT_TEXTS: [&str; 3] = ["太棒了！", "很失望", "還不錯"];

/// Texts used by `ner batch` without a usable input file.
const SAMPLE_NER_TEXTS: [&str; 5] = [
    "台灣半導體龍頭台積電將在台南投資1000億元",
    "張經理，我們下週三在台北市信義區會面",
    "陳小華畢業於台灣大學，現任Google工程師",
    "甲方：台灣科技公司，合約金額200萬元",
    "患者王小明，診斷高血壓，處方Amlodipine",
];

/// Scenarios shown by `ner demo`.
const DEMO_SCENARIOS: [(&str, &str); 5] = [
    (
        "News extraction",
        "台灣半導體龍頭台積電（TSMC）今日宣布，將在台南科學園區投資新台幣1000億元，興建3奈米製程晶圓廠。董事長劉德音表示，此投資將創造5000個就業機會，預計2025年投產。",
    ),
    (
        "Email triage",
        "親愛的張經理，我是ABC公司的業務代表李明，想與您討論下週三（2024年1月15日）的會議安排。我們公司位於台北市信義區，希望能在下午2點與您會面。預算約為新台幣50萬元。",
    ),
    (
        "Resume parsing",
        "姓名：陳小華，學歷：台灣大學資訊工程學系（2018-2022），工作經驗：2022年6月至今：Google台灣分公司，軟體工程師，期望薪資：月薪新台幣8萬元",
    ),
    (
        "Contract analysis",
        "甲方：台灣科技股份有限公司，乙方：創新軟體有限公司，簽約日期：2024年1月10日，合約金額：新台幣200萬元，履約期限：2024年12月31日",
    ),
    (
        "Medical record",
        "患者：王小明，男，35歲，診斷：高血壓，處方藥物：Amlodipine 5mg，每日一次，下次回診：2024年2月15日，血壓：收縮壓140mmHg，舒張壓90mmHg",
    ),
];

/// Label texts with an LLM
#[derive(Parser)]
#[command(name = "textlabel")]
#[command(version)]
#[command(about = "Sentiment and named-entity labelling through a chat model")]
struct Args {
    /// Config file (default: ~/.textlabel/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify the sentiment of each line of a text file
    Sentiment {
        /// Newline-separated input texts
        #[arg(short, long, default_value = "demo.txt")]
        input: PathBuf,
    },

    /// Named-entity recognition
    Ner {
        #[command(subcommand)]
        command: NerCommand,
    },

    /// Build the statistics report and charts from an entity table
    Report {
        /// Entity table written by `ner batch`
        #[arg(short, long, default_value = "ner_labeled_data.csv")]
        input: PathBuf,
        /// Output directory (default: from config, ner_analysis)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum NerCommand {
    /// Extract entities from a fixed set of application scenarios
    Demo,

    /// Extract entities from many texts and write the result table
    Batch {
        /// Newline-separated input texts (default: built-in samples)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Result table
        #[arg(short, long, default_value = "ner_labeled_data.csv")]
        output: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    // Reporting works offline
    if let Command::Report { input, output_dir } = &args.command {
        let output_dir = output_dir
            .clone()
            .unwrap_or_else(|| config.report.output_dir.clone());
        let written = report::generate(input, &output_dir, config.report.top_n)?;
        if written.is_empty() {
            println!("no entities found in {}, nothing to report", input.display());
        } else {
            for path in &written {
                println!("wrote {}", path.display());
            }
        }
        return Ok(());
    }

    let extractor = build_extractor(&config)?;
    let pacing = Pacing::from(&config.batch);

    match args.command {
        Command::Sentiment { input } => run_sentiment(&extractor, &input, pacing).await,
        Command::Ner {
            command: NerCommand::Demo,
        } => run_ner_demo(&extractor, Pacing::after_each(pacing.pause)).await,
        Command::Ner {
            command: NerCommand::Batch { input, output },
        } => run_ner_batch(&extractor, input.as_deref(), &output, pacing).await?,
        Command::Report { .. } => {}
    }

    Ok(())
}

fn build_extractor(config: &Config) -> textlabel::Result<Extractor> {
    let api_key = Secrets::load()?.require_api_key()?;
    let client = OpenAiClient::with_base_url(
        api_key,
        config.model.base_url.as_str(),
        config.model.timeout(),
    )?;
    Ok(Extractor::new(Arc::new(client), config.model.chat_options()).with_fallback(config.fallback))
}

/// Texts from `path`, or `samples` when the file is missing, unreadable or empty.
fn texts_or_samples(path: &Path, samples: &[&str]) -> Vec<String> {
    let texts = match table::read_texts(path) {
        Ok(texts) => texts,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read input texts");
            Vec::new()
        }
    };
    if texts.is_empty() {
        println!("no usable texts in {}, using built-in samples", path.display());
        return samples.iter().map(|s| s.to_string()).collect();
    }
    texts
}

async fn run_sentiment(extractor: &Extractor, input: &Path, pacing: Pacing) {
    let texts = texts_or_samples(input, &SAMPLE_SENTIMENT_TEXTS);
    println!("classifying sentiment of {} texts...", texts.len());

    let judgments = batch::classify_sentiments(extractor, &texts, pacing).await;

    for (i, (text, judgment)) in texts.iter().zip(&judgments).enumerate() {
        let record = SentimentRecord::from(judgment);
        println!();
        println!("text {}: {text}", i + 1);
        println!("sentiment: {}", record.sentiment);
        println!("confidence: {:.2}", record.confidence);
        if let Some(error) = &record.error {
            println!("error: {error}");
        }
    }

    println!();
    println!("=== summary ===");
    for (label, count) in batch::sentiment_counts(&judgments) {
        println!("{label}: {count}");
    }
}

async fn run_ner_demo(extractor: &Extractor, pacing: Pacing) {
    let texts: Vec<&str> = DEMO_SCENARIOS.iter().map(|(_, text)| *text).collect();

    batch::run_paced(&texts, pacing, |i, text| async move {
        let (name, _) = DEMO_SCENARIOS[i];
        let judgment = extractor.extract_entities(text).await;

        println!();
        println!("scenario {}: {name}", i + 1);
        println!("{}", "=".repeat(50));
        println!("text: {text}");
        println!("entities:");
        print_entities(&judgment);
    })
    .await;
}

fn print_entities(judgment: &Judgment<Vec<Entity>>) {
    if let Some(failure) = judgment.failure() {
        println!("  extraction failed: {failure}");
        return;
    }

    let entities = judgment.value();
    if entities.is_empty() {
        println!("  no entities found");
        return;
    }

    let mut groups: Vec<(&str, Vec<&Entity>)> = Vec::new();
    for entity in entities {
        match groups.iter_mut().find(|(label, _)| *label == entity.label) {
            Some((_, group)) => group.push(entity),
            None => groups.push((entity.label.as_str(), vec![entity])),
        }
    }
    for (label, group) in groups {
        println!("  {label}:");
        for entity in group {
            println!("    - {} (confidence: {:.2})", entity.text, entity.confidence);
        }
    }
}

fn print_progress(row: &BatchRow, total: usize) {
    println!();
    println!("text {}/{}: {}", row.text_id + 1, total, row.text);
    if let Some(error) = &row.error {
        println!("  extraction failed: {error}");
        return;
    }
    match row.parse_entities() {
        Ok(entities) if !entities.is_empty() => {
            println!("  found {} entities:", entities.len());
            for entity in &entities {
                println!("    - {} ({})", entity.text, entity.label);
            }
        }
        _ => println!("  no entities found"),
    }
}

async fn run_ner_batch(
    extractor: &Extractor,
    input: Option<&Path>,
    output: &Path,
    pacing: Pacing,
) -> textlabel::Result<()> {
    let texts = match input {
        Some(path) => texts_or_samples(path, &SAMPLE_NER_TEXTS),
        None => SAMPLE_NER_TEXTS.iter().map(|s| s.to_string()).collect(),
    };
    println!("extracting entities from {} texts...", texts.len());

    let rows = batch::extract_entity_rows_with(extractor, &texts, pacing, print_progress).await;
    table::write_rows(output, &rows)?;

    let summary = BatchSummary::from_rows(&rows);
    println!();
    println!("=== results ===");
    println!("total texts: {}", summary.total_texts);
    println!("processed: {}", summary.processed_texts);
    println!("total entities: {}", summary.total_entities);
    println!("mean entities per text: {:.2}", summary.mean_entities_per_text());

    if !summary.label_counts.is_empty() {
        println!();
        println!("entity types:");
        for (label, count) in &summary.label_counts {
            println!("  {label}: {count}");
        }
    }
    if let Some(confidence) = &summary.confidence {
        println!();
        println!("confidence:");
        println!("  mean: {:.2}", confidence.mean);
        println!("  max: {:.2}", confidence.max);
        println!("  min: {:.2}", confidence.min);
    }

    println!();
    println!("results saved to {}", output.display());
    Ok(())
}
