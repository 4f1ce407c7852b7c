//! Command-line front end for the conversational data explorer
//!
//! Presentation only: loads a CSV, runs each question through the
//! pipeline against a local Ollama server, and prints the result table,
//! chart spec, and insight. Set `DQ_SAVE_DIR` to persist answered
//! questions as JSON records; passing `--replay` in place of a question
//! re-asks the most recent saved question from that directory.
//!
//! Usage: dq <dataset.csv> <question|--replay> [<question|--replay> ...]

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use dq_agents::OllamaAgent;
use dq_core::events::events::EntryPersisted;
use dq_chart::ChartKindHint;
use dq_data::render::render_result;
use dq_data::CsvSource;
use dq_pipeline::{JsonFileStore, LedgerEntry, Orchestrator, QueryStore, QuestionOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((csv_path, questions)) = args.split_first() else {
        bail!("usage: dq <dataset.csv> <question|--replay> [<question|--replay> ...]");
    };
    if questions.is_empty() {
        bail!("usage: dq <dataset.csv> <question|--replay> [<question|--replay> ...]");
    }
    let mut questions = questions.to_vec();

    let model = std::env::var("DQ_MODEL").unwrap_or_else(|_| "mistral".to_string());
    let store = std::env::var("DQ_SAVE_DIR").ok().map(JsonFileStore::new);

    // `--replay` stands in for the most recent saved question; the run it
    // seeds goes through the full pipeline like any fresh question
    if questions.iter().any(|q| q == "--replay") {
        let Some(store) = &store else {
            bail!("--replay requires DQ_SAVE_DIR to point at saved queries");
        };
        let saved = store.load_all()?;
        let Some(latest) = saved.first() else {
            bail!("no saved queries to replay");
        };
        info!(question = %latest.question, "replaying saved question");
        for slot in questions.iter_mut() {
            if slot == "--replay" {
                *slot = latest.question.clone();
            }
        }
    }

    let source = CsvSource::new(csv_path);
    let source_name = source.source_name().to_string();
    let dataset = source
        .load()
        .with_context(|| format!("failed to load {}", csv_path))?;

    let orchestrator = Orchestrator::new(
        Arc::new(OllamaAgent::with_model("query", model.as_str())),
        Arc::new(OllamaAgent::with_model("insight", model.as_str())),
    )
    .with_chart_advisor(Arc::new(OllamaAgent::with_model("chart", model.as_str())));

    let mut session = orchestrator.load_session(dataset, &source_name)?;
    info!(
        source = %source_name,
        rows = session.dataset().num_rows(),
        columns = session.dataset().num_columns(),
        "dataset ready"
    );

    for question in &questions {
        println!("\nQ: {}", question);

        match orchestrator
            .ask(&mut session, question, ChartKindHint::Auto)
            .await
        {
            Ok(QuestionOutcome::Answered(answer)) => {
                println!("SQL: {}", answer.query.sql);
                println!("{}", render_result(&answer.result)?);
                match &answer.chart {
                    Some(chart) => println!(
                        "chart: {:?} x={:?} y={:?}",
                        chart.kind, chart.x, chart.y
                    ),
                    None => println!("chart: none"),
                }
                if let Some(advice) = &answer.chart_advice {
                    println!("chart suggestion: {}", advice);
                }
                println!("insight: {}", answer.insight);

                if let Some(store) = &store {
                    let entry = LedgerEntry::new(
                        question.clone(),
                        answer.query.sql.clone(),
                        answer.insight.clone(),
                    );
                    match store.persist(&entry) {
                        Ok(record_id) => {
                            info!(%record_id, "saved");
                            orchestrator.events().publish(EntryPersisted { record_id });
                        }
                        Err(error) => warn!(%error, "save failed"),
                    }
                }
            }
            Ok(QuestionOutcome::ExecutionFailed { query, message }) => {
                println!("SQL: {}", query.sql);
                println!("execution failed: {}", message);
            }
            Ok(QuestionOutcome::EmptyResult { query }) => {
                println!("SQL: {}", query.sql);
                println!("query ran successfully but returned no rows");
            }
            Err(error) => {
                if error.is_dataset_fatal() {
                    return Err(error.into());
                }
                println!("error: {}", error);
            }
        }
    }

    if session.ledger().len() > 1 {
        println!("\nPrevious questions (newest first):");
        for entry in session.ledger().recent() {
            println!("- {}", entry.question);
        }
    }

    Ok(())
}
