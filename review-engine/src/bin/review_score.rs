//! Score a single transaction from the command line
//!
//! Usage: `review-score <transaction.json> [settings.toml]`

use anyhow::{bail, Context, Result};
use review_engine::{
    score_transaction, top, RuleSet, ScoringConfig, ThreadRandom, TransactionForm,
    TransactionInput, DEFAULT_TOP_K,
};
use std::fs;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(transaction_path) = args.next() else {
        bail!("usage: review-score <transaction.json> [settings.toml]");
    };

    let config = match args.next() {
        Some(path) => {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path))?;
            ScoringConfig::from_toml_str(&source)?
        }
        None => ScoringConfig::default(),
    };
    tracing::info!(
        fraud_threshold = config.fraud_threshold.value(),
        alert_threshold = config.alert_threshold.value(),
        auto_block = config.auto_block,
        max_transaction_amount = %config.max_transaction_amount,
        "Settings loaded"
    );

    let raw = fs::read_to_string(&transaction_path)
        .with_context(|| format!("Failed to read transaction from {}", transaction_path))?;
    let form: TransactionForm =
        serde_json::from_str(&raw).context("Failed to parse transaction JSON")?;
    let input = TransactionInput::try_from(form)?;

    let rules = RuleSet::standard();
    let assessment = score_transaction(&input, &rules, &config, &mut ThreadRandom)?;
    let disposition = config.triage(&input, &assessment);

    tracing::info!(
        probability = assessment.probability().value(),
        flagged = assessment.is_flagged(),
        ?disposition,
        "Transaction scored"
    );

    let report = serde_json::json!({
        "probability": assessment.probability(),
        "is_flagged": assessment.is_flagged(),
        "band": assessment.probability().band(),
        "disposition": disposition,
        "top_factors": top(assessment.factors(), DEFAULT_TOP_K),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
