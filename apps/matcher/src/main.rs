use std::collections::HashMap;
use std::fs;

use anyhow::{bail, Context, Result};
use tracing::info;

use matcher::intake::{parse_candidate_record, parse_job_record};
use matcher::models::CandidateInput;
use matcher::telemetry::init_tracing;
use matcher::matching::Ranking;
use matcher::{Config, MatchService};

/// Usage: `matcher <job.json> <candidates.json>`
///
/// The candidates file holds a JSON array of candidate records. Prints the
/// ranked, explained matches and any scoring failures as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.rust_log);

    info!("Starting matcher v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [job_path, candidates_path] = args.as_slice() else {
        bail!("usage: matcher <job.json> <candidates.json>");
    };

    let job_raw =
        fs::read_to_string(job_path).with_context(|| format!("Failed to read {job_path}"))?;
    let job = parse_job_record(&job_raw).with_context(|| format!("Invalid job in {job_path}"))?;

    let candidates_raw = fs::read_to_string(candidates_path)
        .with_context(|| format!("Failed to read {candidates_path}"))?;
    let records: Vec<serde_json::Value> = serde_json::from_str(&candidates_raw)
        .with_context(|| format!("{candidates_path} must hold a JSON array"))?;

    let mut profiles = HashMap::with_capacity(records.len());
    let mut candidates = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let profile = parse_candidate_record(&record.to_string())
            .with_context(|| format!("Invalid candidate at index {i}"))?;
        profiles.insert(profile.candidate_id.clone(), profile.clone());
        candidates.push(CandidateInput::from(profile));
    }

    let service = MatchService::from_config(&config)?;
    let ranking = service.rank_candidates(&job, candidates, None, None).await?;

    let pairs = ranking
        .matches
        .iter()
        .filter_map(|m| {
            profiles
                .get(&m.candidate_id)
                .map(|p| (p.clone(), m.result.clone()))
        })
        .collect();
    let explained = service.explain_all(&job, pairs).await;

    let output = Ranking {
        matches: ranking
            .matches
            .into_iter()
            .zip(explained)
            .map(|(mut m, result)| {
                m.result = result;
                m
            })
            .collect(),
        errors: ranking.errors,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
