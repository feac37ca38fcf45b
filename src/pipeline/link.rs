// src/pipeline/link.rs

//! Citation linking pipeline.

use crate::error::{AppError, Result};
use crate::models::{CitationRecord, LinkStatus, Periodical};
use crate::services::{LinkReport, Linker};
use crate::storage::PeriodicalStorage;
use crate::utils::log as present;

/// Run both linking rounds over `records` and log the outcome.
pub fn link_citations(periodical: &Periodical, records: Vec<CitationRecord>) -> (LinkReport, Vec<CitationRecord>) {
    let mut linker = Linker::new(periodical, records);
    let report = linker.run();

    present::summary(
        &format!("Linking {}", periodical.name),
        &[
            ("Citations", report.total.to_string()),
            ("First round", present::percent(report.first_round_rate)),
            ("Repaired", report.repaired.to_string()),
            ("Final", present::percent(report.final_rate)),
        ],
    );
    for (status, count) in &report.by_status {
        if *status != LinkStatus::Success {
            present::sub_item(&format!("{status}: {count}"));
        }
    }

    (report, linker.into_records())
}

/// Link the citations in `citations_key` against the periodical in
/// `periodical_key` and write the results to `results_key`.
pub async fn run_linking(
    storage: &dyn PeriodicalStorage,
    periodical_key: &str,
    citations_key: &str,
    results_key: &str,
) -> Result<LinkReport> {
    let periodical = storage
        .load_periodical(periodical_key)
        .await?
        .ok_or_else(|| AppError::config(format!("periodical file not found: {periodical_key}")))?;

    present::header(&format!("Linking citations to {}", periodical.name));
    if periodical.tree.node_count() <= 1 {
        log::warn!(
            "{} has no downloaded tree; run `download` first or expect no matches",
            periodical.name
        );
    }

    present::step(1, 3, "Loading citations");
    let records = storage.load_citations(citations_key).await?;

    present::step(2, 3, "Linking");
    let (report, records) = link_citations(&periodical, records);

    present::step(3, 3, "Writing results");
    storage.write_results(results_key, &records).await?;
    present::success("Linking complete");

    Ok(report)
}
