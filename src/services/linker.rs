// src/services/linker.rs

//! Citation-to-node matching.
//!
//! Records move through `TO_LINK → SUCCESS | TO_DIAGNOSE`. Unmatched records
//! get a diagnosis; `MISSING_ISSUE` records whose volume has a single child
//! are repaired and go back to `TO_LINK`. The pipeline runs exactly two
//! linking rounds so unrepairable records are never retried forever.

use std::collections::BTreeMap;

use crate::location::is_plain_component;
use crate::models::{CitationRecord, LinkStatus, Periodical};

/// Summary of a full two-round run.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkReport {
    pub total: usize,
    pub first_round_rate: f64,
    pub final_rate: f64,
    pub repaired: usize,
    pub by_status: BTreeMap<LinkStatus, usize>,
}

/// Resolves citation records against a periodical's tree.
pub struct Linker<'a> {
    periodical: &'a Periodical,
    records: Vec<CitationRecord>,
}

impl<'a> Linker<'a> {
    pub fn new(periodical: &'a Periodical, records: Vec<CitationRecord>) -> Self {
        Self {
            periodical,
            records,
        }
    }

    pub fn records(&self) -> &[CitationRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CitationRecord> {
        self.records
    }

    /// Records that are not linked (yet).
    pub fn failures(&self) -> impl Iterator<Item = &CitationRecord> {
        self.records.iter().filter(|r| r.status != LinkStatus::Success)
    }

    /// Share of successfully linked records; recomputed on every call.
    pub fn success_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let linked = self
            .records
            .iter()
            .filter(|r| r.status == LinkStatus::Success)
            .count();
        linked as f64 / self.records.len() as f64
    }

    /// Record count per status.
    pub fn status_counts(&self) -> BTreeMap<LinkStatus, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        counts
    }

    /// Look up every `TO_LINK` record. Returns how many were linked.
    pub fn link(&mut self) -> usize {
        let tree = &self.periodical.tree;
        let mut linked = 0;
        for record in self.records.iter_mut().filter(|r| r.status == LinkStatus::ToLink) {
            let key = tree.path_key(&[
                record.volume.as_deref(),
                record.issue.as_deref(),
                record.page.as_deref(),
            ]);
            match tree.get(&key) {
                Some(node) => {
                    let url = self.periodical.make_url(&node.uuid);
                    log::info!("{} `{key}` --> `{url}`", record.id);
                    record.resolved_link = Some(url);
                    record.status = LinkStatus::Success;
                    linked += 1;
                }
                None => {
                    log::info!("{} `{key}` not found", record.id);
                    record.status = LinkStatus::ToDiagnose;
                }
            }
        }
        linked
    }

    /// Name the missing component(s) of unmatched records.
    ///
    /// Fully specified records stay `TO_DIAGNOSE`; see
    /// [`Linker::classify_unmatched`].
    pub fn diagnose(&mut self) {
        for record in self.records.iter_mut().filter(|r| r.status == LinkStatus::ToDiagnose) {
            let status = match record.missing_components().as_slice() {
                [] => continue,
                ["volume"] => LinkStatus::MissingVolume,
                ["issue"] => LinkStatus::MissingIssue,
                ["page"] => LinkStatus::MissingPage,
                _ => LinkStatus::MissingMultiple,
            };
            log::debug!("{} `{}` diagnosed as {status}", record.id, record.raw_location);
            record.status = status;
        }
    }

    /// Fill in the issue of `MISSING_ISSUE` records whose volume has exactly
    /// one child. Returns how many records were sent back to `TO_LINK`.
    pub fn repair(&mut self) -> usize {
        let tree = &self.periodical.tree;
        let mut repaired = 0;
        for record in self.records.iter_mut().filter(|r| r.status == LinkStatus::MissingIssue) {
            let volume_key = tree.path_key(&[record.volume.as_deref()]);
            let Some(only) = tree.only_child(&volume_key) else {
                continue;
            };
            log::info!(
                "{} `{}`: volume `{volume_key}` has one child, using issue `{}`",
                record.id,
                record.raw_location,
                only.label
            );
            record.issue = Some(only.label.clone());
            record.status = LinkStatus::ToLink;
            repaired += 1;
        }
        repaired
    }

    /// Explain fully specified records that still failed: a component we
    /// cannot read, or the first unit along the path that is not digitized.
    ///
    /// Components are taken from the record, so an issue filled in by
    /// [`Linker::repair`] counts as present.
    pub fn classify_unmatched(&mut self) {
        let tree = &self.periodical.tree;
        for record in self.records.iter_mut().filter(|r| r.status == LinkStatus::ToDiagnose) {
            let (Some(volume), Some(issue), Some(page)) = (
                record.volume.as_deref(),
                record.issue.as_deref(),
                record.page.as_deref(),
            ) else {
                continue;
            };
            record.status = if ![volume, issue, page].into_iter().all(is_plain_component) {
                LinkStatus::NonstandardFormat
            } else if !tree.contains(&tree.path_key(&[Some(volume)])) {
                LinkStatus::VolumeNotDigitized
            } else if !tree.contains(&tree.path_key(&[Some(volume), Some(issue)])) {
                LinkStatus::IssueNotDigitized
            } else {
                LinkStatus::PageNotDigitized
            };
        }
    }

    /// Link, diagnose, repair, link again, then classify what is left.
    pub fn run(&mut self) -> LinkReport {
        self.link();
        let first_round_rate = self.success_rate();
        self.diagnose();
        let repaired = self.repair();
        self.link();
        let final_rate = self.success_rate();
        self.diagnose();
        self.classify_unmatched();

        LinkReport {
            total: self.records.len(),
            first_round_rate,
            final_rate,
            repaired,
            by_status: self.status_counts(),
        }
    }
}
