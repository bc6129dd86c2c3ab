//! Batch harvest: enrich many novels, then assemble each independently

use crate::concurrency::gather_ordered;
use crate::crawler::pipeline::assemble_novel;
use crate::crawler::report::{HarvestReport, NovelOutcome, NovelReport, Stage};
use crate::crawler::NovelCrawler;
use crate::model::{NovelMetadata, NovelReference};
use crate::NovelError;
use clap::ValueEnum;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

/// Ordering applied to enriched novels before the `top_n` cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Largest word count first
    WordCount,
    /// Most recently updated first
    UpdateTime,
}

/// Batch-level knobs for [`harvest`]
#[derive(Debug, Clone, Default)]
pub struct HarvestOptions {
    /// Sort enriched novels, descending, before assembly
    pub sort: Option<SortKey>,

    /// Assemble only the first `top_n` novels after sorting
    pub top_n: Option<usize>,
}

/// Enriches every reference and writes every novel that enriched cleanly
///
/// References repeating an earlier detail URL are dropped before any fetch,
/// and novels resolving to the same output file as an earlier one are
/// dropped after enrichment, so no file is ever written by two tasks. Both
/// show up in the report as [`NovelOutcome::Duplicate`].
///
/// Enrichment runs for all remaining references at once (bounded by the
/// crawler's metadata gate); a reference whose metadata fails is reported
/// as failed, with the error, and gets no further fetch. The rest are then
/// assembled concurrently. A failure in one novel never affects another,
/// and the report lists novels in input order.
pub async fn harvest(
    crawler: &dyn NovelCrawler,
    references: &[NovelReference],
    options: &HarvestOptions,
) -> HarvestReport {
    let started = Instant::now();
    tracing::info!(
        "Harvesting {} novels from {}",
        references.len(),
        crawler.site_name()
    );

    let mut novels = Vec::with_capacity(references.len());

    let mut first_by_url: HashMap<&str, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(references.len());
    for (index, reference) in references.iter().enumerate() {
        match first_by_url.get(reference.detail_url.as_str()) {
            Some(&first) => {
                tracing::warn!("Dropping repeated reference {}", reference.detail_url);
                novels.push((index, duplicate_of(reference, &references[first])));
            }
            None => {
                first_by_url.insert(reference.detail_url.as_str(), index);
                unique.push(index);
            }
        }
    }

    let enriched = gather_ordered(
        unique
            .iter()
            .map(|&index| crawler.novel_metadata(&references[index].detail_url)),
    )
    .await;

    let mut ready: Vec<(usize, NovelMetadata)> = Vec::with_capacity(unique.len());
    let mut first_by_target: HashMap<PathBuf, usize> = HashMap::new();

    for (&index, result) in unique.iter().zip(enriched) {
        let reference = &references[index];
        let metadata = match result {
            Ok(metadata) if !metadata.is_empty() => metadata,
            Ok(_) => {
                let e = NovelError::EmptyMetadata {
                    url: reference.detail_url.clone(),
                };
                tracing::warn!("Skipping '{}': {}", reference.title, e);
                let outcome = NovelOutcome::failed(Stage::Enrich, e);
                novels.push((index, report_for(reference, outcome)));
                continue;
            }
            Err(e) => {
                tracing::warn!("Skipping '{}': {}", reference.title, e);
                let outcome = NovelOutcome::failed(Stage::Enrich, e);
                novels.push((index, report_for(reference, outcome)));
                continue;
            }
        };

        let target = crawler.novel_path(&metadata);
        match first_by_target.get(&target) {
            Some(&first) => {
                tracing::warn!(
                    "'{}' would overwrite {}; keeping {}",
                    metadata.title,
                    target.display(),
                    references[first].detail_url
                );
                novels.push((index, duplicate_of(reference, &references[first])));
            }
            None => {
                first_by_target.insert(target, index);
                ready.push((index, metadata));
            }
        }
    }

    if let Some(key) = options.sort {
        sort_descending(&mut ready, key);
    }

    let mut skipped = 0;
    if let Some(n) = options.top_n {
        skipped = ready.len().saturating_sub(n);
        ready.truncate(n);
    }

    let outcomes = gather_ordered(
        ready
            .iter()
            .map(|(_, metadata)| assemble_novel(crawler, metadata)),
    )
    .await;

    for ((index, metadata), outcome) in ready.iter().zip(outcomes) {
        novels.push((
            *index,
            NovelReport {
                title: metadata.title.clone(),
                author: metadata.author.clone(),
                detail_url: references[*index].detail_url.clone(),
                outcome,
            },
        ));
    }

    novels.sort_by_key(|(index, _)| *index);
    let report = HarvestReport {
        site: crawler.site_name().to_string(),
        novels: novels.into_iter().map(|(_, novel)| novel).collect(),
        skipped,
        elapsed: started.elapsed(),
    };

    tracing::info!(
        "Harvest finished: {} written, {} failed, {} duplicates in {:.1}s",
        report.written().count(),
        report.failed().count(),
        report.duplicates().count(),
        report.elapsed.as_secs_f64()
    );
    report
}

fn report_for(reference: &NovelReference, outcome: NovelOutcome) -> NovelReport {
    NovelReport {
        title: reference.title.clone(),
        author: reference.author.clone(),
        detail_url: reference.detail_url.clone(),
        outcome,
    }
}

fn duplicate_of(reference: &NovelReference, kept: &NovelReference) -> NovelReport {
    report_for(
        reference,
        NovelOutcome::Duplicate {
            of: kept.detail_url.clone(),
        },
    )
}

/// Stable descending sort; ties keep input order
fn sort_descending(novels: &mut [(usize, NovelMetadata)], key: SortKey) {
    match key {
        SortKey::WordCount => novels.sort_by(|a, b| b.1.word_count.cmp(&a.1.word_count)),
        // `YYYY-MM-DD` orders correctly as text
        SortKey::UpdateTime => novels.sort_by(|a, b| b.1.update_time.cmp(&a.1.update_time)),
    }
}
