//! Per-novel outcomes and the harvest summary

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Pipeline step a novel failed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Detail page fetch or parse
    Enrich,
    /// Chapter outline fetch or parse
    Outline,
    /// Writing the novel file
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enrich => "enrich",
            Self::Outline => "outline",
            Self::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// What became of one novel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NovelOutcome {
    Written {
        path: PathBuf,
        chapters: usize,
        /// Chapters whose fetch failed and were written with empty text
        empty_chapters: usize,
    },
    Failed {
        stage: Stage,
        reason: String,
    },
    /// Same detail page or same output file as an earlier novel in the batch
    Duplicate {
        /// Detail URL of the novel that was kept
        of: String,
    },
}

impl NovelOutcome {
    pub fn failed(stage: Stage, reason: impl fmt::Display) -> Self {
        Self::Failed {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// One line of the harvest report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelReport {
    pub title: String,
    pub author: String,
    pub detail_url: String,
    pub outcome: NovelOutcome,
}

/// Result of a whole harvest
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub site: String,

    /// Every novel handed to the harvest, in input order, including those
    /// that failed enrichment or were dropped as duplicates
    pub novels: Vec<NovelReport>,

    /// Novels left out by the `top_n` cut after sorting
    pub skipped: usize,

    pub elapsed: Duration,
}

impl HarvestReport {
    pub fn written(&self) -> impl Iterator<Item = &NovelReport> {
        self.novels.iter().filter(|n| n.outcome.is_written())
    }

    pub fn failed(&self) -> impl Iterator<Item = &NovelReport> {
        self.novels
            .iter()
            .filter(|n| matches!(n.outcome, NovelOutcome::Failed { .. }))
    }

    pub fn duplicates(&self) -> impl Iterator<Item = &NovelReport> {
        self.novels
            .iter()
            .filter(|n| matches!(n.outcome, NovelOutcome::Duplicate { .. }))
    }

    /// Total chapters written with empty content
    pub fn empty_chapters(&self) -> usize {
        self.novels
            .iter()
            .map(|n| match n.outcome {
                NovelOutcome::Written { empty_chapters, .. } => empty_chapters,
                NovelOutcome::Failed { .. } | NovelOutcome::Duplicate { .. } => 0,
            })
            .sum()
    }
}

/// Prints the harvest summary to stdout
pub fn print_report(report: &HarvestReport) {
    println!("=== Harvest Report ({}) ===\n", report.site);

    let written = report.written().count();
    let failed = report.failed().count();
    let duplicates = report.duplicates().count();
    let total = report.novels.len() - duplicates;

    println!("Overview:");
    println!("  Novels attempted: {}", total);
    println!("  Novels written: {}", written);
    println!("  Novels failed: {}", failed);
    if duplicates > 0 {
        println!("  Duplicates dropped: {}", duplicates);
    }
    if report.skipped > 0 {
        println!("  Novels skipped by top-N: {}", report.skipped);
    }
    println!("  Empty chapters: {}", report.empty_chapters());
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if written > 0 {
        println!("Written:");
        for novel in report.written() {
            if let NovelOutcome::Written {
                path,
                chapters,
                empty_chapters,
            } = &novel.outcome
            {
                println!(
                    "  {} / {}: {} chapters ({} empty) -> {}",
                    novel.title,
                    novel.author,
                    chapters,
                    empty_chapters,
                    path.display()
                );
            }
        }
        println!();
    }

    if failed > 0 {
        println!("Failed:");
        for novel in report.failed() {
            if let NovelOutcome::Failed { stage, reason } = &novel.outcome {
                let name = if novel.title.is_empty() {
                    novel.detail_url.as_str()
                } else {
                    novel.title.as_str()
                };
                println!("  {} [{}]: {}", name, stage, reason);
            }
        }
        println!();
    }

    if duplicates > 0 {
        println!("Duplicates:");
        for novel in report.duplicates() {
            if let NovelOutcome::Duplicate { of } = &novel.outcome {
                println!("  {} (same as {})", novel.detail_url, of);
            }
        }
        println!();
    }

    let success_rate = if total > 0 {
        (written as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} novels written)",
        success_rate, written, total
    );
}
