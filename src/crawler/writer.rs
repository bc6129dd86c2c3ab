//! Novel file writer
//!
//! Layout: `{base_dir}/{tag}/{title}_{author}.txt`, one block per chapter:
//! title line, content, blank line.

use crate::concurrency::AdmissionGate;
use crate::config::ExistingFilePolicy;
use crate::model::{Chapter, NovelMetadata};
use crate::NovelError;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Characters that cannot appear in a path component
const RESERVED: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Writes assembled novels under a base directory
#[derive(Debug, Clone)]
pub struct NovelWriter {
    base_dir: PathBuf,

    /// File-class gate; every write holds one slot
    gate: AdmissionGate,

    policy: ExistingFilePolicy,
}

impl NovelWriter {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        gate: AdmissionGate,
        policy: ExistingFilePolicy,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            gate,
            policy,
        }
    }

    /// Target file for a novel
    pub fn novel_path(&self, metadata: &NovelMetadata) -> PathBuf {
        self.base_dir
            .join(sanitize_component(&metadata.tag))
            .join(format!(
                "{}_{}.txt",
                sanitize_component(&metadata.title),
                sanitize_component(&metadata.author)
            ))
    }

    /// Writes every chapter, in order, to the novel's file
    ///
    /// The file and its directories are created when missing. With
    /// [`ExistingFilePolicy::Append`] an existing file is extended, so
    /// writing the same novel twice duplicates its chapters.
    pub async fn write(
        &self,
        metadata: &NovelMetadata,
        chapters: &[Chapter],
    ) -> Result<PathBuf, NovelError> {
        let path = self.novel_path(metadata);

        self.gate
            .run(write_chapters(&path, chapters, self.policy))
            .await?;

        tracing::info!(
            "Wrote {} chapters of '{}' to {}",
            chapters.len(),
            metadata.title,
            path.display()
        );
        Ok(path)
    }
}

async fn write_chapters(
    path: &Path,
    chapters: &[Chapter],
    policy: ExistingFilePolicy,
) -> Result<(), NovelError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| NovelError::io(parent, e))?;
    }

    let mut options = OpenOptions::new();
    options.create(true);
    match policy {
        ExistingFilePolicy::Append => {
            options.append(true);
        }
        ExistingFilePolicy::Overwrite => {
            options.write(true).truncate(true);
        }
    }

    let file = options
        .open(path)
        .await
        .map_err(|e| NovelError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    for chapter in chapters {
        writer
            .write_all(format_chapter(chapter).as_bytes())
            .await
            .map_err(|e| NovelError::io(path, e))?;
    }

    writer.flush().await.map_err(|e| NovelError::io(path, e))?;
    Ok(())
}

/// One chapter block: title line, content, two trailing newlines
pub fn format_chapter(chapter: &Chapter) -> String {
    format!("{}\n{}\n\n", chapter.title, chapter.content)
}

/// Replaces characters that would break a file name
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}
