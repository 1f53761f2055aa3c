//! Batch coordination: run one pipeline per input, isolating failures.
//!
//! Items are independent. A failing item is recorded and the batch moves on.
//! The batch call itself only errors when it is given nothing to do; a batch
//! in which no input could be read settles as [`BatchStatus::Failed`].

use crate::codec::{Codec, EncodeRequest, ImageFormat};
use crate::error::{ErrorKind, ImageError, Result};
use crate::pipeline::{output_name, Pipeline};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Where an item's encoded bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSource {
    /// Bytes already in memory
    Bytes(Vec<u8>),
    /// A file, read when the item is processed
    File(PathBuf),
}

impl ItemSource {
    fn read(&self) -> Result<std::borrow::Cow<'_, [u8]>> {
        match self {
            ItemSource::Bytes(bytes) => Ok(bytes.as_slice().into()),
            ItemSource::File(path) => std::fs::read(path)
                .map(Into::into)
                .map_err(|err| {
                    ImageError::IoError(std::io::Error::new(err.kind(), format!("{}: {err}", path.display())))
                }),
        }
    }
}

/// One input to a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Name the input was declared with, usually its file name
    pub name: String,
    /// Encoded input
    pub source: ItemSource,
    /// Transforms to apply
    pub pipeline: Pipeline,
    /// Output container and quality
    pub request: EncodeRequest,
}

impl BatchItem {
    /// Create an item from bytes already in memory.
    pub fn new(name: impl Into<String>, source: Vec<u8>, pipeline: Pipeline, request: EncodeRequest) -> Self {
        Self {
            name: name.into(),
            source: ItemSource::Bytes(source),
            pipeline,
            request,
        }
    }

    /// Create an item whose file is read when it is processed.
    ///
    /// A read failure settles the item as `Failed` with kind `Io`.
    pub fn from_file(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        pipeline: Pipeline,
        request: EncodeRequest,
    ) -> Self {
        Self {
            name: name.into(),
            source: ItemSource::File(path.into()),
            pipeline,
            request,
        }
    }
}

/// Lifecycle of the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Not started
    Idle,
    /// Processing items
    Running,
    /// Every item succeeded
    Completed,
    /// At least one item failed
    PartiallyFailed,
    /// Every item failed because its input could not be read or decoded
    Failed,
    /// Abandoned before every item settled
    Cancelled,
}

/// Lifecycle of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Waiting to be processed
    Pending,
    /// Being processed
    Processing,
    /// Output produced
    Done,
    /// Processing failed
    Failed {
        /// Error category
        kind: ErrorKind,
        /// Error message
        reason: String,
    },
}

impl ItemStatus {
    /// Whether the item reached a final state.
    pub fn is_settled(&self) -> bool {
        matches!(self, ItemStatus::Done | ItemStatus::Failed { .. })
    }
}

/// A produced artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutput {
    /// Suggested file name, unique within the batch
    pub name: String,
    /// Encoded bytes
    pub bytes: Vec<u8>,
    /// Container format
    pub format: ImageFormat,
}

/// Result slot for one item.
#[derive(Debug, Clone)]
pub struct ItemResult {
    /// Position in the input
    pub index: usize,
    /// Declared input name
    pub source_name: String,
    /// Final (or last observed) state
    pub status: ItemStatus,
    /// Output, when `status` is `Done`
    pub output: Option<BatchOutput>,
}

/// Settled-item counter reported after each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Items settled so far
    pub completed: usize,
    /// Items that failed so far
    pub failed: usize,
    /// Items in the batch
    pub total: usize,
}

impl Progress {
    /// Fraction settled, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// Percentage settled.
    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    /// Whether every item has settled.
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Final batch state
    pub status: BatchStatus,
    /// One entry per input, in input order
    pub items: Vec<ItemResult>,
    /// Final progress
    pub progress: Progress,
}

impl BatchReport {
    /// Items that produced output.
    pub fn succeeded(&self) -> impl Iterator<Item = &ItemResult> {
        self.items.iter().filter(|i| i.status == ItemStatus::Done)
    }

    /// Items that failed.
    pub fn failed(&self) -> impl Iterator<Item = &ItemResult> {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ItemStatus::Failed { .. }))
    }

    /// File name to bytes, ready for an archiving collaborator.
    pub fn archive_entries(&self) -> BTreeMap<&str, &[u8]> {
        self.items
            .iter()
            .filter_map(|i| i.output.as_ref())
            .map(|o| (o.name.as_str(), o.bytes.as_slice()))
            .collect()
    }

    /// Serializable overview without the payload bytes.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            status: self.status,
            total: self.progress.total,
            succeeded: self.succeeded().count(),
            failed: self.failed().count(),
            items: self
                .items
                .iter()
                .map(|i| ItemSummary {
                    source: i.source_name.clone(),
                    output: i.output.as_ref().map(|o| o.name.clone()),
                    bytes: i.output.as_ref().map(|o| o.bytes.len()),
                    status: i.status.clone(),
                })
                .collect(),
        }
    }
}

/// Serializable batch overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Final batch state
    pub status: BatchStatus,
    /// Items in the batch
    pub total: usize,
    /// Items that produced output
    pub succeeded: usize,
    /// Items that failed
    pub failed: usize,
    /// Per-item detail
    pub items: Vec<ItemSummary>,
}

/// Serializable per-item overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    /// Declared input name
    pub source: String,
    /// Output file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Output size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    /// Final state
    pub status: ItemStatus,
}

/// Drives a [`Codec`] and per-item [`Pipeline`]s over a list of inputs.
pub struct BatchCoordinator<C> {
    codec: C,
    suffix: String,
    cancel: Option<Arc<AtomicBool>>,
    status: BatchStatus,
}

impl<C: Codec> BatchCoordinator<C> {
    /// Create a coordinator around a codec.
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            suffix: String::new(),
            cancel: None,
            status: BatchStatus::Idle,
        }
    }

    /// Builder: suffix appended to every output file stem.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Builder: flag that abandons the batch between items once set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Current batch state.
    pub fn status(&self) -> BatchStatus {
        self.status
    }

    /// Process items one at a time in input order.
    ///
    /// `on_progress` is called after each item settles.
    pub fn run<F>(&mut self, items: Vec<BatchItem>, mut on_progress: F) -> Result<BatchReport>
    where
        F: FnMut(Progress),
    {
        let mut ledger = self.start(&items)?;
        for (index, item) in items.into_iter().enumerate() {
            if self.is_cancelled() {
                tracing::warn!(index, "batch cancelled");
                break;
            }
            ledger.results[index].status = ItemStatus::Processing;
            let outcome = process_item(&self.codec, &item);
            on_progress(ledger.settle(index, outcome));
        }
        Ok(self.finish(ledger))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn start(&mut self, items: &[BatchItem]) -> Result<Ledger> {
        if items.is_empty() {
            return Err(ImageError::invalid_parameter("batch has no items"));
        }
        self.status = BatchStatus::Running;
        tracing::info!(total = items.len(), "batch started");
        Ok(Ledger::new(items, &self.suffix))
    }

    fn finish(&mut self, ledger: Ledger) -> BatchReport {
        let report = ledger.into_report();
        self.status = report.status;
        tracing::info!(
            status = ?report.status,
            completed = report.progress.completed,
            failed = report.progress.failed,
            total = report.progress.total,
            "batch finished"
        );
        report
    }
}

#[cfg(feature = "parallel")]
impl<C: Codec + Sync> BatchCoordinator<C> {
    /// Process items on the rayon pool.
    ///
    /// Progress is reported on the calling thread in the order items settle;
    /// the report keeps input order.
    pub fn run_parallel<F>(&mut self, items: Vec<BatchItem>, mut on_progress: F) -> Result<BatchReport>
    where
        F: FnMut(Progress),
    {
        use rayon::prelude::*;
        use std::sync::mpsc;

        let mut ledger = self.start(&items)?;
        let (tx, rx) = mpsc::channel();
        let codec = &self.codec;
        let cancel = self.cancel.clone();

        std::thread::scope(|scope| {
            scope.spawn(move || {
                items
                    .into_par_iter()
                    .enumerate()
                    .for_each_with(tx, |tx, (index, item)| {
                        if cancel.as_ref().is_some_and(|f| f.load(Ordering::Relaxed)) {
                            return;
                        }
                        let _ = tx.send((index, process_item(codec, &item)));
                    });
            });
            for (index, outcome) in rx {
                on_progress(ledger.settle(index, outcome));
            }
        });

        Ok(self.finish(ledger))
    }
}

/// Bookkeeping shared by the sequential and parallel runners.
struct Ledger {
    results: Vec<ItemResult>,
    output_names: Vec<String>,
    progress: Progress,
}

impl Ledger {
    fn new(items: &[BatchItem], suffix: &str) -> Self {
        let results = items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemResult {
                index,
                source_name: item.name.clone(),
                status: ItemStatus::Pending,
                output: None,
            })
            .collect();
        let names = items
            .iter()
            .map(|item| output_name(&item.name, item.request.format, suffix));
        Self {
            results,
            output_names: unique_names(names),
            progress: Progress {
                completed: 0,
                failed: 0,
                total: items.len(),
            },
        }
    }

    fn settle(&mut self, index: usize, outcome: Result<(Vec<u8>, ImageFormat)>) -> Progress {
        let slot = &mut self.results[index];
        match outcome {
            Ok((bytes, format)) => {
                tracing::debug!(index, name = %slot.source_name, bytes = bytes.len(), "item done");
                slot.status = ItemStatus::Done;
                slot.output = Some(BatchOutput {
                    name: std::mem::take(&mut self.output_names[index]),
                    bytes,
                    format,
                });
            }
            Err(err) => {
                tracing::warn!(index, name = %slot.source_name, error = %err, "item failed");
                slot.status = ItemStatus::Failed {
                    kind: err.kind(),
                    reason: err.to_string(),
                };
                self.progress.failed += 1;
            }
        }
        self.progress.completed += 1;
        self.progress
    }

    fn nothing_readable(&self) -> bool {
        self.results
            .iter()
            .all(|r| matches!(&r.status, ItemStatus::Failed { kind, .. } if kind.is_unreadable_input()))
    }

    fn into_report(self) -> BatchReport {
        let status = if !self.progress.is_complete() {
            BatchStatus::Cancelled
        } else if self.progress.failed == 0 {
            BatchStatus::Completed
        } else if self.nothing_readable() {
            BatchStatus::Failed
        } else {
            BatchStatus::PartiallyFailed
        };
        BatchReport {
            status,
            items: self.results,
            progress: self.progress,
        }
    }
}

fn process_item<C: Codec + ?Sized>(codec: &C, item: &BatchItem) -> Result<(Vec<u8>, ImageFormat)> {
    let source = item.source.read()?;
    let encoded = item.pipeline.run(codec, &source, &item.request)?;
    Ok((encoded.bytes, encoded.format))
}

/// Make names unique by appending `-1`, `-2`, ... to repeated stems.
fn unique_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            if seen.insert(name.clone()) {
                return name;
            }
            let path = Path::new(&name);
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
            let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
            let mut n = 1;
            loop {
                let candidate = format!("{stem}-{n}.{ext}");
                if seen.insert(candidate.clone()) {
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}
