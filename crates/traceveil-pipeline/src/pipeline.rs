//! File pipeline orchestrator
//!
//! Drives one file through resolve -> scan -> mask -> export, and
//! coordinates a fixed-size worker pool across many files. Files are
//! masked independently; the mapping store is the only shared mutable
//! resource.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use traceveil_core::{Catalog, Category, Error, MaskingMapping, Result};
use traceveil_engine::{Masker, Replacement, apply_replacements, resolve_preset, scan};
use traceveil_observability::Metrics;
use traceveil_store::{MappingExport, MappingStore};

use crate::atomic::AtomicWriter;
use crate::export_writer::write_export;
use crate::state::{FileReport, FileState};

/// One file queued for masking
#[derive(Debug, Clone)]
pub struct FileJob {
    pub file_id: String,
    pub input_path: PathBuf,
    pub product_id: String,
}

impl FileJob {
    pub fn new(
        file_id: impl Into<String>,
        input_path: impl Into<PathBuf>,
        product_id: impl Into<String>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            input_path: input_path.into(),
            product_id: product_id.into(),
        }
    }

    /// Derive the file id from the input path's stem
    pub fn from_path(input_path: impl Into<PathBuf>, product_id: impl Into<String>) -> Self {
        let input_path = input_path.into();
        let file_id = input_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            file_id,
            input_path,
            product_id: product_id.into(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fixed worker pool size for concurrent files
    pub workers: usize,
    /// Directory masked output files are written to
    pub out_dir: PathBuf,
    /// Directory mapping export artifacts are written to; None disables
    /// export
    pub export_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            workers: 4,
            out_dir: out_dir.into(),
            export_dir: None,
        }
    }
}

/// Cooperative cancellation handle
///
/// Cancelling moves every in-flight file directly to `Failed` at its next
/// step boundary; partially computed substitutions are discarded and no
/// output is written.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The file pipeline orchestrator
#[derive(Clone)]
pub struct Pipeline {
    catalog: Arc<Catalog>,
    store: Arc<dyn MappingStore>,
    masker: Masker,
    metrics: Metrics,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        catalog: Arc<Catalog>,
        store: Arc<dyn MappingStore>,
        metrics: Metrics,
        config: PipelineConfig,
    ) -> Self {
        let masker = Masker::from_options(catalog.options());
        Self {
            catalog,
            store,
            masker,
            metrics,
            config,
        }
    }

    /// Run one file through the pipeline to a terminal state
    pub async fn run_file(&self, job: &FileJob, cancel: &CancelToken) -> FileReport {
        let mut report = FileReport {
            file_id: job.file_id.clone(),
            input_path: job.input_path.clone(),
            state: FileState::Received,
            preset_id: None,
            candidate_count: 0,
            mappings_created: 0,
            output_path: None,
            export_path: None,
        };

        match self.process(job, cancel, &mut report).await {
            Ok(()) => {
                report.state = FileState::Completed;
                self.metrics
                    .files_processed
                    .with_label_values(&["completed"])
                    .inc();
                info!(
                    file_id = %job.file_id,
                    candidates = report.candidate_count,
                    mappings_created = report.mappings_created,
                    "file completed"
                );
            }
            Err(e) => {
                self.metrics
                    .files_processed
                    .with_label_values(&["failed"])
                    .inc();
                warn!(file_id = %job.file_id, state = %report.state, error = %e, "file failed");
                report.state = FileState::Failed {
                    reason: e.to_string(),
                };
            }
        }

        report
    }

    async fn process(
        &self,
        job: &FileJob,
        cancel: &CancelToken,
        report: &mut FileReport,
    ) -> Result<()> {
        let text = tokio::fs::read_to_string(&job.input_path).await?;
        self.ensure_live(cancel)?;

        let preset = resolve_preset(&self.catalog, &job.product_id, &text)?;
        report.preset_id = Some(preset.id.clone());
        report.state = FileState::PresetResolved;
        self.ensure_live(cancel)?;

        let scan_started = Instant::now();
        let candidates = scan(&text, preset, self.catalog.exceptions());
        self.metrics
            .scan_duration_seconds
            .observe(scan_started.elapsed().as_secs_f64());
        for candidate in &candidates {
            self.metrics
                .candidates_found
                .with_label_values(&[candidate.category.as_str()])
                .inc();
        }
        report.candidate_count = candidates.len();
        report.state = FileState::Scanned;
        debug!(file_id = %job.file_id, candidates = candidates.len(), "scan complete");
        self.ensure_live(cancel)?;

        // Resolve every candidate through the mapping store before touching
        // the output: the substitution is computed from the full list.
        let mut replacements = Vec::with_capacity(candidates.len());
        let mut exported: Vec<MaskingMapping> = Vec::new();
        let mut seen: HashSet<(Category, String)> = HashSet::new();

        for candidate in &candidates {
            self.ensure_live(cancel)?;

            let masked =
                self.masker
                    .mask_value(&candidate.category, &candidate.value, &candidate.action);
            let outcome = self
                .store
                .lookup_or_create(&candidate.category, &candidate.value, &masked)
                .await?;

            if outcome.created {
                report.mappings_created += 1;
                self.metrics
                    .mappings_created
                    .with_label_values(&[candidate.category.as_str()])
                    .inc();
            }

            replacements.push(Replacement {
                start: candidate.start,
                end: candidate.end,
                masked: outcome.mapping.masked_value.clone(),
            });

            let key = (
                outcome.mapping.category.clone(),
                outcome.mapping.original_value.clone(),
            );
            if seen.insert(key) {
                exported.push(outcome.mapping);
            }
        }

        let output = apply_replacements(&text, &replacements);
        self.ensure_live(cancel)?;

        let file_name = job
            .input_path
            .file_name()
            .ok_or_else(|| Error::Config(format!("input path has no file name: {}", job.input_path.display())))?;
        let output_path = self.config.out_dir.join(file_name);

        let mut writer = AtomicWriter::new(&output_path)?;
        writer.write(output.as_bytes())?;
        writer.commit()?;
        report.output_path = Some(output_path);
        report.state = FileState::Masked;

        if let Some(export_dir) = &self.config.export_dir {
            let export = MappingExport::new(&job.file_id, &job.product_id, exported);
            let export_path = write_export(export_dir, &export)?;
            report.export_path = Some(export_path);
            report.state = FileState::MappingExported;
        }

        Ok(())
    }

    fn ensure_live(&self, cancel: &CancelToken) -> Result<()> {
        if cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Process many files concurrently through the fixed-size worker pool.
    ///
    /// Reports come back in input order regardless of completion order.
    pub async fn run_many(&self, jobs: Vec<FileJob>, cancel: &CancelToken) -> Vec<FileReport> {
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut join_set = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            let pipeline = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("worker semaphore closed");
                let report = pipeline.run_file(&job, &cancel).await;
                (index, report)
            });
        }

        let mut indexed = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(pair) => indexed.push(pair),
                Err(e) => error!(error = %e, "pipeline worker panicked"),
            }
        }

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, report)| report).collect()
    }
}
