// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch runner — processes archives on the blocking pool, at most `jobs` at
// a time.
//
// Archive processing is synchronous file and ZIP I/O, so each archive runs
// inside `tokio::task::spawn_blocking`. A semaphore bounds how many run at
// once, and every run builds its own sink, validator and budget. Outcomes are
// returned in input order regardless of completion order.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bindery_archive::{ArchiveProcessor, DirectorySink, StagedOutput};
use bindery_core::BinderyConfig;
use bindery_core::error::{BinderyError, Result};
use tokio::sync::Semaphore;
use tracing::info;

/// What happened to one archive.
#[derive(Debug)]
pub struct ArchiveOutcome {
    pub archive: PathBuf,
    pub result: Result<StagedOutput>,
}

impl ArchiveOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// One-word status for the per-archive report line. Archives stopped by
    /// a batch bound are "rejected"; anything else that went wrong "failed".
    pub fn status(&self) -> &'static str {
        match &self.result {
            Ok(_) => "done",
            Err(err) if err.is_fatal_batch() => "rejected",
            Err(_) => "failed",
        }
    }
}

/// Settings shared by every archive in a batch.
#[derive(Debug, Clone)]
struct ArchiveJob {
    processor: ArchiveProcessor,
    output: Option<PathBuf>,
    overwrite: bool,
}

impl ArchiveJob {
    fn output_root(&self, archive: &Path) -> PathBuf {
        match &self.output {
            Some(root) => root.clone(),
            None => match archive.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }

    fn run(&self, archive: &Path) -> Result<StagedOutput> {
        let mut sink = DirectorySink::new(self.output_root(archive)).overwrite(self.overwrite);
        self.processor.process(archive, &mut sink)
    }
}

pub struct BatchRunner {
    job: ArchiveJob,
    permits: Arc<Semaphore>,
}

impl BatchRunner {
    pub fn new(
        config: BinderyConfig,
        output: Option<PathBuf>,
        overwrite: bool,
        jobs: NonZeroUsize,
    ) -> Self {
        Self {
            job: ArchiveJob {
                processor: ArchiveProcessor::new(config),
                output,
                overwrite,
            },
            permits: Arc::new(Semaphore::new(jobs.get())),
        }
    }

    /// Process every archive and return one outcome per input, in input order.
    pub async fn run(&self, archives: Vec<PathBuf>) -> Vec<ArchiveOutcome> {
        let total = archives.len();
        let mut handles = Vec::with_capacity(total);

        for (idx, archive) in archives.into_iter().enumerate() {
            let permits = Arc::clone(&self.permits);
            let job = self.job.clone();
            let path = archive.clone();

            let handle = tokio::spawn(async move {
                let permit = permits.acquire_owned().await.map_err(task_failed)?;
                info!("[{}/{}] Processing: {}", idx + 1, total, path.display());
                tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    job.run(&path)
                })
                .await
                .map_err(task_failed)?
            });
            handles.push((archive, handle));
        }

        let mut outcomes = Vec::with_capacity(total);
        for (archive, handle) in handles {
            let result = handle.await.unwrap_or_else(|err| Err(task_failed(err)));
            outcomes.push(ArchiveOutcome { archive, result });
        }
        outcomes
    }
}

fn task_failed(err: impl std::fmt::Display) -> BinderyError {
    BinderyError::Io(std::io::Error::other(format!("archive task failed: {err}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_zip(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.join(name);
        let mut writer = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        for (entry, bytes) in files {
            writer.start_file(*entry, SimpleFileOptions::default()).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    fn runner(output: Option<PathBuf>, jobs: usize) -> BatchRunner {
        BatchRunner::new(
            BinderyConfig::default(),
            output,
            false,
            NonZeroUsize::new(jobs).unwrap(),
        )
    }

    #[tokio::test]
    async fn outcomes_keep_input_order() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let first = write_zip(input.path(), "first.zip", &[("p1.jpg", b"1"), ("p2.jpg", b"2")]);
        let broken = write_zip(input.path(), "broken.zip", &[("readme.txt", b"no images")]);
        let last = write_zip(input.path(), "last.zip", &[("a.png", b"a")]);

        let outcomes = runner(Some(output.path().to_path_buf()), 3)
            .run(vec![first.clone(), broken.clone(), last.clone()])
            .await;

        let archives: Vec<_> = outcomes.iter().map(|o| o.archive.clone()).collect();
        assert_eq!(archives, [first, broken, last]);

        assert_eq!(outcomes[0].result.as_ref().unwrap().pages, 2);
        assert!(matches!(outcomes[1].result, Err(BinderyError::NoImages)));
        assert!(outcomes[2].is_success());
        assert_eq!(outcomes[0].status(), "done");
        assert_eq!(outcomes[1].status(), "rejected");
        assert!(output.path().join("first").is_dir());
        assert!(!output.path().join("broken").exists());
    }

    #[tokio::test]
    async fn output_defaults_to_archive_directory() {
        let input = tempfile::tempdir().unwrap();
        let archive = write_zip(input.path(), "scans.zip", &[("001.jpg", b"x")]);

        let outcomes = runner(None, 1).run(vec![archive]).await;
        let staged = outcomes[0].result.as_ref().unwrap();
        assert_eq!(staged.dir, input.path().join("scans"));
        assert!(staged.dir.join("0001-001.jpg").is_file());
    }

    #[tokio::test]
    async fn second_run_without_overwrite_fails() {
        let input = tempfile::tempdir().unwrap();
        let archive = write_zip(input.path(), "book.zip", &[("a.jpg", b"a")]);

        let runner = runner(None, 1);
        assert!(runner.run(vec![archive.clone()]).await[0].is_success());
        let again = runner.run(vec![archive]).await;
        assert!(matches!(
            again[0].result,
            Err(BinderyError::OutputExists { .. })
        ));
        assert_eq!(again[0].status(), "failed");
    }

    #[test]
    fn bare_file_name_writes_next_to_cwd() {
        let job = runner(None, 1).job;
        assert_eq!(job.output_root(Path::new("book.zip")), PathBuf::from("."));
        assert_eq!(
            job.output_root(Path::new("in/book.zip")),
            PathBuf::from("in")
        );
    }
}
