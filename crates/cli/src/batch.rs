use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use tagtext_core::RenderOptions;
use tagtext_engine::{RenderPipeline, TagRegistry};

/// Where the HTML for one input goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Keep the HTML in the result for the caller to print.
    Stdout,
    /// Write the HTML to this file.
    File(PathBuf),
}

/// One file to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Source document.
    pub input: PathBuf,
    /// Output target.
    pub destination: Destination,
}

impl RenderJob {
    /// Job writing `<stem>.html` into `out_dir`, or next to the input when
    /// no directory is given.
    pub fn to_file(input: impl Into<PathBuf>, out_dir: Option<&Path>) -> Self {
        let input = input.into();
        let output = match out_dir {
            Some(dir) => {
                let stem = input.file_stem().unwrap_or(input.as_os_str());
                dir.join(format!("{}.html", stem.to_string_lossy()))
            }
            None => input.with_extension("html"),
        };
        Self {
            input,
            destination: Destination::File(output),
        }
    }

    /// Job printing to stdout.
    pub fn to_stdout(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            destination: Destination::Stdout,
        }
    }
}

/// Options shared by every job in a batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to number of CPU cores.
    pub max_threads: Option<usize>,
    /// Stop at the first failing file instead of rendering everything.
    pub fail_fast: bool,
    /// Render options applied to every file.
    pub render: RenderOptions,
}

/// Result for a single file in a batch.
#[derive(Debug, Clone)]
pub struct FileResult {
    /// The job this result belongs to.
    pub job: RenderJob,
    /// Rendered HTML for stdout jobs.
    pub html: Option<String>,
    /// Number of tags left as literal text.
    pub diagnostics: usize,
    /// Error message when rendering failed.
    pub error: Option<String>,
}

/// Statistics about batch processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStats {
    /// Number of jobs submitted.
    pub total: usize,
    /// Number of files rendered.
    pub succeeded: usize,
    /// Number of files that failed.
    pub failed: usize,
    /// Wall time in milliseconds.
    pub processing_time_ms: f64,
}

/// Results of a batch in submission order, plus statistics.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Per-file results. With `fail_fast`, files after the first failure are absent.
    pub results: Vec<FileResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

impl BatchReport {
    /// Results that carry an error.
    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter(|r| r.error.is_some())
    }
}

/// Render every job, one pipeline per file, in parallel.
pub fn render_batch(
    jobs: Vec<RenderJob>,
    registry: Arc<TagRegistry>,
    options: BatchOptions,
) -> BatchReport {
    let start = Instant::now();

    // Configure thread pool if max_threads is specified
    let pool = options.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| log::warn!("falling back to the global thread pool: {}", err))
            .ok()
    });

    let total = jobs.len();
    let succeeded = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let clashes = shared_outputs(&jobs);

    let process_job = |job: RenderJob| -> FileResult {
        let rendered = match &job.destination {
            Destination::File(output) if clashes.contains(output) => Err(anyhow::anyhow!(
                "{} is also the output of another input; not writing {}",
                output.display(),
                job.input.display()
            )),
            _ => render_file(&job, &registry, options.render),
        };
        match rendered {
            Ok((html, diagnostics)) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                FileResult {
                    job,
                    html,
                    diagnostics,
                    error: None,
                }
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::Relaxed);
                FileResult {
                    job,
                    html: None,
                    diagnostics: 0,
                    error: Some(format!("{:#}", err)),
                }
            }
        }
    };

    let results: Vec<FileResult> = if !options.fail_fast {
        match &pool {
            Some(pool) => pool.install(|| jobs.into_par_iter().map(process_job).collect()),
            None => jobs.into_par_iter().map(process_job).collect(),
        }
    } else {
        // Stop on first error, in submission order
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            let result = process_job(job);
            let stop = result.error.is_some();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    };

    let elapsed = start.elapsed();

    BatchReport {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: elapsed.as_secs_f64() * 1000.0,
        },
    }
}

/// Output files that more than one job would write.
fn shared_outputs(jobs: &[RenderJob]) -> HashSet<PathBuf> {
    let mut writers: HashMap<&Path, usize> = HashMap::new();
    for job in jobs {
        if let Destination::File(output) = &job.destination {
            *writers.entry(output.as_path()).or_default() += 1;
        }
    }
    writers
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(output, _)| output.to_path_buf())
        .collect()
}

/// Render one file; returns the HTML for stdout jobs and the diagnostic count.
fn render_file(
    job: &RenderJob,
    registry: &Arc<TagRegistry>,
    options: RenderOptions,
) -> Result<(Option<String>, usize)> {
    let input = &job.input;
    let pipeline = RenderPipeline::open(input, options)
        .with_context(|| format!("Failed to read {}", input.display()))?
        .with_registry(Arc::clone(registry));
    let rendered = pipeline
        .render()
        .with_context(|| format!("Failed to render {}", input.display()))?;

    for diagnostic in rendered.diagnostics.iter() {
        log::debug!("{}", diagnostic);
    }
    let diagnostics = rendered.diagnostics.len();

    match &job.destination {
        Destination::Stdout => Ok((Some(rendered.html), diagnostics)),
        Destination::File(output) => {
            if output == input {
                bail!("Refusing to overwrite input {}", input.display());
            }
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(output, rendered.html)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            Ok((None, diagnostics))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<TagRegistry> {
        Arc::new(TagRegistry::new())
    }

    #[test]
    fn output_paths() {
        let job = RenderJob::to_file("docs/page.md", None);
        assert_eq!(job.destination, Destination::File(PathBuf::from("docs/page.html")));

        let job = RenderJob::to_file("docs/page.md", Some(Path::new("out")));
        assert_eq!(job.destination, Destination::File(PathBuf::from("out/page.html")));

        let job = RenderJob::to_file("notes.v2.txt", Some(Path::new("out")));
        assert_eq!(job.destination, Destination::File(PathBuf::from("out/notes.v2.html")));
    }

    #[test]
    fn renders_files_in_parallel_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let jobs: Vec<RenderJob> = (0..8)
            .map(|i| {
                let path = dir.path().join(format!("doc{i}.md"));
                fs::write(&path, format!("(twitter: user{i})")).unwrap();
                RenderJob::to_stdout(path)
            })
            .collect();

        let report = render_batch(
            jobs,
            registry(),
            BatchOptions {
                max_threads: Some(2),
                render: RenderOptions::plain(),
                ..Default::default()
            },
        );

        assert_eq!(report.stats.total, 8);
        assert_eq!(report.stats.succeeded, 8);
        assert_eq!(report.stats.failed, 0);
        for (i, result) in report.results.iter().enumerate() {
            let html = result.html.as_deref().unwrap();
            assert!(html.contains(&format!("twitter.com/user{i}")), "{html}");
        }
    }

    #[test]
    fn writes_output_files_with_frontmatter_page() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("post.md");
        fs::write(&input, "---\nurl: /blog/post\n---\n(file: slides.pdf)").unwrap();
        let out_dir = dir.path().join("site");

        let report = render_batch(
            vec![RenderJob::to_file(&input, Some(out_dir.as_path()))],
            registry(),
            BatchOptions {
                render: RenderOptions::plain(),
                ..Default::default()
            },
        );

        assert_eq!(report.stats.succeeded, 1);
        let html = fs::read_to_string(out_dir.join("post.html")).unwrap();
        assert_eq!(html, r#"<a href="/blog/post/slides.pdf">slides.pdf</a>"#);
    }

    #[test]
    fn failures_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.md");
        fs::write(&good, "ok").unwrap();

        let jobs = vec![
            RenderJob::to_stdout(dir.path().join("missing.md")),
            RenderJob::to_stdout(&good),
        ];
        let report = render_batch(jobs, registry(), BatchOptions::default());
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.stats.succeeded, 1);
        assert_eq!(report.results.len(), 2);
        let failure = report.failures().next().unwrap();
        assert!(failure.error.as_deref().unwrap().contains("Failed to read"));
    }

    #[test]
    fn fail_fast_stops_at_first_error() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.md");
        fs::write(&good, "ok").unwrap();

        let jobs = vec![
            RenderJob::to_stdout(dir.path().join("missing.md")),
            RenderJob::to_stdout(&good),
        ];
        let report = render_batch(
            jobs,
            registry(),
            BatchOptions {
                fail_fast: true,
                ..Default::default()
            },
        );
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.stats.succeeded, 0);
    }

    #[test]
    fn same_stem_inputs_do_not_share_an_output() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("site");
        let mut jobs = Vec::new();
        for (sub, body) in [("a", "AAA"), ("b", "BBB")] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            let input = dir.path().join(sub).join("x.md");
            fs::write(&input, body).unwrap();
            jobs.push(RenderJob::to_file(input, Some(out_dir.as_path())));
        }
        let other = dir.path().join("y.md");
        fs::write(&other, "YYY").unwrap();
        jobs.push(RenderJob::to_file(&other, Some(out_dir.as_path())));

        let report = render_batch(
            jobs,
            registry(),
            BatchOptions {
                render: RenderOptions::plain(),
                ..Default::default()
            },
        );

        assert_eq!(report.stats.failed, 2);
        assert_eq!(report.stats.succeeded, 1);
        assert!(!out_dir.join("x.html").exists());
        assert_eq!(fs::read_to_string(out_dir.join("y.html")).unwrap(), "YYY");
        for failure in report.failures() {
            assert!(failure.error.as_deref().unwrap().contains("another input"));
        }
    }

    #[test]
    fn refuses_to_overwrite_html_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.html");
        fs::write(&input, "<p>x</p>").unwrap();

        let report = render_batch(
            vec![RenderJob::to_file(&input, None)],
            registry(),
            BatchOptions::default(),
        );
        assert_eq!(report.stats.failed, 1);
        assert_eq!(fs::read_to_string(&input).unwrap(), "<p>x</p>");
    }
}
