//! # Harvester
//!
//! Scans many sources concurrently and streams one formatted report per
//! source.
//!
//! ```text
//! +-----------------------------+
//! |          User Code          |
//! |  add_target / add_targets   |
//! +--------------+--------------+
//!                |
//!                v
//! +-----------------------------+        +---------------------------+
//! |   Harvester (pending queue) |  run   |  one task per target      |
//! |   options, formatter, token +------->|  bounded by a Semaphore    |
//! +-----------------------------+        |  of `batch_size` permits  |
//!                                        +-------------+-------------+
//!                                                      | mpsc
//!                                                      v
//!                                        +---------------------------+
//!                                        |  ReportStream<F::Output>  |
//!                                        +---------------------------+
//! ```
//!
//! - Reports arrive in completion order; each carries its source label.
//! - An unreadable source still yields a report, with `failure` set.
//! - [`Harvester::cancel`] / [`ReportStream::cancel`] stop new targets from
//!   starting. Targets already running are allowed to finish.
//! - The stream ends once every started target has reported.
//!
//! ## Example
//!
//! ```rust,no_run
//! use v6scout::harvester::{HarvestOptions, Harvester, Target};
//! use v6scout::report::StructuredFormatter;
//!
//! #[tokio::main]
//! async fn main() {
//!     let harvester = Harvester::<StructuredFormatter>::new().with_options(HarvestOptions {
//!         batch_size: 4,
//!         timeout_ms: 5_000,
//!         dedup: true,
//!     });
//!
//!     harvester.add_targets(vec![
//!         Target::Url("example.com".to_string()),
//!         Target::File("access.log".into()),
//!         Target::Text {
//!             label: "inline".to_string(),
//!             body: "gw fe80::1%eth0".to_string(),
//!         },
//!     ]);
//!
//!     let mut reports = harvester.run();
//!     while let Some(report) = reports.next().await {
//!         println!("{}: {:?}", report.source, report.canonical);
//!     }
//! }
//! ```
use std::{
    collections::VecDeque,
    fmt::Debug,
    path::PathBuf,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use parking_lot::Mutex;
use tokio::sync::{Semaphore, mpsc};
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    report::{ReportFormatter, ScanReport},
    sources::{AsyncTextSource, FetchOptions, FileSource, InlineText, SourceError, UrlSource},
};

/// Something to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Text already in memory, reported under `label`.
    Text { label: String, body: String },
    /// A file, decoded with the default encoding order.
    File(PathBuf),
    /// A page URL; `http://` is assumed when no scheme is given.
    Url(String),
}

impl Target {
    /// The label used when the target cannot even be turned into a source.
    pub fn label(&self) -> String {
        match self {
            Target::Text { label, .. } => label.clone(),
            Target::File(path) => path.display().to_string(),
            Target::Url(url) => url.clone(),
        }
    }

    fn into_source(self, options: &HarvestOptions) -> Result<Box<dyn AsyncTextSource>, SourceError> {
        let source: Box<dyn AsyncTextSource> = match self {
            Target::Text { label, body } => Box::new(InlineText { label, body }),
            Target::File(path) => Box::new(FileSource::new(path)),
            Target::Url(url) => Box::new(UrlSource::new(&url)?.with_options(FetchOptions {
                timeout_ms: options.timeout_ms,
                ..FetchOptions::default()
            })),
        };
        Ok(source)
    }
}

/// Runtime configuration for a harvest.
///
/// # Fields
/// - `batch_size`: maximum number of targets scanned at the same time
/// - `timeout_ms`: timeout applied to each URL fetch
/// - `dedup`: drop repeated literals within each report
///
/// # Defaults
/// ```rust,ignore
/// HarvestOptions {
///     batch_size: 16,
///     timeout_ms: 10_000,
///     dedup: false,
/// }
/// ```
#[derive(Clone, Debug)]
pub struct HarvestOptions {
    pub batch_size: usize,
    pub timeout_ms: u64,
    pub dedup: bool,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            batch_size: 16,
            timeout_ms: 10_000,
            dedup: false,
        }
    }
}

/// Thread-safe queue of targets waiting for [`Harvester::run`].
type TargetPool = Arc<Mutex<VecDeque<Target>>>;

/// Batch scanner over a queue of [`Target`]s.
///
/// # Type Parameters
/// - `F`: the [`ReportFormatter`] applied to every report before it is streamed.
pub struct Harvester<F>
where
    F: ReportFormatter,
{
    pub options: HarvestOptions,
    pending: TargetPool,
    pub formatter: Arc<F>,
    cancellation_token: CancellationToken,
}

impl<F> Harvester<F>
where
    F: ReportFormatter + Default,
{
    /// Creates a harvester with default options and formatter.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_formatter(F::default())
    }
}

impl<F> Harvester<F>
where
    F: ReportFormatter,
{
    pub fn with_formatter(formatter: F) -> Self {
        Self {
            options: HarvestOptions::default(),
            pending: Arc::new(Mutex::new(VecDeque::new())),
            formatter: Arc::new(formatter),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Sets custom configuration of the [`Harvester`].
    pub fn with_options(mut self, options: HarvestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn add_target(&self, target: Target) {
        self.pending.lock().push_back(target);
    }

    pub fn add_targets(&self, targets: Vec<Target>) {
        self.pending.lock().extend(targets);
    }

    /// Number of targets queued and not yet started.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Prevents any target that has not started from running.
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Starts scanning every queued target and returns the report stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(self) -> ReportStream<F::Output> {
        let targets: Vec<Target> = self.pending.lock().drain(..).collect();
        let batch_size = self.options.batch_size.max(1);

        let (tx, rx) = mpsc::channel(batch_size);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let token = self.cancellation_token.clone();
        let options = Arc::new(self.options);
        let formatter = self.formatter;

        debug!(targets = targets.len(), batch_size, "starting harvest");

        tokio::spawn(async move {
            for target in targets {
                if token.is_cancelled() {
                    debug!("harvest cancelled, skipping remaining targets");
                    break;
                }

                let permit = tokio::select! {
                    _ = token.cancelled() => break,
                    permit = semaphore.clone().acquire_owned() => match permit {
                        Ok(p) => p,
                        Err(_) => break,
                    },
                };

                let tx = tx.clone();
                let options = options.clone();
                let formatter = formatter.clone();

                tokio::spawn(async move {
                    let report = harvest(target, &options).await;
                    tx.send(formatter.format(&report)).await.ok();
                    drop(permit);
                });
            }
        });

        ReportStream {
            inner: ReceiverStream::new(rx),
            cancellation_token: self.cancellation_token,
        }
    }
}

async fn harvest(target: Target, options: &HarvestOptions) -> ScanReport {
    let label = target.label();
    let source = match target.into_source(options) {
        Ok(source) => source,
        Err(e) => {
            warn!(source = %label, error = %e, "invalid target");
            return ScanReport::failed(label, e);
        }
    };

    let label = source.describe();
    let report = match source.read_text().await {
        Ok(text) => ScanReport::from_text(label, &text),
        Err(e) => {
            warn!(source = %label, error = %e, "source unreadable");
            ScanReport::failed(label, e)
        }
    };

    if options.dedup {
        report.deduplicated()
    } else {
        report
    }
}

/// Stream of formatted reports returned by [`Harvester::run`].
///
/// # Methods
/// - [`next`](Self::next): receive the next report
/// - [`cancel`](Self::cancel): stop targets that have not started yet
pub struct ReportStream<T> {
    inner: ReceiverStream<T>,
    cancellation_token: CancellationToken,
}

impl<T: Send + 'static> ReportStream<T> {
    pub async fn next(&mut self) -> Option<T> {
        self.inner.next().await
    }

    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Waits for every report.
    pub async fn collect_all(mut self) -> Vec<T> {
        let mut reports = Vec::new();
        while let Some(report) = self.next().await {
            reports.push(report);
        }
        reports
    }
}

impl<T> Stream for ReportStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl<T> Debug for ReportStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportStream")
            .field("cancelled", &self.cancellation_token.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{JsonFormatter, RawFormatter, StructuredFormatter};
    use std::io::Write;

    fn text(label: &str, body: &str) -> Target {
        Target::Text {
            label: label.to_string(),
            body: body.to_string(),
        }
    }

    fn report_for<'a>(reports: &'a [ScanReport], source: &str) -> &'a ScanReport {
        reports.iter().find(|r| r.source == source).unwrap()
    }

    #[test]
    fn test_build_harvester_default_and_custom_options() {
        let harvester = Harvester::<JsonFormatter>::new();
        let harvester_custom = Harvester::<JsonFormatter>::new().with_options(HarvestOptions {
            batch_size: 2,
            timeout_ms: 2_000,
            dedup: true,
        });

        assert_eq!(harvester.options.batch_size, 16);
        assert_eq!(harvester.options.timeout_ms, 10_000);
        assert!(!harvester.options.dedup);
        assert_eq!(harvester_custom.options.batch_size, 2);
        assert_eq!(harvester_custom.options.timeout_ms, 2_000);
        assert!(harvester_custom.options.dedup);
    }

    #[test]
    fn test_harvester_add_targets() {
        let harvester = Harvester::<RawFormatter>::new();
        harvester.add_target(text("a", "::1"));
        harvester.add_targets(vec![
            Target::File(PathBuf::from("log.txt")),
            Target::Url("example.com".to_string()),
        ]);
        assert_eq!(harvester.pending(), 3);
    }

    #[test]
    fn test_target_labels() {
        assert_eq!(text("paste", "").label(), "paste");
        assert_eq!(Target::File(PathBuf::from("a/b.txt")).label(), "a/b.txt");
        assert_eq!(Target::Url("example.com".to_string()).label(), "example.com");
    }

    #[tokio::test]
    async fn test_harvest_mixed_targets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "upstream 2001:db8:0:0:0:0:0:2a").unwrap();
        file.flush().unwrap();
        let file_label = file.path().display().to_string();

        let harvester = Harvester::<StructuredFormatter>::new();
        harvester.add_targets(vec![
            text("a-text", "x 2001:db8::1 y fe80::1%eth0 z 2001:db8:::1"),
            Target::File(file.path().to_path_buf()),
            Target::Url("ftp://example.com".to_string()),
        ]);

        let reports = harvester.run().collect_all().await;
        assert_eq!(reports.len(), 3);

        let text_report = report_for(&reports, "a-text");
        assert_eq!(text_report.addresses, vec!["2001:db8::1", "fe80::1%eth0"]);

        let file_report = report_for(&reports, &file_label);
        assert_eq!(file_report.canonical, vec!["2001:db8::2a"]);
        assert_eq!(file_report.failure, None);

        let url_report = report_for(&reports, "ftp://example.com");
        assert!(url_report.is_empty());
        assert!(url_report.failure.is_some());
    }

    #[tokio::test]
    async fn test_harvest_missing_file_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.log");

        let harvester = Harvester::<StructuredFormatter>::new();
        harvester.add_target(Target::File(path));

        let reports = harvester.run().collect_all().await;
        assert_eq!(reports.len(), 1);
        assert!(reports[0].failure.as_deref().unwrap().starts_with("file not found"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_harvest_batch_of_one_with_dedup() {
        let harvester = Harvester::<RawFormatter>::new().with_options(HarvestOptions {
            batch_size: 1,
            dedup: true,
            ..HarvestOptions::default()
        });
        for i in 0..10 {
            harvester.add_target(text(&format!("t{}", i), "::1 ::1 fe80::1"));
        }

        let mut reports = harvester.run();
        let mut count = 0;
        while let Some(raw) = reports.next().await {
            assert_eq!(raw, "::1\nfe80::1");
            count += 1;
        }
        assert_eq!(count, 10);
    }

    #[tokio::test]
    async fn test_harvest_cancelled_before_run() {
        let harvester = Harvester::<StructuredFormatter>::new();
        harvester.add_targets(vec![text("a", "::1"), text("b", "::2")]);
        harvester.cancel();

        let reports = harvester.run().collect_all().await;
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_harvest_json_stream() {
        let harvester = Harvester::<JsonFormatter>::new();
        harvester.add_target(text("j", "::FFFF:192.0.2.128"));

        let mut reports = harvester.run();
        let json = reports.next().await.unwrap();
        assert_eq!(
            json,
            r#"{"source":"j","addresses":["::FFFF:192.0.2.128"],"canonical":["::ffff:c000:280"]}"#
        );
        assert!(reports.next().await.is_none());
    }
}
