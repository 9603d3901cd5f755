use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::article::{normalize, ArticleRecord};
use crate::config::FeedSource;
use crate::feed::{FeedFetcher, FetchError};
use crate::storage::DocumentStore;

use super::sink::{UpsertSink, WriteOutcome};

/// Outcome of processing one feed whose fetch succeeded.
#[derive(Debug)]
pub struct FeedReport {
    pub label: String,
    /// Items the feed returned.
    pub items: usize,
    /// One entry per item, in completion order (not feed order).
    pub outcomes: Vec<WriteOutcome>,
}

impl FeedReport {
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, WriteOutcome::Written { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }
}

/// Result of a single feed within a run.
#[derive(Debug)]
pub struct FeedRunResult {
    pub label: String,
    pub result: Result<FeedReport, FetchError>,
}

/// Completion signal of one scheduled run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub feeds: Vec<FeedRunResult>,
}

impl RunSummary {
    pub fn written(&self) -> usize {
        self.reports().map(FeedReport::written).sum()
    }

    pub fn failed_writes(&self) -> usize {
        self.reports().map(FeedReport::failed).sum()
    }

    /// Labels of feeds whose fetch failed.
    pub fn failed_feeds(&self) -> Vec<&str> {
        self.feeds
            .iter()
            .filter(|f| f.result.is_err())
            .map(|f| f.label.as_str())
            .collect()
    }

    /// Logs the run totals, plus a warning naming any feeds that failed.
    pub fn log(&self) {
        let failed_feeds = self.failed_feeds();
        tracing::info!(
            feeds = self.feeds.len(),
            written = self.written(),
            failed_writes = self.failed_writes(),
            failed_feeds = failed_feeds.len(),
            "Run complete"
        );
        if !failed_feeds.is_empty() {
            tracing::warn!(feeds = ?failed_feeds, "Some feeds could not be fetched");
        }
    }

    fn reports(&self) -> impl Iterator<Item = &FeedReport> {
        self.feeds.iter().filter_map(|f| f.result.as_ref().ok())
    }
}

/// Fetch → normalize → upsert, for a list of feeds.
///
/// The pipeline owns the fetcher and the sink; the store inside the sink is
/// whatever the caller injected, and lives as long as the pipeline.
pub struct Pipeline<S> {
    fetcher: FeedFetcher,
    sink: UpsertSink<S>,
    write_concurrency: usize,
}

impl<S: DocumentStore> Pipeline<S> {
    pub fn new(fetcher: FeedFetcher, sink: UpsertSink<S>, write_concurrency: usize) -> Self {
        Self {
            fetcher,
            sink,
            write_concurrency: write_concurrency.max(1),
        }
    }

    pub fn sink(&self) -> &UpsertSink<S> {
        &self.sink
    }

    /// Runs immediately, then every `interval`, until `shutdown` resolves.
    ///
    /// `shutdown` is polled while waiting for the next tick and while a run
    /// is in progress; a run cut short is abandoned where it stands (writes
    /// already issued are not rolled back). Returns the number of runs that
    /// completed.
    pub async fn run_scheduled<F>(
        &self,
        feeds: &[FeedSource],
        interval: Duration,
        shutdown: F,
    ) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        // First tick completes immediately
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut completed = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = &mut shutdown => break,
            }

            tokio::select! {
                summary = self.run_once(feeds) => {
                    summary.log();
                    completed += 1;
                }
                () = &mut shutdown => {
                    tracing::warn!("Shutdown requested mid-run; remaining feeds skipped");
                    break;
                }
            }
        }

        tracing::info!(runs = completed, "Scheduler stopped");
        completed
    }

    /// Processes every feed in order and reports per-feed results.
    ///
    /// A failed fetch is logged and recorded; the run then moves on to the
    /// next feed. Nothing is retried.
    pub async fn run_once(&self, feeds: &[FeedSource]) -> RunSummary {
        let mut summary = RunSummary::default();

        for source in feeds {
            let result = self.process_feed(source).await;
            match &result {
                Ok(report) => tracing::info!(
                    source = %source.label,
                    items = report.items,
                    written = report.written(),
                    failed = report.failed(),
                    "Feed processed"
                ),
                Err(e) => tracing::error!(
                    source = %source.label,
                    feed = %source.url,
                    error = %e,
                    "Feed fetch failed"
                ),
            }
            summary.feeds.push(FeedRunResult {
                label: source.label.clone(),
                result,
            });
        }

        summary
    }

    /// Fetches one feed and upserts all of its items.
    ///
    /// Items are normalized in feed order; the writes then run concurrently
    /// (up to `write_concurrency` in flight) and may finish in any order.
    /// Every write outcome is collected; failed writes are logged and do not
    /// stop the others.
    ///
    /// # Errors
    ///
    /// Only fetch failures propagate. An empty feed is `Ok` with no outcomes.
    pub async fn process_feed(&self, source: &FeedSource) -> Result<FeedReport, FetchError> {
        let items = self.fetcher.fetch(&source.label, &source.url).await?;

        let records: Vec<ArticleRecord> = items
            .iter()
            .map(|item| normalize(item, &source.label))
            .collect();

        let outcomes: Vec<WriteOutcome> = stream::iter(records.iter())
            .map(|record| self.sink.upsert(Some(record)))
            .buffer_unordered(self.write_concurrency)
            .collect()
            .await;

        for outcome in &outcomes {
            if let WriteOutcome::Failed { key, error } = outcome {
                tracing::error!(
                    source = %source.label,
                    key = key.as_deref().unwrap_or(""),
                    error = %error,
                    "Article write failed"
                );
            }
        }

        Ok(FeedReport {
            label: source.label.clone(),
            items: items.len(),
            outcomes,
        })
    }
}
