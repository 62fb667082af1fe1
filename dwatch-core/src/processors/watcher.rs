//! Watcher processor.
//!
//! The Watcher owns the watermark and drives the pipeline:
//! fetch → group → classify → format → send.
//!
//! It starts in `Bootstrapping`, where the most recent activity seeds the
//! watermark without sending anything, then stays in `Polling` until
//! shutdown. Groups within a cycle are handled one at a time, oldest first,
//! so notifications reach the webhook in on-chain order.

use std::sync::Arc;

use dwatch_sdk::objects::OperationRecord;
use itertools::Itertools;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::activity_source::{ActivitySource, FetchError};
use super::error_reporter::ErrorReporter;
use super::notification_sender::{NotificationSender, NotificationSink};
use crate::classifier::{Classification, Classifier};
use crate::config::WatcherConfig;
use crate::formatters::{FormatContext, format_notification};
use crate::grouping::{OperationGroup, group_by_counter};
use crate::utils::backoff::backoff_delay;
use crate::utils::sleeper::Sleeper;
use crate::watermark::Watermark;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Bootstrapping,
    Polling(Watermark),
}

/// What happened to each group of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub records: usize,
    pub groups: usize,
    pub delivered: usize,
    pub unknown: usize,
    pub malformed: usize,
    pub dropped: usize,
}

/// Result of one [`Watcher::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Bootstrapping finished; polling starts from this watermark.
    Seeded { watermark: i64 },
    /// Nothing new; slept the idle interval.
    Idle,
    /// A batch was processed.
    Processed(CycleReport),
    /// The fetch failed; slept the backoff delay.
    FetchFailed,
}

pub struct Watcher<S: ActivitySource, K: NotificationSink> {
    source: S,
    sender: NotificationSender<K>,
    classifier: Classifier,
    config: WatcherConfig,
    reporter: ErrorReporter,
    sleeper: Arc<dyn Sleeper>,
    state: WatcherState,
    fetch_failures: u32,
}

impl<S: ActivitySource, K: NotificationSink> Watcher<S, K> {
    /// Create a new Watcher in the `Bootstrapping` state.
    ///
    /// # Arguments
    ///
    /// * `source` - Where operation records are fetched from
    /// * `sink` - Where notifications are delivered
    /// * `config` - Contract, timing, and message style
    /// * `reporter` - Receives fetch, format, and delivery failures
    /// * `sleeper` - Clock used for every pause
    pub fn new(
        source: S,
        sink: K,
        config: WatcherConfig,
        reporter: ErrorReporter,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let sender = NotificationSender::new(sink, sleeper.clone(), config.polling.send_delay);
        Self {
            source,
            sender,
            classifier: Classifier::default(),
            config,
            reporter,
            sleeper,
            state: WatcherState::Bootstrapping,
            fetch_failures: 0,
        }
    }

    /// Replace the default classification rules.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Current watermark in milliseconds, once bootstrapped.
    pub fn watermark(&self) -> Option<i64> {
        match self.state {
            WatcherState::Bootstrapping => None,
            WatcherState::Polling(watermark) => Some(watermark.millis()),
        }
    }

    /// Run until the shutdown signal fires.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(contract = %self.config.contract, "Watcher started");

        loop {
            if *shutdown_rx.borrow() {
                info!("Watcher received shutdown signal");
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Watcher received shutdown signal");
                        break;
                    }
                }

                outcome = self.step() => {
                    debug!(outcome = ?outcome, "Cycle finished");
                }
            }
        }

        info!("Watcher shutdown complete");
    }

    /// One iteration of the state machine, including any pause it ends with.
    pub async fn step(&mut self) -> CycleOutcome {
        match self.state {
            WatcherState::Bootstrapping => self.bootstrap().await,
            WatcherState::Polling(watermark) => self.poll(watermark).await,
        }
    }

    /// Process the entire history once, oldest first.
    pub async fn backfill(&mut self) -> Result<CycleReport, FetchError> {
        let records = self.source.fetch_all_history().await?;
        info!(records = records.len(), "Backfilling contract history");
        Ok(self.process_batch(records).await)
    }

    async fn bootstrap(&mut self) -> CycleOutcome {
        let records = match self.source.fetch_activity_since(None).await {
            Ok(records) => records,
            Err(e) => return self.fetch_failed(e).await,
        };
        self.fetch_failures = 0;

        let Some(newest) = newest_timestamp(&records) else {
            info!(
                idle_secs = self.config.polling.idle_interval.as_secs(),
                "No contract activity to seed from, waiting"
            );
            self.sleeper.sleep(self.config.polling.idle_interval).await;
            return CycleOutcome::Idle;
        };

        let watermark = Watermark::new(newest, self.config.polling.boundary_offset_ms);
        self.state = WatcherState::Polling(watermark);
        info!(watermark = newest, "Seeded watermark, polling for new activity");
        CycleOutcome::Seeded { watermark: newest }
    }

    async fn poll(&mut self, mut watermark: Watermark) -> CycleOutcome {
        let search_from = watermark.search_from();
        debug!(search_from, "Polling for new activity");

        let records = match self.source.fetch_activity_since(Some(search_from)).await {
            Ok(records) => records,
            Err(e) => return self.fetch_failed(e).await,
        };
        self.fetch_failures = 0;

        if records.is_empty() {
            debug!("No new activity, looping");
            self.sleeper.sleep(self.config.polling.idle_interval).await;
            return CycleOutcome::Idle;
        }

        let newest = newest_timestamp(&records);
        let report = self.process_batch(records).await;

        match newest {
            Some(newest) => {
                watermark.advance(newest);
            }
            None => warn!("No parseable timestamp in batch, watermark unchanged"),
        }
        self.state = WatcherState::Polling(watermark);

        info!(
            records = report.records,
            groups = report.groups,
            delivered = report.delivered,
            watermark = watermark.millis(),
            "Processed new activity"
        );
        CycleOutcome::Processed(report)
    }

    async fn fetch_failed(&mut self, e: FetchError) -> CycleOutcome {
        let delay = backoff_delay(self.fetch_failures);
        self.fetch_failures = self.fetch_failures.saturating_add(1);
        warn!(
            error = %e,
            failures = self.fetch_failures,
            retry_in_secs = delay.as_secs(),
            "Fetch failed"
        );
        self.reporter.report("fetch", &e).await;
        self.sleeper.sleep(delay).await;
        CycleOutcome::FetchFailed
    }

    /// Group, classify, format, and send every record in `records`, which
    /// arrive newest first as the indexer returns them.
    ///
    /// Groups go out oldest first. Groups sharing a timestamp keep their
    /// reversed fetch position, and groups without a parseable timestamp go
    /// last.
    async fn process_batch(&mut self, records: Vec<OperationRecord>) -> CycleReport {
        let mut report = CycleReport {
            records: records.len(),
            ..Default::default()
        };

        let groups: Vec<OperationGroup> = group_by_counter(records)
            .into_iter()
            .rev()
            .sorted_by_key(|group| group.earliest_timestamp_millis().unwrap_or(i64::MAX))
            .collect();
        report.groups = groups.len();

        for group in &groups {
            self.process_group(group, &mut report).await;
        }

        report
    }

    async fn process_group(&self, group: &OperationGroup, report: &mut CycleReport) {
        let counter = group.counter();

        let kind = match self.classifier.classify(group) {
            Classification::Known(kind) => kind,
            Classification::Unknown(entrypoints) => {
                info!(counter, entrypoints = ?entrypoints, "Unknown operation, skipping");
                report.unknown += 1;
                return;
            }
        };

        let ctx = FormatContext {
            network: &self.config.contract.network,
            style: &self.config.style,
        };
        let payload = match format_notification(kind, group, &ctx) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(counter, kind = %kind, error = %e, "Malformed operation group, skipping");
                self.reporter.report("format", &e).await;
                report.malformed += 1;
                return;
            }
        };

        match self
            .sender
            .send_with_retry(&payload, self.config.polling.delivery_retries)
            .await
        {
            Ok(()) => {
                info!(counter, kind = %kind, "Notification delivered");
                report.delivered += 1;
            }
            Err(e) => {
                error!(counter, kind = %kind, error = %e, "Dropping notification");
                self.reporter.report("delivery", &e).await;
                report.dropped += 1;
            }
        }
    }
}

fn newest_timestamp(records: &[OperationRecord]) -> Option<i64> {
    records
        .iter()
        .filter_map(|r| match r.timestamp_millis() {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(counter = r.counter, error = %e, "Skipping unparseable timestamp");
                None
            }
        })
        .max()
}
