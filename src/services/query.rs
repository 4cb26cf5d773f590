//! Query engine.
//!
//! Answers point-date, date-range and free-text queries by routing each
//! date to the partition authoritative for it, fetching the needed
//! partitions concurrently, and merging the results in a deterministic
//! order.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use futures::stream::{self, StreamExt, TryStreamExt};

use super::aggregate;
use super::index::IndexService;
use super::loader::PartitionLoader;
use super::order;
use super::recency::{Recency, RecencyClassifier};
use crate::error::{AppError, Result};
use crate::models::{Config, Event, PartitionIndex, Period, Platform, PlatformSnapshot, QueryConfig};
use crate::storage::{EventSource, source_from_config};

/// One partition to read during a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Partition {
    Current(Platform),
    Historical(Platform, Period),
}

/// A partition and the dates it is read for.
#[derive(Debug, Clone)]
struct Job {
    partition: Partition,
    start: NaiveDate,
    end: NaiveDate,
}

pub struct QueryEngine {
    index: IndexService,
    loader: PartitionLoader,
    classifier: RecencyClassifier,
    config: QueryConfig,
    max_concurrent: usize,
}

impl QueryEngine {
    pub fn new(source: Arc<dyn EventSource>, config: &Config) -> Self {
        let ttl = config.cache.ttl();
        Self {
            index: IndexService::new(Arc::clone(&source), ttl),
            loader: PartitionLoader::new(source, ttl),
            classifier: RecencyClassifier::new(config.query.recency_window_days),
            config: config.query.clone(),
            max_concurrent: config.source.max_concurrent.max(1),
        }
    }

    /// Build an engine over the source selected by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(source_from_config(&config.source)?, config))
    }

    pub fn index(&self) -> &IndexService {
        &self.index
    }

    pub fn loader(&self) -> &PartitionLoader {
        &self.loader
    }

    pub fn classifier(&self) -> &RecencyClassifier {
        &self.classifier
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Events dated exactly `date`, most important first.
    ///
    /// Inside the recency window every platform's current snapshot is
    /// required; outside it, the archives listed for the month are read and
    /// a missing archive contributes nothing.
    pub async fn by_date(&self, date: NaiveDate, today: NaiveDate) -> Result<Vec<Event>> {
        let index = self.index.load().await?;

        let snapshots = match self.classifier.classify(date, today) {
            Recency::Current => self.load_current_all(&index).await?,
            Recency::Historical(period) => self.load_archives(&index, period).await,
        };

        let mut events: Vec<Event> = snapshots
            .into_iter()
            .flat_map(|snapshot| snapshot.events)
            .filter(|event| event.event_date == date)
            .collect();
        events.sort_by(order::importance_then_time);
        Ok(events)
    }

    /// Events dated within `[start, end]`, in date then time order.
    ///
    /// Each partition is fetched at most once. Failures of individual
    /// partitions reduce the result instead of failing the query.
    pub async fn by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Result<Vec<Event>> {
        if start > end {
            return Err(AppError::InvalidRange { start, end });
        }

        let index = self.index.load().await?;
        let jobs = self.range_jobs(&index, start, end, today);
        log::debug!(
            "Range {}..={} touches {} partitions",
            start,
            end,
            jobs.len()
        );

        let results = self.fan_out(jobs).await;
        let mut events: Vec<Event> = results
            .into_iter()
            .flat_map(|(job, snapshot)| {
                snapshot
                    .events
                    .into_iter()
                    .filter(move |event| event.event_date >= job.start && event.event_date <= job.end)
            })
            .collect();
        events.sort_by(order::date_then_time);
        Ok(events)
    }

    /// Free-text search over current snapshots and, optionally, the most
    /// recent archives of every platform.
    pub async fn search(&self, query: &str, include_historical: bool) -> Result<Vec<Event>> {
        let term = query.trim();
        let min_len = self.config.min_query_length;
        if term.chars().count() < min_len {
            return Err(AppError::InvalidQuery {
                query: query.to_string(),
                min_len,
            });
        }
        let needle = term.to_lowercase();

        let index = self.index.load().await?;
        let mut partitions: Vec<Partition> = index
            .platforms()
            .iter()
            .cloned()
            .map(Partition::Current)
            .collect();
        if include_historical {
            for platform in index.archived_platforms() {
                for period in index.recent_periods(platform, self.config.search_history_months) {
                    partitions.push(Partition::Historical(platform.clone(), period));
                }
            }
        }
        log::debug!("Searching '{}' across {} partitions", term, partitions.len());

        let jobs = partitions
            .into_iter()
            .map(|partition| Job {
                partition,
                start: NaiveDate::MIN,
                end: NaiveDate::MAX,
            })
            .collect();

        let mut seen = HashSet::new();
        let mut events: Vec<Event> = self
            .fan_out(jobs)
            .await
            .into_iter()
            .flat_map(|(_, snapshot)| snapshot.events)
            .filter(|event| event.matches(&needle))
            .filter(|event| {
                event.id.is_empty()
                    || seen.insert((event.platform.clone(), event.id.clone(), event.event_date))
            })
            .collect();
        events.sort_by(order::importance_desc);
        Ok(events)
    }

    /// Every listed platform's current snapshot, in index order.
    pub async fn current_snapshots(&self) -> Result<Vec<PlatformSnapshot>> {
        let index = self.index.load().await?;
        self.load_current_all(&index).await
    }

    /// Archives of one month for every platform that lists it.
    pub async fn load_month(&self, period: Period) -> Result<Vec<PlatformSnapshot>> {
        if !period.is_valid() {
            return Err(AppError::validation(format!("Invalid month: {}", period)));
        }
        let index = self.index.load().await?;
        Ok(self.load_archives(&index, period).await)
    }

    /// Upcoming events from `today` through the configured horizon, by day.
    pub async fn calendar(&self, today: NaiveDate) -> Result<BTreeMap<NaiveDate, Vec<Event>>> {
        let horizon = today
            .checked_add_days(Days::new(u64::from(self.config.calendar_horizon_days)))
            .unwrap_or(NaiveDate::MAX);
        let snapshots = self.current_snapshots().await?;
        Ok(aggregate::calendar_days(&snapshots, today, horizon))
    }

    pub async fn available_periods(&self) -> Result<Vec<Period>> {
        self.index.list_available_periods().await
    }

    async fn load_current_all(&self, index: &PartitionIndex) -> Result<Vec<PlatformSnapshot>> {
        stream::iter(index.platforms())
            .map(|platform| self.loader.load_current(platform))
            .buffered(self.max_concurrent)
            .try_collect()
            .await
    }

    async fn load_archives(&self, index: &PartitionIndex, period: Period) -> Vec<PlatformSnapshot> {
        let platforms: Vec<&Platform> = index
            .archived_platforms()
            .into_iter()
            .filter(|platform| index.has_period(platform, period))
            .collect();
        log::debug!("Month {} is archived by {} platforms", period, platforms.len());

        stream::iter(platforms)
            .map(|platform| self.loader.probe_historical(platform, period))
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    /// Plan the partitions a range reads: one current job per platform over
    /// the combined current span, one job per listed archive month.
    fn range_jobs(
        &self,
        index: &PartitionIndex,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Vec<Job> {
        let buckets = self.classifier.plan(start, end, today);
        let mut jobs = Vec::new();

        let current_span = buckets
            .iter()
            .filter(|bucket| bucket.recency == Recency::Current)
            .fold(None, |span: Option<(NaiveDate, NaiveDate)>, bucket| match span {
                None => Some((bucket.start, bucket.end)),
                Some((from, to)) => Some((from.min(bucket.start), to.max(bucket.end))),
            });
        if let Some((from, to)) = current_span {
            jobs.extend(index.platforms().iter().map(|platform| Job {
                partition: Partition::Current(platform.clone()),
                start: from,
                end: to,
            }));
        }

        for bucket in &buckets {
            let Recency::Historical(period) = bucket.recency else {
                continue;
            };
            for platform in index.archived_platforms() {
                if index.has_period(platform, period) {
                    jobs.push(Job {
                        partition: Partition::Historical(platform.clone(), period),
                        start: bucket.start,
                        end: bucket.end,
                    });
                }
            }
        }

        jobs
    }

    /// Read every job's partition concurrently, yielding results in job order.
    async fn fan_out(&self, jobs: Vec<Job>) -> Vec<(Job, PlatformSnapshot)> {
        stream::iter(jobs)
            .map(move |job| async move {
                let snapshot = match &job.partition {
                    Partition::Current(platform) => self.loader.probe_current(platform).await,
                    Partition::Historical(platform, period) => {
                        self.loader.probe_historical(platform, *period).await
                    }
                };
                (job, snapshot)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }
}
