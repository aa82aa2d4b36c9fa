//! Orchestration of one alignment source: fetch, sample, stream and publish.

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;

use bamstats_core::consts::UNPLACED_READS_KEY;
use bamstats_core::formats::{
    parse_coverage_dump, parse_header, parse_interval_file, select_usable_references,
};
use bamstats_core::models::{CoverageDump, Interval, ReferenceSequence};
use bamstats_core::utils::AlignmentKind;
use bamstats_sampling::RegionSampler;

use crate::backend::{
    Backend, ChunkStream, RegionRequest, StatsRequest, UrlRequest, coverage_endpoint,
    derive_index_url,
};
use crate::cancel::{CancelHandle, CancelToken, cancel_pair};
use crate::consts::{
    EVENT_ERROR, EVENT_HEADER, EVENT_READ_DEPTH, EVENT_USABLE_REFERENCES, HEADER_ENDPOINT,
    STATS_STREAM_ENDPOINT,
};
use crate::decoder::StreamDecoder;
use crate::errors::BrokerError;
use crate::hub::EventHub;
use crate::scheduler::CoalescingScheduler;
use crate::snapshot::StatSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerState {
    Idle,
    Loading,
    Streaming,
}

/// Work waiting for the next [`StatsBroker::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Refetch header, coverage and intervals, then stream.
    Reload,
    /// Resample from the loaded source and restart the stream.
    Resample,
}

impl Action {
    fn merge(pending: Option<Action>, next: Action) -> Action {
        match (pending, next) {
            (Some(Action::Reload), _) | (_, Action::Reload) => Action::Reload,
            _ => Action::Resample,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SourceParams {
    url: Option<String>,
    index_url: Option<String>,
    intervals_url: Option<String>,
}

/// Parsed state of one source, immutable until the source changes.
#[derive(Debug, Clone)]
struct LoadedSource {
    url: String,
    index_url: String,
    usable: Vec<ReferenceSequence>,
    intervals: Option<Vec<Interval>>,
}

struct Session {
    cancel: CancelHandle,
    task: JoinHandle<()>,
}

///
/// Drives sampled statistics for one alignment source.
///
/// Setters only record parameters and schedule work. The work runs on the next call
/// to [`StatsBroker::tick`], so setting several parameters back-to-back issues a
/// single fetch batch. At most one statistics stream is open at a time: starting a new
/// one cancels the previous one first.
///
pub struct StatsBroker<B: Backend> {
    backend: Arc<B>,
    hub: EventHub,
    scheduler: CoalescingScheduler<Action>,
    sampler: RegionSampler,
    params: SourceParams,
    size_multiplier: u32,
    state: BrokerState,
    loaded: Option<LoadedSource>,
    session: Option<Session>,
    fetch_batches: usize,
}

impl<B: Backend> StatsBroker<B> {
    pub fn new(backend: B) -> Self {
        Self::with_sampler(backend, RegionSampler::new())
    }

    pub fn with_sampler(backend: B, sampler: RegionSampler) -> Self {
        StatsBroker {
            backend: Arc::new(backend),
            hub: EventHub::new(),
            scheduler: CoalescingScheduler::new(),
            sampler,
            params: SourceParams::default(),
            size_multiplier: 1,
            state: BrokerState::Idle,
            loaded: None,
            session: None,
            fetch_batches: 0,
        }
    }

    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    pub fn state(&self) -> BrokerState {
        self.state
    }

    /// Number of header/coverage fetch batches issued so far.
    pub fn fetch_batches(&self) -> usize {
        self.fetch_batches
    }

    pub fn size_multiplier(&self) -> u32 {
        self.size_multiplier
    }

    ///
    /// Set the alignment file to analyze. Clears any explicit index URL, so set
    /// that afterwards if the index does not sit next to the alignment file.
    ///
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.params.url = Some(url.into());
        self.params.index_url = None;
        self.size_multiplier = 1;
        self.schedule(Action::Reload);
    }

    pub fn set_index_url(&mut self, index_url: impl Into<String>) {
        self.params.index_url = Some(index_url.into());
        self.schedule(Action::Reload);
    }

    /// Restrict sampling to the intervals of a BED-like file, or lift the restriction.
    pub fn set_intervals_url(&mut self, intervals_url: Option<String>) {
        self.params.intervals_url = intervals_url;
        self.size_multiplier = 1;
        self.schedule(Action::Reload);
    }

    /// Grow the sample: wider and more windows on the next stream.
    pub fn sample_more(&mut self) {
        self.size_multiplier += 1;
        self.schedule(Action::Resample);
    }

    fn schedule(&mut self, action: Action) {
        self.scheduler
            .schedule_with(|pending| Action::merge(pending, action));
    }

    pub fn has_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    ///
    /// Run the pending action, if any. This is the broker's scheduling quantum.
    ///
    /// Failures are published under the `error` event and returned. The broker then
    /// settles in `Streaming` if a stream is still open, `Idle` otherwise. Nothing is retried.
    ///
    pub async fn tick(&mut self) -> Result<(), BrokerError> {
        let Some(action) = self.scheduler.take() else {
            return Ok(());
        };

        let result = self.run(action).await;
        if let Err(err) = &result {
            warn!("{}", err);
            self.state = match self.session {
                Some(_) => BrokerState::Streaming,
                None => BrokerState::Idle,
            };
            self.hub.publish(EVENT_ERROR, json!(err.to_string()));
        }
        result
    }

    async fn run(&mut self, action: Action) -> Result<(), BrokerError> {
        if action == Action::Reload || self.loaded.is_none() {
            self.stop().await;
            self.loaded = None;
            self.state = BrokerState::Loading;
            let loaded = self.load().await?;
            self.loaded = Some(loaded);
        }
        self.start_stream().await
    }

    async fn load(&mut self) -> Result<LoadedSource, BrokerError> {
        let url = self.params.url.clone().ok_or(BrokerError::NoSource)?;
        let index_url = self
            .params
            .index_url
            .clone()
            .unwrap_or_else(|| derive_index_url(&url));
        let intervals_url = self.params.intervals_url.clone();

        self.fetch_batches += 1;
        info!("loading header and coverage of {}", url);

        let coverage_body = serde_json::to_value(UrlRequest { url: &index_url })?;
        let header_body = serde_json::to_value(UrlRequest { url: &url })?;
        let backend = &self.backend;

        let (coverage_text, header_text, intervals_text) = tokio::try_join!(
            backend.post_text(
                coverage_endpoint(AlignmentKind::detect(&url)),
                &coverage_body
            ),
            backend.post_text(HEADER_ENDPOINT, &header_body),
            async {
                match intervals_url.as_deref() {
                    Some(intervals_url) => backend.get_text(intervals_url).await.map(Some),
                    None => Ok(None),
                }
            },
        )?;

        let references = parse_header(&header_text)?;
        let coverage = parse_coverage_dump(&coverage_text)?;
        let intervals = intervals_text
            .map(|text| parse_interval_file(&text, &references))
            .transpose()?;
        let usable = select_usable_references(&references, &coverage);
        debug!(
            "{} of {} references are usable",
            usable.len(),
            references.len()
        );

        self.hub
            .publish(EVENT_HEADER, serde_json::to_value(&references)?);
        self.hub
            .publish(EVENT_READ_DEPTH, read_depth_value(&coverage)?);
        self.hub
            .publish(EVENT_USABLE_REFERENCES, serde_json::to_value(&usable)?);

        Ok(LoadedSource {
            url,
            index_url,
            usable,
            intervals,
        })
    }

    async fn start_stream(&mut self) -> Result<(), BrokerError> {
        self.stop().await;

        let Some(loaded) = &self.loaded else {
            return Err(BrokerError::NoSource);
        };

        let candidates: Vec<Interval> = match &loaded.intervals {
            Some(intervals) => intervals.clone(),
            None => loaded.usable.iter().map(Interval::from).collect(),
        };
        let windows = self
            .sampler
            .sample(&candidates, Some(self.size_multiplier))?;
        if windows.is_empty() {
            return Err(BrokerError::NoWindows);
        }

        let body = serde_json::to_value(StatsRequest {
            url: &loaded.url,
            index_url: &loaded.index_url,
            regions: windows.iter().map(RegionRequest::from).collect(),
        })?;

        info!(
            "streaming statistics for {} windows (size multiplier {})",
            windows.len(),
            self.size_multiplier
        );
        let stream = match self.backend.post_stream(STATS_STREAM_ENDPOINT, &body).await {
            Ok(stream) => stream,
            Err(err) => {
                self.state = BrokerState::Idle;
                return Err(err);
            }
        };

        let (cancel, token) = cancel_pair();
        let task = tokio::spawn(run_session(stream, token, self.hub.clone()));
        self.session = Some(Session { cancel, task });
        self.state = BrokerState::Streaming;
        Ok(())
    }

    ///
    /// Cancel the current stream, if any, and wait for its read loop to exit.
    ///
    pub async fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("cancelling statistics stream");
            session.cancel.cancel();
            if let Err(err) = session.task.await {
                warn!("statistics stream task failed: {}", err);
            }
            self.state = BrokerState::Idle;
        }
    }

    /// Wait until the current stream ends on its own.
    ///
    /// The broker stays in `Streaming` afterwards; only a parameter change moves it on.
    pub async fn join_stream(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(err) = session.task.await {
                warn!("statistics stream task failed: {}", err);
            }
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.task.is_finished())
    }
}

fn read_depth_value(coverage: &CoverageDump) -> Result<Value, BrokerError> {
    let mut groups = Map::new();
    for group in &coverage.groups {
        groups.insert(
            group.id.clone(),
            json!({
                "mapped": group.mapped,
                "unmapped": group.unmapped,
                "bins": serde_json::to_value(&group.bins)?,
            }),
        );
    }
    if let Some(unplaced) = coverage.unplaced {
        groups.insert(UNPLACED_READS_KEY.to_string(), json!(unplaced));
    }
    Ok(Value::Object(groups))
}

///
/// Read loop of one streaming session. Ends when the body ends, on a read error,
/// or when `token` is cancelled. Cancellation is silent.
///
async fn run_session<S: ChunkStream>(mut stream: S, mut token: CancelToken, hub: EventHub) {
    let mut decoder = StreamDecoder::new();
    let mut snapshot = StatSnapshot::new();

    loop {
        let chunk = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("statistics stream cancelled");
                return;
            }
            chunk = stream.next_chunk() => chunk,
        };

        let objects = match chunk {
            Ok(Some(bytes)) => decoder.feed(&bytes),
            Ok(None) => {
                let tail: Vec<Value> = decoder.finish().into_iter().collect();
                publish_changes(&hub, &token, &mut snapshot, tail);
                info!("statistics stream finished with {} metrics", snapshot.len());
                return;
            }
            Err(err) => {
                if !token.is_cancelled() {
                    warn!("statistics stream failed: {}", err);
                    hub.publish(EVENT_ERROR, json!(err.to_string()));
                }
                return;
            }
        };

        publish_changes(&hub, &token, &mut snapshot, objects);
    }
}

fn publish_changes(
    hub: &EventHub,
    token: &CancelToken,
    snapshot: &mut StatSnapshot,
    objects: Vec<Value>,
) {
    if objects.is_empty() || token.is_cancelled() {
        return;
    }
    for (key, value) in snapshot.apply(objects) {
        hub.publish(&key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(None, Action::Resample, Action::Resample)]
    #[case(None, Action::Reload, Action::Reload)]
    #[case(Some(Action::Reload), Action::Resample, Action::Reload)]
    #[case(Some(Action::Resample), Action::Reload, Action::Reload)]
    #[case(Some(Action::Resample), Action::Resample, Action::Resample)]
    fn test_action_merge(
        #[case] pending: Option<Action>,
        #[case] next: Action,
        #[case] expected: Action,
    ) {
        assert_eq!(Action::merge(pending, next), expected);
    }

    #[rstest]
    fn test_cancelled_session_publishes_nothing() {
        let hub = EventHub::new();
        let mut snapshot = StatSnapshot::new();
        let (cancel, token) = cancel_pair();

        publish_changes(&hub, &token, &mut snapshot, vec![json!({"total_reads": 1})]);
        cancel.cancel();
        publish_changes(&hub, &token, &mut snapshot, vec![json!({"total_reads": 5})]);

        assert_eq!(hub.last("total_reads"), Some(json!(1)));
        assert_eq!(snapshot.get("total_reads"), Some(&json!(1)));
    }

    #[rstest]
    fn test_read_depth_value() {
        let coverage = parse_coverage_dump("#0\t10\t2\n0 5\n*\t3\n").unwrap();
        let value = read_depth_value(&coverage).unwrap();

        assert_eq!(
            value,
            json!({
                "0": {
                    "mapped": 10,
                    "unmapped": 2,
                    "bins": [{"offset": 0, "readCount": 5, "avgCoverage": 0}],
                },
                "no_coor": 3,
            })
        );
    }
}
