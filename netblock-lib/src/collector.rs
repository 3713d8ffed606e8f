//! Driving the fetcher over the full source set.
use std::time::Duration;

use futures::{stream, Stream, StreamExt};
use ipnet::Ipv4Net;
use tokio::time::sleep;
use url::Url;

use crate::{client::Client, validate, Status};

/// Everything known about one source once its fetch has completed.
#[derive(Debug)]
pub struct SourceReport {
    /// The fetched source
    pub url: Url,
    /// Terminal fetch outcome
    pub status: Status,
    /// Raw line count of the body, taken before any validation. Blank
    /// lines, comments and rejects are all included.
    pub lines: usize,
    /// The networks which passed validation
    pub networks: Vec<Ipv4Net>,
}

/// Aggregate over all completed sources of a run.
#[derive(Debug, Default)]
pub struct Harvest {
    /// Raw network collection across all sources. Arrival order is
    /// meaningless and duplicates are permitted; collapsing happens later.
    pub networks: Vec<Ipv4Net>,
    /// Total raw line count across all sources
    pub total_lines: usize,
    /// Sources whose retry budget ran out
    pub failed: Vec<Url>,
}

impl Harvest {
    /// Fold one completed source into the aggregate.
    pub fn add(&mut self, report: SourceReport) {
        let SourceReport {
            url,
            status,
            lines,
            networks,
        } = report;
        self.total_lines += lines;
        if status.is_success() {
            self.networks.extend(networks);
        } else {
            self.failed.push(url);
        }
    }
}

/// Fetches a set of sources with bounded concurrency and paced slot
/// release.
#[derive(Debug, Clone)]
pub struct Collector {
    client: Client,
    max_concurrency: usize,
    pacing_delay: Duration,
}

impl Collector {
    /// Create a collector on top of an existing [`Client`].
    #[must_use]
    pub const fn new(client: Client, max_concurrency: usize, pacing_delay: Duration) -> Self {
        Self {
            client,
            max_concurrency,
            pacing_delay,
        }
    }

    /// Stream one [`SourceReport`] per source, in completion order.
    ///
    /// At most `max_concurrency` fetches are in flight. Each slot stays
    /// occupied through the pacing pause after its fetch has finished, so
    /// the pause throttles the rate of new admissions, not only the peak
    /// concurrency. Completion order is not deterministic; consumers that
    /// need a stable order must sort afterwards.
    pub fn collect(self, sources: Vec<Url>) -> impl Stream<Item = SourceReport> {
        let client = self.client;
        let pacing_delay = self.pacing_delay;
        stream::iter(sources)
            .map(move |url| {
                let client = client.clone();
                async move {
                    let report = fetch_source(&client, url).await;
                    // Keeps the slot busy; see above.
                    sleep(pacing_delay).await;
                    report
                }
            })
            .buffer_unordered(self.max_concurrency)
    }

    /// Fetch every source and fold the reports into a single [`Harvest`].
    ///
    /// Convenience wrapper around [`Collector::collect`] for callers that
    /// do not care about per-source progress.
    pub async fn collect_all(self, sources: Vec<Url>) -> Harvest {
        self.collect(sources)
            .fold(Harvest::default(), |mut harvest, report| async move {
                harvest.add(report);
                harvest
            })
            .await
    }
}

/// Fetch one source and turn the outcome into a report.
///
/// A failed source contributes zero lines and zero networks; the failure
/// itself never propagates further than the report.
async fn fetch_source(client: &Client, url: Url) -> SourceReport {
    match client.fetch(&url).await {
        Ok(body) => {
            let lines = body.lines().count();
            let networks = body.lines().filter_map(validate::valid_network).collect();
            SourceReport {
                url,
                status: Status::Ok,
                lines,
                networks,
            }
        }
        Err(e) => SourceReport {
            url,
            status: Status::Failed(e),
            lines: 0,
            networks: Vec::new(),
        },
    }
}
