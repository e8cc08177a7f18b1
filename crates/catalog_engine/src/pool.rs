use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use catalog_core::{
    CourseExtractor, NullProgressSink, PageTask, ProgressAggregator, ProgressEvent, ProgressSink,
    UNASSIGNED_DEPARTMENT,
};
use catalog_logging::{catalog_debug, catalog_error, catalog_info, catalog_warn};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::decode::decode_page;
use crate::parse::PageParser;
use crate::{
    FailureKind, FetchError, FetchOutput, Fetcher, MalformedPage, PageFailure, PageOutput,
    ScrapeReport,
};

type Claim = (usize, PageTask);
type Outcome = Result<PageOutput, FetchError>;

/// Fetches and extracts catalog pages on a bounded number of concurrent
/// workers.
///
/// Workers pull the next unclaimed page from a shared queue, so large pages do
/// not hold back a statically assigned share. Every page produces exactly one
/// progress event. Results are merged by the coordinating task only after all
/// workers have been joined.
pub struct WorkerPool {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<PageParser>,
    extractor: CourseExtractor,
    sink: Arc<dyn ProgressSink>,
    shutdown: CancellationToken,
}

impl WorkerPool {
    pub fn new(fetcher: Arc<dyn Fetcher>, parser: PageParser) -> Self {
        Self {
            fetcher,
            parser: Arc::new(parser),
            extractor: CourseExtractor::new(),
            sink: Arc::new(NullProgressSink),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    /// Once `token` is cancelled, unclaimed pages are reported as cancelled
    /// instead of fetched and in-flight fetches are abandoned.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn run(&self, tasks: Vec<PageTask>, concurrency: usize) -> ScrapeReport {
        self.run_prefetched(tasks, concurrency, HashMap::new()).await
    }

    /// Like [`WorkerPool::run`], but pages whose URL is a key of `prefetched`
    /// use that response instead of being fetched.
    pub async fn run_prefetched(
        &self,
        tasks: Vec<PageTask>,
        concurrency: usize,
        prefetched: HashMap<String, FetchOutput>,
    ) -> ScrapeReport {
        let total = tasks.len();
        let aggregator = Arc::new(ProgressAggregator::new(total));
        self.sink.update(aggregator.snapshot());

        let urls: Vec<String> = tasks.iter().map(|task| task.url.clone()).collect();
        let queue: Arc<Mutex<VecDeque<Claim>>> =
            Arc::new(Mutex::new(tasks.into_iter().enumerate().collect()));
        let prefetched = Arc::new(Mutex::new(prefetched));
        let (results_tx, mut results_rx) = mpsc::unbounded_channel::<(usize, Outcome)>();

        let worker_count = concurrency.max(1).min(total.max(1));
        catalog_info!("Scraping {} pages on {} workers", total, worker_count);

        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            let worker = Worker {
                id: worker_id,
                queue: Arc::clone(&queue),
                prefetched: Arc::clone(&prefetched),
                fetcher: Arc::clone(&self.fetcher),
                parser: Arc::clone(&self.parser),
                extractor: self.extractor,
                aggregator: Arc::clone(&aggregator),
                sink: Arc::clone(&self.sink),
                shutdown: self.shutdown.clone(),
                results: results_tx.clone(),
            };
            workers.spawn(async move { worker.drain().await });
        }
        drop(results_tx);

        let mut outcomes: Vec<Option<Outcome>> = (0..total).map(|_| None).collect();
        while let Some((index, outcome)) = results_rx.recv().await {
            outcomes[index] = Some(outcome);
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                catalog_error!("catalog worker stopped abnormally: {}", err);
            }
        }

        // A page claimed by a worker that died never reported; count it now.
        for (index, outcome) in outcomes.iter_mut().enumerate() {
            if outcome.is_none() {
                aggregator.report_to(ProgressEvent::Failed, self.sink.as_ref());
                *outcome = Some(Err(FetchError::new(
                    FailureKind::ProcessingError,
                    format!("worker stopped before finishing {}", urls[index]),
                )));
            }
        }

        let mut report = merge(&urls, outcomes.into_iter().flatten().collect());
        report.progress = aggregator.snapshot();
        catalog_info!(
            "Scrape finished: {} completed, {} failed, {} courses",
            report.progress.completed,
            report.progress.failed,
            report.catalog.len()
        );
        report
    }
}

struct Worker {
    id: usize,
    queue: Arc<Mutex<VecDeque<Claim>>>,
    prefetched: Arc<Mutex<HashMap<String, FetchOutput>>>,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<PageParser>,
    extractor: CourseExtractor,
    aggregator: Arc<ProgressAggregator>,
    sink: Arc<dyn ProgressSink>,
    shutdown: CancellationToken,
    results: mpsc::UnboundedSender<(usize, Outcome)>,
}

impl Worker {
    async fn drain(&self) {
        while let Some((index, task)) = self.claim() {
            let outcome = if self.shutdown.is_cancelled() {
                Err(cancelled())
            } else {
                self.process(&task).await
            };

            let event = match &outcome {
                Ok(_) => ProgressEvent::Completed,
                Err(err) => {
                    catalog_warn!("Page {} failed: {}", task.url, err);
                    ProgressEvent::Failed
                }
            };
            self.aggregator.report_to(event, self.sink.as_ref());

            if self.results.send((index, outcome)).is_err() {
                break;
            }
        }
        catalog_debug!("worker {} drained", self.id);
    }

    fn claim(&self) -> Option<Claim> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn take_prefetched(&self, url: &str) -> Option<FetchOutput> {
        self.prefetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url)
    }

    async fn process(&self, task: &PageTask) -> Outcome {
        let fetched = match self.take_prefetched(&task.url) {
            Some(fetched) => {
                catalog_debug!("reusing prefetched {}", task.url);
                fetched
            }
            None => tokio::select! {
                _ = self.shutdown.cancelled() => return Err(cancelled()),
                fetched = self.fetcher.fetch(&task.url) => fetched?,
            },
        };
        let html = decode_page(&fetched.bytes, fetched.content_type.as_deref())
            .map_err(|err| FetchError::new(FailureKind::Undecodable, err.to_string()))?;
        Ok(extract_page(&self.parser, &self.extractor, task, &html))
    }
}

fn cancelled() -> FetchError {
    FetchError::new(FailureKind::Cancelled, "shutdown requested before page was fetched")
}

/// Parses one page and runs the extractor over each of its blocks.
pub fn extract_page(
    parser: &PageParser,
    extractor: &CourseExtractor,
    task: &PageTask,
    html: &str,
) -> PageOutput {
    let parsed = parser.parse(html, task.department_hint.as_deref());
    for problem in &parsed.problems {
        catalog_warn!("Malformed page {}: {}", task.url, problem);
    }

    let mut output = PageOutput {
        problems: parsed.problems,
        ..PageOutput::default()
    };
    for block in parsed.blocks {
        match extractor.extract(&block) {
            Ok(record) => output.records.push(record),
            Err(unrecognized) => {
                catalog_warn!("{} on {}", unrecognized, task.url);
                output.unrecognized.push(unrecognized);
            }
        }
        output.raw_blocks.push(block);
    }
    output
}

/// Folds per-page outcomes, in task order, into one report. Blocks that
/// reached the coordinator without a department continue the last department
/// of the preceding page; a failed page breaks that chain.
fn merge(urls: &[String], outcomes: Vec<Outcome>) -> ScrapeReport {
    let mut report = ScrapeReport::default();
    let mut carried: Option<String> = None;

    for (url, outcome) in urls.iter().zip(outcomes) {
        let page = match outcome {
            Ok(page) => page,
            Err(error) => {
                report.failures.push(PageFailure {
                    url: url.clone(),
                    error,
                });
                carried = None;
                continue;
            }
        };

        let fallback = carried
            .clone()
            .unwrap_or_else(|| UNASSIGNED_DEPARTMENT.to_string());

        for mut block in page.raw_blocks {
            if !block.has_department() {
                block.department = fallback.clone();
            }
            carried = Some(block.department.clone());
            report.raw_blocks.push(block);
        }
        for record in page.records {
            if record.department.trim().is_empty() {
                report.catalog.push(record.with_department(fallback.clone()));
            } else {
                report.catalog.push(record);
            }
        }
        for mut unrecognized in page.unrecognized {
            if unrecognized.department.trim().is_empty() {
                unrecognized.department = fallback.clone();
            }
            report.unrecognized.push(unrecognized);
        }
        for error in page.problems {
            report.malformed.push(MalformedPage {
                url: url.clone(),
                error,
            });
        }
    }
    report
}
