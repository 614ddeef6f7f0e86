//! Scan engine: worker-pool dispatch, predicate filtering, streaming
//! aggregation, cancellation and deadline handling.
//!
//! Mirrors the teacher's threaded mining loop (job generation on its own
//! thread, `std::thread::spawn` workers, an `Arc<AtomicBool>` stop flag) but
//! swaps `rayon`-style data parallelism for explicit bounded channels: the
//! collector needs to observe hits as they are produced, not only at the end
//! of a parallel iterator. Dispatch, workers, and the collector all run
//! concurrently on their own threads so none of the bounded channels can
//! wedge the others.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::games::{self, GameDetails, GameResult, RawParams};
use crate::predicate::{PredicateOp, TargetPredicate, DEFAULT_TOLERANCE_FLOAT, DEFAULT_TOLERANCE_INTEGER};
use crate::summary::{Summary, SummaryAccumulator};

/// Opaque version string identifying the exact evaluation semantics in
/// effect. Must change whenever float decoding, game arithmetic, or the
/// predicate table changes meaning.
pub fn engine_version() -> String {
    format!("pf-replay/{}", env!("CARGO_PKG_VERSION"))
}

/// A caller-held handle to request cancellation of an in-progress scan.
/// Cloning shares the same underlying flag, the way the teacher's mining
/// loop shares one `Arc<AtomicBool>` stop flag across its worker threads.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A matching `(nonce, metric)` pair. Nothing else is retained in the hot path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub nonce: u64,
    pub metric: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub game: String,
    pub server_seed: String,
    pub client_seed: String,
    pub nonce_start: u64,
    pub nonce_end: u64,
    #[serde(default)]
    pub params: RawParams,
    pub target_op: String,
    pub target_val: f64,
    #[serde(default)]
    pub target_val2: Option<f64>,
    #[serde(default)]
    pub tolerance: Option<f64>,
    /// 0 means unlimited, subject to `EngineConfig::max_hit_limit`.
    #[serde(default)]
    pub limit: u64,
    /// 0 means "use `EngineConfig::default_timeout`".
    #[serde(default)]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub hits: Vec<Hit>,
    pub summary: Summary,
    pub engine_version: String,
    pub echo: ScanRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub game: String,
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
    #[serde(default)]
    pub params: RawParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResult {
    pub result: GameResult,
    pub engine_version: String,
    pub echo: VerifyRequest,
}

/// One registered game's public identity, for the `GamesList` interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameListEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub metric_label: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamesList {
    pub games: Vec<GameListEntry>,
    pub engine_version: String,
}

pub fn games_list() -> GamesList {
    GamesList {
        games: games::list()
            .into_iter()
            .map(|spec| GameListEntry {
                id: spec.id,
                name: spec.name,
                metric_label: spec.metric_label,
            })
            .collect(),
        engine_version: engine_version(),
    }
}

/// Validated, ready-to-run form of a [`ScanRequest`]. Building one performs
/// every check in step 1 of the scan algorithm; no worker is spawned until
/// this succeeds.
struct ValidatedScan<'a> {
    game: &'static dyn games::Game,
    predicate: TargetPredicate,
    float_count: usize,
    server: Vec<u8>,
    client: Vec<u8>,
    nonce_start: u64,
    nonce_end: u64,
    params: &'a RawParams,
    limit: u64,
    deadline: Duration,
}

fn validate<'a>(request: &'a ScanRequest, config: &EngineConfig) -> Result<ValidatedScan<'a>, EngineError> {
    if request.nonce_start > request.nonce_end {
        return Err(EngineError::invalid_nonce("nonceStart must be <= nonceEnd")
            .with_context("nonce_start", request.nonce_start)
            .with_context("nonce_end", request.nonce_end));
    }
    let range = request.nonce_end - request.nonce_start;
    if range > config.max_nonce_range {
        return Err(EngineError::invalid_params("nonce range exceeds MaxNonceRange")
            .with_context("range", range)
            .with_context("max_nonce_range", config.max_nonce_range));
    }

    let game = games::lookup(&request.game)?;
    // float_count doubles as the game's own parameter validation.
    let float_count = game.float_count(&request.params)?;

    let op = PredicateOp::parse(&request.target_op)?;
    let default_tolerance = if game.spec().metric_label == "pocket" {
        DEFAULT_TOLERANCE_INTEGER
    } else {
        DEFAULT_TOLERANCE_FLOAT
    };
    let tolerance = request.tolerance.unwrap_or(default_tolerance);
    let predicate = TargetPredicate::new(op, request.target_val, request.target_val2, tolerance)?;

    let limit = if request.limit == 0 {
        config.max_hit_limit
    } else {
        request.limit.min(config.max_hit_limit)
    };

    let deadline = if request.timeout_ms == 0 {
        config.default_timeout
    } else {
        Duration::from_millis(request.timeout_ms)
    };

    Ok(ValidatedScan {
        game,
        predicate,
        float_count,
        server: request.server_seed.as_bytes().to_vec(),
        client: request.client_seed.as_bytes().to_vec(),
        nonce_start: request.nonce_start,
        nonce_end: request.nonce_end,
        params: &request.params,
        limit,
        deadline,
    })
}

/// Logs a request rejection with exactly the context the error-handling
/// design calls for: game id, nonce range, engine version. Never seeds.
fn log_rejected(request: &ScanRequest, err: &EngineError) {
    tracing::warn!(
        game = request.game,
        nonce_start = request.nonce_start,
        nonce_end = request.nonce_end,
        error_kind = err.kind(),
        engine_version = %engine_version(),
        "scan request rejected"
    );
}

enum Job {
    Batch { start: u64, end: u64 },
}

enum WorkerMessage {
    Hit(Hit),
    Done(SummaryAccumulator),
}

/// Run a scan to completion (or termination by limit/deadline/cancellation).
pub fn scan(
    request: &ScanRequest,
    config: &EngineConfig,
    cancellation: &CancellationToken,
) -> Result<ScanResult, EngineError> {
    let validated = match validate(request, config) {
        Ok(v) => v,
        Err(err) => {
            log_rejected(request, &err);
            return Err(err);
        }
    };

    let cancelled = Arc::new(AtomicBool::new(false));
    let timed_out = Arc::new(AtomicBool::new(false));

    let worker_count = config.max_workers.max(1);
    let (job_tx, job_rx) = bounded::<Job>(worker_count.max(1));
    let (result_tx, result_rx) = bounded::<WorkerMessage>(16 * worker_count.max(1));

    tracing::info!(
        game = request.game,
        server_seed_hash = %crate::seed_hash(&validated.server),
        client_seed_hash = %crate::seed_hash(&validated.client),
        nonce_start = validated.nonce_start,
        nonce_end = validated.nonce_end,
        workers = worker_count,
        "scan starting"
    );

    let deadline_at = Instant::now() + validated.deadline;
    {
        let cancelled = Arc::clone(&cancelled);
        let timed_out = Arc::clone(&timed_out);
        std::thread::spawn(move || {
            let remaining = deadline_at.saturating_duration_since(Instant::now());
            std::thread::sleep(remaining);
            if !cancelled.swap(true, Ordering::SeqCst) {
                timed_out.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let job_rx = job_rx.clone();
        let result_tx = result_tx.clone();
        let cancelled = Arc::clone(&cancelled);
        let cancellation = cancellation.clone();
        let server = validated.server.clone();
        let client = validated.client.clone();
        let params = validated.params.clone();
        let predicate = validated.predicate;
        let game = validated.game;

        handles.push(std::thread::spawn(move || -> Result<(), EngineError> {
            let mut accumulator = SummaryAccumulator::new();
            'batches: while let Ok(Job::Batch { start, end }) = job_rx.recv() {
                for nonce in start..end {
                    if cancelled.load(Ordering::SeqCst) || cancellation.is_cancelled() {
                        break 'batches;
                    }
                    let outcome = match game.evaluate(&server, &client, nonce, &params) {
                        Ok(outcome) => outcome,
                        Err(err) => {
                            tracing::error!(
                                game = game.spec().id,
                                nonce,
                                error_kind = err.kind(),
                                engine_version = %engine_version(),
                                "evaluator failed, aborting scan"
                            );
                            return Err(err);
                        }
                    };
                    accumulator.push(outcome.metric);
                    if predicate.matches(outcome.metric) {
                        let hit = Hit {
                            nonce,
                            metric: outcome.metric,
                        };
                        if result_tx.send(WorkerMessage::Hit(hit)).is_err() {
                            break 'batches;
                        }
                    }
                }
            }
            let _ = result_tx.send(WorkerMessage::Done(accumulator));
            Ok(())
        }));
    }
    drop(result_tx);

    // Dispatch runs on its own thread: the job channel holds only
    // `worker_count` batches and the result channel only `16 * worker_count`
    // hits, so if dispatch ran inline on the calling thread it could block
    // forever on a full job channel while workers are themselves blocked
    // sending hits into a full result channel, with nobody left to drain it.
    let dispatch_handle = {
        let job_tx = job_tx;
        let cancelled = Arc::clone(&cancelled);
        let cancellation = cancellation.clone();
        let batch_size = config.batch_size.max(1);
        let nonce_start = validated.nonce_start;
        let nonce_end = validated.nonce_end;
        std::thread::spawn(move || {
            let mut cursor = nonce_start;
            while cursor < nonce_end {
                if cancelled.load(Ordering::SeqCst) || cancellation.is_cancelled() {
                    break;
                }
                let end = (cursor + batch_size).min(nonce_end);
                if job_tx.send(Job::Batch { start: cursor, end }).is_err() {
                    break;
                }
                cursor = end;
            }
            // Dropping `job_tx` here (thread exit) signals workers there is
            // no more work.
        })
    };

    let mut hits: Vec<Hit> = Vec::new();
    let mut total_accumulator = SummaryAccumulator::new();
    let mut workers_done = 0usize;
    loop {
        match result_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(WorkerMessage::Hit(hit)) => {
                if (hits.len() as u64) < validated.limit {
                    hits.push(hit);
                    if hits.len() as u64 >= validated.limit {
                        cancelled.store(true, Ordering::SeqCst);
                    }
                }
            }
            Ok(WorkerMessage::Done(partial)) => {
                total_accumulator.merge(&partial);
                workers_done += 1;
                if workers_done == worker_count {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if cancellation.is_cancelled() {
                    cancelled.store(true, Ordering::SeqCst);
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let _ = dispatch_handle.join();
    for handle in handles {
        if let Ok(Err(err)) = handle.join() {
            return Err(err);
        }
    }

    if cancellation.is_cancelled() {
        tracing::warn!(
            game = request.game,
            nonce_start = validated.nonce_start,
            nonce_end = validated.nonce_end,
            engine_version = %engine_version(),
            "scan cancelled by caller"
        );
        return Err(EngineError::cancelled()
            .with_context("game", &request.game)
            .with_context("nonce_start", validated.nonce_start)
            .with_context("nonce_end", validated.nonce_end));
    }

    hits.sort_by_key(|hit| hit.nonce);

    let hits_found = hits.len() as u64;
    let summary = total_accumulator.finish(hits_found, timed_out.load(Ordering::SeqCst));

    tracing::info!(
        game = request.game,
        hits_found,
        total_evaluated = summary.total_evaluated,
        timed_out = summary.timed_out,
        "scan finished"
    );

    // float_count is part of the evaluator contract, not the response, but
    // asserting it here keeps the declared count honest against what was
    // actually drawn per nonce.
    debug_assert!(validated.float_count >= 1);

    Ok(ScanResult {
        hits,
        summary,
        engine_version: engine_version(),
        echo: request.clone(),
    })
}

/// Evaluate a single nonce and return the full detail record.
pub fn verify(request: &VerifyRequest) -> Result<VerifyResult, EngineError> {
    let game = match games::lookup(&request.game) {
        Ok(game) => game,
        Err(err) => {
            tracing::warn!(
                game = request.game,
                error_kind = err.kind(),
                engine_version = %engine_version(),
                "verify request rejected"
            );
            return Err(err);
        }
    };
    if let Err(err) = game.float_count(&request.params) {
        tracing::warn!(
            game = request.game,
            error_kind = err.kind(),
            engine_version = %engine_version(),
            "verify request rejected"
        );
        return Err(err);
    }

    let server = request.server_seed.as_bytes();
    let client = request.client_seed.as_bytes();
    tracing::info!(
        game = request.game,
        server_seed_hash = %crate::seed_hash(server),
        client_seed_hash = %crate::seed_hash(client),
        nonce = request.nonce,
        "verify starting"
    );
    let result = game.evaluate(server, client, request.nonce, &request.params)?;

    Ok(VerifyResult {
        result,
        engine_version: engine_version(),
        echo: request.clone(),
    })
}
