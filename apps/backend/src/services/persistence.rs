//! Best-effort persistence sink for ledger side effects.
//!
//! One task drains a bounded queue in FIFO order, so a play and its cancel
//! for the same key are applied in submission order. Transient store
//! failures are retried with capped exponential backoff plus jitter; after
//! the last attempt the command is logged and dropped. Nothing here is
//! visible to websocket peers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::random;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::domain::{Card, SeatAlias, Team};
use crate::repos::games;
use crate::repos::ledger::{LedgerError, NewPlay, PlayKey, PlayedCardLedger};
use crate::store::{KvStore, StoreError};

const JITTER_PERCENT: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Fraction of the delay randomly added or removed.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_millis(1000),
            jitter: JITTER_PERCENT,
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as i32;
        let base = self.initial_backoff.as_secs_f64() * 2f64.powi(exponent);
        let capped = base.min(self.max_backoff.as_secs_f64());

        let jitter_range = capped * self.jitter.clamp(0.0, 1.0);
        let jitter = (random::<f64>() * 2.0 - 1.0) * jitter_range;
        Duration::from_secs_f64((capped + jitter).max(0.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceConfig {
    pub queue_capacity: usize,
    pub retry: RetryPolicy,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            retry: RetryPolicy::default(),
        }
    }
}

/// Where the round for a ledger key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundSource {
    Explicit(u32),
    /// Read the session record's round counter when the command is applied.
    /// Only used when the coordinator could not pin the round at dispatch.
    Current,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOp {
    Record {
        seat: SeatAlias,
        sequence: u32,
        card: Card,
        player_id: String,
        player_name: String,
        message: String,
    },
    Retract {
        seat: SeatAlias,
        sequence: u32,
    },
    Collect {
        team: Team,
        sequence: u32,
    },
}

impl LedgerOp {
    fn name(&self) -> &'static str {
        match self {
            LedgerOp::Record { .. } => "record",
            LedgerOp::Retract { .. } => "retract",
            LedgerOp::Collect { .. } => "collect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCommand {
    pub session_id: String,
    pub round: RoundSource,
    pub op: LedgerOp,
}

enum SinkMessage {
    Apply(LedgerCommand),
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
pub struct SinkStats {
    applied: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    skipped: AtomicU64,
}

impl SinkStats {
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Commands refused because the queue was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Commands with no resolvable round.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

#[derive(Clone)]
pub struct PersistenceSink {
    tx: mpsc::Sender<SinkMessage>,
    stats: Arc<SinkStats>,
}

impl PersistenceSink {
    pub fn start(
        store: Arc<dyn KvStore>,
        ledger: PlayedCardLedger,
        config: PersistenceConfig,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let stats = Arc::new(SinkStats::default());
        let worker = SinkWorker {
            store,
            ledger,
            retry: config.retry,
            stats: Arc::clone(&stats),
        };
        let task = tokio::spawn(worker.run(rx));
        (Self { tx, stats }, task)
    }

    /// Never waits. Returns false when the command was dropped.
    pub fn enqueue(&self, command: LedgerCommand) -> bool {
        match self.tx.try_send(SinkMessage::Apply(command)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(SinkMessage::Apply(command))) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                error!(
                    session_id = %command.session_id,
                    op = command.op.name(),
                    "persistence queue full; side effect dropped"
                );
                false
            }
            Err(_) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                error!("persistence sink stopped; side effect dropped");
                false
            }
        }
    }

    /// Resolves once every command enqueued before the call has been handled.
    pub async fn flush(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(SinkMessage::Flush(reply)).await.is_ok() {
            let _ = rx.await;
        }
    }

    pub fn stats(&self) -> Arc<SinkStats> {
        Arc::clone(&self.stats)
    }
}

struct SinkWorker {
    store: Arc<dyn KvStore>,
    ledger: PlayedCardLedger,
    retry: RetryPolicy,
    stats: Arc<SinkStats>,
}

impl SinkWorker {
    async fn run(self, mut rx: mpsc::Receiver<SinkMessage>) {
        while let Some(message) = rx.recv().await {
            match message {
                SinkMessage::Apply(command) => self.handle(command).await,
                SinkMessage::Flush(reply) => {
                    let _ = reply.send(());
                }
            }
        }
        info!("persistence sink stopped");
    }

    async fn handle(&self, command: LedgerCommand) {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.apply(&command).await {
                Ok(true) => {
                    self.stats.applied.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                Ok(false) => {
                    self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                Err(err) => {
                    if attempt >= self.retry.max_attempts || !is_transient(&err) {
                        self.stats.failed.fetch_add(1, Ordering::Relaxed);
                        error!(
                            session_id = %command.session_id,
                            op = command.op.name(),
                            attempt,
                            error = %err,
                            "ledger side effect failed"
                        );
                        return;
                    }

                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        session_id = %command.session_id,
                        op = command.op.name(),
                        attempt,
                        retry_delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "ledger side effect failed, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// `Ok(false)` when the round cannot be resolved.
    async fn apply(&self, command: &LedgerCommand) -> Result<bool, LedgerError> {
        let round = match command.round {
            RoundSource::Explicit(round) => round,
            RoundSource::Current => {
                match games::current_round(self.store.as_ref(), &command.session_id).await? {
                    Some(round) => round,
                    None => {
                        warn!(
                            session_id = %command.session_id,
                            op = command.op.name(),
                            "no session record to take the round from; side effect skipped"
                        );
                        return Ok(false);
                    }
                }
            }
        };

        let session_id = command.session_id.clone();
        match &command.op {
            LedgerOp::Record {
                seat,
                sequence,
                card,
                player_id,
                player_name,
                message,
            } => {
                self.ledger
                    .record_play(NewPlay {
                        key: PlayKey {
                            session_id,
                            round,
                            seat: *seat,
                            sequence: *sequence,
                        },
                        card: *card,
                        card_presentation: card.presentation(),
                        player_id: player_id.clone(),
                        player_name: player_name.clone(),
                        message: message.clone(),
                    })
                    .await?;
            }
            LedgerOp::Retract { seat, sequence } => {
                self.ledger
                    .retract_play(&PlayKey {
                        session_id,
                        round,
                        seat: *seat,
                        sequence: *sequence,
                    })
                    .await?;
            }
            LedgerOp::Collect { team, sequence } => {
                self.ledger
                    .collect_trick(&session_id, round, *team, *sequence)
                    .await?;
            }
        }
        debug!(
            session_id = %command.session_id,
            round,
            op = command.op.name(),
            "ledger side effect applied"
        );
        Ok(true)
    }
}

fn is_transient(err: &LedgerError) -> bool {
    matches!(
        err,
        LedgerError::Store(StoreError::Unavailable(_)) | LedgerError::Store(StoreError::Backend(_))
    )
}
