//! Session coordinator: turns realtime events into ledger side effects and
//! runs deals.
//!
//! `apply` is called from the hub's dispatch task. The ledger write itself
//! goes to the [`PersistenceSink`], but the round an event belongs to is
//! pinned here, at dispatch time, so a redeal that lands while the command
//! waits in the sink cannot move it to the next round. Rounds are cached per
//! session and updated by [`SessionCoordinator::redeal`]; the store is read
//! only on a cache miss, bounded by [`ROUND_LOOKUP_TIMEOUT`].
//!
//! Events that cannot be interpreted are still broadcast by the hub, only
//! the side effect is skipped.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::domain::{Dealer, GameSession};
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::repos::games as game_repo;
use crate::repos::ledger::{PlayedCardLedger, TrickStrictness};
use crate::services::games;
use crate::services::persistence::{
    LedgerCommand, LedgerOp, PersistenceConfig, PersistenceSink, RoundSource, SinkStats,
};
use crate::store::KvStore;
use crate::ws::protocol::{Action, RealtimeEvent};

/// Longest the dispatch task waits for a session record on a round-cache
/// miss before leaving the round to the sink.
pub const ROUND_LOOKUP_TIMEOUT: Duration = Duration::from_millis(250);

pub struct SessionCoordinator {
    store: Arc<dyn KvStore>,
    dealer: Dealer,
    ledger: PlayedCardLedger,
    sink: PersistenceSink,
    rounds: DashMap<String, u32>,
}

impl SessionCoordinator {
    /// Spawns the persistence sink on the current runtime.
    pub fn start(
        store: Arc<dyn KvStore>,
        dealer: Dealer,
        strictness: TrickStrictness,
        persistence: PersistenceConfig,
    ) -> Self {
        let ledger = PlayedCardLedger::new(Arc::clone(&store), strictness);
        let (sink, _task) = PersistenceSink::start(Arc::clone(&store), ledger.clone(), persistence);
        Self {
            store,
            dealer,
            ledger,
            sink,
            rounds: DashMap::new(),
        }
    }

    pub fn ledger(&self) -> &PlayedCardLedger {
        &self.ledger
    }

    pub fn sink_stats(&self) -> Arc<SinkStats> {
        self.sink.stats()
    }

    /// Wait until every side effect queued so far has been handled.
    pub async fn flush(&self) {
        self.sink.flush().await;
    }

    /// Queue the ledger side effect for `event`, with its round fixed.
    pub async fn apply(&self, event: &RealtimeEvent) {
        match Self::command_for(event) {
            Ok(mut command) => {
                if command.round == RoundSource::Current {
                    command.round = self.pin_round(&command.session_id).await;
                }
                self.sink.enqueue(command);
            }
            Err(err) => warn!(
                session_id = %event.session_id,
                action = %event.action,
                error = %err,
                "event not interpretable; side effect skipped"
            ),
        }
    }

    fn command_for(event: &RealtimeEvent) -> Result<LedgerCommand, DomainError> {
        let round = match event.round_number() {
            Some(round) => RoundSource::Explicit(round?),
            None => RoundSource::Current,
        };
        let sequence = event.sequence_number()?;

        let op = match event.action {
            Action::PlayCard => LedgerOp::Record {
                seat: event.seat()?,
                sequence,
                card: event.parsed_card()?,
                player_id: event.player_id.clone(),
                player_name: event.player_name.clone(),
                message: event.message.clone(),
            },
            Action::CancelCard => LedgerOp::Retract {
                seat: event.seat()?,
                sequence,
            },
            Action::PickupCards => LedgerOp::Collect {
                team: event.team()?,
                sequence,
            },
        };

        Ok(LedgerCommand {
            session_id: event.session_id.clone(),
            round,
            op,
        })
    }

    async fn pin_round(&self, session_id: &str) -> RoundSource {
        if let Some(round) = self.rounds.get(session_id) {
            return RoundSource::Explicit(*round);
        }

        let lookup = game_repo::current_round(self.store.as_ref(), session_id);
        match tokio::time::timeout(ROUND_LOOKUP_TIMEOUT, lookup).await {
            Ok(Ok(Some(round))) => {
                // A redeal may have raced the lookup; its value wins.
                let round = *self.rounds.entry(session_id.to_string()).or_insert(round);
                RoundSource::Explicit(round)
            }
            Ok(Ok(None)) => RoundSource::Current,
            Ok(Err(err)) => {
                warn!(session_id, error = %err, "round lookup failed; sink will resolve it");
                RoundSource::Current
            }
            Err(_) => {
                warn!(session_id, "round lookup timed out; sink will resolve it");
                RoundSource::Current
            }
        }
    }

    /// Round the coordinator currently files events under, if known.
    pub fn cached_round(&self, session_id: &str) -> Option<u32> {
        self.rounds.get(session_id).map(|round| *round)
    }

    /// Deal a fresh round for the session. Events dispatched after this
    /// returns are filed under the new round.
    pub async fn redeal(&self, session_id: &str) -> Result<GameSession, AppError> {
        let session = games::distribute(self.store.as_ref(), &self.dealer, session_id).await?;
        self.rounds.insert(session.id.clone(), session.round);
        debug!(session_id, round = session.round, "round advanced");
        Ok(session)
    }
}
