use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::GameError;
use crate::session::game::{Game, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TimerKind {
    Starting,
    Turn,
}

/// The single armed timer of a session. `epoch` tells a live callback from a stale one.
#[derive(Debug)]
pub(super) struct PhaseTimer {
    token: CancellationToken,
    epoch: u64,
    kind: TimerKind,
    deadline: Instant,
}

impl PhaseTimer {
    pub(super) fn remaining(&self, kind: TimerKind) -> Option<Duration> {
        (self.kind == kind).then(|| self.deadline.saturating_duration_since(Instant::now()))
    }
}

impl Game {
    /// Replaces any armed timer with a new one firing after `duration`.
    pub(super) fn arm_timer(
        &self,
        state: &mut SessionState,
        duration: Duration,
        kind: TimerKind,
    ) -> Result<(), GameError> {
        self.disarm_timer(state);
        let handle = Handle::try_current().map_err(|_| GameError::NoRuntime)?;

        state.epoch += 1;
        let epoch = state.epoch;
        let token = self.closed.child_token();
        state.timer = Some(PhaseTimer {
            token: token.clone(),
            epoch,
            kind,
            deadline: Instant::now() + duration,
        });

        let game = self.me.clone();
        handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    if let Some(game) = game.upgrade() {
                        game.on_timer(kind, epoch);
                    }
                }
            }
        });
        debug!(match_id = %self.id, ?kind, epoch, ?duration, "Timer armed");
        Ok(())
    }

    pub(super) fn disarm_timer(&self, state: &mut SessionState) {
        if let Some(timer) = state.timer.take() {
            timer.token.cancel();
        }
    }

    fn on_timer(&self, kind: TimerKind, epoch: u64) {
        let mut state = self.state.lock();
        let live = state
            .timer
            .as_ref()
            .is_some_and(|t| t.epoch == epoch && t.kind == kind);
        if !live {
            debug!(match_id = %self.id, ?kind, epoch, "Stale timer ignored");
            return;
        }
        state.timer = None;

        match kind {
            TimerKind::Starting => {
                self.cancel_match(&mut state, "starting choices timed out");
            }
            TimerKind::Turn => match self.advance_turn(&mut state) {
                Ok(outcome) => {
                    debug!(match_id = %self.id, ?outcome, "Turn timed out");
                }
                Err(err) => {
                    warn!(match_id = %self.id, error = %err, "Turn timeout could not advance");
                }
            },
        }
    }
}
