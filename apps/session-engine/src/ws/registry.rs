use std::sync::Arc;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::errors::GameError;
use crate::session::{Game, MatchId};
use crate::ws::socket::Socket;

/// Live sessions keyed by match id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<MatchId, Arc<Game>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Forms a match from a roster handed over by matchmaking, starts and registers it.
    ///
    /// A match that fails to start is never registered.
    pub fn create(
        self: &Arc<Self>,
        roster: Vec<Arc<dyn Socket>>,
        config: GameConfig,
    ) -> Result<Arc<Game>, GameError> {
        let timeout = config.starting_timeout;
        let game = Game::new(roster, config)?;
        game.start(timeout)?;
        self.insert(Arc::clone(&game));
        Ok(game)
    }

    /// Registers a session. It is dropped again once its closure token fires.
    pub fn insert(self: &Arc<Self>, game: Arc<Game>) {
        let match_id = game.id();
        let closed = game.closed();
        self.sessions.insert(match_id, game);
        info!(%match_id, live = self.sessions.len(), "Session registered");

        if let Ok(handle) = Handle::try_current() {
            let registry = Arc::downgrade(self);
            handle.spawn(async move {
                closed.cancelled().await;
                if let Some(registry) = registry.upgrade() {
                    registry.remove(match_id);
                }
            });
        }
    }

    pub fn get(&self, match_id: MatchId) -> Option<Arc<Game>> {
        self.sessions
            .get(&match_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, match_id: MatchId) -> Option<Arc<Game>> {
        let removed = self.sessions.remove(&match_id).map(|(_, game)| game);
        if removed.is_some() {
            debug!(%match_id, live = self.sessions.len(), "Session unregistered");
        }
        removed
    }

    /// Drops every closed session. Needed only without a runtime to watch closures.
    pub fn prune(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, game| !game.is_closed());
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
