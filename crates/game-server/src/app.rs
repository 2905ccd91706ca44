use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;
use twenty48_core::{GameSession, PolicyError};

use crate::config;

pub type SessionId = u32;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("session limit of {0} reached")]
    Full(usize),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Live sessions keyed by id. Sessions never share state with each other.
#[derive(Default)]
pub struct SessionStore {
    next_id: SessionId,
    games: HashMap<SessionId, GameSession>,
}

impl SessionStore {
    /// Start a new session and return its id.
    ///
    /// The seed is `seed` when given, else the configured base seed offset by
    /// the id, else OS entropy.
    pub fn create(&mut self, settings: &config::Game, seed: Option<u64>) -> Result<SessionId, StoreError> {
        if self.games.len() >= settings.max_sessions {
            return Err(StoreError::Full(settings.max_sessions));
        }
        // Ids wrap at u32::MAX; skip any still held by a live session.
        let mut id = self.next_id;
        while self.games.contains_key(&id) {
            id = id.wrapping_add(1);
        }
        let seed = seed.or_else(|| settings.seed.map(|base| base.wrapping_add(u64::from(id))));
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = GameSession::new(rng, settings.spawn)?;
        self.next_id = id.wrapping_add(1);
        self.games.insert(id, session);
        info!("session created" = id, "seed" = ?seed, "live" = self.games.len());
        Ok(id)
    }

    pub fn get(&self, id: SessionId) -> Option<&GameSession> {
        self.games.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut GameSession> {
        self.games.get_mut(&id)
    }

    pub fn remove(&mut self, id: SessionId) -> Option<GameSession> {
        let removed = self.games.remove(&id);
        if removed.is_some() {
            info!("session removed" = id, "live" = self.games.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<Mutex<SessionStore>>,
    pub settings: Arc<config::Game>,
}

impl AppState {
    pub fn new(settings: config::Game) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(SessionStore::default())),
            settings: Arc::new(settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(max_sessions: usize, seed: Option<u64>) -> config::Game {
        config::Game {
            max_sessions,
            seed,
            ..config::Game::default()
        }
    }

    #[test]
    fn ids_are_sequential_and_capped() {
        let cfg = settings(2, None);
        let mut store = SessionStore::default();
        assert_eq!(store.create(&cfg, None).unwrap(), 0);
        assert_eq!(store.create(&cfg, None).unwrap(), 1);
        assert!(matches!(store.create(&cfg, None), Err(StoreError::Full(2))));

        assert!(store.remove(0).is_some());
        assert!(store.remove(0).is_none());
        assert_eq!(store.create(&cfg, None).unwrap(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn wrapped_ids_skip_live_sessions() {
        let cfg = settings(8, Some(5));
        let mut store = SessionStore::default();
        assert_eq!(store.create(&cfg, None).unwrap(), 0);
        let kept = store.get(0).unwrap().grid();

        store.next_id = SessionId::MAX;
        assert_eq!(store.create(&cfg, None).unwrap(), SessionId::MAX);
        assert_eq!(store.create(&cfg, None).unwrap(), 1);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(0).unwrap().grid(), kept);
    }

    #[test]
    fn base_seed_is_offset_per_session() {
        let cfg = settings(8, Some(100));
        let mut store = SessionStore::default();
        let first = store.create(&cfg, None).unwrap();
        let explicit = store.create(&cfg, Some(100)).unwrap();
        assert_eq!(
            store.get(first).unwrap().grid(),
            store.get(explicit).unwrap().grid()
        );
    }
}
