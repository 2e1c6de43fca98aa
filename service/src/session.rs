//! Per-visitor state held by the server.
//!
//! Each [`Session`] stands for one open page: its search, the map drawn from
//! that search, and the chat transcript. Search and map sit behind one lock
//! so a new search and its map render are observed together. Chat has its
//! own lock, released while a message is in flight.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::chat::{ChatError, ChatMessage, ChatRelay, ChatReply, ChatSession};
use crate::map::{MapError, MapFrame, MapView};
use crate::search::{SearchController, SearchSession, SearchView};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session limit of {max} reached")]
    CapacityReached { max: usize },

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("chat relay task failed: {0}")]
    Relay(#[from] tokio::task::JoinError),
}

#[derive(Debug, Default)]
struct Directory {
    search: SearchSession,
    map: MapView,
}

/// Result of one chat send.
#[derive(Debug)]
pub struct ChatExchange {
    pub reply: ChatReply,
    /// Full transcript after the bot line was appended.
    pub transcript: Vec<ChatMessage>,
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    last_seen: std::sync::Mutex<Instant>,
    directory: Mutex<Directory>,
    chat: Mutex<ChatSession>,
}

impl Session {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            last_seen: std::sync::Mutex::new(Instant::now()),
            directory: Mutex::new(Directory::default()),
            chat: Mutex::new(ChatSession::new()),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Idle for at least `timeout` with no chat reply outstanding.
    fn is_expired(&self, timeout: Duration) -> bool {
        let idle = self
            .last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed();
        // A held chat lock means a send is being recorded right now
        let pending = match self.chat.try_lock() {
            Ok(chat) => chat.is_busy(),
            Err(_) => true,
        };
        idle >= timeout && !pending
    }

    /// Submit a zipcode and redraw the map from the new results.
    pub async fn search(&self, controller: &SearchController, zipcode: &str) -> SearchView {
        let mut directory = self.directory.lock().await;
        let located = directory.search.submit(controller, zipcode).located();
        directory.map.render(&located);
        directory.search.view()
    }

    pub async fn search_view(&self) -> SearchView {
        self.directory.lock().await.search.view()
    }

    /// `None` while there is nothing plotted.
    pub async fn map_frame(&self) -> Option<MapFrame> {
        self.directory.lock().await.map.frame()
    }

    /// # Errors
    ///
    /// See [`MapView::set_viewport`].
    pub async fn set_viewport(&self, lat: f64, lng: f64, zoom: f64) -> Result<MapFrame, MapError> {
        self.directory.lock().await.map.set_viewport(lat, lng, zoom)
    }

    /// # Errors
    ///
    /// See [`MapView::select`].
    pub async fn select(&self, id: u32) -> Result<MapFrame, MapError> {
        self.directory.lock().await.map.select(id)
    }

    pub async fn clear_selection(&self) -> Option<MapFrame> {
        self.directory.lock().await.map.clear_selection()
    }

    /// Transcript and whether a message is in flight.
    pub async fn chat_state(&self) -> (Vec<ChatMessage>, bool) {
        let chat = self.chat.lock().await;
        (chat.transcript().messages().to_vec(), chat.is_busy())
    }

    /// Send a chat message on behalf of the visitor.
    ///
    /// The relay runs on its own task holding a handle to the session, so the
    /// bot line is recorded and the busy flag cleared even if the caller stops
    /// waiting. The chat lock is not held during the request.
    ///
    /// # Errors
    ///
    /// [`SessionError::Chat`] for blank input or a send already in flight.
    pub async fn chat(
        self: &Arc<Self>,
        relay: &ChatRelay,
        input: &str,
    ) -> Result<ChatExchange, SessionError> {
        let text = self.chat.lock().await.begin(input)?;

        let session = Arc::clone(self);
        let relay = relay.clone();
        let exchange = tokio::spawn(async move {
            let reply = relay.send(&text).await;
            let mut chat = session.chat.lock().await;
            chat.finish(&reply);
            ChatExchange {
                reply,
                transcript: chat.transcript().messages().to_vec(),
            }
        })
        .await?;

        Ok(exchange)
    }
}

/// All live sessions, bounded by `max_sessions`.
///
/// A session not looked up for `idle_timeout` expires. Expired sessions are
/// dropped by [`SessionStore::evict_idle`], on lookup, and before a full store
/// refuses a new one.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            idle_timeout,
        }
    }

    /// Open a fresh session: not searched, nothing plotted, greeting only.
    ///
    /// # Errors
    ///
    /// [`SessionError::CapacityReached`] when the store is full of live sessions.
    pub async fn create(&self) -> Result<Arc<Session>, SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            self.retain_live(&mut sessions);
        }
        if sessions.len() >= self.max_sessions {
            tracing::warn!(max = self.max_sessions, "session capacity reached");
            return Err(SessionError::CapacityReached {
                max: self.max_sessions,
            });
        }
        let session = Arc::new(Session::new(Uuid::new_v4()));
        sessions.insert(session.id(), Arc::clone(&session));
        tracing::debug!(session_id = %session.id(), active = sessions.len(), "session created");
        Ok(session)
    }

    /// Look up a live session and mark it as used.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(&id).cloned()?;
        if session.is_expired(self.idle_timeout) {
            self.remove(id).await;
            return None;
        }
        session.touch();
        Some(session)
    }

    /// Returns whether a session was removed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!(session_id = %id, "session closed");
        }
        removed
    }

    /// Drop every expired session. Returns how many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.retain_live(&mut sessions)
    }

    /// Run [`SessionStore::evict_idle`] every `period` until the task is aborted.
    #[must_use]
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                store.evict_idle().await;
            }
        })
    }

    fn retain_live(&self, sessions: &mut HashMap<Uuid, Arc<Session>>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.idle_timeout));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, active = sessions.len(), "idle sessions expired");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
