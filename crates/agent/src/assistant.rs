//! Session registry and turn entry point
//!
//! Each session sits behind its own async mutex, held for the whole turn, so
//! turns within one session run strictly in order while different sessions
//! proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use loan_assist_config::constants::sessions;
use loan_assist_config::Settings;
use loan_assist_core::LanguageCode;
use loan_assist_llm::create_language_model;
use loan_assist_persistence::JsonSessionStore;
use loan_assist_pipeline::{AudioGate, LanguageService, SarvamClient, SarvamConfig};

use crate::composer::ResponseComposer;
use crate::orchestrator::{DialogueOrchestrator, TurnOutcome, TurnRequest};
use crate::session::{Session, SessionSummary};
use crate::AgentError;

type SessionHandle = Arc<Mutex<Session>>;

pub struct LoanAssistant {
    orchestrator: DialogueOrchestrator,
    sessions: RwLock<HashMap<String, SessionHandle>>,
    store: Option<Arc<JsonSessionStore<Session>>>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl LoanAssistant {
    pub fn new(orchestrator: DialogueOrchestrator) -> Self {
        Self {
            orchestrator,
            sessions: RwLock::new(HashMap::new()),
            store: None,
            max_sessions: sessions::MAX_SESSIONS,
            idle_timeout: Duration::from_secs(sessions::IDLE_TIMEOUT_SECS),
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Attach a store and restore the sessions it holds
    pub async fn with_store(mut self, store: Arc<JsonSessionStore<Session>>) -> Self {
        let restored = store.load_all().await;
        {
            let mut map = self.sessions.write();
            for (id, session) in restored {
                map.insert(id, Arc::new(Mutex::new(session)));
            }
            tracing::info!(sessions = map.len(), "Restored sessions");
        }
        self.store = Some(store);
        self
    }

    /// Build the assistant from settings: Sarvam authority, optional LLM, optional store
    pub async fn from_settings(settings: &Settings) -> Result<Self, AgentError> {
        let client = SarvamClient::new(SarvamConfig::from_settings(&settings.language_service)?)?;
        let language = LanguageService::new(
            Arc::new(client),
            Duration::from_millis(settings.language_service.timeout_ms),
        );
        let gate = AudioGate::new(settings.audio.max_duration_secs);
        let composer = ResponseComposer::new(create_language_model(&settings.llm)?);

        let assistant = Self::new(DialogueOrchestrator::new(language, gate, composer))
            .with_max_sessions(settings.server.max_sessions)
            .with_idle_timeout(Duration::from_secs(settings.server.session_timeout_secs));

        if settings.persistence.enabled {
            let store = Arc::new(JsonSessionStore::open(&settings.persistence.path));
            Ok(assistant.with_store(store).await)
        } else {
            Ok(assistant)
        }
    }

    pub fn orchestrator(&self) -> &DialogueOrchestrator {
        &self.orchestrator
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Create an empty session and return its id
    pub async fn create_session(
        &self,
        display_language: Option<LanguageCode>,
    ) -> Result<String, AgentError> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Session::new(&id, display_language);
        self.insert(&id, session.clone())?;
        self.persist(&session).await;

        tracing::info!(session_id = %id, "Created session");
        Ok(id)
    }

    fn insert(&self, id: &str, session: Session) -> Result<SessionHandle, AgentError> {
        let mut map = self.sessions.write();
        if let Some(existing) = map.get(id) {
            return Ok(existing.clone());
        }
        if map.len() >= self.max_sessions {
            return Err(AgentError::SessionLimit(self.max_sessions));
        }
        let handle = Arc::new(Mutex::new(session));
        map.insert(id.to_string(), handle.clone());
        Ok(handle)
    }

    fn handle(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().get(id).cloned()
    }

    /// Run one turn. An unknown id starts a new session under that id.
    pub async fn submit_turn(
        &self,
        session_id: &str,
        request: TurnRequest,
    ) -> Result<TurnOutcome, AgentError> {
        let handle = match self.handle(session_id) {
            Some(handle) => handle,
            None => {
                tracing::info!(session_id = %session_id, "Starting session on first turn");
                self.insert(session_id, Session::new(session_id, request.display_language))?
            }
        };

        let mut session = handle.lock().await;
        let outcome = self.orchestrator.run_turn(&mut session, request).await;
        // Ended or expired while the turn ran; writing it back would resurrect it
        if outcome.is_delivered() && self.is_registered(session_id, &handle) {
            self.persist(&session).await;
        }
        Ok(outcome)
    }

    fn is_registered(&self, id: &str, handle: &SessionHandle) -> bool {
        self.sessions
            .read()
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
    }

    /// Remove a session from the store once any turn in progress has finished
    async fn forget(&self, id: &str, handle: Option<SessionHandle>) {
        if let Some(handle) = handle {
            let _turn = handle.lock().await;
        }
        if let Some(store) = &self.store {
            store.remove(id).await;
        }
    }

    async fn persist(&self, session: &Session) {
        if let Some(store) = &self.store {
            store.put(&session.id, session.clone()).await;
        }
    }

    /// Snapshot of a session, waiting for any turn in progress
    pub async fn get_session(&self, session_id: &str) -> Result<Session, AgentError> {
        let handle = self
            .handle(session_id)
            .ok_or_else(|| AgentError::SessionNotFound(session_id.to_string()))?;
        let session = handle.lock().await;
        Ok(session.clone())
    }

    /// All sessions, most recently active first
    pub async fn list_sessions(&self) -> Vec<SessionSummary> {
        let handles: Vec<SessionHandle> = self.sessions.read().values().cloned().collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            summaries.push(handle.lock().await.summary());
        }
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    /// Drop a session from memory and the store
    pub async fn end_session(&self, session_id: &str) -> bool {
        let handle = self.sessions.write().remove(session_id);
        let removed = handle.is_some();
        self.forget(session_id, handle).await;
        if removed {
            tracing::info!(session_id = %session_id, "Ended session");
        }
        removed
    }

    /// Remove sessions idle longer than the idle timeout. Sessions mid-turn are skipped.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = {
            let map = self.sessions.read();
            map.iter()
                .filter(|(_, handle)| {
                    handle
                        .try_lock()
                        .map(|session| session.is_idle(self.idle_timeout, now))
                        .unwrap_or(false)
                })
                .map(|(id, _)| id.clone())
                .collect()
        };

        for id in &expired {
            let handle = self.sessions.write().remove(id);
            self.forget(id, handle).await;
            tracing::info!(session_id = %id, "Expired session");
        }
        expired.len()
    }
}
