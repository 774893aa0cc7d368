//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use loan_assist_agent::LoanAssistant;
use loan_assist_config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub assistant: Arc<LoanAssistant>,
}

impl AppState {
    pub fn new(config: Settings, assistant: LoanAssistant) -> Self {
        Self {
            config: Arc::new(config),
            assistant: Arc::new(assistant),
        }
    }

    /// Build the assistant from `config`
    pub async fn from_settings(config: Settings) -> Result<Self, loan_assist_agent::AgentError> {
        let assistant = LoanAssistant::from_settings(&config).await?;
        Ok(Self::new(config, assistant))
    }

    /// Periodically drop idle sessions.
    ///
    /// Returns a sender; sending `true` stops the task.
    pub fn start_cleanup_task(&self) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let assistant = Arc::clone(&self.assistant);
        let interval = Duration::from_secs(self.config.server.cleanup_interval_secs.max(1));

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let removed = assistant.cleanup_expired().await;
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = assistant.session_count(),
                                "Session cleanup"
                            );
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}
