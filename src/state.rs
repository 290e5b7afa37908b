use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::ollama::{InferenceBackend, OllamaClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn InferenceBackend>,
    pub client_contexts: Arc<DashMap<String, ClientContext>>,
}

/// Bookkeeping for a connected session. The transcript itself is owned by
/// the connection task, not stored here.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub client_uid: String,
    pub turns: usize,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let backend = Arc::new(OllamaClient::from_config(&config.ollama_config)?);
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: Config, backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            config,
            backend,
            client_contexts: Arc::new(DashMap::new()),
        }
    }

    pub fn generate_client_uid(&self) -> String {
        Uuid::new_v4().to_string()
    }

    pub fn register_client(&self) -> String {
        let client_uid = self.generate_client_uid();
        self.client_contexts.insert(
            client_uid.clone(),
            ClientContext {
                client_uid: client_uid.clone(),
                turns: 0,
            },
        );
        client_uid
    }

    pub fn record_turn(&self, client_uid: &str) {
        if let Some(mut context) = self.client_contexts.get_mut(client_uid) {
            let context = context.value_mut();
            context.turns += 1;
            debug!("{} completed turn {}", context.client_uid, context.turns);
        }
    }

    pub fn unregister_client(&self, client_uid: &str) {
        self.client_contexts.remove(client_uid);
    }

    pub fn active_sessions(&self) -> usize {
        self.client_contexts.len()
    }
}
