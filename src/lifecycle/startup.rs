//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every subsystem from a validated configuration
//! - Load, clean and periodically persist the translation cache
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The backend is injected as `Arc<dyn Translator>` so tests can run the
//!   full gateway against a stub
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::cache::{CacheError, TranslationCache};
use crate::config::{ConfigError, GatewayConfig};
use crate::health::Readiness;
use crate::http::{AppState, HttpServer};
use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};
use crate::lifecycle::signals::save_cache;
use crate::translation::backend::{BackendError, Translator};
use crate::translation::dispatcher::Dispatcher;
use crate::translation::languages::LanguageRegistry;
use crate::translation::openai::OpenAiTranslator;
use crate::translation::validator::Validator;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("backend setup failed: {0}")]
    Backend(#[from] BackendError),

    #[error("cache setup failed: {0}")]
    Cache(#[from] CacheError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully wired gateway, ready to serve.
pub struct Gateway {
    config: GatewayConfig,
    state: AppState,
    cache: Option<TranslationCache>,
    shutdown: Shutdown,
}

impl Gateway {
    /// Wire the gateway against the configured OpenAI-compatible backend.
    pub fn from_config(config: GatewayConfig) -> Result<Self, StartupError> {
        let backend = OpenAiTranslator::new(&config.backend)?;
        tracing::info!(
            endpoint = %backend.endpoint(),
            model = %config.backend.model,
            "Translation backend initialized"
        );
        Self::build(config, Arc::new(backend))
    }

    /// Wire the gateway against any translator.
    pub fn build(config: GatewayConfig, backend: Arc<dyn Translator>) -> Result<Self, StartupError> {
        let languages = LanguageRegistry::new(&config.languages.extra_codes);
        tracing::info!(languages = languages.len(), "Language registry ready");
        let validator = Validator::new(languages, config.validation.max_text_chars);

        let mut dispatcher = Dispatcher::new(backend, Duration::from_secs(config.backend.deadline_secs))
            .with_slot_limit(config.listener.max_in_flight);
        let cache = if config.cache.enabled {
            let cache = TranslationCache::open(&config.cache.path)?;
            let removed = cache.cleanup(config.cache.cleanup_days);
            let stats = cache.stats(config.cache.threshold, config.cache.cleanup_days);
            tracing::info!(
                path = %config.cache.path,
                removed,
                total = stats.total,
                active = stats.active,
                threshold = config.cache.threshold,
                "Translation cache ready"
            );
            dispatcher = dispatcher.with_cache(cache.clone(), config.cache.threshold);
            Some(cache)
        } else {
            tracing::info!("Translation cache disabled");
            None
        };

        let state = AppState::new(validator, dispatcher, Readiness::new(false));

        Ok(Self {
            config,
            state,
            cache,
            shutdown: Shutdown::new(),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn cache(&self) -> Option<&TranslationCache> {
        self.cache.as_ref()
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Bind the configured listener address.
    pub async fn bind(&self) -> Result<TcpListener, StartupError> {
        let listener = TcpListener::bind(&self.config.listener.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Listening for connections");
        Ok(listener)
    }

    /// Serve on `listener` until the shutdown handle fires.
    ///
    /// On return the cache has been saved and background tasks have stopped.
    pub async fn serve(self, listener: TcpListener) -> Result<(), StartupError> {
        let Gateway {
            config,
            state,
            cache,
            shutdown,
        } = self;

        let autosave = match (&cache, config.cache.autosave_secs) {
            (Some(cache), secs) if secs > 0 => Some(tokio::spawn(autosave_loop(
                cache.clone(),
                Duration::from_secs(secs),
                shutdown.subscribe(),
            ))),
            _ => None,
        };
        let readiness_watch = watch_readiness(state.readiness.clone(), shutdown.subscribe());

        let server_shutdown = shutdown.subscribe();
        state.readiness.mark_ready();
        let result = HttpServer::new(config, state.clone())
            .run(listener, server_shutdown)
            .await;

        state.readiness.mark_unavailable();
        shutdown.trigger();
        readiness_watch.abort();
        if let Some(task) = autosave {
            let _ = task.await;
        }
        if let Some(cache) = cache {
            save_cache(cache).await;
        }

        tracing::info!("Gateway stopped");
        result.map_err(StartupError::Io)
    }
}

fn watch_readiness(readiness: Readiness, mut shutdown: ShutdownSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        shutdown.triggered().await;
        readiness.mark_unavailable();
    })
}

async fn autosave_loop(cache: TranslationCache, every: Duration, mut shutdown: ShutdownSignal) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => save_cache(cache.clone()).await,
            _ = shutdown.triggered() => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Translator for Echo {
        async fn translate(&self, _from: &str, _to: &str, text: &str) -> Result<String, BackendError> {
            Ok(text.to_string())
        }
    }

    fn config_in(dir: &std::path::Path) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();
        config.backend.api_key = "sk-test".to_string();
        config.cache.path = dir.join("cache.jsonl").display().to_string();
        config
    }

    #[tokio::test]
    async fn test_serve_marks_ready_and_saves_cache_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let cache_path = dir.path().join("cache.jsonl");

        let gateway = Gateway::build(config, Arc::new(Echo)).unwrap();
        let readiness = gateway.state().readiness.clone();
        let shutdown = gateway.shutdown().clone();
        let cache = gateway.cache().cloned().unwrap();
        cache.record("kor", "eng", "a", "A");

        let listener = gateway.bind().await.unwrap();
        let server = tokio::spawn(gateway.serve(listener));

        for _ in 0..50 {
            if readiness.is_ready() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(readiness.is_ready());

        shutdown.trigger();
        server.await.unwrap().unwrap();
        assert!(!readiness.is_ready());
        assert_eq!(TranslationCache::open(&cache_path).unwrap().len(), 1);
    }

    #[test]
    fn test_disabled_cache_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.cache.enabled = false;
        let gateway = Gateway::build(config, Arc::new(Echo)).unwrap();
        assert!(gateway.cache().is_none());
    }
}
