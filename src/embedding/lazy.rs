//! Load-once model capability.
//!
//! A [`LazyModel`] owns the initializer for a model and runs it at most once, on first
//! use. Success is cached and shared by `Arc`; failure is recorded as a durable
//! "unavailable" state with its reason and is never retried. Call sites branch on
//! `Option<Arc<T>>` instead of on errors.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{info, warn};

type Initializer<T> = Box<dyn FnOnce() -> Result<Arc<T>, String> + Send>;

enum ModelState<T: ?Sized> {
    Ready(Arc<T>),
    Unavailable { reason: String },
}

pub struct LazyModel<T: ?Sized> {
    name: &'static str,
    state: OnceLock<ModelState<T>>,
    init: Mutex<Option<Initializer<T>>>,
}

impl<T: ?Sized> fmt::Debug for LazyModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state.get() {
            None => "uninitialized".to_string(),
            Some(ModelState::Ready(_)) => "ready".to_string(),
            Some(ModelState::Unavailable { reason }) => format!("unavailable: {reason}"),
        };
        f.debug_struct("LazyModel")
            .field("name", &self.name)
            .field("state", &state)
            .finish()
    }
}

impl<T: ?Sized> LazyModel<T> {
    /// Wraps an initializer that runs on first access.
    pub fn new<F, E>(name: &'static str, init: F) -> Self
    where
        F: FnOnce() -> Result<Arc<T>, E> + Send + 'static,
        E: fmt::Display,
    {
        Self {
            name,
            state: OnceLock::new(),
            init: Mutex::new(Some(Box::new(move || init().map_err(|e| e.to_string())))),
        }
    }

    /// A capability that is already loaded.
    pub fn ready(name: &'static str, model: Arc<T>) -> Self {
        Self::with_state(name, ModelState::Ready(model))
    }

    /// A capability that is permanently unavailable.
    pub fn unavailable(name: &'static str, reason: impl Into<String>) -> Self {
        Self::with_state(
            name,
            ModelState::Unavailable {
                reason: reason.into(),
            },
        )
    }

    fn with_state(name: &'static str, state: ModelState<T>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(state);
        Self {
            name,
            state: cell,
            init: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the model, initializing it on first call. Blocks while loading.
    pub fn get(&self) -> Option<Arc<T>> {
        match self.state.get_or_init(|| self.initialize()) {
            ModelState::Ready(model) => Some(Arc::clone(model)),
            ModelState::Unavailable { .. } => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// Reason recorded by a failed initialization (`None` while ready or uninitialized).
    pub fn unavailable_reason(&self) -> Option<String> {
        match self.state.get() {
            Some(ModelState::Unavailable { reason }) => Some(reason.clone()),
            _ => None,
        }
    }

    fn initialize(&self) -> ModelState<T> {
        let Some(init) = self.init.lock().take() else {
            return ModelState::Unavailable {
                reason: "initializer already consumed".to_string(),
            };
        };

        match init() {
            Ok(model) => {
                info!(model = self.name, "Model loaded");
                ModelState::Ready(model)
            }
            Err(reason) => {
                warn!(model = self.name, reason = %reason, "Model unavailable, stage will degrade");
                ModelState::Unavailable { reason }
            }
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> LazyModel<T> {
    /// Async variant of [`get`](Self::get): first-time loading runs on the blocking pool.
    pub async fn load(self: &Arc<Self>) -> Option<Arc<T>> {
        if self.is_initialized() {
            return self.get();
        }

        let this = Arc::clone(self);
        match tokio::task::spawn_blocking(move || this.get()).await {
            Ok(model) => model,
            Err(e) => {
                warn!(model = self.name, error = %e, "Model initialization task failed");
                None
            }
        }
    }
}
