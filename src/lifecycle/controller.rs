//! Registration lifecycle.
//!
//! # States
//! - Idle: `on_start` has not run yet
//! - Disabled: configuration was invalid; registration skipped for good
//! - Started: register request dispatched
//! - Stopped: unregister request dispatched
//!
//! # State Transitions
//! ```text
//! Idle → Disabled: on_start with invalid configuration
//! Idle → Started: on_start with valid configuration
//! Started → Stopped: on_stop
//! anything else: no-op
//! ```

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};

use crate::config::loader::env_snapshot;
use crate::config::validation::validate_env;
use crate::config::{DispatchPolicy, RawEnv, RegistrarConfig, RegistrarSettings};
use crate::http::{build_request, RequestIntent};
use crate::lifecycle::Shutdown;
use crate::observability::{LogLevel, LogSink};
use crate::resilience::{DispatchOutcome, Dispatcher};

/// Lifecycle state enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle = 0,
    Disabled = 1,
    Started = 2,
    Stopped = 3,
}

impl From<u8> for LifecycleState {
    fn from(val: u8) -> Self {
        match val {
            1 => LifecycleState::Disabled,
            2 => LifecycleState::Started,
            3 => LifecycleState::Stopped,
            _ => LifecycleState::Idle,
        }
    }
}

/// Join handle for a dispatch running on the runtime.
///
/// Dropping it leaves the dispatch running in the background.
#[derive(Debug)]
pub struct DispatchHandle {
    intent: RequestIntent,
    handle: JoinHandle<DispatchOutcome>,
}

impl DispatchHandle {
    pub fn intent(&self) -> RequestIntent {
        self.intent
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait up to `deadline` for the outcome. `None` if the deadline passed
    /// (the task keeps running) or the task was aborted.
    pub async fn wait(self, deadline: Duration) -> Option<DispatchOutcome> {
        match tokio::time::timeout(deadline, self.handle).await {
            Ok(Ok(outcome)) => Some(outcome),
            Ok(Err(e)) => {
                tracing::warn!(intent = %self.intent, error = %e, "Dispatch task did not complete");
                None
            }
            Err(_) => None,
        }
    }
}

/// Registers on start and unregisters on stop.
///
/// Both entry points are synchronous and return immediately; the network
/// I/O runs on the tokio runtime the controller was given.
pub struct LifecycleController {
    env: RawEnv,
    settings: RegistrarSettings,
    dispatcher: Arc<Dispatcher>,
    sink: Arc<dyn LogSink>,
    runtime: Handle,
    state: AtomicU8,
    /// Published by `on_start` before the state moves to `Started`.
    config: OnceLock<Arc<RegistrarConfig>>,
    /// Register task; aborted by `on_stop` so it cannot land after unregister.
    registration: OnceLock<AbortHandle>,
}

impl LifecycleController {
    /// Create a controller over an environment snapshot.
    pub fn new(
        env: RawEnv,
        settings: RegistrarSettings,
        sink: Arc<dyn LogSink>,
        runtime: Handle,
    ) -> Self {
        let dispatcher = Dispatcher::new(Arc::clone(&sink), Shutdown::new())
            .with_retry_delay(Duration::from_millis(settings.retry_delay_ms));
        Self {
            env,
            settings,
            dispatcher: Arc::new(dispatcher),
            sink,
            runtime,
            state: AtomicU8::new(LifecycleState::Idle as u8),
            config: OnceLock::new(),
            registration: OnceLock::new(),
        }
    }

    /// Create a controller over the current process environment.
    pub fn from_env(settings: RegistrarSettings, sink: Arc<dyn LogSink>, runtime: Handle) -> Self {
        Self::new(env_snapshot(), settings, sink, runtime)
    }

    /// Replace the dispatcher (custom client, delay or shutdown signal).
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Arc::new(dispatcher);
        self
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from(self.state.load(Ordering::Acquire))
    }

    /// The validated configuration, once `on_start` accepted it.
    pub fn config(&self) -> Option<&RegistrarConfig> {
        self.config.get().map(Arc::as_ref)
    }

    /// Signal that aborts in-flight dispatches when triggered.
    pub fn shutdown(&self) -> &Shutdown {
        self.dispatcher.shutdown()
    }

    /// Validate configuration and register with the registry.
    ///
    /// Returns the register dispatch, or `None` when registration is skipped.
    pub fn on_start(&self) -> Option<DispatchHandle> {
        let validated = validate_env(&self.env).map(Arc::new);
        let next = match &validated {
            Ok(config) => {
                // Publish before `Started` becomes visible to `on_stop`.
                let _ = self.config.set(Arc::clone(config));
                LifecycleState::Started
            }
            Err(_) => LifecycleState::Disabled,
        };

        if let Err(current) = self.state.compare_exchange(
            LifecycleState::Idle as u8,
            next as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            self.sink.log(
                LogLevel::Warning,
                &format!(
                    "Start requested in state {:?}; ignoring.",
                    LifecycleState::from(current)
                ),
            );
            return None;
        }

        self.sink.log(LogLevel::Info, "Registrar has been enabled!");

        let config = match validated {
            Ok(config) => config,
            Err(e) => {
                self.sink.log(LogLevel::Severe, &e.to_string());
                self.sink.log(
                    LogLevel::Severe,
                    "Missing or invalid environment variables. Registration will be skipped.",
                );
                return None;
            }
        };

        let intent = RequestIntent::registration(config.is_fallback);
        let sink = Arc::clone(&self.sink);
        let handle = self.spawn(intent, &config, self.settings.register, move |outcome, config| {
            if outcome.success {
                sink.log(
                    LogLevel::Info,
                    &format!(
                        "Registered server '{}' with proxy via {} (fallback={}).",
                        config.server_name,
                        intent.path(),
                        config.is_fallback
                    ),
                );
            } else {
                sink.log(
                    LogLevel::Severe,
                    &format!(
                        "Failed to register server '{}' with proxy after {} attempt(s).",
                        config.server_name, outcome.attempts
                    ),
                );
            }
        });
        let _ = self.registration.set(handle.handle.abort_handle());
        Some(handle)
    }

    /// Unregister from the registry if `on_start` registered.
    ///
    /// Best-effort: the host may exit before the returned dispatch finishes.
    pub fn on_stop(&self) -> Option<DispatchHandle> {
        if self
            .state
            .compare_exchange(
                LifecycleState::Started as u8,
                LifecycleState::Stopped as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            self.sink.log(
                LogLevel::Debug,
                &format!("Stop requested in state {:?}; nothing to unregister.", self.state()),
            );
            return None;
        }
        let config = Arc::clone(self.config.get()?);

        if let Some(registration) = self.registration.get() {
            if !registration.is_finished() {
                self.sink.log(
                    LogLevel::Debug,
                    "Register dispatch still running; cancelling it before unregister.",
                );
                registration.abort();
            }
        }

        let sink = Arc::clone(&self.sink);
        Some(self.spawn(
            RequestIntent::Unregister,
            &config,
            self.settings.unregister,
            move |outcome, config| {
                if outcome.success {
                    sink.log(
                        LogLevel::Info,
                        &format!("Unregistered server '{}' from proxy.", config.server_name),
                    );
                } else {
                    sink.log(
                        LogLevel::Warning,
                        &format!(
                            "Failed to unregister server '{}' from proxy.",
                            config.server_name
                        ),
                    );
                }
            },
        ))
    }

    fn spawn<F>(
        &self,
        intent: RequestIntent,
        config: &Arc<RegistrarConfig>,
        policy: DispatchPolicy,
        report: F,
    ) -> DispatchHandle
    where
        F: FnOnce(&DispatchOutcome, &RegistrarConfig) + Send + 'static,
    {
        let descriptor = build_request(config, intent);
        let dispatcher = Arc::clone(&self.dispatcher);
        let config = Arc::clone(config);

        let handle = self.runtime.spawn(async move {
            let outcome = dispatcher
                .dispatch(
                    &descriptor,
                    policy.max_attempts,
                    Duration::from_secs(policy.timeout_secs),
                )
                .await;
            report(&outcome, config.as_ref());
            outcome
        });

        DispatchHandle { intent, handle }
    }
}
