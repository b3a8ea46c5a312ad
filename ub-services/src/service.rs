//! Lifecycle shared by the services held in `AppContext`.

use ub_core::error::UbResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Created,
    Running,
    Stopped,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopped => "stopped",
        })
    }
}

/// A state holder the context starts in order and stops in reverse.
pub trait Service: Send + Sync {
    fn name(&self) -> &str;

    fn state(&self) -> ServiceState;

    /// Runs once, before any front end touches the service.
    fn init(&mut self) -> UbResult<()>;

    fn shutdown(&mut self) -> UbResult<()>;

    /// Reported by `AppContext::health`.
    fn is_healthy(&self) -> bool {
        self.state() == ServiceState::Running
    }
}
