//! Ubicasure Services - the state holders the app's screens bind to.
//!
//! This crate provides the service trait, the application context that wires
//! everything together, and the concrete services:
//! - Session (sign-in, sign-out, persisted identity)
//! - Registration (credential account, then backend profile)
//! - Password reset
//! - Station directory (nearby fire and police stations)
//! - Chats (existence check, open-or-create, listing, deletion)
//! - Messages (text and image dispatch)
//! - Panic alerts (fire-and-forget)
//! - Event bus (typed intra-service notifications)

pub mod service;
pub mod context;
pub mod event_bus;
pub mod identity;
pub mod session;
pub mod registration;
pub mod password_reset;
pub mod station;
pub mod chat;
pub mod message;
pub mod alert;

// Re-export key types
pub use service::{Service, ServiceState};
pub use context::AppContext;
pub use event_bus::{AppEvent, EventBus};
pub use identity::{AuthenticatedUser, FirebaseIdentityProvider, IdentityProvider, UnconfiguredIdentityProvider};
pub use session::SessionService;
pub use registration::{RegistrationForm, RegistrationService};
pub use password_reset::PasswordResetService;
pub use station::{StationService, StationsView};
pub use chat::{ChatOpened, ChatService, ChatsView};
pub use message::MessageService;
pub use alert::AlertService;
