//! Session management module

pub mod events;
pub mod provider;
pub mod state;

pub use events::{AuthEvent, AuthEventKind, EventEmitter, HandlerId};
pub use provider::{ProviderBuilder, ProviderKeeperMobile, SignableMessage, TypedData};
pub use state::{ConnectOptions, SessionStatus, UserData};
