//! Reddit OAuth authentication
//!
//! Handles:
//! - The authorization-code handshake
//! - Server-side sessions
//! - Session middleware

mod middleware;
mod oauth;
pub mod provider;
pub mod reddit;
pub mod session;

pub use middleware::{CurrentSession, load_session};
pub use oauth::auth_router;
pub use provider::{CallbackParams, OAuthProvider, Profile, RedirectInstruction};
pub use reddit::RedditProvider;
pub use session::{MemorySessionStore, SessionId, SessionRecord, SessionStore};
