//! Webhook receiver for Jinbot.
//!
//! External services (GitHub, Vercel, anything that can POST JSON) hit
//! a single endpoint authenticated by a shared secret. Payloads are
//! sniffed into a tagged source variant and run through that variant's
//! rule table; a payload with no matching rule is acknowledged without
//! producing an alert.

pub mod error;
pub mod handlers;
pub mod normalize;
pub mod router;
pub mod state;

pub use error::WebhookError;
pub use normalize::{normalize, sniff, WebhookSource};
pub use router::{create_router, serve};
pub use state::AppState;
