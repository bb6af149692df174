//! HTTP request handlers.

mod chat;
mod health;
mod version;

pub use chat::relay_chat;
pub use health::{livez, readyz};
pub use version::version;
