//! Conversation client for the dental chat relay.
//!
//! [`ChatSession`] holds the append-only conversation and the submission
//! state machine; [`RelayClient`] talks to the relay endpoint; [`run_turn`]
//! drives one submit/settle cycle.

mod message;
mod relay;
mod session;

pub use message::{Message, MessageKind};
pub use relay::{RelayClient, RelayError, RelayTransport, run_turn};
pub use session::{ChatConfig, ChatSession};
