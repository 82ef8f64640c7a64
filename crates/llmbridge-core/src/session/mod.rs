//! Durable per-room state: overrides and the conversation transcript.

pub mod pool;
pub mod store;

pub use pool::DatabasePool;
pub use store::{Session, SessionStore};
