//! llmbridge relay: per-room conversation orchestration.
//!
//! - **relay**: resolves a room's backend, records turns, calls the backend
//! - **commands**: the `!llm` command surface
//! - **room_lock**: per-room async locks serializing turns

pub mod commands;
pub mod relay;
pub mod room_lock;

pub use commands::{Command, RoomDescription, Setting};
pub use relay::Relay;
pub use room_lock::RoomLocks;
