pub mod coordinator;
pub mod process;
pub mod protocol;

pub use coordinator::{EngineCoordinator, EngineReply, RequestMove, Shutdown};
