//! AI systems (strategic layer logic)

pub mod fsm;
pub mod reactions;
pub mod threat;

// Re-export all systems
pub use fsm::*;
pub use reactions::*;
pub use threat::*;
