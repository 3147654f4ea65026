//! AI components: Sensor, ThreatTable, TargetResolver, CombatFsm

pub mod fsm;
pub mod resolver;
pub mod sensor;
pub mod threat;


// Re-export all components
pub use fsm::*;
pub use resolver::*;
pub use sensor::*;
pub use threat::*;
