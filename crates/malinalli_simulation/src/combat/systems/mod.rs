//! Combat systems (strategic layer logic)

pub mod damage;
pub mod poison;
pub mod projectile;
pub mod strike;


// Re-export all systems
pub use damage::*;
pub use poison::*;
pub use projectile::*;
pub use strike::*;
