//! Domain models for the inventory platform

mod business;
mod entity;
mod inventory;
mod role;
mod selection;

pub use business::*;
pub use entity::*;
pub use inventory::*;
pub use role::*;
pub use selection::*;
