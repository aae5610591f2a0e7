// crates/ragdoll_ecs/src/lib.rs
//! Generational storage the animation mixer uses to own its actions and
//! finished listeners without handing out references.

mod entity;
mod storage;
mod world;

pub use entity::Handle;
pub use storage::SparseSet;
pub use world::Arena;
