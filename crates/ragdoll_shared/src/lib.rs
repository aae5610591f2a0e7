// crates/ragdoll_shared/src/lib.rs
//! Plain data shared by the input pipeline, the animation core and the demo.

pub mod components;
pub mod input_types;
pub mod response;

pub use components::{EntityOptions, Kinematics, StateBag, StateValue, Transform};
pub use input_types::{ChannelBinding, InputConfig, InputOptions, KeyEventKind, KeyMode, RawKeyEvent};
pub use response::{ChannelResult, Response, DEFAULT_ORIGIN, MANAGER_ORIGIN};
