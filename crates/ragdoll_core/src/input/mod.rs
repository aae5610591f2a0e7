// crates/ragdoll_core/src/input/mod.rs
pub mod dispatcher;
pub mod map;
pub mod output;
pub mod pipeline;
pub mod poller;
pub mod registry;
pub mod source;
pub mod state_manager;

pub use dispatcher::{ChannelEvent, KeybindOptions, Keybinds};
pub use map::InputMap;
pub use output::OutputState;
pub use pipeline::Controls;
pub use registry::{ChannelRegistry, KeyTransition};
pub use source::{KeyboardHub, Subscription};
pub use state_manager::{ChannelStateManager, StateTrack, StateView};
