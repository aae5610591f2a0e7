// crates/ragdoll_core/src/animation/mod.rs
pub mod action;
pub mod fsm;
pub mod loader;
pub mod mixer;
pub mod state;

pub use action::{AnimationAction, AnimationClip, LoopMode};
pub use fsm::{FiniteStateMachine, Transition};
pub use loader::{
    spawn_load, ClipLoader, LoadError, LoadEvent, LoadHandle, LoadModelsConfig, LoaderRegistry, ManifestLoader,
    ModelFormat,
};
pub use mixer::{ActionHandle, FinishedEvent, ListenerHandle, Mixer};
pub use state::{sync_time_from, Animation, AnimationContext, AnimationState, Animations, StateProps, StateSpec};
