// crates/ragdoll_core/src/animation/fsm.rs
use std::rc::Rc;

use indexmap::IndexMap;

use super::mixer::{ActionHandle, FinishedEvent};
use super::state::{AnimationContext, AnimationState, StateSpec};

/// Follow-up transitions requested by hooks are applied at most this deep.
const MAX_CHAIN: usize = 8;

/// Outcome of a `change_state` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Entered { from: Option<String>, to: String },
    /// Already in that state.
    Unchanged,
    NotReady,
    UnknownState,
    /// The state exists but its clip has not loaded.
    MissingClip,
}

impl Transition {
    pub fn entered(&self) -> bool {
        matches!(self, Transition::Entered { .. })
    }
}

#[derive(Debug, Default)]
pub struct FiniteStateMachine {
    states: IndexMap<String, Rc<StateSpec>>,
    current: Option<AnimationState>,
}

impl FiniteStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a state under its spec's name.
    pub fn add_state(&mut self, spec: StateSpec) {
        self.states.insert(spec.name().to_string(), Rc::new(spec));
    }

    pub fn add_states(&mut self, specs: impl IntoIterator<Item = StateSpec>) {
        for spec in specs {
            self.add_state(spec);
        }
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(AnimationState::name)
    }

    pub fn current(&self) -> Option<&AnimationState> {
        self.current.as_ref()
    }

    pub fn current_action(&self) -> Option<ActionHandle> {
        self.current.as_ref().map(AnimationState::action)
    }

    pub fn change_state(&mut self, name: &str, ctx: &mut AnimationContext<'_>) -> Transition {
        let (transition, next) = self.switch_to(name, ctx);
        self.follow(next, ctx);
        transition
    }

    /// Runs the current state's update hook, if there is a current state.
    pub fn update(&mut self, ctx: &mut AnimationContext<'_>, time_elapsed: f32) {
        let next = match &self.current {
            Some(state) => state.update(ctx, time_elapsed),
            None => return,
        };
        self.follow(next, ctx);
    }

    /// Routes a mixer finished event. Only the current state's own listener
    /// is honoured; events for listeners of departed states are dropped.
    pub fn finished(&mut self, event: FinishedEvent, ctx: &mut AnimationContext<'_>) -> bool {
        let next = match &self.current {
            Some(state) if state.listener() == Some(event.listener) => state.finished(ctx),
            _ => return false,
        };
        self.follow(next, ctx);
        true
    }

    fn follow(&mut self, mut next: Option<String>, ctx: &mut AnimationContext<'_>) {
        let mut depth = 0;
        while let Some(name) = next.take() {
            depth += 1;
            if depth > MAX_CHAIN {
                tracing::warn!(state = %name, "state change chain too deep, stopping");
                return;
            }
            next = self.switch_to(&name, ctx).1;
        }
    }

    fn switch_to(&mut self, name: &str, ctx: &mut AnimationContext<'_>) -> (Transition, Option<String>) {
        if !ctx.ready {
            return (Transition::NotReady, None);
        }
        let Some(spec) = self.states.get(name).cloned() else {
            tracing::debug!(state = name, "unknown state");
            return (Transition::UnknownState, None);
        };
        if self.current_name() == Some(name) {
            return (Transition::Unchanged, None);
        }
        let Some(action) = ctx.animations.get(name).map(|animation| animation.action) else {
            tracing::debug!(state = name, "clip not loaded");
            return (Transition::MissingClip, None);
        };

        let mut prev = self.current.take();
        if let Some(prev) = prev.as_mut() {
            prev.exit(ctx);
        }

        let mut state = AnimationState::new(spec, action);
        let from = prev.as_ref().map(|p| (p.name(), p.action()));
        let next = state.enter(ctx, from);
        self.current = Some(state);

        let from = prev.map(|p| p.name().to_string());
        tracing::debug!(from = ?from, to = name, "animation state changed");
        (
            Transition::Entered {
                from,
                to: name.to_string(),
            },
            next,
        )
    }
}
