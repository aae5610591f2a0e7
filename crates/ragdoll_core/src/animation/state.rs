// crates/ragdoll_core/src/animation/state.rs
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use ragdoll_shared::StateBag;

use super::action::{AnimationAction, AnimationClip};
use super::mixer::{ActionHandle, ListenerHandle, Mixer};
use crate::input::OutputState;

/// A loaded clip and the mixer action playing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub clip: AnimationClip,
    pub action: ActionHandle,
}

/// Loaded animations keyed by name, in load order.
pub type Animations = IndexMap<String, Animation>;

/// Everything a state hook may touch, borrowed from the owning entity.
pub struct AnimationContext<'a> {
    pub mixer: &'a mut Mixer,
    pub animations: &'a Animations,
    pub state: &'a mut StateBag,
    pub input: Option<&'a OutputState>,
    /// False until the entity has at least one clip.
    pub ready: bool,
}

/// The view a hook gets of its state, the previous state and the entity.
pub struct StateProps<'p, 'a> {
    ctx: &'p mut AnimationContext<'a>,
    name: &'p str,
    action: ActionHandle,
    prev: Option<(&'p str, ActionHandle)>,
    time_elapsed: f32,
    next: Option<String>,
}

impl<'p, 'a> StateProps<'p, 'a> {
    fn new(
        ctx: &'p mut AnimationContext<'a>,
        name: &'p str,
        action: ActionHandle,
        prev: Option<(&'p str, ActionHandle)>,
        time_elapsed: f32,
    ) -> Self {
        Self {
            ctx,
            name,
            action,
            prev,
            time_elapsed,
            next: None,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn action_handle(&self) -> ActionHandle {
        self.action
    }

    pub fn action(&mut self) -> Option<&mut AnimationAction> {
        self.ctx.mixer.action_mut(self.action)
    }

    pub fn prev_state(&self) -> Option<&str> {
        self.prev.map(|(name, _)| name)
    }

    pub fn prev_action(&mut self) -> Option<&mut AnimationAction> {
        let (_, handle) = self.prev?;
        self.ctx.mixer.action_mut(handle)
    }

    pub fn play(&mut self) {
        if let Some(action) = self.action() {
            action.play();
        }
    }

    /// Carries the previous clip's progress over by duration ratio:
    /// `time = prev.time * duration / prev.duration`. Applies only when the
    /// previous state is one of `names`, or to any previous state when
    /// `names` is empty.
    pub fn set_time_from_ratio(&mut self, names: &[&str]) -> bool {
        let Some((prev_name, prev_handle)) = self.prev else {
            return false;
        };
        if !names.is_empty() && !names.contains(&prev_name) {
            return false;
        }
        let Some(prev) = self.ctx.mixer.action(prev_handle) else {
            return false;
        };
        let (prev_time, prev_duration) = (prev.time, prev.duration());
        if prev_duration <= 0.0 {
            return false;
        }
        match self.action() {
            Some(action) => {
                action.time = prev_time * action.duration() / prev_duration;
                true
            }
            None => false,
        }
    }

    /// Requests a transition once the current hook returns.
    pub fn change_state(&mut self, name: &str) {
        self.next = Some(name.to_string());
    }

    pub fn input(&self) -> Option<&OutputState> {
        self.ctx.input
    }

    pub fn state(&mut self) -> &mut StateBag {
        self.ctx.state
    }

    pub fn mixer(&mut self) -> &mut Mixer {
        self.ctx.mixer
    }

    pub fn animations(&self) -> &Animations {
        self.ctx.animations
    }

    pub fn time_elapsed(&self) -> f32 {
        self.time_elapsed
    }
}

/// Enter hook body for locomotion clips that should keep their phase when
/// swapped for one another.
pub fn sync_time_from(props: &mut StateProps<'_, '_>, names: &[&str]) {
    props.set_time_from_ratio(names);
    props.play();
}

pub type Hook = Box<dyn Fn(&mut StateProps<'_, '_>)>;

pub const DEFAULT_BLEND: f32 = 0.5;

/// How one state behaves. Built once, instantiated on every entry.
pub struct StateSpec {
    name: String,
    blend_duration: f32,
    enter: Option<Hook>,
    update: Option<Hook>,
    finished: Option<Hook>,
    cleanup: Option<Hook>,
    exit: Option<Hook>,
}

impl fmt::Debug for StateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSpec")
            .field("name", &self.name)
            .field("blend_duration", &self.blend_duration)
            .field("finished", &self.finished.is_some())
            .finish_non_exhaustive()
    }
}

impl StateSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blend_duration: DEFAULT_BLEND,
            enter: None,
            update: None,
            finished: None,
            cleanup: None,
            exit: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blend(&self) -> f32 {
        self.blend_duration
    }

    pub fn blend_duration(mut self, seconds: f32) -> Self {
        self.blend_duration = seconds;
        self
    }

    /// Runs after the default enter work; must call `play` itself.
    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut StateProps<'_, '_>) + 'static,
    {
        self.enter = Some(Box::new(hook));
        self
    }

    pub fn on_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut StateProps<'_, '_>) + 'static,
    {
        self.update = Some(Box::new(hook));
        self
    }

    pub fn on_finished<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut StateProps<'_, '_>) + 'static,
    {
        self.finished = Some(Box::new(hook));
        self
    }

    /// Cleanup and exit hooks cannot request transitions; `change_state`
    /// from either is dropped.
    pub fn on_cleanup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut StateProps<'_, '_>) + 'static,
    {
        self.cleanup = Some(Box::new(hook));
        self
    }

    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut StateProps<'_, '_>) + 'static,
    {
        self.exit = Some(Box::new(hook));
        self
    }
}

/// A live FSM node: a spec bound to the entity's action of the same name.
#[derive(Debug)]
pub struct AnimationState {
    spec: Rc<StateSpec>,
    action: ActionHandle,
    listener: Option<ListenerHandle>,
}

impl AnimationState {
    pub fn new(spec: Rc<StateSpec>, action: ActionHandle) -> Self {
        Self {
            spec,
            action,
            listener: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn action(&self) -> ActionHandle {
        self.action
    }

    pub fn listener(&self) -> Option<ListenerHandle> {
        self.listener
    }

    /// Returns the follow-up state requested by the hook, if any.
    pub fn enter(&mut self, ctx: &mut AnimationContext<'_>, prev: Option<(&str, ActionHandle)>) -> Option<String> {
        if self.spec.finished.is_some() {
            self.listener = Some(ctx.mixer.add_finished_listener(self.action));
        }

        if let Some(action) = ctx.mixer.action_mut(self.action) {
            action.enabled = true;
            action.paused = false;
            action.time = 0.0;
            action.set_effective_time_scale(1.0);
            action.set_effective_weight(1.0);
        }
        if let Some((_, prev_action)) = prev {
            ctx.mixer
                .cross_fade(prev_action, self.action, self.spec.blend_duration, true);
        }

        let mut props = StateProps::new(ctx, &self.spec.name, self.action, prev, 0.0);
        match &self.spec.enter {
            Some(hook) => hook(&mut props),
            None => props.play(),
        }
        props.next
    }

    pub fn update(&self, ctx: &mut AnimationContext<'_>, time_elapsed: f32) -> Option<String> {
        self.run(self.spec.update.as_ref(), ctx, time_elapsed)
    }

    pub fn finished(&self, ctx: &mut AnimationContext<'_>) -> Option<String> {
        self.run(self.spec.finished.as_ref(), ctx, 0.0)
    }

    /// Cleanup hook, then detach the finished listener.
    pub fn cleanup(&mut self, ctx: &mut AnimationContext<'_>) {
        self.run_teardown("cleanup", self.spec.cleanup.as_ref(), ctx);
        if let Some(listener) = self.listener.take() {
            ctx.mixer.remove_finished_listener(listener);
        }
    }

    pub fn exit(&mut self, ctx: &mut AnimationContext<'_>) {
        self.run_teardown("exit", self.spec.exit.as_ref(), ctx);
        self.cleanup(ctx);
    }

    // The machine is already mid-transition here, so a requested state is dropped.
    fn run_teardown(&self, stage: &str, hook: Option<&Hook>, ctx: &mut AnimationContext<'_>) {
        if let Some(ignored) = self.run(hook, ctx, 0.0) {
            tracing::debug!(state = %self.spec.name, hook = stage, ignored = %ignored, "transition requested during teardown dropped");
        }
    }

    fn run(&self, hook: Option<&Hook>, ctx: &mut AnimationContext<'_>, time_elapsed: f32) -> Option<String> {
        let hook = hook?;
        let mut props = StateProps::new(ctx, &self.spec.name, self.action, None, time_elapsed);
        hook(&mut props);
        props.next
    }
}
