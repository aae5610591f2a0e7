// crates/ragdoll_core/src/entity.rs
use std::path::PathBuf;

use ragdoll_shared::{EntityOptions, Kinematics, StateBag, Transform};

use crate::animation::{
    spawn_load, ActionHandle, Animation, AnimationClip, AnimationContext, Animations, FiniteStateMachine,
    LoadEvent, LoadHandle, LoadModelsConfig, LoaderRegistry, Mixer, StateSpec, Transition,
};
use crate::input::OutputState;

pub type UpdateHook = Box<dyn FnMut(&mut Entity, f32)>;

/// An animated actor: its clips and mixer, its state machine, and where it
/// stands in the world.
pub struct Entity {
    name: String,
    options: EntityOptions,
    transform: Transform,
    kinematics: Kinematics,
    state: StateBag,

    mixer: Mixer,
    animations: Animations,
    default_anim: Option<String>,
    additive: Vec<String>,
    fsm: FiniteStateMachine,

    loading: Option<LoadHandle>,
    model_path: Option<String>,
    update_hooks: Vec<UpdateHook>,
}

impl Entity {
    pub fn new(name: impl Into<String>, options: EntityOptions) -> Self {
        Self {
            name: name.into(),
            options,
            transform: Transform {
                scale: options.scale,
                ..Default::default()
            },
            kinematics: options.kinematics,
            state: StateBag::default(),
            mixer: Mixer::new(),
            animations: Animations::new(),
            default_anim: None,
            additive: Vec::new(),
            fsm: FiniteStateMachine::new(),
            loading: None,
            model_path: None,
            update_hooks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &EntityOptions {
        &self.options
    }

    pub fn add_states(&mut self, specs: impl IntoIterator<Item = StateSpec>) {
        self.fsm.add_states(specs);
    }

    /// Starts loading every clip in `config` on a worker thread. The first
    /// animation becomes the default one.
    pub fn load_models(&mut self, config: &LoadModelsConfig, registry: &LoaderRegistry, root: impl Into<PathBuf>) {
        self.default_anim = config.default_anim();
        self.additive = config.additive_names();
        self.model_path = Some(config.model_path());
        self.loading = Some(spawn_load(config, registry, root));
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn model_path(&self) -> Option<&str> {
        self.model_path.as_deref()
    }

    /// Applies whatever the loader has produced so far. Returns how many
    /// events were applied.
    pub fn poll_loads(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.loading.as_ref().and_then(LoadHandle::try_next) {
            let done = matches!(event, LoadEvent::AllLoaded { .. });
            self.apply_load_event(event);
            applied += 1;
            if done {
                self.loading = None;
            }
        }
        applied
    }

    pub fn apply_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::ClipLoaded { clip, .. } => {
                self.insert_clip(clip);
            }
            LoadEvent::Failed { name, error } => {
                tracing::warn!(entity = %self.name, clip = %name, %error, "animation failed to load");
            }
            LoadEvent::AllLoaded { loaded, failed } => {
                tracing::debug!(entity = %self.name, loaded, failed, "animations loaded");
                self.to_default_state();
            }
        }
    }

    /// Registers a clip and its mixer action under the clip's name.
    pub fn insert_clip(&mut self, clip: AnimationClip) -> ActionHandle {
        let action = self.mixer.clip_action(clip.clone());
        self.animations
            .insert(clip.name.clone(), Animation { clip, action });
        action
    }

    pub fn ready_for_state_change(&self) -> bool {
        !self.animations.is_empty()
    }

    pub fn set_default_anim(&mut self, name: impl Into<String>) {
        self.default_anim = Some(name.into());
    }

    pub fn default_anim(&self) -> Option<&str> {
        self.default_anim.as_deref()
    }

    pub fn additive_names(&self) -> &[String] {
        &self.additive
    }

    pub fn change_state(&mut self, name: &str) -> Transition {
        let (fsm, mut ctx) = self.split(None);
        fsm.change_state(name, &mut ctx)
    }

    pub fn to_default_state(&mut self) -> Transition {
        match self.default_anim.clone() {
            Some(name) => self.change_state(&name),
            None => Transition::UnknownState,
        }
    }

    pub fn current_state(&self) -> Option<&str> {
        self.fsm.current_name()
    }

    /// Layers an additive clip on or off, independent of the state machine.
    pub fn toggle_addit_action(&mut self, name: &str, weight: f32, pressed: bool, time_scale: f32) -> bool {
        let Some(handle) = self.animations.get(name).map(|animation| animation.action) else {
            return false;
        };
        let Some(action) = self.mixer.action_mut(handle) else {
            return false;
        };
        if pressed {
            action
                .reset()
                .set_effective_time_scale(time_scale)
                .set_effective_weight(weight)
                .play();
        } else {
            action.stop();
        }
        true
    }

    /// Runs after the built-in update every frame.
    pub fn on_update<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Entity, f32) + 'static,
    {
        self.update_hooks.push(Box::new(hook));
    }

    pub fn update(&mut self, dt: f32, input: Option<&OutputState>) {
        {
            let (fsm, mut ctx) = self.split(input);
            fsm.update(&mut ctx, dt);
            for event in ctx.mixer.update(dt) {
                fsm.finished(event, &mut ctx);
            }
        }
        self.integrate(dt);

        let mut hooks = std::mem::take(&mut self.update_hooks);
        for hook in hooks.iter_mut() {
            hook(self, dt);
        }
        hooks.append(&mut self.update_hooks);
        self.update_hooks = hooks;
    }

    /// Velocity decays per axis, then moves the actor along its facing.
    fn integrate(&mut self, dt: f32) {
        let velocity = self.kinematics.velocity;
        let mut frame = velocity * self.kinematics.deceleration * dt;
        frame.z = frame.z.signum() * frame.z.abs().min(velocity.z.abs());
        self.kinematics.velocity += frame;

        let velocity = self.kinematics.velocity;
        let forward = self.transform.forward() * velocity.z * dt;
        let sideways = self.transform.sideways() * velocity.x * dt;
        self.transform.position += forward + sideways;
    }

    fn split<'a>(&'a mut self, input: Option<&'a OutputState>) -> (&'a mut FiniteStateMachine, AnimationContext<'a>) {
        let ready = self.ready_for_state_change();
        (
            &mut self.fsm,
            AnimationContext {
                mixer: &mut self.mixer,
                animations: &self.animations,
                state: &mut self.state,
                input,
                ready,
            },
        )
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    pub fn kinematics_mut(&mut self) -> &mut Kinematics {
        &mut self.kinematics
    }

    pub fn state(&self) -> &StateBag {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateBag {
        &mut self.state
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut Mixer {
        &mut self.mixer
    }

    pub fn animations(&self) -> &Animations {
        &self.animations
    }

    pub fn fsm(&self) -> &FiniteStateMachine {
        &self.fsm
    }
}
