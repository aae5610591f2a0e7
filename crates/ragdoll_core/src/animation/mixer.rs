// crates/ragdoll_core/src/animation/mixer.rs
use std::collections::HashMap;

use ragdoll_ecs::{Arena, Handle};

use super::action::{AnimationAction, AnimationClip};

pub type ActionHandle = Handle;
pub type ListenerHandle = Handle;

/// A one-shot action reached its end; delivered once per listener on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedEvent {
    pub action: ActionHandle,
    pub listener: ListenerHandle,
}

/// Owns every action of one actor and advances them together.
#[derive(Default)]
pub struct Mixer {
    actions: Arena<AnimationAction>,
    by_clip: HashMap<String, ActionHandle>,
    listeners: Arena<ActionHandle>,
    time: f32,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The action for `clip`, created on first request.
    pub fn clip_action(&mut self, clip: AnimationClip) -> ActionHandle {
        if let Some(&handle) = self.by_clip.get(&clip.name) {
            return handle;
        }
        let name = clip.name.clone();
        let handle = self.actions.insert(AnimationAction::new(clip));
        self.by_clip.insert(name, handle);
        handle
    }

    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle)
    }

    pub fn action_for(&self, clip_name: &str) -> Option<ActionHandle> {
        self.by_clip.get(clip_name).copied()
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionHandle, &AnimationAction)> {
        self.actions.iter()
    }

    /// Seconds of mixer time elapsed since creation.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Fades `from` out and `to` in over `duration`. With `warp`, each
    /// action's time scale is ramped so the two clips stay in step.
    pub fn cross_fade(&mut self, from: ActionHandle, to: ActionHandle, duration: f32, warp: bool) -> bool {
        let Some((outgoing, incoming)) = self.actions.get_pair_mut(from, to) else {
            return false;
        };
        outgoing.fade_out(duration);
        incoming.fade_in(duration);

        if warp && outgoing.duration() > 0.0 && incoming.duration() > 0.0 {
            let start_end = outgoing.duration() / incoming.duration();
            let end_start = incoming.duration() / outgoing.duration();
            outgoing.warp(1.0, start_end, duration);
            incoming.warp(end_start, 1.0, duration);
        }
        true
    }

    pub fn add_finished_listener(&mut self, action: ActionHandle) -> ListenerHandle {
        self.listeners.insert(action)
    }

    pub fn remove_finished_listener(&mut self, listener: ListenerHandle) -> bool {
        self.listeners.remove(listener).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn stop_all(&mut self) {
        for (_, action) in self.actions.iter_mut() {
            action.stop();
        }
    }

    pub fn update(&mut self, dt: f32) -> Vec<FinishedEvent> {
        self.time += dt;
        let mut finished = Vec::new();
        for (handle, action) in self.actions.iter_mut() {
            if action.advance(dt) {
                finished.push(handle);
            }
        }

        let mut events = Vec::new();
        for action in finished {
            events.extend(
                self.listeners
                    .iter()
                    .filter(|(_, target)| **target == action)
                    .map(|(listener, _)| FinishedEvent { action, listener }),
            );
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::action::LoopMode;

    #[test]
    fn clip_action_is_cached_per_clip() {
        let mut mixer = Mixer::new();
        let a = mixer.clip_action(AnimationClip::new("walk", 1.0));
        let b = mixer.clip_action(AnimationClip::new("walk", 1.0));
        assert_eq!(a, b);
        assert_eq!(mixer.action_for("walk"), Some(a));
    }

    #[test]
    fn cross_fade_with_warp_matches_durations() {
        let mut mixer = Mixer::new();
        let walk = mixer.clip_action(AnimationClip::new("walk", 1.0));
        let run = mixer.clip_action(AnimationClip::new("run", 0.5));
        assert!(mixer.cross_fade(walk, run, 0.5, true));

        let walk_action = mixer.action(walk).expect("live");
        let run_action = mixer.action(run).expect("live");
        assert_eq!(walk_action.effective_weight(), 1.0);
        assert_eq!(run_action.effective_weight(), 0.0);
        assert_eq!(run_action.effective_time_scale(), 0.5);
        assert!(!mixer.cross_fade(walk, walk, 0.5, true));
    }

    #[test]
    fn finished_goes_only_to_listeners_of_that_action() {
        let mut mixer = Mixer::new();
        let jump = mixer.clip_action(AnimationClip::new("jump", 1.0));
        let idle = mixer.clip_action(AnimationClip::new("idle", 2.0));
        mixer.action_mut(jump).expect("live").set_loop(LoopMode::Once).play();
        mixer.action_mut(idle).expect("live").play();

        let on_jump = mixer.add_finished_listener(jump);
        let on_idle = mixer.add_finished_listener(idle);
        assert!(mixer.update(0.5).is_empty());

        let events = mixer.update(0.6);
        assert_eq!(events, [FinishedEvent { action: jump, listener: on_jump }]);
        assert!(mixer.remove_finished_listener(on_idle));
        assert!(!mixer.remove_finished_listener(on_idle));
        assert_eq!(mixer.listener_count(), 1);
    }
}
