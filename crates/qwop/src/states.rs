// crates/qwop/src/states.rs
use ragdoll_core::animation::{sync_time_from, LoopMode, StateSpec};

use crate::keybinds::{locomotion, DANCE_HELD};

pub const IDLE: &str = "idle";
pub const WALK: &str = "walk";
pub const RUN: &str = "run";
pub const WALK_BACKWARD: &str = "walk-backward";
pub const RUN_BACKWARD: &str = "run-backward";
pub const JUMP: &str = "jump";
pub const DANCE: &str = "dance";

/// Clips the character loads, default first.
pub const ANIMATIONS: [&str; 7] = [IDLE, WALK, WALK_BACKWARD, RUN, RUN_BACKWARD, JUMP, DANCE];

/// Locomotion clips that share a stride, so swapping between them keeps the phase.
const GAIT: [&str; 4] = [WALK, WALK_BACKWARD, RUN, RUN_BACKWARD];

pub fn character_states() -> Vec<StateSpec> {
    let mut states = vec![StateSpec::new(IDLE)];
    states.extend(GAIT.map(|name| StateSpec::new(name).on_enter(|props| sync_time_from(props, &GAIT))));
    states.push(jump());
    states.push(dance());
    states
}

fn jump() -> StateSpec {
    StateSpec::new(JUMP)
        .on_enter(|props| {
            if let Some(action) = props.action() {
                action.set_loop(LoopMode::Once);
            }
            props.play();
        })
        .on_finished(|props| {
            let next = props.input().map_or(IDLE, locomotion);
            props.change_state(next);
        })
}

fn dance() -> StateSpec {
    StateSpec::new(DANCE)
        .blend_duration(0.2)
        .on_enter(|props| {
            if let Some(action) = props.action() {
                action.set_loop(LoopMode::Once);
                action.clamp_when_finished = true;
            }
            props.play();
        })
        .on_update(|props| {
            if !props.state().flag(DANCE_HELD) {
                props.change_state(IDLE);
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdoll_core::animation::AnimationClip;
    use ragdoll_core::Entity;
    use ragdoll_shared::EntityOptions;

    fn player() -> Entity {
        let mut player = Entity::new("player", EntityOptions::default());
        player.add_states(character_states());
        player.set_default_anim(IDLE);
        let clips = [
            (IDLE, 2.0),
            (WALK, 2.0),
            (WALK_BACKWARD, 2.0),
            (RUN, 1.0),
            (RUN_BACKWARD, 1.0),
            (JUMP, 0.8),
            (DANCE, 3.0),
        ];
        for (name, duration) in clips {
            player.insert_clip(AnimationClip::new(name, duration));
        }
        player
    }

    fn action_time(player: &Entity, name: &str) -> f32 {
        let handle = player.animations()[name].action;
        player.mixer().action(handle).map_or(-1.0, |action| action.time)
    }

    #[test]
    fn run_keeps_walk_phase() {
        let mut player = player();
        assert!(player.change_state(WALK).entered());
        player.update(1.0, None);
        assert!((action_time(&player, WALK) - 1.0).abs() < 1e-5);

        assert!(player.change_state(RUN).entered());
        // 1.0s into a 2.0s walk is 0.5s into a 1.0s run.
        assert!((action_time(&player, RUN) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn backward_gait_shares_the_phase() {
        let mut player = player();
        player.change_state(RUN);
        player.update(0.25, None);
        assert!(player.change_state(RUN_BACKWARD).entered());
        assert!((action_time(&player, RUN_BACKWARD) - 0.25).abs() < 1e-5);

        player.update(0.25, None);
        assert!(player.change_state(WALK_BACKWARD).entered());
        // 0.5s into a 1.0s run is 1.0s into a 2.0s walk.
        assert!((action_time(&player, WALK_BACKWARD) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn idle_starts_from_zero() {
        let mut player = player();
        player.change_state(WALK);
        player.update(0.7, None);
        player.change_state(IDLE);
        assert_eq!(action_time(&player, IDLE), 0.0);
    }

    #[test]
    fn jump_plays_once_then_settles() {
        let mut player = player();
        assert!(player.change_state(JUMP).entered());
        player.update(0.5, None);
        assert_eq!(player.current_state(), Some(JUMP));
        player.update(0.5, None);
        assert_eq!(player.current_state(), Some(IDLE));
        assert_eq!(player.mixer().listener_count(), 0);
    }

    #[test]
    fn dance_leaves_once_the_key_is_up() {
        let mut player = player();
        player.state_mut().set_flag(DANCE_HELD, true);
        assert!(player.change_state(DANCE).entered());

        // Clamped on the last frame while the key is held.
        player.update(5.0, None);
        assert_eq!(player.current_state(), Some(DANCE));
        let handle = player.animations()[DANCE].action;
        assert!(player.mixer().action(handle).is_some_and(|action| action.paused));

        player.state_mut().set_flag(DANCE_HELD, false);
        player.update(0.1, None);
        assert_eq!(player.current_state(), Some(IDLE));
    }
}
