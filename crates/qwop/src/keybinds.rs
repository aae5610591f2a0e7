// crates/qwop/src/keybinds.rs
//! Channel layout, callbacks and the jump hold-back for the QWOP character.

use ragdoll_core::input::{ChannelStateManager, Keybinds, KeybindOptions, OutputState};
use ragdoll_core::Entity;
use ragdoll_shared::{ChannelResult, InputConfig, KeyMode, Response};

use crate::states::{DANCE, IDLE, JUMP, RUN, RUN_BACKWARD, WALK, WALK_BACKWARD};

pub const MOVE: &str = "move";
pub const TURN: &str = "turn";
pub const MODS: &str = "mods";
pub const JUMP_CHANNEL: &str = "jump";

pub const FORWARD: &str = "forward";
pub const BACKWARD: &str = "backward";
pub const LEFT: &str = "left";
pub const RIGHT: &str = "right";

/// Additive clip layered by the wave key.
pub const WAVE: &str = "wave";

/// State bag flags written by the key callbacks.
pub const DANCE_HELD: &str = "dance_held";
pub const WAVING: &str = "waving";

/// `(code, key)` pairs so the layout works under either key mode.
const FORWARD_KEYS: [(&str, &str); 2] = [("KeyW", "w"), ("ArrowUp", "ArrowUp")];
const BACKWARD_KEYS: [(&str, &str); 2] = [("KeyS", "s"), ("ArrowDown", "ArrowDown")];
const LEFT_KEYS: [(&str, &str); 2] = [("KeyA", "a"), ("ArrowLeft", "ArrowLeft")];
const RIGHT_KEYS: [(&str, &str); 2] = [("KeyD", "d"), ("ArrowRight", "ArrowRight")];
const MODS_KEYS: [(&str, &str); 2] = [("ShiftLeft", "Shift"), ("ShiftRight", "Shift")];
const JUMP_KEYS: [(&str, &str); 1] = [("Space", " ")];
const DANCE_KEY: (&str, &str) = ("KeyE", "e");
const WAVE_KEY: (&str, &str) = ("KeyQ", "q");

fn symbol(mode: KeyMode, (code, key): (&'static str, &'static str)) -> &'static str {
    match mode {
        KeyMode::Code => code,
        KeyMode::Key => key,
    }
}

fn symbols<const N: usize>(mode: KeyMode, pairs: [(&'static str, &'static str); N]) -> Vec<&'static str> {
    pairs.into_iter().map(|pair| symbol(mode, pair)).collect()
}

pub fn input_config(mode: KeyMode) -> InputConfig {
    InputConfig::new(mode)
        .value(MOVE, FORWARD, symbols(mode, FORWARD_KEYS))
        .value(MOVE, BACKWARD, symbols(mode, BACKWARD_KEYS))
        .value(TURN, LEFT, symbols(mode, LEFT_KEYS))
        .value(TURN, RIGHT, symbols(mode, RIGHT_KEYS))
        .flat(MODS, symbols(mode, MODS_KEYS))
        .flat(JUMP_CHANNEL, symbols(mode, JUMP_KEYS))
}

/// Locomotion state the held inputs ask for. The newest move key picks the
/// direction.
pub fn locomotion(input: &OutputState) -> &'static str {
    let running = input.is_active(MODS);
    match (input.head(MOVE), running) {
        (Some(BACKWARD), true) => RUN_BACKWARD,
        (Some(BACKWARD), false) => WALK_BACKWARD,
        (Some(_), true) => RUN,
        (Some(_), false) => WALK,
        (None, _) => IDLE,
    }
}

pub fn keybinds(mode: KeyMode) -> Keybinds<Entity> {
    Keybinds::new()
        .key(symbol(mode, DANCE_KEY), |player: &mut Entity, pressed| {
            player.state_mut().set_flag(DANCE_HELD, pressed);
            ChannelResult::from(pressed.then_some(DANCE))
        })
        .key(symbol(mode, WAVE_KEY), |player: &mut Entity, pressed| {
            if pressed {
                let on = player.state_mut().toggle(WAVING);
                player.toggle_addit_action(WAVE, 1.0, on, 1.0);
            }
            ChannelResult::None
        })
        .channel(MOVE, |_: &mut Entity, event| locomotion(event.input).into())
        .channel(JUMP_CHANNEL, |_: &mut Entity, event| {
            ChannelResult::from(event.pressed.then(|| Response::new(JUMP).from_origin(JUMP_CHANNEL)))
        })
        .post(post)
        .options(KeybindOptions {
            use_mods_channel: false,
            mods_channel: MODS.to_string(),
            primary_channel: MOVE.to_string(),
            default_message: IDLE.to_string(),
        })
}

/// A locomotion decision right after a jump is held back; the jump's
/// finished hook picks the follow-up instead.
pub fn state_manager() -> ChannelStateManager {
    ChannelStateManager::new([MOVE, TURN, MODS, JUMP_CHANNEL]).transform(MOVE, |view| {
        if view.global.prev_message() == Some(JUMP) {
            return None;
        }
        view.channel.message().map(str::to_string)
    })
}

fn post(player: &mut Entity, response: &Response) {
    // Let the one-shot finish; its finished hook reads the held keys.
    let jumping = player.current_state() == Some(JUMP);
    if response.is_default() {
        if !jumping {
            player.to_default_state();
        }
        return;
    }
    if jumping && response.channel.as_deref() == Some(MOVE) {
        tracing::trace!(state = %response.message, "locomotion deferred until the jump lands");
        return;
    }
    player.change_state(&response.message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_key_mode() {
        let by_code = input_config(KeyMode::Code);
        let pairs = by_code.channels[MOVE].pairs();
        assert!(pairs.contains(&("KeyW".to_string(), FORWARD.to_string())));
        assert!(pairs.contains(&("ArrowDown".to_string(), BACKWARD.to_string())));

        let by_key = input_config(KeyMode::Key);
        let mods = by_key.channels[MODS].pairs();
        assert_eq!(mods.len(), 1);
        assert!(by_key.channels[JUMP_CHANNEL]
            .pairs()
            .contains(&(" ".to_string(), " ".to_string())));
        assert_eq!(
            by_key.channel_names().collect::<Vec<_>>(),
            [MOVE, TURN, MODS, JUMP_CHANNEL]
        );
    }

    #[test]
    fn key_callbacks_are_mode_specific() {
        let by_code = keybinds(KeyMode::Code);
        let mut keys: Vec<&str> = by_code.key_symbols().collect();
        keys.sort_unstable();
        assert_eq!(keys, ["KeyE", "KeyQ"]);

        let by_key = keybinds(KeyMode::Key);
        let mut keys: Vec<&str> = by_key.key_symbols().collect();
        keys.sort_unstable();
        assert_eq!(keys, ["e", "q"]);
        assert_eq!(by_key.settings().default_message, IDLE);
    }

    #[test]
    fn newest_move_key_picks_the_gait() {
        use ragdoll_core::input::ChannelRegistry;

        let mut registry = ChannelRegistry::new();
        registry.configure(&input_config(KeyMode::Code), None::<&str>);
        assert_eq!(locomotion(registry.output()), IDLE);

        registry.press("KeyS");
        assert_eq!(locomotion(registry.output()), WALK_BACKWARD);
        registry.press("ShiftLeft");
        assert_eq!(locomotion(registry.output()), RUN_BACKWARD);
        registry.press("KeyW");
        assert_eq!(locomotion(registry.output()), RUN);
        registry.release("ShiftLeft");
        assert_eq!(locomotion(registry.output()), WALK);
        registry.release("KeyW");
        assert_eq!(locomotion(registry.output()), WALK_BACKWARD);
    }

    #[test]
    fn move_after_jump_is_held_back_once() {
        let mut manager = state_manager();
        let jump = Response {
            channel: Some(JUMP_CHANNEL.to_string()),
            ..Response::new(JUMP)
        };
        let walk = Response {
            channel: Some(MOVE.to_string()),
            ..Response::new(WALK)
        };

        assert_eq!(manager.process(jump), Some(Response {
            channel: Some(JUMP_CHANNEL.to_string()),
            ..Response::new(JUMP)
        }));
        assert_eq!(manager.process(walk.clone()), None);

        let forwarded = manager.process(walk).expect("second move goes through");
        assert_eq!(forwarded.message, WALK);
        assert_eq!(forwarded.from.as_deref(), Some(ragdoll_shared::MANAGER_ORIGIN));
    }
}
