// crates/ragdoll_core/src/input/poller.rs

use ragdoll_shared::{KeyEventKind, RawKeyEvent};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey, PhysicalKey};

/// Translates winit keyboard input into a raw key event. Keeps winit types
/// out of the input pipeline.
pub fn translate(event: &WindowEvent) -> Option<RawKeyEvent> {
    let WindowEvent::KeyboardInput { event: key_event, .. } = event else {
        return None;
    };
    raw_from_parts(
        key_event.physical_key,
        &key_event.logical_key,
        key_event.state,
        key_event.repeat,
    )
}

/// Builds a raw event from the pieces of a winit `KeyEvent`. Physical keys
/// winit cannot identify are dropped. Single characters are lowercased so a
/// key pressed before Shift and released after it keeps one symbol.
pub fn raw_from_parts(
    physical: PhysicalKey,
    logical: &Key,
    state: ElementState,
    repeat: bool,
) -> Option<RawKeyEvent> {
    let PhysicalKey::Code(keycode) = physical else {
        return None;
    };
    let key = match logical {
        Key::Character(text) if text.chars().count() == 1 => text.to_lowercase(),
        Key::Character(text) => text.to_string(),
        Key::Named(NamedKey::Space) => " ".to_string(),
        Key::Named(named) => format!("{named:?}"),
        Key::Dead(Some(ch)) => ch.to_string(),
        Key::Dead(None) | Key::Unidentified(_) => String::new(),
    };
    let kind = match state {
        ElementState::Pressed => KeyEventKind::Down,
        ElementState::Released => KeyEventKind::Up,
    };
    Some(RawKeyEvent {
        kind,
        key,
        code: format!("{keycode:?}"),
        repeat,
    })
}
