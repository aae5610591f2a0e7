// crates/ragdoll_core/src/input/pipeline.rs
use ragdoll_shared::{InputConfig, RawKeyEvent, Response};

use super::dispatcher::Keybinds;
use super::output::OutputState;
use super::registry::{ChannelRegistry, KeyTransition};
use super::source::KeyboardHub;
use super::state_manager::ChannelStateManager;

/// Registry, keybinds and optional state manager wired together for one
/// controlled context `C`.
pub struct Controls<C> {
    registry: ChannelRegistry,
    keybinds: Keybinds<C>,
    manager: Option<ChannelStateManager>,
}

impl<C> Controls<C> {
    pub fn new(keybinds: Keybinds<C>) -> Self {
        Self {
            registry: ChannelRegistry::new(),
            keybinds,
            manager: None,
        }
    }

    pub fn with_state_manager(mut self, manager: ChannelStateManager) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Installs the layout without a keyboard source; events go through `handle`.
    pub fn configure(&mut self, config: &InputConfig) {
        let watched = self.watched();
        self.registry.configure(config, watched);
    }

    pub fn listen(&mut self, hub: &KeyboardHub, config: &InputConfig) {
        let watched = self.watched();
        self.registry.listen(hub, config, watched);
    }

    pub fn unlisten(&mut self) {
        self.registry.unlisten();
    }

    pub fn is_listening(&self) -> bool {
        self.registry.is_listening()
    }

    pub fn input(&self) -> &OutputState {
        self.registry.output()
    }

    pub fn manager(&self) -> Option<&ChannelStateManager> {
        self.manager.as_ref()
    }

    /// Applies one raw event and dispatches it to completion.
    pub fn handle(&mut self, event: &RawKeyEvent, ctx: &mut C) -> Vec<Response> {
        match self.registry.apply(event) {
            Some(transition) => self.dispatch(&transition, ctx),
            None => Vec::new(),
        }
    }

    /// Drains every event queued on the hub subscription.
    pub fn pump(&mut self, ctx: &mut C) -> Vec<Response> {
        let mut posted = Vec::new();
        while let Some(event) = self.registry.next_event() {
            posted.extend(self.handle(&event, ctx));
        }
        posted
    }

    /// Releases every held input, newest first. Used when the window loses
    /// focus and the platform will not report the releases.
    pub fn release_all(&mut self, ctx: &mut C) -> Vec<Response> {
        let held = self.registry.output().pressed().to_vec();
        let mut posted = Vec::new();
        for symbol in held {
            if let Some(transition) = self.registry.release(&symbol) {
                posted.extend(self.dispatch(&transition, ctx));
            }
        }
        posted
    }

    fn dispatch(&mut self, transition: &KeyTransition, ctx: &mut C) -> Vec<Response> {
        tracing::trace!(
            key = %transition.symbol,
            pressed = transition.pressed,
            affected = transition.affected.len(),
            "input transition"
        );
        self.keybinds
            .dispatch(transition, self.registry.output(), ctx, self.manager.as_mut())
    }

    fn watched(&self) -> Vec<String> {
        self.keybinds.key_symbols().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdoll_shared::{ChannelResult, KeyMode};

    fn controls() -> Controls<Vec<String>> {
        let keybinds = Keybinds::new()
            .key("KeyE", |_: &mut Vec<String>, pressed| {
                ChannelResult::from(pressed.then_some("dance"))
            })
            .channel("move", |_: &mut Vec<String>, event| match event.head {
                Some(head) => head.into(),
                None => ChannelResult::None,
            })
            .post(|seen: &mut Vec<String>, response| seen.push(response.message.clone()));
        Controls::new(keybinds)
    }

    fn layout() -> InputConfig {
        InputConfig::new(KeyMode::Code)
            .value("move", "forward", ["KeyW"])
            .value("move", "backward", ["KeyS"])
    }

    #[test]
    fn pump_drains_hub_events_in_order() {
        let hub = KeyboardHub::new();
        let mut controls = controls();
        controls.listen(&hub, &layout());

        hub.emit(RawKeyEvent::down("w", "KeyW"));
        hub.emit(RawKeyEvent::down("w", "KeyW"));
        hub.emit(RawKeyEvent::down("s", "KeyS"));
        hub.emit(RawKeyEvent::down("e", "KeyE"));

        let mut seen = Vec::new();
        let posted = controls.pump(&mut seen);
        assert_eq!(posted.len(), 3);
        assert_eq!(seen, ["forward", "backward", "dance"]);
        assert_eq!(controls.input().pressed(), ["KeyE", "KeyS", "KeyW"]);
        assert!(controls.pump(&mut seen).is_empty());
    }

    #[test]
    fn release_all_ends_with_single_default() {
        let mut controls = controls();
        controls.configure(&layout());
        let mut seen = Vec::new();
        controls.handle(&RawKeyEvent::down("w", "KeyW"), &mut seen);
        controls.handle(&RawKeyEvent::down("s", "KeyS"), &mut seen);
        seen.clear();

        let posted = controls.release_all(&mut seen);
        assert_eq!(seen, ["forward", "default"]);
        assert!(posted.last().is_some_and(Response::is_default));
        assert!(controls.input().pressed().is_empty());
    }

    #[test]
    fn unlisten_stops_delivery() {
        let hub = KeyboardHub::new();
        let mut controls = controls();
        controls.listen(&hub, &layout());
        controls.unlisten();
        assert!(!controls.is_listening());
        assert_eq!(hub.emit(RawKeyEvent::down("w", "KeyW")), 0);
        assert!(controls.pump(&mut Vec::new()).is_empty());
    }
}
