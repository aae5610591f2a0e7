// crates/ragdoll_core/src/input/registry.rs
use ragdoll_shared::{InputConfig, KeyEventKind, KeyMode, RawKeyEvent};

use super::map::InputMap;
use super::output::OutputState;
use super::source::{KeyboardHub, Subscription};

/// One applied press or release, with every (channel, value) pair it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTransition {
    pub symbol: String,
    pub pressed: bool,
    pub affected: Vec<(String, String)>,
}

/// Classifies raw keyboard events into channels and owns the output state.
#[derive(Default)]
pub struct ChannelRegistry {
    map: InputMap,
    output: OutputState,
    mode: KeyMode,
    subscription: Option<Subscription>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a layout without attaching to any keyboard source.
    ///
    /// Rebuilds every table from scratch and empties the output state, so
    /// nothing from a previous layout survives.
    pub fn configure<I, S>(&mut self, config: &InputConfig, watched: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.unlisten();
        self.output.reset(config.channel_names());
        self.map = InputMap::build(config);
        for symbol in watched {
            self.map.watch(symbol.as_ref());
        }
        self.mode = config.options.mode;
        tracing::debug!(
            channels = config.channels.len(),
            mode = ?self.mode,
            "channel layout configured"
        );
    }

    /// `configure`, then attach to the hub. Any earlier listener is detached
    /// first, so a registry never holds more than one subscription.
    pub fn listen<I, S>(&mut self, hub: &KeyboardHub, config: &InputConfig, watched: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.configure(config, watched);
        self.subscription = Some(hub.subscribe());
    }

    pub fn unlisten(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    pub fn is_listening(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn next_event(&self) -> Option<RawKeyEvent> {
        self.subscription.as_ref()?.try_next()
    }

    pub fn output(&self) -> &OutputState {
        &self.output
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// Applies a raw event. `None` means the event was not consumed: the
    /// symbol is unmapped, a key repeat, or a release of a key not held.
    pub fn apply(&mut self, event: &RawKeyEvent) -> Option<KeyTransition> {
        let symbol = event.symbol(self.mode).to_string();
        match event.kind {
            KeyEventKind::Down => self.press(&symbol),
            KeyEventKind::Up => self.release(&symbol),
        }
    }

    pub fn press(&mut self, symbol: &str) -> Option<KeyTransition> {
        if !self.map.recognizes(symbol) || self.output.is_pressed(symbol) {
            return None;
        }

        let affected = self.map.pairs(symbol);
        for (channel, value) in &affected {
            self.output.push(channel, value, symbol);
        }
        self.output.press(symbol);

        Some(KeyTransition {
            symbol: symbol.to_string(),
            pressed: true,
            affected,
        })
    }

    pub fn release(&mut self, symbol: &str) -> Option<KeyTransition> {
        if !self.map.recognizes(symbol) || !self.output.is_pressed(symbol) {
            return None;
        }

        let affected = self.map.pairs(symbol);
        for (channel, value) in &affected {
            self.output.remove(channel, value, symbol);
        }
        self.output.release(symbol);

        Some(KeyTransition {
            symbol: symbol.to_string(),
            pressed: false,
            affected,
        })
    }
}
