// crates/ragdoll_core/src/input/map.rs
use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use ragdoll_shared::InputConfig;

/// Lookup tables built once per channel configuration.
#[derive(Default, Debug)]
pub struct InputMap {
    channels_by_symbol: HashMap<String, IndexSet<String>>,
    values: HashMap<(String, String), IndexSet<String>>,
    watched: HashSet<String>,
}

impl InputMap {
    pub fn build(config: &InputConfig) -> Self {
        let mut map = Self::default();
        for (channel, binding) in &config.channels {
            for (symbol, value) in binding.pairs() {
                map.bind(&symbol, channel, &value);
            }
        }
        map
    }

    pub fn bind(&mut self, symbol: &str, channel: &str, value: &str) {
        self.channels_by_symbol
            .entry(symbol.to_string())
            .or_default()
            .insert(channel.to_string());
        self.values
            .entry((symbol.to_string(), channel.to_string()))
            .or_default()
            .insert(value.to_string());
    }

    /// Tracks a symbol in `pressed` without it feeding any channel.
    pub fn watch(&mut self, symbol: &str) {
        self.watched.insert(symbol.to_string());
    }

    pub fn recognizes(&self, symbol: &str) -> bool {
        self.channels_by_symbol.contains_key(symbol) || self.watched.contains(symbol)
    }

    pub fn channels_for(&self, symbol: &str) -> impl Iterator<Item = &str> {
        self.channels_by_symbol
            .get(symbol)
            .into_iter()
            .flat_map(|channels| channels.iter().map(String::as_str))
    }

    pub fn values_for(&self, symbol: &str, channel: &str) -> impl Iterator<Item = &str> {
        self.values
            .get(&(symbol.to_string(), channel.to_string()))
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    /// Every (channel, value) pair the symbol contributes, in layout order.
    pub fn pairs(&self, symbol: &str) -> Vec<(String, String)> {
        self.channels_for(symbol)
            .flat_map(|channel| {
                self.values_for(symbol, channel)
                    .map(move |value| (channel.to_string(), value.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdoll_shared::KeyMode;

    #[test]
    fn one_symbol_can_drive_two_channels() {
        let config = InputConfig::new(KeyMode::Code)
            .value("move", "forward", ["KeyW"])
            .flat("limbs", ["KeyW", "KeyQ"]);
        let map = InputMap::build(&config);

        assert_eq!(
            map.pairs("KeyW"),
            vec![
                ("move".to_string(), "forward".to_string()),
                ("limbs".to_string(), "KeyW".to_string()),
            ]
        );
        assert_eq!(map.channels_for("KeyQ").collect::<Vec<_>>(), ["limbs"]);
    }

    #[test]
    fn one_symbol_can_fan_out_inside_a_channel() {
        let config = InputConfig::new(KeyMode::Code)
            .value("pose", "left", ["KeyL"])
            .value("pose", "lean", ["KeyL"]);
        let map = InputMap::build(&config);
        assert_eq!(map.values_for("KeyL", "pose").collect::<Vec<_>>(), ["left", "lean"]);
    }

    #[test]
    fn watched_symbols_are_recognized_without_channels() {
        let mut map = InputMap::build(&InputConfig::new(KeyMode::Code));
        assert!(!map.recognizes("KeyE"));
        map.watch("KeyE");
        assert!(map.recognizes("KeyE"));
        assert!(map.pairs("KeyE").is_empty());
    }
}
