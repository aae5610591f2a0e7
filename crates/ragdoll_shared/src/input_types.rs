// crates/ragdoll_shared/src/input_types.rs
//! Raw keyboard events and the channel layout that classifies them.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// A keyboard event as delivered by the platform.
///
/// `key` is the produced character or named key (`"w"`, `"Shift"`, `" "`),
/// `code` the physical, layout-independent identifier (`"KeyW"`, `"ShiftLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub kind: KeyEventKind,
    pub key: String,
    pub code: String,
    pub repeat: bool,
}

impl RawKeyEvent {
    pub fn down(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            kind: KeyEventKind::Down,
            key: key.into(),
            code: code.into(),
            repeat: false,
        }
    }

    pub fn up(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            kind: KeyEventKind::Up,
            key: key.into(),
            code: code.into(),
            repeat: false,
        }
    }

    pub fn is_down(&self) -> bool {
        self.kind == KeyEventKind::Down
    }

    /// The raw input identity under the given mode.
    pub fn symbol(&self, mode: KeyMode) -> &str {
        match mode {
            KeyMode::Key => &self.key,
            KeyMode::Code => &self.code,
        }
    }
}

/// Which field of a [`RawKeyEvent`] identifies the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    Key,
    #[default]
    Code,
}

/// How raw symbols feed one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelBinding {
    /// Each symbol activates the channel with itself as the value.
    Flat(Vec<String>),
    /// value name -> symbols that activate the channel with that value.
    Valued(IndexMap<String, Vec<String>>),
}

impl ChannelBinding {
    /// Every (symbol, value) pair this binding contributes, deduplicated.
    pub fn pairs(&self) -> IndexSet<(String, String)> {
        match self {
            ChannelBinding::Flat(symbols) => symbols
                .iter()
                .map(|symbol| (symbol.clone(), symbol.clone()))
                .collect(),
            ChannelBinding::Valued(values) => values
                .iter()
                .flat_map(|(value, symbols)| {
                    symbols.iter().map(move |symbol| (symbol.clone(), value.clone()))
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputOptions {
    #[serde(rename = "use", default)]
    pub mode: KeyMode,
}

/// Static channel layout, supplied before listening starts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub channels: IndexMap<String, ChannelBinding>,
    #[serde(default)]
    pub options: InputOptions,
}

impl InputConfig {
    pub fn new(mode: KeyMode) -> Self {
        Self {
            channels: IndexMap::new(),
            options: InputOptions { mode },
        }
    }

    /// Adds a channel whose symbols are their own values.
    pub fn flat<I, S>(mut self, channel: &str, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels.insert(
            channel.to_string(),
            ChannelBinding::Flat(symbols.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Adds one named value to a channel, creating the channel if needed.
    pub fn value<I, S>(mut self, channel: &str, value: &str, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
        let binding = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| ChannelBinding::Valued(IndexMap::new()));

        match binding {
            ChannelBinding::Valued(values) => {
                values.entry(value.to_string()).or_default().extend(symbols);
            }
            ChannelBinding::Flat(_) => {
                let mut values = IndexMap::new();
                values.insert(value.to_string(), symbols);
                *binding = ChannelBinding::Valued(values);
            }
        }
        self
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_follows_mode() {
        let event = RawKeyEvent::down("w", "KeyW");
        assert_eq!(event.symbol(KeyMode::Key), "w");
        assert_eq!(event.symbol(KeyMode::Code), "KeyW");
        assert!(event.is_down());
    }

    #[test]
    fn duplicate_entries_collapse() {
        let binding = ChannelBinding::Flat(vec!["Space".into(), "Space".into()]);
        assert_eq!(binding.pairs().len(), 1);
    }

    #[test]
    fn valued_pairs_keep_value_names() {
        let config = InputConfig::new(KeyMode::Code)
            .value("move", "forward", ["KeyW", "ArrowUp"])
            .value("move", "backward", ["KeyS"]);
        let pairs = config.channels["move"].pairs();
        assert!(pairs.contains(&("ArrowUp".to_string(), "forward".to_string())));
        assert!(pairs.contains(&("KeyS".to_string(), "backward".to_string())));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn layout_parses_from_ron() {
        let text = r#"(
            channels: {
                "move": { "forward": ["KeyW"], "backward": ["KeyS"] },
                "mods": ["ShiftLeft"],
            },
            options: ( use: key ),
        )"#;
        let config: InputConfig = ron::from_str(text).expect("layout should parse");
        assert_eq!(config.options.mode, KeyMode::Key);
        assert!(matches!(config.channels["mods"], ChannelBinding::Flat(_)));
        assert!(matches!(config.channels["move"], ChannelBinding::Valued(_)));
        assert_eq!(config.channel_names().collect::<Vec<_>>(), ["move", "mods"]);
    }
}
