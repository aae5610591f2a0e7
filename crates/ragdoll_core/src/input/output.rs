// crates/ragdoll_core/src/input/output.rs
use indexmap::IndexMap;

/// Live, queryable input state. Only the channel registry mutates it.
///
/// Each channel lists its active values newest first; index 0 is the channel
/// head. `pressed` lists held raw symbols, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputState {
    channels: IndexMap<String, Vec<String>>,
    // Parallel to `channels`: the raw symbol behind each entry.
    sources: IndexMap<String, Vec<String>>,
    pressed: Vec<String>,
}

impl OutputState {
    pub fn channel(&self, name: &str) -> &[String] {
        self.channels.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn head(&self, name: &str) -> Option<&str> {
        self.channel(name).first().map(String::as_str)
    }

    pub fn is_active(&self, name: &str) -> bool {
        !self.channel(name).is_empty()
    }

    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.channel(name).iter().any(|v| v == value)
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.channels
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn pressed(&self) -> &[String] {
        &self.pressed
    }

    pub fn is_pressed(&self, symbol: &str) -> bool {
        self.pressed.iter().any(|s| s == symbol)
    }

    pub(crate) fn reset<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        self.channels.clear();
        self.sources.clear();
        self.pressed.clear();
        for name in names {
            self.channels.insert(name.to_string(), Vec::new());
            self.sources.insert(name.to_string(), Vec::new());
        }
    }

    pub(crate) fn push(&mut self, channel: &str, value: &str, source: &str) {
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(0, value.to_string());
        self.sources
            .entry(channel.to_string())
            .or_default()
            .insert(0, source.to_string());
    }

    /// Removes the entry `source` contributed for `value`. Falls back to the
    /// last occurrence of `value`, the one least recently pushed.
    pub(crate) fn remove(&mut self, channel: &str, value: &str, source: &str) -> bool {
        let (Some(values), Some(sources)) =
            (self.channels.get_mut(channel), self.sources.get_mut(channel))
        else {
            return false;
        };

        let exact = values
            .iter()
            .zip(sources.iter())
            .position(|(v, s)| v == value && s == source);
        match exact.or_else(|| values.iter().rposition(|v| v == value)) {
            Some(index) => {
                values.remove(index);
                sources.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn press(&mut self, symbol: &str) {
        self.pressed.insert(0, symbol.to_string());
    }

    pub(crate) fn release(&mut self, symbol: &str) {
        self.pressed.retain(|s| s != symbol);
    }
}
