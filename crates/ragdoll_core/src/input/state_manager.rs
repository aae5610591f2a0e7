// crates/ragdoll_core/src/input/state_manager.rs
use std::collections::HashMap;

use ragdoll_shared::{Response, MANAGER_ORIGIN};

/// Previous/current pair of the last results seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateTrack {
    prev: Option<Response>,
    current: Option<Response>,
}

impl StateTrack {
    pub fn record(&mut self, response: Response) {
        self.prev = self.current.replace(response);
    }

    pub fn current(&self) -> Option<&Response> {
        self.current.as_ref()
    }

    pub fn prev(&self) -> Option<&Response> {
        self.prev.as_ref()
    }

    /// Message of the current result, if any.
    pub fn message(&self) -> Option<&str> {
        self.current.as_ref().map(|r| r.message.as_str())
    }

    pub fn prev_message(&self) -> Option<&str> {
        self.prev.as_ref().map(|r| r.message.as_str())
    }
}

/// What a transform sees: the channel's own history and the shared one.
pub struct StateView<'a> {
    pub channel: &'a StateTrack,
    pub global: &'a StateTrack,
}

pub type TransformFn = Box<dyn FnMut(&StateView<'_>) -> Option<String>>;

/// Per-channel and global result history, with optional per-channel
/// transforms that can rewrite or hold back a decision based on what other
/// channels did before.
#[derive(Default)]
pub struct ChannelStateManager {
    tracks: HashMap<String, StateTrack>,
    global: StateTrack,
    transforms: HashMap<String, TransformFn>,
}

impl ChannelStateManager {
    pub fn new<'a>(channels: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            tracks: channels
                .into_iter()
                .map(|channel| (channel.to_string(), StateTrack::default()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn transform<F>(mut self, channel: &str, transform: F) -> Self
    where
        F: FnMut(&StateView<'_>) -> Option<String> + 'static,
    {
        self.transforms.insert(channel.to_string(), Box::new(transform));
        self
    }

    pub fn track(&self, channel: &str) -> Option<&StateTrack> {
        self.tracks.get(channel)
    }

    pub fn global(&self) -> &StateTrack {
        &self.global
    }

    /// Records the all-released fallback in the global history. It belongs to
    /// no channel and is never transformed.
    pub fn record_default(&mut self, response: &Response) {
        self.global.record(response.clone());
    }

    /// Records the result, then returns what should be forwarded to `post`.
    /// `None` means the transform held the result back.
    pub fn process(&mut self, response: Response) -> Option<Response> {
        let channel = response.channel.clone().unwrap_or_default();
        let track = self.tracks.entry(channel.clone()).or_default();
        track.record(response.clone());
        self.global.record(response.clone());

        let Some(transform) = self.transforms.get_mut(&channel) else {
            return Some(response);
        };

        let view = StateView {
            channel: track,
            global: &self.global,
        };
        match transform(&view) {
            Some(message) => Some(Response {
                message,
                from: Some(MANAGER_ORIGIN.to_string()),
                ..response
            }),
            None => {
                tracing::trace!(channel = %channel, "result held back by channel transform");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(channel: &str, message: &str) -> Response {
        Response {
            channel: Some(channel.to_string()),
            ..Response::new(message)
        }
    }

    #[test]
    fn records_prev_and_current_per_channel_and_globally() {
        let mut manager = ChannelStateManager::new(["move", "jump"]);
        manager.process(on("move", "walk"));
        manager.process(on("jump", "jump"));
        manager.process(on("move", "run"));

        let moves = manager.track("move").expect("tracked");
        assert_eq!(moves.message(), Some("run"));
        assert_eq!(moves.prev_message(), Some("walk"));
        assert_eq!(manager.global().message(), Some("run"));
        assert_eq!(manager.global().prev_message(), Some("jump"));
    }

    #[test]
    fn untransformed_channel_forwards_raw_result() {
        let mut manager = ChannelStateManager::new(["move"]);
        let forwarded = manager.process(on("move", "walk")).expect("forwarded");
        assert_eq!(forwarded.message, "walk");
        assert_eq!(forwarded.from, None);
    }

    #[test]
    fn transform_sees_cross_channel_history() {
        let mut manager = ChannelStateManager::new(["move", "jump"]).transform("move", |view| {
            match (view.channel.prev_message(), view.channel.message()) {
                (Some("run"), Some("walk")) => Some("slow_down".to_string()),
                _ if view.global.prev_message() == Some("jump") => None,
                (_, message) => message.map(str::to_string),
            }
        });

        manager.process(on("move", "run"));
        let slowed = manager.process(on("move", "walk")).expect("forwarded");
        assert_eq!(slowed.message, "slow_down");
        assert_eq!(slowed.from.as_deref(), Some(MANAGER_ORIGIN));

        manager.process(on("jump", "jump"));
        assert!(manager.process(on("move", "run")).is_none());
        // History still advanced even though nothing was forwarded
        assert_eq!(manager.global().message(), Some("run"));
    }

    #[test]
    fn default_fallback_ends_a_jump_in_the_global_track() {
        let mut manager = ChannelStateManager::new(["move", "jump"]).transform("move", |view| {
            if view.global.prev_message() == Some("jump") {
                None
            } else {
                view.channel.message().map(str::to_string)
            }
        });
        manager.process(on("jump", "jump"));
        manager.record_default(&Response::fallback("idle", "Space"));
        assert_eq!(manager.global().prev_message(), Some("jump"));
        assert!(manager.global().current().is_some_and(Response::is_default));
        assert_eq!(manager.track("jump").and_then(StateTrack::message), Some("jump"));

        let walk = manager.process(on("move", "walk")).expect("no longer right after a jump");
        assert_eq!(walk.message, "walk");
    }
}
