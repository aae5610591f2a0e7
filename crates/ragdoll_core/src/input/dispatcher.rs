// crates/ragdoll_core/src/input/dispatcher.rs
use std::collections::HashMap;

use ragdoll_shared::{ChannelResult, Response};

use super::output::OutputState;
use super::registry::KeyTransition;
use super::state_manager::ChannelStateManager;

/// What a channel callback is invoked with.
#[derive(Debug, Clone, Copy)]
pub struct ChannelEvent<'a> {
    pub channel: &'a str,
    /// Raw symbol that changed.
    pub key: &'a str,
    pub value: Option<&'a str>,
    pub head: Option<&'a str>,
    pub pressed: bool,
    /// Set when the primary channel is re-evaluated because the mods channel changed.
    pub via_mods: bool,
    pub input: &'a OutputState,
}

pub type KeyFn<C> = Box<dyn FnMut(&mut C, bool) -> ChannelResult>;
pub type ChannelFn<C> = Box<dyn FnMut(&mut C, &ChannelEvent<'_>) -> ChannelResult>;
pub type PostFn<C> = Box<dyn FnMut(&mut C, &Response)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeybindOptions {
    /// When false, the mods channel only gates the primary channel.
    pub use_mods_channel: bool,
    pub mods_channel: String,
    pub primary_channel: String,
    pub default_message: String,
}

impl Default for KeybindOptions {
    fn default() -> Self {
        Self {
            use_mods_channel: false,
            mods_channel: "mods".to_string(),
            primary_channel: "move".to_string(),
            default_message: "default".to_string(),
        }
    }
}

enum Outcome {
    Nothing,
    Suppress,
    Forward(Response),
}

/// Where a callback result came from; fills the blanks of a structured result.
struct Origin<'a> {
    key: &'a str,
    channel: Option<&'a str>,
    value: Option<&'a str>,
    head: Option<&'a str>,
}

impl Origin<'_> {
    fn normalize(&self, result: ChannelResult) -> Outcome {
        let mut response = match result {
            ChannelResult::None => return Outcome::Nothing,
            ChannelResult::Suppress => return Outcome::Suppress,
            ChannelResult::Message(message) => Response::new(message),
            ChannelResult::Structured(response) => response,
        };
        fill(&mut response.key, Some(self.key));
        fill(&mut response.channel, self.channel);
        fill(&mut response.value, self.value);
        fill(&mut response.channel_head, self.head);
        Outcome::Forward(response)
    }
}

fn fill(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        *slot = value.map(str::to_string);
    }
}

/// Callback tables paired with a channel layout, and the routing between them.
pub struct Keybinds<C> {
    keys: HashMap<String, KeyFn<C>>,
    channels: HashMap<String, ChannelFn<C>>,
    post: Option<PostFn<C>>,
    options: KeybindOptions,
}

impl<C> Default for Keybinds<C> {
    fn default() -> Self {
        Self {
            keys: HashMap::new(),
            channels: HashMap::new(),
            post: None,
            options: KeybindOptions::default(),
        }
    }
}

impl<C> Keybinds<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key<F>(mut self, symbol: &str, callback: F) -> Self
    where
        F: FnMut(&mut C, bool) -> ChannelResult + 'static,
    {
        self.keys.insert(symbol.to_string(), Box::new(callback));
        self
    }

    pub fn channel<F>(mut self, channel: &str, callback: F) -> Self
    where
        F: FnMut(&mut C, &ChannelEvent<'_>) -> ChannelResult + 'static,
    {
        self.channels.insert(channel.to_string(), Box::new(callback));
        self
    }

    pub fn post<F>(mut self, post: F) -> Self
    where
        F: FnMut(&mut C, &Response) + 'static,
    {
        self.post = Some(Box::new(post));
        self
    }

    pub fn options(mut self, options: KeybindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn settings(&self) -> &KeybindOptions {
        &self.options
    }

    /// Symbols with key callbacks. The registry must watch these.
    pub fn key_symbols(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Routes one applied transition. Returns every response handed to `post`,
    /// in order.
    pub fn dispatch(
        &mut self,
        transition: &KeyTransition,
        input: &OutputState,
        ctx: &mut C,
        manager: Option<&mut ChannelStateManager>,
    ) -> Vec<Response> {
        let mut posted = Vec::new();
        let released_all = !transition.pressed && input.pressed().is_empty();

        if let Some(callback) = self.keys.get_mut(&transition.symbol) {
            let result = callback(ctx, transition.pressed);
            let origin = Origin {
                key: &transition.symbol,
                channel: None,
                value: None,
                head: None,
            };
            if let (false, Outcome::Forward(response)) = (released_all, origin.normalize(result)) {
                self.emit(ctx, response, &mut posted);
            }
        }

        let mut suppressed = false;
        let mut last = None;
        for (channel, value) in &transition.affected {
            let outcome = if *channel == self.options.mods_channel && !self.options.use_mods_channel {
                self.reevaluate_primary(transition, input, ctx)
            } else {
                self.invoke_channel(channel, value, transition, input, ctx)
            };
            match outcome {
                Outcome::Nothing => {}
                Outcome::Suppress => suppressed = true,
                Outcome::Forward(response) => last = Some(response),
            }
        }

        if released_all {
            let fallback = Response::fallback(&self.options.default_message, &transition.symbol);
            tracing::trace!(key = %transition.symbol, "all inputs released");
            if let Some(manager) = manager {
                manager.record_default(&fallback);
            }
            self.emit(ctx, fallback, &mut posted);
            return posted;
        }
        if suppressed {
            tracing::trace!(key = %transition.symbol, "event suppressed");
            return posted;
        }

        let forwarded = match (last, manager) {
            (Some(response), Some(manager)) => manager.process(response),
            (last, _) => last,
        };
        if let Some(response) = forwarded {
            self.emit(ctx, response, &mut posted);
        }
        posted
    }

    fn invoke_channel(
        &mut self,
        channel: &str,
        value: &str,
        transition: &KeyTransition,
        input: &OutputState,
        ctx: &mut C,
    ) -> Outcome {
        let Some(callback) = self.channels.get_mut(channel) else {
            tracing::trace!(channel, "no callback for channel");
            return Outcome::Nothing;
        };
        let head = input.head(channel);
        let event = ChannelEvent {
            channel,
            key: &transition.symbol,
            value: Some(value),
            head,
            pressed: transition.pressed,
            via_mods: false,
            input,
        };
        let result = callback(ctx, &event);
        Origin {
            key: &transition.symbol,
            channel: Some(channel),
            value: Some(value),
            head,
        }
        .normalize(result)
    }

    // The modifier changed: let the primary channel observe it instead.
    fn reevaluate_primary(&mut self, transition: &KeyTransition, input: &OutputState, ctx: &mut C) -> Outcome {
        let primary = self.options.primary_channel.as_str();
        let Some(callback) = self.channels.get_mut(primary) else {
            return Outcome::Nothing;
        };
        let head = input.head(primary);
        let event = ChannelEvent {
            channel: primary,
            key: &transition.symbol,
            value: head,
            head,
            pressed: transition.pressed,
            via_mods: true,
            input,
        };
        let result = callback(ctx, &event);
        if head.is_none() {
            return Outcome::Nothing;
        }
        Origin {
            key: &transition.symbol,
            channel: Some(primary),
            value: head,
            head,
        }
        .normalize(result)
    }

    fn emit(&mut self, ctx: &mut C, response: Response, posted: &mut Vec<Response>) {
        if let Some(post) = self.post.as_mut() {
            post(ctx, &response);
        }
        posted.push(response);
    }
}
