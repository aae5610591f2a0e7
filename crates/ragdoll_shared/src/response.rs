// crates/ragdoll_shared/src/response.rs
//! Results produced by key/channel callbacks and consumed by `post`.

use serde::{Deserialize, Serialize};

/// Origin tag carried by the synthetic "everything released" result.
pub const DEFAULT_ORIGIN: &str = "default";
/// Origin tag of results rewritten by a channel state transform.
pub const MANAGER_ORIGIN: &str = "manager";

/// Normalized result record handed to `post`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
    /// Raw symbol that triggered the dispatch.
    pub key: Option<String>,
    pub channel: Option<String>,
    /// Value the callback was invoked with.
    pub value: Option<String>,
    /// Channel head at call time.
    pub channel_head: Option<String>,
    pub from: Option<String>,
}

impl Response {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn from_origin(mut self, origin: impl Into<String>) -> Self {
        self.from = Some(origin.into());
        self
    }

    /// The synthetic result posted once every input is released.
    pub fn fallback(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: Some(key.into()),
            from: Some(DEFAULT_ORIGIN.to_string()),
            ..Default::default()
        }
    }

    pub fn is_default(&self) -> bool {
        self.from.as_deref() == Some(DEFAULT_ORIGIN)
    }
}

/// What a key or channel callback asks the dispatcher to do.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelResult {
    /// No transition signaled.
    #[default]
    None,
    /// Cancel propagation for the whole event.
    Suppress,
    Message(String),
    Structured(Response),
}

impl From<&str> for ChannelResult {
    fn from(message: &str) -> Self {
        ChannelResult::Message(message.to_string())
    }
}

impl From<String> for ChannelResult {
    fn from(message: String) -> Self {
        ChannelResult::Message(message)
    }
}

impl From<Response> for ChannelResult {
    fn from(response: Response) -> Self {
        ChannelResult::Structured(response)
    }
}

impl<T: Into<ChannelResult>> From<Option<T>> for ChannelResult {
    fn from(result: Option<T>) -> Self {
        result.map_or(ChannelResult::None, Into::into)
    }
}
