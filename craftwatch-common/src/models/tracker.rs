// File: craftwatch-common/src/models/tracker.rs

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Which status protocol family a tracked server speaks. The string form
/// doubles as the status-API path segment and the persisted column value.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    Java,
    Bedrock,
}

impl ServerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerKind::Java => "java",
            ServerKind::Bedrock => "bedrock",
        }
    }

    /// Human-readable label used in embed titles.
    pub fn label(&self) -> &'static str {
        match self {
            ServerKind::Java => "Java",
            ServerKind::Bedrock => "Bedrock",
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServerKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "java" => Ok(ServerKind::Java),
            "bedrock" => Ok(ServerKind::Bedrock),
            _ => Err(format!("Unknown server kind: {}", s)),
        }
    }
}

/// Identifies one tracked status message: which guild it was registered in,
/// the channel it lives in, and the message currently carrying the status.
/// The message id component goes stale when the message is deleted; the
/// refresh engine rewrites it after recreating the message.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TrackedKey {
    pub guild_id: String,
    pub channel_id: String,
    pub message_id: String,
}

impl TrackedKey {
    pub fn new(guild_id: &str, channel_id: &str, message_id: &str) -> Self {
        Self {
            guild_id: guild_id.to_string(),
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
        }
    }

    /// The same key pointing at a different message in the same channel.
    pub fn with_message_id(&self, message_id: &str) -> Self {
        Self {
            guild_id: self.guild_id.clone(),
            channel_id: self.channel_id.clone(),
            message_id: message_id.to_string(),
        }
    }

    /// Colon-joined form used as the primary key in the registry table.
    /// This is an encoding detail of the store; in-memory code works with
    /// the structured triple.
    pub fn encode(&self) -> String {
        format!("{}:{}:{}", self.guild_id, self.channel_id, self.message_id)
    }

    pub fn decode(s: &str) -> Result<Self, String> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(g), Some(c), Some(m)) if !g.is_empty() && !c.is_empty() && !m.is_empty() => {
                Ok(Self::new(g, c, m))
            }
            _ => Err(format!("Malformed tracker key: {}", s)),
        }
    }
}

impl fmt::Display for TrackedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// The monitored endpoint behind a tracked message.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TrackedTarget {
    pub address: String,
    pub kind: ServerKind,
}
