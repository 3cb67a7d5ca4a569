// ========================================================
// File: craftwatch-core/src/platforms/mcstatus/client.rs
// ========================================================
//
// mcstatus.io v2 client. One outbound request per fetch, latency measured
// wall-clock around the status call, no caching and no retry (the refresh
// engine owns the retry policy, which is deliberately "none").

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use tracing::warn;

use craftwatch_common::Error;
use craftwatch_common::models::status::StatusSnapshot;
use craftwatch_common::models::tracker::ServerKind;
use craftwatch_common::traits::platform_traits::StatusFetcher;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Status document for one server. Java and Bedrock responses share this
/// shape; fields a variant doesn't report stay `None`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub online: bool,
    pub players: Option<PlayersSection>,
    pub version: Option<VersionSection>,
    pub motd: Option<MotdSection>,
    /// Java only: a `data:image/png;base64,...` URI, or occasionally a URL.
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayersSection {
    pub online: u32,
    pub max: u32,
}

#[derive(Debug, Deserialize)]
pub struct VersionSection {
    /// Java reports `name_raw`; Bedrock reports `name`.
    pub name_raw: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MotdSection {
    pub clean: Option<String>,
}

pub struct McStatusClient {
    http: reqwest::Client,
    base_url: String,
}

impl McStatusClient {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the icon source into raw bytes. Failures only cost us the
    /// icon, never the snapshot.
    async fn resolve_icon(&self, icon: &str) -> Option<Vec<u8>> {
        if let Some(data) = icon.strip_prefix("data:") {
            let b64 = data.split_once(',').map(|(_, b)| b)?;
            return match BASE64.decode(b64) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!("Failed to decode icon data URI: {}", e);
                    None
                }
            };
        }

        match self.http.get(icon).send().await {
            Ok(resp) => match resp.error_for_status() {
                Ok(resp) => match resp.bytes().await {
                    Ok(bytes) => Some(bytes.to_vec()),
                    Err(e) => {
                        warn!("Failed to read icon body: {}", e);
                        None
                    }
                },
                Err(e) => {
                    warn!("Icon download returned error status: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to download server icon: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl StatusFetcher for McStatusClient {
    async fn fetch(&self, address: &str, kind: ServerKind) -> Result<StatusSnapshot, Error> {
        let url = format!("{}/{}/{}", self.base_url, kind.as_str(), address);

        let started = Instant::now();
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("{}: {}", address, e)))?
            .error_for_status()
            .map_err(|e| Error::Fetch(format!("{}: {}", address, e)))?;
        let body: StatusResponse = resp
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("{}: bad status document: {}", address, e)))?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let icon_bytes = match (&body.online, &body.icon) {
            (true, Some(icon)) => self.resolve_icon(icon).await,
            _ => None,
        };

        let version = body
            .version
            .and_then(|v| v.name_raw.or(v.name));

        Ok(StatusSnapshot {
            online: body.online,
            players_online: body.players.as_ref().map(|p| p.online).unwrap_or(0),
            players_max: body.players.as_ref().map(|p| p.max).unwrap_or(0),
            version,
            motd: body.motd.and_then(|m| m.clean),
            icon_bytes,
            latency_ms,
        })
    }
}
