// craftwatch-core/src/render/embed.rs
//
// Turns a StatusSnapshot into the platform-neutral NotificationPayload.
// Deterministic given its inputs; the caller supplies the timestamp so
// tests can pin it.

use ab_glyph::FontArc;
use chrono::{DateTime, Local};
use tracing::warn;

use craftwatch_common::models::notification::{ImageAsset, NotificationPayload, StatusSummary};
use craftwatch_common::models::status::StatusSnapshot;
use craftwatch_common::models::tracker::ServerKind;

use super::motd::render_motd_card;

pub const COLOR_ONLINE: u32 = 0x2ecc71;
pub const COLOR_OFFLINE: u32 = 0xe74c3c;

pub const MOTD_FILENAME: &str = "motd.png";
pub const ICON_FILENAME: &str = "icon.png";

pub struct Renderer {
    /// Font for the MOTD card. Without one, MOTD images are skipped and
    /// only the summary (plus icon) is published.
    font: Option<FontArc>,
}

impl Renderer {
    pub fn new(font: Option<FontArc>) -> Self {
        Self { font }
    }

    /// Load the MOTD font from a TTF/OTF file. A missing or unreadable
    /// font is reported so the caller can decide to run without MOTD
    /// cards.
    pub fn load_font(path: &str) -> Result<FontArc, craftwatch_common::Error> {
        let bytes = std::fs::read(path)?;
        FontArc::try_from_vec(bytes).map_err(|e| {
            craftwatch_common::Error::Render(format!("Invalid font file {}: {}", path, e))
        })
    }

    pub fn render(
        &self,
        snapshot: &StatusSnapshot,
        address: &str,
        kind: ServerKind,
        now: DateTime<Local>,
    ) -> NotificationPayload {
        let online = snapshot.online;
        let timestamp = now.format("%d/%m/%Y %H:%M").to_string();

        // Offline snapshots are fully normalized regardless of whatever
        // stale fields the fetch may have reported.
        let summary = StatusSummary {
            title: format!("Minecraft {} Server Status", kind.label()),
            address: format!("`{}`", address),
            status_line: if online { "🟢 ONLINE" } else { "🔴 OFFLINE" }.to_string(),
            version: if online {
                snapshot.version.clone().unwrap_or_else(|| "Unknown".to_string())
            } else {
                "Unknown".to_string()
            },
            players: if online {
                format!("{}/{}", snapshot.players_online, snapshot.players_max)
            } else {
                "0/0".to_string()
            },
            ping: format!("{}ms", snapshot.latency_ms),
            footer: if online {
                format!("Server is live! • {}", timestamp)
            } else {
                format!("Server is offline • {}", timestamp)
            },
            color: if online { COLOR_ONLINE } else { COLOR_OFFLINE },
        };

        let motd_image = if online {
            snapshot
                .motd
                .as_deref()
                .filter(|m| !m.is_empty())
                .and_then(|motd| self.render_motd(motd))
        } else {
            None
        };

        let icon_image = if online {
            snapshot.icon_bytes.as_ref().map(|bytes| ImageAsset {
                filename: ICON_FILENAME.to_string(),
                bytes: bytes.clone(),
            })
        } else {
            None
        };

        NotificationPayload {
            summary,
            motd_image,
            icon_image,
        }
    }

    // Any failure here costs only the MOTD card.
    fn render_motd(&self, motd: &str) -> Option<ImageAsset> {
        let Some(font) = &self.font else {
            warn!("No MOTD font configured; skipping MOTD image");
            return None;
        };
        match render_motd_card(font, motd) {
            Ok(bytes) => Some(ImageAsset {
                filename: MOTD_FILENAME.to_string(),
                bytes,
            }),
            Err(e) => {
                warn!("Error creating MOTD image: {}", e);
                None
            }
        }
    }
}
