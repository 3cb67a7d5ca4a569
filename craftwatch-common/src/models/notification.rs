// File: craftwatch-common/src/models/notification.rs

/// A rendered image handed to the publisher as an in-memory buffer.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// The textual half of a rendered status notification. The Discord
/// publisher maps these onto embed fields; the struct itself is
/// platform-neutral.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSummary {
    pub title: String,
    pub address: String,
    pub status_line: String,
    pub version: String,
    pub players: String,
    pub ping: String,
    pub footer: String,
    /// Accent color, 0xRRGGBB.
    pub color: u32,
}

/// Everything the publisher needs to create or edit one status message.
/// Both images are independently optional; a missing image never blocks
/// the summary from being published.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
    pub summary: StatusSummary,
    pub motd_image: Option<ImageAsset>,
    pub icon_image: Option<ImageAsset>,
}
