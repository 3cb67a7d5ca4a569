// File: craftwatch-common/src/models/status.rs

/// Result of one status fetch against a tracked server.
///
/// `latency_ms` is the wall-clock round trip of the status request itself,
/// not a server-reported ping. `icon_bytes` is resolved by the fetcher so
/// rendering stays a pure function of the snapshot.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub online: bool,
    pub players_online: u32,
    pub players_max: u32,
    pub version: Option<String>,
    pub motd: Option<String>,
    pub icon_bytes: Option<Vec<u8>>,
    pub latency_ms: u64,
}
