//! The pack/unpack boundary for the string-encoded sub-state carried inside
//! `watched_status`: season/episode markers for series and the repeat
//! completion counter with its date log.

use regex::Regex;
use std::sync::OnceLock;

fn season_episode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\s*\(S(\d+) E(\d+)\)\s*$").unwrap())
}

fn completed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^Completed\s*\((\d+)\)(?:\n(.*))?$").unwrap())
}

/// A status string split into its independent parts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnpackedStatus {
    pub status: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Splits a `<Status> (S<n> E<m>)` marker out of the status text. Statuses
/// without the marker come back whole.
pub fn unpack(watched_status: &str) -> UnpackedStatus {
    match season_episode_re().captures(watched_status) {
        Some(caps) => {
            let season = caps[2].parse().ok();
            let episode = caps[3].parse().ok();
            match (season, episode) {
                (Some(season), Some(episode)) => UnpackedStatus {
                    status: caps[1].to_string(),
                    season: Some(season),
                    episode: Some(episode),
                },
                // Out-of-range digits; keep the raw string.
                _ => UnpackedStatus {
                    status: watched_status.to_string(),
                    ..Default::default()
                },
            }
        }
        None => UnpackedStatus {
            status: watched_status.to_string(),
            ..Default::default()
        },
    }
}

/// Re-joins season/episode into the status text. Packing only happens when
/// both parts are present; otherwise the status passes through.
pub fn pack(status: &str, season: Option<u32>, episode: Option<u32>) -> String {
    match (season, episode) {
        (Some(season), Some(episode)) => format!("{} (S{} E{})", status, season, episode),
        _ => status.to_string(),
    }
}

/// The "mark watched" transform: an existing `Completed (<N>)` counter is
/// incremented and `today` appended to its date log; anything else becomes a
/// first completion.
pub fn mark_completed(watched_status: &str, today: &str) -> String {
    match completed_re().captures(watched_status) {
        Some(caps) => {
            let count: u64 = caps[1].parse().unwrap_or(0);
            let log = match caps.get(2).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
                Some(existing) => format!("{}, {}", existing, today),
                None => today.to_string(),
            };
            format!("Completed ({})\n{}", count + 1, log)
        }
        None => format!("Completed (1)\n{}", today),
    }
}
