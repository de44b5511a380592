//! Guild id extraction from Warcraft Logs guild URLs.

use crate::libs::pipeline::RunError;

/// Parses the numeric guild id out of a guild page URL such as
/// `https://www.warcraftlogs.com/guild/id/260153`, or a bare id.
///
/// Query strings and fragments are ignored.
pub fn parse_guild_id(input: &str) -> Result<u64, RunError> {
    let trimmed = input.trim();
    if let Ok(id) = trimmed.parse::<u64>() {
        return Ok(id);
    }

    let path = trimmed.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    segments
        .iter()
        .position(|s| *s == "id")
        .and_then(|at| segments.get(at + 1))
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| RunError::MalformedGuild(input.to_string()))
}
