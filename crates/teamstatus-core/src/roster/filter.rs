//! Search filtering over the roster.

use crate::models::Team;

/// Case-insensitive substring check. `needle` must already be lowercased.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// A team is visible when its name or any member's name contains the query,
/// ignoring case. An empty query matches everything.
pub fn team_matches(team: &Team, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    contains_ignore_case(&team.name, &query)
        || team
            .members
            .iter()
            .any(|m| contains_ignore_case(&m.name, &query))
}
