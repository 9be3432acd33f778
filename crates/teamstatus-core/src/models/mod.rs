//! Data models for the teams backend.
//!
//! - `Team`, `NewTeam`: a named group with two approval statuses and an
//!   ordered member list
//! - `ApprovalStatus`, `StatusField`: the manager/director approval cycle
//! - `Member`, `MemberPatch`: person records belonging to a team
//! - `MemberRef`: how a member is addressed (persisted id or position)

pub mod member;
pub mod team;

pub use member::{Gender, Member, MemberId, MemberPatch, MemberRef};
pub use team::{ApprovalStatus, NewTeam, StatusField, Team, TeamId};

use serde::{Deserialize, Deserializer};

/// Deserialize a field that the backend may send as `null`, falling back to
/// the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
