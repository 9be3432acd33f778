use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::member::{Member, MemberRef};
use super::null_as_default;

/// Opaque team identity assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TeamId(String);

impl TeamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TeamId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Approval state of a single status field.
///
/// Activating a status control walks the fixed cycle
/// `none -> approved -> rejected -> none`. Anything the backend sends that is
/// not `approved` or `rejected` (including `null`) reads as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum ApprovalStatus {
    #[default]
    None,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// The next state in the activation cycle.
    pub fn next(self) -> Self {
        match self {
            ApprovalStatus::None => ApprovalStatus::Approved,
            ApprovalStatus::Approved => ApprovalStatus::Rejected,
            ApprovalStatus::Rejected => ApprovalStatus::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::None => "none",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// Hover/help text shown next to the status indicator.
    pub fn tooltip(self) -> &'static str {
        match self {
            ApprovalStatus::None => "No Action Taken",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Not Approved",
        }
    }
}

impl From<Option<String>> for ApprovalStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("approved") => ApprovalStatus::Approved,
            Some("rejected") => ApprovalStatus::Rejected,
            _ => ApprovalStatus::None,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two independent approval fields is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum StatusField {
    #[serde(rename = "managerStatus")]
    Manager,
    #[serde(rename = "directorStatus")]
    Director,
}

impl StatusField {
    /// Field name used on the wire.
    pub fn api_name(self) -> &'static str {
        match self {
            StatusField::Manager => "managerStatus",
            StatusField::Director => "directorStatus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusField::Manager => "Approved by Manager",
            StatusField::Director => "Approved by Director",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Team {
    #[serde(rename = "_id")]
    pub id: TeamId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<Member>,
    #[serde(rename = "managerStatus", default)]
    pub manager_status: ApprovalStatus,
    #[serde(rename = "directorStatus", default)]
    pub director_status: ApprovalStatus,
    /// Persisted position, when the backend reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    // Fields we don't model are carried through so a full rewrite keeps them
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl Team {
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            members: Vec::new(),
            manager_status: ApprovalStatus::None,
            director_status: ApprovalStatus::None,
            order: None,
            extra: Map::new(),
        }
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    pub fn status(&self, field: StatusField) -> ApprovalStatus {
        match field {
            StatusField::Manager => self.manager_status,
            StatusField::Director => self.director_status,
        }
    }

    pub fn set_status(&mut self, field: StatusField, value: ApprovalStatus) {
        match field {
            StatusField::Manager => self.manager_status = value,
            StatusField::Director => self.director_status = value,
        }
    }

    pub fn has_members(&self) -> bool {
        !self.members.is_empty()
    }

    /// Find a member by reference, returning its index and record.
    pub fn find_member(&self, member: &MemberRef) -> Option<(usize, &Member)> {
        self.members
            .iter()
            .enumerate()
            .find(|(index, m)| member.matches(*index, m))
    }
}

/// Payload for creating a team; the backend assigns the id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewTeam {
    pub name: String,
    pub description: String,
    pub members: Vec<Member>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_cycle_closes_after_three_steps() {
        for start in [ApprovalStatus::None, ApprovalStatus::Approved, ApprovalStatus::Rejected] {
            assert_eq!(start.next().next().next(), start);
        }
        assert_eq!(ApprovalStatus::None.next(), ApprovalStatus::Approved);
        assert_eq!(ApprovalStatus::Approved.next(), ApprovalStatus::Rejected);
        assert_eq!(ApprovalStatus::Rejected.next(), ApprovalStatus::None);
    }

    #[test]
    fn test_status_reads_leniently() {
        assert_eq!(ApprovalStatus::from(None), ApprovalStatus::None);
        assert_eq!(ApprovalStatus::from(Some("approved".to_string())), ApprovalStatus::Approved);
        assert_eq!(ApprovalStatus::from(Some("pending".to_string())), ApprovalStatus::None);
    }

    #[test]
    fn test_parse_team_from_backend() {
        let value = json!({
            "_id": "t1",
            "name": "Platform",
            "description": null,
            "members": [{ "_id": "m1", "name": "Bob" }],
            "managerStatus": "approved",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "__v": 0
        });
        let team: Team = serde_json::from_value(value).unwrap();

        assert_eq!(team.id, TeamId::from("t1"));
        assert_eq!(team.description, "");
        assert_eq!(team.manager_status, ApprovalStatus::Approved);
        assert_eq!(team.director_status, ApprovalStatus::None);
        assert_eq!(team.members.len(), 1);
        assert_eq!(team.extra.get("__v"), Some(&json!(0)));
    }

    #[test]
    fn test_serialize_keeps_wire_names_and_unknown_fields() {
        let mut team = Team::new("t1", "Platform");
        team.director_status = ApprovalStatus::Rejected;
        team.extra.insert("createdAt".to_string(), json!("2024-01-01"));

        let value = serde_json::to_value(&team).unwrap();
        assert_eq!(value["_id"], "t1");
        assert_eq!(value["directorStatus"], "rejected");
        assert_eq!(value["managerStatus"], "none");
        assert_eq!(value["createdAt"], "2024-01-01");
        assert!(value.get("order").is_none());
    }

    #[test]
    fn test_status_field_wire_names() {
        assert_eq!(serde_json::to_value(StatusField::Manager).unwrap(), "managerStatus");
        assert_eq!(StatusField::Director.api_name(), "directorStatus");
    }

    #[test]
    fn test_set_status_touches_one_field() {
        let mut team = Team::new("t1", "Platform");
        team.set_status(StatusField::Director, ApprovalStatus::Approved);
        assert_eq!(team.status(StatusField::Director), ApprovalStatus::Approved);
        assert_eq!(team.status(StatusField::Manager), ApprovalStatus::None);
    }
}
