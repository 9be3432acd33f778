use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::null_as_default;

/// Backend-assigned member identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Parse the wire representation; anything unrecognised is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == s)
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lenient_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Gender::parse))
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Member {
    /// Absent until the backend has saved the member
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MemberId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_gender", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(rename = "dateOfBirth", default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(rename = "contactNo", default, skip_serializing_if = "Option::is_none")]
    pub contact_no: Option<String>,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<MemberId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Date of birth as a calendar date. The backend stores either a plain
    /// `YYYY-MM-DD` or a full ISO timestamp; only the date part is used.
    pub fn birth_date(&self) -> Option<NaiveDate> {
        let raw = self.date_of_birth.as_deref()?;
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

/// How a member is addressed within its team.
///
/// Saved members are matched by their persisted id; members the backend never
/// assigned an id to are matched by their position in the team's member list.
/// Matching always branches on the tag and never compares an id against an
/// index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberRef {
    Persisted(MemberId),
    Position(usize),
}

impl MemberRef {
    /// The reference a caller should use for `member` found at `index`.
    pub fn of(index: usize, member: &Member) -> Self {
        match &member.id {
            Some(id) => MemberRef::Persisted(id.clone()),
            None => MemberRef::Position(index),
        }
    }

    pub fn matches(&self, index: usize, member: &Member) -> bool {
        match self {
            MemberRef::Persisted(id) => member.id.as_ref() == Some(id),
            MemberRef::Position(position) => *position == index,
        }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRef::Persisted(id) => write!(f, "{}", id),
            MemberRef::Position(index) => write!(f, "#{}", index),
        }
    }
}

/// Partial member update; `None` leaves the field as it is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>,
    pub contact_no: Option<String>,
}

impl MemberPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn apply(&self, member: &mut Member) {
        if let Some(ref name) = self.name {
            member.name = name.clone();
        }
        if let Some(gender) = self.gender {
            member.gender = Some(gender);
        }
        if let Some(ref dob) = self.date_of_birth {
            member.date_of_birth = Some(dob.clone());
        }
        if let Some(ref contact) = self.contact_no {
            member.contact_no = Some(contact.clone());
        }
    }
}
