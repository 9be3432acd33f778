//! Errors raised by roster and form operations before anything reaches the
//! backend. Backend failures travel as `anyhow::Error` inside an `Outcome`.

use thiserror::Error;

use crate::models::{MemberRef, TeamId};

/// Minimum number of digits in a member contact number.
pub const MIN_CONTACT_DIGITS: usize = 10;

/// A single field failed local validation. The message is what the UI shows
/// next to the field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Team name is required")]
    TeamNameRequired,

    #[error("Team description is required")]
    DescriptionRequired,

    #[error("Name is required")]
    MemberNameRequired,

    #[error("Gender is required")]
    GenderRequired,

    #[error("Date of birth is required")]
    DateOfBirthRequired,

    #[error("Date of birth must be a valid date")]
    InvalidDateOfBirth,

    #[error("Contact number is required")]
    ContactRequired,

    #[error("Contact number must be at least 10 digits")]
    ContactTooShort,

    #[error("Member name cannot be empty")]
    EmptyMemberName,

    #[error("At least one member is required")]
    LastMember,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Please fill in all required fields")]
    InvalidForm { errors: usize },

    #[error("Drag & drop is disabled during search. Clear search to reorder teams.")]
    ReorderWhileFiltered,

    #[error("Still saving - please wait")]
    InFlight,

    #[error("Unknown team: {0}")]
    UnknownTeam(TeamId),

    #[error("Unknown member {member} in team {team}")]
    UnknownMember { team: TeamId, member: MemberRef },

    #[error("No member is being edited")]
    NotEditing,

    #[error("Team data is not loaded - reopen the team to edit it")]
    TeamNotLoaded(TeamId),
}
