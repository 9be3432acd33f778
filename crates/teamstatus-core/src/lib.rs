//! TeamStatus core library.
//!
//! This crate holds everything the front ends share:
//!
//! - `models`: `Team`, `Member` and the approval status types
//! - `repository`: the `TeamRepository` contract for the teams backend
//! - `api`: the HTTP implementation of that contract
//! - `roster`: the roster state machine (reorder, inline member editing,
//!   filtering, selection, status toggles) and the commands it emits
//! - `form`: the create/edit team form and its validation
//! - `confirm`: the confirmation gate used before destructive actions
//! - `config`: on-disk configuration

pub mod api;
pub mod config;
pub mod confirm;
pub mod error;
pub mod form;
pub mod models;
pub mod repository;
pub mod roster;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use confirm::{Confirm, Destructive};
pub use error::{RosterError, ValidationError};
pub use form::{FieldErrors, FieldKey, FormPhase, MemberDraft, MemberField, TeamForm};
pub use models::{
    ApprovalStatus, Gender, Member, MemberId, MemberPatch, MemberRef, NewTeam, StatusField, Team,
    TeamId,
};
pub use repository::TeamRepository;
pub use roster::{
    execute, run_to_completion, Command, Completion, Notice, NoticeLevel, Outcome, Reply,
    RosterState,
};
