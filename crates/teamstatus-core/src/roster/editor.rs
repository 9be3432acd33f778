//! Inline edit-in-place for a single member name.
//!
//! ```text
//! Idle --begin--> Editing --save--> Saving --finish--> Idle
//!                    |
//!                    +--cancel--> Idle
//! ```
//!
//! Only one session exists at a time. Beginning a new edit drops whatever
//! draft was open, without merging or warning.

use crate::error::{RosterError, ValidationError};
use crate::models::{MemberRef, TeamId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEdit {
    pub team_id: TeamId,
    pub member: MemberRef,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MemberEditor {
    #[default]
    Idle,
    Editing(MemberEdit),
    Saving { team_id: TeamId, member: MemberRef },
}

impl MemberEditor {
    /// Start editing, seeding the draft with the member's current name.
    pub fn begin(&mut self, team_id: TeamId, member: MemberRef, current_name: &str) {
        *self = MemberEditor::Editing(MemberEdit {
            team_id,
            member,
            draft: current_name.to_string(),
        });
    }

    pub fn editing(&self) -> Option<&MemberEdit> {
        match self {
            MemberEditor::Editing(edit) => Some(edit),
            _ => None,
        }
    }

    pub fn is_editing(&self, team_id: &TeamId, member: &MemberRef) -> bool {
        self.editing()
            .is_some_and(|edit| &edit.team_id == team_id && &edit.member == member)
    }

    pub fn is_saving(&self, team_id: &TeamId, member: &MemberRef) -> bool {
        matches!(self, MemberEditor::Saving { team_id: t, member: m } if t == team_id && m == member)
    }

    pub fn draft_mut(&mut self) -> Option<&mut String> {
        match self {
            MemberEditor::Editing(edit) => Some(&mut edit.draft),
            _ => None,
        }
    }

    /// Drop the draft. Returns false when nothing was being edited.
    pub fn cancel(&mut self) -> bool {
        if matches!(self, MemberEditor::Editing(_)) {
            *self = MemberEditor::Idle;
            true
        } else {
            false
        }
    }

    /// Validate the draft and move to `Saving`, returning what to persist.
    /// An empty or whitespace-only draft is rejected and the session stays
    /// in `Editing`.
    pub fn start_save(&mut self) -> Result<(TeamId, MemberRef, String), RosterError> {
        let MemberEditor::Editing(edit) = self else {
            return Err(RosterError::NotEditing);
        };
        let name = edit.draft.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyMemberName.into());
        }

        let team_id = edit.team_id.clone();
        let member = edit.member.clone();
        *self = MemberEditor::Saving {
            team_id: team_id.clone(),
            member: member.clone(),
        };
        Ok((team_id, member, name))
    }

    /// The save for this member finished (either way). A session started in
    /// the meantime is left alone.
    pub fn finish_save(&mut self, team_id: &TeamId, member: &MemberRef) {
        if self.is_saving(team_id, member) {
            *self = MemberEditor::Idle;
        }
    }
}
