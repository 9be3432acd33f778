//! Confirmation gate for irreversible actions.
//!
//! Roster and form operations ask a `Confirm` implementation before they emit
//! a destructive command. A declined confirmation is not an error: the
//! operation returns `Ok(None)` and nothing changes.

/// An action that needs an explicit yes before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destructive {
    DeleteTeam,
    DeleteMember,
    BulkDelete { count: usize },
    CreateTeam,
    UpdateTeam,
    DiscardForm,
}

impl Destructive {
    /// Question shown to the user.
    pub fn prompt(&self) -> String {
        match self {
            Destructive::DeleteTeam => "Are you sure you want to delete this team?".to_string(),
            Destructive::DeleteMember => "Are you sure you want to delete this member?".to_string(),
            Destructive::BulkDelete { count } => {
                format!("Are you sure you want to delete {} selected team(s)?", count)
            }
            Destructive::CreateTeam => "Are you sure you want to create this team?".to_string(),
            Destructive::UpdateTeam => "Are you sure you want to update this team?".to_string(),
            Destructive::DiscardForm => "Are you sure you want to exit without saving?".to_string(),
        }
    }
}

/// Synchronous yes/no decision for a destructive action.
pub trait Confirm {
    fn confirm(&self, action: &Destructive) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&Destructive) -> bool,
{
    fn confirm(&self, action: &Destructive) -> bool {
        self(action)
    }
}

/// A decision that was already collected, e.g. from a dialog the user answered.
impl Confirm for bool {
    fn confirm(&self, _action: &Destructive) -> bool {
        *self
    }
}
