//! The roster list: teams, their derived UI state and the commands that
//! persist changes.
//!
//! The flow for every persisted action is the same:
//!
//! 1. A `RosterState` method applies the change locally and returns a
//!    `Command`.
//! 2. The caller runs it with [`execute`] (the TUI does this on a spawned
//!    task) and gets an `Outcome`.
//! 3. `RosterState::complete` reconciles the outcome, rolling back a failed
//!    reorder, and returns notices plus an optional follow-up command.

mod command;
mod editor;
mod filter;
mod notice;
mod reorder;
mod state;

pub use command::{execute, Command, Outcome, Pending, Reply};
pub use editor::{MemberEdit, MemberEditor};
pub use filter::team_matches;
pub use notice::{Notice, NoticeLevel};
pub use reorder::plan_move;
pub use state::{Completion, RosterState};

use crate::repository::TeamRepository;

/// Execute `command` and every follow-up it triggers, applying each outcome
/// to `state`. Returns the notices in the order they were produced.
pub async fn run_to_completion<R>(
    state: &mut RosterState,
    repo: &R,
    command: Command,
) -> Vec<Notice>
where
    R: TeamRepository + ?Sized,
{
    let mut notices = Vec::new();
    let mut next = Some(command);
    while let Some(command) = next {
        let outcome = execute(repo, command).await;
        let completion = state.complete(outcome);
        notices.extend(completion.notices);
        next = completion.follow_up;
    }
    notices
}
