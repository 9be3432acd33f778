//! Repository calls emitted by the roster and the form, and their results.

use anyhow::Result;
use tracing::{debug, warn};

use crate::models::{
    ApprovalStatus, MemberPatch, MemberRef, NewTeam, StatusField, Team, TeamId,
};
use crate::repository::TeamRepository;

/// A repository call to run on behalf of a user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load,
    FetchTeam { team_id: TeamId },
    Reorder { order: Vec<TeamId> },
    UpdateStatus {
        team_id: TeamId,
        field: StatusField,
        value: ApprovalStatus,
    },
    UpdateMember {
        team_id: TeamId,
        member: MemberRef,
        patch: MemberPatch,
    },
    DeleteMember { team_id: TeamId, member: MemberRef },
    DeleteTeam { team_id: TeamId },
    BulkDelete { ids: Vec<TeamId> },
    CreateTeam(NewTeam),
    UpdateTeam(Team),
}

/// Identifies an in-flight roster action so the same one cannot start twice.
/// Loads are counted instead, and the team form tracks its own phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pending {
    Reorder,
    Status(TeamId, StatusField),
    SaveMember(TeamId, MemberRef),
    DeleteMember(TeamId, MemberRef),
    DeleteTeam(TeamId),
    BulkDelete,
}

impl Command {
    /// The key held while this command runs. `None` for commands the roster
    /// does not guard.
    pub fn pending(&self) -> Option<Pending> {
        let key = match self {
            Command::Load | Command::FetchTeam { .. } => return None,
            Command::CreateTeam(_) | Command::UpdateTeam(_) => return None,
            Command::Reorder { .. } => Pending::Reorder,
            Command::UpdateStatus { team_id, field, .. } => Pending::Status(team_id.clone(), *field),
            Command::UpdateMember {
                team_id, member, ..
            } => Pending::SaveMember(team_id.clone(), member.clone()),
            Command::DeleteMember { team_id, member } => {
                Pending::DeleteMember(team_id.clone(), member.clone())
            }
            Command::DeleteTeam { team_id } => Pending::DeleteTeam(team_id.clone()),
            Command::BulkDelete { .. } => Pending::BulkDelete,
        };
        Some(key)
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Load => "load",
            Command::FetchTeam { .. } => "fetch_team",
            Command::Reorder { .. } => "reorder",
            Command::UpdateStatus { .. } => "update_status",
            Command::UpdateMember { .. } => "update_member",
            Command::DeleteMember { .. } => "delete_member",
            Command::DeleteTeam { .. } => "delete_team",
            Command::BulkDelete { .. } => "bulk_delete",
            Command::CreateTeam(_) => "create_team",
            Command::UpdateTeam(_) => "update_team",
        }
    }

    /// Commands issued by the team form rather than the roster list.
    pub fn is_form_command(&self) -> bool {
        matches!(
            self,
            Command::FetchTeam { .. } | Command::CreateTeam(_) | Command::UpdateTeam(_)
        )
    }
}

/// Successful result of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Teams(Vec<Team>),
    Team(Team),
    Done,
}

/// A finished command and what the repository said.
#[derive(Debug)]
pub struct Outcome {
    pub command: Command,
    pub result: Result<Reply>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run `command` against `repo`. Never fails itself; a repository error is
/// carried in the returned `Outcome`.
pub async fn execute<R>(repo: &R, command: Command) -> Outcome
where
    R: TeamRepository + ?Sized,
{
    debug!(command = command.name(), "Executing");
    let result = match &command {
        Command::Load => repo.list().await.map(Reply::Teams),
        Command::FetchTeam { team_id } => repo.get(team_id).await.map(Reply::Team),
        Command::Reorder { order } => repo.reorder(order).await.map(|_| Reply::Done),
        Command::UpdateStatus {
            team_id,
            field,
            value,
        } => repo
            .update_status(team_id, *field, *value)
            .await
            .map(|_| Reply::Done),
        Command::UpdateMember {
            team_id,
            member,
            patch,
        } => repo
            .update_member(team_id, member, patch)
            .await
            .map(|_| Reply::Done),
        Command::DeleteMember { team_id, member } => repo
            .delete_member(team_id, member)
            .await
            .map(|_| Reply::Done),
        Command::DeleteTeam { team_id } => repo.delete(team_id).await.map(|_| Reply::Done),
        Command::BulkDelete { ids } => repo.bulk_delete(ids).await.map(|_| Reply::Done),
        Command::CreateTeam(team) => repo.create(team).await.map(Reply::Team),
        Command::UpdateTeam(team) => repo.update(&team.id, team).await.map(Reply::Team),
    };

    if let Err(ref e) = result {
        warn!(command = command.name(), error = %e, "Command failed");
    }
    Outcome { command, result }
}
