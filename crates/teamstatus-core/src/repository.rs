//! The Team Repository contract.
//!
//! The teams backend is the system of record; everything the roster persists
//! goes through this trait. `ApiClient` implements it over HTTP and tests
//! substitute in-memory versions.
//!
//! Member updates and deletes are not atomic at the backend: they are a
//! read-modify-write of the whole team (fetch the current team, patch one
//! member, write the whole team back). A concurrent change to the same team
//! between the read and the write is overwritten.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::models::{
    ApprovalStatus, MemberPatch, MemberRef, NewTeam, StatusField, Team, TeamId,
};

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// All teams in their persisted order.
    async fn list(&self) -> Result<Vec<Team>>;

    async fn get(&self, id: &TeamId) -> Result<Team>;

    async fn create(&self, team: &NewTeam) -> Result<Team>;

    /// Replace a team with the given full payload.
    async fn update(&self, id: &TeamId, team: &Team) -> Result<Team>;

    async fn delete(&self, id: &TeamId) -> Result<()>;

    /// Delete several teams in one request.
    async fn bulk_delete(&self, ids: &[TeamId]) -> Result<()>;

    async fn update_status(
        &self,
        id: &TeamId,
        field: StatusField,
        value: ApprovalStatus,
    ) -> Result<()>;

    /// Persist the full team order as an explicit list of ids.
    async fn reorder(&self, order: &[TeamId]) -> Result<()>;

    /// Patch one member of a team.
    async fn update_member(
        &self,
        team_id: &TeamId,
        member: &MemberRef,
        patch: &MemberPatch,
    ) -> Result<()> {
        let current = self.get(team_id).await?;
        let patched = patch_member(current, member, patch)
            .ok_or_else(|| anyhow!("Member {} not found in team {}", member, team_id))?;
        debug!(team = %team_id, member = %member, "Writing team with patched member");
        self.update(team_id, &patched).await?;
        Ok(())
    }

    /// Remove one member from a team.
    async fn delete_member(&self, team_id: &TeamId, member: &MemberRef) -> Result<()> {
        let current = self.get(team_id).await?;
        let trimmed = remove_member(current, member)
            .ok_or_else(|| anyhow!("Member {} not found in team {}", member, team_id))?;
        debug!(team = %team_id, member = %member, "Writing team without removed member");
        self.update(team_id, &trimmed).await?;
        Ok(())
    }
}

/// Apply `patch` to every member `member` matches. Returns `None` when no
/// member matches.
pub fn patch_member(mut team: Team, member: &MemberRef, patch: &MemberPatch) -> Option<Team> {
    let mut matched = false;
    for (index, m) in team.members.iter_mut().enumerate() {
        if member.matches(index, m) {
            patch.apply(m);
            matched = true;
        }
    }
    matched.then_some(team)
}

/// Drop every member `member` matches. Returns `None` when no member matches.
pub fn remove_member(mut team: Team, member: &MemberRef) -> Option<Team> {
    let before = team.members.len();
    let mut index = 0;
    team.members.retain(|m| {
        let keep = !member.matches(index, m);
        index += 1;
        keep
    });
    (team.members.len() != before).then_some(team)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::{Member, MemberId};

    fn team() -> Team {
        Team::new("t1", "Platform").with_members(vec![
            Member::new("Alice").with_id("m1"),
            Member::new("Bob"),
            Member::new("Carol").with_id("m3"),
        ])
    }

    #[test]
    fn test_patch_by_persisted_id() {
        let patched = patch_member(
            team(),
            &MemberRef::Persisted(MemberId::from("m3")),
            &MemberPatch::name("Caroline"),
        )
        .unwrap();
        let names: Vec<_> = patched.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob", "Caroline"]);
    }

    #[test]
    fn test_patch_by_position() {
        let patched =
            patch_member(team(), &MemberRef::Position(1), &MemberPatch::name("Robert")).unwrap();
        assert_eq!(patched.members[1].name, "Robert");
        assert_eq!(patched.members[0].name, "Alice");
    }

    #[test]
    fn test_patch_unknown_member() {
        let missing = MemberRef::Persisted(MemberId::from("nope"));
        assert!(patch_member(team(), &missing, &MemberPatch::name("x")).is_none());
        assert!(patch_member(team(), &MemberRef::Position(9), &MemberPatch::name("x")).is_none());
    }

    #[test]
    fn test_remove_member() {
        let trimmed = remove_member(team(), &MemberRef::Persisted(MemberId::from("m1"))).unwrap();
        let names: Vec<_> = trimmed.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Bob", "Carol"]);

        let trimmed = remove_member(team(), &MemberRef::Position(1)).unwrap();
        let names: Vec<_> = trimmed.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Carol"]);

        assert!(remove_member(team(), &MemberRef::Position(7)).is_none());
    }

    /// Records every call so the read-modify-write sequence can be checked.
    struct Recording {
        team: Mutex<Team>,
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl TeamRepository for Recording {
        async fn list(&self) -> Result<Vec<Team>> {
            Ok(vec![self.team.lock().unwrap().clone()])
        }
        async fn get(&self, _id: &TeamId) -> Result<Team> {
            self.calls.lock().unwrap().push("get");
            Ok(self.team.lock().unwrap().clone())
        }
        async fn create(&self, _team: &NewTeam) -> Result<Team> {
            unimplemented!()
        }
        async fn update(&self, _id: &TeamId, team: &Team) -> Result<Team> {
            self.calls.lock().unwrap().push("update");
            *self.team.lock().unwrap() = team.clone();
            Ok(team.clone())
        }
        async fn delete(&self, _id: &TeamId) -> Result<()> {
            unimplemented!()
        }
        async fn bulk_delete(&self, _ids: &[TeamId]) -> Result<()> {
            unimplemented!()
        }
        async fn update_status(
            &self,
            _id: &TeamId,
            _field: StatusField,
            _value: ApprovalStatus,
        ) -> Result<()> {
            unimplemented!()
        }
        async fn reorder(&self, _order: &[TeamId]) -> Result<()> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_update_member_reads_then_writes_whole_team() {
        let mut stored = team();
        stored.description = "keep me".to_string();
        let repo = Recording {
            team: Mutex::new(stored),
            calls: Mutex::new(Vec::new()),
        };

        repo.update_member(&TeamId::from("t1"), &MemberRef::Position(1), &MemberPatch::name("Rob"))
            .await
            .unwrap();

        assert_eq!(*repo.calls.lock().unwrap(), ["get", "update"]);
        let saved = repo.team.lock().unwrap().clone();
        assert_eq!(saved.members[1].name, "Rob");
        assert_eq!(saved.description, "keep me");
    }

    #[tokio::test]
    async fn test_delete_unknown_member_does_not_write() {
        let repo = Recording {
            team: Mutex::new(team()),
            calls: Mutex::new(Vec::new()),
        };

        let result = repo
            .delete_member(&TeamId::from("t1"), &MemberRef::Persisted(MemberId::from("zz")))
            .await;

        assert!(result.is_err());
        assert_eq!(*repo.calls.lock().unwrap(), ["get"]);
        assert_eq!(repo.team.lock().unwrap().members.len(), 3);
    }
}
