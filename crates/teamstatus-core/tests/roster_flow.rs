//! Roster flows against an in-memory repository.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use teamstatus_core::roster::Pending;
use teamstatus_core::{
    execute, run_to_completion, ApprovalStatus, Command, Member, MemberId, MemberRef, NewTeam,
    Notice, RosterError, RosterState, StatusField, Team, TeamId, TeamRepository,
};

#[derive(Default)]
struct MemoryRepo {
    teams: Mutex<Vec<Team>>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
}

impl MemoryRepo {
    fn with(teams: Vec<Team>) -> Self {
        Self {
            teams: Mutex::new(teams),
            ..Default::default()
        }
    }

    fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(operation);
        if self.failing.lock().unwrap().contains(operation) {
            bail!("{} failed", operation);
        }
        Ok(())
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn ids(&self) -> Vec<String> {
        self.teams
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.id.to_string())
            .collect()
    }
}

#[async_trait]
impl TeamRepository for MemoryRepo {
    async fn list(&self) -> Result<Vec<Team>> {
        self.record("list")?;
        Ok(self.teams.lock().unwrap().clone())
    }

    async fn get(&self, id: &TeamId) -> Result<Team> {
        self.record("get")?;
        self.teams
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("no team {}", id))
    }

    async fn create(&self, team: &NewTeam) -> Result<Team> {
        self.record("create")?;
        let mut teams = self.teams.lock().unwrap();
        let mut created = Team::new(format!("t{}", teams.len() + 1), team.name.clone());
        created.description = team.description.clone();
        created.members = team.members.clone();
        teams.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &TeamId, team: &Team) -> Result<Team> {
        self.record("update")?;
        let mut teams = self.teams.lock().unwrap();
        let slot = teams
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| anyhow!("no team {}", id))?;
        *slot = team.clone();
        Ok(team.clone())
    }

    async fn delete(&self, id: &TeamId) -> Result<()> {
        self.record("delete")?;
        self.teams.lock().unwrap().retain(|t| &t.id != id);
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[TeamId]) -> Result<()> {
        self.record("bulk_delete")?;
        self.teams.lock().unwrap().retain(|t| !ids.contains(&t.id));
        Ok(())
    }

    async fn update_status(
        &self,
        id: &TeamId,
        field: StatusField,
        value: ApprovalStatus,
    ) -> Result<()> {
        self.record("update_status")?;
        let mut teams = self.teams.lock().unwrap();
        if let Some(team) = teams.iter_mut().find(|t| &t.id == id) {
            team.set_status(field, value);
        }
        Ok(())
    }

    async fn reorder(&self, order: &[TeamId]) -> Result<()> {
        self.record("reorder")?;
        let mut teams = self.teams.lock().unwrap();
        let mut reordered: Vec<Team> = order
            .iter()
            .filter_map(|id| teams.iter().find(|t| &t.id == id).cloned())
            .collect();
        for (index, team) in reordered.iter_mut().enumerate() {
            team.order = Some(index as i64);
        }
        *teams = reordered;
        Ok(())
    }
}

fn tid(id: &str) -> TeamId {
    TeamId::from(id)
}

fn abc() -> Vec<Team> {
    vec![
        Team::new("A", "Alpha"),
        Team::new("B", "Beta"),
        Team::new("C", "Gamma"),
    ]
}

fn local_ids(state: &RosterState) -> Vec<String> {
    state.teams().iter().map(|t| t.id.to_string()).collect()
}

async fn loaded(repo: &MemoryRepo) -> RosterState {
    let mut state = RosterState::new();
    let load = state.begin_load();
    let notices = run_to_completion(&mut state, repo, load).await;
    assert!(notices.is_empty());
    state
}

#[tokio::test]
async fn test_drag_c_before_a_persists() {
    let repo = MemoryRepo::with(abc());
    let mut state = loaded(&repo).await;

    let command = state.drop_team(&tid("C"), Some(&tid("A"))).unwrap().unwrap();
    assert_eq!(local_ids(&state), ["C", "A", "B"]);

    let notices = run_to_completion(&mut state, &repo, command).await;
    assert_eq!(notices, [Notice::success("Team order saved successfully")]);
    assert_eq!(local_ids(&state), ["C", "A", "B"]);
    assert_eq!(repo.ids(), ["C", "A", "B"]);
}

#[tokio::test]
async fn test_failed_drag_reloads_repository_order() {
    let repo = MemoryRepo::with(abc());
    repo.fail("reorder");
    let mut state = loaded(&repo).await;

    let command = state.drop_team(&tid("C"), Some(&tid("A"))).unwrap().unwrap();
    let notices = run_to_completion(&mut state, &repo, command).await;

    assert_eq!(notices, [Notice::error("Failed to save order")]);
    assert_eq!(local_ids(&state), ["A", "B", "C"]);
    assert_eq!(repo.calls(), ["list", "reorder", "list"]);
    assert!(!state.is_loading());
}

#[tokio::test]
async fn test_every_drop_persists_a_permutation() {
    for n in 1..=5usize {
        for from in 0..n {
            for to in 0..n {
                let teams: Vec<Team> = (0..n)
                    .map(|i| Team::new(format!("t{}", i), format!("Team {}", i)))
                    .collect();
                let repo = MemoryRepo::with(teams);
                let mut state = loaded(&repo).await;

                let source = tid(&format!("t{}", from));
                let target = tid(&format!("t{}", to));
                if let Some(command) = state.drop_team(&source, Some(&target)).unwrap() {
                    run_to_completion(&mut state, &repo, command).await;
                }

                let mut persisted = repo.ids();
                assert_eq!(persisted[to], format!("t{}", from));
                persisted.sort();
                let mut expected: Vec<String> = (0..n).map(|i| format!("t{}", i)).collect();
                expected.sort();
                assert_eq!(persisted, expected);
            }
        }
    }
}

#[tokio::test]
async fn test_search_blocks_reorder_without_touching_repository() {
    let repo = MemoryRepo::with(abc());
    let mut state = loaded(&repo).await;
    state.set_search("al");

    assert_eq!(
        state.drop_team(&tid("C"), Some(&tid("A"))),
        Err(RosterError::ReorderWhileFiltered)
    );
    assert_eq!(repo.calls(), ["list"]);
    assert_eq!(repo.ids(), ["A", "B", "C"]);
}

#[tokio::test]
async fn test_search_bob_select_all_then_clear() {
    let repo = MemoryRepo::with(vec![
        Team::new("W", "Web").with_members(vec![Member::new("Alice")]),
        Team::new("X", "Platform").with_members(vec![Member::new("Bob").with_id("m1")]),
        Team::new("Y", "Data"),
    ]);
    let mut state = loaded(&repo).await;

    state.set_search("bob");
    let visible: Vec<_> = state.visible_teams().iter().map(|t| t.id.to_string()).collect();
    assert_eq!(visible, ["X"]);

    state.toggle_select_all();
    assert_eq!(state.selected_ids(), [tid("X")]);

    state.set_search("");
    assert_eq!(state.visible_teams().len(), 3);
    assert_eq!(state.selected_ids(), [tid("X")]);
}

#[tokio::test]
async fn test_member_rename_is_read_modify_write() {
    let mut beta = Team::new("B", "Beta").with_members(vec![
        Member::new("Bob").with_id("m1"),
        Member::new("Unsaved"),
    ]);
    beta.extra.insert("budget".into(), 42.into());
    let repo = MemoryRepo::with(vec![Team::new("A", "Alpha"), beta]);
    let mut state = loaded(&repo).await;

    state.begin_member_edit(&tid("B"), MemberRef::Position(1)).unwrap();
    state.set_member_draft("  Carol ").unwrap();
    let command = state.save_member_edit().unwrap();

    let notices = run_to_completion(&mut state, &repo, command).await;
    assert_eq!(notices, [Notice::success("Member updated successfully")]);
    assert_eq!(repo.calls(), ["list", "get", "update", "list"]);

    let team = state.team(&tid("B")).unwrap();
    assert_eq!(team.members[0].name, "Bob");
    assert_eq!(team.members[1].name, "Carol");
    assert_eq!(team.extra.get("budget"), Some(&42.into()));
}

#[tokio::test]
async fn test_blank_member_name_makes_no_call() {
    let repo = MemoryRepo::with(vec![
        Team::new("B", "Beta").with_members(vec![Member::new("Bob").with_id("m1")])
    ]);
    let mut state = loaded(&repo).await;
    let bob = MemberRef::Persisted(MemberId::from("m1"));

    state.begin_member_edit(&tid("B"), bob).unwrap();
    state.set_member_draft("   ").unwrap();
    assert!(state.save_member_edit().is_err());

    assert_eq!(repo.calls(), ["list"]);
    assert_eq!(state.team(&tid("B")).unwrap().members[0].name, "Bob");
}

#[tokio::test]
async fn test_delete_member_by_id_ignores_positions() {
    let repo = MemoryRepo::with(vec![Team::new("B", "Beta").with_members(vec![
        Member::new("Unsaved"),
        Member::new("Bob").with_id("m1"),
    ])]);
    let mut state = loaded(&repo).await;

    let command = state
        .delete_member(&tid("B"), MemberRef::Persisted(MemberId::from("m1")), &true)
        .unwrap()
        .unwrap();
    let notices = run_to_completion(&mut state, &repo, command).await;

    assert_eq!(notices, [Notice::success("Member deleted successfully")]);
    let members = &state.team(&tid("B")).unwrap().members;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "Unsaved");
}

#[tokio::test]
async fn test_bulk_delete_then_reload() {
    let repo = MemoryRepo::with(abc());
    let mut state = loaded(&repo).await;
    state.toggle_select(&tid("C"));
    state.toggle_select(&tid("A"));

    let command = state.request_bulk_delete(&true).unwrap().unwrap();
    let notices = run_to_completion(&mut state, &repo, command).await;

    assert_eq!(notices, [Notice::success("Teams deleted successfully")]);
    assert_eq!(local_ids(&state), ["B"]);
    assert_eq!(state.selection_len(), 0);
}

#[tokio::test]
async fn test_failed_status_keeps_optimistic_value() {
    let repo = MemoryRepo::with(abc());
    repo.fail("update_status");
    let mut state = loaded(&repo).await;

    let command = state.cycle_status(&tid("A"), StatusField::Manager).unwrap();
    let notices = run_to_completion(&mut state, &repo, command).await;

    assert_eq!(notices, [Notice::error("Error saving status")]);
    assert_eq!(
        state.team(&tid("A")).unwrap().manager_status,
        ApprovalStatus::Approved
    );
    assert_eq!(
        repo.teams.lock().unwrap()[0].manager_status,
        ApprovalStatus::None
    );
}

#[tokio::test]
async fn test_interleaved_actions_complete_in_any_order() {
    let repo = MemoryRepo::with(abc());
    let mut state = loaded(&repo).await;

    let status = state.cycle_status(&tid("A"), StatusField::Director).unwrap();
    let delete = state.delete_team(&tid("B"), &true).unwrap().unwrap();
    assert!(state.is_pending(&Pending::DeleteTeam(tid("B"))));

    let (status_outcome, delete_outcome) =
        futures::join!(execute(&repo, status), execute(&repo, delete));

    // Apply in the reverse of issue order
    let deleted = state.complete(delete_outcome);
    assert_eq!(deleted.follow_up, Some(Command::Load));
    let saved = state.complete(status_outcome);
    assert_eq!(saved.notices, [Notice::success("Team Status Saved")]);

    let reload = run_to_completion(&mut state, &repo, Command::Load).await;
    assert!(reload.is_empty());
    assert_eq!(local_ids(&state), ["A", "C"]);
    assert_eq!(
        state.team(&tid("A")).unwrap().director_status,
        ApprovalStatus::Approved
    );
    assert!(!state.is_pending(&Pending::DeleteTeam(tid("B"))));
}
