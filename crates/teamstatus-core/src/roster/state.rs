use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info};

use super::command::{Command, Outcome, Pending, Reply};
use super::editor::MemberEditor;
use super::filter::team_matches;
use super::notice::Notice;
use super::reorder::plan_move;
use crate::confirm::{Confirm, Destructive};
use crate::error::RosterError;
use crate::models::{MemberPatch, MemberRef, StatusField, Team, TeamId};

/// What applying an `Outcome` produced.
#[derive(Debug, Default)]
pub struct Completion {
    pub notices: Vec<Notice>,
    /// Command to run next, usually a reload.
    pub follow_up: Option<Command>,
}

/// The team roster as the list view sees it.
///
/// Holds the ordered teams plus the UI state derived from them: search text,
/// selection, expansion and the inline member edit session. Every action is a
/// method that mutates the state in place and, if the action must be
/// persisted, returns the `Command` to run. Results come back through
/// [`RosterState::complete`].
#[derive(Debug, Default)]
pub struct RosterState {
    teams: Vec<Team>,
    search: String,
    selected: BTreeSet<TeamId>,
    expanded: HashSet<TeamId>,
    editor: MemberEditor,
    pending: HashSet<Pending>,
    loads_in_flight: usize,
    loaded: bool,
    /// Team order before the reorder that is currently being saved
    order_before_drag: Option<Vec<TeamId>>,
}

impl RosterState {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Accessors =====

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| &t.id == id)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// True while a search narrows the list.
    pub fn is_filtered(&self) -> bool {
        !self.search.is_empty()
    }

    pub fn editor(&self) -> &MemberEditor {
        &self.editor
    }

    pub fn is_selected(&self, id: &TeamId) -> bool {
        self.selected.contains(id)
    }

    pub fn is_expanded(&self, id: &TeamId) -> bool {
        self.expanded.contains(id)
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_pending(&self, key: &Pending) -> bool {
        self.pending.contains(key)
    }

    pub fn is_loading(&self) -> bool {
        self.loads_in_flight > 0
    }

    /// True once any load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Teams matching the current search, in roster order.
    pub fn visible_teams(&self) -> Vec<&Team> {
        self.teams
            .iter()
            .filter(|t| team_matches(t, &self.search))
            .collect()
    }

    /// Selected ids in roster order.
    pub fn selected_ids(&self) -> Vec<TeamId> {
        self.teams
            .iter()
            .filter(|t| self.selected.contains(&t.id))
            .map(|t| t.id.clone())
            .collect()
    }

    fn is_visible(&self, id: &TeamId) -> bool {
        self.team(id).is_some_and(|t| team_matches(t, &self.search))
    }

    fn require_team(&self, id: &TeamId) -> Result<&Team, RosterError> {
        self.team(id).ok_or_else(|| RosterError::UnknownTeam(id.clone()))
    }

    fn start(&mut self, command: Command) -> Result<Command, RosterError> {
        if let Some(key) = command.pending() {
            if !self.pending.insert(key) {
                return Err(RosterError::InFlight);
            }
        }
        Ok(command)
    }

    fn check_idle(&self, key: &Pending) -> Result<(), RosterError> {
        if self.pending.contains(key) {
            Err(RosterError::InFlight)
        } else {
            Ok(())
        }
    }

    // ===== Store =====

    /// Start fetching the full team list.
    pub fn begin_load(&mut self) -> Command {
        self.loads_in_flight += 1;
        Command::Load
    }

    /// Replace local state with a freshly fetched list.
    ///
    /// Selection and expansion keep only ids that still exist (selection also
    /// stays within the visible set). An inline edit whose team or member
    /// disappeared is dropped.
    pub fn replace_teams(&mut self, teams: Vec<Team>) {
        debug!(count = teams.len(), "Replacing roster");
        self.teams = teams;
        self.loaded = true;

        let existing: HashSet<TeamId> = self.teams.iter().map(|t| t.id.clone()).collect();
        self.expanded.retain(|id| existing.contains(id));
        self.prune_selection();

        if let Some(edit) = self.editor.editing() {
            let still_there = self
                .team(&edit.team_id)
                .is_some_and(|t| t.find_member(&edit.member).is_some());
            if !still_there {
                debug!(team = %edit.team_id, member = %edit.member, "Dropping stale member edit");
                self.editor.cancel();
            }
        }
    }

    /// Reorder local teams to follow `order`. Unknown ids are ignored and
    /// teams missing from `order` keep their relative order at the end.
    pub fn replace_order(&mut self, order: &[TeamId]) {
        let mut remaining = std::mem::take(&mut self.teams);
        let mut reordered = Vec::with_capacity(remaining.len());
        for id in order {
            if let Some(pos) = remaining.iter().position(|t| &t.id == id) {
                reordered.push(remaining.remove(pos));
            }
        }
        reordered.append(&mut remaining);
        self.teams = reordered;
        self.renumber();
    }

    fn renumber(&mut self) {
        for (index, team) in self.teams.iter_mut().enumerate() {
            team.order = Some(index as i64);
        }
    }

    // ===== Reorder =====

    /// Drop `source` onto `target`: the source is removed and reinserted at
    /// the target's index. The new order is applied immediately.
    ///
    /// Returns `Ok(None)` when there is nothing to do (no target, or dropped
    /// on itself). Rejected while a search is active.
    pub fn drop_team(
        &mut self,
        source: &TeamId,
        target: Option<&TeamId>,
    ) -> Result<Option<Command>, RosterError> {
        if self.is_filtered() {
            return Err(RosterError::ReorderWhileFiltered);
        }
        let Some(target) = target else {
            return Ok(None);
        };
        if source == target {
            return Ok(None);
        }
        self.check_idle(&Pending::Reorder)?;

        self.require_team(source)?;
        let before: Vec<TeamId> = self.teams.iter().map(|t| t.id.clone()).collect();
        let Some(order) = plan_move(&before, source, target) else {
            return Ok(None);
        };

        self.replace_order(&order);
        self.order_before_drag = Some(before);
        debug!(source = %source, target = %target, "Reordered teams");
        self.start(Command::Reorder { order }).map(Some)
    }

    // ===== Status =====

    /// Advance one approval field to the next state in its cycle.
    pub fn cycle_status(
        &mut self,
        team_id: &TeamId,
        field: StatusField,
    ) -> Result<Command, RosterError> {
        self.check_idle(&Pending::Status(team_id.clone(), field))?;
        let team = self
            .teams
            .iter_mut()
            .find(|t| &t.id == team_id)
            .ok_or_else(|| RosterError::UnknownTeam(team_id.clone()))?;

        let value = team.status(field).next();
        team.set_status(field, value);
        self.start(Command::UpdateStatus {
            team_id: team_id.clone(),
            field,
            value,
        })
    }

    // ===== Member editing =====

    pub fn begin_member_edit(
        &mut self,
        team_id: &TeamId,
        member: MemberRef,
    ) -> Result<(), RosterError> {
        let team = self.require_team(team_id)?;
        let (_, current) = team
            .find_member(&member)
            .ok_or_else(|| RosterError::UnknownMember {
                team: team_id.clone(),
                member: member.clone(),
            })?;
        let name = current.name.clone();
        self.editor.begin(team_id.clone(), member, &name);
        Ok(())
    }

    pub fn member_draft_mut(&mut self) -> Option<&mut String> {
        self.editor.draft_mut()
    }

    pub fn set_member_draft(&mut self, draft: impl Into<String>) -> Result<(), RosterError> {
        let slot = self.editor.draft_mut().ok_or(RosterError::NotEditing)?;
        *slot = draft.into();
        Ok(())
    }

    pub fn cancel_member_edit(&mut self) -> bool {
        self.editor.cancel()
    }

    /// Save the inline draft as the member's new name.
    pub fn save_member_edit(&mut self) -> Result<Command, RosterError> {
        let edit = self.editor.editing().ok_or(RosterError::NotEditing)?;
        self.check_idle(&Pending::SaveMember(
            edit.team_id.clone(),
            edit.member.clone(),
        ))?;

        let (team_id, member, name) = self.editor.start_save()?;
        self.start(Command::UpdateMember {
            team_id,
            member,
            patch: MemberPatch::name(name),
        })
    }

    /// Delete one member after confirmation. `Ok(None)` when declined.
    pub fn delete_member(
        &mut self,
        team_id: &TeamId,
        member: MemberRef,
        confirm: &dyn Confirm,
    ) -> Result<Option<Command>, RosterError> {
        let team = self.require_team(team_id)?;
        if team.find_member(&member).is_none() {
            return Err(RosterError::UnknownMember {
                team: team_id.clone(),
                member,
            });
        }
        self.check_idle(&Pending::DeleteMember(team_id.clone(), member.clone()))?;

        if !confirm.confirm(&Destructive::DeleteMember) {
            return Ok(None);
        }
        self.start(Command::DeleteMember {
            team_id: team_id.clone(),
            member,
        })
        .map(Some)
    }

    // ===== Filter & selection =====

    /// Change the search text. The selection shrinks to what is still visible.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.prune_selection();
    }

    fn prune_selection(&mut self) {
        let visible: HashSet<TeamId> = self
            .visible_teams()
            .into_iter()
            .map(|t| t.id.clone())
            .collect();
        self.selected.retain(|id| visible.contains(id));
    }

    /// Flip selection of a visible team. Returns whether it is now selected.
    pub fn toggle_select(&mut self, id: &TeamId) -> bool {
        if !self.is_visible(id) {
            return false;
        }
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    pub fn all_visible_selected(&self) -> bool {
        let visible = self.visible_teams();
        !visible.is_empty() && visible.iter().all(|t| self.selected.contains(&t.id))
    }

    /// Select every visible team, or clear the selection when they already
    /// all are.
    pub fn toggle_select_all(&mut self) {
        if self.all_visible_selected() {
            self.selected.clear();
        } else {
            self.selected = self.visible_teams().into_iter().map(|t| t.id.clone()).collect();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Delete all selected teams in one request. `Ok(None)` when nothing is
    /// selected or the user declined.
    pub fn request_bulk_delete(
        &mut self,
        confirm: &dyn Confirm,
    ) -> Result<Option<Command>, RosterError> {
        if self.selected.is_empty() {
            return Ok(None);
        }
        self.check_idle(&Pending::BulkDelete)?;

        let ids = self.selected_ids();
        if !confirm.confirm(&Destructive::BulkDelete { count: ids.len() }) {
            return Ok(None);
        }
        self.start(Command::BulkDelete { ids }).map(Some)
    }

    pub fn delete_team(
        &mut self,
        team_id: &TeamId,
        confirm: &dyn Confirm,
    ) -> Result<Option<Command>, RosterError> {
        self.require_team(team_id)?;
        self.check_idle(&Pending::DeleteTeam(team_id.clone()))?;

        if !confirm.confirm(&Destructive::DeleteTeam) {
            return Ok(None);
        }
        self.start(Command::DeleteTeam {
            team_id: team_id.clone(),
        })
        .map(Some)
    }

    /// Show or hide a team's member rows. Teams without members never
    /// expand. Returns whether the team is now expanded.
    pub fn toggle_expand(&mut self, id: &TeamId) -> bool {
        if !self.team(id).is_some_and(Team::has_members) {
            return false;
        }
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    // ===== Completion =====

    /// Apply the result of a command previously returned by this state (or
    /// by the team form).
    pub fn complete(&mut self, outcome: Outcome) -> Completion {
        let Outcome { command, result } = outcome;
        let mut done = Completion::default();
        if let Some(key) = command.pending() {
            self.pending.remove(&key);
        }

        let ok = result.is_ok();
        match (command, result) {
            (Command::Load, result) => {
                self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
                match result {
                    Ok(Reply::Teams(teams)) => self.replace_teams(teams),
                    Ok(_) => {}
                    Err(_) => done.notices.push(Notice::error("Failed to fetch teams")),
                }
            }
            (Command::Reorder { .. }, _) => {
                let before = self.order_before_drag.take();
                if ok {
                    info!("Team order saved");
                    done.notices.push(Notice::success("Team order saved successfully"));
                } else {
                    if let Some(before) = before {
                        self.replace_order(&before);
                    }
                    done.notices.push(Notice::error("Failed to save order"));
                    done.follow_up = Some(self.begin_load());
                }
            }
            (Command::UpdateStatus { .. }, _) => {
                done.notices.push(if ok {
                    Notice::success("Team Status Saved")
                } else {
                    Notice::error("Error saving status")
                });
            }
            (Command::UpdateMember { team_id, member, .. }, _) => {
                self.editor.finish_save(&team_id, &member);
                if ok {
                    done.notices.push(Notice::success("Member updated successfully"));
                    done.follow_up = Some(self.begin_load());
                } else {
                    done.notices.push(Notice::error("Failed to update member"));
                }
            }
            (Command::DeleteMember { .. }, _) => {
                if ok {
                    done.notices.push(Notice::success("Member deleted successfully"));
                    done.follow_up = Some(self.begin_load());
                } else {
                    done.notices.push(Notice::error("Failed to delete member"));
                }
            }
            (Command::DeleteTeam { .. }, _) => {
                if ok {
                    done.notices.push(Notice::success("Team deleted successfully"));
                    done.follow_up = Some(self.begin_load());
                } else {
                    done.notices.push(Notice::error("Failed to delete team"));
                }
            }
            (Command::BulkDelete { .. }, _) => {
                if ok {
                    self.selected.clear();
                    done.notices.push(Notice::success("Teams deleted successfully"));
                    done.follow_up = Some(self.begin_load());
                } else {
                    done.notices.push(Notice::error("Failed to delete teams"));
                }
            }
            // The form reports its own notices; a saved team shows up after a reload
            (Command::CreateTeam(_) | Command::UpdateTeam(_), _) => {
                if ok {
                    done.follow_up = Some(self.begin_load());
                }
            }
            (Command::FetchTeam { .. }, _) => {}
        }
        done
    }
}
