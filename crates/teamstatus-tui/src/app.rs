//! Application state management for TeamStatus.
//!
//! `App` owns the roster state, the open team form (if any), the cursor and
//! overlay state of the terminal UI, and the channel that brings finished
//! repository commands back from background tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use teamstatus_core::{
    execute, ApiClient, Command, Config, Destructive, FieldKey, MemberField, MemberRef, Notice,
    Outcome, RosterError, RosterState, StatusField, TeamForm, TeamId, TeamRepository,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the command outcome channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of rows to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// How long a notice stays in the status bar.
const NOTICE_TTL: Duration = Duration::from_secs(4);

// ============================================================================
// UI State Types
// ============================================================================

/// Which full-screen view is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Roster,
    Form,
}

/// A destructive action waiting for a yes/no answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirm {
    DeleteTeam(TeamId),
    DeleteMember(TeamId, MemberRef),
    BulkDelete,
    SubmitForm,
    ExitForm,
}

/// Overall application state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    EditingMember,
    Confirming(PendingConfirm),
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// One line of the roster table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterRow {
    Team(TeamId),
    Member {
        team_id: TeamId,
        member: MemberRef,
        index: usize,
    },
}

impl RosterRow {
    pub fn team_id(&self) -> &TeamId {
        match self {
            RosterRow::Team(id) => id,
            RosterRow::Member { team_id, .. } => team_id,
        }
    }
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub config: Config,
    repo: Arc<dyn TeamRepository>,

    pub state: AppState,
    pub screen: Screen,

    // Roster view
    pub roster: RosterState,
    pub cursor: usize,
    /// Team picked up with the keyboard, waiting to be dropped
    pub grabbed: Option<TeamId>,

    // Form view
    pub form: Option<TeamForm>,
    pub form_focus: usize,

    notices: Vec<(Notice, Instant)>,

    // Background task channel
    outcome_rx: mpsc::Receiver<Outcome>,
    outcome_tx: mpsc::Sender<Outcome>,
    in_flight: usize,
}

impl App {
    /// Create the application against the configured backend
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::from_config(&config)?;
        info!(api_url = %api.base_url(), "Using teams backend");
        Ok(Self::with_repository(config, Arc::new(api)))
    }

    pub fn with_repository(config: Config, repo: Arc<dyn TeamRepository>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            config,
            repo,
            state: AppState::Normal,
            screen: Screen::Roster,
            roster: RosterState::new(),
            cursor: 0,
            grabbed: None,
            form: None,
            form_focus: 0,
            notices: Vec::new(),
            outcome_rx,
            outcome_tx,
            in_flight: 0,
        }
    }

    // =========================================================================
    // Background commands
    // =========================================================================

    /// Run a command on a background task. Its outcome arrives through
    /// `check_background_tasks`.
    fn dispatch(&mut self, command: Command) {
        debug!(command = command.name(), "Dispatching");
        let repo = Arc::clone(&self.repo);
        let tx = self.outcome_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = execute(repo.as_ref(), command).await;
            if tx.send(outcome).await.is_err() {
                warn!("Outcome channel closed");
            }
        });
    }

    /// True while any command is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Apply every outcome that has arrived, in arrival order
    pub fn check_background_tasks(&mut self) {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            outcomes.push(outcome);
        }
        for outcome in outcomes {
            self.apply_outcome(outcome);
        }
        self.expire_notices();
    }

    /// Wait for every running command (and its follow-ups) to finish.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.outcome_rx.recv().await {
                Some(outcome) => self.apply_outcome(outcome),
                None => break,
            }
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        self.in_flight = self.in_flight.saturating_sub(1);

        if outcome.command.is_form_command() {
            let mut closed = false;
            if let Some(form) = self.form.as_mut() {
                let notices = form.complete(&outcome);
                closed = form.is_closed();
                self.push_notices(notices);
            }
            if closed {
                self.close_form();
            }
        }

        let completion = self.roster.complete(outcome);
        self.push_notices(completion.notices);
        if self.state == AppState::EditingMember && self.roster.editor().editing().is_none() {
            self.state = AppState::Normal;
            self.push_notices(vec![Notice::error("Member no longer exists - edit cancelled")]);
        }
        if let Some(command) = completion.follow_up {
            self.dispatch(command);
        }
        self.clamp_cursor();
    }

    // =========================================================================
    // Notices
    // =========================================================================

    fn push_notices(&mut self, notices: Vec<Notice>) {
        let now = Instant::now();
        self.notices
            .extend(notices.into_iter().map(|notice| (notice, now)));
    }

    fn report(&mut self, error: RosterError) {
        debug!(error = %error, "Action rejected");
        self.push_notices(vec![Notice::error(error.to_string())]);
    }

    fn expire_notices(&mut self) {
        self.notices.retain(|(_, at)| at.elapsed() < NOTICE_TTL);
    }

    /// Most recent notice still on screen
    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.last().map(|(notice, _)| notice)
    }

    pub fn dismiss_notices(&mut self) {
        self.notices.clear();
    }

    // =========================================================================
    // Roster rows and cursor
    // =========================================================================

    /// Visible teams, each followed by its member rows when expanded.
    pub fn rows(&self) -> Vec<RosterRow> {
        let mut rows = Vec::new();
        for team in self.roster.visible_teams() {
            rows.push(RosterRow::Team(team.id.clone()));
            if self.roster.is_expanded(&team.id) {
                rows.extend(team.members.iter().enumerate().map(|(index, member)| {
                    RosterRow::Member {
                        team_id: team.id.clone(),
                        member: MemberRef::of(index, member),
                        index,
                    }
                }));
            }
        }
        rows
    }

    pub fn selected_row(&self) -> Option<RosterRow> {
        self.rows().into_iter().nth(self.cursor)
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    fn cursor_to_team(&mut self, id: &TeamId) {
        if let Some(pos) = self
            .rows()
            .iter()
            .position(|row| matches!(row, RosterRow::Team(t) if t == id))
        {
            self.cursor = pos;
        }
    }

    // =========================================================================
    // Roster actions
    // =========================================================================

    pub fn reload(&mut self) {
        let command = self.roster.begin_load();
        self.dispatch(command);
    }

    pub fn set_search(&mut self, text: String) {
        self.roster.set_search(text);
        self.cursor = 0;
        if self.grabbed.is_some() && self.roster.is_filtered() {
            self.grabbed = None;
        }
    }

    pub fn toggle_select(&mut self) {
        if let Some(row) = self.selected_row() {
            self.roster.toggle_select(row.team_id());
        }
    }

    pub fn toggle_select_all(&mut self) {
        self.roster.toggle_select_all();
    }

    pub fn toggle_expand(&mut self) {
        if let Some(row) = self.selected_row() {
            let team_id = row.team_id().clone();
            self.roster.toggle_expand(&team_id);
            self.cursor_to_team(&team_id);
        }
    }

    pub fn cycle_status(&mut self, field: StatusField) {
        let Some(row) = self.selected_row() else {
            return;
        };
        match self.roster.cycle_status(row.team_id(), field) {
            Ok(command) => self.dispatch(command),
            Err(e) => self.report(e),
        }
    }

    /// Pick up the team under the cursor, or drop the one already held onto it.
    pub fn grab_or_drop(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let target = row.team_id().clone();
        match self.grabbed.take() {
            None => {
                if self.roster.is_filtered() {
                    self.report(RosterError::ReorderWhileFiltered);
                } else {
                    self.grabbed = Some(target);
                }
            }
            Some(source) => self.drop_team(&source, Some(&target)),
        }
    }

    pub fn cancel_grab(&mut self) -> bool {
        self.grabbed.take().is_some()
    }

    /// Swap the team under the cursor with its neighbour above or below.
    pub fn nudge_team(&mut self, up: bool) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let source = row.team_id().clone();
        let teams = self.roster.visible_teams();
        let Some(pos) = teams.iter().position(|t| t.id == source) else {
            return;
        };
        let neighbour = if up {
            pos.checked_sub(1).and_then(|p| teams.get(p))
        } else {
            teams.get(pos + 1)
        }
        .map(|t| t.id.clone());
        self.drop_team(&source, neighbour.as_ref());
    }

    fn drop_team(&mut self, source: &TeamId, target: Option<&TeamId>) {
        match self.roster.drop_team(source, target) {
            Ok(Some(command)) => {
                self.dispatch(command);
                self.cursor_to_team(source);
            }
            Ok(None) => {}
            Err(e) => self.report(e),
        }
    }

    pub fn begin_member_edit(&mut self) {
        let Some(RosterRow::Member {
            team_id, member, ..
        }) = self.selected_row()
        else {
            return;
        };
        match self.roster.begin_member_edit(&team_id, member) {
            Ok(()) => self.state = AppState::EditingMember,
            Err(e) => self.report(e),
        }
    }

    pub fn save_member_edit(&mut self) {
        match self.roster.save_member_edit() {
            Ok(command) => {
                self.state = AppState::Normal;
                self.dispatch(command);
            }
            // Stay in the editor so the draft can be fixed
            Err(e @ RosterError::Validation(_)) => self.report(e),
            Err(e) => {
                self.state = AppState::Normal;
                self.report(e);
            }
        }
    }

    pub fn cancel_member_edit(&mut self) {
        self.roster.cancel_member_edit();
        self.state = AppState::Normal;
    }

    /// Ask before deleting the member or team under the cursor.
    pub fn request_delete(&mut self) {
        let pending = match self.selected_row() {
            Some(RosterRow::Team(team_id)) => PendingConfirm::DeleteTeam(team_id),
            Some(RosterRow::Member {
                team_id, member, ..
            }) => PendingConfirm::DeleteMember(team_id, member),
            None => return,
        };
        self.state = AppState::Confirming(pending);
    }

    pub fn request_bulk_delete(&mut self) {
        if self.roster.selection_len() > 0 {
            self.state = AppState::Confirming(PendingConfirm::BulkDelete);
        }
    }

    /// The question shown for a pending confirmation
    pub fn confirm_prompt(&self, pending: &PendingConfirm) -> String {
        let action = match pending {
            PendingConfirm::DeleteTeam(_) => Destructive::DeleteTeam,
            PendingConfirm::DeleteMember(..) => Destructive::DeleteMember,
            PendingConfirm::BulkDelete => Destructive::BulkDelete {
                count: self.roster.selection_len(),
            },
            PendingConfirm::SubmitForm => match self.form.as_ref() {
                Some(form) if form.is_edit() => Destructive::UpdateTeam,
                _ => Destructive::CreateTeam,
            },
            PendingConfirm::ExitForm => Destructive::DiscardForm,
        };
        action.prompt()
    }

    /// Hand the user's answer to the action that asked for it.
    pub fn resolve_confirm(&mut self, answer: bool) {
        let AppState::Confirming(pending) = std::mem::replace(&mut self.state, AppState::Normal)
        else {
            return;
        };

        let result = match pending {
            PendingConfirm::DeleteTeam(team_id) => self.roster.delete_team(&team_id, &answer),
            PendingConfirm::DeleteMember(team_id, member) => {
                self.roster.delete_member(&team_id, member, &answer)
            }
            PendingConfirm::BulkDelete => self.roster.request_bulk_delete(&answer),
            PendingConfirm::SubmitForm => match self.form.as_mut() {
                Some(form) => form.submit(&answer),
                None => Ok(None),
            },
            PendingConfirm::ExitForm => {
                if self.form.as_mut().is_some_and(|form| form.request_exit(&answer)) {
                    self.close_form();
                }
                Ok(None)
            }
        };

        match result {
            Ok(Some(command)) => self.dispatch(command),
            Ok(None) => {}
            Err(e) => self.report(e),
        }
    }

    // =========================================================================
    // Team form
    // =========================================================================

    pub fn open_new_form(&mut self) {
        self.form = Some(TeamForm::new());
        self.form_focus = 0;
        self.screen = Screen::Form;
    }

    pub fn open_edit_form(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let (form, command) = TeamForm::open_edit(row.team_id().clone());
        self.form = Some(form);
        self.form_focus = 0;
        self.screen = Screen::Form;
        self.dispatch(command);
    }

    fn close_form(&mut self) {
        self.form = None;
        self.form_focus = 0;
        self.screen = Screen::Roster;
    }

    pub fn focused_field(&self) -> Option<FieldKey> {
        self.form
            .as_ref()
            .and_then(|form| form.fields().get(self.form_focus).copied())
    }

    pub fn move_form_focus(&mut self, delta: isize) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let len = form.fields().len() as isize;
        self.form_focus = (self.form_focus as isize + delta).rem_euclid(len) as usize;
    }

    pub fn form_type(&mut self, c: char) {
        let (Some(key), Some(form)) = (self.focused_field(), self.form.as_mut()) else {
            return;
        };
        if matches!(
            key,
            FieldKey::Member {
                field: MemberField::Gender,
                ..
            }
        ) {
            return;
        }
        let mut value = form.value(key);
        value.push(c);
        form.set_value(key, &value);
    }

    pub fn form_backspace(&mut self) {
        let (Some(key), Some(form)) = (self.focused_field(), self.form.as_mut()) else {
            return;
        };
        match key {
            FieldKey::Member {
                index,
                field: MemberField::Gender,
            } => form.set_gender(index, None),
            _ => {
                let mut value = form.value(key);
                value.pop();
                form.set_value(key, &value);
            }
        }
    }

    pub fn form_cycle_gender(&mut self, forward: bool) {
        if let (
            Some(FieldKey::Member {
                index,
                field: MemberField::Gender,
            }),
            Some(form),
        ) = (self.focused_field(), self.form.as_mut())
        {
            form.cycle_gender(index, forward);
        }
    }

    pub fn form_add_member(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        form.add_member();
        let index = form.members().len() - 1;
        let name = FieldKey::Member {
            index,
            field: MemberField::Name,
        };
        self.form_focus = form.fields().iter().position(|k| *k == name).unwrap_or(0);
    }

    pub fn form_remove_member(&mut self) {
        let Some(FieldKey::Member { index, .. }) = self.focused_field() else {
            return;
        };
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.remove_member(index) {
            Ok(()) => {
                let len = form.fields().len();
                self.form_focus = self.form_focus.min(len.saturating_sub(1));
            }
            Err(e) => self.report(e),
        }
    }

    /// Validate the form and ask for confirmation before saving.
    pub fn request_submit(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.is_saving() || form.is_loading() {
            self.report(RosterError::InFlight);
        } else if let Err(e) = form.ensure_loaded() {
            self.report(e);
        } else if !form.validate() {
            let errors = form.errors().len();
            self.report(RosterError::InvalidForm { errors });
        } else {
            self.state = AppState::Confirming(PendingConfirm::SubmitForm);
        }
    }

    pub fn request_exit_form(&mut self) {
        if self.form.is_some() {
            self.state = AppState::Confirming(PendingConfirm::ExitForm);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::{anyhow, bail};
    use async_trait::async_trait;
    use teamstatus_core::{
        ApprovalStatus, Member, NewTeam, NoticeLevel, Team,
    };

    use super::*;

    /// Repository whose `list` returns a fixed set of teams and which records
    /// every write.
    #[derive(Default)]
    struct FakeRepo {
        teams: Mutex<Vec<Team>>,
        writes: Mutex<Vec<String>>,
        fail_reorder: bool,
    }

    #[async_trait]
    impl TeamRepository for FakeRepo {
        async fn list(&self) -> anyhow::Result<Vec<Team>> {
            Ok(self.teams.lock().unwrap().clone())
        }
        async fn get(&self, id: &TeamId) -> anyhow::Result<Team> {
            self.teams
                .lock()
                .unwrap()
                .iter()
                .find(|t| &t.id == id)
                .cloned()
                .ok_or_else(|| anyhow!("missing"))
        }
        async fn create(&self, team: &NewTeam) -> anyhow::Result<Team> {
            self.writes.lock().unwrap().push(format!("create {}", team.name));
            Ok(Team::new("new", team.name.clone()))
        }
        async fn update(&self, id: &TeamId, team: &Team) -> anyhow::Result<Team> {
            self.writes.lock().unwrap().push(format!("update {}", id));
            Ok(team.clone())
        }
        async fn delete(&self, id: &TeamId) -> anyhow::Result<()> {
            self.writes.lock().unwrap().push(format!("delete {}", id));
            self.teams.lock().unwrap().retain(|t| &t.id != id);
            Ok(())
        }
        async fn bulk_delete(&self, ids: &[TeamId]) -> anyhow::Result<()> {
            self.writes.lock().unwrap().push(format!("bulk_delete {}", ids.len()));
            Ok(())
        }
        async fn update_status(
            &self,
            id: &TeamId,
            field: StatusField,
            value: ApprovalStatus,
        ) -> anyhow::Result<()> {
            self.writes
                .lock()
                .unwrap()
                .push(format!("status {} {} {}", id, field.api_name(), value));
            Ok(())
        }
        async fn reorder(&self, order: &[TeamId]) -> anyhow::Result<()> {
            if self.fail_reorder {
                bail!("reorder rejected");
            }
            let order: Vec<String> = order.iter().map(|id| id.to_string()).collect();
            self.writes
                .lock()
                .unwrap()
                .push(format!("reorder {}", order.join(",")));
            Ok(())
        }
    }

    fn fake(fail_reorder: bool) -> Arc<FakeRepo> {
        Arc::new(FakeRepo {
            teams: Mutex::new(vec![
                Team::new("A", "Alpha"),
                Team::new("B", "Beta").with_members(vec![Member::new("Bob").with_id("m1")]),
                Team::new("C", "Gamma"),
            ]),
            fail_reorder,
            ..Default::default()
        })
    }

    async fn loaded_app(repo: Arc<FakeRepo>) -> App {
        let mut app = App::with_repository(Config::default(), repo);
        app.reload();
        app.settle().await;
        app
    }

    fn team_order(app: &App) -> Vec<String> {
        app.roster.teams().iter().map(|t| t.id.to_string()).collect()
    }

    #[tokio::test]
    async fn test_keyboard_grab_and_drop() {
        let repo = fake(false);
        let mut app = loaded_app(repo.clone()).await;

        app.cursor = 2;
        app.grab_or_drop();
        assert_eq!(app.grabbed, Some(TeamId::from("C")));
        app.cursor = 0;
        app.grab_or_drop();
        assert_eq!(team_order(&app), ["C", "A", "B"]);
        assert_eq!(app.cursor, 0);

        app.settle().await;
        assert_eq!(repo.writes.lock().unwrap().as_slice(), ["reorder C,A,B"]);
        assert_eq!(
            app.current_notice().map(|n| n.message.as_str()),
            Some("Team order saved successfully")
        );
    }

    #[tokio::test]
    async fn test_failed_nudge_rolls_back() {
        let mut app = loaded_app(fake(true)).await;
        app.cursor = 1;
        app.nudge_team(true);
        assert_eq!(team_order(&app), ["B", "A", "C"]);

        app.settle().await;
        assert_eq!(team_order(&app), ["A", "B", "C"]);
        assert_eq!(
            app.current_notice().map(|n| n.level),
            Some(NoticeLevel::Error)
        );
    }

    #[tokio::test]
    async fn test_grab_is_refused_while_searching() {
        let mut app = loaded_app(fake(false)).await;
        app.set_search("alp".to_string());
        app.grab_or_drop();
        assert!(app.grabbed.is_none());
        assert!(app.current_notice().is_some_and(Notice::is_error));
    }

    #[tokio::test]
    async fn test_expanded_rows_and_member_delete_confirmation() {
        let repo = fake(false);
        let mut app = loaded_app(repo.clone()).await;

        app.cursor = 1;
        app.toggle_expand();
        assert_eq!(app.rows().len(), 4);

        app.move_cursor(1);
        app.request_delete();
        let AppState::Confirming(ref pending) = app.state else {
            panic!("expected confirmation, got {:?}", app.state);
        };
        assert_eq!(
            app.confirm_prompt(pending),
            "Are you sure you want to delete this member?"
        );

        app.resolve_confirm(false);
        assert_eq!(app.state, AppState::Normal);
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn test_delete_team_after_yes() {
        let repo = fake(false);
        let mut app = loaded_app(repo.clone()).await;

        app.cursor = 2;
        app.request_delete();
        app.resolve_confirm(true);
        app.settle().await;

        assert_eq!(repo.writes.lock().unwrap().as_slice(), ["delete C"]);
        assert_eq!(team_order(&app), ["A", "B"]);
        assert_eq!(app.cursor, 1);
    }

    #[tokio::test]
    async fn test_status_toggle_dispatches() {
        let repo = fake(false);
        let mut app = loaded_app(repo.clone()).await;

        app.cycle_status(StatusField::Manager);
        app.settle().await;
        assert_eq!(
            repo.writes.lock().unwrap().as_slice(),
            ["status A managerStatus approved"]
        );
    }

    #[tokio::test]
    async fn test_new_team_form_flow() {
        let repo = fake(false);
        let mut app = loaded_app(repo.clone()).await;

        app.open_new_form();
        app.request_submit();
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(
            app.current_notice().map(|n| n.message.as_str()),
            Some("Please fill in all required fields")
        );

        for c in "Platform".chars() {
            app.form_type(c);
        }
        app.move_form_focus(1);
        for c in "Infra".chars() {
            app.form_type(c);
        }
        app.move_form_focus(1);
        for c in "Alice".chars() {
            app.form_type(c);
        }
        app.move_form_focus(1);
        app.form_cycle_gender(true);
        app.move_form_focus(1);
        for c in "1990-04-01".chars() {
            app.form_type(c);
        }
        app.move_form_focus(1);
        for c in "555-123-4567".chars() {
            app.form_type(c);
        }

        app.request_submit();
        assert_eq!(app.state, AppState::Confirming(PendingConfirm::SubmitForm));
        app.resolve_confirm(true);
        app.settle().await;

        assert_eq!(app.screen, Screen::Roster);
        assert!(app.form.is_none());
        assert_eq!(repo.writes.lock().unwrap().as_slice(), ["create Platform"]);
    }

    #[tokio::test]
    async fn test_exit_form_needs_yes() {
        let mut app = loaded_app(fake(false)).await;
        app.open_new_form();

        app.request_exit_form();
        app.resolve_confirm(false);
        assert_eq!(app.screen, Screen::Form);

        app.request_exit_form();
        app.resolve_confirm(true);
        assert_eq!(app.screen, Screen::Roster);
    }

    #[tokio::test]
    async fn test_edit_form_loads_team() {
        let mut app = loaded_app(fake(false)).await;
        app.cursor = 1;
        app.open_edit_form();
        app.settle().await;

        let form = app.form.as_ref().unwrap();
        assert!(form.is_edit());
        assert_eq!(form.name, "Beta");
        assert_eq!(form.members()[0].name, "Bob");
    }

    #[tokio::test]
    async fn test_edit_form_without_team_data_cannot_be_saved() {
        let repo = fake(false);
        let mut app = loaded_app(repo.clone()).await;
        repo.teams.lock().unwrap().retain(|t| t.id != TeamId::from("B"));

        app.cursor = 1;
        app.open_edit_form();
        app.settle().await;
        assert_eq!(
            app.current_notice().map(|n| n.message.as_str()),
            Some("Failed to load team data")
        );

        app.request_submit();
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(
            app.current_notice().map(|n| n.message.as_str()),
            Some("Team data is not loaded - reopen the team to edit it")
        );
        assert!(repo.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reload_that_removes_edited_member_leaves_edit_mode() {
        let repo = fake(false);
        let mut app = loaded_app(repo.clone()).await;

        app.cursor = 1;
        app.toggle_expand();
        app.move_cursor(1);
        app.begin_member_edit();
        assert_eq!(app.state, AppState::EditingMember);

        repo.teams.lock().unwrap()[1].members.clear();
        app.reload();
        app.settle().await;

        assert_eq!(app.state, AppState::Normal);
        assert!(app.roster.editor().editing().is_none());
        assert!(app.current_notice().is_some_and(Notice::is_error));
    }
}
