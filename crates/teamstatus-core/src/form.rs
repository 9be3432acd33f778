//! The create/edit team form.
//!
//! A `TeamForm` holds the editable copy of one team and its members, the
//! per-field validation errors and where the form is in its lifecycle
//! (loading, ready, saving, closed). Like the roster, it never talks to the
//! backend itself: `open_edit` and `submit` return a `Command`, and the
//! caller feeds the resulting `Outcome` back through `complete`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::debug;

use crate::confirm::{Confirm, Destructive};
use crate::error::{RosterError, ValidationError, MIN_CONTACT_DIGITS};
use crate::models::{Gender, Member, MemberId, NewTeam, Team, TeamId};
use crate::roster::{Command, Notice, Outcome, Reply};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ===== Field addressing =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberField {
    Name,
    Gender,
    DateOfBirth,
    ContactNo,
}

impl MemberField {
    pub const ALL: [MemberField; 4] = [
        MemberField::Name,
        MemberField::Gender,
        MemberField::DateOfBirth,
        MemberField::ContactNo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MemberField::Name => "Name",
            MemberField::Gender => "Gender",
            MemberField::DateOfBirth => "Date of Birth",
            MemberField::ContactNo => "Contact No.",
        }
    }
}

/// One input on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    TeamName,
    Description,
    Member { index: usize, field: MemberField },
}

/// Validation errors keyed by field, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FieldKey, ValidationError>);

impl FieldErrors {
    pub fn get(&self, key: FieldKey) -> Option<&ValidationError> {
        self.0.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &ValidationError)> {
        self.0.iter()
    }

    fn insert(&mut self, key: FieldKey, error: ValidationError) {
        self.0.insert(key, error);
    }

    fn clear(&mut self, key: FieldKey) {
        self.0.remove(&key);
    }

    /// Forget errors for member row `removed` and move later rows up by one.
    fn remove_member_row(&mut self, removed: usize) {
        self.0 = std::mem::take(&mut self.0)
            .into_iter()
            .filter_map(|(key, error)| match key {
                FieldKey::Member { index, .. } if index == removed => None,
                FieldKey::Member { index, field } if index > removed => Some((
                    FieldKey::Member {
                        index: index - 1,
                        field,
                    },
                    error,
                )),
                other => Some((other, error)),
            })
            .collect();
    }
}

// ===== Member rows =====

/// Editable copy of one member. Text inputs are kept as the user typed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberDraft {
    pub id: Option<MemberId>,
    pub name: String,
    pub gender: Option<Gender>,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub contact_no: String,
    extra: Map<String, Value>,
}

impl MemberDraft {
    pub fn from_member(member: &Member) -> Self {
        let date_of_birth = match member.birth_date() {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => member
                .date_of_birth
                .as_deref()
                .map(|raw| raw.split('T').next().unwrap_or(raw).to_string())
                .unwrap_or_default(),
        };
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            gender: member.gender,
            date_of_birth,
            contact_no: member.contact_no.clone().unwrap_or_default(),
            extra: member.extra.clone(),
        }
    }

    pub fn to_member(&self) -> Member {
        Member {
            id: self.id.clone(),
            name: self.name.trim().to_string(),
            gender: self.gender,
            date_of_birth: non_empty(&self.date_of_birth),
            contact_no: non_empty(&self.contact_no),
            extra: self.extra.clone(),
        }
    }

    fn validate(&self, index: usize, errors: &mut FieldErrors) {
        let key = |field| FieldKey::Member { index, field };

        if self.name.trim().is_empty() {
            errors.insert(key(MemberField::Name), ValidationError::MemberNameRequired);
        }
        if self.gender.is_none() {
            errors.insert(key(MemberField::Gender), ValidationError::GenderRequired);
        }
        if self.date_of_birth.trim().is_empty() {
            errors.insert(
                key(MemberField::DateOfBirth),
                ValidationError::DateOfBirthRequired,
            );
        } else if NaiveDate::parse_from_str(self.date_of_birth.trim(), DATE_FORMAT).is_err() {
            errors.insert(
                key(MemberField::DateOfBirth),
                ValidationError::InvalidDateOfBirth,
            );
        }
        if self.contact_no.is_empty() {
            errors.insert(key(MemberField::ContactNo), ValidationError::ContactRequired);
        } else if self.contact_no.len() < MIN_CONTACT_DIGITS {
            errors.insert(key(MemberField::ContactNo), ValidationError::ContactTooShort);
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

// ===== Form =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    Loading,
    #[default]
    Ready,
    Saving,
    Closed,
}

#[derive(Debug, Clone)]
pub struct TeamForm {
    /// The team being edited, as last loaded. `None` when creating.
    base: Option<Team>,
    editing_id: Option<TeamId>,
    pub name: String,
    pub description: String,
    members: Vec<MemberDraft>,
    errors: FieldErrors,
    phase: FormPhase,
}

impl Default for TeamForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamForm {
    /// A blank form for a new team, with one empty member row.
    pub fn new() -> Self {
        Self {
            base: None,
            editing_id: None,
            name: String::new(),
            description: String::new(),
            members: vec![MemberDraft::default()],
            errors: FieldErrors::default(),
            phase: FormPhase::Ready,
        }
    }

    /// A form for an existing team. The returned command fetches it.
    pub fn open_edit(team_id: TeamId) -> (Self, Command) {
        let form = Self {
            editing_id: Some(team_id.clone()),
            phase: FormPhase::Loading,
            ..Self::new()
        };
        (form, Command::FetchTeam { team_id })
    }

    /// A form filled from an already loaded team.
    pub fn from_team(team: Team) -> Self {
        let mut form = Self::new();
        form.load(team);
        form
    }

    fn load(&mut self, team: Team) {
        self.editing_id = Some(team.id.clone());
        self.name = team.name.clone();
        self.description = team.description.clone();
        self.members = team.members.iter().map(MemberDraft::from_member).collect();
        if self.members.is_empty() {
            self.members.push(MemberDraft::default());
        }
        self.errors = FieldErrors::default();
        self.base = Some(team);
        self.phase = FormPhase::Ready;
    }

    // ===== Accessors =====

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Fails for an edit form whose team never loaded. Such a form cannot be
    /// saved: the update would overwrite fields it never saw.
    pub fn ensure_loaded(&self) -> Result<(), RosterError> {
        match (&self.editing_id, &self.base) {
            (Some(id), None) => Err(RosterError::TeamNotLoaded(id.clone())),
            _ => Ok(()),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FormPhase::Loading
    }

    pub fn is_saving(&self) -> bool {
        self.phase == FormPhase::Saving
    }

    pub fn is_closed(&self) -> bool {
        self.phase == FormPhase::Closed
    }

    pub fn members(&self) -> &[MemberDraft] {
        &self.members
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, key: FieldKey) -> Option<&ValidationError> {
        self.errors.get(key)
    }

    /// Current text of a field, as shown in its input.
    pub fn value(&self, key: FieldKey) -> String {
        match key {
            FieldKey::TeamName => self.name.clone(),
            FieldKey::Description => self.description.clone(),
            FieldKey::Member { index, field } => {
                let Some(member) = self.members.get(index) else {
                    return String::new();
                };
                match field {
                    MemberField::Name => member.name.clone(),
                    MemberField::Gender => member
                        .gender
                        .map(|g| g.as_str().to_string())
                        .unwrap_or_default(),
                    MemberField::DateOfBirth => member.date_of_birth.clone(),
                    MemberField::ContactNo => member.contact_no.clone(),
                }
            }
        }
    }

    /// All fields in display order.
    pub fn fields(&self) -> Vec<FieldKey> {
        let mut fields = vec![FieldKey::TeamName, FieldKey::Description];
        for index in 0..self.members.len() {
            fields.extend(
                MemberField::ALL
                    .into_iter()
                    .map(|field| FieldKey::Member { index, field }),
            );
        }
        fields
    }

    // ===== Editing =====

    /// Replace a text field's value. Contact numbers keep digits only; the
    /// gender field accepts only a known gender (anything else clears it).
    /// Editing a field clears its error.
    pub fn set_value(&mut self, key: FieldKey, value: &str) {
        match key {
            FieldKey::TeamName => self.name = value.to_string(),
            FieldKey::Description => self.description = value.to_string(),
            FieldKey::Member { index, field } => {
                let Some(member) = self.members.get_mut(index) else {
                    return;
                };
                match field {
                    MemberField::Name => member.name = value.to_string(),
                    MemberField::Gender => member.gender = Gender::parse(value),
                    MemberField::DateOfBirth => member.date_of_birth = value.to_string(),
                    MemberField::ContactNo => {
                        member.contact_no = value.chars().filter(char::is_ascii_digit).collect()
                    }
                }
            }
        }
        self.errors.clear(key);
    }

    pub fn set_gender(&mut self, index: usize, gender: Option<Gender>) {
        if let Some(member) = self.members.get_mut(index) {
            member.gender = gender;
            self.errors.clear(FieldKey::Member {
                index,
                field: MemberField::Gender,
            });
        }
    }

    /// Step the gender selector of a member row through
    /// unset, Male, Female, Other.
    pub fn cycle_gender(&mut self, index: usize, forward: bool) {
        let Some(member) = self.members.get(index) else {
            return;
        };
        let mut options: Vec<Option<Gender>> = vec![None];
        options.extend(Gender::ALL.into_iter().map(Some));
        let current = options.iter().position(|g| *g == member.gender).unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        self.set_gender(index, options[next]);
    }

    pub fn add_member(&mut self) {
        self.members.push(MemberDraft::default());
    }

    /// Remove a member row. The last remaining row cannot be removed.
    pub fn remove_member(&mut self, index: usize) -> Result<(), RosterError> {
        if self.members.len() <= 1 {
            return Err(ValidationError::LastMember.into());
        }
        if index >= self.members.len() {
            return Ok(());
        }
        self.members.remove(index);
        self.errors.remove_member_row(index);
        Ok(())
    }

    // ===== Validation & submit =====

    /// Recompute every field error. Returns true when the form is valid.
    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::default();
        if self.name.trim().is_empty() {
            errors.insert(FieldKey::TeamName, ValidationError::TeamNameRequired);
        }
        if self.description.trim().is_empty() {
            errors.insert(FieldKey::Description, ValidationError::DescriptionRequired);
        }
        for (index, member) in self.members.iter().enumerate() {
            member.validate(index, &mut errors);
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    fn members_payload(&self) -> Vec<Member> {
        self.members.iter().map(MemberDraft::to_member).collect()
    }

    /// Validate, confirm and build the save command. `Ok(None)` when the user
    /// declined.
    pub fn submit(&mut self, confirm: &dyn Confirm) -> Result<Option<Command>, RosterError> {
        match self.phase {
            FormPhase::Saving | FormPhase::Loading => return Err(RosterError::InFlight),
            FormPhase::Ready | FormPhase::Closed => {}
        }
        self.ensure_loaded()?;
        if !self.validate() {
            return Err(RosterError::InvalidForm {
                errors: self.errors.len(),
            });
        }

        let action = if self.is_edit() {
            Destructive::UpdateTeam
        } else {
            Destructive::CreateTeam
        };
        if !confirm.confirm(&action) {
            return Ok(None);
        }

        let command = match &self.base {
            Some(base) => {
                let mut team = base.clone();
                team.name = self.name.trim().to_string();
                team.description = self.description.trim().to_string();
                team.members = self.members_payload();
                Command::UpdateTeam(team)
            }
            None => Command::CreateTeam(NewTeam {
                name: self.name.trim().to_string(),
                description: self.description.trim().to_string(),
                members: self.members_payload(),
            }),
        };
        debug!(command = command.name(), "Submitting team form");
        self.phase = FormPhase::Saving;
        Ok(Some(command))
    }

    /// Leave the form without saving, after confirmation. Returns whether the
    /// form is now closed.
    pub fn request_exit(&mut self, confirm: &dyn Confirm) -> bool {
        if confirm.confirm(&Destructive::DiscardForm) {
            self.phase = FormPhase::Closed;
        }
        self.is_closed()
    }

    /// Apply the result of a command this form issued. Other outcomes are
    /// ignored.
    pub fn complete(&mut self, outcome: &Outcome) -> Vec<Notice> {
        let mut notices = Vec::new();
        match (&outcome.command, &outcome.result) {
            (Command::FetchTeam { team_id }, result) if Some(team_id) == self.editing_id.as_ref() => {
                match result {
                    Ok(Reply::Team(team)) => self.load(team.clone()),
                    _ => {
                        self.phase = FormPhase::Ready;
                        notices.push(Notice::error("Failed to load team data"));
                    }
                }
            }
            (Command::CreateTeam(_), result) if self.is_saving() && !self.is_edit() => {
                if result.is_ok() {
                    self.phase = FormPhase::Closed;
                    notices.push(Notice::success("Team created successfully!"));
                } else {
                    self.phase = FormPhase::Ready;
                    notices.push(Notice::error("Failed to create team. Please try again."));
                }
            }
            (Command::UpdateTeam(team), result)
                if self.is_saving() && Some(&team.id) == self.editing_id.as_ref() =>
            {
                if result.is_ok() {
                    self.phase = FormPhase::Closed;
                    notices.push(Notice::success("Team updated successfully!"));
                } else {
                    self.phase = FormPhase::Ready;
                    notices.push(Notice::error("Failed to update team. Please try again."));
                }
            }
            _ => {}
        }
        notices
    }
}
