use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use teamstatus_core::roster::Pending;
use teamstatus_core::{Member, MemberRef, StatusField, Team, TeamId};

use crate::app::{App, AppState, RosterRow};
use crate::ui::styles;
use crate::utils::{format_date, format_phone, truncate_string};

/// Render the team roster: one row per visible team, followed by member rows
/// for expanded teams.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let roster = &app.roster;

    if roster.visible_teams().is_empty() {
        render_empty(frame, app, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from(if roster.all_visible_selected() { "[x]" } else { "[ ]" }),
        Cell::from(""),
        Cell::from("Team"),
        Cell::from("Description"),
        Cell::from("Mgr"),
        Cell::from("Dir"),
        Cell::from("Members"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .rows()
        .into_iter()
        .filter_map(|row| match row {
            RosterRow::Team(id) => roster.team(&id).map(|team| team_row(app, team)),
            RosterRow::Member {
                team_id,
                member,
                index,
            } => roster
                .team(&team_id)
                .and_then(|team| team.members.get(index))
                .map(|m| member_row(app, &team_id, &member, m)),
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Percentage(30),
        Constraint::Fill(1),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title(app))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(matches!(
                    app.state,
                    AppState::Normal | AppState::EditingMember
                ))),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.cursor));

    frame.render_stateful_widget(table, area, &mut state);
}

fn title(app: &App) -> String {
    let roster = &app.roster;
    let shown = roster.visible_teams().len();
    let count = if roster.is_filtered() {
        format!("{} of {}", shown, roster.teams().len())
    } else {
        shown.to_string()
    };
    let hint = if roster.is_filtered() {
        "reorder disabled while searching"
    } else if app.grabbed.is_some() {
        "[g] drop here, [Esc] cancel"
    } else {
        "[g] grab to reorder"
    };
    let selected = match roster.selection_len() {
        0 => String::new(),
        n => format!(", {} selected", n),
    };
    format!(" Teams ({}{}) - {} ", count, selected, hint)
}

fn team_row<'a>(app: &App, team: &'a Team) -> Row<'a> {
    let roster = &app.roster;
    let checkbox = if roster.is_selected(&team.id) { "[x]" } else { "[ ]" };
    let expander = match (team.has_members(), roster.is_expanded(&team.id)) {
        (false, _) => " ",
        (true, false) => "▸",
        (true, true) => "▾",
    };

    let status_cell = |field: StatusField| {
        let status = team.status(field);
        let symbol = if roster.is_pending(&Pending::Status(team.id.clone(), field)) {
            "…"
        } else {
            styles::approval_symbol(status)
        };
        Cell::from(Span::styled(
            format!(" {}", symbol),
            styles::approval_style(status),
        ))
    };

    let grabbed = app.grabbed.as_ref() == Some(&team.id);
    let style = if grabbed {
        styles::grabbed_style()
    } else {
        styles::list_item_style()
    };

    Row::new(vec![
        Cell::from(checkbox),
        Cell::from(expander),
        Cell::from(team.name.as_str()),
        Cell::from(Span::styled(
            truncate_string(&team.description, 60),
            styles::muted_style(),
        )),
        status_cell(StatusField::Manager),
        status_cell(StatusField::Director),
        Cell::from(format!("{:>4}", team.members.len())),
    ])
    .style(style)
}

fn member_row<'a>(
    app: &App,
    team_id: &TeamId,
    member_ref: &MemberRef,
    member: &Member,
) -> Row<'a> {
    let editor = app.roster.editor();

    let name = match editor.editing() {
        Some(edit) if &edit.team_id == team_id && &edit.member == member_ref => {
            Span::styled(format!("{}▌", edit.draft), styles::search_style())
        }
        _ if editor.is_saving(team_id, member_ref) => {
            Span::styled(format!("{} (saving…)", member.name), styles::muted_style())
        }
        _ => Span::raw(member.name.clone()),
    };

    let details = [
        member.gender.map(|g| g.as_str().to_string()),
        member.date_of_birth.as_deref().map(format_date),
        member.contact_no.as_deref().map(format_phone),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("  ");

    Row::new(vec![
        Cell::from(""),
        Cell::from(""),
        Cell::from(Line::from(vec![Span::styled("  └ ", styles::muted_style()), name])),
        Cell::from(Span::styled(details, styles::muted_style())),
        Cell::from(""),
        Cell::from(""),
        Cell::from(""),
    ])
}

fn render_empty(frame: &mut Frame, app: &App, area: Rect) {
    let roster = &app.roster;
    let message = if !roster.is_loaded() && roster.is_loading() {
        "Loading teams..."
    } else if roster.is_filtered() {
        "No teams match the search."
    } else {
        "No teams yet. Press [n] to create one."
    };

    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!(" {}", message),
        styles::muted_style(),
    )))
    .block(
        Block::default()
            .title(" Teams ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}
