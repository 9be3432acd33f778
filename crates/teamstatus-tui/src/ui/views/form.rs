use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use teamstatus_core::{FieldKey, MemberField, TeamForm};

use crate::app::App;
use crate::ui::styles;

const LABEL_WIDTH: usize = 16;

/// Render the create/edit team form.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.form.as_ref() else {
        return;
    };

    let title = match (form.is_edit(), form.is_loading(), form.is_saving()) {
        (_, true, _) => " Edit Team - loading... ".to_string(),
        (true, _, true) => " Edit Team - saving... ".to_string(),
        (false, _, true) => " New Team - saving... ".to_string(),
        (true, _, _) => " Edit Team ".to_string(),
        (false, _, _) => " New Team ".to_string(),
    };

    let focused = app.focused_field();
    let lines = form_lines(form, focused);

    // Keep the focused field on screen
    let focus_line = focused
        .and_then(|key| lines.iter().position(|(k, _)| *k == Some(key)))
        .unwrap_or(0);
    let visible = area.height.saturating_sub(3) as usize;
    let scroll = focus_line.saturating_sub(visible.saturating_sub(2));

    let mut text: Vec<Line> = lines.into_iter().map(|(_, line)| line).collect();
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        " [Tab] next  [Ctrl+N] add member  [Ctrl+D] remove member  [Ctrl+S] save  [Esc] exit",
        styles::muted_style(),
    )));

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .scroll((scroll as u16, 0));

    frame.render_widget(paragraph, area);
}

/// One line per field, plus error lines under invalid fields and a heading
/// before each member.
fn form_lines(form: &TeamForm, focused: Option<FieldKey>) -> Vec<(Option<FieldKey>, Line<'static>)> {
    let mut lines = Vec::new();

    for key in form.fields() {
        if let FieldKey::Member {
            index,
            field: MemberField::Name,
        } = key
        {
            lines.push((None, Line::from("")));
            lines.push((
                None,
                Line::from(Span::styled(
                    format!(" Member {}", index + 1),
                    styles::highlight_style(),
                )),
            ));
        }

        lines.push((Some(key), field_line(form, key, focused == Some(key))));

        if let Some(error) = form.error(key) {
            lines.push((
                None,
                Line::from(Span::styled(
                    format!("   {:width$}{}", "", error, width = LABEL_WIDTH),
                    styles::error_style(),
                )),
            ));
        }
    }

    lines
}

fn field_line(form: &TeamForm, key: FieldKey, focused: bool) -> Line<'static> {
    let label = match key {
        FieldKey::TeamName => "Team Name",
        FieldKey::Description => "Description",
        FieldKey::Member { field, .. } => field.label(),
    };

    let value = form.value(key);
    let is_gender = matches!(
        key,
        FieldKey::Member {
            field: MemberField::Gender,
            ..
        }
    );
    let display = match (is_gender, value.is_empty(), focused) {
        (true, true, _) => "< select >".to_string(),
        (true, false, true) => format!("< {} >", value),
        (true, false, false) => value,
        (false, _, true) => format!("{}▌", value),
        (false, _, false) => value,
    };

    let value_style = if focused {
        styles::selected_style()
    } else if form.error(key).is_some() {
        styles::error_style()
    } else {
        styles::list_item_style()
    };

    let marker = if focused { " ▶ " } else { "   " };
    Line::from(vec![
        Span::styled(marker, styles::highlight_style()),
        Span::styled(
            format!("{:width$}", format!("{}:", label), width = LABEL_WIDTH),
            styles::muted_style(),
        ),
        Span::styled(display, value_style),
    ])
}
