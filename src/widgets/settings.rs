//! Settings dialog rendering.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::config::Theme;
use crate::settings_modal::{SettingsFocus, SettingsModal};

const LABEL_WIDTH: u16 = 14;
pub const SETTINGS_WIDTH: u16 = 56;
pub const SETTINGS_HEIGHT: u16 = 15;

fn selector_line(value: &str, focused: bool, active_color: Color) -> Line<'static> {
    let style = if focused {
        Style::default().fg(active_color)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled("◀ ", style),
        Span::styled(value.to_string(), style.add_modifier(Modifier::BOLD)),
        Span::styled(" ▶", style),
    ])
}

fn button(label: &str, focused: bool, border_color: Color, active_color: Color) -> Paragraph<'_> {
    let color = if focused { active_color } else { border_color };
    Paragraph::new(label)
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .centered()
}

pub fn render_settings_modal(area: Rect, buf: &mut Buffer, modal: &mut SettingsModal, theme: &Theme) {
    let border_color = theme.get("modal_border");
    let active_color = theme.get("modal_border_active");
    let error_color = theme.get("error");

    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Chart Settings ");
    let inner = block.inner(area);
    block.render(area, buf);

    let mut constraints = vec![Constraint::Length(1); 7];
    constraints.push(Constraint::Length(1)); // Error
    constraints.push(Constraint::Length(3)); // Buttons
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let fields = &SettingsFocus::ALL[..7];
    for (i, &field) in fields.iter().enumerate() {
        let row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LABEL_WIDTH), Constraint::Fill(1)])
            .split(rows[i]);
        let focused = modal.focus == field;
        let label_style = if focused {
            Style::default().fg(active_color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(border_color)
        };
        Paragraph::new(field.label())
            .style(label_style)
            .render(row[0], buf);

        match field {
            SettingsFocus::Column => {
                let column = modal.draft.selected_column().unwrap_or("(none)").to_string();
                Paragraph::new(selector_line(&column, focused, active_color)).render(row[1], buf);
            }
            SettingsFocus::ChartType => {
                Paragraph::new(selector_line(
                    modal.draft.chart_type.as_str(),
                    focused,
                    active_color,
                ))
                .render(row[1], buf);
            }
            SettingsFocus::Alignment => {
                Paragraph::new(selector_line(
                    modal.draft.title_alignment.as_str(),
                    focused,
                    active_color,
                ))
                .render(row[1], buf);
            }
            SettingsFocus::TopN => {
                modal.top_n_input.set_focused(focused);
                (&modal.top_n_input).render(row[1], buf);
            }
            SettingsFocus::Width => {
                modal.width_input.set_focused(focused);
                (&modal.width_input).render(row[1], buf);
            }
            SettingsFocus::Height => {
                modal.height_input.set_focused(focused);
                (&modal.height_input).render(row[1], buf);
            }
            SettingsFocus::Title => {
                modal.title_input.set_focused(focused);
                (&modal.title_input).render(row[1], buf);
            }
            SettingsFocus::ApplyButton | SettingsFocus::CancelButton => {}
        }
    }

    if let Some(error) = &modal.error {
        Paragraph::new(error.as_str())
            .style(Style::default().fg(error_color))
            .render(rows[7], buf);
    }

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[8]);
    button(
        "Apply",
        modal.focus == SettingsFocus::ApplyButton,
        border_color,
        active_color,
    )
    .render(buttons[0], buf);
    button(
        "Cancel",
        modal.focus == SettingsFocus::CancelButton,
        border_color,
        active_color,
    )
    .render(buttons[1], buf);
}
