//! Prompt rendering: optional format row, text input and buttons.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::chart_export::ChartExportFormat;
use crate::prompt_modal::{PromptFocus, PromptModal, PromptPurpose};

pub const PROMPT_WIDTH: u16 = 60;

const FORMAT_COLS: u16 = 3;

/// Height needed for the modal's current purpose.
pub fn prompt_height(purpose: PromptPurpose) -> u16 {
    if purpose == PromptPurpose::ExportChart {
        11
    } else {
        8
    }
}

fn focus_color(focused: bool, border_color: Color, active_color: Color) -> Color {
    if focused {
        active_color
    } else {
        border_color
    }
}

pub fn render_prompt_modal(
    area: Rect,
    buf: &mut Buffer,
    modal: &mut PromptModal,
    border_color: Color,
    active_color: Color,
) {
    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", modal.purpose.title()));
    let inner = block.inner(area);
    block.render(area, buf);

    let with_format = modal.purpose == PromptPurpose::ExportChart;
    let mut constraints = Vec::new();
    if with_format {
        constraints.push(Constraint::Length(3)); // Format row
    }
    constraints.push(Constraint::Length(3)); // Input row
    constraints.push(Constraint::Length(3)); // Buttons
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut next = 0;
    if with_format {
        let format_area = chunks[next];
        next += 1;
        let focused = modal.focus == PromptFocus::FormatSelector;
        let format_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(focus_color(focused, border_color, active_color)))
            .title(if modal.format_chosen {
                " Format "
            } else {
                " Format (from extension) "
            });
        let format_inner = format_block.inner(format_area);
        format_block.render(format_area, buf);

        let col_width = format_inner.width / FORMAT_COLS;
        for (i, &format) in ChartExportFormat::ALL.iter().enumerate() {
            let cell_area = Rect {
                x: format_inner.x + i as u16 * col_width,
                y: format_inner.y,
                width: col_width,
                height: 1,
            };
            let selected = modal.format_chosen && modal.selected_format == format;
            let marker = if selected { "●" } else { "○" };
            Paragraph::new(Line::from(Span::styled(
                format!("{} {}", marker, format.as_str()),
                Style::default().fg(focus_color(selected, border_color, active_color)),
            )))
            .render(cell_area, buf);
        }
    }

    let input_area = chunks[next];
    let input_focused = modal.focus == PromptFocus::Input;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(focus_color(input_focused, border_color, active_color)))
        .title(format!(" {} ", modal.purpose.input_title()));
    let input_inner = input_block.inner(input_area);
    input_block.render(input_area, buf);
    modal.input.set_focused(input_focused);
    (&modal.input).render(input_inner, buf);

    let btn_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[next + 1]);

    for (label, focus, btn_area) in [
        ("OK", PromptFocus::ConfirmButton, btn_chunks[0]),
        ("Cancel", PromptFocus::CancelButton, btn_chunks[1]),
    ] {
        let color = focus_color(modal.focus == focus, border_color, active_color);
        Paragraph::new(label)
            .style(Style::default().fg(color))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            )
            .centered()
            .render(btn_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;

    fn render(purpose: PromptPurpose, value: &str) -> String {
        let area = Rect::new(0, 0, PROMPT_WIDTH, prompt_height(purpose));
        let mut buf = Buffer::empty(area);
        let mut modal = PromptModal::new();
        modal.open(purpose, value, &Theme::default());
        render_prompt_modal(area, &mut buf, &mut modal, Color::Cyan, Color::Yellow);
        (area.top()..area.bottom())
            .flat_map(|y| (area.left()..area.right()).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_export_prompt_shows_formats() {
        let text = render(PromptPurpose::ExportChart, "chart.eps");
        assert!(text.contains("Export Chart"));
        assert!(text.contains("PNG"));
        assert!(text.contains("EPS"));
        assert!(text.contains("chart.eps"));
    }

    #[test]
    fn test_label_prompt_has_no_formats() {
        let text = render(PromptPurpose::EditLabel, "Paris");
        assert!(text.contains("Edit Label"));
        assert!(!text.contains("PNG"));
        assert!(text.contains("Paris"));
    }
}
