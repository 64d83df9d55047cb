use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::chart_model::ChartItem;
use crate::color::fill_color;
use crate::config::{ColorParser, Theme};
use crate::statistics::Summary;

pub const LEGEND_WIDTH: u16 = 32;

/// Chart items with their swatch, label and count. The selected row is the
/// target of label/color edits and removal.
pub struct Legend<'a> {
    items: &'a [ChartItem],
    summary: Option<&'a Summary>,
    column: Option<&'a str>,
    focused: bool,
    border_color: Color,
    active_color: Color,
    dimmed_color: Color,
}

impl<'a> Legend<'a> {
    pub fn new(items: &'a [ChartItem]) -> Self {
        Self {
            items,
            summary: None,
            column: None,
            focused: true,
            border_color: Color::Reset,
            active_color: Color::Yellow,
            dimmed_color: Color::DarkGray,
        }
    }

    pub fn with_summary(mut self, summary: Option<&'a Summary>) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_column(mut self, column: Option<&'a str>) -> Self {
        self.column = column;
        self
    }

    pub fn with_focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.border_color = theme.get("modal_border");
        self.active_color = theme.get("modal_border_active");
        self.dimmed_color = theme.get("dimmed");
        self
    }
}

impl StatefulWidget for Legend<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut ListState) {
        let border = if self.focused {
            self.active_color
        } else {
            self.border_color
        };
        let title = match self.column {
            Some(column) => format!(" {} ", column),
            None => " Legend ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            Paragraph::new("No categories")
                .style(Style::default().fg(self.dimmed_color))
                .render(inner, buf);
            return;
        }

        // One footer line for the spread of the counts
        let footer_height = u16::from(self.summary.is_some() && inner.height > 2);
        let list_area = Rect {
            height: inner.height - footer_height,
            ..inner
        };

        let parser = ColorParser::new();
        let list_items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| {
                let swatch = parser.chart_color(fill_color(&item.color));
                ListItem::new(Line::from(vec![
                    Span::styled("██ ", Style::default().fg(swatch)),
                    Span::raw(item.label.clone()),
                    Span::styled(
                        format!(" ({})", item.value),
                        Style::default().fg(self.dimmed_color),
                    ),
                ]))
            })
            .collect();

        StatefulWidget::render(
            List::new(list_items).highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            list_area,
            buf,
            state,
        );

        if footer_height > 0 {
            if let Some(summary) = self.summary {
                let footer = Rect {
                    y: inner.bottom() - 1,
                    height: 1,
                    ..inner
                };
                Paragraph::new(summary.std_dev_text())
                    .style(Style::default().fg(self.dimmed_color))
                    .render(footer, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<ChartItem> {
        vec![
            ChartItem {
                label: "Paris".into(),
                value: 2,
                color: "#ff0000".into(),
                key: "Paris".into(),
            },
            ChartItem {
                label: "Lyon".into(),
                value: 1,
                color: "".into(),
                key: "Lyon".into(),
            },
        ]
    }

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_lists_items_with_counts() {
        let area = Rect::new(0, 0, LEGEND_WIDTH, 8);
        let mut buf = Buffer::empty(area);
        let items = items();
        let summary = Summary::from_counts(&[2, 1]);
        let mut state = ListState::default().with_selected(Some(0));
        Legend::new(&items)
            .with_column(Some("city"))
            .with_summary(Some(&summary))
            .render(area, &mut buf, &mut state);
        let text = text(&buf);
        assert!(text.contains("city"));
        assert!(text.contains("Paris (2)"));
        assert!(text.contains("Lyon (1)"));
        assert!(text.contains("Std. dev.: 0.50"));
    }

    #[test]
    fn test_empty_legend() {
        let area = Rect::new(0, 0, LEGEND_WIDTH, 5);
        let mut buf = Buffer::empty(area);
        let mut state = ListState::default();
        Legend::new(&[]).render(area, &mut buf, &mut state);
        assert!(text(&buf).contains("No categories"));
    }
}
