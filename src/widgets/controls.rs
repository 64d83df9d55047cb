use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

/// Key hints shown along the bottom edge.
pub const CONTROLS: [(&str, &str); 14] = [
    ("o", "Open"),
    ("p", "Project"),
    ("s", "Save"),
    ("e", "Export"),
    ("c", "Settings"),
    ("t", "Type"),
    ("←/→", "Column"),
    ("+/-", "Top"),
    ("l", "Label"),
    ("C", "Color"),
    ("x", "Remove"),
    ("R", "Reset"),
    ("n", "New"),
    ("q", "Quit"),
];

pub struct Controls {
    pub item_count: Option<usize>,
    pub dimmed: bool,
    pub bg: Color,
    pub fg: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            item_count: None,
            dimmed: false,
            bg: Color::DarkGray,
            fg: Color::White,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item_count(mut self, item_count: usize) -> Self {
        self.item_count = Some(item_count);
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_colors(mut self, bg: Color, fg: Color) -> Self {
        self.bg = bg;
        self.fg = fg;
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = CONTROLS.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });

        if self.item_count.is_some() {
            constraints.push(Constraint::Length(12)); // "Items: 123"
        }
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in CONTROLS.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(self.bg))
                .render(layout[j + 1], buf);
        }

        let mut fill_start_idx = CONTROLS.len() * 2;
        if let Some(count) = self.item_count {
            Paragraph::new(format!("Items: {}", count))
                .style(base_style.bg(self.bg).fg(if self.dimmed {
                    Color::DarkGray
                } else {
                    self.fg
                }))
                .right_aligned()
                .render(layout[fill_start_idx], buf);
            fill_start_idx += 1;
        }

        Paragraph::new("")
            .style(base_style.bg(self.bg))
            .render(layout[fill_start_idx], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, width: u16) -> String {
        (0..width).map(|x| buf[(x, 0)].symbol()).collect()
    }

    #[test]
    fn test_renders_key_hints() {
        let area = Rect::new(0, 0, 160, 1);
        let mut buf = Buffer::empty(area);
        Controls::new().with_item_count(3).render(area, &mut buf);
        let text = row_text(&buf, 160);
        assert!(text.contains("Open"));
        assert!(text.contains("Quit"));
        assert!(text.contains("Items: 3"));
    }
}
