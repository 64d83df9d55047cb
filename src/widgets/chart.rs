//! Terminal preview of a chart scene.
//!
//! Paints the same [`Scene`] that the exporters write, on a braille canvas.
//! Scene coordinates grow downwards while the canvas grows upwards, so every y
//! is flipped against the scene height.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        canvas::{Canvas, Painter, Shape},
        Block, Borders, Paragraph, Widget,
    },
};

use crate::config::{ColorParser, Theme};
use crate::render::{self, DrawCommand, Scene};

/// Braille cells hold 2x4 dots.
const DOTS_PER_CELL_X: f64 = 2.0;
const DOTS_PER_CELL_Y: f64 = 4.0;

/// Axis-aligned filled rectangle in scene coordinates.
struct FilledRect {
    rect: render::Rect,
    scene_height: f64,
    step_x: f64,
    step_y: f64,
    color: Color,
}

impl Shape for FilledRect {
    fn draw(&self, painter: &mut Painter) {
        let mut y = self.rect.y;
        while y <= self.rect.bottom() {
            let mut x = self.rect.x;
            while x <= self.rect.x + self.rect.width {
                if let Some((px, py)) = painter.get_point(x, self.scene_height - y) {
                    painter.paint(px, py, self.color);
                }
                x += self.step_x;
            }
            y += self.step_y;
        }
    }
}

/// Pie slice filled by sampling its bounding square.
struct FilledWedge<'a> {
    wedge: &'a render::Wedge,
    scene_height: f64,
    step_x: f64,
    step_y: f64,
    color: Color,
}

impl Shape for FilledWedge<'_> {
    fn draw(&self, painter: &mut Painter) {
        let c = self.wedge.center;
        let r = self.wedge.radius;
        let mut y = c.y - r;
        while y <= c.y + r {
            let mut x = c.x - r;
            while x <= c.x + r {
                if self.wedge.contains(render::Point::new(x, y)) {
                    if let Some((px, py)) = painter.get_point(x, self.scene_height - y) {
                        painter.paint(px, py, self.color);
                    }
                }
                x += self.step_x;
            }
            y += self.step_y;
        }
    }
}

/// Renders a [`Scene`] inside a bordered block.
pub struct SceneCanvas<'a> {
    scene: &'a Scene,
    title: Option<&'a str>,
    border_color: Color,
    /// Overrides the scene's own background.
    background: Option<Color>,
    placeholder: &'a str,
    parser: ColorParser,
}

impl<'a> SceneCanvas<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            title: None,
            border_color: Color::Reset,
            background: None,
            placeholder: "No chart",
            parser: ColorParser::new(),
        }
    }

    pub fn with_title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.border_color = theme.get("modal_border");
        self.background = theme.get_optional("chart_background");
        self
    }

    /// Text shown when the scene has nothing to draw.
    pub fn with_placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for SceneCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color));
        if let Some(title) = self.title {
            block = block.title(format!(" {} ", title));
        }
        let inner = block.inner(area);
        block.render(area, buf);

        let scene = self.scene;
        if scene.is_degenerate() || scene.commands.is_empty() || inner.area() == 0 {
            Paragraph::new(self.placeholder)
                .centered()
                .render(inner, buf);
            return;
        }

        let step_x = scene.width / (inner.width as f64 * DOTS_PER_CELL_X);
        let step_y = scene.height / (inner.height as f64 * DOTS_PER_CELL_Y);
        let background = self
            .background
            .unwrap_or_else(|| self.parser.chart_color(scene.background));
        let parser = &self.parser;

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(background)
            .x_bounds([0.0, scene.width])
            .y_bounds([0.0, scene.height])
            .paint(|ctx| {
                for command in &scene.commands {
                    match command {
                        DrawCommand::Bar { rect, fill, .. } => ctx.draw(&FilledRect {
                            rect: *rect,
                            scene_height: scene.height,
                            step_x,
                            step_y,
                            color: parser.chart_color(*fill),
                        }),
                        DrawCommand::Wedge(wedge) => ctx.draw(&FilledWedge {
                            wedge,
                            scene_height: scene.height,
                            step_x,
                            step_y,
                            color: parser.chart_color(wedge.fill),
                        }),
                        DrawCommand::Text(_) => {}
                    }
                }
                // Text goes on a layer above the shapes
                ctx.layer();
                for text in scene.texts() {
                    ctx.print(
                        text.origin.x,
                        scene.height - text.origin.y,
                        Line::styled(
                            text.text.clone(),
                            Style::default()
                                .fg(parser.chart_color(text.color))
                                .bg(background),
                        ),
                    );
                }
            })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_model::ChartItem;
    use crate::project::{ChartType, TitleAlignment};
    use crate::render::{render_chart, RenderOptions};

    fn scene(chart_type: ChartType) -> Scene {
        let items = vec![
            ChartItem {
                label: "Paris".into(),
                value: 2,
                color: "#ff0000".into(),
                key: "Paris".into(),
            },
            ChartItem {
                label: "Lyon".into(),
                value: 1,
                color: "#0000ff".into(),
                key: "Lyon".into(),
            },
        ];
        render_chart(
            &items,
            &RenderOptions {
                chart_type,
                title: "Cities".into(),
                alignment: TitleAlignment::Center,
                width: 600.0,
                height: 400.0,
            },
        )
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_empty_scene_shows_placeholder() {
        let area = Rect::new(0, 0, 30, 8);
        let mut buf = Buffer::empty(area);
        let blank = Scene::blank(600.0, 400.0);
        SceneCanvas::new(&blank)
            .with_placeholder("Open a CSV file")
            .render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Open a CSV file"));
    }

    #[test]
    fn test_bar_scene_paints_dots_and_text() {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        let bars = scene(ChartType::Bar);
        SceneCanvas::new(&bars).with_title("Preview").render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("Preview"));
        assert!(text.contains("Cities"));
        // Braille patterns live in U+2800..U+28FF
        assert!(text.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
    }

    #[test]
    fn test_pie_scene_paints_dots() {
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        let pie = scene(ChartType::Pie);
        SceneCanvas::new(&pie).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
    }
}
