//! Chart layout: turns chart items into a device-independent [`Scene`].
//!
//! Coordinates are in canvas units with the origin at the top-left corner and
//! y growing downwards. Angles are in degrees, 0° pointing right and growing
//! clockwise on screen, so a pie starting at -90° starts at 12 o'clock.
//!
//! The scene is consumed by the terminal preview (`widgets::chart`) and by the
//! file exporters (`chart_export`).

use crate::chart_model::ChartItem;
use crate::color::{fill_color, Rgba};
use crate::project::{ChartSettings, ChartType, TitleAlignment};

pub const TITLE_FONT_SIZE: f64 = 24.0;
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const BAR_LABEL_FONT_SIZE: f64 = 11.0;
pub const PIE_LABEL_FONT_SIZE: f64 = 10.0;

const TITLE_MARGIN: f64 = 10.0;
/// Content inset when there is no title.
const EMPTY_TITLE_BAND: f64 = 10.0;
const BAR_TOP_MARGIN: f64 = 30.0;
const BAR_BOTTOM_MARGIN: f64 = 30.0;
const BAR_SIDE_PADDING: f64 = 10.0;
const BAR_GAP_RATIO: f64 = 0.2;
const BAR_VALUE_OFFSET: f64 = 15.0;
const BAR_LABEL_OFFSET: f64 = 5.0;
const PIE_RADIUS_RATIO: f64 = 0.85;
const PIE_LABEL_RADIUS_RATIO: f64 = 0.65;
const PIE_LABEL_LIFT: f64 = 5.0;
/// Slices narrower than this are not drawn at all.
pub const PIE_MIN_SWEEP: f64 = 0.1;
/// Slices at least this wide get a value label.
pub const PIE_LABEL_MIN_SWEEP: f64 = 15.0;
pub const WEDGE_STROKE_WIDTH: f64 = 2.0;

/// Glyph width as a fraction of the font size.
const AVG_CHAR_WIDTH: f64 = 0.55;
const BOLD_CHAR_WIDTH: f64 = 0.6;
const LINE_HEIGHT: f64 = 1.33;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from `self` in direction `degrees`.
    pub fn polar(self, radius: f64, degrees: f64) -> Self {
        let rad = degrees.to_radians();
        Self::new(self.x + radius * rad.cos(), self.y + radius * rad.sin())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A filled pie slice: center, straight edge to `start`, clockwise arc to `end`, back to center.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep_angle: f64,
    pub start: Point,
    pub end: Point,
    pub large_arc: bool,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f64,
    /// Category key of the item this slice shows.
    pub key: String,
}

impl Wedge {
    /// Closed outline approximating the arc with at most one segment per `step` degrees.
    pub fn outline(&self, step: f64) -> Vec<Point> {
        let step = if step > 0.0 { step } else { 1.0 };
        let segments = (self.sweep_angle / step).ceil().max(1.0) as usize;
        let mut points = Vec::with_capacity(segments + 2);
        points.push(self.center);
        for i in 0..=segments {
            let angle = self.start_angle + self.sweep_angle * i as f64 / segments as f64;
            points.push(self.center.polar(self.radius, angle));
        }
        points
    }

    /// Whether `p` lies inside the slice (screen orientation, angles grow clockwise).
    pub fn contains(&self, p: Point) -> bool {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        if dx * dx + dy * dy > self.radius * self.radius {
            return false;
        }
        if self.sweep_angle >= 360.0 {
            return true;
        }
        let angle = dy.atan2(dx).to_degrees();
        (angle - self.start_angle).rem_euclid(360.0) <= self.sweep_angle
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub text: String,
    /// Top-left corner of the text box.
    pub origin: Point,
    pub width: f64,
    pub size: f64,
    pub bold: bool,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Bar {
        rect: Rect,
        fill: Rgba,
        key: String,
    },
    Wedge(Wedge),
    Text(TextCommand),
}

/// Everything needed to paint one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub background: Rgba,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn blank(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: Rgba::WHITE,
            commands: Vec::new(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn bars(&self) -> impl Iterator<Item = (&Rect, &Rgba, &str)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Bar { rect, fill, key } => Some((rect, fill, key.as_str())),
            _ => None,
        })
    }

    pub fn wedges(&self) -> impl Iterator<Item = &Wedge> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Wedge(w) => Some(w),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextCommand> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text(t) => Some(t),
            _ => None,
        })
    }
}

/// Text measurement used for centering and title placement.
pub trait TextMetrics {
    fn text_width(&self, text: &str, size: f64, bold: bool) -> f64;

    fn line_height(&self, size: f64) -> f64 {
        size * LINE_HEIGHT
    }
}

/// Fixed average glyph width. Good enough for proportional sans-serif fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMetrics;

impl TextMetrics for ApproxTextMetrics {
    fn text_width(&self, text: &str, size: f64, bold: bool) -> f64 {
        let per_char = if bold { BOLD_CHAR_WIDTH } else { AVG_CHAR_WIDTH };
        text.chars().count() as f64 * size * per_char
    }
}

/// Inputs of the layout besides the items themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub chart_type: ChartType,
    pub title: String,
    pub alignment: TitleAlignment,
    pub width: f64,
    pub height: f64,
}

impl From<&ChartSettings> for RenderOptions {
    fn from(settings: &ChartSettings) -> Self {
        Self {
            chart_type: settings.chart_type,
            title: settings.chart_title.clone(),
            alignment: settings.title_alignment,
            width: settings.width as f64,
            height: settings.height as f64,
        }
    }
}

/// Lay out `items` with the default text metrics.
pub fn render_chart(items: &[ChartItem], options: &RenderOptions) -> Scene {
    render_chart_with(items, options, &ApproxTextMetrics)
}

/// Lay out `items` on a white canvas of `options.width` x `options.height`.
///
/// No items, or a degenerate canvas, produce a blank scene.
pub fn render_chart_with(
    items: &[ChartItem],
    options: &RenderOptions,
    metrics: &dyn TextMetrics,
) -> Scene {
    let mut painter = Painter {
        scene: Scene::blank(options.width, options.height),
        metrics,
        offset_y: 0.0,
    };
    if items.is_empty() || painter.scene.is_degenerate() {
        return painter.scene;
    }

    let band = painter.title(&options.title, options.alignment);
    painter.offset_y = band;
    let available_height = options.height - band;
    match options.chart_type {
        ChartType::Bar => painter.bars(items, options.width, available_height),
        ChartType::Pie => painter.pie(items, options.width, available_height),
    }
    painter.scene
}

struct Painter<'a> {
    scene: Scene,
    metrics: &'a dyn TextMetrics,
    /// Vertical translation applied to everything below the title.
    offset_y: f64,
}

impl Painter<'_> {
    /// Draw the title and return the height of the band it occupies.
    fn title(&mut self, title: &str, alignment: TitleAlignment) -> f64 {
        if title.is_empty() {
            return EMPTY_TITLE_BAND;
        }
        let width = self.metrics.text_width(title, TITLE_FONT_SIZE, true);
        let height = self.metrics.line_height(TITLE_FONT_SIZE);
        let x = match alignment {
            TitleAlignment::Left => TITLE_MARGIN,
            TitleAlignment::Center => (self.scene.width - width) / 2.0,
            TitleAlignment::Right => self.scene.width - width - TITLE_MARGIN,
        };
        self.scene.commands.push(DrawCommand::Text(TextCommand {
            text: title.to_string(),
            origin: Point::new(x, TITLE_MARGIN),
            width,
            size: TITLE_FONT_SIZE,
            bold: true,
            color: Rgba::BLACK,
        }));
        height + 2.0 * TITLE_MARGIN
    }

    /// Draw `text` horizontally centered on `center_x`, top edge at `top`.
    fn centered_text(&mut self, text: &str, center_x: f64, top: f64, size: f64) {
        if text.is_empty() {
            return;
        }
        let width = self.metrics.text_width(text, size, false);
        self.scene.commands.push(DrawCommand::Text(TextCommand {
            text: text.to_string(),
            origin: Point::new(center_x - width / 2.0, top + self.offset_y),
            width,
            size,
            bold: false,
            color: Rgba::BLACK,
        }));
    }

    fn bars(&mut self, items: &[ChartItem], width: f64, height: f64) {
        let plot_height = height - BAR_TOP_MARGIN - BAR_BOTTOM_MARGIN;
        if plot_height <= 0.0 {
            return;
        }
        let max = items.iter().map(|i| i.value).max().unwrap_or(0);
        let max = if max == 0 { 1.0 } else { max as f64 };

        let bar_width = (width - 2.0 * BAR_SIDE_PADDING) / items.len() as f64;
        let gap = bar_width * BAR_GAP_RATIO;
        let baseline = height - BAR_BOTTOM_MARGIN;

        for (i, item) in items.iter().enumerate() {
            let bar_height = item.value as f64 / max * plot_height;
            let rect = Rect {
                x: BAR_SIDE_PADDING + i as f64 * bar_width + gap / 2.0,
                y: baseline - bar_height + self.offset_y,
                width: (bar_width - gap).max(1.0),
                height: bar_height.max(0.0),
            };
            self.scene.commands.push(DrawCommand::Bar {
                rect,
                fill: fill_color(&item.color),
                key: item.key.clone(),
            });
            let center_x = rect.center_x();
            let value_top = rect.y - self.offset_y - BAR_VALUE_OFFSET;
            self.centered_text(&item.value.to_string(), center_x, value_top, DEFAULT_FONT_SIZE);
            self.centered_text(
                &item.label,
                center_x,
                baseline + BAR_LABEL_OFFSET,
                BAR_LABEL_FONT_SIZE,
            );
        }
    }

    fn pie(&mut self, items: &[ChartItem], width: f64, height: f64) {
        let total: u64 = items.iter().map(|i| i.value).sum();
        if total == 0 {
            return;
        }
        let radius = width.min(height) / 2.0 * PIE_RADIUS_RATIO;
        if radius <= 0.0 {
            return;
        }
        let center = Point::new(width / 2.0, height / 2.0 + self.offset_y);

        let mut start_angle = -90.0;
        for item in items {
            let sweep = item.value as f64 / total as f64 * 360.0;
            if sweep < PIE_MIN_SWEEP {
                continue;
            }
            self.scene.commands.push(DrawCommand::Wedge(Wedge {
                center,
                radius,
                start_angle,
                sweep_angle: sweep,
                start: center.polar(radius, start_angle),
                end: center.polar(radius, start_angle + sweep),
                large_arc: sweep > 180.0,
                fill: fill_color(&item.color),
                stroke: Rgba::WHITE,
                stroke_width: WEDGE_STROKE_WIDTH,
                key: item.key.clone(),
            }));

            if sweep > PIE_LABEL_MIN_SWEEP {
                let anchor = center.polar(radius * PIE_LABEL_RADIUS_RATIO, start_angle + sweep / 2.0);
                self.centered_text(
                    &item.value.to_string(),
                    anchor.x,
                    anchor.y - self.offset_y - PIE_LABEL_LIFT,
                    PIE_LABEL_FONT_SIZE,
                );
            }
            start_angle += sweep;
        }
    }
}
