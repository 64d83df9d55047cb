//! Chart export to PNG (plotters bitmap, supersampled) and EPS (minimal PostScript, Latin-1 text).

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::color::Rgba;
use crate::render::{DrawCommand, Scene, TextCommand, Wedge};

/// Linear scale factor between canvas units and exported PNG pixels.
pub const SUPERSAMPLE: f64 = 3.0;

/// Arc tessellation step for raster output, in degrees.
const ARC_STEP_DEGREES: f64 = 1.0;

/// Baseline position below the top of a text box, as a fraction of font size.
const ASCENT: f64 = 0.8;

/// Export format for chart: PNG or EPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartExportFormat {
    #[default]
    Png,
    Eps,
}

impl ChartExportFormat {
    pub const ALL: [Self; 2] = [Self::Png, Self::Eps];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Eps => "eps",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Eps => "EPS",
        }
    }

    /// Format implied by the file extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Explicit format wins; otherwise the extension decides, defaulting to PNG.
    pub fn resolve(explicit: Option<Self>, path: &Path) -> Self {
        explicit
            .or_else(|| Self::from_path(path))
            .unwrap_or_default()
    }
}

/// Write `scene` to `path`.
///
/// A scene with zero or negative width or height is silently skipped.
pub fn export_scene(scene: &Scene, path: &Path, format: ChartExportFormat) -> Result<()> {
    if scene.is_degenerate() {
        tracing::debug!(path = %path.display(), "skipping export of empty canvas");
        return Ok(());
    }
    match format {
        ChartExportFormat::Png => write_scene_png(scene, path),
        ChartExportFormat::Eps => write_scene_eps(scene, path),
    }
    .wrap_err_with(|| format!("Failed to export chart to {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        format = format.as_str(),
        commands = scene.commands.len(),
        "exported chart"
    );
    Ok(())
}

/// Escape a string for a PostScript literal shown in a Latin-1 font.
///
/// Non-ASCII Latin-1 characters are written as octal escapes; anything
/// beyond Latin-1 becomes `?`.
fn ps_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            c if (c as u32) <= 0xFF => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}

/// Helvetica faces re-encoded to ISO Latin-1, as `(source, name)`.
const EPS_FONTS: [(&str, &str); 2] = [
    ("Helvetica", "Helvetica-Latin1"),
    ("Helvetica-Bold", "Helvetica-Bold-Latin1"),
];

/// Remove a partially written output file after a failed write.
fn discard_partial<T>(path: &Path, result: Result<T>) -> Result<T> {
    if result.is_err() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::debug!(path = %path.display(), error = %e, "could not remove partial export");
        }
    }
    result
}

fn ps_rgb(c: Rgba) -> String {
    format!(
        "{:.4} {:.4} {:.4} setrgbcolor",
        c.r as f64 / 255.0,
        c.g as f64 / 255.0,
        c.b as f64 / 255.0
    )
}

/// Write `scene` as Encapsulated PostScript. PostScript's y axis points up, so
/// every y coordinate is flipped against the scene height.
pub fn write_scene_eps(scene: &Scene, path: &Path) -> Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    let written = write_eps(scene, &mut f);
    drop(f);
    discard_partial(path, written)
}

fn write_eps(scene: &Scene, f: &mut BufWriter<File>) -> Result<()> {
    let w = scene.width;
    let h = scene.height;
    let flip = |y: f64| h - y;

    writeln!(f, "%!PS-Adobe-3.0 EPSF-3.0")?;
    writeln!(
        f,
        "%%BoundingBox: 0 0 {} {}",
        w.ceil() as i32,
        h.ceil() as i32
    )?;
    writeln!(f, "%%Creator: tallyplot")?;
    writeln!(f, "%%EndComments")?;
    for (source, name) in EPS_FONTS {
        writeln!(
            f,
            "/{} findfont dup length dict begin {{1 index /FID ne {{def}} {{pop pop}} ifelse}} forall \
             /Encoding ISOLatin1Encoding def currentdict end /{} exch definefont pop",
            source, name
        )?;
    }
    writeln!(f, "gsave")?;

    writeln!(f, "{}", ps_rgb(scene.background))?;
    writeln!(f, "0 0 {} {} rectfill", w, h)?;

    for command in &scene.commands {
        match command {
            DrawCommand::Bar { rect, fill, .. } => {
                writeln!(f, "{}", ps_rgb(*fill))?;
                writeln!(
                    f,
                    "{} {} {} {} rectfill",
                    rect.x,
                    flip(rect.bottom()),
                    rect.width,
                    rect.height
                )?;
            }
            DrawCommand::Wedge(wedge) => {
                let cx = wedge.center.x;
                let cy = flip(wedge.center.y);
                // Clockwise on screen is clockwise (arcn) with negated angles here.
                writeln!(f, "newpath {} {} moveto", cx, cy)?;
                writeln!(
                    f,
                    "{} {} {} {} {} arcn closepath",
                    cx,
                    cy,
                    wedge.radius,
                    -wedge.start_angle,
                    -(wedge.start_angle + wedge.sweep_angle)
                )?;
                writeln!(f, "gsave {} fill grestore", ps_rgb(wedge.fill))?;
                writeln!(
                    f,
                    "{} {} setlinewidth stroke",
                    ps_rgb(wedge.stroke),
                    wedge.stroke_width
                )?;
            }
            DrawCommand::Text(text) => {
                let (_, font) = if text.bold {
                    EPS_FONTS[1]
                } else {
                    EPS_FONTS[0]
                };
                writeln!(f, "/{} findfont {} scalefont setfont", font, text.size)?;
                writeln!(f, "{}", ps_rgb(text.color))?;
                writeln!(
                    f,
                    "{} {} moveto ({}) show",
                    text.origin.x,
                    flip(text.origin.y + text.size * ASCENT),
                    ps_escape(&text.text)
                )?;
            }
        }
    }

    writeln!(f, "grestore")?;
    writeln!(f, "%%EOF")?;
    f.flush()?;
    f.get_ref().sync_all()?;
    Ok(())
}

/// Write `scene` to PNG at [`SUPERSAMPLE`] times its size using the plotters bitmap backend.
///
/// Text that cannot be drawn (e.g. no usable system font) is logged and left out.
pub fn write_scene_png(scene: &Scene, path: &Path) -> Result<()> {
    // Surface unwritable paths as plain I/O errors before rendering.
    File::create(path)?;
    discard_partial(path, draw_png(scene, path))
}

fn draw_png(scene: &Scene, path: &Path) -> Result<()> {
    use plotters::prelude::*;

    let px = |v: f64| (v * SUPERSAMPLE).round() as i32;
    let size = (
        (scene.width * SUPERSAMPLE).round() as u32,
        (scene.height * SUPERSAMPLE).round() as u32,
    );
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&rgb(scene.background))?;

    for command in &scene.commands {
        match command {
            DrawCommand::Bar { rect, fill, .. } => {
                if rect.height <= 0.0 {
                    continue;
                }
                root.draw(&Rectangle::new(
                    [(px(rect.x), px(rect.y)), (px(rect.x + rect.width), px(rect.bottom()))],
                    rgb(*fill).filled(),
                ))?;
            }
            DrawCommand::Wedge(wedge) => draw_wedge(&root, wedge, &px)?,
            DrawCommand::Text(text) => {
                if let Err(e) = draw_text(&root, text, &px) {
                    tracing::warn!(text = %text.text, error = %e, "could not draw chart text");
                }
            }
        }
    }

    root.present()?;
    Ok(())
}

fn rgb(c: Rgba) -> plotters::style::RGBAColor {
    plotters::style::RGBAColor(c.r, c.g, c.b, c.opacity())
}

fn draw_wedge<DB: plotters::prelude::DrawingBackend>(
    root: &plotters::prelude::DrawingArea<DB, plotters::coord::Shift>,
    wedge: &Wedge,
    px: &dyn Fn(f64) -> i32,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    use plotters::prelude::*;

    let outline: Vec<(i32, i32)> = wedge
        .outline(ARC_STEP_DEGREES)
        .into_iter()
        .map(|p| (px(p.x), px(p.y)))
        .collect();
    root.draw(&Polygon::new(outline.clone(), rgb(wedge.fill).filled()))?;

    let mut border = outline;
    if let Some(&first) = border.first() {
        border.push(first);
    }
    let stroke = rgb(wedge.stroke).stroke_width(px(wedge.stroke_width).max(1) as u32);
    root.draw(&PathElement::new(border, stroke))?;
    Ok(())
}

fn draw_text<DB: plotters::prelude::DrawingBackend>(
    root: &plotters::prelude::DrawingArea<DB, plotters::coord::Shift>,
    text: &TextCommand,
    px: &dyn Fn(f64) -> i32,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    use plotters::prelude::*;
    use plotters::style::text_anchor::{HPos, Pos, VPos};

    let mut font = ("sans-serif", text.size * SUPERSAMPLE).into_font();
    if text.bold {
        font = font.style(FontStyle::Bold);
    }
    let color = rgb(text.color);
    let style = TextStyle::from(font)
        .color(&color)
        .pos(Pos::new(HPos::Left, VPos::Top));
    root.draw(&Text::new(
        text.text.clone(),
        (px(text.origin.x), px(text.origin.y)),
        style,
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_model::ChartItem;
    use color_eyre::eyre::eyre;
    use crate::project::{ChartType, TitleAlignment};
    use crate::render::{render_chart, RenderOptions};
    use std::io::Read;

    fn scene(chart_type: ChartType) -> Scene {
        let items = vec![
            ChartItem {
                label: "Paris".into(),
                value: 2,
                color: "#336699".into(),
                key: "Paris".into(),
            },
            ChartItem {
                label: "Lyon (Rhône)".into(),
                value: 1,
                color: "bogus".into(),
                key: "Lyon".into(),
            },
        ];
        render_chart(
            &items,
            &RenderOptions {
                chart_type,
                title: "Cities".into(),
                alignment: TitleAlignment::Left,
                width: 300.0,
                height: 200.0,
            },
        )
    }

    fn png_dimensions(path: &Path) -> (u32, u32) {
        let mut bytes = Vec::new();
        File::open(path).unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let w = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        let h = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
        (w, h)
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ChartExportFormat::from_path(Path::new("a/chart.EPS")),
            Some(ChartExportFormat::Eps)
        );
        assert_eq!(ChartExportFormat::from_path(Path::new("chart")), None);
        assert_eq!(
            ChartExportFormat::resolve(None, Path::new("chart.txt")),
            ChartExportFormat::Png
        );
        assert_eq!(
            ChartExportFormat::resolve(Some(ChartExportFormat::Eps), Path::new("chart.png")),
            ChartExportFormat::Eps
        );
    }

    #[test]
    fn test_png_is_supersampled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        export_scene(&scene(ChartType::Pie), &path, ChartExportFormat::Png).unwrap();
        assert_eq!(png_dimensions(&path), (900, 600));
    }

    #[test]
    fn test_degenerate_canvas_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        export_scene(&Scene::blank(0.0, 100.0), &path, ChartExportFormat::Png).unwrap();
        export_scene(&Scene::blank(100.0, -1.0), &path, ChartExportFormat::Eps).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.png");
        assert!(export_scene(&scene(ChartType::Bar), &path, ChartExportFormat::Png).is_err());
        assert!(export_scene(&scene(ChartType::Bar), &path, ChartExportFormat::Eps).is_err());
    }

    #[test]
    fn test_eps_contains_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.eps");
        export_scene(&scene(ChartType::Bar), &path, ChartExportFormat::Eps).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.starts_with("%!PS-Adobe-3.0 EPSF-3.0"));
        assert!(content.contains("%%BoundingBox: 0 0 300 200"));
        assert!(content.contains("%%Creator: tallyplot"));
        assert_eq!(content.matches("rectfill").count(), 3, "background and two bars");
        assert!(content.contains("/Helvetica-Bold-Latin1 findfont 24 scalefont setfont"));
        assert!(content.contains("/Encoding ISOLatin1Encoding def"));
        assert!(content.contains("(Cities) show"));
        assert!(content.contains("(Lyon \\(Rh\\364ne\\)) show"));
        assert!(content.is_ascii());
        // Unparsable color falls back to gray.
        assert!(content.contains("0.5020 0.5020 0.5020 setrgbcolor"));
        assert!(content.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_ps_escape() {
        assert_eq!(ps_escape("a(b)\\c"), "a\\(b\\)\\\\c");
        assert_eq!(ps_escape("Rhône"), "Rh\\364ne");
        assert_eq!(ps_escape("Ä 東京"), "\\304 ??");
    }

    #[test]
    fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        std::fs::write(&path, b"").unwrap();

        let failed: Result<()> = Err(eyre!("backend failed"));
        assert!(discard_partial(&path, failed).is_err());
        assert!(!path.exists());

        std::fs::write(&path, b"done").unwrap();
        discard_partial(&path, Ok(())).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_eps_pie_uses_clockwise_arcs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pie.eps");
        export_scene(&scene(ChartType::Pie), &path, ChartExportFormat::Eps).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches(" arcn closepath").count(), 2);
        // The first slice starts at 12 o'clock.
        assert!(content.contains(" 90 -"));
        assert!(content.contains("2 setlinewidth stroke"));
    }
}
