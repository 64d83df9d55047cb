use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, ListState, Paragraph, StatefulWidget};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

pub mod aggregate;
pub mod chart_export;
pub mod chart_model;
pub mod color;
pub mod config;
pub mod dataset;
pub mod error_display;
pub mod labels;
pub mod logging;
pub mod project;
pub mod prompt_modal;
pub mod render;
pub mod settings_modal;
pub mod statistics;
pub mod widgets;

pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use tallyplot_cli::{Args, InputKind};

use chart_export::{export_scene, ChartExportFormat};
use chart_model::{ChartItem, ChartView};
use error_display::user_message;
use labels::ColorGenerator;
use project::{ChartSettings, Project};
use prompt_modal::{PromptModal, PromptOutcome, PromptPurpose, PromptSubmission};
use render::{render_chart, RenderOptions, Scene};
use settings_modal::{SettingsModal, SettingsOutcome};
use widgets::chart::SceneCanvas;
use widgets::controls::Controls;
use widgets::legend::{Legend, LEGEND_WIDTH};
use widgets::prompt::{prompt_height, render_prompt_modal, PROMPT_WIDTH};
use widgets::settings::{render_settings_modal, SETTINGS_HEIGHT, SETTINGS_WIDTH};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "tallyplot";

const DEFAULT_PROJECT_FILE: &str = "project.json";
const DEFAULT_EXPORT_FILE: &str = "chart.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    LoadCsv(PathBuf),
    LoadProject(PathBuf),
    SaveProject(PathBuf),
    ExportChart(PathBuf, Option<ChartExportFormat>),
    NewProject,
    SelectColumn(Option<String>),
    ApplySettings(ChartSettings),
    EditLabel(String, String), // Item key, display name
    EditColor(String, String), // Item key, color
    RemoveItem(String),        // Item key
    ResetLabels,
    Exit,
    Resize(u16, u16), // resized (width, height)
}

/// Action waiting for a yes/no answer because the project has unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Quit,
    NewProject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    events: Sender<AppEvent>,
    config: AppConfig,
    theme: Theme,
    project: Project,
    /// Where the project was last loaded from or saved to.
    project_path: Option<PathBuf>,
    last_export: Option<PathBuf>,
    colors: ColorGenerator,
    view: ChartView,
    scene: Scene,
    legend_state: ListState,
    status: Option<StatusMessage>,
    pending: Option<PendingAction>,
    pub prompt: PromptModal,
    pub settings_modal: SettingsModal,
}

impl App {
    pub fn new(events: Sender<AppEvent>, config: AppConfig) -> App {
        let theme = Theme::from_config(&config.theme).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "invalid theme, using terminal defaults");
            Theme::default()
        });
        let project = Project::new_with_settings(config.chart.to_settings());
        let scene = render_chart(&[], &RenderOptions::from(&project.chart_settings));

        App {
            events,
            config,
            theme,
            project,
            project_path: None,
            last_export: None,
            colors: ColorGenerator::new(),
            view: ChartView::default(),
            scene,
            legend_state: ListState::default(),
            status: None,
            pending: None,
            prompt: PromptModal::new(),
            settings_modal: SettingsModal::new(),
        }
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn view(&self) -> &ChartView {
        &self.view
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn pending_action(&self) -> Option<PendingAction> {
        self.pending
    }

    /// Chart item highlighted in the legend.
    pub fn selected_item(&self) -> Option<&ChartItem> {
        self.legend_state
            .selected()
            .and_then(|i| self.view.items.get(i))
    }

    pub fn select_item(&mut self, index: Option<usize>) {
        let index = index.filter(|&i| i < self.view.items.len());
        self.legend_state.select(index);
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, prefix: &str, report: &color_eyre::eyre::Report) {
        tracing::warn!(error = ?report, "{}", prefix);
        self.status = Some(StatusMessage {
            text: format!("{}: {}", prefix, user_message(report)),
            is_error: true,
        });
    }

    fn color(&self, name: &str) -> ratatui::style::Color {
        self.theme.get(name)
    }

    /// Rebuild the chart from the project and refresh the preview scene.
    fn recompute(&mut self) {
        self.view = self.project.recompute_chart(&mut self.colors);
        self.refresh_scene();
        if self.view.is_empty() {
            self.legend_state.select(None);
        } else {
            let selected = self.legend_state.selected().unwrap_or(0);
            self.legend_state
                .select(Some(selected.min(self.view.items.len() - 1)));
            self.set_status(self.view.summary.status_text());
        }
    }

    fn refresh_scene(&mut self) {
        self.scene = render_chart(
            &self.view.items,
            &RenderOptions::from(&self.project.chart_settings),
        );
    }

    fn load_csv(&mut self, path: &Path) -> Result<usize> {
        let rows = dataset::load_csv(path)?;
        let count = rows.len();
        if !self.project.replace_dataset(path.to_path_buf(), rows) {
            return Err(eyre!("{} contains no data rows", path.display()));
        }
        Ok(count)
    }

    fn load_project(&mut self, path: &Path) -> Result<()> {
        let project = project::load(path)?;
        self.project = project;
        self.project_path = Some(path.to_path_buf());
        Ok(())
    }

    fn save_project(&mut self, path: &Path) -> Result<()> {
        project::save(&mut self.project, path)?;
        self.project_path = Some(path.to_path_buf());
        Ok(())
    }

    fn export_chart(&mut self, path: &Path, format: Option<ChartExportFormat>) -> Result<()> {
        let format = ChartExportFormat::resolve(format, path);
        export_scene(&self.scene, path, format)?;
        self.last_export = Some(path.to_path_buf());
        Ok(())
    }

    fn new_project(&mut self) {
        self.project = Project::new_with_settings(self.config.chart.to_settings());
        self.project_path = None;
        self.view = ChartView::default();
        self.refresh_scene();
        self.legend_state.select(None);
        self.set_status("New project created");
    }

    fn settings_with(&self, change: impl FnOnce(&mut ChartSettings)) -> ChartSettings {
        let mut settings = self.project.chart_settings.clone();
        change(&mut settings);
        settings
    }

    /// Column next to the selected one, wrapping around.
    fn neighbour_column(&self, forward: bool) -> Option<String> {
        let columns = self.project.available_columns();
        if columns.is_empty() {
            return None;
        }
        let len = columns.len();
        let current = self
            .project
            .chart_settings
            .selected_column()
            .and_then(|c| columns.iter().position(|col| col == c));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        columns.into_iter().nth(next)
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.view.items.len();
        if len == 0 {
            return;
        }
        let current = self.legend_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.legend_state.select(Some(next));
    }

    fn path_text(path: Option<&Path>, fallback: &str) -> String {
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| fallback.to_string())
    }

    fn open_prompt(&mut self, purpose: PromptPurpose) {
        let initial = match purpose {
            PromptPurpose::OpenCsv => {
                Self::path_text(self.project.csv_file_path.as_deref(), "")
            }
            PromptPurpose::OpenProject => Self::path_text(self.project_path.as_deref(), ""),
            PromptPurpose::SaveProject => {
                Self::path_text(self.project_path.as_deref(), DEFAULT_PROJECT_FILE)
            }
            PromptPurpose::ExportChart => {
                Self::path_text(self.last_export.as_deref(), DEFAULT_EXPORT_FILE)
            }
            PromptPurpose::EditLabel | PromptPurpose::EditColor => {
                let Some(item) = self.selected_item().cloned() else {
                    self.set_status("Select a chart item first");
                    return;
                };
                let initial = if purpose == PromptPurpose::EditLabel {
                    item.label
                } else {
                    item.color
                };
                self.prompt
                    .open_for_item(purpose, &item.key, &initial, &self.theme);
                return;
            }
        };
        self.prompt.open(purpose, &initial, &self.theme);
    }

    fn submission_event(submission: PromptSubmission) -> Option<AppEvent> {
        let PromptSubmission {
            purpose,
            value,
            key,
            format,
        } = submission;
        match purpose {
            PromptPurpose::OpenCsv => Some(AppEvent::LoadCsv(PathBuf::from(value))),
            PromptPurpose::OpenProject => Some(AppEvent::LoadProject(PathBuf::from(value))),
            PromptPurpose::SaveProject => Some(AppEvent::SaveProject(PathBuf::from(value))),
            PromptPurpose::ExportChart => Some(AppEvent::ExportChart(PathBuf::from(value), format)),
            PromptPurpose::EditLabel => key.map(|key| AppEvent::EditLabel(key, value)),
            PromptPurpose::EditColor => key.map(|key| AppEvent::EditColor(key, value)),
        }
    }

    fn request(&mut self, action: PendingAction) -> Option<AppEvent> {
        if self.project.is_dirty() {
            self.pending = Some(action);
            return None;
        }
        self.perform(action)
    }

    fn perform(&mut self, action: PendingAction) -> Option<AppEvent> {
        match action {
            PendingAction::Quit => Some(AppEvent::Exit),
            PendingAction::NewProject => Some(AppEvent::NewProject),
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if let Some(action) = self.pending {
            match event.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.pending = None;
                    if let Some(next) = self.perform(action) {
                        if let Err(e) = self.send_event(next) {
                            tracing::error!(error = %e, "event channel closed");
                        }
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.pending = None;
                }
                _ => {}
            }
            return None;
        }

        if self.prompt.active {
            return match self.prompt.handle_key(event)? {
                PromptOutcome::Submit(submission) => Self::submission_event(submission),
                PromptOutcome::Cancel => None,
            };
        }

        if self.settings_modal.active {
            return match self.settings_modal.handle_key(event)? {
                SettingsOutcome::Apply(settings) => Some(AppEvent::ApplySettings(settings)),
                SettingsOutcome::Cancel => None,
            };
        }

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return self.request(PendingAction::Quit);
        }

        match event.code {
            KeyCode::Char('q') => self.request(PendingAction::Quit),
            KeyCode::Char('n') => self.request(PendingAction::NewProject),
            KeyCode::Char('o') => {
                self.open_prompt(PromptPurpose::OpenCsv);
                None
            }
            KeyCode::Char('p') => {
                self.open_prompt(PromptPurpose::OpenProject);
                None
            }
            KeyCode::Char('s') => {
                self.open_prompt(PromptPurpose::SaveProject);
                None
            }
            KeyCode::Char('e') => {
                self.open_prompt(PromptPurpose::ExportChart);
                None
            }
            KeyCode::Char('l') => {
                self.open_prompt(PromptPurpose::EditLabel);
                None
            }
            KeyCode::Char('C') => {
                self.open_prompt(PromptPurpose::EditColor);
                None
            }
            KeyCode::Char('c') => {
                let columns = self.project.available_columns();
                self.settings_modal
                    .open(&self.project.chart_settings, columns, &self.theme);
                None
            }
            KeyCode::Char('t') => Some(AppEvent::ApplySettings(
                self.settings_with(|s| s.chart_type = s.chart_type.toggled()),
            )),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(AppEvent::ApplySettings(
                self.settings_with(|s| s.top_n = s.top_n.max(0).saturating_add(1)),
            )),
            KeyCode::Char('-') => Some(AppEvent::ApplySettings(
                self.settings_with(|s| s.top_n = (s.top_n - 1).max(0)),
            )),
            KeyCode::Left | KeyCode::Char('[') => self
                .neighbour_column(false)
                .map(|c| AppEvent::SelectColumn(Some(c))),
            KeyCode::Right | KeyCode::Char(']') => self
                .neighbour_column(true)
                .map(|c| AppEvent::SelectColumn(Some(c))),
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                None
            }
            KeyCode::Home => {
                self.move_selection(isize::MIN / 2);
                None
            }
            KeyCode::End => {
                self.move_selection(isize::MAX / 2);
                None
            }
            KeyCode::Char('x') | KeyCode::Delete => self
                .selected_item()
                .map(|item| AppEvent::RemoveItem(item.key.clone())),
            KeyCode::Char('R') => Some(AppEvent::ResetLabels),
            _ => None,
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::LoadCsv(path) => {
                match self.load_csv(path) {
                    Ok(count) => {
                        self.recompute();
                        self.set_status(format!("Loaded CSV: {} rows.", count));
                    }
                    Err(e) => self.set_error("CSV error", &e),
                }
                None
            }
            AppEvent::LoadProject(path) => {
                match self.load_project(path) {
                    Ok(()) => {
                        self.recompute();
                        self.set_status("Project loaded");
                    }
                    Err(e) => self.set_error("Load error", &e),
                }
                None
            }
            AppEvent::SaveProject(path) => {
                match self.save_project(path) {
                    Ok(()) => self.set_status("Project saved"),
                    Err(e) => self.set_error("Save error", &e),
                }
                None
            }
            AppEvent::ExportChart(path, format) => {
                match self.export_chart(path, *format) {
                    Ok(()) => self.set_status(format!("Export complete: {}", path.display())),
                    Err(e) => self.set_error("Export error", &e),
                }
                None
            }
            AppEvent::NewProject => {
                self.new_project();
                None
            }
            AppEvent::SelectColumn(column) => {
                if self.project.select_column(column.clone()) {
                    self.legend_state.select(None);
                    self.recompute();
                }
                None
            }
            AppEvent::ApplySettings(settings) => {
                self.project.apply_settings(settings.clone());
                self.recompute();
                None
            }
            AppEvent::EditLabel(key, display_name) => {
                self.project.update_label(key, Some(display_name), None);
                self.recompute();
                None
            }
            AppEvent::EditColor(key, color) => {
                self.project.update_label(key, None, Some(color));
                self.recompute();
                None
            }
            AppEvent::RemoveItem(key) => {
                let before = self.view.items.len();
                self.view.items.retain(|item| &item.key != key);
                if self.view.items.len() != before {
                    self.project.mark_dirty();
                    self.refresh_scene();
                    let last = self.view.items.len().saturating_sub(1);
                    let selected = self.legend_state.selected().map(|i| i.min(last));
                    self.select_item(selected);
                }
                None
            }
            AppEvent::ResetLabels => {
                self.project.reset_labels();
                self.recompute();
                self.set_status("Display settings reset");
                None
            }
            AppEvent::Resize(_cols, _rows) => None,
            AppEvent::Exit => None,
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let settings = &self.project.chart_settings;
        let name = format!(
            " {}{} ",
            self.project.display_name(),
            if self.project.is_dirty() { "*" } else { "" }
        );
        let details = format!(
            "{} | {} | top {} ",
            settings.selected_column().unwrap_or("no column"),
            settings.chart_type,
            if settings.top_n > 0 {
                settings.top_n.to_string()
            } else {
                "all".to_string()
            }
        );
        let style = Style::default()
            .fg(self.color("text_inverse"))
            .bg(self.color("primary"));
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(details.chars().count() as u16),
            ])
            .split(area);
        Paragraph::new(Line::from(Span::styled(
            name,
            style.add_modifier(Modifier::BOLD),
        )))
        .style(style)
        .render(chunks[0], buf);
        Paragraph::new(details)
            .style(style)
            .right_aligned()
            .render(chunks[1], buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let Some(status) = &self.status else {
            return;
        };
        let color = if status.is_error {
            self.color("error")
        } else {
            self.color("success")
        };
        Paragraph::new(status.text.as_str())
            .style(Style::default().fg(color))
            .render(area, buf);
    }

    fn render_confirm(&self, area: Rect, buf: &mut Buffer) {
        let Some(action) = self.pending else {
            return;
        };
        let question = match action {
            PendingAction::Quit => "Quit without saving? (y/n)",
            PendingAction::NewProject => "Discard changes and start a new project? (y/n)",
        };
        let width = (question.chars().count() as u16 + 4).min(area.width);
        let popup = centered_rect(area, width, 5);
        Clear.render(popup, buf);
        Paragraph::new(question)
            .centered()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.color("warning")))
                    .title(" Unsaved changes "),
            )
            .render(popup, buf);
    }
}

/// Rect of at most `width` x `height` centered in `area`.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Fill(1),   // Legend + chart
                Constraint::Length(1), // Status
                Constraint::Length(1), // Controls
            ])
            .split(area);

        self.render_header(layout[0], buf);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LEGEND_WIDTH), Constraint::Fill(1)])
            .split(layout[1]);

        let summary = (!self.view.is_empty()).then_some(&self.view.summary);
        let legend_focused = !(self.prompt.active || self.settings_modal.active);
        Legend::new(&self.view.items)
            .with_column(self.project.chart_settings.selected_column())
            .with_summary(summary)
            .with_focused(legend_focused)
            .with_theme(&self.theme)
            .render(main[0], buf, &mut self.legend_state);

        let placeholder = if self.project.is_empty() {
            "Press o to open a CSV file"
        } else {
            "Nothing to chart"
        };
        SceneCanvas::new(&self.scene)
            .with_title(&self.project.chart_settings.chart_title)
            .with_placeholder(placeholder)
            .with_theme(&self.theme)
            .render(main[1], buf);

        self.render_status(layout[2], buf);

        Controls::new()
            .with_item_count(self.view.items.len())
            .with_dimmed(self.prompt.active || self.settings_modal.active || self.pending.is_some())
            .with_colors(self.color("controls_bg"), self.color("text_primary"))
            .render(layout[3], buf);

        if self.settings_modal.active {
            let popup = centered_rect(area, SETTINGS_WIDTH, SETTINGS_HEIGHT);
            render_settings_modal(popup, buf, &mut self.settings_modal, &self.theme);
        }
        if self.prompt.active {
            let popup = centered_rect(area, PROMPT_WIDTH, prompt_height(self.prompt.purpose));
            let border = self.theme.get("modal_border");
            let active = self.theme.get("modal_border_active");
            render_prompt_modal(popup, buf, &mut self.prompt, border, active);
        }
        self.render_confirm(area, buf);
    }
}

/// Result of a run without the terminal interface.
#[derive(Debug)]
pub struct HeadlessOutcome {
    pub project: Project,
    pub view: ChartView,
    pub exported: Option<PathBuf>,
    pub saved: Option<PathBuf>,
}

/// Command-line overrides for a project opened from file.
fn apply_args_to_settings(settings: &mut ChartSettings, args: &Args) {
    if let Some(chart) = args.chart {
        settings.chart_type = chart.into();
    }
    if let Some(top_n) = args.top_n {
        settings.top_n = top_n;
    }
    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(height) = args.height {
        settings.height = height;
    }
    if let Some(title) = &args.title {
        settings.chart_title = title.clone();
    }
    if let Some(align) = args.align {
        settings.title_alignment = align.into();
    }
}

/// Load the input, chart it and write the requested outputs.
///
/// `config.chart` is expected to already carry the command-line overrides.
pub fn run_headless(args: &Args, config: &AppConfig) -> Result<HeadlessOutcome> {
    let path = args
        .path
        .as_deref()
        .ok_or_else(|| eyre!("An input file is required with --export or --save-project"))?;

    let mut project = match InputKind::from_path(path) {
        InputKind::Csv => {
            let mut project = Project::new_with_settings(config.chart.to_settings());
            let rows = dataset::load_csv(path)?;
            if !project.replace_dataset(path.to_path_buf(), rows) {
                return Err(eyre!("{} contains no data rows", path.display()));
            }
            project
        }
        InputKind::Project => {
            let mut project = project::load(path)?;
            apply_args_to_settings(&mut project.chart_settings, args);
            project
        }
    };

    if let Some(column) = &args.column {
        let columns = project.available_columns();
        if !columns.iter().any(|c| c == column) {
            return Err(eyre!(
                "Column '{}' not found. Available columns: {}",
                column,
                columns.join(", ")
            ));
        }
        project.select_column(Some(column.clone()));
    }

    let mut colors = ColorGenerator::new();
    let view = project.recompute_chart(&mut colors);
    tracing::info!(
        input = %path.display(),
        column = project.chart_settings.selected_column().unwrap_or(""),
        items = view.items.len(),
        "headless chart computed"
    );

    if let Some(out) = &args.export {
        let scene = render_chart(&view.items, &RenderOptions::from(&project.chart_settings));
        export_scene(&scene, out, ChartExportFormat::resolve(None, out))?;
    }
    if let Some(out) = &args.save_project {
        project::save(&mut project, out)
            .wrap_err_with(|| format!("Failed to save project to {}", out.display()))?;
    }

    Ok(HeadlessOutcome {
        project,
        view,
        exported: args.export.clone(),
        saved: args.save_project.clone(),
    })
}
