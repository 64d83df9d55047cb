//! Chart settings dialog: edits a draft copy of the project's [`ChartSettings`].
//!
//! Nothing reaches the project until Apply; Cancel drops the draft.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Theme;
use crate::project::ChartSettings;
use crate::widgets::text_input::{TextInput, TextInputEvent};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFocus {
    #[default]
    Column,
    ChartType,
    TopN,
    Width,
    Height,
    Title,
    Alignment,
    ApplyButton,
    CancelButton,
}

impl SettingsFocus {
    pub const ALL: [Self; 9] = [
        Self::Column,
        Self::ChartType,
        Self::TopN,
        Self::Width,
        Self::Height,
        Self::Title,
        Self::Alignment,
        Self::ApplyButton,
        Self::CancelButton,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Column => "Column",
            Self::ChartType => "Chart type",
            Self::TopN => "Top N",
            Self::Width => "Width",
            Self::Height => "Height",
            Self::Title => "Title",
            Self::Alignment => "Alignment",
            Self::ApplyButton => "Apply",
            Self::CancelButton => "Cancel",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Fields edited through a text input.
    pub fn is_text(self) -> bool {
        matches!(self, Self::TopN | Self::Width | Self::Height | Self::Title)
    }
}

/// Result of a key press in the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsOutcome {
    Apply(ChartSettings),
    Cancel,
}

pub struct SettingsModal {
    pub active: bool,
    pub focus: SettingsFocus,
    pub draft: ChartSettings,
    pub columns: Vec<String>,
    pub top_n_input: TextInput,
    pub width_input: TextInput,
    pub height_input: TextInput,
    pub title_input: TextInput,
    /// Validation message shown until the next edit.
    pub error: Option<String>,
}

impl SettingsModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open on a copy of `settings`; `columns` are the choices for the grouping column.
    pub fn open(&mut self, settings: &ChartSettings, columns: Vec<String>, theme: &Theme) {
        self.active = true;
        self.focus = SettingsFocus::Column;
        self.draft = settings.clone();
        self.columns = columns;
        self.error = None;
        self.top_n_input = TextInput::new().with_theme(theme);
        self.top_n_input.set_value(settings.top_n.to_string());
        self.width_input = TextInput::new().with_theme(theme);
        self.width_input.set_value(settings.width.to_string());
        self.height_input = TextInput::new().with_theme(theme);
        self.height_input.set_value(settings.height.to_string());
        self.title_input = TextInput::new().with_theme(theme);
        self.title_input.set_value(settings.chart_title.clone());
    }

    pub fn close(&mut self) {
        self.active = false;
        self.focus = SettingsFocus::Column;
        self.error = None;
    }

    fn input_mut(&mut self, focus: SettingsFocus) -> Option<&mut TextInput> {
        match focus {
            SettingsFocus::TopN => Some(&mut self.top_n_input),
            SettingsFocus::Width => Some(&mut self.width_input),
            SettingsFocus::Height => Some(&mut self.height_input),
            SettingsFocus::Title => Some(&mut self.title_input),
            _ => None,
        }
    }

    /// Move to the next or previous choice of a selector field.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            SettingsFocus::Column => {
                if self.columns.is_empty() {
                    return;
                }
                let len = self.columns.len();
                let current = self
                    .draft
                    .selected_column()
                    .and_then(|c| self.columns.iter().position(|col| col == c));
                let next = match (current, forward) {
                    (None, true) => 0,
                    (None, false) => len - 1,
                    (Some(i), true) => (i + 1) % len,
                    (Some(i), false) => (i + len - 1) % len,
                };
                self.draft.selected_key = Some(self.columns[next].clone());
            }
            SettingsFocus::ChartType => self.draft.chart_type = self.draft.chart_type.toggled(),
            SettingsFocus::Alignment => {
                let alignment = self.draft.title_alignment;
                self.draft.title_alignment = if forward {
                    alignment.next()
                } else {
                    alignment.next().next()
                };
            }
            _ => {}
        }
    }

    /// Collect the draft, parsing the numeric inputs.
    pub fn build_settings(&self) -> Result<ChartSettings, String> {
        let parse = |input: &TextInput, name: &str| {
            input
                .value()
                .trim()
                .parse::<i32>()
                .map_err(|_| format!("{} must be a whole number", name))
        };
        let mut settings = self.draft.clone();
        settings.top_n = parse(&self.top_n_input, "Top N")?;
        settings.width = parse(&self.width_input, "Width")?;
        settings.height = parse(&self.height_input, "Height")?;
        settings.chart_title = self.title_input.value().to_string();
        Ok(settings)
    }

    fn submit(&mut self) -> Option<SettingsOutcome> {
        match self.build_settings() {
            Ok(settings) => {
                self.close();
                Some(SettingsOutcome::Apply(settings))
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<SettingsOutcome> {
        match event.code {
            KeyCode::Esc => {
                self.close();
                return Some(SettingsOutcome::Cancel);
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                return None;
            }
            KeyCode::Char('s') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.submit();
            }
            _ => {}
        }

        match self.focus {
            SettingsFocus::ApplyButton if event.code == KeyCode::Enter => self.submit(),
            SettingsFocus::CancelButton if event.code == KeyCode::Enter => {
                self.close();
                Some(SettingsOutcome::Cancel)
            }
            focus if focus.is_text() => {
                self.error = None;
                let input = self.input_mut(focus)?;
                match input.handle_key(event) {
                    TextInputEvent::Submit => {
                        self.focus = self.focus.next();
                        None
                    }
                    TextInputEvent::Cancel => {
                        self.close();
                        Some(SettingsOutcome::Cancel)
                    }
                    TextInputEvent::None => None,
                }
            }
            _ => {
                match event.code {
                    KeyCode::Left | KeyCode::Char('h') => self.cycle(false),
                    KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.cycle(true),
                    KeyCode::Enter => self.focus = self.focus.next(),
                    _ => {}
                }
                None
            }
        }
    }
}

impl Default for SettingsModal {
    fn default() -> Self {
        Self {
            active: false,
            focus: SettingsFocus::Column,
            draft: ChartSettings::default(),
            columns: Vec::new(),
            top_n_input: TextInput::new(),
            width_input: TextInput::new(),
            height_input: TextInput::new(),
            title_input: TextInput::new(),
            error: None,
        }
    }
}
