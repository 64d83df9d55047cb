//! Single-line prompt used for file paths and legend edits.
//!
//! Export prompts also carry a format selector (PNG/EPS).

use crossterm::event::{KeyCode, KeyEvent};

use crate::chart_export::ChartExportFormat;
use crate::config::Theme;
use crate::widgets::text_input::{TextInput, TextInputEvent};

/// What the entered text is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    OpenCsv,
    OpenProject,
    SaveProject,
    ExportChart,
    EditLabel,
    EditColor,
}

impl PromptPurpose {
    pub fn title(self) -> &'static str {
        match self {
            Self::OpenCsv => "Open CSV",
            Self::OpenProject => "Open Project",
            Self::SaveProject => "Save Project",
            Self::ExportChart => "Export Chart",
            Self::EditLabel => "Edit Label",
            Self::EditColor => "Edit Color",
        }
    }

    pub fn input_title(self) -> &'static str {
        match self {
            Self::EditLabel => "Label",
            Self::EditColor => "Color (#rrggbb, rgb(), name)",
            _ => "File Path",
        }
    }

    pub fn is_path(self) -> bool {
        !matches!(self, Self::EditLabel | Self::EditColor)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PromptFocus {
    FormatSelector,
    #[default]
    Input,
    ConfirmButton,
    CancelButton,
}

/// Text confirmed in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSubmission {
    pub purpose: PromptPurpose,
    pub value: String,
    /// Chart item being edited (legend prompts).
    pub key: Option<String>,
    /// Explicit format chosen in an export prompt.
    pub format: Option<ChartExportFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Submit(PromptSubmission),
    Cancel,
}

pub struct PromptModal {
    pub active: bool,
    pub purpose: PromptPurpose,
    pub focus: PromptFocus,
    pub selected_format: ChartExportFormat,
    /// Set once the user picks a format; otherwise the path extension decides.
    pub format_chosen: bool,
    pub input: TextInput,
    pub key: Option<String>,
}

impl PromptModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, purpose: PromptPurpose, initial: &str, theme: &Theme) {
        self.active = true;
        self.purpose = purpose;
        self.focus = PromptFocus::Input;
        self.selected_format = ChartExportFormat::default();
        self.format_chosen = false;
        self.key = None;
        self.input = TextInput::new().with_theme(theme);
        self.input.set_value(initial);
    }

    /// Open a legend prompt targeting the chart item `key`.
    pub fn open_for_item(&mut self, purpose: PromptPurpose, key: &str, initial: &str, theme: &Theme) {
        self.open(purpose, initial, theme);
        self.key = Some(key.to_string());
    }

    pub fn close(&mut self) {
        self.active = false;
        self.focus = PromptFocus::Input;
        self.key = None;
        self.input.clear();
    }

    fn has_format(&self) -> bool {
        self.purpose == PromptPurpose::ExportChart
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            PromptFocus::FormatSelector => PromptFocus::Input,
            PromptFocus::Input => PromptFocus::ConfirmButton,
            PromptFocus::ConfirmButton => PromptFocus::CancelButton,
            PromptFocus::CancelButton if self.has_format() => PromptFocus::FormatSelector,
            PromptFocus::CancelButton => PromptFocus::Input,
        };
    }

    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            PromptFocus::FormatSelector => PromptFocus::CancelButton,
            PromptFocus::Input if self.has_format() => PromptFocus::FormatSelector,
            PromptFocus::Input => PromptFocus::CancelButton,
            PromptFocus::ConfirmButton => PromptFocus::Input,
            PromptFocus::CancelButton => PromptFocus::ConfirmButton,
        };
    }

    fn cycle_format(&mut self) {
        let all = ChartExportFormat::ALL;
        let i = all
            .iter()
            .position(|f| *f == self.selected_format)
            .unwrap_or(0);
        self.selected_format = all[(i + 1) % all.len()];
        self.format_chosen = true;
    }

    /// Empty paths are not submitted; legend edits may be empty.
    fn submit(&mut self) -> Option<PromptOutcome> {
        let value = self.input.value().trim().to_string();
        if value.is_empty() && self.purpose.is_path() {
            return None;
        }
        let submission = PromptSubmission {
            purpose: self.purpose,
            value,
            key: self.key.clone(),
            format: (self.has_format() && self.format_chosen).then_some(self.selected_format),
        };
        self.close();
        Some(PromptOutcome::Submit(submission))
    }

    fn cancel(&mut self) -> Option<PromptOutcome> {
        self.close();
        Some(PromptOutcome::Cancel)
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<PromptOutcome> {
        match event.code {
            KeyCode::Esc => return self.cancel(),
            KeyCode::Tab => {
                self.next_focus();
                return None;
            }
            KeyCode::BackTab => {
                self.prev_focus();
                return None;
            }
            _ => {}
        }

        match self.focus {
            PromptFocus::Input => match self.input.handle_key(event) {
                TextInputEvent::Submit => self.submit(),
                TextInputEvent::Cancel => self.cancel(),
                TextInputEvent::None => None,
            },
            PromptFocus::FormatSelector => {
                if matches!(
                    event.code,
                    KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') | KeyCode::Enter
                ) {
                    self.cycle_format();
                }
                None
            }
            PromptFocus::ConfirmButton if event.code == KeyCode::Enter => self.submit(),
            PromptFocus::CancelButton if event.code == KeyCode::Enter => self.cancel(),
            _ => None,
        }
    }
}

impl Default for PromptModal {
    fn default() -> Self {
        Self {
            active: false,
            purpose: PromptPurpose::OpenCsv,
            focus: PromptFocus::Input,
            selected_format: ChartExportFormat::Png,
            format_chosen: false,
            input: TextInput::new(),
            key: None,
        }
    }
}
