//! Shared CLI definitions for tallyplot.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Chart type selectable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ChartKind {
    /// Vertical bars, one per category
    Bar,
    /// Pie slices proportional to each category's count
    Pie,
}

/// Horizontal placement of the chart title.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Kind of file given as the positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Delimited text (optionally gzip/zstd compressed)
    Csv,
    /// Saved tallyplot project (JSON)
    Project,
}

impl InputKind {
    /// Detect input kind from the path extension. Anything that is not `.json` is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => Self::Project,
            _ => Self::Csv,
        }
    }
}

/// Command-line arguments for tallyplot
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "tallyplot",
    version,
    about = "Count CSV categories and chart them as bars or pies",
    long_about = "Count how often each value of a CSV column occurs and chart the counts as a \
bar or pie chart. Labels and colors can be edited per category, saved with the \
dataset as a JSON project, and the chart exported as PNG or EPS.\n\n\
Without --export or --save-project an interactive terminal UI is started."
)]
pub struct Args {
    /// CSV file or saved project (.json) to open
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Column whose values are counted
    #[arg(long = "column", short = 'c', value_name = "NAME")]
    pub column: Option<String>,

    /// Keep only the N most frequent values (0 or negative = all)
    #[arg(long = "top-n", short = 'n', value_name = "N", allow_hyphen_values = true)]
    pub top_n: Option<i32>,

    /// Chart type
    #[arg(long = "chart", value_enum)]
    pub chart: Option<ChartKind>,

    /// Chart title (empty string for no title)
    #[arg(long = "title", value_name = "TEXT")]
    pub title: Option<String>,

    /// Title alignment
    #[arg(long = "align", value_enum)]
    pub align: Option<Alignment>,

    /// Canvas width in chart units (the exported PNG is three times larger)
    #[arg(long = "width", value_name = "UNITS")]
    pub width: Option<i32>,

    /// Canvas height in chart units (the exported PNG is three times larger)
    #[arg(long = "height", value_name = "UNITS")]
    pub height: Option<i32>,

    /// Render the chart to this file and exit (.png or .eps) without starting the UI
    #[arg(long = "export", value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Save the resulting project to this file and exit without starting the UI
    #[arg(long = "save-project", value_name = "FILE")]
    pub save_project: Option<PathBuf>,

    /// Write diagnostic logs to this file
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Generate default configuration file at ~/.config/tallyplot/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

impl Args {
    /// True when the run renders/saves and exits instead of starting the terminal UI.
    pub fn is_headless(&self) -> bool {
        self.export.is_some() || self.save_project.is_some()
    }
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();
    let mut out = String::from("# Command Line Options\n\n");
    out.push_str("## Usage\n\n```\n");
    out.push_str(&cmd.render_usage().to_string());
    out.push_str("\n```\n\n");
    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_str().to_string();
        if id == "help" || id == "version" {
            continue;
        }
        let option_str = if arg.is_positional() {
            let placeholder = arg
                .get_value_names()
                .map(|names| {
                    names
                        .iter()
                        .map(|n| format!("<{}>", n.as_str()))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let long = arg.get_long().map(|l| format!("--{l}"));
            let short = arg.get_short().map(|s| format!("-{s}"));
            let op = match (short, long) {
                (Some(s), Some(l)) => format!("{s}, {l}"),
                (None, Some(l)) => l,
                (Some(s), None) => s,
                (None, None) => id.clone(),
            };
            let takes_value = arg.get_num_args().map(|n| n.takes_values()).unwrap_or(false);
            let placeholder = if takes_value {
                arg.get_value_names()
                    .and_then(|names| names.first().map(|n| format!("<{}>", n.as_str())))
                    .unwrap_or_else(|| format!("<{}>", id.to_uppercase()))
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
