//! Terminal console
//!
//! A ratatui front end that plays the part of the exercise UI: it forwards
//! typed lines and console actions to the `Engine` and shows what comes back.

pub mod app;
pub mod widgets;

pub use app::App;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

/// Color scheme for the console
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub alert: Color,
    pub success: Color,
    pub warning: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            accent: Color::Cyan,
            alert: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            border: Color::DarkGray,
        }
    }
}

/// Style for a transcript line, chosen by its tag
pub fn line_style(line: &str, theme: &Theme) -> Style {
    if line.starts_with("[ERROR]") {
        Style::default().fg(theme.alert).add_modifier(Modifier::BOLD)
    } else if line.starts_with("[TASK]") || line.starts_with("[OK]") {
        Style::default().fg(theme.success).add_modifier(Modifier::BOLD)
    } else if line.starts_with("[BADGE]") {
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
    } else if line.starts_with("[HINT]") {
        Style::default().fg(theme.warning)
    } else if line.starts_with("[SYSTEM]") {
        Style::default().fg(theme.accent)
    } else if line.starts_with("$ ") {
        Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg)
    }
}

/// Create a styled border block
pub fn styled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

/// Smaller logo for header
pub const SMALL_LOGO: &str = " INCIDENT LAB ";

/// Help text
pub const HELP_TEXT: &str = r#"
  Type shell commands at the prompt, e.g. ls -a, cd ./evidence, cat notes.txt
  Type help for the full command list of this scenario.

  Console actions:
    :tag <name>      interact with an object in the scene
    :flag <answer>   submit an answer
    :hint            reveal the hint for the active task
    :attach <name>   plug in a device
    :reset           restore the scenario to its starting state
    :board           refresh the leaderboard
    :quit            leave

  Keys:
    Up/Down  command history      F1  toggle this help
    Esc      close help           Ctrl-C  quit
"#;

/// Header, content, status bar
pub fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(10),     // Main content
            Constraint::Length(1),   // Status bar
        ])
        .split(area)
        .to_vec()
}

/// Side panel (task, badges) and terminal
pub fn create_content_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),  // Side panel
            Constraint::Percentage(70),  // Terminal
        ])
        .split(area)
        .to_vec()
}

/// Centered popup rectangle clamped to `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
