//! Console state, input handling and rendering

use crate::game::{CommandOutcome, Engine, LeaderboardEntry, ProgressView, SubmissionOutcome};
use crate::data::{Badge, BadgeAward, TaskEvidence};
use crate::tui::widgets::TaskProgress;
use crate::tui::{centered_rect, create_content_layout, create_main_layout, line_style, styled_block};
use crate::tui::{Theme, HELP_TEXT, SMALL_LOGO};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use std::time::{Duration, Instant};

/// Lines kept in the transcript
const MAX_OUTPUT: usize = 500;

/// Application state
pub struct App {
    pub engine: Engine,
    pub user: String,
    pub scenario_id: String,
    pub theme: Theme,
    pub running: bool,
    pub show_help: bool,
    pub input_buffer: String,
    pub history: Vec<String>,
    history_cursor: Option<usize>,
    pub output: Vec<String>,
    pub cwd: String,
    pub progress: Option<ProgressView>,
    pub total_score: i64,
    pub badges: Vec<BadgeAward>,
    pub leaderboard: Vec<LeaderboardEntry>,
    task_started: Instant,   // Clock for the active task's time
}

impl App {
    pub fn new(engine: Engine, user: &str, scenario_id: &str) -> crate::Result<Self> {
        let scenario = engine.catalog().require(scenario_id)?;
        let mut output = vec![
            format!("[SYSTEM] {}", scenario.title),
            scenario.synopsis.clone(),
            "[SYSTEM] Type help for commands, F1 for console keys.".to_string(),
        ];
        output.retain(|line| !line.is_empty());

        let mut app = Self {
            engine,
            user: user.to_string(),
            scenario_id: scenario_id.to_string(),
            theme: Theme::default(),
            running: true,
            show_help: false,
            input_buffer: String::new(),
            history: Vec::new(),
            history_cursor: None,
            output,
            cwd: String::new(),
            progress: None,
            total_score: 0,
            badges: Vec::new(),
            leaderboard: Vec::new(),
            task_started: Instant::now(),
        };
        app.refresh();
        Ok(app)
    }

    fn push(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
        if self.output.len() > MAX_OUTPUT {
            let excess = self.output.len() - MAX_OUTPUT;
            self.output.drain(..excess);
        }
    }

    fn push_text(&mut self, text: &str) {
        for line in text.lines() {
            self.push(line.to_string());
        }
    }

    fn push_error(&mut self, err: impl std::fmt::Display) {
        self.push(format!("[ERROR] {}", err));
    }

    /// Pull score, progress and cwd back from the engine
    pub fn refresh(&mut self) {
        match self.engine.progress(&self.user, &self.scenario_id) {
            Ok(progress) => self.progress = Some(progress),
            Err(e) => self.push_error(e),
        }
        match self.engine.session(&self.user, &self.scenario_id) {
            Ok(session) => self.cwd = session.cwd,
            Err(e) => self.push_error(e),
        }
        match self.engine.total_score(&self.user) {
            Ok(total) => self.total_score = total,
            Err(e) => self.push_error(e),
        }
        match self.engine.badges(&self.user) {
            Ok(badges) => self.badges = badges,
            Err(e) => self.push_error(e),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.task_started.elapsed().as_millis() as u64
    }

    fn active_task_id(&self) -> Option<String> {
        self.progress.as_ref()?.active_task.as_ref().map(|t| t.id.clone())
    }

    /// Handle one submitted prompt line
    pub fn submit_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.history.push(line.to_string());
        self.history_cursor = None;

        match line.strip_prefix(':') {
            Some(action) => self.console_action(action),
            None => self.run_shell(line),
        }
        self.refresh();
    }

    fn run_shell(&mut self, line: &str) {
        self.push(format!("$ {}", line));
        let elapsed = self.elapsed_ms();
        match self.engine.run_command(&self.user, &self.scenario_id, line, Some(elapsed)) {
            Ok(CommandOutcome { output, submission, .. }) => {
                if !output.text.is_empty() {
                    self.push_text(&output.text);
                }
                if let Some(error) = &output.error {
                    for err_line in error.lines() {
                        self.push(format!("[ERROR] {}", err_line));
                    }
                }
                if let Some(submission) = submission {
                    self.report_submission(&submission);
                }
            }
            Err(e) => self.push_error(e),
        }
    }

    fn console_action(&mut self, action: &str) {
        let (verb, rest) = action.split_once(' ').unwrap_or((action, ""));
        let rest = rest.trim();
        match verb {
            "tag" => self.submit_evidence(TaskEvidence::InteractionTag(rest.to_string())),
            "flag" => self.submit_evidence(TaskEvidence::FlagString(rest.to_string())),
            "hint" => self.request_hint(),
            "attach" => match self.engine.attach_named_device(&self.user, &self.scenario_id, rest) {
                Ok(outcome) => self.push(format!("[SYSTEM] {}", outcome.message)),
                Err(e) => self.push_error(e),
            },
            "reset" => match self.engine.reset_session(&self.user, &self.scenario_id) {
                Ok(_) => {
                    self.task_started = Instant::now();
                    self.push("[SYSTEM] Scenario restored to its starting state.");
                }
                Err(e) => self.push_error(e),
            },
            "board" => self.refresh_leaderboard(),
            "help" => self.show_help = true,
            "quit" | "q" => self.running = false,
            other => self.push_error(format!("unknown console action :{}", other)),
        }
    }

    fn submit_evidence(&mut self, evidence: TaskEvidence) {
        let Some(task_id) = self.active_task_id() else {
            self.push("[SYSTEM] Every task is complete.");
            return;
        };
        let elapsed = self.elapsed_ms();
        match self.engine.submit_task_evidence(&self.user, &task_id, evidence, Some(elapsed)) {
            Ok(outcome) => self.report_submission(&outcome),
            Err(e) => self.push_error(e),
        }
    }

    fn report_submission(&mut self, outcome: &SubmissionOutcome) {
        if outcome.already_completed {
            self.push("[OK] Already completed, no points this time.");
        } else if outcome.correct {
            self.push(format!("[TASK] Task complete: +{} points", outcome.score_awarded));
            self.task_started = Instant::now();
        } else {
            self.push("[ERROR] That doesn't complete the current task.");
        }
        for award in &outcome.badges_unlocked {
            let badge = Badge::from_code(&award.badge_code);
            self.push(format!("[BADGE] {} {} (+{})", badge.icon(), badge.name(), award.points_awarded));
        }
        if outcome.scenario_complete && !outcome.already_completed {
            self.push("[TASK] Scenario complete. Well done, analyst.");
        }
        self.total_score = outcome.new_total_score;
    }

    fn request_hint(&mut self) {
        let Some(task_id) = self.active_task_id() else {
            self.push("[SYSTEM] No active task.");
            return;
        };
        match self.engine.request_hint(&self.user, &task_id) {
            Ok(hint) if hint.hint.is_empty() => self.push("[HINT] No hint for this task."),
            Ok(hint) => self.push(format!("[HINT] {}", hint.hint)),
            Err(e) => self.push_error(e),
        }
    }

    fn refresh_leaderboard(&mut self) {
        match self.engine.leaderboard(10) {
            Ok(entries) => self.leaderboard = entries,
            Err(e) => self.push_error(e),
        }
    }

    fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let index = match self.history_cursor {
            Some(0) => 0,
            Some(i) => i - 1,
            None => self.history.len() - 1,
        };
        self.history_cursor = Some(index);
        self.input_buffer = self.history[index].clone();
    }

    fn history_down(&mut self) {
        match self.history_cursor {
            Some(i) if i + 1 < self.history.len() => {
                self.history_cursor = Some(i + 1);
                self.input_buffer = self.history[i + 1].clone();
            }
            _ => {
                self.history_cursor = None;
                self.input_buffer.clear();
            }
        }
    }

    /// Handle keyboard input; returns false once the console should close
    pub fn handle_input(&mut self) -> std::io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(self.running);
                }
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.running = false;
                    }
                    KeyCode::F(1) => self.show_help = !self.show_help,
                    KeyCode::Esc => self.show_help = false,
                    KeyCode::Enter => {
                        let line = std::mem::take(&mut self.input_buffer);
                        self.submit_line(&line);
                    }
                    KeyCode::Backspace => {
                        self.input_buffer.pop();
                    }
                    KeyCode::Up => self.history_up(),
                    KeyCode::Down => self.history_down(),
                    KeyCode::Char(c) => self.input_buffer.push(c),
                    _ => {}
                }
            }
        }
        Ok(self.running)
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let layout = create_main_layout(frame.area());
        self.render_header(frame, layout[0]);

        let content = create_content_layout(layout[1]);
        self.render_side_panel(frame, content[0]);
        self.render_terminal(frame, content[1]);
        self.render_status_bar(frame, layout[2]);

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(16), Constraint::Min(20), Constraint::Length(18)])
            .split(area);

        let border = Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border));

        let logo = Paragraph::new(SMALL_LOGO)
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
            .block(border.clone());
        frame.render_widget(logo, header_layout[0]);

        let title = self
            .engine
            .catalog()
            .get(&self.scenario_id)
            .map(|s| s.title.clone())
            .unwrap_or_default();
        let title = Paragraph::new(title)
            .style(Style::default().fg(self.theme.warning))
            .alignment(Alignment::Center)
            .block(border.clone());
        frame.render_widget(title, header_layout[1]);

        let score = Paragraph::new(format!(" {} pts ", self.total_score))
            .style(Style::default().fg(self.theme.success).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Right)
            .block(border);
        frame.render_widget(score, header_layout[2]);
    }

    fn render_side_panel(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),       // Progress bar
                Constraint::Min(6),          // Active task
                Constraint::Length(7),       // Badges
                Constraint::Length(7),       // Leaderboard
            ])
            .split(area);

        let (done, total) = self
            .progress
            .as_ref()
            .map(|p| (p.task_index, p.task_count))
            .unwrap_or((0, 0));
        let block = styled_block("Progress", &self.theme);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);
        frame.render_widget(TaskProgress::new(done, total).color(self.theme.success), inner);

        let task_text: Vec<Line> = match self.progress.as_ref().and_then(|p| p.active_task.as_ref()) {
            Some(task) => {
                let mut lines = vec![
                    Line::from(Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
                    Line::from(""),
                    Line::from(task.description.clone()),
                    Line::from(""),
                    Line::from(Span::styled(format!("{} points", task.points), Style::default().fg(self.theme.success))),
                ];
                if !task.hint.is_empty() {
                    let cost = if task.hint_cost > 0 { format!("costs {} pts", task.hint_cost) } else { "free".to_string() };
                    lines.push(Line::from(Span::styled(
                        format!(":hint ({})", cost),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                lines
            }
            None => vec![Line::from(Span::styled(
                "All tasks complete",
                Style::default().fg(self.theme.success).add_modifier(Modifier::BOLD),
            ))],
        };
        let task = Paragraph::new(task_text)
            .block(styled_block("Current Task", &self.theme))
            .wrap(Wrap { trim: true });
        frame.render_widget(task, chunks[1]);

        let badges: Vec<ListItem> = if self.badges.is_empty() {
            vec![ListItem::new("  none yet")]
        } else {
            self.badges
                .iter()
                .map(|award| {
                    let badge = Badge::from_code(&award.badge_code);
                    ListItem::new(format!(" {} {}", badge.icon(), badge.name()))
                })
                .collect()
        };
        frame.render_widget(List::new(badges).block(styled_block("Badges", &self.theme)), chunks[2]);

        let board: Vec<ListItem> = if self.leaderboard.is_empty() {
            vec![ListItem::new("  :board to load")]
        } else {
            self.leaderboard
                .iter()
                .enumerate()
                .map(|(i, entry)| ListItem::new(format!(" {}. {} {}", i + 1, entry.user, entry.total_score)))
                .collect()
        };
        frame.render_widget(List::new(board).block(styled_block("Leaderboard", &self.theme)), chunks[3]);
    }

    fn render_terminal(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),      // Transcript
                Constraint::Length(3),   // Prompt
            ])
            .split(area);

        let visible_lines = chunks[0].height.saturating_sub(2) as usize;
        let start = self.output.len().saturating_sub(visible_lines);
        let lines: Vec<Line> = self.output[start..]
            .iter()
            .map(|line| Line::from(Span::styled(line.as_str(), line_style(line, &self.theme))))
            .collect();
        let terminal = Paragraph::new(lines).block(styled_block("Terminal", &self.theme));
        frame.render_widget(terminal, chunks[0]);

        let prompt = format!("{}@lab:{}$ {}_", self.user, self.cwd, self.input_buffer);
        let input = Paragraph::new(prompt)
            .style(Style::default().fg(self.theme.success))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.success))
                    .title(" Command "),
            );
        frame.render_widget(input, chunks[1]);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status = Paragraph::new(format!(
            " {} | {} | {} badges | F1 help ",
            self.user,
            self.cwd,
            self.badges.len()
        ))
        .style(Style::default().fg(self.theme.fg).bg(Color::DarkGray));
        frame.render_widget(status, area);
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let popup_area = centered_rect(72, 22, frame.area());
        frame.render_widget(Clear, popup_area);

        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.fg))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.accent))
                    .title(" Help "),
            );
        frame.render_widget(help, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{EngineConfig, ScenarioCatalog};

    fn app() -> App {
        let engine = Engine::in_memory(EngineConfig::default(), ScenarioCatalog::bundled().unwrap());
        App::new(engine, "analyst", "usb_exfil").unwrap()
    }

    #[test]
    fn shell_lines_are_echoed_with_output() {
        let mut app = app();
        app.submit_line("pwd");
        assert!(app.output.iter().any(|l| l == "$ pwd"));
        assert_eq!(app.output.last().unwrap(), "/home/user");
        app.submit_line("cat nope");
        assert!(app.output.last().unwrap().starts_with("[ERROR] cat: nope"));
    }

    #[test]
    fn console_actions_drive_tasks() {
        let mut app = app();
        app.submit_line(":tag desk");
        assert!(app.output.last().unwrap().starts_with("[ERROR]"));
        app.submit_line(":tag laptop");
        assert_eq!(app.total_score, 10);
        assert_eq!(app.progress.as_ref().unwrap().task_index, 1);

        app.submit_line("cd ./evidence");
        assert_eq!(app.cwd, "/home/user/evidence");
        assert_eq!(app.progress.as_ref().unwrap().task_index, 2);
        assert_eq!(app.total_score, 20);
    }

    #[test]
    fn hint_and_unknown_action() {
        let mut app = app();
        app.submit_line(":tag laptop");
        app.submit_line(":hint");
        assert!(app.output.last().unwrap().starts_with("[HINT] cd takes a path"));
        app.submit_line(":frobnicate");
        assert!(app.output.last().unwrap().contains("unknown console action"));
        app.submit_line(":quit");
        assert!(!app.running);
    }

    #[test]
    fn history_walks_back_and_forth() {
        let mut app = app();
        app.submit_line("ls");
        app.submit_line("pwd");
        app.history_up();
        assert_eq!(app.input_buffer, "pwd");
        app.history_up();
        app.history_up();
        assert_eq!(app.input_buffer, "ls");
        app.history_down();
        assert_eq!(app.input_buffer, "pwd");
        app.history_down();
        assert!(app.input_buffer.is_empty());
    }
}
