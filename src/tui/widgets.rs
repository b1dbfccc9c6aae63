//! Custom widgets for the console

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Task progress as a label and a bar: `Tasks 2/6` over `[██░░░░]`
pub struct TaskProgress {
    done: usize,
    total: usize,
    color: Color,
}

impl TaskProgress {
    pub fn new(done: usize, total: usize) -> Self {
        Self { done, total, color: Color::Green }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Number of filled cells for a bar of `width` inner cells
    pub fn filled(&self, width: u16) -> u16 {
        if self.total == 0 {
            return width;
        }
        let done = self.done.min(self.total);
        ((done * width as usize) / self.total) as u16
    }
}

impl Widget for TaskProgress {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }

        let label = format!("Tasks {}/{}", self.done.min(self.total), self.total);
        buf.set_string(area.x, area.y, &label, Style::default().fg(self.color));

        if area.height > 1 {
            let bar_y = area.y + 1;
            let inner = area.width - 2;
            let filled = self.filled(inner);
            buf.set_string(area.x, bar_y, "[", Style::default());
            buf.set_string(area.x + area.width - 1, bar_y, "]", Style::default());
            for x in 0..inner {
                let (cell, color) = if x < filled { ("█", self.color) } else { ("░", Color::DarkGray) };
                buf.set_string(area.x + 1 + x, bar_y, cell, Style::default().fg(color));
            }
        }
    }
}
