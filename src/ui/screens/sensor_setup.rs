use crate::logic::info::SetupStep;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct SensorSetupScreen<'a> {
    pub steps: &'a [SetupStep],
}

impl<'a> SensorSetupScreen<'a> {
    pub fn new(steps: &'a [SetupStep]) -> Self {
        Self { steps }
    }
}

impl Widget for SensorSetupScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(Span::styled("Sensor Setup", Theme::title())).render(chunks[0], buf);

        let block = Block::default()
            .title("Installation Steps")
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(chunks[1]);
        block.render(chunks[1], buf);

        let mut lines = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Theme::highlight()),
                Span::styled(step.title, Theme::header()),
            ]));
            lines.push(Line::from(Span::styled(format!("   {}", step.detail), Theme::normal())));
            lines.push(Line::from(vec![]));
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);

        let nav = super::nav_line(&[("[1]", "Dashboard "), ("[Esc]", "Back")]);
        Paragraph::new(nav).render(chunks[2], buf);
    }
}
