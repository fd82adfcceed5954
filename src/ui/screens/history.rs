use crate::models::{Crop, HistoryEntry};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};

/// Full action log for one crop, newest first.
pub struct HistoryScreen<'a> {
    pub crop: &'a Crop,
    pub entries: &'a [HistoryEntry],
    pub scroll: usize,
}

impl<'a> HistoryScreen<'a> {
    pub fn new(crop: &'a Crop, entries: &'a [HistoryEntry]) -> Self {
        Self {
            crop,
            entries,
            scroll: 0,
        }
    }

    pub fn with_scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Widget for HistoryScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(5),    // Entries
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("History", Theme::title()),
            Span::styled(
                format!(
                    " - {} ({}) - {} entries",
                    self.crop.name,
                    self.crop.crop_type,
                    self.entries.len()
                ),
                Theme::dim(),
            ),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_entries(chunks[1], buf);

        let nav = super::nav_line(&[("[↑↓]", "Scroll "), ("[Esc]", "Back")]);
        Paragraph::new(nav).render(chunks[2], buf);
    }
}

impl HistoryScreen<'_> {
    fn render_entries(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Time           Action         Moist  pH   NPK  Outcome  Recommendation")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if self.entries.is_empty() {
            Paragraph::new(Span::styled(
                "No history yet. Entries appear when the decision changes or a control is toggled.",
                Theme::dim(),
            ))
            .render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .rev()
            .skip(self.scroll)
            .map(|entry| {
                let s = &entry.sensors;
                ListItem::new(Line::from(vec![
                    Span::styled(
                        entry.timestamp.format("%Y-%m-%d %H:%M ").to_string(),
                        Theme::dim(),
                    ),
                    Span::styled(
                        format!("{:<14} ", entry.action_taken.as_str()),
                        Style::default().fg(entry.action_taken.color()),
                    ),
                    Span::styled(
                        format!("{:>4.0}%  ", s.moisture),
                        Style::default().fg(Theme::moisture_color(s.moisture)),
                    ),
                    Span::styled(format!("{:<4.1} {:>4.0}  ", s.ph, s.npk), Theme::normal()),
                    Span::styled(format!("{:<8} ", entry.outcome.as_str()), Theme::dim()),
                    Span::styled(entry.ai_recommendation.as_str(), Theme::normal()),
                ]))
            })
            .collect();

        List::new(items).render(inner, buf);
    }
}
