use crate::logic::info::{InsurancePlan, Scheme};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

/// Support schemes plus the insurance plan suggested for the selected crop.
pub struct SchemesScreen<'a> {
    pub schemes: &'a [Scheme],
    pub selected_index: usize,
    pub insurance: Option<(&'a str, &'static InsurancePlan)>,
}

impl<'a> SchemesScreen<'a> {
    pub fn new(schemes: &'a [Scheme]) -> Self {
        Self {
            schemes,
            selected_index: 0,
            insurance: None,
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn with_insurance(mut self, crop_type: &'a str, plan: &'static InsurancePlan) -> Self {
        self.insurance = Some((crop_type, plan));
        self
    }
}

impl Widget for SchemesScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(8),    // Schemes
                Constraint::Length(6), // Insurance
                Constraint::Length(1), // Nav
            ])
            .split(area);

        Paragraph::new(Span::styled("Government Schemes", Theme::title())).render(chunks[0], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);

        self.render_list(content[0], buf);
        self.render_details(content[1], buf);
        self.render_insurance(chunks[2], buf);

        let nav = super::nav_line(&[("[↑↓]", "Navigate "), ("[Esc]", "Back")]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl SchemesScreen<'_> {
    fn render_list(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Schemes")
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let items: Vec<ListItem> = self
            .schemes
            .iter()
            .enumerate()
            .map(|(i, scheme)| {
                let style = if i == self.selected_index {
                    Theme::selected()
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::raw(scheme.name))).style(style)
            })
            .collect();

        List::new(items).render(inner, buf);
    }

    fn render_details(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Details")
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(scheme) = self.schemes.get(self.selected_index) else {
            return;
        };

        let lines = vec![
            Line::from(Span::styled(scheme.name, Theme::header())),
            Line::from(vec![]),
            Line::from(Span::styled(scheme.summary, Theme::normal())),
            Line::from(vec![]),
            Line::from(vec![
                Span::styled("Eligibility: ", Theme::dim()),
                Span::styled(scheme.eligibility, Theme::normal()),
            ]),
            Line::from(vec![
                Span::styled("Apply at: ", Theme::dim()),
                Span::styled(scheme.link, Theme::highlight()),
            ]),
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }

    fn render_insurance(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Crop Insurance")
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let Some((crop_type, plan)) = self.insurance else {
            Paragraph::new(Span::styled(
                "Select a crop on the dashboard for an insurance suggestion",
                Theme::dim(),
            ))
            .render(inner, buf);
            return;
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(format!("For {}: ", crop_type), Theme::dim()),
                Span::styled(plan.plan, Theme::highlight()),
            ]),
            Line::from(vec![
                Span::styled("Premium: ", Theme::dim()),
                Span::styled(plan.premium, Theme::normal()),
            ]),
            Line::from(Span::styled(plan.notes, Theme::dim())),
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
