use crate::logic::resolve_stage;
use crate::logic::stage_resolver::next_stage;
use crate::models::{ControlFlags, Crop, Farm, UserProfile};
use crate::ui::Theme;
use chrono::NaiveDate;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

pub struct DashboardScreen<'a> {
    pub farms: &'a [Farm],
    pub crops: &'a [Crop],
    pub selected_index: usize,
    pub selected_controls: ControlFlags,
    pub profile: Option<&'a UserProfile>,
    pub api_enabled: bool,
    pub today: NaiveDate,
    pub status_message: Option<&'a str>,
    pub error_message: Option<&'a str>,
}

impl<'a> DashboardScreen<'a> {
    pub fn new(farms: &'a [Farm], crops: &'a [Crop], today: NaiveDate) -> Self {
        Self {
            farms,
            crops,
            selected_index: 0,
            selected_controls: ControlFlags::default(),
            profile: None,
            api_enabled: false,
            today,
            status_message: None,
            error_message: None,
        }
    }

    pub fn with_selection(mut self, index: usize, controls: ControlFlags) -> Self {
        self.selected_index = index;
        self.selected_controls = controls;
        self
    }

    pub fn with_profile(mut self, profile: Option<&'a UserProfile>) -> Self {
        self.profile = profile;
        self
    }

    pub fn api_enabled(mut self, enabled: bool) -> Self {
        self.api_enabled = enabled;
        self
    }

    pub fn with_status(mut self, status: Option<&'a str>, error: Option<&'a str>) -> Self {
        self.status_message = status;
        self.error_message = error;
        self
    }

    fn farm_name(&self, farm_id: i64) -> &str {
        self.farms
            .iter()
            .find(|f| f.id == farm_id)
            .map(|f| f.name.as_str())
            .unwrap_or("?")
    }
}

impl Widget for DashboardScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(8),    // Crops and summary
                Constraint::Length(1), // Status message
                Constraint::Length(1), // Nav bar
            ])
            .split(area);

        self.render_header(chunks[0], buf);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        self.render_crops(middle[0], buf);
        self.render_summary(middle[1], buf);

        super::render_status_line(chunks[2], buf, self.status_message, self.error_message);

        let nav = super::nav_line(&[
            ("[↑↓]", "Select "),
            ("[Enter]", "Open "),
            ("[h]", "History "),
            ("[2]", "Register "),
            ("[3]", "Schemes "),
            ("[4]", "Sensors "),
            ("[q]", "Quit"),
        ]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl DashboardScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let title = match self.profile {
            Some(p) => format!("FieldOps - {}", p.display_name()),
            None => "FieldOps - Not signed in".to_string(),
        };

        let block = Block::default()
            .title(Span::styled(title, Theme::title()))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let api = if self.api_enabled {
            Span::styled("Farm API: enabled", Theme::success())
        } else {
            Span::styled("Farm API: disabled", Theme::dim())
        };

        let info = Line::from(vec![
            Span::styled(
                format!(
                    "{} farm(s), {} crop(s)  |  ",
                    self.farms.len(),
                    self.crops.len()
                ),
                Theme::dim(),
            ),
            api,
        ]);
        Paragraph::new(info).block(block).render(area, buf);
    }

    fn render_crops(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Crops", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if self.crops.is_empty() {
            let para = Paragraph::new(Span::styled(
                "No crops registered - press 2 to register a farm and crop",
                Theme::dim(),
            ));
            para.render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .crops
            .iter()
            .enumerate()
            .map(|(i, crop)| {
                let style = if i == self.selected_index {
                    Theme::selected()
                } else {
                    Style::default()
                };
                let days = crop.days_since_planting(self.today);
                let stage = resolve_stage(&crop.crop_type, days);

                let line = Line::from(vec![
                    Span::styled(format!("{} ", stage.icon), Theme::normal()),
                    Span::styled(&crop.name, Theme::highlight()),
                    Span::styled(format!(" ({})", crop.crop_type), Theme::dim()),
                    Span::styled(format!("  {}", self.farm_name(crop.farm_id)), Theme::dim()),
                    Span::styled(format!("  day {}", days), Theme::normal()),
                ]);
                ListItem::new(line).style(style)
            })
            .collect();

        List::new(items).render(inner, buf);
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Selected Crop", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(crop) = self.crops.get(self.selected_index) else {
            Paragraph::new(Span::styled("Nothing selected", Theme::dim())).render(inner, buf);
            return;
        };

        let days = crop.days_since_planting(self.today);
        let stage = resolve_stage(&crop.crop_type, days);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Farm: ", Theme::dim()),
                Span::styled(self.farm_name(crop.farm_id), Theme::normal()),
            ]),
            Line::from(vec![
                Span::styled("Planted: ", Theme::dim()),
                Span::styled(crop.planted_on.format("%Y-%m-%d").to_string(), Theme::normal()),
                Span::styled(format!("  ({} days)", days), Theme::dim()),
            ]),
            Line::from(vec![]),
            Line::from(vec![
                Span::styled("Stage: ", Theme::dim()),
                Span::styled(format!("{} {}", stage.icon, stage.stage_name), Theme::highlight()),
                Span::styled(
                    format!("  {:.0}%", stage.progress(days) * 100.0),
                    Theme::dim(),
                ),
            ]),
            Line::from(Span::styled(stage.description, Theme::normal())),
        ];

        if let Some(next) = next_stage(&crop.crop_type, days) {
            lines.push(Line::from(vec![
                Span::styled("Next: ", Theme::dim()),
                Span::styled(next.stage_name, Theme::normal()),
                Span::styled(format!(" from day {}", next.day_start), Theme::dim()),
            ]));
        }

        lines.push(Line::from(vec![]));
        lines.push(Line::from(vec![
            Span::styled("Irrigation ", Theme::dim()),
            Span::styled(
                if self.selected_controls.irrigation_running { "ON " } else { "off " },
                Theme::running(self.selected_controls.irrigation_running),
            ),
            Span::styled(" Fertilization ", Theme::dim()),
            Span::styled(
                if self.selected_controls.fertilization_running { "ON" } else { "off" },
                Theme::running(self.selected_controls.fertilization_running),
            ),
        ]));

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
