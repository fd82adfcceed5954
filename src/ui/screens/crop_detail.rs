use crate::logic::RequestKind;
use crate::models::{
    ControlFlags, Crop, Decision, Farm, GrowthStage, HistoryEntry, IrrigationAction,
    PredictionResponse, SensorSnapshot, ValveStatus,
};
use crate::ui::components::{humidity_gauge, moisture_gauge, npk_gauge, ph_gauge, temperature_gauge};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

pub struct CropDetailScreen<'a> {
    pub crop: &'a Crop,
    pub farm: &'a Farm,
    pub days: i64,
    pub stage: &'static GrowthStage,
    pub next_stage: Option<&'static GrowthStage>,
    pub snapshot: Option<&'a SensorSnapshot>,
    pub decision: Option<&'a Decision>,
    pub controls: ControlFlags,
    pub feed_live: bool,
    pub prediction: Option<&'a PredictionResponse>,
    pub valves: &'a [ValveStatus],
    pub pending: Option<RequestKind>,
    pub rain_forecast: bool,
    pub api_enabled: bool,
    pub history: &'a [HistoryEntry],
    pub status_message: Option<&'a str>,
    pub error_message: Option<&'a str>,
}

impl<'a> CropDetailScreen<'a> {
    pub fn new(
        crop: &'a Crop,
        farm: &'a Farm,
        days: i64,
        stage: &'static GrowthStage,
        next_stage: Option<&'static GrowthStage>,
    ) -> Self {
        Self {
            crop,
            farm,
            days,
            stage,
            next_stage,
            snapshot: None,
            decision: None,
            controls: ControlFlags::default(),
            feed_live: false,
            prediction: None,
            valves: &[],
            pending: None,
            rain_forecast: false,
            api_enabled: false,
            history: &[],
            status_message: None,
            error_message: None,
        }
    }

    pub fn with_sensors(
        mut self,
        snapshot: Option<&'a SensorSnapshot>,
        decision: Option<&'a Decision>,
        feed_live: bool,
    ) -> Self {
        self.snapshot = snapshot;
        self.decision = decision;
        self.feed_live = feed_live;
        self
    }

    pub fn with_controls(mut self, controls: ControlFlags) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_api(
        mut self,
        enabled: bool,
        prediction: Option<&'a PredictionResponse>,
        valves: &'a [ValveStatus],
        pending: Option<RequestKind>,
        rain_forecast: bool,
    ) -> Self {
        self.api_enabled = enabled;
        self.prediction = prediction;
        self.valves = valves;
        self.pending = pending;
        self.rain_forecast = rain_forecast;
        self
    }

    pub fn with_history(mut self, history: &'a [HistoryEntry]) -> Self {
        self.history = history;
        self
    }

    pub fn with_status(mut self, status: Option<&'a str>, error: Option<&'a str>) -> Self {
        self.status_message = status;
        self.error_message = error;
        self
    }
}

impl Widget for CropDetailScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(4), // Gauges
                Constraint::Min(12),   // Stage guidance, decision, controls
                Constraint::Length(6), // Recent history
                Constraint::Length(1), // Status
                Constraint::Length(1), // Nav
            ])
            .split(area);

        self.render_header(chunks[0], buf);
        self.render_gauges(chunks[1], buf);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[2]);

        self.render_stage(middle[0], buf);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Decision
                Constraint::Length(4), // Controls
                Constraint::Min(4),    // Farm API
            ])
            .split(middle[1]);

        self.render_decision(right[0], buf);
        self.render_controls(right[1], buf);
        self.render_api(right[2], buf);

        self.render_history(chunks[3], buf);

        super::render_status_line(chunks[4], buf, self.status_message, self.error_message);

        // Request keys are hidden while a request is in flight
        let nav = if self.pending.is_some() {
            super::nav_line(&[
                ("[i]", "Irrigate "),
                ("[f]", "Fertilize "),
                ("[h]", "History "),
                ("[Esc]", "Back"),
            ])
        } else {
            super::nav_line(&[
                ("[i]", "Irrigate "),
                ("[f]", "Fertilize "),
                ("[p]", "Predict "),
                ("[r]", "Rain "),
                ("[y/n]", "Feedback "),
                ("[v]", "Valves "),
                ("[o/O]", "Toggle/Override "),
                ("[h]", "History "),
                ("[Esc]", "Back"),
            ])
        };
        Paragraph::new(nav).render(chunks[5], buf);
    }
}

impl CropDetailScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let title = format!("{} - {} ({})", self.farm.name, self.crop.name, self.crop.crop_type);
        let block = Block::default()
            .title(Span::styled(title, Theme::title()))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let feed = if self.feed_live {
            Span::styled("sensors live", Theme::success())
        } else {
            Span::styled("no sensor feed", Theme::warning())
        };

        let mut spans = vec![
            Span::styled(
                format!(
                    "Planted {}  |  Day {}  |  ",
                    self.crop.planted_on.format("%Y-%m-%d"),
                    self.days
                ),
                Theme::dim(),
            ),
            feed,
        ];
        if let Some(s) = self.snapshot {
            spans.push(Span::styled(
                format!("  |  updated {}", s.captured_at.format("%H:%M:%S")),
                Theme::dim(),
            ));
        }

        Paragraph::new(Line::from(spans)).block(block).render(area, buf);
    }

    fn render_gauges(&self, area: Rect, buf: &mut Buffer) {
        let gauge_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
            ])
            .split(area);

        let s = self.snapshot;
        moisture_gauge("Moisture", s.map(|s| s.moisture)).render(gauge_chunks[0], buf);
        ph_gauge("pH", s.map(|s| s.ph)).render(gauge_chunks[1], buf);
        npk_gauge("NPK", s.map(|s| s.npk)).render(gauge_chunks[2], buf);
        temperature_gauge("Temp", s.map(|s| s.temperature_c)).render(gauge_chunks[3], buf);
        humidity_gauge("Humidity", s.map(|s| s.humidity_percent)).render(gauge_chunks[4], buf);
    }

    fn render_stage(&self, area: Rect, buf: &mut Buffer) {
        let stage = self.stage;
        let block = Block::default()
            .title(Span::styled(
                format!("{} {}", stage.icon, stage.stage_name),
                Theme::header(),
            ))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("Days {}-{}", stage.day_start, stage.day_end),
                    Theme::dim(),
                ),
                Span::styled(
                    format!("  {:.0}% through", stage.progress(self.days) * 100.0),
                    Theme::highlight(),
                ),
            ]),
            Line::from(Span::styled(stage.description, Theme::normal())),
            Line::from(vec![]),
            Line::from(Span::styled("Tasks:", Theme::dim())),
        ];
        for task in stage.tasks {
            lines.push(Line::from(Span::styled(format!("  • {}", task), Theme::normal())));
        }

        lines.push(Line::from(vec![
            Span::styled("Irrigation: ", Theme::dim()),
            Span::styled(stage.irrigation, Theme::normal()),
        ]));
        if let Some(fert) = stage.fertilization {
            lines.push(Line::from(vec![
                Span::styled("Fertilization: ", Theme::dim()),
                Span::styled(fert, Theme::normal()),
            ]));
        }
        if !stage.pest_watch.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Watch for: ", Theme::dim()),
                Span::styled(stage.pest_watch.join(", "), Theme::warning()),
            ]));
        }
        if !stage.observations.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Observe: ", Theme::dim()),
                Span::styled(stage.observations.join(", "), Theme::normal()),
            ]));
        }
        if let Some(next) = self.next_stage {
            lines.push(Line::from(vec![
                Span::styled("Next: ", Theme::dim()),
                Span::styled(format!("{} {}", next.icon, next.stage_name), Theme::normal()),
                Span::styled(
                    format!(" in {} days", next.day_start - self.days),
                    Theme::dim(),
                ),
            ]));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }

    fn render_decision(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Decision", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(decision) = self.decision else {
            Paragraph::new(Span::styled("Waiting for sensor data", Theme::dim()))
                .render(inner, buf);
            return;
        };

        let irrigation_style = match decision.irrigation {
            IrrigationAction::Irrigate => Theme::warning(),
            IrrigationAction::DoNotIrrigate => Theme::success(),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(decision.irrigation.as_str(), irrigation_style),
                Span::styled("  ", Theme::dim()),
                Span::styled(decision.fertilization.as_str(), Theme::normal()),
            ]),
            Line::from(Span::styled(decision.explanation.as_str(), Theme::dim())),
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }

    fn render_controls(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Manual Controls", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let state = |running: bool| if running { "RUNNING" } else { "stopped" };
        let lines = vec![
            Line::from(vec![
                Span::styled("Irrigation:    ", Theme::dim()),
                Span::styled(
                    state(self.controls.irrigation_running),
                    Theme::running(self.controls.irrigation_running),
                ),
            ]),
            Line::from(vec![
                Span::styled("Fertilization: ", Theme::dim()),
                Span::styled(
                    state(self.controls.fertilization_running),
                    Theme::running(self.controls.fertilization_running),
                ),
            ]),
        ];
        Paragraph::new(lines).render(inner, buf);
    }

    fn render_api(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Farm API", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if !self.api_enabled {
            Paragraph::new(Span::styled("Disabled in config", Theme::dim())).render(inner, buf);
            return;
        }

        let mut lines = vec![Line::from(vec![
            Span::styled("Rain forecast: ", Theme::dim()),
            Span::styled(
                if self.rain_forecast { "yes" } else { "no" },
                Theme::normal(),
            ),
        ])];

        if let Some(kind) = self.pending {
            lines.push(Line::from(Span::styled(
                format!("Waiting for {} response...", kind),
                Theme::warning(),
            )));
        }

        match self.prediction {
            Some(p) => {
                lines.push(Line::from(vec![
                    Span::styled("Prediction: ", Theme::dim()),
                    Span::styled(p.final_decision.as_str(), Theme::highlight()),
                ]));
                if !p.explanation.is_empty() {
                    lines.push(Line::from(Span::styled(p.explanation.as_str(), Theme::dim())));
                }
            }
            None => lines.push(Line::from(Span::styled(
                "No prediction requested",
                Theme::dim(),
            ))),
        }

        for valve in self.valves {
            let style = if valve.is_open {
                Theme::success()
            } else {
                Theme::normal()
            };
            let mut spans = vec![
                Span::styled(format!("Valve {}: ", valve.valve_id), Theme::dim()),
                Span::styled(if valve.is_open { "open" } else { "closed" }, style),
            ];
            if let Some(mode) = &valve.mode {
                spans.push(Span::styled(format!(" ({})", mode), Theme::dim()));
            }
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }

    fn render_history(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Recent History", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if self.history.is_empty() {
            Paragraph::new(Span::styled("No actions recorded yet", Theme::dim()))
                .render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .history
            .iter()
            .rev()
            .take(inner.height as usize)
            .map(|entry| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        entry.timestamp.format("%m/%d %H:%M").to_string(),
                        Theme::dim(),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        entry.action_taken.as_str(),
                        Style::default().fg(entry.action_taken.color()),
                    ),
                    Span::raw(" "),
                    Span::styled(entry.ai_recommendation.as_str(), Theme::normal()),
                ]))
            })
            .collect();

        List::new(items).render(inner, buf);
    }
}
