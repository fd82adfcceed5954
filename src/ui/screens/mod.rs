pub mod crop_detail;
pub mod dashboard;
pub mod history;
pub mod register;
pub mod schemes;
pub mod sensor_setup;

pub use crop_detail::CropDetailScreen;
pub use dashboard::DashboardScreen;
pub use history::HistoryScreen;
pub use register::RegisterScreen;
pub use schemes::SchemesScreen;
pub use sensor_setup::SensorSetupScreen;

use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Key hint bar: each pair is the key and its label.
fn nav_line<'a>(items: &[(&'a str, &'a str)]) -> Line<'a> {
    let spans: Vec<Span> = items
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, Theme::nav_key()),
                Span::styled(*label, Theme::nav_label()),
            ]
        })
        .collect();
    Line::from(spans)
}

/// Errors take precedence over status messages.
fn render_status_line(area: Rect, buf: &mut Buffer, status: Option<&str>, error: Option<&str>) {
    let span = match (error, status) {
        (Some(err), _) => Span::styled(err, Theme::error()),
        (None, Some(msg)) => Span::styled(msg, Theme::success()),
        (None, None) => return,
    };
    Paragraph::new(span).render(area, buf);
}
