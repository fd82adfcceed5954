use crate::app::{FormKind, RegisterField, RegisterState};
use crate::logic::stage_table::KNOWN_CROP_TYPES;
use crate::ui::components::{InputWidget, SelectWidget};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct RegisterScreen<'a> {
    pub form: &'a RegisterState,
    pub farm_names: &'a [String],
    pub status_message: Option<&'a str>,
    pub error_message: Option<&'a str>,
}

impl<'a> RegisterScreen<'a> {
    pub fn new(form: &'a RegisterState, farm_names: &'a [String]) -> Self {
        Self {
            form,
            farm_names,
            status_message: None,
            error_message: None,
        }
    }

    pub fn with_status(mut self, status: Option<&'a str>, error: Option<&'a str>) -> Self {
        self.status_message = status;
        self.error_message = error;
        self
    }

    fn help_text(&self) -> String {
        match self.form.focused_field() {
            RegisterField::FarmName => "Name of the farm (required)".to_string(),
            RegisterField::Location => "Village, district or coordinates".to_string(),
            RegisterField::FarmArea | RegisterField::CropArea => {
                "Area in acres, leave blank if unknown".to_string()
            }
            RegisterField::CropFarm => "Use Left/Right to pick the farm".to_string(),
            RegisterField::CropName => "Name of the plot or field (required)".to_string(),
            RegisterField::CropType => format!(
                "Known types: {}. Other types use generic stages.",
                KNOWN_CROP_TYPES.join(", ")
            ),
            RegisterField::PlantedOn => "Sowing date as YYYY-MM-DD".to_string(),
        }
    }
}

impl Widget for RegisterScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let field_count = self.form.kind.fields().len() as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                   // Title
                Constraint::Length(field_count * 3 + 2), // Form
                Constraint::Length(4),                   // Help
                Constraint::Min(0),
                Constraint::Length(1), // Status
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Register", Theme::title()),
            Span::styled(format!(" - New {}", self.form.kind.as_str()), Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_form(chunks[1], buf);

        let help_block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let help_inner = help_block.inner(chunks[2]);
        help_block.render(chunks[2], buf);
        Paragraph::new(Span::styled(self.help_text(), Theme::dim()))
            .wrap(Wrap { trim: true })
            .render(help_inner, buf);

        super::render_status_line(chunks[4], buf, self.status_message, self.error_message);

        let nav = if self.form.editing {
            super::nav_line(&[("[Enter]", "Done "), ("[Esc]", "Cancel")])
        } else {
            super::nav_line(&[
                ("[↑↓]", "Navigate "),
                ("[Enter]", "Edit "),
                ("[t]", "Farm/Crop "),
                ("[Ctrl+S]", "Save "),
                ("[Esc]", "Back"),
            ])
        };
        Paragraph::new(nav).render(chunks[5], buf);
    }
}

impl RegisterScreen<'_> {
    fn render_form(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(match self.form.kind {
                FormKind::Farm => "Farm Details",
                FormKind::Crop => "Crop Details",
            })
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let fields = self.form.kind.fields();
        let constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
        let field_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let focused = self.form.focused_field();
        for (i, field) in fields.iter().enumerate() {
            let is_focused = *field == focused;

            if field.is_select() {
                SelectWidget::new(field.label(), self.farm_names, self.form.farm_index)
                    .empty_text("No farms yet - register one first")
                    .focused(is_focused)
                    .render(field_areas[i], buf);
                continue;
            }

            let editing = is_focused && self.form.editing;
            let value = if editing {
                self.form.edit_buffer.as_str()
            } else {
                self.form.value(*field)
            };

            InputWidget::new(field.label(), value)
                .placeholder("-")
                .focused(is_focused)
                .editing(editing)
                .render(field_areas[i], buf);
        }
    }
}
