use crate::config::Config;
use crate::datasources::FarmApiClient;
use crate::error::{FieldOpsError, Result};
use crate::logic::requests::dispatch;
use crate::logic::{
    ApiCall, ApiEvent, ApiReply, CropMonitor, RequestTracker, SensorSimulator, SensorSubscription,
};
use crate::models::{
    Crop, Farm, Feedback, NewCrop, NewFarm, PredictionRequest, PredictionResponse, ValveOverride,
    ValveStatus, ValveToggle,
};
use crate::store::AppStore;
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Minutes a manual valve override holds before the controller resumes.
const VALVE_OVERRIDE_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    CropDetail,
    History,
    Register,
    Schemes,
    SensorSetup,
}

impl Screen {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Screen::Dashboard),
            '2' => Some(Screen::Register),
            '3' => Some(Screen::Schemes),
            '4' => Some(Screen::SensorSetup),
            _ => None,
        }
    }
}

pub struct DashboardState {
    pub selected_index: usize,
}

impl DashboardState {
    pub fn new() -> Self {
        Self { selected_index: 0 }
    }

    pub fn next(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }
}

pub struct HistoryState {
    pub scroll: usize,
}

impl HistoryState {
    pub fn new() -> Self {
        Self { scroll: 0 }
    }

    pub fn down(&mut self, max: usize) {
        if max > 0 && self.scroll < max - 1 {
            self.scroll += 1;
        }
    }

    pub fn up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Farm,
    Crop,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Farm => "Farm",
            FormKind::Crop => "Crop",
        }
    }

    pub fn fields(&self) -> &'static [RegisterField] {
        match self {
            FormKind::Farm => &[
                RegisterField::FarmName,
                RegisterField::Location,
                RegisterField::FarmArea,
            ],
            FormKind::Crop => &[
                RegisterField::CropFarm,
                RegisterField::CropName,
                RegisterField::CropType,
                RegisterField::PlantedOn,
                RegisterField::CropArea,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterField {
    FarmName,
    Location,
    FarmArea,
    CropFarm,
    CropName,
    CropType,
    PlantedOn,
    CropArea,
}

impl RegisterField {
    pub fn label(&self) -> &'static str {
        match self {
            RegisterField::FarmName => "Farm Name",
            RegisterField::Location => "Location",
            RegisterField::FarmArea => "Area (acres)",
            RegisterField::CropFarm => "Farm",
            RegisterField::CropName => "Crop Name",
            RegisterField::CropType => "Crop Type",
            RegisterField::PlantedOn => "Planted On (YYYY-MM-DD)",
            RegisterField::CropArea => "Area (acres)",
        }
    }

    /// Select fields cycle with Left/Right instead of taking text.
    pub fn is_select(&self) -> bool {
        matches!(self, RegisterField::CropFarm)
    }
}

pub struct RegisterState {
    pub kind: FormKind,
    pub focus: usize,
    pub editing: bool,
    pub edit_buffer: String,
    pub farm_index: usize,
    values: HashMap<RegisterField, String>,
}

impl RegisterState {
    pub fn new() -> Self {
        let mut state = Self {
            kind: FormKind::Farm,
            focus: 0,
            editing: false,
            edit_buffer: String::new(),
            farm_index: 0,
            values: HashMap::new(),
        };
        state.reset_values();
        state
    }

    pub fn focused_field(&self) -> RegisterField {
        let fields = self.kind.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn value(&self, field: RegisterField) -> &str {
        self.values.get(&field).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn set_value(&mut self, field: RegisterField, value: &str) {
        self.values.insert(field, value.to_string());
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.kind.fields().len();
    }

    pub fn prev_field(&mut self) {
        let len = self.kind.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn toggle_kind(&mut self) {
        self.kind = match self.kind {
            FormKind::Farm => FormKind::Crop,
            FormKind::Crop => FormKind::Farm,
        };
        self.focus = 0;
        self.cancel_editing();
    }

    pub fn cycle_farm(&mut self, forward: bool, farm_count: usize) {
        if farm_count == 0 {
            return;
        }
        self.farm_index = if forward {
            (self.farm_index + 1) % farm_count
        } else {
            (self.farm_index + farm_count - 1) % farm_count
        };
    }

    pub fn start_editing(&mut self) {
        let field = self.focused_field();
        if field.is_select() {
            return;
        }
        self.edit_buffer = self.value(field).to_string();
        self.editing = true;
    }

    pub fn cancel_editing(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    pub fn finish_editing(&mut self) {
        let field = self.focused_field();
        let value = std::mem::take(&mut self.edit_buffer);
        self.values.insert(field, value);
        self.editing = false;
    }

    pub fn reset_values(&mut self) {
        self.values.clear();
        self.values.insert(RegisterField::CropType, "Maize".to_string());
        self.values.insert(
            RegisterField::PlantedOn,
            Local::now().date_naive().format("%Y-%m-%d").to_string(),
        );
    }

    pub fn to_new_farm(&self) -> Result<NewFarm> {
        let mut farm = NewFarm::new(self.value(RegisterField::FarmName).trim());
        let location = self.value(RegisterField::Location).trim();
        if !location.is_empty() {
            farm = farm.with_location(location);
        }
        if let Some(area) = parse_area(self.value(RegisterField::FarmArea))? {
            farm = farm.with_area(area);
        }
        Ok(farm)
    }

    pub fn to_new_crop(&self, farms: &[Farm]) -> Result<NewCrop> {
        let farm = farms
            .get(self.farm_index)
            .ok_or_else(|| FieldOpsError::InvalidData("Register a farm first".into()))?;
        let planted_on = parse_date(self.value(RegisterField::PlantedOn))?;

        let mut crop = NewCrop::new(
            farm.id,
            self.value(RegisterField::CropName).trim(),
            self.value(RegisterField::CropType).trim(),
            planted_on,
        );
        if let Some(area) = parse_area(self.value(RegisterField::CropArea))? {
            crop = crop.with_area(area);
        }
        Ok(crop)
    }
}

fn parse_area(value: &str) -> Result<Option<f64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(area) if area > 0.0 => Ok(Some(area)),
        _ => Err(FieldOpsError::InvalidData(
            "Area must be a positive number".into(),
        )),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| FieldOpsError::InvalidData("Planting date must be YYYY-MM-DD".into()))
}

pub struct SchemesState {
    pub selected_index: usize,
}

impl SchemesState {
    pub fn new() -> Self {
        Self { selected_index: 0 }
    }

    pub fn next(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }
}

/// State behind the crop detail screen. Exists only while that screen is
/// open.
pub struct CropView {
    pub crop_id: i64,
    pub monitor: Option<CropMonitor>,
    pub prediction: Option<PredictionResponse>,
    pub valves: Vec<ValveStatus>,
    pub rain_forecast: bool,
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub config: Config,
    pub store: AppStore,

    // Farm API
    pub api: Option<Arc<FarmApiClient>>,
    pub tracker: RequestTracker,
    api_tx: mpsc::UnboundedSender<ApiEvent>,
    api_rx: mpsc::UnboundedReceiver<ApiEvent>,

    // Screen states
    pub dashboard_state: DashboardState,
    pub register_state: RegisterState,
    pub history_state: HistoryState,
    pub schemes_state: SchemesState,
    pub crop_view: Option<CropView>,
    pub history_crop: Option<i64>,

    // UI state
    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    pub fn new(config: Config, mut store: AppStore) -> Result<Self> {
        let api = if config.api.enabled {
            Some(Arc::new(FarmApiClient::new(config.api.clone())?))
        } else {
            tracing::info!("Farm API disabled in config");
            None
        };

        store.set_profile(config.profile.clone());

        let mut dashboard_state = DashboardState::new();
        if let Some(last) = store.last_crop_id() {
            if let Some(index) = store.crops().iter().position(|c| c.id == last) {
                dashboard_state.selected_index = index;
            }
        }

        let (api_tx, api_rx) = mpsc::unbounded_channel();

        Ok(Self {
            screen: Screen::Dashboard,
            should_quit: false,
            config,
            store,
            api,
            tracker: RequestTracker::new(),
            api_tx,
            api_rx,
            dashboard_state,
            register_state: RegisterState::new(),
            history_state: HistoryState::new(),
            schemes_state: SchemesState::new(),
            crop_view: None,
            history_crop: None,
            status_message: None,
            error_message: None,
        })
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        if self.screen == Screen::CropDetail && screen != Screen::CropDetail {
            self.detach_crop();
        }
        self.screen = screen;
    }

    pub fn quit(&mut self) {
        self.detach_crop();
        self.should_quit = true;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
        self.error_message = None;
    }

    pub fn set_error(&mut self, message: &str) {
        tracing::warn!("{}", message);
        self.error_message = Some(message.to_string());
    }

    pub fn is_editing(&self) -> bool {
        self.screen == Screen::Register && self.register_state.editing
    }

    pub fn selected_crop(&self) -> Option<&Crop> {
        self.store.crops().get(self.dashboard_state.selected_index)
    }

    // Crop attachment

    pub fn attached_crop(&self) -> Option<i64> {
        self.crop_view
            .as_ref()
            .and_then(|v| v.monitor.as_ref())
            .map(|m| m.crop_id())
    }

    pub fn open_selected_crop(&mut self) {
        match self.selected_crop().map(|c| c.id) {
            Some(id) => self.open_crop(id),
            None => self.set_status("No crops registered yet - press 2 to add one"),
        }
    }

    /// Show the detail screen for `crop_id`, starting its sensor feed.
    ///
    /// An unknown id still opens the screen with a placeholder crop and no
    /// feed.
    pub fn open_crop(&mut self, crop_id: i64) {
        self.detach_crop();

        let monitor = match self.store.get_crop(crop_id).cloned() {
            Some(crop) => {
                let simulator = SensorSimulator::new(&crop.crop_type);
                let (initial, subscription) = SensorSubscription::spawn(
                    crop.id,
                    simulator,
                    self.config.sensors.refresh_interval(),
                );
                match CropMonitor::attach(&crop, &mut self.store, initial, subscription) {
                    Ok(monitor) => Some(monitor),
                    Err(e) => {
                        self.set_error(&format!("Failed to start sensor feed: {}", e));
                        None
                    }
                }
            }
            None => {
                tracing::warn!(crop_id, "Opening crop view for unknown crop");
                None
            }
        };

        if monitor.is_some() {
            if let Err(e) = self.store.remember_crop(crop_id) {
                tracing::warn!("Failed to remember last crop: {}", e);
            }
        }

        self.crop_view = Some(CropView {
            crop_id,
            monitor,
            prediction: None,
            valves: Vec::new(),
            rain_forecast: false,
        });
        self.screen = Screen::CropDetail;
    }

    /// Stop the sensor feed and drop any in-flight API request.
    pub fn detach_crop(&mut self) {
        if let Some(mut view) = self.crop_view.take() {
            if let Some(monitor) = view.monitor.as_mut() {
                monitor.detach();
            }
        }
        self.tracker.cancel();
    }

    pub fn open_history(&mut self) {
        let crop_id = self
            .crop_view
            .as_ref()
            .map(|v| v.crop_id)
            .or_else(|| self.selected_crop().map(|c| c.id));

        if let Some(id) = crop_id {
            self.history_crop = Some(id);
            self.history_state = HistoryState::new();
            self.switch_screen(Screen::History);
        }
    }

    /// Per-frame work: apply sensor readings and API responses.
    pub fn tick(&mut self) {
        self.poll_sensors();
        self.drain_api_events();
    }

    fn poll_sensors(&mut self) {
        let result = match self.crop_view.as_mut().and_then(|v| v.monitor.as_mut()) {
            Some(monitor) => monitor.poll(&mut self.store),
            None => return,
        };
        if let Err(e) = result {
            self.set_error(&format!("Failed to record sensor reading: {}", e));
        }
    }

    // Manual controls

    pub fn toggle_irrigation(&mut self) {
        let result = match self.crop_view.as_mut().and_then(|v| v.monitor.as_mut()) {
            Some(monitor) => monitor.handle_irrigation(&mut self.store),
            None => return,
        };
        match result {
            Ok(true) => self.set_status("Irrigation started"),
            Ok(false) => self.set_status("Irrigation stopped"),
            Err(e) => self.set_error(&format!("Irrigation toggle failed: {}", e)),
        }
    }

    pub fn toggle_fertilization(&mut self) {
        let result = match self.crop_view.as_mut().and_then(|v| v.monitor.as_mut()) {
            Some(monitor) => monitor.handle_fertilization(&mut self.store),
            None => return,
        };
        match result {
            Ok(true) => self.set_status("Fertilization started"),
            Ok(false) => self.set_status("Fertilization stopped"),
            Err(e) => self.set_error(&format!("Fertilization toggle failed: {}", e)),
        }
    }

    pub fn toggle_rain_forecast(&mut self) {
        if let Some(view) = self.crop_view.as_mut() {
            view.rain_forecast = !view.rain_forecast;
        }
    }

    // Farm API requests

    pub fn request_prediction(&mut self) {
        let request = self.crop_view.as_ref().and_then(|view| {
            view.monitor
                .as_ref()
                .and_then(|m| m.latest_snapshot())
                .map(|s| PredictionRequest::from_snapshot(s, view.rain_forecast))
        });
        match request {
            Some(request) => self.request(ApiCall::Predict(request)),
            None => self.set_error("No sensor reading yet"),
        }
    }

    pub fn send_feedback(&mut self, helpful: bool) {
        let feedback = self.crop_view.as_ref().and_then(|view| {
            view.prediction.as_ref().map(|p| Feedback {
                crop_id: view.crop_id,
                final_decision: p.final_decision.clone(),
                helpful,
                comment: None,
            })
        });
        match feedback {
            Some(feedback) => self.request(ApiCall::Feedback(feedback)),
            None => self.set_error("Request a prediction before sending feedback"),
        }
    }

    pub fn refresh_valves(&mut self) {
        self.request(ApiCall::ListValves);
    }

    pub fn toggle_valve(&mut self) {
        let toggle = self.first_valve().map(|(crop_id, valve)| ValveToggle {
            valve_id: valve.valve_id.clone(),
            crop_id,
            open: !valve.is_open,
        });
        match toggle {
            Some(toggle) => self.request(ApiCall::ToggleValve(toggle)),
            None => self.set_error("No valves loaded - press v to fetch them"),
        }
    }

    pub fn override_valve(&mut self) {
        let valve_override = self.first_valve().map(|(crop_id, valve)| ValveOverride {
            valve_id: valve.valve_id.clone(),
            crop_id,
            open: !valve.is_open,
            duration_minutes: Some(VALVE_OVERRIDE_MINUTES),
        });
        match valve_override {
            Some(o) => self.request(ApiCall::OverrideValve(o)),
            None => self.set_error("No valves loaded - press v to fetch them"),
        }
    }

    fn first_valve(&self) -> Option<(i64, &ValveStatus)> {
        self.crop_view
            .as_ref()
            .and_then(|v| v.valves.first().map(|valve| (v.crop_id, valve)))
    }

    fn request(&mut self, call: ApiCall) {
        let Some(client) = self.api.clone() else {
            self.set_error("Farm API is disabled in config");
            return;
        };
        let Some(crop_id) = self.attached_crop() else {
            self.set_error("No crop attached");
            return;
        };

        let kind = call.kind();
        match self.tracker.begin(kind, crop_id) {
            Some(ticket) => {
                dispatch(client, ticket, call, self.api_tx.clone());
                self.set_status(&format!("Sending {} request...", kind));
            }
            None => self.set_status("Another request is still in progress"),
        }
    }

    pub fn drain_api_events(&mut self) {
        while let Ok(event) = self.api_rx.try_recv() {
            self.apply_api_event(event);
        }
    }

    pub fn apply_api_event(&mut self, event: ApiEvent) {
        let ApiEvent { ticket, result } = event;

        if !self.tracker.complete(ticket.id, self.attached_crop()) {
            tracing::debug!(ticket = ticket.id, kind = %ticket.kind, "Discarding stale response");
            return;
        }
        let Some(view) = self.crop_view.as_mut() else {
            return;
        };

        match result {
            Ok(ApiReply::Prediction(prediction)) => {
                let message = format!("Prediction: {}", prediction.final_decision);
                view.prediction = Some(prediction);
                self.set_status(&message);
            }
            Ok(ApiReply::FeedbackSent) => self.set_status("Feedback sent, thank you"),
            Ok(ApiReply::Valves(valves)) => {
                let message = format!("{} valve(s) loaded", valves.len());
                view.valves = valves;
                self.set_status(&message);
            }
            Ok(ApiReply::ValveUpdated(valve)) => {
                let message = format!(
                    "Valve {} {}",
                    valve.valve_id,
                    if valve.is_open { "opened" } else { "closed" }
                );
                match view.valves.iter_mut().find(|v| v.valve_id == valve.valve_id) {
                    Some(existing) => *existing = valve,
                    None => view.valves.push(valve),
                }
                self.set_status(&message);
            }
            Err(e) => self.set_error(&format!("{} request failed: {}", ticket.kind, e)),
        }
    }

    // Registration

    pub fn submit_registration(&mut self) {
        let result = match self.register_state.kind {
            FormKind::Farm => self
                .register_state
                .to_new_farm()
                .and_then(|farm| self.store.add_farm(farm)),
            FormKind::Crop => self
                .register_state
                .to_new_crop(self.store.farms())
                .and_then(|crop| self.store.add_crop(crop)),
        };

        match result {
            Ok(_) => {
                let message = format!("{} registered", self.register_state.kind.as_str());
                self.register_state.reset_values();
                self.set_status(&message);
            }
            Err(e) => self.set_error(&e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::logic::RequestKind;
    use crate::models::ActionTaken;

    fn test_app() -> App {
        let store = AppStore::load(Database::open_in_memory().unwrap()).unwrap();
        let mut config = Config::default();
        config.api.url = "http://127.0.0.1:9".into();
        App::new(config, store).unwrap()
    }

    fn seed_crop(app: &mut App) -> i64 {
        let farm_id = app.store.add_farm(NewFarm::new("Farm")).unwrap();
        let planted = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        app.store
            .add_crop(NewCrop::new(farm_id, "Plot", "Maize", planted))
            .unwrap()
    }

    fn valve(id: &str, open: bool) -> ValveStatus {
        ValveStatus {
            valve_id: id.to_string(),
            crop_id: None,
            is_open: open,
            mode: None,
        }
    }

    #[test]
    fn farm_form_builds_payload() {
        let mut form = RegisterState::new();
        form.set_value(RegisterField::FarmName, " Riverside ");
        form.set_value(RegisterField::FarmArea, "12.5");
        let farm = form.to_new_farm().unwrap();
        assert_eq!(farm.name, "Riverside");
        assert_eq!(farm.area_acres, Some(12.5));
        assert!(farm.location.is_none());
    }

    #[test]
    fn form_rejects_bad_area_and_date() {
        let mut form = RegisterState::new();
        form.set_value(RegisterField::FarmArea, "-3");
        assert!(form.to_new_farm().is_err());

        let farms = vec![Farm::placeholder(1)];
        form.toggle_kind();
        form.set_value(RegisterField::PlantedOn, "06/01/2024");
        assert!(form.to_new_crop(&farms).is_err());
    }

    #[test]
    fn crop_form_needs_a_farm() {
        let form = RegisterState::new();
        assert!(matches!(
            form.to_new_crop(&[]),
            Err(FieldOpsError::InvalidData(_))
        ));
    }

    #[test]
    fn crop_form_uses_selected_farm() {
        let mut form = RegisterState::new();
        form.toggle_kind();
        form.cycle_farm(true, 2);
        form.set_value(RegisterField::CropName, "North");
        form.set_value(RegisterField::PlantedOn, "2024-03-15");

        let farms = vec![Farm::placeholder(1), Farm::placeholder(2)];
        let crop = form.to_new_crop(&farms).unwrap();
        assert_eq!(crop.farm_id, 2);
        assert_eq!(crop.crop_type, "Maize");
        assert_eq!(
            crop.planted_on,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn editing_writes_back_on_finish() {
        let mut form = RegisterState::new();
        form.start_editing();
        form.edit_buffer.push_str("Hilltop");
        form.finish_editing();
        assert_eq!(form.value(RegisterField::FarmName), "Hilltop");
        assert!(!form.editing);

        // Select fields never enter text editing
        form.toggle_kind();
        assert_eq!(form.focused_field(), RegisterField::CropFarm);
        form.start_editing();
        assert!(!form.editing);
    }

    #[tokio::test]
    async fn leaving_crop_view_detaches_and_cancels() {
        let mut app = test_app();
        let crop_id = seed_crop(&mut app);

        app.open_crop(crop_id);
        assert_eq!(app.screen, Screen::CropDetail);
        assert_eq!(app.attached_crop(), Some(crop_id));

        let ticket = app.tracker.begin(RequestKind::ValveList, crop_id).unwrap();
        app.switch_screen(Screen::Dashboard);
        assert!(app.crop_view.is_none());
        assert!(!app.tracker.is_busy());

        // A late response for the old view changes nothing
        app.apply_api_event(ApiEvent {
            ticket,
            result: Ok(ApiReply::Valves(vec![valve("v1", false)])),
        });
        assert!(app.crop_view.is_none());
    }

    #[tokio::test]
    async fn current_response_is_applied() {
        let mut app = test_app();
        let crop_id = seed_crop(&mut app);
        app.open_crop(crop_id);

        let ticket = app.tracker.begin(RequestKind::ValveList, crop_id).unwrap();
        app.apply_api_event(ApiEvent {
            ticket,
            result: Ok(ApiReply::Valves(vec![valve("v1", false)])),
        });
        let ticket = app.tracker.begin(RequestKind::ValveToggle, crop_id).unwrap();
        app.apply_api_event(ApiEvent {
            ticket,
            result: Ok(ApiReply::ValveUpdated(valve("v1", true))),
        });

        let view = app.crop_view.as_ref().unwrap();
        assert_eq!(view.valves.len(), 1);
        assert!(view.valves[0].is_open);
        assert!(!app.tracker.is_busy());
    }

    #[tokio::test]
    async fn failed_request_keeps_previous_state() {
        let mut app = test_app();
        let crop_id = seed_crop(&mut app);
        app.open_crop(crop_id);

        let ticket = app.tracker.begin(RequestKind::ValveList, crop_id).unwrap();
        app.apply_api_event(ApiEvent {
            ticket,
            result: Ok(ApiReply::Valves(vec![valve("v1", false)])),
        });
        let ticket = app.tracker.begin(RequestKind::ValveList, crop_id).unwrap();
        app.apply_api_event(ApiEvent {
            ticket,
            result: Err(FieldOpsError::ApiUnavailable("timed out".into())),
        });

        assert_eq!(app.crop_view.as_ref().unwrap().valves.len(), 1);
        assert!(app.error_message.is_some());
    }

    #[tokio::test]
    async fn manual_toggle_from_crop_view_logs_history() {
        let mut app = test_app();
        let crop_id = seed_crop(&mut app);
        app.open_crop(crop_id);
        assert!(app.store.crop_history(crop_id).is_empty());

        app.toggle_irrigation();
        assert!(app.store.controls(crop_id).irrigation_running);
        let history = app.store.crop_history(crop_id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action_taken, ActionTaken::Irrigation);
    }

    #[tokio::test]
    async fn unknown_crop_opens_without_feed() {
        let mut app = test_app();
        app.open_crop(42);
        assert_eq!(app.screen, Screen::CropDetail);
        assert!(app.attached_crop().is_none());
        assert_eq!(app.crop_view.as_ref().unwrap().crop_id, 42);
    }

    #[tokio::test]
    async fn requests_need_an_enabled_api() {
        let store = AppStore::load(Database::open_in_memory().unwrap()).unwrap();
        let mut config = Config::default();
        config.api.enabled = false;
        let mut app = App::new(config, store).unwrap();
        let crop_id = seed_crop(&mut app);
        app.open_crop(crop_id);

        app.refresh_valves();
        assert!(!app.tracker.is_busy());
        assert!(app.error_message.is_some());
    }

    #[tokio::test]
    async fn submit_registration_adds_farm() {
        let mut app = test_app();
        app.register_state
            .set_value(RegisterField::FarmName, "Hilltop");
        app.submit_registration();
        assert_eq!(app.store.farms().len(), 1);
        assert_eq!(app.register_state.value(RegisterField::FarmName), "");
    }
}
