pub mod crop_monitor;
pub mod decision;
pub mod history_logger;
pub mod info;
pub mod requests;
pub mod sensor_feed;
pub mod stage_resolver;
pub mod stage_table;

pub use crop_monitor::CropMonitor;
pub use requests::{ApiCall, ApiEvent, ApiReply, RequestKind, RequestTracker};
pub use sensor_feed::{SensorSimulator, SensorSubscription};
pub use stage_resolver::resolve_stage;
