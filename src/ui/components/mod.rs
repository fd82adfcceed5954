pub mod gauge;
pub mod input;

pub use gauge::{humidity_gauge, moisture_gauge, npk_gauge, ph_gauge, temperature_gauge};
pub use input::{InputWidget, SelectWidget};
