pub mod control;
pub mod decision;
pub mod farm;
pub mod growth_stage;
pub mod health;
pub mod history;
pub mod prediction;
pub mod profile;
pub mod sensor;

pub use control::*;
pub use decision::*;
pub use farm::*;
pub use growth_stage::*;
pub use health::*;
pub use history::*;
pub use prediction::*;
pub use profile::*;
pub use sensor::*;
