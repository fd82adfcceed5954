pub mod farm_api;

pub use farm_api::FarmApiClient;
