//! Campaign data loading for Orbitline.
//!
//! A campaign directory holds `campaign.{ron,toml,json}` and, optionally,
//! `flow.{ron,toml,json}` with controller tuning. Exactly one format per
//! base name is allowed.

pub mod campaign;
pub mod loader;
pub mod schema;

pub use campaign::{Campaign, load_campaign, load_campaign_file, load_flow_config};
pub use loader::DataLoadError;
