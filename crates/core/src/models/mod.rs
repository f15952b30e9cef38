pub mod cache_entry;
pub mod display;
pub mod holding;
pub mod settings;
pub mod snapshot;
