pub mod config;
pub mod domain_events;
pub mod field_visibility;
pub mod platform;
pub mod schema;
pub mod webhook;
