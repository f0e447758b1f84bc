pub mod event_log_layer;
pub mod event_log_store;
pub mod response;
