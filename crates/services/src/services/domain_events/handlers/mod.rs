//! Platform job handlers.
//!
//! Each handler reacts to one (job, lifecycle event) pair. Handlers that
//! execute a job acknowledge it first and always leave it completed or
//! failed through `settle_job`.

mod mapped_fields_view;
mod mapping_completed;
mod space_configure;
mod submit;

pub use mapped_fields_view::MappedFieldsViewHandler;
pub use mapping_completed::{MAPPING_JOB_ID_INPUT, MappingCompletedHandler};
pub use space_configure::SpaceConfigureHandler;
pub use submit::SubmitHandler;

/// Progress reported when a handler acknowledges its job.
pub(crate) const ACK_PROGRESS: u8 = 10;
