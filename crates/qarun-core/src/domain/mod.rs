//! Core domain model: statuses, step records, area rows, errors.

pub mod area;
pub mod error;
pub mod status;
pub mod step;

pub use area::{AreaCode, AreaResult};
pub use error::{QaError, Result};
pub use status::{Risk, Status};
pub use step::{find_step, StepKind, StepResult, NOT_EXECUTED_COMMAND};
