//! CLI library components for the field mapper.

pub mod logging;
pub mod options;
pub mod pipeline;
