//! Orchestration of the actuarial input mapping pipeline.
//!
//! [`MappingEngine`] owns a loaded configuration and runs parse, validate,
//! map and assemble for each record it is given.

pub mod engine;
pub mod error;
pub mod options;
pub mod template;

pub use engine::{MappingEngine, PipelineOutcome};
pub use error::EngineError;
pub use options::ProcessOptions;
pub use template::assemble;
