//! Library side of the `aim` command-line tool.

pub mod batch;
pub mod logging;
