//! `jdfmerge-recon`: entity merge and identifier-reconciliation engine.
//!
//! Pure engine crate: reads batch tables through a [`BatchSource`], returns
//! canonical tables plus a report. No filesystem or archive dependencies.

pub mod canonical;
pub mod carrier;
pub mod config;
pub mod error;
pub mod fixed_code;
pub mod line;
pub mod line_stop;
pub mod linker;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod schema;
pub mod stop;
pub mod writer;

pub use config::MergeConfig;
pub use error::MergeError;
pub use pipeline::{run, MergeOutput, OutputTable};
pub use reader::{BatchSource, ReferenceStop};
pub use report::{MergeIssue, MergeReport};
