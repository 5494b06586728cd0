//! Download CodeJudger exercises into a local directory tree: problem
//! descriptions as markdown, sample fixtures and starter files.

pub mod api;
pub mod config;
pub mod exercises;
pub mod materialize;
pub mod telemetry;

pub use materialize::materialize;
