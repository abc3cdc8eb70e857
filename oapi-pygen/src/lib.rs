mod analyzer;
mod client_writer;
pub mod config;
mod endpoints_writer;
pub mod format;
mod generator;
mod init_writer;
mod models_writer;
mod pointer;
pub mod python;
mod renamer;
pub mod spec;
mod template;

pub use analyzer::*;
pub use client_writer::*;
pub use endpoints_writer::*;
pub use generator::*;
pub use init_writer::*;
pub use models_writer::*;
pub use renamer::*;
pub use template::*;
