//! flowanon command-line support: logging setup, exit codes and input
//! handling shared by the `flowanon` binary and its tests.

pub mod exit_codes;
pub mod input;
pub mod logging;

pub use exit_codes::ExitCode;
pub use input::{FieldResult, InputError, RecordResult};
