//! CLI command handlers, one file per command.

mod convert;
mod formats;
mod status;

pub use convert::run_convert;
pub use formats::run_formats;
pub use status::run_status;
