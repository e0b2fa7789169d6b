pub mod commands;
pub mod output;
pub mod protocol;

pub use commands::{execute, CommandContext, CommandError};
pub use output::render;
pub use protocol::{CliCommand, Response};
