pub mod render;
pub mod repl;
pub mod setup;
pub mod task;

pub use repl::run_repl_mode;
pub use setup::{init_logging, setup_from_cli, AppConfig};
pub use task::{run_command, run_query_mode};
