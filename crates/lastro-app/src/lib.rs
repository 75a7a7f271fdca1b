// lastro - command line front end for the Lastro archive search
pub mod app;
pub mod cli;
pub mod config;

pub use cli::{Cli, Commands, ConsentChoice};
pub use config::{ConsentRecord, ConsentStore};
