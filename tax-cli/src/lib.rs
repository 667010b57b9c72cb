pub mod config;
pub mod logging;
pub mod report;
pub mod terminal;
pub mod utils;
