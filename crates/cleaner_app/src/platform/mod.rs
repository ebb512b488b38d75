mod app;
mod cli;
mod console;
mod effects;
mod logging;
mod settings;

pub use app::run_app;
