pub mod day_window;
pub mod models;
pub mod payload;
pub mod run_state;
