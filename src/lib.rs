pub mod canvas;
pub mod config;
pub mod constants;
pub mod errors;
pub mod generator;
pub mod models;
pub mod pipeline;
pub mod run_state;
pub mod storyboard;

#[cfg(test)]
pub mod test_utils;
