pub mod cli;
pub mod planner;
pub mod ui;
