pub mod assistant;
pub mod panel;
