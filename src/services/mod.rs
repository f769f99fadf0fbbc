pub mod assistant;
pub mod conversation;
