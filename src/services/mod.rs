pub mod analytics;
pub mod flow;
pub mod identity;
