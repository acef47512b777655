pub mod analytics;
pub mod chat;
pub mod health;
pub mod logs;

#[cfg(test)]
pub mod test_support;
