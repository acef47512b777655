pub mod memory;
pub mod mood_logs;
pub mod pool;

pub use memory::MemoryMoodLogStore;
pub use mood_logs::{MoodLogStore, PgMoodLogStore};
pub use pool::create_pool;
