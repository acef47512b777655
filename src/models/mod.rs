pub mod mood_log;
