pub mod heat_scheduler;
pub mod leaderboard;
pub mod pipeline;
pub mod ranking;
pub mod result_normalizer;
pub mod timetable;
