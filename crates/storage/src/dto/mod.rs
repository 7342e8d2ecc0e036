pub mod heat;
pub mod leaderboard;
pub mod recompute;
pub mod scoring;
