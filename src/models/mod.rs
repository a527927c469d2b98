pub mod hackathon;
pub mod leaderboard;
pub mod organization;
pub mod task;
pub mod user;
