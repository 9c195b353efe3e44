pub mod ai;
pub mod auth;
pub mod checkins;
pub mod friends;
pub mod goals;
pub mod health;
