pub mod availability;
pub mod tmdb;
