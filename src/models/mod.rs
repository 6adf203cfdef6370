pub mod catalog;
pub mod series;
pub mod source;
pub mod watch;
