pub mod prelude;

pub mod local_state;
pub mod metadata_cache;
pub mod override_episodes;
