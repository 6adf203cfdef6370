pub mod metadata_cache;
pub mod overrides;
pub mod state;
