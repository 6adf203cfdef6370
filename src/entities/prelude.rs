pub use super::local_state::Entity as LocalState;
pub use super::metadata_cache::Entity as MetadataCache;
pub use super::override_episodes::Entity as OverrideEpisodes;
