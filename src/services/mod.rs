pub mod availability;
pub use availability::{AvailabilityCheck, AvailabilityProbe, ProbeOutcome, ProbeResult};

pub mod catalog;
pub use catalog::EpisodeCatalogBuilder;

pub mod metadata;
pub use metadata::{CachedMetadata, MetadataProvider};

pub mod resolution;
pub use resolution::{PlaybackResolver, Resolution, ResolutionState};

pub mod series;
pub use series::{SeriesError, SeriesView, SeriesViewService};

pub mod sources;
pub use sources::SourceSelector;

pub mod watch_state;
pub use watch_state::{WatchStateError, WatchStateStore};
