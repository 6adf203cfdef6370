pub mod catalog {

    /// Per-season episode counts are not fetched, so every declared season is
    /// assumed to hold this many episodes.
    pub const EPISODES_PER_SEASON: u32 = 20;
}

pub mod watch {

    pub const CONTINUE_WATCHING_CAPACITY: usize = 20;

    pub const CONTINUE_WATCHING_KEY: &str = "continueWatching";

    pub const MEDIA_TYPE_TV: &str = "tv";
}

pub mod limits {

    pub const MAX_RECOMMENDATIONS: usize = 20;
}
