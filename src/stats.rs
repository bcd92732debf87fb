/// Router statistics
///
/// Purely observational counters over the dispatch path. Never affects
/// control flow.

/// Counters accumulated over the life of the process
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouterStats {
    /// Records drained from the feed, valid or not
    pub records: u64,

    /// Records dropped as malformed or with an unrecognized action
    pub parse_errors: u64,

    /// Records dropped because the identifier is not registered
    pub unknown_sounds: u64,

    /// Legacy "music" placeholder records accepted and discarded
    pub legacy_music: u64,

    /// Position updates forwarded to the spatialization renderer
    pub spatial_updates: u64,

    pub clips_fired: u64,
    pub clips_stopped: u64,

    /// Stops for sounds that were not active (no-ops)
    pub redundant_stops: u64,

    /// Downstream sink calls that failed
    pub sink_errors: u64,
}

impl RouterStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that produced no downstream call at all
    pub fn dropped(&self) -> u64 {
        self.parse_errors + self.unknown_sounds + self.legacy_music
    }

    /// Log a summary of everything routed so far
    pub fn report(&self) {
        tracing::info!(
            "processed {} records ({} dropped: {} malformed, {} unknown, {} legacy)",
            self.records,
            self.dropped(),
            self.parse_errors,
            self.unknown_sounds,
            self.legacy_music,
        );
        tracing::info!(
            "sent {} spatial updates, fired {} clips, stopped {} clips ({} redundant stops, {} sink errors)",
            self.spatial_updates,
            self.clips_fired,
            self.clips_stopped,
            self.redundant_stops,
            self.sink_errors,
        );
    }
}
