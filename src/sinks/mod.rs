/// Sink adapters
///
/// Narrow interfaces to the two downstream audio subsystems, injected into
/// the dispatcher so tests can substitute recording fakes:
///
/// ```text
/// Dispatcher
///   ├── SpatialSink   -> continuous position updates (/spat/serv)
///   └── PlaybackSink  -> discrete clip fire/stop triggers
/// ```
pub mod osc;

pub use osc::{OscPlaybackSink, OscSpatialSink};

use crate::error::SinkError;

/// One position update for the spatialization renderer
///
/// Produced per play/update event and consumed immediately; never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialUpdate {
    /// Renderer output channel (1-60)
    pub channel: u16,
    pub azimuth: f32,
    pub elevation: f32,
    pub radius: f32,
    pub horizontal_span: f32,
    pub vertical_span: f32,
}

/// Receiver of continuous 3D position updates
pub trait SpatialSink: Send + Sync {
    /// Forward one position update to the renderer
    fn send_update(&self, update: &SpatialUpdate) -> Result<(), SinkError>;

    /// Sink name (for logging)
    fn name(&self) -> &'static str {
        "spatial"
    }
}

/// Receiver of discrete clip triggers, addressed by track name + clip slot
pub trait PlaybackSink: Send + Sync {
    /// Start the clip in the given slot of the given track
    fn fire_clip(&self, target: &str, clip_index: usize) -> Result<(), SinkError>;

    /// Stop the clip in the given slot of the given track
    fn stop_clip(&self, target: &str, clip_index: usize) -> Result<(), SinkError>;

    /// Sink name (for logging)
    fn name(&self) -> &'static str {
        "playback"
    }
}
