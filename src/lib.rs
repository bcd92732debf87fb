//! spat-bridge: OSC sound-event router for an interactive installation.
//!
//! Bridges a `/sound/*` trigger stream into two downstream audio
//! subsystems: a spatialization renderer (continuous 3D position updates)
//! and a clip playback engine (discrete fire/stop triggers by track and
//! clip slot).
//!
//! ```text
//! OSC in (UDP) -> OscListener -> record batches -> Dispatcher
//!                                                    ├── SoundRegistry (who is this sound?)
//!                                                    ├── ActiveSounds  (is it already playing?)
//!                                                    ├── SpatialSink   (/spat/serv)
//!                                                    └── PlaybackSink  (/clip/fire, /clip/stop)
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod listener;
pub mod parser;
pub mod registry;
pub mod sinks;
pub mod stats;
pub mod tracker;

pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::AppResult;
pub use listener::OscListener;
pub use parser::{ParsedRecord, SoundAction, SoundEvent, SpatialPosition};
pub use registry::{Category, ExclusivityPolicy, RegistryTables, SoundProfile, SoundRegistry};
pub use sinks::{OscPlaybackSink, OscSpatialSink, PlaybackSink, SpatialSink, SpatialUpdate};
pub use stats::RouterStats;
pub use tracker::ActiveSounds;
