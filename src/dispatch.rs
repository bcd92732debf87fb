/// Message dispatcher
///
/// The core state machine. For each record drained from the feed:
///
/// 1. Parse and validate (see parser).
/// 2. Resolve the sound's profile in the registry; unknown ids are dropped.
/// 3. play/update: always forward the position to the spatialization sink,
///    then fire the clip unless exclusivity suppresses the re-trigger.
/// 4. stop: stop the clip only if the sound was actually active.
///
/// Every failure is contained to its record; a batch never aborts.
use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::error::ParseError;
use crate::parser::{self, ParsedRecord, SoundAction, SoundEvent};
use crate::registry::{Category, ExclusivityPolicy, SoundProfile, SoundRegistry};
use crate::sinks::{PlaybackSink, SpatialSink, SpatialUpdate};
use crate::stats::RouterStats;
use crate::tracker::ActiveSounds;

/// Clip slot used when stopping player and point sounds
const DEFAULT_CLIP_SLOT: usize = 0;

/// Routes parsed events to the two downstream sinks
///
/// Owns the registry, the active-sound tracker and the sinks; constructed at
/// startup and driven by a single consumer, strictly in arrival order.
pub struct Dispatcher {
    registry: SoundRegistry,
    tracker: ActiveSounds,
    spatial: Arc<dyn SpatialSink>,
    playback: Arc<dyn PlaybackSink>,
    stats: RouterStats,
}

impl Dispatcher {
    /// Create a dispatcher with an empty active set
    pub fn new(
        registry: SoundRegistry,
        spatial: Arc<dyn SpatialSink>,
        playback: Arc<dyn PlaybackSink>,
    ) -> Self {
        Self {
            registry,
            tracker: ActiveSounds::new(),
            spatial,
            playback,
            stats: RouterStats::new(),
        }
    }

    /// Process one batch of records, in order
    ///
    /// One bad record never affects the rest of the batch.
    pub fn process_batch<I, S>(&mut self, records: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for record in records {
            self.process_record(record.as_ref());
        }
    }

    /// Process one raw record; all failures are logged and absorbed here
    pub fn process_record(&mut self, record: &str) {
        self.stats.records += 1;
        tracing::debug!("MESSAGE {record} incoming");

        match parser::parse_record(record) {
            Ok(ParsedRecord::Event(event)) => self.dispatch_event(event),
            Ok(ParsedRecord::LegacyMusic) => {
                self.stats.legacy_music += 1;
            }
            Err(err) => {
                self.stats.parse_errors += 1;
                match err {
                    ParseError::UnrecognizedAction(_) => {
                        tracing::warn!("Skipping record '{record}': {err}");
                    }
                    _ => {
                        tracing::error!("Error processing record '{record}': {err}");
                    }
                }
            }
        }
    }

    fn dispatch_event(&mut self, event: SoundEvent) {
        let profile = match self.registry.resolve(&event.sound_id) {
            Some(profile) => profile.clone(),
            None => {
                self.stats.unknown_sounds += 1;
                tracing::warn!(
                    "Sound {} not found in the registry, skipping",
                    event.sound_id
                );
                return;
            }
        };

        match event.action {
            SoundAction::Play | SoundAction::Update => self.handle_play(event, &profile),
            SoundAction::Stop => self.handle_stop(&event.sound_id, &profile),
        }
    }

    fn handle_play(&mut self, event: SoundEvent, profile: &SoundProfile) {
        let Some(position) = event.position else {
            // The parser only emits play/update events with a position.
            return;
        };
        let sound_id = &event.sound_id;

        // The spatial update goes out unconditionally, for every play and
        // update, including suppressed re-triggers. This is what keeps
        // already-sounding sources moving smoothly.
        let update = SpatialUpdate {
            channel: profile.channel,
            azimuth: position.azimuth,
            elevation: position.elevation,
            radius: position.radius,
            horizontal_span: position.horizontal_span,
            vertical_span: position.vertical_span,
        };
        if let Err(err) = self.spatial.send_update(&update) {
            self.stats.sink_errors += 1;
            tracing::error!(target: "spat", "Error sending update for {sound_id}: {err}");
            return;
        }
        self.stats.spatial_updates += 1;
        tracing::debug!(
            target: "spat",
            "Updated sound {sound_id} (azimuth {}, elevation {}, radius {})",
            update.azimuth,
            update.elevation,
            update.radius
        );

        match profile.policy {
            ExclusivityPolicy::NonExclusive => self.trigger_clip(sound_id, profile),
            ExclusivityPolicy::Exclusive => {
                if self.tracker.is_active(sound_id) {
                    tracing::debug!(
                        target: "playback",
                        "Sound {sound_id} already active, spatial update only"
                    );
                } else {
                    self.tracker.activate(sound_id);
                    self.trigger_clip(sound_id, profile);
                }
            }
        }
    }

    fn handle_stop(&mut self, sound_id: &str, profile: &SoundProfile) {
        if self.tracker.deactivate(sound_id) {
            self.stop_clip(sound_id, profile);
        } else {
            self.stats.redundant_stops += 1;
            tracing::info!(
                target: "playback",
                "Sound {sound_id} was not active, no need to stop."
            );
        }
    }

    fn trigger_clip(&mut self, sound_id: &str, profile: &SoundProfile) {
        match profile.category {
            Category::BackgroundMusic => match profile.clip_index {
                Some(clip_index) => {
                    let target = self.registry.music_target().to_string();
                    self.fire(sound_id, &target, clip_index);
                }
                None => {
                    tracing::error!(
                        target: "playback",
                        "Clip mapping for sound {sound_id} not found."
                    );
                }
            },
            Category::Player => {
                // One playback track per player slot, always slot 0.
                let target = sound_id.to_string();
                self.fire(sound_id, &target, DEFAULT_CLIP_SLOT);
            }
            Category::Point => {
                let target = self.registry.points_target().to_string();
                let clip_index = self
                    .registry
                    .point_clips()
                    .choose(&mut rand::thread_rng())
                    .copied();
                match clip_index {
                    Some(clip_index) => self.fire(sound_id, &target, clip_index),
                    None => {
                        tracing::error!(
                            target: "playback",
                            "No point clips configured, cannot play {sound_id}"
                        );
                    }
                }
            }
            Category::Unclassified => {
                tracing::info!(
                    target: "playback",
                    "Sound {sound_id} does not belong to any known category."
                );
            }
        }
    }

    fn stop_clip(&mut self, sound_id: &str, profile: &SoundProfile) {
        match profile.category {
            Category::BackgroundMusic => match profile.clip_index {
                Some(clip_index) => {
                    let target = self.registry.music_target().to_string();
                    self.stop(sound_id, &target, clip_index);
                }
                None => {
                    tracing::error!(
                        target: "playback",
                        "Clip mapping for sound {sound_id} not found."
                    );
                }
            },
            Category::Player => {
                let target = sound_id.to_string();
                self.stop(sound_id, &target, DEFAULT_CLIP_SLOT);
            }
            Category::Point => {
                // The trigger path picks a random slot but this always stops
                // slot 0, so a point clip in slots 1-4 keeps sounding until
                // it ends on its own.
                let target = self.registry.points_target().to_string();
                self.stop(sound_id, &target, DEFAULT_CLIP_SLOT);
            }
            Category::Unclassified => {
                tracing::info!(
                    target: "playback",
                    "Sound {sound_id} does not belong to any known category."
                );
            }
        }
    }

    fn fire(&mut self, sound_id: &str, target: &str, clip_index: usize) {
        match self.playback.fire_clip(target, clip_index) {
            Ok(()) => {
                self.stats.clips_fired += 1;
                tracing::info!(
                    target: "playback",
                    "Played clip for {sound_id} in track {target} slot {clip_index}"
                );
            }
            Err(err) => {
                self.stats.sink_errors += 1;
                tracing::error!(target: "playback", "Error playing clip for {sound_id}: {err}");
            }
        }
    }

    fn stop(&mut self, sound_id: &str, target: &str, clip_index: usize) {
        match self.playback.stop_clip(target, clip_index) {
            Ok(()) => {
                self.stats.clips_stopped += 1;
                tracing::info!(
                    target: "playback",
                    "Stopped clip for {sound_id} in track {target} slot {clip_index}"
                );
            }
            Err(err) => {
                self.stats.sink_errors += 1;
                tracing::error!(target: "playback", "Error stopping clip for {sound_id}: {err}");
            }
        }
    }

    /// Issue a stop to every player slot and clear their active state
    ///
    /// Used at startup so stale player clips from a previous run do not
    /// keep sounding into the new session.
    pub fn stop_all_players(&mut self) {
        let players = self.registry.player_ids().to_vec();
        for sound_id in &players {
            self.tracker.deactivate(sound_id);
            let target = sound_id.clone();
            self.stop(sound_id, &target, DEFAULT_CLIP_SLOT);
        }
        tracing::info!("Stopped all player sounds at start.");
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    /// Whether a sound is currently tracked as active
    pub fn is_active(&self, sound_id: &str) -> bool {
        self.tracker.is_active(sound_id)
    }

    /// Number of currently-active exclusive sounds
    pub fn active_count(&self) -> usize {
        self.tracker.len()
    }
}
