// Integration tests for spat-bridge
// These drive the full parse -> classify -> dispatch pipeline through the
// public API, with recording fakes standing in for the two OSC sinks.

use std::sync::Arc;

use parking_lot::Mutex;

use spat_bridge::error::SinkError;
use spat_bridge::{
    Dispatcher, PlaybackSink, SoundRegistry, SpatialSink, SpatialUpdate,
};

#[derive(Default)]
struct RecordingSpatial {
    updates: Mutex<Vec<SpatialUpdate>>,
}

impl SpatialSink for RecordingSpatial {
    fn send_update(&self, update: &SpatialUpdate) -> Result<(), SinkError> {
        self.updates.lock().push(update.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClipCall {
    Fire(String, usize),
    Stop(String, usize),
}

#[derive(Default)]
struct RecordingPlayback {
    calls: Mutex<Vec<ClipCall>>,
}

impl PlaybackSink for RecordingPlayback {
    fn fire_clip(&self, target: &str, clip_index: usize) -> Result<(), SinkError> {
        self.calls
            .lock()
            .push(ClipCall::Fire(target.to_string(), clip_index));
        Ok(())
    }

    fn stop_clip(&self, target: &str, clip_index: usize) -> Result<(), SinkError> {
        self.calls
            .lock()
            .push(ClipCall::Stop(target.to_string(), clip_index));
        Ok(())
    }
}

fn pipeline() -> (Dispatcher, Arc<RecordingSpatial>, Arc<RecordingPlayback>) {
    let spatial = Arc::new(RecordingSpatial::default());
    let playback = Arc::new(RecordingPlayback::default());
    let dispatcher = Dispatcher::new(
        SoundRegistry::default(),
        spatial.clone(),
        playback.clone(),
    );
    (dispatcher, spatial, playback)
}

#[test]
fn test_player_play_update_stop_lifecycle() {
    let (mut dispatcher, spatial, playback) = pipeline();

    // Play: one spatial update on p0's channel, one clip fire on the p0
    // track, p0 becomes active.
    dispatcher.process_record("/sound/play \"p0\" 10.0 0.0 1.0 30.0 10.0");
    assert!(dispatcher.is_active("p0"));
    {
        let updates = spatial.updates.lock();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].channel, 21);
        assert_eq!(updates[0].azimuth, 10.0);
    }
    assert_eq!(
        *playback.calls.lock(),
        vec![ClipCall::Fire("p0".to_string(), 0)]
    );

    // Update while active: new azimuth goes out, no extra clip fire.
    dispatcher.process_record("/sound/update \"p0\" 42.0 0.0 1.0 30.0 10.0");
    {
        let updates = spatial.updates.lock();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].azimuth, 42.0);
    }
    assert_eq!(playback.calls.lock().len(), 1);

    // Stop while active: removed from the active set, exactly one stop.
    dispatcher.process_record("/sound/stop \"p0\"");
    assert!(!dispatcher.is_active("p0"));
    assert_eq!(
        playback.calls.lock().last(),
        Some(&ClipCall::Stop("p0".to_string(), 0))
    );

    // A second stop is a no-op.
    dispatcher.process_record("/sound/stop \"p0\"");
    assert_eq!(playback.calls.lock().len(), 2);
    assert_eq!(dispatcher.stats().redundant_stops, 1);
}

#[test]
fn test_exclusive_double_play_triggers_once() {
    let (mut dispatcher, spatial, playback) = pipeline();

    dispatcher.process_batch([
        "/sound/play \"p1\" 10.0 0.0 1.0 30.0 10.0",
        "/sound/play \"p1\" 11.0 0.0 1.0 30.0 10.0",
    ]);

    assert_eq!(spatial.updates.lock().len(), 2);
    assert_eq!(playback.calls.lock().len(), 1);
}

#[test]
fn test_non_exclusive_background_music_retriggers() {
    let (mut dispatcher, spatial, playback) = pipeline();

    dispatcher.process_batch([
        "/sound/play \"BuddyBGMusic\" 0.0 0.0 1.0 0.1 0.1",
        "/sound/play \"BuddyBGMusic\" 0.0 0.0 1.0 0.1 0.1",
    ]);

    // Two spatial updates and two fires on the music track, independent of
    // any active-set state.
    assert_eq!(spatial.updates.lock().len(), 2);
    let expected = ClipCall::Fire("music".to_string(), 9);
    assert_eq!(*playback.calls.lock(), vec![expected.clone(), expected]);
    assert!(!dispatcher.is_active("BuddyBGMusic"));
}

#[test]
fn test_out_of_range_radius_is_forwarded() {
    let (mut dispatcher, spatial, _playback) = pipeline();

    dispatcher.process_record("/sound/play \"p0\" 10.0 0.0 -9.0 30.0 10.0");

    let updates = spatial.updates.lock();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].radius, -9.0);
}

#[test]
fn test_legacy_music_id_reaches_no_sink() {
    let (mut dispatcher, spatial, playback) = pipeline();

    dispatcher.process_batch([
        "/sound/play \"music\" 0.0 0.0 1.0 0.1 0.1",
        "/sound/update \"music\" 5.0 0.0 1.0 0.1 0.1",
        "/sound/stop \"music\"",
    ]);

    assert!(spatial.updates.lock().is_empty());
    assert!(playback.calls.lock().is_empty());
    assert_eq!(dispatcher.stats().legacy_music, 3);
}

#[test]
fn test_unknown_sound_is_logged_and_dropped() {
    let (mut dispatcher, spatial, playback) = pipeline();

    dispatcher.process_record("/sound/play \"glorp\" 1.0 2.0 3.0 4.0 5.0");

    assert!(spatial.updates.lock().is_empty());
    assert!(playback.calls.lock().is_empty());
    assert_eq!(dispatcher.stats().unknown_sounds, 1);
}

#[test]
fn test_malformed_records_do_not_poison_the_batch() {
    let (mut dispatcher, spatial, playback) = pipeline();

    dispatcher.process_batch([
        "/sound/play \"p0\" 10.0 0.0 1.0 30.0 10.0",
        "/sound/play \"p1\" not a number at all",
        "/sound/explode \"p2\" 0 0 0 0 0",
        "",
        "/sound/play \"p3\" 10.0 0.0 1.0 30.0 10.0",
    ]);

    // The two good records made it through untouched.
    assert_eq!(spatial.updates.lock().len(), 2);
    assert_eq!(
        *playback.calls.lock(),
        vec![
            ClipCall::Fire("p0".to_string(), 0),
            ClipCall::Fire("p3".to_string(), 0),
        ]
    );
    assert_eq!(dispatcher.stats().parse_errors, 3);
}

#[test]
fn test_point_sounds_randomize_fire_but_stop_slot_zero() {
    let (mut dispatcher, _spatial, playback) = pipeline();

    dispatcher.process_record("/sound/play \"withmepoints\" 0.0 0.0 1.0 0.1 0.1");
    dispatcher.process_record("/sound/stop \"withmepoints\"");

    let calls = playback.calls.lock();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        ClipCall::Fire(target, clip_index) => {
            assert_eq!(target, "withmepoints");
            assert!((0..=4).contains(clip_index));
        }
        other => panic!("expected a fire, got {:?}", other),
    }
    assert_eq!(calls[1], ClipCall::Stop("withmepoints".to_string(), 0));
}

#[test]
fn test_shared_channel_sounds_spatialize_independently() {
    let (mut dispatcher, spatial, _playback) = pipeline();

    // p2 and its collision variant share channel 23.
    dispatcher.process_batch([
        "/sound/play \"p2\" 10.0 0.0 1.0 30.0 10.0",
        "/sound/play \"p2Coll\" 15.0 0.0 1.0 30.0 10.0",
    ]);

    let updates = spatial.updates.lock();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].channel, 23);
    assert_eq!(updates[1].channel, 23);
}

#[test]
fn test_stop_all_players_resets_every_slot() {
    let (mut dispatcher, _spatial, playback) = pipeline();

    dispatcher.process_batch([
        "/sound/play \"p0\" 10.0 0.0 1.0 30.0 10.0",
        "/sound/play \"p5\" 10.0 0.0 1.0 30.0 10.0",
    ]);
    assert_eq!(dispatcher.active_count(), 2);

    dispatcher.stop_all_players();

    assert_eq!(dispatcher.active_count(), 0);
    let calls = playback.calls.lock();
    let stops: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            ClipCall::Stop(target, 0) => Some(target.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(stops.len(), 10);
    assert!(stops.contains(&"p0".to_string()));
    assert!(stops.contains(&"p9".to_string()));
    drop(calls);

    // The slots can fire again afterwards.
    dispatcher.process_record("/sound/play \"p0\" 10.0 0.0 1.0 30.0 10.0");
    assert!(dispatcher.is_active("p0"));
}
