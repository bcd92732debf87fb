/// Event record parser
///
/// Parses one raw record from the inbound feed into a typed event. A record
/// is a single whitespace-delimited string: an action token, a quoted sound
/// identifier, and for play/update five floats (azimuth, elevation, radius,
/// horizontal span, vertical span).
use std::fmt;

use crate::error::ParseError;

/// The action verb of an inbound record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundAction {
    Play,
    Update,
    Stop,
}

impl SoundAction {
    /// Parse an action token; anything but the three known verbs is
    /// unrecognized
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "/sound/play" => Some(SoundAction::Play),
            "/sound/update" => Some(SoundAction::Update),
            "/sound/stop" => Some(SoundAction::Stop),
            _ => None,
        }
    }

    /// Whether this action carries the five spatial fields
    pub fn has_position(&self) -> bool {
        matches!(self, SoundAction::Play | SoundAction::Update)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundAction::Play => "/sound/play",
            SoundAction::Update => "/sound/update",
            SoundAction::Stop => "/sound/stop",
        }
    }
}

impl fmt::Display for SoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spherical position of a sound, renderer convention
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialPosition {
    pub azimuth: f32,
    pub elevation: f32,
    pub radius: f32,
    pub horizontal_span: f32,
    pub vertical_span: f32,
}

/// One parsed inbound event
#[derive(Debug, Clone, PartialEq)]
pub struct SoundEvent {
    pub action: SoundAction,
    pub sound_id: String,
    /// Present for play/update, absent for stop
    pub position: Option<SpatialPosition>,
}

/// Outcome of parsing one record
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    /// A well-formed event, ready for dispatch
    Event(SoundEvent),

    /// The legacy "music" placeholder: accepted and discarded upstream of
    /// any sink
    LegacyMusic,
}

/// Identifier of the legacy placeholder with no playable clip
pub const LEGACY_MUSIC_ID: &str = "music";

/// Valid radius range; values outside it are warned about but still pass
pub const RADIUS_MIN: f32 = -3.0;
pub const RADIUS_MAX: f32 = 3.0;

const SPATIAL_FIELDS: [&str; 5] = [
    "azimuth",
    "elevation",
    "radius",
    "horizontal span",
    "vertical span",
];

/// Parse one raw record
///
/// Pure apart from logging: the radius range check warns without rejecting,
/// and the legacy placeholder is logged as informational.
pub fn parse_record(record: &str) -> Result<ParsedRecord, ParseError> {
    let mut tokens = record.split_whitespace();

    let action_token = tokens.next().ok_or(ParseError::EmptyRecord)?;
    let action = SoundAction::from_token(action_token)
        .ok_or_else(|| ParseError::UnrecognizedAction(action_token.to_string()))?;

    let sound_id = tokens
        .next()
        .ok_or(ParseError::MissingSoundId)?
        .trim_matches('"');
    if sound_id.is_empty() {
        return Err(ParseError::MissingSoundId);
    }

    // The placeholder is recognized before the spatial fields are even
    // looked at, so a bare `/sound/play "music"` is not malformed.
    if sound_id == LEGACY_MUSIC_ID {
        tracing::info!(
            target: "playback",
            "Received sound ID 'music', but no such clip exists. Skipping."
        );
        return Ok(ParsedRecord::LegacyMusic);
    }

    let position = if action.has_position() {
        Some(parse_position(sound_id, &mut tokens)?)
    } else {
        None
    };

    Ok(ParsedRecord::Event(SoundEvent {
        action,
        sound_id: sound_id.to_string(),
        position,
    }))
}

fn parse_position<'a>(
    sound_id: &str,
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<SpatialPosition, ParseError> {
    let mut values = [0.0f32; 5];

    for (i, field) in SPATIAL_FIELDS.into_iter().enumerate() {
        let token = tokens
            .next()
            .ok_or(ParseError::MissingSpatialFields { found: i })?;
        values[i] = token.parse().map_err(|_| ParseError::InvalidNumber {
            field,
            value: token.to_string(),
        })?;
    }

    let position = SpatialPosition {
        azimuth: values[0],
        elevation: values[1],
        radius: values[2],
        horizontal_span: values[3],
        vertical_span: values[4],
    };

    if !(RADIUS_MIN..=RADIUS_MAX).contains(&position.radius) {
        tracing::warn!(
            "Radius {} is out of range [{RADIUS_MIN}, {RADIUS_MAX}] for sound {sound_id}",
            position.radius
        );
    }

    Ok(position)
}
