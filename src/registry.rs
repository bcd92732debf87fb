/// Sound registry
///
/// Immutable lookup from a sound identifier to its spatialization channel,
/// routing category, exclusivity policy and clip slot. Tables are built once
/// at startup; dispatch resolves everything with a single map probe.
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Routing category of a sound, in classification priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Scene background-music tracks, all playing from the music track
    BackgroundMusic,

    /// Per-player slot sounds (p0..p9), one playback track per slot
    Player,

    /// Point pickup sounds, all firing from the shared points track
    Point,

    /// Registered for spatialization only; no playback routing
    Unclassified,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::BackgroundMusic => write!(f, "background music"),
            Category::Player => write!(f, "player"),
            Category::Point => write!(f, "point"),
            Category::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Re-trigger policy of a sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusivityPolicy {
    /// Fires on every play/update event, no active-state bookkeeping
    NonExclusive,

    /// Fires only on the inactive -> active transition
    Exclusive,
}

impl ExclusivityPolicy {
    /// Check whether re-triggering is suppressed while the sound is active
    pub fn is_exclusive(&self) -> bool {
        matches!(self, ExclusivityPolicy::Exclusive)
    }
}

/// Resolved descriptor for one registered sound identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundProfile {
    /// Spatialization renderer channel (1-60; many sounds may share one)
    pub channel: u16,
    pub category: Category,
    pub policy: ExclusivityPolicy,
    /// Clip slot in the music track; only background-music sounds have one
    pub clip_index: Option<usize>,
}

const BACKGROUND_MUSIC_CHANNEL: u16 = 1;
const STINGER_CHANNEL: u16 = 3;
const INTERACTION_CHANNEL: u16 = 5;
const COLLISION_CHANNEL: u16 = 7;
const POINTS_CHANNEL: u16 = 20;
const FIRST_PLAYER_CHANNEL: u16 = 21;
const FIRST_SHARE_CHANNEL: u16 = 41;

const PLAYER_SLOTS: usize = 10;
const SHARE_OBJECTS: usize = 20;

const BACKGROUND_MUSIC_SOUNDS: &[&str] = &[
    "BuddyBGMusic",
    "DriveBGMusic",
    "HerdBGMusic",
    "HugBGMusic",
    "KaliBGMusic",
    "MimicShapeBGMusic",
    "OrientationBGMusic",
    "OSCSoundTestBGMusic",
    "PaintBGMusic",
    "ShareBGMusic",
    "SoundTestBGMusic",
    "SoundTestBackupBGMusic",
    "SteerBGMusic",
    "StickTogetherBGMusic",
    "WithMeBGMusic",
];

// One-shot stingers rendered from a fixed channel.
const STINGER_SOUNDS: &[&str] = &[
    "MimicShapeBeat",
    "StickTogetherBeat",
    "StickTogetherPlayerInTarget",
    "HerdPortalEntry",
    "MimicShapeMatch",
    "MimicShapeNewShapeGen",
    "MimicShapeTimeout",
    "WinGame",
    "GameTimeout",
];

const INTERACTION_SOUNDS: &[&str] = &[
    "SteerMoveNorth",
    "SteerMoveSouth",
    "SteerMoveEast",
    "SteerMoveWest",
    "Herding",
];

const COLLISION_SOUNDS: &[&str] = &["SteerCollision", "SteerTeleport"];

// Everything that plays from a player's location: the player sound itself,
// eating a dot, colliding, joining a constellation, flipping a hug face,
// the face singing or sighing, herding.
const PLAYER_SOUND_SUFFIXES: &[&str] = &[
    "",
    "Point",
    "Coll",
    "InCons",
    "hugfaceFlip",
    "hugfaceSong",
    "hugfaceSigh",
    "Herd",
];

// Constellation membership music ends at slot 7; hug faces continue.
const FIRST_SLOT_WITHOUT_CONSTELLATION: usize = 7;

/// Raw registry tables, loadable from JSON
///
/// The defaults carry the full production mapping. A partial file overrides
/// only the fields it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryTables {
    /// Sound identifier -> spatialization channel
    #[serde(default)]
    pub channels: HashMap<String, u16>,

    /// Background-music sound -> clip slot in the music track
    #[serde(default)]
    pub clips: HashMap<String, usize>,

    /// Sounds that re-trigger on every event; everything else is exclusive
    #[serde(default)]
    pub non_exclusive: HashSet<String>,

    #[serde(default)]
    pub background_music: HashSet<String>,

    #[serde(default)]
    pub players: HashSet<String>,

    #[serde(default)]
    pub points: HashSet<String>,

    /// Playback track holding all background-music clips
    #[serde(default = "default_music_target")]
    pub music_target: String,

    /// Playback track holding all point-sound clips
    #[serde(default = "default_points_target")]
    pub points_target: String,

    /// Candidate clip slots a point trigger picks from at random
    #[serde(default = "default_point_clips")]
    pub point_clips: Vec<usize>,
}

fn default_music_target() -> String {
    "music".to_string()
}

fn default_points_target() -> String {
    "withmepoints".to_string()
}

fn default_point_clips() -> Vec<usize> {
    vec![0, 1, 2, 3, 4]
}

impl Default for RegistryTables {
    fn default() -> Self {
        let mut channels = HashMap::new();

        // The legacy "music" placeholder keeps its channel so lookups
        // succeed even though the dispatcher discards it earlier.
        channels.insert("music".to_string(), BACKGROUND_MUSIC_CHANNEL);

        for id in BACKGROUND_MUSIC_SOUNDS {
            channels.insert((*id).to_string(), BACKGROUND_MUSIC_CHANNEL);
        }
        for id in STINGER_SOUNDS {
            channels.insert((*id).to_string(), STINGER_CHANNEL);
        }
        for id in INTERACTION_SOUNDS {
            channels.insert((*id).to_string(), INTERACTION_CHANNEL);
        }
        for id in COLLISION_SOUNDS {
            channels.insert((*id).to_string(), COLLISION_CHANNEL);
        }

        channels.insert("sharepoints".to_string(), POINTS_CHANNEL);
        channels.insert("withmepoints".to_string(), POINTS_CHANNEL);

        for slot in 0..PLAYER_SLOTS {
            let channel = FIRST_PLAYER_CHANNEL + slot as u16;
            for suffix in PLAYER_SOUND_SUFFIXES {
                if *suffix == "InCons" && slot >= FIRST_SLOT_WITHOUT_CONSTELLATION {
                    continue;
                }
                channels.insert(format!("p{slot}{suffix}"), channel);
            }
        }

        for n in 1..=SHARE_OBJECTS {
            channels.insert(format!("share{n}"), FIRST_SHARE_CHANNEL + (n as u16 - 1));
        }

        let clips: HashMap<String, usize> = [
            ("WithMeBGMusic", 1),
            ("OrientationBGMusic", 2),
            ("HerdBGMusic", 3),
            ("StickTogetherBGMusic", 4),
            ("SteerBGMusic", 5),
            ("DriveBGMusic", 6),
            ("ShareBGMusic", 7),
            ("PaintBGMusic", 8),
            ("BuddyBGMusic", 9),
            ("MimicShapeBGMusic", 10),
            ("KaliBGMusic", 11),
            ("HugBGMusic", 12),
        ]
        .iter()
        .map(|(id, slot)| ((*id).to_string(), *slot))
        .collect();

        let mut non_exclusive: HashSet<String> = BACKGROUND_MUSIC_SOUNDS
            .iter()
            .map(|id| (*id).to_string())
            .collect();
        non_exclusive.insert("music".to_string());
        non_exclusive.insert("sharepoints".to_string());

        let background_music = BACKGROUND_MUSIC_SOUNDS
            .iter()
            .map(|id| (*id).to_string())
            .collect();

        let players = (0..PLAYER_SLOTS).map(|slot| format!("p{slot}")).collect();

        let points = ["withmepoints"].iter().map(|id| (*id).to_string()).collect();

        Self {
            channels,
            clips,
            non_exclusive,
            background_music,
            players,
            points,
            music_target: default_music_target(),
            points_target: default_points_target(),
            point_clips: default_point_clips(),
        }
    }
}

impl RegistryTables {
    /// Load tables from a JSON file
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path).map_err(|e| RegistryError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        serde_json::from_str(&content).map_err(|e| RegistryError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    }
}

/// Resolved, immutable sound registry
pub struct SoundRegistry {
    profiles: HashMap<String, SoundProfile>,
    music_target: String,
    points_target: String,
    point_clips: Vec<usize>,
    player_ids: Vec<String>,
}

impl SoundRegistry {
    /// Build a registry from raw tables, resolving every identifier's
    /// category and policy up front
    pub fn from_tables(tables: RegistryTables) -> Result<Self, RegistryError> {
        if tables.point_clips.is_empty() {
            return Err(RegistryError::Invalid(
                "point_clips must name at least one clip slot".to_string(),
            ));
        }

        let mut profiles = HashMap::with_capacity(tables.channels.len());

        for (id, channel) in &tables.channels {
            let category = if tables.background_music.contains(id) {
                Category::BackgroundMusic
            } else if tables.players.contains(id) {
                Category::Player
            } else if tables.points.contains(id) {
                Category::Point
            } else {
                Category::Unclassified
            };

            let policy = if tables.non_exclusive.contains(id) {
                ExclusivityPolicy::NonExclusive
            } else {
                ExclusivityPolicy::Exclusive
            };

            profiles.insert(
                id.clone(),
                SoundProfile {
                    channel: *channel,
                    category,
                    policy,
                    clip_index: tables.clips.get(id).copied(),
                },
            );
        }

        let mut player_ids: Vec<String> = profiles
            .iter()
            .filter(|(_, p)| p.category == Category::Player)
            .map(|(id, _)| id.clone())
            .collect();
        player_ids.sort();

        Ok(Self {
            profiles,
            music_target: tables.music_target,
            points_target: tables.points_target,
            point_clips: tables.point_clips,
            player_ids,
        })
    }

    /// Look up the profile for a sound identifier
    pub fn resolve(&self, sound_id: &str) -> Option<&SoundProfile> {
        self.profiles.get(sound_id)
    }

    /// Check whether an identifier is registered
    pub fn contains(&self, sound_id: &str) -> bool {
        self.profiles.contains_key(sound_id)
    }

    /// Number of registered identifiers
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Playback track holding all background-music clips
    pub fn music_target(&self) -> &str {
        &self.music_target
    }

    /// Playback track holding all point-sound clips
    pub fn points_target(&self) -> &str {
        &self.points_target
    }

    /// Candidate clip slots for a point trigger
    pub fn point_clips(&self) -> &[usize] {
        &self.point_clips
    }

    /// All player-slot identifiers, in slot order
    pub fn player_ids(&self) -> &[String] {
        &self.player_ids
    }
}

impl Default for SoundRegistry {
    fn default() -> Self {
        // The embedded production tables are known-valid.
        match Self::from_tables(RegistryTables::default()) {
            Ok(registry) => registry,
            Err(_) => unreachable!("default registry tables are valid"),
        }
    }
}
