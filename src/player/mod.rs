mod backend;
mod backend_rodio;
mod core;
mod engine;
mod handle;
mod metrics;
mod queue;
mod visualizer;

pub use backend::AudioBackend;
pub use backend_rodio::RodioBackend;
pub use engine::PlaybackEngine;
pub use handle::PlayerHandle;
pub use metrics::{DEFAULT_VOLUME, PlaybackMetrics};
pub use queue::TrackQueue;
pub use visualizer::{VIS_BARS, VisualizerSampler};

use crate::domain::TrackRecord;
use std::{sync::Arc, time::Duration};

pub(crate) const SAMPLE_TAP_CAPACITY: usize = 2048;

/// Monotonic id tying every event back to the load that produced it.
/// Events carrying a stale sequence are discarded by the engine, so a
/// superseded track can never mutate state for the newly loaded one.
pub type LoadSeq = u64;

pub enum PlayerCommand {
    Load(Arc<TrackRecord>, LoadSeq),
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SetVolume(u8),
}

pub enum PlayerEvent {
    Loaded(LoadSeq, Option<Duration>),
    Started(LoadSeq),
    Paused(LoadSeq),
    Ended(LoadSeq),
    Errored(LoadSeq, String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PlaybackStatus {
    Idle = 0,
    Loading = 1,
    Playing = 2,
    Paused = 3,
    Errored = 4,
}

impl From<PlaybackStatus> for u8 {
    fn from(status: PlaybackStatus) -> u8 {
        status as u8
    }
}

impl TryFrom<u8> for PlaybackStatus {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PlaybackStatus::Idle),
            1 => Ok(PlaybackStatus::Loading),
            2 => Ok(PlaybackStatus::Playing),
            3 => Ok(PlaybackStatus::Paused),
            4 => Ok(PlaybackStatus::Errored),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepeatMode {
    #[default]
    None,
    All,
    One,
}

impl RepeatMode {
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::None => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::None,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            RepeatMode::None => "",
            RepeatMode::All => "⟳",
            RepeatMode::One => "⟳¹",
        }
    }
}
