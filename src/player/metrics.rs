use crate::player::{PlaybackStatus, SAMPLE_TAP_CAPACITY};

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU8, AtomicU64, Ordering},
    },
    time::Duration,
};

pub const DEFAULT_VOLUME: u8 = 70;

/// Shared transport snapshot. Written by the audio thread, read by the
/// UI once per frame without blocking it.
pub struct PlaybackMetrics {
    status: AtomicU8,
    position_ms: AtomicU64,
    duration_ms: AtomicU64, // 0 = unknown
    volume: AtomicU8,
    pub audio_tap: Mutex<VecDeque<f32>>,
}

impl PlaybackMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(PlaybackMetrics {
            status: AtomicU8::new(PlaybackStatus::Idle as u8),
            position_ms: AtomicU64::new(0),
            duration_ms: AtomicU64::new(0),
            volume: AtomicU8::new(DEFAULT_VOLUME),
            audio_tap: Mutex::new(VecDeque::with_capacity(SAMPLE_TAP_CAPACITY)),
        })
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
            .load(Ordering::Relaxed)
            .try_into()
            .unwrap_or(PlaybackStatus::Idle)
    }

    pub fn set_status(&self, status: PlaybackStatus) {
        self.status.store(status as u8, Ordering::Relaxed);
    }

    pub fn is_playing(&self) -> bool {
        self.status() == PlaybackStatus::Playing
    }

    pub fn position(&self) -> Duration {
        Duration::from_millis(self.position_ms.load(Ordering::Relaxed))
    }

    pub fn set_position(&self, d: Duration) {
        self.position_ms
            .store(d.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn duration(&self) -> Option<Duration> {
        match self.duration_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn set_duration(&self, d: Option<Duration>) {
        let ms = d.map(|d| d.as_millis() as u64).unwrap_or(0);
        self.duration_ms.store(ms, Ordering::Relaxed);
    }

    pub fn volume(&self) -> u8 {
        self.volume.load(Ordering::Relaxed)
    }

    pub fn set_volume(&self, percent: u8) {
        self.volume.store(percent.min(100), Ordering::Relaxed);
    }

    /// New load: transport state goes back to zero, preferences
    /// (volume) survive.
    pub fn reset_for_load(&self) {
        self.set_status(PlaybackStatus::Loading);
        self.set_position(Duration::ZERO);
        self.set_duration(None);
        self.clear_tap();
    }

    pub fn reset(&self) {
        self.set_status(PlaybackStatus::Idle);
        self.set_position(Duration::ZERO);
        self.set_duration(None);
        self.clear_tap();
    }

    pub fn push_samples(&self, samples: &[f32]) {
        if let Ok(mut tap) = self.audio_tap.try_lock() {
            for &sample in samples {
                if tap.len() >= SAMPLE_TAP_CAPACITY {
                    tap.pop_front();
                }
                tap.push_back(sample);
            }
        }
    }

    /// Most recent `n` samples, oldest first. Empty when the tap is
    /// contended or has nothing buffered.
    pub fn latest_samples(&self, n: usize) -> Vec<f32> {
        match self.audio_tap.try_lock() {
            Ok(tap) => {
                let skip = tap.len().saturating_sub(n);
                tap.iter().skip(skip).copied().collect()
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn clear_tap(&self) {
        if let Ok(mut tap) = self.audio_tap.try_lock() {
            tap.clear();
        }
    }
}
