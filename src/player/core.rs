use crate::{
    REFRESH_RATE,
    domain::TrackRecord,
    player::{
        AudioBackend, LoadSeq, PlaybackMetrics, PlaybackStatus, PlayerCommand, PlayerEvent,
    },
};
use crossbeam_channel::{Receiver, Sender};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use tracing::warn;

pub(crate) const ERR_LOAD: &str = "Error loading track. Please try again.";
pub(crate) const ERR_PLAY: &str = "Error playing track. Please try again.";

pub(crate) fn no_preview_message(track: &TrackRecord) -> String {
    format!(
        "No preview available. Open in {} to play the full track.",
        track.origin.label()
    )
}

/// Audio-thread half of the player. Owns the backend; everything else
/// reaches it through commands and reads back through metrics/events.
pub struct PlayerCore {
    backend: Box<dyn AudioBackend>,
    commands: Receiver<PlayerCommand>,
    events: Sender<PlayerEvent>,
    metrics: Arc<PlaybackMetrics>,

    current: Option<LoadSeq>,
    source_bound: bool,
}

impl PlayerCore {
    pub(crate) fn new(
        backend: Box<dyn AudioBackend>,
        commands: Receiver<PlayerCommand>,
        events: Sender<PlayerEvent>,
        metrics: Arc<PlaybackMetrics>,
    ) -> Self {
        PlayerCore {
            backend,
            commands,
            events,
            metrics,
            current: None,
            source_bound: false,
        }
    }

    pub(crate) fn spawn(
        backend: Box<dyn AudioBackend>,
        commands: Receiver<PlayerCommand>,
        events: Sender<PlayerEvent>,
        metrics: Arc<PlaybackMetrics>,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            let mut core = PlayerCore::new(backend, commands, events, metrics);

            loop {
                core.tick();
                thread::sleep(REFRESH_RATE);
            }
        })
    }

    /// One scheduling round. Public so tests can pump the core without
    /// the audio thread.
    pub fn tick(&mut self) {
        self.process_commands();
        self.check_track_end();
        self.update_metrics();
    }

    fn process_commands(&mut self) {
        while let Ok(cmd) = self.commands.try_recv() {
            match cmd {
                PlayerCommand::Load(track, seq) => self.load(&track, seq),
                PlayerCommand::Play => self.play(),
                PlayerCommand::Pause => self.pause(),
                PlayerCommand::Stop => self.stop(),
                PlayerCommand::Seek(pos) => self.seek(pos),
                PlayerCommand::SetVolume(percent) => self.set_volume(percent),
            }
        }
    }

    fn load(&mut self, track: &TrackRecord, seq: LoadSeq) {
        // Reset happens before the backend can report anything, so a
        // stale duration can never survive into the new load.
        self.metrics.reset_for_load();
        self.current = Some(seq);

        let Some(source) = &track.source else {
            // browsable-only record: release the old binding and stop
            self.backend.stop();
            self.source_bound = false;
            self.metrics.set_status(PlaybackStatus::Errored);
            self.emit(PlayerEvent::Errored(seq, no_preview_message(track)));
            return;
        };

        self.source_bound = true;
        match self.backend.load(source) {
            Ok(()) => {
                let duration = self.backend.duration();
                self.metrics.set_duration(duration);
                self.emit(PlayerEvent::Loaded(seq, duration));
            }
            Err(e) => {
                warn!("failed to bind {}: {e:#}", source.url());
                self.metrics.set_status(PlaybackStatus::Errored);
                self.emit(PlayerEvent::Errored(seq, ERR_LOAD.to_string()));
            }
        }
    }

    fn play(&mut self) {
        let Some(seq) = self.current else { return };

        match self.metrics.status() {
            PlaybackStatus::Loading | PlaybackStatus::Paused => {
                self.backend.play();
                self.metrics.set_status(PlaybackStatus::Playing);
                self.emit(PlayerEvent::Started(seq));
            }
            // Position and duration stay intact so the user can retry.
            // With no source bound there is nothing to retry; the
            // no-preview notice stays current.
            PlaybackStatus::Errored => {
                if self.source_bound {
                    self.emit(PlayerEvent::Errored(seq, ERR_PLAY.to_string()));
                }
            }
            PlaybackStatus::Playing | PlaybackStatus::Idle => {}
        }
    }

    fn pause(&mut self) {
        if self.metrics.status() != PlaybackStatus::Playing {
            return;
        }
        let Some(seq) = self.current else { return };

        self.backend.pause();
        self.metrics.set_status(PlaybackStatus::Paused);
        self.emit(PlayerEvent::Paused(seq));
    }

    fn stop(&mut self) {
        self.backend.stop();
        self.current = None;
        self.source_bound = false;
        self.metrics.reset();
    }

    fn seek(&mut self, pos: Duration) {
        if self.current.is_none() {
            return;
        }

        let target = match self.metrics.duration() {
            Some(duration) => pos.min(duration),
            None => pos,
        };

        match self.backend.seek(target) {
            Ok(()) => self.metrics.set_position(target),
            Err(e) => warn!("seek to {target:?} failed: {e:#}"),
        }
    }

    fn set_volume(&mut self, percent: u8) {
        let percent = percent.min(100);
        self.backend.set_volume(percent as f32 / 100.0);
        self.metrics.set_volume(percent);
    }

    fn check_track_end(&mut self) {
        // Taking `current` ensures the ended event fires once
        if self.backend.track_ended() {
            if let Some(seq) = self.current.take() {
                self.metrics.reset();
                self.emit(PlayerEvent::Ended(seq));
            }
        }
    }

    fn update_metrics(&mut self) {
        if self.current.is_some() && self.metrics.is_playing() {
            self.metrics.set_position(self.backend.position());
            let samples = self.backend.drain_samples();
            if !samples.is_empty() {
                self.metrics.push_samples(&samples);
            }
        }
    }

    fn emit(&self, event: PlayerEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Origin, PlayableSource};
    use crate::player::PlayerHandle;
    use crate::player::backend::fake::FakeBackend;
    use std::sync::Arc;

    fn track(id: &str, source: Option<PlayableSource>) -> Arc<TrackRecord> {
        Arc::new(TrackRecord {
            id: id.to_string(),
            title: id.to_string(),
            artist: String::new(),
            thumbnail: None,
            source,
            origin: Origin::Spotify,
        })
    }

    fn clip(id: &str, url: &str) -> Arc<TrackRecord> {
        track(id, Some(PlayableSource::PreviewClip(url.to_string())))
    }

    #[test]
    fn load_binds_source_and_reports_duration() {
        let (backend, state) = FakeBackend::new();
        let (mut handle, mut core) = PlayerHandle::detached(Box::new(backend));

        handle.load(clip("a", "https://p.example/a.mp3"));
        core.tick();

        assert_eq!(core.metrics.status(), PlaybackStatus::Loading);
        assert_eq!(
            core.metrics.duration(),
            Some(Duration::from_secs(30)),
        );
        assert_eq!(state.lock().unwrap().load_calls, 1);
        // bound but not started
        assert!(!state.lock().unwrap().playing);
    }

    #[test]
    fn play_is_a_no_op_while_idle() {
        let (backend, state) = FakeBackend::new();
        let (handle, mut core) = PlayerHandle::detached(Box::new(backend));

        handle.play().unwrap();
        core.tick();

        assert_eq!(core.metrics.status(), PlaybackStatus::Idle);
        assert!(!state.lock().unwrap().playing);
    }

    #[test]
    fn pause_twice_equals_pause_once() {
        let (backend, _state) = FakeBackend::new();
        let (mut handle, mut core) = PlayerHandle::detached(Box::new(backend));

        handle.load(clip("a", "https://p.example/a.mp3"));
        handle.play().unwrap();
        core.tick();
        assert_eq!(core.metrics.status(), PlaybackStatus::Playing);

        handle.pause().unwrap();
        core.tick();
        let after_first = core.metrics.status();
        let events_so_far = handle.poll_events().len();

        handle.pause().unwrap();
        core.tick();

        assert_eq!(core.metrics.status(), after_first);
        assert_eq!(core.metrics.status(), PlaybackStatus::Paused);
        // second pause emitted nothing
        assert!(handle.poll_events().is_empty());
        assert!(events_so_far > 0);
    }

    #[test]
    fn failed_bind_moves_to_errored_and_play_reports_retry_message() {
        let (backend, _state) = FakeBackend::new();
        let (mut handle, mut core) = PlayerHandle::detached(Box::new(backend));

        handle.load(clip("a", "https://p.example/bad.mp3"));
        core.tick();
        assert_eq!(core.metrics.status(), PlaybackStatus::Errored);

        handle.play().unwrap();
        core.tick();
        assert_eq!(core.metrics.status(), PlaybackStatus::Errored);

        let events = handle.poll_events();
        let messages: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                PlayerEvent::Errored(_, msg) => Some(msg.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ERR_LOAD);
        assert_eq!(messages[1], ERR_PLAY);
    }

    #[test]
    fn unplayable_track_never_reaches_playing() {
        let (backend, state) = FakeBackend::new();
        let (mut handle, mut core) = PlayerHandle::detached(Box::new(backend));

        handle.load(track("c", None));
        core.tick();
        assert_eq!(core.metrics.status(), PlaybackStatus::Errored);

        handle.play().unwrap();
        core.tick();

        assert_eq!(core.metrics.status(), PlaybackStatus::Errored);
        assert_eq!(state.lock().unwrap().load_calls, 0);

        let events = handle.poll_events();
        let messages: Vec<&String> = events
            .iter()
            .filter_map(|e| match e {
                PlayerEvent::Errored(_, msg) => Some(msg),
                _ => None,
            })
            .collect();
        // the play attempt adds nothing; the no-preview notice stands
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("No preview available"));
    }

    #[test]
    fn seek_clamps_to_known_duration() {
        let (backend, state) = FakeBackend::new();
        let (mut handle, mut core) = PlayerHandle::detached(Box::new(backend));

        handle.load(clip("a", "https://p.example/a.mp3"));
        core.tick();

        handle.seek(Duration::from_secs(500)).unwrap();
        core.tick();

        assert_eq!(
            state.lock().unwrap().seek_calls,
            vec![Duration::from_secs(30)]
        );
        assert_eq!(core.metrics.position(), Duration::from_secs(30));
    }

    #[test]
    fn natural_end_emits_once_and_goes_idle() {
        let (backend, state) = FakeBackend::new();
        let (mut handle, mut core) = PlayerHandle::detached(Box::new(backend));

        handle.load(clip("a", "https://p.example/a.mp3"));
        handle.play().unwrap();
        core.tick();

        state.lock().unwrap().ended = true;
        core.tick();
        core.tick();

        let ended: Vec<_> = handle
            .poll_events()
            .into_iter()
            .filter(|e| matches!(e, PlayerEvent::Ended(_)))
            .collect();
        assert_eq!(ended.len(), 1);
        assert_eq!(core.metrics.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn volume_applies_live_and_persists_across_loads() {
        let (backend, state) = FakeBackend::new();
        let (mut handle, mut core) = PlayerHandle::detached(Box::new(backend));

        handle.set_volume(40).unwrap();
        core.tick();
        assert_eq!(core.metrics.volume(), 40);
        assert!((state.lock().unwrap().volume - 0.4).abs() < f32::EPSILON);

        handle.load(clip("a", "https://p.example/a.mp3"));
        core.tick();
        assert_eq!(core.metrics.volume(), 40);
    }
}
