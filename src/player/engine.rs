use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tracing::error;

use crate::{
    Database,
    domain::{FAVORITES, TrackRecord},
    player::{
        LoadSeq, PlaybackMetrics, PlaybackStatus, PlayerEvent, PlayerHandle, RepeatMode,
        TrackQueue,
    },
};

/// The single app-facing transport. Owns the queue and the user-facing
/// playback preferences; every control is safe to call in any state.
pub struct PlaybackEngine {
    handle: PlayerHandle,
    queue: TrackQueue,
    db: Arc<Mutex<Database>>,
    metrics: Arc<PlaybackMetrics>,

    current: Option<Arc<TrackRecord>>,
    current_seq: LoadSeq,
    started_logged: bool,

    shuffle_enabled: bool,
    repeat: RepeatMode,
    is_favorite: bool,
    last_error: Option<String>,
    drag: Option<Duration>,
}

impl PlaybackEngine {
    pub fn new(handle: PlayerHandle, db: Arc<Mutex<Database>>) -> Self {
        let metrics = handle.metrics();
        PlaybackEngine {
            handle,
            queue: TrackQueue::new(),
            db,
            metrics,
            current: None,
            current_seq: 0,
            started_logged: false,
            shuffle_enabled: false,
            repeat: RepeatMode::None,
            is_favorite: false,
            last_error: None,
            drag: None,
        }
    }

    /// Drain player events. Events from a superseded load are dropped
    /// here, so a stale callback can never touch the current track.
    pub fn poll(&mut self) {
        for event in self.handle.poll_events() {
            let seq = match &event {
                PlayerEvent::Loaded(seq, _)
                | PlayerEvent::Started(seq)
                | PlayerEvent::Paused(seq)
                | PlayerEvent::Ended(seq)
                | PlayerEvent::Errored(seq, _) => *seq,
            };
            if seq != self.current_seq {
                continue;
            }

            match event {
                PlayerEvent::Loaded(..) | PlayerEvent::Paused(_) => {}
                PlayerEvent::Started(_) => self.record_recently_played(),
                PlayerEvent::Ended(_) => self.handle_track_end(),
                PlayerEvent::Errored(_, message) => self.last_error = Some(message),
            }
        }
    }
}

// =================
//    TRANSPORT
// =================
impl PlaybackEngine {
    /// Replace the queue with `tracks`, cursor on `selected`, and start
    /// playing it.
    pub fn play_from(&mut self, tracks: &[Arc<TrackRecord>], selected: &TrackRecord) {
        self.queue.load(tracks, selected);
        if let Some(track) = self.queue.current() {
            self.play_track(track);
        }
    }

    pub fn load_track(&mut self, track: Arc<TrackRecord>) {
        self.last_error = None;
        self.is_favorite = false;
        self.drag = None;
        self.started_logged = false;

        self.current_seq = self.handle.load(Arc::clone(&track));
        self.current = Some(track);
    }

    pub fn play(&self) {
        let _ = self.handle.play();
    }

    pub fn pause(&self) {
        let _ = self.handle.pause();
    }

    pub fn toggle_playback(&self) {
        match self.metrics.status() {
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Loading | PlaybackStatus::Paused | PlaybackStatus::Errored => {
                self.play()
            }
            PlaybackStatus::Idle => {}
        }
    }

    pub fn stop(&mut self) {
        let _ = self.handle.stop();
        self.current = None;
        self.drag = None;
        self.is_favorite = false;
    }

    pub fn next(&mut self) {
        let wrap = self.repeat == RepeatMode::All;
        if let Some(track) = self.queue.next(wrap) {
            self.play_track(track);
        }
    }

    pub fn previous(&mut self) {
        if !self.queue.has_previous() {
            return;
        }
        if let Some(track) = self.queue.previous() {
            self.play_track(track);
        }
    }

    fn play_track(&mut self, track: Arc<TrackRecord>) {
        self.load_track(track);
        self.play();
    }

    fn handle_track_end(&mut self) {
        match self.repeat {
            RepeatMode::One => {
                if let Some(track) = self.current.clone() {
                    self.play_track(track);
                }
            }
            mode => {
                let wrap = mode == RepeatMode::All;
                if self.queue.has_next() || wrap {
                    if let Some(track) = self.queue.next(wrap) {
                        self.play_track(track);
                    }
                }
                // end of queue without repeat: the core already went idle
            }
        }
    }
}

// ==================
//    SEEK & DRAG
// ==================
impl PlaybackEngine {
    /// Immediate seek; ignored while a drag is in progress.
    pub fn seek(&self, pos: Duration) {
        if self.drag.is_some() {
            return;
        }
        let _ = self.handle.seek(pos);
    }

    pub fn seek_by(&self, delta_secs: i64) {
        let position = self.metrics.position();
        let target = match delta_secs >= 0 {
            true => position.saturating_add(Duration::from_secs(delta_secs as u64)),
            false => position.saturating_sub(Duration::from_secs(delta_secs.unsigned_abs())),
        };
        self.seek(target);
    }

    /// While dragging, the displayed position follows the drag value and
    /// the audio graph is untouched.
    pub fn drag_to(&mut self, pos: Duration) {
        let pos = match self.metrics.duration() {
            Some(duration) => pos.min(duration),
            None => pos,
        };
        self.drag = Some(pos);
    }

    /// Release the drag: the graph is seeked exactly once.
    pub fn commit_seek_drag(&mut self) {
        if let Some(pos) = self.drag.take() {
            let _ = self.handle.seek(pos);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn position(&self) -> Duration {
        self.drag.unwrap_or_else(|| self.metrics.position())
    }

    pub fn duration(&self) -> Option<Duration> {
        self.metrics.duration()
    }
}

// ====================
//    PREFERENCES
// ====================
impl PlaybackEngine {
    pub fn set_volume(&self, percent: u8) {
        let _ = self.handle.set_volume(percent);
    }

    pub fn volume(&self) -> u8 {
        self.metrics.volume()
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle_enabled = !self.shuffle_enabled;
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn cycle_repeat(&mut self) {
        self.repeat = self.repeat.cycle();
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn toggle_favorite(&mut self) {
        let Some(track) = self.current.clone() else {
            return;
        };

        self.is_favorite = !self.is_favorite;
        // Write-through on the false→true edge only; un-favoriting does
        // not remove from the playlist (that is an explicit action).
        if self.is_favorite {
            if let Err(e) = self
                .db
                .lock()
                .unwrap()
                .add_track_to_playlist(FAVORITES, &track)
            {
                error!("favorites write-through failed: {e:#}");
            }
        }
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }
}

// ================
//    ACCESSORS
// ================
impl PlaybackEngine {
    pub fn status(&self) -> PlaybackStatus {
        self.metrics.status()
    }

    pub fn current(&self) -> Option<&Arc<TrackRecord>> {
        self.current.as_ref()
    }

    pub fn has_previous(&self) -> bool {
        self.queue.has_previous()
    }

    pub fn has_next(&self) -> bool {
        self.queue.has_next()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn metrics(&self) -> Arc<PlaybackMetrics> {
        Arc::clone(&self.metrics)
    }

    fn record_recently_played(&mut self) {
        if self.started_logged {
            return;
        }
        self.started_logged = true;

        if let Some(track) = &self.current {
            if let Err(e) = self.db.lock().unwrap().push_recently_played(track) {
                error!("recently-played append failed: {e:#}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Origin, PlayableSource, RECENTLY_PLAYED};
    use crate::player::backend::fake::{FakeBackend, FakeState};
    use crate::player::core::PlayerCore;

    fn clip(id: &str) -> Arc<TrackRecord> {
        Arc::new(TrackRecord {
            id: id.to_string(),
            title: id.to_uppercase(),
            artist: "artist".to_string(),
            thumbnail: None,
            source: Some(PlayableSource::PreviewClip(format!(
                "https://p.example/{id}.mp3"
            ))),
            origin: Origin::Spotify,
        })
    }

    fn unplayable(id: &str) -> Arc<TrackRecord> {
        Arc::new(TrackRecord {
            id: id.to_string(),
            title: id.to_uppercase(),
            artist: String::new(),
            thumbnail: None,
            source: None,
            origin: Origin::Spotify,
        })
    }

    fn engine() -> (PlaybackEngine, PlayerCore, Arc<Mutex<FakeState>>, Arc<Mutex<Database>>) {
        let (backend, state) = FakeBackend::new();
        let (handle, core) = PlayerHandle::detached(Box::new(backend));
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        (PlaybackEngine::new(handle, Arc::clone(&db)), core, state, db)
    }

    fn favorites_len(db: &Arc<Mutex<Database>>) -> usize {
        db.lock()
            .unwrap()
            .get_playlists()
            .unwrap()
            .into_iter()
            .find(|p| p.name == FAVORITES)
            .map(|p| p.tracks.len())
            .unwrap_or(0)
    }

    #[test]
    fn unplayable_record_surfaces_notice_and_never_plays() {
        let (mut engine, mut core, _state, _db) = engine();

        engine.load_track(unplayable("c"));
        engine.play();
        core.tick();
        engine.poll();

        assert_eq!(engine.status(), PlaybackStatus::Errored);
        assert!(engine.last_error().unwrap().contains("No preview available"));
    }

    #[test]
    fn favorite_round_trip_leaves_store_content_unchanged() {
        let (mut engine, mut core, _state, db) = engine();

        engine.load_track(clip("a"));
        core.tick();
        engine.poll();

        assert!(!engine.is_favorite());
        engine.toggle_favorite();
        assert!(engine.is_favorite());
        assert_eq!(favorites_len(&db), 1);

        engine.toggle_favorite();
        assert!(!engine.is_favorite());
        assert_eq!(favorites_len(&db), 1);

        // the add is idempotent at the store
        engine.toggle_favorite();
        assert_eq!(favorites_len(&db), 1);
    }

    #[test]
    fn repeat_cycles_back_to_none() {
        let (mut engine, _core, _state, _db) = engine();
        assert_eq!(engine.repeat(), RepeatMode::None);
        engine.cycle_repeat();
        engine.cycle_repeat();
        engine.cycle_repeat();
        assert_eq!(engine.repeat(), RepeatMode::None);
    }

    #[test]
    fn queue_walk_matches_contract() {
        let (mut engine, mut core, _state, _db) = engine();
        let a = clip("a");
        let b = clip("b");

        engine.play_from(&[Arc::clone(&a), Arc::clone(&b)], &a);
        core.tick();
        engine.poll();

        assert!(!engine.has_previous());
        assert!(engine.has_next());
        assert_eq!(engine.status(), PlaybackStatus::Playing);

        engine.next();
        core.tick();
        engine.poll();

        assert_eq!(engine.current().unwrap().id, "b");
        assert!(engine.has_previous());
        assert!(!engine.has_next());
    }

    #[test]
    fn end_of_queue_without_repeat_goes_idle() {
        let (mut engine, mut core, state, _db) = engine();
        let a = clip("a");
        let b = clip("b");

        engine.play_from(&[a, Arc::clone(&b)], &b);
        core.tick();

        state.lock().unwrap().ended = true;
        core.tick();
        engine.poll();
        core.tick();

        assert_eq!(engine.status(), PlaybackStatus::Idle);
        assert_eq!(engine.current().unwrap().id, "b");
    }

    #[test]
    fn repeat_all_wraps_the_queue() {
        let (mut engine, mut core, state, _db) = engine();
        let a = clip("a");
        let b = clip("b");

        engine.play_from(&[Arc::clone(&a), Arc::clone(&b)], &b);
        core.tick();
        engine.cycle_repeat(); // all

        state.lock().unwrap().ended = true;
        core.tick();
        engine.poll();
        core.tick();
        engine.poll();

        assert_eq!(engine.current().unwrap().id, "a");
        assert_eq!(engine.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn repeat_one_replays_the_same_track() {
        let (mut engine, mut core, state, _db) = engine();
        let a = clip("a");
        let b = clip("b");

        engine.play_from(&[Arc::clone(&a), b], &a);
        core.tick();
        engine.cycle_repeat();
        engine.cycle_repeat(); // one

        state.lock().unwrap().ended = true;
        core.tick();
        engine.poll();
        core.tick();
        engine.poll();

        assert_eq!(engine.current().unwrap().id, "a");
        assert_eq!(engine.status(), PlaybackStatus::Playing);
        assert_eq!(state.lock().unwrap().load_calls, 2);
    }

    #[test]
    fn stale_events_cannot_touch_the_new_load() {
        let (mut engine, mut core, _state, _db) = engine();

        // superseded before the core ever ran; its error must not stick
        engine.load_track(unplayable("old"));
        engine.load_track(clip("new"));
        core.tick();
        engine.poll();

        assert!(engine.last_error().is_none());
        assert_eq!(engine.current().unwrap().id, "new");
        assert_eq!(engine.status(), PlaybackStatus::Loading);
    }

    #[test]
    fn drag_overrides_displayed_position_until_release() {
        let (mut engine, mut core, state, _db) = engine();

        engine.load_track(clip("a"));
        engine.play();
        core.tick();

        state.lock().unwrap().position = Duration::from_secs(10);
        core.tick();
        assert_eq!(engine.position(), Duration::from_secs(10));

        engine.drag_to(Duration::from_secs(25));
        assert_eq!(engine.position(), Duration::from_secs(25));
        // graph untouched while dragging
        assert!(state.lock().unwrap().seek_calls.is_empty());

        // immediate seeks are ignored mid-drag
        engine.seek(Duration::from_secs(3));
        core.tick();
        assert!(state.lock().unwrap().seek_calls.is_empty());

        engine.commit_seek_drag();
        core.tick();
        assert_eq!(
            state.lock().unwrap().seek_calls,
            vec![Duration::from_secs(25)]
        );
        assert!(!engine.is_dragging());
    }

    #[test]
    fn recently_played_logs_once_per_load() {
        let (mut engine, mut core, _state, db) = engine();

        engine.load_track(clip("a"));
        engine.play();
        core.tick();
        engine.poll();

        engine.pause();
        core.tick();
        engine.poll();
        engine.play();
        core.tick();
        engine.poll();

        let recent = db
            .lock()
            .unwrap()
            .get_playlists()
            .unwrap()
            .into_iter()
            .find(|p| p.name == RECENTLY_PLAYED)
            .unwrap();
        assert_eq!(recent.tracks.len(), 1);
    }
}
