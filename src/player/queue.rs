use crate::domain::TrackRecord;
use std::sync::Arc;

/// Ordered list of track records plus the playback cursor. Mutated only
/// from the UI thread, on user input or engine end-of-track handling.
#[derive(Default)]
pub struct TrackQueue {
    tracks: Vec<Arc<TrackRecord>>,
    index: usize,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue and point the cursor at `selected`. Falls back
    /// to the first entry when `selected` is not part of `tracks`;
    /// callers are expected to include it.
    pub fn load(&mut self, tracks: &[Arc<TrackRecord>], selected: &TrackRecord) {
        let key = selected.identity_key();
        self.tracks = tracks.to_vec();
        self.index = self
            .tracks
            .iter()
            .position(|t| t.identity_key() == key)
            .unwrap_or(0);
    }

    pub fn current(&self) -> Option<Arc<TrackRecord>> {
        self.tracks.get(self.index).cloned()
    }

    pub fn has_previous(&self) -> bool {
        !self.tracks.is_empty() && self.index > 0
    }

    pub fn has_next(&self) -> bool {
        !self.tracks.is_empty() && self.index + 1 < self.tracks.len()
    }

    pub fn previous(&mut self) -> Option<Arc<TrackRecord>> {
        if self.has_previous() {
            self.index -= 1;
        }
        self.current()
    }

    /// Advance the cursor. At the end of the queue this is a no-op
    /// unless `wrap` (repeat-all), which loops back to the start.
    pub fn next(&mut self, wrap: bool) -> Option<Arc<TrackRecord>> {
        if self.has_next() {
            self.index += 1;
        } else if wrap && !self.tracks.is_empty() {
            self.index = 0;
        } else {
            return None;
        }
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Origin, PlayableSource};

    fn clip(id: &str, url: &str) -> Arc<TrackRecord> {
        Arc::new(TrackRecord {
            id: id.to_string(),
            title: id.to_uppercase(),
            artist: String::new(),
            thumbnail: None,
            source: Some(PlayableSource::PreviewClip(url.to_string())),
            origin: Origin::Spotify,
        })
    }

    #[test]
    fn empty_queue_disables_navigation() {
        let mut queue = TrackQueue::new();
        assert!(queue.current().is_none());
        assert!(!queue.has_previous());
        assert!(!queue.has_next());
        assert!(queue.next(false).is_none());
        assert!(queue.next(true).is_none());
        assert!(queue.previous().is_none());
    }

    #[test]
    fn load_points_at_selected_track() {
        let a = clip("a", "x.mp3");
        let b = clip("b", "y.mp3");
        let mut queue = TrackQueue::new();

        queue.load(&[Arc::clone(&a), Arc::clone(&b)], &b);
        assert_eq!(queue.current().unwrap().id, "b");
        assert!(queue.has_previous());
        assert!(!queue.has_next());
    }

    #[test]
    fn load_falls_back_to_first_when_selection_is_missing() {
        let a = clip("a", "x.mp3");
        let b = clip("b", "y.mp3");
        let stray = clip("z", "z.mp3");
        let mut queue = TrackQueue::new();

        queue.load(&[a, b], &stray);
        assert_eq!(queue.current().unwrap().id, "a");
    }

    #[test]
    fn walk_through_two_track_queue() {
        let a = clip("a", "x.mp3");
        let b = clip("b", "y.mp3");
        let mut queue = TrackQueue::new();
        queue.load(&[Arc::clone(&a), Arc::clone(&b)], &a);

        assert!(!queue.has_previous());
        assert!(queue.has_next());

        let next = queue.next(false).unwrap();
        assert_eq!(next.id, "b");
        assert!(queue.has_previous());
        assert!(!queue.has_next());
    }

    #[test]
    fn next_without_wrap_is_a_no_op_at_the_end() {
        let a = clip("a", "x.mp3");
        let b = clip("b", "y.mp3");
        let mut queue = TrackQueue::new();
        queue.load(&[a, Arc::clone(&b)], &b);

        assert!(queue.next(false).is_none());
        assert_eq!(queue.current().unwrap().id, "b");
    }

    #[test]
    fn next_with_wrap_loops_to_the_front() {
        let a = clip("a", "x.mp3");
        let b = clip("b", "y.mp3");
        let mut queue = TrackQueue::new();
        queue.load(&[a, Arc::clone(&b)], &b);

        let wrapped = queue.next(true).unwrap();
        assert_eq!(wrapped.id, "a");
        assert!(!queue.has_previous());
    }

    #[test]
    fn previous_stops_at_the_front() {
        let a = clip("a", "x.mp3");
        let b = clip("b", "y.mp3");
        let mut queue = TrackQueue::new();
        queue.load(&[Arc::clone(&a), b], &a);

        let still = queue.previous().unwrap();
        assert_eq!(still.id, "a");
    }
}
