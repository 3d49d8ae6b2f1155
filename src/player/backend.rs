use crate::domain::PlayableSource;
use anyhow::Result;
use std::time::Duration;

/// Capability surface of the platform audio device. The engine and core
/// only ever talk to this, so transport logic stays testable without an
/// output device.
pub trait AudioBackend: Send {
    /// Bind a new source. The underlying output session is reused; only
    /// the source binding changes. The sink stays paused until `play`.
    fn load(&mut self, source: &PlayableSource) -> Result<()>;

    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);

    fn seek(&mut self, position: Duration) -> Result<()>;
    fn set_volume(&mut self, volume: f32);

    fn position(&self) -> Duration;

    /// Total duration of the bound source, if the decoder reports one.
    /// Live streams never do.
    fn duration(&self) -> Option<Duration>;

    fn is_paused(&self) -> bool;

    /// True once the bound source has played to its natural end.
    fn track_ended(&self) -> bool;

    fn drain_samples(&mut self) -> Vec<f32>;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use anyhow::anyhow;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    pub(crate) struct FakeState {
        pub loaded: Option<PlayableSource>,
        pub playing: bool,
        pub position: Duration,
        pub duration: Option<Duration>,
        pub volume: f32,
        pub ended: bool,
        pub load_calls: usize,
        pub seek_calls: Vec<Duration>,
        pub samples: Vec<f32>,
    }

    /// Scripted stand-in for the device: any source whose URL contains
    /// "bad" refuses to bind.
    pub(crate) struct FakeBackend {
        state: Arc<Mutex<FakeState>>,
    }

    impl FakeBackend {
        pub(crate) fn new() -> (Self, Arc<Mutex<FakeState>>) {
            let state = Arc::new(Mutex::new(FakeState::default()));
            (
                FakeBackend {
                    state: Arc::clone(&state),
                },
                state,
            )
        }
    }

    impl AudioBackend for FakeBackend {
        fn load(&mut self, source: &PlayableSource) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.load_calls += 1;
            if source.url().contains("bad") {
                return Err(anyhow!("unsupported format"));
            }
            state.loaded = Some(source.clone());
            state.playing = false;
            state.position = Duration::ZERO;
            state.ended = false;
            state.duration = match source.is_live() {
                true => None,
                false => Some(Duration::from_secs(30)),
            };
            Ok(())
        }

        fn play(&mut self) {
            self.state.lock().unwrap().playing = true;
        }

        fn pause(&mut self) {
            self.state.lock().unwrap().playing = false;
        }

        fn stop(&mut self) {
            let mut state = self.state.lock().unwrap();
            state.loaded = None;
            state.playing = false;
            state.position = Duration::ZERO;
        }

        fn seek(&mut self, position: Duration) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.seek_calls.push(position);
            state.position = position;
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) {
            self.state.lock().unwrap().volume = volume;
        }

        fn position(&self) -> Duration {
            self.state.lock().unwrap().position
        }

        fn duration(&self) -> Option<Duration> {
            self.state.lock().unwrap().duration
        }

        fn is_paused(&self) -> bool {
            !self.state.lock().unwrap().playing
        }

        fn track_ended(&self) -> bool {
            self.state.lock().unwrap().ended
        }

        fn drain_samples(&mut self) -> Vec<f32> {
            std::mem::take(&mut self.state.lock().unwrap().samples)
        }
    }
}
