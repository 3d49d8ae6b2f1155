use anyhow::{Context, Result, anyhow};
use rodio::{ChannelCount, Decoder, OutputStream, OutputStreamBuilder, SampleRate, Sink, Source};
use std::{
    collections::VecDeque,
    io::{self, Cursor, Read, Seek, SeekFrom},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::{
    domain::PlayableSource,
    player::{AudioBackend, SAMPLE_TAP_CAPACITY},
    providers,
};

const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

// Enough head-room for format probing on live streams.
const PROBE_CAPACITY: usize = 256 * 1024;

pub struct RodioBackend {
    sink: Sink,
    _stream: OutputStream,
    http: reqwest::blocking::Client,
    track_ended: Arc<AtomicBool>,
    sample_tap: Arc<Mutex<VecDeque<f32>>>,
    duration: Option<Duration>,
}

impl RodioBackend {
    pub fn new() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio reports dropped streams on stderr, which clobbers the TUI.
        stream.log_on_drop(false);

        let sink = Sink::connect_new(stream.mixer());
        sink.pause();

        let http = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(providers::USER_AGENT)
            .build()?;

        Ok(Self {
            sink,
            _stream: stream,
            http,
            track_ended: Arc::new(AtomicBool::new(false)),
            sample_tap: Arc::new(Mutex::new(VecDeque::with_capacity(SAMPLE_TAP_CAPACITY))),
            duration: None,
        })
    }

    fn bind_clip(&mut self, url: &str) -> Result<Option<Duration>> {
        let bytes = self
            .http
            .get(url)
            .send()?
            .error_for_status()?
            .bytes()
            .context("could not read audio body")?;
        let len = bytes.len() as u64;

        let decoder = Decoder::builder()
            .with_data(Cursor::new(bytes.to_vec()))
            .with_byte_len(len)
            .with_seekable(true)
            .build()?;

        let duration = decoder.total_duration();
        self.append(decoder);
        Ok(duration)
    }

    fn bind_stream(&mut self, url: &str) -> Result<Option<Duration>> {
        let response = self.http.get(url).send()?.error_for_status()?;
        let reader = ProbeBufferedStream::new(Box::new(response));

        let decoder = Decoder::builder()
            .with_data(reader)
            .with_seekable(false)
            .build()?;

        self.append(decoder);
        Ok(None)
    }

    fn append<S>(&mut self, source: S)
    where
        S: Source<Item = f32> + Send + 'static,
    {
        let tapped = TappedSource::new(
            source,
            Arc::clone(&self.sample_tap),
            Arc::clone(&self.track_ended),
        );

        self.sink.append(tapped);
    }
}

impl AudioBackend for RodioBackend {
    fn load(&mut self, source: &PlayableSource) -> Result<()> {
        // release the old binding first; clear() leaves the sink paused
        // and the session itself is reused across every track
        self.sink.clear();
        self.track_ended.store(false, Ordering::SeqCst);
        if let Ok(mut tap) = self.sample_tap.lock() {
            tap.clear();
        }

        self.duration = match source {
            PlayableSource::LiveStream(url) => self.bind_stream(url)?,
            PlayableSource::PreviewClip(url) | PlayableSource::ExternalLink(url) => {
                self.bind_clip(url)?
            }
        };

        Ok(())
    }

    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.clear();
        self.track_ended.store(false, Ordering::SeqCst);
        self.duration = None;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.sink
            .try_seek(position)
            .map_err(|e| anyhow!("seek failed: {e}"))
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn track_ended(&self) -> bool {
        self.track_ended.load(Ordering::SeqCst) && self.sink.empty()
    }

    fn drain_samples(&mut self) -> Vec<f32> {
        match self.sample_tap.try_lock() {
            Ok(mut tap) => tap.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Gives the decoder a rewindable prefix over a non-seekable network
/// stream. Format probing rewinds land inside the retained prefix; once
/// playback has streamed past it, backward seeks are refused.
struct ProbeBufferedStream {
    inner: Mutex<Box<dyn Read + Send>>,
    prefix: Vec<u8>,
    pos: u64,
    pulled: u64,
}

impl ProbeBufferedStream {
    fn new(inner: Box<dyn Read + Send>) -> Self {
        ProbeBufferedStream {
            inner: Mutex::new(inner),
            prefix: Vec::new(),
            pos: 0,
            pulled: 0,
        }
    }
}

impl Read for ProbeBufferedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pos = self.pos as usize;
        if pos < self.prefix.len() {
            let n = (self.prefix.len() - pos).min(buf.len());
            buf[..n].copy_from_slice(&self.prefix[pos..pos + n]);
            self.pos += n as u64;
            return Ok(n);
        }

        let n = self.inner.lock().unwrap().read(buf)?;
        if self.prefix.len() < PROBE_CAPACITY {
            let keep = n.min(PROBE_CAPACITY - self.prefix.len());
            self.prefix.extend_from_slice(&buf[..keep]);
        }
        self.pulled += n as u64;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for ProbeBufferedStream {
    fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        let target = match from {
            SeekFrom::Start(p) => p as i128,
            SeekFrom::Current(offset) => self.pos as i128 + offset as i128,
            SeekFrom::End(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "stream length is unknown",
                ));
            }
        };

        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before stream start",
            ));
        }
        let target = target as u64;

        if target == self.pos {
            return Ok(self.pos);
        }
        // Valid only while everything pulled so far is still buffered.
        if self.pulled == self.prefix.len() as u64 && target <= self.pulled {
            self.pos = target;
            return Ok(target);
        }

        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "seek target left the probe window",
        ))
    }
}

pub struct TappedSource<I> {
    input: I,
    tap: Arc<Mutex<VecDeque<f32>>>,
    ended: Arc<AtomicBool>,
}

impl<I> TappedSource<I> {
    pub fn new(input: I, tap: Arc<Mutex<VecDeque<f32>>>, ended: Arc<AtomicBool>) -> Self {
        TappedSource { input, tap, ended }
    }
}

impl<I> Iterator for TappedSource<I>
where
    I: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        match self.input.next() {
            Some(sample) => {
                if let Ok(mut samples) = self.tap.try_lock() {
                    if samples.len() >= SAMPLE_TAP_CAPACITY {
                        samples.pop_front();
                    }
                    samples.push_back(sample);
                }
                Some(sample)
            }
            None => {
                self.ended.store(true, Ordering::SeqCst);
                None
            }
        }
    }
}

impl<I> Source for TappedSource<I>
where
    I: Source<Item = f32>,
{
    fn current_span_len(&self) -> Option<usize> {
        self.input.current_span_len()
    }

    fn channels(&self) -> ChannelCount {
        self.input.channels()
    }

    fn sample_rate(&self) -> SampleRate {
        self.input.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.input.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), rodio::source::SeekError> {
        self.input.try_seek(pos)
    }
}
