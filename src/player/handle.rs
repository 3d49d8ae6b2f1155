use std::{sync::Arc, time::Duration};

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::{
    domain::TrackRecord,
    player::{
        AudioBackend, LoadSeq, PlaybackMetrics, PlayerCommand, PlayerEvent, RodioBackend,
        core::PlayerCore,
    },
};

/// UI-thread half of the player: command senders, event drain, metrics.
pub struct PlayerHandle {
    commands: Sender<PlayerCommand>,
    events: Receiver<PlayerEvent>,
    metrics: Arc<PlaybackMetrics>,
    next_seq: LoadSeq,
}

impl PlayerHandle {
    pub fn spawn() -> Result<Self> {
        let backend = RodioBackend::new()?;
        Ok(Self::with_backend(Box::new(backend)))
    }

    pub fn with_backend(backend: Box<dyn AudioBackend>) -> Self {
        let (cmd_tx, cmd_rx) = unbounded();
        let (evt_tx, evt_rx) = unbounded();
        let metrics = PlaybackMetrics::new();

        PlayerCore::spawn(backend, cmd_rx, evt_tx, Arc::clone(&metrics));

        Self {
            commands: cmd_tx,
            events: evt_rx,
            metrics,
            next_seq: 0,
        }
    }

    /// Handle plus an unspawned core, so tests drive ticks themselves.
    #[cfg(test)]
    pub(crate) fn detached(backend: Box<dyn AudioBackend>) -> (Self, PlayerCore) {
        let (cmd_tx, cmd_rx) = unbounded();
        let (evt_tx, evt_rx) = unbounded();
        let metrics = PlaybackMetrics::new();

        let core = PlayerCore::new(backend, cmd_rx, evt_tx, Arc::clone(&metrics));

        (
            Self {
                commands: cmd_tx,
                events: evt_rx,
                metrics,
                next_seq: 0,
            },
            core,
        )
    }

    pub fn metrics(&self) -> Arc<PlaybackMetrics> {
        Arc::clone(&self.metrics)
    }
}

// =====================
//    COMMAND HANDLER
// =====================
impl PlayerHandle {
    pub fn load(&mut self, track: Arc<TrackRecord>) -> LoadSeq {
        self.next_seq += 1;
        let seq = self.next_seq;
        let _ = self.commands.send(PlayerCommand::Load(track, seq));
        seq
    }

    pub fn play(&self) -> Result<()> {
        self.commands.send(PlayerCommand::Play)?;
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        self.commands.send(PlayerCommand::Pause)?;
        Ok(())
    }

    pub fn stop(&self) -> Result<()> {
        self.commands.send(PlayerCommand::Stop)?;
        Ok(())
    }

    pub fn seek(&self, pos: Duration) -> Result<()> {
        self.commands.send(PlayerCommand::Seek(pos))?;
        Ok(())
    }

    pub fn set_volume(&self, percent: u8) -> Result<()> {
        self.commands.send(PlayerCommand::SetVolume(percent))?;
        Ok(())
    }
}

// ===============
//    ACCESSORS
// ===============
impl PlayerHandle {
    pub fn poll_events(&self) -> Vec<PlayerEvent> {
        std::iter::from_fn(|| self.events.try_recv().ok()).collect()
    }
}
