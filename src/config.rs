use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::config_dir;
use crate::player::DEFAULT_VOLUME;

/// `config.toml` in the platform config dir. A missing file simply
/// means defaults; provider sections without credentials disable that
/// provider's fetches.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub spotify: SpotifySettings,
    #[serde(default)]
    pub youtube: YouTubeSettings,
    #[serde(default)]
    pub playback: PlaybackSettings,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpotifySettings {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

impl SpotifySettings {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct YouTubeSettings {
    #[serde(default)]
    pub api_key: String,
}

impl YouTubeSettings {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub volume: u8,
}

fn default_volume() -> u8 {
    DEFAULT_VOLUME
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        PlaybackSettings {
            volume: default_volume(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    pub fn load() -> Self {
        match Self::config_path().and_then(|p| Self::load_from(&p)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("using default settings: {e:#}");
                Settings::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.spotify.client_id = "id".into();
        settings.spotify.client_secret = "secret".into();
        settings.playback.volume = 45;

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded.spotify.client_id, "id");
        assert!(loaded.spotify.is_configured());
        assert!(!loaded.youtube.is_configured());
        assert_eq!(loaded.playback.volume, 45);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[youtube]\napi_key = \"k\"\n").unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert!(loaded.youtube.is_configured());
        assert!(!loaded.spotify.is_configured());
        assert_eq!(loaded.playback.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn volume_default_matches_documented_convention() {
        assert_eq!(PlaybackSettings::default().volume, 70);
    }
}
