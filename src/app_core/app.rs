use std::sync::{Arc, Mutex};

use anyhow::Result;
use crossbeam_channel::Receiver;
use ratatui::crossterm::event::{Event, KeyEventKind};
use tracing::{error, info, warn};

use crate::{
    Database, Settings,
    app_core::{FetchResult, Fetcher},
    domain::FAVORITES,
    key_handler::{self, Action},
    player::{DEFAULT_VOLUME, PlaybackEngine, PlayerHandle, VisualizerSampler},
    tui,
    ui_state::{InputMode, UiState, View},
};

pub struct TuneDeck {
    settings: Settings,
    db: Arc<Mutex<Database>>,
    engine: PlaybackEngine,
    ui: UiState,
    vis: VisualizerSampler,
    fetcher: Fetcher,
    fetch_rx: Receiver<FetchResult>,
    radio_loaded: bool,
    now_playing_key: Option<u64>,
}

impl TuneDeck {
    pub fn new() -> Result<Self> {
        let settings = Settings::load();
        let db = Arc::new(Mutex::new(Database::open()?));

        let handle = PlayerHandle::spawn()?;
        let engine = PlaybackEngine::new(handle, Arc::clone(&db));
        let (fetcher, fetch_rx) = Fetcher::new(&settings)?;

        Ok(TuneDeck {
            settings,
            db,
            engine,
            ui: UiState::new(),
            vis: VisualizerSampler::new(),
            fetcher,
            fetch_rx,
            radio_loaded: false,
            now_playing_key: None,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::init();
        terminal.clear()?;

        self.engine.set_volume(self.settings.playback.volume);
        self.sync_playlists();

        if !self.fetcher.has_catalog() {
            self.ui.set_error(
                "Spotify credentials missing - edit config.toml to enable Home and catalog search",
            );
        }
        self.ui.home.pending = true;
        self.fetcher.spawn_home();

        // MAIN ROUTINE
        loop {
            self.engine.poll();
            self.drain_fetch_results();
            self.track_change_bookkeeping();

            match key_handler::next_event()? {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = key_handler::handle_key_event(key, &self.ui) {
                        if let Err(e) = self.handle_action(action) {
                            self.ui.set_error(e.to_string());
                        }
                    }
                }
                _ => (),
            }

            terminal.draw(|f| tui::render(f, &mut self.ui, &self.engine, &mut self.vis))?;

            if self.ui.should_quit {
                break;
            }
        }

        self.engine.stop();

        // the session volume becomes the new default
        self.settings.playback.volume = self.engine.volume();
        if let Err(e) = self.settings.save() {
            warn!("could not persist settings: {e:#}");
        }

        ratatui::restore();
        Ok(())
    }
}

impl TuneDeck {
    #[rustfmt::skip]
    fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            // Player
            Action::PlaySelected     => self.play_selected(),
            Action::TogglePause      => self.engine.toggle_playback(),
            Action::NextTrack        => self.engine.next(),
            Action::PrevTrack        => self.engine.previous(),
            Action::SeekForward(s)   => self.engine.seek_by(s),
            Action::SeekBack(s)      => self.engine.seek_by(-s),
            Action::ToggleShuffle    => self.engine.toggle_shuffle(),
            Action::CycleRepeat      => self.engine.cycle_repeat(),
            Action::ToggleFavorite   => { self.engine.toggle_favorite(); self.sync_playlists(); }

            // Volume
            Action::VolumeUp(step)   => self.bump_volume(step),
            Action::VolumeDown(step) => self.bump_volume(-step),
            Action::ToggleMute       => self.toggle_mute(),

            // Navigation
            Action::ChangeView(view) => self.change_view(view),
            Action::CycleView        => self.change_view(self.ui.view.next()),
            Action::NextSection      => self.ui.next_section(),
            Action::PrevSection      => self.ui.prev_section(),
            Action::Scroll(delta)    => self.ui.scroll(delta),

            // Search
            Action::FocusSearch      => {
                self.change_view(View::Search);
                self.ui.input_mode = InputMode::Search;
            }
            Action::SearchInput(c)   => {
                self.ui.search.input.push(c);
                self.ui.update_suggestions();
            }
            Action::SearchBackspace  => {
                self.ui.search.input.pop();
                self.ui.update_suggestions();
            }
            Action::AcceptSuggestion => self.accept_suggestion(),
            Action::SubmitSearch     => self.submit_search(),
            Action::CancelSearch     => self.ui.input_mode = InputMode::Normal,

            // Playlists
            Action::AddToPlaylist      => self.add_to_playlist()?,
            Action::RemoveFromPlaylist => self.remove_from_playlist()?,
            Action::MoveTrackUp        => self.move_track(true)?,
            Action::MoveTrackDown      => self.move_track(false)?,
            Action::CreatePlaylist     => {
                self.ui.popup_input.clear();
                self.ui.input_mode = InputMode::NewPlaylist;
            }
            Action::RenamePlaylist     => self.start_rename(),
            Action::DeletePlaylist     => self.delete_playlist()?,

            // Popup text entry
            Action::PopupInput(c)    => self.ui.popup_input.push(c),
            Action::PopupBackspace   => { self.ui.popup_input.pop(); }
            Action::PopupConfirm     => self.confirm_popup()?,
            Action::PopupCancel      => {
                self.ui.popup_input.clear();
                self.ui.input_mode = InputMode::Normal;
            }

            // Other
            Action::Refresh          => self.refresh_view(),
            Action::DismissError     => self.ui.dismiss_error(),
            Action::Quit             => self.ui.should_quit = true,
        }
        Ok(())
    }
}

impl TuneDeck {
    fn play_selected(&mut self) {
        let tracks = self.ui.visible_tracks();
        let Some(selected) = self.ui.selected_track() else {
            return;
        };

        self.ui.push_seen(&selected);
        self.engine.play_from(&tracks, &selected);
    }

    fn bump_volume(&self, step: i8) {
        let current = self.engine.volume() as i16;
        let target = (current + step as i16).clamp(0, 100) as u8;
        self.engine.set_volume(target);
    }

    fn toggle_mute(&self) {
        // mute restores to the documented 70% default, like the volume
        // button this mirrors
        match self.engine.volume() {
            0 => self.engine.set_volume(DEFAULT_VOLUME),
            _ => self.engine.set_volume(0),
        }
    }

    fn change_view(&mut self, view: View) {
        self.ui.set_view(view);

        // the radio directory is only walked once someone looks at it
        if view == View::Radio && !self.radio_loaded {
            self.radio_loaded = true;
            self.ui.radio.pending = true;
            self.fetcher.spawn_radio();
        }
    }

    fn accept_suggestion(&mut self) {
        if let Some(suggestion) = self.ui.search.suggestions.first().cloned() {
            self.ui.search.input = suggestion;
            self.ui.update_suggestions();
        }
    }

    fn submit_search(&mut self) {
        let query = self.ui.search.input.trim().to_string();
        if query.is_empty() {
            return;
        }

        info!("searching for {query:?}");
        self.ui.search.last_query = query.clone();
        self.ui.search.pending = true;
        self.ui.search.results.clear();
        self.ui.search.table.select(None);
        self.ui.input_mode = InputMode::Normal;
        self.fetcher.spawn_search(query);
    }

    fn refresh_view(&mut self) {
        match self.ui.view {
            View::Home => {
                self.ui.home.pending = true;
                self.fetcher.spawn_home();
            }
            View::Radio => {
                self.ui.radio.pending = true;
                self.fetcher.spawn_radio();
            }
            View::Search => {
                let query = self.ui.search.last_query.clone();
                if !query.is_empty() {
                    self.ui.search.pending = true;
                    self.fetcher.spawn_search(query);
                }
            }
            View::Playlists => self.sync_playlists(),
        }
    }

    fn drain_fetch_results(&mut self) {
        while let Ok(result) = self.fetch_rx.try_recv() {
            match result {
                FetchResult::Home(sections) => {
                    for tracks in sections.values() {
                        for track in tracks {
                            self.ui.push_seen(track);
                        }
                    }
                    self.ui.home.set(sections);
                }
                FetchResult::Search { query, tracks } => {
                    // a newer query may have been submitted since
                    if query != self.ui.search.last_query {
                        continue;
                    }
                    for track in &tracks {
                        self.ui.push_seen(track);
                    }
                    self.ui.search.results = tracks;
                    self.ui.search.pending = false;
                    self.ui.search.table.select(Some(0));
                }
                FetchResult::Radio(sections) => {
                    for tracks in sections.values() {
                        for track in tracks {
                            self.ui.push_seen(track);
                        }
                    }
                    self.ui.radio.set(sections);
                }
            }
        }
    }

    /// Sidebar counts follow the "Recently Played" write that happens
    /// inside the engine when a new track starts.
    fn track_change_bookkeeping(&mut self) {
        let key = self.engine.current().map(|t| t.identity_key());
        if key != self.now_playing_key {
            self.now_playing_key = key;
            self.sync_playlists();
        }
    }

    fn sync_playlists(&mut self) {
        // a failing store degrades to an empty sidebar, never a crash
        match self.db.lock().unwrap().get_playlists() {
            Ok(playlists) => self.ui.sync_playlists(playlists),
            Err(e) => error!("playlist load failed: {e:#}"),
        }
    }
}

// ================
//    PLAYLISTS
// ================
impl TuneDeck {
    fn add_to_playlist(&mut self) -> Result<()> {
        match self.ui.view {
            View::Playlists => {
                let Some(track) = self.engine.current().cloned() else {
                    self.ui.set_error("Nothing playing to add");
                    return Ok(());
                };
                let Some(playlist) = self.ui.selected_playlist() else {
                    return Ok(());
                };
                let (id, name) = (playlist.id, playlist.name.clone());

                self.db.lock().unwrap().add_track_by_id(id, &track)?;
                self.sync_playlists();
                info!("added {:?} to {name:?}", track.title);
            }
            _ => {
                let Some(track) = self.ui.selected_track() else {
                    return Ok(());
                };
                self.db
                    .lock()
                    .unwrap()
                    .add_track_to_playlist(FAVORITES, &track)?;
                self.sync_playlists();
            }
        }
        Ok(())
    }

    fn remove_from_playlist(&mut self) -> Result<()> {
        let Some(playlist) = self.ui.selected_playlist() else {
            return Ok(());
        };
        let id = playlist.id;
        let Some(track) = self.ui.selected_track() else {
            return Ok(());
        };

        self.db.lock().unwrap().remove_track_from_playlist(id, &track)?;
        self.sync_playlists();
        self.ui.scroll(0);
        Ok(())
    }

    fn move_track(&mut self, up: bool) -> Result<()> {
        let Some(playlist) = self.ui.selected_playlist() else {
            return Ok(());
        };
        let id = playlist.id;
        let Some(index) = self.ui.playlist_table.selected() else {
            return Ok(());
        };

        self.db.lock().unwrap().move_track(id, index, up)?;
        self.sync_playlists();
        self.ui.scroll(match up {
            true => -1,
            false => 1,
        });
        Ok(())
    }

    fn start_rename(&mut self) {
        let Some(playlist) = self.ui.selected_playlist() else {
            return;
        };
        if playlist.protected {
            self.ui.set_error("Default playlists cannot be renamed");
            return;
        }

        self.ui.popup_input = playlist.name.clone();
        self.ui.input_mode = InputMode::RenamePlaylist;
    }

    fn delete_playlist(&mut self) -> Result<()> {
        let Some(playlist) = self.ui.selected_playlist() else {
            return Ok(());
        };
        let (id, name) = (playlist.id, playlist.name.clone());

        self.db.lock().unwrap().delete_playlist(id)?;
        self.ui.playlist_pos.select(Some(0));
        self.sync_playlists();
        info!("deleted playlist {name:?}");
        Ok(())
    }

    fn confirm_popup(&mut self) -> Result<()> {
        let name = self.ui.popup_input.trim().to_string();

        match self.ui.input_mode {
            InputMode::NewPlaylist => {
                self.db.lock().unwrap().create_playlist(&name)?;
            }
            InputMode::RenamePlaylist => {
                if let Some(playlist) = self.ui.selected_playlist() {
                    let id = playlist.id;
                    self.db.lock().unwrap().rename_playlist(id, &name)?;
                }
            }
            _ => {}
        }

        self.ui.popup_input.clear();
        self.ui.input_mode = InputMode::Normal;
        self.sync_playlists();
        Ok(())
    }
}
