use std::sync::Arc;

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use indexmap::IndexMap;
use ratatui::widgets::{ListState, TableState};
use unicode_normalization::UnicodeNormalization;

use crate::domain::{Playlist, TrackRecord};

const SUGGESTION_LIMIT: usize = 5;
const SEEN_POOL_CAP: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Home,
    Search,
    Radio,
    Playlists,
}

impl View {
    pub const ALL: [View; 4] = [View::Home, View::Search, View::Radio, View::Playlists];

    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Search => "Search",
            View::Radio => "Radio",
            View::Playlists => "Playlists",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> View {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    NewPlaylist,
    RenamePlaylist,
}

/// Browse pane broken into named sections (genre rails, radio
/// categories); one section is visible at a time.
pub struct SectionedTracks {
    pub sections: IndexMap<String, Vec<Arc<TrackRecord>>>,
    pub section_idx: usize,
    pub table: TableState,
    pub pending: bool,
}

impl SectionedTracks {
    fn new() -> Self {
        SectionedTracks {
            sections: IndexMap::new(),
            section_idx: 0,
            table: TableState::default(),
            pending: false,
        }
    }

    pub fn set(&mut self, sections: IndexMap<String, Vec<Arc<TrackRecord>>>) {
        self.sections = sections;
        self.section_idx = 0;
        self.table.select(Some(0));
        self.pending = false;
    }

    pub fn section_title(&self) -> Option<&str> {
        self.sections
            .get_index(self.section_idx)
            .map(|(name, _)| name.as_str())
    }

    pub fn tracks(&self) -> &[Arc<TrackRecord>] {
        self.sections
            .get_index(self.section_idx)
            .map(|(_, tracks)| tracks.as_slice())
            .unwrap_or(&[])
    }

    fn shift_section(&mut self, forward: bool) {
        let len = self.sections.len();
        if len == 0 {
            return;
        }
        self.section_idx = match forward {
            true => (self.section_idx + 1) % len,
            false => (self.section_idx + len - 1) % len,
        };
        self.table.select(Some(0));
    }
}

pub struct SearchPane {
    pub input: String,
    pub last_query: String,
    pub suggestions: Vec<String>,
    pub results: Vec<Arc<TrackRecord>>,
    pub table: TableState,
    pub pending: bool,
}

impl SearchPane {
    fn new() -> Self {
        SearchPane {
            input: String::new(),
            last_query: String::new(),
            suggestions: Vec::new(),
            results: Vec::new(),
            table: TableState::default(),
            pending: false,
        }
    }
}

pub struct UiState {
    pub view: View,
    pub input_mode: InputMode,
    pub popup_input: String,

    pub home: SectionedTracks,
    pub radio: SectionedTracks,
    pub search: SearchPane,

    pub playlists: Vec<Playlist>,
    pub playlist_pos: ListState,
    pub playlist_table: TableState,

    pub error: Option<String>,
    pub should_quit: bool,

    seen_pool: Vec<String>,
    matcher: SkimMatcherV2,
}

impl UiState {
    pub fn new() -> Self {
        let mut playlist_pos = ListState::default();
        playlist_pos.select(Some(0));

        UiState {
            view: View::Home,
            input_mode: InputMode::Normal,
            popup_input: String::new(),
            home: SectionedTracks::new(),
            radio: SectionedTracks::new(),
            search: SearchPane::new(),
            playlists: Vec::new(),
            playlist_pos,
            playlist_table: TableState::default(),
            error: None,
            should_quit: false,
            seen_pool: Vec::new(),
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
        if self.input_mode == InputMode::Search && view != View::Search {
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

// =======================
//   SELECTION & SCROLL
// =======================
impl UiState {
    pub fn visible_tracks(&self) -> Vec<Arc<TrackRecord>> {
        match self.view {
            View::Home => self.home.tracks().to_vec(),
            View::Search => self.search.results.clone(),
            View::Radio => self.radio.tracks().to_vec(),
            View::Playlists => self
                .selected_playlist()
                .map(|p| p.tracks.clone())
                .unwrap_or_default(),
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.active_table().selected()
    }

    pub fn selected_track(&self) -> Option<Arc<TrackRecord>> {
        let tracks = self.visible_tracks();
        self.selected_index()
            .and_then(|i| tracks.get(i))
            .cloned()
    }

    fn active_table(&self) -> &TableState {
        match self.view {
            View::Home => &self.home.table,
            View::Search => &self.search.table,
            View::Radio => &self.radio.table,
            View::Playlists => &self.playlist_table,
        }
    }

    fn active_table_mut(&mut self) -> &mut TableState {
        match self.view {
            View::Home => &mut self.home.table,
            View::Search => &mut self.search.table,
            View::Radio => &mut self.radio.table,
            View::Playlists => &mut self.playlist_table,
        }
    }

    pub fn scroll(&mut self, delta: isize) {
        let len = self.visible_tracks().len();
        if len == 0 {
            self.active_table_mut().select(None);
            return;
        }

        let current = self.active_table().selected().unwrap_or(0) as isize;
        let target = (current + delta).clamp(0, len as isize - 1) as usize;
        self.active_table_mut().select(Some(target));
    }

    pub fn next_section(&mut self) {
        match self.view {
            View::Home => self.home.shift_section(true),
            View::Radio => self.radio.shift_section(true),
            View::Playlists => self.shift_playlist(true),
            View::Search => {}
        }
    }

    pub fn prev_section(&mut self) {
        match self.view {
            View::Home => self.home.shift_section(false),
            View::Radio => self.radio.shift_section(false),
            View::Playlists => self.shift_playlist(false),
            View::Search => {}
        }
    }

    fn shift_playlist(&mut self, forward: bool) {
        let len = self.playlists.len();
        if len == 0 {
            return;
        }
        let current = self.playlist_pos.selected().unwrap_or(0);
        let target = match forward {
            true => (current + 1) % len,
            false => (current + len - 1) % len,
        };
        self.playlist_pos.select(Some(target));
        self.playlist_table.select(Some(0));
    }
}

// ================
//    PLAYLISTS
// ================
impl UiState {
    pub fn sync_playlists(&mut self, playlists: Vec<Playlist>) {
        self.playlists = playlists;

        let len = self.playlists.len();
        match self.playlist_pos.selected() {
            Some(i) if i < len => {}
            _ => self.playlist_pos.select(match len {
                0 => None,
                _ => Some(0),
            }),
        }
    }

    pub fn selected_playlist(&self) -> Option<&Playlist> {
        self.playlist_pos
            .selected()
            .and_then(|i| self.playlists.get(i))
    }
}

// ==================
//    SUGGESTIONS
// ==================
impl UiState {
    /// Feed the suggestion pool with titles/artists the user has seen.
    pub fn push_seen(&mut self, track: &TrackRecord) {
        for candidate in [track.title.as_str(), track.artist.as_str()] {
            if candidate.is_empty() {
                continue;
            }
            if self.seen_pool.iter().any(|s| s == candidate) {
                continue;
            }
            self.seen_pool.push(candidate.to_string());
        }
        if self.seen_pool.len() > SEEN_POOL_CAP {
            let excess = self.seen_pool.len() - SEEN_POOL_CAP;
            self.seen_pool.drain(0..excess);
        }
    }

    pub fn update_suggestions(&mut self) {
        let query = normalize(&self.search.input);
        if query.len() < 2 {
            self.search.suggestions.clear();
            return;
        }

        let mut scored: Vec<(i64, &String)> = self
            .seen_pool
            .iter()
            .filter_map(|candidate| {
                self.matcher
                    .fuzzy_match(&normalize(candidate), &query)
                    .map(|score| (score, candidate))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        self.search.suggestions = scored
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .map(|(_, s)| s.clone())
            .collect();
    }
}

fn normalize(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}
