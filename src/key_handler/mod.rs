use anyhow::Result;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::{
    REFRESH_RATE,
    ui_state::{InputMode, UiState, View},
};

const SEEK_SMALL: i64 = 5;
const SEEK_LARGE: i64 = 30;
const VOLUME_STEP: i8 = 5;

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    // Player controls
    PlaySelected,
    TogglePause,
    NextTrack,
    PrevTrack,
    SeekForward(i64),
    SeekBack(i64),
    VolumeUp(i8),
    VolumeDown(i8),
    ToggleMute,
    ToggleShuffle,
    CycleRepeat,
    ToggleFavorite,

    // Navigation
    ChangeView(View),
    CycleView,
    NextSection,
    PrevSection,
    Scroll(isize),

    // Search
    FocusSearch,
    SearchInput(char),
    SearchBackspace,
    AcceptSuggestion,
    SubmitSearch,
    CancelSearch,

    // Playlists
    AddToPlaylist,
    RemoveFromPlaylist,
    MoveTrackUp,
    MoveTrackDown,
    CreatePlaylist,
    RenamePlaylist,
    DeletePlaylist,

    // Popup text entry
    PopupInput(char),
    PopupBackspace,
    PopupConfirm,
    PopupCancel,

    // Other
    Refresh,
    DismissError,
    Quit,
}

/// Poll one terminal event per frame.
pub fn next_event() -> Result<Option<Event>> {
    match event::poll(REFRESH_RATE)? {
        true => Ok(Some(event::read()?)),
        false => Ok(None),
    }
}

pub fn handle_key_event(key: KeyEvent, ui: &UiState) -> Option<Action> {
    match ui.input_mode {
        InputMode::Search => search_input(key),
        InputMode::NewPlaylist | InputMode::RenamePlaylist => popup_input(key),
        InputMode::Normal => normal_input(key, ui),
    }
}

fn search_input(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::CancelSearch),
        KeyCode::Enter => Some(Action::SubmitSearch),
        KeyCode::Tab => Some(Action::AcceptSuggestion),
        KeyCode::Backspace => Some(Action::SearchBackspace),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::SearchInput(c))
        }
        _ => None,
    }
}

fn popup_input(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::PopupCancel),
        KeyCode::Enter => Some(Action::PopupConfirm),
        KeyCode::Backspace => Some(Action::PopupBackspace),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::PopupInput(c))
        }
        _ => None,
    }
}

#[rustfmt::skip]
fn normal_input(key: KeyEvent, ui: &UiState) -> Option<Action> {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let action = match key.code {
        KeyCode::Char('q')      => Action::Quit,
        KeyCode::Char('/')      => Action::FocusSearch,

        KeyCode::Char('1')      => Action::ChangeView(View::Home),
        KeyCode::Char('2')      => Action::ChangeView(View::Search),
        KeyCode::Char('3')      => Action::ChangeView(View::Radio),
        KeyCode::Char('4')      => Action::ChangeView(View::Playlists),
        KeyCode::Tab            => Action::CycleView,

        KeyCode::Char('j') | KeyCode::Down => Action::Scroll(1),
        KeyCode::Char('k') | KeyCode::Up   => Action::Scroll(-1),
        KeyCode::Char(']')      => Action::NextSection,
        KeyCode::Char('[')      => Action::PrevSection,

        KeyCode::Enter          => Action::PlaySelected,
        KeyCode::Char(' ')      => Action::TogglePause,
        KeyCode::Char('n')      => Action::NextTrack,
        KeyCode::Char('p')      => Action::PrevTrack,

        KeyCode::Right if shift => Action::SeekForward(SEEK_LARGE),
        KeyCode::Left if shift  => Action::SeekBack(SEEK_LARGE),
        KeyCode::Right          => Action::SeekForward(SEEK_SMALL),
        KeyCode::Left           => Action::SeekBack(SEEK_SMALL),

        KeyCode::Char('+') | KeyCode::Char('=') => Action::VolumeUp(VOLUME_STEP),
        KeyCode::Char('-')      => Action::VolumeDown(VOLUME_STEP),
        KeyCode::Char('m')      => Action::ToggleMute,

        KeyCode::Char('s')      => Action::ToggleShuffle,
        KeyCode::Char('r')      => Action::CycleRepeat,
        KeyCode::Char('f')      => Action::ToggleFavorite,

        KeyCode::Char('a')      => Action::AddToPlaylist,
        KeyCode::Char('u')      => Action::Refresh,
        KeyCode::Esc            => Action::DismissError,

        // playlist management only makes sense on the playlists view
        KeyCode::Char('d') if ui.view == View::Playlists => Action::RemoveFromPlaylist,
        KeyCode::Char('J') if ui.view == View::Playlists => Action::MoveTrackDown,
        KeyCode::Char('K') if ui.view == View::Playlists => Action::MoveTrackUp,
        KeyCode::Char('c') if ui.view == View::Playlists => Action::CreatePlaylist,
        KeyCode::Char('R') if ui.view == View::Playlists => Action::RenamePlaylist,
        KeyCode::Char('X') if ui.view == View::Playlists => Action::DeletePlaylist,

        _ => return None,
    };

    Some(action)
}
