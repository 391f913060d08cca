use std::sync::Arc;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use unicode_width::UnicodeWidthStr;

use super::app::{AffixStrip, App, NO_CHARACTERS};
use super::render::draw_app;
use super::rows::{Display, Target};
use crate::client::RaiderIo;
use crate::error::{Error, Result};
use crate::fetch::{AppEvent, FetchResult, Payload};
use crate::response::affixes::AffixesResponse;
use crate::response::profile::{CharacterProfile, MythicPlusRun};
use crate::roster::{CharacterRef, RosterStore};
use crate::thumbnail::Thumbnail;

struct FakeRaiderIo;

#[async_trait]
impl RaiderIo for FakeRaiderIo {
    async fn profile(&self, character: &CharacterRef) -> Result<CharacterProfile> {
        if character.name == "Missing" {
            return Err(Error::status(reqwest::StatusCode::BAD_REQUEST, "character not found"));
        }
        Ok(profile(&character.name))
    }

    async fn affixes(&self) -> Result<AffixesResponse> {
        Err(Error::status(reqwest::StatusCode::SERVICE_UNAVAILABLE, ""))
    }

    async fn image(&self, _url: &str) -> Result<Vec<u8>> {
        Err(Error::status(reqwest::StatusCode::NOT_FOUND, ""))
    }

    fn icon_url(&self, icon: &str) -> String {
        icon.to_string()
    }
}

fn profile(name: &str) -> CharacterProfile {
    CharacterProfile {
        name: name.to_string(),
        class: "Mage".to_string(),
        mythic_plus_best_runs: vec![MythicPlusRun {
            dungeon: Some("Darkflame Cleft".to_string()),
            mythic_level: Some(16),
            score: Some(345.6),
            clear_time_ms: Some(1_700_000),
            completed_at: Some("2025-03-02T20:15:00.000Z".to_string()),
            num_keystone_upgrades: Some(1),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn result(name: &str) -> FetchResult {
    FetchResult {
        character: CharacterRef::new("tw", "illidan", name),
        payload: Payload::Profile(Box::new(profile(name))),
        portrait: Thumbnail::blank(),
    }
}

fn app_in(dir: &tempfile::TempDir) -> (App, UnboundedReceiver<AppEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let store = RosterStore::new(dir.path().join("characters.txt"));
    (App::new(store, Arc::new(FakeRaiderIo), tx), rx)
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

// Wide glyphs occupy two cells; the second one is a filler.
fn buffer_text(buffer: &Buffer) -> String {
    let mut text = String::new();
    let mut skip = 0;
    for cell in buffer.content() {
        if skip > 0 {
            skip -= 1;
            continue;
        }
        text.push_str(cell.symbol());
        skip = cell.symbol().width().saturating_sub(1);
    }
    text
}

fn draw(app: &mut App) -> Buffer {
    let mut terminal = Terminal::new(TestBackend::new(110, 30)).unwrap();
    let frame = terminal.draw(|frame| draw_app(frame, app)).unwrap();
    frame.buffer.clone()
}

fn character_headers(app: &App) -> Vec<String> {
    app.rows()
        .iter()
        .filter(|row| matches!(row.target, Some(Target::Character { .. })))
        .map(|row| row.text())
        .collect()
}

#[test]
fn expansion_survives_a_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, _rx) = app_in(&dir);
    let results = vec![result("A"), result("B"), result("C")];

    app.show_results(&results);
    assert!(character_headers(&app)[0].contains("▲ A"));

    // Cursor starts on A's header.
    app.handle_key(press(KeyCode::Enter));
    assert!(character_headers(&app)[0].contains("▼ A"));

    app.show_results(&results);
    let headers = character_headers(&app);
    assert!(headers[0].contains("▼ A"));
    assert!(headers[1].contains("▲ B"));
    assert!(headers[2].contains("▼ C"));
}

#[test]
fn toggling_a_dungeon_reveals_recent_runs() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, _rx) = app_in(&dir);
    app.show_results(&[result("A")]);

    app.handle_key(press(KeyCode::Down));
    app.handle_key(press(KeyCode::Char(' ')));

    let texts: Vec<String> = app.rows().iter().map(|row| row.text()).collect();
    assert!(texts.iter().any(|t| t.contains("暗焰裂隙") && t.contains("▲")));
    assert!(texts.iter().any(|t| t.contains("無最近紀錄")));
}

#[test]
fn stale_batches_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, _rx) = app_in(&dir);
    let before = app.display().clone();

    app.apply_event(AppEvent::Profiles {
        generation: 3,
        results: vec![result("A")],
    });

    assert_eq!(app.display(), &before);
}

#[test]
fn malformed_payload_replaces_the_body_but_app_keeps_working() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, _rx) = app_in(&dir);
    let mut broken = profile("A");
    broken.mythic_plus_best_runs[0].dungeon = None;

    app.show_results(&[
        result("B"),
        FetchResult {
            character: CharacterRef::new("tw", "illidan", "A"),
            payload: Payload::Profile(Box::new(broken)),
            portrait: Thumbnail::blank(),
        },
    ]);

    assert!(matches!(app.display(), Display::Failed { detail } if detail.contains("dungeon")));
    assert_eq!(app.status(), Some("顯示資料時發生錯誤"));
    app.handle_key(press(KeyCode::Char('q')));
    assert!(app.should_quit());
}

#[test]
fn empty_roster_shows_placeholder_without_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = app_in(&dir);

    app.refresh();

    assert_eq!(app.display(), &Display::error(NO_CHARACTERS));
    assert!(!app.is_refreshing());
    assert!(rx.try_recv().is_err());
    assert!(dir.path().join("characters.txt").exists());
}

#[tokio::test]
async fn refresh_delivers_one_batch_in_roster_order() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = app_in(&dir);
    RosterStore::new(dir.path().join("characters.txt"))
        .save(&[
            CharacterRef::new("tw", "illidan", "A"),
            CharacterRef::new("tw", "illidan", "Missing"),
            CharacterRef::new("tw", "illidan", "C"),
        ])
        .unwrap();

    app.refresh();
    assert!(app.is_refreshing());
    app.refresh();
    assert_eq!(app.status(), Some("更新中，請稍候..."));

    let event = rx.recv().await.unwrap();
    app.apply_event(event);

    assert!(!app.is_refreshing());
    let headers = character_headers(&app);
    assert_eq!(headers.len(), 3);
    assert!(headers[0].contains(" A "));
    assert!(headers[1].contains("Missing"));
    assert!(headers[2].contains(" C "));
    let texts: Vec<String> = app.rows().iter().map(|row| row.text()).collect();
    assert!(texts.iter().any(|t| t.contains("錯誤: HTTP 400 Bad Request")));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn editor_saves_roster_and_refreshes() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = app_in(&dir);

    app.handle_key(press(KeyCode::Char('e')));
    assert!(app.editor().is_some());
    for ch in "illidan".chars() {
        app.handle_key(press(KeyCode::Char(ch)));
    }
    app.handle_key(press(KeyCode::Tab));
    for ch in "Spikyy".chars() {
        app.handle_key(press(KeyCode::Char(ch)));
    }
    app.handle_key(press(KeyCode::Enter));
    app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

    assert!(app.editor().is_none());
    let saved = std::fs::read_to_string(dir.path().join("characters.txt")).unwrap();
    assert!(saved.ends_with("tw,illidan,Spikyy\n"));
    assert!(app.is_refreshing());
    assert!(matches!(rx.recv().await, Some(AppEvent::Profiles { .. })));
}

#[tokio::test]
async fn saving_the_roster_supersedes_a_running_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = app_in(&dir);
    let store = RosterStore::new(dir.path().join("characters.txt"));
    store.save(&[CharacterRef::new("tw", "illidan", "A")]).unwrap();

    app.refresh();
    app.handle_key(press(KeyCode::Char('e')));
    for ch in "illidan".chars() {
        app.handle_key(press(KeyCode::Char(ch)));
    }
    app.handle_key(press(KeyCode::Tab));
    for ch in "B".chars() {
        app.handle_key(press(KeyCode::Char(ch)));
    }
    app.handle_key(press(KeyCode::Enter));
    app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
    assert!(app.is_refreshing());

    // Both batches arrive; only the one started after the save is shown.
    for _ in 0..2 {
        let event = rx.recv().await.unwrap();
        app.apply_event(event);
    }

    assert!(!app.is_refreshing());
    let headers = character_headers(&app);
    assert_eq!(headers.len(), 2);
    assert!(headers[1].contains(" B "));
}

#[tokio::test]
async fn closing_the_editor_on_an_emptied_roster_drops_the_running_batch() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, mut rx) = app_in(&dir);
    let store = RosterStore::new(dir.path().join("characters.txt"));
    store.save(&[CharacterRef::new("tw", "illidan", "A")]).unwrap();

    app.refresh();
    store.save(&[]).unwrap();
    app.handle_key(press(KeyCode::Char('e')));
    app.handle_key(press(KeyCode::Esc));

    assert_eq!(app.display(), &Display::error(NO_CHARACTERS));
    assert!(!app.is_refreshing());

    let event = rx.recv().await.unwrap();
    app.apply_event(event);
    assert_eq!(app.display(), &Display::error(NO_CHARACTERS));
}

#[test]
fn affix_failure_shows_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, _rx) = app_in(&dir);

    app.apply_event(AppEvent::Affixes(Err("HTTP 503".to_string())));

    assert_eq!(app.affixes(), &AffixStrip::Unavailable);
    assert!(buffer_text(&draw(&mut app)).contains("無法載入詞綴"));
}

#[test]
fn drawing_twice_gives_the_same_screen() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, _rx) = app_in(&dir);
    app.show_results(&[result("Tacostruck"), result("Ghostbrew"), result("Missing")]);

    let first = draw(&mut app);
    let second = draw(&mut app);

    assert_eq!(first, second);
    let text = buffer_text(&first);
    assert!(text.contains("Tacostruck"));
    assert!(text.contains("345.6"));
}
