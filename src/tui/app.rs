use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::client::RaiderIo;
use crate::fetch::{Affix, AppEvent, FetchResult, spawn_affixes, spawn_refresh};
use crate::roster::{CharacterRef, RosterStore};
use crate::tui::editor::{EditorOutcome, RosterEditor};
use crate::tui::expansion::ExpansionState;
use crate::tui::rows::{Display, DisplayRow, Target, build_rows};
use crate::view::build_character;

pub const NO_CHARACTERS: &str = "未找到角色資料或檔案格式錯誤（按 e 新增角色）";
pub const LOADING: &str = "載入中...";

#[derive(Debug, Clone, PartialEq)]
pub enum AffixStrip {
    Loading,
    Loaded(Vec<Affix>),
    Unavailable,
}

pub struct App {
    store: RosterStore,
    source: Arc<dyn RaiderIo>,
    tx: UnboundedSender<AppEvent>,
    display: Display,
    affixes: AffixStrip,
    expansion: ExpansionState,
    selected: usize,
    pub(super) scroll: usize,
    generation: u64,
    refreshing: bool,
    status: Option<String>,
    editor: Option<RosterEditor>,
    show_affix_details: bool,
    should_quit: bool,
}

impl App {
    pub fn new(store: RosterStore, source: Arc<dyn RaiderIo>, tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            store,
            source,
            tx,
            display: Display::message(LOADING),
            affixes: AffixStrip::Loading,
            expansion: ExpansionState::default(),
            selected: 0,
            scroll: 0,
            generation: 0,
            refreshing: false,
            status: None,
            editor: None,
            show_affix_details: false,
            should_quit: false,
        }
    }

    /// Creates the roster if needed, then kicks off the affix load and the first refresh.
    pub fn start(&mut self) {
        if let Err(err) = self.store.ensure_exists() {
            warn!(error = %err, path = %self.store.path().display(), "cannot create roster");
            self.status = Some(format!("無法創建角色檔案: {err}"));
        }
        spawn_affixes(self.source.clone(), self.tx.clone());
        self.refresh();
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn affixes(&self) -> &AffixStrip {
        &self.affixes
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn editor(&self) -> Option<&RosterEditor> {
        self.editor.as_ref()
    }

    pub fn show_affix_details(&self) -> bool {
        self.show_affix_details
    }

    pub fn roster_path(&self) -> &std::path::Path {
        self.store.path()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn rows(&self) -> Vec<DisplayRow> {
        build_rows(&self.display, &self.expansion)
    }

    /// Index into [`App::rows`] of the highlighted row, if any row is selectable.
    pub fn selected_row(&self, rows: &[DisplayRow]) -> Option<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| row.target.is_some())
            .nth(self.selected)
            .map(|(i, _)| i)
    }

    fn read_roster(&mut self) -> Vec<CharacterRef> {
        match self.store.load() {
            Ok(load) => {
                if load.dropped > 0 {
                    self.status = Some(format!("已略過 {} 行格式錯誤的角色資料", load.dropped));
                }
                load.entries
            }
            Err(err) => {
                warn!(error = %err, "cannot read roster");
                self.status = Some(format!("無法讀取角色檔案: {err}"));
                Vec::new()
            }
        }
    }

    /// Starts a batch unless one is already running.
    pub fn refresh(&mut self) {
        if self.refreshing {
            self.status = Some("更新中，請稍候...".to_string());
            return;
        }
        self.start_refresh();
    }

    /// Starts a batch for the roster as it is on disk now. A batch still in
    /// flight becomes stale and its results are dropped on arrival.
    fn start_refresh(&mut self) {
        self.generation += 1;
        self.status = None;
        let roster = self.read_roster();
        if roster.is_empty() {
            self.refreshing = false;
            self.display = Display::error(NO_CHARACTERS);
            return;
        }

        self.refreshing = true;
        self.display = Display::message(LOADING);
        if self.status.is_none() {
            self.status = Some("正在更新角色資料...".to_string());
        }
        spawn_refresh(self.source.clone(), roster, self.generation, self.tx.clone());
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Profiles {
                generation,
                results,
            } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "discarding stale refresh");
                    return;
                }
                self.refreshing = false;
                self.show_results(&results);
            }
            AppEvent::Affixes(Ok(affixes)) => {
                info!(count = affixes.len(), "affixes loaded");
                self.affixes = AffixStrip::Loaded(affixes);
            }
            AppEvent::Affixes(Err(err)) => {
                warn!(error = %err, "affixes unavailable");
                self.affixes = AffixStrip::Unavailable;
            }
        }
    }

    pub fn show_results(&mut self, results: &[FetchResult]) {
        match results.iter().map(build_character).collect::<Result<Vec<_>, _>>() {
            Ok(views) => {
                self.display = Display::Characters(views);
                self.status = Some("資料更新完成".to_string());
            }
            Err(err) => {
                error!(error = %err, "cannot display results");
                self.display = Display::Failed {
                    detail: err.to_string(),
                };
                self.status = Some("顯示資料時發生錯誤".to_string());
            }
        }
        self.clamp_selection();
    }

    fn selectable_count(&self) -> usize {
        self.rows().iter().filter(|row| row.target.is_some()).count()
    }

    fn clamp_selection(&mut self) {
        let count = self.selectable_count();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    fn move_selection(&mut self, delta: isize) {
        self.selected = self.selected.saturating_add_signed(delta);
        self.clamp_selection();
    }

    pub fn toggle_selected(&mut self) {
        let rows = self.rows();
        let Some(target) = self
            .selected_row(&rows)
            .and_then(|index| rows[index].target.clone())
        else {
            return;
        };
        match target {
            Target::Character { key, index } => {
                self.expansion.toggle_character(&key, index);
            }
            Target::Dungeon(key) => {
                self.expansion.toggle_dungeon(&key);
            }
        }
        self.clamp_selection();
    }

    fn open_editor(&mut self) {
        let entries = self.read_roster();
        self.editor = Some(RosterEditor::new(entries));
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let outcome = match self.editor.as_mut() {
            Some(editor) => editor.handle_key(key),
            None => return,
        };
        match outcome {
            EditorOutcome::Continue => {}
            EditorOutcome::Close => {
                self.editor = None;
                self.start_refresh();
            }
            EditorOutcome::Save(entries) => match self.store.save(&entries) {
                Ok(()) => {
                    info!(entries = entries.len(), "roster saved");
                    self.editor = None;
                    self.start_refresh();
                    self.status = Some("角色資料已儲存！".to_string());
                }
                Err(err) => {
                    warn!(error = %err, "cannot save roster");
                    if let Some(editor) = self.editor.as_mut() {
                        editor.set_message(format!("無法儲存角色檔案: {err}"));
                    }
                }
            },
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.editor.is_some() {
            self.handle_editor_key(key);
            return;
        }

        if self.show_affix_details {
            self.show_affix_details = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::F(5) => self.refresh(),
            KeyCode::Char('e') | KeyCode::Char('+') => self.open_editor(),
            KeyCode::Char('a') => self.show_affix_details = true,
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.move_selection(isize::MAX),
            _ => {}
        }
    }
}
