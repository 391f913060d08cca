//! Roster editor dialog: add, edit, delete and save tracked characters.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::roster::{CharacterRef, DEFAULT_REGION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Region,
    Realm,
    Name,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Region, Field::Realm, Field::Name];

    pub fn label(self) -> &'static str {
        match self {
            Field::Region => "地區",
            Field::Realm => "伺服器",
            Field::Name => "角色名稱",
        }
    }

    fn next(self) -> Self {
        match self {
            Field::Region => Field::Realm,
            Field::Realm => Field::Name,
            Field::Name => Field::Region,
        }
    }

    fn previous(self) -> Self {
        match self {
            Field::Region => Field::Name,
            Field::Realm => Field::Region,
            Field::Name => Field::Realm,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    Continue,
    Save(Vec<CharacterRef>),
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterEditor {
    entries: Vec<CharacterRef>,
    region: String,
    realm: String,
    name: String,
    focus: Field,
    selected: Option<usize>,
    confirm_delete: bool,
    message: Option<String>,
}

impl RosterEditor {
    pub fn new(entries: Vec<CharacterRef>) -> Self {
        Self {
            entries,
            region: DEFAULT_REGION.to_string(),
            realm: String::new(),
            name: String::new(),
            focus: Field::Realm,
            selected: None,
            confirm_delete: false,
            message: None,
        }
    }

    pub fn entries(&self) -> &[CharacterRef] {
        &self.entries
    }

    pub fn input(&self, field: Field) -> &str {
        match field {
            Field::Region => &self.region,
            Field::Realm => &self.realm,
            Field::Name => &self.name,
        }
    }

    fn input_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Region => &mut self.region,
            Field::Realm => &mut self.realm,
            Field::Name => &mut self.name,
        }
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn confirming_delete(&self) -> bool {
        self.confirm_delete
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    fn entry_from_inputs(&mut self) -> Option<CharacterRef> {
        let region = match self.region.trim() {
            "" => DEFAULT_REGION,
            region => region,
        };
        let realm = self.realm.trim();
        let name = self.name.trim();
        if realm.is_empty() || name.is_empty() {
            self.message = Some("請填寫伺服器和角色名稱！".to_string());
            return None;
        }
        if [region, realm, name].iter().any(|field| field.contains(',')) {
            self.message = Some("欄位不可包含逗號".to_string());
            return None;
        }
        if region.starts_with('#') {
            self.message = Some("地區不可以 # 開頭".to_string());
            return None;
        }
        Some(CharacterRef::new(region, realm, name))
    }

    fn clear_inputs(&mut self) {
        self.realm.clear();
        self.name.clear();
    }

    pub fn add(&mut self) -> bool {
        let Some(entry) = self.entry_from_inputs() else {
            return false;
        };
        self.message = Some(format!("已新增 {entry}"));
        self.entries.push(entry);
        self.clear_inputs();
        true
    }

    pub fn edit_selected(&mut self) -> bool {
        let Some(index) = self.selected else {
            self.message = Some("請先選擇要編輯的角色".to_string());
            return false;
        };
        let Some(entry) = self.entry_from_inputs() else {
            return false;
        };
        self.message = Some(format!("已更新 {entry}"));
        self.entries[index] = entry;
        self.clear_inputs();
        self.selected = None;
        true
    }

    pub fn request_delete(&mut self) {
        match self.selected {
            Some(index) => {
                self.confirm_delete = true;
                self.message = Some(format!("確定要刪除角色 {} 嗎？(y/n)", self.entries[index].name));
            }
            None => self.message = Some("請先選擇要刪除的角色".to_string()),
        }
    }

    pub fn resolve_delete(&mut self, confirmed: bool) {
        self.confirm_delete = false;
        let Some(index) = self.selected.take() else {
            return;
        };
        if confirmed {
            let removed = self.entries.remove(index);
            self.message = Some(format!("已刪除 {removed}"));
            self.region = DEFAULT_REGION.to_string();
            self.clear_inputs();
        } else {
            self.message = None;
            self.selected = Some(index);
        }
    }

    /// Moves the row selection and copies the row into the inputs.
    pub fn select(&mut self, index: usize) {
        if self.entries.is_empty() {
            self.selected = None;
            return;
        }
        let index = index.min(self.entries.len() - 1);
        let entry = &self.entries[index];
        self.region = entry.region.clone();
        self.realm = entry.realm.clone();
        self.name = entry.name.clone();
        self.selected = Some(index);
    }

    fn move_selection(&mut self, delta: isize) {
        let next = match self.selected {
            None if delta > 0 => 0,
            None => self.entries.len().saturating_sub(1),
            Some(current) => current.saturating_add_signed(delta),
        };
        self.select(next);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorOutcome {
        if key.kind != KeyEventKind::Press {
            return EditorOutcome::Continue;
        }

        if self.confirm_delete {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.resolve_delete(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.resolve_delete(false),
                _ => {}
            }
            return EditorOutcome::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return EditorOutcome::Close,
            KeyCode::Char('s') if ctrl => return EditorOutcome::Save(self.entries.clone()),
            KeyCode::Char('e') if ctrl => {
                self.edit_selected();
            }
            KeyCode::Char('d') if ctrl => self.request_delete(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter => {
                self.add();
            }
            KeyCode::Backspace => {
                self.input_mut(self.focus).pop();
            }
            KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.input_mut(self.focus).push(ch);
            }
            _ => {}
        }
        EditorOutcome::Continue
    }
}
