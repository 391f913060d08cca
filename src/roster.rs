//! Local roster of tracked characters.
//!
//! The roster is a plain UTF-8 file with one `region,realm,name` line per
//! character. Lines starting with `#` are comments; anything that does not
//! split into exactly three fields is dropped on load.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;

pub const ROSTER_HEADER: &str = "# 角色資料格式：地區,伺服器,角色名稱";
pub const ROSTER_FILE_NAME: &str = "characters.txt";
pub const DEFAULT_REGION: &str = "tw";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterRef {
    pub region: String,
    pub realm: String,
    pub name: String,
}

impl CharacterRef {
    pub fn new(
        region: impl Into<String>,
        realm: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            realm: realm.into(),
            name: name.into(),
        }
    }

    fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match fields.as_slice() {
            [region, realm, name] => Some(Self::new(*region, *realm, *name)),
            _ => None,
        }
    }
}

impl fmt::Display for CharacterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} ({})", self.name, self.realm, self.region)
    }
}

/// Result of reading the roster: the kept entries plus how many lines were
/// thrown away for not having exactly three fields.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RosterLoad {
    pub entries: Vec<CharacterRef>,
    pub dropped: usize,
}

pub fn parse_roster(text: &str) -> RosterLoad {
    let mut load = RosterLoad::default();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match CharacterRef::parse_line(line) {
            Some(entry) => load.entries.push(entry),
            None => {
                warn!(line = index + 1, content = line, "dropping malformed roster line");
                load.dropped += 1;
            }
        }
    }
    load
}

pub fn render_roster(entries: &[CharacterRef]) -> String {
    let mut out = String::from(ROSTER_HEADER);
    out.push('\n');
    for entry in entries {
        let realm = entry.realm.trim();
        let name = entry.name.trim();
        if realm.is_empty() || name.is_empty() {
            continue;
        }
        let region = match entry.region.trim() {
            "" => DEFAULT_REGION,
            region => region,
        };
        if region.starts_with('#') || [region, realm, name].iter().any(|f| f.contains(',')) {
            warn!(%entry, "skipping roster entry that would not load back");
            continue;
        }
        out.push_str(&format!("{region},{realm},{name}\n"));
    }
    out
}

/// `~/Documents/characters.txt`, resolved through the platform's documents folder.
pub fn default_roster_path() -> PathBuf {
    let documents = dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .unwrap_or_else(|| PathBuf::from("Documents"));
    documents.join(ROSTER_FILE_NAME)
}

#[derive(Debug, Clone)]
pub struct RosterStore {
    path: PathBuf,
}

impl RosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file (and its folder) holding only the header comment.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, format!("{ROSTER_HEADER}\n"))?;
        debug!(path = %self.path.display(), "created empty roster");
        Ok(())
    }

    pub fn load(&self) -> Result<RosterLoad> {
        self.ensure_exists()?;
        let text = fs::read_to_string(&self.path)?;
        let load = parse_roster(&text);
        debug!(
            path = %self.path.display(),
            entries = load.entries.len(),
            dropped = load.dropped,
            "loaded roster"
        );
        Ok(load)
    }

    pub fn save(&self, entries: &[CharacterRef]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = fs::File::create(&self.path)?;
        file.write_all(render_roster(entries).as_bytes())?;
        debug!(path = %self.path.display(), entries = entries.len(), "saved roster");
        Ok(())
    }
}
