//! Display model built from fetch results.
//!
//! Nothing here does I/O. A [`FetchResult`] becomes a [`CharacterView`]: a
//! header plus, for successful fetches, one [`DungeonGroup`] per dungeon with
//! its best run and the matching recent runs.

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::fetch::{FetchResult, Payload};
use crate::response::profile::MythicPlusRun;
use crate::roster::CharacterRef;
use crate::thumbnail::Thumbnail;

pub const DEFAULT_COLOR: &str = "#FFFFFF";
pub const MUTED_COLOR: &str = "#999999";
pub const ERROR_COLOR: &str = "#FF5555";
pub const SUCCESS_COLOR: &str = "#67FD0A";

const CLASS_COLORS: &[(&str, &str)] = &[
    ("Death Knight", "#C41E3A"),
    ("Demon Hunter", "#A330C9"),
    ("Druid", "#FF7C0A"),
    ("Evoker", "#33937F"),
    ("Hunter", "#AAD372"),
    ("Mage", "#3FC7EB"),
    ("Monk", "#00FF98"),
    ("Paladin", "#F48CBA"),
    ("Priest", "#FFFFFF"),
    ("Rogue", "#FFF468"),
    ("Shaman", "#0070DD"),
    ("Warlock", "#8788EE"),
    ("Warrior", "#C69B6D"),
];

// English dungeon names to their zh-TW client names.
const DUNGEON_NAMES: &[(&str, &str)] = &[
    ("Darkflame Cleft", "暗焰裂隙"),
    ("Operation: Floodgate", "水閘行動"),
    ("Cinderbrew Meadery", "燼釀酒莊"),
    ("The MOTHERLODE!!", "晶礦母脈"),
    ("The Rookery", "鴉巢"),
    ("Theater of Pain", "苦痛劇場"),
    ("Priory of the Sacred Flame", "聖焰隱修院"),
    ("Mechagon Workshop", "機械岡行動：工坊"),
];

pub fn class_color(class: &str) -> &'static str {
    CLASS_COLORS
        .iter()
        .find(|(name, _)| *name == class)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

pub fn localized_dungeon_name(dungeon: &str) -> String {
    DUNGEON_NAMES
        .iter()
        .find(|(name, _)| *name == dungeon)
        .map(|(_, local)| (*local).to_string())
        .unwrap_or_else(|| dungeon.to_string())
}

/// Colour tier shared by scores and keystone levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Legendary,
    Epic,
    Rare,
    Uncommon,
    Common,
}

impl Tier {
    pub fn for_score(score: f64) -> Self {
        if score >= 2000.0 {
            Tier::Legendary
        } else if score >= 1500.0 {
            Tier::Epic
        } else if score >= 1000.0 {
            Tier::Rare
        } else if score >= 500.0 {
            Tier::Uncommon
        } else {
            Tier::Common
        }
    }

    pub fn for_level(level: i64) -> Self {
        if level >= 20 {
            Tier::Legendary
        } else if level >= 15 {
            Tier::Epic
        } else if level >= 10 {
            Tier::Rare
        } else if level >= 5 {
            Tier::Uncommon
        } else {
            Tier::Common
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Tier::Legendary => "#E16AFF",
            Tier::Epic => "#4C97FC",
            Tier::Rare => "#1CE2B2",
            Tier::Uncommon => "#67FD0A",
            Tier::Common => DEFAULT_COLOR,
        }
    }
}

/// `HH:MM:SS`; hours keep counting past 24.
pub fn format_duration(milliseconds: i64) -> String {
    let seconds = milliseconds.max(0) / 1000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Turns `2025-03-01T12:34:56.000Z` into `2025/03/01 12:34`. The fractional
/// seconds are required: input without them, or anything else that does not
/// look like that, is handed back untouched.
pub fn format_timestamp(timestamp: &str) -> String {
    // `%.f` alone would also accept a bare `...:56Z`.
    if !timestamp.contains('.') {
        return timestamp.to_string();
    }
    match NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.fZ") {
        Ok(dt) => dt.format("%Y/%m/%d %H:%M").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{score:.1}"),
        None => "N/A".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystone {
    Upgraded(i64),
    Overtime,
}

impl Keystone {
    pub fn from_upgrades(upgrades: Option<i64>) -> Self {
        match upgrades {
            Some(n) if n > 0 => Keystone::Upgraded(n),
            _ => Keystone::Overtime,
        }
    }

    pub fn label(self) -> String {
        match self {
            Keystone::Upgraded(n) => format!("✓ +{n}"),
            Keystone::Overtime => "✗ 超時".to_string(),
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Keystone::Upgraded(_) => SUCCESS_COLOR,
            Keystone::Overtime => ERROR_COLOR,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewError {
    #[error("{character}: {list}[{index}] has no `{field}`")]
    MissingField {
        character: String,
        list: &'static str,
        index: usize,
        field: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterKey {
    pub region: String,
    pub realm: String,
    pub name: String,
}

impl From<&CharacterRef> for CharacterKey {
    fn from(character: &CharacterRef) -> Self {
        Self {
            region: character.region.clone(),
            realm: character.realm.clone(),
            name: character.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DungeonKey {
    pub character: CharacterKey,
    pub dungeon: String,
}

/// A run with the fields the display needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunView {
    pub dungeon: String,
    pub level: i64,
    pub score: Option<f64>,
    pub clear_time_ms: Option<i64>,
    pub completed_at: String,
    pub keystone: Keystone,
}

impl RunView {
    fn from_run(
        run: &MythicPlusRun,
        character: &CharacterRef,
        list: &'static str,
        index: usize,
    ) -> Result<Self, ViewError> {
        let missing = |field| ViewError::MissingField {
            character: character.to_string(),
            list,
            index,
            field,
        };
        Ok(Self {
            dungeon: run.dungeon.clone().ok_or_else(|| missing("dungeon"))?,
            level: run.mythic_level.ok_or_else(|| missing("mythic_level"))?,
            score: run.score,
            clear_time_ms: run.clear_time_ms,
            completed_at: run.completed_at.clone().ok_or_else(|| missing("completed_at"))?,
            keystone: Keystone::from_upgrades(run.num_keystone_upgrades),
        })
    }

    pub fn level_tier(&self) -> Tier {
        Tier::for_level(self.level)
    }

    pub fn score_tier(&self) -> Option<Tier> {
        self.score.map(Tier::for_score)
    }

    pub fn time_label(&self) -> String {
        match self.clear_time_ms {
            Some(ms) => format_duration(ms),
            None => "未完成".to_string(),
        }
    }

    pub fn date_label(&self) -> String {
        format_timestamp(&self.completed_at)
    }

    // Level first, then score (a missing score loses), then the later completion.
    fn beats(&self, other: &RunView) -> bool {
        let by_score = match (self.score, other.score) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        self.level
            .cmp(&other.level)
            .then(by_score)
            .then_with(|| self.completed_at.cmp(&other.completed_at))
            == Ordering::Greater
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DungeonGroup {
    pub key: DungeonKey,
    pub display_name: String,
    pub best: RunView,
    /// Newest first.
    pub recent: Vec<RunView>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CharacterBody {
    Error(String),
    Empty,
    Dungeons(Vec<DungeonGroup>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterView {
    pub key: CharacterKey,
    pub name: String,
    pub region_realm: String,
    pub class_color: &'static str,
    pub score: Option<f64>,
    pub portrait: Thumbnail,
    pub body: CharacterBody,
}

impl CharacterView {
    pub fn score_label(&self) -> String {
        format_score(self.score)
    }

    pub fn score_color(&self) -> &'static str {
        match self.score {
            Some(score) => Tier::for_score(score).hex(),
            None => MUTED_COLOR,
        }
    }
}

pub fn build_character(result: &FetchResult) -> Result<CharacterView, ViewError> {
    let character = &result.character;
    let key = CharacterKey::from(character);
    let mut view = CharacterView {
        key,
        name: character.name.clone(),
        region_realm: format!("{}-{}", character.region, character.realm),
        class_color: DEFAULT_COLOR,
        score: None,
        portrait: result.portrait.clone(),
        body: CharacterBody::Empty,
    };

    let profile = match &result.payload {
        Payload::Error(message) => {
            view.body = CharacterBody::Error(message.clone());
            return Ok(view);
        }
        Payload::Profile(profile) => profile,
    };

    view.class_color = class_color(&profile.class);
    view.score = profile.current_score();

    let best_runs = profile
        .mythic_plus_best_runs
        .iter()
        .enumerate()
        .map(|(i, run)| RunView::from_run(run, character, "mythic_plus_best_runs", i))
        .collect::<Result<Vec<_>, _>>()?;
    let recent_runs = profile
        .mythic_plus_recent_runs
        .iter()
        .enumerate()
        .map(|(i, run)| RunView::from_run(run, character, "mythic_plus_recent_runs", i))
        .collect::<Result<Vec<_>, _>>()?;

    if best_runs.is_empty() {
        return Ok(view);
    }

    for (index, run) in best_runs.iter().enumerate() {
        if run.clear_time_ms.is_none() {
            return Err(ViewError::MissingField {
                character: character.to_string(),
                list: "mythic_plus_best_runs",
                index,
                field: "clear_time_ms",
            });
        }
    }

    view.body = CharacterBody::Dungeons(group_dungeons(&view.key, best_runs, &recent_runs));
    Ok(view)
}

/// One group per dungeon, in order of first appearance in `best_runs`.
pub fn group_dungeons(
    character: &CharacterKey,
    best_runs: Vec<RunView>,
    recent_runs: &[RunView],
) -> Vec<DungeonGroup> {
    let mut groups: Vec<DungeonGroup> = Vec::new();
    for run in best_runs {
        match groups.iter_mut().find(|g| g.key.dungeon == run.dungeon) {
            Some(group) => {
                if run.beats(&group.best) {
                    group.best = run;
                }
            }
            None => groups.push(DungeonGroup {
                key: DungeonKey {
                    character: character.clone(),
                    dungeon: run.dungeon.clone(),
                },
                display_name: localized_dungeon_name(&run.dungeon),
                best: run,
                recent: Vec::new(),
            }),
        }
    }

    for group in &mut groups {
        let mut recent: Vec<RunView> = recent_runs
            .iter()
            .filter(|run| run.dungeon == group.key.dungeon)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        group.recent = recent;
    }
    groups
}
