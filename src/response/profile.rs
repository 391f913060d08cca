use serde::{Deserialize, Serialize};

/// Fields requested from `/characters/profile`.
pub const PROFILE_FIELDS: &str = "mythic_plus_scores_by_season:current,mythic_plus_best_runs,mythic_plus_recent_runs,thumbnail_url,class";

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterProfile {
    pub name: String,
    pub race: String,
    pub class: String,
    pub active_spec_name: String,
    pub region: String,
    pub realm: String,
    pub thumbnail_url: String,
    pub profile_url: String,
    pub mythic_plus_scores_by_season: Vec<SeasonScores>,
    pub mythic_plus_best_runs: Vec<MythicPlusRun>,
    pub mythic_plus_recent_runs: Vec<MythicPlusRun>,
}

impl CharacterProfile {
    /// Overall score for the current season, if the API reported one.
    pub fn current_score(&self) -> Option<f64> {
        self.mythic_plus_scores_by_season
            .first()
            .and_then(|season| season.scores.all)
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonScores {
    pub season: String,
    pub scores: Scores,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scores {
    pub all: Option<f64>,
    pub dps: Option<f64>,
    pub healer: Option<f64>,
    pub tank: Option<f64>,
}

// Best runs and recent runs share this shape. Everything is optional here so a
// partial record still deserializes; the view layer decides what is required.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MythicPlusRun {
    pub dungeon: Option<String>,
    pub short_name: Option<String>,
    pub mythic_level: Option<i64>,
    pub completed_at: Option<String>,
    pub clear_time_ms: Option<i64>,
    pub par_time_ms: Option<i64>,
    pub num_keystone_upgrades: Option<i64>,
    pub keystone_run_id: Option<i64>,
    pub score: Option<f64>,
    pub url: Option<String>,
}
