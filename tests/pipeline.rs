use std::collections::HashMap;
use std::io;

use async_trait::async_trait;
use mplus_tracker::client::RaiderIo;
use mplus_tracker::fetch::{Payload, fetch_batch};
use mplus_tracker::response::affixes::AffixesResponse;
use mplus_tracker::response::profile::{CharacterProfile, MythicPlusRun, Scores, SeasonScores};
use mplus_tracker::roster::{CharacterRef, RosterStore};
use mplus_tracker::tui::expansion::ExpansionState;
use mplus_tracker::tui::rows::{Display, Target, build_rows};
use mplus_tracker::view::{CharacterBody, build_character};
use mplus_tracker::{Error, Result};

struct CannedRaiderIo {
    profiles: HashMap<String, CharacterProfile>,
}

#[async_trait]
impl RaiderIo for CannedRaiderIo {
    async fn profile(&self, character: &CharacterRef) -> Result<CharacterProfile> {
        self.profiles
            .get(&character.name)
            .cloned()
            .ok_or_else(|| Error::Io(io::Error::new(io::ErrorKind::TimedOut, "request timed out")))
    }

    async fn affixes(&self) -> Result<AffixesResponse> {
        Ok(AffixesResponse::default())
    }

    async fn image(&self, _url: &str) -> Result<Vec<u8>> {
        Err(Error::InvalidUrl("no images here".to_string()))
    }

    fn icon_url(&self, icon: &str) -> String {
        icon.to_string()
    }
}

fn run(dungeon: &str, level: i64, completed_at: &str) -> MythicPlusRun {
    MythicPlusRun {
        dungeon: Some(dungeon.to_string()),
        mythic_level: Some(level),
        score: Some(250.0 + level as f64),
        clear_time_ms: Some(1_800_000),
        completed_at: Some(completed_at.to_string()),
        num_keystone_upgrades: Some(1),
        ..Default::default()
    }
}

fn profile(name: &str, score: f64) -> CharacterProfile {
    CharacterProfile {
        name: name.to_string(),
        class: "Monk".to_string(),
        thumbnail_url: format!("https://render.example/{name}.jpg"),
        mythic_plus_scores_by_season: vec![SeasonScores {
            season: "season-tww-2".to_string(),
            scores: Scores {
                all: Some(score),
                ..Default::default()
            },
        }],
        mythic_plus_best_runs: vec![
            run("The Rookery", 12, "2025-03-01T10:00:00.000Z"),
            run("Cinderbrew Meadery", 10, "2025-03-02T10:00:00.000Z"),
        ],
        mythic_plus_recent_runs: vec![
            run("Cinderbrew Meadery", 9, "2025-03-03T10:00:00.000Z"),
            run("The Rookery", 11, "2025-03-04T10:00:00.000Z"),
        ],
        ..Default::default()
    }
}

#[tokio::test]
async fn roster_file_to_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("characters.txt");
    std::fs::write(
        &path,
        "# comment\ntw,illidan,Tacostruck\nnot a valid line\ntw,illidan,Gone\nus,zuljin,Ghostbrew\n",
    )
    .unwrap();

    let load = RosterStore::new(&path).load().unwrap();
    assert_eq!(load.entries.len(), 3);
    assert_eq!(load.dropped, 1);

    let source = CannedRaiderIo {
        profiles: HashMap::from([
            ("Tacostruck".to_string(), profile("Tacostruck", 2450.7)),
            ("Ghostbrew".to_string(), profile("Ghostbrew", 1890.2)),
        ]),
    };
    let results = fetch_batch(&source, &load.entries).await;

    let names: Vec<&str> = results.iter().map(|r| r.character.name.as_str()).collect();
    assert_eq!(names, ["Tacostruck", "Gone", "Ghostbrew"]);
    assert!(results[1].payload.is_error());
    assert!(matches!(&results[0].payload, Payload::Profile(_)));
    assert!(results.iter().all(|r| r.portrait.is_blank()));

    let views: Vec<_> = results.iter().map(build_character).collect::<Result<_, _>>().unwrap();
    assert_eq!(views[0].region_realm, "tw-illidan");
    assert_eq!(views[2].score_label(), "1890.2");
    assert!(matches!(&views[1].body, CharacterBody::Error(msg) if msg.contains("timed out")));
    match &views[0].body {
        CharacterBody::Dungeons(groups) => {
            assert_eq!(groups.len(), 2);
            assert_eq!(groups[0].display_name, "鴉巢");
            assert_eq!(groups[0].recent.len(), 1);
        }
        other => panic!("unexpected body {other:?}"),
    }

    let rows = build_rows(&Display::Characters(views), &ExpansionState::default());
    let headers: Vec<String> = rows
        .iter()
        .filter(|row| matches!(row.target, Some(Target::Character { .. })))
        .map(|row| row.text())
        .collect();
    assert_eq!(headers.len(), 3);
    assert!(headers[0].contains("▲ Tacostruck"));
    assert!(headers[1].contains("▲ Gone"));
    assert!(headers[2].contains("▼ Ghostbrew"));

    // Only expanded characters contribute dungeon rows.
    let dungeon_rows = rows
        .iter()
        .filter(|row| matches!(row.target, Some(Target::Dungeon(_))))
        .count();
    assert_eq!(dungeon_rows, 2);
}
