use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::roster::default_roster_path;

pub const BASE_URL: &str = "https://raider.io/api/v1";
pub const ICON_BASE_URL: &str = "https://render.worldofwarcraft.com/us/icons/56";

#[derive(Parser, Debug)]
#[clap(author, version, about = "Mythic+ tracker for the Raider.io API", long_about = None)]
pub struct Cli {
    /// Roster file (defaults to characters.txt in the Documents folder)
    #[clap(long)]
    pub roster: Option<PathBuf>,
    #[clap(long, default_value = BASE_URL)]
    pub api_base: String,
    #[clap(long, default_value = "tw")]
    pub affix_region: String,
    #[clap(long, default_value = "tw")]
    pub affix_locale: String,
    /// Per-character profile request timeout
    #[clap(long, default_value_t = 10)]
    pub timeout_secs: u64,
    /// Write a debug log file
    #[clap(short, long)]
    pub verbose: bool,
    #[clap(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub roster_path: PathBuf,
    pub api_base: String,
    pub icon_base: String,
    pub affix_region: String,
    pub affix_locale: String,
    pub profile_timeout: Duration,
    pub affix_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roster_path: default_roster_path(),
            api_base: BASE_URL.to_string(),
            icon_base: ICON_BASE_URL.to_string(),
            affix_region: "tw".to_string(),
            affix_locale: "tw".to_string(),
            profile_timeout: Duration::from_secs(10),
            affix_timeout: Duration::from_secs(5),
            log_file: None,
        }
    }
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        let defaults = Settings::default();
        let log_file = match (cli.verbose, cli.log_file) {
            (_, Some(path)) => Some(path),
            (true, None) => Some(default_log_path()),
            (false, None) => None,
        };
        Self {
            roster_path: cli.roster.unwrap_or(defaults.roster_path),
            api_base: cli.api_base.trim_end_matches('/').to_string(),
            affix_region: cli.affix_region,
            affix_locale: cli.affix_locale,
            profile_timeout: Duration::from_secs(cli.timeout_secs.max(1)),
            log_file,
            ..defaults
        }
    }
}

pub fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("mplus-tracker")
        .join("debug.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_gives_defaults() {
        let settings = Settings::from(Cli::parse_from(["mplus-tracker"]));

        assert_eq!(settings.api_base, BASE_URL);
        assert_eq!(settings.affix_region, "tw");
        assert_eq!(settings.profile_timeout, Duration::from_secs(10));
        assert!(settings.log_file.is_none());
        assert!(settings.roster_path.ends_with("characters.txt"));
    }

    #[test]
    fn verbose_turns_on_file_logging() {
        let settings = Settings::from(Cli::parse_from([
            "mplus-tracker",
            "--verbose",
            "--roster",
            "/tmp/roster.txt",
            "--api-base",
            "http://localhost:8080/api/v1/",
        ]));

        assert_eq!(settings.roster_path, PathBuf::from("/tmp/roster.txt"));
        assert_eq!(settings.api_base, "http://localhost:8080/api/v1");
        assert!(settings.log_file.is_some());
    }
}
