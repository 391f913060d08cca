//! Flattens the character tree into styled lines.
//!
//! Everything here is a pure function of the display state and the expansion
//! flags, so drawing the same inputs twice yields the same screen.

use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::thumbnail::{THUMB_WIDTH, Thumbnail};
use crate::tui::expansion::ExpansionState;
use crate::view::{
    CharacterBody, CharacterKey, CharacterView, DEFAULT_COLOR, DungeonGroup, DungeonKey, ERROR_COLOR,
    MUTED_COLOR, RunView, format_score,
};

const NAME_WIDTH: usize = 24;
const LEVEL_WIDTH: usize = 5;
const SCORE_WIDTH: usize = 8;
const KEY_WIDTH: usize = 12;
const TIME_WIDTH: usize = 15;
const DATE_WIDTH: usize = 16;

const EXPANDED: &str = "▲";
const COLLAPSED: &str = "▼";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Character { key: CharacterKey, index: usize },
    Dungeon(DungeonKey),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub line: Line<'static>,
    pub target: Option<Target>,
}

impl DisplayRow {
    fn plain(line: Line<'static>) -> Self {
        Self { line, target: None }
    }

    pub fn text(&self) -> String {
        self.line.spans.iter().map(|span| span.content.as_ref()).collect()
    }
}

/// What the main area currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Display {
    Message { text: String, error: bool },
    Characters(Vec<CharacterView>),
    Failed { detail: String },
}

impl Display {
    pub fn message(text: impl Into<String>) -> Self {
        Display::Message {
            text: text.into(),
            error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Display::Message {
            text: text.into(),
            error: true,
        }
    }
}

pub fn hex_color(hex: &str) -> Color {
    hex.parse().unwrap_or(Color::White)
}

fn colored(text: impl Into<String>, hex: &str) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(hex_color(hex)))
}

fn muted(text: impl Into<String>) -> Span<'static> {
    colored(text, MUTED_COLOR)
}

/// Pads or truncates to an exact display width. CJK glyphs count double.
pub fn pad(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(&" ".repeat(width.saturating_sub(out.width())));
    out
}

/// One terminal row of a thumbnail: two pixel rows per cell.
pub fn thumbnail_spans(thumb: &Thumbnail, row: u32) -> Vec<Span<'static>> {
    if thumb.is_blank() {
        return vec![Span::raw(" ".repeat(THUMB_WIDTH as usize))];
    }
    (0..THUMB_WIDTH)
        .map(|x| {
            let rgb = |p: Option<[u8; 3]>| {
                let [r, g, b] = p.unwrap_or([0, 0, 0]);
                Color::Rgb(r, g, b)
            };
            let style = Style::default()
                .fg(rgb(thumb.pixel(x, row * 2)))
                .bg(rgb(thumb.pixel(x, row * 2 + 1)));
            Span::styled("▀", style)
        })
        .collect()
}

fn indent() -> Span<'static> {
    Span::raw(" ".repeat(THUMB_WIDTH as usize + 1))
}

pub fn build_rows(display: &Display, expansion: &ExpansionState) -> Vec<DisplayRow> {
    match display {
        Display::Message { text, error } => {
            let span = if *error {
                colored(text.clone(), ERROR_COLOR)
            } else {
                muted(text.clone())
            };
            vec![DisplayRow::plain(Line::from(span).centered())]
        }
        Display::Failed { detail } => {
            let mut rows = vec![DisplayRow::plain(Line::from(colored(
                "顯示資料時發生錯誤:",
                ERROR_COLOR,
            )))];
            rows.extend(
                detail
                    .lines()
                    .map(|line| DisplayRow::plain(Line::from(colored(line.to_string(), ERROR_COLOR)))),
            );
            rows
        }
        Display::Characters(characters) => {
            let mut rows = Vec::new();
            for (index, character) in characters.iter().enumerate() {
                character_rows(&mut rows, index, character, expansion);
            }
            rows
        }
    }
}

fn character_rows(
    rows: &mut Vec<DisplayRow>,
    index: usize,
    character: &CharacterView,
    expansion: &ExpansionState,
) {
    let expanded = expansion.character(&character.key, index);
    let bold = Modifier::BOLD;

    let mut header = thumbnail_spans(&character.portrait, 0);
    header.extend([
        Span::raw(" "),
        Span::raw(if expanded { EXPANDED } else { COLLAPSED }),
        Span::raw(" "),
        colored(character.name.clone(), character.class_color).add_modifier(bold),
        Span::raw("  "),
        muted(character.region_realm.clone()),
        Span::raw("  "),
        colored(character.score_label(), character.score_color()).add_modifier(bold),
    ]);
    rows.push(DisplayRow {
        line: Line::from(header),
        target: Some(Target::Character {
            key: character.key.clone(),
            index,
        }),
    });
    rows.push(DisplayRow::plain(Line::from(thumbnail_spans(&character.portrait, 1))));

    if expanded {
        rows.push(DisplayRow::plain(Line::from(vec![
            indent(),
            muted(format!(
                "  {}{}{}{}{}{}",
                pad("副本", NAME_WIDTH),
                pad("層數", LEVEL_WIDTH),
                pad("分數", SCORE_WIDTH),
                pad("鑰石", KEY_WIDTH),
                pad("通關時間", TIME_WIDTH),
                pad("完成日期", DATE_WIDTH),
            )),
        ])));

        match &character.body {
            CharacterBody::Error(message) => {
                rows.push(DisplayRow::plain(Line::from(vec![
                    indent(),
                    colored(format!("  錯誤: {message}"), ERROR_COLOR),
                ])));
            }
            CharacterBody::Empty => {
                rows.push(DisplayRow::plain(Line::from(vec![indent(), muted("  無紀錄")])));
            }
            CharacterBody::Dungeons(groups) => {
                for group in groups {
                    dungeon_rows(rows, group, expansion);
                }
            }
        }
    }

    rows.push(DisplayRow::plain(Line::default()));
}

fn run_columns(run: &RunView, show_score: bool) -> Vec<Span<'static>> {
    let score = if show_score {
        let hex = run.score_tier().map(|t| t.hex()).unwrap_or(DEFAULT_COLOR);
        colored(pad(&format_score(run.score), SCORE_WIDTH), hex).add_modifier(Modifier::BOLD)
    } else {
        Span::raw(pad("", SCORE_WIDTH))
    };
    vec![
        colored(pad(&run.level.to_string(), LEVEL_WIDTH), run.level_tier().hex())
            .add_modifier(Modifier::BOLD),
        score,
        colored(pad(&run.keystone.label(), KEY_WIDTH), run.keystone.hex()),
        Span::raw(pad(&run.time_label(), TIME_WIDTH)),
        Span::raw(pad(&run.date_label(), DATE_WIDTH)),
    ]
}

fn dungeon_rows(rows: &mut Vec<DisplayRow>, group: &DungeonGroup, expansion: &ExpansionState) {
    let expanded = expansion.dungeon(&group.key);

    let mut line = vec![
        indent(),
        Span::raw(if expanded { EXPANDED } else { COLLAPSED }),
        Span::raw(" "),
        Span::styled(
            pad(&group.display_name, NAME_WIDTH),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    line.extend(run_columns(&group.best, true));
    rows.push(DisplayRow {
        line: Line::from(line),
        target: Some(Target::Dungeon(group.key.clone())),
    });

    if !expanded {
        return;
    }

    rows.push(DisplayRow::plain(Line::from(vec![indent(), muted("    最近紀錄")])));
    if group.recent.is_empty() {
        rows.push(DisplayRow::plain(Line::from(vec![indent(), muted("    無最近紀錄")])));
        return;
    }
    for run in &group.recent {
        let mut line = vec![indent(), Span::raw(format!("  {}", pad("", NAME_WIDTH)))];
        line.extend(run_columns(run, false));
        rows.push(DisplayRow::plain(Line::from(line)));
    }
}
