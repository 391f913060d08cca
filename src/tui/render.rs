use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::tui::app::{AffixStrip, App};
use crate::tui::editor::{Field, RosterEditor};
use crate::tui::rows::{hex_color, thumbnail_spans};
use crate::view::{ERROR_COLOR, MUTED_COLOR};

const ACCENT: &str = "#FF9A00";
const PANEL: Color = Color::Rgb(0x25, 0x2C, 0x38);
const KEYS: &str = "r 更新 · e 角色管理 · a 詞綴 · ↑↓ 移動 · Enter 展開/收起 · q 離開";

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn affix_lines(strip: &AffixStrip) -> [Line<'static>; 2] {
    let muted = Style::default().fg(hex_color(MUTED_COLOR));
    match strip {
        AffixStrip::Loading => [Line::from(Span::styled("載入詞綴中...", muted)), Line::default()],
        AffixStrip::Unavailable => [
            Line::from(Span::styled(
                "無法載入詞綴",
                Style::default().fg(hex_color(ERROR_COLOR)),
            )),
            Line::default(),
        ],
        AffixStrip::Loaded(affixes) => {
            let label = "本週詞綴 ";
            let mut top = vec![Span::styled(label, muted)];
            let mut bottom = vec![Span::raw(" ".repeat(label.width()))];
            for affix in affixes {
                top.extend(thumbnail_spans(&affix.thumbnail, 0));
                bottom.extend(thumbnail_spans(&affix.thumbnail, 1));
                let name = format!(" {}  ", affix.name);
                bottom.push(Span::raw(" ".repeat(name.width())));
                top.push(Span::raw(name));
            }
            [Line::from(top), Line::from(bottom)]
        }
    }
}

pub fn draw_app(frame: &mut Frame<'_>, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new(affix_lines(app.affixes()).to_vec()).block(
        Block::default()
            .title(Span::styled(
                " Raider.IO Mythic+ 查詢工具 ",
                Style::default()
                    .fg(hex_color(ACCENT))
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL),
    );
    frame.render_widget(header, chunks[0]);

    draw_body(frame, app, chunks[1]);

    let status = match (app.status(), app.is_refreshing()) {
        (Some(status), _) => status.to_string(),
        (None, true) => "正在更新角色資料...".to_string(),
        (None, false) => app.roster_path().display().to_string(),
    };
    let status_line = Line::from(vec![
        Span::styled(status, Style::default().fg(hex_color(ACCENT))),
        Span::raw("  "),
        Span::styled(KEYS, Style::default().fg(hex_color(MUTED_COLOR))),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[2]);

    if app.show_affix_details() {
        draw_affix_details(frame, app.affixes());
    }
    if let Some(editor) = app.editor() {
        draw_editor(frame, editor);
    }
}

fn draw_body(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let rows = app.rows();
    let selected = app.selected_row(&rows);
    let viewport = (area.height as usize).saturating_sub(2).max(1);

    if let Some(selected) = selected {
        if selected < app.scroll {
            app.scroll = selected;
        } else if selected >= app.scroll + viewport {
            app.scroll = selected + 1 - viewport;
        }
    }
    app.scroll = app.scroll.min(rows.len().saturating_sub(viewport));

    let lines: Vec<Line<'static>> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            if Some(i) == selected {
                row.line.patch_style(Style::default().bg(PANEL))
            } else {
                row.line
            }
        })
        .collect();

    let body = Paragraph::new(lines)
        .block(Block::default().title(" 角色 ").borders(Borders::ALL))
        .scroll((app.scroll as u16, 0));
    frame.render_widget(body, area);
}

fn draw_affix_details(frame: &mut Frame<'_>, strip: &AffixStrip) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);

    let lines: Vec<Line<'static>> = match strip {
        AffixStrip::Loaded(affixes) if !affixes.is_empty() => affixes
            .iter()
            .flat_map(|affix| {
                [
                    Line::from(Span::styled(
                        affix.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(affix.description.clone()),
                    Line::default(),
                ]
            })
            .collect(),
        AffixStrip::Loading => vec![Line::from("載入詞綴中...")],
        _ => vec![Line::from("無法載入詞綴")],
    };

    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" 本週詞綴（按任意鍵關閉） ")
                .borders(Borders::ALL)
                .style(Style::default().fg(hex_color(ACCENT))),
        );
    frame.render_widget(popup, area);
}

fn draw_editor(frame: &mut Frame<'_>, editor: &RosterEditor) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let outer = Block::default()
        .title(" 角色管理 ")
        .borders(Borders::ALL)
        .style(Style::default().fg(hex_color(ACCENT)));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(40),
            Constraint::Percentage(40),
        ])
        .split(chunks[0]);
    for (field, slot) in Field::ALL.into_iter().zip(inputs.iter()) {
        let focused = editor.focus() == field;
        let border = if focused {
            Style::default().fg(hex_color(ACCENT))
        } else {
            Style::default().fg(hex_color(MUTED_COLOR))
        };
        let text = if focused {
            format!("{}▏", editor.input(field))
        } else {
            editor.input(field).to_string()
        };
        let input = Paragraph::new(text).style(Style::default().fg(Color::White)).block(
            Block::default()
                .title(field.label())
                .borders(Borders::ALL)
                .border_style(border),
        );
        frame.render_widget(input, *slot);
    }

    let rows: Vec<Row> = editor
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let row = Row::new(vec![
                Cell::from(entry.region.clone()),
                Cell::from(entry.realm.clone()),
                Cell::from(entry.name.clone()),
            ]);
            if Some(i) == editor.selected() {
                row.style(Style::default().bg(PANEL).fg(Color::White))
            } else {
                row.style(Style::default().fg(Color::White))
            }
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(20),
            Constraint::Percentage(40),
            Constraint::Percentage(40),
        ],
    )
    .header(
        Row::new(vec!["地區", "伺服器", "角色名稱"])
            .style(Style::default().fg(hex_color(MUTED_COLOR))),
    )
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(table, chunks[1]);

    let message_style = if editor.confirming_delete() {
        Style::default().fg(hex_color(ERROR_COLOR))
    } else {
        Style::default().fg(Color::White)
    };
    frame.render_widget(
        Paragraph::new(editor.message().unwrap_or_default().to_string()).style(message_style),
        chunks[2],
    );
    frame.render_widget(
        Paragraph::new(
            "Tab 切換欄位 · Enter 新增 · ↑↓ 選擇 · Ctrl-E 編輯 · Ctrl-D 刪除 · Ctrl-S 儲存 · Esc 關閉",
        )
        .style(Style::default().fg(hex_color(MUTED_COLOR))),
        chunks[3],
    );
}
