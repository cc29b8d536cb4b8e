use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use super::grid::draw_pad_grid;
use crate::shared::{DialogView, DisplayState};

const HELP: &str = "arrows move · enter pad · space play/stop · t tempo · s signature · q quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // transport bar
            Constraint::Min(12),   // pad grid
            Constraint::Length(1), // notice
            Constraint::Length(1), // key help
        ])
        .split(area);

    draw_transport(frame, sections[0], state);
    draw_pad_grid(frame, sections[1], &state.pads, state.cursor);
    frame.render_widget(
        Paragraph::new(state.notice.as_str()).style(Style::default().fg(Color::Yellow)),
        sections[2],
    );
    let help = Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, sections[3]);

    if let Some(dialog) = &state.dialog {
        draw_dialog(frame, area, dialog);
    }
}

fn draw_transport(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let play = if state.playing {
        Span::styled("▶ PLAYING", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("■ STOPPED", Style::default().fg(Color::Red))
    };

    let mut spans = vec![
        play,
        Span::raw(format!("   {} BPM   {}   ", state.tempo, state.signature)),
    ];
    spans.extend(beat_dots(state.beats_per_measure, state.current_beat));

    let bar = Paragraph::new(Line::from(spans)).block(Block::bordered().title(" Loop Station "));
    frame.render_widget(bar, area);
}

fn beat_dots(beats_per_measure: u32, current: Option<u32>) -> Vec<Span<'static>> {
    (0..beats_per_measure)
        .map(|beat| {
            if current == Some(beat) {
                Span::styled("● ", Style::default().fg(Color::LightMagenta))
            } else {
                Span::styled("○ ", Style::default().fg(Color::DarkGray))
            }
        })
        .collect()
}

fn draw_dialog(frame: &mut Frame, area: Rect, dialog: &DialogView) {
    let (title, body) = match dialog {
        DialogView::Tempo { pending } => (
            " Set Tempo ",
            vec![
                Line::from(format!("{pending} BPM")).alignment(Alignment::Center),
                Line::from("←/→ ±1   ↓/↑ ±10").alignment(Alignment::Center),
            ],
        ),
        DialogView::Signature { options, selected } => {
            let choices: Vec<Span<'_>> = options
                .iter()
                .enumerate()
                .map(|(i, sig)| {
                    if i == *selected {
                        let style = Style::default().fg(Color::Black).bg(Color::Cyan);
                        Span::styled(format!("[{sig}] "), style)
                    } else {
                        Span::raw(format!(" {sig}  "))
                    }
                })
                .collect();
            (
                " Set Time Signature ",
                vec![
                    Line::from(choices).alignment(Alignment::Center),
                    Line::from("←/→ choose").alignment(Alignment::Center),
                ],
            )
        }
    };

    let mut lines = body;
    lines.push(Line::from(""));
    lines.push(Line::from("enter apply · esc cancel").alignment(Alignment::Center));

    let popup = centered(area, 48, 7);
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(Block::bordered().title(title)), popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
