use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::shared::{NUM_COLUMNS, NUM_ROWS, PadId, PadView};

// one color per column: red, blue, green, yellow, purple, pink
pub const COLUMN_COLORS: [Color; NUM_COLUMNS] = [
    Color::Rgb(0xf4, 0x43, 0x36),
    Color::Rgb(0x21, 0x96, 0xf3),
    Color::Rgb(0x4c, 0xaf, 0x50),
    Color::Rgb(0xff, 0xeb, 0x3b),
    Color::Rgb(0x9c, 0x27, 0xb0),
    Color::Rgb(0xe9, 0x1e, 0x63),
];

pub fn draw_pad_grid(
    frame: &mut Frame,
    area: Rect,
    pads: &[[PadView; NUM_COLUMNS]; NUM_ROWS],
    cursor: PadId,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, NUM_ROWS as u32); NUM_ROWS])
        .split(area);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, NUM_COLUMNS as u32); NUM_COLUMNS])
            .split(*row_area);

        for (col_idx, cell_area) in cols.iter().enumerate() {
            let pad = &pads[row_idx][col_idx];
            let selected = cursor == PadId::new(row_idx, col_idx);
            frame.render_widget(pad_widget(pad, COLUMN_COLORS[col_idx], selected), *cell_area);
        }
    }
}

fn pad_widget(pad: &PadView, color: Color, selected: bool) -> Paragraph<'_> {
    let style = if pad.active {
        Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD)
    } else if pad.loaded {
        Style::default().fg(color)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let border = if selected { BorderType::Thick } else { BorderType::Rounded };
    let border_style = Style::default().fg(if selected { Color::White } else { color });

    let block = Block::bordered().border_type(border).border_style(border_style).style(style);
    Paragraph::new(pad.label.as_str()).alignment(Alignment::Center).block(block)
}
