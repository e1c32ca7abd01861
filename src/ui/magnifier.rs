use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::color::{BACKGROUND, Rgb};
use crate::session::Session;

const CELL_WIDTH: u16 = 2;
const TITLE: &str = " eyedrop ";

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn swatch(rgb: Rgb) -> Span<'static> {
    Span::styled("  ", Style::default().bg(to_color(rgb)))
}

/// Draws the magnified grid with the centre cell marked, and a status line below it.
pub fn render(frame: &mut Frame, session: &Session) {
    let area = frame.area();
    let layout = Layout::new(
        Direction::Vertical,
        [Constraint::Min(1), Constraint::Length(1)],
    )
    .split(area);

    render_grid(frame, session, layout[0]);
    render_status(frame, session, layout[1]);
}

fn render_grid(frame: &mut Frame, session: &Session, area: Rect) {
    let grid = session.grid();
    let size = grid.size();
    let mid = size / 2;

    let lines: Vec<Line> = grid
        .rows()
        .enumerate()
        .map(|(y, row)| {
            let spans: Vec<Span> = row
                .iter()
                .enumerate()
                .map(|(x, cell)| {
                    let color = cell.unwrap_or(BACKGROUND);
                    let style = Style::default().bg(to_color(color));
                    if x == mid && y == mid {
                        Span::styled(
                            "[]",
                            style
                                .fg(to_color(color.contrasting()))
                                .add_modifier(Modifier::BOLD),
                        )
                    } else {
                        Span::styled("  ", style)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::from(TITLE).fg(Color::LightBlue).bold());
    // small grids still get room for the title
    let width = (size as u16 * CELL_WIDTH).max(TITLE.len() as u16) + 2;
    let height = size as u16 + 2;
    frame.render_widget(Paragraph::new(lines).block(block), centered(area, width, height));
}

fn render_status(frame: &mut Frame, session: &Session, area: Rect) {
    let cursor = session.cursor();
    let current = session.current_color();
    let previous = session.params().previous_color;

    let line = Line::from(vec![
        Span::from(format!("{},{} ", cursor.x, cursor.y)).gray(),
        swatch(current),
        Span::from(format!(" {current} ")).bold(),
        Span::from(" previous ").gray(),
        swatch(previous),
        Span::from(format!(" {previous}")),
        Span::from("   enter: pick  esc: cancel").gray(),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
