use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use console::Term;
use tetris_core::{GameState, Observer, PieceType, SimView, Status};

/// Content of one board cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    /// Locked into the grid
    Filled,
    /// Part of the falling piece
    Piece(PieceType),
}

#[derive(Clone, Debug, PartialEq)]
pub enum TermCell {
    FieldCell(CellKind),
    BorderVertical,
    BorderHorizontal,
    BorderTopLeft,
    BorderTopRight,
    BorderBottomLeft,
    BorderBottomRight,
    Space,
    Message(String),
}

pub trait TermStyle {
    fn display<'a>(&self, cell: &'a TermCell) -> &'a str;

    fn width(&self, cell: &TermCell) -> usize {
        match cell {
            TermCell::FieldCell(_) | TermCell::BorderHorizontal => 2,
            TermCell::Message(s) => s.chars().count(),
            _ => 1,
        }
    }
}

pub trait TermRender {
    fn output(&self, style: &impl TermStyle) -> Vec<Vec<TermCell>>;

    fn render(&self, style: &impl TermStyle) -> Vec<String> {
        self.output(style)
            .iter()
            .map(|row| row.iter().map(|cell| style.display(cell)).collect())
            .collect()
    }
}

fn line_width(line: &[TermCell], style: &impl TermStyle) -> usize {
    line.iter().map(|cell| style.width(cell)).sum()
}

// Make all lines in block the same width by padding with TermCell::Space
pub fn pad_block_right(block: &mut [Vec<TermCell>], style: &impl TermStyle) -> usize {
    assert_eq!(style.width(&TermCell::Space), 1);
    let width = block.iter().map(|line| line_width(line, style)).max().unwrap_or(0);
    for line in block.iter_mut() {
        let padding = width - line_width(line, style);
        line.extend(std::iter::repeat_n(TermCell::Space, padding));
    }
    width
}

pub struct PlainTermStyle;

impl TermStyle for PlainTermStyle {
    fn display<'a>(&self, cell: &'a TermCell) -> &'a str {
        match cell {
            TermCell::FieldCell(CellKind::Empty) => "  ",
            TermCell::FieldCell(_) => "[]",
            TermCell::BorderVertical => "|",
            TermCell::BorderHorizontal => "--",
            TermCell::BorderTopLeft
            | TermCell::BorderTopRight
            | TermCell::BorderBottomLeft
            | TermCell::BorderBottomRight => "+",
            TermCell::Space => " ",
            TermCell::Message(s) => s.as_str(),
        }
    }
}

pub struct AnsiTermStyle;

impl TermStyle for AnsiTermStyle {
    fn display<'a>(&self, cell: &'a TermCell) -> &'a str {
        match cell {
            TermCell::FieldCell(CellKind::Empty) => "\x1b[0m  ",
            TermCell::FieldCell(CellKind::Filled) => "\x1b[0;90m[]",
            TermCell::FieldCell(CellKind::Piece(PieceType::I)) => "\x1b[0;34m[]",
            TermCell::FieldCell(CellKind::Piece(PieceType::J)) => "\x1b[0;32m[]",
            TermCell::FieldCell(CellKind::Piece(PieceType::L)) => "\x1b[0;33m[]",
            TermCell::FieldCell(CellKind::Piece(PieceType::O)) => "\x1b[0;35m[]",
            TermCell::FieldCell(CellKind::Piece(PieceType::S)) => "\x1b[0;36m[]",
            TermCell::FieldCell(CellKind::Piece(PieceType::T)) => "\x1b[0;37m[]",
            TermCell::FieldCell(CellKind::Piece(PieceType::Z)) => "\x1b[0;31m[]",
            TermCell::BorderVertical => "\x1b[0m│",
            TermCell::BorderTopLeft => "\x1b[0m┌",
            TermCell::BorderTopRight => "\x1b[0m┐",
            TermCell::BorderBottomLeft => "\x1b[0m└",
            TermCell::BorderHorizontal => "\x1b[0m──",
            TermCell::BorderBottomRight => "\x1b[0m┘",
            TermCell::Space => " ",
            TermCell::Message(s) => s.as_str(),
        }
    }
}

/// One board with its border, and a status banner over the middle row
pub struct WellField<'a> {
    state: &'a GameState,
}

impl<'a> WellField<'a> {
    pub fn new(state: &'a GameState) -> Self {
        Self { state }
    }

    fn banner(&self) -> Option<&'static str> {
        match self.state.status() {
            Status::Waiting => Some(" Press s"),
            Status::Starting => Some(" Waiting..."),
            Status::Paused => Some(" Paused"),
            Status::Ended => Some(" Game Over"),
            Status::Running => None,
        }
    }
}

impl TermRender for WellField<'_> {
    fn output(&self, style: &impl TermStyle) -> Vec<Vec<TermCell>> {
        let grid = self.state.grid();
        let mut cells: Vec<Vec<CellKind>> = grid
            .rows()
            .iter()
            .map(|row| row.iter().map(|&occupied| if occupied { CellKind::Filled } else { CellKind::Empty }).collect())
            .collect();
        if let Some(sprite) = self.state.active_piece() {
            for point in sprite.occupied_cells() {
                if point.y >= 0 && (point.x as usize) < grid.width() && (point.y as usize) < grid.height() {
                    cells[point.y as usize][point.x as usize] = CellKind::Piece(sprite.piece());
                }
            }
        }

        let mut lines: Vec<Vec<TermCell>> = cells
            .into_iter()
            .map(|row| row.into_iter().map(TermCell::FieldCell).collect())
            .collect();
        if let Some(banner) = self.banner() {
            let middle = lines.len() / 2;
            lines[middle] = vec![TermCell::Message(banner.to_string())];
            pad_block_right(&mut lines, style);
        }

        for line in &mut lines {
            line.insert(0, TermCell::BorderVertical);
            line.push(TermCell::BorderVertical);
        }
        let mut bottom = vec![TermCell::BorderBottomLeft];
        bottom.extend(std::iter::repeat_n(TermCell::BorderHorizontal, grid.width()));
        bottom.push(TermCell::BorderBottomRight);
        lines.push(bottom);
        lines
    }
}

/// Boxed 4x4 preview of the next piece
pub struct PreviewField<'a> {
    state: &'a GameState,
}

impl<'a> PreviewField<'a> {
    pub fn new(state: &'a GameState) -> Self {
        Self { state }
    }
}

impl TermRender for PreviewField<'_> {
    fn output(&self, _style: &impl TermStyle) -> Vec<Vec<TermCell>> {
        const SIZE: usize = 4;
        let next = self.state.next_pieces().iter().next();
        let mut lines = Vec::with_capacity(SIZE + 2);

        let mut top = vec![TermCell::BorderTopLeft];
        top.extend(std::iter::repeat_n(TermCell::BorderHorizontal, SIZE));
        top.push(TermCell::BorderTopRight);
        lines.push(top);
        for y in 0..SIZE {
            let mut line = vec![TermCell::BorderVertical];
            for x in 0..SIZE {
                let kind = match next {
                    Some(descriptor) if descriptor.shape().is_occupied(x, y) => CellKind::Piece(descriptor.piece),
                    _ => CellKind::Empty,
                };
                line.push(TermCell::FieldCell(kind));
            }
            line.push(TermCell::BorderVertical);
            lines.push(line);
        }
        let mut bottom = vec![TermCell::BorderBottomLeft];
        bottom.extend(std::iter::repeat_n(TermCell::BorderHorizontal, SIZE));
        bottom.push(TermCell::BorderBottomRight);
        lines.push(bottom);
        lines
    }
}

/// Opponent board on the left, own board on the right, preview, scores and
/// messages in between
pub struct GameFieldPair<'a> {
    player: &'a GameState,
    opponent: &'a GameState,
    player_name: &'a str,
    message: &'a [String],
}

impl<'a> GameFieldPair<'a> {
    pub fn new(player: &'a GameState, opponent: &'a GameState, player_name: &'a str, message: &'a [String]) -> Self {
        Self {
            player,
            opponent,
            player_name,
            message,
        }
    }
}

impl TermRender for GameFieldPair<'_> {
    fn output(&self, style: &impl TermStyle) -> Vec<Vec<TermCell>> {
        let mut opponent_well = WellField::new(self.opponent).output(style);
        let mut player_well = WellField::new(self.player).output(style);
        let opponent_width = pad_block_right(&mut opponent_well, style);
        let player_width = pad_block_right(&mut player_well, style);

        let mut middle = PreviewField::new(self.player).output(style);
        middle.push(Vec::new());
        for text in [
            format!("{}: {}", self.player_name, self.player.score()),
            format!("opponent: {}", self.opponent.score()),
        ] {
            middle.push(vec![TermCell::Message(text)]);
        }
        middle.push(Vec::new());
        middle.extend(self.message.iter().map(|m| vec![TermCell::Message(m.clone())]));
        let middle_width = pad_block_right(&mut middle, style);

        let total_lines = opponent_well.len().max(player_well.len()).max(middle.len());
        let mut lines = Vec::with_capacity(total_lines);
        for i in 0..total_lines {
            let mut line = Vec::new();
            for (block, width) in [
                (&opponent_well, opponent_width),
                (&middle, middle_width),
                (&player_well, player_width),
            ] {
                match block.get(i) {
                    Some(row) => line.extend(row.iter().cloned()),
                    None => line.extend(std::iter::repeat_n(TermCell::Space, width)),
                }
                line.push(TermCell::Space);
            }
            lines.push(line);
        }
        lines
    }
}

/// Observer drawing both boards to the terminal at a bounded frame rate
pub struct TermRenderer {
    term: Term,
    player_name: String,
    message: Arc<Mutex<Vec<String>>>,
    last_render: Option<Instant>,
    render_interval: Duration,
}

impl TermRenderer {
    /// `message` lines are shown under the scores and can be changed by the caller
    pub fn new(player_name: String, message: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            term: Term::stdout(),
            player_name,
            message,
            last_render: None,
            render_interval: Duration::from_millis(50),
        }
    }

    fn render(&self, view: &SimView<'_>) -> std::io::Result<()> {
        let message = self.message.lock().map(|m| m.clone()).unwrap_or_default();
        let field = GameFieldPair::new(view.player, view.opponent, &self.player_name, &message);
        self.term.move_cursor_to(0, 0)?;
        for line in field.render(&AnsiTermStyle) {
            self.term.write_line(&line)?;
        }
        self.term.flush()
    }
}

impl Observer for TermRenderer {
    fn update(&mut self, _view: &SimView<'_>) {}

    fn draw(&mut self, view: &SimView<'_>) {
        let now = Instant::now();
        if self.last_render.is_some_and(|last| now.duration_since(last) < self.render_interval) {
            return;
        }
        self.last_render = Some(now);
        if let Err(e) = self.render(view) {
            tracing::warn!("render failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetris_core::{Controller, SimConfig};

    fn running_state() -> GameState {
        let mut controller = Controller::with_seed(SimConfig::default(), 2);
        controller.request_start();
        controller.apply_start();
        controller.tick(Instant::now());
        controller.state().clone()
    }

    #[test]
    fn test_well_dimensions() {
        let state = running_state();
        let lines = WellField::new(&state).render(&PlainTermStyle);
        assert_eq!(lines.len(), 17);
        for line in &lines {
            assert_eq!(line.chars().count(), 8 * 2 + 2);
        }
        assert_eq!(lines[16], format!("+{}+", "--".repeat(8)));
    }

    #[test]
    fn test_well_shows_locked_and_active_cells() {
        let mut controller = Controller::with_seed(SimConfig::default(), 2);
        controller.request_start();
        controller.apply_start();
        let t0 = Instant::now();
        controller.tick(t0);
        // Let the piece fall into view
        for step in 1..=4 {
            controller.tick(t0 + Duration::from_millis(500 * step));
        }
        let lines = WellField::new(controller.state()).render(&PlainTermStyle);
        assert!(lines[..16].iter().any(|line| line.contains("[]")));
    }

    #[test]
    fn test_banner_by_status() {
        let state = GameState::new(8, 16, 3);
        let lines = WellField::new(&state).render(&PlainTermStyle);
        assert!(lines[8].contains("Press s"));

        let running = running_state();
        let lines = WellField::new(&running).render(&PlainTermStyle);
        assert!(lines.iter().all(|line| !line.contains("Press s")));
    }

    #[test]
    fn test_pair_lines_have_equal_width() {
        let player = running_state();
        let opponent = GameState::new(8, 16, 3);
        let message = vec!["room: abc".to_string()];
        let field = GameFieldPair::new(&player, &opponent, "Finn_1", &message);
        let lines = field.render(&PlainTermStyle);
        assert_eq!(lines.len(), 17);
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|line| line.chars().count() == width));
        assert!(lines.iter().any(|line| line.contains("Finn_1: 0")));
        assert!(lines.iter().any(|line| line.contains("room: abc")));
    }
}
