use thiserror::Error;

use crate::color::{Color, rgb_to_color};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("world map is empty")]
    Empty,

    #[error("world map column {x} has {actual} cells, expected {expected}")]
    Ragged {
        x: usize,
        expected: usize,
        actual: usize,
    },

    #[error("border cell ({x}, {y}) is open; the map must be fully enclosed")]
    OpenBorder { x: usize, y: usize },

    #[error("cell ({x}, {y}) uses value {value} but the palette has {palette_len} entries")]
    MissingColor {
        x: usize,
        y: usize,
        value: u8,
        palette_len: usize,
    },
}

const CLASSIC_MAP: [[u8; 24]; 24] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 0, 0, 0, 0, 3, 0, 3, 0, 3, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 3, 0, 0, 0, 3, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 2, 0, 2, 2, 0, 0, 0, 0, 3, 0, 3, 0, 3, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 4, 4, 4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 4, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 0, 0, 0, 5, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 4, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 4, 4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 4, 4, 4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Immutable occupancy grid. 0 is open space, anything else is a wall whose
/// value indexes the [`Palette`].
#[derive(Debug, Clone)]
pub struct WorldMap {
    width: usize,  // extent along x
    height: usize, // extent along y
    cells: Vec<u8>,
}

impl WorldMap {
    /// Build from columns: `columns[x][y]`. The border must be fully occupied
    /// so every ray and every move is bounded.
    pub fn from_columns<C: AsRef<[u8]>>(columns: &[C]) -> Result<Self, WorldError> {
        let width = columns.len();
        let height = columns.first().map_or(0, |c| c.as_ref().len());
        if width == 0 || height == 0 {
            return Err(WorldError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (x, column) in columns.iter().enumerate() {
            let column = column.as_ref();
            if column.len() != height {
                return Err(WorldError::Ragged {
                    x,
                    expected: height,
                    actual: column.len(),
                });
            }
            cells.extend_from_slice(column);
        }

        let map = Self {
            width,
            height,
            cells,
        };
        map.check_border()?;
        Ok(map)
    }

    pub fn classic() -> Result<Self, WorldError> {
        Self::from_columns(&CLASSIC_MAP)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Coordinates are clamped into the grid; since the border is solid, a
    /// stray lookup reads a wall rather than faulting.
    #[inline]
    pub fn cell_at(&self, x: i32, y: i32) -> u8 {
        debug_assert!(
            x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height,
            "map lookup out of bounds: ({x}, {y})"
        );
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        self.cells[x * self.height + y]
    }

    #[inline]
    pub fn is_open(&self, x: i32, y: i32) -> bool {
        self.cell_at(x, y) == 0
    }

    fn check_border(&self) -> Result<(), WorldError> {
        let (w, h) = (self.width, self.height);
        let border = (0..w)
            .flat_map(|x| [(x, 0), (x, h - 1)])
            .chain((0..h).flat_map(|y| [(0, y), (w - 1, y)]));
        for (x, y) in border {
            if self.cells[x * h + y] == 0 {
                return Err(WorldError::OpenBorder { x, y });
            }
        }
        Ok(())
    }

    /// Every wall value must resolve to a palette color.
    pub fn check_palette(&self, palette: &Palette) -> Result<(), WorldError> {
        for (i, &value) in self.cells.iter().enumerate() {
            if value as usize >= palette.len() {
                return Err(WorldError::MissingColor {
                    x: i / self.height,
                    y: i % self.height,
                    value,
                    palette_len: palette.len(),
                });
            }
        }
        Ok(())
    }
}

/// Wall colors indexed by cell value. Entry 0 is never drawn.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    pub fn classic() -> Self {
        Self::new(vec![
            Color::BLACK,
            rgb_to_color(255, 0, 0),
            rgb_to_color(0, 255, 0),
            rgb_to_color(0, 0, 255),
            rgb_to_color(255, 255, 255),
            rgb_to_color(255, 255, 0),
        ])
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn color_for(&self, value: u8) -> Color {
        self.colors.get(value as usize).copied().unwrap_or(Color::BLACK)
    }
}
