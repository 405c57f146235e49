//! Piece catalog: the seven tetromino kinds and their rotation states.
//!
//! Each state is a fixed set of four cell offsets relative to the piece
//! anchor (top-left of the bounding box), stored in static tables. Rotation
//! indices cycle modulo the kind's number of distinct states: one for O,
//! two for I/S/Z, four for T/J/L.

/// Tetromino kinds (I, O, T, S, Z, J, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

/// Cell offsets for one rotation state; each entry is (dx, dy).
pub type Shape = [(i8, i8); 4];

const I_STATES: [Shape; 2] = [
    [(0, 0), (1, 0), (2, 0), (3, 0)],
    [(0, 0), (0, 1), (0, 2), (0, 3)],
];

const O_STATES: [Shape; 1] = [[(0, 0), (1, 0), (0, 1), (1, 1)]];

const T_STATES: [Shape; 4] = [
    [(1, 0), (0, 1), (1, 1), (2, 1)],
    [(0, 0), (0, 1), (1, 1), (0, 2)],
    [(0, 0), (1, 0), (2, 0), (1, 1)],
    [(1, 0), (0, 1), (1, 1), (1, 2)],
];

const S_STATES: [Shape; 2] = [
    [(1, 0), (2, 0), (0, 1), (1, 1)],
    [(0, 0), (0, 1), (1, 1), (1, 2)],
];

const Z_STATES: [Shape; 2] = [
    [(0, 0), (1, 0), (1, 1), (2, 1)],
    [(1, 0), (0, 1), (1, 1), (0, 2)],
];

const J_STATES: [Shape; 4] = [
    [(0, 0), (0, 1), (1, 1), (2, 1)],
    [(0, 0), (1, 0), (0, 1), (0, 2)],
    [(0, 0), (1, 0), (2, 0), (2, 1)],
    [(1, 0), (1, 1), (0, 2), (1, 2)],
];

const L_STATES: [Shape; 4] = [
    [(2, 0), (0, 1), (1, 1), (2, 1)],
    [(0, 0), (0, 1), (0, 2), (1, 2)],
    [(0, 0), (1, 0), (2, 0), (0, 1)],
    [(0, 0), (1, 0), (1, 1), (1, 2)],
];

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    fn states(self) -> &'static [Shape] {
        match self {
            Self::I => &I_STATES,
            Self::O => &O_STATES,
            Self::T => &T_STATES,
            Self::S => &S_STATES,
            Self::Z => &Z_STATES,
            Self::J => &J_STATES,
            Self::L => &L_STATES,
        }
    }

    /// Number of distinct rotation states for this kind.
    pub fn rotation_states(self) -> u8 {
        self.states().len() as u8
    }

    /// Cell offsets for the given rotation index (wraps modulo the state count).
    pub fn cells(self, rotation: u8) -> Shape {
        let states = self.states();
        states[rotation as usize % states.len()]
    }

    /// Bounding-box width of the spawn (rotation 0) state, used to center
    /// new pieces on the top row.
    pub fn spawn_width(self) -> i32 {
        match self {
            Self::I => 4,
            Self::O => 2,
            _ => 3,
        }
    }

    /// Color identity carried by locked cells, and the vocabulary used by
    /// puzzle grid files.
    pub fn color_name(self) -> &'static str {
        match self {
            Self::I => "CYAN",
            Self::O => "YELLOW",
            Self::T => "PURPLE",
            Self::S => "GREEN",
            Self::Z => "RED",
            Self::J => "BLUE",
            Self::L => "ORANGE",
        }
    }

    /// Inverse of [`color_name`](Self::color_name), case-insensitive.
    pub fn from_color_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "CYAN" => Some(Self::I),
            "YELLOW" => Some(Self::O),
            "PURPLE" => Some(Self::T),
            "GREEN" => Some(Self::S),
            "RED" => Some(Self::Z),
            "BLUE" => Some(Self::J),
            "ORANGE" => Some(Self::L),
            _ => None,
        }
    }
}
