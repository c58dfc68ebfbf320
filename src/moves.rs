use once_cell::sync::Lazy;
use shakmaty::{Color, File, Move, Rank, Role, Square};
use std::fmt;

/// Size of the canonical move space
pub const NUM_MOVES: usize = 1858;

/// Promotion piece of a canonical move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    None,
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl Promotion {
    pub fn from_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::Knight) => Promotion::Knight,
            Some(Role::Bishop) => Promotion::Bishop,
            Some(Role::Rook) => Promotion::Rook,
            Some(Role::Queen) => Promotion::Queen,
            _ => Promotion::None,
        }
    }

    fn suffix(self) -> Option<char> {
        match self {
            Promotion::None => None,
            Promotion::Knight => Some('n'),
            Promotion::Bishop => Some('b'),
            Promotion::Rook => Some('r'),
            Promotion::Queen => Some('q'),
        }
    }
}

/// A move expressed from the point of view of the side to move.
///
/// Black moves are mirrored vertically so that the mover always plays "up the board",
/// and castling always lands the king on the c or g file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Promotion,
    pub castling: bool,
}

impl CanonicalMove {
    pub fn new(from: Square, to: Square) -> Self {
        CanonicalMove {
            from,
            to,
            promotion: Promotion::None,
            castling: false,
        }
    }

    /// Translates a move for the given side to move into the canonical space
    pub fn translate(mov: &Move, turn: Color) -> Self {
        let canonical = match *mov {
            Move::Castle { king, rook } => {
                // the king's landing file does not depend on where the rook starts (Chess960)
                let file = if king.file() < rook.file() {
                    File::G
                } else {
                    File::C
                };
                CanonicalMove {
                    from: king,
                    to: Square::from_coords(file, king.rank()),
                    promotion: Promotion::None,
                    castling: true,
                }
            }
            _ => CanonicalMove {
                from: mov.from().unwrap_or(mov.to()),
                to: mov.to(),
                promotion: Promotion::from_role(mov.promotion()),
                castling: false,
            },
        };

        match turn {
            Color::White => canonical,
            Color::Black => canonical.mirror(),
        }
    }

    /// Flips both squares across the horizontal middle of the board
    pub fn mirror(self) -> Self {
        CanonicalMove {
            from: self.from.flip_vertical(),
            to: self.to.flip_vertical(),
            ..self
        }
    }

    pub fn same_squares(&self, other: &CanonicalMove) -> bool {
        self.from == other.from && self.to == other.to && self.promotion == other.promotion
    }

    /// Position of this move in the canonical move space.
    /// `None` for a castling move whose king does not change square.
    pub fn nn_index(&self) -> Option<usize> {
        MOVE_INDEX.index_of(self)
    }
}

impl fmt::Display for CanonicalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(suffix) = self.promotion.suffix() {
            write!(f, "{}", suffix)?;
        }
        Ok(())
    }
}

/// Lookup from (from, to, promotion) to the canonical move index.
///
/// Every queen-line and knight move from every square comes first, ordered by origin then
/// destination. Promotions to queen, rook and bishop from the seventh rank follow.
/// Knight promotions share the index of the plain pawn move.
struct MoveIndex {
    plain: Vec<u16>,
    promotions: [[[u16; 3]; 3]; 8],
}

static MOVE_INDEX: Lazy<MoveIndex> = Lazy::new(MoveIndex::build);

const NO_INDEX: u16 = u16::MAX;

impl MoveIndex {
    fn build() -> Self {
        let mut plain = vec![NO_INDEX; 64 * 64];
        let mut promotions = [[[NO_INDEX; 3]; 3]; 8];
        let mut next = 0u16;

        for from in 0..64u32 {
            for to in 0..64u32 {
                if is_queen_or_knight_move(Square::new(from), Square::new(to)) {
                    plain[(from * 64 + to) as usize] = next;
                    next += 1;
                }
            }
        }

        for from_file in 0..8usize {
            for to_file in from_file.saturating_sub(1)..=(from_file + 1).min(7) {
                let direction = to_file + 1 - from_file;
                for slot in promotions[from_file][direction].iter_mut() {
                    *slot = next;
                    next += 1;
                }
            }
        }

        debug_assert_eq!(next as usize, NUM_MOVES);

        MoveIndex { plain, promotions }
    }

    fn index_of(&self, mov: &CanonicalMove) -> Option<usize> {
        let slot = match mov.promotion {
            Promotion::Queen => Some(0),
            Promotion::Rook => Some(1),
            Promotion::Bishop => Some(2),
            Promotion::Knight | Promotion::None => None,
        };

        if let Some(slot) = slot {
            if mov.from.rank() == Rank::Seventh && mov.to.rank() == Rank::Eighth {
                let from_file = mov.from.file() as usize;
                let to_file = mov.to.file() as usize;
                if from_file.abs_diff(to_file) <= 1 {
                    return Some(self.promotions[from_file][to_file + 1 - from_file][slot] as usize);
                }
            }
        }

        match self.plain[mov.from as usize * 64 + mov.to as usize] {
            NO_INDEX => None,
            index => Some(index as usize),
        }
    }
}

fn is_queen_or_knight_move(from: Square, to: Square) -> bool {
    if from == to {
        return false;
    }

    let files = (from.file() as i32 - to.file() as i32).abs();
    let ranks = (from.rank() as i32 - to.rank() as i32).abs();

    files == 0 || ranks == 0 || files == ranks || (files == 1 && ranks == 2) || (files == 2 && ranks == 1)
}
