use shakmaty::{Bitboard, Board, Chess, Color, Position, Role};

/// Number of past positions encoded, the current one included
pub const HISTORY_LENGTH: usize = 8;

/// Own pieces (6), opponent pieces (6), repetition marker
pub const PLANES_PER_POSITION: usize = 13;

pub const NUM_PLANES: usize = HISTORY_LENGTH * PLANES_PER_POSITION;

pub type Planes = [u64; NUM_PLANES];

const ROLES: [Role; 6] = [
    Role::Pawn,
    Role::Knight,
    Role::Bishop,
    Role::Rook,
    Role::Queen,
    Role::King,
];

/// Encodes a game history into bitmask planes (bit `i` is square `i`, a1 = 0)
pub trait PlaneEncoder {
    /// `history` holds every position of the game so far, the current one last.
    /// At most `depth` positions are encoded, newest first.
    fn encode(&self, history: &[Chess], depth: usize) -> Planes;
}

/// Encodes the last positions of the game, always from the point of view of the side to move
/// of the newest position: its pieces come first and the boards are mirrored when black moves.
#[derive(Debug, Default, Clone, Copy)]
pub struct HistoryEncoder;

impl PlaneEncoder for HistoryEncoder {
    fn encode(&self, history: &[Chess], depth: usize) -> Planes {
        let mut planes = [0u64; NUM_PLANES];

        let Some(current) = history.last() else {
            return planes;
        };
        let us = current.turn();
        let starts_from_setup = history[0].board() != &Board::default();

        for step in 0..depth.min(HISTORY_LENGTH) {
            let (position, in_game) = match history.len().checked_sub(step + 1) {
                Some(index) => (&history[index], Some(index)),
                // before the game start, repeat the initial position of a custom setup only
                None if starts_from_setup => (&history[0], None),
                None => break,
            };

            let board = position.board();
            let base = step * PLANES_PER_POSITION;

            for (offset, role) in ROLES.iter().enumerate() {
                planes[base + offset] = oriented(board.by_color(us) & board.by_role(*role), us);
                planes[base + 6 + offset] =
                    oriented(board.by_color(us.other()) & board.by_role(*role), us);
            }

            if let Some(index) = in_game {
                if is_repetition(history, index) {
                    planes[base + 12] = u64::MAX;
                }
            }
        }

        planes
    }
}

fn oriented(bitboard: Bitboard, perspective: Color) -> u64 {
    match perspective {
        Color::White => bitboard.0,
        // one byte per rank: reversing the bytes flips the board vertically
        Color::Black => bitboard.0.swap_bytes(),
    }
}

/// Whether the position at `index` already occurred earlier in the game
fn is_repetition(history: &[Chess], index: usize) -> bool {
    let position = &history[index];
    let halfmoves = position.halfmoves() as usize;

    // positions before the last capture or pawn move cannot repeat
    let earliest = index.saturating_sub(halfmoves);

    history[earliest..index].iter().any(|earlier| {
        earlier.turn() == position.turn()
            && earlier.board() == position.board()
            && earlier.castles().castling_rights() == position.castles().castling_rights()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{fen::Fen, san::San, CastlingMode};

    fn play(history: &mut Vec<Chess>, sans: &[&str]) {
        for san in sans {
            let position = history.last().unwrap().clone();
            let mov = san.parse::<San>().unwrap().to_move(&position).unwrap();
            history.push(position.play(&mov).unwrap());
        }
    }

    #[test]
    fn start_position_planes() {
        let planes = HistoryEncoder.encode(&[Chess::default()], HISTORY_LENGTH);

        assert_eq!(planes[0], 0x0000_0000_0000_ff00); // own pawns
        assert_eq!(planes[5], 0x0000_0000_0000_0010); // own king on e1
        assert_eq!(planes[6], 0x00ff_0000_0000_0000); // opponent pawns
        assert_eq!(planes[11], 0x1000_0000_0000_0000); // opponent king on e8
        assert_eq!(planes[12], 0);

        // no history before the standard start position
        assert!(planes[PLANES_PER_POSITION..].iter().all(|p| *p == 0));
    }

    #[test]
    fn black_to_move_is_mirrored() {
        let mut history = vec![Chess::default()];
        play(&mut history, &["e4"]);

        let planes = HistoryEncoder.encode(&history, HISTORY_LENGTH);

        // black pawns seen from black's side sit on the second rank
        assert_eq!(planes[0], 0x0000_0000_0000_ff00);
        // black king on e8 mirrors to e1
        assert_eq!(planes[5], 0x0000_0000_0000_0010);
        // white pawn on e4 mirrors to e5
        assert_ne!(planes[6] & (1 << 36), 0);

        // previous position is encoded from black's view too
        assert_eq!(planes[PLANES_PER_POSITION], 0x0000_0000_0000_ff00);
        assert_eq!(planes[PLANES_PER_POSITION + 6], 0x00ff_0000_0000_0000);
    }

    #[test]
    fn custom_setup_fills_history() {
        let position: Chess = Fen::from_ascii(b"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap();

        let planes = HistoryEncoder.encode(&[position], HISTORY_LENGTH);
        for step in 0..HISTORY_LENGTH {
            assert_eq!(planes[step * PLANES_PER_POSITION], 1 << 12);
        }
    }

    #[test]
    fn depth_limits_history() {
        let mut history = vec![Chess::default()];
        play(&mut history, &["e4", "e5", "Nf3"]);

        let planes = HistoryEncoder.encode(&history, 2);
        assert_ne!(planes[PLANES_PER_POSITION], 0);
        assert!(planes[2 * PLANES_PER_POSITION..].iter().all(|p| *p == 0));
    }

    #[test]
    fn repetitions_are_marked() {
        let mut history = vec![Chess::default()];
        play(&mut history, &["Nf3", "Nf6", "Ng1", "Ng8"]);

        let planes = HistoryEncoder.encode(&history, HISTORY_LENGTH);
        // the current position repeats the start position
        assert_eq!(planes[12], u64::MAX);
        assert_eq!(planes[PLANES_PER_POSITION + 12], 0);
    }
}
