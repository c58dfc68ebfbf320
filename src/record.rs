use crate::moves::{CanonicalMove, NUM_MOVES};
use crate::outcome::GameResult;
use crate::planes::{PlaneEncoder, Planes, HISTORY_LENGTH, NUM_PLANES};
use crate::policy::MoveProbabilities;
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use shakmaty::{CastlingSide, Chess, Color, Position};
use std::io::{self, Read, Write};

/// Version tag of the record layout
pub const RECORD_VERSION: u32 = 4;

/// Size in bytes of one serialized record
pub const RECORD_SIZE: usize = 4 + NUM_MOVES * 4 + NUM_PLANES * 8 + 8 + 4 * 4;

/// Castling rights relative to the side to move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CastlingRights {
    pub us_ooo: bool,
    pub us_oo: bool,
    pub them_ooo: bool,
    pub them_oo: bool,
}

impl CastlingRights {
    pub fn of(position: &Chess) -> Self {
        let us = position.turn();
        let castles = position.castles();

        CastlingRights {
            us_ooo: castles.has(us, CastlingSide::QueenSide),
            us_oo: castles.has(us, CastlingSide::KingSide),
            them_ooo: castles.has(us.other(), CastlingSide::QueenSide),
            them_oo: castles.has(us.other(), CastlingSide::KingSide),
        }
    }
}

/// One training example
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub probabilities: MoveProbabilities,
    pub planes: Planes,
    pub castling: CastlingRights,
    /// 1 when black is to move
    pub side_to_move: u8,
    /// Plies since the last capture or pawn move
    pub rule50_count: u8,
    /// Game result from the point of view of the side to move
    pub result: i8,
    pub root_q: f32,
    pub best_q: f32,
    pub root_d: f32,
    pub best_d: f32,
}

impl TrainingRecord {
    /// Builds the record for the last position of `history`.
    ///
    /// `q` is the expected outcome derived from the engine evaluation. It is stored negated
    /// when black is to move, in line with the mirrored move space.
    ///
    /// # Panics
    ///
    /// Panics if `history` is empty.
    pub fn assemble(
        game_result: GameResult,
        history: &[Chess],
        encoder: &dyn PlaneEncoder,
        played: &CanonicalMove,
        legal_moves: &[CanonicalMove],
        q: f32,
    ) -> Self {
        let probabilities = MoveProbabilities::build(legal_moves, played);

        // the encoder bit order is mirrored within each byte compared to the stored one
        let mut planes = encoder.encode(history, HISTORY_LENGTH);
        for plane in planes.iter_mut() {
            *plane = reverse_bits_in_bytes(*plane);
        }

        let position = &history[history.len() - 1];
        let turn = position.turn();
        let d = game_result.draw_value();
        let q = match turn {
            Color::White => q,
            Color::Black => -q,
        };

        TrainingRecord {
            probabilities,
            planes,
            castling: CastlingRights::of(position),
            side_to_move: u8::from(turn == Color::Black),
            rule50_count: position.halfmoves().min(u8::MAX as u32) as u8,
            result: game_result.relative_to(turn),
            root_q: q,
            best_q: q,
            root_d: d,
            best_d: d,
        }
    }

    pub fn write_to<W: Write>(&self, write: &mut W) -> io::Result<()> {
        write.write_u32::<LittleEndian>(RECORD_VERSION)?;
        for probability in self.probabilities.as_slice() {
            write.write_f32::<LittleEndian>(*probability)?;
        }
        for plane in self.planes.iter() {
            write.write_u64::<LittleEndian>(*plane)?;
        }

        write.write_all(&[
            u8::from(self.castling.us_ooo),
            u8::from(self.castling.us_oo),
            u8::from(self.castling.them_ooo),
            u8::from(self.castling.them_oo),
            self.side_to_move,
            self.rule50_count,
            0, // move count, unused
        ])?;
        write.write_i8(self.result)?;

        write.write_f32::<LittleEndian>(self.root_q)?;
        write.write_f32::<LittleEndian>(self.best_q)?;
        write.write_f32::<LittleEndian>(self.root_d)?;
        write.write_f32::<LittleEndian>(self.best_d)
    }

    /// Reads the next record, `None` at the end of the stream
    pub fn read_from<R: Read>(read: &mut R) -> io::Result<Option<Self>> {
        // only a stream that ends exactly between two records is a clean end
        let mut tag = [0u8; 4];
        let mut filled = 0;
        while filled < tag.len() {
            match read.read(&mut tag[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        match filled {
            0 => return Ok(None),
            4 => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "truncated record version",
                ))
            }
        }

        let version = LittleEndian::read_u32(&tag);
        if version != RECORD_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported record version {}", version),
            ));
        }

        let mut probabilities = vec![0f32; NUM_MOVES];
        read.read_f32_into::<LittleEndian>(&mut probabilities)?;

        let mut planes = [0u64; NUM_PLANES];
        read.read_u64_into::<LittleEndian>(&mut planes)?;

        let mut flags = [0u8; 7];
        read.read_exact(&mut flags)?;
        let result = read.read_i8()?;

        Ok(Some(TrainingRecord {
            probabilities: MoveProbabilities::from_vec(probabilities),
            planes,
            castling: CastlingRights {
                us_ooo: flags[0] != 0,
                us_oo: flags[1] != 0,
                them_ooo: flags[2] != 0,
                them_oo: flags[3] != 0,
            },
            side_to_move: flags[4],
            rule50_count: flags[5],
            result,
            root_q: read.read_f32::<LittleEndian>()?,
            best_q: read.read_f32::<LittleEndian>()?,
            root_d: read.read_f32::<LittleEndian>()?,
            best_d: read.read_f32::<LittleEndian>()?,
        }))
    }
}

/// Reverses the order of the bits inside each byte, keeping the byte order
pub fn reverse_bits_in_bytes(v: u64) -> u64 {
    let v = ((v >> 1) & 0x5555_5555_5555_5555) | ((v & 0x5555_5555_5555_5555) << 1);
    let v = ((v >> 2) & 0x3333_3333_3333_3333) | ((v & 0x3333_3333_3333_3333) << 2);
    ((v >> 4) & 0x0f0f_0f0f_0f0f_0f0f) | ((v & 0x0f0f_0f0f_0f0f_0f0f) << 4)
}
