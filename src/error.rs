use shakmaty::fen::ParseFenError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot open {path}: {source}")]
    OpenInput {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot write training data: {0}")]
    Write(#[from] io::Error),
}

/// Starting position of a game that cannot be set up
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid FEN: {0}")]
    Fen(#[from] ParseFenError),

    #[error("illegal position: {0}")]
    Position(String),
}
