pub mod convert;
pub mod error;
pub mod game;
pub mod game_visitor;
pub mod info;
pub mod moves;
pub mod outcome;
pub mod planes;
pub mod policy;
pub mod processor;
pub mod record;
pub mod score;
pub mod writer;
