use crate::writer::ChunkReader;
use clap::Args;
use std::error::Error;

#[derive(Args)]
pub struct InfoCommand {
    /// Chunk file (training.N.gz) written by the `convert` command
    #[arg(value_name = "chunk")]
    input: String,

    /// Print at most this many records
    #[arg(long, value_name = "records", default_value = "10")]
    records: usize,
}

pub fn info(cmd: InfoCommand) -> Result<(), Box<dyn Error>> {
    let mut reader = ChunkReader::open(&cmd.input)?;
    let mut count = 0;

    while let Some(record) = reader.read_record()? {
        if count < cmd.records {
            println!(
                "#{} stm={} rule50={} result={} q={:.4} d={:.1} played={} legal={}",
                count,
                if record.side_to_move == 0 { "white" } else { "black" },
                record.rule50_count,
                record.result,
                record.root_q,
                record.root_d,
                record
                    .probabilities
                    .played_index()
                    .map_or("-".to_string(), |index| index.to_string()),
                record.probabilities.legal_count(),
            );
        }
        count += 1;
    }

    println!("{} records", count);

    Ok(())
}
