use super::load_structure;
use crate::cli::SequenceArgs;
use crate::error::Result;
use molsel::ops::residues::sequence;

pub fn run(args: SequenceArgs) -> Result<()> {
    let (structure, _) = load_structure(&args.input)?;
    for chain in sequence(&structure) {
        if chain.segid.is_empty() {
            println!("{}: {}", chain.chain, chain.sequence);
        } else {
            println!("{} ({}): {}", chain.chain, chain.segid, chain.sequence);
        }
    }
    Ok(())
}
