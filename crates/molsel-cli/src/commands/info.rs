use super::load_structure;
use crate::cli::InfoArgs;
use crate::error::Result;
use molsel::ops::residues::residue_spans;
use std::collections::HashSet;

pub fn run(args: InfoArgs) -> Result<()> {
    let (structure, _) = load_structure(&args.input)?;
    let residues = residue_spans(&structure).len();
    let chains: HashSet<&str> = structure.chains().iter().map(|c| c.as_str()).collect();

    println!("Atoms:    {}", structure.len());
    println!("Residues: {residues}");
    println!("Chains:   {}", chains.len());
    println!("Frames:   {}", structure.frame_count());
    Ok(())
}
