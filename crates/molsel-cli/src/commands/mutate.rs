use super::{load_structure, write_structure};
use crate::cli::MutateArgs;
use crate::config::FileConfig;
use crate::error::Result;
use molsel::ops::residues::mutate_residue;
use molsel::select::Selection;

pub fn run(args: MutateArgs, config: &FileConfig) -> Result<()> {
    let (mut structure, metadata) = load_structure(&args.input)?;
    let selection = Selection::parse_with(&args.expr, &config.macro_registry())?;
    let changed = mutate_residue(&mut structure, &selection, &args.to)?;

    println!("Renamed {changed} residue(s) to {}", args.to);
    write_structure(&structure, &metadata, None, &args.output)
}
