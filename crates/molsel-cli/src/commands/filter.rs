use super::{load_structure, write_structure};
use crate::cli::FilterArgs;
use crate::config::FileConfig;
use crate::error::Result;
use molsel::select::Selection;

pub fn run(args: FilterArgs, config: &FileConfig) -> Result<()> {
    let (mut structure, metadata) = load_structure(&args.input)?;
    let selection = Selection::parse_with(&args.expr, &config.macro_registry())?;
    let mask = selection.evaluate(&structure);
    let removed = structure.filter(&mask)?;

    println!(
        "Kept {} atoms, removed {} ('{}')",
        structure.len(),
        removed,
        selection.text()
    );
    write_structure(&structure, &metadata, None, &args.output)
}
