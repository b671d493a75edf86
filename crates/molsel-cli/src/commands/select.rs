use super::load_structure;
use crate::cli::SelectArgs;
use crate::config::FileConfig;
use crate::error::{CliError, Result};
use molsel::core::models::fields::{AtomField, FieldValues};
use molsel::select::Selection;
use std::str::FromStr;

pub fn run(args: SelectArgs, config: &FileConfig) -> Result<()> {
    let (structure, _) = load_structure(&args.input)?;
    let selection = Selection::parse_with(&args.expr, &config.macro_registry())?;
    let mask = selection.evaluate(&structure);

    println!("{} atoms match '{}'", mask.count(), selection.text());

    if let Some(field) = &args.print {
        let field =
            AtomField::from_str(field).map_err(|e| CliError::Argument(e.to_string()))?;
        let values = structure.get(field, Some(&mask))?;
        print_values(&values);
    }
    Ok(())
}

fn print_values(values: &FieldValues) {
    match values {
        FieldValues::Ints(v) => v.iter().for_each(|x| println!("{x}")),
        FieldValues::Strs(v) => v.iter().for_each(|x| println!("{x}")),
        FieldValues::Records(v) => v.iter().for_each(|x| println!("{x}")),
        FieldValues::Coords(v) => v
            .iter()
            .for_each(|p| println!("{:.3} {:.3} {:.3}", p.x, p.y, p.z)),
    }
}
