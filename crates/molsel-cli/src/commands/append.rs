use super::{load_structure, write_structure};
use crate::cli::AppendArgs;
use crate::config::FileConfig;
use crate::error::Result;

pub fn run(args: AppendArgs, config: &FileConfig) -> Result<()> {
    let (mut structure, metadata) = load_structure(&args.input)?;
    let (other, _) = load_structure(&args.other)?;

    let policy = args.collisions.then(|| config.collision_policy());
    let appended = structure.append(&other, policy.as_ref());
    // Appended atoms keep their own serials; renumber for a consistent file.
    structure.renumber_serials(1);

    println!(
        "Appended {appended} of {} atoms ({} total)",
        other.len(),
        structure.len()
    );
    write_structure(&structure, &metadata, None, &args.output)
}
