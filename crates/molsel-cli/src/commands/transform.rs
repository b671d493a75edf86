use super::{load_structure, write_structure};
use crate::cli::TransformArgs;
use crate::error::{CliError, Result};
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

pub fn run(args: TransformArgs) -> Result<()> {
    if args.translate.is_none() && args.rotate.is_none() {
        return Err(CliError::Argument(
            "nothing to do: pass --translate and/or --rotate".to_string(),
        ));
    }

    let (mut structure, metadata) = load_structure(&args.input)?;

    if let Some(spec) = &args.translate {
        let offset = parse_vec3(spec)?;
        structure.move_by(&offset);
    }
    if let Some(spec) = &args.rotate {
        let matrix = parse_rotation(spec)?;
        let center = args
            .center
            .as_deref()
            .map(|c| parse_vec3(c).map(Point3::from))
            .transpose()?;
        structure.rotate_by(&matrix, center.as_ref());
    }

    write_structure(&structure, &metadata, None, &args.output)
}

fn parse_vec3(spec: &str) -> Result<Vector3<f64>> {
    let parts: Vec<&str> = spec.split(',').collect();
    if parts.len() != 3 {
        return Err(CliError::Argument(format!(
            "expected 'x,y,z', got '{spec}'"
        )));
    }
    let mut components = [0.0; 3];
    for (i, part) in parts.iter().enumerate() {
        components[i] = part.trim().parse().map_err(|_| {
            CliError::Argument(format!("invalid number '{}' in '{spec}'", part.trim()))
        })?;
    }
    Ok(Vector3::new(components[0], components[1], components[2]))
}

fn parse_rotation(spec: &str) -> Result<Matrix3<f64>> {
    let (axis, degrees) = spec.split_once('=').ok_or_else(|| {
        CliError::Argument(format!("expected 'axis=degrees', got '{spec}'"))
    })?;
    let degrees: f64 = degrees.trim().parse().map_err(|_| {
        CliError::Argument(format!("invalid angle '{}' in '{spec}'", degrees.trim()))
    })?;
    let axis = match axis.trim().to_ascii_lowercase().as_str() {
        "x" => Vector3::x_axis(),
        "y" => Vector3::y_axis(),
        "z" => Vector3::z_axis(),
        other => {
            return Err(CliError::Argument(format!(
                "unknown rotation axis '{other}', expected x, y, or z"
            )));
        }
    };
    Ok(Rotation3::from_axis_angle(&axis, degrees.to_radians()).into_inner())
}
