use crate::core::io::traits::StructureFile;
use crate::core::models::builder::{AtomRow, StructureBuilder};
use crate::core::models::fields::RecordKind;
use crate::core::models::mask::Mask;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

/// Non-coordinate lines (HEADER, TITLE, REMARK, ...) preserved verbatim so a
/// read/write round trip keeps them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    pub header_lines: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for an ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.to_string(),
        },
    })
}

fn parse_int(line: &str, line_num: usize, start: usize, end: usize) -> Result<i64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: format!("{}-{}", start + 1, end),
            value: value.to_string(),
        },
    })
}

/// Derives an element symbol from an atom name when columns 77-78 are blank:
/// the first alphabetic character, so "CA" gives "C" and "1HB" gives "H".
fn guess_element(name: &str) -> String {
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

fn format_atom_name(name: &str) -> String {
    // PDB convention: names shorter than four characters start in column 14.
    if name.len() >= 4 {
        name[..4].to_string()
    } else {
        format!(" {name:<3}")
    }
}

/// Fixed-column PDB reader/writer covering the `ATOM`/`HETATM`/`MODEL`/
/// `ENDMDL`/`TER`/`END` subset. Multiple `MODEL` blocks become coordinate
/// frames of one structure; every model must carry the same atom count.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Structure, Self::Metadata), Self::Error> {
        let mut builder = StructureBuilder::new();
        let mut metadata = PdbMetadata::default();
        let mut first_model_closed = false;
        let mut extra_frame: Option<Vec<Point3<f64>>> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let record_type = slice_and_trim(&line, 0, 6);

            match record_type {
                "ATOM" | "HETATM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }
                    let x = parse_float(&line, line_num, 30, 38)?;
                    let y = parse_float(&line, line_num, 38, 46)?;
                    let z = parse_float(&line, line_num, 46, 54)?;
                    let position = Point3::new(x, y, z);

                    if first_model_closed {
                        // Coordinate-only reparse for later models.
                        extra_frame
                            .as_mut()
                            .ok_or_else(|| {
                                PdbError::Inconsistency(format!(
                                    "atom record outside MODEL block on line {line_num}"
                                ))
                            })?
                            .push(position);
                        continue;
                    }

                    let name = slice_and_trim(&line, 12, 16);
                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".to_string(),
                            },
                        });
                    }
                    let serial = parse_int(&line, line_num, 6, 11)?;
                    let resname = slice_and_trim(&line, 17, 21).to_string();
                    let chain = slice_and_trim(&line, 21, 22).to_string();
                    let resid = parse_int(&line, line_num, 22, 26)?;
                    let insertion = slice_and_trim(&line, 26, 27).to_string();
                    let segid = slice_and_trim(&line, 72, 76).to_string();
                    let element = {
                        let parsed = slice_and_trim(&line, 76, 78);
                        if parsed.is_empty() {
                            guess_element(name)
                        } else {
                            parsed.to_string()
                        }
                    };
                    // Unwrap is safe: only ATOM/HETATM reach this arm.
                    let record = RecordKind::from_str(record_type).unwrap();

                    builder.push_atom(AtomRow {
                        serial,
                        name: name.to_string(),
                        resname,
                        resid,
                        chain,
                        segid,
                        insertion,
                        record,
                        element,
                        position,
                    });
                }
                "MODEL" => {
                    if first_model_closed {
                        if extra_frame.is_some() {
                            return Err(PdbError::Inconsistency(format!(
                                "MODEL on line {line_num} opened before previous ENDMDL"
                            )));
                        }
                        extra_frame = Some(Vec::with_capacity(builder.len()));
                    }
                    // The first MODEL simply labels the default frame.
                }
                "ENDMDL" => {
                    if let Some(coords) = extra_frame.take() {
                        add_model_frame(&mut builder, coords, line_num)?;
                    } else {
                        first_model_closed = true;
                    }
                }
                "TER" => {}
                "END" => break,
                _ => {
                    if !line.trim().is_empty() {
                        metadata.header_lines.push(line);
                    }
                }
            }
        }

        // Tolerate a final model without ENDMDL.
        if let Some(coords) = extra_frame.take() {
            add_model_frame(&mut builder, coords, 0)?;
        }

        Ok((builder.build(), metadata))
    }

    fn write_to(
        structure: &Structure,
        metadata: &Self::Metadata,
        mask: Option<&Mask>,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for line in &metadata.header_lines {
            writeln!(writer, "{line}")?;
        }
        Self::write_structure_to(structure, mask, writer)
    }

    fn write_structure_to(
        structure: &Structure,
        mask: Option<&Mask>,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        if let Some(mask) = mask {
            if mask.len() != structure.len() {
                return Err(PdbError::Inconsistency(format!(
                    "selection mask length {} does not match atom count {}",
                    mask.len(),
                    structure.len()
                )));
            }
        }
        let indices: Vec<usize> = match mask {
            Some(mask) => mask.indices().collect(),
            None => (0..structure.len()).collect(),
        };

        let multi_model = structure.frame_count() > 1;
        for frame_idx in 0..structure.frame_count().max(1) {
            if multi_model {
                writeln!(writer, "MODEL     {:>4}", frame_idx + 1)?;
            }
            if let Some(frame) = structure.frame(frame_idx) {
                for &i in &indices {
                    write_atom_line(structure, frame.coords(), i, writer)?;
                }
            }
            if multi_model {
                writeln!(writer, "ENDMDL")?;
            }
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}

fn add_model_frame(
    builder: &mut StructureBuilder,
    coords: Vec<Point3<f64>>,
    line_num: usize,
) -> Result<(), PdbError> {
    let expected = builder.len();
    let actual = coords.len();
    builder.add_frame(coords).map_err(|_| {
        if line_num > 0 {
            PdbError::Inconsistency(format!(
                "MODEL ending on line {line_num} has {actual} atoms, expected {expected}"
            ))
        } else {
            PdbError::Inconsistency(format!(
                "trailing MODEL has {actual} atoms, expected {expected}"
            ))
        }
    })?;
    Ok(())
}

fn write_atom_line(
    structure: &Structure,
    coords: &[Point3<f64>],
    i: usize,
    writer: &mut impl Write,
) -> Result<(), PdbError> {
    let p = coords[i];
    let chain = structure.chains()[i].chars().next().unwrap_or(' ');
    let insertion = structure.insertions()[i].chars().next().unwrap_or(' ');
    let resname = &structure.resnames()[i];
    let resname = if resname.len() > 4 { &resname[..4] } else { resname };
    let segid = &structure.segids()[i];
    let segid = if segid.len() > 4 { &segid[..4] } else { segid };
    let element = &structure.elements()[i];
    let element = if element.len() > 2 { &element[..2] } else { element };
    writeln!(
        writer,
        "{:<6}{:>5} {:<4} {:<4}{}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}      {:<4}{:>2}",
        structure.records()[i].as_str(),
        structure.serials()[i],
        format_atom_name(&structure.names()[i]),
        resname,
        chain,
        structure.resids()[i],
        insertion,
        p.x,
        p.y,
        p.z,
        1.00,
        0.00,
        segid,
        element,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::select;
    use std::io::BufReader;

    const TWO_RESIDUE_PDB: &str = "\
HEADER    TEST STRUCTURE
REMARK    A hand-written fixture
ATOM      1  N   GLY A   1       0.000   0.000   0.000  1.00  0.00      P1   N
ATOM      2  CA  GLY A   1       1.400   0.000   0.000  1.00  0.00      P1   C
ATOM      3  C   GLY A   1       2.100   1.100   0.000  1.00  0.00      P1   C
ATOM      4  N   HIS A   2       3.300   1.300   0.000  1.00  0.00      P1   N
TER
HETATM    5  O   HOH W 101      20.000   0.000   0.000  1.00  0.00      W1   O
END
";

    fn read_str(content: &str) -> Result<(Structure, PdbMetadata), PdbError> {
        let mut reader = BufReader::new(content.as_bytes());
        PdbFile::read_from(&mut reader)
    }

    #[test]
    fn reads_atoms_with_all_columns() {
        let (s, metadata) = read_str(TWO_RESIDUE_PDB).unwrap();
        assert_eq!(s.len(), 5);
        assert_eq!(s.frame_count(), 1);
        assert_eq!(s.serials(), &[1, 2, 3, 4, 5]);
        assert_eq!(s.names()[1], "CA");
        assert_eq!(s.resnames()[3], "HIS");
        assert_eq!(s.chains()[4], "W");
        assert_eq!(s.resids()[4], 101);
        assert_eq!(s.segids()[0], "P1");
        assert_eq!(s.records()[4], RecordKind::Hetatm);
        assert_eq!(s.elements()[4], "O");
        assert!((s.coords()[1].x - 1.4).abs() < 1e-9);
        assert_eq!(metadata.header_lines.len(), 2);
    }

    #[test]
    fn element_falls_back_to_atom_name() {
        let line = "ATOM      1 1HB  ALA A   1       0.000   0.000   0.000";
        let (s, _) = read_str(&format!("{line}\nEND\n")).unwrap();
        assert_eq!(s.elements()[0], "H");
    }

    #[test]
    fn short_atom_line_is_rejected_with_line_number() {
        let err = read_str("ATOM      1  N   GLY A   1     0.0\n").unwrap_err();
        match err {
            PdbError::Parse { line, kind } => {
                assert_eq!(line, 1);
                assert!(matches!(kind, PdbParseErrorKind::LineTooShort));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn bad_coordinate_is_a_float_parse_error() {
        let content = "ATOM      1  N   GLY A   1       a.bcd   0.000   0.000\n";
        let err = read_str(content).unwrap_err();
        match err {
            PdbError::Parse { line: 1, kind } => match kind {
                PdbParseErrorKind::InvalidFloat { columns, value } => {
                    assert_eq!(columns, "31-38");
                    assert_eq!(value, "a.bcd");
                }
                other => panic!("unexpected kind {other:?}"),
            },
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn models_become_frames() {
        let content = "\
MODEL        1
ATOM      1  CA  ALA A   1       0.000   0.000   0.000
ATOM      2  CB  ALA A   1       1.000   0.000   0.000
ENDMDL
MODEL        2
ATOM      1  CA  ALA A   1       0.000   1.000   0.000
ATOM      2  CB  ALA A   1       1.000   1.000   0.000
ENDMDL
END
";
        let (s, _) = read_str(content).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.frame_count(), 2);
        assert_eq!(s.frame(1).unwrap().coords()[0].y, 1.0);
    }

    #[test]
    fn model_atom_count_mismatch_is_inconsistency() {
        let content = "\
MODEL        1
ATOM      1  CA  ALA A   1       0.000   0.000   0.000
ENDMDL
MODEL        2
ATOM      1  CA  ALA A   1       0.000   1.000   0.000
ATOM      2  CB  ALA A   1       1.000   1.000   0.000
ENDMDL
";
        let err = read_str(content).unwrap_err();
        assert!(matches!(err, PdbError::Inconsistency(_)));
    }

    #[test]
    fn write_read_round_trip_preserves_columns_and_coordinates() {
        let (original, _) = read_str(TWO_RESIDUE_PDB).unwrap();
        let mut buffer = Vec::new();
        PdbFile::write_structure_to(&original, None, &mut buffer).unwrap();
        let (reread, _) = read_str(std::str::from_utf8(&buffer).unwrap()).unwrap();

        assert_eq!(reread.len(), original.len());
        assert_eq!(reread.serials(), original.serials());
        assert_eq!(reread.names(), original.names());
        assert_eq!(reread.resnames(), original.resnames());
        assert_eq!(reread.resids(), original.resids());
        assert_eq!(reread.chains(), original.chains());
        assert_eq!(reread.segids(), original.segids());
        assert_eq!(reread.records(), original.records());
        for (a, b) in reread.coords().iter().zip(original.coords()) {
            assert!((a - b).norm() < 1e-3);
        }
    }

    #[test]
    fn writer_respects_selection_mask() {
        let (s, _) = read_str(TWO_RESIDUE_PDB).unwrap();
        let mask = select(&s, "resname GLY").unwrap();
        let mut buffer = Vec::new();
        PdbFile::write_structure_to(&s, Some(&mask), &mut buffer).unwrap();
        let (reread, _) = read_str(std::str::from_utf8(&buffer).unwrap()).unwrap();
        assert_eq!(reread.len(), 3);
        assert!(reread.resnames().iter().all(|r| r == "GLY"));
    }

    #[test]
    fn writer_rejects_foreign_mask() {
        let (s, _) = read_str(TWO_RESIDUE_PDB).unwrap();
        let mask = Mask::all(2);
        let mut buffer = Vec::new();
        let err = PdbFile::write_structure_to(&s, Some(&mask), &mut buffer).unwrap_err();
        assert!(matches!(err, PdbError::Inconsistency(_)));
    }

    #[test]
    fn multi_frame_structures_are_written_as_models() {
        let content = "\
MODEL        1
ATOM      1  CA  ALA A   1       0.000   0.000   0.000
ENDMDL
MODEL        2
ATOM      1  CA  ALA A   1       0.000   1.000   0.000
ENDMDL
";
        let (s, _) = read_str(content).unwrap();
        let mut buffer = Vec::new();
        PdbFile::write_structure_to(&s, None, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text.lines().filter(|l| l.starts_with("MODEL")).count(),
            2
        );
        assert_eq!(text.matches("ENDMDL").count(), 2);
        let (reread, _) = read_str(&text).unwrap();
        assert_eq!(reread.frame_count(), 2);
    }

    #[test]
    fn path_helpers_round_trip_through_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdb");
        let (s, metadata) = read_str(TWO_RESIDUE_PDB).unwrap();
        PdbFile::write_to_path(&s, &metadata, None, &path).unwrap();
        let (reread, remeta) = PdbFile::read_from_path(&path).unwrap();
        assert_eq!(reread.len(), s.len());
        assert_eq!(remeta.header_lines, metadata.header_lines);
    }
}
