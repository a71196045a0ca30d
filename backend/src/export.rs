use std::io::Write;

use rustyms::identification::csv::write_csv;

use crate::{
    error::PepFragError,
    fragment::{FragmentRecord, MassBounds},
    proforma,
};

const COLUMNS: [&str; 10] = [
    "ion_type",
    "start",
    "end",
    "charge",
    "mz",
    "isotope",
    "loss",
    "parent_sequence",
    "number",
    "in_bounds",
];

/// The default name for the exported data of this peptide
pub fn file_name(sequence: &str) -> String {
    format!("{}_fragment_data.csv", proforma::stripped_sequence(sequence))
}

fn row(fragment: &FragmentRecord, bounds: Option<MassBounds>) -> Vec<(String, String)> {
    let values = [
        fragment.ion_type.to_string(),
        fragment.start.to_string(),
        fragment.end.to_string(),
        fragment.charge.to_string(),
        fragment.mz.to_string(),
        fragment.isotope.to_string(),
        fragment.loss.clone(),
        fragment.parent_sequence.clone(),
        fragment.number().to_string(),
        fragment.in_bounds(bounds).to_string(),
    ];
    COLUMNS
        .iter()
        .map(ToString::to_string)
        .zip(values)
        .collect()
}

/// Write every fragment as is, so including fragments hidden or highlighted in the table.
///
/// Values containing a comma are quoted. Double quotes inside such a value are written as
/// single quotes and line breaks are written as is, so a sequence with free text
/// (`[INFO:"a, b"]`) does not survive the export byte for byte.
/// # Errors
/// If the writer fails.
pub fn write_fragments(
    mut writer: impl Write,
    fragments: &[FragmentRecord],
    bounds: Option<MassBounds>,
) -> Result<(), PepFragError> {
    if fragments.is_empty() {
        writeln!(writer, "{}", COLUMNS.join(","))?;
        return Ok(());
    }
    write_csv(
        writer,
        fragments.iter().map(|fragment| row(fragment, bounds)),
        ',',
    )?;
    Ok(())
}
