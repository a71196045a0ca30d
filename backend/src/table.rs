use std::collections::HashSet;

use itertools::Itertools;

use crate::{
    error::PepFragError,
    fragment::{FragmentRecord, IonType},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Counting up from the N terminus
    ForwardOrdinal,
    Ion(IonType),
    Residue,
    /// Counting down to the C terminus
    ReverseOrdinal,
}

impl ColumnKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::ForwardOrdinal => "#>",
            Self::Ion(IonType::a) => "A",
            Self::Ion(IonType::b) => "B",
            Self::Ion(IonType::c) => "C",
            Self::Ion(IonType::x) => "X",
            Self::Ion(IonType::y) => "Y",
            Self::Ion(IonType::z) => "Z",
            Self::Residue => "Seq",
            Self::ReverseOrdinal => "<#",
        }
    }

    pub const fn ion(self) -> Option<IonType> {
        match self {
            Self::Ion(ion) => Some(ion),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Mz(f64),
    Ordinal(usize),
    Text(String),
}

impl Cell {
    pub const fn mz(&self) -> Option<f64> {
        match self {
            Self::Mz(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableColumn {
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
}

/// The fragments laid out along the peptide, one row per residue.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentTable {
    rows: usize,
    charge: usize,
    columns: Vec<TableColumn>,
}

impl FragmentTable {
    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn charge(&self) -> usize {
        self.charge
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    /// The first forward and first reverse ion column present
    pub fn boundary_columns(&self) -> impl Iterator<Item = (usize, &TableColumn)> {
        let forward = self
            .columns
            .iter()
            .find_position(|c| c.kind.ion().is_some_and(IonType::is_forward));
        let reverse = self
            .columns
            .iter()
            .find_position(|c| c.kind.ion().is_some_and(IonType::is_reverse));
        forward.into_iter().chain(reverse)
    }
}

/// Lay out the fragments in a table. Forward ions of length `n` end up in row `n`, reverse ions
/// starting at residue `i` end up in row `i + 1`, so the reverse ordinal column gives the length
/// of the reverse ion in the same row.
/// # Errors
/// If there are no fragments with the requested charge.
pub fn build(
    fragments: &[FragmentRecord],
    ion_types: &[IonType],
    charge: usize,
    peptide_length: usize,
    residue_symbols: &[String],
) -> Result<FragmentTable, PepFragError> {
    let mut seen = HashSet::new();
    let fragments = fragments
        .iter()
        .filter(|f| f.charge == charge)
        .filter(|f| seen.insert(f.key()))
        .collect_vec();
    if fragments.is_empty() {
        return Err(PepFragError::NoFragments);
    }
    if residue_symbols.len() != peptide_length {
        log::warn!(
            "Got {} residue symbols for a peptide of length {peptide_length}",
            residue_symbols.len()
        );
    }

    let ion_types = ion_types.iter().copied().sorted().dedup().collect_vec();
    let ion_column = |ion: IonType| {
        let mut cells = vec![Cell::Empty; peptide_length];
        for fragment in fragments
            .iter()
            .filter(|f| f.ion_type == ion && !f.is_empty())
            .sorted_by_key(|f| f.number())
        {
            let row = if ion.is_forward() {
                fragment.number().checked_sub(1)
            } else {
                Some(fragment.number())
            };
            match row.and_then(|row| cells.get_mut(row)) {
                Some(cell @ Cell::Empty) => *cell = Cell::Mz(fragment.mz),
                Some(_) => (),
                None => log::debug!("Fragment outside of the peptide: {fragment:?}"),
            }
        }
        TableColumn {
            kind: ColumnKind::Ion(ion),
            cells,
        }
    };

    let forward = ion_types
        .iter()
        .filter(|i| i.is_forward())
        .map(|i| ion_column(*i))
        .collect_vec();
    let reverse = ion_types
        .iter()
        .filter(|i| i.is_reverse())
        .map(|i| ion_column(*i))
        .collect_vec();

    let mut columns = Vec::with_capacity(forward.len() + reverse.len() + 3);
    if !forward.is_empty() {
        columns.push(TableColumn {
            kind: ColumnKind::ForwardOrdinal,
            cells: (1..=peptide_length).map(Cell::Ordinal).collect(),
        });
    }
    let has_reverse = !reverse.is_empty();
    columns.extend(forward);
    columns.push(TableColumn {
        kind: ColumnKind::Residue,
        cells: (0..peptide_length)
            .map(|i| {
                residue_symbols
                    .get(i)
                    .map_or(Cell::Empty, |s| Cell::Text(s.clone()))
            })
            .collect(),
    });
    columns.extend(reverse);
    if has_reverse {
        columns.push(TableColumn {
            kind: ColumnKind::ReverseOrdinal,
            cells: (1..=peptide_length).rev().map(Cell::Ordinal).collect(),
        });
    }

    Ok(FragmentTable {
        rows: peptide_length,
        charge,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::record;

    fn residues(sequence: &str) -> Vec<String> {
        sequence.chars().map(String::from).collect()
    }

    /// All forward and reverse fragments for a peptide, with the m/z being the length of the fragment
    fn ladder(length: usize, ions: &[IonType], charge: usize) -> Vec<FragmentRecord> {
        ions.iter()
            .flat_map(|ion| {
                (1..=length).map(move |n| {
                    if ion.is_forward() {
                        record(*ion, 0, n, charge, n as f64)
                    } else {
                        record(*ion, length - n, length, charge, n as f64)
                    }
                })
            })
            .collect()
    }

    fn column(table: &FragmentTable, kind: ColumnKind) -> &TableColumn {
        table.columns().iter().find(|c| c.kind == kind).unwrap()
    }

    fn values(table: &FragmentTable, kind: ColumnKind) -> Vec<Option<f64>> {
        column(table, kind)
            .cells
            .iter()
            .map(Cell::mz)
            .collect()
    }

    #[test]
    fn row_count() {
        for length in [1, 2, 7, 25] {
            let sequence = "A".repeat(length);
            for ions in [
                &[IonType::a][..],
                &[IonType::z],
                &[IonType::b, IonType::y],
                &IonType::ALL,
            ] {
                let table = build(
                    &ladder(length, ions, 2),
                    ions,
                    2,
                    length,
                    &residues(&sequence),
                )
                .unwrap();
                assert_eq!(table.rows(), length);
                assert!(table.columns().iter().all(|c| c.cells.len() == length));
            }
        }
    }

    #[test]
    fn column_order() {
        let table = build(
            &ladder(7, &IonType::ALL, 1),
            &[IonType::z, IonType::a, IonType::y, IonType::c],
            1,
            7,
            &residues("PEPTIDE"),
        )
        .unwrap();
        assert_eq!(
            table.columns().iter().map(|c| c.kind.name()).join(" "),
            "#> A C Seq Y Z <#"
        );
        let peptide = residues("PEPTIDE");
        let table = build(&ladder(7, &[IonType::y], 1), &[IonType::y], 1, 7, &peptide).unwrap();
        assert_eq!(
            table.columns().iter().map(|c| c.kind.name()).join(" "),
            "Seq Y <#"
        );
        let table = build(&ladder(7, &[IonType::b], 1), &[IonType::b], 1, 7, &peptide).unwrap();
        assert_eq!(
            table.columns().iter().map(|c| c.kind.name()).join(" "),
            "#> B Seq"
        );
    }

    #[test]
    fn reverse_alignment() {
        let n = 7;
        let table = build(
            &ladder(n, &[IonType::b, IonType::y], 1),
            &[IonType::b, IonType::y],
            1,
            n,
            &residues("PEPTIDE"),
        )
        .unwrap();
        let b = values(&table, ColumnKind::Ion(IonType::b));
        let y = values(&table, ColumnKind::Ion(IonType::y));
        let reverse_ordinal = &column(&table, ColumnKind::ReverseOrdinal).cells;
        for i in 1..=n {
            // b at row i and y at row n + 1 - i both cover i residues
            assert_eq!(b[i - 1], Some(i as f64));
            assert_eq!(y[n - i], Some(i as f64));
            // the reverse ordinal gives the length of the y ion in that row
            assert_eq!(reverse_ordinal[i - 1], Cell::Ordinal(n + 1 - i));
            assert_eq!(y[i - 1], Some((n + 1 - i) as f64));
        }
        // complementary pair b_i + y_(n-i) share the bond after residue i
        for i in 1..n {
            assert_eq!(b[i - 1].unwrap() + y[i].unwrap(), n as f64);
        }
    }

    #[test]
    fn peptide_alignment() {
        use crate::{
            fragment::MassType,
            provider::{FragmentProvider, RustymsProvider},
        };

        let provider = RustymsProvider;
        let peptide = provider.parse("PEPTIDE").unwrap();
        let ions = [IonType::b, IonType::y];
        let fragments = provider.fragments(&peptide, &ions, 1, MassType::Monoisotopic);
        let table = build(&fragments, &ions, 1, 7, &provider.residues(&peptide)).unwrap();
        assert_eq!(table.rows(), 7);
        let b = values(&table, ColumnKind::Ion(IonType::b));
        let y = values(&table, ColumnKind::Ion(IonType::y));
        assert!((b[1].unwrap() - 227.103).abs() < 0.01);
        // y1 (E) sits next to the last residue
        assert!((y[6].unwrap() - 147.076).abs() < 0.01);
        assert_eq!(
            column(&table, ColumnKind::Residue).cells[6],
            Cell::Text("E".to_string())
        );
    }

    #[test]
    fn deduplication() {
        let mut fragments = ladder(4, &[IonType::b], 1);
        fragments.insert(1, record(IonType::b, 0, 2, 1, 999.0));
        fragments.push(record(IonType::b, 0, 3, 1, 3.0));
        let table = build(&fragments, &[IonType::b], 1, 4, &residues("PEPT")).unwrap();
        // first seen wins
        assert_eq!(
            values(&table, ColumnKind::Ion(IonType::b)),
            vec![Some(1.0), Some(999.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn other_charges_ignored() {
        let mut fragments = ladder(4, &[IonType::y], 2);
        fragments.extend(ladder(4, &[IonType::y], 1).into_iter().map(|mut f| {
            f.mz = -1.0;
            f
        }));
        let table = build(&fragments, &[IonType::y], 2, 4, &residues("PEPT")).unwrap();
        assert!(
            values(&table, ColumnKind::Ion(IonType::y))
                .iter()
                .all(|v| v.is_some_and(|v| v > 0.0))
        );
    }

    #[test]
    fn ragged_column() {
        let fragments = vec![
            record(IonType::c, 0, 1, 1, 1.0),
            record(IonType::c, 0, 3, 1, 3.0),
        ];
        let table =
            build(&fragments, &[IonType::c, IonType::x], 1, 4, &residues("PEPT")).unwrap();
        assert_eq!(table.rows(), 4);
        assert_eq!(
            values(&table, ColumnKind::Ion(IonType::c)),
            vec![Some(1.0), None, Some(3.0), None]
        );
        assert_eq!(
            values(&table, ColumnKind::Ion(IonType::x)),
            vec![None, None, None, None]
        );
    }

    #[test]
    fn empty_result() {
        assert!(matches!(
            build(&[], &[IonType::a], 5, 7, &residues("PEPTIDE")),
            Err(PepFragError::NoFragments)
        ));
        let fragments = ladder(7, &[IonType::a], 1);
        assert!(matches!(
            build(&fragments, &[IonType::a], 5, 7, &residues("PEPTIDE")),
            Err(PepFragError::NoFragments)
        ));
    }

    #[test]
    fn boundary_columns() {
        let table = build(
            &ladder(7, &IonType::ALL, 1),
            &[IonType::b, IonType::c, IonType::x, IonType::y],
            1,
            7,
            &residues("PEPTIDE"),
        )
        .unwrap();
        assert_eq!(
            table
                .boundary_columns()
                .map(|(i, c)| (i, c.kind.name()))
                .collect_vec(),
            vec![(1, "B"), (4, "X")]
        );
    }
}
