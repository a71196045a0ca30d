use std::{cmp::Reverse, collections::HashSet};

use ordered_float::OrderedFloat;

use crate::{
    fragment::{IonType, MassBounds},
    table::{Cell, ColumnKind, FragmentTable},
};

pub const TABLE_ID: &str = "fragment-table";
pub const BOUNDS_HIGHLIGHT: &str = "background-color: #ffcccc;";
pub const SUPPRESSED: &str = "color: transparent; background-color: transparent;";

/// The colour for each ion type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorMap([String; 6]);

impl Default for ColorMap {
    fn default() -> Self {
        Self(
            ["#8B4513", "#1f77b4", "#2ca02c", "#ff7f0e", "#d62728", "#9467bd"]
                .map(ToString::to_string),
        )
    }
}

impl ColorMap {
    pub fn get(&self, ion: IonType) -> &str {
        &self.0[ion.index()]
    }

    pub fn set(&mut self, ion: IonType, color: impl Into<String>) {
        self.0[ion.index()] = color.into();
    }

    /// Look up a colour by its ion letter, in any case
    pub fn get_by_key(&self, key: &str) -> Option<&str> {
        let mut chars = key.chars();
        match (chars.next().and_then(IonType::from_char), chars.next()) {
            (Some(ion), None) => Some(self.get(ion)),
            _ => None,
        }
    }
}

/// Everything that determines how a table looks
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSpec {
    pub colors: ColorMap,
    pub borders: bool,
    pub row_padding: u32,
    pub column_padding: u32,
    pub precision: usize,
    pub bounds: Option<MassBounds>,
    /// Prerendered html placed above the grid
    pub caption: Option<String>,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            colors: ColorMap::default(),
            borders: true,
            row_padding: 4,
            column_padding: 10,
            precision: 4,
            bounds: None,
            caption: None,
        }
    }
}

impl StyleSpec {
    pub const fn border(&self) -> &'static str {
        if self.borders { "1px solid #999" } else { "none" }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledHeader {
    pub name: &'static str,
    /// Set for ion columns
    pub charge: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyledCell {
    pub text: String,
    pub declarations: Vec<String>,
}

impl StyledCell {
    pub fn style(&self) -> String {
        self.declarations.join(" ")
    }
}

/// A fragment table with all formatting applied, ready to be turned into html
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledTable {
    pub headers: Vec<StyledHeader>,
    /// Row major
    pub rows: Vec<Vec<StyledCell>>,
    pub css: String,
    pub caption: Option<String>,
}

/// The cells to hide, the highest value in the first forward and first reverse ion column.
/// When the highest value occurs multiple times only the first one is hidden.
pub fn suppressed_cells(table: &FragmentTable) -> HashSet<(usize, usize)> {
    table
        .boundary_columns()
        .filter_map(|(column_index, column)| {
            column
                .cells
                .iter()
                .enumerate()
                .filter_map(|(row, cell)| cell.mz().map(|value| (row, value)))
                .min_by_key(|(row, value)| (Reverse(OrderedFloat(*value)), *row))
                .map(|(row, _)| (row, column_index))
        })
        .collect()
}

/// The stylesheet for the whole table, scoped to the table id.
pub fn css(spec: &StyleSpec) -> String {
    let border = spec.border();
    let (row, column) = (spec.row_padding, spec.column_padding);
    format!(
        "#{TABLE_ID} {{ border-collapse: collapse; border-spacing: 0; border: {border}; }}\n\
         #{TABLE_ID} th, #{TABLE_ID} td {{ text-align: center; padding: {row}px {column}px; line-height: 1; border: {border}; }}\n\
         #{TABLE_ID} tr {{ border: {border}; }}\n\
         #{TABLE_ID} th {{ border-bottom: 1px solid; font-weight: bold; }}"
    )
}

fn cell_text(cell: &Cell, precision: usize) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Mz(value) => format!("{value:.precision$}"),
        Cell::Ordinal(n) => n.to_string(),
        Cell::Text(text) => text.clone(),
    }
}

/// Apply all formatting rules to the table. The colour rule goes first, then the bounds
/// highlight, and the suppression goes last so it overrides both.
pub fn style(table: &FragmentTable, spec: &StyleSpec) -> StyledTable {
    let suppressed = suppressed_cells(table);
    let headers = table
        .columns()
        .iter()
        .map(|column| StyledHeader {
            name: column.kind.name(),
            charge: column.kind.ion().map(|_| table.charge()),
        })
        .collect();

    let rows = (0..table.rows())
        .map(|row| {
            table
                .columns()
                .iter()
                .enumerate()
                .map(|(column_index, column)| {
                    let cell = &column.cells[row];
                    let mut declarations = Vec::new();
                    if let (ColumnKind::Ion(ion), false) =
                        (column.kind, matches!(cell, Cell::Empty))
                    {
                        declarations.push(format!(
                            "color: {}; font-weight: bold;",
                            spec.colors.get(ion)
                        ));
                    }
                    if let (Some(bounds), Some(value)) = (spec.bounds, cell.mz()) {
                        if bounds.is_outside(value) {
                            declarations.push(BOUNDS_HIGHLIGHT.to_string());
                        }
                    }
                    if suppressed.contains(&(row, column_index)) {
                        declarations.push(SUPPRESSED.to_string());
                    }
                    StyledCell {
                        text: cell_text(cell, spec.precision),
                        declarations,
                    }
                })
                .collect()
        })
        .collect();

    StyledTable {
        headers,
        rows,
        css: css(spec),
        caption: spec.caption.clone(),
    }
}
