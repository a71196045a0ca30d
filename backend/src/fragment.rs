use std::{fmt::Display, str::FromStr};

/// The six backbone fragment ion types, a/b/c retain the N terminus, x/y/z the C terminus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum IonType {
    a,
    b,
    c,
    x,
    y,
    z,
}

impl IonType {
    pub const ALL: [Self; 6] = [Self::a, Self::b, Self::c, Self::x, Self::y, Self::z];

    pub fn from_char(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        Self::ALL.into_iter().find(|ion| ion.letter() == c)
    }

    pub const fn letter(self) -> char {
        match self {
            Self::a => 'a',
            Self::b => 'b',
            Self::c => 'c',
            Self::x => 'x',
            Self::y => 'y',
            Self::z => 'z',
        }
    }

    pub const fn is_forward(self) -> bool {
        matches!(self, Self::a | Self::b | Self::c)
    }

    pub const fn is_reverse(self) -> bool {
        !self.is_forward()
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl Display for IonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MassType {
    #[default]
    Monoisotopic,
    Average,
}

impl MassType {
    pub const fn query_value(self) -> &'static str {
        match self {
            Self::Monoisotopic => "monoisotopic",
            Self::Average => "average",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Monoisotopic => "Monoisotopic",
            Self::Average => "Average",
        }
    }
}

impl FromStr for MassType {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monoisotopic" => Ok(Self::Monoisotopic),
            "average" => Ok(Self::Average),
            _ => Err(()),
        }
    }
}

/// An m/z window, values outside of it get highlighted but are never removed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassBounds {
    pub min: f64,
    pub max: f64,
}

impl MassBounds {
    pub fn is_outside(&self, value: f64) -> bool {
        value > self.max || value < self.min
    }
}

/// One theoretical fragment as generated by a [`crate::provider::FragmentProvider`].
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentRecord {
    pub ion_type: IonType,
    /// First residue index (0 based, inclusive)
    pub start: usize,
    /// Last residue index (0 based, exclusive)
    pub end: usize,
    pub charge: usize,
    pub mz: f64,
    pub isotope: i8,
    pub loss: String,
    pub parent_sequence: String,
}

impl FragmentRecord {
    /// The position of this fragment in the table, `end` for forward ions and `start` for reverse ions.
    pub const fn number(&self) -> usize {
        if self.ion_type.is_forward() {
            self.end
        } else {
            self.start
        }
    }

    /// The number of residues covered
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The identity used to collapse duplicate fragments
    pub const fn key(&self) -> (IonType, usize, usize, usize) {
        (self.ion_type, self.start, self.end, self.charge)
    }

    pub fn in_bounds(&self, bounds: Option<MassBounds>) -> bool {
        bounds.is_none_or(|b| !b.is_outside(self.mz))
    }
}

#[cfg(test)]
pub(crate) fn record(ion_type: IonType, start: usize, end: usize, charge: usize, mz: f64) -> FragmentRecord {
    FragmentRecord {
        ion_type,
        start,
        end,
        charge,
        mz,
        isotope: 0,
        loss: String::new(),
        parent_sequence: "PEPTIDE".to_string(),
    }
}
