use itertools::Itertools;
use rustyms::{
    annotation::model::{ChargeRange, FragmentationModel, Location, PrimaryIonSeries},
    chemistry::MassMode,
    fragment::{Fragment, FragmentKind},
    sequence::{CompoundPeptidoformIon, IsAminoAcid, Linked, Modification, Peptidoform},
    system::{e, isize::Charge},
};

use crate::{
    fragment::{FragmentRecord, IonType, MassType},
    proforma,
};

/// The mass of a proton, used to get the precursor m/z from the neutral mass.
pub const PROTON_MASS: f64 = 1.007_276_466_621;

/// The properties of a parsed peptide that determine if it is accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeptideFacts {
    pub length: usize,
    pub has_charge: bool,
    pub has_adducts: bool,
    pub ambiguous: bool,
}

/// The chemistry that is needed to build a fragment table.
pub trait FragmentProvider {
    type Peptide;

    /// Parse a ProForma sequence.
    /// # Errors
    /// If the sequence is not valid, the error is the human readable reason.
    fn parse(&self, sequence: &str) -> Result<Self::Peptide, String>;

    fn facts(&self, peptide: &Self::Peptide) -> PeptideFacts;

    /// The plain residues, one per position.
    fn residues(&self, peptide: &Self::Peptide) -> Vec<String>;

    /// # Errors
    /// If no mass can be determined for this peptide.
    fn neutral_mass(&self, peptide: &Self::Peptide, mass_type: MassType) -> Result<f64, String>;

    /// The sequence with every modification written as its mass delta, rounded to `precision`
    /// decimals.
    /// # Errors
    /// If a modification has no single mass, for example a cross-link.
    fn condensed(
        &self,
        peptide: &Self::Peptide,
        mass_type: MassType,
        precision: usize,
    ) -> Result<String, String>;

    /// All fragments of the given types at exactly the given charge. At charge zero these are
    /// the neutral fragments.
    fn fragments(
        &self,
        peptide: &Self::Peptide,
        ion_types: &[IonType],
        charge: usize,
        mass_type: MassType,
    ) -> Vec<FragmentRecord>;
}

/// The m/z of the full peptide, at charge zero this is the neutral mass.
pub fn precursor_mz(neutral_mass: f64, charge: usize) -> f64 {
    if charge == 0 {
        neutral_mass
    } else {
        (charge as f64).mul_add(PROTON_MASS, neutral_mass) / charge as f64
    }
}

/// Chemistry as provided by rustyms.
#[derive(Clone, Copy, Debug, Default)]
pub struct RustymsProvider;

#[derive(Clone, Debug)]
pub struct ParsedPeptide {
    text: String,
    compound: CompoundPeptidoformIon,
    peptidoform: Peptidoform<Linked>,
}

const fn mass_mode(mass_type: MassType) -> MassMode {
    match mass_type {
        MassType::Monoisotopic => MassMode::Monoisotopic,
        MassType::Average => MassMode::Average,
    }
}

/// Only the selected primary series, every position (including the full peptide), only the precursor charge.
fn fragmentation_model(ion_types: &[IonType]) -> FragmentationModel {
    let series = |ion: IonType| {
        if ion_types.contains(&ion) {
            PrimaryIonSeries::default()
                .location(Location::SkipN(0))
                .charge_range(ChargeRange::PRECURSOR)
        } else {
            PrimaryIonSeries::none()
        }
    };
    FragmentationModel::none()
        .clone()
        .a(series(IonType::a))
        .b(series(IonType::b))
        .c(series(IonType::c))
        .x(series(IonType::x))
        .y(series(IonType::y))
        .z(series(IonType::z))
}

fn mass_delta(
    modification: &Modification,
    mode: MassMode,
    precision: usize,
) -> Result<String, String> {
    if let Modification::CrossLink { .. } = modification {
        return Err("a cross-link cannot be written as a mass".to_string());
    }
    Ok(format!("{:+.precision$}", modification.formula().mass(mode).value))
}

fn to_record(
    fragment: &Fragment,
    length: usize,
    mass_mode: MassMode,
    parent: &str,
) -> Option<FragmentRecord> {
    let ion_type = match fragment.ion.kind() {
        FragmentKind::a => IonType::a,
        FragmentKind::b => IonType::b,
        FragmentKind::c => IonType::c,
        FragmentKind::x => IonType::x,
        FragmentKind::y => IonType::y,
        FragmentKind::z => IonType::z,
        _ => return None,
    };
    let position = fragment.ion.position()?;
    let (start, end) = if ion_type.is_forward() {
        (0, position.series_number)
    } else {
        (length.saturating_sub(position.series_number), length)
    };
    Some(FragmentRecord {
        ion_type,
        start,
        end,
        charge: fragment.charge.value.try_into().unwrap_or_default(),
        mz: fragment.mz(mass_mode)?.value,
        isotope: 0,
        loss: fragment
            .neutral_loss
            .iter()
            .map(|loss| loss.hill_notation())
            .join(","),
        parent_sequence: parent.to_string(),
    })
}

impl FragmentProvider for RustymsProvider {
    type Peptide = ParsedPeptide;

    fn parse(&self, sequence: &str) -> Result<Self::Peptide, String> {
        let compound =
            CompoundPeptidoformIon::pro_forma(sequence, None).map_err(|err| err.to_string())?;
        let peptidoform = compound
            .singular_peptidoform_ref()
            .cloned()
            .ok_or_else(|| "only a single peptidoform is supported".to_string())?;
        Ok(ParsedPeptide {
            text: sequence.to_string(),
            compound,
            peptidoform,
        })
    }

    fn facts(&self, peptide: &Self::Peptide) -> PeptideFacts {
        let peptidoform = &peptide.peptidoform;
        PeptideFacts {
            length: peptidoform.len(),
            has_charge: peptidoform.get_charge_carriers().is_some()
                || proforma::split_charge(&peptide.text).1.is_some(),
            has_adducts: proforma::has_adducts(&peptide.text),
            ambiguous: !peptidoform.get_ambiguous_modifications().is_empty()
                || peptidoform
                    .sequence()
                    .iter()
                    .any(|element| element.ambiguous.is_some() || !element.aminoacid.is_unambiguous()),
        }
    }

    fn residues(&self, peptide: &Self::Peptide) -> Vec<String> {
        peptide
            .peptidoform
            .sequence()
            .iter()
            .map(|element| element.aminoacid.to_string())
            .collect()
    }

    fn neutral_mass(&self, peptide: &Self::Peptide, mass_type: MassType) -> Result<f64, String> {
        let linear = peptide
            .peptidoform
            .clone()
            .into_linear()
            .ok_or_else(|| "cross-linked peptides are not supported".to_string())?;
        linear
            .formulas()
            .iter()
            .next()
            .map(|formula| formula.mass(mass_mode(mass_type)).value)
            .filter(|mass| mass.is_finite())
            .ok_or_else(|| "no molecular formula could be determined".to_string())
    }

    fn condensed(
        &self,
        peptide: &Self::Peptide,
        mass_type: MassType,
        precision: usize,
    ) -> Result<String, String> {
        let peptidoform = peptide
            .peptidoform
            .clone()
            .into_linear()
            .ok_or_else(|| "a cross-link cannot be written as a mass".to_string())?;
        if !peptidoform.get_global().is_empty() {
            return Err("global isotope modifications have no single mass".to_string());
        }
        let mode = mass_mode(mass_type);
        let deltas = |modifications: &[Modification]| {
            modifications
                .iter()
                .map(|m| mass_delta(m, mode, precision).map(|delta| format!("[{delta}]")))
                .collect::<Result<String, String>>()
        };
        let labile = peptidoform
            .get_labile()
            .iter()
            .map(|m| {
                mass_delta(&Modification::Simple(m.clone()), mode, precision)
                    .map(|delta| format!("{{{delta}}}"))
            })
            .collect::<Result<String, String>>()?;
        let n_term = deltas(peptidoform.get_n_term())?;
        let c_term = deltas(peptidoform.get_c_term())?;
        let residues = peptidoform
            .sequence()
            .iter()
            .map(|element| {
                deltas(&element.modifications[..]).map(|mods| format!("{}{mods}", element.aminoacid))
            })
            .collect::<Result<String, String>>()?;
        Ok(format!(
            "{labile}{}{residues}{}",
            if n_term.is_empty() {
                String::new()
            } else {
                format!("{n_term}-")
            },
            if c_term.is_empty() {
                String::new()
            } else {
                format!("-{c_term}")
            }
        ))
    }

    fn fragments(
        &self,
        peptide: &Self::Peptide,
        ion_types: &[IonType],
        charge: usize,
        mass_type: MassType,
    ) -> Vec<FragmentRecord> {
        if ion_types.is_empty() {
            return Vec::new();
        }
        // A charge range always starts at one, neutral fragments are the singly charged ones
        // without the proton
        let generated_charge = charge.max(1);
        let model = fragmentation_model(ion_types);
        let length = peptide.peptidoform.len();
        let mode = mass_mode(mass_type);
        let fragments = peptide
            .compound
            .generate_theoretical_fragments(Charge::new::<e>(generated_charge as isize), &model);
        log::debug!(
            "rustyms generated {} fragments for {}",
            fragments.len(),
            peptide.text
        );
        fragments
            .iter()
            .filter_map(|fragment| to_record(fragment, length, mode, &peptide.text))
            .map(|mut record| {
                if charge == 0 && record.charge == 1 {
                    record.charge = 0;
                    record.mz -= PROTON_MASS;
                }
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn peptide_facts() {
        let provider = RustymsProvider;
        let peptide = provider.parse("PEPTIDE").unwrap();
        assert_eq!(
            provider.facts(&peptide),
            PeptideFacts {
                length: 7,
                has_charge: false,
                has_adducts: false,
                ambiguous: false,
            }
        );
        assert_eq!(provider.residues(&peptide).join(""), "PEPTIDE");
        let charged = provider.parse("PEPTIDE/2").unwrap();
        assert!(provider.facts(&charged).has_charge);
        let ambiguous = provider.parse("PEPTBDE").unwrap();
        assert!(provider.facts(&ambiguous).ambiguous);
        assert!(provider.parse("PEP[").is_err());
    }

    #[test]
    fn peptide_mass() {
        let provider = RustymsProvider;
        let peptide = provider.parse("PEPTIDE").unwrap();
        let mass = provider
            .neutral_mass(&peptide, MassType::Monoisotopic)
            .unwrap();
        assert!(close(mass, 799.360), "{mass}");
        assert!(close(precursor_mz(mass, 2), 400.687));
        assert!(close(precursor_mz(mass, 0), mass));
    }

    #[test]
    fn peptide_fragments() {
        let provider = RustymsProvider;
        let peptide = provider.parse("PEPTIDE").unwrap();
        let fragments =
            provider.fragments(&peptide, &[IonType::b, IonType::y], 1, MassType::Monoisotopic);
        let b2 = fragments
            .iter()
            .find(|f| f.ion_type == IonType::b && f.end == 2)
            .unwrap();
        assert_eq!(b2.start, 0);
        assert!(close(b2.mz, 227.103), "{}", b2.mz);
        let y1 = fragments
            .iter()
            .find(|f| f.ion_type == IonType::y && f.len() == 1)
            .unwrap();
        assert_eq!((y1.start, y1.end), (6, 7));
        assert!(close(y1.mz, 147.076), "{}", y1.mz);
        assert!(fragments.iter().all(|f| f.charge == 1));
        assert!(
            fragments
                .iter()
                .all(|f| matches!(f.ion_type, IonType::b | IonType::y))
        );
    }

    #[test]
    fn neutral_fragments() {
        let provider = RustymsProvider;
        let peptide = provider.parse("PEPTIDE").unwrap();
        let fragments = provider.fragments(&peptide, &[IonType::b], 0, MassType::Monoisotopic);
        assert!(fragments.iter().all(|f| f.charge == 0));
        let b2 = fragments.iter().find(|f| f.end == 2).unwrap();
        assert!(close(b2.mz, 227.103 - PROTON_MASS), "{}", b2.mz);
        assert!(
            provider
                .fragments(&peptide, &[], 0, MassType::Monoisotopic)
                .is_empty()
        );
    }

    #[test]
    fn condensed() {
        let provider = RustymsProvider;
        let peptide = provider.parse("PEM[Oxidation]TIDE").unwrap();
        assert_eq!(
            provider
                .condensed(&peptide, MassType::Monoisotopic, 4)
                .unwrap(),
            "PEM[+15.9949]TIDE"
        );
        let peptide = provider.parse("[Acetyl]-PEPTIDE-[Amidated]").unwrap();
        assert_eq!(
            provider
                .condensed(&peptide, MassType::Monoisotopic, 2)
                .unwrap(),
            "[+42.01]-PEPTIDE-[-0.98]"
        );
        let oxidised = provider.parse("PEM[Oxidation]TIDE").unwrap();
        let condensed = provider
            .condensed(&oxidised, MassType::Monoisotopic, 4)
            .unwrap();
        let mass = provider
            .neutral_mass(&provider.parse(&condensed).unwrap(), MassType::Monoisotopic)
            .unwrap();
        // PEMTIDE plus one oxygen
        assert!(close(mass, 849.343), "{mass}");
    }
}
