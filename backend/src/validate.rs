use crate::{error::PepFragError, fragment::MassType, proforma, provider::FragmentProvider};

pub const MAX_PEPTIDE_LENGTH: usize = 1000;

/// A peptide that passed all checks, ready to be fragmented.
#[derive(Clone, Debug)]
pub struct AcceptedPeptide<P> {
    pub peptide: P,
    /// The sequence as it is fragmented, so with any static modifications applied
    pub sequence: String,
    pub length: usize,
    pub neutral_mass: f64,
}

/// Check that the sequence is a single, unambiguous and uncharged peptide. The checks are
/// done in a fixed order, the first failing check determines the error.
/// # Errors
/// If any of the checks fails.
pub fn validate_peptide<P: FragmentProvider>(
    provider: &P,
    sequence: &str,
) -> Result<P::Peptide, PepFragError> {
    let peptide = provider.parse(sequence).map_err(PepFragError::Parse)?;
    let facts = provider.facts(&peptide);
    if facts.has_charge {
        return Err(PepFragError::ChargeState);
    }
    if facts.length > MAX_PEPTIDE_LENGTH {
        return Err(PepFragError::TooLong {
            max: MAX_PEPTIDE_LENGTH,
        });
    }
    if facts.has_adducts {
        return Err(PepFragError::Adducts);
    }
    if facts.ambiguous {
        return Err(PepFragError::Ambiguity);
    }
    if facts.length == 0 {
        return Err(PepFragError::Empty);
    }
    Ok(peptide)
}

/// How the sequence is rewritten before it is fragmented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceOptions {
    pub mass_type: MassType,
    /// Place a static carbamidomethyl on every cysteine
    pub carbamidomethyl: bool,
    /// Write all modifications as mass deltas with this many decimals
    pub condense: Option<usize>,
}

/// Validate the user input, apply the sequence options, and make sure a mass can be calculated.
/// # Errors
/// If the peptide is not accepted, see [`validate_peptide`], or if no mass can be calculated.
pub fn accept_peptide<P: FragmentProvider>(
    provider: &P,
    sequence: &str,
    options: SequenceOptions,
) -> Result<AcceptedPeptide<P::Peptide>, PepFragError> {
    let mut peptide = validate_peptide(provider, sequence)?;
    let mut sequence = sequence.to_string();
    if options.carbamidomethyl {
        sequence = proforma::add_carbamidomethyl(&sequence);
        peptide = provider.parse(&sequence).map_err(PepFragError::Parse)?;
    }
    if let Some(precision) = options.condense {
        match provider.condensed(&peptide, options.mass_type, precision) {
            Ok(condensed) => {
                log::debug!("Condensed {sequence} to {condensed}");
                peptide = provider.parse(&condensed).map_err(PepFragError::Parse)?;
                sequence = condensed;
            }
            Err(reason) => log::warn!("Using {sequence} as given, {reason}"),
        }
    }
    let neutral_mass = provider
        .neutral_mass(&peptide, options.mass_type)
        .map_err(PepFragError::Mass)?;
    let length = provider.facts(&peptide).length;
    log::debug!("Accepted {sequence} ({length} residues, {neutral_mass} Da)");
    Ok(AcceptedPeptide {
        peptide,
        sequence,
        length,
        neutral_mass,
    })
}
