use std::fmt::Display;

use itertools::Itertools;
use reqwest::Url;

use crate::{
    error::PepFragError,
    fragment::{IonType, MassBounds, MassType},
    render::DisplayType,
    style::{ColorMap, StyleSpec},
    validate::SequenceOptions,
};

/// The rule a parameter value has to follow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constraint {
    Text { max_length: usize },
    Integer { min: usize, max: Option<usize> },
    Float,
    Bool,
    OneOf(&'static [&'static str]),
    IonTypes,
    Color,
}

impl Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text { max_length } => write!(f, "text, at most {max_length} characters"),
            Self::Integer { min, max: None } => write!(f, "integer, at least {min}"),
            Self::Integer {
                min,
                max: Some(max),
            } => write!(f, "integer, {min} to {max}"),
            Self::Float => write!(f, "number"),
            Self::Bool => write!(f, "true or false"),
            Self::OneOf(options) => write!(f, "{}", options.join(" | ")),
            Self::IonTypes => write!(f, "any of a, b, c, x, y, z (repeatable)"),
            Self::Color => write!(f, "css colour"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterDefinition {
    pub key: &'static str,
    pub default: &'static [&'static str],
    pub constraint: Constraint,
}

const fn definition(
    key: &'static str,
    default: &'static [&'static str],
    constraint: Constraint,
) -> ParameterDefinition {
    ParameterDefinition {
        key,
        default,
        constraint,
    }
}

/// All request parameters in the order they are written in a query.
pub const PARAMETERS: &[ParameterDefinition] = &[
    definition("peptide", &["PEPTIDE"], Constraint::Text { max_length: 2000 }),
    definition("charge", &["2"], Constraint::Integer { min: 0, max: None }),
    definition("fragment_types", &["b", "y"], Constraint::IonTypes),
    definition(
        "mass_type",
        &["monoisotopic"],
        Constraint::OneOf(&["monoisotopic", "average"]),
    ),
    definition("use_carbamidomethyl", &["false"], Constraint::Bool),
    definition("condense_to_mass_notation", &["false"], Constraint::Bool),
    definition("mass_bounds", &["false"], Constraint::Bool),
    definition("min_mz", &["200"], Constraint::Float),
    definition("max_mz", &["1800"], Constraint::Float),
    definition(
        "decimal_places",
        &["4"],
        Constraint::Integer {
            min: 0,
            max: Some(10),
        },
    ),
    definition(
        "row_padding",
        &["4"],
        Constraint::Integer {
            min: 0,
            max: Some(100),
        },
    ),
    definition(
        "column_padding",
        &["10"],
        Constraint::Integer {
            min: 0,
            max: Some(100),
        },
    ),
    definition("show_borders", &["true"], Constraint::Bool),
    definition(
        "display_type",
        &["vertical"],
        Constraint::OneOf(&["vertical", "horizontal"]),
    ),
    definition("a_color", &["#8B4513"], Constraint::Color),
    definition("b_color", &["#1f77b4"], Constraint::Color),
    definition("c_color", &["#2ca02c"], Constraint::Color),
    definition("x_color", &["#ff7f0e"], Constraint::Color),
    definition("y_color", &["#d62728"], Constraint::Color),
    definition("z_color", &["#9467bd"], Constraint::Color),
];

pub fn find_definition(key: &str) -> Option<&'static ParameterDefinition> {
    PARAMETERS.iter().find(|p| p.key == key)
}

/// A tab separated listing of all query keys with their default and constraint
pub fn overview() -> String {
    PARAMETERS
        .iter()
        .map(|p| format!("{}\t{}\t{}", p.key, p.default.join(","), p.constraint))
        .join("\n")
}

/// Every input that determines the rendered table.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestParameters {
    pub peptide: String,
    pub charge: usize,
    pub fragment_types: Vec<IonType>,
    pub mass_type: MassType,
    pub use_carbamidomethyl: bool,
    pub condense_to_mass_notation: bool,
    pub mass_bounds: bool,
    pub min_mz: f64,
    pub max_mz: f64,
    pub decimal_places: usize,
    pub row_padding: u32,
    pub column_padding: u32,
    pub show_borders: bool,
    pub display_type: DisplayType,
    pub colors: ColorMap,
}

impl Default for RequestParameters {
    fn default() -> Self {
        Self {
            peptide: "PEPTIDE".to_string(),
            charge: 2,
            fragment_types: vec![IonType::b, IonType::y],
            mass_type: MassType::Monoisotopic,
            use_carbamidomethyl: false,
            condense_to_mass_notation: false,
            mass_bounds: false,
            min_mz: 200.0,
            max_mz: 1800.0,
            decimal_places: 4,
            row_padding: 4,
            column_padding: 10,
            show_borders: true,
            display_type: DisplayType::vertical,
            colors: ColorMap::default(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, PepFragError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(PepFragError::parameter(key, value, "expected true or false")),
    }
}

fn parse_integer(
    key: &str,
    value: &str,
    min: usize,
    max: Option<usize>,
) -> Result<usize, PepFragError> {
    let number = value
        .trim()
        .parse::<usize>()
        .map_err(|_| PepFragError::parameter(key, value, "expected a non-negative integer"))?;
    if number < min || max.is_some_and(|max| number > max) {
        return Err(PepFragError::parameter(
            key,
            value,
            max.map_or_else(
                || format!("must be at least {min}"),
                |max| format!("must be between {min} and {max}"),
            ),
        ));
    }
    Ok(number)
}

fn parse_float(key: &str, value: &str) -> Result<f64, PepFragError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PepFragError::parameter(key, value, "expected a number"))
}

/// Ion types can be given one per value or as a list in one value (`by`, `b,y`)
fn parse_ion_types<'a>(
    key: &str,
    values: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<IonType>, PepFragError> {
    let mut ions = Vec::new();
    for value in values {
        for c in value.chars().filter(|c| *c != ',' && !c.is_whitespace()) {
            ions.push(IonType::from_char(c).ok_or_else(|| {
                PepFragError::parameter(key, value, format!("'{c}' is not one of a, b, c, x, y, z"))
            })?);
        }
    }
    Ok(ions.into_iter().sorted().dedup().collect())
}

fn validate(definition: &ParameterDefinition, value: &str) -> Result<(), PepFragError> {
    let key = definition.key;
    match definition.constraint {
        Constraint::Text { max_length } => {
            if value.chars().count() > max_length {
                return Err(PepFragError::parameter(
                    key,
                    value,
                    format!("must be at most {max_length} characters"),
                ));
            }
        }
        Constraint::OneOf(options) => {
            if !options.iter().any(|o| o.eq_ignore_ascii_case(value.trim())) {
                return Err(PepFragError::parameter(
                    key,
                    value,
                    format!("must be one of {}", options.join(", ")),
                ));
            }
        }
        Constraint::Color => {
            if value.trim().is_empty() || value.contains([';', '\'', '"', '<', '>']) {
                return Err(PepFragError::parameter(key, value, "not a valid colour"));
            }
        }
        Constraint::Integer { .. } | Constraint::Float | Constraint::Bool | Constraint::IonTypes => {}
    }
    Ok(())
}

impl RequestParameters {
    /// Set a single value, for list parameters this replaces the whole list.
    /// # Errors
    /// If the value does not follow the constraint for this parameter.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), PepFragError> {
        self.set_values(key, &[value])
    }

    /// Set a parameter from all values given for it. Scalar parameters take the last value.
    /// Unknown keys are ignored.
    /// # Errors
    /// If a value does not follow the constraint for this parameter.
    pub fn set_values(&mut self, key: &str, values: &[&str]) -> Result<(), PepFragError> {
        let Some(definition) = find_definition(key) else {
            log::debug!("Ignoring unknown parameter '{key}'");
            return Ok(());
        };
        if definition.constraint == Constraint::IonTypes {
            self.fragment_types = parse_ion_types(key, values.iter().copied())?;
            return Ok(());
        }
        let Some(value) = values.last().copied() else {
            return Ok(());
        };
        validate(definition, value)?;
        match (key, definition.constraint) {
            ("peptide", _) => self.peptide = value.trim().to_string(),
            ("mass_type", _) => {
                self.mass_type = value
                    .trim()
                    .parse()
                    .map_err(|()| PepFragError::parameter(key, value, "unknown mass type"))?;
            }
            ("display_type", _) => {
                self.display_type = value
                    .trim()
                    .parse()
                    .map_err(|()| PepFragError::parameter(key, value, "unknown display type"))?;
            }
            ("use_carbamidomethyl", _) => self.use_carbamidomethyl = parse_bool(key, value)?,
            ("condense_to_mass_notation", _) => {
                self.condense_to_mass_notation = parse_bool(key, value)?;
            }
            ("mass_bounds", _) => self.mass_bounds = parse_bool(key, value)?,
            ("show_borders", _) => self.show_borders = parse_bool(key, value)?,
            ("min_mz", _) => self.min_mz = parse_float(key, value)?,
            ("max_mz", _) => self.max_mz = parse_float(key, value)?,
            ("charge", Constraint::Integer { min, max }) => {
                self.charge = parse_integer(key, value, min, max)?;
            }
            ("decimal_places", Constraint::Integer { min, max }) => {
                self.decimal_places = parse_integer(key, value, min, max)?;
            }
            ("row_padding", Constraint::Integer { min, max }) => {
                self.row_padding = u32::try_from(parse_integer(key, value, min, max)?)
                    .map_err(|e| PepFragError::parameter(key, value, e.to_string()))?;
            }
            ("column_padding", Constraint::Integer { min, max }) => {
                self.column_padding = u32::try_from(parse_integer(key, value, min, max)?)
                    .map_err(|e| PepFragError::parameter(key, value, e.to_string()))?;
            }
            (color, Constraint::Color) => {
                let ion = color
                    .chars()
                    .next()
                    .and_then(IonType::from_char)
                    .ok_or_else(|| PepFragError::parameter(key, value, "unknown ion type"))?;
                self.colors.set(ion, value.trim());
            }
            _ => log::warn!("Parameter '{key}' is defined but never read"),
        }
        Ok(())
    }

    /// All parameters as query pairs, in definition order. An empty ion type list is written
    /// as a single empty value so that it survives a round trip.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(PARAMETERS.len() + 1);
        for definition in PARAMETERS {
            let key = definition.key;
            match key {
                "peptide" => pairs.push((key, self.peptide.clone())),
                "charge" => pairs.push((key, self.charge.to_string())),
                "fragment_types" => {
                    if self.fragment_types.is_empty() {
                        pairs.push((key, String::new()));
                    }
                    pairs.extend(self.fragment_types.iter().map(|ion| (key, ion.to_string())));
                }
                "mass_type" => pairs.push((key, self.mass_type.query_value().to_string())),
                "use_carbamidomethyl" => pairs.push((key, self.use_carbamidomethyl.to_string())),
                "condense_to_mass_notation" => {
                    pairs.push((key, self.condense_to_mass_notation.to_string()));
                }
                "mass_bounds" => pairs.push((key, self.mass_bounds.to_string())),
                "min_mz" => pairs.push((key, self.min_mz.to_string())),
                "max_mz" => pairs.push((key, self.max_mz.to_string())),
                "decimal_places" => pairs.push((key, self.decimal_places.to_string())),
                "row_padding" => pairs.push((key, self.row_padding.to_string())),
                "column_padding" => pairs.push((key, self.column_padding.to_string())),
                "show_borders" => pairs.push((key, self.show_borders.to_string())),
                "display_type" => pairs.push((key, self.display_type.query_value().to_string())),
                color => {
                    if let Some(value) = self.colors.get_by_key(&color[..1]) {
                        pairs.push((key, value.to_string()));
                    }
                }
            }
        }
        pairs
    }

    /// # Errors
    /// If the text cannot be read as a url query.
    pub fn from_query(query: &str) -> Result<Self, PepFragError> {
        let mut parameters = Self::default();
        parameters.apply_query(query)?;
        Ok(parameters)
    }

    /// Overwrite all parameters given in the query, this can be a bare query (with or without
    /// leading `?`) or a full url.
    /// # Errors
    /// If the text cannot be read as a url query, or if any value is invalid.
    pub fn apply_query(&mut self, query: &str) -> Result<(), PepFragError> {
        let url = if query.contains("://") {
            Url::parse(query)
        } else {
            Url::parse("http://localhost/")
                .and_then(|base| base.join(&format!("?{}", query.trim_start_matches('?'))))
        }
        .map_err(|e| PepFragError::Url {
            url: query.to_string(),
            reason: e.to_string(),
        })?;
        let groups = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .into_group_map();
        // Apply in definition order so the outcome does not depend on the order in the query
        for definition in PARAMETERS {
            if let Some(values) = groups.get(definition.key) {
                self.set_values(
                    definition.key,
                    &values.iter().map(String::as_str).collect_vec(),
                )?;
            }
        }
        for key in groups.keys().filter(|k| find_definition(k).is_none()) {
            log::debug!("Ignoring unknown query key '{key}'");
        }
        Ok(())
    }

    /// # Errors
    /// Only if the url machinery fails to build a query.
    pub fn to_query(&self) -> Result<String, PepFragError> {
        let mut url = Url::parse("http://localhost/").map_err(|e| PepFragError::Url {
            url: "http://localhost/".to_string(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .extend_pairs(self.pairs().iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url.query().unwrap_or_default().to_string())
    }

    /// The shareable url on the given origin, for example `http://localhost:8501`.
    /// # Errors
    /// See [`Self::to_query`].
    pub fn to_url(&self, origin: &str) -> Result<String, PepFragError> {
        Ok(format!(
            "{}/?{}",
            origin.trim_end_matches('/'),
            self.to_query()?
        ))
    }

    /// The highlight window, only when turned on.
    pub const fn bounds(&self) -> Option<MassBounds> {
        if self.mass_bounds {
            Some(MassBounds {
                min: self.min_mz,
                max: self.max_mz,
            })
        } else {
            None
        }
    }

    /// The rewrites applied to the peptide before fragmenting, modifications are condensed
    /// with the same precision as the table.
    pub const fn sequence_options(&self) -> SequenceOptions {
        SequenceOptions {
            mass_type: self.mass_type,
            carbamidomethyl: self.use_carbamidomethyl,
            condense: if self.condense_to_mass_notation {
                Some(self.decimal_places)
            } else {
                None
            },
        }
    }

    pub fn style_spec(&self, caption: Option<String>) -> StyleSpec {
        StyleSpec {
            colors: self.colors.clone(),
            borders: self.show_borders,
            row_padding: self.row_padding,
            column_padding: self.column_padding,
            precision: self.decimal_places,
            bounds: self.bounds(),
            caption,
        }
    }
}
