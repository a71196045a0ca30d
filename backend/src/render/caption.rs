use std::str::FromStr;

use crate::{
    fragment::{MassBounds, MassType},
    html_builder::{HtmlElement, HtmlTag},
    provider::precursor_mz,
};

/// How the caption summary is laid out, as a two column list or as a single row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum DisplayType {
    #[default]
    vertical,
    horizontal,
}

impl DisplayType {
    pub const fn query_value(self) -> &'static str {
        match self {
            Self::vertical => "vertical",
            Self::horizontal => "horizontal",
        }
    }
}

impl FromStr for DisplayType {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vertical" => Ok(Self::vertical),
            "horizontal" => Ok(Self::horizontal),
            _ => Err(()),
        }
    }
}

/// The facts about the precursor shown above the table
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionInfo {
    pub sequence: String,
    pub mass_type: MassType,
    pub charge: usize,
    pub neutral_mass: f64,
    pub precision: usize,
    pub bounds: Option<MassBounds>,
}

impl CaptionInfo {
    fn entries(&self) -> Vec<(&'static str, String)> {
        let precision = self.precision;
        let mut entries = vec![
            ("Mass Type", self.mass_type.label().to_string()),
            ("Charge", format!("{}+", self.charge)),
            (
                "M/z",
                format!("{:.precision$}", precursor_mz(self.neutral_mass, self.charge)),
            ),
            ("Neutral Mass", format!("{:.precision$}", self.neutral_mass)),
        ];
        if let Some(bounds) = self.bounds {
            entries.push((
                "M/z Bounds",
                format!("{:.1} - {:.1}", bounds.min, bounds.max),
            ));
        }
        entries
    }
}

fn label(text: &str) -> HtmlElement {
    HtmlElement::new(HtmlTag::div)
        .header("style", "font-weight: bold; color: #333;")
        .content(text)
}

fn value(text: String) -> HtmlElement {
    HtmlElement::new(HtmlTag::div)
        .header("style", "color: #333;")
        .content(text)
}

pub fn caption(info: &CaptionInfo, display: DisplayType) -> HtmlElement {
    let entries = info.entries();
    let (columns, cells) = match display {
        DisplayType::vertical => (
            2,
            entries
                .into_iter()
                .flat_map(|(l, v)| [label(l), value(v)])
                .collect::<Vec<_>>(),
        ),
        DisplayType::horizontal => {
            let columns = entries.len();
            let (labels, values): (Vec<_>, Vec<_>) = entries
                .into_iter()
                .map(|(l, v)| (label(l), value(v)))
                .unzip();
            (columns, labels.into_iter().chain(values).collect())
        }
    };
    HtmlElement::new(HtmlTag::div)
        .class("caption")
        .header(
            "style",
            "text-align: center; padding: 20px; margin: 5px 0; border: 1px solid #ddd; border-radius: 8px; background-color: #f9f9f9;",
        )
        .content(
            HtmlElement::new(HtmlTag::div)
                .header(
                    "style",
                    "font-size: 1.2em; font-weight: bold; margin-bottom: 5px; color: #333;",
                )
                .content(info.sequence.as_str()),
        )
        .content(
            HtmlElement::new(HtmlTag::div)
                .header(
                    "style",
                    format!(
                        "display: grid; grid-template-columns: {}; gap: 2px; margin-top: 5px; font-size: 0.95em;",
                        vec!["1fr"; columns].join(" ")
                    ),
                )
                .content(cells),
        )
}
