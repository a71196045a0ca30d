//! Calculate the theoretical fragment ions of a peptide and show them as a coloured table
#![allow(clippy::struct_excessive_bools)]

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;

mod config;
mod error;
mod export;
mod fragment;
mod html_builder;
mod params;
mod proforma;
mod provider;
mod render;
mod share;
mod style;
mod table;
mod validate;

use crate::{
    config::Config,
    error::PepFragError,
    fragment::FragmentRecord,
    params::RequestParameters,
    provider::{FragmentProvider, RustymsProvider},
    render::{CaptionInfo, ShareLinks},
    style::StyledTable,
    validate::accept_peptide,
};

/// The command line interface arguments, any explicit option overrules the query
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// The parameters as query (`peptide=PEPTIDE&charge=2`) or as full share url
    query: Option<String>,
    /// The peptide in ProForma 2.0 notation
    #[arg(short, long)]
    peptide: Option<String>,
    /// The charge of the peptide, fragments are only shown at this charge
    #[arg(short = 'z', long)]
    charge: Option<usize>,
    /// The ion types to show, for example `by` or `a,c,z`
    #[arg(short, long)]
    fragment_types: Option<String>,
    /// `monoisotopic` or `average`
    #[arg(long)]
    mass_type: Option<String>,
    /// Place a static carbamidomethyl on every cysteine
    #[arg(long)]
    carbamidomethyl: bool,
    /// Rewrite all modifications as mass deltas, rounded to the decimal places
    #[arg(long)]
    condense_to_mass_notation: bool,
    /// Highlight all m/z values outside of this window
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    mass_bounds: Option<Vec<f64>>,
    #[arg(long)]
    decimal_places: Option<usize>,
    #[arg(long)]
    row_padding: Option<usize>,
    #[arg(long)]
    column_padding: Option<usize>,
    #[arg(long)]
    no_borders: bool,
    /// `vertical` or `horizontal` layout of the caption
    #[arg(long)]
    display_type: Option<String>,
    /// The colour for an ion type, `y=#d62728`, can be given multiple times
    #[arg(long = "color", value_name = "ION=COLOR")]
    colors: Vec<String>,
    /// Write the html page here instead of to stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Export all fragments as csv, by default to `{sequence}_fragment_data.csv`
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    csv: Option<Option<PathBuf>>,
    /// The origin the page is served on, used to build the share link
    #[arg(long)]
    origin: Option<String>,
    /// Shorten the share link with TinyURL
    #[arg(long)]
    tinyurl: bool,
    /// Use this configuration file instead of the one in the user config directory
    #[arg(long)]
    config: Option<PathBuf>,
    /// Do not load any configuration file
    #[arg(long, conflicts_with = "config")]
    no_config: bool,
    /// List all query keys with their defaults and exit
    #[arg(long, exclusive = true)]
    list_parameters: bool,
}

impl Cli {
    fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        let mut add = |key, value: Option<String>| {
            if let Some(value) = value {
                overrides.push((key, value));
            }
        };
        add("peptide", self.peptide.clone());
        add("charge", self.charge.map(|c| c.to_string()));
        add("fragment_types", self.fragment_types.clone());
        add("mass_type", self.mass_type.clone());
        add(
            "use_carbamidomethyl",
            self.carbamidomethyl.then(|| "true".to_string()),
        );
        add(
            "condense_to_mass_notation",
            self.condense_to_mass_notation.then(|| "true".to_string()),
        );
        if let Some([min, max]) = self.mass_bounds.as_deref() {
            add("mass_bounds", Some("true".to_string()));
            add("min_mz", Some(min.to_string()));
            add("max_mz", Some(max.to_string()));
        }
        add("decimal_places", self.decimal_places.map(|v| v.to_string()));
        add("row_padding", self.row_padding.map(|v| v.to_string()));
        add("column_padding", self.column_padding.map(|v| v.to_string()));
        add("show_borders", self.no_borders.then(|| "false".to_string()));
        add("display_type", self.display_type.clone());
        overrides
    }

    /// Resolve all parameters: defaults, then the config file, then the query, then the options.
    fn parameters(&self, config: &Config) -> Result<RequestParameters, PepFragError> {
        let mut parameters = RequestParameters::default();
        config.apply(&mut parameters)?;
        if let Some(query) = &self.query {
            parameters.apply_query(query)?;
        }
        for (key, value) in self.overrides() {
            parameters.set(key, &value)?;
        }
        for color in &self.colors {
            let (ion, value) = color.split_once('=').ok_or_else(|| {
                PepFragError::parameter("color", color, "expected the form ION=COLOR")
            })?;
            parameters.set(&format!("{}_color", ion.trim().to_ascii_lowercase()), value)?;
        }
        Ok(parameters)
    }

    fn config(&self) -> Result<Config, PepFragError> {
        if self.no_config {
            return Ok(Config::default());
        }
        match self.config.clone().or_else(config::default_path) {
            Some(path) => Config::load(&path),
            None => {
                log::debug!("No configuration directory available");
                Ok(Config::default())
            }
        }
    }
}

/// The outcome of a single request
#[derive(Debug)]
struct Rendered {
    table: StyledTable,
    fragments: Vec<FragmentRecord>,
    /// The sequence as fragmented
    sequence: String,
}

impl Rendered {
    fn html(&self, share: Option<&ShareLinks>) -> String {
        render::page(&self.table, &self.sequence, share)
    }
}

/// Run the full pipeline for one set of parameters.
fn render_table<P: FragmentProvider>(
    provider: &P,
    parameters: &RequestParameters,
) -> Result<Rendered, PepFragError> {
    log::debug!("Rendering {parameters:?}");
    let accepted = accept_peptide(provider, &parameters.peptide, parameters.sequence_options())?;

    let fragments = provider.fragments(
        &accepted.peptide,
        &parameters.fragment_types,
        parameters.charge,
        parameters.mass_type,
    );
    log::debug!("{} fragments generated", fragments.len());
    let residues =
        proforma::residue_symbols(&accepted.sequence, &provider.residues(&accepted.peptide));
    let table = table::build(
        &fragments,
        &parameters.fragment_types,
        parameters.charge,
        accepted.length,
        &residues,
    )?;

    let caption = render::caption(
        &CaptionInfo {
            sequence: accepted.sequence.clone(),
            mass_type: parameters.mass_type,
            charge: parameters.charge,
            neutral_mass: accepted.neutral_mass,
            precision: parameters.decimal_places,
            bounds: parameters.bounds(),
        },
        parameters.display_type,
    );
    Ok(Rendered {
        table: style::style(&table, &parameters.style_spec(Some(caption.to_string()))),
        fragments,
        sequence: accepted.sequence,
    })
}

fn run(cli: &Cli) -> Result<(), PepFragError> {
    if cli.list_parameters {
        writeln!(std::io::stdout().lock(), "{}", params::overview())?;
        return Ok(());
    }
    let config = cli.config()?;
    let parameters = cli.parameters(&config)?;
    let rendered = render_table(&RustymsProvider, &parameters)?;

    let share = match cli.origin.as_deref().or(config.origin.as_deref()) {
        Some(origin) => {
            let url = parameters.to_url(origin)?;
            let short = cli.tinyurl.then(|| share::shorten_url(&url));
            Some(ShareLinks { url, short })
        }
        None => {
            if cli.tinyurl {
                log::warn!("No origin is known, so no share link can be made");
            }
            None
        }
    };

    let html = rendered.html(share.as_ref());
    if let Some(path) = &cli.out {
        std::fs::write(path, &html)?;
        log::info!("Written page to {}", path.display());
    } else {
        std::io::stdout().lock().write_all(html.as_bytes())?;
    }

    if let Some(path) = &cli.csv {
        let path = path
            .clone()
            .unwrap_or_else(|| PathBuf::from(export::file_name(&rendered.sequence)));
        let file = BufWriter::new(File::create(&path)?);
        export::write_fragments(file, &rendered.fragments, parameters.bounds())?;
        log::info!(
            "Written {} fragments to {}",
            rendered.fragments.len(),
            path.display()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("PEPFRAG_LOG", "warn"))
        .init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) if error.is_warning() => {
            eprintln!("warning: {error}");
            ExitCode::from(2)
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::{fragment::IonType, validate::tests::FakeProvider};

    #[test]
    fn cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn layered_parameters() {
        let cli = Cli::try_parse_from([
            "pepfrag",
            "peptide=ACDC&charge=3&fragment_types=a&b_color=%23000000",
            "--charge",
            "4",
            "--color",
            "Y=#111111",
            "--mass-bounds",
            "100",
            "900.5",
            "--no-borders",
        ])
        .unwrap();
        let config: Config =
            serde_json::from_str(r#"{"defaults": {"charge": 1, "decimal_places": 2}}"#).unwrap();
        let parameters = cli.parameters(&config).unwrap();
        assert_eq!(parameters.peptide, "ACDC");
        assert_eq!(parameters.charge, 4);
        assert_eq!(parameters.decimal_places, 2);
        assert_eq!(parameters.fragment_types, vec![IonType::a]);
        assert_eq!(parameters.colors.get(IonType::b), "#000000");
        assert_eq!(parameters.colors.get(IonType::y), "#111111");
        assert!(!parameters.show_borders);
        assert_eq!(
            parameters.bounds(),
            Some(fragment::MassBounds {
                min: 100.0,
                max: 900.5
            })
        );
        let bad = Cli::try_parse_from(["pepfrag", "--color", "y"]).unwrap();
        assert!(bad.parameters(&Config::default()).is_err());
    }

    #[test]
    fn full_page() {
        let parameters = RequestParameters {
            peptide: "PEPTIDE".to_string(),
            charge: 1,
            ..RequestParameters::default()
        };
        let share = ShareLinks {
            url: parameters.to_url("http://localhost:8501").unwrap(),
            short: None,
        };
        let rendered = render_table(&FakeProvider, &parameters).unwrap();
        let html = rendered.html(Some(&share));
        assert!(html.contains("<th>B<sup>1+</sup></th>"));
        assert!(html.contains("<th>Y<sup>1+</sup></th>"));
        assert!(html.contains("Neutral Mass"));
        assert!(html.contains("href='http://localhost:8501/?peptide=PEPTIDE&amp;charge=1"));
        assert_eq!(rendered.fragments.len(), 14);
        assert_eq!(rendered.sequence, "PEPTIDE");
    }

    #[test]
    fn round_trip_pages() {
        let mut parameters = RequestParameters::default();
        parameters.peptide = "[Acetyl]-PEM[Oxidation]TIDE".to_string();
        parameters.fragment_types = vec![IonType::a, IonType::x, IonType::y];
        parameters.mass_bounds = true;
        parameters.min_mz = 250.0;
        parameters.decimal_places = 2;
        let decoded = RequestParameters::from_query(&parameters.to_query().unwrap()).unwrap();
        assert_eq!(
            render_table(&FakeProvider, &decoded).unwrap().html(None),
            render_table(&FakeProvider, &parameters).unwrap().html(None)
        );
    }

    #[test]
    fn condensed_sequence() {
        let parameters = RequestParameters {
            peptide: "PEM[Oxidation]TIDE".to_string(),
            condense_to_mass_notation: true,
            decimal_places: 1,
            ..RequestParameters::default()
        };
        let rendered = render_table(&FakeProvider, &parameters).unwrap();
        assert_eq!(rendered.sequence, "PEM[+9.0]TIDE");
        let html = rendered.html(None);
        assert!(html.contains("<title>PepFrag - PEM[+9.0]TIDE</title>"));
        assert!(html.contains(">M[+9.0]</td>"));
    }

    #[test]
    fn neutral_table() {
        let parameters = RequestParameters {
            peptide: "PEPTIDE".to_string(),
            charge: 0,
            ..RequestParameters::default()
        };
        let rendered = render_table(&FakeProvider, &parameters).unwrap();
        let html = rendered.html(None);
        assert!(html.contains("<th>B<sup>0+</sup></th>"));
        assert_eq!(html.matches("<tr>").count(), 8);
        assert!(rendered.fragments.iter().all(|f| f.charge == 0));
    }

    #[test]
    fn empty_result_warns() {
        let parameters = RequestParameters {
            fragment_types: Vec::new(),
            ..RequestParameters::default()
        };
        let error = render_table(&FakeProvider, &parameters).unwrap_err();
        assert!(error.is_warning());
        assert_eq!(
            error.to_string(),
            "No fragments found. Please check your input and try again."
        );
    }

    #[test]
    fn invalid_peptide_stops() {
        let parameters = RequestParameters {
            peptide: "PEP?TIDE".to_string(),
            ..RequestParameters::default()
        };
        let error = render_table(&FakeProvider, &parameters).unwrap_err();
        assert!(!error.is_warning());
        assert_eq!(error.to_string(), "Sequence cannot contain ambiguity!");
    }
}
