//! Command line interface

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;

use crate::authority::AuthorityResolver;
use crate::config::{Config, License};
use crate::document::CmiDocument;
use crate::error::CmiError;
use crate::header::FileDescription;
use crate::letter::{ConvertOptions, Converter};

#[derive(Debug, Parser)]
#[command(name = "csv2cmi", version, about = "convert tables of letters to CMI")]
pub struct Cli {
    /// input file (.csv)
    pub filename: PathBuf,

    /// include unedited letters
    #[arg(short, long)]
    pub all: bool,

    /// transfer notes
    #[arg(short, long)]
    pub notes: bool,

    /// output file name
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// increase output verbosity
    #[arg(short, long)]
    pub verbose: bool,

    /// mark as public domain
    #[arg(long)]
    pub cc0: bool,

    /// add line numbers
    #[arg(long)]
    pub line_numbers: bool,

    /// delimiter for different values within cells
    #[arg(long, value_name = "CHAR")]
    pub extra_delimiter: Option<String>,

    /// configuration file (default: csv2cmi.toml next to the input file)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Output path: `--output`, or the input path with an `.xml` extension.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.filename.with_extension("xml"))
    }

    fn load_config(&self) -> Result<Config, CmiError> {
        if let Some(path) = &self.config {
            return Ok(Config::from_file(path)?);
        }
        match Config::locate(&self.filename) {
            Some(path) => {
                tracing::debug!("Reading configuration from {}", path.display());
                Ok(Config::from_file(&path)?)
            }
            None => {
                tracing::error!("No configuration file found");
                Ok(Config::default())
            }
        }
    }
}

/// A delimiter must be exactly one character.
pub fn parse_delimiter(raw: Option<&str>) -> Result<Option<char>, CmiError> {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(delimiter), None) => Ok(Some(delimiter)),
        _ => Err(CmiError::InvalidDelimiter(raw.to_string())),
    }
}

/// Convert the table named on the command line and write the CMI file.
/// Returns the path written to.
pub async fn run(cli: &Cli) -> Result<PathBuf, CmiError> {
    // a bad command line delimiter is reported before anything else
    let cli_delimiter = parse_delimiter(cli.extra_delimiter.as_deref())?;

    if !cli.filename.is_file() {
        return Err(CmiError::InputNotFound(cli.filename.clone()));
    }

    let config = cli.load_config()?;
    let delimiter = match cli_delimiter {
        Some(delimiter) => Some(delimiter),
        None => parse_delimiter(config.project.extra_delimiter.as_deref())?,
    };

    let output = cli.output_path();
    let mut file_description = FileDescription::from_config(&config, &output.display().to_string());
    if cli.cc0 {
        file_description.license = License::Cc0;
    }
    let mut document = CmiDocument::new(file_description);

    let resolver = AuthorityResolver::new()?;
    let options = ConvertOptions {
        include_unedited: cli.all,
        transfer_notes: cli.notes,
        line_numbers: cli.line_numbers,
        delimiter,
    };
    let input = File::open(&cli.filename)?;
    Converter::new(&config, options, &resolver)
        .convert(&mut document, input)
        .await?;

    document.save(&output)?;
    Ok(output)
}
