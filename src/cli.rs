//! Command-line and configuration file handling for `create-issuer`.
//!
//! Values given on the command line take precedence over the ones in the configuration file.

use crate::attributes::IssuerAttributes;
use anyhow::Context;
use clap::Parser;
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// The configuration file used when none is given explicitly, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "conf.ini";

/// Generates the issuer profile needed to issue and validate certificates.
#[derive(Parser, Debug, Default)]
#[command(name = "create-issuer", version, about, long_about = None)]
pub struct CreateIssuerArgs {
    /// Configuration file path.
    #[arg(short = 'c', long = "config", visible_alias = "my-config")]
    pub config: Option<PathBuf>,

    /// The key(s) the issuer uses to sign assertions. Repeatable, or comma separated.
    #[arg(short = 'k', long = "public_key", value_delimiter = ',')]
    pub public_keys: Vec<String>,

    /// URI of the revocation list used for marking revocation.
    #[arg(short = 'r', long = "revocation_list_uri")]
    pub revocation_list_uri: Option<String>,

    /// The issuer's publicly accessible identification file, i.e. the URL of the generated file.
    #[arg(short = 'd', long = "issuer_id")]
    pub issuer_id: Option<String>,

    /// The issuer's main URL.
    #[arg(short = 'u', long = "issuer_url")]
    pub issuer_url: Option<String>,

    /// The issuer's name.
    #[arg(short = 'n', long = "issuer_name")]
    pub issuer_name: Option<String>,

    /// The issuer's email.
    #[arg(short = 'e', long = "issuer_email")]
    pub issuer_email: Option<String>,

    /// The issuer's logo image.
    #[arg(short = 'm', long = "issuer_logo_file")]
    pub issuer_logo_file: Option<PathBuf>,

    /// The issuer's introduction URL.
    #[arg(short = 'i', long = "intro_url")]
    pub intro_url: Option<String>,

    /// Where to write the issuer profile. Defaults to standard output.
    #[arg(short = 'o', long = "output_file")]
    pub output_file: Option<PathBuf>,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CreateIssuerArgs {
    /// Merge these arguments with the configuration file, if any.
    pub fn resolve(self) -> anyhow::Result<Invocation> {
        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
        };
        let file = match config_path {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration file");
                FileConfig::load(&path).with_context(|| format!("loading configuration file {}", path.display()))?
            }
            None => FileConfig::default(),
        };
        Ok(self.merge(file))
    }

    fn merge(self, file: FileConfig) -> Invocation {
        let public_keys = if self.public_keys.is_empty() {
            file.public_key.map(KeyList::into_keys).unwrap_or_default()
        } else {
            self.public_keys
        };
        let attributes = IssuerAttributes {
            public_keys: normalize_keys(public_keys),
            revocation_list_uri: self.revocation_list_uri.or(file.revocation_list_uri),
            id: self.issuer_id.or(file.issuer_id),
            url: self.issuer_url.or(file.issuer_url),
            name: self.issuer_name.or(file.issuer_name),
            email: self.issuer_email.or(file.issuer_email),
            logo_image_path: self.issuer_logo_file.or(file.issuer_logo_file),
            introduction_url: self.intro_url.or(file.intro_url),
        };
        let output = match self.output_file.or(file.output_file) {
            Some(path) => Output::File(path),
            None => Output::Stdout,
        };
        Invocation { attributes, output }
    }
}

fn normalize_keys(keys: Vec<String>) -> Vec<String> {
    keys.iter().map(|key| key.trim()).filter(|key| !key.is_empty()).map(ToString::to_string).collect()
}

/// The values read from a configuration file.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    public_key: Option<KeyList>,
    revocation_list_uri: Option<String>,
    issuer_id: Option<String>,
    issuer_url: Option<String>,
    issuer_name: Option<String>,
    issuer_email: Option<String>,
    issuer_logo_file: Option<PathBuf>,
    intro_url: Option<String>,
    output_file: Option<PathBuf>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, config::ConfigError> {
        Config::builder().add_source(File::from(path).format(file_format(path))).build()?.try_deserialize()
    }
}

fn file_format(path: &Path) -> FileFormat {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("toml") => FileFormat::Toml,
        Some("yaml" | "yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        _ => FileFormat::Ini,
    }
}

/// Public keys in a configuration file: either comma separated or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyList {
    Joined(String),
    List(Vec<String>),
}

impl KeyList {
    fn into_keys(self) -> Vec<String> {
        match self {
            Self::Joined(keys) => keys.split(',').map(ToString::to_string).collect(),
            Self::List(keys) => keys,
        }
    }
}

/// A fully resolved invocation.
#[derive(Debug, PartialEq)]
pub struct Invocation {
    pub attributes: IssuerAttributes,
    pub output: Output,
}

/// The destination of the issuer profile.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// Write the whole document to this destination.
    pub fn write(&self, document: &str) -> io::Result<()> {
        match self {
            Self::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(document.as_bytes())?;
                stdout.flush()
            }
            Self::File(path) => fs::write(path, document),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "standard output"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolve the arguments, build the issuer profile and write it out.
///
/// The document is fully serialized before the destination is touched so failures never leave partial output.
pub fn run(args: CreateIssuerArgs) -> anyhow::Result<()> {
    let Invocation { attributes, output } = args.resolve()?;
    let image = attributes.encode_logo().context("encoding issuer logo")?;
    let profile = attributes.build(image).context("building issuer profile")?;

    let mut document = profile.to_pretty_json().context("serializing issuer profile")?;
    document.push('\n');
    output.write(&document).with_context(|| format!("writing issuer profile to {output}"))?;
    info!(destination = %output, "wrote issuer profile");
    Ok(())
}
