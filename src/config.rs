use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::parser::ParseConfig;

/// Name of the config file looked up in the content root.
pub const CONFIG_FILE: &str = ".docxref.toml";

/// Component assumed when the config lists none.
const DEFAULT_COMPONENT: &str = "main";

/// Version assumed when the config lists no components.
const DEFAULT_VERSION: &str = "latest";

/// Options of the xref resolver itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct XrefConfig {
    /// Warn when a link's text equals the text its fragment would supply.
    #[serde(
        default,
        rename = "logUnnecessaryLinkTextWarnings",
        alias = "log_unnecessary_link_text_warnings"
    )]
    pub log_unnecessary_link_text_warnings: bool,
    /// Regex patterns; an unresolved reference matching any of them is
    /// rewritten to a placeholder link instead of being reported.
    #[serde(default)]
    pub stub: Vec<String>,
}

/// One component version on disk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ComponentConfig {
    /// Parse options for documents of this component version only.
    #[serde(default)]
    pub asciidoc: Option<ParseConfig>,
    pub name: String,
    /// Directory, relative to the content root, that contains `modules/`.
    #[serde(default = "current_dir")]
    pub path: PathBuf,
    pub version: String,
}

/// Default for `ComponentConfig::path`.
fn current_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Project configuration loaded from `.docxref.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    asciidoc: ParseConfig,
    components: Vec<ComponentConfig>,
    xref: XrefConfig,
}

/// Raw TOML structure for `.docxref.toml`.
#[derive(serde::Deserialize)]
struct DocxrefTomlConfig {
    #[serde(default)]
    asciidoc: ParseConfig,
    #[serde(default)]
    components: Vec<ComponentConfig>,
    #[serde(default)]
    xref: XrefConfig,
}

impl Config {
    /// Load config from `.docxref.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::single_component_at_root()),
            Err(e) => return Err(Error::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: DocxrefTomlConfig = toml::from_str(content)?;
        let components = if raw.components.is_empty() {
            Self::single_component_at_root().components
        } else {
            raw.components
        };
        Ok(Self {
            asciidoc: raw.asciidoc,
            components,
            xref: raw.xref,
        })
    }

    /// Default config: the content root is one component, no stubs.
    fn single_component_at_root() -> Self {
        Self {
            asciidoc: ParseConfig::default(),
            components: vec![ComponentConfig {
                asciidoc: None,
                name: DEFAULT_COMPONENT.to_string(),
                path: current_dir(),
                version: DEFAULT_VERSION.to_string(),
            }],
            xref: XrefConfig::default(),
        }
    }

    /// Site-wide parse options.
    pub const fn asciidoc(&self) -> &ParseConfig {
        &self.asciidoc
    }

    pub fn components(&self) -> &[ComponentConfig] {
        &self.components
    }

    pub const fn xref(&self) -> &XrefConfig {
        &self.xref
    }
}
