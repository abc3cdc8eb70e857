//! Model generation settings read from `[tool.datamodel-codegen]` in `pyproject.toml`.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error};
use log::debug;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub enum PythonVersion {
    #[serde(rename = "3.6")]
    Py36,
    #[serde(rename = "3.7")]
    Py37,
    #[serde(rename = "3.8")]
    Py38,
    #[serde(rename = "3.9")]
    Py39,
    #[serde(rename = "3.10")]
    Py310,
    #[serde(rename = "3.11")]
    Py311,
    #[serde(rename = "3.12")]
    Py312,
}

impl PythonVersion {
    pub fn has_literal_type(&self) -> bool {
        *self >= PythonVersion::Py38
    }

    /// Module `Literal` is imported from on this version.
    pub fn literal_module(&self) -> &'static str {
        if self.has_literal_type() {
            "typing"
        } else {
            "typing_extensions"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralType {
    /// Every enum becomes a `Literal[...]`.
    All,
    /// Only single-valued enums become a `Literal[...]`.
    One,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    pub base_class: Option<String>,
    pub snake_case_field: bool,
    pub strip_default_none: bool,
    pub force_optional: bool,
    pub use_standard_collections: bool,
    pub use_schema_description: bool,
    pub enum_field_as_literal: Option<LiteralType>,
    pub target_python_version: PythonVersion,
    pub skip_deprecated: bool,
    /// Path of a JSON object mapping document field names to Python names.
    pub aliases: Option<PathBuf>,
    #[serde(skip)]
    pub field_aliases: BTreeMap<String, String>,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            base_class: None,
            snake_case_field: false,
            strip_default_none: false,
            force_optional: false,
            use_standard_collections: false,
            use_schema_description: false,
            enum_field_as_literal: None,
            target_python_version: PythonVersion::Py37,
            skip_deprecated: true,
            aliases: None,
            field_aliases: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display(fmt = "Failed to read {:?}: {}", path, source)]
    Read { path: PathBuf, source: std::io::Error },

    #[display(fmt = "Failed to parse {:?}: {}", path, source)]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[display(fmt = "Unable to load alias mapping: {}", _0)]
    AliasesSyntax(serde_json::Error),

    #[display(fmt = "Alias mapping must be a JSON string mapping (e.g. {{\"from\": \"to\", ...}})")]
    AliasesShape,
}

impl CodegenConfig {
    /// Reads the configuration of `pyproject.toml`, or the defaults when the
    /// file has no `[tool.datamodel-codegen]` table.
    pub fn from_pyproject(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut config = Self::from_pyproject_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        if let Some(aliases) = config.aliases.clone() {
            let aliases = match aliases.is_relative() {
                true => path.parent().unwrap_or(Path::new(".")).join(aliases),
                false => aliases,
            };
            config.load_aliases(&aliases)?;
        }
        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses the contents of a `pyproject.toml`. Keys may use `-` or `_`.
    pub fn from_pyproject_str(text: &str) -> Result<Self, toml::de::Error> {
        let document: toml::Table = toml::from_str(text)?;
        let table: toml::Table = document
            .get("tool")
            .and_then(|tool| tool.get("datamodel-codegen"))
            .and_then(|section| section.as_table())
            .map(|section| {
                section
                    .iter()
                    .map(|(k, v)| (k.replace('-', "_"), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        toml::Value::Table(table).try_into()
    }

    pub fn load_aliases(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        self.field_aliases = parse_aliases(&text)?;
        Ok(())
    }
}

fn parse_aliases(text: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(ConfigError::AliasesSyntax)?;
    let object = value.as_object().ok_or(ConfigError::AliasesShape)?;
    object
        .iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(v) => Ok((k.clone(), v.clone())),
            _ => Err(ConfigError::AliasesShape),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_section_yields_defaults() {
        let config = CodegenConfig::from_pyproject_str("[tool.black]\nline-length = 100\n")
            .expect("valid toml");
        assert_eq!(config, CodegenConfig::default());
        assert!(config.skip_deprecated);
    }

    #[test]
    fn accepts_kebab_and_snake_keys() {
        let config = CodegenConfig::from_pyproject_str(
            r#"
[tool.datamodel-codegen]
snake-case-field = true
use_standard_collections = true
target-python-version = "3.9"
enum-field-as-literal = "all"
base-class = "my.Base"
unknown-option = 1
"#,
        )
        .expect("valid toml");

        assert!(config.snake_case_field);
        assert!(config.use_standard_collections);
        assert_eq!(config.target_python_version, PythonVersion::Py39);
        assert_eq!(config.enum_field_as_literal, Some(LiteralType::All));
        assert_eq!(config.base_class.as_deref(), Some("my.Base"));
    }

    #[test]
    fn literal_module_depends_on_version() {
        assert_eq!(PythonVersion::Py37.literal_module(), "typing_extensions");
        assert_eq!(PythonVersion::Py38.literal_module(), "typing");
    }

    #[test]
    fn aliases_must_map_strings_to_strings() {
        assert_eq!(
            parse_aliases(r#"{"from": "to"}"#).expect("valid aliases"),
            BTreeMap::from([("from".to_owned(), "to".to_owned())])
        );
        assert!(matches!(parse_aliases("[1]"), Err(ConfigError::AliasesShape)));
        assert!(matches!(parse_aliases(r#"{"a": 1}"#), Err(ConfigError::AliasesShape)));
        assert!(matches!(parse_aliases("{"), Err(ConfigError::AliasesSyntax(_))));
    }

    #[test]
    fn reads_aliases_relative_to_pyproject() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("aliases.json"), r#"{"id": "pet_id"}"#).expect("write");
        fs::write(
            dir.path().join("pyproject.toml"),
            "[tool.datamodel-codegen]\naliases = \"aliases.json\"\n",
        )
        .expect("write");

        let config =
            CodegenConfig::from_pyproject(&dir.path().join("pyproject.toml")).expect("config");

        assert_eq!(config.field_aliases.get("id").map(String::as_str), Some("pet_id"));
    }
}
