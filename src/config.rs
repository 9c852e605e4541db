//! Type/include maps and the optional `settings.json` document.
//!
//! Both maps start from built-in defaults; caller entries are merged on top
//! and win on key collision.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ————————————————————————————————————————————————————————————————————————————
// DEFAULTS
// ————————————————————————————————————————————————————————————————————————————

const DEFAULT_TYPE_MAP: [(&str, &str); 7] = [
    ("integer", "int64_t"),
    ("number", "double"),
    ("string", "std::string"),
    ("boolean", "bool"),
    ("array", "std::vector"),
    ("tuple", "std::tuple"),
    ("variant", "std::variant"),
];

const DEFAULT_INCLUDE_MAP: [(&str, &str); 4] = [
    ("std::string", "<string>"),
    ("std::vector", "<vector>"),
    ("std::tuple", "<tuple>"),
    ("std::variant", "<variant>"),
];

pub const DEFAULT_ENUM_HELPER: &str = "enum_conversion.hpp";
pub const DEFAULT_VARIANT_HELPER: &str = "json_utils.hpp";
pub const DEFAULT_OUTPUT_EXTENSION: &str = "model.json";

/// Placeholder replaced by the emitted file path in `formatter_cmd`.
pub const FILE_PLACEHOLDER: &str = "%file%";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Schema type name (`integer`, `array`, `variant`, ...) → target spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMap(IndexMap<String, String>);

/// Target type name → include directive pulled in when the name shows up in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeMap(IndexMap<String, String>);

/// Helper sources the emitter produces when enums or variants are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperSources {
    pub enum_helper: String,
    pub variant_helper: String,
}

/// Everything the core needs for one compile.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub type_map: TypeMap,
    pub include_map: IncludeMap,
    pub helpers: HelperSources,
}

/// On-disk driver settings. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub formatter_cmd: Vec<String>,
    pub type_map: IndexMap<String, String>,
    pub include_map: IndexMap<String, String>,
    pub enum_helper: Option<String>,
    pub variant_helper: Option<String>,
    pub output_extension: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for TypeMap {
    fn default() -> Self {
        Self(
            DEFAULT_TYPE_MAP
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl TypeMap {
    /// Defaults with `overrides` merged on top.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut out = Self::default();
        for (k, v) in overrides {
            out.0.insert(k.into(), v.into());
        }
        out
    }
    pub fn get(&self, type_name: &str) -> Option<&str> {
        self.0.get(type_name).map(|s| s.as_str())
    }
}

impl Default for IncludeMap {
    fn default() -> Self {
        Self(
            DEFAULT_INCLUDE_MAP
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl IncludeMap {
    /// Defaults with `overrides` merged on top.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut out = Self::default();
        for (k, v) in overrides {
            out.0.insert(k.into(), v.into());
        }
        out
    }

    /// Includes whose target type name occurs anywhere in `descriptor`.
    ///
    /// Plain substring matching: `std::string_view` also pulls in `<string>`.
    pub fn matching<'a>(&'a self, descriptor: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(type_name, _)| descriptor.contains(type_name.as_str()))
            .map(|(_, include)| include.as_str())
    }
}

impl Default for HelperSources {
    fn default() -> Self {
        Self {
            enum_helper: DEFAULT_ENUM_HELPER.to_string(),
            variant_helper: DEFAULT_VARIANT_HELPER.to_string(),
        }
    }
}

impl HelperSources {
    pub fn enum_include(&self) -> String {
        format!("\"{}\"", self.enum_helper)
    }
    pub fn variant_include(&self) -> String {
        format!("\"{}\"", self.variant_helper)
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields defaults; a document
    /// that is valid JSON but not an object is ignored.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let value = serde_json::from_str::<serde_json::Value>(&source)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?;
        if !value.is_object() {
            log::warn!("settings file {} is not a JSON object, ignoring it", path.display());
            return Ok(Self::default());
        }
        crate::path_de::from_str_with_path::<Self>(&source)
            .map_err(|error| anyhow::anyhow!("invalid settings file {}: {error}", path.display()))
    }

    pub fn compile_options(&self) -> CompileOptions {
        let defaults = HelperSources::default();
        CompileOptions {
            type_map: TypeMap::with_overrides(self.type_map.clone()),
            include_map: IncludeMap::with_overrides(self.include_map.clone()),
            helpers: HelperSources {
                enum_helper: self.enum_helper.clone().unwrap_or(defaults.enum_helper),
                variant_helper: self.variant_helper.clone().unwrap_or(defaults.variant_helper),
            },
        }
    }

    pub fn output_extension(&self) -> &str {
        self.output_extension.as_deref().unwrap_or(DEFAULT_OUTPUT_EXTENSION)
    }

    /// `formatter_cmd` with every `%file%` replaced by `file`. Empty when no formatter is set.
    pub fn formatter_command_for(&self, file: &Path) -> Vec<String> {
        let file = file.to_string_lossy();
        self.formatter_cmd
            .iter()
            .map(|part| part.replace(FILE_PLACEHOLDER, &file))
            .collect()
    }

    /// Emitted file name for a schema: its stem (without `.json`) plus the output extension.
    pub fn output_path_for(&self, schema_path: &Path, out_dir: &Path) -> PathBuf {
        let file_name = schema_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = match file_name.rsplit_once(".json") {
            Some((stem, _)) => stem.to_string(),
            None => file_name,
        };
        out_dir.join(format!("{stem}.{}", self.output_extension()))
    }
}
