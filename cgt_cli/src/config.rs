use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use cgt_core::Separators;
use cgt_core::Value;
use serde::Deserialize;

use crate::CliError;
use crate::CliResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["cgt.toml", ".cgt.toml", ".config/cgt.toml"];

/// Configuration loaded from a `cgt.toml` file.
///
/// ```toml
/// [values]
/// project = "demo"
/// hasArgs = true
///
/// [data]
/// files = ["values.json", "extra.yaml"]
///
/// [wrap]
/// width = 72
/// separator = ", "
/// newline_separator = ","
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CgtConfig {
	/// Values available to every template.
	#[serde(default)]
	pub values: HashMap<String, Value>,
	/// Data files merged before `values`.
	#[serde(default)]
	pub data: DataConfig,
	/// Defaults for `cgt wrap`.
	#[serde(default)]
	pub wrap: WrapConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
	/// Paths relative to the directory holding the config file, merged in
	/// order.
	#[serde(default)]
	pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WrapConfig {
	pub width: usize,
	pub separator: String,
	pub newline_separator: String,
	pub first_separator: String,
}

impl Default for WrapConfig {
	fn default() -> Self {
		Self {
			width: 80,
			separator: " ".to_string(),
			newline_separator: String::new(),
			first_separator: String::new(),
		}
	}
}

impl WrapConfig {
	pub fn separators(&self) -> Separators {
		Separators::new(self.separator.as_str())
			.with_newline_separator(self.newline_separator.as_str())
			.with_first_separator(self.first_separator.as_str())
	}
}

/// A config together with the directory its relative paths resolve against.
#[derive(Debug, Default)]
pub struct LoadedConfig {
	pub path: Option<PathBuf>,
	pub root: PathBuf,
	pub config: CgtConfig,
}

impl LoadedConfig {
	/// Merge the config's data files and inline values, later entries
	/// overriding earlier ones.
	pub fn load_values(&self) -> CliResult<HashMap<String, Value>> {
		let mut values = HashMap::new();

		for file in &self.config.data.files {
			values.extend(load_data_file(&self.root.join(file))?);
		}

		values.extend(
			self.config
				.values
				.iter()
				.map(|(key, value)| (key.clone(), value.clone())),
		);

		Ok(values)
	}
}

impl CgtConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Parse the config file at `path`.
	pub fn from_file(path: &Path) -> CliResult<CgtConfig> {
		let content = read_file(path)?;
		toml::from_str(&content).map_err(|e| {
			CliError::ConfigParse {
				path: path.display().to_string(),
				reason: e.to_string(),
			}
		})
	}

	/// Load an explicit config file, or the first discovered candidate in
	/// `root`. Without either, the default config is used.
	pub fn load(explicit: Option<&Path>, root: &Path) -> CliResult<LoadedConfig> {
		let path = match explicit {
			Some(path) => Some(path.to_path_buf()),
			None => Self::resolve_path(root),
		};

		let Some(path) = path else {
			tracing::debug!(root = %root.display(), "no config file found");
			return Ok(LoadedConfig {
				path: None,
				root: root.to_path_buf(),
				config: CgtConfig::default(),
			});
		};

		tracing::debug!(path = %path.display(), "loading config");
		let config = Self::from_file(&path)?;

		// `.config/cgt.toml` still resolves data files against the project
		// root.
		let config_dir = path.parent().unwrap_or(root);
		let root = if config_dir.file_name().is_some_and(|name| name == ".config") {
			config_dir.parent().unwrap_or(root).to_path_buf()
		} else {
			config_dir.to_path_buf()
		};

		Ok(LoadedConfig {
			path: Some(path),
			root,
			config,
		})
	}
}

/// Read a file, reporting the path on failure.
pub fn read_file(path: &Path) -> CliResult<String> {
	std::fs::read_to_string(path).map_err(|e| {
		CliError::Io {
			path: path.display().to_string(),
			reason: e.to_string(),
		}
	})
}

/// Load a JSON, TOML, or YAML data file. The format is chosen by extension
/// and the top level must be a table.
pub fn load_data_file(path: &Path) -> CliResult<HashMap<String, Value>> {
	let content = read_file(path)?;
	let format = path
		.extension()
		.and_then(|e| e.to_str())
		.unwrap_or("")
		.to_ascii_lowercase();
	let path_display = path.display().to_string();

	tracing::debug!(path = %path_display, format = %format, "loading data file");
	let data = parse_data_file(&content, &format, &path_display)?;

	let serde_json::Value::Object(entries) = data else {
		return Err(CliError::DataFile {
			path: path_display,
			reason: "the top level must be a table".to_string(),
		});
	};

	Ok(entries
		.into_iter()
		.map(|(key, value)| (key, json_to_value(value)))
		.collect())
}

/// Parse a data file's content into a `serde_json::Value` based on its
/// format.
fn parse_data_file(
	content: &str,
	format: &str,
	path_display: &str,
) -> CliResult<serde_json::Value> {
	match format {
		"json" => {
			serde_json::from_str(content).map_err(|e| {
				CliError::DataFile {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})
		}
		"toml" => {
			let toml_value: toml::Value = toml::from_str(content).map_err(|e| {
				CliError::DataFile {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})?;
			toml_to_json(toml_value, path_display)
		}
		"yaml" | "yml" => {
			serde_yaml_ng::from_str(content).map_err(|e| {
				CliError::DataFile {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})
		}
		other => Err(CliError::UnsupportedDataFormat(other.to_string())),
	}
}

/// Convert a `toml::Value` to a `serde_json::Value`.
fn toml_to_json(value: toml::Value, path_display: &str) -> CliResult<serde_json::Value> {
	let json = match value {
		toml::Value::String(s) => serde_json::Value::String(s),
		toml::Value::Integer(i) => serde_json::Value::from(i),
		toml::Value::Float(f) => {
			serde_json::Value::Number(serde_json::Number::from_f64(f).ok_or_else(|| {
				CliError::UnconvertibleFloat {
					path: path_display.to_string(),
					value: f.to_string(),
				}
			})?)
		}
		toml::Value::Boolean(b) => serde_json::Value::Bool(b),
		toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
		toml::Value::Array(arr) => {
			let items: CliResult<Vec<serde_json::Value>> = arr
				.into_iter()
				.map(|v| toml_to_json(v, path_display))
				.collect();
			serde_json::Value::Array(items?)
		}
		toml::Value::Table(table) => {
			let mut map = serde_json::Map::new();
			for (k, v) in table {
				map.insert(k, toml_to_json(v, path_display)?);
			}
			serde_json::Value::Object(map)
		}
	};

	Ok(json)
}

/// Map a data file entry onto a template value. `null` becomes empty text,
/// arrays become lines, and nested tables are kept as JSON text.
fn json_to_value(value: serde_json::Value) -> Value {
	match value {
		serde_json::Value::Null => Value::Text(String::new()),
		serde_json::Value::Bool(b) => Value::Bool(b),
		serde_json::Value::Number(number) => {
			match number.as_i64() {
				Some(i) => Value::Int(i),
				None => Value::Float(number.as_f64().unwrap_or_default()),
			}
		}
		serde_json::Value::String(s) => Value::Text(s),
		serde_json::Value::Array(items) => {
			Value::Lines(
				items
					.into_iter()
					.map(|item| {
						match item {
							serde_json::Value::String(s) => s,
							other => other.to_string(),
						}
					})
					.collect(),
			)
		}
		object @ serde_json::Value::Object(_) => Value::Text(object.to_string()),
	}
}
