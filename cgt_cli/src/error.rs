use cgt_core::TemplateError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
pub enum CliError {
	#[error("failed to read `{path}`: {reason}")]
	#[diagnostic(code(cgt::io))]
	Io { path: String, reason: String },

	#[error("failed to write `{path}`: {reason}")]
	#[diagnostic(code(cgt::write))]
	Write { path: String, reason: String },

	#[error("failed to parse config file `{path}`: {reason}")]
	#[diagnostic(
		code(cgt::config_parse),
		help("check that cgt.toml is valid TOML with [values], [data] and/or [wrap] sections")
	)]
	ConfigParse { path: String, reason: String },

	#[error("failed to load data file `{path}`: {reason}")]
	#[diagnostic(code(cgt::data_file))]
	DataFile { path: String, reason: String },

	#[error("unsupported data file format: `{0}`")]
	#[diagnostic(
		code(cgt::unsupported_format),
		help("supported formats: json, toml, yaml, yml")
	)]
	UnsupportedDataFormat(String),

	#[error("float value `{value}` in `{path}` cannot be represented")]
	#[diagnostic(code(cgt::unconvertible_float))]
	UnconvertibleFloat { path: String, value: String },

	#[error("`{path}` is out of date")]
	#[diagnostic(
		code(cgt::stale_output),
		help("run `cgt expand` with `--output` to regenerate it")
	)]
	StaleOutput { path: String },

	#[error("failed to expand `{path}`")]
	#[diagnostic(code(cgt::expand))]
	Template {
		path: String,
		#[source]
		#[diagnostic_source]
		source: TemplateError,
	},
}

pub type CliResult<T> = Result<T, CliError>;
