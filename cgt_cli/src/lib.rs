use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

pub use config::*;
pub use error::*;

mod config;
#[allow(unused_assignments)]
mod error;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Expand line-oriented templates into generated source code.",
	long_about = "cgt expands code generation templates. Templates are plain text with \
	              `[[[...]]]` directives for values, conditionals, assignments, and column \
	              alignment.\n\nValues come from `cgt.toml`, from JSON, TOML, or YAML data files, \
	              and from `--set key=value` on the command line.\n\nQuick start:\n  cgt expand \
	              template.c.in --values values.json\n  cgt check template.c.in --expected \
	              generated.c\n  cgt wrap --width 40 a b c"
)]
pub struct CgtCli {
	#[command(subcommand)]
	pub command: Commands,

	/// Path to a config file. Defaults to the first of `cgt.toml`,
	/// `.cgt.toml`, or `.config/cgt.toml` found in the current directory.
	#[arg(long, short, global = true)]
	pub config: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

/// Options shared by every command that expands a template.
#[derive(Debug, Clone, clap::Args)]
pub struct ValueArgs {
	/// Additional data files (JSON, TOML, or YAML). Later files override
	/// earlier ones and the config file.
	#[arg(long = "values", value_name = "FILE")]
	pub values: Vec<PathBuf>,

	/// Assign a value, as if by `[[[SET key=value]]]` before the template.
	/// Applied after every data file.
	#[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
	pub set: Vec<(String, String)>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Expand a template and print the result.
	///
	/// Values are merged from the config file, its data files, `--values`
	/// files, and `--set` assignments, in that order.
	Expand {
		/// The template file.
		template: PathBuf,

		#[command(flatten)]
		values: ValueArgs,

		/// Write the output to this file instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// Check that a generated file matches its template.
	///
	/// Expands the template and compares the result with the expected file.
	/// Exits with status 1 when the file is out of date. Ideal for CI
	/// pipelines that commit generated code.
	Check {
		/// The template file.
		template: PathBuf,

		/// The previously generated file.
		#[arg(long)]
		expected: PathBuf,

		#[command(flatten)]
		values: ValueArgs,

		/// Show a unified diff between the expected file and the fresh
		/// expansion.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// Join words into width-bounded lines.
	///
	/// Words are taken from the arguments or, when none are given, read from
	/// stdin split on whitespace. Defaults come from the `[wrap]` section of
	/// the config file.
	Wrap {
		/// The words to join.
		words: Vec<String>,

		/// Maximum line width.
		#[arg(long)]
		width: Option<usize>,

		/// Placed between two words on the same line.
		#[arg(long)]
		separator: Option<String>,

		/// Appended to a line when the next word wraps.
		#[arg(long)]
		newline_separator: Option<String>,

		/// Placed before the first word.
		#[arg(long)]
		first_separator: Option<String>,
	},
	/// Print the token stream of a template, one token per line.
	Tokens {
		/// The template file.
		template: PathBuf,
	},
}

/// Parse a `key=value` command line assignment.
pub fn parse_assignment(text: &str) -> Result<(String, String), String> {
	match text.split_once('=') {
		Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
		_ => Err(format!("expected KEY=VALUE, got `{text}`")),
	}
}
