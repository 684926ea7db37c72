use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use cgt_cli::CgtCli;
use cgt_cli::CgtConfig;
use cgt_cli::CliError;
use cgt_cli::CliResult;
use cgt_cli::Commands;
use cgt_cli::LoadedConfig;
use cgt_cli::ValueArgs;
use cgt_cli::load_data_file;
use cgt_cli::read_file;
use cgt_core::MapResolver;
use cgt_core::Resolver;
use cgt_core::join;
use cgt_core::tokenize;
use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = CgtCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Commands::Expand {
			template,
			values,
			output,
		} => run_expand(&args, template, values, output.as_deref()).map(|()| true),
		Commands::Check {
			template,
			expected,
			values,
			diff,
		} => run_check(&args, template, expected, values, *diff),
		Commands::Wrap {
			words,
			width,
			separator,
			newline_separator,
			first_separator,
		} => {
			run_wrap(
				&args,
				words,
				*width,
				separator.as_deref(),
				newline_separator.as_deref(),
				first_separator.as_deref(),
			)
			.map(|()| true)
		}
		Commands::Tokens { template } => run_tokens(template).map(|()| true),
	};

	match result {
		Ok(true) => {}
		Ok(false) => process::exit(1),
		Err(error) => {
			let report: miette::Report = error.into();
			eprintln!("{report:?}");
			process::exit(2);
		}
	}
}

/// Logs go to stderr so generated output on stdout stays clean.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.try_init()
		.ok();
}

fn load_config(args: &CgtCli) -> CliResult<LoadedConfig> {
	let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
	CgtConfig::load(args.config.as_deref(), &cwd)
}

/// Build the resolver for a template: config data files, config values,
/// `--values` files, then `--set` assignments.
fn build_resolver(args: &CgtCli, values: &ValueArgs) -> CliResult<MapResolver> {
	let config = load_config(args)?;
	let mut resolver = MapResolver::from(config.load_values()?);

	for file in &values.values {
		resolver.extend(load_data_file(file)?);
	}

	for (key, value) in &values.set {
		resolver.assign(key, value).map_err(|source| {
			CliError::Template {
				path: "--set".to_string(),
				source,
			}
		})?;
	}

	let mut keys: Vec<_> = resolver.keys().collect();
	keys.sort();
	tracing::debug!(count = keys.len(), ?keys, "values loaded");

	Ok(resolver)
}

fn expand_file(template: &Path, resolver: &mut MapResolver) -> CliResult<String> {
	let source = read_file(template)?;
	cgt_core::expand_to_string(&source, resolver).map_err(|source| {
		CliError::Template {
			path: template.display().to_string(),
			source,
		}
	})
}

fn with_trailing_newline(mut text: String) -> String {
	if !text.ends_with('\n') {
		text.push('\n');
	}
	text
}

fn run_expand(
	args: &CgtCli,
	template: &Path,
	values: &ValueArgs,
	output: Option<&Path>,
) -> CliResult<()> {
	let mut resolver = build_resolver(args, values)?;
	let text = expand_file(template, &mut resolver)?;

	match output {
		Some(path) => {
			std::fs::write(path, &text).map_err(|e| {
				CliError::Write {
					path: path.display().to_string(),
					reason: e.to_string(),
				}
			})?;
			if args.verbose {
				eprintln!("Wrote {}", path.display());
			}
		}
		None => print!("{}", with_trailing_newline(text)),
	}

	Ok(())
}

/// Returns `false` when the expected file is out of date.
fn run_check(
	args: &CgtCli,
	template: &Path,
	expected: &Path,
	values: &ValueArgs,
	show_diff: bool,
) -> CliResult<bool> {
	let mut resolver = build_resolver(args, values)?;
	let fresh = expand_file(template, &mut resolver)?;
	let current = read_file(expected)?;

	let fresh = with_trailing_newline(fresh);

	// A generated file may lack the final newline.
	if current == fresh || format!("{current}\n") == fresh {
		println!("Check passed: {} is up to date.", expected.display());
		return Ok(true);
	}

	let report: miette::Report = CliError::StaleOutput {
		path: expected.display().to_string(),
	}
	.into();
	eprintln!("{report:?}");

	if show_diff {
		print_diff(&current, &fresh);
	}

	Ok(false)
}

fn run_wrap(
	args: &CgtCli,
	words: &[String],
	width: Option<usize>,
	separator: Option<&str>,
	newline_separator: Option<&str>,
	first_separator: Option<&str>,
) -> CliResult<()> {
	let mut wrap = load_config(args)?.config.wrap;
	if let Some(width) = width {
		wrap.width = width;
	}
	if let Some(separator) = separator {
		wrap.separator = separator.to_string();
	}
	if let Some(newline_separator) = newline_separator {
		wrap.newline_separator = newline_separator.to_string();
	}
	if let Some(first_separator) = first_separator {
		wrap.first_separator = first_separator.to_string();
	}

	let words = if words.is_empty() {
		let mut input = String::new();
		std::io::stdin()
			.read_to_string(&mut input)
			.map_err(|e| {
				CliError::Io {
					path: "<stdin>".to_string(),
					reason: e.to_string(),
				}
			})?;
		input.split_whitespace().map(ToString::to_string).collect()
	} else {
		words.to_vec()
	};

	let separators = wrap.separators();
	for line in join(&words, wrap.width, &separators, &separators) {
		println!("{line}");
	}

	Ok(())
}

fn run_tokens(template: &Path) -> CliResult<()> {
	let source = read_file(template)?;

	for (index, token) in tokenize(&source).enumerate() {
		let token = token.map_err(|source| {
			CliError::Template {
				path: template.display().to_string(),
				source,
			}
		})?;
		println!("{:>4} {token:?}", colored!(index, dimmed));
	}

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}
