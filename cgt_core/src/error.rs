use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TemplateError {
	#[error("{0}")]
	#[diagnostic(
		code(cgt::malformed_directive),
		help("directives must open with `[[[` and close with `]]]` on the same line")
	)]
	MalformedDirective(String),

	#[error("ENDIF must be preceded by IF")]
	#[diagnostic(code(cgt::unmatched_endif))]
	UnmatchedEndif,

	#[error("ELIF must be preceded by IF")]
	#[diagnostic(code(cgt::misplaced_elif))]
	MisplacedElif,

	#[error("ELSE must be preceded by IF")]
	#[diagnostic(code(cgt::misplaced_else))]
	MisplacedElse,

	#[error("Number of IFs without closing ENDIFs: {0}")]
	#[diagnostic(
		code(cgt::dangling_if),
		help("close every `[[[IF key]]]` with a matching `[[[ENDIF]]]`")
	)]
	DanglingIf(usize),

	#[error("\"SET {0}\": invalid format for SET. Correct format is \"SET identifier=value\".")]
	#[diagnostic(code(cgt::invalid_set))]
	InvalidSet(String),

	#[error("No closing parenthesis: {0}")]
	#[diagnostic(
		code(cgt::unclosed_parameter_list),
		help("parameter lists are written as `[[[name(a, b)]]]`")
	)]
	UnclosedParameterList(String),

	#[error("unknown key: `{0}`")]
	#[diagnostic(code(cgt::unknown_key))]
	UnknownKey(String),

	#[error("`{0}` used without a matching `[[[>]]]`")]
	#[diagnostic(code(cgt::unbalanced_alignment))]
	UnbalancedAlignment(&'static str),

	#[error("{0}")]
	#[diagnostic(code(cgt::resolver))]
	Resolver(String),

	#[error("[line {line}]: {source}")]
	#[diagnostic(code(cgt::template))]
	AtLine {
		line: usize,
		#[source]
		source: Box<TemplateError>,
	},
}

impl TemplateError {
	/// The innermost error, skipping any line-number wrappers.
	pub fn root(&self) -> &TemplateError {
		match self {
			Self::AtLine { source, .. } => source.root(),
			other => other,
		}
	}

	/// The 1-based template line attached by the interpreter, if any.
	pub fn line(&self) -> Option<usize> {
		match self {
			Self::AtLine { line, .. } => Some(*line),
			_ => None,
		}
	}
}

pub type TemplateResult<T> = Result<T, TemplateError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
