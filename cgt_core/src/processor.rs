use crate::Context;
use crate::Resolver;
use crate::TemplateError;
use crate::TemplateResult;
use crate::Value;
use crate::lexer::tokenize;
use crate::resolver::split_key;
use crate::tokens::Token;
use crate::value::is_truthy;

/// State of one level in the `IF`/`ELIF`/`ELSE`/`ENDIF` nesting stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
	/// Text and directives in this branch are emitted.
	Active,
	/// The condition was false; a later `ELIF` or `ELSE` may still activate
	/// the block.
	Inactive,
	/// A branch already fired, or the enclosing scope isn't active. Nothing
	/// in the rest of the block is evaluated.
	Done,
}

/// Completed output lines plus the line currently being built.
#[derive(Debug, Default)]
struct OutputBuffer {
	lines: Vec<String>,
	/// Fragments of the in-progress line.
	current: Vec<String>,
	/// Always the character width of `current`.
	column: usize,
}

impl OutputBuffer {
	/// Append a fragment that contains no line breaks.
	fn push_fragment(&mut self, fragment: String) {
		self.column += text_width(&fragment);
		self.current.push(fragment);
	}

	/// Append text, starting a new line at every `\n`.
	fn add_text(&mut self, text: &str) {
		let mut segments = text.split('\n');
		if let Some(first) = segments.next() {
			self.push_fragment(first.to_string());
		}

		for segment in segments {
			self.finish_line(false);
			self.push_fragment(segment.to_string());
		}
	}

	/// Splice a sequence of lines, aligning every line after the first with
	/// the column the splice started at.
	fn add_lines(&mut self, lines: &[String]) {
		let Some((first, rest)) = lines.split_first() else {
			return;
		};

		let Some((last, interior)) = rest.split_last() else {
			self.add_text(first);
			return;
		};

		let alignment = self.alignment();
		self.add_text(first);
		self.finish_line(false);

		for line in interior {
			if line.is_empty() {
				self.lines.push(String::new());
			} else {
				self.lines.push(format!("{alignment}{line}"));
			}
		}

		self.add_text(&format!("{alignment}{last}"));
	}

	/// Move the in-progress line to the completed lines.
	fn finish_line(&mut self, trim_end: bool) {
		let line = self.current.concat();
		let line = if trim_end {
			line.trim_end().to_string()
		} else {
			line
		};

		self.lines.push(line);
		self.discard_line();
	}

	fn discard_line(&mut self) {
		self.current.clear();
		self.column = 0;
	}

	/// Whether the in-progress line is empty or whitespace only.
	fn is_blank(&self) -> bool {
		self.current
			.iter()
			.all(|fragment| fragment.trim().is_empty())
	}

	/// The leading spaces and tabs of the in-progress line.
	fn indentation(&self) -> String {
		self.current
			.iter()
			.flat_map(|fragment| fragment.chars())
			.take_while(|ch| matches!(ch, ' ' | '\t'))
			.collect()
	}

	/// The indentation padded with spaces out to the current column.
	fn alignment(&self) -> String {
		let indentation = self.indentation();
		let padding = self.column.saturating_sub(text_width(&indentation));
		format!("{indentation}{}", " ".repeat(padding))
	}

	fn context(&self) -> Context {
		Context::new(self.indentation(), self.column)
	}
}

fn text_width(text: &str) -> usize {
	text.chars().count()
}

/// Interprets the token stream of one template against a resolver.
///
/// A processor is single use: [`TemplateProcessor::run`] consumes it and
/// returns either every output line or the first error, wrapped with the
/// 1-based template line it occurred on.
pub struct TemplateProcessor<'t, 'r, R: Resolver + ?Sized> {
	template: &'t str,
	resolver: &'r mut R,
	output: OutputBuffer,
	/// Never empty; the first entry is the implicit top level scope.
	scopes: Vec<Scope>,
	alignments: Vec<String>,
	line_no: usize,
}

impl<'t, 'r, R: Resolver + ?Sized> TemplateProcessor<'t, 'r, R> {
	pub fn new(template: &'t str, resolver: &'r mut R) -> Self {
		Self {
			template,
			resolver,
			output: OutputBuffer::default(),
			scopes: vec![Scope::Active],
			alignments: Vec::new(),
			line_no: 1,
		}
	}

	pub fn run(mut self) -> TemplateResult<Vec<String>> {
		match self.process_tokens() {
			Ok(()) => {
				tracing::debug!(lines = self.output.lines.len(), "template expanded");
				Ok(self.output.lines)
			}
			Err(error) => {
				Err(TemplateError::AtLine {
					line: self.line_no,
					source: Box::new(error),
				})
			}
		}
	}

	fn process_tokens(&mut self) -> TemplateResult<()> {
		let mut swallow_newline = false;

		for token in tokenize(self.template) {
			let token = token?;

			if swallow_newline && token == Token::Newline {
				if self.output.is_blank() {
					self.output.discard_line();
				}
				self.line_no += 1;
				swallow_newline = false;
				continue;
			}

			// Whitespace after a directive doesn't stop its line from being
			// swallowed.
			let keep_swallowing =
				swallow_newline && matches!(&token, Token::Text(text) if text.trim().is_empty());
			swallow_newline = self.process_token(token)? || keep_swallowing;
		}

		if self.scopes.len() != 1 {
			// The final newline has already advanced past the last line.
			self.line_no = self.line_no.saturating_sub(1).max(1);
			return Err(TemplateError::DanglingIf(self.scopes.len() - 1));
		}

		Ok(())
	}

	/// Handle one token. Returns true when the newline ending the current
	/// line should be swallowed.
	fn process_token(&mut self, token: Token) -> TemplateResult<bool> {
		match token {
			Token::Newline => {
				self.handle_newline();
				return Ok(false);
			}
			Token::If { key, .. } => self.handle_if(&key)?,
			Token::Endif => self.handle_endif()?,
			Token::Elif { key, .. } => self.handle_elif(&key)?,
			Token::Else => self.handle_else()?,
			_ if self.current_scope() != Scope::Active => return Ok(false),
			Token::Text(text) => {
				self.output.add_text(&text);
				return Ok(false);
			}
			Token::Expand(key) => {
				if self.handle_expand(&key)? {
					return Ok(false);
				}
			}
			Token::Set(assignment) => self.handle_set(&assignment)?,
			Token::PushAlign => {
				self.alignments.push(self.output.alignment());
				return Ok(false);
			}
			Token::Align => {
				self.align()?;
				return Ok(false);
			}
			Token::PopAlign => {
				self.alignments
					.pop()
					.ok_or(TemplateError::UnbalancedAlignment("[[[<]]]"))?;
				return Ok(false);
			}
		}

		Ok(self.output.is_blank())
	}

	fn current_scope(&self) -> Scope {
		self.scopes.last().copied().unwrap_or(Scope::Active)
	}

	fn handle_newline(&mut self) {
		self.line_no += 1;
		if self.current_scope() != Scope::Active {
			return;
		}
		self.output.finish_line(true);
	}

	fn handle_if(&mut self, key: &str) -> TemplateResult<()> {
		let scope = if self.current_scope() == Scope::Active {
			if is_truthy(self.resolve(key)?.as_ref()) {
				Scope::Active
			} else {
				Scope::Inactive
			}
		} else {
			Scope::Done
		};

		tracing::trace!(key, ?scope, depth = self.scopes.len(), "IF");
		self.scopes.push(scope);
		Ok(())
	}

	fn handle_endif(&mut self) -> TemplateResult<()> {
		if self.scopes.len() == 1 {
			return Err(TemplateError::UnmatchedEndif);
		}
		self.scopes.pop();
		Ok(())
	}

	fn handle_elif(&mut self, key: &str) -> TemplateResult<()> {
		if self.scopes.len() == 1 {
			return Err(TemplateError::MisplacedElif);
		}

		match self.current_scope() {
			Scope::Active => self.set_current_scope(Scope::Done),
			Scope::Inactive => {
				if is_truthy(self.resolve(key)?.as_ref()) {
					self.set_current_scope(Scope::Active);
				}
			}
			Scope::Done => {}
		}

		Ok(())
	}

	fn handle_else(&mut self) -> TemplateResult<()> {
		if self.scopes.len() == 1 {
			return Err(TemplateError::MisplacedElse);
		}

		match self.current_scope() {
			Scope::Active => self.set_current_scope(Scope::Done),
			Scope::Inactive => self.set_current_scope(Scope::Active),
			Scope::Done => {}
		}

		Ok(())
	}

	fn set_current_scope(&mut self, scope: Scope) {
		if let Some(current) = self.scopes.last_mut() {
			*current = scope;
		}
	}

	/// Expand a directive into the output. Returns whether anything was
	/// added.
	fn handle_expand(&mut self, key: &str) -> TemplateResult<bool> {
		let Some(value) = self.resolve(key)? else {
			return Ok(false);
		};

		if value.is_empty() {
			return Ok(false);
		}

		match value {
			Value::Text(text) => self.output.add_text(&text),
			Value::Lines(lines) => self.output.add_lines(&lines),
			other => self.output.add_text(&other.to_string()),
		}

		Ok(true)
	}

	fn handle_set(&mut self, assignment: &str) -> TemplateResult<()> {
		let Some((identifier, value)) = assignment.split_once('=') else {
			return Err(TemplateError::InvalidSet(assignment.to_string()));
		};

		if identifier.is_empty() {
			return Err(TemplateError::InvalidSet(assignment.to_string()));
		}

		tracing::trace!(identifier, "SET");
		self.resolver.assign(identifier, value)
	}

	fn align(&mut self) -> TemplateResult<()> {
		let alignment = self
			.alignments
			.last()
			.ok_or(TemplateError::UnbalancedAlignment("[[[|]]]"))?;
		let padding: String = alignment.chars().skip(self.output.column).collect();

		if !padding.is_empty() {
			self.output.push_fragment(padding);
		}

		Ok(())
	}

	fn resolve(&mut self, key: &str) -> TemplateResult<Option<Value>> {
		let (key, params) = split_key(key)?;
		let context = self.output.context();
		self.resolver.resolve(key, &params, &context)
	}
}

/// Expand `template` against `resolver` and return the output lines.
///
/// Any error aborts the whole expansion; the error is wrapped in
/// [`TemplateError::AtLine`] with the template line it was raised on.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = template.len()))]
pub fn expand<R: Resolver + ?Sized>(template: &str, resolver: &mut R) -> TemplateResult<Vec<String>> {
	TemplateProcessor::new(template, resolver).run()
}

/// Like [`expand`], joining the output lines with `\n`.
pub fn expand_to_string<R: Resolver + ?Sized>(
	template: &str,
	resolver: &mut R,
) -> TemplateResult<String> {
	Ok(expand(template, resolver)?.join("\n"))
}
