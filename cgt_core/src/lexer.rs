use std::collections::VecDeque;

use logos::Logos;

use crate::TemplateError;
use crate::TemplateResult;
use crate::tokens::Token;

pub const DIRECTIVE_OPEN: &str = "[[[";
pub const DIRECTIVE_CLOSE: &str = "]]]";

/// Raw tokens produced by logos for flat tokenization of template text.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("[[[")]
	DirectiveOpen,
	#[token("]]]")]
	DirectiveClose,
	#[token("\n")]
	Newline,
	#[token("[")]
	#[token("]")]
	#[regex(r"[^\[\]\n]+")]
	Text,
}

/// Lazy token stream over a template. Lines are scanned one at a time, so a
/// malformed directive is only reported once the lines before it have been
/// consumed. After an error the stream is exhausted.
pub struct Tokens<'a> {
	/// The full template text.
	source: &'a str,
	/// The underlying logos stream.
	raw: logos::SpannedIter<'a, RawToken>,
	/// Tokens of the current line that haven't been handed out yet.
	pending: VecDeque<TemplateResult<Token>>,
	/// Set once the end of input or an error has been reached.
	finished: bool,
}

impl<'a> Tokens<'a> {
	fn new(source: &'a str) -> Self {
		Self {
			source,
			raw: RawToken::lexer(source).spanned(),
			pending: VecDeque::new(),
			finished: false,
		}
	}

	/// Scan one physical line into `pending`.
	fn scan_line(&mut self) {
		let mut text_start: Option<usize> = None;
		let mut directive_start: Option<usize> = None;

		loop {
			let Some((raw, span)) = self.raw.next() else {
				self.finished = true;
				if directive_start.is_some() {
					self.push_unclosed_directive();
				} else {
					self.push_text(text_start, self.source.len());
					self.pending.push_back(Ok(Token::Newline));
				}
				return;
			};

			match directive_start {
				None => {
					match raw {
						Ok(RawToken::DirectiveOpen) => {
							self.push_text(text_start.take(), span.start);
							directive_start = Some(span.end);
						}
						Ok(RawToken::Newline) => {
							self.push_text(text_start, span.start);
							self.pending.push_back(Ok(Token::Newline));
							return;
						}
						// Stray closing markers and brackets are plain text.
						_ => {
							text_start.get_or_insert(span.start);
						}
					}
				}
				Some(start) => {
					match raw {
						Ok(RawToken::DirectiveClose) => {
							let content = &self.source[start..span.start];
							self.pending.push_back(classify(content));
							directive_start = None;
						}
						Ok(RawToken::Newline) => {
							self.finished = true;
							self.push_unclosed_directive();
							return;
						}
						_ => {}
					}
				}
			}
		}
	}

	fn push_text(&mut self, start: Option<usize>, end: usize) {
		if let Some(start) = start {
			if start < end {
				self.pending
					.push_back(Ok(Token::Text(self.source[start..end].to_string())));
			}
		}
	}

	fn push_unclosed_directive(&mut self) {
		self.pending
			.push_back(Err(TemplateError::MalformedDirective(format!(
				"{DIRECTIVE_OPEN} not followed by {DIRECTIVE_CLOSE} on the same line."
			))));
	}
}

impl Iterator for Tokens<'_> {
	type Item = TemplateResult<Token>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.pending.is_empty() && !self.finished {
			self.scan_line();
		}

		let next = self.pending.pop_front()?;
		if next.is_err() {
			self.pending.clear();
			self.finished = true;
		}

		Some(next)
	}
}

impl std::iter::FusedIterator for Tokens<'_> {}

/// Split a template into its tokens, one line at a time.
pub fn tokenize(template: &str) -> Tokens<'_> {
	Tokens::new(template)
}

/// Classify the content found between `[[[` and `]]]`.
fn classify(content: &str) -> TemplateResult<Token> {
	if let Some(rest) = content.strip_prefix("IF ") {
		let (key, comment) = split_condition("IF", rest)?;
		return Ok(Token::If { key, comment });
	}

	if let Some(rest) = content.strip_prefix("ELIF ") {
		let (key, comment) = split_condition("ELIF", rest)?;
		return Ok(Token::Elif { key, comment });
	}

	let token = match content {
		"|" => Token::Align,
		">" => Token::PushAlign,
		"<" => Token::PopAlign,
		_ if content.starts_with("ELSE") => Token::Else,
		_ if content.starts_with("ENDIF") => Token::Endif,
		_ => {
			match content.strip_prefix("SET ") {
				Some(assignment) => Token::Set(assignment.trim_start().to_string()),
				None => Token::Expand(content.to_string()),
			}
		}
	};

	Ok(token)
}

/// Split `key comment...` into the key and an optional trailing comment.
fn split_condition(keyword: &str, rest: &str) -> TemplateResult<(String, Option<String>)> {
	let rest = rest.trim_start();
	let (key, comment) = match rest.find(char::is_whitespace) {
		Some(index) => (&rest[..index], rest[index..].trim()),
		None => (rest, ""),
	};

	if key.is_empty() {
		return Err(TemplateError::MalformedDirective(format!(
			"{keyword} requires a key."
		)));
	}

	let comment = (!comment.is_empty()).then(|| comment.to_string());
	Ok((key.to_string(), comment))
}
