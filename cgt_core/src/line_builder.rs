//! Greedy line wrapping for generated value lists.
//!
//! ```rust
//! use cgt_core::Separators;
//! use cgt_core::join;
//!
//! let separators = Separators::new(" ").with_newline_separator(",");
//! let lines = join(["aa", "bb", "cc"], 5, &separators, &separators);
//! assert_eq!(lines, vec!["aa,", "bb cc"]);
//! ```

/// Separators used when appending a word to a [`LineBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separators {
	/// Placed between two words on the same line.
	pub separator: String,
	/// Appended to a line when the next word has to wrap.
	pub newline_separator: String,
	/// Placed before a word that starts a fresh builder or a line opened with
	/// [`LineBuilder::newline`].
	pub first_separator: String,
}

impl Default for Separators {
	fn default() -> Self {
		Self::new(" ")
	}
}

impl Separators {
	pub fn new(separator: impl Into<String>) -> Self {
		Self {
			separator: separator.into(),
			newline_separator: String::new(),
			first_separator: String::new(),
		}
	}

	#[must_use]
	pub fn with_newline_separator(mut self, newline_separator: impl Into<String>) -> Self {
		self.newline_separator = newline_separator.into();
		self
	}

	#[must_use]
	pub fn with_first_separator(mut self, first_separator: impl Into<String>) -> Self {
		self.first_separator = first_separator.into();
		self
	}
}

/// A word on the line being built, with the separator placed before it.
#[derive(Debug)]
struct Piece {
	separator: String,
	text: String,
}

impl Piece {
	fn width(&self) -> usize {
		width(&self.separator) + width(&self.text)
	}
}

/// Joins words into lines no wider than `line_width`, filling each line
/// greedily. A single word wider than the line is never split and never
/// leaves an empty line behind.
#[derive(Debug)]
pub struct LineBuilder {
	line_width: usize,
	lines: Vec<String>,
	current: Vec<Piece>,
	current_width: usize,
}

impl Default for LineBuilder {
	fn default() -> Self {
		Self::new(80)
	}
}

impl LineBuilder {
	pub fn new(line_width: usize) -> Self {
		Self {
			line_width,
			lines: Vec::new(),
			current: Vec::new(),
			current_width: 0,
		}
	}

	pub fn line_width(&self) -> usize {
		self.line_width
	}

	/// Append a single word.
	pub fn append(&mut self, text: &str, separators: &Separators) {
		if self.current.is_empty() {
			self.push(&separators.first_separator, text);
		} else if self.current_width + width(&separators.separator) + width(text)
			<= self.line_width
		{
			self.push(&separators.separator, text);
		} else if self.current_width + width(&separators.newline_separator) <= self.line_width
			|| self.current.len() == 1
		{
			self.close_line(&separators.newline_separator);
			self.push("", text);
		} else {
			// Even the newline separator doesn't fit: move the previous word
			// to the next line as well and retry.
			let Some(last) = self.current.pop() else {
				return;
			};
			self.current_width -= last.width();
			self.close_line(&separators.newline_separator);
			self.push("", &last.text);
			self.append(text, separators);
		}
	}

	/// Append every word, using `first` for the first one and `separators`
	/// for the rest.
	pub fn join<I, S>(&mut self, words: I, separators: &Separators, first: &Separators)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut words = words.into_iter();
		let Some(head) = words.next() else {
			return;
		};

		self.append(head.as_ref(), first);
		for word in words {
			self.append(word.as_ref(), separators);
		}
	}

	/// Close the current line, even when it is empty.
	pub fn newline(&mut self) {
		self.close_line("");
	}

	/// Finish the in-progress line, if any, and return all lines.
	pub fn build(mut self) -> Vec<String> {
		if !self.current.is_empty() {
			self.newline();
		}
		self.lines
	}

	fn push(&mut self, separator: &str, text: &str) {
		let piece = Piece {
			separator: separator.to_string(),
			text: text.to_string(),
		};
		self.current_width += piece.width();
		self.current.push(piece);
	}

	fn close_line(&mut self, newline_separator: &str) {
		let mut line = String::new();
		for piece in self.current.drain(..) {
			line.push_str(&piece.separator);
			line.push_str(&piece.text);
		}
		line.push_str(newline_separator);

		self.lines.push(line);
		self.current_width = 0;
	}
}

/// Join `words` into lines of at most `line_width` characters.
pub fn join<I, S>(
	words: I,
	line_width: usize,
	separators: &Separators,
	first: &Separators,
) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut builder = LineBuilder::new(line_width);
	builder.join(words, separators, first);
	builder.build()
}

fn width(text: &str) -> usize {
	text.chars().count()
}
