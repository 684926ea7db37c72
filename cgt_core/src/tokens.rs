use std::fmt::Display;

/// A single token of a template, produced line by line by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	/// Literal text between directives. Never empty and never contains `\n`.
	Text(String),
	/// The end of a template line. Every line, including the last, ends with
	/// exactly one of these.
	Newline,
	/// `[[[IF key comment]]]`
	If {
		key: String,
		comment: Option<String>,
	},
	/// `[[[ELIF key comment]]]`
	Elif {
		key: String,
		comment: Option<String>,
	},
	/// `[[[ELSE]]]`
	Else,
	/// `[[[ENDIF]]]`
	Endif,
	/// `[[[SET identifier=value]]]`, holding `identifier=value`.
	Set(String),
	/// `[[[key]]]` or `[[[key(a, b)]]]`, holding the raw directive content.
	Expand(String),
	/// `[[[>]]]`
	PushAlign,
	/// `[[[|]]]`
	Align,
	/// `[[[<]]]`
	PopAlign,
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Token::Text(text) => write!(f, "{text}"),
			Token::Newline => writeln!(f),
			Token::If { key, comment } => {
				match comment {
					Some(comment) => write!(f, "[[[IF {key} {comment}]]]"),
					None => write!(f, "[[[IF {key}]]]"),
				}
			}
			Token::Elif { key, comment } => {
				match comment {
					Some(comment) => write!(f, "[[[ELIF {key} {comment}]]]"),
					None => write!(f, "[[[ELIF {key}]]]"),
				}
			}
			Token::Else => write!(f, "[[[ELSE]]]"),
			Token::Endif => write!(f, "[[[ENDIF]]]"),
			Token::Set(assignment) => write!(f, "[[[SET {assignment}]]]"),
			Token::Expand(key) => write!(f, "[[[{key}]]]"),
			Token::PushAlign => write!(f, "[[[>]]]"),
			Token::Align => write!(f, "[[[|]]]"),
			Token::PopAlign => write!(f, "[[[<]]]"),
		}
	}
}
