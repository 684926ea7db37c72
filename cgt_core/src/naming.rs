/// Characters that can't appear in identifiers of the generated code. Each is
/// treated like whitespace when building names.
const SEPARATOR_CHARS: &str = "'!\"#$%&/()=?+*@.:,;<>^`-_[]{}";

/// Build a macro style name: `"ISO 8859-1"` becomes `ISO_8859_1`.
pub fn macro_name(label: &str) -> String {
	variable_name(&label.to_uppercase())
}

/// Build an identifier from a free-form label: `"Code page 437"` becomes
/// `Code_page_437`.
pub fn variable_name(label: &str) -> String {
	label
		.split(|ch: char| ch.is_whitespace() || SEPARATOR_CHARS.contains(ch))
		.filter(|word| !word.is_empty())
		.collect::<Vec<_>>()
		.join("_")
}
