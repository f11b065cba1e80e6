//! Player and clan tag normalization.

/// Normalizes a user-entered tag to the in-game form.
///
/// Upper-cases, maps the letter `O` to the digit `0`, drops everything outside `A-Z0-9`, and
/// prefixes `#`. Empty input stays empty.
pub fn correct_tag(tag: &str) -> String {
	if tag.is_empty() {
		return String::new();
	}

	let cleaned = tag
		.chars()
		.flat_map(char::to_uppercase)
		.map(|c| if c == 'O' { '0' } else { c })
		.filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
		.collect::<String>();

	format!("#{cleaned}")
}

/// Percent-encodes `#` so a tag can be used as a URL path segment.
pub fn encode_for_path(tag: &str) -> String {
	tag.replace('#', "%23")
}

pub(crate) fn path_tag(tag: &str) -> String {
	encode_for_path(&correct_tag(tag))
}
