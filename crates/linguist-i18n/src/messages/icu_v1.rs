//! ICU MessageFormat patterns (`icu-v1`)
//!
//! Supported syntax:
//!
//! - `{0}`, `{name}`: plain arguments; numbers use the locale number format
//! - `{n, number}`, `{n, number, integer}`, `{n, number, percent}`
//! - `{g, select, male {..} other {..}}`
//! - `{n, plural, offset:1 =0 {..} other {# ..}}`, matching explicit `=N`
//!   selectors and `other`
//! - apostrophe quoting: `''` is a literal apostrophe, `'{'` quotes syntax
//!
//! An argument without a value is left in the output as `{name}`.

use super::number::{format_fixed, format_integer, format_number, format_percent};
use super::{Arguments, MessageFormat, MessageFormatError, NamedPlaceholders, format_plain};
use crate::error::BoxError;
use crate::locale::Locale;
use crate::value::Value;

/// The `icu-v1` message format.
///
/// # Example
/// ```
/// use linguist_i18n::{Locale, MessageFormat, Value};
/// use linguist_i18n::messages::IcuFormatV1;
///
/// let en = Locale::parse("en").unwrap();
/// let text = IcuFormatV1
/// 	.format_ordinal("{0} has {1, plural, =1 {one file} other {# files}}", &en, &[
/// 		Value::from("Ann"),
/// 		Value::from(1200),
/// 	])
/// 	.unwrap();
///
/// assert_eq!(text, "Ann has 1,200 files");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IcuFormatV1;

impl IcuFormatV1 {
	/// Identifier of this format.
	pub const IDENTIFIER: &'static str = "icu-v1";

	fn format(&self, pattern: &str, locale: &Locale, args: Arguments<'_>) -> Result<String, BoxError> {
		let parts = Parser::new(pattern).parse()?;
		let mut out = String::with_capacity(pattern.len());
		render(&parts, locale, args, None, &mut out)?;
		Ok(out)
	}
}

impl MessageFormat for IcuFormatV1 {
	fn identifier(&self) -> &str {
		Self::IDENTIFIER
	}

	fn format_named(
		&self,
		pattern: &str,
		locale: &Locale,
		placeholders: &NamedPlaceholders,
	) -> Result<String, BoxError> {
		self.format(pattern, locale, Arguments::Named(placeholders))
	}

	fn format_ordinal(
		&self,
		pattern: &str,
		locale: &Locale,
		placeholders: &[Value],
	) -> Result<String, BoxError> {
		self.format(pattern, locale, Arguments::Ordinal(placeholders))
	}
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
	Text(String),
	/// `#` inside a plural case.
	Pound,
	Argument(Argument),
}

#[derive(Debug, Clone, PartialEq)]
struct Argument {
	name: String,
	kind: ArgumentKind,
}

#[derive(Debug, Clone, PartialEq)]
enum ArgumentKind {
	Simple,
	Number(NumberStyle),
	Select(Vec<(String, Vec<Part>)>),
	Plural {
		offset: f64,
		cases: Vec<(PluralSelector, Vec<Part>)>,
	},
	/// Types without dedicated support (`date`, `time`, `spellout`, ..),
	/// rendered as the plain value.
	Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NumberStyle {
	Default,
	Integer,
	Percent,
	/// A decimal pattern such as `#,##0.00`.
	Pattern {
		grouping: bool,
		min_fraction: usize,
		max_fraction: usize,
	},
}

impl NumberStyle {
	/// Interpret a style argument. Named styles other than `integer` and
	/// `percent` render like the default style.
	fn parse(style: &str) -> Self {
		match style.trim() {
			"integer" => Self::Integer,
			"percent" => Self::Percent,
			pattern if pattern.contains(['0', '#']) => {
				let (integer, fraction) = pattern.split_once('.').unwrap_or((pattern, ""));
				let min_fraction = fraction.chars().filter(|c| *c == '0').count();
				Self::Pattern {
					grouping: integer.contains(','),
					min_fraction,
					max_fraction: min_fraction + fraction.chars().filter(|c| *c == '#').count(),
				}
			}
			_ => Self::Default,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
enum PluralSelector {
	Exact(f64),
	Keyword(String),
}

struct Parser {
	chars: Vec<char>,
	pos: usize,
}

impl Parser {
	fn new(pattern: &str) -> Self {
		Self {
			chars: pattern.chars().collect(),
			pos: 0,
		}
	}

	fn parse(mut self) -> Result<Vec<Part>, MessageFormatError> {
		self.parse_message(0, false)
	}

	fn peek(&self) -> Option<char> {
		self.chars.get(self.pos).copied()
	}

	fn skip_whitespace(&mut self) {
		while self.peek().is_some_and(char::is_whitespace) {
			self.pos += 1;
		}
	}

	fn expect(&mut self, expected: char) -> Result<(), MessageFormatError> {
		if self.peek() == Some(expected) {
			self.pos += 1;
			Ok(())
		} else {
			Err(MessageFormatError::syntax(self.pos, format!("expected '{expected}'")))
		}
	}

	fn parse_message(&mut self, depth: usize, in_plural: bool) -> Result<Vec<Part>, MessageFormatError> {
		let mut parts = Vec::new();
		let mut text = String::new();

		while let Some(c) = self.peek() {
			match c {
				'\'' => self.parse_quote(&mut text, in_plural),
				'{' => {
					flush(&mut text, &mut parts);
					parts.push(Part::Argument(self.parse_argument(depth)?));
				}
				'}' if depth > 0 => break,
				'#' if in_plural => {
					flush(&mut text, &mut parts);
					parts.push(Part::Pound);
					self.pos += 1;
				}
				_ => {
					text.push(c);
					self.pos += 1;
				}
			}
		}

		flush(&mut text, &mut parts);
		Ok(parts)
	}

	fn parse_quote(&mut self, text: &mut String, in_plural: bool) {
		self.pos += 1;
		match self.peek() {
			Some('\'') => {
				text.push('\'');
				self.pos += 1;
			}
			Some('{' | '}' | '|') => self.read_quoted(text),
			Some('#') if in_plural => self.read_quoted(text),
			_ => text.push('\''),
		}
	}

	fn read_quoted(&mut self, text: &mut String) {
		while let Some(c) = self.peek() {
			self.pos += 1;
			if c != '\'' {
				text.push(c);
			} else if self.peek() == Some('\'') {
				text.push('\'');
				self.pos += 1;
			} else {
				return;
			}
		}
	}

	fn read_word(&mut self) -> String {
		let start = self.pos;
		while self
			.peek()
			.is_some_and(|c| !c.is_whitespace() && !matches!(c, ',' | '{' | '}' | '\'' | '#'))
		{
			self.pos += 1;
		}
		self.chars[start..self.pos].iter().collect()
	}

	fn parse_argument(&mut self, depth: usize) -> Result<Argument, MessageFormatError> {
		let open = self.pos;
		self.expect('{')?;
		self.skip_whitespace();

		let name = self.read_word();
		if name.is_empty() {
			return Err(MessageFormatError::syntax(self.pos, "missing argument name"));
		}
		self.skip_whitespace();

		match self.peek() {
			Some('}') => {
				self.pos += 1;
				return Ok(Argument {
					name,
					kind: ArgumentKind::Simple,
				});
			}
			Some(',') => self.pos += 1,
			None => return Err(MessageFormatError::syntax(open, "unmatched '{'")),
			Some(_) => {
				return Err(MessageFormatError::syntax(self.pos, "bad argument syntax"));
			}
		}

		self.skip_whitespace();
		let kind_name = self.read_word().to_ascii_lowercase();
		self.skip_whitespace();

		let has_style = match self.peek() {
			Some(',') => {
				self.pos += 1;
				true
			}
			Some('}') => false,
			None => return Err(MessageFormatError::syntax(open, "unmatched '{'")),
			Some(_) => {
				return Err(MessageFormatError::syntax(self.pos, "bad argument syntax"));
			}
		};

		let kind = match kind_name.as_str() {
			"number" => {
				let style = if has_style {
					self.read_style(open)?
				} else {
					String::new()
				};
				ArgumentKind::Number(NumberStyle::parse(&style))
			}
			"select" | "plural" | "selectordinal" => {
				if !has_style {
					return Err(MessageFormatError::syntax(self.pos, "missing cases"));
				}
				if kind_name == "select" {
					ArgumentKind::Select(self.parse_select_cases(depth)?)
				} else {
					self.parse_plural_cases(depth)?
				}
			}
			"" => return Err(MessageFormatError::syntax(self.pos, "missing argument type")),
			_ => {
				if has_style {
					self.read_style(open)?;
				}
				ArgumentKind::Other
			}
		};

		self.skip_whitespace();
		self.expect('}')
			.map_err(|_| MessageFormatError::syntax(open, "unmatched '{'"))?;

		Ok(Argument { name, kind })
	}

	/// Reads an argument style up to (not including) the closing brace.
	fn read_style(&mut self, open: usize) -> Result<String, MessageFormatError> {
		let start = self.pos;
		let mut nesting = 0usize;

		loop {
			match self.peek() {
				None => return Err(MessageFormatError::syntax(open, "unmatched '{'")),
				Some('{') => nesting += 1,
				Some('}') if nesting == 0 => break,
				Some('}') => nesting -= 1,
				Some(_) => {}
			}
			self.pos += 1;
		}

		Ok(self.chars[start..self.pos].iter().collect())
	}

	fn parse_case_body(&mut self, depth: usize, in_plural: bool) -> Result<Vec<Part>, MessageFormatError> {
		self.skip_whitespace();
		let open = self.pos;
		self.expect('{')?;
		let parts = self.parse_message(depth + 1, in_plural)?;
		self.expect('}')
			.map_err(|_| MessageFormatError::syntax(open, "unmatched '{'"))?;
		Ok(parts)
	}

	fn parse_select_cases(&mut self, depth: usize) -> Result<Vec<(String, Vec<Part>)>, MessageFormatError> {
		let mut cases = Vec::new();

		loop {
			self.skip_whitespace();
			if matches!(self.peek(), Some('}') | None) {
				break;
			}

			let selector = self.read_word();
			if selector.is_empty() {
				return Err(MessageFormatError::syntax(self.pos, "missing selector"));
			}
			let body = self.parse_case_body(depth, false)?;
			cases.push((selector, body));
		}

		if !cases.iter().any(|(selector, _)| selector == "other") {
			return Err(MessageFormatError::syntax(self.pos, "missing 'other' case"));
		}

		Ok(cases)
	}

	fn parse_plural_cases(&mut self, depth: usize) -> Result<ArgumentKind, MessageFormatError> {
		let mut offset = 0.0;
		let mut cases = Vec::new();

		loop {
			self.skip_whitespace();
			if matches!(self.peek(), Some('}') | None) {
				break;
			}

			let start = self.pos;
			let selector = self.read_word();
			if let Some(value) = selector.strip_prefix("offset:") {
				let value = if value.is_empty() {
					self.skip_whitespace();
					self.read_word()
				} else {
					value.to_string()
				};
				offset = value
					.parse()
					.map_err(|_| MessageFormatError::syntax(start, "bad plural offset"))?;
				continue;
			}

			let selector = match selector.strip_prefix('=') {
				Some(number) => PluralSelector::Exact(
					number
						.parse()
						.map_err(|_| MessageFormatError::syntax(start, "bad explicit value"))?,
				),
				None if selector.is_empty() => {
					return Err(MessageFormatError::syntax(start, "missing selector"));
				}
				None => PluralSelector::Keyword(selector),
			};
			let body = self.parse_case_body(depth, true)?;
			cases.push((selector, body));
		}

		let has_other = cases
			.iter()
			.any(|(selector, _)| *selector == PluralSelector::Keyword("other".to_string()));
		if !has_other {
			return Err(MessageFormatError::syntax(self.pos, "missing 'other' case"));
		}

		Ok(ArgumentKind::Plural { offset, cases })
	}
}

fn flush(text: &mut String, parts: &mut Vec<Part>) {
	if !text.is_empty() {
		parts.push(Part::Text(std::mem::take(text)));
	}
}

fn render(
	parts: &[Part],
	locale: &Locale,
	args: Arguments<'_>,
	pound: Option<f64>,
	out: &mut String,
) -> Result<(), MessageFormatError> {
	for part in parts {
		match part {
			Part::Text(text) => out.push_str(text),
			Part::Pound => match pound {
				Some(number) => out.push_str(&format_number(number, locale)),
				None => out.push('#'),
			},
			Part::Argument(argument) => render_argument(argument, locale, args, out)?,
		}
	}

	Ok(())
}

fn render_argument(
	argument: &Argument,
	locale: &Locale,
	args: Arguments<'_>,
	out: &mut String,
) -> Result<(), MessageFormatError> {
	let Some(value) = args.get(&argument.name) else {
		out.push('{');
		out.push_str(&argument.name);
		out.push('}');
		return Ok(());
	};

	match &argument.kind {
		ArgumentKind::Simple | ArgumentKind::Other => out.push_str(&format_plain(value, locale)),
		ArgumentKind::Number(style) => {
			let number = value
				.as_f64()
				.ok_or_else(|| MessageFormatError::not_a_number(&argument.name))?;
			let text = match (style, value) {
				(NumberStyle::Default, Value::Int(i)) => super::number::format_int(*i, locale),
				(NumberStyle::Default, _) => format_number(number, locale),
				(NumberStyle::Integer, _) => format_integer(number, locale),
				(NumberStyle::Percent, _) => format_percent(number, locale),
				(
					NumberStyle::Pattern {
						grouping,
						min_fraction,
						max_fraction,
					},
					_,
				) => format_fixed(number, *min_fraction, *max_fraction, *grouping, locale),
			};
			out.push_str(&text);
		}
		ArgumentKind::Select(cases) => {
			let selected = value.to_string();
			let body = cases
				.iter()
				.find(|(selector, _)| *selector == selected)
				.or_else(|| cases.iter().find(|(selector, _)| selector == "other"))
				.map(|(_, body)| body);
			if let Some(body) = body {
				render(body, locale, args, None, out)?;
			}
		}
		ArgumentKind::Plural { offset, cases } => {
			let number = value
				.as_f64()
				.ok_or_else(|| MessageFormatError::not_a_number(&argument.name))?;
			let other = PluralSelector::Keyword("other".to_string());
			let body = cases
				.iter()
				.find(|(selector, _)| matches!(selector, PluralSelector::Exact(n) if *n == number))
				.or_else(|| cases.iter().find(|(selector, _)| *selector == other))
				.map(|(_, body)| body);
			if let Some(body) = body {
				render(body, locale, args, Some(number - offset), out)?;
			}
		}
	}

	Ok(())
}
