//! MessageFormat 2 patterns (`icu-v2`)
//!
//! Simple messages are text with `{...}` placeholders:
//!
//! ```text
//! Hello, {$user}! You have {$count :number} new {|messages|}.
//! ```
//!
//! Complex messages start with a declaration or a quoted pattern:
//!
//! ```text
//! .input {$count :number}
//! .match $count
//! 0 {{No new messages}}
//! 1 {{One new message}}
//! * {{{$count} new messages}}
//! ```
//!
//! Provided functions are `:number`, `:integer` and `:string`. Ordinal
//! placeholders are exposed as `$0`, `$1`, ... A variable without a value
//! renders as `{$name}`, and markup placeholders (`{#b}`, `{/b}`) render as
//! nothing.

use super::number::{format_int, format_integer, format_number};
use super::{Arguments, MessageFormat, MessageFormatError, NamedPlaceholders, format_plain};
use crate::error::BoxError;
use crate::locale::Locale;
use crate::value::Value;
use std::collections::HashMap;

/// The `icu-v2` message format.
///
/// # Example
/// ```
/// use linguist_i18n::{Locale, MessageFormat, Value};
/// use linguist_i18n::messages::IcuFormatV2;
/// use std::collections::HashMap;
///
/// let en = Locale::parse("en").unwrap();
/// let args: HashMap<String, Value> = [("user".to_string(), Value::from("Ann"))].into();
///
/// let text = IcuFormatV2.format_named("Hello, {$user}!", &en, &args).unwrap();
/// assert_eq!(text, "Hello, Ann!");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IcuFormatV2;

impl IcuFormatV2 {
	/// Identifier of this format.
	pub const IDENTIFIER: &'static str = "icu-v2";

	fn format(&self, pattern: &str, locale: &Locale, args: Arguments<'_>) -> Result<String, BoxError> {
		let message = Parser::new(pattern).parse()?;
		let formatted = Formatter { locale, args }.format(&message)?;
		Ok(formatted)
	}
}

impl MessageFormat for IcuFormatV2 {
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
enum Operand {
	Variable(String),
	Literal(String),
}

/// A function annotation. Options are accepted but the provided functions
/// don't take any.
#[derive(Debug, Clone, PartialEq)]
struct Function {
	name: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Expression {
	Value {
		operand: Option<Operand>,
		function: Option<Function>,
	},
	Markup,
}

#[derive(Debug, Clone, PartialEq)]
enum PatternPart {
	Text(String),
	Placeholder(Expression),
}

type Pattern = Vec<PatternPart>;

#[derive(Debug, Clone, PartialEq)]
enum VariantKey {
	Literal(String),
	CatchAll,
}

#[derive(Debug, Clone, PartialEq)]
struct Variant {
	keys: Vec<VariantKey>,
	pattern: Pattern,
}

#[derive(Debug, Clone, PartialEq)]
enum Body {
	Pattern(Pattern),
	Match {
		selectors: Vec<Expression>,
		variants: Vec<Variant>,
	},
}

#[derive(Debug, Clone, PartialEq)]
struct Message {
	declarations: Vec<(String, Expression)>,
	body: Body,
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

	fn error(&self, message: impl Into<String>) -> MessageFormatError {
		MessageFormatError::syntax(self.pos, message)
	}

	fn peek(&self) -> Option<char> {
		self.chars.get(self.pos).copied()
	}

	fn starts_with(&self, text: &str) -> bool {
		text.chars()
			.enumerate()
			.all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
	}

	fn consume(&mut self, text: &str) -> bool {
		if self.starts_with(text) {
			self.pos += text.chars().count();
			true
		} else {
			false
		}
	}

	fn expect(&mut self, text: &str) -> Result<(), MessageFormatError> {
		if self.consume(text) {
			Ok(())
		} else {
			Err(self.error(format!("expected '{text}'")))
		}
	}

	fn skip_whitespace(&mut self) {
		while self.peek().is_some_and(char::is_whitespace) {
			self.pos += 1;
		}
	}

	fn parse(mut self) -> Result<Message, MessageFormatError> {
		self.skip_whitespace();
		if !(self.starts_with(".") || self.starts_with("{{")) {
			self.pos = 0;
			let pattern = self.parse_pattern(false)?;
			return Ok(Message {
				declarations: Vec::new(),
				body: Body::Pattern(pattern),
			});
		}

		let mut declarations = Vec::new();
		let body = loop {
			self.skip_whitespace();
			if self.consume(".input") {
				self.skip_whitespace();
				self.expect("{")?;
				let expression = self.parse_expression()?;
				let Expression::Value {
					operand: Some(Operand::Variable(name)),
					..
				} = &expression
				else {
					return Err(self.error(".input requires a variable"));
				};
				declarations.push((name.clone(), expression));
			} else if self.consume(".local") {
				self.skip_whitespace();
				self.expect("$")?;
				let name = self.read_name();
				if name.is_empty() {
					return Err(self.error("missing variable name"));
				}
				self.skip_whitespace();
				self.expect("=")?;
				self.skip_whitespace();
				self.expect("{")?;
				declarations.push((name, self.parse_expression()?));
			} else if self.consume(".match") {
				break self.parse_match()?;
			} else if self.consume("{{") {
				break Body::Pattern(self.parse_pattern(true)?);
			} else {
				return Err(self.error("expected a declaration or a quoted pattern"));
			}
		};

		self.skip_whitespace();
		if self.peek().is_some() {
			return Err(self.error("unexpected content after the message body"));
		}

		Ok(Message { declarations, body })
	}

	fn parse_pattern(&mut self, quoted: bool) -> Result<Pattern, MessageFormatError> {
		let mut parts = Vec::new();
		let mut text = String::new();

		loop {
			match self.peek() {
				None if quoted => return Err(self.error("unterminated quoted pattern")),
				None => break,
				Some('\\') => {
					self.pos += 1;
					match self.peek() {
						Some(c @ ('\\' | '{' | '}' | '|')) => {
							text.push(c);
							self.pos += 1;
						}
						_ => return Err(self.error("invalid escape")),
					}
				}
				Some('{') => {
					self.pos += 1;
					if !text.is_empty() {
						parts.push(PatternPart::Text(std::mem::take(&mut text)));
					}
					parts.push(PatternPart::Placeholder(self.parse_expression()?));
				}
				Some('}') if quoted => {
					self.expect("}}")?;
					break;
				}
				Some('}') => return Err(self.error("unmatched '}'")),
				Some(c) => {
					text.push(c);
					self.pos += 1;
				}
			}
		}

		if !text.is_empty() {
			parts.push(PatternPart::Text(text));
		}
		Ok(parts)
	}

	/// Parses the inside of a placeholder; the opening brace is already
	/// consumed.
	fn parse_expression(&mut self) -> Result<Expression, MessageFormatError> {
		self.skip_whitespace();

		if matches!(self.peek(), Some('#' | '/')) {
			while let Some(c) = self.peek() {
				match c {
					'}' => break,
					'|' => {
						self.read_quoted_literal()?;
					}
					_ => self.pos += 1,
				}
			}
			self.expect("}")?;
			return Ok(Expression::Markup);
		}

		let operand = match self.peek() {
			Some('$') => {
				self.pos += 1;
				let name = self.read_name();
				if name.is_empty() {
					return Err(self.error("missing variable name"));
				}
				Some(Operand::Variable(name))
			}
			Some('|') => Some(Operand::Literal(self.read_quoted_literal()?)),
			Some(':') | Some('}') | Some('@') | None => None,
			Some(_) => Some(Operand::Literal(self.read_unquoted_literal()?)),
		};

		self.skip_whitespace();
		let function = if self.consume(":") {
			Some(self.parse_function()?)
		} else {
			None
		};

		self.skip_attributes()?;
		self.skip_whitespace();
		self.expect("}")?;

		if operand.is_none() && function.is_none() {
			return Err(self.error("empty placeholder"));
		}

		Ok(Expression::Value { operand, function })
	}

	fn parse_function(&mut self) -> Result<Function, MessageFormatError> {
		let mut name = self.read_name();
		if self.consume(":") {
			name.push(':');
			name.push_str(&self.read_name());
		}
		if name.is_empty() || name.ends_with(':') {
			return Err(self.error("missing function name"));
		}

		loop {
			self.skip_whitespace();
			match self.peek() {
				Some('}' | '@') | None => break,
				_ => {}
			}

			let option = self.read_name();
			if option.is_empty() {
				return Err(self.error("bad option"));
			}
			self.skip_whitespace();
			self.expect("=")?;
			self.skip_whitespace();
			if self.consume("$") {
				self.read_unquoted_literal()?;
			} else if self.peek() == Some('|') {
				self.read_quoted_literal()?;
			} else {
				self.read_unquoted_literal()?;
			}
		}

		Ok(Function { name })
	}

	fn skip_attributes(&mut self) -> Result<(), MessageFormatError> {
		loop {
			self.skip_whitespace();
			if !self.consume("@") {
				return Ok(());
			}
			if self.read_name().is_empty() {
				return Err(self.error("missing attribute name"));
			}
			self.skip_whitespace();
			if self.consume("=") {
				self.skip_whitespace();
				if self.peek() == Some('|') {
					self.read_quoted_literal()?;
				} else {
					self.read_unquoted_literal()?;
				}
			}
		}
	}

	fn parse_match(&mut self) -> Result<Body, MessageFormatError> {
		let mut selectors = Vec::new();
		loop {
			self.skip_whitespace();
			if self.consume("$") {
				let name = self.read_name();
				if name.is_empty() {
					return Err(self.error("missing variable name"));
				}
				selectors.push(Expression::Value {
					operand: Some(Operand::Variable(name)),
					function: None,
				});
			} else if self.peek() == Some('{') && !self.starts_with("{{") {
				self.pos += 1;
				selectors.push(self.parse_expression()?);
			} else {
				break;
			}
		}
		if selectors.is_empty() {
			return Err(self.error(".match requires at least one selector"));
		}

		let mut variants = Vec::new();
		loop {
			self.skip_whitespace();
			if self.peek().is_none() {
				break;
			}

			let mut keys = Vec::new();
			while !self.starts_with("{{") {
				self.skip_whitespace();
				match self.peek() {
					Some('*') => {
						self.pos += 1;
						keys.push(VariantKey::CatchAll);
					}
					Some('|') => keys.push(VariantKey::Literal(self.read_quoted_literal()?)),
					Some(_) if !self.starts_with("{{") => {
						keys.push(VariantKey::Literal(self.read_unquoted_literal()?));
					}
					Some(_) => {}
					None => return Err(self.error("missing variant pattern")),
				}
			}
			self.expect("{{")?;

			if keys.len() != selectors.len() {
				return Err(self.error("variant key count doesn't match the selectors"));
			}
			variants.push(Variant {
				keys,
				pattern: self.parse_pattern(true)?,
			});
		}

		let has_fallback = variants
			.iter()
			.any(|variant| variant.keys.iter().all(|key| *key == VariantKey::CatchAll));
		if !has_fallback {
			return Err(self.error("missing '*' fallback variant"));
		}

		Ok(Body::Match {
			selectors,
			variants,
		})
	}

	fn read_name(&mut self) -> String {
		let start = self.pos;
		while self
			.peek()
			.is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
		{
			self.pos += 1;
		}
		self.chars[start..self.pos].iter().collect()
	}

	fn read_unquoted_literal(&mut self) -> Result<String, MessageFormatError> {
		let literal = self.read_name();
		if literal.is_empty() {
			return Err(self.error("expected a literal"));
		}
		Ok(literal)
	}

	fn read_quoted_literal(&mut self) -> Result<String, MessageFormatError> {
		self.expect("|")?;
		let mut literal = String::new();

		loop {
			match self.peek() {
				None => return Err(self.error("unterminated literal")),
				Some('|') => {
					self.pos += 1;
					return Ok(literal);
				}
				Some('\\') => {
					self.pos += 1;
					match self.peek() {
						Some(c @ ('\\' | '{' | '}' | '|')) => {
							literal.push(c);
							self.pos += 1;
						}
						_ => return Err(self.error("invalid escape")),
					}
				}
				Some(c) => {
					literal.push(c);
					self.pos += 1;
				}
			}
		}
	}
}

/// A placeholder after resolving its operand and any declaration it refers
/// to.
#[derive(Debug, Clone)]
struct Resolved {
	value: Option<Value>,
	function: Option<Function>,
	fallback: String,
}

struct Formatter<'a> {
	locale: &'a Locale,
	args: Arguments<'a>,
}

impl Formatter<'_> {
	fn format(&self, message: &Message) -> Result<String, MessageFormatError> {
		let mut scope = HashMap::new();
		for (name, expression) in &message.declarations {
			let resolved = self.resolve(expression, &scope)?;
			scope.insert(name.clone(), resolved);
		}

		let pattern = match &message.body {
			Body::Pattern(pattern) => pattern.as_slice(),
			Body::Match {
				selectors,
				variants,
			} => {
				let selectors = selectors
					.iter()
					.map(|selector| self.resolve(selector, &scope))
					.collect::<Result<Vec<_>, _>>()?;
				select_variant(&selectors, variants)
			}
		};

		let mut out = String::new();
		for part in pattern {
			match part {
				PatternPart::Text(text) => out.push_str(text),
				PatternPart::Placeholder(Expression::Markup) => {}
				PatternPart::Placeholder(expression) => {
					let resolved = self.resolve(expression, &scope)?;
					out.push_str(&self.render(&resolved)?);
				}
			}
		}

		Ok(out)
	}

	fn resolve(
		&self,
		expression: &Expression,
		scope: &HashMap<String, Resolved>,
	) -> Result<Resolved, MessageFormatError> {
		let Expression::Value { operand, function } = expression else {
			return Ok(Resolved {
				value: None,
				function: None,
				fallback: String::new(),
			});
		};

		let mut resolved = match operand {
			Some(Operand::Variable(name)) => match scope.get(name) {
				Some(declared) => declared.clone(),
				None => Resolved {
					value: self.args.get(name).cloned(),
					function: None,
					fallback: format!("{{${name}}}"),
				},
			},
			Some(Operand::Literal(literal)) => Resolved {
				value: Some(Value::Str(literal.clone())),
				function: None,
				fallback: format!("{{|{literal}|}}"),
			},
			None => Resolved {
				value: None,
				function: None,
				fallback: function
					.as_ref()
					.map(|f| format!("{{:{}}}", f.name))
					.unwrap_or_default(),
			},
		};

		if let Some(function) = function {
			if !matches!(function.name.as_str(), "number" | "integer" | "string") {
				return Err(MessageFormatError::UnknownFunction(function.name.clone()));
			}
			resolved.function = Some(function.clone());
		}

		Ok(resolved)
	}

	fn render(&self, resolved: &Resolved) -> Result<String, MessageFormatError> {
		let Some(value) = &resolved.value else {
			return Ok(resolved.fallback.clone());
		};

		let function = resolved.function.as_ref().map(|f| f.name.as_str());
		let text = match function {
			Some("number") => match value {
				Value::Int(i) => format_int(*i, self.locale),
				other => format_number(number_of(other, resolved)?, self.locale),
			},
			Some("integer") => format_integer(number_of(value, resolved)?, self.locale),
			Some("string") => value.to_string(),
			_ => format_plain(value, self.locale),
		};

		Ok(text)
	}
}

fn number_of(value: &Value, resolved: &Resolved) -> Result<f64, MessageFormatError> {
	value
		.as_f64()
		.ok_or_else(|| MessageFormatError::not_a_number(&resolved.fallback))
}

/// Whether `key` selects `selector`, and whether the match is exact.
fn key_matches(selector: &Resolved, key: &VariantKey) -> Option<bool> {
	let VariantKey::Literal(literal) = key else {
		return Some(false);
	};
	let value = selector.value.as_ref()?;

	let exact = match selector.function.as_ref().map(|f| f.name.as_str()) {
		Some("number") => value.as_f64().zip(literal.parse::<f64>().ok()).is_some_and(|(v, k)| v == k),
		Some("integer") => value
			.as_f64()
			.zip(literal.parse::<f64>().ok())
			.is_some_and(|(v, k)| v.round_ties_even() == k),
		_ => value.to_string() == *literal,
	};

	exact.then_some(true)
}

fn select_variant<'v>(selectors: &[Resolved], variants: &'v [Variant]) -> &'v [PatternPart] {
	let mut best: Option<(&Variant, Vec<bool>)> = None;

	for variant in variants {
		let matches: Option<Vec<bool>> = selectors
			.iter()
			.zip(&variant.keys)
			.map(|(selector, key)| key_matches(selector, key))
			.collect();

		let Some(score) = matches else {
			continue;
		};
		if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
			best = Some((variant, score));
		}
	}

	best.map_or(&[], |(variant, _)| variant.pattern.as_slice())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn en() -> Locale {
		Locale::parse("en").unwrap()
	}

	fn named(pattern: &str, values: &[(&str, Value)]) -> String {
		let map: NamedPlaceholders = values
			.iter()
			.map(|(k, v)| (k.to_string(), v.clone()))
			.collect();
		IcuFormatV2.format_named(pattern, &en(), &map).unwrap()
	}

	fn error(pattern: &str) -> MessageFormatError {
		let err = IcuFormatV2
			.format_named(pattern, &en(), &NamedPlaceholders::new())
			.unwrap_err();
		match err.downcast::<MessageFormatError>() {
			Ok(err) => *err,
			Err(other) => panic!("unexpected error: {other}"),
		}
	}

	#[rstest]
	#[case("Hello, {$user}!", "Hello, Ann!")]
	#[case("{$user}{$user}", "AnnAnn")]
	#[case("{ $user :string }", "Ann")]
	#[case("plain text", "plain text")]
	#[case("{|literal text|}", "literal text")]
	#[case("{42}", "42")]
	#[case("escaped \\{braces\\} and \\\\", "escaped {braces} and \\")]
	#[case("{#b}bold{/b}", "bold")]
	#[case("  leading space", "  leading space")]
	fn test_simple_messages(#[case] pattern: &str, #[case] expected: &str) {
		assert_eq!(named(pattern, &[("user", Value::from("Ann"))]), expected);
	}

	#[rstest]
	fn test_missing_variable_fallback() {
		assert_eq!(named("Hi {$name}", &[]), "Hi {$name}");
	}

	#[rstest]
	#[case("{$n}", Value::from(1234), "1,234")]
	#[case("{$n :number}", Value::from(1234.5), "1,234.5")]
	#[case("{$n :integer}", Value::from(3.7), "4")]
	#[case("{$n :number minimumFractionDigits=2}", Value::from(2), "2")]
	#[case("{$n :number}", Value::from("12"), "12")]
	fn test_number_functions(#[case] pattern: &str, #[case] value: Value, #[case] expected: &str) {
		assert_eq!(named(pattern, &[("n", value)]), expected);
	}

	#[rstest]
	fn test_ordinal_placeholders_are_indexed_variables() {
		let text = IcuFormatV2
			.format_ordinal("{$0} sent {$1}", &en(), &[Value::from("Ann"), Value::from("hi")])
			.unwrap();
		assert_eq!(text, "Ann sent hi");
	}

	#[rstest]
	#[case(0, "No new messages")]
	#[case(1, "One new message")]
	#[case(7, "7 new messages")]
	fn test_match(#[case] count: i64, #[case] expected: &str) {
		// Arrange
		let pattern = ".input {$count :number}\n.match $count\n0 {{No new messages}}\n1 {{One new message}}\n* {{{$count} new messages}}";

		// Act
		let text = named(pattern, &[("count", Value::from(count))]);

		// Assert
		assert_eq!(text, expected);
	}

	#[rstest]
	#[case("female", "anonymous", "She and anonymous")]
	#[case("female", "x", "She")]
	#[case("other", "x", "They")]
	fn test_match_prefers_exact_keys(#[case] gender: &str, #[case] who: &str, #[case] expected: &str) {
		let pattern = ".input {$gender :string}\n.input {$who :string}\n.match $gender $who\nfemale anonymous {{She and anonymous}}\nfemale * {{She}}\n* * {{They}}";

		assert_eq!(
			named(pattern, &[
				("gender", Value::from(gender)),
				("who", Value::from(who)),
			]),
			expected
		);
	}

	#[rstest]
	fn test_match_with_expression_selector() {
		let pattern = ".match {$n :integer}\n1 {{one}}\n* {{many}}";

		assert_eq!(named(pattern, &[("n", Value::from(1))]), "one");
		assert_eq!(named(pattern, &[("n", Value::from(2))]), "many");
	}

	#[rstest]
	fn test_local_declarations_and_quoted_pattern() {
		let pattern = ".local $greeting = {|Good morning|}\n{{{$greeting}, {$user}!}}";

		assert_eq!(
			named(pattern, &[("user", Value::from("Ann"))]),
			"Good morning, Ann!"
		);
	}

	#[rstest]
	fn test_missing_selector_value_uses_catch_all() {
		let pattern = ".input {$n :number}\n.match $n\n1 {{one}}\n* {{other}}";
		assert_eq!(named(pattern, &[]), "other");
	}

	#[rstest]
	#[case("{$user")]
	#[case("unmatched }")]
	#[case("{}")]
	#[case("bad \\escape")]
	#[case(".match $n\n1 {{one}}")]
	#[case(".match $n\n1 2 {{one}}\n* {{other}}")]
	#[case("{{unterminated")]
	#[case(".local x = {1}\n{{x}}")]
	#[case("{{a}} trailing")]
	fn test_syntax_errors(#[case] pattern: &str) {
		assert!(matches!(error(pattern), MessageFormatError::Syntax { .. }));
	}

	#[rstest]
	fn test_unknown_function() {
		assert!(matches!(
			error("{$when :datetime}"),
			MessageFormatError::UnknownFunction(name) if name == "datetime"
		));
	}
}
