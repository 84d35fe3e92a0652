//! Parsing of `{resource.path}` references embedded in manifest strings.
//!
//! A string is split into a [`CompositeValue`]: literal text interleaved with
//! [`Expression`] references. Parsing is lossless. Joining the segments back
//! together with [`CompositeValue::source_text`] reproduces the input exactly,
//! including an unterminated `{` which is kept as literal text.

use std::fmt;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_till, take_till1},
    character::complete::char,
    combinator::{map, recognize, rest},
    multi::many0,
    sequence::{delimited, preceded},
};

/// Path of the connection-string property.
pub const CONNECTION_STRING: &str = "connectionString";

/// Leading path segment of a binding reference.
pub const BINDINGS: &str = "bindings";

/// A parsed `{resource.path.segments}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// Referenced resource name (text before the first `.`).
    pub resource: String,
    /// Remaining property path segments.
    pub path: Vec<String>,
    /// Original text including braces.
    pub raw: String,
}

impl Expression {
    fn from_content(content: &str) -> Self {
        let mut parts = content.split('.');
        let resource = parts.next().unwrap_or_default().to_string();
        Self {
            resource,
            path: parts.map(str::to_string).collect(),
            raw: format!("{{{content}}}"),
        }
    }

    /// Returns `true` for `{resource.connectionString}`.
    #[must_use]
    pub fn is_connection_string(&self) -> bool {
        matches!(self.path.as_slice(), [p] if p == CONNECTION_STRING)
    }

    /// Returns the binding name and property of `{resource.bindings.<name>.<property>}`.
    ///
    /// The property is `None` when the path stops at the binding name.
    #[must_use]
    pub fn binding_property(&self) -> Option<(&str, Option<&str>)> {
        match self.path.as_slice() {
            [head, binding] if head == BINDINGS => Some((binding, None)),
            [head, binding, property, ..] if head == BINDINGS => Some((binding, Some(property))),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One segment of a composite value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text.
    Literal(String),
    /// An embedded reference.
    Reference(Expression),
}

/// A string value split into literal and reference segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeValue {
    segments: Vec<Segment>,
}

impl CompositeValue {
    /// Parses a manifest string value. Never fails.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        match segments(input) {
            Ok((_, segments)) => Self { segments },
            Err(_) => Self {
                segments: vec![Segment::Literal(input.to_string())],
            },
        }
    }

    /// Returns the parsed segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterates over the references in order.
    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Reference(expr) => Some(expr),
            Segment::Literal(_) => None,
        })
    }

    /// Returns `true` if the value embeds at least one reference.
    #[must_use]
    pub fn has_expressions(&self) -> bool {
        self.expressions().next().is_some()
    }

    /// Rebuilds the original string from the segments.
    #[must_use]
    pub fn source_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.as_str(),
                Segment::Reference(expr) => expr.raw.as_str(),
            })
            .collect()
    }
}

/// Text up to the next `{`.
fn literal(input: &str) -> IResult<&str, Segment> {
    map(take_till1(|c| c == '{'), |s: &str| Segment::Literal(s.to_string())).parse(input)
}

/// A closed `{...}` reference.
fn reference(input: &str) -> IResult<&str, Segment> {
    map(
        delimited(char('{'), take_till(|c| c == '}'), char('}')),
        |content: &str| Segment::Reference(Expression::from_content(content)),
    )
    .parse(input)
}

/// A `{` with no closing brace: the remainder is literal.
fn unterminated(input: &str) -> IResult<&str, Segment> {
    map(recognize(preceded(char('{'), rest)), |s: &str| {
        Segment::Literal(s.to_string())
    })
    .parse(input)
}

fn segments(input: &str) -> IResult<&str, Vec<Segment>> {
    many0(alt((literal, reference, unterminated))).parse(input)
}
