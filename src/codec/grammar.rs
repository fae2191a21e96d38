//! Reader for the native route file grammar.
//!
//! ```text
//! domain <name> {
//!     prefix <digits|""> {
//!         max_locdb = <int>
//!         target <host|""> {
//!             prob = <float>
//!             ...
//!         }
//!     }
//! }
//! ```
//!
//! # Design Decisions
//! - Tokens are nom combinators; the block walk keeps a section stack so
//!   errors carry the line and the enclosing section path
//! - Shape and types are checked here; semantic checks happen in `build`
//! - A bare `NULL` title is read as the empty sentinel for files written by
//!   older tools. A quoted `"NULL"` is an ordinary title, which keeps it
//!   consistent with the TOML and JSON formats

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while1},
    character::complete::{anychar, char, multispace1, one_of},
    combinator::{cut, map, map_res, opt, recognize, value},
    error::{context, VerboseError, VerboseErrorKind},
    multi::{fold_many0, many0_count},
    sequence::{pair, preceded, terminated},
    IResult,
};
use std::str::FromStr;

use crate::codec::record::{DomainRecord, PrefixRecord, RouteRecord, TargetRecord};
use crate::error::{Result, RouteError};

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Bare title accepted as an alias of the empty sentinel.
const NULL_TITLE: &str = "NULL";

fn is_word_char(c: char) -> bool {
    !(c.is_whitespace() || matches!(c, '{' | '}' | '=' | ':' | '"' | '#' | ','))
}

fn line_comment(input: &str) -> ParseResult<'_, &str> {
    recognize(pair(alt((tag("#"), tag("//"))), opt(is_not("\n"))))(input)
}

fn block_comment(input: &str) -> ParseResult<'_, &str> {
    recognize(preceded(
        tag("/*"),
        context("unterminated comment", cut(terminated(take_until("*/"), tag("*/")))),
    ))(input)
}

/// Whitespace, commas and comments between tokens.
fn skip(input: &str) -> ParseResult<'_, ()> {
    value((), many0_count(alt((multispace1, tag(","), line_comment, block_comment))))(input)
}

fn bare_word(input: &str) -> ParseResult<'_, &str> {
    take_while1(is_word_char)(input)
}

enum StrPart<'a> {
    Literal(&'a str),
    Escaped(char),
}

/// Double-quoted string; `\n` and `\t` are escapes, any other escaped
/// character stands for itself.
fn quoted(input: &str) -> ParseResult<'_, String> {
    preceded(
        char('"'),
        context(
            "unterminated string",
            cut(terminated(
                fold_many0(
                    alt((
                        map(is_not("\"\\"), StrPart::Literal),
                        map(preceded(char('\\'), anychar), StrPart::Escaped),
                    )),
                    String::new,
                    |mut s, part| {
                        match part {
                            StrPart::Literal(text) => s.push_str(text),
                            StrPart::Escaped('n') => s.push('\n'),
                            StrPart::Escaped('t') => s.push('\t'),
                            StrPart::Escaped(c) => s.push(c),
                        }
                        s
                    },
                ),
                char('"'),
            )),
        ),
    )(input)
}

/// A value as written: bare word or quoted string.
#[derive(Debug, PartialEq)]
enum Scalar<'a> {
    Bare(&'a str),
    Quoted(String),
}

impl Scalar<'_> {
    fn as_str(&self) -> &str {
        match self {
            Scalar::Bare(word) => word,
            Scalar::Quoted(s) => s,
        }
    }

    fn into_string(self) -> String {
        match self {
            Scalar::Bare(word) => word.to_string(),
            Scalar::Quoted(s) => s,
        }
    }

    /// Prefix or target title.
    fn into_title(self) -> String {
        match self {
            Scalar::Bare(word) if word.eq_ignore_ascii_case(NULL_TITLE) => String::new(),
            other => other.into_string(),
        }
    }
}

fn raw_scalar(input: &str) -> ParseResult<'_, Scalar<'_>> {
    alt((map(quoted, Scalar::Quoted), map(bare_word, Scalar::Bare)))(input)
}

fn scalar(input: &str) -> ParseResult<'_, Scalar<'_>> {
    preceded(skip, raw_scalar)(input)
}

/// Numeric value, bare or quoted.
fn number<T: FromStr>(input: &str) -> ParseResult<'_, T> {
    preceded(
        skip,
        map_res(raw_scalar, |s: Scalar<'_>| s.as_str().trim().parse::<T>()),
    )(input)
}

fn word(input: &str) -> ParseResult<'_, &str> {
    preceded(skip, bare_word)(input)
}

fn symbol<'a>(c: char) -> impl FnMut(&'a str) -> ParseResult<'a, char> {
    move |input| preceded(skip, char(c))(input)
}

fn assign(input: &str) -> ParseResult<'_, char> {
    preceded(skip, one_of("=:"))(input)
}

fn option_number<T: FromStr>(input: &str) -> ParseResult<'_, T> {
    preceded(assign, number::<T>)(input)
}

fn option_string(input: &str) -> ParseResult<'_, String> {
    map(preceded(assign, scalar), Scalar::into_string)(input)
}

/// First attached context, else the innermost failure point.
fn describe<'a>(error: &VerboseError<&'a str>, expected: &str) -> (&'a str, String) {
    error
        .errors
        .iter()
        .find_map(|(at, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some((*at, ctx.to_string())),
            _ => None,
        })
        .unwrap_or_else(|| {
            let at = error.errors.first().map_or("", |(at, _)| *at);
            (at, format!("expected {expected}"))
        })
}

/// Drives the token parsers through the block structure.
struct Reader<'a> {
    source_name: &'a str,
    input: &'a str,
    rest: &'a str,
    /// Enclosing sections, outermost first.
    sections: Vec<String>,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str, source_name: &'a str) -> Self {
        Self {
            source_name,
            input,
            rest: input,
            sections: Vec::new(),
        }
    }

    fn offset_of(&self, at: &str) -> usize {
        self.input.len().saturating_sub(at.len())
    }

    fn line_at(&self, offset: usize) -> usize {
        self.input.as_bytes()[..offset.min(self.input.len())]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> RouteError {
        RouteError::ConfigParse {
            source_name: self.source_name.to_string(),
            line: self.line_at(offset),
            section: if self.sections.is_empty() {
                "<top>".to_string()
            } else {
                self.sections.join(" / ")
            },
            message: message.into(),
        }
    }

    /// Run `parser` on the remaining input and advance past its match.
    fn parse<O, P>(&mut self, mut parser: P, expected: &str) -> Result<O>
    where
        P: FnMut(&'a str) -> ParseResult<'a, O>,
    {
        match parser(self.rest) {
            Ok((rest, out)) => {
                self.rest = rest;
                Ok(out)
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let (at, message) = describe(&e, expected);
                Err(self.error_at(self.offset_of(at), message))
            }
            Err(nom::Err::Incomplete(_)) => Err(self.error_at(self.input.len(), "unexpected end of input")),
        }
    }

    fn at_end(&mut self) -> Result<bool> {
        self.parse(skip, "input")?;
        Ok(self.rest.is_empty())
    }

    /// Consume a closing brace if it is next.
    fn close(&mut self) -> Result<bool> {
        if self.at_end()? {
            return Err(self.error_at(self.input.len(), "missing '}'"));
        }
        Ok(self.parse(opt(symbol('}')), "'}'")?.is_some())
    }

    /// Next keyword and its offset.
    fn keyword(&mut self) -> Result<(&'a str, usize)> {
        self.parse(skip, "input")?;
        let at = self.offset_of(self.rest);
        Ok((self.parse(word, "keyword")?, at))
    }

    fn record(&mut self) -> Result<RouteRecord> {
        let mut record = RouteRecord::default();
        while !self.at_end()? {
            let (keyword, at) = self.keyword()?;
            if keyword != "domain" {
                return Err(self.error_at(at, format!("unexpected {keyword:?}, expected domain")));
            }
            record.domains.push(self.domain()?);
        }
        Ok(record)
    }

    fn domain(&mut self) -> Result<DomainRecord> {
        let name = self.parse(scalar, "domain name")?.into_string();
        self.sections.push(format!("domain {name:?}"));
        self.parse(symbol('{'), "'{'")?;

        let mut domain = DomainRecord {
            name,
            prefixes: Vec::new(),
        };
        while !self.close()? {
            let (keyword, at) = self.keyword()?;
            match keyword {
                "prefix" => domain.prefixes.push(self.prefix()?),
                other => return Err(self.error_at(at, format!("unexpected {other:?} in domain"))),
            }
        }
        self.sections.pop();
        Ok(domain)
    }

    fn prefix(&mut self) -> Result<PrefixRecord> {
        let mut prefix = PrefixRecord::new(self.parse(scalar, "prefix")?.into_title());
        self.sections.push(format!("prefix {:?}", prefix.prefix));
        self.parse(symbol('{'), "'{'")?;

        while !self.close()? {
            let (keyword, at) = self.keyword()?;
            match keyword {
                "max_locdb" => prefix.max_locdb = self.parse(option_number::<i64>, "max_locdb = <integer>")?,
                "target" => prefix.targets.push(self.target()?),
                other => return Err(self.error_at(at, format!("unexpected {other:?} in prefix"))),
            }
        }
        self.sections.pop();
        Ok(prefix)
    }

    fn target(&mut self) -> Result<TargetRecord> {
        let mut target = TargetRecord::new(self.parse(scalar, "target")?.into_title());
        self.sections.push(format!("target {:?}", target.host));
        self.parse(symbol('{'), "'{'")?;

        while !self.close()? {
            let (keyword, at) = self.keyword()?;
            match keyword {
                "prob" => target.prob = self.parse(option_number::<f64>, "prob = <number>")?,
                "strip" => target.strip = self.parse(option_number::<i64>, "strip = <integer>")?,
                "rewrite_prefix" => target.rewrite_prefix = self.parse(option_string, "rewrite_prefix = <string>")?,
                "rewrite_suffix" => target.rewrite_suffix = self.parse(option_string, "rewrite_suffix = <string>")?,
                "hash_index" => target.hash_index = self.parse(option_number::<i64>, "hash_index = <integer>")?,
                "status" => target.status = self.parse(option_number::<i64>, "status = <integer>")?,
                "comment" => target.comment = self.parse(option_string, "comment = <string>")?,
                other => return Err(self.error_at(at, format!("unknown option {other:?}"))),
            }
        }
        self.sections.pop();
        Ok(target)
    }
}

/// Parse route file text. `source_name` is used in error messages.
pub fn parse_record(input: &str, source_name: &str) -> Result<RouteRecord> {
    Reader::new(input, source_name).record()
}
