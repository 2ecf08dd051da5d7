//! PEP 508 environment markers.
//!
//! A marker such as `python_version < "3.8" and sys_platform != "win32"` is
//! parsed into a [`MarkerTree`] and evaluated against a
//! [`MarkerEnvironment`]. Evaluation is three-valued: a comparison that
//! reads a variable the environment does not define is undecided, and
//! `and`/`or` combine undecided results the way Kleene logic does.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

lazy_static! {
    static ref MARKER_VERSION: Regex = Regex::new(
        r"(?i)^v?(\d+(?:\.\d+)*)(?:[-_.]?(a|alpha|b|beta|c|rc|pre|preview)[-_.]?(\d*))?$"
    ).unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("Unterminated string in marker \"{0}\"")]
    UnterminatedString(String),
    #[error("Unexpected \"{token}\" in marker \"{marker}\"")]
    UnexpectedToken { marker: String, token: String },
    #[error("Unexpected end of marker \"{0}\"")]
    UnexpectedEnd(String),
}

/// Values of the marker variables for one interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerEnvironment {
    values: BTreeMap<String, String>,
}

impl MarkerEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(variable.into(), value.into());
        self
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.values.get(variable).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn lookup(&self, variable: &str) -> Option<&str> {
        match self.get(variable) {
            Some(value) => Some(value),
            // requirements are read for a plain install, with no extra selected
            None if variable == "extra" => Some(""),
            // legacy dotted spellings
            None => match variable {
                "os.name" => self.get("os_name"),
                "sys.platform" => self.get("sys_platform"),
                "platform.version" => self.get("platform_version"),
                "platform.machine" => self.get("platform_machine"),
                "platform.python_implementation" | "python_implementation" => {
                    self.get("platform_python_implementation")
                }
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Compatible,
    Arbitrary,
    In,
    NotIn,
}

impl MarkerOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerOperator::Equal => "==",
            MarkerOperator::NotEqual => "!=",
            MarkerOperator::LessThan => "<",
            MarkerOperator::LessThanOrEqual => "<=",
            MarkerOperator::GreaterThan => ">",
            MarkerOperator::GreaterThanOrEqual => ">=",
            MarkerOperator::Compatible => "~=",
            MarkerOperator::Arbitrary => "===",
            MarkerOperator::In => "in",
            MarkerOperator::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerValue {
    Variable(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerTree {
    Expression {
        lhs: MarkerValue,
        op: MarkerOperator,
        rhs: MarkerValue,
    },
    And(Vec<MarkerTree>),
    Or(Vec<MarkerTree>),
}

impl MarkerTree {
    /// Parse a marker expression (the part of a requirement after `;`).
    ///
    /// # Examples
    ///
    /// ```
    /// use pybrew_pm::package::{MarkerEnvironment, MarkerTree};
    ///
    /// let marker = MarkerTree::parse("python_version < \"3.8\"").unwrap();
    /// let env = MarkerEnvironment::new().with("python_version", "3.11");
    /// assert_eq!(marker.evaluate(&env), Some(false));
    /// ```
    pub fn parse(marker: &str) -> Result<Self, MarkerError> {
        let tokens = tokenize(marker)?;
        let mut parser = Parser {
            marker,
            tokens,
            pos: 0,
        };

        let tree = parser.parse_or()?;
        match parser.peek() {
            None => Ok(tree),
            Some(token) => Err(parser.unexpected(token)),
        }
    }

    /// Evaluate against `env`; `None` when the result depends on a variable
    /// `env` does not define.
    pub fn evaluate(&self, env: &MarkerEnvironment) -> Option<bool> {
        match self {
            MarkerTree::Expression { lhs, op, rhs } => {
                let lhs = resolve_value(lhs, env)?;
                let rhs = resolve_value(rhs, env)?;
                Some(compare(lhs, *op, rhs))
            }
            MarkerTree::And(children) => {
                let mut undecided = false;
                for child in children {
                    match child.evaluate(env) {
                        Some(false) => return Some(false),
                        None => undecided = true,
                        Some(true) => {}
                    }
                }
                (!undecided).then_some(true)
            }
            MarkerTree::Or(children) => {
                let mut undecided = false;
                for child in children {
                    match child.evaluate(env) {
                        Some(true) => return Some(true),
                        None => undecided = true,
                        Some(false) => {}
                    }
                }
                (!undecided).then_some(false)
            }
        }
    }
}

fn resolve_value<'a>(value: &'a MarkerValue, env: &'a MarkerEnvironment) -> Option<&'a str> {
    match value {
        MarkerValue::Literal(literal) => Some(literal.as_str()),
        MarkerValue::Variable(variable) => env.lookup(variable),
    }
}

fn compare(lhs: &str, op: MarkerOperator, rhs: &str) -> bool {
    match op {
        MarkerOperator::In => return rhs.contains(lhs),
        MarkerOperator::NotIn => return !rhs.contains(lhs),
        MarkerOperator::Arbitrary => return lhs == rhs,
        _ => {}
    }

    if let Some(prefix) = rhs.strip_suffix(".*") {
        if let (Some(version), Some(prefix)) = (MarkerVersion::parse(lhs), MarkerVersion::parse(prefix)) {
            let matches = version.starts_with(&prefix);
            return match op {
                MarkerOperator::Equal => matches,
                MarkerOperator::NotEqual => !matches,
                _ => false,
            };
        }
    }

    match (MarkerVersion::parse(lhs), MarkerVersion::parse(rhs)) {
        (Some(left), Some(right)) => {
            let ordering = left.cmp(&right);
            match op {
                MarkerOperator::Equal => ordering == Ordering::Equal,
                MarkerOperator::NotEqual => ordering != Ordering::Equal,
                MarkerOperator::LessThan => ordering == Ordering::Less,
                MarkerOperator::LessThanOrEqual => ordering != Ordering::Greater,
                MarkerOperator::GreaterThan => ordering == Ordering::Greater,
                MarkerOperator::GreaterThanOrEqual => ordering != Ordering::Less,
                MarkerOperator::Compatible => {
                    right.release.len() >= 2
                        && ordering != Ordering::Less
                        && left.starts_with(&MarkerVersion {
                            release: right.release[..right.release.len() - 1].to_vec(),
                            pre: None,
                        })
                }
                MarkerOperator::Arbitrary | MarkerOperator::In | MarkerOperator::NotIn => false,
            }
        }
        // ordering is undefined for plain strings
        _ => match op {
            MarkerOperator::Equal => lhs == rhs,
            MarkerOperator::NotEqual => lhs != rhs,
            _ => false,
        },
    }
}

/// The comparable part of a PEP 440 version: release segments and an
/// optional pre-release tag.
#[derive(Debug, Clone)]
struct MarkerVersion {
    release: Vec<u64>,
    pre: Option<(u8, u64)>,
}

impl MarkerVersion {
    fn parse(version: &str) -> Option<Self> {
        let captures = MARKER_VERSION.captures(version.trim())?;

        let release = captures
            .get(1)?
            .as_str()
            .split('.')
            .map(|segment| segment.parse().ok())
            .collect::<Option<Vec<u64>>>()?;

        let pre = match captures.get(2) {
            Some(tag) => {
                let rank = match tag.as_str().to_lowercase().as_str() {
                    "a" | "alpha" => 0,
                    "b" | "beta" => 1,
                    _ => 2,
                };
                let number = captures
                    .get(3)
                    .map(|n| n.as_str())
                    .filter(|n| !n.is_empty())
                    .map_or(Some(0), |n| n.parse().ok())?;
                Some((rank, number))
            }
            None => None,
        };

        Some(Self { release, pre })
    }

    fn segment(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    fn starts_with(&self, prefix: &MarkerVersion) -> bool {
        (0..prefix.release.len()).all(|i| self.segment(i) == prefix.release[i])
    }
}

impl Ord for MarkerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            match self.segment(i).cmp(&other.segment(i)) {
                Ordering::Equal => {}
                ordering => return ordering,
            }
        }

        match (self.pre, other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    }
}

impl PartialEq for MarkerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MarkerVersion {}

impl PartialOrd for MarkerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LeftParen,
    RightParen,
    And,
    Or,
    Op(MarkerOperator),
    Variable(String),
    Literal(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::And => f.write_str("and"),
            Token::Or => f.write_str("or"),
            Token::Op(op) => f.write_str(op.as_str()),
            Token::Variable(name) => f.write_str(name),
            Token::Literal(value) => write!(f, "'{}'", value),
        }
    }
}

fn tokenize(marker: &str) -> Result<Vec<Token>, MarkerError> {
    let chars: Vec<char> = marker.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LeftParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RightParen);
                i += 1;
            }
            '"' | '\'' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == c)
                    .ok_or_else(|| MarkerError::UnterminatedString(marker.to_string()))?;
                tokens.push(Token::Literal(chars[i + 1..i + 1 + end].iter().collect()));
                i += end + 2;
            }
            '=' | '!' | '<' | '>' | '~' => {
                let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
                let (op, len) = if rest.starts_with("===") {
                    (MarkerOperator::Arbitrary, 3)
                } else if rest.starts_with("==") {
                    (MarkerOperator::Equal, 2)
                } else if rest.starts_with("!=") {
                    (MarkerOperator::NotEqual, 2)
                } else if rest.starts_with("<=") {
                    (MarkerOperator::LessThanOrEqual, 2)
                } else if rest.starts_with(">=") {
                    (MarkerOperator::GreaterThanOrEqual, 2)
                } else if rest.starts_with("~=") {
                    (MarkerOperator::Compatible, 2)
                } else if c == '<' {
                    (MarkerOperator::LessThan, 1)
                } else if c == '>' {
                    (MarkerOperator::GreaterThan, 1)
                } else {
                    return Err(MarkerError::UnexpectedToken {
                        marker: marker.to_string(),
                        token: c.to_string(),
                    });
                };
                tokens.push(Token::Op(op));
                i += len;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let token = match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "in" => Token::Op(MarkerOperator::In),
                    "not" => {
                        expect_in(&chars, &mut i, marker)?;
                        Token::Op(MarkerOperator::NotIn)
                    }
                    _ => Token::Variable(word),
                };
                tokens.push(token);
            }
            _ => {
                return Err(MarkerError::UnexpectedToken {
                    marker: marker.to_string(),
                    token: c.to_string(),
                })
            }
        }
    }

    Ok(tokens)
}

/// Consume the `in` that must follow `not`.
fn expect_in(chars: &[char], i: &mut usize, marker: &str) -> Result<(), MarkerError> {
    while *i < chars.len() && chars[*i].is_whitespace() {
        *i += 1;
    }

    let followed_by_in = chars.get(*i) == Some(&'i')
        && chars.get(*i + 1) == Some(&'n')
        && !chars
            .get(*i + 2)
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_');

    if followed_by_in {
        *i += 2;
        Ok(())
    } else {
        Err(MarkerError::UnexpectedToken {
            marker: marker.to_string(),
            token: "not".to_string(),
        })
    }
}

struct Parser<'a> {
    marker: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, MarkerError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| MarkerError::UnexpectedEnd(self.marker.to_string()))?;
        self.pos += 1;
        Ok(token)
    }

    fn unexpected(&self, token: &Token) -> MarkerError {
        MarkerError::UnexpectedToken {
            marker: self.marker.to_string(),
            token: token.to_string(),
        }
    }

    fn parse_or(&mut self) -> Result<MarkerTree, MarkerError> {
        let mut children = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            children.push(self.parse_and()?);
        }

        Ok(match children.len() {
            1 => children.remove(0),
            _ => MarkerTree::Or(children),
        })
    }

    fn parse_and(&mut self) -> Result<MarkerTree, MarkerError> {
        let mut children = vec![self.parse_atom()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            children.push(self.parse_atom()?);
        }

        Ok(match children.len() {
            1 => children.remove(0),
            _ => MarkerTree::And(children),
        })
    }

    fn parse_atom(&mut self) -> Result<MarkerTree, MarkerError> {
        if self.peek() == Some(&Token::LeftParen) {
            self.pos += 1;
            let tree = self.parse_or()?;
            return match self.next()? {
                Token::RightParen => Ok(tree),
                token => Err(self.unexpected(&token)),
            };
        }

        let lhs = self.parse_value()?;
        let op = match self.next()? {
            Token::Op(op) => op,
            token => return Err(self.unexpected(&token)),
        };
        let rhs = self.parse_value()?;

        Ok(MarkerTree::Expression { lhs, op, rhs })
    }

    fn parse_value(&mut self) -> Result<MarkerValue, MarkerError> {
        match self.next()? {
            Token::Variable(name) => Ok(MarkerValue::Variable(name)),
            Token::Literal(value) => Ok(MarkerValue::Literal(value)),
            token => Err(self.unexpected(&token)),
        }
    }
}
