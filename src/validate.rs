//! Rule-expression validation for single values.
//!
//! A rule expression is a comma-separated list of tags, optionally with an
//! `=` parameter: `required,email`, `omitempty,min=3,max=32`. It compiles to
//! an ordered list of [`Rule`]s. Checking a value runs every rule and
//! collects every failure; the one exception is `omitempty`, which ends the
//! check early when the value is empty.
//!
//! ```rust
//! use kite::validate;
//!
//! let err = validate::var("admin#admin.com", "required,email").unwrap_err();
//! assert_eq!(err.to_string(),
//!     "Key: '' Error:Field validation for '' failed on the 'email' tag");
//! ```

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")
        .expect("email regex is valid")
});

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url regex is valid"));

static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").expect("numeric regex is valid"));

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").expect("alpha regex is valid"));

static ALPHANUM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("alphanum regex is valid"));

// ── Rules ─────────────────────────────────────────────────────────────────────

/// One named predicate from a rule expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Value must be non-empty.
    Required,
    /// Stop checking if the value is empty.
    OmitEmpty,
    Email,
    Url,
    Numeric,
    Alpha,
    Alphanum,
    /// At least `n` characters.
    Min(usize),
    /// At most `n` characters.
    Max(usize),
    /// Exactly `n` characters.
    Len(usize),
}

impl Rule {
    /// The tag as written in a rule expression.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Required  => "required",
            Self::OmitEmpty => "omitempty",
            Self::Email     => "email",
            Self::Url       => "url",
            Self::Numeric   => "numeric",
            Self::Alpha     => "alpha",
            Self::Alphanum  => "alphanum",
            Self::Min(_)    => "min",
            Self::Max(_)    => "max",
            Self::Len(_)    => "len",
        }
    }

    pub fn param(&self) -> Option<usize> {
        match self {
            Self::Min(n) | Self::Max(n) | Self::Len(n) => Some(*n),
            _ => None,
        }
    }

    fn holds(&self, value: &str) -> bool {
        match self {
            Self::Required  => !value.is_empty(),
            Self::OmitEmpty => true,
            Self::Email     => EMAIL_REGEX.is_match(value),
            Self::Url       => URL_REGEX.is_match(value),
            Self::Numeric   => NUMERIC_REGEX.is_match(value),
            Self::Alpha     => ALPHA_REGEX.is_match(value),
            Self::Alphanum  => ALPHANUM_REGEX.is_match(value),
            Self::Min(n)    => value.chars().count() >= *n,
            Self::Max(n)    => value.chars().count() <= *n,
            Self::Len(n)    => value.chars().count() == *n,
        }
    }
}

/// A malformed rule expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("empty rule in expression `{0}`")]
    Empty(String),

    #[error("unknown validation tag `{0}`")]
    UnknownTag(String),

    #[error("tag `{tag}` needs a numeric parameter, got `{param}`")]
    BadParam { tag: String, param: String },

    #[error("tag `{0}` takes no parameter")]
    UnexpectedParam(String),
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tag, param) = match s.split_once('=') {
            Some((tag, param)) => (tag.trim(), Some(param.trim())),
            None => (s.trim(), None),
        };

        let count = |ctor: fn(usize) -> Rule| match param {
            Some(p) => p.parse().map(ctor).map_err(|_| RuleError::BadParam {
                tag: tag.to_owned(),
                param: p.to_owned(),
            }),
            None => Err(RuleError::BadParam { tag: tag.to_owned(), param: String::new() }),
        };

        let plain = |rule: Rule| match param {
            Some(_) => Err(RuleError::UnexpectedParam(tag.to_owned())),
            None => Ok(rule),
        };

        match tag {
            "required"  => plain(Rule::Required),
            "omitempty" => plain(Rule::OmitEmpty),
            "email"     => plain(Rule::Email),
            "url"       => plain(Rule::Url),
            "numeric"   => plain(Rule::Numeric),
            "alpha"     => plain(Rule::Alpha),
            "alphanum"  => plain(Rule::Alphanum),
            "min"       => count(Rule::Min),
            "max"       => count(Rule::Max),
            "len"       => count(Rule::Len),
            other       => Err(RuleError::UnknownTag(other.to_owned())),
        }
    }
}

/// A compiled rule expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rules(Vec<Rule>);

impl Rules {
    pub fn rules(&self) -> &[Rule] {
        &self.0
    }

    /// Checks an unnamed value. Equivalent to `check_field("", value)`.
    pub fn check(&self, value: &str) -> Result<(), ValidationErrors> {
        self.check_field("", value)
    }

    /// Runs every rule against `value` and collects all failures.
    pub fn check_field(&self, field: &str, value: &str) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        for rule in &self.0 {
            if *rule == Rule::OmitEmpty && value.is_empty() {
                break;
            }
            if !rule.holds(value) {
                errors.push(FieldError {
                    field: field.to_owned(),
                    rule: rule.clone(),
                    value: value.to_owned(),
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(ValidationErrors(errors)) }
    }
}

impl FromStr for Rules {
    type Err = RuleError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        expr.split(',')
            .map(|part| {
                if part.trim().is_empty() {
                    Err(RuleError::Empty(expr.to_owned()))
                } else {
                    part.parse()
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Rules)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// One failed rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    field: String,
    rule: Rule,
    value: String,
}

impl FieldError {
    pub fn field(&self) -> &str { &self.field }
    pub fn tag(&self) -> &'static str { self.rule.tag() }
    pub fn param(&self) -> Option<usize> { self.rule.param() }
    pub fn value(&self) -> &str { &self.value }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Key: '{}' Error:Field validation for '{}' failed on the '{}' tag",
            self.field,
            self.field,
            self.tag(),
        )
    }
}

/// Every rule a value failed, in rule order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] { &self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> { self.0.iter() }

    /// Whether any failure came from `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.0.iter().any(|e| e.tag() == tag)
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Either the expression was malformed or the value broke it.
#[derive(Debug, Error)]
pub enum VarError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

/// Compiles `expr` and checks `value` against it.
pub fn var(value: &str, expr: &str) -> Result<(), VarError> {
    let rules: Rules = expr.parse()?;
    rules.check(value)?;
    Ok(())
}
