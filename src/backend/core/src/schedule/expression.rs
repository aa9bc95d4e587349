//! Object identities, schedule expressions and resolved cron expressions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CadenceError;

/// Stable key of a schedule object: `"<namespace>/<name>"`.
///
/// The key is the only input to jitter derivation. Recreating an object under
/// a different name moves its jittered slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectIdentity(String);

impl ObjectIdentity {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self(format!("{}/{}", namespace, name))
    }

    /// Wrap a precomputed key as-is.
    pub fn from_key(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once('/').map(|(namespace, _)| namespace)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.split_once('/').map(|(_, name)| name)
    }
}

impl fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectIdentity {
    type Err = CadenceError;

    /// Accepts exactly `namespace/name` with both parts non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((namespace, name))
                if !namespace.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(namespace, name))
            }
            _ => Err(CadenceError::invalid_identity(s)),
        }
    }
}

/// The recognized jittered schedule macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RandomMacro {
    #[serde(rename = "@hourly-random")]
    Hourly,
    #[serde(rename = "@daily-random")]
    Daily,
    #[serde(rename = "@weekly-random")]
    Weekly,
    #[serde(rename = "@monthly-random")]
    Monthly,
}

impl RandomMacro {
    pub const ALL: [RandomMacro; 4] = [
        RandomMacro::Hourly,
        RandomMacro::Daily,
        RandomMacro::Weekly,
        RandomMacro::Monthly,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "@hourly-random",
            Self::Daily => "@daily-random",
            Self::Weekly => "@weekly-random",
            Self::Monthly => "@monthly-random",
        }
    }

    /// Exact, case-sensitive match. Anything else is not a macro.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == token)
    }
}

impl fmt::Display for RandomMacro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schedule as the user wrote it.
///
/// Unknown `@` tokens are literals; cron grammar is checked downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScheduleExpression {
    Random(RandomMacro),
    Literal(String),
}

impl ScheduleExpression {
    pub fn parse(input: &str) -> Self {
        match RandomMacro::from_token(input) {
            Some(m) => Self::Random(m),
            None => Self::Literal(input.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Random(m) => m.as_str(),
            Self::Literal(s) => s,
        }
    }

    pub fn is_random(&self) -> bool {
        matches!(self, Self::Random(_))
    }

    pub fn random_macro(&self) -> Option<RandomMacro> {
        match self {
            Self::Random(m) => Some(*m),
            Self::Literal(_) => None,
        }
    }
}

impl From<&str> for ScheduleExpression {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

impl From<String> for ScheduleExpression {
    fn from(input: String) -> Self {
        match RandomMacro::from_token(&input) {
            Some(m) => Self::Random(m),
            None => Self::Literal(input),
        }
    }
}

impl From<RandomMacro> for ScheduleExpression {
    fn from(m: RandomMacro) -> Self {
        Self::Random(m)
    }
}

impl From<ScheduleExpression> for String {
    fn from(expr: ScheduleExpression) -> Self {
        match expr {
            ScheduleExpression::Random(m) => m.as_str().to_string(),
            ScheduleExpression::Literal(s) => s,
        }
    }
}

impl fmt::Display for ScheduleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete cron expression ready to install on a CronJob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CronExpression(String);

impl CronExpression {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whitespace-separated fields.
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.split_whitespace()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for CronExpression {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CronExpression {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
