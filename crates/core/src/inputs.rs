//! Action input resolution.
//!
//! `action.yml` forwards each input as an environment variable named
//! `GHA_ZIZMOR_<INPUT>`, with the input name upcased and dashes replaced by
//! underscores. Every input is required to be present, even when empty; the
//! action definition always sets them.

use crate::{Error, Result};
use secrecy::SecretString;
use std::env::VarError;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Prefix shared by all input environment variables.
pub const ENV_PREFIX: &str = "GHA_ZIZMOR";

/// Environment variable name for an action input.
#[must_use]
pub fn env_name(input: &str) -> String {
    format!("{ENV_PREFIX}_{}", input.replace('-', "_").to_uppercase())
}

/// zizmor's rule-selection persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    /// Default findings only.
    Regular,
    /// Adds findings that are noisy but occasionally useful.
    Pedantic,
    /// Everything, including low-signal audit findings.
    Auditor,
}

impl Persona {
    /// The value zizmor expects on its command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Pedantic => "pedantic",
            Self::Auditor => "auditor",
        }
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "pedantic" => Ok(Self::Pedantic),
            "auditor" => Ok(Self::Auditor),
            _ => Err(format!("invalid persona: {s}")),
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum finding severity filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Severity not determined.
    Unknown,
    /// Informational findings.
    Informational,
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
}

impl Severity {
    /// The value zizmor expects on its command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Informational => "informational",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum finding confidence filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    /// Confidence not determined.
    Unknown,
    /// Low confidence.
    Low,
    /// Medium confidence.
    Medium,
    /// High confidence.
    High,
}

impl Confidence {
    /// The value zizmor expects on its command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested zizmor version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolVersion {
    /// The newest published release.
    Latest,
    /// A specific version, exactly as the user wrote it.
    Exact(String),
}

impl ToolVersion {
    /// Parse a version input. `latest` is the only sentinel.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == "latest" {
            Self::Latest
        } else {
            Self::Exact(s.to_string())
        }
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Exact(v) => f.write_str(v),
        }
    }
}

/// Parse a boolean input the way `action.yml` users write them.
pub fn parse_bool(v: &str) -> std::result::Result<bool, String> {
    let v = v.to_lowercase();
    match v.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(format!("invalid boolean value: {v}")),
    }
}

/// Parse the `min-severity` input; empty means no filter.
pub fn parse_min_severity(v: &str) -> std::result::Result<Option<Severity>, String> {
    let severity = match v {
        "" => return Ok(None),
        "unknown" => Severity::Unknown,
        "informational" => Severity::Informational,
        "low" => Severity::Low,
        "medium" => Severity::Medium,
        "high" => Severity::High,
        _ => return Err(format!("invalid minimum severity: {v}")),
    };
    Ok(Some(severity))
}

/// Parse the `min-confidence` input; empty means no filter.
pub fn parse_min_confidence(v: &str) -> std::result::Result<Option<Confidence>, String> {
    let confidence = match v {
        "" => return Ok(None),
        "unknown" => Confidence::Unknown,
        "low" => Confidence::Low,
        "medium" => Confidence::Medium,
        "high" => Confidence::High,
        _ => return Err(format!("invalid minimum confidence: {v}")),
    };
    Ok(Some(confidence))
}

/// Split the `inputs` input with POSIX shell quoting rules.
///
/// `#` has no special meaning: a word starting with it is a target, not the
/// start of a comment.
pub fn parse_targets(v: &str) -> std::result::Result<Vec<String>, String> {
    shlex::split(&escape_comment_markers(v))
        .ok_or_else(|| format!("unbalanced quoting in {v:?}"))
}

/// Backslash-escape every unquoted `#` that begins a word, which is the only
/// place `shlex` treats it as a comment.
fn escape_comment_markers(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    let mut chars = v.chars();
    let mut word_start = true;

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\n' => {
                out.push(c);
                word_start = true;
                continue;
            }
            '#' if word_start => out.push_str("\\#"),
            '\\' => {
                out.push(c);
                out.extend(chars.next());
            }
            '\'' => {
                out.push(c);
                for q in chars.by_ref() {
                    out.push(q);
                    if q == '\'' {
                        break;
                    }
                }
            }
            '"' => {
                out.push(c);
                while let Some(q) = chars.next() {
                    out.push(q);
                    match q {
                        '\\' => out.extend(chars.next()),
                        '"' => break,
                        _ => {}
                    }
                }
            }
            _ => out.push(c),
        }
        word_start = false;
    }

    out
}

/// Validated action inputs. Built once, read-only afterwards.
#[derive(Debug)]
pub struct Inputs {
    /// Files, directories or repository slugs to audit.
    pub targets: Vec<String>,
    /// Whether audits that need network access are enabled.
    pub online_audits: bool,
    /// Rule-selection persona.
    pub persona: Persona,
    /// Only report findings at or above this severity.
    pub min_severity: Option<Severity>,
    /// Only report findings at or above this confidence.
    pub min_confidence: Option<Confidence>,
    /// Requested zizmor version.
    pub version: ToolVersion,
    /// GitHub token handed to zizmor and used for release downloads.
    pub token: SecretString,
    /// Emit SARIF for GitHub Advanced Security instead of plain text.
    pub advanced_security: bool,
}

impl Inputs {
    /// Resolve inputs from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name))
    }

    /// Resolve inputs through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let targets = input(&lookup, "inputs", parse_targets)?;
        let online_audits = input(&lookup, "online-audits", parse_bool)?;
        let persona = input(&lookup, "persona", Persona::from_str)?;
        let min_severity = input(&lookup, "min-severity", parse_min_severity)?;
        let min_confidence = input(&lookup, "min-confidence", parse_min_confidence)?;
        let version = input(&lookup, "version", |v| Ok(ToolVersion::parse(v)))?;
        let token = input(&lookup, "token", |v| Ok(SecretString::from(v.to_string())))?;
        let advanced_security = input(&lookup, "advanced-security", parse_bool)?;

        // Everything after `--` is positional anyway; rejecting these early
        // keeps users from believing extra flags can be smuggled through.
        if let Some(target) = targets.iter().find(|t| t.starts_with('-')) {
            return Err(Error::FlagLikeTarget {
                target: target.clone(),
            });
        }

        let inputs = Self {
            targets,
            online_audits,
            persona,
            min_severity,
            min_confidence,
            version,
            token,
            advanced_security,
        };
        debug!(
            targets = ?inputs.targets,
            version = %inputs.version,
            advanced_security = inputs.advanced_security,
            "Resolved action inputs"
        );
        Ok(inputs)
    }
}

fn input<T, F, P>(lookup: &F, name: &str, parser: P) -> Result<T>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
    P: FnOnce(&str) -> std::result::Result<T, String>,
{
    let variable = env_name(name);
    let raw = match lookup(&variable) {
        Ok(raw) => raw,
        Err(VarError::NotPresent) => return Err(Error::MissingInput { variable }),
        Err(VarError::NotUnicode(_)) => {
            return Err(Error::invalid_input(name, "value is not valid UTF-8"));
        }
    };
    parser(&raw).map_err(|message| Error::invalid_input(name, message))
}
