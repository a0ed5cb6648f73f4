//! Ordered substitution rules for the UNet to Mirror migration.
//!
//! Each [`Rule`] is a single (pattern, replacement) unit and a [`RuleTable`]
//! is applied front to back against an evolving buffer, so a later rule
//! always sees the output of the earlier ones. The built-in table is
//! compiled once and shared read-only for the life of the process.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use thiserror::Error;

/// Textual description of a rule, as written in the built-in table or in a
/// config file. Compiled into a [`Rule`] by [`RuleTable::from_specs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub name: String,
    pub pattern: String,
    pub replacement: String,
}

impl RuleSpec {
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("rule #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("rule '{name}' has an empty pattern")]
    EmptyPattern { name: String },

    #[error("rule '{name}' is defined more than once")]
    DuplicateName { name: String },

    #[error("rule '{name}' has an invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled substitution rule.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    pattern: Regex,
    replacement: String,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace every match in `buffer`.
    ///
    /// Returns `None` when nothing changed, either because the pattern did
    /// not match or because every match was already in its replaced form.
    pub fn apply(&self, buffer: &str) -> Option<String> {
        match self.pattern.replace_all(buffer, self.replacement.as_str()) {
            Cow::Borrowed(_) => None,
            Cow::Owned(rewritten) if rewritten == buffer => None,
            Cow::Owned(rewritten) => Some(rewritten),
        }
    }
}

/// Ordered sequence of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Validate and compile `specs`, preserving their order.
    ///
    /// This is the run-level guard: any error here must stop the migration
    /// before a single file is read.
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self, RuleError> {
        let mut table = Self::default();
        table.extend_from_specs(specs)?;
        Ok(table)
    }

    /// The built-in rule table.
    pub fn builtin() -> &'static RuleTable {
        &BUILTIN_RULES
    }

    /// Append `specs` after the rules already in the table.
    ///
    /// Either every spec is appended or, on error, the table is left as it
    /// was. `EmptyName` indices count from the start of the whole table.
    pub fn extend_from_specs(&mut self, specs: &[RuleSpec]) -> Result<(), RuleError> {
        let base = self.rules.len();
        let mut compiled: Vec<Rule> = Vec::with_capacity(specs.len());

        for (offset, spec) in specs.iter().enumerate() {
            let name = spec.name.trim();
            if name.is_empty() {
                return Err(RuleError::EmptyName {
                    index: base + offset,
                });
            }
            if spec.pattern.is_empty() {
                return Err(RuleError::EmptyPattern {
                    name: name.to_string(),
                });
            }
            if self.rules.iter().chain(&compiled).any(|rule| rule.name == name) {
                return Err(RuleError::DuplicateName {
                    name: name.to_string(),
                });
            }

            let pattern =
                Regex::new(&spec.pattern).map_err(|source| RuleError::InvalidPattern {
                    name: name.to_string(),
                    source,
                })?;

            compiled.push(Rule {
                name: name.to_string(),
                pattern,
                replacement: spec.replacement.clone(),
            });
        }

        self.rules.extend(compiled);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Specs of the built-in rules, in application order.
///
/// The attribute rules drop the legacy argument list (it only ever carried
/// a QoS channel) but keep the brackets and the attribute name. Every
/// replacement is a fixed point of its own pattern, so running the table
/// twice is the same as running it once.
pub fn builtin_specs() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new("sync-list-struct", r"\bSyncListStruct\b", "SyncListSTRUCT"),
        RuleSpec::new(
            "command-attribute",
            r"\[Command(?:\([^\])]*\))?\]",
            "[Command]",
        ),
        RuleSpec::new(
            "client-rpc-attribute",
            r"\[ClientRpc(?:\([^\])]*\))?\]",
            "[ClientRpc]",
        ),
        RuleSpec::new(
            "target-rpc-attribute",
            r"\[TargetRpc(?:\([^\])]*\))?\]",
            "[TargetRpc]",
        ),
        RuleSpec::new(
            "sync-event-attribute",
            r"\[SyncEvent(?:\([^\])]*\))?\]",
            "[SyncEvent]",
        ),
        RuleSpec::new("network-hash128", r"\bNetworkHash128\b", "System.Guid"),
        RuleSpec::new("network-instance-id", r"\bNetworkInstanceId\b", "uint"),
        RuleSpec::new(
            "send-interval",
            r"\bGetNetworkSendInterval\(\s*\)",
            "syncInterval",
        ),
        RuleSpec::new(
            "server-connections",
            r"\bNetworkServer\.connections(?:\.Values)?\b",
            "NetworkServer.connections.Values",
        ),
    ]
}

static BUILTIN_RULES: LazyLock<RuleTable> = LazyLock::new(|| {
    RuleTable::from_specs(&builtin_specs()).expect("built-in migration rules must compile")
});
