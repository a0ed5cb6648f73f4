//! The text rewrite pipeline.
//!
//! [`rewrite`] is a pure function from file text to file text. It runs, in
//! this order:
//!
//! 1. `UnityWebRequest` alias insertion (needs the legacy import as anchor)
//! 2. legacy `using UnityEngine.Networking;` to `using Mirror;`
//! 3. every rule of the [`RuleTable`], each against the previous output
//! 4. `NetworkSettings(...)` channel argument removal
//!
//! Every step is idempotent, so feeding the output back in changes nothing.

pub mod directive;
pub mod namespace;

use crate::rules::RuleTable;

pub use directive::{split_arguments, strip_channel_arguments, DirectiveArgument};
pub use namespace::{insert_web_request_alias, rename_legacy_import};

/// Step names reported in [`Rewrite::applied`] for the fixed steps.
pub const ALIAS_STEP: &str = "web-request-alias";
pub const IMPORT_STEP: &str = "namespace-import";
pub const DIRECTIVE_STEP: &str = "network-settings";

/// Output of the pipeline for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Rewrite carries the new content; it is not written anywhere"]
pub struct Rewrite {
    pub content: String,
    pub changed: bool,
    /// Names of the steps and rules that altered the text, in order.
    pub applied: Vec<String>,
}

/// Run the full pipeline over `source`.
pub fn rewrite(source: &str, rules: &RuleTable) -> Rewrite {
    let mut buffer = source.to_string();
    let mut applied = Vec::new();

    let mut step = |name: &str, buffer: &mut String, output: Option<String>| {
        if let Some(output) = output {
            *buffer = output;
            applied.push(name.to_string());
        }
    };

    let aliased = insert_web_request_alias(&buffer);
    step(ALIAS_STEP, &mut buffer, aliased);

    let renamed = rename_legacy_import(&buffer);
    step(IMPORT_STEP, &mut buffer, renamed);

    for rule in rules {
        let replaced = rule.apply(&buffer);
        step(rule.name(), &mut buffer, replaced);
    }

    let stripped = strip_channel_arguments(&buffer);
    step(DIRECTIVE_STEP, &mut buffer, stripped);

    let changed = buffer != source;
    Rewrite {
        content: buffer,
        changed,
        applied,
    }
}
