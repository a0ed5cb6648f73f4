//! Argument surgery for the legacy `NetworkSettings(...)` attribute.
//!
//! UNet let `NetworkSettings` pick a QoS channel; Mirror does not. Channel
//! arguments are removed, and an attribute that only configured a channel
//! is removed outright.
//!
//! Arguments are split on every comma. A comma nested inside an argument
//! (a call, a generic, a string literal) splits it too; such attributes
//! come out mangled and need a manual fix.

use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const DIRECTIVE_NAME: &str = "NetworkSettings";

/// Substring that marks an argument as configuring a QoS channel.
pub const CHANNEL_TOKEN: &str = "channel";

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<open>\[[ \t]*)?\bNetworkSettings[ \t]*\((?P<args>[^)]*)\)(?P<close>[ \t]*\])?")
        .expect("directive regex must compile")
});

/// One comma-separated argument of a `NetworkSettings` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveArgument {
    pub text: String,
    pub names_channel: bool,
}

impl DirectiveArgument {
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim().to_string();
        let names_channel = text.contains(CHANNEL_TOKEN);
        Self {
            text,
            names_channel,
        }
    }
}

/// Split an argument list on commas, trimming each piece.
pub fn split_arguments(list: &str) -> Vec<DirectiveArgument> {
    list.split(',').map(DirectiveArgument::parse).collect()
}

/// Rewrite every `NetworkSettings` attribute in `buffer`.
///
/// Returns `None` when no occurrence needed changing.
pub fn strip_channel_arguments(buffer: &str) -> Option<String> {
    let rewritten = DIRECTIVE.replace_all(buffer, rewrite_occurrence);
    if rewritten == buffer {
        None
    } else {
        Some(rewritten.into_owned())
    }
}

fn rewrite_occurrence(caps: &Captures<'_>) -> String {
    let whole = caps
        .get(0)
        .expect("capture group 0 always participates in a match");
    let Some(args) = caps.name("args") else {
        return whole.as_str().to_string();
    };
    let arguments = split_arguments(args.as_str());

    match arguments.as_slice() {
        [single] if single.names_channel => {
            if caps.name("open").is_some() && caps.name("close").is_some() {
                tracing::debug!("removing channel-only {DIRECTIVE_NAME} attribute");
                String::new()
            } else {
                tracing::warn!(
                    "leaving {} in place: not a standalone attribute",
                    whole.as_str()
                );
                whole.as_str().to_string()
            }
        }
        [_] => whole.as_str().to_string(),
        many => {
            let kept: Vec<&str> = many
                .iter()
                .filter(|arg| !arg.names_channel)
                .map(|arg| arg.text.as_str())
                .collect();

            let start = args.start() - whole.start();
            let end = args.end() - whole.start();
            let original = whole.as_str();
            format!("{}{}{}", &original[..start], kept.join(", "), &original[end..])
        }
    }
}
