//! `using` directive handling for the UnityEngine.Networking namespace.

pub const LEGACY_IMPORT: &str = "using UnityEngine.Networking;";
pub const UNIFIED_IMPORT: &str = "using Mirror;";

/// `UnityWebRequest` lives in UnityEngine.Networking, not in UNet, and stays
/// valid after the namespace swap only through an explicit alias.
pub const WEB_REQUEST_TYPE: &str = "UnityWebRequest";
pub const WEB_REQUEST_ALIAS: &str =
    "using UnityWebRequest = UnityEngine.Networking.UnityWebRequest;";

/// Insert the `UnityWebRequest` alias on the line after the first legacy
/// import.
///
/// Returns `None` if the type is not referenced, the alias is already
/// declared, or there is no legacy import to anchor on. Has to run before
/// [`rename_legacy_import`], which removes the anchor.
pub fn insert_web_request_alias(buffer: &str) -> Option<String> {
    if !buffer.contains(WEB_REQUEST_TYPE) || buffer.contains(WEB_REQUEST_ALIAS) {
        return None;
    }
    let anchor_end = buffer.find(LEGACY_IMPORT)? + LEGACY_IMPORT.len();

    let newline = line_ending(buffer);
    let mut out = String::with_capacity(buffer.len() + newline.len() + WEB_REQUEST_ALIAS.len());
    out.push_str(&buffer[..anchor_end]);
    out.push_str(newline);
    out.push_str(WEB_REQUEST_ALIAS);
    out.push_str(&buffer[anchor_end..]);
    Some(out)
}

/// Replace the legacy import with `using Mirror;`.
///
/// Every legacy import is rewritten, and any line that then repeats the
/// unified import is dropped, so the result imports Mirror exactly once.
pub fn rename_legacy_import(buffer: &str) -> Option<String> {
    if !buffer.contains(LEGACY_IMPORT) {
        return None;
    }

    let replaced = buffer.replace(LEGACY_IMPORT, UNIFIED_IMPORT);
    let mut seen = false;
    let mut out = String::with_capacity(replaced.len());
    for line in replaced.split_inclusive('\n') {
        if line.trim() == UNIFIED_IMPORT {
            if seen {
                continue;
            }
            seen = true;
        }
        out.push_str(line);
    }
    Some(out)
}

fn line_ending(buffer: &str) -> &'static str {
    if buffer.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}
