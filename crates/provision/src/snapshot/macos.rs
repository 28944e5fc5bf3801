//! macOS preference capture helpers.
//!
//! Preferences are read with `defaults export <domain> -`, which prints the
//! whole domain as an XML plist. Only the keys listed in [`TRACKED_PREFS`]
//! are kept.

use super::MacOsPref;
use crate::error::{Error, Result};
use plist::{Dictionary, Value};
use std::io::Cursor;

/// A preference key worth carrying between machines.
#[derive(Debug, Clone, Copy)]
pub struct TrackedPref {
    pub domain: &'static str,
    pub key: &'static str,
    pub desc: &'static str,
}

const fn pref(domain: &'static str, key: &'static str, desc: &'static str) -> TrackedPref {
    TrackedPref { domain, key, desc }
}

pub const TRACKED_PREFS: &[TrackedPref] = &[
    pref("com.apple.dock", "autohide", "Auto-hide the Dock"),
    pref("com.apple.dock", "tilesize", "Dock icon size"),
    pref("com.apple.dock", "show-recents", "Show recent apps in the Dock"),
    pref("com.apple.dock", "mru-spaces", "Rearrange Spaces by recent use"),
    pref("com.apple.finder", "AppleShowAllFiles", "Show hidden files in Finder"),
    pref("com.apple.finder", "ShowPathbar", "Show Finder path bar"),
    pref("com.apple.finder", "ShowStatusBar", "Show Finder status bar"),
    pref("com.apple.finder", "FXPreferredViewStyle", "Default Finder view style"),
    pref("NSGlobalDomain", "AppleShowAllExtensions", "Show all file extensions"),
    pref("NSGlobalDomain", "KeyRepeat", "Key repeat rate"),
    pref("NSGlobalDomain", "InitialKeyRepeat", "Delay until key repeat"),
    pref("NSGlobalDomain", "ApplePressAndHoldEnabled", "Press-and-hold for accents"),
    pref("NSGlobalDomain", "AppleInterfaceStyle", "Dark mode"),
    pref("com.apple.screencapture", "location", "Screenshot folder"),
    pref("com.apple.screencapture", "type", "Screenshot format"),
];

/// Domains in [`TRACKED_PREFS`], in first-seen order.
pub fn tracked_domains() -> Vec<&'static str> {
    let mut domains: Vec<&'static str> = Vec::new();
    for p in TRACKED_PREFS {
        if !domains.contains(&p.domain) {
            domains.push(p.domain);
        }
    }
    domains
}

/// Parse `defaults export` output, which must be a top-level dictionary.
pub fn parse_domain(domain: &str, plist: &str) -> Result<Dictionary> {
    let value = Value::from_reader(Cursor::new(plist.as_bytes())).map_err(|e| Error::Command {
        command: format!("defaults export {domain}"),
        message: format!("unreadable plist: {e}"),
    })?;

    match value {
        Value::Dictionary(dict) => Ok(dict),
        _ => Err(Error::Command {
            command: format!("defaults export {domain}"),
            message: "expected a plist dictionary at root".to_string(),
        }),
    }
}

/// Render a scalar plist value the way `defaults read` prints it.
///
/// Booleans become `1`/`0`. Containers, dates and binary data are not
/// rendered.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Boolean(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Integer(i) => i
            .as_signed()
            .map(|v| v.to_string())
            .or_else(|| i.as_unsigned().map(|v| v.to_string())),
        Value::Real(r) => Some(r.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Tracked preferences present in an exported `domain`.
pub fn collect_prefs(domain: &str, dict: &Dictionary) -> Vec<MacOsPref> {
    TRACKED_PREFS
        .iter()
        .filter(|p| p.domain == domain)
        .filter_map(|p| {
            let value = dict.get(p.key).and_then(value_to_string)?;
            Some(MacOsPref {
                domain: p.domain.to_string(),
                key: p.key.to_string(),
                value,
                desc: p.desc.to_string(),
            })
        })
        .collect()
}

/// Tracked preferences from several `(domain, exported plist)` pairs.
///
/// A domain whose export cannot be parsed is logged and skipped; the other
/// domains are still collected.
pub fn collect_exports<'a, I>(exports: I) -> Vec<MacOsPref>
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut prefs = Vec::new();
    for (domain, exported) in exports {
        match parse_domain(domain, &exported) {
            Ok(dict) => prefs.extend(collect_prefs(domain, &dict)),
            Err(e) => log::warn!("Skipping preferences for {domain}: {e}"),
        }
    }
    prefs
}
