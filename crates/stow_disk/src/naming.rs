// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Deterministic mapping from keys and namespaces to file system names.

use std::fmt::Write as _;

use xxhash_rust::xxh3::xxh3_128;

/// Extension of every entry file.
pub const ENTRY_EXTENSION: &str = "cache";

/// Longest escaped name used verbatim. Longer names are shortened with a hash.
pub const MAX_READABLE_NAME: usize = 200;

/// Length of the readable prefix kept in a shortened name.
const SHORTENED_PREFIX: usize = 96;

/// Separates the readable prefix from the hash in a shortened name. Escaping
/// always encodes `~`, so verbatim names never contain it.
const HASH_MARKER: char = '~';

/// Escapes an arbitrary string into a single, safe path component.
///
/// ASCII alphanumerics, `-`, `_` and `.` are kept; every other byte of the UTF-8
/// encoding becomes `%XX` (uppercase hex). A leading `.` is escaped too, so the
/// result is never hidden and never `.` or `..`. The empty string becomes a
/// lone `%`, which no other input produces. The mapping is injective.
///
/// # Examples
///
/// ```
/// use stow_disk::escape_component;
///
/// assert_eq!(escape_component("a b/c"), "a%20b%2Fc");
/// assert_eq!(escape_component(".."), "%2E.");
/// assert_eq!(escape_component(""), "%");
/// ```
#[must_use]
pub fn escape_component(raw: &str) -> String {
    if raw.is_empty() {
        return "%".to_owned();
    }
    let mut escaped = String::with_capacity(raw.len());
    for (index, byte) in raw.bytes().enumerate() {
        push_escaped(&mut escaped, index, byte);
    }
    escaped
}

/// Returns the name a key or namespace is stored under, without extension.
///
/// This is [`escape_component`] while the result is at most
/// [`MAX_READABLE_NAME`] bytes. Longer inputs keep a readable escaped prefix
/// followed by `~` and the 128-bit xxh3 digest of the raw input in hex, so the
/// name stays well below file system name limits.
///
/// # Examples
///
/// ```
/// use stow_disk::{MAX_READABLE_NAME, component_name};
///
/// assert_eq!(component_name("user:42"), "user%3A42");
///
/// let long = component_name(&"照".repeat(100));
/// assert!(long.len() <= MAX_READABLE_NAME);
/// assert!(long.starts_with("%E7%85%A7"));
/// ```
#[must_use]
pub fn component_name(raw: &str) -> String {
    let escaped = escape_component(raw);
    if escaped.len() <= MAX_READABLE_NAME {
        return escaped;
    }

    let mut name = String::with_capacity(SHORTENED_PREFIX + 33);
    for (index, byte) in raw.bytes().enumerate() {
        let before = name.len();
        push_escaped(&mut name, index, byte);
        if name.len() > SHORTENED_PREFIX {
            // Never split an escape sequence.
            name.truncate(before);
            break;
        }
    }
    let _ = write!(name, "{HASH_MARKER}{:032x}", xxh3_128(raw.as_bytes()));
    name
}

/// Returns the file name an entry for `key` is stored under.
///
/// # Examples
///
/// ```
/// use stow_disk::file_name_for_key;
///
/// assert_eq!(file_name_for_key("user:42"), "user%3A42.cache");
/// assert_eq!(file_name_for_key(""), "%.cache");
/// ```
#[must_use]
pub fn file_name_for_key(key: &str) -> String {
    format!("{}.{ENTRY_EXTENSION}", component_name(key))
}

fn push_escaped(out: &mut String, index: usize, byte: u8) {
    let keep = byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') || (byte == b'.' && index > 0);
    if keep {
        out.push(char::from(byte));
    } else {
        // Writing into a String cannot fail.
        let _ = write!(out, "%{byte:02X}");
    }
}
