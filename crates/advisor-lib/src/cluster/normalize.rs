//! Worker flavor name normalization
//!
//! Provider flavor names carry suffixes (`.encrypted`, `.300gb.encrypted`)
//! and use family prefixes (`b3c.`, `m3c.`) that the price table knows under
//! different names.

use regex::Regex;
use std::sync::LazyLock;

/// Placeholder used when a worker reports no flavor at all
pub const UNKNOWN_FLAVOR: &str = "unknown";

/// Provider family prefix => priced family prefix
const FAMILY_ALIASES: &[(&str, &str)] = &[("b3c.", "bx3d."), ("m3c.", "mx2.")];

static SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\.\d+gb)?(\.encrypted)?$").unwrap());

static DIMENSIONS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)x(\d+)").unwrap());

static DISK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)gb").unwrap());

/// Map a provider flavor name onto the naming used by the price table
///
/// `b3c.16x64.encrypted` => `bx3d.16x64`, `m3c.8x64` => `mx2.8x64`.
/// An empty name becomes [`UNKNOWN_FLAVOR`].
pub fn normalize_flavor(raw: &str) -> String {
    if raw.is_empty() {
        return UNKNOWN_FLAVOR.to_string();
    }

    let stripped = SUFFIX_REGEX.replace(raw, "");

    for (from, to) in FAMILY_ALIASES {
        if let Some(rest) = stripped.strip_prefix(from) {
            return format!("{}{}", to, rest);
        }
    }

    stripped.into_owned()
}

/// vCPU and RAM-GB encoded as `NxM` in a flavor name
pub fn parse_dimensions(flavor: &str) -> Option<(u32, u32)> {
    let caps = DIMENSIONS_REGEX.captures(flavor)?;
    let cpu = caps.get(1)?.as_str().parse().ok()?;
    let memory = caps.get(2)?.as_str().parse().ok()?;
    Some((cpu, memory))
}

/// Disk size encoded as `Ngb` in a flavor name
pub fn parse_disk(flavor: &str) -> Option<u32> {
    DISK_REGEX
        .captures(flavor)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
