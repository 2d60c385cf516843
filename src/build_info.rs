//! Build metadata
//!
//! Values embedded by `build.rs`, with fallbacks for builds that skip it.

use serde::Serialize;

pub const BUILD_NUMBER: u64 = parse_build_number(option_env!("FRIDGENUTRI_BUILD_NUMBER"));

/// ISO 8601, UTC
pub const BUILD_TIMESTAMP: &str = or_unknown(option_env!("FRIDGENUTRI_BUILD_TIMESTAMP"));

/// Cargo profile, `debug` or `release`
pub const BUILD_PROFILE: &str = or_unknown(option_env!("FRIDGENUTRI_BUILD_PROFILE"));

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

const fn or_unknown(value: Option<&'static str>) -> &'static str {
    match value {
        Some(s) => s,
        None => "unknown",
    }
}

/// Decimal digits only; anything else reads as build 0
const fn parse_build_number(value: Option<&str>) -> u64 {
    let bytes = match value {
        Some(s) => s.as_bytes(),
        None => return 0,
    };
    let mut n: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            return 0;
        }
        n = n * 10 + (bytes[i] - b'0') as u64;
        i += 1;
    }
    n
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub profile: &'static str,
    pub description: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            profile: BUILD_PROFILE,
            description: DESCRIPTION,
        }
    }

    /// One line, e.g. `fridgenutri 1.0.0 (build 12, release)`
    pub fn summary(&self) -> String {
        format!(
            "{} {} (build {}, {})",
            self.name, self.version, self.build_number, self.profile
        )
    }
}

/// Startup banner on stderr; stdout carries the MCP transport
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("-----------------------------------------------");
    eprintln!("  FridgeNutri  {}", info.summary());
    eprintln!("  Compiled: {}", info.build_timestamp);
    eprintln!("-----------------------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_number() {
        assert_eq!(parse_build_number(Some("42")), 42);
        assert_eq!(parse_build_number(Some("")), 0);
        assert_eq!(parse_build_number(Some("4x2")), 0);
        assert_eq!(parse_build_number(None), 0);
    }

    #[test]
    fn test_summary() {
        let info = BuildInfo::current();
        assert!(info.summary().starts_with("fridgenutri "));
    }
}
