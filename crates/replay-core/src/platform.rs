//! Tokenizer for the raw `platform` string of an export record.
//!
//! Export platform strings follow the loose grammar
//! `"<systemToken> (<deviceToken>)"`, e.g. `"android (Pixel5)"` or
//! `"osx (MacBookPro)"`. The system token is the leading run of
//! non-whitespace, non-parenthesis characters; the device token is the
//! content of the first parenthesized group. Both are upper-cased, and the
//! `OSX` system alias is collapsed to `OS`.

use regex::Regex;

/// System and device tokens extracted from one platform string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformInfo {
    /// Uppercase system token, `None` for blank input.
    pub system: Option<String>,
    /// Uppercase device token, `None` when no non-empty parenthesized
    /// group is present.
    pub device: Option<String>,
}

/// Compiled tokenizer for platform strings.
///
/// Holds its regexes so repeated parsing over a full export does not
/// recompile them per record.
pub struct PlatformParser {
    system_re: Regex,
    device_re: Regex,
}

impl PlatformParser {
    pub fn new() -> Self {
        Self {
            system_re: Regex::new(r"^\s*([^\s(]+)").expect("regex is valid"),
            device_re: Regex::new(r"\(([^()]*)\)").expect("regex is valid"),
        }
    }

    /// Tokenize one raw platform string.
    ///
    /// Defined edge cases:
    /// * blank or whitespace-only input yields neither token;
    /// * missing parentheses yield no device;
    /// * an empty group `()` yields no device;
    /// * when multiple groups are present, the first one wins.
    pub fn parse(&self, raw: &str) -> PlatformInfo {
        let system = self
            .system_re
            .captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| normalize_system(m.as_str()));

        let device = self
            .device_re
            .captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_uppercase())
            .filter(|d| !d.is_empty());

        PlatformInfo { system, device }
    }
}

impl Default for PlatformParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper-case a system token and apply the `OSX -> OS` alias.
fn normalize_system(token: &str) -> String {
    let upper = token.to_uppercase();
    if upper == "OSX" {
        "OS".to_string()
    } else {
        upper
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_system_and_device() {
        let parser = PlatformParser::new();
        let info = parser.parse("android (Pixel5)");
        assert_eq!(info.system.as_deref(), Some("ANDROID"));
        assert_eq!(info.device.as_deref(), Some("PIXEL5"));
    }

    #[test]
    fn test_parse_uppercases_both_tokens() {
        let parser = PlatformParser::new();
        let info = parser.parse("ios (iPhone12,1)");
        assert_eq!(info.system.as_deref(), Some("IOS"));
        assert_eq!(info.device.as_deref(), Some("IPHONE12,1"));
    }

    #[test]
    fn test_parse_osx_alias() {
        let parser = PlatformParser::new();
        let info = parser.parse("osx (macbookpro)");
        assert_eq!(info.system.as_deref(), Some("OS"));
        assert_eq!(info.device.as_deref(), Some("MACBOOKPRO"));
    }

    #[test]
    fn test_parse_missing_parentheses() {
        let parser = PlatformParser::new();
        let info = parser.parse("windows");
        assert_eq!(info.system.as_deref(), Some("WINDOWS"));
        assert!(info.device.is_none());
    }

    #[test]
    fn test_parse_empty_group_yields_no_device() {
        let parser = PlatformParser::new();
        let info = parser.parse("linux ()");
        assert_eq!(info.system.as_deref(), Some("LINUX"));
        assert!(info.device.is_none());
    }

    #[test]
    fn test_parse_first_group_wins() {
        let parser = PlatformParser::new();
        let info = parser.parse("android (Pixel5) (beta)");
        assert_eq!(info.device.as_deref(), Some("PIXEL5"));
    }

    #[test]
    fn test_parse_blank_input() {
        let parser = PlatformParser::new();
        assert_eq!(parser.parse(""), PlatformInfo::default());
        assert_eq!(parser.parse("   "), PlatformInfo::default());
    }

    #[test]
    fn test_parse_leading_whitespace() {
        let parser = PlatformParser::new();
        let info = parser.parse("  web_player (chrome)");
        assert_eq!(info.system.as_deref(), Some("WEB_PLAYER"));
        assert_eq!(info.device.as_deref(), Some("CHROME"));
    }

    #[test]
    fn test_parse_device_trimmed() {
        let parser = PlatformParser::new();
        let info = parser.parse("ios ( iphone )");
        assert_eq!(info.device.as_deref(), Some("IPHONE"));
    }

    #[test]
    fn test_parse_no_space_before_group() {
        // The system token stops at the opening parenthesis.
        let parser = PlatformParser::new();
        let info = parser.parse("ios(iphone)");
        assert_eq!(info.system.as_deref(), Some("IOS"));
        assert_eq!(info.device.as_deref(), Some("IPHONE"));
    }
}
