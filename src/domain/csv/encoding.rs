// ============================================================
// ENCODING CANDIDATES
// ============================================================
// Text encodings tried, in order, against the raw CSV bytes

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Bytes Windows-1252 leaves undefined. A strict cp1252 decoder rejects them.
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// A named text encoding the decoder can try
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingCandidate {
    /// Strict UTF-8, malformed sequences fail
    #[serde(rename = "utf-8")]
    Utf8,

    /// ISO-8859-1 under its short name; every byte is valid
    #[serde(rename = "latin1")]
    Latin1,

    /// Windows-1252, five undefined bytes fail
    #[serde(rename = "cp1252")]
    Cp1252,

    /// ISO-8859-1 under its long name
    #[serde(rename = "iso-8859-1")]
    Iso8859_1,
}

impl EncodingCandidate {
    /// Fixed trial order. The first candidate that parses wins.
    pub const TRIAL_ORDER: [EncodingCandidate; 4] = [
        EncodingCandidate::Utf8,
        EncodingCandidate::Latin1,
        EncodingCandidate::Cp1252,
        EncodingCandidate::Iso8859_1,
    ];

    /// Label shown in the report
    pub fn label(&self) -> &'static str {
        match self {
            EncodingCandidate::Utf8 => "utf-8",
            EncodingCandidate::Latin1 => "latin1",
            EncodingCandidate::Cp1252 => "cp1252",
            EncodingCandidate::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Decode one field. `None` means the bytes are not valid in this encoding.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            EncodingCandidate::Utf8 => encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes),
            EncodingCandidate::Latin1 | EncodingCandidate::Iso8859_1 => {
                Some(encoding_rs::mem::decode_latin1(bytes))
            }
            EncodingCandidate::Cp1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                encoding_rs::WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }

    /// Strip a byte order mark this encoding would consume
    pub fn strip_bom<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        match self {
            EncodingCandidate::Utf8 => bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes),
            _ => bytes,
        }
    }
}

impl std::fmt::Display for EncodingCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_order_labels() {
        let labels: Vec<_> = EncodingCandidate::TRIAL_ORDER
            .iter()
            .map(|e| e.label())
            .collect();
        assert_eq!(labels, vec!["utf-8", "latin1", "cp1252", "iso-8859-1"]);
    }

    #[test]
    fn test_utf8_rejects_latin1_bytes() {
        // "Bogotá" in latin1
        let bytes = b"Bogot\xE1";
        assert!(EncodingCandidate::Utf8.decode(bytes).is_none());
        assert_eq!(
            EncodingCandidate::Latin1.decode(bytes).as_deref(),
            Some("Bogotá")
        );
    }

    #[test]
    fn test_cp1252_undefined_bytes() {
        assert!(EncodingCandidate::Cp1252.decode(b"a\x81b").is_none());
        assert_eq!(
            EncodingCandidate::Cp1252.decode(b"\x80").as_deref(),
            Some("€")
        );
        // latin1 keeps the C1 control instead of failing
        assert_eq!(
            EncodingCandidate::Latin1.decode(b"\x81").as_deref(),
            Some("\u{81}")
        );
    }

    #[test]
    fn test_strip_bom_only_for_utf8() {
        let bytes = b"\xEF\xBB\xBFid";
        assert_eq!(EncodingCandidate::Utf8.strip_bom(bytes), b"id");
        assert_eq!(EncodingCandidate::Latin1.strip_bom(bytes), bytes);
    }
}
