//! Character encodings accepted for inventory files.

use std::fmt;
use std::str::FromStr;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Text encoding of an inventory CSV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// ISO-8859-1: each byte is the code point of the same value
    #[default]
    Latin1,
    Utf8,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Utf8 => "utf-8",
        }
    }

    /// Decode raw file bytes into text.
    ///
    /// Returns `None` if the bytes are not valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                String::from_utf8(bytes.to_vec()).ok()
            }
        }
    }

    /// Encode text into bytes.
    ///
    /// On failure returns the first character that has no representation.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, char> {
        match self {
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| c))
                .collect(),
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(TextEncoding::Latin1),
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            other => Err(format!(
                "unsupported encoding '{}' (expected latin-1 or utf-8)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_decodes_accented_bytes() {
        let bytes = b"Le\xf3n,Jos\xe9";
        let text = TextEncoding::Latin1.decode(bytes).unwrap();
        assert_eq!(text, "León,José");
    }

    #[test]
    fn test_latin1_encode_roundtrip() {
        let encoded = TextEncoding::Latin1.encode("Cádiz").unwrap();
        assert_eq!(encoded, b"C\xe1diz");
        assert_eq!(TextEncoding::Latin1.decode(&encoded).unwrap(), "Cádiz");
    }

    #[test]
    fn test_latin1_rejects_wide_characters() {
        assert_eq!(TextEncoding::Latin1.encode("Łódź"), Err('Ł'));
    }

    #[test]
    fn test_utf8_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Site_ID".as_bytes());
        assert_eq!(TextEncoding::Utf8.decode(&bytes).unwrap(), "Site_ID");
    }

    #[test]
    fn test_utf8_rejects_invalid_bytes() {
        assert!(TextEncoding::Utf8.decode(b"Le\xf3n").is_none());
    }

    #[test]
    fn test_parse_encoding_names() {
        assert_eq!("ISO-8859-1".parse::<TextEncoding>(), Ok(TextEncoding::Latin1));
        assert_eq!("latin_1".parse::<TextEncoding>(), Ok(TextEncoding::Latin1));
        assert_eq!("UTF8".parse::<TextEncoding>(), Ok(TextEncoding::Utf8));
        assert!("cp1252".parse::<TextEncoding>().is_err());
    }
}
