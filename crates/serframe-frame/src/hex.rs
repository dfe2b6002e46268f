//! Hex text codec for terminators and frame rendering.
//!
//! Encoded form is uppercase, two digits per byte, joined by a separator:
//! ```text
//! [0x01, 0xAA, 0x0D]  ->  "01 AA 0D"
//! ```

use crate::error::HexError;

/// Canonical byte separator.
pub const SEPARATOR: &str = " ";

/// Render bytes as uppercase hex joined by `separator`.
///
/// Returns `None` for empty input: there is nothing to display.
pub fn encode(bytes: &[u8], separator: &str) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    let digits = bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<String>>();
    Some(digits.join(separator))
}

/// Render bytes with the canonical separator.
pub fn encode_spaced(bytes: &[u8]) -> Option<String> {
    encode(bytes, SEPARATOR)
}

/// Parse hex text, ignoring space characters.
///
/// Odd digit counts and non-hex characters are errors; nothing is
/// truncated. Positions in [`HexError::InvalidCharacter`] count characters
/// in the text with spaces removed.
pub fn decode(text: &str) -> Result<Vec<u8>, HexError> {
    let compact: String = text.chars().filter(|c| *c != ' ').collect();
    // Past this check every character is one byte, so byte offsets from the
    // `hex` crate are character positions.
    if let Some((index, ch)) = compact.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
        return Err(HexError::InvalidCharacter { ch, index });
    }
    ::hex::decode(&compact).map_err(|err| match err {
        ::hex::FromHexError::InvalidHexCharacter { c, index } => {
            HexError::InvalidCharacter { ch: c, index }
        }
        ::hex::FromHexError::OddLength | ::hex::FromHexError::InvalidStringLength => {
            HexError::OddLength { len: compact.len() }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_uses_uppercase_pairs() {
        assert_eq!(
            encode(&[0x01, 0xAB, 0x0D, 0xFF], " ").as_deref(),
            Some("01 AB 0D FF")
        );
    }

    #[test]
    fn encode_custom_separator() {
        assert_eq!(encode(&[0xDE, 0xAD], "-").as_deref(), Some("DE-AD"));
        assert_eq!(encode(&[0xDE, 0xAD], "").as_deref(), Some("DEAD"));
    }

    #[test]
    fn encode_empty_is_none() {
        assert_eq!(encode(&[], " "), None);
        assert_eq!(encode_spaced(&[]), None);
    }

    #[test]
    fn decode_ignores_spaces() {
        assert_eq!(decode("0d 0A").unwrap(), vec![0x0D, 0x0A]);
        assert_eq!(decode("  AA BB  CC ").unwrap(), vec![0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn decode_empty_is_empty() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode("   ").unwrap().is_empty());
    }

    #[test]
    fn roundtrip_holds_for_every_byte_value() {
        let all: Vec<u8> = (0..=255).collect();
        let text = encode_spaced(&all).unwrap();
        assert_eq!(decode(&text).unwrap(), all);

        for single in [0x00u8, 0x7F, 0x80, 0xFF] {
            let text = encode_spaced(&[single]).unwrap();
            assert_eq!(decode(&text).unwrap(), vec![single]);
        }
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert_eq!(decode("ABC"), Err(HexError::OddLength { len: 3 }));
        assert_eq!(decode("A B C"), Err(HexError::OddLength { len: 3 }));
    }

    #[test]
    fn decode_rejects_non_hex() {
        let err = decode("0G").unwrap_err();
        assert_eq!(err, HexError::InvalidCharacter { ch: 'G', index: 1 });

        assert!(matches!(
            decode("0x0D"),
            Err(HexError::InvalidCharacter { ch: 'x', .. })
        ));
    }

    #[test]
    fn decode_reports_non_ascii_by_character() {
        assert_eq!(
            decode("éA"),
            Err(HexError::InvalidCharacter { ch: 'é', index: 0 })
        );
        assert_eq!(
            decode("0D 0Aé"),
            Err(HexError::InvalidCharacter { ch: 'é', index: 4 })
        );
    }

    #[test]
    fn decode_rejects_tabs_and_newlines() {
        assert!(decode("0D\t0A").is_err());
        assert!(decode("0D\n0A").is_err());
    }
}
