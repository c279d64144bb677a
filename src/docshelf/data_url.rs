//! `data:<mime>;base64,<payload>` encoding of stored file content.

use crate::error::{DocshelfError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

pub fn decode(url: &str) -> Result<DecodedDataUrl> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| DocshelfError::Store("Stored content is not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DocshelfError::Store("Data URL has no payload separator".to_string()))?;

    let mut parts = header.split(';');
    let mime_type = parts
        .next()
        .filter(|m| !m.is_empty())
        .map(|m| m.to_string());
    let is_base64 = parts.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| DocshelfError::Store(format!("Invalid base64 content: {}", e)))?
    } else {
        payload.as_bytes().to_vec()
    };

    Ok(DecodedDataUrl { mime_type, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_with_mime_prefix() {
        assert_eq!(encode("text/plain", b"hi"), "data:text/plain;base64,aGk=");
    }

    #[test]
    fn decodes_base64_payload() {
        let decoded = decode("data:application/pdf;base64,JVBERi0=").unwrap();
        assert_eq!(decoded.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(decoded.bytes, b"%PDF-");
    }

    #[test]
    fn decodes_plain_payload_and_missing_mime() {
        let decoded = decode("data:,hello").unwrap();
        assert_eq!(decoded.mime_type, None);
        assert_eq!(decoded.bytes, b"hello");
    }

    #[test]
    fn rejects_non_data_urls() {
        assert!(decode("https://example.com/a.pdf").is_err());
        assert!(decode("data:text/plain;base64").is_err());
        assert!(decode("data:text/plain;base64,@@@").is_err());
    }
}
