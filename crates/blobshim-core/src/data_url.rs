//! `data:` URL encoding and parsing (RFC 2397).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::blob::ByteBuf;

/// Media type assumed for a `data:` URL whose header names none.
const DATA_URL_DEFAULT_TYPE: &str = "text/plain;charset=US-ASCII";

/// `data:<media_type>;base64,<payload>`.
pub fn encode(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub media_type: String,
    pub bytes: ByteBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a data: URL")]
    NotDataUrl,
    #[error("data: URL has no ',' separator")]
    MissingComma,
    #[error("invalid base64 payload: {0}")]
    Base64(String),
    #[error("invalid percent escape at byte {0}")]
    PercentEscape(usize),
}

/// Parse a `data:` URL into its media type and bytes.
///
/// Base64 payloads may contain ASCII whitespace; plain payloads are
/// percent-decoded.
pub fn parse(url: &str) -> Result<DataUrl, DataUrlError> {
    let rest = strip_scheme(url).ok_or(DataUrlError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingComma)?;

    let (media_type, is_base64) = match header.rsplit_once(';') {
        Some((mt, flag)) if flag.trim().eq_ignore_ascii_case("base64") => (mt.trim(), true),
        _ => (header.trim(), false),
    };
    let media_type = if media_type.is_empty() {
        DATA_URL_DEFAULT_TYPE.to_string()
    } else {
        media_type.to_string()
    };

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| DataUrlError::Base64(e.to_string()))?
    } else {
        percent_decode(payload.as_bytes())?
    };

    Ok(DataUrl {
        media_type,
        bytes: bytes.into(),
    })
}

fn strip_scheme(url: &str) -> Option<&str> {
    let trimmed = url.trim_start();
    let scheme = trimmed.get(..5)?;
    scheme
        .eq_ignore_ascii_case("data:")
        .then(|| &trimmed[5..])
}

fn percent_decode(input: &[u8]) -> Result<Vec<u8>, DataUrlError> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'%' {
            let hex = input
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or(DataUrlError::PercentEscape(i))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(input[i]);
            i += 1;
        }
    }
    Ok(out)
}
