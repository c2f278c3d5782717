//! Decoding of the `data:<mime>;base64,<payload>` favicon URLs embedded in
//! Java status responses.

use thiserror::Error;

/// Decodes a favicon data URL into raw image bytes.
///
/// Reachability problems never reach this point; a URL that fails here is a
/// server violating the data-URL contract, so the error is surfaced rather
/// than absorbed into an offline record.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, FaviconError> {
    let (header, payload) = url.split_once(',').ok_or(FaviconError::MissingPayload)?;

    // the tag is the second non-empty `;` parameter of the media type;
    // anything else there (extra parameters, a bare `;`) is not a favicon
    // URL this accepts
    let encoding = header
        .split(':')
        .nth(1)
        .and_then(|media_type| {
            let mut params = media_type.split(';').filter(|param| !param.is_empty());
            params.next()?;
            params.next()
        })
        .ok_or(FaviconError::MissingEncoding)?;

    if !encoding.eq_ignore_ascii_case("base64") {
        return Err(FaviconError::UnsupportedEncoding(encoding.to_owned()));
    }

    Ok(base64::decode(payload)?)
}

#[derive(Error, Debug)]
pub enum FaviconError {
    #[error("favicon url carries no payload")]
    MissingPayload,

    #[error("favicon url declares no content encoding")]
    MissingEncoding,

    #[error("favicon encoding {0:?} is not base64")]
    UnsupportedEncoding(String),

    #[error("favicon payload is not decodable base64")]
    Payload(#[from] base64::DecodeError),
}
