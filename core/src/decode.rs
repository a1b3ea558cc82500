//! Gzip + JSON body decoding.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::DecodeError;
use crate::types::Response;

/// Decompress `body` and decode it into a `Response`.
///
/// The returned value keeps the `Pending` status; the caller sets the final
/// status from the HTTP code.
pub fn decode_body(body: &[u8]) -> Result<Response, DecodeError> {
    if body.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut json = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut json)
        .map_err(DecodeError::Gzip)?;

    Ok(serde_json::from_slice(&json)?)
}
