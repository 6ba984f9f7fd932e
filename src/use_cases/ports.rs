use super::types::Notice;
use axum::extract::ws::Utf8Bytes;

/// Turns world notices into text frames. The world encodes each fan-out once and hands the
/// same bytes to every recipient.
pub trait NoticeEncoder {
    fn encode(&self, notice: &Notice) -> Result<Utf8Bytes, String>;
}
