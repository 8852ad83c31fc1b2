//! Length-prefixed framing over a byte stream.
//!
//! Format: 4-byte big-endian length prefix + exactly that many payload bytes.
//!
//! No maximum payload size is enforced when reading. The payload is read in
//! chunks of at most `READ_CHUNK_SIZE` bytes and never past the end of the
//! frame, so bytes following a frame stay in the stream.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::READ_CHUNK_SIZE;

/// Length of the frame header (4 bytes, big-endian u32).
pub const FRAME_HEADER_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum FrameError {
    /// The stream ended before the 4-byte length prefix was complete.
    #[error("stream closed after {received} of 4 length prefix bytes")]
    TruncatedHeader { received: usize },

    /// The stream ended before the declared payload length was received.
    #[error("truncated frame: expected {expected} payload bytes, received {received}")]
    TruncatedFrame { expected: usize, received: usize },

    #[error("payload of {len} bytes does not fit a 32-bit length prefix")]
    Oversized { len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Prefix `payload` with its length.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::Oversized {
        len: payload.len(),
    })?;

    let mut buf = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Read exactly one frame from `reader` and return its payload.
pub async fn decode<R>(reader: &mut R) -> Result<Vec<u8>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; FRAME_HEADER_LEN];
    let mut filled = 0;
    while filled < FRAME_HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return Err(FrameError::TruncatedHeader { received: filled });
        }
        filled += n;
    }

    let expected = u32::from_be_bytes(header) as usize;

    // The declared length is untrusted; grow the buffer as data actually arrives.
    let mut payload = Vec::with_capacity(expected.min(READ_CHUNK_SIZE));
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    while payload.len() < expected {
        let want = (expected - payload.len()).min(READ_CHUNK_SIZE);
        let n = reader.read(&mut chunk[..want]).await?;
        if n == 0 {
            return Err(FrameError::TruncatedFrame {
                expected,
                received: payload.len(),
            });
        }
        payload.extend_from_slice(&chunk[..n]);
    }

    Ok(payload)
}

/// Encode `payload` and write the whole frame to `writer`.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode(payload)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
