//! Length-prefixed message framing
//!
//! Each message is a 4-byte big-endian length followed by that many bytes
//! of UTF-8. Inserted text may therefore carry newlines and colons.

use crate::error::{EditError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read one message
///
/// Returns `Ok(None)` on a clean end of stream. A frame larger than
/// `max_bytes` or one that is not UTF-8 is consumed and reported as a
/// protocol error; the stream stays usable.
pub async fn read_frame<R>(reader: &mut R, max_bytes: usize) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let length = match reader.read_u32().await {
        Ok(length) => length as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if length > max_bytes {
        let mut oversized = (&mut *reader).take(length as u64);
        let skipped = tokio::io::copy(&mut oversized, &mut tokio::io::sink()).await?;
        if skipped < length as u64 {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        return Err(EditError::Protocol(format!(
            "Frame of {} bytes exceeds limit of {}",
            length, max_bytes
        )));
    }

    let mut bytes = vec![0u8; length];
    reader.read_exact(&mut bytes).await?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| EditError::Protocol(format!("Frame is not UTF-8: {}", e)))
}

/// Write one message and flush
pub async fn write_frame<W>(writer: &mut W, message: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let length = u32::try_from(message.len())
        .map_err(|_| EditError::Protocol(format!("Message of {} bytes too large", message.len())))?;
    writer.write_u32(length).await?;
    writer.write_all(message.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
