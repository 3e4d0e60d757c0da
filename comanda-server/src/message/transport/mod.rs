//! Transport layer abstraction for the message bus
//!
//! Wire format: a 4-byte little-endian length prefix followed by the
//! JSON-serialized [`BusMessage`] envelope.

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::utils::AppError;
use shared::message::BusMessage;

mod memory;
mod tcp;

pub use memory::MemoryTransport;
pub use tcp::TcpTransport;

/// Maximum accepted frame size (1 MiB) - a corrupt length prefix must
/// not allocate unbounded memory
const MAX_FRAME_LEN: usize = 1024 * 1024;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn read_message(&self) -> Result<BusMessage, AppError>;
    async fn write_message(&self, msg: &BusMessage) -> Result<(), AppError>;
}

pub(super) async fn read_from_stream<R: AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<BusMessage, AppError> {
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| AppError::internal(format!("Read len failed: {}", e)))?;

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(AppError::internal(format!("Frame too large: {} bytes", len)));
    }

    let mut frame = vec![0u8; len];
    reader
        .read_exact(&mut frame)
        .await
        .map_err(|e| AppError::internal(format!("Read frame failed: {}", e)))?;

    serde_json::from_slice(&frame)
        .map_err(|e| AppError::internal(format!("Invalid bus message: {}", e)))
}

pub(super) async fn write_to_stream<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    msg: &BusMessage,
) -> Result<(), AppError> {
    let frame = serde_json::to_vec(msg)
        .map_err(|e| AppError::internal(format!("Serialize bus message failed: {}", e)))?;

    let mut data = Vec::with_capacity(4 + frame.len());
    data.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    data.extend_from_slice(&frame);

    writer
        .write_all(&data)
        .await
        .map_err(|e| AppError::internal(format!("Write failed: {}", e)))?;
    Ok(())
}
