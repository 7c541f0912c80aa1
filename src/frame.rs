use core::time::Duration;

use crate::consts::MAX_PAYLOAD_LEN;
use crate::identifier::{FrameIdentifier, IdLayout};
use crate::{ErrorKind, VectorTrait};

/// Frame payload, up to 8 data bytes
pub type Payload = heapless::Vec<u8, MAX_PAYLOAD_LEN>;

/// Bus frame as delivered by the transport
///
/// The core only reads frames, it never modifies one it did not build
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Frame {
    /// raw frame identifier
    pub id: u32,
    pub payload: Payload,
    /// time since the transport was opened
    pub timestamp: Duration,
    /// bus error frame, bypasses decoding and filtering
    pub is_error: bool,
}

impl Frame {
    /// Build a data frame
    ///
    /// Errors:
    ///
    /// * **OOB** the payload is longer than 8 bytes
    pub fn new(id: u32, payload: &[u8]) -> Result<Self, ErrorKind> {
        let mut buf = Payload::new();
        VectorTrait::extend(&mut buf, payload)?;
        Ok(Self {
            id,
            payload: buf,
            timestamp: Duration::ZERO,
            is_error: false,
        })
    }

    /// Build an error frame
    pub fn error(id: u32, payload: &[u8]) -> Result<Self, ErrorKind> {
        let mut frame = Self::new(id, payload)?;
        frame.is_error = true;
        Ok(frame)
    }

    pub fn with_timestamp(mut self, timestamp: Duration) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[inline]
    pub fn identifier(&self, layout: &IdLayout) -> FrameIdentifier {
        layout.decode(self.id)
    }

    /// Payload as lower-case hex byte pairs separated by spaces
    pub fn payload_hex(&self) -> String {
        self.payload
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Timestamp as `<seconds>.<microseconds>`
    pub fn timestamp_string(&self) -> String {
        format!(
            "{}.{}",
            self.timestamp.as_secs(),
            self.timestamp.subsec_micros()
        )
    }
}
