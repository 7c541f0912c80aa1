//! Frame identifier codec
//!
//! A CANNABUS frame carries its routing metadata in the bus frame identifier: the slave
//! address, the function code and the message class each live in a disjoint bit field. The
//! field positions are described by [`IdLayout`]; [`IdLayout::CANNABUS`] is the stock 11-bit
//! layout and is what the free functions [`encode`] and [`decode`] use.
//!
//! Decoding never fails: ordinals outside the defined enumerations are kept as opaque
//! `Other` values so malformed traffic can still be displayed.
#[cfg(feature = "with_bincode")]
use bincode::{Decode, Encode};
#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{
    CANNABUS_ADDRESS_OFFSET, CANNABUS_ADDRESS_WIDTH, CANNABUS_CLASS_HIGH_PRIO_MASTER,
    CANNABUS_CLASS_HIGH_PRIO_SLAVE, CANNABUS_CLASS_MASTER, CANNABUS_CLASS_OFFSET,
    CANNABUS_CLASS_SLAVE, CANNABUS_CLASS_WIDTH, CANNABUS_DEVICE_SPECIFIC1,
    CANNABUS_DEVICE_SPECIFIC2, CANNABUS_DEVICE_SPECIFIC3, CANNABUS_DEVICE_SPECIFIC4,
    CANNABUS_FCODE_OFFSET, CANNABUS_FCODE_WIDTH, CANNABUS_ID_BITS, CANNABUS_READ_REGS_RANGE,
    CANNABUS_READ_REGS_SERIES, CANNABUS_WRITE_REGS_RANGE, CANNABUS_WRITE_REGS_SERIES,
};
use crate::ErrorKind;

/// Message priority / role tag
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "with_bincode", derive(Decode, Encode))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageClass {
    HighPriorityMaster,
    HighPrioritySlave,
    /// master request
    Master,
    /// slave response
    Slave,
    /// ordinal not defined by the protocol
    Other(u8),
}

impl MessageClass {
    pub const ALL: [MessageClass; 4] = [
        MessageClass::HighPriorityMaster,
        MessageClass::HighPrioritySlave,
        MessageClass::Master,
        MessageClass::Slave,
    ];

    pub fn from_ordinal(value: u8) -> Self {
        match value {
            CANNABUS_CLASS_HIGH_PRIO_MASTER => MessageClass::HighPriorityMaster,
            CANNABUS_CLASS_HIGH_PRIO_SLAVE => MessageClass::HighPrioritySlave,
            CANNABUS_CLASS_MASTER => MessageClass::Master,
            CANNABUS_CLASS_SLAVE => MessageClass::Slave,
            v => MessageClass::Other(v),
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            MessageClass::HighPriorityMaster => CANNABUS_CLASS_HIGH_PRIO_MASTER,
            MessageClass::HighPrioritySlave => CANNABUS_CLASS_HIGH_PRIO_SLAVE,
            MessageClass::Master => CANNABUS_CLASS_MASTER,
            MessageClass::Slave => CANNABUS_CLASS_SLAVE,
            MessageClass::Other(v) => v,
        }
    }

    /// Is the class sent by the master
    pub fn is_request(self) -> bool {
        matches!(self, MessageClass::HighPriorityMaster | MessageClass::Master)
    }

    pub fn is_high_priority(self) -> bool {
        matches!(
            self,
            MessageClass::HighPriorityMaster | MessageClass::HighPrioritySlave
        )
    }

    /// The class a slave answers a request of this class with
    ///
    /// Keeps the priority, switches the role. Slave and unknown classes are returned as-is.
    pub fn response(self) -> Self {
        match self {
            MessageClass::HighPriorityMaster => MessageClass::HighPrioritySlave,
            MessageClass::Master => MessageClass::Slave,
            other => other,
        }
    }
}

impl core::fmt::Display for MessageClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MessageClass::HighPriorityMaster => write!(f, "Master's high-priority"),
            MessageClass::HighPrioritySlave => write!(f, "Slave's high-priority"),
            MessageClass::Master => write!(f, "Master's request"),
            MessageClass::Slave => write!(f, "Slave's response"),
            MessageClass::Other(v) => write!(f, "Unknown message type ({})", v),
        }
    }
}

/// Requested operation
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "with_bincode", derive(Decode, Encode))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FunctionCode {
    WriteRegsRange,
    WriteRegsSeries,
    ReadRegsRange,
    ReadRegsSeries,
    DeviceSpecific1,
    DeviceSpecific2,
    DeviceSpecific3,
    DeviceSpecific4,
    /// ordinal not defined by the protocol
    Other(u8),
}

impl FunctionCode {
    pub const ALL: [FunctionCode; 8] = [
        FunctionCode::WriteRegsRange,
        FunctionCode::WriteRegsSeries,
        FunctionCode::ReadRegsRange,
        FunctionCode::ReadRegsSeries,
        FunctionCode::DeviceSpecific1,
        FunctionCode::DeviceSpecific2,
        FunctionCode::DeviceSpecific3,
        FunctionCode::DeviceSpecific4,
    ];

    /// Register read/write operations, the ones the emulator generates
    pub const REGISTER_OPS: [FunctionCode; 4] = [
        FunctionCode::WriteRegsRange,
        FunctionCode::WriteRegsSeries,
        FunctionCode::ReadRegsRange,
        FunctionCode::ReadRegsSeries,
    ];

    pub fn from_ordinal(value: u8) -> Self {
        match value {
            CANNABUS_WRITE_REGS_RANGE => FunctionCode::WriteRegsRange,
            CANNABUS_WRITE_REGS_SERIES => FunctionCode::WriteRegsSeries,
            CANNABUS_READ_REGS_RANGE => FunctionCode::ReadRegsRange,
            CANNABUS_READ_REGS_SERIES => FunctionCode::ReadRegsSeries,
            CANNABUS_DEVICE_SPECIFIC1 => FunctionCode::DeviceSpecific1,
            CANNABUS_DEVICE_SPECIFIC2 => FunctionCode::DeviceSpecific2,
            CANNABUS_DEVICE_SPECIFIC3 => FunctionCode::DeviceSpecific3,
            CANNABUS_DEVICE_SPECIFIC4 => FunctionCode::DeviceSpecific4,
            v => FunctionCode::Other(v),
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            FunctionCode::WriteRegsRange => CANNABUS_WRITE_REGS_RANGE,
            FunctionCode::WriteRegsSeries => CANNABUS_WRITE_REGS_SERIES,
            FunctionCode::ReadRegsRange => CANNABUS_READ_REGS_RANGE,
            FunctionCode::ReadRegsSeries => CANNABUS_READ_REGS_SERIES,
            FunctionCode::DeviceSpecific1 => CANNABUS_DEVICE_SPECIFIC1,
            FunctionCode::DeviceSpecific2 => CANNABUS_DEVICE_SPECIFIC2,
            FunctionCode::DeviceSpecific3 => CANNABUS_DEVICE_SPECIFIC3,
            FunctionCode::DeviceSpecific4 => CANNABUS_DEVICE_SPECIFIC4,
            FunctionCode::Other(v) => v,
        }
    }

    pub fn is_device_specific(self) -> bool {
        matches!(
            self,
            FunctionCode::DeviceSpecific1
                | FunctionCode::DeviceSpecific2
                | FunctionCode::DeviceSpecific3
                | FunctionCode::DeviceSpecific4
        )
    }
}

impl core::fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FunctionCode::WriteRegsRange => write!(f, "Writing register's range"),
            FunctionCode::WriteRegsSeries => write!(f, "Writing register's series"),
            FunctionCode::ReadRegsRange => write!(f, "Reading register's range"),
            FunctionCode::ReadRegsSeries => write!(f, "Reading register's series"),
            FunctionCode::DeviceSpecific1 => write!(f, "Device-specific function (1)"),
            FunctionCode::DeviceSpecific2 => write!(f, "Device-specific function (2)"),
            FunctionCode::DeviceSpecific3 => write!(f, "Device-specific function (3)"),
            FunctionCode::DeviceSpecific4 => write!(f, "Device-specific function (4)"),
            FunctionCode::Other(v) => write!(f, "Unknown function ({})", v),
        }
    }
}

/// Decoded frame identifier
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "with_bincode", derive(Decode, Encode))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameIdentifier {
    pub slave_address: u8,
    pub function_code: FunctionCode,
    pub message_class: MessageClass,
}

impl FrameIdentifier {
    pub fn new(slave_address: u8, function_code: FunctionCode, message_class: MessageClass) -> Self {
        Self {
            slave_address,
            function_code,
            message_class,
        }
    }
}

/// Bit positions of the identifier sub-fields
///
/// Each field is `width` bits starting at bit `offset` (bit 0 is the least significant). Fields
/// must not overlap and must fit into a 29-bit extended identifier; every field is at most 8
/// bits wide.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "with_bincode", derive(Decode, Encode))]
pub struct IdLayout {
    pub fcode_offset: u8,
    pub fcode_width: u8,
    pub address_offset: u8,
    pub address_width: u8,
    pub class_offset: u8,
    pub class_width: u8,
}

impl Default for IdLayout {
    fn default() -> Self {
        Self::CANNABUS
    }
}

#[inline]
fn field_mask(width: u8) -> u32 {
    1u32.checked_shl(u32::from(width)).map_or(u32::MAX, |v| v - 1)
}

#[inline]
fn pack(value: u8, offset: u8, width: u8) -> u32 {
    (u32::from(value) & field_mask(width))
        .checked_shl(u32::from(offset))
        .unwrap_or(0)
}

#[allow(clippy::cast_possible_truncation)]
#[inline]
fn unpack(raw: u32, offset: u8, width: u8) -> u8 {
    (raw.checked_shr(u32::from(offset)).unwrap_or(0) & field_mask(width)) as u8
}

impl IdLayout {
    pub const CANNABUS: IdLayout = IdLayout {
        fcode_offset: CANNABUS_FCODE_OFFSET,
        fcode_width: CANNABUS_FCODE_WIDTH,
        address_offset: CANNABUS_ADDRESS_OFFSET,
        address_width: CANNABUS_ADDRESS_WIDTH,
        class_offset: CANNABUS_CLASS_OFFSET,
        class_width: CANNABUS_CLASS_WIDTH,
    };

    /// Check the fields are disjoint, non-empty, at most 8 bits and fit the identifier
    pub fn validate(&self) -> Result<(), ErrorKind> {
        let fields = [
            (self.fcode_offset, self.fcode_width),
            (self.address_offset, self.address_width),
            (self.class_offset, self.class_width),
        ];
        let mut used = 0u32;
        for (offset, width) in fields {
            if width == 0 || width > 8 || u32::from(offset) + u32::from(width) > u32::from(CANNABUS_ID_BITS)
            {
                return Err(ErrorKind::IllegalLayout);
            }
            let mask = field_mask(width) << u32::from(offset);
            if used & mask != 0 {
                return Err(ErrorKind::IllegalLayout);
            }
            used |= mask;
        }
        Ok(())
    }

    /// Largest slave address the address field can carry
    #[allow(clippy::cast_possible_truncation)]
    pub fn max_address(&self) -> u8 {
        field_mask(self.address_width) as u8
    }

    /// Pack the identifier into a raw frame id
    ///
    /// Values wider than their field are truncated to the field width
    pub fn encode(&self, id: FrameIdentifier) -> u32 {
        pack(id.function_code.ordinal(), self.fcode_offset, self.fcode_width)
            | pack(id.slave_address, self.address_offset, self.address_width)
            | pack(id.message_class.ordinal(), self.class_offset, self.class_width)
    }

    /// Unpack a raw frame id, bits outside the three fields are ignored
    pub fn decode(&self, raw: u32) -> FrameIdentifier {
        FrameIdentifier {
            slave_address: unpack(raw, self.address_offset, self.address_width),
            function_code: FunctionCode::from_ordinal(unpack(
                raw,
                self.fcode_offset,
                self.fcode_width,
            )),
            message_class: MessageClass::from_ordinal(unpack(
                raw,
                self.class_offset,
                self.class_width,
            )),
        }
    }
}

/// Encode a frame id with the stock CANNABUS layout
pub fn encode(slave_address: u8, function_code: FunctionCode, message_class: MessageClass) -> u32 {
    IdLayout::CANNABUS.encode(FrameIdentifier::new(
        slave_address,
        function_code,
        message_class,
    ))
}

/// Decode a frame id with the stock CANNABUS layout
pub fn decode(raw: u32) -> FrameIdentifier {
    IdLayout::CANNABUS.decode(raw)
}
