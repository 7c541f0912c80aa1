//! Frame visibility filter
//!
//! A frame is visible when its message class and function code are enabled, its slave address
//! is allowed (an empty address set allows all) and, when content filters are set, at least
//! one of them matches the payload.
//!
//! Which payload bytes are register addresses and which are data depends on the function code
//! and on the direction:
//!
//! | function | request registers | request data | response registers | response data |
//! |---|---|---|---|---|
//! | write range | `begin..=end` | bytes 2.. | `begin..=end` | - |
//! | write series | even bytes | odd bytes | all bytes | - |
//! | read range | `begin..=end` | - | - | all bytes |
//! | read series | all bytes | - | even bytes | odd bytes |
//! | device-specific / unknown | - | all bytes | - | all bytes |
use std::collections::BTreeSet;

#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::identifier::{FrameIdentifier, FunctionCode, IdLayout, MessageClass};
use crate::ranges::RangeSet;

/// Register/data bytes picked out of a payload
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Field<'a> {
    Empty,
    /// inclusive register span
    Span(u8, u8),
    /// every `step`-th byte starting at `start`
    Strided {
        bytes: &'a [u8],
        start: usize,
        step: usize,
    },
}

impl<'a> Field<'a> {
    fn all(bytes: &'a [u8]) -> Self {
        Field::Strided {
            bytes,
            start: 0,
            step: 1,
        }
    }

    fn tail(bytes: &'a [u8], start: usize) -> Self {
        Field::Strided {
            bytes,
            start,
            step: 1,
        }
    }

    fn even(bytes: &'a [u8]) -> Self {
        Field::Strided {
            bytes,
            start: 0,
            step: 2,
        }
    }

    fn odd(bytes: &'a [u8]) -> Self {
        Field::Strided {
            bytes,
            start: 1,
            step: 2,
        }
    }

    fn span(bytes: &[u8]) -> Self {
        match bytes {
            [a, b, ..] => Field::Span(*a.min(b), *a.max(b)),
            _ => Field::Empty,
        }
    }

    pub fn iter(&self) -> FieldIter<'a> {
        FieldIter {
            field: *self,
            pos: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Does the field satisfy a filter dimension
    ///
    /// Every value the field holds must be in the set. An empty set accepts anything, a field
    /// without values passes any set.
    pub fn within(&self, set: &RangeSet) -> bool {
        set.is_empty() || self.iter().all(|v| set.contains(u32::from(v)))
    }
}

pub struct FieldIter<'a> {
    field: Field<'a>,
    pos: usize,
}

impl Iterator for FieldIter<'_> {
    type Item = u8;

    #[allow(clippy::cast_possible_truncation)]
    fn next(&mut self) -> Option<u8> {
        let v = match self.field {
            Field::Empty => None,
            Field::Span(lo, hi) => {
                let v = usize::from(lo) + self.pos;
                (v <= usize::from(hi)).then_some(v as u8)
            }
            Field::Strided { bytes, start, step } => bytes.get(start + self.pos * step).copied(),
        };
        if v.is_some() {
            self.pos += 1;
        }
        v
    }
}

/// Register addresses and data bytes of a payload
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PayloadContent<'a> {
    pub registers: Field<'a>,
    pub data: Field<'a>,
}

impl<'a> PayloadContent<'a> {
    pub fn new(id: FrameIdentifier, payload: &'a [u8]) -> Self {
        let (registers, data) = match (id.function_code, id.message_class.is_request()) {
            (FunctionCode::WriteRegsRange, true) => (Field::span(payload), Field::tail(payload, 2)),
            (FunctionCode::WriteRegsRange, false) => (Field::span(payload), Field::Empty),
            (FunctionCode::WriteRegsSeries, true) => (Field::even(payload), Field::odd(payload)),
            (FunctionCode::WriteRegsSeries, false) => (Field::all(payload), Field::Empty),
            (FunctionCode::ReadRegsRange, true) => (Field::span(payload), Field::Empty),
            (FunctionCode::ReadRegsRange, false) => (Field::Empty, Field::all(payload)),
            (FunctionCode::ReadRegsSeries, true) => (Field::all(payload), Field::Empty),
            (FunctionCode::ReadRegsSeries, false) => (Field::even(payload), Field::odd(payload)),
            (
                FunctionCode::DeviceSpecific1
                | FunctionCode::DeviceSpecific2
                | FunctionCode::DeviceSpecific3
                | FunctionCode::DeviceSpecific4
                | FunctionCode::Other(_),
                _,
            ) => (Field::Empty, Field::all(payload)),
        };
        Self { registers, data }
    }
}

/// One content rule: allowed register addresses and allowed data bytes
///
/// An empty set does not restrict its dimension
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
pub struct ContentFilter {
    pub registers: RangeSet,
    pub data: RangeSet,
}

impl ContentFilter {
    pub fn new(registers: RangeSet, data: RangeSet) -> Self {
        Self { registers, data }
    }

    pub fn matches(&self, content: &PayloadContent<'_>) -> bool {
        content.registers.within(&self.registers) && content.data.within(&self.data)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
pub struct FilterConfig {
    pub enabled_message_classes: BTreeSet<MessageClass>,
    pub enabled_function_codes: BTreeSet<FunctionCode>,
    /// empty allows every address
    pub allowed_slave_addresses: RangeSet,
    /// empty accepts any payload, otherwise one rule has to match
    pub content_filters: Vec<ContentFilter>,
}

impl Default for FilterConfig {
    /// Everything visible
    fn default() -> Self {
        Self {
            enabled_message_classes: MessageClass::ALL.into_iter().collect(),
            enabled_function_codes: FunctionCode::ALL.into_iter().collect(),
            allowed_slave_addresses: RangeSet::new(),
            content_filters: Vec::new(),
        }
    }
}

impl FilterConfig {
    pub fn set_message_class_enabled(&mut self, class: MessageClass, enabled: bool) {
        if enabled {
            self.enabled_message_classes.insert(class);
        } else {
            self.enabled_message_classes.remove(&class);
        }
    }

    pub fn set_function_code_enabled(&mut self, code: FunctionCode, enabled: bool) {
        if enabled {
            self.enabled_function_codes.insert(code);
        } else {
            self.enabled_function_codes.remove(&code);
        }
    }

    /// Is a frame with this identifier and payload visible
    pub fn accepts(&self, id: FrameIdentifier, payload: &[u8]) -> bool {
        if !self.enabled_message_classes.contains(&id.message_class)
            || !self.enabled_function_codes.contains(&id.function_code)
        {
            return false;
        }
        if !self.allowed_slave_addresses.is_empty()
            && !self
                .allowed_slave_addresses
                .contains(u32::from(id.slave_address))
        {
            return false;
        }
        if self.content_filters.is_empty() {
            return true;
        }
        let content = PayloadContent::new(id, payload);
        self.content_filters.iter().any(|rule| rule.matches(&content))
    }
}

/// Is a data frame visible under the filter configuration
pub fn evaluate(frame: &Frame, layout: &IdLayout, config: &FilterConfig) -> bool {
    config.accepts(frame.identifier(layout), &frame.payload)
}
