#[cfg(feature = "with_bincode")]
use bincode::{Decode, Encode};
#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

use crate::consts::REGISTER_COUNT;
use crate::{ErrorKind, VectorTrait};

/// Byte-addressed register access
///
/// Register addresses come from single payload bytes, so every `u8` is a valid address and the
/// single-register accessors can not fail. Bulk helpers append to / read from byte buffers.
pub trait Registers {
    /// Get a single register
    fn get_register(&self, reg: u8) -> u8;

    /// Set a single register
    fn set_register(&mut self, reg: u8, value: u8);

    /// Get registers `begin..=end` as Vec of u8
    ///
    /// Note: Vec is always appended
    fn get_registers_range<V: VectorTrait<u8>>(
        &self,
        begin: u8,
        end: u8,
        result: &mut V,
    ) -> Result<(), ErrorKind> {
        for reg in begin..=end {
            result.push(self.get_register(reg))?;
        }
        Ok(())
    }

    /// Set registers starting at `begin` from Vec of u8
    ///
    /// Errors:
    ///
    /// * **OOB** the values run past register 255
    fn set_registers_from_u8(&mut self, begin: u8, values: &[u8]) -> Result<(), ErrorKind> {
        if usize::from(begin) + values.len() > REGISTER_COUNT {
            return Err(ErrorKind::OOB);
        }
        for (reg, value) in (begin..=u8::MAX).zip(values) {
            self.set_register(reg, *value);
        }
        Ok(())
    }

    /// Get `(register, value)` pairs for every register listed, in the listed order
    ///
    /// Note: Vec is always appended
    fn get_registers_series<V: VectorTrait<u8>>(
        &self,
        regs: &[u8],
        result: &mut V,
    ) -> Result<(), ErrorKind> {
        for reg in regs {
            result.push(*reg)?;
            result.push(self.get_register(*reg))?;
        }
        Ok(())
    }
}

/// Register memory of a single emulated slave
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "with_bincode", derive(Decode, Encode))]
pub struct RegisterBank {
    slave_address: u8,
    #[cfg_attr(feature = "with_serde", serde(with = "serde_arrays"))]
    registers: [u8; REGISTER_COUNT],
}

impl RegisterBank {
    pub fn new(slave_address: u8) -> Self {
        Self {
            slave_address,
            registers: [0; REGISTER_COUNT],
        }
    }

    #[inline]
    pub fn slave_address(&self) -> u8 {
        self.slave_address
    }

    /// Zero every register
    pub fn clear(&mut self) {
        self.registers = [0; REGISTER_COUNT];
    }

    /// Iterate over all register values, starting at register 0
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.registers.iter().copied()
    }
}

impl Registers for RegisterBank {
    #[inline]
    fn get_register(&self, reg: u8) -> u8 {
        self.registers[usize::from(reg)]
    }

    #[inline]
    fn set_register(&mut self, reg: u8, value: u8) {
        self.registers[usize::from(reg)] = value;
    }
}
