//! Monitor configuration
//!
//! Plain data, loading it from a file is up to the application (with the `with_serde` feature
//! every field deserializes). [`MonitorConfig::default`] is the stock CANNABUS setup.
use core::time::Duration;

#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{
    CANNABUS_MAX_SLAVE_ADDRESS, CANNABUS_MIN_SLAVE_ADDRESS, EMULATION_PERIOD_MS, POLL_PERIOD_MS,
};
use crate::identifier::IdLayout;
use crate::ErrorKind;

#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "with_serde", serde(default))]
pub struct MonitorConfig {
    /// identifier bit layout
    pub layout: IdLayout,
    pub min_slave_address: u8,
    pub max_slave_address: u8,
    /// transport drain period
    pub poll_period_ms: u64,
    /// emulator phase period
    pub emulation_period_ms: u64,
    /// drive the monitor from the slave emulator instead of a real bus
    pub emulation: bool,
    /// fixed emulator seed, OS entropy when not set
    pub seed: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            layout: IdLayout::CANNABUS,
            min_slave_address: CANNABUS_MIN_SLAVE_ADDRESS,
            max_slave_address: CANNABUS_MAX_SLAVE_ADDRESS,
            poll_period_ms: POLL_PERIOD_MS,
            emulation_period_ms: EMULATION_PERIOD_MS,
            emulation: false,
            seed: None,
        }
    }
}

impl MonitorConfig {
    #[inline]
    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }

    #[inline]
    pub fn emulation_period(&self) -> Duration {
        Duration::from_millis(self.emulation_period_ms)
    }

    /// Check the layout and the slave address range
    ///
    /// Errors:
    ///
    /// * **IllegalLayout** the layout is invalid or its address field can not carry the max
    ///   address
    /// * **Exhausted** the address range is empty
    pub fn validate(&self) -> Result<(), ErrorKind> {
        self.layout.validate()?;
        if self.min_slave_address > self.max_slave_address {
            return Err(ErrorKind::Exhausted);
        }
        if self.max_slave_address > self.layout.max_address() {
            return Err(ErrorKind::IllegalLayout);
        }
        Ok(())
    }
}
