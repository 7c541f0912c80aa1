//! CANNABUS Constants

// Identifier layout (11-bit standard frame id)
pub const CANNABUS_FCODE_OFFSET: u8 = 0;
pub const CANNABUS_FCODE_WIDTH: u8 = 3;
pub const CANNABUS_ADDRESS_OFFSET: u8 = 3;
pub const CANNABUS_ADDRESS_WIDTH: u8 = 6;
pub const CANNABUS_CLASS_OFFSET: u8 = 9;
pub const CANNABUS_CLASS_WIDTH: u8 = 2;
pub const CANNABUS_ID_BITS: u8 = 29;

// Slave addresses
pub const CANNABUS_MIN_SLAVE_ADDRESS: u8 = 1;
pub const CANNABUS_MAX_SLAVE_ADDRESS: u8 = 60;

// Message classes
pub const CANNABUS_CLASS_HIGH_PRIO_MASTER: u8 = 0;
pub const CANNABUS_CLASS_HIGH_PRIO_SLAVE: u8 = 1;
pub const CANNABUS_CLASS_MASTER: u8 = 2;
pub const CANNABUS_CLASS_SLAVE: u8 = 3;

// Function codes
pub const CANNABUS_WRITE_REGS_RANGE: u8 = 0;
pub const CANNABUS_WRITE_REGS_SERIES: u8 = 1;
pub const CANNABUS_READ_REGS_RANGE: u8 = 2;
pub const CANNABUS_READ_REGS_SERIES: u8 = 3;
pub const CANNABUS_DEVICE_SPECIFIC1: u8 = 4;
pub const CANNABUS_DEVICE_SPECIFIC2: u8 = 5;
pub const CANNABUS_DEVICE_SPECIFIC3: u8 = 6;
pub const CANNABUS_DEVICE_SPECIFIC4: u8 = 7;

// Device memory and frame limits
pub const REGISTER_COUNT: usize = 256;
pub const MAX_PAYLOAD_LEN: usize = 8;

// Emulated request shapes
pub const RANGE_LEN_MIN: u8 = 2;
pub const RANGE_LEN_MAX: u8 = 6;
pub const SERIES_LEN_MIN: u8 = 2;
pub const SERIES_LEN_MAX: u8 = 4;

// Timer periods, milliseconds
pub const POLL_PERIOD_MS: u64 = 100;
pub const EMULATION_PERIOD_MS: u64 = 250;
