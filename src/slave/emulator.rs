use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::bank::{RegisterBank, Registers};
use crate::config::MonitorConfig;
use crate::consts::{RANGE_LEN_MAX, RANGE_LEN_MIN, SERIES_LEN_MAX, SERIES_LEN_MIN};
use crate::frame::{Frame, Payload};
use crate::identifier::{FrameIdentifier, FunctionCode, IdLayout, MessageClass};
use crate::{ErrorKind, VectorTrait};

/// Emulated master/slave conversation
///
/// Plays the master and up to 60 slaves at once. Every [`step`](SlaveEmulator::step) advances
/// the conversation by one phase: the first step produces a random master request, the next one
/// the addressed slave's response, computed against that slave's [`RegisterBank`], and so on.
///
/// ```
/// use cannabus::{config::MonitorConfig, slave::SlaveEmulator};
///
/// let config = MonitorConfig {
///     seed: Some(7),
///     ..MonitorConfig::default()
/// };
/// let mut emulator = SlaveEmulator::new(&config).unwrap();
/// let request = emulator.step().unwrap();
/// assert!(emulator.awaiting_response());
/// let response = emulator.step().unwrap();
/// assert!(!emulator.awaiting_response());
/// assert_ne!(request.id, response.id);
/// ```
pub struct SlaveEmulator {
    layout: IdLayout,
    min_address: u8,
    max_address: u8,
    banks: Vec<RegisterBank>,
    rng: StdRng,
    /// request sent, response not yet produced
    pending: Option<Frame>,
}

impl SlaveEmulator {
    /// Create an emulator with a bank for every slave address in the configured range
    ///
    /// The random generator is seeded from `config.seed` when set, from OS entropy otherwise.
    ///
    /// Errors:
    ///
    /// * **IllegalLayout** the identifier layout is invalid or can not carry the max address
    /// * **Exhausted** the address range is empty
    pub fn new(config: &MonitorConfig) -> Result<Self, ErrorKind> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(
            config.layout,
            config.min_slave_address,
            config.max_slave_address,
            rng,
        )
    }

    pub fn with_rng(
        layout: IdLayout,
        min_address: u8,
        max_address: u8,
        rng: StdRng,
    ) -> Result<Self, ErrorKind> {
        layout.validate()?;
        if min_address > max_address {
            return Err(ErrorKind::Exhausted);
        }
        if max_address > layout.max_address() {
            return Err(ErrorKind::IllegalLayout);
        }
        let banks = (min_address..=max_address).map(RegisterBank::new).collect();
        Ok(Self {
            layout,
            min_address,
            max_address,
            banks,
            rng,
            pending: None,
        })
    }

    /// Is the next step a response
    #[inline]
    pub fn awaiting_response(&self) -> bool {
        self.pending.is_some()
    }

    pub fn bank(&self, slave_address: u8) -> Option<&RegisterBank> {
        let index = slave_address.checked_sub(self.min_address)?;
        self.banks.get(usize::from(index))
    }

    pub fn bank_mut(&mut self, slave_address: u8) -> Option<&mut RegisterBank> {
        let index = slave_address.checked_sub(self.min_address)?;
        self.banks.get_mut(usize::from(index))
    }

    /// Advance the conversation by one phase and return the frame produced
    pub fn step(&mut self) -> Result<Frame, ErrorKind> {
        if let Some(request) = self.pending.take() {
            log::trace!("emulator: response phase, request id {:#x}", request.id);
            self.process_frame(&request)
        } else {
            let request = self.generate_request()?;
            log::trace!(
                "emulator: request phase, id {:#x}, payload {}",
                request.id,
                request.payload_hex()
            );
            self.pending = Some(request.clone());
            Ok(request)
        }
    }

    /// Use a caller-built request as the request phase
    ///
    /// The next [`step`](SlaveEmulator::step) produces the response to it. A request which is
    /// still unanswered is discarded.
    pub fn submit(&mut self, request: Frame) -> Frame {
        if let Some(dropped) = self.pending.replace(request.clone()) {
            log::debug!("emulator: unanswered request {:#x} discarded", dropped.id);
        }
        request
    }

    /// Build a random master request
    ///
    /// Only the four register operations are generated, with a master or high-priority master
    /// message class
    pub fn generate_request(&mut self) -> Result<Frame, ErrorKind> {
        let slave_address = self.rng.gen_range(self.min_address..=self.max_address);
        let function_code =
            FunctionCode::REGISTER_OPS[self.rng.gen_range(0..FunctionCode::REGISTER_OPS.len())];
        let message_class = if self.rng.gen_bool(0.5) {
            MessageClass::HighPriorityMaster
        } else {
            MessageClass::Master
        };
        let mut payload = Payload::new();
        match function_code {
            FunctionCode::WriteRegsRange => {
                let (begin, end) = self.random_range();
                payload_push_range(begin, end, &mut payload)?;
                for _ in begin..=end {
                    payload_push(self.rng.gen(), &mut payload)?;
                }
            }
            FunctionCode::WriteRegsSeries => {
                for reg in self.random_series() {
                    payload_push(reg, &mut payload)?;
                    payload_push(self.rng.gen(), &mut payload)?;
                }
            }
            FunctionCode::ReadRegsRange => {
                let (begin, end) = self.random_range();
                payload_push_range(begin, end, &mut payload)?;
            }
            FunctionCode::ReadRegsSeries => {
                for reg in self.random_series() {
                    payload_push(reg, &mut payload)?;
                }
            }
            FunctionCode::DeviceSpecific1
            | FunctionCode::DeviceSpecific2
            | FunctionCode::DeviceSpecific3
            | FunctionCode::DeviceSpecific4
            | FunctionCode::Other(_) => {}
        }
        let id = self.layout.encode(FrameIdentifier::new(
            slave_address,
            function_code,
            message_class,
        ));
        Ok(Frame {
            id,
            payload,
            timestamp: core::time::Duration::ZERO,
            is_error: false,
        })
    }

    /// `(begin, end)` of a random 2..=6 register range, kept inside 0..=255
    fn random_range(&mut self) -> (u8, u8) {
        let len = self.rng.gen_range(RANGE_LEN_MIN..=RANGE_LEN_MAX);
        let begin: u8 = self.rng.gen();
        match begin.checked_add(len - 1) {
            Some(end) => (begin, end),
            // reflect back from the top of the register space
            None => (begin - (len - 1), begin),
        }
    }

    /// 2..=4 distinct random register addresses
    fn random_series(&mut self) -> heapless::Vec<u8, { SERIES_LEN_MAX as usize }> {
        let count = usize::from(self.rng.gen_range(SERIES_LEN_MIN..=SERIES_LEN_MAX));
        let mut regs = heapless::Vec::new();
        while regs.len() < count {
            let reg: u8 = self.rng.gen();
            if !regs.contains(&reg) && regs.push(reg).is_err() {
                break;
            }
        }
        regs
    }

    /// Decode a request frame, apply it to the addressed bank and build the response frame
    ///
    /// The response keeps the address and function code, the message class is switched to the
    /// slave class of the same priority
    pub fn process_frame(&mut self, request: &Frame) -> Result<Frame, ErrorKind> {
        let id = self.layout.decode(request.id);
        let mut payload = Payload::new();
        self.process_request(id, &request.payload, &mut payload)?;
        let response_id = self.layout.encode(FrameIdentifier::new(
            id.slave_address,
            id.function_code,
            id.message_class.response(),
        ));
        Ok(Frame {
            id: response_id,
            payload,
            timestamp: core::time::Duration::ZERO,
            is_error: false,
        })
    }

    /// Apply a decoded request to the addressed bank, appending the response payload
    ///
    /// Errors:
    ///
    /// * **FrameBroken** the frame is not a request or its payload does not fit the function
    /// * **IllegalSlaveAddress** no bank for the address
    /// * **IllegalFunction** the function code is not defined by the protocol
    /// * **OOB** the response does not fit into the response buffer
    pub fn process_request<V: VectorTrait<u8>>(
        &mut self,
        id: FrameIdentifier,
        request: &[u8],
        response: &mut V,
    ) -> Result<(), ErrorKind> {
        if !id.message_class.is_request() {
            return Err(ErrorKind::FrameBroken);
        }
        let bank = self
            .bank_mut(id.slave_address)
            .ok_or(ErrorKind::IllegalSlaveAddress)?;
        match id.function_code {
            FunctionCode::WriteRegsRange => {
                let (begin, end) = range_header(request)?;
                let count = usize::from(end - begin) + 1;
                let values = request.get(2..2 + count).ok_or(ErrorKind::FrameBroken)?;
                bank.set_registers_from_u8(begin, values)?;
                response.extend(&[begin, end])
            }
            FunctionCode::WriteRegsSeries => {
                if request.is_empty() || request.len() % 2 != 0 {
                    return Err(ErrorKind::FrameBroken);
                }
                // duplicate registers are not rejected, the later value wins
                for pair in request.chunks_exact(2) {
                    bank.set_register(pair[0], pair[1]);
                    response.push(pair[0])?;
                }
                Ok(())
            }
            FunctionCode::ReadRegsRange => {
                let (begin, end) = range_header(request)?;
                bank.get_registers_range(begin, end, response)
            }
            FunctionCode::ReadRegsSeries => {
                if request.is_empty() {
                    return Err(ErrorKind::FrameBroken);
                }
                bank.get_registers_series(request, response)
            }
            FunctionCode::DeviceSpecific1
            | FunctionCode::DeviceSpecific2
            | FunctionCode::DeviceSpecific3
            | FunctionCode::DeviceSpecific4 => Ok(()),
            FunctionCode::Other(_) => Err(ErrorKind::IllegalFunction),
        }
    }
}

#[inline]
fn payload_push<V: VectorTrait<u8>>(value: u8, payload: &mut V) -> Result<(), ErrorKind> {
    payload.push(value)
}

#[inline]
fn payload_push_range<V: VectorTrait<u8>>(
    begin: u8,
    end: u8,
    payload: &mut V,
) -> Result<(), ErrorKind> {
    payload.extend(&[begin, end])
}

/// `[regBegin, regEnd]` header of the range functions
fn range_header(request: &[u8]) -> Result<(u8, u8), ErrorKind> {
    match request {
        [begin, end, ..] if begin <= end => Ok((*begin, *end)),
        _ => Err(ErrorKind::FrameBroken),
    }
}
