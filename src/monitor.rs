//! Bus monitor pipeline
//!
//! Frames are pulled from a [`Transport`], decoded, run through the [`FilterConfig`] and the
//! visible ones are handed to a sink as [`MonitorEvent`]s. Everything runs on the caller's
//! thread, driven by [`Monitor::tick`]: one cooperative timer drains the transport, a second
//! one (emulation only) advances the [`SlaveEmulator`] by one phase and writes the frame it
//! produced to the transport, where it is read back like any other traffic.
//!
//! ```
//! use std::time::Instant;
//! use cannabus::{config::MonitorConfig, monitor::{LoopbackBus, Monitor, MonitorEvent}};
//!
//! let config = MonitorConfig {
//!     emulation: true,
//!     seed: Some(1),
//!     ..MonitorConfig::default()
//! };
//! let mut monitor = Monitor::new(config, LoopbackBus::new()).unwrap();
//! monitor.connect(Instant::now());
//! monitor.emulate_step().unwrap();
//! monitor.emulate_step().unwrap();
//! let mut frames = Vec::new();
//! monitor.poll(&mut |event: MonitorEvent| {
//!     if let MonitorEvent::Frame(frame) = event {
//!         frames.push(frame);
//!     }
//! });
//! assert_eq!(frames.len(), 2);
//! assert_eq!(frames[0].sequence, 1);
//! ```
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::MonitorConfig;
use crate::filter::{ContentFilter, FilterConfig};
use crate::frame::Frame;
use crate::identifier::{FunctionCode, MessageClass};
use crate::ranges::{self, RangeSet};
use crate::slave::SlaveEmulator;
use crate::ErrorKind;

/// Bus access as seen by the monitor
///
/// Reads are pull-style and never block: [`frames_available`](Transport::frames_available)
/// tells whether [`read_frame`](Transport::read_frame) has something to return right now.
pub trait Transport {
    fn frames_available(&self) -> bool;

    fn read_frame(&mut self) -> Option<Frame>;

    fn write_frame(&mut self, frame: Frame) -> Result<(), ErrorKind>;

    /// Human-readable text for a bus error frame
    fn interpret_error_frame(&self, frame: &Frame) -> String {
        format!("error frame {:#x} [{}]", frame.id, frame.payload_hex())
    }
}

/// In-process bus, every written frame is read back in order
///
/// Written frames are stamped with the time elapsed since the bus was created
pub struct LoopbackBus {
    queue: VecDeque<Frame>,
    opened: Instant,
}

impl Default for LoopbackBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            opened: Instant::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Transport for LoopbackBus {
    fn frames_available(&self) -> bool {
        !self.queue.is_empty()
    }

    fn read_frame(&mut self) -> Option<Frame> {
        self.queue.pop_front()
    }

    fn write_frame(&mut self, frame: Frame) -> Result<(), ErrorKind> {
        self.queue.push_back(frame.with_timestamp(self.opened.elapsed()));
        Ok(())
    }
}

/// A decoded frame which passed the filters
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VisibleFrame {
    /// counts every frame read since connect, filtered and error frames included
    pub sequence: u64,
    pub timestamp: Duration,
    pub message_class: MessageClass,
    pub function_code: FunctionCode,
    pub slave_address: u8,
    pub payload_length: usize,
    pub payload_hex: String,
    /// e.g. `[Reading register's range] Master's request`
    pub description: String,
}

/// A bus error frame, reported without decoding or filtering
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ErrorFrameReport {
    pub sequence: u64,
    pub timestamp: Duration,
    pub id: u32,
    pub payload_hex: String,
    pub info: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum MonitorEvent {
    Frame(VisibleFrame),
    Error(ErrorFrameReport),
}

/// Cooperative periodic timer
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period: Duration,
    next_due: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Arm the timer, the first tick is due one period after `now`
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Has the timer fired, at most once per call
    ///
    /// Missed periods are not caught up, the next tick is scheduled one period after `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

pub struct Monitor<T: Transport> {
    config: MonitorConfig,
    filters: FilterConfig,
    transport: T,
    emulator: Option<SlaveEmulator>,
    sequence: u64,
    poll_timer: Interval,
    emulation_timer: Interval,
}

impl<T: Transport> Monitor<T> {
    /// Create a monitor, with a slave emulator when `config.emulation` is set
    pub fn new(config: MonitorConfig, transport: T) -> Result<Self, ErrorKind> {
        config.validate()?;
        let emulator = if config.emulation {
            Some(SlaveEmulator::new(&config)?)
        } else {
            None
        };
        Ok(Self {
            poll_timer: Interval::new(config.poll_period()),
            emulation_timer: Interval::new(config.emulation_period()),
            config,
            filters: FilterConfig::default(),
            transport,
            emulator,
            sequence: 0,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn emulator(&self) -> Option<&SlaveEmulator> {
        self.emulator.as_ref()
    }

    pub fn emulator_mut(&mut self) -> Option<&mut SlaveEmulator> {
        self.emulator.as_mut()
    }

    pub fn is_connected(&self) -> bool {
        self.poll_timer.is_running()
    }

    /// Reset the frame counter and start the timers
    pub fn connect(&mut self, now: Instant) {
        self.sequence = 0;
        self.poll_timer.start(now);
        if self.emulator.is_some() {
            self.emulation_timer.start(now);
        }
        log::debug!(
            "monitor connected, emulation: {}",
            if self.emulator.is_some() { "on" } else { "off" }
        );
    }

    /// Stop the timers and drain whatever is still queued
    pub fn disconnect<F: FnMut(MonitorEvent)>(&mut self, sink: &mut F) -> usize {
        self.emulation_timer.stop();
        self.poll_timer.stop();
        let flushed = self.poll(sink);
        log::debug!("monitor disconnected, {} frame(s) flushed", flushed);
        flushed
    }

    /// Run the timers which are due
    ///
    /// Advances the emulator by one phase if its timer fired, then drains the transport if the
    /// poll timer fired. Returns the number of frames read.
    pub fn tick<F: FnMut(MonitorEvent)>(
        &mut self,
        now: Instant,
        sink: &mut F,
    ) -> Result<usize, ErrorKind> {
        if self.emulation_timer.poll(now) {
            self.emulate_step()?;
        }
        if self.poll_timer.poll(now) {
            return Ok(self.poll(sink));
        }
        Ok(0)
    }

    /// Advance the emulator by one phase, the produced frame goes to the transport
    ///
    /// Does nothing when emulation is off
    pub fn emulate_step(&mut self) -> Result<(), ErrorKind> {
        if let Some(emulator) = self.emulator.as_mut() {
            let frame = emulator.step()?;
            self.transport.write_frame(frame)?;
        }
        Ok(())
    }

    /// Drain the frames available right now
    ///
    /// Error frames are reported as-is, data frames are decoded and reported if visible.
    /// Returns the number of frames read.
    pub fn poll<F: FnMut(MonitorEvent)>(&mut self, sink: &mut F) -> usize {
        let mut count = 0;
        while self.transport.frames_available() {
            let Some(frame) = self.transport.read_frame() else {
                break;
            };
            count += 1;
            self.sequence += 1;
            if frame.is_error {
                let info = self.transport.interpret_error_frame(&frame);
                log::warn!("bus error frame #{}: {}", self.sequence, info);
                sink(MonitorEvent::Error(ErrorFrameReport {
                    sequence: self.sequence,
                    timestamp: frame.timestamp,
                    id: frame.id,
                    payload_hex: frame.payload_hex(),
                    info,
                }));
                continue;
            }
            let id = frame.identifier(&self.config.layout);
            if !self.filters.accepts(id, &frame.payload) {
                continue;
            }
            sink(MonitorEvent::Frame(VisibleFrame {
                sequence: self.sequence,
                timestamp: frame.timestamp,
                message_class: id.message_class,
                function_code: id.function_code,
                slave_address: id.slave_address,
                payload_length: frame.payload.len(),
                payload_hex: frame.payload_hex(),
                description: format!("[{}] {}", id.function_code, id.message_class),
            }));
        }
        log::trace!("{} frame(s) drained", count);
        count
    }

    pub fn set_message_class_enabled(&mut self, class: MessageClass, enabled: bool) {
        log::debug!("message class {:?} enabled: {}", class, enabled);
        self.filters.set_message_class_enabled(class, enabled);
    }

    pub fn set_function_code_enabled(&mut self, code: FunctionCode, enabled: bool) {
        log::debug!("function code {:?} enabled: {}", code, enabled);
        self.filters.set_function_code_enabled(code, enabled);
    }

    pub fn set_all_message_classes_enabled(&mut self, enabled: bool) {
        for class in MessageClass::ALL {
            self.set_message_class_enabled(class, enabled);
        }
    }

    pub fn set_all_function_codes_enabled(&mut self, enabled: bool) {
        for code in FunctionCode::ALL {
            self.set_function_code_enabled(code, enabled);
        }
    }

    /// Restrict visible frames to the slave addresses in `text`
    ///
    /// `text` is range notation with C-literal bases, spaces are ignored. An empty result allows
    /// every address. Returns the normalized notation to show back.
    pub fn set_allowed_slave_addresses(&mut self, text: &str) -> String {
        let text: String = text.chars().filter(|c| *c != ' ').collect();
        let addresses = ranges::parse(&text, 0);
        let normalized = ranges::format(&addresses);
        if addresses.is_empty() {
            log::debug!("slave address filter cleared");
        } else {
            log::debug!("slave address filter: {}", normalized);
        }
        self.filters.allowed_slave_addresses = addresses;
        normalized
    }

    /// Add a content filter from register and data range notation, both read as hex
    ///
    /// Nothing is added if both texts are empty or a non-empty text has no readable token.
    /// Returns the normalized `(registers, data)` notation to show back.
    pub fn set_content_filter(&mut self, regs_text: &str, data_text: &str) -> Option<(String, String)> {
        if regs_text.trim().is_empty() && data_text.trim().is_empty() {
            return None;
        }
        let registers = parse_content_dimension(regs_text)?;
        let data = parse_content_dimension(data_text)?;
        let echo = (ranges::format_hex(&registers), ranges::format_hex(&data));
        log::debug!("content filter added: registers [{}], data [{}]", echo.0, echo.1);
        self.filters
            .content_filters
            .push(ContentFilter::new(registers, data));
        Some(echo)
    }

    pub fn remove_content_filter(&mut self, index: usize) -> Option<ContentFilter> {
        if index < self.filters.content_filters.len() {
            log::debug!("content filter {} removed", index);
            Some(self.filters.content_filters.remove(index))
        } else {
            None
        }
    }

    pub fn content_filters(&self) -> &[ContentFilter] {
        &self.filters.content_filters
    }

    /// Everything visible again
    pub fn reset_filters(&mut self) {
        log::debug!("filters reset");
        self.filters = FilterConfig::default();
    }
}

/// `None` when the text has content but no readable token
fn parse_content_dimension(text: &str) -> Option<RangeSet> {
    let set = ranges::parse(text, 16);
    if set.is_empty() && !text.trim().is_empty() {
        None
    } else {
        Some(set)
    }
}
