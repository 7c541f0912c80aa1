#![no_main]

use arbitrary::Arbitrary;
use cannabus::{
    config::MonitorConfig,
    filter::{evaluate, FilterConfig},
    ranges,
    slave::SlaveEmulator,
    Frame, IdLayout,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput<'a> {
    raw_id: u32,
    request_buf: &'a [u8],
    addresses: &'a str,
    registers: &'a str,
    data: &'a str,
}

fuzz_target!(|data: FuzzInput| {
    // we only care about panics so we can ignore results
    let _ = fuzz_frame(data);
});

fn fuzz_frame(input: FuzzInput) -> Result<(), cannabus::ErrorKind> {
    let layout = IdLayout::default();
    let frame = Frame::new(input.raw_id, input.request_buf)?;
    let id = frame.identifier(&layout);
    assert_eq!(layout.decode(layout.encode(id)), id);

    let mut filters = FilterConfig::default();
    filters.allowed_slave_addresses = ranges::parse(input.addresses, 0);
    filters.content_filters.push(cannabus::filter::ContentFilter::new(
        ranges::parse(input.registers, 16),
        ranges::parse(input.data, 16),
    ));
    let _ = evaluate(&frame, &layout, &filters);

    let config = MonitorConfig {
        seed: Some(u64::from(input.raw_id)),
        ..MonitorConfig::default()
    };
    let mut emulator = SlaveEmulator::new(&config)?;
    if let Ok(response) = emulator.process_frame(&frame) {
        let _ = evaluate(&response, &layout, &filters);
    }
    Ok(())
}
