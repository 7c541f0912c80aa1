use crate::filter::*;
use crate::identifier::encode;
use crate::ranges::parse;
use crate::*;

fn id(address: u8, fcode: FunctionCode, class: MessageClass) -> FrameIdentifier {
    FrameIdentifier::new(address, fcode, class)
}

#[test]
fn test_filter_default_accepts_everything() {
    let config = FilterConfig::default();
    for class in MessageClass::ALL {
        for fcode in FunctionCode::ALL {
            assert!(config.accepts(id(33, fcode, class), &[1, 2, 3]));
        }
    }
}

#[test]
fn test_filter_dimensional_and() {
    let mut config = FilterConfig::default();
    config.allowed_slave_addresses = parse("7", 10);
    let frame = id(8, FunctionCode::ReadRegsRange, MessageClass::Master);
    assert!(!config.accepts(frame, &[0, 1]));
    assert!(config.accepts(
        id(7, FunctionCode::ReadRegsRange, MessageClass::Master),
        &[0, 1]
    ));
}

#[test]
fn test_filter_class_and_code() {
    let mut config = FilterConfig::default();
    config.set_message_class_enabled(MessageClass::Slave, false);
    config.set_function_code_enabled(FunctionCode::DeviceSpecific2, false);
    assert!(!config.accepts(id(1, FunctionCode::ReadRegsRange, MessageClass::Slave), &[]));
    assert!(!config.accepts(id(1, FunctionCode::DeviceSpecific2, MessageClass::Master), &[]));
    assert!(config.accepts(id(1, FunctionCode::DeviceSpecific1, MessageClass::Master), &[]));
    // unknown ordinals are not enabled by default
    assert!(!config.accepts(id(1, FunctionCode::Other(9), MessageClass::Master), &[]));
    config.set_function_code_enabled(FunctionCode::Other(9), true);
    assert!(config.accepts(id(1, FunctionCode::Other(9), MessageClass::Master), &[]));
}

#[test]
fn test_filter_content_rule_or() {
    let mut config = FilterConfig::default();
    config
        .content_filters
        .push(ContentFilter::new(parse("1-3", 10), RangeSet::new()));
    config
        .content_filters
        .push(ContentFilter::new(RangeSet::new(), parse("0x10", 0)));
    // read series request touching register 2, no data bytes
    let frame = id(4, FunctionCode::ReadRegsSeries, MessageClass::Master);
    assert!(config.accepts(frame, &[2]));
    // register 9 fails R1, R2 has no data bytes to check
    assert!(config.accepts(frame, &[9]));
    // read range response: no register addresses, R1 passes
    let frame = id(4, FunctionCode::ReadRegsRange, MessageClass::Slave);
    assert!(config.accepts(frame, &[0x55, 0x66]));
}

#[test]
fn test_filter_content_rule_fields_must_all_match() {
    let mut config = FilterConfig::default();
    config
        .content_filters
        .push(ContentFilter::new(parse("1-3", 10), RangeSet::new()));
    config
        .content_filters
        .push(ContentFilter::new(RangeSet::new(), parse("0x10", 0)));
    // write series: register 9 fails R1, data 0x11 fails R2
    let write = id(4, FunctionCode::WriteRegsSeries, MessageClass::Master);
    assert!(!config.accepts(write, &[9, 0x11]));
    assert!(config.accepts(write, &[9, 0x10]));
    assert!(config.accepts(write, &[2, 0x11]));
    // one register out of the set is enough to fail R1
    assert!(!config.accepts(write, &[2, 0x11, 9, 0x11]));
}

#[test]
fn test_filter_content_rule_without_payload_values() {
    let registers_only = ContentFilter::new(parse("1-3", 10), RangeSet::new());
    let data_only = ContentFilter::new(RangeSet::new(), parse("0x10", 0));
    let response = PayloadContent::new(
        id(4, FunctionCode::ReadRegsRange, MessageClass::Slave),
        &[0x55, 0x66],
    );
    assert!(registers_only.matches(&response));
    assert!(!data_only.matches(&response));
    let request = PayloadContent::new(
        id(4, FunctionCode::ReadRegsSeries, MessageClass::Master),
        &[9],
    );
    assert!(data_only.matches(&request));
    assert!(!registers_only.matches(&request));
}

#[test]
fn test_filter_content_both_dimensions() {
    let mut config = FilterConfig::default();
    config
        .content_filters
        .push(ContentFilter::new(parse("10-20", 10), parse("0-9", 10)));
    let write = id(4, FunctionCode::WriteRegsRange, MessageClass::Master);
    assert!(config.accepts(write, &[10, 12, 1, 2, 3]));
    assert!(!config.accepts(write, &[10, 12, 1, 2, 30]));
    assert!(!config.accepts(write, &[19, 21, 1, 2, 3]));
    // the response echoes only the range, there is no data to check
    let echo = id(4, FunctionCode::WriteRegsRange, MessageClass::Slave);
    assert!(config.accepts(echo, &[10, 12]));
    assert!(!config.accepts(echo, &[19, 21]));
}

#[test]
fn test_payload_content_shapes() {
    let regs = |c: PayloadContent<'_>| c.registers.iter().collect::<Vec<_>>();
    let data = |c: PayloadContent<'_>| c.data.iter().collect::<Vec<_>>();

    let c = PayloadContent::new(
        id(1, FunctionCode::WriteRegsRange, MessageClass::Master),
        &[254, 255, 7, 8],
    );
    assert_eq!(regs(c), vec![254, 255]);
    assert_eq!(data(c), vec![7, 8]);

    let c = PayloadContent::new(
        id(1, FunctionCode::WriteRegsSeries, MessageClass::HighPriorityMaster),
        &[5, 50, 6, 60],
    );
    assert_eq!(regs(c), vec![5, 6]);
    assert_eq!(data(c), vec![50, 60]);

    let c = PayloadContent::new(
        id(1, FunctionCode::WriteRegsSeries, MessageClass::Slave),
        &[5, 6],
    );
    assert_eq!(regs(c), vec![5, 6]);
    assert!(c.data.is_empty());

    let c = PayloadContent::new(
        id(1, FunctionCode::ReadRegsSeries, MessageClass::HighPrioritySlave),
        &[5, 50, 6, 60],
    );
    assert_eq!(regs(c), vec![5, 6]);
    assert_eq!(data(c), vec![50, 60]);

    let c = PayloadContent::new(
        id(1, FunctionCode::ReadRegsRange, MessageClass::Master),
        &[12, 10],
    );
    assert_eq!(regs(c), vec![10, 11, 12]);

    let c = PayloadContent::new(
        id(1, FunctionCode::ReadRegsRange, MessageClass::Master),
        &[12],
    );
    assert!(c.registers.is_empty());

    let c = PayloadContent::new(
        id(1, FunctionCode::DeviceSpecific4, MessageClass::Master),
        &[1, 2],
    );
    assert!(c.registers.is_empty());
    assert_eq!(data(c), vec![1, 2]);
}

#[test]
fn test_filter_evaluate_frame() {
    let mut config = FilterConfig::default();
    config.allowed_slave_addresses = parse("1-10", 10);
    let frame = Frame::new(
        encode(10, FunctionCode::ReadRegsRange, MessageClass::Master),
        &[0, 1],
    )
    .unwrap();
    assert!(evaluate(&frame, &IdLayout::CANNABUS, &config));
    let frame = Frame::new(
        encode(11, FunctionCode::ReadRegsRange, MessageClass::Master),
        &[0, 1],
    )
    .unwrap();
    assert!(!evaluate(&frame, &IdLayout::CANNABUS, &config));
}
