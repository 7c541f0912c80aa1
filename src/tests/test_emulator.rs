use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::MonitorConfig;
use crate::identifier::encode;
use crate::slave::{Registers, SlaveEmulator};
use crate::*;

fn emulator(seed: u64) -> SlaveEmulator {
    let config = MonitorConfig {
        seed: Some(seed),
        ..MonitorConfig::default()
    };
    SlaveEmulator::new(&config).unwrap()
}

fn request(address: u8, fcode: FunctionCode, payload: &[u8]) -> Frame {
    Frame::new(encode(address, fcode, MessageClass::Master), payload).unwrap()
}

#[test]
fn test_emulator_range_write_then_read() {
    let mut emu = emulator(1);
    let response = emu
        .process_frame(&request(5, FunctionCode::WriteRegsRange, &[10, 12, 1, 2, 3]))
        .unwrap();
    assert_eq!(response.payload.as_slice(), &[10, 12]);
    assert_eq!(
        response.id,
        encode(5, FunctionCode::WriteRegsRange, MessageClass::Slave)
    );
    let response = emu
        .process_frame(&request(5, FunctionCode::ReadRegsRange, &[10, 12]))
        .unwrap();
    assert_eq!(response.payload.as_slice(), &[1, 2, 3]);
    // other slaves are untouched
    let response = emu
        .process_frame(&request(6, FunctionCode::ReadRegsRange, &[10, 12]))
        .unwrap();
    assert_eq!(response.payload.as_slice(), &[0, 0, 0]);
}

#[test]
fn test_emulator_series_write_then_read() {
    let mut emu = emulator(2);
    let response = emu
        .process_frame(&request(
            60,
            FunctionCode::WriteRegsSeries,
            &[0x30, 0xaa, 0x02, 0xbb],
        ))
        .unwrap();
    assert_eq!(response.payload.as_slice(), &[0x30, 0x02]);
    let response = emu
        .process_frame(&request(60, FunctionCode::ReadRegsSeries, &[0x02, 0x30, 0x31]))
        .unwrap();
    assert_eq!(
        response.payload.as_slice(),
        &[0x02, 0xbb, 0x30, 0xaa, 0x31, 0x00]
    );
    assert_eq!(emu.bank(60).unwrap().get_register(0x30), 0xaa);
}

#[test]
fn test_emulator_high_priority_response_class() {
    let mut emu = emulator(3);
    let req = Frame::new(
        encode(7, FunctionCode::ReadRegsRange, MessageClass::HighPriorityMaster),
        &[0, 1],
    )
    .unwrap();
    let response = emu.process_frame(&req).unwrap();
    assert_eq!(
        crate::identifier::decode(response.id).message_class,
        MessageClass::HighPrioritySlave
    );
}

#[test]
fn test_emulator_device_specific_noop() {
    let mut emu = emulator(4);
    let before = emu.bank(9).unwrap().clone();
    let response = emu
        .process_frame(&request(9, FunctionCode::DeviceSpecific3, &[1, 2, 3]))
        .unwrap();
    assert!(response.payload.is_empty());
    assert_eq!(emu.bank(9).unwrap(), &before);
}

#[test]
fn test_emulator_broken_requests() {
    let mut emu = emulator(5);
    for (fcode, payload) in [
        (FunctionCode::WriteRegsRange, &[10u8][..]),
        (FunctionCode::WriteRegsRange, &[10, 12, 1, 2][..]),
        (FunctionCode::WriteRegsRange, &[12, 10, 1, 2, 3][..]),
        (FunctionCode::WriteRegsSeries, &[1, 2, 3][..]),
        (FunctionCode::ReadRegsRange, &[][..]),
        (FunctionCode::ReadRegsSeries, &[][..]),
    ] {
        assert_eq!(
            emu.process_frame(&request(5, fcode, payload)).unwrap_err(),
            ErrorKind::FrameBroken
        );
    }
    // a failed range write leaves the bank alone
    assert!(emu.bank(5).unwrap().iter().all(|v| v == 0));
    let slave_frame = Frame::new(
        encode(5, FunctionCode::ReadRegsRange, MessageClass::Slave),
        &[0, 1],
    )
    .unwrap();
    assert_eq!(
        emu.process_frame(&slave_frame).unwrap_err(),
        ErrorKind::FrameBroken
    );
    assert_eq!(
        emu.process_frame(&request(0, FunctionCode::ReadRegsRange, &[0, 1]))
            .unwrap_err(),
        ErrorKind::IllegalSlaveAddress
    );
    assert_eq!(
        emu.process_frame(&request(61, FunctionCode::ReadRegsRange, &[0, 1]))
            .unwrap_err(),
        ErrorKind::IllegalSlaveAddress
    );
    // 9 registers do not fit into a response frame
    assert_eq!(
        emu.process_frame(&request(5, FunctionCode::ReadRegsRange, &[0, 8]))
            .unwrap_err(),
        ErrorKind::OOB
    );
}

#[test]
fn test_emulator_unknown_function() {
    let layout = IdLayout {
        fcode_width: 4,
        address_offset: 4,
        class_offset: 10,
        ..IdLayout::CANNABUS
    };
    let mut emu =
        SlaveEmulator::with_rng(layout, 1, 60, StdRng::seed_from_u64(0)).unwrap();
    let id = layout.encode(FrameIdentifier::new(
        3,
        FunctionCode::Other(9),
        MessageClass::Master,
    ));
    let frame = Frame::new(id, &[0, 1]).unwrap();
    assert_eq!(
        emu.process_frame(&frame).unwrap_err(),
        ErrorKind::IllegalFunction
    );
}

#[test]
fn test_emulator_rejects_bad_config() {
    let rng = || StdRng::seed_from_u64(0);
    assert_eq!(
        SlaveEmulator::with_rng(IdLayout::CANNABUS, 10, 9, rng()).err(),
        Some(ErrorKind::Exhausted)
    );
    assert_eq!(
        SlaveEmulator::with_rng(IdLayout::CANNABUS, 1, 64, rng()).err(),
        Some(ErrorKind::IllegalLayout)
    );
}

#[test]
fn test_emulator_generated_requests_are_well_formed() {
    let mut emu = emulator(0xdead);
    for _ in 0..2000 {
        let frame = emu.generate_request().unwrap();
        let id = crate::identifier::decode(frame.id);
        assert!((1..=60).contains(&id.slave_address));
        assert!(id.message_class.is_request());
        let p = frame.payload.as_slice();
        match id.function_code {
            FunctionCode::WriteRegsRange => {
                let len = usize::from(p[1] - p[0]) + 1;
                assert!((2..=6).contains(&len));
                assert_eq!(p.len(), 2 + len);
            }
            FunctionCode::ReadRegsRange => {
                assert_eq!(p.len(), 2);
                assert!((1..=5).contains(&(p[1] - p[0])));
            }
            FunctionCode::WriteRegsSeries => {
                assert!(p.len() % 2 == 0 && (4..=8).contains(&p.len()));
                let regs: Vec<u8> = p.iter().step_by(2).copied().collect();
                let mut dedup = regs.clone();
                dedup.sort_unstable();
                dedup.dedup();
                assert_eq!(dedup.len(), regs.len());
            }
            FunctionCode::ReadRegsSeries => {
                assert!((2..=4).contains(&p.len()));
                let mut dedup = p.to_vec();
                dedup.sort_unstable();
                dedup.dedup();
                assert_eq!(dedup.len(), p.len());
            }
            other => panic!("unexpected function {:?}", other),
        }
    }
}

#[test]
fn test_emulator_two_phase_cycle() {
    let mut emu = emulator(0xbeef);
    for _ in 0..500 {
        assert!(!emu.awaiting_response());
        let req = emu.step().unwrap();
        assert!(emu.awaiting_response());
        let resp = emu.step().unwrap();
        let req_id = crate::identifier::decode(req.id);
        let resp_id = crate::identifier::decode(resp.id);
        assert_eq!(req_id.slave_address, resp_id.slave_address);
        assert_eq!(req_id.function_code, resp_id.function_code);
        assert_eq!(resp_id.message_class, req_id.message_class.response());
    }
}

#[test]
fn test_emulator_submit() {
    let mut emu = emulator(6);
    let req = request(5, FunctionCode::WriteRegsRange, &[10, 12, 1, 2, 3]);
    assert_eq!(emu.submit(req.clone()), req);
    assert!(emu.awaiting_response());
    assert_eq!(emu.step().unwrap().payload.as_slice(), &[10, 12]);
    emu.submit(request(5, FunctionCode::ReadRegsRange, &[10, 12]));
    assert_eq!(emu.step().unwrap().payload.as_slice(), &[1, 2, 3]);
}
