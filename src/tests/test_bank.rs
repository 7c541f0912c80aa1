use crate::slave::{RegisterBank, Registers};
use crate::ErrorKind;

#[test]
fn test_bank_write_read() {
    let mut bank = RegisterBank::new(5);
    assert_eq!(bank.slave_address(), 5);
    assert_eq!(bank.get_register(0x10), 0);
    bank.set_register(0x10, 0xab);
    assert_eq!(bank.get_register(0x10), 0xab);
    assert_eq!(bank.get_register(0x11), 0);
    bank.set_register(255, 7);
    assert_eq!(bank.get_register(255), 7);
    bank.clear();
    assert!(bank.iter().all(|v| v == 0));
}

#[test]
fn test_bank_bulk() {
    let mut bank = RegisterBank::new(1);
    bank.set_registers_from_u8(253, &[1, 2, 3]).unwrap();
    assert_eq!(bank.set_registers_from_u8(254, &[1, 2, 3]), Err(ErrorKind::OOB));
    let mut result = Vec::new();
    bank.get_registers_range(253, 255, &mut result).unwrap();
    assert_eq!(result, vec![1, 2, 3]);
    result.clear();
    bank.get_registers_series(&[255, 253], &mut result).unwrap();
    assert_eq!(result, vec![255, 3, 253, 1]);
}

#[test]
fn test_bank_range_into_payload_overflow() {
    let bank = RegisterBank::new(1);
    let mut payload: heapless::Vec<u8, 8> = heapless::Vec::new();
    assert_eq!(
        bank.get_registers_range(0, 8, &mut payload),
        Err(ErrorKind::OOB)
    );
}
