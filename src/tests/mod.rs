mod test_bank;
mod test_emulator;
mod test_filter;
