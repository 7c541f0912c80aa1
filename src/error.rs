#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    OOB,
    FrameBroken,
    IllegalFunction,
    IllegalSlaveAddress,
    IllegalLayout,
    Exhausted,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &str = match self {
            ErrorKind::OOB => "OUT OF BUFFER",
            ErrorKind::FrameBroken => "FRAME BROKEN",
            ErrorKind::IllegalFunction => "ILLEGAL FUNCTION",
            ErrorKind::IllegalSlaveAddress => "ILLEGAL SLAVE ADDRESS",
            ErrorKind::IllegalLayout => "ILLEGAL IDENTIFIER LAYOUT",
            ErrorKind::Exhausted => "SLAVE ADDRESS RANGE EXHAUSTED",
        };
        write!(f, "{}", msg)
    }
}

impl std::error::Error for ErrorKind {}
