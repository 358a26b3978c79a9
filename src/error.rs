use crate::common::MeasurementKind;
use crate::sentinel::{CHECKSUM_FAILURE, WRONG_TYPE_TAG};

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    /// The bus reported an error while sending a command or accessing
    /// the user register.
    I2c(I2cError),
    /// The sensor did not deliver its response within the configured
    /// read timeout.
    Timeout(MeasurementKind),
    /// The checksum byte did not match the two data bytes.
    ChecksumMismatch(MeasurementKind),
    /// The checksum was valid but the status bit says the sensor measured
    /// the other quantity.
    TypeTagInconsistent(MeasurementKind),
    /// The user register did not hold its reset value after a soft reset.
    UnexpectedUserRegister(u8),
}

impl<I2cError> Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    /// The numeric sentinel a measurement call reports for this error
    /// through the [`sentinel`](crate::sentinel) compatibility layer.
    ///
    /// Only a type-tag mismatch has its own value; every communication
    /// failure is reported as a checksum failure.
    pub fn sentinel(&self) -> f32 {
        match self {
            Error::TypeTagInconsistent(_) => WRONG_TYPE_TAG,
            Error::I2c(_)
            | Error::Timeout(_)
            | Error::ChecksumMismatch(_)
            | Error::UnexpectedUserRegister(_) => CHECKSUM_FAILURE,
        }
    }
}

impl<I2cError> From<I2cError> for Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    fn from(value: I2cError) -> Self {
        Error::I2c(value)
    }
}

impl<I2cError> core::fmt::Display for Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "Received I2C error: {:?}", e),
            Error::Timeout(kind) => write!(f, "Timed out waiting for {kind} response"),
            Error::ChecksumMismatch(kind) => {
                write!(f, "CRC validation failed for {kind} bytes")
            }
            Error::TypeTagInconsistent(kind) => {
                write!(f, "Status bits do not match a {kind} measurement")
            }
            Error::UnexpectedUserRegister(value) => {
                write!(f, "User register read {value:#04X} after reset, expected 0x02")
            }
        }
    }
}

impl<I> core::error::Error for Error<I> where I: embedded_hal::i2c::Error {}
