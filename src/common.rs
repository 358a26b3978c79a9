use embedded_hal::i2c::SevenBitAddress;

use crate::conversions::{HUMIDITY_STATUS_BIT, strip_status_bits};
use crate::crc::validate;
use crate::error::Error;

/// The HTU21D has a single fixed I2C address.
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x40;

pub(crate) const SOFT_RESET_COMMAND: u8 = 0xFE;
pub(crate) const READ_USER_REGISTER_COMMAND: u8 = 0xE7;
pub(crate) const WRITE_USER_REGISTER_COMMAND: u8 = 0xE6;

/// The sensor is guaranteed to have rebooted within 15ms of a soft reset.
pub(crate) const SOFT_RESET_DELAY_MS: u32 = 15;

/// Interval between read attempts while waiting for a measurement.
pub(crate) const READ_RETRY_INTERVAL_MS: u32 = 1;

/// The quantity to measure.
///
/// Each kind has its own "hold master" command. The sensor marks which
/// kind it measured in bit 1 of the returned word: clear for temperature,
/// set for humidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementKind {
    Temperature,
    Humidity,
}

impl MeasurementKind {
    /// I2C command byte that triggers a hold-master measurement.
    pub(crate) fn command_byte(&self) -> u8 {
        match self {
            MeasurementKind::Temperature => 0xE3,
            MeasurementKind::Humidity => 0xE5,
        }
    }

    /// Whether the status bit in `word` agrees with this kind.
    ///
    /// The check is deliberately asymmetric: a temperature reading is
    /// rejected if the humidity bit is set, while a humidity reading is
    /// only accepted if it is set.
    pub(crate) fn status_bit_matches(&self, word: u16) -> bool {
        let tagged_humidity = word & HUMIDITY_STATUS_BIT != 0;
        match self {
            MeasurementKind::Temperature => !tagged_humidity,
            MeasurementKind::Humidity => tagged_humidity,
        }
    }
}

impl core::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MeasurementKind::Temperature => f.write_str("temperature"),
            MeasurementKind::Humidity => f.write_str("humidity"),
        }
    }
}

/// Internal wrapper around the 3 bytes read from the sensor, so that the
/// measurement word may only be accessed after passing CRC verification.
pub(crate) struct Unvalidated([u8; 3]);

impl Unvalidated {
    pub(crate) fn new(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    /// Return the measured code, with status bits cleared, if the checksum
    /// is valid and the status bit agrees with `kind`.
    ///
    /// The bytes read from the sensor are the most significant byte, the
    /// least significant byte, and the checksum of those two bytes.
    pub(crate) fn try_get_code<I>(self, kind: MeasurementKind) -> Result<u16, Error<I>>
    where
        I: embedded_hal::i2c::Error,
    {
        let [msb, lsb, check] = self.0;
        trace!("{:?} response: {:?}", kind, self.0);

        let word = u16::from_be_bytes([msb, lsb]);
        if let Err(remainder) = validate(word, check) {
            warn!(
                "{:?} checksum mismatch: word={}, check={}, remainder={}",
                kind, word, check, remainder
            );
            return Err(Error::ChecksumMismatch(kind));
        }
        if !kind.status_bit_matches(word) {
            warn!("{:?} response has inconsistent status bits: word={}", kind, word);
            return Err(Error::TypeTagInconsistent(kind));
        }
        Ok(strip_status_bits(word))
    }
}

/// Measurement resolution, set in bits 7 and 0 of the user register.
///
/// Lower resolutions convert faster. The converted code is always
/// returned left-aligned in the 16-bit word, so the conversion formulas
/// do not change with resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 12-bit humidity, 14-bit temperature. The power-on default.
    Max,
    /// 8-bit humidity, 12-bit temperature.
    Low,
    /// 10-bit humidity, 13-bit temperature.
    Mid,
    /// 11-bit humidity, 11-bit temperature.
    High,
}

impl Resolution {
    const MASK: u8 = 0b1000_0001;

    fn bits(&self) -> u8 {
        match self {
            Resolution::Max => 0b0000_0000,
            Resolution::Low => 0b0000_0001,
            Resolution::Mid => 0b1000_0000,
            Resolution::High => 0b1000_0001,
        }
    }
}

/// Contents of the sensor's user register.
///
/// | Bit  | Meaning                                   |
/// |------|-------------------------------------------|
/// | 7, 0 | Resolution                                |
/// | 6    | End of battery (read only, set below 2.25V) |
/// | 5..3 | Reserved                                  |
/// | 2    | On-chip heater                            |
/// | 1    | Disable OTP reload                        |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UserRegister(u8);

impl UserRegister {
    /// Value of the register after power-on or soft reset.
    pub const RESET_VALUE: u8 = 0b0000_0010;

    const HEATER: u8 = 0b0000_0100;
    const END_OF_BATTERY: u8 = 0b0100_0000;
    const RESERVED: u8 = 0b0011_1000;

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn resolution(&self) -> Resolution {
        match self.0 & Resolution::MASK {
            0b0000_0000 => Resolution::Max,
            0b0000_0001 => Resolution::Low,
            0b1000_0000 => Resolution::Mid,
            _ => Resolution::High,
        }
    }

    pub fn heater_enabled(&self) -> bool {
        self.0 & Self::HEATER != 0
    }

    /// Set when the supply voltage has dropped below 2.25V.
    pub fn end_of_battery(&self) -> bool {
        self.0 & Self::END_OF_BATTERY != 0
    }

    #[must_use]
    pub fn with_resolution(self, resolution: Resolution) -> Self {
        Self((self.0 & !Resolution::MASK) | resolution.bits())
    }

    #[must_use]
    pub fn with_heater(self, on: bool) -> Self {
        if on {
            Self(self.0 | Self::HEATER)
        } else {
            Self(self.0 & !Self::HEATER)
        }
    }

    /// Take the reserved bits from `device`, the register as read from the
    /// sensor, since they must not be changed when writing.
    #[must_use]
    pub(crate) fn merge_reserved(self, device: UserRegister) -> Self {
        Self((self.0 & !Self::RESERVED) | (device.0 & Self::RESERVED))
    }
}

impl Default for UserRegister {
    fn default() -> Self {
        Self(Self::RESET_VALUE)
    }
}

/// Timing settings for measurements.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Delay between sending a measurement command and reading the result.
    ///
    /// The default of 50ms covers the worst-case conversion time at the
    /// highest resolution (14-bit temperature).
    pub settling_delay_ms: u32,
    /// How long to keep retrying the read, 1ms apart, if the sensor
    /// rejects it after the settling delay. Once exceeded the measurement
    /// fails with [`Error::Timeout`]. Zero allows a single attempt.
    pub read_timeout_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settling_delay_ms: 50,
            read_timeout_ms: 50,
        }
    }
}
