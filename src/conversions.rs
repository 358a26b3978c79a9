//! Sensor readings to celsius, fahrenheit and percent relative humidity.
//!
//! These functions are used by the measurement methods on the drivers but
//! are provided here should you need to convert raw codes yourself (for
//! example, those returned by `measure_raw`).
//!
//! The conversion formulas can be found in the "Conversion of signal
//! outputs" section of the datasheet. Both expect the status bits (the two
//! least significant bits of the word) to have been cleared; see
//! [`strip_status_bits`].
//!
//! The conversions in the root of this module work with and return `f32`s.
//! If you prefer to work with fixed- rather than floating-point numbers,
//! use the `fixed` feature and the [`fixed_point`] submodule.

/// The two low-order bits of every measurement word are status bits.
pub const STATUS_BITS_MASK: u16 = 0b11;

/// Status bit 1 is set for humidity measurements and clear for temperature.
pub const HUMIDITY_STATUS_BIT: u16 = 0b10;

/// Clear the status bits, leaving the measured code.
pub const fn strip_status_bits(word: u16) -> u16 {
    word & !STATUS_BITS_MASK
}

/// Convert the raw temperature code to celsius.
///
/// `-46.85 + 175.72 * code / 2^16`
pub fn temperature_code_to_celsius(code: u16) -> f32 {
    let s_t: f32 = code.into();
    (175.72 * s_t / 65_536.0) - 46.85
}

/// Convert a temperature in celsius to fahrenheit.
///
/// This is plain arithmetic, so a sentinel value passed in is converted
/// like any other temperature.
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    (celsius * 9.0 / 5.0) + 32.0
}

/// Convert the raw humidity code to percent relative humidity.
///
/// `-6 + 125 * code / 2^16`
///
/// The value is not clamped, so codes at the extremes of the range can
/// produce readings slightly below 0% or above 100%.
pub fn humidity_code_to_percent_rh(code: u16) -> f32 {
    let s_rh: f32 = code.into();
    (125.0 * s_rh / 65_536.0) - 6.0
}

/// Fixed-point numeric conversions from sensor readings.
///
/// The functions in this module are the same as those in the parent
/// `conversions` module, except that they operate with fixed-point numbers
/// rather than floating-point numbers.
///
/// The formulas divide the code by `2^16`, so a `U16F16` built directly
/// from the code's bits is exactly that fraction with no rounding.
#[cfg(feature = "fixed")]
pub mod fixed_point {
    use fixed::types::{I16F16, U16F16};

    fn fraction(code: u16) -> I16F16 {
        I16F16::from_num(U16F16::from_bits(code.into()))
    }

    /// Convert the raw temperature code to celsius.
    pub fn temperature_code_to_celsius(code: u16) -> I16F16 {
        I16F16::from_num(175.72) * fraction(code) - I16F16::from_num(46.85)
    }

    /// Convert a temperature in celsius to fahrenheit.
    pub fn celsius_to_fahrenheit(celsius: I16F16) -> I16F16 {
        celsius * I16F16::from_num(9) / I16F16::from_num(5) + I16F16::from_num(32)
    }

    /// Convert the raw humidity code to percent relative humidity.
    pub fn humidity_code_to_percent_rh(code: u16) -> I16F16 {
        I16F16::from_num(125) * fraction(code) - I16F16::from_num(6)
    }

}

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.001
    }

    #[test]
    fn strips_only_status_bits() {
        assert_eq!(strip_status_bits(0x6403), 0x6400);
        assert_eq!(strip_status_bits(0x4102), 0x4100);
        assert_eq!(strip_status_bits(0xFFFF), 0xFFFC);
    }

    #[test]
    fn datasheet_temperature() {
        // 0x683A => 24.7 °C
        assert!((temperature_code_to_celsius(strip_status_bits(0x683A)) - 24.7).abs() < 0.05);
    }

    #[test]
    fn datasheet_humidity() {
        // 0x7C80 => 54.8 %RH, 0x4E85 => 32.3 %RH
        assert!((humidity_code_to_percent_rh(0x7C80) - 54.8).abs() < 0.05);
        assert!((humidity_code_to_percent_rh(strip_status_bits(0x4E85)) - 32.3).abs() < 0.05);
    }

    #[test]
    fn temperature_range() {
        assert!(close(temperature_code_to_celsius(0), -46.85));
        assert!(close(temperature_code_to_celsius(0x6400), 21.790625));
    }

    #[test]
    fn humidity_is_not_clamped() {
        assert!(close(humidity_code_to_percent_rh(0), -6.0));
        assert!(humidity_code_to_percent_rh(0xFFFC) > 100.0);
    }

    #[test]
    fn fahrenheit() {
        assert!(close(celsius_to_fahrenheit(0.0), 32.0));
        assert!(close(celsius_to_fahrenheit(100.0), 212.0));
        assert!(close(celsius_to_fahrenheit(-40.0), -40.0));
    }

    #[test]
    fn fahrenheit_passes_sentinels_through_arithmetically() {
        assert!(close(celsius_to_fahrenheit(-999.0), -1766.2));
        assert!(close(celsius_to_fahrenheit(-990.0), -1750.0));
    }
}
