//! Numeric sentinel values for callers that expect a bare `f32`.
//!
//! The typed measurement methods return a [`Result`]. Some existing code
//! instead expects every measurement to produce a float, with failures
//! signalled by values no sensor reading could take. The
//! `*_or_sentinel` methods on the drivers provide that behaviour, built on
//! [`or_sentinel`].
//!
//! Always check for these exact values on the celsius or humidity result.
//! The fahrenheit result is converted from the celsius one with plain
//! arithmetic, sentinel or not, so a checksum failure arrives as
//! `-1766.2` °F rather than `-999.0`.

use crate::error::Error;

/// Communication error, no data: the checksum did not match, or the bus
/// failed or timed out.
pub const CHECKSUM_FAILURE: f32 = -999.0;

/// The checksum was valid but the status bit did not match the kind of
/// measurement requested.
pub const WRONG_TYPE_TAG: f32 = -990.0;

/// Collapse a measurement result into a float, replacing any error with
/// its sentinel value.
pub fn or_sentinel<E>(result: Result<f32, Error<E>>) -> f32
where
    E: embedded_hal::i2c::Error,
{
    result.unwrap_or_else(|e| e.sentinel())
}
