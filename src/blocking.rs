use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c, SevenBitAddress};

use crate::common::{
    Config, DEFAULT_ADDRESS, MeasurementKind, READ_RETRY_INTERVAL_MS, READ_USER_REGISTER_COMMAND,
    Resolution, SOFT_RESET_COMMAND, SOFT_RESET_DELAY_MS, Unvalidated, UserRegister,
    WRITE_USER_REGISTER_COMMAND,
};
use crate::conversions::{
    celsius_to_fahrenheit, humidity_code_to_percent_rh, temperature_code_to_celsius,
};
use crate::error::Error;
use crate::sentinel::or_sentinel;

pub struct Htu21d<I: I2c> {
    i2c: I,
    read_buffer: [u8; 3],
    user_register: UserRegister,
    config_changed: bool,
    pub address: SevenBitAddress,
    pub config: Config,
}

impl<I: I2c> Htu21d<I> {
    pub fn new(i2c: I, config: Config) -> Self {
        Self {
            i2c,
            read_buffer: [0u8; 3],
            user_register: UserRegister::default(),
            config_changed: false,
            address: DEFAULT_ADDRESS,
            config,
        }
    }

    pub fn destroy(self) -> I {
        self.i2c
    }

    /// Reset the sensor and check that the user register holds its
    /// reset value afterwards.
    pub fn init(&mut self, delay: impl DelayNs) -> Result<(), Error<I::Error>> {
        self.soft_reset(delay)?;
        let register = self.read_user_register()?;
        if register.bits() != UserRegister::RESET_VALUE {
            return Err(Error::UnexpectedUserRegister(register.bits()));
        }
        Ok(())
    }

    /// Reboot the sensor, returning the user register to its default value.
    pub fn soft_reset(&mut self, mut delay: impl DelayNs) -> Result<(), Error<I::Error>> {
        trace!("sending soft reset");
        self.i2c.write(self.address, &[SOFT_RESET_COMMAND])?;
        delay.delay_ms(SOFT_RESET_DELAY_MS);
        self.user_register = UserRegister::default();
        self.config_changed = false;
        Ok(())
    }

    /// Measure temperature in celsius.
    pub fn measure_temperature_celsius(
        &mut self,
        delay: impl DelayNs,
    ) -> Result<f32, Error<I::Error>> {
        let code = self.measure_raw(delay, MeasurementKind::Temperature)?;
        let celsius = temperature_code_to_celsius(code);
        debug!("temperature: {} degC", celsius);
        Ok(celsius)
    }

    /// Measure temperature in fahrenheit.
    pub fn measure_temperature_fahrenheit(
        &mut self,
        delay: impl DelayNs,
    ) -> Result<f32, Error<I::Error>> {
        self.measure_temperature_celsius(delay).map(celsius_to_fahrenheit)
    }

    /// Measure percent relative humidity.
    pub fn measure_humidity_percent(
        &mut self,
        delay: impl DelayNs,
    ) -> Result<f32, Error<I::Error>> {
        let code = self.measure_raw(delay, MeasurementKind::Humidity)?;
        let humidity = humidity_code_to_percent_rh(code);
        debug!("humidity: {} %RH", humidity);
        Ok(humidity)
    }

    /// Measure temperature in celsius, reporting failures as
    /// [sentinel](crate::sentinel) values.
    pub fn temperature_celsius_or_sentinel(&mut self, delay: impl DelayNs) -> f32 {
        or_sentinel(self.measure_temperature_celsius(delay))
    }

    /// Measure temperature in fahrenheit, converting any celsius sentinel
    /// value arithmetically.
    pub fn temperature_fahrenheit_or_sentinel(&mut self, delay: impl DelayNs) -> f32 {
        celsius_to_fahrenheit(self.temperature_celsius_or_sentinel(delay))
    }

    /// Measure percent relative humidity, reporting failures as
    /// [sentinel](crate::sentinel) values.
    pub fn humidity_percent_or_sentinel(&mut self, delay: impl DelayNs) -> f32 {
        or_sentinel(self.measure_humidity_percent(delay))
    }

    /// Run one measurement and return the validated code with its status
    /// bits cleared, ready for the functions in [`crate::conversions`].
    pub fn measure_raw(
        &mut self,
        mut delay: impl DelayNs,
        kind: MeasurementKind,
    ) -> Result<u16, Error<I::Error>> {
        let command = kind.command_byte();
        trace!("sending {:?} command {}", kind, command);

        self.i2c.write(self.address, &[command])?;
        delay.delay_ms(self.config.settling_delay_ms);
        self.read_response(&mut delay, kind)?;

        Unvalidated::new(self.read_buffer).try_get_code(kind)
    }

    /// Read the three response bytes into the read buffer, retrying every
    /// millisecond while the sensor is busy, until the read timeout is spent.
    fn read_response(
        &mut self,
        delay: &mut impl DelayNs,
        kind: MeasurementKind,
    ) -> Result<(), Error<I::Error>> {
        let mut waited_ms = 0;
        loop {
            match self.i2c.read(self.address, &mut self.read_buffer) {
                Ok(()) => return Ok(()),
                // The sensor NACKs its address until the conversion is done.
                // Anything else is a bus fault and is not retried.
                Err(e) if !matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => {
                    warn!("{:?} read failed with a bus error", kind);
                    return Err(Error::I2c(e));
                }
                Err(_) if waited_ms >= self.config.read_timeout_ms => {
                    warn!("no {:?} response after {} ms", kind, waited_ms);
                    return Err(Error::Timeout(kind));
                }
                Err(_) => {
                    delay.delay_ms(READ_RETRY_INTERVAL_MS);
                    waited_ms += READ_RETRY_INTERVAL_MS;
                }
            }
        }
    }

    /// The locally cached user register, including any changes not yet
    /// written with [`apply_config`](Self::apply_config).
    pub fn user_register(&self) -> UserRegister {
        self.user_register
    }

    /// Whether the cached user register differs from what was last
    /// written to the sensor.
    pub fn config_changed(&self) -> bool {
        self.config_changed
    }

    /// Change the measurement resolution. Takes effect after
    /// [`apply_config`](Self::apply_config).
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.update_user_register(self.user_register.with_resolution(resolution));
    }

    /// Turn the on-chip heater on or off. Takes effect after
    /// [`apply_config`](Self::apply_config).
    pub fn set_heater(&mut self, on: bool) {
        self.update_user_register(self.user_register.with_heater(on));
    }

    fn update_user_register(&mut self, register: UserRegister) {
        if register != self.user_register {
            self.user_register = register;
            self.config_changed = true;
        }
    }

    /// Read the user register from the sensor, replacing the local copy.
    pub fn read_user_register(&mut self) -> Result<UserRegister, Error<I::Error>> {
        let register = self.read_register()?;
        self.user_register = register;
        self.config_changed = false;
        Ok(register)
    }

    fn read_register(&mut self) -> Result<UserRegister, Error<I::Error>> {
        let mut buffer = [0u8; 1];
        self.i2c
            .write_read(self.address, &[READ_USER_REGISTER_COMMAND], &mut buffer)?;
        trace!("read user register {}", buffer[0]);
        Ok(UserRegister::from_bits(buffer[0]))
    }

    /// Write pending resolution and heater changes to the sensor.
    ///
    /// The reserved bits of the register are read from the sensor first
    /// and written back unchanged. Does nothing if there are no changes.
    pub fn apply_config(&mut self) -> Result<(), Error<I::Error>> {
        if !self.config_changed {
            return Ok(());
        }
        let device = self.read_register()?;
        let register = self.user_register.merge_reserved(device);

        debug!("writing user register {}", register.bits());
        self.i2c
            .write(self.address, &[WRITE_USER_REGISTER_COMMAND, register.bits()])?;
        self.user_register = register;
        self.config_changed = false;
        Ok(())
    }
}
