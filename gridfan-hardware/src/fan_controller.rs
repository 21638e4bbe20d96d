//! Grid Controller - High-level interface for fan control
//!
//! Per-channel telemetry and speed control built on the protocol engine,
//! plus the two operations that recover from failures on their own:
//! `ping` (never fails, reports health as a bool) and `is_fan_connected`
//! (wakes the controller between attempts).

use crate::protocol::ProtocolEngine;
use crate::serial_driver::{SerialConnector, SerialDriver};
use gridfan_core::codec::{
    decode_rpm, decode_voltage, decode_wattage, percent_to_voltage_code, voltage_to_percent,
};
use gridfan_core::{
    Channel, ChannelReading, Command, ControllerConfig, GridFanError, GridPlusV2, Result,
    RetryPolicy, Speed,
};
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, warn, Span};

/// Healthy ping reply
const PONG: u8 = 0x21;
/// Ping reply from a controller that is alive but flags an internal error
const PONG_WITH_ERROR: u8 = 0x02;
/// Set-fan acknowledgment
const SET_FAN_ACK: u8 = 0x01;
/// Fixed bytes between the channel and the voltage code in a set-fan payload
const SET_FAN_FILLER: &str = "c00000";

/// Controller for an NZXT Grid+ v2
///
/// Generic over the transport type, allowing real hardware (`SerialDriver`)
/// or mock transports for testing. Every operation opens its own link, so a
/// controller holds no connection between calls. Callers sharing one device
/// across tasks must serialize access themselves.
pub struct GridController<C: SerialConnector = SerialDriver> {
    engine: ProtocolEngine<C>,
    retry: RetryPolicy,
    span: Span,
}

impl GridController<SerialDriver> {
    /// Create a controller for the serial device described by `config`
    pub fn new(config: &ControllerConfig) -> Self {
        Self::with_connector(SerialDriver, config)
    }
}

impl<C: SerialConnector> GridController<C> {
    /// Create a controller over any transport
    ///
    /// This is primarily useful for testing with mock transports.
    pub fn with_connector(connector: C, config: &ControllerConfig) -> Self {
        let span = info_span!("grid_controller", device = %config.serial.device);
        Self {
            engine: ProtocolEngine::new(connector, config.serial.clone()),
            retry: config.retry.clone(),
            span,
        }
    }

    /// Attach every log event of this controller to `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Retry pacing in use
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Ping the controller
    ///
    /// Returns `true` if the controller answers at all sensibly; failures
    /// are logged and reported as `false`.
    pub async fn ping(&self) -> bool {
        match self.engine.execute(Command::Ping, "").await {
            Ok(response) => match response.as_slice() {
                [PONG] => {
                    info!(parent: &self.span, "Pong!");
                    true
                }
                [PONG_WITH_ERROR] => {
                    warn!(
                        parent: &self.span,
                        "The controller returned an error code, but it responded"
                    );
                    true
                }
                other => {
                    error!(
                        parent: &self.span,
                        "Unexpected ping response from controller: [{}]",
                        hex::encode(other)
                    );
                    false
                }
            },
            Err(e) => {
                error!(parent: &self.span, "{}", e);
                false
            }
        }
    }

    /// Knock the controller awake
    ///
    /// A freshly powered controller can take a while to answer, so ping it
    /// until it responds or the attempts run out.
    pub async fn wake(&self) -> bool {
        let attempts = self.retry.wake_attempts;

        for attempt in 1..=attempts {
            if attempt > 1 {
                sleep(self.retry.wake_interval()).await;
            }

            if self.ping().await {
                debug!(parent: &self.span, "Controller awake after {} ping(s)", attempt);
                return true;
            }
        }

        error!(parent: &self.span, "Giving up after {} tries.", attempts);
        false
    }

    /// Send a telemetry command and return the two data bytes
    async fn query(&self, command: Command, channel: Channel) -> Result<[u8; 2]> {
        let response = self
            .engine
            .execute(command, &channel.payload_hex())
            .await?;

        match response.as_slice() {
            [a, b, c, high, low] if [*a, *b, *c] == GridPlusV2::ACK_HEADER => Ok([*high, *low]),
            _ => Err(GridFanError::UnexpectedResponse(format!(
                "{} on channel {}: [{}]",
                command,
                channel,
                hex::encode(&response)
            ))),
        }
    }

    async fn read_rpm(&self, channel: Channel) -> Result<u16> {
        let [high, low] = self.query(Command::GetRpm, channel).await?;
        let rpm = decode_rpm(high, low);
        info!(parent: &self.span, "Fan {}: {} RPM", channel, rpm);
        Ok(rpm)
    }

    async fn read_voltage(&self, channel: Channel) -> Result<f64> {
        let [high, low] = self.query(Command::GetVoltage, channel).await?;
        let voltage = decode_voltage(high, low)?;
        info!(parent: &self.span, "Fan {}: {}V", channel, voltage);
        Ok(voltage)
    }

    async fn read_wattage(&self, channel: Channel) -> Result<f64> {
        let [_, low] = self.query(Command::GetWattage, channel).await?;
        let wattage = decode_wattage(low)?;
        info!(parent: &self.span, "Fan {}: {}W", channel, wattage);
        Ok(wattage)
    }

    async fn read_percent(&self, channel: Channel) -> Result<u8> {
        let percent = voltage_to_percent(self.read_voltage(channel).await?);
        info!(parent: &self.span, "Fan {}: Approximately {}%", channel, percent);
        Ok(percent)
    }

    /// Get a fan's RPM
    pub async fn get_rpm(&self, channel: u8) -> Result<u16> {
        self.read_rpm(Channel::new(channel)?).await
    }

    /// Get every fan's RPM, channel 1 first
    pub async fn get_rpm_all(&self) -> Result<Vec<u16>> {
        let mut rpms = Vec::with_capacity(usize::from(GridPlusV2::CHANNEL_COUNT));
        for channel in Channel::all() {
            rpms.push(self.read_rpm(channel).await?);
        }
        Ok(rpms)
    }

    /// Get the voltage currently applied to a fan
    ///
    /// An empty port reads close to 12V.
    pub async fn get_voltage(&self, channel: u8) -> Result<f64> {
        self.read_voltage(Channel::new(channel)?).await
    }

    /// Get every fan's applied voltage, channel 1 first
    pub async fn get_voltage_all(&self) -> Result<Vec<f64>> {
        let mut voltages = Vec::with_capacity(usize::from(GridPlusV2::CHANNEL_COUNT));
        for channel in Channel::all() {
            voltages.push(self.read_voltage(channel).await?);
        }
        Ok(voltages)
    }

    /// Get a fan's power draw in watts
    pub async fn get_wattage(&self, channel: u8) -> Result<f64> {
        self.read_wattage(Channel::new(channel)?).await
    }

    /// Get every fan's power draw, channel 1 first
    pub async fn get_wattage_all(&self) -> Result<Vec<f64>> {
        let mut wattages = Vec::with_capacity(usize::from(GridPlusV2::CHANNEL_COUNT));
        for channel in Channel::all() {
            wattages.push(self.read_wattage(channel).await?);
        }
        Ok(wattages)
    }

    /// Get the applied voltage of a fan as a speed percentage
    ///
    /// This is derived from the voltage reading; it is not a measured fan speed.
    pub async fn get_percent(&self, channel: u8) -> Result<u8> {
        self.read_percent(Channel::new(channel)?).await
    }

    /// Get every fan's applied voltage as a percentage, channel 1 first
    pub async fn get_percent_all(&self) -> Result<Vec<u8>> {
        let voltages = self.get_voltage_all().await?;
        Ok(voltages.into_iter().map(voltage_to_percent).collect())
    }

    /// Read every telemetry value of one channel
    pub async fn read_channel(&self, channel: u8) -> Result<ChannelReading> {
        self.snapshot(Channel::new(channel)?).await
    }

    /// Read every telemetry value of every channel, channel 1 first
    pub async fn read_all(&self) -> Result<Vec<ChannelReading>> {
        let mut readings = Vec::with_capacity(usize::from(GridPlusV2::CHANNEL_COUNT));
        for channel in Channel::all() {
            readings.push(self.snapshot(channel).await?);
        }
        Ok(readings)
    }

    async fn snapshot(&self, channel: Channel) -> Result<ChannelReading> {
        let rpm = self.read_rpm(channel).await?;
        let voltage = self.read_voltage(channel).await?;
        let wattage = self.read_wattage(channel).await?;

        Ok(ChannelReading {
            channel,
            rpm,
            voltage,
            wattage,
            percent: voltage_to_percent(voltage),
        })
    }

    /// Set the speed of a fan
    ///
    /// `speed` is 0 (off) or up to 100; anything from 1 to 20 runs at the
    /// 4V floor.
    pub async fn set_fan(&self, channel: u8, speed: u8) -> Result<bool> {
        let channel = Channel::new(channel)?;
        let speed = Speed::new(speed)?;
        self.apply_speed(channel, speed).await
    }

    /// Set every fan to one speed, channel 1 first
    pub async fn set_fan_all(&self, speed: u8) -> Result<()> {
        let speed = Speed::new(speed)?;
        for channel in Channel::all() {
            self.apply_speed(channel, speed).await?;
        }
        Ok(())
    }

    async fn apply_speed(&self, channel: Channel, speed: Speed) -> Result<bool> {
        info!(parent: &self.span, "Setting fan {} to {} speed", channel, speed);

        let payload = set_fan_payload(channel, speed);
        debug!(parent: &self.span, "Sending {} to channel {}", payload, channel);

        let response = self.engine.execute(Command::SetFan, &payload).await?;
        interpret_set_fan_ack(channel, &response)?;

        info!(
            parent: &self.span,
            "Fan {}'s speed successfully set to {}", channel, speed
        );
        Ok(true)
    }

    /// Check whether a fan is plugged into `channel`
    ///
    /// The controller has no presence command. With nothing attached it
    /// drives the port at full voltage hoping to get a reading and draws no
    /// power, so high voltage with zero wattage means no fan. A channel that
    /// is switched off gives no information; it is turned on for the check
    /// and switched back off afterwards.
    ///
    /// Failures trigger a wake-up and another attempt; the last failure is
    /// returned once the attempts are used up.
    pub async fn is_fan_connected(&self, channel: u8) -> Result<bool> {
        let channel = Channel::new(channel)?;
        let attempts = self.retry.presence_attempts;
        let mut forced_on = false;
        let mut failures = 0;

        info!(
            parent: &self.span,
            "Checking if a fan is connected on channel {}", channel
        );

        loop {
            if failures > 0 {
                info!(parent: &self.span, "Something went wrong... Attempting to recover.");
                self.wake().await;
                info!(parent: &self.span, "Trying again.");
            }

            match self.probe_presence(channel, &mut forced_on).await {
                Ok(connected) => return Ok(connected),
                Err(e) => {
                    failures += 1;
                    warn!(
                        parent: &self.span,
                        "Presence check on channel {} failed ({}/{}): {}",
                        channel,
                        failures,
                        attempts,
                        e
                    );
                    if failures >= attempts {
                        if forced_on {
                            self.restore_off(channel).await;
                        }
                        return Err(e);
                    }
                }
            }
        }
    }

    /// One presence attempt
    ///
    /// Forcing the channel on and re-reading it is part of the same attempt.
    async fn probe_presence(&self, channel: Channel, forced_on: &mut bool) -> Result<bool> {
        let mut voltage = self.read_voltage(channel).await?;
        let mut wattage = self.read_wattage(channel).await?;
        debug!(parent: &self.span, "Fan {}: {}V - {}W", channel, voltage, wattage);

        if voltage == 0.0 {
            info!(parent: &self.span, "The channel was off. Waking up...");
            *forced_on = true;
            self.apply_speed(channel, Speed::FULL).await?;
            sleep(self.retry.presence_settle()).await;

            voltage = self.read_voltage(channel).await?;
            wattage = self.read_wattage(channel).await?;
            debug!(parent: &self.span, "Fan {}: {}V - {}W", channel, voltage, wattage);
        }

        if *forced_on {
            debug!(parent: &self.span, "Turning channel {} back off.", channel);
            self.apply_speed(channel, Speed::OFF).await?;
            *forced_on = false;
        }

        Ok(!(wattage == 0.0 && voltage > 11.0))
    }

    /// Switch a channel back off after a failed check, logging any failure
    async fn restore_off(&self, channel: Channel) {
        if let Err(e) = self.apply_speed(channel, Speed::OFF).await {
            error!(
                parent: &self.span,
                "Failed to switch channel {} back off: {}", channel, e
            );
        }
    }
}

/// Build the set-fan payload: channel, fixed filler, voltage code
///
/// - channel 1 at 55% → `"01c000000750"`
pub fn set_fan_payload(channel: Channel, speed: Speed) -> String {
    format!(
        "{}{}{}",
        channel.payload_hex(),
        SET_FAN_FILLER,
        percent_to_voltage_code(f64::from(speed.percent()))
    )
}

/// Check the set-fan reply
fn interpret_set_fan_ack(channel: Channel, response: &[u8]) -> Result<()> {
    match response {
        [SET_FAN_ACK] => Ok(()),
        other => Err(GridFanError::UnexpectedResponse(format!(
            "Failed to set fan {}; invalid response from controller: [{}]",
            channel,
            hex::encode(other)
        ))),
    }
}
