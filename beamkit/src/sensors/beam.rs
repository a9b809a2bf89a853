use embedded_hal::digital::v2::InputPin;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BeamStatus {
    Broken,
    Clear,
}

impl BeamStatus {
    pub fn label(self) -> &'static str {
        match self {
            BeamStatus::Broken => "BROKEN",
            BeamStatus::Clear => "CLEAR",
        }
    }
}

/// Electrical level that means "beam broken" for a receiver module.
///
/// Optocoupler boards with an NPN open-collector output pull the line low
/// when the beam is interrupted, so those are `ActiveLevel::Low`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ActiveLevel {
    Low,
    High,
}

impl ActiveLevel {
    pub fn is_broken(self, is_high: bool) -> bool {
        match self {
            ActiveLevel::Low => !is_high,
            ActiveLevel::High => is_high,
        }
    }
}

/// One sample of one channel: interpreted status plus the raw line level.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BeamReading {
    pub status: BeamStatus,
    pub raw: u8,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Channel {
    S1,
    S2,
}

impl Channel {
    pub fn label(self) -> &'static str {
        match self {
            Channel::S1 => "S1",
            Channel::S2 => "S2",
        }
    }
}

pub struct BeamSensor<P>
where
    P: InputPin,
{
    pin: P,
    active_level: ActiveLevel,
}

#[derive(Debug)]
pub enum BeamError<PinError> {
    Pin(PinError),
}

impl<P> BeamSensor<P>
where
    P: InputPin,
{
    pub fn new(pin: P, active_level: ActiveLevel) -> Self {
        BeamSensor { pin, active_level }
    }

    pub fn active_low(pin: P) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    pub fn active_high(pin: P) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_level(&self) -> ActiveLevel {
        self.active_level
    }

    /// Maps a sampled line level to a reading, with `raw` as 0 or 1.
    pub fn interpret(&self, is_high: bool) -> BeamReading {
        let status = if self.active_level.is_broken(is_high) {
            BeamStatus::Broken
        } else {
            BeamStatus::Clear
        };

        BeamReading {
            status,
            raw: is_high as u8,
        }
    }

    pub fn read(&self) -> Result<BeamReading, BeamError<P::Error>> {
        let is_high = self.pin.is_high().map_err(BeamError::Pin)?;

        Ok(self.interpret(is_high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::convert::Infallible;

    struct FixedPin {
        is_high: bool,
    }

    impl InputPin for FixedPin {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Self::Error> {
            Ok(self.is_high)
        }

        fn is_low(&self) -> Result<bool, Self::Error> {
            Ok(!self.is_high)
        }
    }

    struct FaultPin;

    impl InputPin for FaultPin {
        type Error = &'static str;

        fn is_high(&self) -> Result<bool, Self::Error> {
            Err("wire fault")
        }

        fn is_low(&self) -> Result<bool, Self::Error> {
            Err("wire fault")
        }
    }

    #[test]
    fn polarity_truth_table() {
        assert!(ActiveLevel::Low.is_broken(false));
        assert!(!ActiveLevel::Low.is_broken(true));
        assert!(ActiveLevel::High.is_broken(true));
        assert!(!ActiveLevel::High.is_broken(false));
    }

    #[test]
    fn raw_follows_line_level_regardless_of_polarity() {
        let low_line = BeamSensor::active_low(FixedPin { is_high: false });
        let high_line = BeamSensor::active_high(FixedPin { is_high: true });

        assert_eq!(
            low_line.read().unwrap(),
            BeamReading {
                status: BeamStatus::Broken,
                raw: 0,
            }
        );
        assert_eq!(
            high_line.read().unwrap(),
            BeamReading {
                status: BeamStatus::Broken,
                raw: 1,
            }
        );
    }

    #[test]
    fn read_reports_pin_error() {
        let sensor = BeamSensor::active_low(FaultPin);

        assert!(matches!(sensor.read(), Err(BeamError::Pin("wire fault"))));
    }

    #[test]
    fn status_labels() {
        assert_eq!(BeamStatus::Broken.label(), "BROKEN");
        assert_eq!(BeamStatus::Clear.label(), "CLEAR");
        assert_eq!(Channel::S1.label(), "S1");
        assert_eq!(Channel::S2.label(), "S2");
    }
}
