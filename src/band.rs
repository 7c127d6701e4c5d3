/// Maps operating frequencies to the supported half-wave bands and pump duty cycles.
use std::fmt;

use crate::error::{AntennaError, Result};

/// Speed of light expressed as meters * MHz.
const SPEED_OF_LIGHT_M_MHZ: f64 = 300.0;

/// A supported half-wavelength band, in meters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    M10,
    M20,
    M30,
    M40,
    M80,
    M100,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} m", self.meters())
    }
}

impl TryFrom<u32> for Band {
    type Error = AntennaError;

    fn try_from(meters: u32) -> Result<Self> {
        Band::from_meters(meters)
    }
}

impl Band {
    /// Every band, in ascending order. Nearest-band ties resolve to the earlier entry.
    pub const ALL: [Band; 6] = [
        Band::M10,
        Band::M20,
        Band::M30,
        Band::M40,
        Band::M80,
        Band::M100,
    ];

    pub fn meters(&self) -> u32 {
        match self {
            Band::M10 => 10,
            Band::M20 => 20,
            Band::M30 => 30,
            Band::M40 => 40,
            Band::M80 => 80,
            Band::M100 => 100,
        }
    }

    /// Pump duty cycle that holds the water column at this band's length.
    pub fn duty_cycle(&self) -> f64 {
        match self {
            Band::M10 => 0.1,
            Band::M20 => 0.3,
            Band::M30 => 0.5,
            Band::M40 => 0.7,
            Band::M80 => 0.8,
            Band::M100 => 0.9,
        }
    }

    pub fn from_meters(meters: u32) -> Result<Self> {
        Band::ALL
            .into_iter()
            .find(|band| band.meters() == meters)
            .ok_or(AntennaError::UnknownBand(meters))
    }
}

/// Free-space wavelength (meters) for a frequency in MHz.
pub fn target_wavelength(frequency_mhz: f64) -> f64 {
    SPEED_OF_LIGHT_M_MHZ / frequency_mhz
}

/// Band whose size is closest to the wavelength of `frequency_mhz`.
pub fn nearest_band(frequency_mhz: f64) -> Result<Band> {
    if !frequency_mhz.is_finite() || frequency_mhz <= 0.0 {
        return Err(AntennaError::InvalidFrequency(frequency_mhz.to_string()));
    }

    let wavelength = target_wavelength(frequency_mhz);
    let mut best = Band::ALL[0];
    let mut best_diff = (wavelength - f64::from(best.meters())).abs();

    for band in &Band::ALL[1..] {
        let diff = (wavelength - f64::from(band.meters())).abs();
        // strict: an exact tie keeps the smaller band
        if diff < best_diff {
            best = *band;
            best_diff = diff;
        }
    }

    Ok(best)
}

/// Duty cycle for a band given in meters.
pub fn duty_cycle_for_band(meters: u32) -> Result<f64> {
    Band::from_meters(meters).map(|band| band.duty_cycle())
}

/// Half-wave monopole length (meters) for a band.
pub fn length_for_band(band: Band) -> f64 {
    f64::from(band.meters()) / 2.0
}

/// Frequency (MHz) that a water column of `length_m` is a quarter wave for.
/// A zero length saturates to 0 instead of dividing by zero.
pub fn instantaneous_frequency(length_m: f64) -> f64 {
    if length_m == 0.0 {
        return 0.0;
    }
    SPEED_OF_LIGHT_M_MHZ * 0.25 / length_m
}
