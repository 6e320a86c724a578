//! Audio outputs the player can push rendered frames into.
//!
//! A `Driver` describes an output backend and opens `Output` handles on it.
//! The list of compiled-in drivers depends on cargo features only.

use std::path::PathBuf;
use crate::Error;

mod null;
mod raw;
mod wav;
#[cfg(feature = "cpal")]
mod cpal_out;

pub use self::null::{NullDriver, NullOutput};
pub use self::raw::{RawDriver, RawOutput};
pub use self::wav::{WavDriver, WavOutput};
#[cfg(feature = "cpal")]
pub use self::cpal_out::{CpalDriver, CpalOutput};

pub struct DriverInfo {
    pub name       : &'static str,
    pub description: &'static str,
    pub file       : bool,      // writes to a file given by the user
}

pub trait Driver {
    fn info(&self) -> DriverInfo;
    fn open(&self, rate: u32, channels: usize, buffer_frames: usize) -> Result<Box<dyn Output>, Error>;
}

/// An open output. Buffers hold interleaved signed 16-bit samples.
pub trait Output {
    fn write(&mut self, buf: &[i16]) -> Result<(), Error>;
    fn close(&mut self) -> Result<(), Error>;
}

pub fn list() -> Vec<DriverInfo> {
    vec![
        NullDriver.info(),
        RawDriver::new(None).info(),
        WavDriver::new("out.wav").info(),
        #[cfg(feature = "cpal")]
        CpalDriver.info(),
    ]
}

/// Find a driver by name. File drivers write to `target`, the raw driver
/// falls back to standard output.
pub fn find(name: &str, target: Option<&str>) -> Result<Box<dyn Driver>, Error> {
    let driver: Box<dyn Driver> = match name {
        "null" => Box::new(NullDriver),
        "raw"  => Box::new(RawDriver::new(target.map(PathBuf::from))),
        "wav"  => match target {
            Some(path) => Box::new(WavDriver::new(path)),
            None       => return Err(Error::InvalidOperation("wav driver requires an output file".to_owned())),
        },
        #[cfg(feature = "cpal")]
        "cpal" => Box::new(CpalDriver),
        _ => return Err(Error::Driver(format!("driver '{}' not available", name))),
    };
    debug!("using driver {}", driver.info().name);
    Ok(driver)
}

fn check_format(rate: u32, channels: usize) -> Result<(), Error> {
    if rate < crate::MIN_RATE || rate > crate::MAX_RATE {
        return Err(Error::Driver(format!("unsupported sampling rate {}", rate)))
    }
    if channels != 1 && channels != 2 {
        return Err(Error::Driver(format!("unsupported channel count {}", channels)))
    }
    Ok(())
}
