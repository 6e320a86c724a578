extern crate byteorder;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

#[macro_use]
mod util;

pub mod driver;
pub mod format;
pub mod mixer;
pub mod module;
pub mod options;
pub mod player;

#[cfg(test)]
mod testutil;

pub use format::{Format, ProbeInfo};
pub use module::Song;
pub use options::{LoopBehavior, Options, OutputChannels};
pub use mixer::Interpolator;
pub use player::{Command, Controller, FrameInfo, PlayState, Player};

use std::error;
use std::fmt;
use std::io;

pub const MAX_RATE    : u32 = 96000;
pub const MIN_RATE    : u32 = 4000;
pub const MIN_TEMPO   : u32 = 32;
pub const MAX_CHANNELS: usize = 64;
pub const MAX_KEYS    : usize = 120;
// frame rate = (50 * tempo / 125) Hz
// frame size = sampling rate / frame rate
pub const MAX_FRAMESIZE: usize = (5 * MAX_RATE / (2 * MIN_TEMPO)) as usize;

/// Load a module from memory, detecting its format.
pub fn load_song(b: &[u8]) -> Result<Song, Error> {
    format::load(b)
}

/// Load a module from memory using a declared format.
pub fn load_song_as(b: &[u8], fmt: Format) -> Result<Song, Error> {
    format::load_as(b, fmt)
}

/// Identify a module and return its title without loading pattern or sample data.
pub fn load_title(b: &[u8]) -> Result<String, Error> {
    Ok(format::probe(b)?.title)
}


#[derive(Debug)]
pub enum Error {
    MalformedInput(String),
    UnsupportedFeature(String),
    Driver(String),
    InvalidOperation(String),
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedInput(descr)     => write!(f, "malformed input: {}", descr),
            Error::UnsupportedFeature(descr) => write!(f, "unsupported feature: {}", descr),
            Error::Driver(descr)             => write!(f, "driver error: {}", descr),
            Error::InvalidOperation(descr)   => write!(f, "invalid operation: {}", descr),
            Error::Io(err)                   => write!(f, "{}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _              => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_title() {
        for b in testutil::all_formats() {
            let title = load_title(&b).unwrap();
            assert_eq!(title, "test song");
            assert_eq!(title, load_song(&b).unwrap().title);
        }

        // the title survives missing pattern and sample data
        let b = &testutil::build_mod()[..1084];
        assert_eq!(load_title(b).unwrap(), "test song");
        assert!(load_song(b).is_err());

        match load_title(&[0; 64]) {
            Err(Error::UnsupportedFeature(_)) => (),
            _ => panic!("expected unsupported feature"),
        }
    }
}
