use crate::Error;
use super::{check_format, Driver, DriverInfo, Output};

/// Discards everything, counting the frames written.
pub struct NullDriver;

impl Driver for NullDriver {
    fn info(&self) -> DriverInfo {
        DriverInfo {
            name       : "null",
            description: "discard output",
            file       : false,
        }
    }

    fn open(&self, rate: u32, channels: usize, _buffer_frames: usize) -> Result<Box<dyn Output>, Error> {
        Ok(Box::new(NullOutput::new(rate, channels)?))
    }
}

pub struct NullOutput {
    channels: usize,
    frames  : u64,
    closed  : bool,
}

impl NullOutput {
    pub fn new(rate: u32, channels: usize) -> Result<Self, Error> {
        check_format(rate, channels)?;
        Ok(NullOutput {
            channels,
            frames: 0,
            closed: false,
        })
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Output for NullOutput {
    fn write(&mut self, buf: &[i16]) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Driver("write to closed output".to_owned()))
        }
        self.frames += (buf.len() / self.channels) as u64;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.closed = true;
        Ok(())
    }
}
