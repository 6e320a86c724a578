use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use hound::{SampleFormat, WavSpec, WavWriter};
use crate::Error;
use super::{check_format, Driver, DriverInfo, Output};

pub struct WavDriver {
    path: PathBuf,
}

impl WavDriver {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        WavDriver { path: path.into() }
    }
}

impl Driver for WavDriver {
    fn info(&self) -> DriverInfo {
        DriverInfo {
            name       : "wav",
            description: "RIFF WAVE file writer",
            file       : true,
        }
    }

    fn open(&self, rate: u32, channels: usize, _buffer_frames: usize) -> Result<Box<dyn Output>, Error> {
        check_format(rate, channels)?;
        let spec = WavSpec {
            channels       : channels as u16,
            sample_rate    : rate,
            bits_per_sample: 16,
            sample_format  : SampleFormat::Int,
        };
        let writer = WavWriter::create(&self.path, spec)
            .map_err(|e| Error::Driver(format!("{}: {}", self.path.display(), e)))?;
        debug!("writing {} Hz, {} channel WAVE to {}", rate, channels, self.path.display());
        Ok(Box::new(WavOutput { writer: Some(writer) }))
    }
}

pub struct WavOutput {
    writer: Option<WavWriter<BufWriter<File>>>,
}

impl Output for WavOutput {
    fn write(&mut self, buf: &[i16]) -> Result<(), Error> {
        let writer = match self.writer.as_mut() {
            Some(w) => w,
            None    => return Err(Error::Driver("write to closed output".to_owned())),
        };
        for &x in buf {
            writer.write_sample(x).map_err(|e| Error::Driver(e.to_string()))?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.writer.take() {
            Some(w) => w.finalize().map_err(|e| Error::Driver(e.to_string())),
            None    => Ok(()),
        }
    }
}
