use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use byteorder::{LittleEndian, WriteBytesExt};
use crate::Error;
use super::{check_format, Driver, DriverInfo, Output};

/// Headerless little-endian 16-bit PCM, to a file or standard output.
pub struct RawDriver {
    path: Option<PathBuf>,
}

impl RawDriver {
    pub fn new(path: Option<PathBuf>) -> Self {
        RawDriver { path }
    }
}

impl Driver for RawDriver {
    fn info(&self) -> DriverInfo {
        DriverInfo {
            name       : "raw",
            description: "raw 16-bit little-endian PCM",
            file       : true,
        }
    }

    fn open(&self, rate: u32, channels: usize, _buffer_frames: usize) -> Result<Box<dyn Output>, Error> {
        check_format(rate, channels)?;
        let writer: Box<dyn Write> = match &self.path {
            Some(path) => {
                let file = File::create(path).map_err(|e| Error::Driver(format!("{}: {}", path.display(), e)))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(io::stdout()),
        };
        Ok(Box::new(RawOutput::new(writer)))
    }
}

pub struct RawOutput<W: Write> {
    writer: W,
}

impl<W: Write> RawOutput<W> {
    pub fn new(writer: W) -> Self {
        RawOutput { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Output for RawOutput<W> {
    fn write(&mut self, buf: &[i16]) -> Result<(), Error> {
        for &x in buf {
            self.writer.write_i16::<LittleEndian>(x).map_err(|e| Error::Driver(e.to_string()))?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.writer.flush().map_err(|e| Error::Driver(e.to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_output() {
        let mut out = RawOutput::new(Vec::new());
        out.write(&[1, -2, 0x1234]).unwrap();
        out.close().unwrap();
        assert_eq!(out.into_inner(), vec![0x01, 0x00, 0xfe, 0xff, 0x34, 0x12]);
    }
}
