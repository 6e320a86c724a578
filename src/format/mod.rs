use std::fmt;
use crate::module::Song;
use crate::Error;

pub mod mk;
pub mod s3m;
pub mod xm;
pub mod it;

/// Largest offset a format signature is read from (MOD magic at 1080).
pub const MAX_SIGNATURE_OFFSET: usize = 1084;

// Supported formats

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Mod,
    S3m,
    Xm,
    It,
}

/// Signatures are probed in this order; the first match wins. Formats
/// with a signature at the start of the file go before MOD, whose magic
/// sits deep in the header.
pub const PROBE_ORDER: [Format; 4] = [Format::Xm, Format::It, Format::S3m, Format::Mod];

pub struct ProbeInfo {
    pub format: Format,
    pub title : String,
}

impl Format {
    pub fn name(&self) -> &'static str {
        match self {
            Format::Mod => "Protracker MOD",
            Format::S3m => "Scream Tracker 3 S3M",
            Format::Xm  => "Fast Tracker II XM",
            Format::It  => "Impulse Tracker IT",
        }
    }

    pub fn probe(&self, b: &[u8]) -> Result<ProbeInfo, Error> {
        match self {
            Format::Mod => mk::probe(b),
            Format::S3m => s3m::probe(b),
            Format::Xm  => xm::probe(b),
            Format::It  => it::probe(b),
        }
    }

    fn load(&self, b: &[u8]) -> Result<Song, Error> {
        match self {
            Format::Mod => mk::load(b),
            Format::S3m => s3m::load(b),
            Format::Xm  => xm::load(b),
            Format::It  => it::load(b),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Find the format of a module in memory.
pub fn probe(b: &[u8]) -> Result<ProbeInfo, Error> {
    for fmt in PROBE_ORDER.iter() {
        match fmt.probe(b) {
            Ok(info) => {
                debug!("probe ok: {}", fmt);
                return Ok(info)
            }
            Err(e) => debug!("probe {}: {}", fmt, e),
        }
    }

    if b.len() < MAX_SIGNATURE_OFFSET {
        Err(Error::UnsupportedFeature(format!("unrecognized short file ({} bytes)", b.len())))
    } else {
        Err(Error::MalformedInput("unrecognized module signature".to_owned()))
    }
}

pub fn load(b: &[u8]) -> Result<Song, Error> {
    let info = probe(b)?;
    load_as(b, info.format)
}

pub fn load_as(b: &[u8], fmt: Format) -> Result<Song, Error> {
    fmt.probe(b)?;
    debug!("load format {}", fmt);

    let mut song = fmt.load(b)?;
    song.digest = md5::compute(b).0;
    song.validate()?;

    info!("loaded {}", song);
    Ok(song)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn test_probe_order() {
        let files = [
            (testutil::build_mod(), Format::Mod),
            (testutil::build_s3m(), Format::S3m),
            (testutil::build_xm(), Format::Xm),
            (testutil::build_it(), Format::It),
        ];
        for (b, fmt) in files.iter() {
            let info = probe(b).unwrap();
            assert_eq!(info.format, *fmt);
            assert_eq!(info.title, "test song");
        }
    }

    #[test]
    fn test_unknown_signature() {
        match probe(&[0x55; 2000]) {
            Err(Error::MalformedInput(_)) => (),
            _ => panic!("expected malformed input"),
        }
        match probe(&[0x55; 100]) {
            Err(Error::UnsupportedFeature(_)) => (),
            _ => panic!("expected unsupported feature"),
        }
    }

    #[test]
    fn test_load_as_wrong_format() {
        let b = testutil::build_mod();
        match load_as(&b, Format::Xm) {
            Err(Error::MalformedInput(_)) => (),
            _ => panic!("expected malformed input"),
        }
    }

    #[test]
    fn test_corrupted_magic() {
        for b in testutil::all_formats().iter_mut() {
            testutil::corrupt_magic(b);
            match load(b) {
                Err(Error::MalformedInput(_)) => (),
                other => panic!("expected malformed input, got {:?}", other.map(|s| s.format)),
            }
        }
    }

    #[test]
    fn test_truncated() {
        for b in testutil::all_formats().iter() {
            let fmt = probe(b).unwrap().format;
            for &len in &[b.len() - 1, b.len() * 3 / 4, b.len() / 2, 1090] {
                match load(&b[..len]) {
                    Err(Error::MalformedInput(_)) => (),
                    other => panic!("{}: expected malformed input at {} bytes, got {:?}",
                                    fmt, len, other.map(|s| s.format)),
                }
            }
        }
    }

    #[test]
    fn test_md5() {
        let b = testutil::build_mod();
        let song = load(&b).unwrap();
        assert_eq!(song.md5(), format!("{:x}", md5::compute(&b)));
    }
}
