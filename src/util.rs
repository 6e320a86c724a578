use byteorder::{ByteOrder, BigEndian, LittleEndian};
use crate::Error;

pub const NOTES: &[&str] = &[
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-"
];

pub const NOTE_REF   : i32 = 60;     // C-5, plays at the sample rate
pub const AMIGA_REF  : i32 = 1712;   // C-5 period in 1/4 Protracker units
pub const LINEAR_BASE: i32 = 8448;   // linear period of note 0
pub const LINEAR_REF : i32 = 4608;   // linear period of C-5
pub const PT_C5      : f64 = 428.0;  // Protracker C-2 period, our C-5

#[macro_export]
macro_rules! magic4 {
    ($a:expr, $b:expr, $c:expr, $d:expr) => {
        (($a as u32) << 24) | (($b as u32) << 16) | (($c as u32) << 8) | ($d as u32)
    };
}

pub trait BinaryRead {
    fn read_string(&self, ofs: usize, size: usize) -> Result<String, Error>;
    fn read32b(&self, ofs: usize) -> Result<u32, Error>;
    fn read16b(&self, ofs: usize) -> Result<u16, Error>;
    fn read32l(&self, ofs: usize) -> Result<u32, Error>;
    fn read16l(&self, ofs: usize) -> Result<u16, Error>;
    fn read8(&self, ofs: usize) -> Result<u8, Error>;
    fn read8i(&self, ofs: usize) -> Result<i8, Error>;
    fn slice(&self, start: usize, size: usize) -> Result<&[u8], Error>;
}

impl<'a> BinaryRead for &'a [u8] {
    fn read_string(&self, ofs: usize, size: usize) -> Result<String, Error> {
        let b = self.slice(ofs, size)?;
        let end = b.iter().position(|&x| x == 0).unwrap_or(b.len());
        Ok(String::from_utf8_lossy(&b[..end]).trim_end().to_string())
    }

    fn read32b(&self, ofs: usize) -> Result<u32, Error> {
        Ok(BigEndian::read_u32(self.slice(ofs, 4)?))
    }

    fn read16b(&self, ofs: usize) -> Result<u16, Error> {
        Ok(BigEndian::read_u16(self.slice(ofs, 2)?))
    }

    fn read32l(&self, ofs: usize) -> Result<u32, Error> {
        Ok(LittleEndian::read_u32(self.slice(ofs, 4)?))
    }

    fn read16l(&self, ofs: usize) -> Result<u16, Error> {
        Ok(LittleEndian::read_u16(self.slice(ofs, 2)?))
    }

    fn read8(&self, ofs: usize) -> Result<u8, Error> {
        Ok(self.slice(ofs, 1)?[0])
    }

    fn read8i(&self, ofs: usize) -> Result<i8, Error> {
        Ok(self.slice(ofs, 1)?[0] as i8)
    }

    fn slice(&self, start: usize, size: usize) -> Result<&[u8], Error> {
        check_buffer_size(self, start, size)?;
        Ok(&self[start..start + size])
    }
}

fn check_buffer_size(b: &[u8], start: usize, size: usize) -> Result<(), Error> {
    match start.checked_add(size) {
        Some(end) if end <= b.len() => Ok(()),
        _ => Err(Error::MalformedInput(format!("short read ({} bytes at 0x{:x}, file size {})", size, start, b.len()))),
    }
}


/// Pitch model of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodType {
    Linear,
    Amiga,
}

lazy_static! {
    // 2^(i/768) in 16.16 fixed point
    static ref LINEAR_TABLE: Vec<u64> = (0..768)
        .map(|i| (65536.0_f64 * 2.0_f64.powf(i as f64 / 768.0)).round() as u64)
        .collect();
}

/// Period of `note` with `finetune` in 1/128 semitone units.
pub fn note_to_period(note: i32, finetune: i32, period_type: PeriodType) -> i32 {
    match period_type {
        PeriodType::Linear => {
            LINEAR_BASE - note * 64 - finetune / 2
        }
        PeriodType::Amiga  => {
            let d = (note - NOTE_REF) * 128 + finetune;
            let period = AMIGA_REF as f64 / 2.0_f64.powf(d as f64 / 1536.0);
            period.round() as i32
        }
    }.max(1)
}

/// Nearest note for a period, ignoring finetune.
pub fn period_to_note(period: i32, period_type: PeriodType) -> i32 {
    if period <= 0 {
        return 0
    }
    match period_type {
        PeriodType::Linear => (LINEAR_BASE - period + 32).div_euclid(64),
        PeriodType::Amiga  => NOTE_REF + (12.0 * (AMIGA_REF as f64 / period as f64).log2()).round() as i32,
    }
}

/// Period `semitones` above `period`.
pub fn period_shift(period: i32, semitones: i32, period_type: PeriodType) -> i32 {
    match period_type {
        PeriodType::Linear => period - semitones * 64,
        PeriodType::Amiga  => (period as f64 / 2.0_f64.powf(semitones as f64 / 12.0)).round() as i32,
    }.max(1)
}

/// Mixer step in 16.16 fixed point for a period played from a sample with
/// reference rate `rate` (Hz at C-5) on an output running at `out_rate`.
pub fn period_to_step(period: i32, rate: u32, out_rate: u32, period_type: PeriodType) -> u32 {
    if period <= 0 || out_rate == 0 {
        return 0
    }
    let step = match period_type {
        PeriodType::Amiga  => {
            rate as u64 * AMIGA_REF as u64 * 65536 / (period as u64 * out_rate as u64)
        }
        PeriodType::Linear => {
            let d = LINEAR_REF - period;
            let oct = d.div_euclid(768).min(16);
            let freq = rate as u64 * LINEAR_TABLE[d.rem_euclid(768) as usize];
            let freq = if oct >= 0 { freq << oct } else { freq >> (-oct).min(63) };
            freq / out_rate as u64
        }
    };
    step.min(u32::MAX as u64) as u32
}

/// Protracker period to note number, 0 for no note.
pub fn pt_period_to_note(period: u16) -> u8 {
    if period == 0 {
        return 0
    }
    let note = NOTE_REF as f64 + 12.0_f64 * (PT_C5 / period as f64).log2();
    note.round().max(0.0).min(119.0) as u8
}

pub fn note_name(note: u8) -> String {
    format!("{}{}", NOTES[note as usize % 12], note / 12)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_short() {
        let b: &[u8] = &[1, 2, 3];
        assert_eq!(b.read16b(0).unwrap(), 0x0102);
        assert_eq!(b.read16l(1).unwrap(), 0x0302);
        match b.read32b(0) {
            Err(Error::MalformedInput(_)) => {},
            _ => panic!("expected short read"),
        }
        assert!(b.slice(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_read_string() {
        let b: &[u8] = b"Hello\0World   ";
        assert_eq!(b.read_string(0, 11).unwrap(), "Hello");
        assert_eq!(b.read_string(6, 8).unwrap(), "World");
    }

    #[test]
    fn test_magic4() {
        assert_eq!(magic4!('M','.','K','.'), 0x4d2e4b2e);
    }

    #[test]
    fn test_reference_periods() {
        assert_eq!(note_to_period(NOTE_REF, 0, PeriodType::Amiga), 1712);
        assert_eq!(note_to_period(NOTE_REF - 12, 0, PeriodType::Amiga), 3424);
        assert_eq!(note_to_period(NOTE_REF, 0, PeriodType::Linear), LINEAR_REF);
        assert_eq!(pt_period_to_note(428), 60);
        assert_eq!(pt_period_to_note(856), 48);
        assert_eq!(pt_period_to_note(113), 83);
    }

    #[test]
    fn test_period_to_note() {
        for note in 24..108 {
            assert_eq!(period_to_note(note_to_period(note, 0, PeriodType::Amiga), PeriodType::Amiga), note);
            assert_eq!(period_to_note(note_to_period(note, 0, PeriodType::Linear), PeriodType::Linear), note);
        }
    }

    #[test]
    fn test_step_unity() {
        // a sample played at its reference note on an output of the same rate
        assert_eq!(period_to_step(1712, 8363, 8363, PeriodType::Amiga), 0x10000);
        assert_eq!(period_to_step(LINEAR_REF, 8363, 8363, PeriodType::Linear), 0x10000);
        assert_eq!(period_to_step(LINEAR_REF - 768, 8363, 8363, PeriodType::Linear), 0x20000);
        assert_eq!(period_to_step(LINEAR_REF + 768, 8363, 8363, PeriodType::Linear), 0x8000);
        assert_eq!(period_to_step(0, 8363, 44100, PeriodType::Amiga), 0);
    }
}
