use byteorder::{ByteOrder, BigEndian, LittleEndian};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Off,
    Forward,
    PingPong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLoop {
    pub mode : LoopMode,
    pub start: usize,   // in frames
    pub end  : usize,   // exclusive
}

impl SampleLoop {
    pub fn off() -> Self {
        SampleLoop { mode: LoopMode::Off, start: 0, end: 0 }
    }

    pub fn is_on(&self) -> bool {
        self.mode != LoopMode::Off
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Instrument auto-vibrato (XM instruments and IT samples).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoVibrato {
    pub waveform: u8,
    pub sweep   : u8,
    pub depth   : u8,
    pub rate    : u8,
}

/// Layout of sample data as found in a module file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleFormat {
    pub bits16    : bool,
    pub unsigned  : bool,
    pub delta     : bool,
    pub stereo    : bool,   // left channel block followed by right channel block
    pub big_endian: bool,
}

impl SampleFormat {
    pub fn frame_bytes(&self) -> usize {
        (if self.bits16 { 2 } else { 1 }) * (if self.stereo { 2 } else { 1 })
    }
}

/// Decoded PCM, interleaved if stereo.
#[derive(Debug, Clone)]
pub enum SampleData {
    Empty,
    I8(Vec<i8>),
    I16(Vec<i16>),
}

#[derive(Debug, Clone)]
pub struct Sample {
    pub num          : usize,
    pub name         : String,
    pub rate         : u32,      // playback rate of C-5
    pub volume       : u8,       // 0..64
    pub global_volume: u8,       // 0..64
    pub pan          : Option<u8>,
    pub finetune     : i32,      // 1/128 semitone
    pub transpose    : i32,      // semitones
    pub frames       : usize,
    pub stereo       : bool,
    pub lp           : SampleLoop,
    pub sustain      : SampleLoop,
    pub vibrato      : AutoVibrato,
    data             : SampleData,
}

impl Sample {
    pub fn new() -> Sample {
        Sample {
            num          : 0,
            name         : "".to_owned(),
            rate         : 8363,
            volume       : 64,
            global_volume: 64,
            pan          : None,
            finetune     : 0,
            transpose    : 0,
            frames       : 0,
            stereo       : false,
            lp           : SampleLoop::off(),
            sustain      : SampleLoop::off(),
            vibrato      : Default::default(),
            data         : SampleData::Empty,
        }
    }

    pub fn data(&self) -> &SampleData {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        match self.data {
            SampleData::Empty => true,
            _                 => self.frames == 0,
        }
    }

    /// Decode `frames` frames of raw sample data. Returns the number of
    /// bytes consumed from `b`.
    pub fn store(&mut self, b: &[u8], frames: usize, fmt: SampleFormat) -> Result<usize, Error> {
        let size = frames * fmt.frame_bytes();
        if b.len() < size {
            return Err(Error::MalformedInput(format!("sample {} truncated ({} of {} bytes)", self.num, b.len(), size)))
        }
        let b = &b[..size];
        let chn = if fmt.stereo { 2 } else { 1 };

        self.frames = frames;
        self.stereo = fmt.stereo;
        self.data = if frames == 0 {
            SampleData::Empty
        } else if fmt.bits16 {
            let mut data = vec![0_i16; frames * chn];
            for c in 0..chn {
                let block = &b[c * frames * 2..(c + 1) * frames * 2];
                let mut acc = 0_u16;
                for i in 0..frames {
                    let mut x = if fmt.big_endian {
                        BigEndian::read_u16(&block[i * 2..])
                    } else {
                        LittleEndian::read_u16(&block[i * 2..])
                    };
                    if fmt.delta {
                        acc = acc.wrapping_add(x);
                        x = acc;
                    }
                    if fmt.unsigned {
                        x ^= 0x8000;
                    }
                    data[i * chn + c] = x as i16;
                }
            }
            SampleData::I16(data)
        } else {
            let mut data = vec![0_i8; frames * chn];
            for c in 0..chn {
                let block = &b[c * frames..(c + 1) * frames];
                let mut acc = 0_u8;
                for i in 0..frames {
                    let mut x = block[i];
                    if fmt.delta {
                        acc = acc.wrapping_add(x);
                        x = acc;
                    }
                    if fmt.unsigned {
                        x ^= 0x80;
                    }
                    data[i * chn + c] = x as i8;
                }
            }
            SampleData::I8(data)
        };

        self.fix_loops();
        Ok(size)
    }

    /// Clamp loop points to the sample data and disable degenerate loops.
    pub fn fix_loops(&mut self) {
        let frames = self.frames;
        let num = self.num;
        for lp in [&mut self.lp, &mut self.sustain].iter_mut() {
            if !lp.is_on() {
                continue
            }
            if lp.end > frames {
                warn!("sample {}: loop end {} past sample end {}, clamped", num, lp.end, frames);
                lp.end = frames;
            }
            if lp.start >= lp.end {
                debug!("sample {}: empty loop {}-{} disabled", num, lp.start, lp.end);
                **lp = SampleLoop::off();
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_unsigned_8bit() {
        let mut s = Sample::new();
        let fmt = SampleFormat { unsigned: true, ..Default::default() };
        assert_eq!(s.store(&[0x80, 0xff, 0x00, 0x40], 4, fmt).unwrap(), 4);
        match s.data() {
            SampleData::I8(d) => assert_eq!(d, &vec![0, 127, -128, -64]),
            _ => panic!("expected 8-bit data"),
        }
    }

    #[test]
    fn test_store_delta_16bit() {
        let mut s = Sample::new();
        let fmt = SampleFormat { bits16: true, delta: true, ..Default::default() };
        s.store(&[0x00, 0x01, 0x00, 0x01, 0x00, 0xfe], 3, fmt).unwrap();
        match s.data() {
            SampleData::I16(d) => assert_eq!(d, &vec![0x100, 0x200, 0]),
            _ => panic!("expected 16-bit data"),
        }
    }

    #[test]
    fn test_store_stereo_interleaves() {
        let mut s = Sample::new();
        let fmt = SampleFormat { stereo: true, ..Default::default() };
        s.store(&[1, 2, 3, 10, 20, 30], 3, fmt).unwrap();
        assert!(s.stereo);
        match s.data() {
            SampleData::I8(d) => assert_eq!(d, &vec![1, 10, 2, 20, 3, 30]),
            _ => panic!("expected 8-bit data"),
        }
    }

    #[test]
    fn test_store_truncated() {
        let mut s = Sample::new();
        let fmt = SampleFormat { bits16: true, ..Default::default() };
        match s.store(&[0; 5], 3, fmt) {
            Err(Error::MalformedInput(_)) => (),
            _ => panic!("expected malformed input"),
        }
    }

    #[test]
    fn test_fix_loops() {
        let mut s = Sample::new();
        s.lp = SampleLoop { mode: LoopMode::Forward, start: 2, end: 100 };
        s.sustain = SampleLoop { mode: LoopMode::PingPong, start: 50, end: 60 };
        s.store(&[0; 10], 10, Default::default()).unwrap();
        assert_eq!(s.lp.end, 10);
        assert!(s.lp.is_on());
        assert!(!s.sustain.is_on());
    }
}
