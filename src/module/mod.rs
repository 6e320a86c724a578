pub mod event;
pub mod instrument;
pub mod sample;

pub use self::event::{Effect, Event, Note, VolumeCommand};
pub use self::instrument::{Envelope, EnvelopePoint, Instrument, Keymap, SampleMap};
pub use self::sample::{AutoVibrato, LoopMode, Sample, SampleData, SampleFormat, SampleLoop};
pub use crate::util::PeriodType;

use std::fmt;
use crate::format::Format;
use crate::{Error, MAX_CHANNELS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Pattern(usize),
    Skip,
}

#[derive(Debug, Clone)]
pub struct Pattern {
    pub rows    : usize,
    pub channels: usize,
    data        : Vec<Event>,
}

impl Pattern {
    pub fn new(rows: usize, channels: usize) -> Self {
        Pattern {
            rows,
            channels,
            data: vec![Event::new(); rows * channels],
        }
    }

    pub fn event(&self, row: usize, chn: usize) -> &Event {
        &self.data[row * self.channels + chn]
    }

    pub fn event_mut(&mut self, row: usize, chn: usize) -> &mut Event {
        &mut self.data[row * self.channels + chn]
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.data.iter()
    }
}

/// Playback rules that differ between trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    pub param_memory     : bool,  // zero parameter recalls the last one
    pub shared_memory    : bool,  // one memory slot for most effects (ST3)
    pub scream_slides    : bool,  // Dxy/Exx/Fxx carry fine and extra fine forms
    pub fast_slides      : bool,  // volume slides also run on tick 0
    pub keyoff_cuts      : bool,  // key off without volume envelope cuts the note
    pub ins_resets_volume: bool,  // instrument without note restores sample volume
    pub period_min       : i32,
    pub period_max       : i32,
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks {
            param_memory     : true,
            shared_memory    : false,
            scream_slides    : false,
            fast_slides      : false,
            keyoff_cuts      : false,
            ins_resets_volume: true,
            period_min       : 1,
            period_max       : 0x7fff,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Song {
    pub title         : String,
    pub format        : Format,
    pub tracker       : String,
    pub channels      : usize,
    pub orders        : Vec<Order>,
    pub restart       : Option<usize>,
    pub patterns      : Vec<Pattern>,
    pub instruments   : Vec<Instrument>,
    pub samples       : Vec<Sample>,
    pub instrument_mode: bool,
    pub speed         : u8,
    pub tempo         : u8,
    pub global_volume : u8,           // 0..128
    pub channel_pan   : Vec<u8>,      // 0..255
    pub channel_volume: Vec<u8>,      // 0..64
    pub period_type   : PeriodType,
    pub quirks        : Quirks,
    pub message       : String,
    pub(crate) digest : [u8; 16],
}

impl Song {
    pub fn new(format: Format) -> Self {
        Song {
            title          : "".to_owned(),
            format,
            tracker        : "".to_owned(),
            channels       : 0,
            orders         : Vec::new(),
            restart        : None,
            patterns       : Vec::new(),
            instruments    : Vec::new(),
            samples        : Vec::new(),
            instrument_mode: false,
            speed          : 6,
            tempo          : 125,
            global_volume  : 128,
            channel_pan    : Vec::new(),
            channel_volume : Vec::new(),
            period_type    : PeriodType::Amiga,
            quirks         : Default::default(),
            message        : "".to_owned(),
            digest         : [0; 16],
        }
    }

    /// MD5 digest of the file the song was loaded from, as a hex string.
    pub fn md5(&self) -> String {
        self.digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn pattern_at(&self, pos: usize) -> Option<&Pattern> {
        match self.orders.get(pos) {
            Some(Order::Pattern(p)) => self.patterns.get(*p),
            _                       => None,
        }
    }

    /// Check that every index reachable from the song resolves. Loaders
    /// call this before handing a song out.
    pub fn validate(&self) -> Result<(), Error> {
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(Error::MalformedInput(format!("invalid number of channels {}", self.channels)))
        }
        if self.channel_pan.len() != self.channels || self.channel_volume.len() != self.channels {
            return Err(Error::MalformedInput("channel settings don't match channel count".to_owned()))
        }
        if !self.orders.iter().any(|o| *o != Order::Skip) {
            return Err(Error::MalformedInput("empty order list".to_owned()))
        }
        if self.speed == 0 || self.tempo == 0 {
            return Err(Error::MalformedInput(format!("invalid initial speed/tempo {}/{}", self.speed, self.tempo)))
        }
        if let Some(r) = self.restart {
            if r >= self.orders.len() {
                return Err(Error::MalformedInput(format!("restart position {} out of range", r)))
            }
        }

        for (i, o) in self.orders.iter().enumerate() {
            if let Order::Pattern(p) = o {
                if *p >= self.patterns.len() {
                    return Err(Error::MalformedInput(format!("order {} references missing pattern {}", i, p)))
                }
            }
        }

        for (i, pat) in self.patterns.iter().enumerate() {
            if pat.channels != self.channels || pat.rows == 0 {
                return Err(Error::MalformedInput(format!("pattern {} has invalid size {}x{}", i, pat.rows, pat.channels)))
            }
            for e in pat.events() {
                if e.ins as usize > self.instruments.len() {
                    return Err(Error::MalformedInput(format!("pattern {} references missing instrument {}", i, e.ins)))
                }
                if let Note::On(n) = e.note {
                    if n as usize >= crate::MAX_KEYS {
                        return Err(Error::MalformedInput(format!("pattern {} has invalid note {}", i, n)))
                    }
                }
            }
        }

        for ins in &self.instruments {
            for m in ins.keymap.iter() {
                if let Some(s) = m.sample {
                    if s >= self.samples.len() {
                        return Err(Error::MalformedInput(format!("instrument {} maps missing sample {}", ins.num, s)))
                    }
                }
            }
        }

        for s in &self.samples {
            for lp in &[s.lp, s.sustain] {
                if lp.is_on() && (lp.start >= lp.end || lp.end > s.frames) {
                    return Err(Error::MalformedInput(format!("sample {} has invalid loop {}-{}", s.num, lp.start, lp.end)))
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}, {} channels, {} patterns, {} instruments, {} samples)",
               self.title, self.format, self.channels, self.patterns.len(),
               self.instruments.len(), self.samples.len())
    }
}
