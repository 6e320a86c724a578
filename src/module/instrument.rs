use std::fmt;
use crate::MAX_KEYS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopePoint {
    pub tick : u16,
    pub value: i16,
}

/// Piecewise linear envelope. Volume envelopes range 0..64, panning
/// envelopes range -32..32 around the channel pan.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    pub enabled: bool,
    pub points : Vec<EnvelopePoint>,
    pub sustain: Option<(usize, usize)>,   // point indices, inclusive
    pub lp     : Option<(usize, usize)>,
}

impl Envelope {
    pub fn is_active(&self) -> bool {
        self.enabled && !self.points.is_empty()
    }

    /// Drop loop and sustain ranges that point outside the envelope and
    /// force tick positions to be non-decreasing.
    pub fn sanitize(&mut self) {
        let n = self.points.len();
        let valid = |r: Option<(usize, usize)>| r.filter(|&(a, b)| a <= b && b < n);
        self.sustain = valid(self.sustain);
        self.lp = valid(self.lp);
        for i in 1..n {
            if self.points[i].tick < self.points[i - 1].tick {
                self.points[i].tick = self.points[i - 1].tick;
            }
        }
        if n == 0 {
            self.enabled = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleMap {
    pub sample: Option<usize>,
    pub note  : u8,
}

pub struct Keymap<T> {
    map: [T; MAX_KEYS]
}

impl<T: fmt::Debug> fmt::Debug for Keymap<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        self.map[..].fmt(formatter)
    }
}

impl<T: Copy> Clone for Keymap<T> {
    fn clone(&self) -> Self {
        Keymap { map: self.map }
    }
}

impl Keymap<SampleMap> {
    /// Map every key to itself on no sample.
    pub fn new() -> Self {
        let mut map = [SampleMap { sample: None, note: 0 }; MAX_KEYS];
        for (i, m) in map.iter_mut().enumerate() {
            m.note = i as u8;
        }
        Keymap { map }
    }

    /// Map every key to itself on `sample`.
    pub fn single(sample: usize) -> Self {
        let mut km = Keymap::new();
        for m in km.map.iter_mut() {
            m.sample = Some(sample);
        }
        km
    }

    pub fn get(&self, key: u8) -> SampleMap {
        self.map[(key as usize).min(MAX_KEYS - 1)]
    }

    pub fn set(&mut self, key: usize, sample: Option<usize>, note: u8) {
        if key < MAX_KEYS {
            self.map[key] = SampleMap { sample, note: note.min(MAX_KEYS as u8 - 1) };
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleMap> {
        self.map.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Instrument {
    pub num          : usize,
    pub name         : String,
    pub volume       : u8,     // instrument global volume, 0..128
    pub fadeout      : u32,    // volume decrement per tick on a 65536 scale
    pub pan          : Option<u8>,
    pub keymap       : Keymap<SampleMap>,
    pub vol_env      : Envelope,
    pub pan_env      : Envelope,
}

impl Instrument {
    pub fn new() -> Instrument {
        Instrument {
            num    : 0,
            name   : "".to_owned(),
            volume : 128,
            fadeout: 0,
            pan    : None,
            keymap : Keymap::new(),
            vol_env: Default::default(),
            pan_env: Default::default(),
        }
    }

    /// Instrument wrapping a single sample over the whole keyboard.
    pub fn from_sample(num: usize, name: &str, sample: usize) -> Instrument {
        let mut ins = Instrument::new();
        ins.num = num;
        ins.name = name.to_owned();
        ins.keymap = Keymap::single(sample);
        ins
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap() {
        let mut km = Keymap::new();
        assert_eq!(km.get(60), SampleMap { sample: None, note: 60 });
        km.set(60, Some(3), 72);
        assert_eq!(km.get(60), SampleMap { sample: Some(3), note: 72 });
        assert_eq!(km.get(200).note, 119);
        assert!(Keymap::single(2).iter().all(|m| m.sample == Some(2)));
    }

    #[test]
    fn test_envelope_sanitize() {
        let mut env = Envelope {
            enabled: true,
            points : vec![
                EnvelopePoint { tick: 0, value: 64 },
                EnvelopePoint { tick: 10, value: 32 },
                EnvelopePoint { tick: 5, value: 0 },
            ],
            sustain: Some((1, 1)),
            lp     : Some((0, 3)),
        };
        env.sanitize();
        assert_eq!(env.sustain, Some((1, 1)));
        assert_eq!(env.lp, None);
        assert_eq!(env.points[2].tick, 10);
        assert!(env.is_active());
    }
}
