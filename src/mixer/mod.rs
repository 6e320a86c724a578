use crate::module::{LoopMode, Sample, SampleData, SampleLoop};
use crate::options::{Options, OutputChannels};
use crate::MAX_FRAMESIZE;

pub use self::interpolator::Interpolator;

mod interpolator;

pub const SMIX_SHIFT: usize = 16;
const SMIX_MASK     : u32 = 0xffff;
const LIM16_HI      : i64 = 32767;
const LIM16_LO      : i64 = -32768;

/// Voice volumes range from 0 to `MAX_VOLUME`.
pub const VOL_SHIFT : usize = 12;
pub const MAX_VOLUME: u32 = 1 << VOL_SHIFT;

macro_rules! try_voice {
    ( $a:expr, $b: expr ) => {
        if $a >= $b.len() {
            return
        }
    };
    ( $a:expr, $b:expr, $c:expr ) => {
        if $a >= $b.len() {
            return $c
        }
    };
}


pub struct Mixer {
    pub rate  : u32,
    channels  : usize,
    interp    : Interpolator,
    volume    : i64,
    separation: i32,
    reverse   : bool,
    voices    : Vec<Voice>,
    framesize : usize,
    buf       : Vec<i64>,
    buffer    : Vec<i16>,
}

impl Mixer {

    pub fn new(num: usize, opts: &Options) -> Self {
        let channels = opts.channels.count();
        Mixer {
            rate      : opts.rate,
            channels,
            interp    : opts.interpolation,
            volume    : opts.volume as i64,
            separation: opts.separation as i32,
            reverse   : opts.reverse,
            voices    : vec![Voice::new(); num],
            framesize : 0,
            buf       : vec![0; MAX_FRAMESIZE * 2],
            buffer    : vec![0; MAX_FRAMESIZE * channels],
        }
    }

    pub fn output_channels(&self) -> usize {
        self.channels
    }

    pub fn interpolator(&self) -> Interpolator {
        self.interp
    }

    pub fn set_master_volume(&mut self, vol: u8) {
        self.volume = vol.min(128) as i64;
    }

    pub fn master_volume(&self) -> u8 {
        self.volume as u8
    }

    pub fn reset(&mut self) {
        for v in &mut self.voices {
            *v = Voice::new();
        }
        self.framesize = 0;
    }

    /// Current playback position of a voice in sample frames, with loops
    /// unfolded to the actual position inside the sample.
    pub fn voicepos(&self, voice: usize) -> f64 {
        try_voice!(voice, self.voices, 0_f64);

        let v = &self.voices[voice];
        let pos = match v.position(v.pos) {
            Some(p) => p,
            None    => v.frames,
        };
        pos as f64 + v.frac as f64 / (1 << SMIX_SHIFT) as f64
    }

    pub fn is_active(&self, voice: usize) -> bool {
        try_voice!(voice, self.voices, false);
        self.voices[voice].active
    }

    /// Start playing sample `smp` on a voice from frame `start`.
    pub fn set_sample(&mut self, voice: usize, smp: usize, sample: &Sample, start: usize) {
        try_voice!(voice, self.voices);

        let v = &mut self.voices[voice];
        v.smp = smp;
        v.frames = sample.frames;
        v.lp = sample.lp;
        v.sustain_lp = sample.sustain;
        v.sustain = true;
        v.frac = 0;
        v.pos = v.normalize(start);
        v.active = !sample.is_empty() && v.position(v.pos).is_some();
    }

    pub fn set_step(&mut self, voice: usize, step: u32) {
        try_voice!(voice, self.voices);
        self.voices[voice].step = step;
    }

    pub fn set_volume(&mut self, voice: usize, vol: u32) {
        try_voice!(voice, self.voices);
        self.voices[voice].vol = vol.min(MAX_VOLUME);
    }

    pub fn set_pan(&mut self, voice: usize, pan: u8) {
        try_voice!(voice, self.voices);
        self.voices[voice].pan = pan;
    }

    /// Leave the sustain loop, if the voice is in one.
    pub fn release(&mut self, voice: usize) {
        try_voice!(voice, self.voices);

        let v = &mut self.voices[voice];
        if v.sustain && v.sustain_lp.is_on() {
            if let Some(p) = v.position(v.pos) {
                v.pos = p;
            }
        }
        v.sustain = false;
        v.pos = v.normalize(v.pos);
    }

    pub fn stop(&mut self, voice: usize) {
        try_voice!(voice, self.voices);
        self.voices[voice].active = false;
    }

    fn gains(&self, v: &Voice) -> (i64, i64) {
        let pan = (v.pan as i32 - 128) * self.separation / 100;
        let vol = v.vol as i32;
        let l = (vol * (128 - pan)) >> 8;
        let r = (vol * (128 + pan)) >> 8;
        if self.reverse { (r as i64, l as i64) } else { (l as i64, r as i64) }
    }

    /// Render `size` frames of all active voices into the output buffer.
    pub fn mix(&mut self, samples: &[Sample], size: usize) {
        let size = size.min(MAX_FRAMESIZE);
        self.framesize = size;

        for x in self.buf[..size * 2].iter_mut() {
            *x = 0;
        }

        for i in 0..self.voices.len() {
            if !self.voices[i].active || self.voices[i].step == 0 {
                continue
            }
            let (vol_l, vol_r) = self.gains(&self.voices[i]);
            let interp = self.interp;
            let v = &mut self.voices[i];
            let sample = match samples.get(v.smp) {
                Some(s) => s,
                None    => { v.active = false; continue }
            };

            let mut md = MixerData {
                buf  : &mut self.buf[..size * 2],
                vol_l,
                vol_r,
                interp,
            };
            match sample.data() {
                SampleData::Empty   => v.active = false,
                SampleData::I8(d)   => md.mix::<i8>(v, d, sample.stereo),
                SampleData::I16(d)  => md.mix::<i16>(v, d, sample.stereo),
            }
        }

        self.downmix();
    }

    fn downmix(&mut self) {
        let size = self.framesize;
        let vol = self.volume;

        let clamp = |x: i64| -> i16 {
            let smp = ((x >> VOL_SHIFT) * vol) >> 7;
            if smp > LIM16_HI {
                LIM16_HI as i16
            } else if smp < LIM16_LO {
                LIM16_LO as i16
            } else {
                smp as i16
            }
        };

        match self.channels {
            1 => for i in 0..size {
                self.buffer[i] = clamp((self.buf[i * 2] + self.buf[i * 2 + 1]) / 2);
            },
            _ => for i in 0..size * 2 {
                self.buffer[i] = clamp(self.buf[i]);
            },
        }
    }

    /// Frames rendered by the last call to `mix`, interleaved.
    pub fn buffer(&self) -> &[i16] {
        &self.buffer[..self.framesize * self.channels]
    }
}


#[derive(Clone, Debug)]
struct Voice {
    smp       : usize,
    frames    : usize,
    lp        : SampleLoop,
    sustain_lp: SampleLoop,
    sustain   : bool,   // key held, the sustain loop applies
    pos       : usize,  // unfolded position, see position()
    frac      : u32,
    step      : u32,
    vol       : u32,
    pan       : u8,
    active    : bool,
}

impl Voice {
    fn new() -> Self {
        Voice {
            smp       : 0,
            frames    : 0,
            lp        : SampleLoop::off(),
            sustain_lp: SampleLoop::off(),
            sustain   : false,
            pos       : 0,
            frac      : 0,
            step      : 0,
            vol       : 0,
            pan       : 128,
            active    : false,
        }
    }

    fn active_loop(&self) -> SampleLoop {
        if self.sustain && self.sustain_lp.is_on() {
            self.sustain_lp
        } else {
            self.lp
        }
    }

    // Ping-pong loops are unfolded into a forward range twice the loop
    // length long; the second half plays backwards.
    fn position(&self, upos: usize) -> Option<usize> {
        let lp = self.active_loop();
        match lp.mode {
            LoopMode::Off => {
                if upos < self.frames { Some(upos) } else { None }
            }
            _ if upos < lp.end => Some(upos),
            LoopMode::Forward => {
                Some(lp.start + (upos - lp.start) % lp.len())
            }
            LoopMode::PingPong => {
                let len = lp.len();
                let off = (upos - lp.start) % (2 * len);
                Some(if off < len { lp.start + off } else { lp.end - 1 - (off - len) })
            }
        }
    }

    fn normalize(&self, upos: usize) -> usize {
        let lp = self.active_loop();
        match lp.mode {
            LoopMode::Forward if upos >= lp.end => {
                lp.start + (upos - lp.start) % lp.len()
            }
            LoopMode::PingPong if upos >= lp.end + lp.len() => {
                lp.start + (upos - lp.start) % (2 * lp.len())
            }
            _ => upos,
        }
    }
}


struct MixerData<'a> {
    buf   : &'a mut [i64],
    vol_l : i64,
    vol_r : i64,
    interp: Interpolator,
}

impl<'a> MixerData<'a> {
    fn mix<T>(&mut self, v: &mut Voice, data: &[T], stereo: bool)
    where Sampler: SamplerOperations<T>
    {
        let chn = if stereo { 2 } else { 1 };
        let frac_mix = |a: i32, b: i32, frac: u32, interp: Interpolator| {
            interp.get_sample(&[a, b], frac as i32) as i64
        };

        for bpos in (0..self.buf.len()).step_by(2) {
            let p = match v.position(v.pos) {
                Some(p) => p,
                None    => {
                    v.active = false;
                    break
                }
            };
            let n = v.position(v.pos + 1);

            let cur_l = Sampler::get(&data[p * chn]);
            let next_l = n.map(|n| Sampler::get(&data[n * chn])).unwrap_or(0);
            let smp_l = frac_mix(cur_l, next_l, v.frac, self.interp);
            let smp_r = if stereo {
                let cur_r = Sampler::get(&data[p * chn + 1]);
                let next_r = n.map(|n| Sampler::get(&data[n * chn + 1])).unwrap_or(0);
                frac_mix(cur_r, next_r, v.frac, self.interp)
            } else {
                smp_l
            };

            // Store stereo
            self.buf[bpos    ] += smp_l * self.vol_l;
            self.buf[bpos + 1] += smp_r * self.vol_r;

            let frac = v.frac as u64 + v.step as u64;
            v.pos += (frac >> SMIX_SHIFT) as usize;
            v.frac = frac as u32 & SMIX_MASK;
            v.pos = v.normalize(v.pos);
        }
    }
}


struct Sampler;

trait SamplerOperations<T> {
    fn get(_: &T) -> i32;
}

impl SamplerOperations<i16> for Sampler {
    fn get(i: &i16) -> i32 {
        *i as i32
    }
}

impl SamplerOperations<i8> for Sampler {
    fn get(i: &i8) -> i32 {
        (*i as i32) << 8
    }
}
