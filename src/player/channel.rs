use crate::module::{Event, Song};
use super::envelope::EnvelopeCursor;

// Protracker vibrato table, first quarter period of a sine
const SINE_TABLE: [u8; 32] = [
      0,  24,  49,  74,  97, 120, 141, 161,
    180, 197, 212, 224, 235, 244, 250, 253,
    255, 253, 250, 244, 235, 224, 212, 197,
    180, 161, 141, 120,  97,  74,  49,  24
];

pub const FADE_FULL: u32 = 65536;


/// Low frequency oscillator shared by vibrato, tremolo and auto-vibrato.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lfo {
    pub waveform: u8,   // 0 sine, 1 ramp down, 2 square, 3 random, 4 ramp up
    pub retrig  : bool, // reset phase on new notes
    pub speed   : u8,
    pub depth   : u8,
    pub pos     : u8,   // 0..63
}

impl Lfo {
    pub fn new() -> Self {
        Lfo {
            retrig: true,
            ..Default::default()
        }
    }

    /// Select a waveform from an effect parameter (bit 2 keeps the phase).
    pub fn set_waveform(&mut self, val: u8) {
        self.waveform = match val & 3 {
            1 => 1,
            2 => 2,
            3 => 3,
            _ => 0,
        };
        self.retrig = val & 4 == 0;
    }

    /// Current waveform value, -255..255.
    pub fn value(&self, rng: &mut Rng) -> i32 {
        let pos = (self.pos & 63) as i32;
        match self.waveform {
            1 => 255 - pos * 8,
            2 => if pos < 32 { 255 } else { -255 },
            3 => rng.next_range(511) - 255,
            4 => pos * 8 - 255,
            _ => {
                let v = SINE_TABLE[(pos & 31) as usize] as i32;
                if pos < 32 { v } else { -v }
            }
        }
    }

    pub fn advance(&mut self) {
        self.pos = self.pos.wrapping_add(self.speed) & 63;
    }

    pub fn note_on(&mut self) {
        if self.retrig {
            self.pos = 0;
        }
    }
}


/// Linear congruential generator for the random waveform, reseeded on
/// every session reset so that rendering is reproducible.
#[derive(Debug, Clone, Copy)]
pub struct Rng(u32);

impl Rng {
    pub fn new(seed: u32) -> Self {
        Rng(seed.wrapping_mul(2_654_435_761).wrapping_add(1))
    }

    pub fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_103_515_245).wrapping_add(12345);
        self.0 >> 16
    }

    pub fn next_range(&mut self, n: u32) -> i32 {
        (self.next() % n) as i32
    }
}


/// Last nonzero parameter of each effect. Trackers that keep a single
/// slot for most effects use `last`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectMemory {
    pub last        : u8,
    pub porta_up    : u8,
    pub porta_down  : u8,
    pub fine_up     : u8,
    pub fine_down   : u8,
    pub xfine_up    : u8,
    pub xfine_down  : u8,
    pub tone_porta  : u8,
    pub volume_slide: u8,
    pub fine_vol_up : u8,
    pub fine_vol_dn : u8,
    pub chn_slide   : u8,
    pub global_slide: u8,
    pub pan_slide   : u8,
    pub offset      : u8,
    pub tremor      : u8,
    pub arpeggio    : u8,
    pub retrig      : u8,
    pub tempo_slide : u8,
}


#[derive(Debug, Clone)]
pub struct Channel {
    pub event      : Event,
    pub ins        : Option<usize>,
    pub smp        : Option<usize>,
    pub key        : u8,        // note as written in the pattern
    pub note       : u8,        // note after keymap and transpose
    pub period     : i32,
    pub target     : i32,       // tone portamento destination
    pub finetune   : i32,
    pub glissando  : bool,
    pub volume     : i32,       // 0..64
    pub pan        : i32,       // 0..255
    pub chn_volume : i32,       // 0..64
    pub key_on     : bool,
    pub fading     : bool,
    pub fade       : u32,       // 0..FADE_FULL
    pub vol_env    : EnvelopeCursor,
    pub pan_env    : EnvelopeCursor,
    pub vibrato    : Lfo,
    pub tremolo    : Lfo,
    pub autovib_pos: u8,
    pub autovib_age: u32,
    pub mem        : EffectMemory,
    pub rng        : Rng,

    // per tick modulation
    pub vib_delta  : i32,       // period offset
    pub trem_delta : i32,       // volume offset
    pub arp        : i32,       // semitones
    pub tremor_on  : bool,
    pub tremor_cnt : u8,
    pub retrig_cnt : u8,

    pub delay      : Option<u8>,
    pub loop_row   : usize,
    pub loop_count : u8,

    // requests for the mixer voice, consumed once per tick
    pub trigger    : Option<usize>,
    pub release    : bool,
    pub stop       : bool,
    pub active     : bool,
}

impl Channel {
    pub fn new(num: usize, song: &Song) -> Self {
        Channel {
            event      : Event::new(),
            ins        : None,
            smp        : None,
            key        : 0,
            note       : 0,
            period     : 0,
            target     : 0,
            finetune   : 0,
            glissando  : false,
            volume     : 0,
            pan        : song.channel_pan.get(num).map_or(128, |&p| p as i32),
            chn_volume : song.channel_volume.get(num).map_or(64, |&v| v as i32),
            key_on     : false,
            fading     : false,
            fade       : FADE_FULL,
            vol_env    : EnvelopeCursor::new(),
            pan_env    : EnvelopeCursor::new(),
            vibrato    : Lfo::new(),
            tremolo    : Lfo::new(),
            autovib_pos: 0,
            autovib_age: 0,
            mem        : Default::default(),
            rng        : Rng::new(num as u32),
            vib_delta  : 0,
            trem_delta : 0,
            arp        : 0,
            tremor_on  : true,
            tremor_cnt : 0,
            retrig_cnt : 0,
            delay      : None,
            loop_row   : 0,
            loop_count : 0,
            trigger    : None,
            release    : false,
            stop       : false,
            active     : false,
        }
    }

    pub fn set_volume(&mut self, vol: i32) {
        self.volume = vol.max(0).min(64);
    }

    pub fn set_pan(&mut self, pan: i32) {
        self.pan = pan.max(0).min(255);
    }

    pub fn slide_volume(&mut self, delta: i32) {
        let v = self.volume + delta;
        self.set_volume(v);
    }

    /// Clear modulation that only lasts for the row being played.
    pub fn new_row(&mut self, event: Event) {
        self.event = event;
        self.vib_delta = 0;
        self.trem_delta = 0;
        self.arp = 0;
        self.tremor_on = true;
        self.delay = None;
    }

    /// Restart a note from the beginning of its sample.
    pub fn retrigger(&mut self, offset: usize) {
        self.trigger = Some(offset);
        self.key_on = true;
        self.fading = false;
        self.fade = FADE_FULL;
        self.vol_env.reset();
        self.pan_env.reset();
        self.vibrato.note_on();
        self.tremolo.note_on();
        self.autovib_pos = 0;
        self.autovib_age = 0;
        self.tremor_cnt = 0;
        self.active = true;
    }

    pub fn key_off(&mut self) {
        if self.key_on {
            self.key_on = false;
            self.release = true;
        }
    }

    pub fn cut(&mut self) {
        self.volume = 0;
        self.active = false;
        self.stop = true;
    }
}
