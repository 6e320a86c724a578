use crate::format::Format;
use crate::module::{Effect, Event, Note, Quirks, Song, VolumeCommand};
use crate::util::note_to_period;
use super::channel::Channel;
use super::sequencer::Sequencer;

// Parameter recall for effects that share a single memory slot in
// Scream Tracker 3.
fn shared(q: &Quirks, slot: &mut u8, last: &mut u8, p: u8) -> u8 {
    if q.shared_memory {
        if p != 0 { *last = p }
        *last
    } else {
        memory(q, slot, p)
    }
}

fn memory(q: &Quirks, slot: &mut u8, p: u8) -> u8 {
    if !q.param_memory {
        return p
    }
    if p != 0 { *slot = p }
    *slot
}

// Memory every tracker keeps, such as tone portamento speed.
fn own(slot: &mut u8, p: u8) -> u8 {
    if p != 0 { *slot = p }
    *slot
}

fn nibbles(p: u8) -> (i32, i32) {
    ((p >> 4) as i32, (p & 0x0f) as i32)
}

// DxF fine slides up, DFx fine slides down
fn fine_slide(p: u8) -> Option<i32> {
    let (x, y) = nibbles(p);
    if y == 0xf && x != 0 {
        Some(x)
    } else if x == 0xf && y != 0 {
        Some(-y)
    } else {
        None
    }
}

fn slide(p: u8) -> i32 {
    let (x, y) = nibbles(p);
    if x != 0 { x } else { -y }
}

fn is_tone_porta(e: &Event) -> bool {
    match (e.effect, e.vol) {
        (Effect::TonePorta(_), _) | (Effect::TonePortaVolSlide(_), _) => true,
        (_, VolumeCommand::TonePorta(_)) => true,
        _ => false,
    }
}

fn porta(q: &Quirks, ch: &mut Channel, delta: i32) {
    if ch.period == 0 {
        return
    }
    ch.period = (ch.period + delta).max(q.period_min).min(q.period_max);
}

fn tone_porta(ch: &mut Channel) {
    if ch.period == 0 || ch.target == 0 {
        return
    }
    let speed = ch.mem.tone_porta as i32 * 4;
    if ch.period < ch.target {
        ch.period = (ch.period + speed).min(ch.target);
    } else if ch.period > ch.target {
        ch.period = (ch.period - speed).max(ch.target);
    }
}

fn vibrato(ch: &mut Channel, shift: u32) {
    let v = ch.vibrato.value(&mut ch.rng);
    ch.vib_delta = (v * ch.vibrato.depth as i32) >> shift;
    ch.vibrato.advance();
}

fn tremolo(ch: &mut Channel) {
    let v = ch.tremolo.value(&mut ch.rng);
    ch.trem_delta = (v * ch.tremolo.depth as i32) >> 6;
    ch.tremolo.advance();
}

fn set_lfo_params(lfo: &mut super::channel::Lfo, p: u8) {
    let (x, y) = (p >> 4, p & 0x0f);
    if x != 0 { lfo.speed = x }
    if y != 0 { lfo.depth = y }
}

// Volume change applied by multi retrigger, indexed by the high nibble
fn retrig_volume(vol: i32, x: u8) -> i32 {
    match x {
        0x1..=0x5 => vol - (1 << (x - 1)),
        0x6       => vol * 2 / 3,
        0x7       => vol / 2,
        0x9..=0xd => vol + (1 << (x - 9)),
        0xe       => vol * 3 / 2,
        0xf       => vol * 2,
        _         => vol,
    }
}

fn volume_slide_row(q: &Quirks, ch: &mut Channel, p: u8) {
    let p = shared(q, &mut ch.mem.volume_slide, &mut ch.mem.last, p);
    if q.scream_slides {
        match fine_slide(p) {
            Some(d) => ch.slide_volume(d),
            None    => if q.fast_slides { ch.slide_volume(slide(p)) },
        }
    }
}

fn volume_slide_tick(q: &Quirks, ch: &mut Channel, p: u8) {
    let p = shared(q, &mut ch.mem.volume_slide, &mut ch.mem.last, p);
    if q.scream_slides && fine_slide(p).is_some() {
        return
    }
    ch.slide_volume(slide(p));
}

fn key_off(song: &Song, ch: &mut Channel) {
    ch.key_off();
    let env = ch.ins.and_then(|i| song.instruments.get(i)).map_or(false, |ins| ins.vol_env.is_active());
    if song.quirks.keyoff_cuts && !env {
        ch.volume = 0;
    }
}


/// Handle the note and instrument columns of an event.
fn trigger(song: &Song, ch: &mut Channel, e: &Event) {
    let porta = is_tone_porta(e) && ch.active;

    if e.ins > 0 {
        let ins = e.ins as usize - 1;
        ch.ins = Some(ins);
        let key = match e.note {
            Note::On(n) => n,
            _           => ch.key,
        };
        let instrument = &song.instruments[ins];
        if let Some(smp) = instrument.keymap.get(key).sample {
            let s = &song.samples[smp];
            if song.quirks.ins_resets_volume {
                ch.set_volume(s.volume as i32);
            }
            if let Some(pan) = s.pan.or(instrument.pan) {
                ch.set_pan(pan as i32);
            }
        }
        if song.instrument_mode && (e.note == Note::None || porta) {
            ch.key_on = true;
            ch.fading = false;
            ch.fade = super::channel::FADE_FULL;
            ch.vol_env.reset();
            ch.pan_env.reset();
        }
    }

    match e.note {
        Note::On(key) => {
            let ins = match ch.ins {
                Some(i) => i,
                None    => return,
            };
            let map = song.instruments[ins].keymap.get(key);
            let smp = match map.sample {
                Some(s) => s,
                None    => return,
            };
            let s = &song.samples[smp];
            let note = (map.note as i32 + s.transpose).max(0).min(crate::MAX_KEYS as i32 - 1);
            let finetune = match e.effect {
                Effect::SetFinetune(f) => f as i8 as i32,
                _                      => s.finetune,
            };
            let period = note_to_period(note, finetune, song.period_type);
            ch.key = key;

            if porta {
                ch.target = period;
            } else {
                ch.smp = Some(smp);
                ch.note = note as u8;
                ch.finetune = finetune;
                ch.period = period;
                ch.target = period;
                let offset = match e.effect {
                    Effect::SampleOffset(_) => ch.mem.offset as usize * 256,
                    _                       => 0,
                };
                ch.retrigger(offset);
            }
        }
        Note::Off  => key_off(song, ch),
        Note::Cut  => ch.cut(),
        Note::Fade => ch.fading = true,
        Note::None => (),
    }
}

fn volume_row(ch: &mut Channel, v: VolumeCommand) {
    match v {
        VolumeCommand::SetVolume(x)    => ch.set_volume(x as i32),
        VolumeCommand::SetPan(x)       => ch.set_pan(x as i32),
        VolumeCommand::FineUp(x)       => ch.slide_volume(x as i32),
        VolumeCommand::FineDown(x)     => ch.slide_volume(-(x as i32)),
        VolumeCommand::VibratoSpeed(x) => if x != 0 { ch.vibrato.speed = x },
        VolumeCommand::VibratoDepth(x) => if x != 0 { ch.vibrato.depth = x },
        VolumeCommand::TonePorta(x)    => { own(&mut ch.mem.tone_porta, x); },
        _ => (),
    }
}

fn volume_tick(q: &Quirks, ch: &mut Channel, v: VolumeCommand) {
    match v {
        VolumeCommand::SlideUp(x)       => ch.slide_volume(x as i32),
        VolumeCommand::SlideDown(x)     => ch.slide_volume(-(x as i32)),
        VolumeCommand::PanSlideLeft(x)  => { let p = ch.pan - x as i32; ch.set_pan(p) },
        VolumeCommand::PanSlideRight(x) => { let p = ch.pan + x as i32; ch.set_pan(p) },
        VolumeCommand::VibratoSpeed(_) |
        VolumeCommand::VibratoDepth(_)  => vibrato(ch, 5),
        VolumeCommand::TonePorta(_)     => tone_porta(ch),
        VolumeCommand::PortaUp(x)       => porta(q, ch, -4 * x as i32),
        VolumeCommand::PortaDown(x)     => porta(q, ch, 4 * x as i32),
        _ => (),
    }
}


/// Start a row: latch the event, trigger notes and run first tick effects.
pub fn row(song: &Song, seq: &mut Sequencer, ch: &mut Channel, e: Event) {
    ch.new_row(e);

    if let Effect::NoteDelay(d) = e.effect {
        if d > 0 {
            if (d as usize) < seq.speed {
                ch.delay = Some(d);
            }
            return
        }
    }

    if let Effect::SampleOffset(p) = e.effect {
        own(&mut ch.mem.offset, p);
    }

    trigger(song, ch, &e);
    volume_row(ch, e.vol);
    effect_row(song, seq, ch, e.effect);
}

fn effect_row(song: &Song, seq: &mut Sequencer, ch: &mut Channel, fx: Effect) {
    let q = &song.quirks;

    match fx {
        Effect::Arpeggio(p) => {
            shared(q, &mut ch.mem.arpeggio, &mut ch.mem.last, p);
        }
        Effect::PortaUp(p) => {
            let p = shared(q, &mut ch.mem.porta_up, &mut ch.mem.last, p);
            if q.scream_slides {
                match p >> 4 {
                    0xf => porta(q, ch, -4 * (p & 0x0f) as i32),
                    0xe => porta(q, ch, -((p & 0x0f) as i32)),
                    _   => (),
                }
            }
        }
        Effect::PortaDown(p) => {
            let p = shared(q, &mut ch.mem.porta_down, &mut ch.mem.last, p);
            if q.scream_slides {
                match p >> 4 {
                    0xf => porta(q, ch, 4 * (p & 0x0f) as i32),
                    0xe => porta(q, ch, (p & 0x0f) as i32),
                    _   => (),
                }
            }
        }
        Effect::FinePortaUp(p) => {
            let p = memory(q, &mut ch.mem.fine_up, p);
            porta(q, ch, -4 * p as i32);
        }
        Effect::FinePortaDown(p) => {
            let p = memory(q, &mut ch.mem.fine_down, p);
            porta(q, ch, 4 * p as i32);
        }
        Effect::ExtraFinePortaUp(p) => {
            let p = memory(q, &mut ch.mem.xfine_up, p);
            porta(q, ch, -(p as i32));
        }
        Effect::ExtraFinePortaDown(p) => {
            let p = memory(q, &mut ch.mem.xfine_down, p);
            porta(q, ch, p as i32);
        }
        Effect::TonePorta(p) => {
            own(&mut ch.mem.tone_porta, p);
        }
        Effect::TonePortaVolSlide(p) | Effect::VibratoVolSlide(p) => {
            volume_slide_row(q, ch, p);
        }
        Effect::Vibrato(p) | Effect::FineVibrato(p) => set_lfo_params(&mut ch.vibrato, p),
        Effect::Tremolo(p) => set_lfo_params(&mut ch.tremolo, p),
        Effect::Tremor(p) => {
            shared(q, &mut ch.mem.tremor, &mut ch.mem.last, p);
            tremor(ch);
        }
        Effect::VolumeSlide(p) => volume_slide_row(q, ch, p),
        Effect::FineVolSlideUp(p) => {
            let p = memory(q, &mut ch.mem.fine_vol_up, p);
            ch.slide_volume(p as i32);
        }
        Effect::FineVolSlideDown(p) => {
            let p = memory(q, &mut ch.mem.fine_vol_dn, p);
            ch.slide_volume(-(p as i32));
        }
        Effect::SetVolume(v) => ch.set_volume(v as i32),
        Effect::SetPan(p) => ch.set_pan(p as i32),
        Effect::PanSlide(p) => {
            memory(q, &mut ch.mem.pan_slide, p);
        }
        Effect::Retrig(_) => ch.retrig_cnt = 0,
        Effect::MultiRetrig(p) => {
            shared(q, &mut ch.mem.retrig, &mut ch.mem.last, p);
        }
        Effect::NoteCut(0) => ch.set_volume(0),
        Effect::KeyOff(0) => key_off(song, ch),
        Effect::PatternDelay(x) => seq.set_pattern_delay(x as usize),
        Effect::PatternLoop(x) => {
            if x == 0 {
                ch.loop_row = seq.row;
            } else if ch.loop_count == 0 {
                ch.loop_count = x;
                seq.loop_to(ch.loop_row);
            } else {
                ch.loop_count -= 1;
                if ch.loop_count > 0 {
                    seq.loop_to(ch.loop_row);
                }
            }
        }
        Effect::PositionJump(p) => seq.jump(p as usize),
        Effect::PatternBreak(r) => seq.pattern_break(r as usize),
        Effect::SetSpeed(s) => if s > 0 { seq.speed = s as usize },
        Effect::SetTempo(t) => seq.set_tempo(t as usize),
        Effect::TempoSlide(p) => {
            memory(q, &mut ch.mem.tempo_slide, p);
        }
        Effect::SetGlobalVolume(v) => seq.global_volume = (v as i32).min(128),
        Effect::GlobalVolSlide(p) => {
            memory(q, &mut ch.mem.global_slide, p);
        }
        Effect::SetChannelVolume(v) => ch.chn_volume = (v as i32).min(64),
        Effect::ChannelVolSlide(p) => {
            let p = memory(q, &mut ch.mem.chn_slide, p);
            if let Some(d) = fine_slide(p) {
                ch.chn_volume = (ch.chn_volume + d).max(0).min(64);
            }
        }
        Effect::SetEnvPosition(p) => {
            if let Some(ins) = ch.ins.and_then(|i| song.instruments.get(i)) {
                ch.vol_env.set_position(&ins.vol_env, p as u16);
                ch.pan_env.set_position(&ins.pan_env, p as u16);
            }
        }
        Effect::SetFinetune(f) => {
            if let Note::None = ch.event.note {
                ch.finetune = f as i8 as i32;
                ch.period = note_to_period(ch.note as i32, ch.finetune, song.period_type);
            }
        }
        Effect::Glissando(x) => ch.glissando = x != 0,
        Effect::VibratoWaveform(w) => ch.vibrato.set_waveform(w),
        Effect::TremoloWaveform(w) => ch.tremolo.set_waveform(w),
        _ => (),
    }
}

fn tremor(ch: &mut Channel) {
    let (x, y) = nibbles(ch.mem.tremor);
    let (on, off) = (x as u8 + 1, y as u8 + 1);
    ch.tremor_on = ch.tremor_cnt < on;
    ch.tremor_cnt += 1;
    if ch.tremor_cnt >= on + off {
        ch.tremor_cnt = 0;
    }
}


/// Run continuous effects on ticks after the first of a row.
pub fn tick(song: &Song, seq: &mut Sequencer, ch: &mut Channel) {
    let e = ch.event;
    let t = seq.tick;

    if let Some(d) = ch.delay {
        if t == d as usize {
            ch.delay = None;
            trigger(song, ch, &e);
            volume_row(ch, e.vol);
        }
        return
    }

    volume_tick(&song.quirks, ch, e.vol);
    effect_tick(song, seq, ch, e.effect, t);
}

fn effect_tick(song: &Song, seq: &mut Sequencer, ch: &mut Channel, fx: Effect, t: usize) {
    let q = &song.quirks;

    match fx {
        Effect::Arpeggio(p) => {
            let p = shared(q, &mut ch.mem.arpeggio, &mut ch.mem.last, p);
            ch.arp = match t % 3 {
                1 => (p >> 4) as i32,
                2 => (p & 0x0f) as i32,
                _ => 0,
            };
        }
        Effect::PortaUp(p) => {
            let p = shared(q, &mut ch.mem.porta_up, &mut ch.mem.last, p);
            if !(q.scream_slides && p >= 0xe0) {
                porta(q, ch, -4 * p as i32);
            }
        }
        Effect::PortaDown(p) => {
            let p = shared(q, &mut ch.mem.porta_down, &mut ch.mem.last, p);
            if !(q.scream_slides && p >= 0xe0) {
                porta(q, ch, 4 * p as i32);
            }
        }
        Effect::TonePorta(_) => tone_porta(ch),
        Effect::TonePortaVolSlide(p) => {
            tone_porta(ch);
            volume_slide_tick(q, ch, p);
        }
        Effect::Vibrato(_) => vibrato(ch, 5),
        Effect::FineVibrato(_) => vibrato(ch, 7),
        Effect::VibratoVolSlide(p) => {
            vibrato(ch, 5);
            volume_slide_tick(q, ch, p);
        }
        Effect::Tremolo(_) => tremolo(ch),
        Effect::Tremor(_) => tremor(ch),
        Effect::VolumeSlide(p) => volume_slide_tick(q, ch, p),
        Effect::PanSlide(p) => {
            let p = memory(q, &mut ch.mem.pan_slide, p);
            let (x, y) = nibbles(p);
            let pan = ch.pan + if x != 0 { x } else { -y };
            ch.set_pan(pan);
        }
        Effect::Retrig(x) => {
            if x > 0 && t % x as usize == 0 {
                ch.retrigger(0);
            }
        }
        Effect::MultiRetrig(p) => {
            let p = shared(q, &mut ch.mem.retrig, &mut ch.mem.last, p);
            let (x, y) = (p >> 4, p & 0x0f);
            if y > 0 {
                ch.retrig_cnt += 1;
                if ch.retrig_cnt >= y {
                    ch.retrig_cnt = 0;
                    let v = retrig_volume(ch.volume, x);
                    ch.set_volume(v);
                    ch.retrigger(0);
                }
            }
        }
        Effect::NoteCut(x) => if t == x as usize { ch.set_volume(0) },
        Effect::KeyOff(x) => if t == x as usize { key_off(song, ch) },
        Effect::TempoSlide(p) => {
            let p = memory(q, &mut ch.mem.tempo_slide, p);
            let (x, y) = nibbles(p);
            let tempo = seq.tempo as i32 + match x {
                0 => -y,
                1 => y,
                _ => 0,
            };
            seq.set_tempo(tempo.max(0).min(255) as usize);
        }
        Effect::GlobalVolSlide(p) => {
            let p = memory(q, &mut ch.mem.global_slide, p);
            let scale = if song.format == Format::Xm { 2 } else { 1 };
            seq.global_volume = (seq.global_volume + slide(p) * scale).max(0).min(128);
        }
        Effect::ChannelVolSlide(p) => {
            let p = memory(q, &mut ch.mem.chn_slide, p);
            if fine_slide(p).is_none() {
                ch.chn_volume = (ch.chn_volume + slide(p)).max(0).min(64);
            }
        }
        _ => (),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Instrument, Order, Pattern, Sample};
    use crate::options::LoopBehavior;

    fn test_song(quirks: Quirks) -> Song {
        let mut song = Song::new(Format::S3m);
        song.channels = 1;
        song.channel_pan = vec![128];
        song.channel_volume = vec![64];
        song.orders = vec![Order::Pattern(0)];
        song.patterns.push(Pattern::new(64, 1));
        let mut smp = Sample::new();
        smp.volume = 32;
        smp.store(&[0; 64], 64, Default::default()).unwrap();
        song.samples.push(smp);
        song.instruments.push(Instrument::from_sample(1, "", 0));
        song.quirks = quirks;
        song
    }

    fn start(song: &Song, fx: Effect) -> (Sequencer, Channel) {
        let mut seq = Sequencer::new(song, LoopBehavior::StopAtEnd);
        let mut ch = Channel::new(0, song);
        let mut e = Event::new();
        e.note = Note::On(60);
        e.ins = 1;
        e.effect = fx;
        row(song, &mut seq, &mut ch, e);
        (seq, ch)
    }

    fn run_ticks(song: &Song, seq: &mut Sequencer, ch: &mut Channel, n: usize) {
        for t in 1..=n {
            seq.tick = t;
            tick(song, seq, ch);
        }
    }

    #[test]
    fn test_note_trigger() {
        let song = test_song(Default::default());
        let (_, ch) = start(&song, Effect::None);
        assert_eq!(ch.volume, 32);
        assert_eq!(ch.smp, Some(0));
        assert_eq!(ch.period, 1712);
        assert_eq!(ch.trigger, Some(0));
    }

    #[test]
    fn test_volume_slide() {
        let song = test_song(Default::default());
        let (mut seq, mut ch) = start(&song, Effect::VolumeSlide(0x20));
        run_ticks(&song, &mut seq, &mut ch, 5);
        assert_eq!(ch.volume, 42);
    }

    #[test]
    fn test_scream_fine_slides() {
        let q = Quirks { scream_slides: true, ..Default::default() };
        let song = test_song(q);
        let (mut seq, mut ch) = start(&song, Effect::VolumeSlide(0x3f));
        assert_eq!(ch.volume, 35);
        run_ticks(&song, &mut seq, &mut ch, 5);
        assert_eq!(ch.volume, 35);

        let (_, ch) = start(&song, Effect::VolumeSlide(0xf4));
        assert_eq!(ch.volume, 28);

        let (_, ch) = start(&song, Effect::PortaUp(0xf2));
        assert_eq!(ch.period, 1712 - 8);
        let (_, ch) = start(&song, Effect::PortaDown(0xe3));
        assert_eq!(ch.period, 1712 + 3);
    }

    #[test]
    fn test_fast_slides() {
        let q = Quirks { scream_slides: true, fast_slides: true, ..Default::default() };
        let song = test_song(q);
        let (_, ch) = start(&song, Effect::VolumeSlide(0x02));
        assert_eq!(ch.volume, 30);
    }

    #[test]
    fn test_param_memory() {
        let song = test_song(Default::default());
        let (mut seq, mut ch) = start(&song, Effect::PortaDown(2));
        run_ticks(&song, &mut seq, &mut ch, 1);
        assert_eq!(ch.period, 1712 + 8);

        let mut e = Event::new();
        e.effect = Effect::PortaDown(0);
        row(&song, &mut seq, &mut ch, e);
        run_ticks(&song, &mut seq, &mut ch, 1);
        assert_eq!(ch.period, 1712 + 16);

        let q = Quirks { param_memory: false, ..Default::default() };
        let song = test_song(q);
        let (mut seq, mut ch) = start(&song, Effect::PortaDown(2));
        let mut e = Event::new();
        e.effect = Effect::PortaDown(0);
        row(&song, &mut seq, &mut ch, e);
        run_ticks(&song, &mut seq, &mut ch, 3);
        assert_eq!(ch.period, 1712);
    }

    #[test]
    fn test_shared_memory() {
        let q = Quirks { shared_memory: true, ..Default::default() };
        let song = test_song(q);
        let (mut seq, mut ch) = start(&song, Effect::VolumeSlide(0x04));
        let mut e = Event::new();
        e.effect = Effect::PortaDown(0);
        row(&song, &mut seq, &mut ch, e);
        run_ticks(&song, &mut seq, &mut ch, 1);
        assert_eq!(ch.period, 1712 + 16);
    }

    #[test]
    fn test_period_limits() {
        let q = Quirks { period_min: 1700, period_max: 1720, ..Default::default() };
        let song = test_song(q);
        let (mut seq, mut ch) = start(&song, Effect::PortaUp(0x10));
        run_ticks(&song, &mut seq, &mut ch, 5);
        assert_eq!(ch.period, 1700);
    }

    #[test]
    fn test_tone_portamento() {
        let song = test_song(Default::default());
        let (mut seq, mut ch) = start(&song, Effect::None);
        let mut e = Event::new();
        e.note = Note::On(61);
        e.effect = Effect::TonePorta(0x20);
        ch.trigger = None;
        row(&song, &mut seq, &mut ch, e);
        assert_eq!(ch.trigger, None);
        let target = ch.target;
        assert!(target < 1712);
        run_ticks(&song, &mut seq, &mut ch, 5);
        assert_eq!(ch.period, target);
    }

    #[test]
    fn test_note_delay() {
        let song = test_song(Default::default());
        let (mut seq, mut ch) = start(&song, Effect::NoteDelay(3));
        assert_eq!(ch.trigger, None);
        run_ticks(&song, &mut seq, &mut ch, 2);
        assert_eq!(ch.trigger, None);
        run_ticks(&song, &mut seq, &mut ch, 3);
        assert_eq!(ch.trigger, Some(0));
    }

    #[test]
    fn test_note_cut_and_retrig_volume() {
        let song = test_song(Default::default());
        let (mut seq, mut ch) = start(&song, Effect::NoteCut(2));
        run_ticks(&song, &mut seq, &mut ch, 1);
        assert_eq!(ch.volume, 32);
        run_ticks(&song, &mut seq, &mut ch, 2);
        assert_eq!(ch.volume, 0);

        assert_eq!(retrig_volume(32, 0x7), 16);
        assert_eq!(retrig_volume(32, 0xb), 36);
        assert_eq!(retrig_volume(30, 0x6), 20);
    }

    #[test]
    fn test_tremor() {
        let song = test_song(Default::default());
        let (mut seq, mut ch) = start(&song, Effect::Tremor(0x11));
        let mut seen = vec![ch.tremor_on];
        for t in 1..6 {
            seq.tick = t;
            tick(&song, &mut seq, &mut ch);
            seen.push(ch.tremor_on);
        }
        assert_eq!(seen, vec![true, true, false, false, true, true]);
    }
}
