use crate::format::{Format, ProbeInfo};
use crate::module::{AutoVibrato, Envelope, EnvelopePoint, Event, Instrument, LoopMode, Order, Pattern};
use crate::module::{Quirks, Sample, SampleFormat, SampleLoop, Song};
use crate::util::{BinaryRead, PeriodType};
use crate::{Error, MAX_CHANNELS, MAX_KEYS};
use super::*;

const ENV_POINTS: usize = 25;

pub fn probe(b: &[u8]) -> Result<ProbeInfo, Error> {
    if b.read32b(0)? == magic4!('I','M','P','M') {
        Ok(ProbeInfo{format: Format::It, title: b.read_string(4, 26)?})
    } else {
        Err(Error::MalformedInput("bad magic".to_owned()))
    }
}

pub fn load(b: &[u8]) -> Result<Song, Error> {
    let mut song = Song::new(Format::It);
    song.title = b.read_string(4, 26)?;

    let ord_num = b.read16l(0x20)? as usize;
    let ins_num = b.read16l(0x22)? as usize;
    let smp_num = b.read16l(0x24)? as usize;
    let pat_num = b.read16l(0x26)? as usize;
    let cwt_v = b.read16l(0x28)?;
    let cmwt = b.read16l(0x2a)?;
    let flags = b.read16l(0x2c)?;
    let special = b.read16l(0x2e)?;
    let g_v = b.read8(0x30)?;
    let i_s = b.read8(0x32)?;
    let i_t = b.read8(0x33)?;
    let ch_pan = b.slice(0x40, 64)?;
    let ch_vol = b.slice(0x80, 64)?;

    song.instrument_mode = flags & FLAG_INSTRUMENTS != 0;
    if song.instrument_mode && cmwt < 0x200 {
        return Err(Error::UnsupportedFeature(format!("old instrument format (cmwt 0x{:03x})", cmwt)))
    }

    // Orders
    for &o in b.slice(0xc0, ord_num)? {
        match o {
            255 => break,
            254 => song.orders.push(Order::Skip),
            _   => song.orders.push(Order::Pattern(o as usize)),
        }
    }

    let mut ofs = 0xc0 + ord_num;
    let mut read_offsets = |num: usize| -> Result<Vec<usize>, Error> {
        let mut v = Vec::with_capacity(num);
        for _ in 0..num { v.push(b.read32l(ofs)? as usize); ofs += 4; }
        Ok(v)
    };
    let ins_pp = read_offsets(ins_num)?;
    let smp_pp = read_offsets(smp_num)?;
    let pat_pp = read_offsets(pat_num)?;

    // Samples
    for (i, &pp) in smp_pp.iter().enumerate() {
        song.samples.push(load_sample(b, pp, i)?);
    }

    // Instruments
    if song.instrument_mode {
        for (i, &pp) in ins_pp.iter().enumerate() {
            song.instruments.push(load_instrument(b, pp, i, smp_num)?);
        }
    } else {
        song.instruments = song.samples.iter().enumerate()
            .map(|(i, s)| Instrument::from_sample(i + 1, &s.name, i))
            .collect();
    }

    // Patterns, decoded over all 64 channels and narrowed once the
    // highest used channel is known
    let mut raw = Vec::with_capacity(pat_num);
    let mut chn = 1;
    for (i, &pp) in pat_pp.iter().enumerate() {
        let (rows, events) = if pp == 0 {
            (64, Vec::new())
        } else {
            load_pattern(b, pp).map_err(|e| Error::MalformedInput(format!("pattern {}: {}", i, e)))?
        };
        for &(_, c, _) in &events {
            if ch_pan[c] & 0x80 == 0 {
                chn = chn.max(c + 1);
            }
        }
        raw.push((rows, events));
    }
    song.channels = chn;
    for (rows, events) in raw {
        let mut pat = Pattern::new(rows, chn);
        for (r, c, e) in events {
            if c < chn && ch_pan[c] & 0x80 == 0 {
                *pat.event_mut(r, c) = e;
            }
        }
        song.patterns.push(pat);
    }

    let stereo = flags & FLAG_STEREO != 0;
    song.channel_pan = ch_pan[..chn].iter().map(|&p| {
        let p = p & 0x7f;
        if !stereo || p > 64 { 128 } else { (p as u16 * 4).min(255) as u8 }
    }).collect();
    song.channel_volume = ch_vol[..chn].iter().map(|&v| v.min(64)).collect();

    if special & SPECIAL_MESSAGE != 0 {
        let len = b.read16l(0x36)? as usize;
        let msg_ofs = b.read32l(0x38)? as usize;
        song.message = b.read_string(msg_ofs, len)?.replace('\r', "\n");
    }

    song.speed = if i_s != 0 { i_s } else { 6 };
    song.tempo = if i_t >= 32 { i_t } else { 125 };
    song.global_volume = g_v.min(128);
    song.period_type = if flags & FLAG_LINEAR != 0 { PeriodType::Linear } else { PeriodType::Amiga };
    song.quirks = Quirks {
        param_memory : true,
        scream_slides: true,
        keyoff_cuts  : !song.instrument_mode,
        ..Default::default()
    };
    song.tracker = format!("Impulse Tracker {}.{:02x}", (cwt_v & 0xf00) >> 8, cwt_v & 0xff);

    debug!("{} channels, {} orders, {} instruments, {} samples, {} patterns, instrument mode {}",
           chn, song.orders.len(), ins_num, smp_num, pat_num, song.instrument_mode);

    Ok(song)
}

fn load_sample(b: &[u8], ofs: usize, i: usize) -> Result<Sample, Error> {
    if b.read32b(ofs)? != magic4!('I','M','P','S') {
        return Err(Error::MalformedInput(format!("sample {}: bad magic", i + 1)))
    }

    let mut smp = Sample::new();
    smp.num = i + 1;
    smp.global_volume = b.read8(ofs + 0x11)?.min(64);
    let flg = b.read8(ofs + 0x12)?;
    smp.volume = b.read8(ofs + 0x13)?.min(64);
    smp.name = b.read_string(ofs + 0x14, 26)?;
    let cvt = b.read8(ofs + 0x2e)?;
    let dfp = b.read8(ofs + 0x2f)?;
    let length = b.read32l(ofs + 0x30)? as usize;
    let loop_beg = b.read32l(ofs + 0x34)? as usize;
    let loop_end = b.read32l(ofs + 0x38)? as usize;
    let c5speed = b.read32l(ofs + 0x3c)?;
    let sus_beg = b.read32l(ofs + 0x40)? as usize;
    let sus_end = b.read32l(ofs + 0x44)? as usize;
    let ptr = b.read32l(ofs + 0x48)? as usize;
    smp.vibrato = AutoVibrato {
        rate    : b.read8(ofs + 0x4c)?,
        depth   : b.read8(ofs + 0x4d)?,
        sweep   : b.read8(ofs + 0x4e)?,
        waveform: b.read8(ofs + 0x4f)? & 0x03,
    };

    smp.rate = if c5speed != 0 { c5speed } else { 8363 };
    if dfp & 0x80 != 0 {
        smp.pan = Some(((dfp & 0x7f).min(64) as u16 * 4).min(255) as u8);
    }
    if flg & SMP_LOOP != 0 {
        let mode = if flg & SMP_PINGPONG != 0 { LoopMode::PingPong } else { LoopMode::Forward };
        smp.lp = SampleLoop { mode, start: loop_beg, end: loop_end };
    }
    if flg & SMP_SUSTAIN != 0 {
        let mode = if flg & SMP_SUSTAIN_PINGPONG != 0 { LoopMode::PingPong } else { LoopMode::Forward };
        smp.sustain = SampleLoop { mode, start: sus_beg, end: sus_end };
    }

    if flg & SMP_HAS_DATA == 0 || length == 0 {
        smp.fix_loops();
        return Ok(smp)
    }
    if flg & SMP_COMPRESSED != 0 {
        return Err(Error::UnsupportedFeature(format!("sample {}: compressed sample", i + 1)))
    }

    let fmt = SampleFormat {
        bits16    : flg & SMP_16BIT != 0,
        stereo    : flg & SMP_STEREO != 0,
        unsigned  : cvt & 0x01 == 0,
        big_endian: cvt & 0x02 != 0,
        delta     : cvt & 0x04 != 0,
    };
    let data = b.slice(ptr, length * fmt.frame_bytes())?;
    smp.store(data, length, fmt)?;

    Ok(smp)
}

fn load_envelope(b: &[u8], ofs: usize, pan: bool) -> Result<Envelope, Error> {
    let flg = b.read8(ofs)?;
    let num = (b.read8(ofs + 1)? as usize).min(ENV_POINTS);
    let (lpb, lpe) = (b.read8(ofs + 2)? as usize, b.read8(ofs + 3)? as usize);
    let (slb, sle) = (b.read8(ofs + 4)? as usize, b.read8(ofs + 5)? as usize);

    let mut env = Envelope {
        enabled: flg & 0x01 != 0,
        points : Vec::with_capacity(num),
        lp     : if flg & 0x02 != 0 { Some((lpb, lpe)) } else { None },
        sustain: if flg & 0x04 != 0 { Some((slb, sle)) } else { None },
    };
    for i in 0..num {
        let value = b.read8i(ofs + 6 + i * 3)? as i16;
        let tick = b.read16l(ofs + 7 + i * 3)?;
        env.points.push(EnvelopePoint {
            tick,
            value: if pan { value.max(-32).min(32) } else { value.max(0).min(64) },
        });
    }
    env.sanitize();
    Ok(env)
}

fn load_instrument(b: &[u8], ofs: usize, i: usize, smp_num: usize) -> Result<Instrument, Error> {
    if b.read32b(ofs)? != magic4!('I','M','P','I') {
        return Err(Error::MalformedInput(format!("instrument {}: bad magic", i + 1)))
    }

    let mut ins = Instrument::new();
    ins.num = i + 1;
    ins.fadeout = b.read16l(ofs + 0x14)? as u32 * 64;
    ins.volume = b.read8(ofs + 0x18)?.min(128);
    let dfp = b.read8(ofs + 0x19)?;
    if dfp & 0x80 == 0 {
        ins.pan = Some((dfp.min(64) as u16 * 4).min(255) as u8);
    }
    ins.name = b.read_string(ofs + 0x20, 26)?;

    let keys = b.slice(ofs + 0x40, MAX_KEYS * 2)?;
    for k in 0..MAX_KEYS {
        let (note, smp) = (keys[k * 2], keys[k * 2 + 1] as usize);
        let sample = if smp > 0 && smp <= smp_num { Some(smp - 1) } else { None };
        ins.keymap.set(k, sample, note);
    }

    ins.vol_env = load_envelope(b, ofs + 0x130, false)?;
    ins.pan_env = load_envelope(b, ofs + 0x182, true)?;

    Ok(ins)
}

// Returns the number of rows and the (row, channel, event) list.
fn load_pattern(b: &[u8], ofs: usize) -> Result<(usize, Vec<(usize, usize, Event)>), Error> {
    let len = b.read16l(ofs)? as usize;
    let rows = b.read16l(ofs + 2)? as usize;
    if rows == 0 || rows > 200 {
        return Err(Error::MalformedInput(format!("invalid number of rows {}", rows)))
    }
    let p = b.slice(ofs + 8, len)?;

    let mut events = Vec::new();
    let mut last_mask = [0_u8; MAX_CHANNELS];
    let mut last = [Event::new(); MAX_CHANNELS];
    let mut i = 0;
    let mut row = 0;
    while row < rows {
        let cv = p.read8(i)?; i += 1;
        if cv == 0 {
            row += 1;
            continue
        }
        let c = ((cv - 1) & 63) as usize;
        if cv & 0x80 != 0 {
            last_mask[c] = p.read8(i)?;
            i += 1;
        }
        let mask = last_mask[c];

        let mut e = Event::new();
        if mask & 0x01 != 0 {
            last[c].note = note(p.read8(i)?);
            i += 1;
        }
        if mask & 0x02 != 0 {
            last[c].ins = p.read8(i)?;
            i += 1;
        }
        if mask & 0x04 != 0 {
            last[c].vol = volume(p.read8(i)?);
            i += 1;
        }
        if mask & 0x08 != 0 {
            last[c].effect = effect(p.read8(i)?, p.read8(i + 1)?);
            i += 2;
        }
        if mask & 0x11 != 0 { e.note = last[c].note }
        if mask & 0x22 != 0 { e.ins = last[c].ins }
        if mask & 0x44 != 0 { e.vol = last[c].vol }
        if mask & 0x88 != 0 { e.effect = last[c].effect }

        events.push((row, c, e));
    }

    Ok((rows, events))
}
