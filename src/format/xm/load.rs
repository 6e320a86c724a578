use crate::format::{Format, ProbeInfo};
use crate::module::{AutoVibrato, Envelope, EnvelopePoint, Event, Instrument, LoopMode, Order, Pattern};
use crate::module::{Quirks, Sample, SampleFormat, SampleLoop, Song};
use crate::util::{BinaryRead, PeriodType};
use crate::Error;
use super::{effect, note, volume, LINEAR_FREQ};

const XM_MAGIC: &[u8] = b"Extended Module: ";
const MAX_ENV_POINTS: usize = 12;

pub fn probe(b: &[u8]) -> Result<ProbeInfo, Error> {
    if b.slice(0, 17)? == XM_MAGIC {
        Ok(ProbeInfo{format: Format::Xm, title: b.read_string(17, 20)?})
    } else {
        Err(Error::MalformedInput("bad magic".to_owned()))
    }
}

pub fn load(b: &[u8]) -> Result<Song, Error> {
    let mut song = Song::new(Format::Xm);
    song.title = b.read_string(17, 20)?;
    song.tracker = b.read_string(38, 20)?;

    let version = b.read16l(58)?;
    if version != 0x0104 {
        return Err(Error::UnsupportedFeature(format!("XM version 0x{:04x}", version)))
    }

    let header_size = b.read32l(60)? as usize;
    let song_length = b.read16l(64)? as usize;
    let restart = b.read16l(66)? as usize;
    let chn = b.read16l(68)? as usize;
    let pat_num = b.read16l(70)? as usize;
    let ins_num = b.read16l(72)? as usize;
    let flags = b.read16l(74)?;
    let speed = b.read16l(76)?;
    let bpm = b.read16l(78)?;

    if song_length == 0 || song_length > 256 {
        return Err(Error::MalformedInput(format!("invalid song length {}", song_length)))
    }
    if chn == 0 || chn > crate::MAX_CHANNELS {
        return Err(Error::MalformedInput(format!("invalid number of channels {}", chn)))
    }

    song.channels = chn;
    song.orders = b.slice(80, song_length)?.iter().map(|&x| Order::Pattern(x as usize)).collect();
    song.restart = if restart > 0 && restart < song_length { Some(restart) } else { None };
    song.speed = if speed > 0 && speed < 256 { speed as u8 } else { 6 };
    song.tempo = if bpm >= 32 && bpm < 256 { bpm as u8 } else { 125 };
    song.period_type = if flags & LINEAR_FREQ != 0 { PeriodType::Linear } else { PeriodType::Amiga };
    song.channel_pan = vec![128; chn];
    song.channel_volume = vec![64; chn];
    song.instrument_mode = true;
    song.quirks = Quirks {
        param_memory: true,
        keyoff_cuts : true,
        ..Default::default()
    };

    debug!("version 0x{:04x}, {} channels, {} patterns, {} instruments, {:?} periods",
           version, chn, pat_num, ins_num, song.period_type);

    // Load patterns
    let mut ofs = 60 + header_size;
    for i in 0..pat_num {
        let (pat, size) = load_pattern(b, ofs, chn)
            .map_err(|e| Error::MalformedInput(format!("pattern {}: {}", i, e)))?;
        song.patterns.push(pat);
        ofs += size;
    }

    // Load instruments
    for i in 0..ins_num {
        ofs = load_instrument(b, ofs, i, &mut song)?;
    }

    Ok(song)
}

fn load_pattern(b: &[u8], ofs: usize, chn: usize) -> Result<(Pattern, usize), Error> {
    let header_size = b.read32l(ofs)? as usize;
    let rows = match b.read16l(ofs + 5)? as usize {
        0 => 64,
        n => n.min(256),
    };
    let data_size = b.read16l(ofs + 7)? as usize;

    let mut pat = Pattern::new(rows, chn);
    let p = b.slice(ofs + header_size, data_size)?;

    let mut i = 0;
    if data_size > 0 {
        for r in 0..rows {
            for c in 0..chn {
                let mut e = Event::new();
                let flags = p.read8(i)?;
                let (mut n, mut ins, mut vol, mut fxt, mut fxp) = (0, 0, 0, 0, 0);
                if flags & 0x80 != 0 {
                    i += 1;
                    if flags & 0x01 != 0 { n   = p.read8(i)?; i += 1 }
                    if flags & 0x02 != 0 { ins = p.read8(i)?; i += 1 }
                    if flags & 0x04 != 0 { vol = p.read8(i)?; i += 1 }
                    if flags & 0x08 != 0 { fxt = p.read8(i)?; i += 1 }
                    if flags & 0x10 != 0 { fxp = p.read8(i)?; i += 1 }
                } else {
                    n   = p.read8(i)?;
                    ins = p.read8(i + 1)?;
                    vol = p.read8(i + 2)?;
                    fxt = p.read8(i + 3)?;
                    fxp = p.read8(i + 4)?;
                    i += 5;
                }
                e.note = note(n);
                e.ins = ins;
                e.vol = volume(vol);
                e.effect = effect(fxt, fxp);
                *pat.event_mut(r, c) = e;
            }
        }
    }

    Ok((pat, header_size + data_size))
}

fn load_envelope(b: &[u8], ofs: usize, num: u8, sus: u8, lps: u8, lpe: u8, typ: u8, pan: bool) -> Result<Envelope, Error> {
    let num = (num as usize).min(MAX_ENV_POINTS);
    let mut env = Envelope {
        enabled: typ & 0x01 != 0,
        points : Vec::with_capacity(num),
        sustain: if typ & 0x02 != 0 { Some((sus as usize, sus as usize)) } else { None },
        lp     : if typ & 0x04 != 0 { Some((lps as usize, lpe as usize)) } else { None },
    };
    for i in 0..num {
        let tick = b.read16l(ofs + i * 4)?;
        let value = b.read16l(ofs + i * 4 + 2)? as i16;
        env.points.push(EnvelopePoint {
            tick,
            value: if pan { value.min(64) - 32 } else { value.min(64) },
        });
    }
    env.sanitize();
    Ok(env)
}

// Returns the offset of the next instrument.
fn load_instrument(b: &[u8], ofs: usize, i: usize, song: &mut Song) -> Result<usize, Error> {
    let ins_size = b.read32l(ofs)? as usize;
    let mut ins = Instrument::new();
    ins.num = i + 1;
    ins.name = b.read_string(ofs + 4, 22)?;
    let smp_num = b.read16l(ofs + 27)? as usize;

    if smp_num == 0 {
        song.instruments.push(ins);
        return Ok(ofs + ins_size)
    }

    let smp_header_size = b.read32l(ofs + 29)? as usize;
    let keymap = b.slice(ofs + 33, 96)?;
    let n = |x| b.read8(ofs + x);
    ins.vol_env = load_envelope(b, ofs + 129, n(225)?, n(227)?, n(228)?, n(229)?, n(233)?, false)?;
    ins.pan_env = load_envelope(b, ofs + 177, n(226)?, n(230)?, n(231)?, n(232)?, n(234)?, true)?;
    let vibrato = AutoVibrato {
        waveform: match n(235)? {   // sine, square, ramp down, ramp up
            1 => 2,
            2 => 1,
            3 => 4,
            _ => 0,
        },
        sweep   : n(236)?,
        depth   : n(237)?,
        rate    : n(238)?,
    };
    ins.fadeout = b.read16l(ofs + 239)? as u32 * 2;

    let base = song.samples.len();
    for (k, &s) in keymap.iter().enumerate() {
        let s = s as usize;
        ins.keymap.set(k + 12, if s < smp_num { Some(base + s) } else { None }, (k + 12) as u8);
    }

    // Sample headers
    let mut ofs = ofs + ins_size;
    let mut headers = Vec::with_capacity(smp_num);
    for j in 0..smp_num {
        let mut smp = Sample::new();
        let length = b.read32l(ofs)? as usize;
        let loop_start = b.read32l(ofs + 4)? as usize;
        let loop_len = b.read32l(ofs + 8)? as usize;
        smp.volume = b.read8(ofs + 12)?.min(64);
        smp.finetune = b.read8i(ofs + 13)? as i32;
        let typ = b.read8(ofs + 14)?;
        smp.pan = Some(b.read8(ofs + 15)?);
        smp.transpose = b.read8i(ofs + 16)? as i32;
        smp.name = b.read_string(ofs + 18, 22)?;
        smp.num = base + j + 1;
        smp.rate = 8363;
        smp.vibrato = vibrato;

        let fmt = SampleFormat { bits16: typ & 0x10 != 0, delta: true, ..Default::default() };
        let width = fmt.frame_bytes();
        let mode = match typ & 0x03 {
            0 => LoopMode::Off,
            1 => LoopMode::Forward,
            _ => LoopMode::PingPong,
        };
        if mode != LoopMode::Off && loop_len > 0 {
            smp.lp = SampleLoop { mode, start: loop_start / width, end: (loop_start + loop_len) / width };
        }

        headers.push((smp, length / width, fmt, length));
        ofs += smp_header_size;
    }

    // Sample data
    for (mut smp, frames, fmt, size) in headers {
        smp.store(b.slice(ofs, size)?, frames, fmt)?;
        song.samples.push(smp);
        ofs += size;
    }

    song.instruments.push(ins);
    Ok(ofs)
}
