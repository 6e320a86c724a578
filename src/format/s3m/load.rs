use crate::format::{Format, ProbeInfo};
use crate::module::{Event, Instrument, LoopMode, Order, Pattern, Quirks, Sample, SampleFormat, SampleLoop, Song};
use crate::util::{BinaryRead, PeriodType};
use crate::Error;
use super::{effect, note, volume, FFI_UNSIGNED, FLAG_FAST_SLIDES};

const PATTERN_ROWS: usize = 64;

pub trait BinaryReadExt {
    fn read16l_lo_hi(&self, ofs: usize) -> Result<u32, Error>;
}

impl<'a> BinaryReadExt for &'a [u8] {
    fn read16l_lo_hi(&self, ofs: usize) -> Result<u32, Error> {
        let lo = self.read16l(ofs)? as u32;
        let hi = self.read16l(ofs + 2)? as u32;
        Ok((hi << 16) | lo)
    }
}

pub fn probe(b: &[u8]) -> Result<ProbeInfo, Error> {
    let magic = b.read32b(0x2c)?;
    let typ = b.read8(0x1d)?;
    if magic == magic4!('S','C','R','M') && typ == 16 {
        Ok(ProbeInfo{format: Format::S3m, title: b.read_string(0, 28)?})
    } else {
        Err(Error::MalformedInput("bad magic".to_owned()))
    }
}

pub fn load(b: &[u8]) -> Result<Song, Error> {
    let mut song = Song::new(Format::S3m);
    song.title = b.read_string(0, 28)?;

    let ord_num = b.read16l(0x20)? as usize;
    let ins_num = b.read16l(0x22)? as usize;
    let pat_num = b.read16l(0x24)? as usize;
    let flags = b.read16l(0x26)?;
    let cwt_v = b.read16l(0x28)?;
    let ffi = b.read16l(0x2a)?;
    let g_v = b.read8(0x30)?;
    let i_s = b.read8(0x31)?;
    let i_t = b.read8(0x32)?;
    let m_v = b.read8(0x33)?;
    let d_p = b.read8(0x35)?;
    let ch_settings = b.slice(0x40, 32)?;

    // Map enabled PCM channels to consecutive song channels
    let mut ch_map = [None; 32];
    let mut chn = 0;
    for (i, &c) in ch_settings.iter().enumerate() {
        if c < 16 {
            ch_map[i] = Some(chn);
            chn += 1;
        } else if c != 255 && c & 0x80 == 0 {
            warn!("channel {}: AdLib channel ignored", i);
        }
    }
    song.channels = chn;

    // Orders
    let orders = b.slice(0x60, ord_num)?;
    for &o in orders {
        match o {
            255 => break,
            254 => song.orders.push(Order::Skip),
            _   => song.orders.push(Order::Pattern(o as usize)),
        }
    }

    // Instrument parapointers
    let mut ofs = 0x60 + ord_num;
    let mut instrum_pp = Vec::<usize>::new();
    for _ in 0..ins_num { instrum_pp.push(b.read16l(ofs)? as usize * 16); ofs += 2; }

    // Pattern parapointers
    let mut pattern_pp = Vec::<usize>::new();
    for _ in 0..pat_num { pattern_pp.push(b.read16l(ofs)? as usize * 16); ofs += 2; }

    // Channel pan positions
    let stereo = m_v & 0x80 != 0;
    let ch_pan = if d_p == 252 { Some(b.slice(ofs, 32)?) } else { None };
    for (i, &c) in ch_settings.iter().enumerate() {
        if ch_map[i].is_none() {
            continue
        }
        let mut pan = if c & 0x0f < 8 { 0x3 * 17 } else { 0xc * 17 };
        if let Some(p) = ch_pan {
            if p[i] & 0x20 != 0 {
                pan = (p[i] & 0x0f) * 17;
            }
        }
        song.channel_pan.push(if stereo { pan } else { 128 });
    }
    song.channel_volume = vec![64; chn];

    // Load instruments
    let unsigned = ffi == FFI_UNSIGNED;
    for (i, &pp) in instrum_pp.iter().enumerate() {
        let smp = load_instrument(b, i, pp, unsigned)?;
        song.instruments.push(Instrument::from_sample(i + 1, &smp.name, i));
        song.samples.push(smp);
    }

    // Load patterns
    for (i, &pp) in pattern_pp.iter().enumerate() {
        let pat = if pp == 0 {
            Pattern::new(PATTERN_ROWS, chn)
        } else {
            load_pattern(b, pp, chn, &ch_map)
                .map_err(|e| Error::MalformedInput(format!("pattern {}: {}", i, e)))?
        };
        song.patterns.push(pat);
    }

    song.speed = if i_s != 0 && i_s != 255 { i_s } else { 6 };
    song.tempo = if i_t >= 32 { i_t } else { 125 };
    song.global_volume = g_v.min(64) * 2;
    song.period_type = PeriodType::Amiga;
    song.quirks = Quirks {
        param_memory : true,
        shared_memory: true,
        scream_slides: true,
        fast_slides  : flags & FLAG_FAST_SLIDES != 0 || cwt_v == 0x1300,
        period_min   : 64,
        period_max   : 0x7fff,
        ..Default::default()
    };
    song.tracker = tracker_name(cwt_v);

    debug!("{} channels, {} orders, {} instruments, {} patterns, tracker {}",
           chn, song.orders.len(), ins_num, pat_num, song.tracker);

    Ok(song)
}

fn load_instrument(b: &[u8], i: usize, ofs: usize, unsigned: bool) -> Result<Sample, Error> {
    let mut smp = Sample::new();
    smp.num = i + 1;

    let typ = b.read8(ofs)?;
    smp.name = b.read_string(ofs + 0x30, 28)?;

    match typ {
        0 => return Ok(smp),
        1 => (),
        _ => {
            warn!("instrument {}: AdLib instrument loaded as empty sample", i + 1);
            return Ok(smp)
        }
    }

    if b.read32b(ofs + 0x4c)? != magic4!('S','C','R','S') {
        return Err(Error::MalformedInput(format!("instrument {}: bad magic", i + 1)))
    }

    let memseg = ((b.read8(ofs + 0x0d)? as usize) << 16) | b.read16l(ofs + 0x0e)? as usize;
    let length = b.read16l_lo_hi(ofs + 0x10)? as usize;
    let loop_beg = b.read16l_lo_hi(ofs + 0x14)? as usize;
    let loop_end = b.read16l_lo_hi(ofs + 0x18)? as usize;
    let vol = b.read8(ofs + 0x1c)?;
    let pack = b.read8(ofs + 0x1e)?;
    let flags = b.read8(ofs + 0x1f)?;
    let c2spd = b.read16l_lo_hi(ofs + 0x20)?;

    if pack != 0 {
        return Err(Error::UnsupportedFeature(format!("instrument {}: packed sample", i + 1)))
    }

    smp.volume = vol.min(64);
    smp.rate = if c2spd != 0 { c2spd } else { 8363 };
    if flags & 0x01 != 0 {
        smp.lp = SampleLoop { mode: LoopMode::Forward, start: loop_beg, end: loop_end };
    }

    let fmt = SampleFormat {
        bits16  : flags & 0x04 != 0,
        stereo  : flags & 0x02 != 0,
        unsigned,
        ..Default::default()
    };
    let data = b.slice(memseg * 16, length * fmt.frame_bytes())?;
    smp.store(data, length, fmt)?;

    Ok(smp)
}

fn load_pattern(b: &[u8], ofs: usize, chn: usize, ch_map: &[Option<usize>; 32]) -> Result<Pattern, Error> {
    let mut pat = Pattern::new(PATTERN_ROWS, chn);

    let plen = b.read16l(ofs)? as usize;
    let p = b.slice(ofs + 2, plen.saturating_sub(2))?;

    let mut i = 0;
    let mut row = 0;
    while row < PATTERN_ROWS {
        let flag = p.read8(i)?; i += 1;
        if flag == 0 {
            row += 1;
            continue
        }

        let mut e = Event::new();
        if flag & 0x20 != 0 {
            e.note = note(p.read8(i)?);
            e.ins = p.read8(i + 1)?;
            i += 2;
        }
        if flag & 0x40 != 0 {
            e.vol = volume(p.read8(i)?);
            i += 1;
        }
        if flag & 0x80 != 0 {
            e.effect = effect(p.read8(i)?, p.read8(i + 1)?);
            i += 2;
        }

        if let Some(c) = ch_map[(flag & 0x1f) as usize] {
            *pat.event_mut(row, c) = e;
        }
    }

    Ok(pat)
}

fn tracker_name(cwt_v: u16) -> String {
    let ver_major = (cwt_v & 0xf00) >> 8;
    let ver_minor = cwt_v & 0x0ff;

    match cwt_v >> 12 {
        1 => format!("Scream Tracker {}.{:02x}", ver_major, ver_minor),
        2 => format!("Imago Orpheus {}.{:02x}", ver_major, ver_minor),
        3 => format!("Impulse Tracker {}.{:02x}", ver_major, ver_minor),
        4 => format!("Schism Tracker {}.{:02x}", ver_major, ver_minor),
        5 => format!("OpenMPT {}.{:02x}", ver_major, ver_minor),
        _ => format!("unknown ({}.{:02x})", ver_major, ver_minor),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Note, VolumeCommand};
    use crate::testutil;

    #[test]
    fn test_load_s3m() {
        let song = load(&testutil::build_s3m()).unwrap();
        assert_eq!(song.title, "test song");
        assert_eq!(song.channels, 4);
        assert_eq!(song.channel_pan, vec![51, 204, 51, 204]);
        assert_eq!(song.orders, vec![Order::Pattern(0)]);
        assert_eq!(song.samples.len(), 1);
        assert_eq!(song.samples[0].frames, testutil::SAMPLE_FRAMES);
        assert_eq!(song.tracker, "Scream Tracker 3.20");
        assert!(song.quirks.shared_memory);

        let e = song.patterns[0].event(0, 0);
        assert_eq!(e.note, Note::On(60));
        assert_eq!(e.ins, 1);
        assert_eq!(e.vol, VolumeCommand::SetVolume(64));
        assert!(song.validate().is_ok());
    }

    #[test]
    fn test_packed_sample_unsupported() {
        let mut b = testutil::build_s3m();
        let ofs = testutil::S3M_INS_OFS + 0x1e;
        b[ofs] = 1;
        match load(&b) {
            Err(Error::UnsupportedFeature(_)) => (),
            _ => panic!("expected unsupported feature"),
        }
    }

    #[test]
    fn test_tracker_name() {
        assert_eq!(tracker_name(0x1320), "Scream Tracker 3.20");
        assert_eq!(tracker_name(0x3214), "Impulse Tracker 2.14");
    }
}
