use crate::format::{Format, ProbeInfo};
use crate::module::{Event, Instrument, LoopMode, Note, Order, Pattern, Quirks, Sample, SampleLoop, Song, VolumeCommand};
use crate::util::{pt_period_to_note, BinaryRead, PeriodType};
use crate::Error;
use super::effect;

const NUM_SAMPLES: usize = 31;
const PATTERN_ROWS: usize = 64;
const HEADER_SIZE: usize = 1084;

pub fn probe(b: &[u8]) -> Result<ProbeInfo, Error> {
    let magic = b.read_string(1080, 4)?;
    match channels_from_magic(&magic) {
        Some(_) => Ok(ProbeInfo{format: Format::Mod, title: b.read_string(0, 20)?}),
        None    => Err(Error::MalformedInput(format!("bad magic {:?}", magic))),
    }
}

pub fn load(b: &[u8]) -> Result<Song, Error> {
    let magic = b.read_string(1080, 4)?;
    let chn = channels_from_magic(&magic)
        .ok_or_else(|| Error::MalformedInput(format!("bad magic {:?}", magic)))?;

    let mut song = Song::new(Format::Mod);
    song.title = b.read_string(0, 20)?;
    song.channels = chn;
    song.tracker = match magic.as_str() {
        "M.K." | "M!K!" | "M&K!" => "Protracker",
        "N.T."                   => "Noisetracker",
        "FLT4" | "FLT8"          => "Startrekker",
        _                        => "Fast Tracker",
    }.to_owned();

    // Load instruments
    let mut lengths = Vec::with_capacity(NUM_SAMPLES);
    for i in 0..NUM_SAMPLES {
        let (smp, len) = load_sample_header(b, i)?;
        song.instruments.push(Instrument::from_sample(i + 1, &smp.name, i));
        song.samples.push(smp);
        lengths.push(len);
    }

    // Load orders
    let song_length = b.read8(950)? as usize;
    let restart = b.read8(951)? as usize;
    if song_length == 0 || song_length > 128 {
        return Err(Error::MalformedInput(format!("invalid song length {}", song_length)))
    }
    let orders = b.slice(952, song_length)?;
    song.orders = orders.iter().map(|&x| Order::Pattern(x as usize)).collect();
    song.restart = if restart > 0 && restart < song_length { Some(restart) } else { None };
    let num_pat = orders.iter().map(|&x| x as usize).max().unwrap_or(0) + 1;

    debug!("magic {:?}, {} channels, {} patterns, length {}", magic, chn, num_pat, song_length);

    // Load patterns
    let pat_size = PATTERN_ROWS * chn * 4;
    let pdata = b.slice(HEADER_SIZE, num_pat * pat_size)?;
    for p in 0..num_pat {
        song.patterns.push(load_pattern(&pdata[p * pat_size..(p + 1) * pat_size], chn));
    }

    // Load samples
    let mut ofs = HEADER_SIZE + num_pat * pat_size;
    for (smp, len) in song.samples.iter_mut().zip(lengths) {
        let data = b.slice(ofs, len)?;
        smp.store(data, len, Default::default())?;
        ofs += len;
    }

    song.channel_pan = (0..chn).map(|i| if i % 4 == 0 || i % 4 == 3 { 0 } else { 255 }).collect();
    song.channel_volume = vec![64; chn];
    song.period_type = PeriodType::Amiga;
    song.quirks = Quirks {
        param_memory: false,
        period_min  : if chn > 4 { 28 * 4 } else { 113 * 4 },
        period_max  : if chn > 4 { 6848 * 4 } else { 856 * 4 },
        ..Default::default()
    };

    Ok(song)
}

fn load_sample_header(b: &[u8], i: usize) -> Result<(Sample, usize), Error> {
    let mut smp = Sample::new();

    let ofs = 20 + i * 30;
    smp.num = i + 1;
    smp.name = b.read_string(ofs, 22)?;
    let size = b.read16b(ofs + 22)? as usize * 2;
    smp.finetune = (((b.read8(ofs + 24)? & 0x0f) << 4) as i8) as i32;
    smp.volume = b.read8(ofs + 25)?.min(64);
    let repeat = b.read16b(ofs + 26)? as usize * 2;
    let replen = b.read16b(ofs + 28)? as usize * 2;
    smp.rate = 8363;
    smp.pan = None;

    if replen > 2 {
        smp.lp = SampleLoop { mode: LoopMode::Forward, start: repeat, end: repeat + replen };
    }

    Ok((smp, size))
}

fn load_pattern(b: &[u8], chn: usize) -> Pattern {
    let mut pat = Pattern::new(PATTERN_ROWS, chn);

    for r in 0..PATTERN_ROWS {
        for c in 0..chn {
            let e = &b[(r * chn + c) * 4..];
            let period = (((e[0] & 0x0f) as u16) << 8) | e[1] as u16;
            let note = pt_period_to_note(period);

            let event = pat.event_mut(r, c);
            *event = Event {
                note  : if period != 0 { Note::On(note) } else { Note::None },
                ins   : (e[0] & 0xf0) | (e[2] >> 4),
                vol   : VolumeCommand::None,
                effect: effect(e[2] & 0x0f, e[3]),
            };
        }
    }

    pat
}

fn channels_from_magic(magic: &str) -> Option<usize> {
    let m = magic.as_bytes();
    if m.len() != 4 {
        return None
    }
    match magic {
        "M.K." | "M!K!" | "M&K!" | "N.T." | "FLT4" => Some(4),
        "FLT8" => Some(8),
        _ => {
            if m[0].is_ascii_digit() && m[1].is_ascii_digit() && &m[2..] == b"CH" {
                let n = ((m[0] - b'0') * 10 + m[1] - b'0') as usize;
                if n > 0 && n <= 32 { Some(n) } else { None }
            } else if m[0].is_ascii_digit() && &m[1..] == b"CHN" {
                let n = (m[0] - b'0') as usize;
                if n > 0 { Some(n) } else { None }
            } else {
                None
            }
        }
    }
}
