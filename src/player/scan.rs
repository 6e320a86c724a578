use crate::module::Song;
use crate::options::LoopBehavior;
use super::channel::Channel;
use super::sequencer::Sequencer;

// Upper bound for pathological songs, about a day of playback at 50 Hz
const MAX_SCAN_TICKS: usize = 1 << 22;

/// Timing state when playback first reaches an order position or row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPos {
    pub frame        : u64,   // frames rendered before the position starts
    pub speed        : usize,
    pub tempo        : usize,
    pub global_volume: i32,
}

#[derive(Debug, Clone)]
pub struct ScanData {
    pub rate  : u32,
    pub frames: u64,
    pub pos   : Vec<Option<ScanPos>>,
    pub rows  : Vec<Vec<Option<ScanPos>>>,
}

impl ScanData {
    pub fn millis(&self) -> u64 {
        self.frames * 1000 / self.rate as u64
    }

    /// Timing state at a row, falling back to the start of its order
    /// position when playback never reaches the row.
    pub fn at(&self, pos: usize, row: usize) -> Option<ScanPos> {
        match self.rows.get(pos).and_then(|r| r.get(row)) {
            Some(&Some(p)) => Some(p),
            _              => self.pos.get(pos).cloned().flatten(),
        }
    }
}

/// Dry-run the sequencer to find the song duration. Playback stops at the
/// end of the song, when it loops back, or when a row is revisited while
/// no pattern loop is running.
pub fn scan(song: &Song, rate: u32, behavior: LoopBehavior) -> ScanData {
    let mut seq = Sequencer::new(song, behavior);
    let mut channels: Vec<Channel> = (0..song.channels).map(|i| Channel::new(i, song)).collect();
    let mut data = ScanData {
        rate,
        frames: 0,
        pos   : vec![None; song.len()],
        rows  : (0..song.len())
            .map(|p| vec![None; song.pattern_at(p).map_or(0, |pat| pat.rows)])
            .collect(),
    };

    let mut ticks = 0;
    while !seq.finished() && seq.loops == 0 && ticks < MAX_SCAN_TICKS {
        if seq.at_row_start() {
            let (pos, row) = (seq.pos, seq.row);
            let looping = channels.iter().any(|ch| ch.loop_count > 0);
            let here = ScanPos {
                frame        : data.frames,
                speed        : seq.speed,
                tempo        : seq.tempo,
                global_volume: seq.global_volume,
            };
            match data.rows.get_mut(pos).and_then(|v| v.get_mut(row)) {
                Some(Some(_)) if !looping => break,
                Some(r) => if r.is_none() { *r = Some(here) },
                None    => break,
            }
            if data.pos[pos].is_none() {
                data.pos[pos] = Some(here);
            }
        }

        seq.process(song, &mut channels);
        if seq.finished() {
            break
        }
        data.frames += seq.frames_per_tick(rate) as u64;
        seq.advance(song);
        ticks += 1;
    }

    debug!("scan: {} frames, {} ms", data.frames, data.millis());
    data
}
