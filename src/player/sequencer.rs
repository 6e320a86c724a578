use crate::module::{Order, Song};
use crate::options::LoopBehavior;
use crate::{Error, MIN_TEMPO};
use super::channel::Channel;
use super::effects;

/// Position in the song timeline and the global playback parameters.
#[derive(Debug, Clone)]
pub struct Sequencer {
    pub pos          : usize,
    pub row          : usize,
    pub tick         : usize,
    pub speed        : usize,
    pub tempo        : usize,
    pub global_volume: i32,     // 0..128
    pub loops        : usize,   // times playback went back to an earlier position

    behavior         : LoopBehavior,
    finished         : bool,
    repeat           : bool,    // replaying a row for a pattern delay
    delay            : usize,
    delay_set        : bool,
    jump             : Option<usize>,
    brk              : Option<usize>,
    loop_to          : Option<usize>,
    entered          : bool,    // a new order position started
}

impl Sequencer {
    pub fn new(song: &Song, behavior: LoopBehavior) -> Self {
        let mut seq = Sequencer {
            pos          : 0,
            row          : 0,
            tick         : 0,
            speed        : song.speed as usize,
            tempo        : song.tempo as usize,
            global_volume: song.global_volume as i32,
            loops        : 0,
            behavior,
            finished     : false,
            repeat       : false,
            delay        : 0,
            delay_set    : false,
            jump         : None,
            brk          : None,
            loop_to      : None,
            entered      : false,
        };
        seq.reset(song);
        seq
    }

    pub fn reset(&mut self, song: &Song) {
        self.tick = 0;
        self.speed = song.speed.max(1) as usize;
        self.set_tempo(song.tempo as usize);
        self.global_volume = (song.global_volume as i32).min(128);
        self.loops = 0;
        self.finished = false;
        self.repeat = false;
        self.delay = 0;
        self.delay_set = false;
        self.jump = None;
        self.brk = None;
        self.loop_to = None;
        self.row = 0;
        self.pos = 0;
        self.next_position(song, 0, 0, false);
    }

    /// Move to a row of an order position. Timing and global parameters
    /// are reset to the song defaults.
    pub fn seek(&mut self, song: &Song, pos: usize, row: usize) -> Result<(), Error> {
        let rows = match song.orders.get(pos) {
            Some(Order::Pattern(_)) => song.pattern_at(pos).map_or(0, |p| p.rows),
            Some(Order::Skip)       => return Err(Error::InvalidOperation(format!("position {} is a skip marker", pos))),
            None => return Err(Error::InvalidOperation(format!("position {} out of range (song length {})", pos, song.len()))),
        };
        if row >= rows {
            return Err(Error::InvalidOperation(format!("row {} out of range (pattern has {} rows)", row, rows)))
        }
        self.reset(song);
        self.pos = pos;
        self.row = row;
        debug!("seek to position {}, row {}", pos, row);
        Ok(())
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn at_row_start(&self) -> bool {
        self.tick == 0 && !self.repeat
    }

    pub fn pattern(&self, song: &Song) -> Option<usize> {
        match song.orders.get(self.pos) {
            Some(Order::Pattern(p)) => Some(*p),
            _                       => None,
        }
    }

    fn rows(&self, song: &Song) -> usize {
        song.pattern_at(self.pos).map_or(0, |p| p.rows)
    }

    // frame rate = (50 * tempo / 125) Hz
    pub fn frames_per_tick(&self, rate: u32) -> usize {
        rate as usize * 5 / (2 * self.tempo)
    }

    pub fn set_tempo(&mut self, tempo: usize) {
        self.tempo = tempo.max(MIN_TEMPO as usize);
    }

    pub fn jump(&mut self, pos: usize) {
        self.jump = Some(pos);
    }

    pub fn pattern_break(&mut self, row: usize) {
        self.brk = Some(row);
    }

    pub fn loop_to(&mut self, row: usize) {
        self.loop_to = Some(row);
    }

    pub fn set_pattern_delay(&mut self, rows: usize) {
        if !self.delay_set {
            self.delay = rows;
            self.delay_set = true;
        }
    }

    /// Run the effects of the current tick on every channel, reading the
    /// pattern row first if the tick starts one.
    pub fn process(&mut self, song: &Song, channels: &mut [Channel]) {
        if self.finished {
            return
        }
        let pat = match song.pattern_at(self.pos) {
            Some(p) if self.row < p.rows => p,
            _ => {
                warn!("invalid position {}/{}, stopping", self.pos, self.row);
                self.finish();
                return
            }
        };

        if self.at_row_start() {
            if self.entered {
                for ch in channels.iter_mut() {
                    ch.loop_row = 0;
                    ch.loop_count = 0;
                }
                self.entered = false;
            }
            for (c, ch) in channels.iter_mut().enumerate().take(pat.channels) {
                let e = *pat.event(self.row, c);
                effects::row(song, self, ch, e);
            }
        } else {
            for ch in channels.iter_mut() {
                effects::tick(song, self, ch);
            }
        }
    }

    /// Move to the next tick, row or order position.
    pub fn advance(&mut self, song: &Song) {
        if self.finished {
            return
        }
        self.tick += 1;
        if self.tick < self.speed {
            return
        }
        self.tick = 0;
        if self.delay > 0 {
            self.delay -= 1;
            self.repeat = true;
            return
        }
        self.repeat = false;
        self.delay_set = false;
        self.next_row(song);
    }

    fn next_row(&mut self, song: &Song) {
        if let Some(row) = self.loop_to.take() {
            self.jump = None;
            self.brk = None;
            self.row = row.min(self.rows(song).saturating_sub(1));
            return
        }

        let jump = self.jump.take();
        let brk = self.brk.take();
        if jump.is_none() && brk.is_none() {
            self.row += 1;
            if self.row < self.rows(song) {
                return
            }
            let next = self.pos + 1;
            self.next_position(song, next, 0, false);
            return
        }

        let target = jump.unwrap_or(self.pos + 1);
        let backward = jump.is_some() && target <= self.pos;
        self.next_position(song, target, brk.unwrap_or(0), backward);
    }

    fn next_position(&mut self, song: &Song, mut pos: usize, row: usize, backward: bool) {
        if backward {
            if self.behavior == LoopBehavior::StopAtEnd {
                self.finish();
                return
            }
            self.loops += 1;
        }

        let mut wrapped = false;
        loop {
            while pos < song.orders.len() && song.orders[pos] == Order::Skip {
                pos += 1;
            }
            if pos < song.orders.len() {
                break
            }
            if wrapped {
                self.finish();
                return
            }
            wrapped = true;
            pos = match (self.behavior, song.restart) {
                (LoopBehavior::HonorLoopPoint, Some(r)) => r,
                (LoopBehavior::InfiniteLoop, r)         => r.unwrap_or(0),
                _ => {
                    self.finish();
                    return
                }
            };
            self.loops += 1;
            debug!("end of order list, restarting at position {}", pos);
        }

        self.pos = pos;
        self.row = if row < self.rows(song) { row } else { 0 };
        self.entered = true;
    }

    fn finish(&mut self) {
        if !self.finished {
            debug!("sequencer finished at position {}, row {}", self.pos, self.row);
        }
        self.finished = true;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::module::{Effect, Instrument, Pattern, Sample};

    fn test_song(num_orders: usize) -> Song {
        let mut song = Song::new(Format::Mod);
        song.channels = 2;
        song.channel_pan = vec![0, 255];
        song.channel_volume = vec![64; 2];
        song.orders = (0..num_orders).map(Order::Pattern).collect();
        for _ in 0..num_orders {
            song.patterns.push(Pattern::new(4, 2));
        }
        let mut smp = Sample::new();
        smp.store(&[0; 16], 16, Default::default()).unwrap();
        song.samples.push(smp);
        song.instruments.push(Instrument::from_sample(1, "", 0));
        song
    }

    // Play until the end, returning the (pos, row) sequence of started rows.
    fn play(song: &Song, behavior: LoopBehavior, max_rows: usize) -> (Vec<(usize, usize)>, Sequencer) {
        let mut seq = Sequencer::new(song, behavior);
        let mut channels: Vec<Channel> = (0..song.channels).map(|i| Channel::new(i, song)).collect();
        let mut rows = Vec::new();
        while !seq.finished() && rows.len() < max_rows {
            if seq.at_row_start() {
                rows.push((seq.pos, seq.row));
            }
            seq.process(song, &mut channels);
            seq.advance(song);
        }
        (rows, seq)
    }

    #[test]
    fn test_linear_playback() {
        let song = test_song(2);
        let (rows, seq) = play(&song, LoopBehavior::HonorLoopPoint, 100);
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[4], (1, 0));
        assert!(seq.finished());
    }

    #[test]
    fn test_skip_markers() {
        let mut song = test_song(2);
        song.orders.insert(1, Order::Skip);
        let (rows, _) = play(&song, LoopBehavior::StopAtEnd, 100);
        assert_eq!(rows[4], (2, 0));
    }

    #[test]
    fn test_break_and_jump() {
        let mut song = test_song(3);
        song.patterns[0].event_mut(1, 0).effect = Effect::PatternBreak(2);
        song.patterns[1].event_mut(2, 1).effect = Effect::PositionJump(0);
        let (rows, _) = play(&song, LoopBehavior::StopAtEnd, 100);
        assert_eq!(rows, vec![(0, 0), (0, 1), (1, 2)]);

        let (rows, seq) = play(&song, LoopBehavior::HonorLoopPoint, 6);
        assert_eq!(rows, vec![(0, 0), (0, 1), (1, 2), (0, 0), (0, 1), (1, 2)]);
        assert!(seq.loops > 0);
    }

    #[test]
    fn test_restart_position() {
        let mut song = test_song(2);
        song.restart = Some(1);
        let (rows, _) = play(&song, LoopBehavior::HonorLoopPoint, 10);
        assert_eq!(rows[8], (1, 0));

        let (rows, _) = play(&song, LoopBehavior::StopAtEnd, 100);
        assert_eq!(rows.len(), 8);

        song.restart = None;
        let (rows, _) = play(&song, LoopBehavior::InfiniteLoop, 10);
        assert_eq!(rows[8], (0, 0));
    }

    #[test]
    fn test_pattern_loop() {
        let mut song = test_song(1);
        song.patterns[0].event_mut(1, 0).effect = Effect::PatternLoop(0);
        song.patterns[0].event_mut(2, 0).effect = Effect::PatternLoop(2);
        let (rows, _) = play(&song, LoopBehavior::StopAtEnd, 100);
        let rows: Vec<usize> = rows.iter().map(|r| r.1).collect();
        assert_eq!(rows, vec![0, 1, 2, 1, 2, 1, 2, 3]);
    }

    #[test]
    fn test_pattern_loop_across_patterns() {
        let mut song = test_song(3);
        song.patterns[0] = Pattern::new(8, 2);
        song.patterns[0].event_mut(5, 0).effect = Effect::PatternLoop(0);
        song.patterns[1].event_mut(2, 0).effect = Effect::PatternLoop(1);
        let (rows, seq) = play(&song, LoopBehavior::StopAtEnd, 100);
        let mut expected: Vec<(usize, usize)> = (0..8).map(|r| (0, r)).collect();
        expected.extend(&[(1, 0), (1, 1), (1, 2), (1, 0), (1, 1), (1, 2), (1, 3)]);
        expected.extend((0..4).map(|r| (2, r)));
        assert_eq!(rows, expected);
        assert!(seq.finished());
    }

    #[test]
    fn test_loop_target_clamped_to_pattern() {
        let mut song = test_song(2);
        song.patterns[0].event_mut(0, 0).effect = Effect::SetSpeed(1);
        let mut seq = Sequencer::new(&song, LoopBehavior::StopAtEnd);
        let mut channels: Vec<Channel> = (0..2).map(|i| Channel::new(i, &song)).collect();
        seq.process(&song, &mut channels);
        seq.loop_to(10);
        seq.advance(&song);
        assert_eq!((seq.pos, seq.row), (0, 3));
        seq.process(&song, &mut channels);
        assert!(!seq.finished());
    }

    #[test]
    fn test_pattern_delay_and_speed() {
        let mut song = test_song(1);
        song.patterns[0].event_mut(0, 0).effect = Effect::PatternDelay(2);
        song.patterns[0].event_mut(0, 1).effect = Effect::SetSpeed(3);
        let mut seq = Sequencer::new(&song, LoopBehavior::StopAtEnd);
        let mut channels: Vec<Channel> = (0..2).map(|i| Channel::new(i, &song)).collect();
        let mut ticks = 0;
        while seq.row == 0 && !seq.finished() {
            seq.process(&song, &mut channels);
            seq.advance(&song);
            ticks += 1;
        }
        assert_eq!(ticks, 9);
        assert_eq!(seq.speed, 3);
    }

    #[test]
    fn test_seek_and_tempo() {
        let song = test_song(2);
        let mut seq = Sequencer::new(&song, LoopBehavior::HonorLoopPoint);
        assert!(seq.seek(&song, 1, 3).is_ok());
        assert_eq!((seq.pos, seq.row), (1, 3));
        assert!(seq.seek(&song, 2, 0).is_err());
        assert!(seq.seek(&song, 0, 4).is_err());

        assert_eq!(seq.frames_per_tick(44100), 882);
        assert_eq!(seq.frames_per_tick(8363), 167);
        seq.set_tempo(10);
        assert_eq!(seq.tempo, 32);
    }
}
