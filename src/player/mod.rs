mod channel;
mod effects;
mod envelope;
mod scan;
mod sequencer;

pub use self::scan::{scan, ScanData, ScanPos};

use std::cmp;
use std::fmt;
use std::mem;
use std::sync::mpsc::{self, Receiver, Sender};
use crate::driver::Output;
use crate::mixer::{Mixer, VOL_SHIFT};
use crate::module::{Order, Sample, Song};
use crate::options::Options;
use crate::util::{note_to_period, period_shift, period_to_note, period_to_step};
use crate::Error;
use self::channel::{Channel, Lfo};
use self::sequencer::Sequencer;

// bits of volume precision before scaling down to the mixer range:
// note 6, channel 6, global 7, envelope 6, sample 6, instrument 7, fade 16
const VOLUME_BITS: u32 = 6 + 6 + 7 + 6 + 6 + 7 + 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
    Paused,
    Finished,
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            PlayState::Stopped  => "stopped",
            PlayState::Playing  => "playing",
            PlayState::Paused   => "paused",
            PlayState::Finished => "finished",
        };
        write!(f, "{}", s)
    }
}

/// Control requests queued by a `Controller` and executed at the start of
/// the next render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Stop,
    Seek { pos: usize, row: usize },
    NextPosition,
    PrevPosition,
    SetVolume(u8),
    Mute(usize),
    Unmute(usize),
    ToggleMute(usize),
}

/// Sending half of a player's command queue, usable from another thread.
#[derive(Debug, Clone)]
pub struct Controller {
    tx: Sender<Command>,
}

impl Controller {
    pub fn send(&self, cmd: Command) -> Result<(), Error> {
        self.tx.send(cmd).map_err(|_| Error::InvalidOperation("player session is gone".to_owned()))
    }
}


#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub pos          : usize,
    pub row          : usize,
    pub tick         : usize,
    pub speed        : usize,
    pub tempo        : usize,
    pub global_volume: i32,
    pub pattern      : Option<usize>,
    pub state        : PlayState,
    pub frames       : u64,   // frames played since the start of the song
    pub time         : u64,   // same, in milliseconds
}


pub struct Player {
    song         : Song,
    opts         : Options,
    seq          : Sequencer,
    channels     : Vec<Channel>,
    mixer        : Mixer,
    scan         : ScanData,
    state        : PlayState,
    muted        : Vec<bool>,
    frames_played: u64,
    tx           : Sender<Command>,
    rx           : Receiver<Command>,
    scratch      : Vec<i16>,

    // for buffer fill
    consumed     : usize,
    in_size      : usize,
}

impl Player {
    pub fn new(song: Song, opts: Options) -> Result<Self, Error> {
        opts.check()?;
        song.validate()?;

        let seq = Sequencer::new(&song, opts.loop_behavior);
        let channels = (0..song.channels).map(|i| Channel::new(i, &song)).collect();
        let mixer = Mixer::new(song.channels, &opts);
        let scan = scan::scan(&song, opts.rate, opts.loop_behavior);
        let (tx, rx) = mpsc::channel();

        info!("new player: {} Hz, {} channel output, {} interpolation, duration {} ms",
              opts.rate, opts.channels.count(), mixer.interpolator().name(), scan.millis());

        Ok(Player {
            muted        : vec![false; song.channels],
            song,
            opts,
            seq,
            channels,
            mixer,
            scan,
            state        : PlayState::Stopped,
            frames_played: 0,
            tx,
            rx,
            scratch      : Vec::new(),
            consumed     : 0,
            in_size      : 0,
        })
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Song duration and per-position timing found by dry-running the song.
    pub fn scan_data(&self) -> &ScanData {
        &self.scan
    }

    pub fn frames_played(&self) -> u64 {
        self.frames_played
    }

    pub fn controller(&self) -> Controller {
        Controller { tx: self.tx.clone() }
    }

    /// Playback position of a voice inside its sample, in frames.
    pub fn voice_position(&self, voice: usize) -> f64 {
        self.mixer.voicepos(voice)
    }

    pub fn info(&self) -> FrameInfo {
        FrameInfo {
            pos          : self.seq.pos,
            row          : self.seq.row,
            tick         : self.seq.tick,
            speed        : self.seq.speed,
            tempo        : self.seq.tempo,
            global_volume: self.seq.global_volume,
            pattern      : self.seq.pattern(&self.song),
            state        : self.state,
            frames       : self.frames_played,
            time         : self.frames_played * 1000 / self.opts.rate as u64,
        }
    }

    pub fn play(&mut self) -> Result<(), Error> {
        match self.state {
            PlayState::Playing => return Ok(()),
            PlayState::Finished => {
                let first = self.first_position();
                self.restart(first, 0)?
            }
            _ => (),
        }
        debug!("{} -> playing", self.state);
        self.state = PlayState::Playing;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), Error> {
        if self.state != PlayState::Playing {
            return Err(Error::InvalidOperation(format!("can't pause, player is {}", self.state)))
        }
        debug!("playing -> paused");
        self.state = PlayState::Paused;
        Ok(())
    }

    /// Stop playback and rewind to the start of the song.
    pub fn stop(&mut self) {
        let first = self.first_position();
        if let Err(e) = self.restart(first, 0) {
            warn!("can't rewind: {}", e);
        }
        debug!("{} -> stopped", self.state);
        self.state = PlayState::Stopped;
    }

    /// Jump to a row of an order position, resetting every channel. A
    /// finished session becomes stopped.
    pub fn seek(&mut self, pos: usize, row: usize) -> Result<(), Error> {
        self.restart(pos, row)?;
        if self.state == PlayState::Finished {
            self.state = PlayState::Stopped;
        }
        Ok(())
    }

    pub fn next_position(&mut self) -> Result<(), Error> {
        let pos = (self.seq.pos + 1..self.song.len()).find(|&p| self.song.orders[p] != Order::Skip);
        match pos {
            Some(p) => self.seek(p, 0),
            None    => Err(Error::InvalidOperation("already at the last position".to_owned())),
        }
    }

    pub fn prev_position(&mut self) -> Result<(), Error> {
        let pos = (0..self.seq.pos).rev().find(|&p| self.song.orders[p] != Order::Skip);
        match pos {
            Some(p) => self.seek(p, 0),
            None    => Err(Error::InvalidOperation("already at the first position".to_owned())),
        }
    }

    pub fn set_volume(&mut self, vol: u8) -> Result<(), Error> {
        if vol > 128 {
            return Err(Error::InvalidOperation(format!("master volume {} out of range (0-128)", vol)))
        }
        self.mixer.set_master_volume(vol);
        Ok(())
    }

    pub fn volume(&self) -> u8 {
        self.mixer.master_volume()
    }

    pub fn mute(&mut self, chn: usize, mute: bool) -> Result<(), Error> {
        match self.muted.get_mut(chn) {
            Some(m) => { *m = mute; Ok(()) }
            None    => Err(Error::InvalidOperation(format!("channel {} out of range", chn))),
        }
    }

    pub fn toggle_mute(&mut self, chn: usize) -> Result<(), Error> {
        let m = self.is_muted(chn);
        self.mute(chn, !m)
    }

    pub fn is_muted(&self, chn: usize) -> bool {
        self.muted.get(chn).cloned().unwrap_or(false)
    }

    pub fn execute(&mut self, cmd: Command) -> Result<(), Error> {
        match cmd {
            Command::Play            => self.play(),
            Command::Pause           => self.pause(),
            Command::Stop            => { self.stop(); Ok(()) }
            Command::Seek { pos, row } => self.seek(pos, row),
            Command::NextPosition    => self.next_position(),
            Command::PrevPosition    => self.prev_position(),
            Command::SetVolume(v)    => self.set_volume(v),
            Command::Mute(c)         => self.mute(c, true),
            Command::Unmute(c)       => self.mute(c, false),
            Command::ToggleMute(c)   => self.toggle_mute(c),
        }
    }

    fn process_commands(&mut self) {
        while let Ok(cmd) = self.rx.try_recv() {
            if let Err(e) = self.execute(cmd) {
                warn!("{:?}: {}", cmd, e);
            }
        }
    }

    fn first_position(&self) -> usize {
        self.song.orders.iter().position(|o| *o != Order::Skip).unwrap_or(0)
    }

    fn restart(&mut self, pos: usize, row: usize) -> Result<(), Error> {
        self.seq.seek(&self.song, pos, row)?;
        let song = &self.song;
        self.channels = (0..song.channels).map(|i| Channel::new(i, song)).collect();
        self.mixer.reset();
        self.consumed = 0;
        self.in_size = 0;
        self.frames_played = 0;
        if let Some(p) = self.scan.at(pos, row) {
            self.seq.speed = p.speed;
            self.seq.set_tempo(p.tempo);
            self.seq.global_volume = p.global_volume;
            self.frames_played = p.frame;
        }
        Ok(())
    }

    /// Render into `out`, which holds interleaved samples for the configured
    /// output channels. Returns the number of frames written. Sessions that
    /// are not playing produce silence.
    pub fn render_into(&mut self, out: &mut [i16]) -> Result<usize, Error> {
        let chn = self.mixer.output_channels();
        if out.len() % chn != 0 {
            return Err(Error::InvalidOperation(format!("buffer size {} is not a multiple of {} channels", out.len(), chn)))
        }

        self.process_commands();

        if self.state == PlayState::Playing {
            self.fill_buffer(out);
        } else {
            for x in out.iter_mut() {
                *x = 0;
            }
        }
        Ok(out.len() / chn)
    }

    pub fn render(&mut self, frames: usize) -> Result<Vec<i16>, Error> {
        let mut buf = vec![0; frames * self.mixer.output_channels()];
        self.render_into(&mut buf)?;
        Ok(buf)
    }

    /// Render and push into a driver output. A failing output stops the
    /// session.
    pub fn render_to(&mut self, out: &mut dyn Output, frames: usize) -> Result<usize, Error> {
        let mut buf = mem::replace(&mut self.scratch, Vec::new());
        buf.resize(frames * self.mixer.output_channels(), 0);
        let res = self.render_into(&mut buf);
        let res = match res {
            Ok(n) => match out.write(&buf) {
                Ok(())  => Ok(n),
                Err(e) => {
                    error!("output failed: {}", e);
                    self.stop();
                    Err(match e {
                        Error::Driver(_) => e,
                        other            => Error::Driver(other.to_string()),
                    })
                }
            },
            Err(e) => Err(e),
        };
        self.scratch = buf;
        res
    }

    fn fill_buffer(&mut self, out: &mut [i16]) {
        let chn = self.mixer.output_channels();
        let size = out.len();
        let mut filled = 0;

        while filled < size {
            // Check if buffer full
            if self.consumed == self.in_size {
                if !self.play_tick() {
                    info!("end of song at {} ms", self.frames_played * 1000 / self.opts.rate as u64);
                    self.state = PlayState::Finished;
                    for x in out[filled..].iter_mut() {
                        *x = 0;
                    }
                    return
                }
                self.consumed = 0;
                self.in_size = self.mixer.buffer().len();
            }

            // Copy tick data to user buffer
            let copy_size = cmp::min(size - filled, self.in_size - self.consumed);
            out[filled..filled + copy_size].copy_from_slice(&self.mixer.buffer()[self.consumed..self.consumed + copy_size]);
            self.consumed += copy_size;
            self.frames_played += (copy_size / chn) as u64;
            filled += copy_size;
        }
    }

    fn play_tick(&mut self) -> bool {
        if self.seq.finished() {
            return false
        }
        self.seq.process(&self.song, &mut self.channels);
        if self.seq.finished() {
            return false
        }

        let rate = self.opts.rate;
        for (c, ch) in self.channels.iter_mut().enumerate() {
            update_voice(&self.song, &self.seq, &mut self.mixer, ch, c, self.muted[c], rate);
        }
        let frames = self.seq.frames_per_tick(rate);
        self.mixer.mix(&self.song.samples, frames);
        self.seq.advance(&self.song);
        true
    }
}


fn auto_vibrato(ch: &mut Channel, smp: &Sample) -> i32 {
    let av = &smp.vibrato;
    if av.depth == 0 || av.rate == 0 {
        return 0
    }
    ch.autovib_age += 1;
    let depth = if av.sweep > 0 && ch.autovib_age < av.sweep as u32 {
        av.depth as i32 * ch.autovib_age as i32 / av.sweep as i32
    } else {
        av.depth as i32
    };
    let lfo = Lfo {
        waveform: av.waveform,
        pos     : ch.autovib_pos >> 2,
        ..Lfo::new()
    };
    let v = lfo.value(&mut ch.rng);
    ch.autovib_pos = ch.autovib_pos.wrapping_add(av.rate);
    (v * depth) >> 6
}

// Send a channel's state for this tick to its mixer voice.
fn update_voice(song: &Song, seq: &Sequencer, mixer: &mut Mixer, ch: &mut Channel, voice: usize, muted: bool, rate: u32) {
    if ch.stop {
        mixer.stop(voice);
        ch.stop = false;
    }
    if let Some(offset) = ch.trigger.take() {
        if let Some(s) = ch.smp {
            mixer.set_sample(voice, s, &song.samples[s], offset);
        }
    }
    if ch.release {
        mixer.release(voice);
        ch.release = false;
    }

    let smp = match ch.smp.and_then(|s| song.samples.get(s)) {
        Some(s) => s,
        None    => return,
    };

    let mut env_vol = 64;
    let mut env_pan = 0;
    let mut ins_vol = 128;
    if let Some(ins) = ch.ins.and_then(|i| song.instruments.get(i)) {
        env_vol = ch.vol_env.value(&ins.vol_env, 64);
        env_pan = ch.pan_env.value(&ins.pan_env, 0);
        ins_vol = ins.volume as u64;
        ch.vol_env.advance(&ins.vol_env, ch.key_on);
        ch.pan_env.advance(&ins.pan_env, ch.key_on);
        if !ch.key_on && ins.vol_env.is_active() {
            ch.fading = true;
        }
        if ch.fading {
            ch.fade = ch.fade.saturating_sub(ins.fadeout);
            if ch.fade == 0 && ch.active {
                ch.active = false;
                mixer.stop(voice);
            }
        }
    }

    // Volume
    let mut vol = (ch.volume + ch.trem_delta).max(0).min(64) as u64;
    if !ch.tremor_on || muted {
        vol = 0;
    }
    let v = vol
        * ch.chn_volume.max(0).min(64) as u64
        * seq.global_volume.max(0).min(128) as u64
        * env_vol.max(0).min(64) as u64
        * smp.global_volume.min(64) as u64
        * ins_vol.min(128);
    let v = (v * ch.fade as u64) >> (VOLUME_BITS - VOL_SHIFT as u32);
    mixer.set_volume(voice, v as u32);

    // Pan
    let mut pan = ch.pan;
    if env_pan != 0 {
        pan += env_pan * (128 - (pan - 128).abs()) / 32;
    }
    mixer.set_pan(voice, pan.max(0).min(255) as u8);

    // Pitch
    if ch.period <= 0 {
        mixer.set_step(voice, 0);
        return
    }
    let pt = song.period_type;
    let mut period = ch.period;
    if ch.glissando {
        period = note_to_period(period_to_note(period, pt), ch.finetune, pt);
    }
    if ch.arp != 0 {
        period = period_shift(period, ch.arp, pt);
    }
    period += ch.vib_delta + auto_vibrato(ch, smp);
    mixer.set_step(voice, period_to_step(period.max(1), smp.rate, rate, pt));
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::NullOutput;
    use crate::mixer::Interpolator;
    use crate::options::{LoopBehavior, OutputChannels};
    use crate::testutil;

    fn player(b: &[u8], opts: Options) -> Player {
        let song = crate::load_song(b).unwrap();
        Player::new(song, opts).unwrap()
    }

    fn low_rate() -> Options {
        Options { rate: 8000, ..Default::default() }
    }

    struct FailingOutput;

    impl Output for FailingOutput {
        fn write(&mut self, _buf: &[i16]) -> Result<(), Error> {
            Err(Error::Driver("device unplugged".to_owned()))
        }

        fn close(&mut self) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn test_render_exact_frames() {
        let mut p = player(&testutil::build_mod(), Default::default());
        p.play().unwrap();
        for &n in &[1, 100, 881, 882, 5000] {
            assert_eq!(p.render(n).unwrap().len(), n * 2);
        }
        let mut odd = vec![0; 11];
        match p.render_into(&mut odd) {
            Err(Error::InvalidOperation(_)) => (),
            _ => panic!("expected invalid operation"),
        }

        let opts = Options { channels: OutputChannels::Mono, ..Default::default() };
        let mut p = player(&testutil::build_mod(), opts);
        p.play().unwrap();
        assert_eq!(p.render(300).unwrap().len(), 300);
    }

    #[test]
    fn test_every_format_plays() {
        for b in testutil::all_formats() {
            let mut p = player(&b, low_rate());
            p.play().unwrap();
            let buf = p.render(2000).unwrap();
            assert!(buf.iter().any(|&x| x != 0), "{} is silent", p.song().format);
        }
    }

    #[test]
    fn test_silence_when_not_playing() {
        let mut p = player(&testutil::build_mod(), low_rate());
        assert_eq!(p.state(), PlayState::Stopped);
        let buf = p.render(500).unwrap();
        assert_eq!(buf.len(), 1000);
        assert!(buf.iter().all(|&x| x == 0));

        p.play().unwrap();
        p.render(500).unwrap();
        p.pause().unwrap();
        assert!(p.render(500).unwrap().iter().all(|&x| x == 0));
    }

    #[test]
    fn test_duration_matches_scan() {
        for b in testutil::all_formats() {
            let mut p = player(&b, low_rate());
            p.play().unwrap();
            let mut rendered = 0;
            while p.state() == PlayState::Playing {
                p.render(1000).unwrap();
                rendered += 1000;
                assert!(rendered < 10_000_000);
            }
            assert_eq!(p.state(), PlayState::Finished);
            let expected = p.scan_data().frames;
            let tick = p.info().tempo;
            let tolerance = (8000 * 5 / (2 * tick)) as u64;
            let played = p.frames_played();
            assert!(played + tolerance >= expected && played <= expected + tolerance,
                    "played {} frames, expected {}", played, expected);

            let buf = p.render(1000).unwrap();
            assert!(buf.iter().all(|&x| x == 0));
        }
    }

    #[test]
    fn test_seek_is_deterministic() {
        for b in testutil::all_formats() {
            let mut fresh = player(&b, low_rate());
            fresh.play().unwrap();
            let expected = fresh.render(6000).unwrap();

            let mut p = player(&b, low_rate());
            p.play().unwrap();
            p.render(3333).unwrap();
            p.seek(0, 0).unwrap();
            assert_eq!(p.frames_played(), 0);
            assert!(p.render(6000).unwrap() == expected);
        }
    }

    #[test]
    fn test_voice_position_after_one_row() {
        let opts = Options {
            rate         : 8363,
            interpolation: Interpolator::Nearest,
            ..Default::default()
        };
        let mut p = player(&testutil::build_mod(), opts);
        p.play().unwrap();
        let info = p.info();
        assert_eq!((info.speed, info.tempo), (6, 125));
        p.render(167 * 6).unwrap();
        assert_eq!(p.voice_position(0), 1002.0);
        assert_eq!(p.info().row, 1);
    }

    #[test]
    fn test_key_off_fades_and_stops_voice() {
        let mut song = crate::load_song(&testutil::build_xm()).unwrap();
        song.instruments[0].fadeout = 16384;
        let mut p = Player::new(song, low_rate()).unwrap();
        p.play().unwrap();

        // one tick is 160 frames at 8000 Hz
        let mut peaks = Vec::new();
        for _ in 0..10 {
            let buf = p.render(160).unwrap();
            peaks.push(buf.iter().map(|&x| (x as i32).abs()).max().unwrap_or(0));
        }
        let ch = &p.channels[0];
        assert!(!ch.key_on);
        assert!(ch.fading);
        assert_eq!(ch.fade, 0);
        assert!(!ch.active);
        assert!(!p.mixer.is_active(0));

        // key off on row 1 starts the fade: 49152, 32768, 16384, then silence
        assert!(peaks[5] > 0);
        assert!(peaks[6] > peaks[7]);
        assert!(peaks[7] > peaks[8]);
        assert!(peaks[8] > 0);
        assert_eq!(peaks[9], 0);
    }

    #[test]
    fn test_fade_restarts_on_new_note() {
        let mut song = crate::load_song(&testutil::build_xm()).unwrap();
        song.instruments[0].fadeout = 1024;
        let mut p = Player::new(song, low_rate()).unwrap();
        p.play().unwrap();
        p.render(160 * 8).unwrap();
        assert_eq!(p.channels[0].fade, channel::FADE_FULL - 2 * 1024);

        p.seek(0, 0).unwrap();
        p.render(160).unwrap();
        assert!(p.channels[0].key_on);
        assert_eq!(p.channels[0].fade, channel::FADE_FULL);
    }

    #[test]
    fn test_seek_restores_row_time() {
        let mut p = player(&testutil::build_mod(), low_rate());
        p.seek(0, 10).unwrap();
        // 10 rows of 6 ticks, 160 frames each
        assert_eq!(p.frames_played(), 10 * 6 * 160);
        assert_eq!(p.info().time, 1200);

        p.play().unwrap();
        while p.state() == PlayState::Playing {
            p.render(1000).unwrap();
        }
        assert_eq!(p.frames_played(), p.scan_data().frames);
    }

    #[test]
    fn test_invalid_operations() {
        let mut p = player(&testutil::build_mod(), low_rate());
        assert!(p.pause().is_err());
        assert!(p.seek(99, 0).is_err());
        assert!(p.seek(0, 64).is_err());
        assert!(p.mute(4, true).is_err());
        assert!(p.set_volume(129).is_err());
        assert!(p.prev_position().is_err());
        assert!(p.next_position().is_err());

        let song = crate::load_song(&testutil::build_mod()).unwrap();
        let opts = Options { rate: 200_000, ..Default::default() };
        assert!(Player::new(song, opts).is_err());
    }

    #[test]
    fn test_controller_commands() {
        let mut p = player(&testutil::build_mod(), low_rate());
        let ctl = p.controller();
        ctl.send(Command::Play).unwrap();
        assert_eq!(p.state(), PlayState::Stopped);
        p.render(10).unwrap();
        assert_eq!(p.state(), PlayState::Playing);

        ctl.send(Command::Seek { pos: 5, row: 0 }).unwrap();
        ctl.send(Command::ToggleMute(1)).unwrap();
        ctl.send(Command::SetVolume(64)).unwrap();
        p.render(10).unwrap();
        assert!(p.is_muted(1));
        assert_eq!(p.volume(), 64);

        ctl.send(Command::Stop).unwrap();
        p.render(10).unwrap();
        assert_eq!(p.state(), PlayState::Stopped);
        assert_eq!(p.frames_played(), 0);

        drop(p);
        assert!(ctl.send(Command::Play).is_err());
    }

    #[test]
    fn test_mute_silences_channel() {
        let mut p = player(&testutil::build_mod(), low_rate());
        p.mute(0, true).unwrap();
        p.play().unwrap();
        assert!(p.render(2000).unwrap().iter().all(|&x| x == 0));
    }

    #[test]
    fn test_render_to_output() {
        let mut p = player(&testutil::build_mod(), low_rate());
        p.play().unwrap();
        let mut out = NullOutput::new(8000, 2).unwrap();
        assert_eq!(p.render_to(&mut out, 1500).unwrap(), 1500);
        assert_eq!(out.frames(), 1500);

        match p.render_to(&mut FailingOutput, 100) {
            Err(Error::Driver(_)) => (),
            _ => panic!("expected driver error"),
        }
        assert_eq!(p.state(), PlayState::Stopped);
    }

    #[test]
    fn test_finished_session_restarts() {
        let opts = Options { loop_behavior: LoopBehavior::StopAtEnd, ..low_rate() };
        let mut p = player(&testutil::build_s3m(), opts);
        p.play().unwrap();
        while p.state() == PlayState::Playing {
            p.render(4000).unwrap();
        }
        assert_eq!(p.state(), PlayState::Finished);
        p.play().unwrap();
        assert_eq!(p.info().pos, 0);
        assert!(p.render(2000).unwrap().iter().any(|&x| x != 0));
    }
}
