use std::fmt;
use crate::util::note_name;

/// Note column of a pattern cell, already mapped to the engine's
/// note numbering (0..119, 60 = C-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    None,
    On(u8),
    Off,
    Cut,
    Fade,
}

/// Effect commands normalized across formats. Parameters are kept raw:
/// a zero parameter may recall effect memory and the slide encodings
/// depend on the song quirks, so decoding happens at play time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Arpeggio(u8),
    PortaUp(u8),
    PortaDown(u8),
    FinePortaUp(u8),
    FinePortaDown(u8),
    ExtraFinePortaUp(u8),
    ExtraFinePortaDown(u8),
    TonePorta(u8),
    TonePortaVolSlide(u8),
    Vibrato(u8),
    FineVibrato(u8),
    VibratoVolSlide(u8),
    Tremolo(u8),
    Tremor(u8),
    VolumeSlide(u8),
    FineVolSlideUp(u8),
    FineVolSlideDown(u8),
    SetVolume(u8),
    SetPan(u8),
    PanSlide(u8),
    SampleOffset(u8),
    Retrig(u8),
    MultiRetrig(u8),
    NoteCut(u8),
    NoteDelay(u8),
    PatternDelay(u8),
    PatternLoop(u8),
    PositionJump(u8),
    PatternBreak(u8),
    SetSpeed(u8),
    SetTempo(u8),
    TempoSlide(u8),
    SetGlobalVolume(u8),
    GlobalVolSlide(u8),
    SetChannelVolume(u8),
    ChannelVolSlide(u8),
    KeyOff(u8),
    SetEnvPosition(u8),
    SetFinetune(u8),
    Glissando(u8),
    VibratoWaveform(u8),
    TremoloWaveform(u8),
}

/// Volume column commands (S3M, XM and IT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeCommand {
    None,
    SetVolume(u8),
    SetPan(u8),
    SlideUp(u8),
    SlideDown(u8),
    FineUp(u8),
    FineDown(u8),
    PanSlideLeft(u8),
    PanSlideRight(u8),
    VibratoSpeed(u8),
    VibratoDepth(u8),
    TonePorta(u8),
    PortaUp(u8),
    PortaDown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub note  : Note,
    pub ins   : u8,     // 1-based, 0 = none
    pub vol   : VolumeCommand,
    pub effect: Effect,
}

impl Event {
    pub fn new() -> Self {
        Event {
            note  : Note::None,
            ins   : 0,
            vol   : VolumeCommand::None,
            effect: Effect::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Event::new()
    }
}

impl Default for Event {
    fn default() -> Self {
        Event::new()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let note = match self.note {
            Note::None  => "---".to_owned(),
            Note::On(n) => note_name(n),
            Note::Off   => "===".to_owned(),
            Note::Cut   => "^^^".to_owned(),
            Note::Fade  => "~~~".to_owned(),
        };

        let ins = if self.ins == 0 {
            "--".to_owned()
        } else {
            format!("{:02x}", self.ins)
        };

        let vol = match self.vol {
            VolumeCommand::None         => "--".to_owned(),
            VolumeCommand::SetVolume(v) => format!("{:02x}", v),
            _                           => "vc".to_owned(),
        };

        let fx = if self.effect == Effect::None {
            "...".to_owned()
        } else {
            format!("{:?}", self.effect)
        };

        write!(f, "{} {} {} {}", note, ins, vol, fx)
    }
}
