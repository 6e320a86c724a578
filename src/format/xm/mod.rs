pub mod load;

pub use self::load::*;

use crate::module::{Effect, Note, VolumeCommand};

// Fast Tracker II extended module, version 0x0104.
//
//                                  XM song header
//          0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
//        ,---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---.
//  0000: | 'Extended Module: '                                           |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0010: |   | Module name, 20 chars                                     |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0020: |               |1Ah| Tracker name, 20 chars                    |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0030: |                                       |Version| Header size   |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0040: |SongLen|Restart|NumChn |NumPat |NumIns | Flags |Speed  | BPM   |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0050: | Pattern order table, 256 bytes                                |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//
// Patterns follow the header (at offset 60 + header size), then the
// instruments. Each instrument is followed by its sample headers and then
// by the delta encoded data of its samples.

pub const LINEAR_FREQ: u16 = 0x01;
pub const KEY_OFF: u8 = 97;

/// Maps an XM note byte (1..96, 97 = key off) to the engine's note numbering.
pub fn note(b: u8) -> Note {
    match b {
        0          => Note::None,
        1..=96     => Note::On(b - 1 + 12),
        KEY_OFF    => Note::Off,
        _          => Note::None,
    }
}

pub fn volume(v: u8) -> VolumeCommand {
    let x = v & 0x0f;
    match v >> 4 {
        0x1..=0x4 => VolumeCommand::SetVolume(v - 0x10),
        0x5 if v == 0x50 => VolumeCommand::SetVolume(64),
        0x6 => VolumeCommand::SlideDown(x),
        0x7 => VolumeCommand::SlideUp(x),
        0x8 => VolumeCommand::FineDown(x),
        0x9 => VolumeCommand::FineUp(x),
        0xa => VolumeCommand::VibratoSpeed(x),
        0xb => VolumeCommand::VibratoDepth(x),
        0xc => VolumeCommand::SetPan(x * 17),
        0xd => VolumeCommand::PanSlideLeft(x),
        0xe => VolumeCommand::PanSlideRight(x),
        0xf => VolumeCommand::TonePorta(x << 4),
        _   => VolumeCommand::None,
    }
}

/// Maps an XM effect to the normalized effect set.
pub fn effect(fxt: u8, fxp: u8) -> Effect {
    let (x, y) = (fxp >> 4, fxp & 0x0f);
    match fxt {
        0x00 => if fxp != 0 { Effect::Arpeggio(fxp) } else { Effect::None },
        0x01 => Effect::PortaUp(fxp),
        0x02 => Effect::PortaDown(fxp),
        0x03 => Effect::TonePorta(fxp),
        0x04 => Effect::Vibrato(fxp),
        0x05 => Effect::TonePortaVolSlide(fxp),
        0x06 => Effect::VibratoVolSlide(fxp),
        0x07 => Effect::Tremolo(fxp),
        0x08 => Effect::SetPan(fxp),
        0x09 => Effect::SampleOffset(fxp),
        0x0a => Effect::VolumeSlide(fxp),
        0x0b => Effect::PositionJump(fxp),
        0x0c => Effect::SetVolume(fxp),
        0x0d => Effect::PatternBreak(x * 10 + y),
        0x0e => match x {
            0x1 => Effect::FinePortaUp(y),
            0x2 => Effect::FinePortaDown(y),
            0x3 => Effect::Glissando(y),
            0x4 => Effect::VibratoWaveform(y),
            0x5 => Effect::SetFinetune((((y as i8) - 8) * 16) as u8),
            0x6 => Effect::PatternLoop(y),
            0x7 => Effect::TremoloWaveform(y),
            0x8 => Effect::SetPan(y * 17),
            0x9 => Effect::Retrig(y),
            0xa => Effect::FineVolSlideUp(y),
            0xb => Effect::FineVolSlideDown(y),
            0xc => Effect::NoteCut(y),
            0xd => Effect::NoteDelay(y),
            0xe => Effect::PatternDelay(y),
            _   => Effect::None,
        },
        0x0f => match fxp {
            0x00        => Effect::None,
            0x01..=0x1f => Effect::SetSpeed(fxp),
            _           => Effect::SetTempo(fxp),
        },
        0x10 => Effect::SetGlobalVolume(fxp.min(64) * 2),   // G
        0x11 => Effect::GlobalVolSlide(fxp),                // H
        0x14 => Effect::KeyOff(fxp),                        // K
        0x15 => Effect::SetEnvPosition(fxp),                // L
        0x19 => Effect::PanSlide(fxp),                      // P
        0x1b => Effect::MultiRetrig(fxp),                   // R
        0x1d => Effect::Tremor(fxp),                        // T
        0x21 => match x {                                   // X
            0x1 => Effect::ExtraFinePortaUp(y),
            0x2 => Effect::ExtraFinePortaDown(y),
            _   => Effect::None,
        },
        _ => Effect::None,
    }
}
