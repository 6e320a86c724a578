pub mod load;

pub use self::load::*;

use crate::module::{Effect, Note, VolumeCommand};

//                                 IT module header
//          0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
//        ,---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---.
//  0000: |'I'|'M'|'P'|'M'| Song name, 26 chars                           |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0010: |                                                       |PHiligt|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0020: |OrdNum |InsNum |SmpNum |PatNum | Cwt/v | Cmwt  | Flags |Special|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0030: |GV |MV |IS |IT |Sep|PWD|MsgLgth|Message Offset |   Reserved    |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0040: | Chnl Pan (64 bytes)...                                        |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0080: | Chnl Vol (64 bytes)...                                        |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  00C0: | Orders, Length = OrdNum                                       |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxxx: | 'Long' Offset of instruments, Length = InsNum*4               |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxxx: | 'Long' Offset of samples headers, Length = SmpNum*4           |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxxx: | 'Long' Offset of patterns, Length = PatNum*4                  |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+


//                              Impulse Instrument
//          0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
//        ,---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---.
//  0000: |'I'|'M'|'P'|'I'| DOS FileName (12345678.123)                   |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0010: |00h|NNA|DCT|DCA|FadeOut|PPS|PPC|GbV|DfP|RV |RP |TrkVers|NoS| x |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0020: | Instrument Name, max 26 bytes, includes NUL...................|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0030: |.......................................|IFC|IFR|MCh|MPr|MIDIBnk|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0040: | Note-Sample/Keyboard Table, Length = 240 bytes................|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0130: | Envelopes: volume, panning, pitch, 82 bytes each              |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+


//                                Impulse Sample
//          0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
//        ,---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---.
//  0000: |'I'|'M'|'P'|'S'| DOS Filename (12345678.123)                   |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0010: |00h|GvL|Flg|Vol| Sample Name, max 26 bytes, includes NUL.......|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0020: |.......................................................|Cvt|DfP|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0030: | Length        | Loop Begin    | Loop End      | C5Speed       |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0040: | SusLoop Begin | SusLoop End   | SamplePointer |ViS|ViD|ViR|ViT|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+

pub const FLAG_STEREO: u16 = 0x01;
pub const FLAG_INSTRUMENTS: u16 = 0x04;
pub const FLAG_LINEAR: u16 = 0x08;
pub const SPECIAL_MESSAGE: u16 = 0x01;

pub const SMP_HAS_DATA: u8 = 0x01;
pub const SMP_16BIT: u8 = 0x02;
pub const SMP_STEREO: u8 = 0x04;
pub const SMP_COMPRESSED: u8 = 0x08;
pub const SMP_LOOP: u8 = 0x10;
pub const SMP_SUSTAIN: u8 = 0x20;
pub const SMP_PINGPONG: u8 = 0x40;
pub const SMP_SUSTAIN_PINGPONG: u8 = 0x80;

const PORTA_TABLE: [u8; 10] = [0, 1, 4, 8, 16, 32, 64, 96, 128, 255];

pub fn note(b: u8) -> Note {
    match b {
        0..=119 => Note::On(b),
        255     => Note::Off,
        254     => Note::Cut,
        _       => Note::Fade,
    }
}

pub fn volume(v: u8) -> VolumeCommand {
    match v {
        0..=64    => VolumeCommand::SetVolume(v),
        65..=74   => VolumeCommand::FineUp(v - 65),
        75..=84   => VolumeCommand::FineDown(v - 75),
        85..=94   => VolumeCommand::SlideUp(v - 85),
        95..=104  => VolumeCommand::SlideDown(v - 95),
        105..=114 => VolumeCommand::PortaDown((v - 105) * 4),
        115..=124 => VolumeCommand::PortaUp((v - 115) * 4),
        128..=192 => VolumeCommand::SetPan(((v - 128) as u16 * 4).min(255) as u8),
        193..=202 => VolumeCommand::TonePorta(PORTA_TABLE[(v - 193) as usize]),
        203..=212 => VolumeCommand::VibratoDepth(v - 203),
        _         => VolumeCommand::None,
    }
}

/// Maps an IT command (1 = A ... 26 = Z) to the normalized effect set.
pub fn effect(cmd: u8, fxp: u8) -> Effect {
    let (x, y) = (fxp >> 4, fxp & 0x0f);
    match cmd {
        1  => if fxp != 0 { Effect::SetSpeed(fxp) } else { Effect::None },  // A
        2  => Effect::PositionJump(fxp),                                     // B
        3  => Effect::PatternBreak(fxp),                                     // C
        4  => Effect::VolumeSlide(fxp),                                      // D
        5  => Effect::PortaDown(fxp),                                        // E
        6  => Effect::PortaUp(fxp),                                          // F
        7  => Effect::TonePorta(fxp),                                        // G
        8  => Effect::Vibrato(fxp),                                          // H
        9  => Effect::Tremor(fxp),                                           // I
        10 => Effect::Arpeggio(fxp),                                         // J
        11 => Effect::VibratoVolSlide(fxp),                                  // K
        12 => Effect::TonePortaVolSlide(fxp),                                // L
        13 => Effect::SetChannelVolume(fxp),                                 // M
        14 => Effect::ChannelVolSlide(fxp),                                  // N
        15 => Effect::SampleOffset(fxp),                                     // O
        16 => Effect::PanSlide((y << 4) | x),                                // P
        17 => Effect::MultiRetrig(fxp),                                      // Q
        18 => Effect::Tremolo(fxp),                                          // R
        19 => match x {                                                      // S
            0x1 => Effect::Glissando(y),
            0x2 => Effect::SetFinetune((((y as i8) - 8) * 16) as u8),
            0x3 => Effect::VibratoWaveform(y),
            0x4 => Effect::TremoloWaveform(y),
            0x8 => Effect::SetPan(y * 17),
            0xb => Effect::PatternLoop(y),
            0xc => Effect::NoteCut(y),
            0xd => Effect::NoteDelay(y),
            0xe => Effect::PatternDelay(y),
            _   => Effect::None,
        },
        20 => if fxp >= 0x20 { Effect::SetTempo(fxp) } else { Effect::TempoSlide(fxp) }, // T
        21 => Effect::FineVibrato(fxp),                                      // U
        22 => Effect::SetGlobalVolume(fxp.min(128)),                         // V
        23 => Effect::GlobalVolSlide(fxp),                                   // W
        24 => Effect::SetPan(fxp),                                           // X
        _  => Effect::None,
    }
}
