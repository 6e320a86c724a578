pub mod load;

pub use self::load::*;

use crate::module::{Effect, Note, VolumeCommand};

//                                S3M Module header
//          0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
//        ,---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---.
//  0000: | Song name, max 28 chars (end with NUL (0))                    |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0010: |                                               |1Ah|Typ| x | x |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0020: |OrdNum |InsNum |PatNum | Flags | Cwt/v | Ffi   |'S'|'C'|'R'|'M'|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0030: |g.v|i.s|i.t|m.v|u.c|d.p| x | x | x | x | x | x | x | x |Special|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0040: |Channel settings for 32 channels, 255=unused,+128=disabled     |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0050: |                                                               |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0060: |Orders; length=OrdNum (should be even)                         |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxx1: |Parapointers to instruments; length=InsNum*2                   |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxx2: |Parapointers to patterns; length=PatNum*2                      |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxx3: |Channel default pan positions                                  |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+


//                        Digiplayer/ST3 samplefileformat
//          0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
//        ,---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---.
//  0000: |[T]| Dos filename (12345678.ABC)                   |    MemSeg |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0010: |Length |HI:leng|LoopBeg|HI:LBeg|LoopEnd|HI:Lend|Vol| x |[P]|[F]|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0020: |C2Spd  |HI:C2sp| x | x | x | x |Int:Gp |Int:512|Int:lastused   |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0030: | Sample name, 28 characters max... (incl. NUL)                 |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0040: | ...sample name...                             |'S'|'C'|'R'|'S'|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  xxxx: sampledata

pub const FLAG_FAST_SLIDES: u16 = 0x40;
pub const FFI_UNSIGNED: u16 = 2;

/// Maps an S3M packed note byte to the engine's note numbering.
pub fn note(b: u8) -> Note {
    match b {
        255 => Note::None,
        254 => Note::Cut,
        _   => {
            let n = (b >> 4) as usize * 12 + (b & 0x0f).min(11) as usize + 12;
            if n < crate::MAX_KEYS { Note::On(n as u8) } else { Note::None }
        }
    }
}

pub fn volume(v: u8) -> VolumeCommand {
    if v <= 64 { VolumeCommand::SetVolume(v) } else { VolumeCommand::None }
}

/// Maps an S3M command (1 = A ... 26 = Z) to the normalized effect set.
pub fn effect(cmd: u8, fxp: u8) -> Effect {
    let (x, y) = (fxp >> 4, fxp & 0x0f);
    match cmd {
        1  => if fxp != 0 { Effect::SetSpeed(fxp) } else { Effect::None },  // A
        2  => Effect::PositionJump(fxp),                                     // B
        3  => Effect::PatternBreak(x * 10 + y),                              // C
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
        20 => if fxp >= 0x20 { Effect::SetTempo(fxp) } else { Effect::None }, // T
        21 => Effect::FineVibrato(fxp),                                      // U
        22 => Effect::SetGlobalVolume(fxp.min(64) * 2),                      // V
        24 => if fxp <= 0x80 { Effect::SetPan((fxp as u16 * 2).min(255) as u8) } else { Effect::None }, // X
        _  => Effect::None,
    }
}
