pub mod load;

pub use self::load::*;

use crate::module::Effect;

//                              Protracker module header
//          0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
//        ,---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---.
//  0000: | Song name, 20 chars, padded with NUL                          |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0010: |               | Sample 1: name, 22 chars                      |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0020: |                       |Length |F.T|Vol|LpStart|LpLen  |Sample2|
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//   ...  | 31 samples, 30 bytes each                                     |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  03b0: |                               |Len|Rst| Orders, 128 bytes     |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//  0430: |                               |Magic ('M.K.')  | Patterns     |
//        +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//
// Lengths and loop points are in 16-bit words. Each pattern is 64 rows of
// 4-byte events, one per channel:
//
//   ,-------+-------+-------+-------.
//   |I I I I P P P P|P P P P P P P P|  I = instrument, P = period
//   |I I I I E E E E|X X X X X X X X|  E = effect, X = parameter
//   `-------+-------+-------+-------'

/// Maps a Protracker effect to the normalized effect set.
pub fn effect(fxt: u8, fxp: u8) -> Effect {
    let (x, y) = (fxp >> 4, fxp & 0x0f);
    match fxt {
        0x0 => if fxp != 0 { Effect::Arpeggio(fxp) } else { Effect::None },
        0x1 => Effect::PortaUp(fxp),
        0x2 => Effect::PortaDown(fxp),
        0x3 => Effect::TonePorta(fxp),
        0x4 => Effect::Vibrato(fxp),
        0x5 => Effect::TonePortaVolSlide(fxp),
        0x6 => Effect::VibratoVolSlide(fxp),
        0x7 => Effect::Tremolo(fxp),
        0x8 => Effect::SetPan(fxp),
        0x9 => Effect::SampleOffset(fxp),
        0xa => Effect::VolumeSlide(fxp),
        0xb => Effect::PositionJump(fxp),
        0xc => Effect::SetVolume(fxp),
        0xd => Effect::PatternBreak(x * 10 + y),
        0xe => match x {
            0x1 => Effect::FinePortaUp(y),
            0x2 => Effect::FinePortaDown(y),
            0x3 => Effect::Glissando(y),
            0x4 => Effect::VibratoWaveform(y),
            0x5 => Effect::SetFinetune(((y << 4) as i8) as u8),
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
        0xf => match fxp {
            0x00        => Effect::None,
            0x01..=0x1f => Effect::SetSpeed(fxp),
            _           => Effect::SetTempo(fxp),
        },
        _ => Effect::None,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_table() {
        assert_eq!(effect(0x0, 0x00), Effect::None);
        assert_eq!(effect(0x0, 0x37), Effect::Arpeggio(0x37));
        assert_eq!(effect(0xd, 0x12), Effect::PatternBreak(12));
        assert_eq!(effect(0xe, 0x5f), Effect::SetFinetune(0xf0));
        assert_eq!(effect(0xe, 0x57), Effect::SetFinetune(0x70));
        assert_eq!(effect(0xe, 0x8f), Effect::SetPan(0xff));
        assert_eq!(effect(0xf, 0x06), Effect::SetSpeed(6));
        assert_eq!(effect(0xf, 0x7d), Effect::SetTempo(125));
    }
}
