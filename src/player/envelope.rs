use crate::module::Envelope;

/// Playback position inside an instrument envelope, in ticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeCursor {
    pub pos: u16,
}

impl EnvelopeCursor {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn reset(&mut self) {
        self.pos = 0;
    }

    pub fn set_position(&mut self, env: &Envelope, pos: u16) {
        let last = env.points.last().map_or(0, |p| p.tick);
        self.pos = pos.min(last);
    }

    /// Envelope value at the cursor, or `default` if the envelope is off.
    pub fn value(&self, env: &Envelope, default: i32) -> i32 {
        if !env.is_active() {
            return default
        }
        let points = &env.points;
        let pos = self.pos;

        let i = match points.iter().rposition(|p| p.tick <= pos) {
            Some(i) => i,
            None    => return points[0].value as i32,
        };
        if i + 1 >= points.len() {
            return points[i].value as i32
        }

        let (a, b) = (points[i], points[i + 1]);
        let dt = (b.tick - a.tick) as i32;
        if dt == 0 {
            return b.value as i32
        }
        let dv = (b.value - a.value) as i32;
        a.value as i32 + dv * (pos - a.tick) as i32 / dt
    }

    /// Move one tick forward. Loops and the sustain range apply while the
    /// key is held; the loop keeps applying after release.
    pub fn advance(&mut self, env: &Envelope, key_on: bool) {
        if !env.is_active() {
            return
        }
        let points = &env.points;

        if key_on {
            if let Some((s, e)) = env.sustain {
                let end = points[e].tick;
                if self.pos >= end {
                    self.pos = if s == e { end } else { points[s].tick };
                    return
                }
            }
        }

        let last = points[points.len() - 1].tick;
        if self.pos < last {
            self.pos += 1;
        }

        if let Some((s, e)) = env.lp {
            let (start, end) = (points[s].tick, points[e].tick);
            if self.pos >= end {
                self.pos = start;
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::EnvelopePoint;

    fn envelope(points: &[(u16, i16)]) -> Envelope {
        Envelope {
            enabled: true,
            points : points.iter().map(|&(tick, value)| EnvelopePoint { tick, value }).collect(),
            sustain: None,
            lp     : None,
        }
    }

    #[test]
    fn test_interpolation() {
        let env = envelope(&[(0, 64), (10, 32), (20, 0)]);
        let mut c = EnvelopeCursor::new();
        assert_eq!(c.value(&env, 64), 64);
        c.pos = 5;
        assert_eq!(c.value(&env, 64), 48);
        c.pos = 15;
        assert_eq!(c.value(&env, 64), 16);
        c.pos = 30;
        assert_eq!(c.value(&env, 64), 0);
    }

    #[test]
    fn test_disabled_envelope() {
        let mut env = envelope(&[(0, 10)]);
        env.enabled = false;
        let c = EnvelopeCursor::new();
        assert_eq!(c.value(&env, 64), 64);
    }

    #[test]
    fn test_sustain_point_holds() {
        let mut env = envelope(&[(0, 64), (4, 32), (8, 0)]);
        env.sustain = Some((1, 1));
        let mut c = EnvelopeCursor::new();
        for _ in 0..10 {
            c.advance(&env, true);
        }
        assert_eq!(c.pos, 4);
        for _ in 0..10 {
            c.advance(&env, false);
        }
        assert_eq!(c.pos, 8);
        assert_eq!(c.value(&env, 64), 0);
    }

    #[test]
    fn test_loop() {
        let mut env = envelope(&[(0, 0), (2, 64), (6, 0)]);
        env.lp = Some((1, 2));
        let mut c = EnvelopeCursor::new();
        let mut seen = Vec::new();
        for _ in 0..8 {
            c.advance(&env, false);
            seen.push(c.pos);
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 2, 3, 4]);
    }
}
