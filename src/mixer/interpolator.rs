use std::str::FromStr;
use crate::mixer::SMIX_SHIFT;
use crate::Error;

pub trait Interpolate {
    fn name() -> &'static str;
    // i[0] is the sample at the current position, i[1] the next one
    fn get_sample(&self, i: &[i32], frac: i32) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolator {
    Nearest,
    Linear,
}

impl Interpolator {
    pub fn name(&self) -> &'static str {
        match self {
            Interpolator::Nearest => Nearest::name(),
            Interpolator::Linear  => Linear::name(),
        }
    }

    #[inline]
    pub fn get_sample(&self, i: &[i32], frac: i32) -> i32 {
        match self {
            Interpolator::Nearest => Nearest.get_sample(i, frac),
            Interpolator::Linear  => Linear.get_sample(i, frac),
        }
    }
}

impl FromStr for Interpolator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "nearest" => Ok(Interpolator::Nearest),
            "linear"           => Ok(Interpolator::Linear),
            _ => Err(Error::InvalidOperation(format!("unknown interpolation '{}'", s))),
        }
    }
}


// Nearest neighbor interpolator
pub struct Nearest;

impl Interpolate for Nearest {
    fn name() -> &'static str {
        "nearest neighbor"
    }

    fn get_sample(&self, i: &[i32], _frac: i32) -> i32 {
        i[0]
    }
}


// Linear interpolator
pub struct Linear;

impl Interpolate for Linear {
    fn name() -> &'static str {
        "linear"
    }

    fn get_sample(&self, i: &[i32], frac: i32) -> i32 {
        let l1 = i[0];
        let dt = i[1] - l1;
        l1 + (((frac >> 1) * dt) >> (SMIX_SHIFT - 1))
    }
}
