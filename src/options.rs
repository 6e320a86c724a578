use std::fmt;
use std::str::FromStr;
use crate::mixer::Interpolator;
use crate::{Error, MAX_RATE, MIN_RATE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannels {
    Mono,
    Stereo,
}

impl OutputChannels {
    pub fn count(&self) -> usize {
        match self {
            OutputChannels::Mono   => 1,
            OutputChannels::Stereo => 2,
        }
    }
}

/// What happens when the sequencer runs past the last order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopBehavior {
    /// Jump to the song's restart position if it declares one, else finish.
    HonorLoopPoint,
    /// Always finish at the end of the order list.
    StopAtEnd,
    /// Restart forever, from the declared restart position or from the top.
    InfiniteLoop,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub rate         : u32,
    pub channels     : OutputChannels,
    pub interpolation: Interpolator,
    pub loop_behavior: LoopBehavior,
    pub volume       : u8,
    pub separation   : u8,
    pub reverse      : bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            rate         : 44100,
            channels     : OutputChannels::Stereo,
            interpolation: Interpolator::Linear,
            loop_behavior: LoopBehavior::HonorLoopPoint,
            volume       : 128,
            separation   : 100,
            reverse      : false,
        }
    }
}

impl Options {
    pub fn check(&self) -> Result<(), Error> {
        if self.rate < MIN_RATE || self.rate > MAX_RATE {
            return Err(Error::InvalidOperation(format!("sampling rate {} out of range ({}-{})", self.rate, MIN_RATE, MAX_RATE)))
        }
        if self.volume > 128 {
            return Err(Error::InvalidOperation(format!("master volume {} out of range (0-128)", self.volume)))
        }
        if self.separation > 100 {
            return Err(Error::InvalidOperation(format!("stereo separation {} out of range (0-100)", self.separation)))
        }
        Ok(())
    }
}

impl FromStr for OutputChannels {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mono"   | "1" => Ok(OutputChannels::Mono),
            "stereo" | "2" => Ok(OutputChannels::Stereo),
            _ => Err(Error::InvalidOperation(format!("unknown output channels '{}'", s))),
        }
    }
}

impl FromStr for LoopBehavior {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "honor" | "loop-point" => Ok(LoopBehavior::HonorLoopPoint),
            "stop"  | "end"        => Ok(LoopBehavior::StopAtEnd),
            "infinite" | "forever" => Ok(LoopBehavior::InfiniteLoop),
            _ => Err(Error::InvalidOperation(format!("unknown loop behavior '{}'", s))),
        }
    }
}

impl fmt::Display for LoopBehavior {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            LoopBehavior::HonorLoopPoint => "honor",
            LoopBehavior::StopAtEnd      => "stop",
            LoopBehavior::InfiniteLoop   => "infinite",
        };
        write!(f, "{}", s)
    }
}
