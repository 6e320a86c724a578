use std::thread;
use std::time::Duration;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use crate::Error;
use super::{check_format, Driver, DriverInfo, Output};

/// Live output on the default device of the default host.
pub struct CpalDriver;

impl Driver for CpalDriver {
    fn info(&self) -> DriverInfo {
        DriverInfo {
            name       : "cpal",
            description: "live audio output",
            file       : false,
        }
    }

    fn open(&self, rate: u32, channels: usize, buffer_frames: usize) -> Result<Box<dyn Output>, Error> {
        check_format(rate, channels)?;

        let host = cpal::default_host();
        let device = host.default_output_device()
            .ok_or_else(|| Error::Driver("no audio output device available".to_owned()))?;

        let config = cpal::StreamConfig {
            channels   : channels as u16,
            sample_rate: cpal::SampleRate(rate),
            buffer_size: cpal::BufferSize::Default,
        };

        // room for a few driver buffers
        let ring = HeapRb::<i16>::new(buffer_frames.max(1024) * channels * 4);
        let (producer, mut consumer) = ring.split();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut popped = 0;
                for x in data.iter_mut() {
                    match consumer.try_pop() {
                        Some(s) => { *x = s as f32 / 32768.0; popped += 1 }
                        None    => break,
                    }
                }
                for x in data[popped..].iter_mut() {
                    *x = 0.0;
                }
            },
            |err| error!("audio stream error: {}", err),
            None,
        ).map_err(|e| Error::Driver(format!("can't build audio stream: {}", e)))?;

        stream.play().map_err(|e| Error::Driver(format!("can't start audio stream: {}", e)))?;
        debug!("audio stream started: {} Hz, {} channels", rate, channels);

        Ok(Box::new(CpalOutput {
            producer,
            stream: Some(stream),
        }))
    }
}

pub struct CpalOutput {
    producer: ringbuf::HeapProd<i16>,
    stream  : Option<cpal::Stream>,
}

impl Output for CpalOutput {
    /// Blocks until the whole buffer fits in the ring buffer.
    fn write(&mut self, buf: &[i16]) -> Result<(), Error> {
        if self.stream.is_none() {
            return Err(Error::Driver("write to closed output".to_owned()))
        }
        let mut ofs = 0;
        while ofs < buf.len() {
            ofs += self.producer.push_slice(&buf[ofs..]);
            if ofs < buf.len() {
                thread::sleep(Duration::from_millis(5));
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        // let the device drain what's queued
        for _ in 0..200 {
            if self.producer.is_empty() || self.stream.is_none() {
                break
            }
            thread::sleep(Duration::from_millis(10));
        }
        self.stream = None;
        Ok(())
    }
}
