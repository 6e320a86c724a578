// Minimal modules in each supported format, built in memory for tests.
// Every file has 4 channels and one 64-row pattern with a C-5 on the first
// row of channel 0, and keeps its sample data at the end of the file.

use byteorder::{ByteOrder, LittleEndian, BigEndian};
use crate::format::{self, Format};

pub const SAMPLE_FRAMES: usize = 2048;
pub const S3M_INS_OFS: usize = 0x70;
pub const IT_SMP_OFS: usize = 0xe0;

// Sample data goes past the MOD signature offset so other formats never
// look like a MOD file there.
const SAMPLE_DATA_OFS: usize = 1088;

const TITLE: &[u8] = b"test song";

fn wave(i: usize) -> i8 {
    let p = (i % 64) as i32;
    let v = if p < 32 { p * 4 - 64 } else { (63 - p) * 4 - 64 };
    v as i8
}

fn put(b: &mut Vec<u8>, ofs: usize, data: &[u8]) {
    if b.len() < ofs + data.len() {
        b.resize(ofs + data.len(), 0);
    }
    b[ofs..ofs + data.len()].copy_from_slice(data);
}

fn put16l(b: &mut Vec<u8>, ofs: usize, val: u16) {
    let mut x = [0; 2];
    LittleEndian::write_u16(&mut x, val);
    put(b, ofs, &x);
}

fn put32l(b: &mut Vec<u8>, ofs: usize, val: u32) {
    let mut x = [0; 4];
    LittleEndian::write_u32(&mut x, val);
    put(b, ofs, &x);
}

fn put16b(b: &mut Vec<u8>, ofs: usize, val: u16) {
    let mut x = [0; 2];
    BigEndian::write_u16(&mut x, val);
    put(b, ofs, &x);
}

pub fn build_mod() -> Vec<u8> {
    let mut b = vec![0; 1084];
    put(&mut b, 0, TITLE);

    // sample 1, no loop
    put(&mut b, 20, b"sample");
    put16b(&mut b, 20 + 22, (SAMPLE_FRAMES / 2) as u16);
    b[20 + 25] = 64;
    put16b(&mut b, 20 + 28, 1);

    b[950] = 1;
    b[951] = 0x7f;
    put(&mut b, 1080, b"M.K.");

    // pattern 0: period 428, instrument 1
    let mut pat = vec![0; 64 * 4 * 4];
    pat[0] = 0x01;
    pat[1] = 0xac;
    pat[2] = 0x10;
    b.extend_from_slice(&pat);

    b.extend((0..SAMPLE_FRAMES).map(|i| wave(i) as u8));
    b
}

pub fn build_s3m() -> Vec<u8> {
    let mut b = vec![0; SAMPLE_DATA_OFS];
    put(&mut b, 0, TITLE);
    b[0x1c] = 0x1a;
    b[0x1d] = 16;
    put16l(&mut b, 0x20, 2);        // orders
    put16l(&mut b, 0x22, 1);        // instruments
    put16l(&mut b, 0x24, 1);        // patterns
    put16l(&mut b, 0x28, 0x1320);
    put16l(&mut b, 0x2a, 2);        // unsigned samples
    put(&mut b, 0x2c, b"SCRM");
    b[0x30] = 64;
    b[0x31] = 6;
    b[0x32] = 125;
    b[0x33] = 0xb0;
    for i in 0..32 {
        b[0x40 + i] = 255;
    }
    put(&mut b, 0x40, &[0, 8, 1, 9]);

    let pat_ofs = 0xc0;
    put(&mut b, 0x60, &[0, 255]);
    put16l(&mut b, 0x62, (S3M_INS_OFS / 16) as u16);
    put16l(&mut b, 0x64, (pat_ofs / 16) as u16);

    // instrument
    let ins = S3M_INS_OFS;
    b[ins] = 1;
    put(&mut b, ins + 1, b"SAMPLE.SMP");
    put16l(&mut b, ins + 0x0e, (SAMPLE_DATA_OFS / 16) as u16);
    put16l(&mut b, ins + 0x10, SAMPLE_FRAMES as u16);
    b[ins + 0x1c] = 64;
    put16l(&mut b, ins + 0x20, 8363);
    put(&mut b, ins + 0x30, b"sample");
    put(&mut b, ins + 0x4c, b"SCRS");

    // pattern: C-5, instrument 1, volume 64 on channel 0, then 63 empty rows
    let mut pat = vec![0x60, 0x40, 1, 64, 0];
    pat.extend_from_slice(&[0; 63]);
    put16l(&mut b, pat_ofs, (pat.len() + 2) as u16);
    put(&mut b, pat_ofs + 2, &pat);

    b.extend((0..SAMPLE_FRAMES).map(|i| wave(i) as u8 ^ 0x80));
    b
}

pub fn build_xm() -> Vec<u8> {
    let mut b = Vec::new();
    put(&mut b, 0, b"Extended Module: ");
    put(&mut b, 17, TITLE);
    put(&mut b, 37, &[0x1a]);
    put(&mut b, 38, b"FastTracker v2.00");
    put16l(&mut b, 58, 0x0104);
    put32l(&mut b, 60, 276);
    put16l(&mut b, 64, 1);          // song length
    put16l(&mut b, 66, 0);          // restart
    put16l(&mut b, 68, 4);          // channels
    put16l(&mut b, 70, 1);          // patterns
    put16l(&mut b, 72, 1);          // instruments
    put16l(&mut b, 74, 1);          // linear frequencies
    put16l(&mut b, 76, 6);
    put16l(&mut b, 78, 125);
    b.resize(60 + 276, 0);

    // pattern: C-5 with instrument 1 and volume 64, key off on the next row
    let mut pat = vec![0x87, 49, 1, 0x50, 0x80, 0x80, 0x80];
    pat.extend_from_slice(&[0x81, 97, 0x80, 0x80, 0x80]);
    pat.extend_from_slice(&[0x80; 62 * 4]);
    let pat_ofs = b.len();
    put32l(&mut b, pat_ofs, 9);
    put16l(&mut b, pat_ofs + 5, 64);
    put16l(&mut b, pat_ofs + 7, pat.len() as u16);
    b.extend_from_slice(&pat);

    // instrument, header padded so that the sample data starts at a fixed offset
    let ins = b.len();
    let ins_size = SAMPLE_DATA_OFS - 40 - ins;
    b.resize(ins + ins_size, 0);
    put32l(&mut b, ins, ins_size as u32);
    put(&mut b, ins + 4, b"instrument");
    put16l(&mut b, ins + 27, 1);
    put32l(&mut b, ins + 29, 40);
    for (i, &(tick, value)) in [(0, 64), (8, 48), (32, 32)].iter().enumerate() {
        put16l(&mut b, ins + 129 + i * 4, tick);
        put16l(&mut b, ins + 131 + i * 4, value);
    }
    b[ins + 225] = 3;               // volume envelope points
    b[ins + 227] = 1;               // sustain point
    b[ins + 233] = 0x03;            // enabled, sustain
    put16l(&mut b, ins + 239, 256); // fadeout

    // sample header
    let smp = b.len();
    put32l(&mut b, smp, SAMPLE_FRAMES as u32);
    b.resize(smp + 40, 0);
    b[smp + 12] = 64;
    b[smp + 15] = 128;
    put(&mut b, smp + 18, b"sample");

    // delta encoded sample data
    let mut old = 0_i8;
    for i in 0..SAMPLE_FRAMES {
        let x = wave(i);
        b.push(x.wrapping_sub(old) as u8);
        old = x;
    }
    b
}

pub fn build_it() -> Vec<u8> {
    let mut b = vec![0; SAMPLE_DATA_OFS];
    put(&mut b, 0, b"IMPM");
    put(&mut b, 4, TITLE);
    put16l(&mut b, 0x20, 2);        // orders
    put16l(&mut b, 0x22, 0);        // instruments
    put16l(&mut b, 0x24, 1);        // samples
    put16l(&mut b, 0x26, 1);        // patterns
    put16l(&mut b, 0x28, 0x0214);
    put16l(&mut b, 0x2a, 0x0200);
    put16l(&mut b, 0x2c, 0x08);     // mono, sample mode, linear slides
    put16l(&mut b, 0x2e, 0x01);     // message attached
    b[0x30] = 128;
    b[0x31] = 48;
    b[0x32] = 6;
    b[0x33] = 125;
    for i in 0..64 {
        b[0x40 + i] = 32;
        b[0x80 + i] = 64;
    }

    let msg = b"hello\rworld";
    let msg_ofs = 0xd0;
    let pat_ofs = IT_SMP_OFS + 0x50;
    put(&mut b, 0xc0, &[0, 255]);
    put32l(&mut b, 0xc2, IT_SMP_OFS as u32);
    put32l(&mut b, 0xc6, pat_ofs as u32);
    put16l(&mut b, 0x36, msg.len() as u16);
    put32l(&mut b, 0x38, msg_ofs as u32);
    put(&mut b, msg_ofs, msg);

    // sample header
    let smp = IT_SMP_OFS;
    put(&mut b, smp, b"IMPS");
    put(&mut b, smp + 4, b"SAMPLE.ITS");
    b[smp + 0x11] = 64;             // global volume
    b[smp + 0x12] = 0x01;           // has data
    b[smp + 0x13] = 64;
    put(&mut b, smp + 0x14, b"sample");
    b[smp + 0x2e] = 0x01;           // signed
    put32l(&mut b, smp + 0x30, SAMPLE_FRAMES as u32);
    put32l(&mut b, smp + 0x3c, 8363);
    put32l(&mut b, smp + 0x48, SAMPLE_DATA_OFS as u32);

    // pattern: C-5 on row 0, the same note again on row 4 through the
    // mask, and a note off on channel 3 at row 8
    let mut pat = vec![0x81, 0x07, 60, 1, 64, 0];
    pat.extend_from_slice(&[0, 0, 0]);
    pat.extend_from_slice(&[0x81, 0x10, 0]);
    pat.extend_from_slice(&[0, 0, 0]);
    pat.extend_from_slice(&[0x84, 0x01, 255, 0]);
    pat.extend_from_slice(&[0; 55]);
    put16l(&mut b, pat_ofs, pat.len() as u16);
    put16l(&mut b, pat_ofs + 2, 64);
    put(&mut b, pat_ofs + 8, &pat);

    b.extend((0..SAMPLE_FRAMES).map(|i| wave(i) as u8));
    b
}

pub fn all_formats() -> Vec<Vec<u8>> {
    vec![build_mod(), build_s3m(), build_xm(), build_it()]
}

/// Break the format signature of a module built by this file.
pub fn corrupt_magic(b: &mut Vec<u8>) {
    let ofs = match format::probe(b).map(|info| info.format) {
        Ok(Format::Mod) => 1080,
        Ok(Format::S3m) => 0x2c,
        _               => 0,
    };
    put(b, ofs, b"XXXX");
}


#[test]
fn test_builders_share_layout() {
    for b in all_formats() {
        assert!(b.len() >= SAMPLE_DATA_OFS + SAMPLE_FRAMES);
    }
    let b = build_s3m();
    assert_eq!(&b[1080..1084], &[0, 0, 0, 0]);
}
