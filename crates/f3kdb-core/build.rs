use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const MAP_SIZE: usize = 16;

/// Recursive Bayer index: bit-reversed interleave of `x ^ y` and `y`.
fn bayer_threshold(x: usize, y: usize) -> u8 {
    let mut value = 0usize;
    for bit in 0..4 {
        let xb = (x >> bit) & 1;
        let yb = (y >> bit) & 1;
        value |= (((xb ^ yb) << 1) | yb) << (6 - 2 * bit);
    }
    value as u8
}

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("threshold_map.rs");
    let mut file = File::create(&dest_path).unwrap();

    writeln!(file, "/// 16x16 Bayer ordered dithering threshold map").unwrap();
    writeln!(file, "/// Index: [row & 15][column & 15], Value: threshold in 0..=255").unwrap();
    writeln!(file, "pub static THRESHOLD_MAP: [[u8; {MAP_SIZE}]; {MAP_SIZE}] = [").unwrap();
    for y in 0..MAP_SIZE {
        write!(file, "    [").unwrap();
        for x in 0..MAP_SIZE {
            if x > 0 {
                write!(file, ", ").unwrap();
            }
            write!(file, "{:3}", bayer_threshold(x, y)).unwrap();
        }
        writeln!(file, "],").unwrap();
    }
    writeln!(file, "];").unwrap();

    // Rerun if build.rs changes
    println!("cargo::rerun-if-changed=build.rs");
}
