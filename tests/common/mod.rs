//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use rand::RngCore;

/// Rows in a valid yearly dataset file (17,520 readings + boundary row).
pub const YEAR_ROWS: usize = 17_521;

/// Writes a household CSV with `rows` data rows.
///
/// Demand follows a day/night cycle around 40 Wh per reading and PV a midday
/// bump of up to 120 Wh, both shifted by `offset` so files differ.
pub fn write_dataset(dir: &Path, name: &str, rows: usize, offset: f64) -> PathBuf {
    let mut out = String::from("timestamp,pv_generation,total_load\n");
    for i in 0..rows {
        let slot = i % 48;
        let demand = 40.0 + offset + if (34..44).contains(&slot) { 30.0 } else { 0.0 };
        let pv = if (14..34).contains(&slot) {
            120.0 * (1.0 - ((slot as f64 - 24.0) / 10.0).abs())
        } else {
            0.0
        };
        let _ = writeln!(out, "{i},{pv:.3},{demand:.3}");
    }
    let path = dir.join(name);
    fs::write(&path, out).expect("dataset fixture should be writable");
    path
}

/// Writes a yearly dataset with one blank demand cell.
pub fn write_dataset_with_gap(dir: &Path, name: &str) -> PathBuf {
    let path = write_dataset(dir, name, YEAR_ROWS, 0.0);
    let content = fs::read_to_string(&path).expect("fixture should be readable");
    let patched = content.replacen("100,0.000,40.000", "100,0.000,", 1);
    assert_ne!(content, patched, "gap fixture should change a row");
    fs::write(&path, patched).expect("fixture should be writable");
    path
}

/// RNG returning a fixed word; `u64::MAX` makes every uniform draw ~1.
pub struct ConstRng(pub u64);

impl RngCore for ConstRng {
    fn next_u32(&mut self) -> u32 {
        self.0 as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for (i, byte) in dst.iter_mut().enumerate() {
            *byte = self.0.to_le_bytes()[i % 8];
        }
    }
}
