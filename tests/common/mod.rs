#![allow(dead_code)]

use std::path::Path;

pub const MB: usize = 1024 * 1024;

/// Write `len` pseudo-random bytes so transparent compression cannot shrink the file
pub fn write_noise(path: &Path, len: usize) {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15 ^ (len as u64).wrapping_mul(31);
    let bytes: Vec<u8> = (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

pub fn is_empty_dir(path: &Path) -> bool {
    path.is_dir() && std::fs::read_dir(path).unwrap().next().is_none()
}
