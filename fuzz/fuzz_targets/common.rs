// SPDX-License-Identifier: MIT OR Apache-2.0

/// Reads fixed-width fields from fuzzer input, yielding zeros once exhausted.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn next_u8(&mut self) -> u8 {
        let value = self.data.get(self.offset).copied().unwrap_or(0);
        self.offset = self.offset.saturating_add(1);
        value
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.offset..).unwrap_or(&[])
    }
}

/// Maps `seed` into `lo..=hi`.
pub fn bounded(seed: u8, lo: usize, hi: usize) -> usize {
    lo + usize::from(seed) % (hi - lo + 1)
}

/// Decodes little-endian `f64` values, mapping non-finite ones to zero
/// unless `keep_non_finite` is set.
pub fn decode_f64_chunks(bytes: &[u8], max_values: usize, keep_non_finite: bool) -> Vec<f64> {
    bytes
        .chunks_exact(8)
        .take(max_values)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            let value = f64::from_le_bytes(raw);
            if value.is_finite() || keep_non_finite { value } else { 0.0 }
        })
        .collect()
}

/// Small integers scaled down, so that ties and zero-valued positions are
/// frequent.
pub fn decode_grid_values(bytes: &[u8], max_values: usize) -> Vec<f64> {
    bytes
        .iter()
        .take(max_values)
        .map(|&byte| f64::from(i16::from(byte) - 128) / 16.0)
        .collect()
}
