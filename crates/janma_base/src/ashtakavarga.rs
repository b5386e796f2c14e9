//! Ashtakavarga bindus (benefic points).
//!
//! For each of the 7 sapta grahas, eight contributors (the 7 grahas plus the
//! lagna) award one bindu to every rashi at a favourable offset from
//! themselves. The per-graha tables (BAV) sum into the Sarvashtakavarga (SAV).
//!
//! Totals are fixed for every chart: Sun 48, Moon 49, Mars 39, Mercury 54,
//! Jupiter 56, Venus 52, Saturn 39; SAV 337.

use crate::graha::Graha;

/// Bitmask from 1-based offsets.
const fn bits(offsets: &[u8]) -> u16 {
    let mut mask = 0u16;
    let mut i = 0;
    while i < offsets.len() {
        mask |= 1u16 << offsets[i];
        i += 1;
    }
    mask
}

/// RULES[target][contributor]: favourable 1-based offsets from the contributor.
/// Contributors are Sun..Saturn then Lagna.
const RULES: [[u16; 8]; 7] = [
    // Sun
    [
        bits(&[1, 2, 4, 7, 8, 9, 10, 11]),
        bits(&[3, 6, 10, 11]),
        bits(&[1, 2, 4, 7, 8, 9, 10, 11]),
        bits(&[3, 5, 6, 9, 10, 11, 12]),
        bits(&[5, 6, 9, 11]),
        bits(&[6, 7, 12]),
        bits(&[1, 2, 4, 7, 8, 9, 10, 11]),
        bits(&[3, 4, 6, 10, 11, 12]),
    ],
    // Moon
    [
        bits(&[3, 6, 7, 8, 10, 11]),
        bits(&[1, 3, 6, 7, 10, 11]),
        bits(&[2, 3, 5, 6, 9, 10, 11]),
        bits(&[1, 3, 4, 5, 7, 8, 10, 11]),
        bits(&[1, 4, 7, 8, 10, 11, 12]),
        bits(&[3, 4, 5, 7, 9, 10, 11]),
        bits(&[3, 5, 6, 11]),
        bits(&[3, 6, 10, 11]),
    ],
    // Mars
    [
        bits(&[3, 5, 6, 10, 11]),
        bits(&[3, 6, 11]),
        bits(&[1, 2, 4, 7, 8, 10, 11]),
        bits(&[3, 5, 6, 11]),
        bits(&[6, 10, 11, 12]),
        bits(&[6, 8, 11, 12]),
        bits(&[1, 4, 7, 8, 9, 10, 11]),
        bits(&[1, 3, 6, 10, 11]),
    ],
    // Mercury
    [
        bits(&[5, 6, 9, 11, 12]),
        bits(&[2, 4, 6, 8, 10, 11]),
        bits(&[1, 2, 4, 7, 8, 9, 10, 11]),
        bits(&[1, 3, 5, 6, 9, 10, 11, 12]),
        bits(&[6, 8, 11, 12]),
        bits(&[1, 2, 3, 4, 5, 8, 9, 11]),
        bits(&[1, 2, 4, 7, 8, 9, 10, 11]),
        bits(&[1, 2, 4, 6, 8, 10, 11]),
    ],
    // Jupiter
    [
        bits(&[1, 2, 3, 4, 7, 8, 9, 10, 11]),
        bits(&[2, 5, 7, 9, 11]),
        bits(&[1, 2, 4, 7, 8, 10, 11]),
        bits(&[1, 2, 4, 5, 6, 9, 10, 11]),
        bits(&[1, 2, 3, 4, 7, 8, 10, 11]),
        bits(&[2, 5, 6, 9, 10, 11]),
        bits(&[3, 5, 6, 12]),
        bits(&[1, 2, 4, 5, 6, 7, 9, 10, 11]),
    ],
    // Venus
    [
        bits(&[8, 11, 12]),
        bits(&[1, 2, 3, 4, 5, 8, 9, 11, 12]),
        bits(&[3, 4, 6, 9, 11, 12]),
        bits(&[3, 5, 6, 9, 11]),
        bits(&[5, 8, 9, 10, 11]),
        bits(&[1, 2, 3, 4, 5, 8, 9, 10, 11]),
        bits(&[3, 4, 5, 8, 9, 10, 11]),
        bits(&[1, 2, 3, 4, 5, 8, 9, 11]),
    ],
    // Saturn
    [
        bits(&[1, 2, 4, 7, 8, 10, 11]),
        bits(&[3, 6, 11]),
        bits(&[3, 5, 6, 10, 11, 12]),
        bits(&[6, 8, 9, 10, 11, 12]),
        bits(&[5, 6, 11, 12]),
        bits(&[6, 11, 12]),
        bits(&[3, 5, 6, 11]),
        bits(&[1, 3, 4, 6, 10, 11]),
    ],
];

/// Fixed BAV totals, Sun..Saturn.
pub const BAV_TOTALS: [u8; 7] = [48, 49, 39, 54, 56, 52, 39];

/// Fixed SAV total.
pub const SAV_TOTAL: u16 = 337;

/// Bindu tables for one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinduChart {
    /// bav[graha][rashi], Sun..Saturn, each cell 0..=8.
    pub bav: [[u8; 12]; 7],
    /// sav[rashi], each cell 0..=56.
    pub sav: [u8; 12],
}

impl BinduChart {
    /// Compute BAV and SAV from the rashi of each sapta graha and the lagna.
    pub fn compute(graha_rashis: &[u8; 7], lagna_rashi: u8) -> Self {
        let mut contributors = [0u8; 8];
        contributors[..7].copy_from_slice(graha_rashis);
        contributors[7] = lagna_rashi;

        let mut bav = [[0u8; 12]; 7];
        for (target, row) in bav.iter_mut().enumerate() {
            for (rashi, cell) in row.iter_mut().enumerate() {
                *cell = contributors
                    .iter()
                    .zip(RULES[target].iter())
                    .filter(|&(&from, &mask)| {
                        let offset = (rashi as i16 - (from % 12) as i16).rem_euclid(12) + 1;
                        mask & (1u16 << offset) != 0
                    })
                    .count() as u8;
            }
        }

        let mut sav = [0u8; 12];
        for (rashi, total) in sav.iter_mut().enumerate() {
            *total = bav.iter().map(|row| row[rashi]).sum();
        }
        Self { bav, sav }
    }

    /// Bindus a graha holds in its own BAV at `rashi`. None for nodes.
    pub fn own_bindus(&self, graha: Graha, rashi: u8) -> Option<u8> {
        if graha.is_node() {
            return None;
        }
        Some(self.bav[graha.index() as usize][(rashi % 12) as usize])
    }

    /// SAV bindus of a rashi.
    pub fn sav_bindus(&self, rashi: u8) -> u8 {
        self.sav[(rashi % 12) as usize]
    }
}
