use std::fmt::{Display, Error, Formatter};
use std::ops::{Deref, Not};

use super::codec::Mode;
use super::error::{QRError, QRResult};
use super::mask::MaskPattern;

// Color
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    pub fn select<T>(self, dark: T, light: T) -> T {
        match self {
            Self::Dark => dark,
            Self::Light => light,
        }
    }
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl From<bool> for Color {
    fn from(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Default)]
pub enum ECLevel {
    #[default]
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    // Two bit indicator stored in format info
    pub fn format_bits(self) -> u32 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }
}

// Version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct Version(usize);

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    pub fn new(ver: usize) -> QRResult<Self> {
        match ver {
            1..=40 => Ok(Self(ver)),
            _ => Err(QRError::InvalidVersion),
        }
    }

    pub(crate) const fn from_raw(ver: usize) -> Self {
        debug_assert!(ver >= 1 && ver <= 40, "Invalid version");
        Self(ver)
    }

    pub const fn width(self) -> usize {
        self.0 * 4 + 17
    }

    // Modules left for data & ecc once function patterns and info areas are drawn
    pub const fn raw_modules(self) -> usize {
        let v = self.0;
        let mut res = (16 * v + 128) * v + 64;
        if v >= 2 {
            let aligns = v / 7 + 2;
            res -= (25 * aligns - 10) * aligns - 55;
            if v >= 7 {
                res -= 36;
            }
        }
        res
    }

    pub const fn total_codewords(self) -> usize {
        self.raw_modules() >> 3
    }

    pub const fn remainder_bits(self) -> usize {
        self.raw_modules() & 7
    }

    pub fn ecc_per_block(self, ecl: ECLevel) -> usize {
        ECC_PER_BLOCK[ecl as usize][self.0]
    }

    pub fn block_count(self, ecl: ECLevel) -> usize {
        BLOCK_COUNT[ecl as usize][self.0]
    }

    // (Group 1 block size, Group 1 block count, Group 2 block size, Group 2 block count)
    pub fn data_codewords_per_block(self, ecl: ECLevel) -> (usize, usize, usize, usize) {
        let blocks = self.block_count(ecl);
        let data_len = self.data_codewords(ecl);
        let block1_size = data_len / blocks;
        let block2_count = data_len % blocks;
        let block1_count = blocks - block2_count;
        let block2_size = if block2_count > 0 { block1_size + 1 } else { 0 };
        (block1_size, block1_count, block2_size, block2_count)
    }

    pub fn data_codewords(self, ecl: ECLevel) -> usize {
        self.total_codewords() - self.ecc_per_block(ecl) * self.block_count(ecl)
    }

    pub fn data_bit_capacity(self, ecl: ECLevel) -> usize {
        self.data_codewords(ecl) << 3
    }

    pub const fn mode_bits(self) -> usize {
        4
    }

    pub fn char_cnt_bits(self, mode: Mode) -> usize {
        match (self.0, mode) {
            (1..=9, Mode::Numeric) => 10,
            (1..=9, Mode::Alphanumeric) => 9,
            (1..=9, Mode::Byte) => 8,
            (10..=26, Mode::Numeric) => 12,
            (10..=26, Mode::Alphanumeric) => 11,
            (10..=26, Mode::Byte) => 16,
            (_, Mode::Numeric) => 14,
            (_, Mode::Alphanumeric) => 13,
            (_, Mode::Byte) => 16,
        }
    }

    // Centre coordinates shared by rows and columns of alignment patterns
    pub fn alignment_pattern(self) -> Vec<usize> {
        let v = self.0;
        if v == 1 {
            return Vec::new();
        }
        let aligns = v / 7 + 2;
        let step = (v * 8 + aligns * 3 + 5) / (aligns * 4 - 4) * 2;
        let last = self.width() - 7;
        let mut res: Vec<usize> = (0..aligns - 1).map(|i| last - i * step).collect();
        res.push(6);
        res.reverse();
        res
    }

    // 18 bit version info: 6 bit version followed by 12 bit BCH remainder
    pub fn info(self) -> u32 {
        debug_assert!(self.0 >= 7, "Version info only exists for versions 7 and above");
        let data = self.0 as u32;
        let mut rem = data;
        for _ in 0..12 {
            rem = (rem << 1) ^ ((rem >> 11) * VERSION_INFO_GENERATOR);
        }
        (data << 12) | (rem & 0xFFF)
    }
}

impl Deref for Version {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}", self.0)
    }
}

// Format info
//------------------------------------------------------------------------------

// 15 bit format info: 2 bit ec level, 3 bit mask, 10 bit BCH remainder, xor-ed with FORMAT_MASK
pub fn format_info(ecl: ECLevel, mask: MaskPattern) -> u32 {
    let data = (ecl.format_bits() << 3) | *mask as u32;
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_INFO_GENERATOR);
    }
    ((data << 10) | (rem & 0x3FF)) ^ FORMAT_MASK
}


// Global constants
//------------------------------------------------------------------------------

pub static FORMAT_INFO_BIT_LEN: usize = 15;

pub static VERSION_INFO_BIT_LEN: usize = 18;

pub static FORMAT_MASK: u32 = 0b101010000010010;

static FORMAT_INFO_GENERATOR: u32 = 0b10100110111;

static VERSION_INFO_GENERATOR: u32 = 0b1111100100101;

// Indexed by [ECLevel][Version]; index 0 is unused
static ECC_PER_BLOCK: [[usize; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

// Indexed by [ECLevel][Version]; index 0 is unused
static BLOCK_COUNT: [[usize; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];
