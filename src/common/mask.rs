use std::ops::Deref;

use super::error::{QRError, QRResult};
use super::metadata::Color;
use crate::builder::QR;

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> QRResult<Self> {
        if pattern < 8 {
            Ok(Self(pattern))
        } else {
            Err(QRError::InvalidMaskingPattern)
        }
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(r: i32, c: i32) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i32, _: i32) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i32, c: i32) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i32, c: i32) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i32, c: i32) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i32, c: i32) -> bool {
        ((r * c) & 1) + ((r * c) % 3) == 0
    }

    pub fn diamonds(r: i32, c: i32) -> bool {
        (((r * c) & 1) + ((r * c) % 3)) & 1 == 0
    }

    pub fn meadow(r: i32, c: i32) -> bool {
        (((r + c) & 1) + ((r * c) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    // Returns true for (row, col) positions whose data module gets flipped
    pub fn mask_function(self) -> fn(i32, i32) -> bool {
        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Invalid mask pattern"),
        }
    }
}

// Penalty scoring
//------------------------------------------------------------------------------

pub fn apply_best_mask(qr: &mut QR) -> MaskPattern {
    let best_mask = (0..8)
        .map(MaskPattern)
        .min_by_key(|&m| {
            let mut qr = qr.clone();
            qr.apply_mask(m);
            compute_total_penalty(&qr)
        })
        .unwrap_or(MaskPattern(0));
    qr.apply_mask(best_mask);
    best_mask
}

pub fn compute_total_penalty(qr: &QR) -> u32 {
    let w = qr.width() as i32;
    let mut lines = Vec::with_capacity(2 * w as usize);
    for i in 0..w {
        lines.push((0..w).map(|j| *qr.get(i, j)).collect::<Vec<Color>>());
        lines.push((0..w).map(|j| *qr.get(j, i)).collect::<Vec<Color>>());
    }

    let run_pen: u32 = lines.iter().map(|l| compute_run_penalty(l)).sum();
    let finder_pen: u32 = lines.iter().map(|l| compute_finder_pattern_penalty(l)).sum();
    run_pen + finder_pen + compute_block_penalty(qr) + compute_balance_penalty(qr)
}

// Runs of 5 or more same coloured modules score 3, plus 1 per extra module
fn compute_run_penalty(line: &[Color]) -> u32 {
    let mut pen = 0;
    let mut run = 0;
    let mut last = None;
    for &clr in line {
        if last == Some(clr) {
            run += 1;
        } else {
            last = Some(clr);
            run = 1;
        }
        match run {
            5 => pen += 3,
            6.. => pen += 1,
            _ => (),
        }
    }
    pen
}

// Every 2x2 block of a single colour scores 3
fn compute_block_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i32;
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = *qr.get(r, c);
            if clr == *qr.get(r + 1, c) && clr == *qr.get(r, c + 1) && clr == *qr.get(r + 1, c + 1)
            {
                pen += 3;
            }
        }
    }
    pen
}

// A 1:1:3:1:1 finder-like run with 4 light modules on either side scores 40.
// Modules outside the symbol count as light.
fn compute_finder_pattern_penalty(line: &[Color]) -> u32 {
    let w = line.len() as i32;
    let is_light = |i: i32| i < 0 || i >= w || line[i as usize] == Color::Light;
    let mut pen = 0;
    for j in 0..=w - 7 {
        let matches = FINDER_LIKE.iter().enumerate().all(|(k, clr)| line[(j as usize) + k] == *clr);
        if !matches {
            continue;
        }
        if (j - 4..j).all(is_light) || (j + 7..j + 11).all(is_light) {
            pen += 40;
        }
    }
    pen
}

// 10 points for every 5% the dark ratio deviates from 50%
fn compute_balance_penalty(qr: &QR) -> u32 {
    let dark = qr.count_dark_modules();
    let w = qr.width();
    let total = w * w;
    let percent = dark * 100 / total;
    let deviation = percent.abs_diff(50);
    (deviation / 5 * 10) as u32
}


// Global constants
//------------------------------------------------------------------------------

static FINDER_LIKE: [Color; 7] = [
    Color::Dark,
    Color::Light,
    Color::Dark,
    Color::Dark,
    Color::Dark,
    Color::Light,
    Color::Dark,
];
