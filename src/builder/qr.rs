use std::ops::Deref;

use image::GrayImage;

use crate::common::{
    bitstream::BitStream,
    iter::EncRegionIter,
    mask::MaskPattern,
    metadata::{format_info, Color, ECLevel, Version, FORMAT_INFO_BIT_LEN, VERSION_INFO_BIT_LEN},
};
use crate::render::{render, to_str, ModuleGrid, ScaleMode, QUIET_ZONE};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Module {
    Empty,
    Func(Color),
    Version(Color),
    Format(Color),
    Data(Color),
}

impl Deref for Module {
    type Target = Color;
    fn deref(&self) -> &Self::Target {
        match self {
            Module::Empty => &Color::Light,
            Module::Func(c) => c,
            Module::Version(c) => c,
            Module::Format(c) => c,
            Module::Data(c) => c,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QR {
    grid: Vec<Module>,
    w: usize,
    ver: Version,
    ecl: ECLevel,
    mask: Option<MaskPattern>,
}

// QR type for builder
//------------------------------------------------------------------------------

impl QR {
    pub(crate) fn new(ver: Version, ecl: ECLevel) -> Self {
        let w = ver.width();
        Self { grid: vec![Module::Empty; w * w], w, ver, ecl, mask: None }
    }

    pub fn version(&self) -> Version {
        self.ver
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }

    pub(crate) fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|&m| matches!(**m, Color::Dark)).count()
    }

    pub fn is_dark(&self, r: usize, c: usize) -> bool {
        *self.grid[r * self.w + c] == Color::Dark
    }

    pub fn to_grid(&self) -> ModuleGrid {
        let modules = self.grid.iter().map(|m| **m == Color::Dark).collect();
        ModuleGrid::new(self.w, modules)
    }

    #[cfg(test)]
    pub fn to_debug_str(&self) -> String {
        let w = self.w as i32;
        let mut res = String::with_capacity((w * (w + 1)) as usize);
        res.push('\n');
        for i in 0..w {
            for j in 0..w {
                let c = match self.get(i, j) {
                    Module::Empty => '.',
                    Module::Func(Color::Dark) => 'f',
                    Module::Func(Color::Light) => 'F',
                    Module::Version(Color::Dark) => 'v',
                    Module::Version(Color::Light) => 'V',
                    Module::Format(Color::Dark) => 'm',
                    Module::Format(Color::Light) => 'M',
                    Module::Data(Color::Dark) => 'd',
                    Module::Data(Color::Light) => 'D',
                };
                res.push(c);
            }
            res.push('\n');
        }
        res
    }

    // Negative coordinates count back from the bottom / right edge
    fn coord_to_index(&self, r: i32, c: i32) -> usize {
        let w = self.w as i32;
        debug_assert!(-w <= r && r < w, "Row {r} out of bounds for width {w}");
        debug_assert!(-w <= c && c < w, "Column {c} out of bounds for width {w}");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        (r * w + c) as _
    }

    pub(crate) fn get(&self, r: i32, c: i32) -> Module {
        self.grid[self.coord_to_index(r, c)]
    }

    pub(crate) fn set(&mut self, r: i32, c: i32, module: Module) {
        let index = self.coord_to_index(r, c);
        self.grid[index] = module;
    }
}


// Finder pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_finder_patterns(&mut self) {
        self.draw_finder_pattern_at(3, 3);
        self.draw_finder_pattern_at(3, -4);
        self.draw_finder_pattern_at(-4, 3);
    }

    // Draws the 7x7 finder along with its separator on the sides facing the symbol
    fn draw_finder_pattern_at(&mut self, r: i32, c: i32) {
        let (dr_top, dr_bottom): (i32, i32) = if r > 0 { (-3, 4) } else { (-4, 3) };
        let (dc_left, dc_right): (i32, i32) = if c > 0 { (-3, 4) } else { (-4, 3) };
        for i in dr_top..=dr_bottom {
            for j in dc_left..=dc_right {
                let clr = match i32::max(i.abs(), j.abs()) {
                    4 | 2 => Color::Light,
                    _ => Color::Dark,
                };
                self.set(r + i, c + j, Module::Func(clr));
            }
        }
    }
}


// Timing pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_timing_pattern(&mut self) {
        let last = self.w as i32 - 9;
        for k in 8..=last {
            let clr = if k & 1 == 0 { Color::Dark } else { Color::Light };
            self.set(6, k, Module::Func(clr));
            self.set(k, 6, Module::Func(clr));
        }
    }
}


// Alignment pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_alignment_patterns(&mut self) {
        let poses = self.ver.alignment_pattern();
        let last = self.w - 7;
        for &r in &poses {
            for &c in &poses {
                // Skip the three corners occupied by finders
                if (r == 6 && (c == 6 || c == last)) || (r == last && c == 6) {
                    continue;
                }
                self.draw_alignment_pattern_at(r as i32, c as i32);
            }
        }
    }

    fn draw_alignment_pattern_at(&mut self, r: i32, c: i32) {
        for i in -2..=2 {
            for j in -2..=2 {
                let clr = match i32::max(i32::abs(i), i32::abs(j)) {
                    1 => Color::Light,
                    _ => Color::Dark,
                };
                self.set(r + i, c + j, Module::Func(clr));
            }
        }
    }
}


// All function patterns
//------------------------------------------------------------------------------

impl QR {
    pub(crate) fn draw_all_function_patterns(&mut self) {
        self.draw_finder_patterns();
        self.draw_timing_pattern();
        self.draw_alignment_patterns();
    }
}

#[cfg(test)]
mod all_function_patterns_test {
    use super::QR;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_all_function_patterns() {
        let mut qr = QR::new(Version::new(3).unwrap(), ECLevel::L);
        qr.draw_all_function_patterns();
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             fffffffF.............Ffffffff\n\
             fFFFFFfF.............FfFFFFFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFFFFFfF.............FfFFFFFf\n\
             fffffffFfFfFfFfFfFfFfFfffffff\n\
             FFFFFFFF.............FFFFFFFF\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f.............fffff....\n\
             FFFFFFFF............fFFFf....\n\
             fffffffF............fFfFf....\n\
             fFFFFFfF............fFFFf....\n\
             fFfffFfF............fffff....\n\
             fFfffFfF.....................\n\
             fFfffFfF.....................\n\
             fFFFFFfF.....................\n\
             fffffffF.....................\n"
        );
    }
}

// Format & version info
//------------------------------------------------------------------------------

impl QR {
    fn reserve_format_area(&mut self) {
        self.draw_format_info((1 << FORMAT_INFO_BIT_LEN) - 1);
    }

    // Bit i of the format info lands on the i-th coordinate of both copies
    fn draw_format_info(&mut self, info: u32) {
        for (i, (&main, &side)) in
            FORMAT_INFO_COORDS_MAIN.iter().zip(FORMAT_INFO_COORDS_SIDE.iter()).enumerate()
        {
            let clr = Color::from((info >> i) & 1 == 1);
            self.set(main.0, main.1, Module::Format(clr));
            self.set(side.0, side.1, Module::Format(clr));
        }
        self.set(-8, 8, Module::Format(Color::Dark));
    }

    // Two 6x3 blocks, above the bottom left finder and left of the top right finder
    fn draw_version_info(&mut self) {
        if *self.ver < 7 {
            return;
        }
        let info = self.ver.info();
        for i in 0..VERSION_INFO_BIT_LEN {
            let clr = Color::from((info >> i) & 1 == 1);
            let a = (i % 3) as i32 - 11;
            let b = (i / 3) as i32;
            self.set(a, b, Module::Version(clr));
            self.set(b, a, Module::Version(clr));
        }
    }
}


// Encoding region
//------------------------------------------------------------------------------

impl QR {
    pub(crate) fn draw_encoding_region(&mut self, payload: BitStream) {
        self.reserve_format_area();
        self.draw_version_info();
        self.draw_payload(payload);

        debug_assert!(!self.grid.contains(&Module::Empty), "Empty module found after drawing");
    }

    fn draw_payload(&mut self, payload: BitStream) {
        let mut coords = EncRegionIter::new(self.ver);
        for bit in payload {
            let module = Module::Data(Color::from(bit));
            for (r, c) in coords.by_ref() {
                if matches!(self.get(r, c), Module::Empty) {
                    self.set(r, c, module);
                    break;
                }
            }
        }
        self.fill_remainder_bits(coords);
    }

    fn fill_remainder_bits(&mut self, coords: impl Iterator<Item = (i32, i32)>) {
        let mut n = 0;
        for (r, c) in coords {
            if matches!(self.get(r, c), Module::Empty) {
                self.set(r, c, Module::Data(Color::Light));
                n += 1;
            }
        }
        debug_assert_eq!(n, self.ver.remainder_bits(), "Unexpected remainder bit count");
    }

    pub(crate) fn apply_mask(&mut self, pattern: MaskPattern) {
        self.mask = Some(pattern);
        let mask_fn = pattern.mask_function();
        let w = self.w as i32;
        for r in 0..w {
            for c in 0..w {
                if let Module::Data(clr) = self.get(r, c) {
                    if mask_fn(r, c) {
                        self.set(r, c, Module::Data(!clr));
                    }
                }
            }
        }
        self.draw_format_info(format_info(self.ecl, pattern));
    }
}


// Render
//------------------------------------------------------------------------------

impl QR {
    // Integer scaled image with a standard quiet zone
    pub fn render(&self, module_sz: u32) -> GrayImage {
        let sz = (self.w as u32 + 2 * QUIET_ZONE) * module_sz;
        render(&self.to_grid(), QUIET_ZONE, sz, sz, ScaleMode::Fit)
    }

    pub fn to_str(&self, module_sz: usize) -> String {
        to_str(&self.to_grid(), QUIET_ZONE, module_sz)
    }
}


// Global constants
//------------------------------------------------------------------------------

// Indexed by bit position, least significant bit first
static FORMAT_INFO_COORDS_MAIN: [(i32, i32); 15] = [
    (0, 8),
    (1, 8),
    (2, 8),
    (3, 8),
    (4, 8),
    (5, 8),
    (7, 8),
    (8, 8),
    (8, 7),
    (8, 5),
    (8, 4),
    (8, 3),
    (8, 2),
    (8, 1),
    (8, 0),
];

static FORMAT_INFO_COORDS_SIDE: [(i32, i32); 15] = [
    (8, -1),
    (8, -2),
    (8, -3),
    (8, -4),
    (8, -5),
    (8, -6),
    (8, -7),
    (8, -8),
    (-7, 8),
    (-6, 8),
    (-5, 8),
    (-4, 8),
    (-3, 8),
    (-2, 8),
    (-1, 8),
];
