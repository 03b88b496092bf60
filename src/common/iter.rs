use super::metadata::Version;

// Iterator for placing data in encoding region of QR
//------------------------------------------------------------------------------

// Walks two-module wide columns from the right edge, alternating upward and downward,
// and skips the vertical timing column. Function modules are not filtered out, the
// caller places bits only on empty modules.
#[derive(Clone)]
pub struct EncRegionIter {
    right: i32,
    vert: i32,
    j: i32,
    w: i32,
}

impl EncRegionIter {
    pub fn new(ver: Version) -> Self {
        let w = ver.width() as i32;
        Self { right: w - 1, vert: 0, j: 0, w }
    }
}

impl Iterator for EncRegionIter {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.right < 1 {
            return None;
        }

        let c = self.right - self.j;
        let upward = (self.right + 1) & 2 == 0;
        let r = if upward { self.w - 1 - self.vert } else { self.vert };

        self.j += 1;
        if self.j == 2 {
            self.j = 0;
            self.vert += 1;
            if self.vert == self.w {
                self.vert = 0;
                self.right -= 2;
                if self.right == VERT_TIMING_COL {
                    self.right -= 1;
                }
            }
        }

        Some((r, c))
    }
}

#[cfg(test)]
mod iter_tests {
    use super::EncRegionIter;
    use crate::common::metadata::Version;

    #[test]
    fn test_enc_region_iter_start() {
        let coords: Vec<_> = EncRegionIter::new(Version::MIN).take(6).collect();
        assert_eq!(coords, [(20, 20), (20, 19), (19, 20), (19, 19), (18, 20), (18, 19)]);
    }

    #[test]
    fn test_enc_region_iter_turns_down() {
        let coords: Vec<_> = EncRegionIter::new(Version::MIN).skip(42).take(2).collect();
        assert_eq!(coords, [(0, 18), (0, 17)]);
    }

    #[test]
    fn test_enc_region_iter_skips_timing_col() {
        for v in 1..=40 {
            let ver = Version::new(v).unwrap();
            let w = ver.width() as i32;
            let coords: Vec<_> = EncRegionIter::new(ver).collect();
            assert_eq!(coords.len() as i32, w * (w - 1));
            assert!(coords.iter().all(|&(_, c)| c != 6));
        }
    }
}

// Global constants
//------------------------------------------------------------------------------

static VERT_TIMING_COL: i32 = 6;
