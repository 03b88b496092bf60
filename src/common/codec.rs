use log::trace;

use super::bitstream::BitStream;
use super::error::{QRError, QRResult};
use super::metadata::{ECLevel, Version};

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
}

impl Mode {
    pub fn contains(self, byte: u8) -> bool {
        match self {
            Self::Numeric => byte.is_ascii_digit(),
            Self::Alphanumeric => {
                matches!(byte, b'0'..=b'9' | b'A'..=b'Z' | b' ' | b'$' | b'%' | b'*' | b'+' | b'-' | b'.' | b'/' | b':')
            }
            Self::Byte => true,
        }
    }

    // Bytes packed into one chunk
    fn chunk_size(self) -> usize {
        match self {
            Self::Numeric => 3,
            Self::Alphanumeric => 2,
            Self::Byte => 1,
        }
    }

    // Bit length of `len` characters in this mode, header excluded
    pub fn encoded_len(self, len: usize) -> usize {
        match self {
            Self::Numeric => (len * 10).div_ceil(3),
            Self::Alphanumeric => (len * 11).div_ceil(2),
            Self::Byte => len * 8,
        }
    }

    // Cost of a single character in sixths of a bit, used by the segment optimiser
    fn char_cost(self) -> usize {
        match self {
            Self::Numeric => 20,
            Self::Alphanumeric => 33,
            Self::Byte => 48,
        }
    }

    pub fn encode_chunk(self, chunk: &[u8]) -> u16 {
        let len = chunk.len();
        debug_assert!(
            (1..=self.chunk_size()).contains(&len),
            "Invalid chunk length for {self:?}: {len}"
        );
        match self {
            Self::Numeric => chunk.iter().fold(0, |n, b| n * 10 + numeric_digit(*b)),
            Self::Alphanumeric => chunk.iter().fold(0, |n, b| n * 45 + alphanumeric_digit(*b)),
            Self::Byte => chunk[0] as u16,
        }
    }
}

fn numeric_digit(byte: u8) -> u16 {
    debug_assert!(Mode::Numeric.contains(byte), "Invalid numeric data: {byte}");
    (byte - b'0') as u16
}

fn alphanumeric_digit(byte: u8) -> u16 {
    match byte {
        b'0'..=b'9' => (byte - b'0') as u16,
        b'A'..=b'Z' => (byte - b'A' + 10) as u16,
        b' ' => 36,
        b'$' => 37,
        b'%' => 38,
        b'*' => 39,
        b'+' => 40,
        b'-' => 41,
        b'.' => 42,
        b'/' => 43,
        b':' => 44,
        _ => unreachable!("Invalid alphanumeric data: {byte}"),
    }
}

#[cfg(test)]
mod mode_tests {
    use super::Mode::*;
    use super::{alphanumeric_digit, numeric_digit};

    #[test]
    fn test_digits() {
        assert_eq!(numeric_digit(b'0'), 0);
        assert_eq!(numeric_digit(b'9'), 9);
        assert_eq!(alphanumeric_digit(b'A'), 10);
        assert_eq!(alphanumeric_digit(b'Z'), 35);
        assert_eq!(alphanumeric_digit(b' '), 36);
        assert_eq!(alphanumeric_digit(b':'), 44);
    }

    #[test]
    #[should_panic]
    fn test_invalid_alphanumeric_digit() {
        alphanumeric_digit(b'a');
    }

    #[test]
    fn test_numeric_encoding() {
        assert_eq!(Numeric.encode_chunk(b"012"), 0b0000001100);
        assert_eq!(Numeric.encode_chunk(b"345"), 0b0101011001);
        assert_eq!(Numeric.encode_chunk(b"67"), 0b1000011);
        assert_eq!(Numeric.encode_chunk(b"8"), 0b1000);
    }

    #[test]
    fn test_alphanumeric_encoding() {
        assert_eq!(Alphanumeric.encode_chunk(b"AC"), 0b00111001110);
        assert_eq!(Alphanumeric.encode_chunk(b"-4"), 0b11100111001);
        assert_eq!(Alphanumeric.encode_chunk(b"2"), 0b000010);
    }

    #[test]
    fn test_contains() {
        assert!(Numeric.contains(b'7'));
        assert!(!Numeric.contains(b'A'));
        assert!(Alphanumeric.contains(b'Z'));
        assert!(Alphanumeric.contains(b':'));
        assert!(!Alphanumeric.contains(b'a'));
        assert!(Byte.contains(0xF0));
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(Numeric.encoded_len(3), 10);
        assert_eq!(Numeric.encoded_len(2), 7);
        assert_eq!(Numeric.encoded_len(1), 4);
        assert_eq!(Alphanumeric.encoded_len(2), 11);
        assert_eq!(Alphanumeric.encoded_len(1), 6);
        assert_eq!(Byte.encoded_len(1), 8);
    }
}

// Segment
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub mode: Mode,
    pub data: &'a [u8],
}

impl<'a> Segment<'a> {
    pub fn new(mode: Mode, data: &'a [u8]) -> Self {
        Self { mode, data }
    }

    pub fn bit_len(&self, ver: Version) -> usize {
        ver.mode_bits() + ver.char_cnt_bits(self.mode) + self.mode.encoded_len(self.data.len())
    }
}


// Encoder
//------------------------------------------------------------------------------

// Encodes data into the smallest version which fits at the given ec level
pub fn encode(data: &[u8], ecl: ECLevel) -> QRResult<(BitStream, Version)> {
    let (ver, segs) = find_optimal_version_and_segments(data, ecl)?;
    Ok((write_segments(&segs, ver, ecl), ver))
}

pub fn encode_with_version(data: &[u8], ecl: ECLevel, ver: Version) -> QRResult<BitStream> {
    let segs = compute_optimal_segments(data, ver);
    let sz: usize = segs.iter().map(|s| s.bit_len(ver)).sum();
    if sz > ver.data_bit_capacity(ecl) {
        return Err(QRError::DataTooLong);
    }
    Ok(write_segments(&segs, ver, ecl))
}

fn write_segments(segs: &[Segment], ver: Version, ecl: ECLevel) -> BitStream {
    let mut bs = BitStream::new(ver.data_bit_capacity(ecl));
    for seg in segs {
        trace!("Pushing {:?} segment of {} bytes", seg.mode, seg.data.len());
        push_segment(seg, ver, &mut bs);
    }
    push_terminator(&mut bs);
    pad_remaining_capacity(&mut bs);
    bs
}

// Char count widths change at versions 10 & 27, so segments only need recomputing there
fn find_optimal_version_and_segments(
    data: &[u8],
    ecl: ECLevel,
) -> QRResult<(Version, Vec<Segment>)> {
    let mut segs = Vec::new();
    let mut sz = 0;
    for v in 1..=40 {
        let ver = Version::from_raw(v);
        if v == 1 || v == 10 || v == 27 {
            segs = compute_optimal_segments(data, ver);
            sz = segs.iter().map(|s| s.bit_len(ver)).sum();
        }
        if sz <= ver.data_bit_capacity(ecl) {
            return Ok((ver, segs));
        }
    }
    Err(QRError::DataTooLong)
}

// Dynamic programming over modes. Costs are in sixths of a bit so that numeric (10/3)
// and alphanumeric (11/2) characters have integral costs.
fn compute_optimal_segments(data: &[u8], ver: Version) -> Vec<Segment> {
    if data.is_empty() {
        return vec![Segment::new(Mode::Byte, data)];
    }

    let header_cost = |m: Mode| (ver.mode_bits() + ver.char_cnt_bits(m)) * 6;
    let mut cost = [usize::MAX; 3];
    // For each char & mode, the mode used by the previous char on the cheapest path
    let mut prev_mode = vec![[0usize; 3]; data.len()];

    for (i, &b) in data.iter().enumerate() {
        let mut next = [usize::MAX; 3];
        for (j, to) in MODES.iter().enumerate() {
            if !to.contains(b) {
                continue;
            }
            if i == 0 {
                next[j] = header_cost(*to) + to.char_cost();
                continue;
            }
            for (k, &from_cost) in cost.iter().enumerate() {
                if from_cost == usize::MAX {
                    continue;
                }
                let switch_cost =
                    if j == k { from_cost } else { from_cost.div_ceil(6) * 6 + header_cost(*to) };
                let total = switch_cost + to.char_cost();
                if total < next[j] {
                    next[j] = total;
                    prev_mode[i][j] = k;
                }
            }
        }
        cost = next;
    }

    let mut mi = (0..3).min_by_key(|&m| cost[m].saturating_add(5) / 6).unwrap_or(2);
    let mut char_modes = vec![Mode::Byte; data.len()];
    for i in (0..data.len()).rev() {
        char_modes[i] = MODES[mi];
        mi = prev_mode[i][mi];
    }

    build_segments(&char_modes, data)
}

fn build_segments<'a>(char_modes: &[Mode], data: &'a [u8]) -> Vec<Segment<'a>> {
    let mut segs = Vec::new();
    let mut start = 0;
    for i in 1..=data.len() {
        if i == data.len() || char_modes[i] != char_modes[start] {
            segs.push(Segment::new(char_modes[start], &data[start..i]));
            start = i;
        }
    }
    segs
}


// Writer for encoded data
//------------------------------------------------------------------------------

fn push_segment(seg: &Segment, ver: Version, out: &mut BitStream) {
    let len_bits = ver.char_cnt_bits(seg.mode);
    let char_cnt = seg.data.len();
    debug_assert!(
        char_cnt < (1 << len_bits),
        "Char count exceeds bit length: Char count {char_cnt}, Char count bits {len_bits}"
    );

    out.push_bits(seg.mode as u8, ver.mode_bits());
    out.push_bits(char_cnt as u16, len_bits);
    for chunk in seg.data.chunks(seg.mode.chunk_size()) {
        let bit_len = seg.mode.encoded_len(chunk.len());
        out.push_bits(seg.mode.encode_chunk(chunk), bit_len);
    }
}

fn push_terminator(out: &mut BitStream) {
    let term_len = std::cmp::min(4, out.capacity() - out.len());
    out.push_bits(0u8, term_len);
}

fn pad_remaining_capacity(out: &mut BitStream) {
    let offset = out.len() & 7;
    if offset > 0 {
        out.push_bits(0u8, 8 - offset);
    }

    let remain_byte_capacity = (out.capacity() - out.len()) >> 3;
    PADDING_CODEWORDS.iter().cycle().take(remain_byte_capacity).for_each(|pc| {
        out.push_bits(*pc, 8);
    });
}


// Global constants
//------------------------------------------------------------------------------

static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];

static MODES: [Mode; 3] = [Mode::Numeric, Mode::Alphanumeric, Mode::Byte];
