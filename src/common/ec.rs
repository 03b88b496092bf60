use std::ops::Deref;

use super::metadata::{ECLevel, Version};

// Error correction
//------------------------------------------------------------------------------

// Splits data codewords into blocks & computes ecc for each block
pub fn ecc(data: &[u8], ver: Version, ecl: ECLevel) -> (Vec<&[u8]>, Vec<Vec<u8>>) {
    let data_blocks = blockify(data, ver, ecl);

    let ecc_count = ver.ecc_per_block(ecl);
    let gen_poly = generator_polynomial(ecc_count);
    let ecc_blocks = data_blocks.iter().map(|b| ecc_per_block(b, &gen_poly)).collect();

    (data_blocks, ecc_blocks)
}

pub fn blockify(data: &[u8], ver: Version, ecl: ECLevel) -> Vec<&[u8]> {
    let (block1_size, block1_count, block2_size, block2_count) = ver.data_codewords_per_block(ecl);

    let total_block1_size = block1_size * block1_count;
    let total_size = total_block1_size + block2_size * block2_count;

    debug_assert!(
        total_size == data.len(),
        "Data len doesn't match total size of blocks: Data len {}, Total block size {}",
        data.len(),
        total_size
    );

    let mut data_blocks = Vec::with_capacity(block1_count + block2_count);
    data_blocks.extend(data[..total_block1_size].chunks(block1_size));
    if block2_size > 0 {
        data_blocks.extend(data[total_block1_size..].chunks(block2_size));
    }
    data_blocks
}

// Takes the i-th codeword of every block in turn, skipping blocks that are already exhausted
pub fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
    let max_block_size = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
    let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
    let mut res = Vec::with_capacity(total_size);
    for i in 0..max_block_size {
        for b in blocks {
            if i < b.len() {
                res.push(b[i]);
            }
        }
    }
    res
}

// Remainder of the data polynomial, shifted by the ecc count, divided by the
// generator polynomial. Its coefficients are the ecc.
fn ecc_per_block(block: &[u8], gen_poly: &[u8]) -> Vec<u8> {
    let ecc_count = gen_poly.len();
    let mut res = vec![0u8; ecc_count];

    for &b in block {
        let factor = b ^ res[0];
        res.rotate_left(1);
        res[ecc_count - 1] = 0;
        for (r, &g) in res.iter_mut().zip(gen_poly) {
            *r ^= gf_mul(g, factor);
        }
    }

    res
}

// Monic generator polynomial (x - a^0)(x - a^1)...(x - a^(n-1)), leading coefficient dropped
fn generator_polynomial(degree: usize) -> Vec<u8> {
    debug_assert!((1..=255).contains(&degree), "Invalid generator degree: {degree}");

    let mut res = vec![0u8; degree];
    res[degree - 1] = 1;

    let mut root = 1u8;
    for _ in 0..degree {
        for j in 0..degree {
            res[j] = gf_mul(res[j], root);
            if j + 1 < degree {
                res[j] ^= res[j + 1];
            }
        }
        root = gf_mul(root, 0x02);
    }
    res
}

// Galois field
//------------------------------------------------------------------------------

pub fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let log_sum = LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize;
    EXP_TABLE[log_sum % 255]
}

const fn build_exp_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut x = 1u16;
    let mut i = 0;
    while i < 256 {
        table[i] = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLYNOMIAL;
        }
        i += 1;
    }
    table
}

const fn build_log_table() -> [u8; 256] {
    let exp = build_exp_table();
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}


// Global constants
//------------------------------------------------------------------------------

const PRIMITIVE_POLYNOMIAL: u16 = 0x11D;

static EXP_TABLE: [u8; 256] = build_exp_table();

static LOG_TABLE: [u8; 256] = build_log_table();
