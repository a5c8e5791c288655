//! The "swap-or-not" shuffle: maps a single index to its permuted position
//! under a seed, without materialising the whole permutation.

use ethereum_hashing::hash;

/// Lists larger than this are rejected; the protocol never shuffles lists
/// anywhere near this size and the bound keeps the arithmetic in `u64`.
const MAX_SHUFFLE_LIST_SIZE: usize = 1 << 24;

const SEED_SIZE: usize = 32;
const ROUND_SIZE: usize = 1;
const POSITION_WINDOW_SIZE: usize = 4;
const PIVOT_VIEW_SIZE: usize = SEED_SIZE + ROUND_SIZE;
const TOTAL_SIZE: usize = SEED_SIZE + ROUND_SIZE + POSITION_WINDOW_SIZE;

/// Returns the index of `index` after a swap-or-not shuffle of a list with
/// `list_size` elements, seeded with `seed` over `shuffle_round_count`
/// rounds.
///
/// Returns `None` when `index >= list_size`, when the list is empty or
/// oversized, or when `seed` is not `SEED_SIZE` bytes.
pub fn compute_shuffled_index(
    index: usize,
    list_size: usize,
    seed: &[u8],
    shuffle_round_count: u8,
) -> Option<usize> {
    if list_size == 0
        || index >= list_size
        || list_size > MAX_SHUFFLE_LIST_SIZE
        || seed.len() != SEED_SIZE
    {
        return None;
    }

    let mut buf = [0u8; TOTAL_SIZE];
    buf[0..SEED_SIZE].copy_from_slice(seed);

    let mut index = index as u64;
    let list_size = list_size as u64;

    for round in 0..shuffle_round_count {
        buf[SEED_SIZE] = round;

        let pivot = u64_from_le_bytes(&hash(&buf[0..PIVOT_VIEW_SIZE])[0..8]) % list_size;
        let flip = (pivot + (list_size - index)) % list_size;
        let position = std::cmp::max(index, flip);

        let position_window = (position / 256) as u32;
        buf[PIVOT_VIEW_SIZE..].copy_from_slice(&position_window.to_le_bytes());
        let source = hash(&buf);

        let byte = source[((position % 256) / 8) as usize];
        let bit = (byte >> (position % 8)) % 2;

        if bit == 1 {
            index = flip;
        }
    }

    Some(index as usize)
}

fn u64_from_le_bytes(bytes: &[u8]) -> u64 {
    let mut arr = [0u8; 8];
    arr.copy_from_slice(bytes);
    u64::from_le_bytes(arr)
}
