use std::time::Duration;

use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, SamplingMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SMALL_RUNTIME_SAMPLE_SIZE: usize = 15;
const SMALL_RUNTIME_WARM_UP_MS: u64 = 80;
const SMALL_RUNTIME_MEASURE_MS: u64 = 150;
const LARGE_RUNTIME_SAMPLE_SIZE: usize = 10;
const LARGE_RUNTIME_WARM_UP_MS: u64 = 200;
const LARGE_RUNTIME_MEASURE_MS: u64 = 500;
const LARGE_RUNTIME_MIN_LEN: usize = 65536;
const RNG_SEED: u64 = 0x5EED_2026;

/// Input shapes that drive the sorter down different code paths.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Pattern {
    RandomUniform,
    Ascending,
    Descending,
    NearlySorted1pctSwaps,
    FewUnique,
    Sawtooth,
    /// Sorted blocks followed by the same number of reversed sorted blocks.
    BlocksThenReversedBlocks,
}

pub const ALL_PATTERNS: [Pattern; 7] = [
    Pattern::RandomUniform,
    Pattern::Ascending,
    Pattern::Descending,
    Pattern::NearlySorted1pctSwaps,
    Pattern::FewUnique,
    Pattern::Sawtooth,
    Pattern::BlocksThenReversedBlocks,
];

impl Pattern {
    pub fn label(self) -> &'static str {
        match self {
            Self::RandomUniform => "random_uniform",
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::NearlySorted1pctSwaps => "nearly_sorted_1pct_swaps",
            Self::FewUnique => "few_unique",
            Self::Sawtooth => "sawtooth",
            Self::BlocksThenReversedBlocks => "blocks_then_reversed_blocks",
        }
    }
}

pub fn default_rng() -> StdRng {
    StdRng::seed_from_u64(RNG_SEED)
}

pub fn generate(pattern: Pattern, len: usize, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(mix_seed(seed ^ pattern as u64));
    let mut data = Vec::with_capacity(len);

    match pattern {
        Pattern::RandomUniform => {
            for _ in 0..len {
                data.push(rng.random::<u64>());
            }
        }
        Pattern::Ascending => data.extend(0..len as u64),
        Pattern::Descending => data.extend((0..len as u64).rev()),
        Pattern::NearlySorted1pctSwaps => {
            data.extend(0..len as u64);
            if len > 1 {
                for _ in 0..(len / 100).max(1) {
                    let a = rng.random_range(0..len);
                    let b = rng.random_range(0..len);
                    data.swap(a, b);
                }
            }
        }
        Pattern::FewUnique => {
            for _ in 0..len {
                data.push(rng.random_range(0..16_u64) * 17);
            }
        }
        Pattern::Sawtooth => {
            let tooth = (len / 16).max(1) as u64;
            data.extend((0..len as u64).map(|i| i % tooth));
        }
        Pattern::BlocksThenReversedBlocks => {
            let half = len / 2;
            let blocks = 8;
            push_sorted_blocks(&mut data, &mut rng, half, blocks, false);
            push_sorted_blocks(&mut data, &mut rng, len - half, blocks, true);
        }
    }

    debug_assert_eq!(data.len(), len);
    data
}

fn push_sorted_blocks(
    data: &mut Vec<u64>,
    rng: &mut StdRng,
    len: usize,
    blocks: usize,
    reversed: bool,
) {
    let block = len.div_ceil(blocks).max(1);
    let mut remaining = len;
    while remaining > 0 {
        let size = block.min(remaining);
        let mut chunk: Vec<u64> = (0..size).map(|_| rng.random_range(0..1 << 20)).collect();
        chunk.sort_unstable();
        if reversed {
            chunk.reverse();
        }
        data.extend_from_slice(&chunk);
        remaining -= size;
    }
}

pub fn apply_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>, len: usize) {
    if len < LARGE_RUNTIME_MIN_LEN {
        group.sampling_mode(SamplingMode::Auto);
        group.sample_size(SMALL_RUNTIME_SAMPLE_SIZE);
        group.warm_up_time(Duration::from_millis(SMALL_RUNTIME_WARM_UP_MS));
        group.measurement_time(Duration::from_millis(SMALL_RUNTIME_MEASURE_MS));
    } else {
        group.sampling_mode(SamplingMode::Flat);
        group.sample_size(LARGE_RUNTIME_SAMPLE_SIZE);
        group.warm_up_time(Duration::from_millis(LARGE_RUNTIME_WARM_UP_MS));
        group.measurement_time(Duration::from_millis(LARGE_RUNTIME_MEASURE_MS));
    }
}

#[inline]
pub fn mix_seed(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
