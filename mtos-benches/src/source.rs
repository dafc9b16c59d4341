//! Seeded synthetic images.
//!
//! Images are drawn as square blocks of uniformly random levels, so the
//! number of shapes grows with `(side / block)^2` while staying reproducible
//! for a given seed.

use mtos_core::{Domain, Image2d};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::error::BenchSetupError;

/// Configuration for synthetic image generation.
#[derive(Clone, Copy, Debug)]
pub struct SyntheticConfig {
    /// Side length of the square image.
    pub side: usize,
    /// Side length of the constant blocks; clamped to at least 1.
    pub block: usize,
    /// Number of distinct levels, spread evenly over `0..=255`.
    pub levels: usize,
    /// RNG seed.
    pub seed: u64,
}

/// Generates one 8-bit channel.
///
/// # Errors
/// Returns [`BenchSetupError::InvalidLevels`] unless `levels` lies in
/// `1..=256`.
///
/// # Examples
/// ```
/// use mtos_benches::source::{SyntheticConfig, generate_channel};
///
/// let config = SyntheticConfig { side: 8, block: 4, levels: 2, seed: 7 };
/// let image = generate_channel(&config)?;
/// assert_eq!(image.domain().len(), 64);
/// assert!(image.iter().all(|&value| value == 0 || value == 255));
/// # Ok::<(), mtos_benches::error::BenchSetupError>(())
/// ```
pub fn generate_channel(config: &SyntheticConfig) -> Result<Image2d<u8>, BenchSetupError> {
    validate(config)?;
    draw(config)
}

/// Generates `count` independent channels, seeding channel `c` with `seed + c`.
///
/// # Errors
/// Same as [`generate_channel`].
pub fn generate_channels(
    config: &SyntheticConfig,
    count: u64,
) -> Result<Vec<Image2d<u8>>, BenchSetupError> {
    validate(config)?;
    (0..count)
        .map(|channel| {
            draw(&SyntheticConfig {
                seed: config.seed.wrapping_add(channel),
                ..*config
            })
        })
        .collect()
}

fn validate(config: &SyntheticConfig) -> Result<(), BenchSetupError> {
    if (1..=256).contains(&config.levels) {
        Ok(())
    } else {
        Err(BenchSetupError::InvalidLevels {
            levels: config.levels,
        })
    }
}

#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "levels and block coordinates are whole-number steps"
)]
fn draw(config: &SyntheticConfig) -> Result<Image2d<u8>, BenchSetupError> {
    let step = if config.levels == 1 {
        0
    } else {
        255 / (config.levels - 1)
    };
    let block = config.block.max(1);
    let blocks = config.side.div_ceil(block);

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let coarse: Vec<u8> = (0..blocks * blocks)
        .map(|_| {
            let level = rng.gen_range(0..config.levels) * step;
            u8::try_from(level).unwrap_or(u8::MAX)
        })
        .collect();

    let side = config.side;
    let data = (0..side * side)
        .map(|index| {
            let (y, x) = (index / side, index % side);
            coarse
                .get((y / block) * blocks + x / block)
                .copied()
                .unwrap_or_default()
        })
        .collect();
    Image2d::from_vec(Domain::new(side, side), data).map_err(BenchSetupError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    const fn config(levels: usize) -> SyntheticConfig {
        SyntheticConfig {
            side: 10,
            block: 3,
            levels,
            seed: 42,
        }
    }

    #[test]
    fn same_seed_same_image() {
        let first = generate_channel(&config(16)).expect("valid levels");
        let second = generate_channel(&config(16)).expect("valid levels");
        assert_eq!(first, second);
    }

    #[test]
    fn blocks_are_constant() {
        let image = generate_channel(&config(256)).expect("valid levels");
        let row = image.as_slice();
        assert_eq!(row[0], row[1]);
        assert_eq!(row[0], row[2]);
        assert_eq!(row[0], row[10]);
        assert_eq!(row[0], row[22]);
    }

    #[rstest]
    #[case::none(0)]
    #[case::too_many(257)]
    fn level_count_must_fit_a_byte(#[case] levels: usize) {
        let err = generate_channel(&config(levels)).expect_err("invalid levels");
        assert!(matches!(err, BenchSetupError::InvalidLevels { levels: got } if got == levels));
    }

    #[test]
    fn channels_use_distinct_seeds() {
        let channels = generate_channels(&config(256), 2).expect("valid levels");
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].domain(), channels[1].domain());
        assert_ne!(channels[0], channels[1]);
    }
}
