use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates a high-contrast checkerboard image.
pub fn checkerboard_u8(width: usize, height: usize, cell: usize, lo: u8, hi: u8) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(cell > 0, "cell size must be positive");

    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let cx = (x / cell) as i32;
            let cy = (y / cell) as i32;
            let sum = cx + cy;
            img[y * width + x] = if sum & 1 == 0 { lo } else { hi };
        }
    }
    img
}

/// Single vertical step edge: `lo` left of `split_x`, `hi` from it on.
pub fn step_edge_u8(width: usize, height: usize, split_x: usize, lo: u8, hi: u8) -> Vec<u8> {
    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            img[y * width + x] = if x < split_x { lo } else { hi };
        }
    }
    img
}

/// Flat image of a single value.
pub fn constant_u8(width: usize, height: usize, value: u8) -> Vec<u8> {
    vec![value; width * height]
}

/// Single bright pixel on a dark background.
pub fn impulse_u8(width: usize, height: usize, x: usize, y: usize, value: u8) -> Vec<u8> {
    let mut img = vec![0u8; width * height];
    img[y * width + x] = value;
    img
}

/// Seeded uniform noise, reproducible across runs.
pub fn noise_u8(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.random_range(0..=255)).collect()
}
