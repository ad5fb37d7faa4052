use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stereomatch::{
    block_match_disparity, BlockMatchConfig, BlockMatcher, ImageView, Metric, StereoError,
};

/// Row-injective texture with no zero pixels (for widths below 251).
fn texture(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push(((x * 7 + y * 13) % 251 + 1) as u8);
        }
    }
    data
}

/// Right view of a pair where every left pixel `x` appears at `x - shift`.
/// Columns with no source are filled with 0.
fn shift_left(data: &[u8], width: usize, height: usize, shift: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width.saturating_sub(shift) {
            out[y * width + x] = data[y * width + x + shift];
        }
    }
    out
}

fn random_image(rng: &mut StdRng, width: usize, height: usize) -> Vec<u8> {
    (0..width * height).map(|_| rng.random_range(0..=255)).collect()
}

#[test]
fn identical_images_give_zero_disparity() {
    let (width, height) = (24, 16);
    let data = texture(width, height);
    let view = ImageView::from_slice(&data, width, height).unwrap();

    for metric in [Metric::Sad, Metric::Ssd] {
        let map = block_match_disparity(view, view, 6, 5, metric).unwrap();
        for y in 2..height - 2 {
            for x in 2..width - 2 {
                assert_eq!(map.get(x, y), Some(0), "{metric:?} at ({x}, {y})");
            }
        }
    }
}

#[test]
fn recovers_known_shift() {
    let (width, height, shift) = (48, 32, 3);
    let left = texture(width, height);
    let right = shift_left(&left, width, height, shift);
    let left_view = ImageView::from_slice(&left, width, height).unwrap();
    let right_view = ImageView::from_slice(&right, width, height).unwrap();

    for window in [1, 3, 5] {
        let half = window / 2;
        for metric in [Metric::Sad, Metric::Ssd] {
            let map = block_match_disparity(left_view, right_view, 6, window, metric).unwrap();
            for y in half..height - half {
                for x in half + shift..width - half {
                    assert_eq!(
                        map.get(x, y),
                        Some(shift as u32),
                        "{metric:?} window {window} at ({x}, {y})"
                    );
                }
            }
        }
    }
}

#[test]
fn search_range_is_clipped_at_the_left_edge() {
    let (width, height, shift) = (48, 8, 3);
    let left = texture(width, height);
    let right = shift_left(&left, width, height, shift);
    let left_view = ImageView::from_slice(&left, width, height).unwrap();
    let right_view = ImageView::from_slice(&right, width, height).unwrap();

    let map = block_match_disparity(left_view, right_view, 6, 3, Metric::Sad).unwrap();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let d = map.get(x, y).unwrap();
            assert!(d as usize <= x - 1, "d={d} at ({x}, {y})");
        }
    }
}

#[test]
fn zero_max_disparity_yields_zero_everywhere_inside() {
    let mut rng = StdRng::seed_from_u64(7);
    let (width, height) = (20, 12);
    let left = random_image(&mut rng, width, height);
    let right = random_image(&mut rng, width, height);
    let left_view = ImageView::from_slice(&left, width, height).unwrap();
    let right_view = ImageView::from_slice(&right, width, height).unwrap();

    let map = block_match_disparity(left_view, right_view, 0, 3, Metric::Ssd).unwrap();
    assert_eq!(map.max_disparity(), 0);
    assert_eq!(map.valid_count(), (width - 2) * (height - 2));
    assert!(map.to_scaled_u8().unwrap().data().iter().all(|&v| v == 0));
}

#[test]
fn flat_black_pair_resolves_ties_to_zero() {
    let data = [0u8; 64];
    let view = ImageView::from_slice(&data, 8, 8).unwrap();

    let map = block_match_disparity(view, view, 4, 3, Metric::Sad).unwrap();
    for y in 0..8 {
        for x in 0..8 {
            let inside = (1..7).contains(&x) && (1..7).contains(&y);
            assert_eq!(map.is_valid(x, y), inside, "({x}, {y})");
            assert_eq!(map.value(x, y), Some(0));
        }
    }
}

#[test]
fn border_band_is_marked_invalid() {
    let (width, height) = (16, 12);
    let data = texture(width, height);
    let view = ImageView::from_slice(&data, width, height).unwrap();

    let map = block_match_disparity(view, view, 3, 5, Metric::Sad).unwrap();
    for y in 0..height {
        for x in 0..width {
            let inside = x >= 2 && x < width - 2 && y >= 2 && y < height - 2;
            assert_eq!(map.is_valid(x, y), inside, "({x}, {y})");
        }
    }
    assert_eq!(map.valid_count(), (width - 4) * (height - 4));
}

#[test]
fn rejects_invalid_windows() {
    let data = texture(10, 6);
    let view = ImageView::from_slice(&data, 10, 6).unwrap();

    for window in [0, 4] {
        let err = block_match_disparity(view, view, 2, window, Metric::Sad)
            .err()
            .unwrap();
        assert!(
            matches!(
                err,
                StereoError::InvalidParameter {
                    name: "window_size",
                    ..
                }
            ),
            "window {window}: {err:?}"
        );
    }

    // 7 > min(height, width) = 6.
    let err = block_match_disparity(view, view, 2, 7, Metric::Ssd)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        StereoError::InvalidParameter {
            name: "window_size",
            ..
        }
    ));

    assert!(block_match_disparity(view, view, 2, 5, Metric::Ssd).is_ok());
}

#[test]
fn rejects_mismatched_sizes() {
    let a = [0u8; 12];
    let b = [0u8; 12];
    let left = ImageView::from_slice(&a, 4, 3).unwrap();
    let right = ImageView::from_slice(&b, 3, 4).unwrap();

    let err = block_match_disparity(left, right, 2, 1, Metric::Sad)
        .err()
        .unwrap();
    assert_eq!(
        err,
        StereoError::LengthMismatch {
            context: "image width",
            left: 4,
            right: 3,
        }
    );

    let right = ImageView::from_slice(&b[..8], 4, 2).unwrap();
    let err = block_match_disparity(left, right, 2, 1, Metric::Sad)
        .err()
        .unwrap();
    assert_eq!(
        err,
        StereoError::LengthMismatch {
            context: "image height",
            left: 3,
            right: 2,
        }
    );
}

#[test]
fn empty_images_give_empty_maps() {
    let data: [u8; 0] = [];
    let view = ImageView::from_slice(&data, 0, 0).unwrap();

    let map = block_match_disparity(view, view, 8, 5, Metric::Sad).unwrap();
    assert!(map.is_empty());
    assert_eq!(map.width(), 0);
    assert_eq!(map.height(), 0);
    assert!(map.stats().is_none());
}

#[test]
fn repeated_runs_are_identical() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let (width, height) = (32, 20);
    let left = random_image(&mut rng, width, height);
    let right = random_image(&mut rng, width, height);
    let left_view = ImageView::from_slice(&left, width, height).unwrap();
    let right_view = ImageView::from_slice(&right, width, height).unwrap();

    let matcher = BlockMatcher::new(BlockMatchConfig {
        max_disparity: 9,
        window_size: 3,
        ..BlockMatchConfig::new(Metric::Ssd)
    });
    let first = matcher.compute(left_view, right_view).unwrap();
    let second = matcher.compute(left_view, right_view).unwrap();
    assert_eq!(first, second);

    let stats = first.stats().unwrap();
    assert!(stats.max <= 9);
    assert_eq!(stats.valid, (width - 2) * (height - 2));
}

#[test]
fn strided_views_match_contiguous_ones() {
    let (width, height, stride, shift) = (24, 10, 31, 2);
    let left = texture(width, height);
    let right = shift_left(&left, width, height, shift);

    let mut padded_left = vec![255u8; stride * height];
    let mut padded_right = vec![255u8; stride * height];
    for y in 0..height {
        padded_left[y * stride..y * stride + width]
            .copy_from_slice(&left[y * width..(y + 1) * width]);
        padded_right[y * stride..y * stride + width]
            .copy_from_slice(&right[y * width..(y + 1) * width]);
    }

    let contiguous = block_match_disparity(
        ImageView::from_slice(&left, width, height).unwrap(),
        ImageView::from_slice(&right, width, height).unwrap(),
        4,
        3,
        Metric::Sad,
    )
    .unwrap();
    let strided = block_match_disparity(
        ImageView::new(&padded_left, width, height, stride).unwrap(),
        ImageView::new(&padded_right, width, height, stride).unwrap(),
        4,
        3,
        Metric::Sad,
    )
    .unwrap();
    assert_eq!(contiguous, strided);
}

#[test]
fn scaled_output_maps_max_disparity_to_white() {
    let (width, height, shift) = (48, 16, 3);
    let left = texture(width, height);
    let right = shift_left(&left, width, height, shift);
    let left_view = ImageView::from_slice(&left, width, height).unwrap();
    let right_view = ImageView::from_slice(&right, width, height).unwrap();

    let map = block_match_disparity(left_view, right_view, 6, 3, Metric::Sad).unwrap();
    let scaled = map.to_scaled_u8().unwrap();
    // round(3 * 255 / 6) = round(127.5) = 128.
    assert_eq!(scaled.data()[8 * width + 20], 128);
    // Border pixels stay black.
    assert_eq!(scaled.data()[0], 0);
}
