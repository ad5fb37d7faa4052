//! Scanline alignment against recorded cases and structural properties of the
//! cost matrix.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use stereomatch::lowlevel::{CostMatrix, Step};
use stereomatch::{align_scanline, ScanlineAligner, ScanlineConfig, StereoError};

const EPS: f64 = 1e-9;

#[derive(Debug, Deserialize)]
struct Case {
    case_id: String,
    left: Vec<u8>,
    right: Vec<u8>,
    sigma: f64,
    c0: f64,
    expected_left: Vec<Option<u32>>,
    expected_right: Vec<Option<u32>>,
    expected_cost: f64,
}

#[derive(Debug, Deserialize)]
struct Cases {
    cases: Vec<Case>,
}

fn load_cases() -> Vec<Case> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("scanline_cases.json");
    let text = fs::read_to_string(&path).expect("read scanline fixtures");
    let cases: Cases = serde_json::from_str(&text).expect("parse scanline fixtures");
    cases.cases
}

fn cfg(sigma: f64, c0: f64) -> ScanlineConfig {
    ScanlineConfig {
        sigma,
        occlusion_cost: c0,
        parallel: false,
    }
}

fn random_row(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.random_range(0..=255)).collect()
}

#[test]
fn recorded_cases_match() {
    let cases = load_cases();
    assert!(!cases.is_empty());
    for case in cases {
        let out = align_scanline(&case.left, &case.right, case.sigma, case.c0)
            .unwrap_or_else(|err| panic!("{}: {err}", case.case_id));
        assert_eq!(out.left, case.expected_left, "{} left", case.case_id);
        assert_eq!(out.right, case.expected_right, "{} right", case.case_id);
        assert!(
            (out.cost - case.expected_cost).abs() < EPS,
            "{} cost {} vs {}",
            case.case_id,
            out.cost,
            case.expected_cost
        );
    }
}

#[test]
fn single_feature_shift_cost_matrix() {
    let left = [10u8, 10, 10, 50, 10, 10];
    let right = [10u8, 10, 10, 10, 50, 10];
    let mut matrix = CostMatrix::new();
    matrix.build(&left, &right, &cfg(2.0, 1.0)).unwrap();

    let expected: [[f64; 7]; 7] = [
        [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        [1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        [2.0, 1.0, 0.0, 1.0, 2.0, 3.0, 4.0],
        [3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0],
        [4.0, 3.0, 2.0, 1.0, 2.0, 1.0, 2.0],
        [5.0, 4.0, 3.0, 2.0, 1.0, 2.0, 1.0],
        [6.0, 5.0, 4.0, 3.0, 2.0, 3.0, 2.0],
    ];
    for (i, row) in expected.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            assert_eq!(matrix.get(i, j), Some(value), "D[{i}, {j}]");
        }
    }
    assert_eq!(matrix.total_cost(), 2.0);

    let path = matrix.backtrace();
    let mut forward: Vec<Step> = path.steps().iter().map(|s| s.step).collect();
    forward.reverse();
    assert_eq!(
        forward,
        vec![
            Step::SkipRight,
            Step::Match,
            Step::Match,
            Step::Match,
            Step::Match,
            Step::SkipLeft,
            Step::Match,
        ]
    );
}

#[test]
fn path_is_monotone_and_reproduces_total_cost() {
    let mut rng = StdRng::seed_from_u64(42);
    let config = cfg(3.0, 1.5);
    let mut matrix = CostMatrix::new();
    for len in [1usize, 2, 7, 19, 40] {
        let left = random_row(&mut rng, len);
        let right = random_row(&mut rng, len);
        matrix.build(&left, &right, &config).unwrap();
        let path = matrix.backtrace();

        let first = path.steps().first().unwrap();
        assert_eq!((first.i, first.j), (len, len));
        let (mut i, mut j) = (len, len);
        for s in path.steps() {
            assert_eq!((s.i, s.j), (i, j));
            match s.step {
                Step::Match => {
                    i -= 1;
                    j -= 1;
                }
                Step::SkipLeft => i -= 1,
                Step::SkipRight => j -= 1,
            }
        }
        assert_eq!((i, j), (0, 0));

        let recomputed = path.cost(&left, &right, &config);
        assert!(
            (recomputed - matrix.total_cost()).abs() < 1e-6,
            "len {len}: {recomputed} vs {}",
            matrix.total_cost()
        );
    }
}

#[test]
fn cost_matrix_structural_bounds() {
    let mut rng = StdRng::seed_from_u64(1234);
    let c0 = 1.25;
    let mut matrix = CostMatrix::new();
    for _ in 0..20 {
        let len = rng.random_range(1..24);
        let left = random_row(&mut rng, len);
        let right = random_row(&mut rng, len);
        matrix.build(&left, &right, &cfg(4.0, c0)).unwrap();

        for i in 0..=len {
            for j in 0..=len {
                let d = matrix.get(i, j).unwrap();
                assert!(d >= c0 * i.abs_diff(j) as f64 - EPS, "lower bound at ({i}, {j})");
                if i < len && j < len {
                    let diag = matrix.get(i + 1, j + 1).unwrap();
                    assert!(d <= diag + EPS, "diagonal at ({i}, {j})");
                }
                if j < len {
                    let next = matrix.get(i, j + 1).unwrap();
                    assert!((next - d).abs() <= c0 + EPS, "column step at ({i}, {j})");
                }
                if i < len {
                    let next = matrix.get(i + 1, j).unwrap();
                    assert!((next - d).abs() <= c0 + EPS, "row step at ({i}, {j})");
                }
            }
        }
    }
}

#[test]
fn disparities_are_bounded_by_row_length() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut aligner = ScanlineAligner::new(cfg(2.0, 0.5));
    for _ in 0..10 {
        let len = rng.random_range(1..32);
        let left = random_row(&mut rng, len);
        let right = random_row(&mut rng, len);
        let out = aligner.align(&left, &right).unwrap();
        assert_eq!(out.left.len(), len);
        assert_eq!(out.right.len(), len);
        for d in out.left.iter().chain(&out.right).flatten() {
            assert!((*d as usize) < len);
        }
        // Every match assigns exactly one left and one right pixel.
        let matched_left = out.left.iter().filter(|d| d.is_some()).count();
        let matched_right = out.right.iter().filter(|d| d.is_some()).count();
        assert_eq!(matched_left, matched_right);
    }
}

#[test]
fn float_rows_are_accepted() {
    let left = [0.5f64, 10.25, 3.0];
    let out = align_scanline(&left, &left, 1.0, 1.0).unwrap();
    assert_eq!(out.left, vec![Some(0); 3]);
    assert_eq!(out.cost, 0.0);
}

#[test]
fn invalid_parameters_are_rejected() {
    let row = [1u8, 2, 3];
    assert_eq!(
        align_scanline(&row, &row, 0.0, 1.0).err().unwrap(),
        StereoError::DivisionByZero { name: "sigma" }
    );
    let shifted_left = [10u8, 10, 10, 50, 10, 10];
    let shifted_right = [10u8, 10, 10, 10, 50, 10];
    for sigma in [1e-200, -1e-170] {
        assert_eq!(
            align_scanline(&shifted_left, &shifted_right, sigma, 1.0)
                .err()
                .unwrap(),
            StereoError::DivisionByZero { name: "sigma" },
            "sigma {sigma}"
        );
    }
    for sigma in [-1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            align_scanline(&row, &row, sigma, 1.0),
            Err(StereoError::InvalidParameter { name: "sigma", .. })
        ));
    }
    for c0 in [0.0, -2.0, f64::NAN] {
        assert!(matches!(
            align_scanline(&row, &row, 2.0, c0),
            Err(StereoError::InvalidParameter {
                name: "occlusion_cost",
                ..
            })
        ));
    }
}

#[test]
fn mismatched_rows_are_rejected() {
    assert_eq!(
        align_scanline(&[1u8, 2, 3], &[1u8, 2], 2.0, 1.0)
            .err()
            .unwrap(),
        StereoError::LengthMismatch {
            context: "row length",
            left: 3,
            right: 2,
        }
    );
}
