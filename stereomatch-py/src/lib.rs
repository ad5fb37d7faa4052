//! Python bindings for the stereomatch disparity library.
//!
//! Exposes block matching, scanline alignment and the disparity map type to
//! Python via PyO3. Images are 2D `uint8` numpy arrays (height x width).

use numpy::{IntoPyArray, PyArray2, PyArrayMethods, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use stereomatch::{
    left_right_check, BlockMatchConfig, BlockMatcher, DisparityMap as RustDisparityMap,
    DisparityMapBuilder, ImageView, Metric as RustMetric, ScanlineConfig, StereoError,
};

/// Convert a StereoError to a Python exception.
fn to_py_err(err: StereoError) -> PyErr {
    match err {
        StereoError::ImageIo { .. } => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse_metric(metric: &str) -> PyResult<RustMetric> {
    match metric.to_lowercase().as_str() {
        "sad" => Ok(RustMetric::Sad),
        "ssd" => Ok(RustMetric::Ssd),
        _ => Err(PyValueError::new_err("metric must be 'sad' or 'ssd'")),
    }
}

fn view_of<'a>(image: &'a PyReadonlyArray2<'_, u8>) -> PyResult<ImageView<'a, u8>> {
    let shape = image.shape();
    let height = shape[0];
    let width = shape[1];
    let data = image.as_slice()?;
    ImageView::from_slice(data, width, height).map_err(to_py_err)
}

fn to_array2<'py, T: numpy::Element>(
    py: Python<'py>,
    data: Vec<T>,
    width: usize,
    height: usize,
) -> PyResult<Bound<'py, PyArray2<T>>> {
    data.into_pyarray(py).reshape([height, width])
}

/// Summary statistics over the valid cells of a disparity map.
#[pyclass]
#[derive(Clone)]
pub struct DisparityStats {
    #[pyo3(get)]
    pub min: u32,
    #[pyo3(get)]
    pub max: u32,
    #[pyo3(get)]
    pub mean: f64,
    /// Number of valid cells.
    #[pyo3(get)]
    pub valid: usize,
}

#[pymethods]
impl DisparityStats {
    fn __repr__(&self) -> String {
        format!(
            "DisparityStats(min={}, max={}, mean={:.3}, valid={})",
            self.min, self.max, self.mean, self.valid
        )
    }
}

/// Dense disparity map with a validity mask.
#[pyclass]
pub struct DisparityMap {
    inner: RustDisparityMap,
}

#[pymethods]
impl DisparityMap {
    /// Raw disparities as a uint32 array; invalid cells hold 0.
    #[getter]
    fn values<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<u32>>> {
        to_array2(
            py,
            self.inner.values().to_vec(),
            self.inner.width(),
            self.inner.height(),
        )
    }

    /// Validity mask as a bool array.
    #[getter]
    fn valid<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<bool>>> {
        let mask = self.inner.mask().iter().map(|&m| m != 0).collect();
        to_array2(py, mask, self.inner.width(), self.inner.height())
    }

    #[getter]
    fn width(&self) -> usize {
        self.inner.width()
    }

    #[getter]
    fn height(&self) -> usize {
        self.inner.height()
    }

    #[getter]
    fn max_disparity(&self) -> u32 {
        self.inner.max_disparity()
    }

    /// Disparity at (x, y), or None if the cell is invalid or out of range.
    fn get(&self, x: usize, y: usize) -> Option<u32> {
        self.inner.get(x, y)
    }

    /// Min/max/mean over valid cells, or None if there are none.
    fn stats(&self) -> Option<DisparityStats> {
        self.inner.stats().map(|s| DisparityStats {
            min: s.min,
            max: s.max,
            mean: s.mean,
            valid: s.valid,
        })
    }

    /// Disparities scaled to [0, 255] for display.
    ///
    /// Args:
    ///     bound: Disparity drawn as 255 (default: the map's max_disparity)
    #[pyo3(signature = (bound = None))]
    fn to_u8<'py>(
        &self,
        py: Python<'py>,
        bound: Option<u32>,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let bound = bound.unwrap_or(self.inner.max_disparity());
        let scaled = self
            .inner
            .to_scaled_u8_with_bound(bound)
            .map_err(to_py_err)?;
        let (width, height) = (scaled.width(), scaled.height());
        to_array2(py, scaled.into_vec(), width, height)
    }

    /// Save the scaled map as an 8-bit grayscale image.
    ///
    /// Args:
    ///     path: Output path; the format follows the extension
    ///     bound: Disparity drawn as white (default: the map's max_disparity)
    #[pyo3(signature = (path, bound = None))]
    fn save(&self, path: &str, bound: Option<u32>) -> PyResult<()> {
        let bound = bound.unwrap_or(self.inner.max_disparity());
        stereomatch::io::save_disparity_image_with_bound(&self.inner, bound, path)
            .map_err(to_py_err)
    }

    /// Keep only disparities confirmed by a right-referenced map.
    ///
    /// Args:
    ///     right: Right-referenced DisparityMap of the same size
    ///     tolerance: Allowed difference in pixels (default: 1)
    #[pyo3(signature = (right, tolerance = 1))]
    fn cross_check(&self, right: &DisparityMap, tolerance: u32) -> PyResult<DisparityMap> {
        let inner = left_right_check(&self.inner, &right.inner, tolerance).map_err(to_py_err)?;
        Ok(DisparityMap { inner })
    }

    fn __repr__(&self) -> String {
        format!(
            "DisparityMap({}x{}, max_disparity={}, valid={})",
            self.inner.width(),
            self.inner.height(),
            self.inner.max_disparity(),
            self.inner.valid_count()
        )
    }
}

/// Block-matching disparity for a rectified image pair.
///
/// Args:
///     left: 2D uint8 numpy array (height x width)
///     right: 2D uint8 numpy array of the same shape
///     metric: "sad" or "ssd" (required)
///     max_disparity: Largest disparity searched (default: 16)
///     window_size: Odd window side length (default: 5)
///     parallel: Scan rows in parallel (default: True)
///
/// Returns:
///     Left-referenced DisparityMap
#[pyfunction]
#[pyo3(signature = (left, right, metric, max_disparity = 16, window_size = 5, parallel = true))]
fn block_match(
    left: PyReadonlyArray2<'_, u8>,
    right: PyReadonlyArray2<'_, u8>,
    metric: &str,
    max_disparity: usize,
    window_size: usize,
    parallel: bool,
) -> PyResult<DisparityMap> {
    let matcher = BlockMatcher::new(BlockMatchConfig {
        max_disparity,
        window_size,
        metric: parse_metric(metric)?,
        parallel,
    });
    let inner = matcher
        .compute(view_of(&left)?, view_of(&right)?)
        .map_err(to_py_err)?;
    Ok(DisparityMap { inner })
}

/// Scanline (dynamic programming) disparity for a rectified image pair.
///
/// Args:
///     left: 2D uint8 numpy array (height x width)
///     right: 2D uint8 numpy array of the same shape
///     sigma: Intensity normalization (default: 2.0)
///     occlusion_cost: Cost of skipping one pixel (default: 1.0)
///     parallel: Align rows in parallel (default: True)
///
/// Returns:
///     Tuple (left_map, right_map) of DisparityMap
#[pyfunction]
#[pyo3(signature = (left, right, sigma = 2.0, occlusion_cost = 1.0, parallel = true))]
fn scanline(
    left: PyReadonlyArray2<'_, u8>,
    right: PyReadonlyArray2<'_, u8>,
    sigma: f64,
    occlusion_cost: f64,
    parallel: bool,
) -> PyResult<(DisparityMap, DisparityMap)> {
    let builder = DisparityMapBuilder::new(ScanlineConfig {
        sigma,
        occlusion_cost,
        parallel,
    });
    let maps = builder
        .build(view_of(&left)?, view_of(&right)?)
        .map_err(to_py_err)?;
    Ok((
        DisparityMap { inner: maps.left },
        DisparityMap { inner: maps.right },
    ))
}

/// Align a single pair of rows.
///
/// Args:
///     left: Sequence of intensities
///     right: Sequence of intensities with the same length
///     sigma: Intensity normalization (default: 2.0)
///     occlusion_cost: Cost of skipping one pixel (default: 1.0)
///
/// Returns:
///     Tuple (left_disparities, right_disparities, cost); occluded pixels are None
#[pyfunction]
#[pyo3(signature = (left, right, sigma = 2.0, occlusion_cost = 1.0))]
fn align_scanline(
    left: Vec<f64>,
    right: Vec<f64>,
    sigma: f64,
    occlusion_cost: f64,
) -> PyResult<(Vec<Option<u32>>, Vec<Option<u32>>, f64)> {
    let out =
        stereomatch::align_scanline(&left, &right, sigma, occlusion_cost).map_err(to_py_err)?;
    Ok((out.left, out.right, out.cost))
}

/// Load an image file as a 2D uint8 grayscale array.
#[pyfunction]
fn load_gray<'py>(py: Python<'py>, path: &str) -> PyResult<Bound<'py, PyArray2<u8>>> {
    let owned = stereomatch::io::load_gray_image(path).map_err(to_py_err)?;
    let (width, height) = (owned.width(), owned.height());
    to_array2(py, owned.into_vec(), width, height)
}

/// Python module for stereomatch disparity estimation.
#[pymodule]
fn _stereomatch(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<DisparityMap>()?;
    m.add_class::<DisparityStats>()?;
    m.add_function(wrap_pyfunction!(block_match, m)?)?;
    m.add_function(wrap_pyfunction!(scanline, m)?)?;
    m.add_function(wrap_pyfunction!(align_scanline, m)?)?;
    m.add_function(wrap_pyfunction!(load_gray, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
