// image.rs — Runtime-sized 2D array, generic over sample type.
//
// Every 2D quantity in the pipeline lives in an `Image<T>`: the stimulus,
// the space-time kernels, the response maps and the energy maps.
//
// AXIS CONVENTION (checked everywhere, never implied by position alone):
//   x / column / width  → SPACE
//   y / row    / height → TIME
//
// So a kernel of shape [nt, nx] is an `Image` with width = nx and
// height = nt, and `get(x, y)` reads space sample x at time sample y.
//
// Memory layout is row-major and contiguous (one time slice per row):
//
//   data index:  0  1  2  3 | 4  5  6  7 | 8  9 10 11
//   sample:      ■  ■  ■  ■ | ■  ■  ■  ■ | ■  ■  ■  ■
//   row:         |- t = 0 -|  |- t = 1 -|  |- t = 2 -|

use std::fmt;

// ---------------------------------------------------------------------------
// Pixel Trait
// ---------------------------------------------------------------------------
// Stimuli arrive in whatever numeric type the acquisition layer produced
// (8-bit frames, 16-bit sensor counts, floats). All filtering accumulates in
// f64, so the only requirement on a sample type is a lossless-enough trip
// through f64.

/// Trait for types that can serve as samples in an Image.
pub trait Pixel: Copy + Default + Send + Sync + PartialOrd + 'static {
    /// Convert this sample to f64 (raw value, not normalized).
    fn to_f64(self) -> f64;

    /// Construct a sample from an f64 value (with clamping/rounding where
    /// the type needs it).
    fn from_f64(v: f64) -> Self;
}

impl Pixel for u8 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v.clamp(0.0, 255.0).round() as u8
    }
}

impl Pixel for u16 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v.clamp(0.0, 65535.0).round() as u16
    }
}

impl Pixel for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Pixel for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

// ---------------------------------------------------------------------------
// Image<T>
// ---------------------------------------------------------------------------

/// A 2D array with runtime dimensions, generic over sample type `T`.
#[derive(Clone, PartialEq)]
pub struct Image<T: Pixel> {
    /// Samples in row-major order. Length = height * width.
    data: Vec<T>,
    /// Number of columns (space samples).
    width: usize,
    /// Number of rows (time samples).
    height: usize,
}

impl<T: Pixel> Image<T> {
    // --- Constructors ---

    /// Create a zero-initialized image with the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Image {
            data: vec![T::default(); height * width],
            width,
            height,
        }
    }

    /// Create an image from an existing sample vector in row-major order.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "data length ({}) must equal width * height ({})",
            data.len(),
            width * height,
        );
        Image {
            data,
            width,
            height,
        }
    }

    /// Create an image by evaluating `f(x, y)` at every position.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Image {
            data,
            width,
            height,
        }
    }

    // --- Accessors ---

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of samples (width * height).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the sample at (x, y). x is column (space), y is row (time).
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.bounds_check(x, y);
        self.data[y * self.width + x]
    }

    /// Set the sample at (x, y).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.bounds_check(x, y);
        self.data[y * self.width + x] = value;
    }

    /// Borrow a single row (one time slice) as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Iterate over all samples as `(x, y, value)` tuples, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| (x, y, self.data[y * self.width + x]))
        })
    }

    /// Access the underlying data as a flat row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Apply `f` to every sample, producing a new image of the same shape.
    pub fn map<U: Pixel>(&self, f: impl Fn(T) -> U) -> Image<U> {
        Image {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Swap rows and columns.
    pub fn transpose(&self) -> Image<T> {
        Image::from_fn(self.height, self.width, |x, y| self.get(y, x))
    }

    /// Reverse the row order (time reversal for a time-major array).
    pub fn flip_rows(&self) -> Image<T> {
        let mut data = Vec::with_capacity(self.data.len());
        for y in (0..self.height).rev() {
            data.extend_from_slice(self.row(y));
        }
        Image {
            data,
            width: self.width,
            height: self.height,
        }
    }

    // --- Internal helpers ---

    #[inline]
    fn bounds_check(&self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "sample ({x},{y}) out of bounds for image {}×{}",
            self.width,
            self.height,
        );
    }
}

// ---------------------------------------------------------------------------
// f64 arithmetic
// ---------------------------------------------------------------------------
// The pipeline's algebra (outer products, signed sums of kernels, squaring,
// pooling) only ever happens on f64 images.

impl Image<f64> {
    /// Outer product `col ⊗ row`: sample (x, y) = col[y] * row[x].
    ///
    /// With a temporal filter as `col` and a spatial filter as `row`, this
    /// yields a [time, space] kernel.
    pub fn outer(col: &[f64], row: &[f64]) -> Self {
        Image::from_fn(row.len(), col.len(), |x, y| col[y] * row[x])
    }

    /// Element-wise `a * self + b * other`.
    ///
    /// # Panics
    /// Panics if the shapes differ.
    pub fn linear_combination(&self, a: f64, other: &Image<f64>, b: f64) -> Image<f64> {
        self.zip_with(other, |p, q| a * p + b * q)
    }

    /// Combine two same-shaped images sample by sample.
    ///
    /// # Panics
    /// Panics if the shapes differ.
    pub fn zip_with(&self, other: &Image<f64>, f: impl Fn(f64, f64) -> f64) -> Image<f64> {
        assert!(
            self.width == other.width && self.height == other.height,
            "shape mismatch: {}×{} vs {}×{}",
            self.width,
            self.height,
            other.width,
            other.height,
        );
        Image {
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&p, &q)| f(p, q))
                .collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Sum of all samples.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// `(min, max)` over all samples, or `None` for an empty image.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut it = self.data.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

// Debug formatting: prints the top-left corner, enough for test failures.
impl<T: Pixel + fmt::Debug> fmt::Debug for Image<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Image<{}> {{ {}×{} }}",
            std::any::type_name::<T>(),
            self.width,
            self.height,
        )?;
        for y in 0..self.height.min(8) {
            write!(f, "  row {y}: [")?;
            for x in 0..self.width.min(8) {
                if x > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", self.get(x, y))?;
            }
            if self.width > 8 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.height > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Index: img[(x, y)] syntax
// ---------------------------------------------------------------------------

impl<T: Pixel> std::ops::Index<(usize, usize)> for Image<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        self.bounds_check(x, y);
        &self.data[y * self.width + x]
    }
}

impl<T: Pixel> std::ops::IndexMut<(usize, usize)> for Image<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        self.bounds_check(x, y);
        let idx = y * self.width + x;
        &mut self.data[idx]
    }
}
