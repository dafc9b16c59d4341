//! Minimal 2D image support consumed by the tree builders.
//!
//! Images are dense row-major buffers addressed either by [`Point`] or by
//! linear index (`y * width + x`). Tree builders only ever need the domain,
//! domain-order iteration, point lookups and same-shaped allocation.

use std::{fmt, ops::Index, ops::IndexMut};

use crate::error::{MtosError, Result};

/// A pixel coordinate.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Point {
    /// Row.
    pub y: usize,
    /// Column.
    pub x: usize,
}

impl Point {
    /// Creates a point from its row and column.
    #[must_use]
    pub const fn new(y: usize, x: usize) -> Self {
        Self { y, x }
    }
}

/// Rectangular image domain anchored at `(0, 0)`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Domain {
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
}

impl Domain {
    /// Creates a domain of `height` rows and `width` columns.
    #[must_use]
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Number of pixels in the domain.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.height * self.width
    }

    /// Returns whether the domain holds no pixel.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether `point` lies inside the domain.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.y < self.height && point.x < self.width
    }

    /// Linear index of `point`.
    #[must_use]
    pub const fn index_of(&self, point: Point) -> usize {
        point.y * self.width + point.x
    }

    /// Point at linear index `index`.
    #[must_use]
    pub const fn point_of(&self, index: usize) -> Point {
        Point::new(index / self.width, index % self.width)
    }

    /// Domain of the interpolated grid holding the in-between faces of this
    /// domain, `(2h - 1) x (2w - 1)`.
    #[must_use]
    pub const fn interpolated(&self) -> Self {
        Self::new(
            (2 * self.height).saturating_sub(1),
            (2 * self.width).saturating_sub(1),
        )
    }

    pub(crate) fn ensure_non_empty(self) -> Result<()> {
        if self.is_empty() {
            return Err(MtosError::EmptyDomain { domain: self });
        }
        Ok(())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Adjacency relation between pixels.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Connectivity {
    /// Edge-adjacent pixels: up, left, right, down.
    #[default]
    C4,
    /// Edge- and corner-adjacent pixels, in row-major order.
    C8,
}

const C4_OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
const C8_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Connectivity {
    fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Self::C4 => &C4_OFFSETS,
            Self::C8 => &C8_OFFSETS,
        }
    }

    /// Iterates over the linear indices of the in-domain neighbours of
    /// `index`, in the fixed order documented on each variant.
    ///
    /// # Examples
    /// ```
    /// use mtos_core::{Connectivity, Domain};
    ///
    /// let domain = Domain::new(3, 3);
    /// let corner: Vec<_> = Connectivity::C4.neighbors(domain, 0).collect();
    /// assert_eq!(corner, [1, 3]);
    /// let centre: Vec<_> = Connectivity::C8.neighbors(domain, 4).collect();
    /// assert_eq!(centre, [0, 1, 2, 3, 5, 6, 7, 8]);
    /// ```
    pub fn neighbors(self, domain: Domain, index: usize) -> impl Iterator<Item = usize> {
        let origin = domain.point_of(index);
        self.offsets().iter().filter_map(move |&(dy, dx)| {
            let y = origin.y.checked_add_signed(dy)?;
            let x = origin.x.checked_add_signed(dx)?;
            let point = Point::new(y, x);
            domain.contains(point).then(|| domain.index_of(point))
        })
    }
}

/// Owned row-major 2D image.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Image2d<T> {
    domain: Domain,
    data: Vec<T>,
}

impl<T: Clone> Image2d<T> {
    /// Allocates an image over `domain` filled with `value`.
    #[must_use]
    pub fn new(domain: Domain, value: T) -> Self {
        Self {
            domain,
            data: vec![value; domain.len()],
        }
    }

    /// Keeps every `step`-th row and column, starting at `(0, 0)`.
    ///
    /// Subsampling a tree-of-shapes node map by 2 yields the node map of the
    /// original pixel grid.
    ///
    /// # Panics
    /// Panics when `step` is zero.
    #[must_use]
    pub fn subsample(&self, step: usize) -> Self {
        assert!(step > 0, "subsampling step must be positive");
        let domain = Domain::new(
            self.domain.height.div_ceil(step),
            self.domain.width.div_ceil(step),
        );
        let data = (0..domain.height)
            .flat_map(|y| (0..domain.width).map(move |x| Point::new(y * step, x * step)))
            .map(|point| self[point].clone())
            .collect();
        Self { domain, data }
    }

    /// Copies the region starting at `origin` with the size of `domain`.
    ///
    /// # Panics
    /// Panics when the region does not fit inside the image.
    #[must_use]
    pub fn crop(&self, origin: Point, domain: Domain) -> Self {
        assert!(
            origin.y + domain.height <= self.domain.height
                && origin.x + domain.width <= self.domain.width,
            "crop region exceeds the image domain"
        );
        let data = (0..domain.height)
            .flat_map(|y| (0..domain.width).map(move |x| Point::new(origin.y + y, origin.x + x)))
            .map(|point| self[point].clone())
            .collect();
        Self { domain, data }
    }

    /// Surrounds the image with a constant `border`-pixel-wide frame.
    #[must_use]
    pub fn pad(&self, border: usize, value: T) -> Self {
        let domain = Domain::new(
            self.domain.height + 2 * border,
            self.domain.width + 2 * border,
        );
        let mut out = Self::new(domain, value);
        for (index, pixel) in self.data.iter().enumerate() {
            let point = self.domain.point_of(index);
            out[Point::new(point.y + border, point.x + border)] = pixel.clone();
        }
        out
    }
}

impl<T> Image2d<T> {
    /// Wraps `data` as an image over `domain`.
    ///
    /// # Errors
    /// Returns [`MtosError::BufferLengthMismatch`] when `data` does not hold
    /// exactly one value per pixel.
    pub fn from_vec(domain: Domain, data: Vec<T>) -> Result<Self> {
        if data.len() != domain.len() {
            return Err(MtosError::BufferLengthMismatch {
                domain,
                expected: domain.len(),
                len: data.len(),
            });
        }
        Ok(Self { domain, data })
    }

    pub(crate) fn from_parts(domain: Domain, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), domain.len());
        Self { domain, data }
    }

    /// Builds an image from nested rows.
    ///
    /// # Errors
    /// Returns [`MtosError::RaggedRow`] when a row is not as wide as the
    /// first one.
    ///
    /// # Examples
    /// ```
    /// use mtos_core::{Domain, Image2d};
    ///
    /// let image = Image2d::from_rows(vec![vec![1_u8, 2], vec![3, 4]])?;
    /// assert_eq!(image.domain(), Domain::new(2, 2));
    /// # Ok::<(), mtos_core::MtosError>(())
    /// ```
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let ragged = rows.iter().enumerate().find(|(_, cells)| cells.len() != width);
        if let Some((row, cells)) = ragged {
            return Err(MtosError::RaggedRow {
                row,
                expected: width,
                len: cells.len(),
            });
        }
        let data: Vec<T> = rows.into_iter().flatten().collect();
        Self::from_vec(Domain::new(height, width), data)
    }

    /// Domain of the image.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// Returns the value at `point`, or `None` outside the domain.
    #[must_use]
    pub fn get(&self, point: Point) -> Option<&T> {
        if self.domain.contains(point) {
            self.data.get(self.domain.index_of(point))
        } else {
            None
        }
    }

    /// Pixel values in domain order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Borrows the row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consumes the image and returns its row-major buffer.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Allocates a same-shaped image by applying `f` to every pixel.
    #[must_use]
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Image2d<U> {
        Image2d {
            domain: self.domain,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> Index<usize> for Image2d<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for Image2d<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<T> Index<Point> for Image2d<T> {
    type Output = T;

    fn index(&self, point: Point) -> &T {
        &self.data[self.domain.index_of(point)]
    }
}

impl<T> IndexMut<Point> for Image2d<T> {
    fn index_mut(&mut self, point: Point) -> &mut T {
        let index = self.domain.index_of(point);
        &mut self.data[index]
    }
}

/// Splits a multi-channel image into one image per channel.
///
/// # Examples
/// ```
/// use mtos_core::{Image2d, split_channels};
///
/// let rgb = Image2d::from_rows(vec![vec![[1_u8, 2, 3], [4, 5, 6]]])?;
/// let [r, g, b] = split_channels(&rgb);
/// assert_eq!(r.as_slice(), [1, 4]);
/// assert_eq!(g.as_slice(), [2, 5]);
/// assert_eq!(b.as_slice(), [3, 6]);
/// # Ok::<(), mtos_core::MtosError>(())
/// ```
#[must_use]
pub fn split_channels<V: Copy, const N: usize>(image: &Image2d<[V; N]>) -> [Image2d<V>; N] {
    std::array::from_fn(|channel| image.map(|pixel| pixel[channel]))
}

/// Lexicographic median of the border colours of a multi-channel image.
///
/// Each border pixel contributes one colour, the tuple of its values across
/// `channels`. All channels must share the domain of the first one. Returns
/// `None` without channels or for an empty domain.
///
/// # Examples
/// ```
/// use mtos_core::{Image2d, border_median};
///
/// let red = Image2d::from_rows(vec![vec![0_u8, 5], vec![1, 1]])?;
/// let green = Image2d::from_rows(vec![vec![0_u8, 5], vec![2, 0]])?;
/// // Colours (0, 0) (5, 5) (1, 2) (1, 0), sorted: 00 10 12 55.
/// assert_eq!(border_median(&[red, green]), Some(vec![1, 2]));
/// # Ok::<(), mtos_core::MtosError>(())
/// ```
#[must_use]
pub fn border_median<V: Copy + Ord>(channels: &[Image2d<V>]) -> Option<Vec<V>> {
    let Domain { height, width } = channels.first()?.domain();
    let mut colours: Vec<Vec<V>> = (0..height * width)
        .filter(|&index| {
            let (y, x) = (index / width, index % width);
            y == 0 || x == 0 || y + 1 == height || x + 1 == width
        })
        .map(|index| channels.iter().map(|channel| channel[index]).collect())
        .collect();
    if colours.is_empty() {
        return None;
    }
    colours.sort_unstable();
    let middle = colours.len() / 2;
    Some(colours.swap_remove(middle))
}
