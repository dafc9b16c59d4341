//! Immersion of a scalar image into its interval-valued interpolated grid.

use crate::image::{Domain, Image2d, Point};

/// Lower and upper bounds of every face of the interpolated grid.
#[derive(Clone, Debug)]
pub(crate) struct Immersion<V> {
    pub(crate) inf: Image2d<V>,
    pub(crate) sup: Image2d<V>,
}

impl<V> Immersion<V> {
    pub(crate) fn domain(&self) -> Domain {
        self.inf.domain()
    }
}

/// Builds the `(2h - 1) x (2w - 1)` interval image of `image`.
///
/// Original pixels land on even coordinates as degenerate intervals. A face
/// between two horizontal neighbours spans both values, and every face of an
/// odd row spans the faces directly above and below it.
pub(crate) fn immerse<V: Copy + Ord>(image: &Image2d<V>) -> Immersion<V> {
    let Domain { height, width } = image.domain();
    let domain = image.domain().interpolated();
    let fill = image[0];
    let mut inf = Image2d::new(domain, fill);
    let mut sup = Image2d::new(domain, fill);

    for y in 0..height {
        for x in 0..width {
            let value = image[Point::new(y, x)];
            let face = Point::new(2 * y, 2 * x);
            inf[face] = value;
            sup[face] = value;
            if x > 0 {
                let left = image[Point::new(y, x - 1)];
                let between = Point::new(2 * y, 2 * x - 1);
                inf[between] = value.min(left);
                sup[between] = value.max(left);
            }
        }
    }

    for y in 1..height {
        for x in 0..domain.width {
            let above = Point::new(2 * y - 2, x);
            let below = Point::new(2 * y, x);
            let between = Point::new(2 * y - 1, x);
            inf[between] = inf[above].min(inf[below]);
            sup[between] = sup[above].max(sup[below]);
        }
    }

    Immersion { inf, sup }
}
