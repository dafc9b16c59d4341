//! Attribute accumulation over component trees.
//!
//! An attribute is computed in a single bottom-up pass: every node first
//! accumulates the inputs of the pixels it owns directly, then each child's
//! accumulator is merged into its parent exactly once, children before
//! parents.

use std::marker::PhantomData;

use super::{ComponentTree, NodeMap};
use crate::{
    error::{MtosError, Result},
    image::{Image2d, Point},
};

/// Incremental feature computed over a set of inputs.
///
/// The prototype handed to the attribute functions plays the role of the
/// initial state: every node starts from a clone of it.
pub trait Accumulator: Clone {
    /// Type of a single observation.
    type Input;
    /// Type of the final attribute.
    type Output;

    /// Adds one observation.
    fn take(&mut self, input: Self::Input);

    /// Adds every observation already absorbed by `other`.
    fn merge(&mut self, other: &Self);

    /// Current attribute value.
    fn result(&self) -> Self::Output;
}

impl<V> ComponentTree<V> {
    /// Computes an attribute fed with the coordinates of every pixel.
    ///
    /// # Errors
    /// Returns [`crate::MtosError::EmptyDomain`] for an empty node map.
    ///
    /// # Examples
    /// ```
    /// use mtos_core::{Connectivity, Count, Image2d, build_maxtree};
    ///
    /// let image = Image2d::from_rows(vec![vec![0_u8, 1, 1], vec![0, 0, 2]])?;
    /// let (tree, node_map) = build_maxtree(&image, Connectivity::C4)?;
    /// let area = tree.compute_attribute_on_points(&node_map, Count::default())?;
    /// assert_eq!(area, [6, 3, 1]);
    /// # Ok::<(), mtos_core::MtosError>(())
    /// ```
    pub fn compute_attribute_on_points<A>(
        &self,
        node_map: &NodeMap,
        acc: A,
    ) -> Result<Vec<A::Output>>
    where
        A: Accumulator<Input = Point>,
    {
        self.check_node_map(node_map)?;
        let domain = node_map.domain();
        let mut attr = vec![acc; self.node_count()];
        for (index, &node) in node_map.iter().enumerate() {
            attr[node].take(domain.point_of(index));
        }
        Ok(self.propagate(attr))
    }

    /// Computes an attribute fed with the value of `image` at every pixel.
    ///
    /// # Errors
    /// Returns [`MtosError::ValuesDomainMismatch`] when `image` and
    /// `node_map` cover different domains.
    pub fn compute_attribute_on_values<T, A>(
        &self,
        node_map: &NodeMap,
        image: &Image2d<T>,
        acc: A,
    ) -> Result<Vec<A::Output>>
    where
        T: Copy,
        A: Accumulator<Input = T>,
    {
        self.check_node_map(node_map)?;
        if image.domain() != node_map.domain() {
            return Err(MtosError::ValuesDomainMismatch {
                node_map: node_map.domain(),
                image: image.domain(),
            });
        }
        let mut attr = vec![acc; self.node_count()];
        for (&node, &value) in node_map.iter().zip(image.iter()) {
            attr[node].take(value);
        }
        Ok(self.propagate(attr))
    }

    fn propagate<A: Accumulator>(&self, mut attr: Vec<A>) -> Vec<A::Output> {
        for node in (1..self.node_count()).rev() {
            let (head, tail) = attr.split_at_mut(node);
            head[self.parent(node)].merge(&tail[0]);
        }
        attr.iter().map(Accumulator::result).collect()
    }
}

/// Number of observations; the area when fed with points.
#[derive(Debug)]
pub struct Count<I = Point> {
    count: usize,
    input: PhantomData<fn(I)>,
}

// Written out so that cloning does not require `I: Clone`.
impl<I> Clone for Count<I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I> Copy for Count<I> {}

impl<I> Default for Count<I> {
    fn default() -> Self {
        Self {
            count: 0,
            input: PhantomData,
        }
    }
}

impl<I> Accumulator for Count<I> {
    type Input = I;
    type Output = usize;

    fn take(&mut self, _input: I) {
        self.count += 1;
    }

    fn merge(&mut self, other: &Self) {
        self.count += other.count;
    }

    fn result(&self) -> usize {
        self.count
    }
}

/// Sum of the observed values, widened to `f64`.
#[derive(Debug)]
pub struct Sum<T> {
    sum: f64,
    input: PhantomData<fn(T)>,
}

impl<T> Clone for Sum<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Sum<T> {}

impl<T> Default for Sum<T> {
    fn default() -> Self {
        Self {
            sum: 0.0,
            input: PhantomData,
        }
    }
}

impl<T: Into<f64>> Accumulator for Sum<T> {
    type Input = T;
    type Output = f64;

    fn take(&mut self, input: T) {
        self.sum += input.into();
    }

    fn merge(&mut self, other: &Self) {
        self.sum += other.sum;
    }

    fn result(&self) -> f64 {
        self.sum
    }
}

/// Arithmetic mean of the observed values; `0.0` when nothing was observed.
#[derive(Clone, Copy, Debug)]
pub struct Mean<T> {
    sum: Sum<T>,
    count: Count<T>,
}

impl<T> Default for Mean<T> {
    fn default() -> Self {
        Self {
            sum: Sum::default(),
            count: Count::default(),
        }
    }
}

impl<T: Copy + Into<f64>> Accumulator for Mean<T> {
    type Input = T;
    type Output = f64;

    fn take(&mut self, input: T) {
        self.sum.take(input);
        self.count.take(input);
    }

    fn merge(&mut self, other: &Self) {
        self.sum.merge(&other.sum);
        self.count.merge(&other.count);
    }

    fn result(&self) -> f64 {
        match self.count.result() {
            0 => 0.0,
            count => self.sum.result() / count as f64,
        }
    }
}

/// Largest observed value.
#[derive(Clone, Copy, Debug)]
pub struct Max<T> {
    value: Option<T>,
}

impl<T> Default for Max<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: Copy + Ord> Accumulator for Max<T> {
    type Input = T;
    type Output = Option<T>;

    fn take(&mut self, input: T) {
        self.value = Some(self.value.map_or(input, |current| current.max(input)));
    }

    fn merge(&mut self, other: &Self) {
        if let Some(value) = other.value {
            self.take(value);
        }
    }

    fn result(&self) -> Option<T> {
        self.value
    }
}

/// Smallest observed value.
#[derive(Clone, Copy, Debug)]
pub struct Min<T> {
    value: Option<T>,
}

impl<T> Default for Min<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: Copy + Ord> Accumulator for Min<T> {
    type Input = T;
    type Output = Option<T>;

    fn take(&mut self, input: T) {
        self.value = Some(self.value.map_or(input, |current| current.min(input)));
    }

    fn merge(&mut self, other: &Self) {
        if let Some(value) = other.value {
            self.take(value);
        }
    }

    fn result(&self) -> Option<T> {
        self.value
    }
}
