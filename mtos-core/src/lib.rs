//! MToS core library.
//!
//! Builds one tree of shapes per image channel, fuses them into an inclusion
//! graph of distinct shapes, derives a per-pixel depth map from that graph
//! and returns the max-tree of the depth map: a single hierarchy consistent
//! with every channel.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod depth_map;
mod error;
mod fusion;
mod image;
mod maxtree;
mod mtos;
mod saturated;
mod tos;
mod tree;
mod union_find;
mod value;

pub use crate::{
    builder::{ExecutionStrategy, MtosBuilder},
    depth_map::{compute_depth_map, vertex_depths},
    error::{ErrorCategory, MtosError, MtosErrorCode, Result},
    fusion::{InclusionGraph, VertexId, build_inclusion_graph},
    image::{Connectivity, Domain, Image2d, Point, border_median, split_channels},
    maxtree::build_maxtree,
    mtos::{Mtos, MtosOutput, build_mtos},
    saturated::build_saturated_tree,
    tos::build_tos,
    tree::{Accumulator, ComponentTree, Count, FilterPolicy, Max, Mean, Min, NodeId, NodeMap, Sum},
    value::{DepthValue, Level},
};
