//! Service provider visits dashboard: data loading, filtering and
//! aggregation, plus the colour palette shared by the binaries.

pub mod color;
pub mod data;
