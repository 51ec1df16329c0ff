//! Bookkeeping for elements the builder had to leave out.

use std::{collections::BTreeMap, fmt};

/// Why an element produced no geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    /// A referenced vertex id does not exist in the layer.
    MissingVertex,
    /// A line with fewer than 2 or an area with fewer than 3 vertices.
    TooFewVertices,
    /// A wall whose length, height or thickness is effectively zero.
    DegenerateWall,
    /// A floor polygon the triangulator could not split into triangles.
    DegenerateFloor,
    /// An opening whose owning line does not exist.
    MissingLine,
    /// An item or opening with a non-finite or non-positive dimension.
    NonPositiveDimensions,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingVertex => "missing vertex",
            Self::TooFewVertices => "too few vertices",
            Self::DegenerateWall => "degenerate wall",
            Self::DegenerateFloor => "degenerate floor",
            Self::MissingLine => "missing line",
            Self::NonPositiveDimensions => "non-positive dimensions",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one scene build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    layers: usize,
    meshes: usize,
    skipped: BTreeMap<SkipReason, usize>,
}

impl BuildReport {
    pub(crate) fn record_layer(&mut self) {
        self.layers += 1;
    }

    pub(crate) fn record_meshes(&mut self, count: usize) {
        self.meshes += count;
    }

    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    /// Visible layers turned into layer groups.
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Meshes in the built scene.
    pub fn meshes(&self) -> usize {
        self.meshes
    }

    /// Elements skipped for `reason`.
    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Non-zero skip counters, ordered by reason.
    pub fn skip_counts(&self) -> impl Iterator<Item = (SkipReason, usize)> + '_ {
        self.skipped.iter().map(|(reason, count)| (*reason, *count))
    }
}
