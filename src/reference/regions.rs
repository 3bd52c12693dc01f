
use serde::Serialize;
use std::ops::Range;

use crate::kir::errors::ReferenceError;

/// The type of a reference region; panels alternate intron, exon, intron, ...
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum_macros::Display)]
pub enum RegionKind {
    Intron,
    Exon
}

/// A single half-open region of the shared reference coordinate space
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Region {
    /// intron or exon
    kind: RegionKind,
    /// 0-based start, inclusive
    start: usize,
    /// 0-based end, exclusive
    end: usize
}

impl Region {
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if this region shares at least one position with `other`
    pub fn overlaps(&self, other: &Range<usize>) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }
}

/// Ordered, contiguous layout of alternating intron/exon regions covering `[0, reference_len)`
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RegionLayout {
    /// all regions, in order
    regions: Vec<Region>
}

impl RegionLayout {
    /// Builds the layout from the lengths of each region of one allele, starting with an intron.
    /// # Arguments
    /// * `region_lengths` - the length of each region sub-sequence, in order
    /// # Errors
    /// * if there are no exon regions in the layout
    pub fn from_region_lengths(region_lengths: &[usize]) -> Result<RegionLayout, ReferenceError> {
        let mut regions = Vec::with_capacity(region_lengths.len());
        let mut start = 0;
        for (i, &length) in region_lengths.iter().enumerate() {
            let kind = if i % 2 == 0 { RegionKind::Intron } else { RegionKind::Exon };
            regions.push(Region {
                kind,
                start,
                end: start + length
            });
            start += length;
        }

        let layout = RegionLayout { regions };
        if layout.exons().next().is_none() {
            return Err(ReferenceError::MissingExons { num_regions: region_lengths.len() });
        }
        Ok(layout)
    }

    /// Total length of the shared coordinate space
    pub fn reference_len(&self) -> usize {
        self.regions.last().map(|r| r.end).unwrap_or(0)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn exons(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.kind == RegionKind::Exon)
    }

    pub fn introns(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.kind == RegionKind::Intron)
    }

    /// Iterates every exon position in ascending order
    pub fn exon_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.exons().flat_map(|r| r.range())
    }

    /// Total number of exon positions
    pub fn exon_len(&self) -> usize {
        self.exons().map(|r| r.len()).sum()
    }

    /// Returns true if the half-open range touches at least one exon position
    pub fn overlaps_exon(&self, range: &Range<usize>) -> bool {
        self.exons().any(|r| r.overlaps(range))
    }
}
