//! Marker-gene proximity against the hit CDS. Selection and distance
//! policy:
//! same-segment candidates always beat cross-segment ones, nearest
//! midpoint wins within a tier, ties fall to extraction order. Distances
//! are only meaningful on the hit's own segment; everywhere else they are
//! reported as not applicable rather than as numbers from unrelated
//! coordinate systems.

use crate::features::Feature;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerMatch {
    /// The context carries no gene symbols at all, so marker presence is
    /// undecidable. Distinct from the marker being absent.
    NoGeneNames,
    /// Symbols are present but none equals the marker.
    NotInSequence,
    Found(MarkerResult),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerResult {
    pub feature: Feature,
    /// |midpoint - hit midpoint| in base pairs; `None` when no hit exists
    /// or the match sits on a different segment.
    pub physical_distance: Option<u64>,
    /// Signed CDS-index difference, same applicability as the physical
    /// distance.
    pub ordinal_distance: Option<i64>,
}

/// True iff the aggregated feature list carries no usable gene symbols.
pub fn no_symbols(features: &[Feature]) -> bool {
    features.iter().all(|feature| feature.gene.is_none())
}

/// The unique feature whose `protein_id` equals the resolved protein
/// accession. An absent accession never matches.
pub fn find_hit<'a>(features: &'a [Feature], protein: Option<&str>) -> Option<&'a Feature> {
    let protein = protein?;
    features
        .iter()
        .find(|feature| feature.protein_id.as_deref() == Some(protein))
}

/// Best match for one marker name, case-insensitive exact match on the
/// gene symbol.
pub fn match_marker(features: &[Feature], hit: Option<&Feature>, marker: &str) -> MarkerMatch {
    if no_symbols(features) {
        return MarkerMatch::NoGeneNames;
    }

    let candidates: Vec<&Feature> = features
        .iter()
        .filter(|feature| {
            feature
                .gene
                .as_deref()
                .map(|gene| gene.eq_ignore_ascii_case(marker))
                .unwrap_or(false)
        })
        .collect();

    let selected = match hit {
        // No anchor: first in extraction order, deterministically.
        None => candidates.first().copied(),
        Some(hit) => candidates
            .iter()
            .copied()
            .min_by_key(|candidate| {
                (
                    candidate.segment != hit.segment,
                    candidate.midpoint().abs_diff(hit.midpoint()),
                )
            }),
    };

    let Some(selected) = selected else {
        return MarkerMatch::NotInSequence;
    };

    let same_segment = hit.map(|hit| hit.segment == selected.segment).unwrap_or(false);
    let (physical, ordinal) = match hit {
        Some(hit) if same_segment => (
            Some(selected.midpoint().abs_diff(hit.midpoint())),
            Some(selected.index as i64 - hit.index as i64),
        ),
        _ => (None, None),
    };

    MarkerMatch::Found(MarkerResult {
        feature: selected.clone(),
        physical_distance: physical,
        ordinal_distance: ordinal,
    })
}

/// One match per marker name, panel order preserved.
pub fn match_panel(
    features: &[Feature],
    hit: Option<&Feature>,
    markers: &[String],
) -> Vec<MarkerMatch> {
    markers
        .iter()
        .map(|marker| match_marker(features, hit, marker))
        .collect()
}
