use crate::domain::Strand;
use crate::entrez::{EntrezClient, RecordFormat};
use crate::genbank::{self, FlatFeature, FlatRecord};
use crate::retry::RetryPolicy;

/// One coding-sequence annotation, positioned within its owning segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub gene: Option<String>,
    pub locus_tag: Option<String>,
    pub product: Option<String>,
    pub protein_id: Option<String>,
    /// Protein accession recovered from `db_xref` tags (`EMBL:` or
    /// `protein_id:` prefixed); the last matching tag wins.
    pub embl_protein_id: Option<String>,
    /// Zero-based position within the sub-record's CDS list.
    pub index: usize,
    /// Half-open zero-based coordinates; `start <= end` always holds.
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    /// Accession of the owning sub-record.
    pub segment: String,
}

impl Feature {
    pub fn midpoint(&self) -> u64 {
        (self.start + self.end) / 2
    }
}

/// CDS features of one parsed flat record, in file order.
pub fn features_of_record(record: &FlatRecord) -> Vec<Feature> {
    record
        .features
        .iter()
        .filter(|feature| feature.key == "CDS")
        .filter_map(|feature| convert(feature, &record.accession))
        .enumerate()
        .map(|(index, mut feature)| {
            feature.index = index;
            feature
        })
        .collect()
}

fn convert(feature: &FlatFeature, segment: &str) -> Option<Feature> {
    let span = match genbank::parse_span(&feature.location) {
        Ok(span) => span,
        Err(err) => {
            tracing::warn!(segment, location = %feature.location, error = %err, "skipping CDS with unusable location");
            return None;
        }
    };

    let mut embl_protein_id = None;
    for xref in feature.qualifier_values("db_xref") {
        let value = xref
            .strip_prefix("EMBL:")
            .or_else(|| xref.strip_prefix("protein_id:"));
        if let Some(value) = value {
            embl_protein_id = Some(value.to_string());
        }
    }

    Some(Feature {
        gene: feature.qualifier("gene").map(str::to_string),
        locus_tag: feature.qualifier("locus_tag").map(str::to_string),
        product: feature.qualifier("product").map(str::to_string),
        protein_id: feature.qualifier("protein_id").map(str::to_string),
        embl_protein_id,
        index: 0,
        start: span.start,
        end: span.end,
        strand: span.strand,
        segment: segment.to_string(),
    })
}

/// Fetch one segment's full record and return its CDS features. A segment
/// accession may expand to several physical sub-records; features keep
/// their sub-record accession and per-sub-record ordinals. Terminal fetch
/// or parse failure degrades to an empty list for this segment.
pub fn extract_features<E: EntrezClient>(
    client: &E,
    retry: &RetryPolicy,
    segment: &str,
) -> Vec<Feature> {
    let text = match retry.run(segment, || {
        client.fetch_record(segment, RecordFormat::WithParts)
    }) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(segment, error = %err, "feature record unavailable, continuing without it");
            return Vec::new();
        }
    };

    let records = match genbank::parse_records(&text) {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!(segment, error = %err, "feature record unparseable, continuing without it");
            return Vec::new();
        }
    };

    records.iter().flat_map(features_of_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genbank::Qualifier;

    fn cds(location: &str, qualifiers: &[(&str, &str)]) -> FlatFeature {
        FlatFeature {
            key: "CDS".to_string(),
            location: location.to_string(),
            qualifiers: qualifiers
                .iter()
                .map(|(key, value)| Qualifier {
                    key: key.to_string(),
                    value: Some(value.to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn keeps_only_cds_and_indexes_them() {
        let record = FlatRecord {
            accession: "SEG01.1".to_string(),
            features: vec![
                FlatFeature {
                    key: "gene".to_string(),
                    location: "1..90".to_string(),
                    qualifiers: Vec::new(),
                },
                cds("1..90", &[("gene", "egtA")]),
                cds("complement(100..190)", &[("gene", "egtB")]),
            ],
        };

        let features = features_of_record(&record);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].index, 0);
        assert_eq!(features[0].gene.as_deref(), Some("egtA"));
        assert_eq!(features[0].strand, Strand::Forward);
        assert_eq!(features[1].index, 1);
        assert_eq!(features[1].strand, Strand::Reverse);
        assert_eq!(features[1].segment, "SEG01.1");
        assert_eq!(features[1].start, 99);
        assert_eq!(features[1].end, 190);
    }

    #[test]
    fn midpoint_floors() {
        let record = FlatRecord {
            accession: "SEG01.1".to_string(),
            features: vec![cds("10..15", &[])],
        };
        let features = features_of_record(&record);
        // start 9, end 15 -> floor(24 / 2)
        assert_eq!(features[0].midpoint(), 12);
    }

    #[test]
    fn last_matching_db_xref_wins() {
        let record = FlatRecord {
            accession: "SEG01.1".to_string(),
            features: vec![cds(
                "1..90",
                &[
                    ("db_xref", "EMBL:CAA00001.1"),
                    ("db_xref", "GeneID:945771"),
                    ("db_xref", "protein_id:CAA00002.1"),
                ],
            )],
        };
        let features = features_of_record(&record);
        assert_eq!(features[0].embl_protein_id.as_deref(), Some("CAA00002.1"));
    }

    #[test]
    fn unusable_location_is_skipped_not_fatal() {
        let record = FlatRecord {
            accession: "SEG01.1".to_string(),
            features: vec![cds("join()", &[("gene", "bad")]), cds("1..90", &[("gene", "good")])],
        };
        let features = features_of_record(&record);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].gene.as_deref(), Some("good"));
        assert_eq!(features[0].index, 0);
    }
}
