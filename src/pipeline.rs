use std::thread;

use crate::config::Settings;
use crate::domain::UniprotAccession;
use crate::entrez::EntrezClient;
use crate::error::ScanError;
use crate::features::{self, Feature};
use crate::segments;
use crate::synteny;
use crate::table::{ERROR_INVALID_IDENTIFIER, ERROR_NO_NUCLEOTIDE, Row};
use crate::uniprot::{self, CrossRefs, UniprotClient};

/// Drives the per-identifier stages sequentially and hands the growing
/// table to the checkpoint callback at batch boundaries. One row per
/// input identifier, always; a single identifier's failure never aborts
/// the run.
pub struct Pipeline<U: UniprotClient, E: EntrezClient> {
    uniprot: U,
    entrez: E,
    settings: Settings,
}

impl<U: UniprotClient, E: EntrezClient> Pipeline<U, E> {
    pub fn new(uniprot: U, entrez: E, settings: Settings) -> Self {
        Self {
            uniprot,
            entrez,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run<F>(&self, queries: &[String], checkpoint: &mut F) -> Result<Vec<Row>, ScanError>
    where
        F: FnMut(&[Row]) -> Result<(), ScanError>,
    {
        let mut rows = Vec::with_capacity(queries.len());
        let total = queries.len();

        for (position, query) in queries.iter().enumerate() {
            tracing::info!(query = %query, position = position + 1, total, "processing identifier");
            rows.push(self.process(query));

            let done = position + 1;
            if done % self.settings.batch_size == 0 && done < total {
                checkpoint(&rows)?;
            }
        }

        checkpoint(&rows)?;
        Ok(rows)
    }

    pub fn process(&self, query: &str) -> Row {
        let marker_count = self.settings.markers.len();

        let accession: UniprotAccession = match query.parse() {
            Ok(accession) => accession,
            Err(err) => {
                tracing::warn!(query, error = %err, "unusable identifier");
                return Row::error(
                    query,
                    &CrossRefs::default(),
                    marker_count,
                    ERROR_INVALID_IDENTIFIER,
                );
            }
        };

        let refs = self.resolve_cross_refs(&accession);
        self.pause();

        let Some(context) = refs.genomic.clone().or_else(|| refs.embl_nucleotide.clone()) else {
            return Row::error(query, &refs, marker_count, ERROR_NO_NUCLEOTIDE);
        };

        let fallback = refs.embl_nucleotide.clone().unwrap_or_else(|| context.clone());
        let segment_list =
            segments::resolve_segments(&self.entrez, &self.settings.retry, &context, &fallback);
        self.pause();

        let mut feature_list: Vec<Feature> = Vec::new();
        for segment in &segment_list {
            feature_list.extend(features::extract_features(
                &self.entrez,
                &self.settings.retry,
                segment,
            ));
            self.pause();
        }

        let hit = synteny::find_hit(&feature_list, refs.embl_protein.as_deref());
        let matches = synteny::match_panel(&feature_list, hit, &self.settings.markers);

        Row::resolved(query, &refs, &segment_list, hit, &matches)
    }

    fn resolve_cross_refs(&self, accession: &UniprotAccession) -> CrossRefs {
        let entry = self
            .settings
            .retry
            .run(accession.as_str(), || self.uniprot.fetch_entry(accession));
        match entry {
            Ok(entry) => uniprot::extract_cross_refs(&entry),
            Err(err) => {
                tracing::warn!(accession = accession.as_str(), error = %err, "cross-reference lookup failed");
                CrossRefs::default()
            }
        }
    }

    fn pause(&self) {
        if !self.settings.pause.is_zero() {
            thread::sleep(self.settings.pause);
        }
    }
}
