use std::fs;
use std::io::Write;

use camino::Utf8Path;

use crate::error::ScanError;
use crate::features::Feature;
use crate::synteny::MarkerMatch;
use crate::uniprot::CrossRefs;

/// Rendered value for distances that exist but are not meaningful
/// (cross-segment match, or no hit to measure from).
pub const NOT_APPLICABLE: &str = "NA";

pub const ERROR_NO_NUCLEOTIDE: &str = "no nucleotide sequences found";
pub const ERROR_INVALID_IDENTIFIER: &str = "invalid identifier";
pub const STATUS_NO_GENE_NAMES: &str = "no gene names provided";
pub const STATUS_NOT_IN_SEQUENCE: &str = "gene not in sequence";

/// One report row, field-complete at construction. Every cell is a plain
/// string; optional upstream values become empty cells here and nowhere
/// earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub query: String,
    pub genomic: String,
    pub embl_nucleotide: String,
    pub cds: String,
    pub embl_protein: String,
    pub segment_count: String,
    pub segments: String,
    pub hit: HitCells,
    pub markers: Vec<MarkerCells>,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitCells {
    pub gene: String,
    pub locus_tag: String,
    pub product: String,
    pub protein_id: String,
    pub start: String,
    pub end: String,
    pub strand: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerCells {
    pub summary: String,
    pub segment: String,
    pub physical_distance: String,
    pub ordinal_distance: String,
    pub start: String,
    pub end: String,
    pub strand: String,
    pub protein_id: String,
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl Row {
    /// Row for an identifier that never reached sequence retrieval. Cells
    /// stay empty strings, the note column carries the error marker.
    pub fn error(query: &str, refs: &CrossRefs, marker_count: usize, note: &str) -> Self {
        Self {
            query: query.to_string(),
            genomic: opt(&refs.genomic),
            embl_nucleotide: opt(&refs.embl_nucleotide),
            cds: opt(&refs.cds),
            embl_protein: opt(&refs.embl_protein),
            segment_count: String::new(),
            segments: String::new(),
            hit: HitCells::default(),
            markers: vec![MarkerCells::default(); marker_count],
            note: note.to_string(),
        }
    }

    pub fn resolved(
        query: &str,
        refs: &CrossRefs,
        segments: &[String],
        hit: Option<&Feature>,
        matches: &[MarkerMatch],
    ) -> Self {
        Self {
            query: query.to_string(),
            genomic: opt(&refs.genomic),
            embl_nucleotide: opt(&refs.embl_nucleotide),
            cds: opt(&refs.cds),
            embl_protein: opt(&refs.embl_protein),
            segment_count: segments.len().to_string(),
            segments: segments.join(";"),
            hit: hit.map(HitCells::from_feature).unwrap_or_default(),
            markers: matches.iter().map(MarkerCells::from_match).collect(),
            note: String::new(),
        }
    }

    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.query.clone(),
            self.genomic.clone(),
            self.embl_nucleotide.clone(),
            self.cds.clone(),
            self.embl_protein.clone(),
            self.segment_count.clone(),
            self.segments.clone(),
            self.hit.gene.clone(),
            self.hit.locus_tag.clone(),
            self.hit.product.clone(),
            self.hit.protein_id.clone(),
            self.hit.start.clone(),
            self.hit.end.clone(),
            self.hit.strand.clone(),
        ];
        for marker in &self.markers {
            cells.extend([
                marker.summary.clone(),
                marker.segment.clone(),
                marker.physical_distance.clone(),
                marker.ordinal_distance.clone(),
                marker.start.clone(),
                marker.end.clone(),
                marker.strand.clone(),
                marker.protein_id.clone(),
            ]);
        }
        cells.push(self.note.clone());
        cells
    }
}

impl HitCells {
    fn from_feature(feature: &Feature) -> Self {
        Self {
            gene: opt(&feature.gene),
            locus_tag: opt(&feature.locus_tag),
            product: opt(&feature.product),
            protein_id: opt(&feature.protein_id),
            start: feature.start.to_string(),
            end: feature.end.to_string(),
            strand: feature.strand.to_string(),
        }
    }
}

impl MarkerCells {
    fn from_match(marker_match: &MarkerMatch) -> Self {
        match marker_match {
            MarkerMatch::NoGeneNames => Self {
                summary: STATUS_NO_GENE_NAMES.to_string(),
                ..Self::default()
            },
            MarkerMatch::NotInSequence => Self {
                summary: STATUS_NOT_IN_SEQUENCE.to_string(),
                ..Self::default()
            },
            MarkerMatch::Found(result) => {
                let feature = &result.feature;
                let summary = match (&feature.gene, &feature.product) {
                    (Some(gene), Some(product)) => format!("{gene} ({product})"),
                    (Some(gene), None) => gene.clone(),
                    (None, _) => String::new(),
                };
                Self {
                    summary,
                    segment: feature.segment.clone(),
                    physical_distance: result
                        .physical_distance
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
                    ordinal_distance: result
                        .ordinal_distance
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
                    start: feature.start.to_string(),
                    end: feature.end.to_string(),
                    strand: feature.strand.to_string(),
                    protein_id: opt(&feature.protein_id),
                }
            }
        }
    }
}

pub fn header(markers: &[String]) -> Vec<String> {
    let mut columns = vec![
        "query".to_string(),
        "genomic_accession".to_string(),
        "embl_accession".to_string(),
        "cds_accession".to_string(),
        "embl_protein".to_string(),
        "segment_count".to_string(),
        "segments".to_string(),
        "hit_gene".to_string(),
        "hit_locus_tag".to_string(),
        "hit_product".to_string(),
        "hit_protein_id".to_string(),
        "hit_start".to_string(),
        "hit_end".to_string(),
        "hit_strand".to_string(),
    ];
    for marker in markers {
        for suffix in [
            "gene",
            "segment",
            "distance_bp",
            "distance_genes",
            "start",
            "end",
            "strand",
            "protein_id",
        ] {
            columns.push(format!("{marker}_{suffix}"));
        }
    }
    columns.push("note".to_string());
    columns
}

/// One bare identifier per line, no header; blank lines skipped,
/// surrounding whitespace trimmed.
pub fn read_identifiers(path: &Utf8Path) -> Result<Vec<String>, ScanError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|_| ScanError::InputRead(path.as_std_path().to_path_buf()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn sanitize(cell: &str) -> String {
    if cell.contains(['\t', '\n', '\r']) {
        cell.replace(['\t', '\n', '\r'], " ")
    } else {
        cell.to_string()
    }
}

/// Write the whole table, wholesale, through a temp file in the target
/// directory so a crashed run never leaves a truncated checkpoint.
pub fn write_table(path: &Utf8Path, markers: &[String], rows: &[Row]) -> Result<(), ScanError> {
    let to_err = |err: std::io::Error| {
        ScanError::OutputWrite(path.as_std_path().to_path_buf(), err.to_string())
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path()).map_err(to_err)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".synscan")
        .tempfile_in(parent.as_std_path())
        .map_err(to_err)?;

    writeln!(temp, "{}", header(markers).join("\t")).map_err(to_err)?;
    for row in rows {
        let line = row
            .cells()
            .iter()
            .map(|cell| sanitize(cell))
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(temp, "{line}").map_err(to_err)?;
    }

    temp.persist(path.as_std_path()).map_err(|err| {
        ScanError::OutputWrite(path.as_std_path().to_path_buf(), err.to_string())
    })?;
    Ok(())
}

/// Read a report back as header plus cell matrix.
pub fn read_table(path: &Utf8Path) -> Result<(Vec<String>, Vec<Vec<String>>), ScanError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|_| ScanError::InputRead(path.as_std_path().to_path_buf()))?;
    let mut lines = content.lines();
    let header = lines
        .next()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .unwrap_or_default();
    let rows = lines
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect();
    Ok((header, rows))
}
