use camino::Utf8PathBuf;

use synscan::domain::Strand;
use synscan::features::Feature;
use synscan::synteny::{MarkerMatch, MarkerResult};
use synscan::table::{self, Row};
use synscan::uniprot::CrossRefs;

fn feature(segment: &str, gene: &str) -> Feature {
    Feature {
        gene: Some(gene.to_string()),
        locus_tag: Some("MEX_0002".to_string()),
        product: Some("sulfoxide synthase EgtB".to_string()),
        protein_id: Some("CAA10002.1".to_string()),
        embl_protein_id: Some("CAA10002.1".to_string()),
        index: 1,
        start: 599,
        end: 980,
        strand: Strand::Reverse,
        segment: segment.to_string(),
    }
}

fn sample_rows() -> (Vec<String>, Vec<Row>) {
    let markers = vec!["egtB".to_string(), "selA".to_string()];
    let refs = CrossRefs {
        genomic: Some("NZ_ACJM01000000.1".to_string()),
        embl_nucleotide: Some("AE000512".to_string()),
        cds: Some("WP_010865419.1".to_string()),
        embl_protein: Some("CAA10002.1".to_string()),
    };
    let hit = feature("ACJM01000001.1", "egtB");
    let matches = vec![
        MarkerMatch::Found(MarkerResult {
            feature: hit.clone(),
            physical_distance: Some(0),
            ordinal_distance: Some(0),
        }),
        MarkerMatch::NotInSequence,
    ];
    let segments = vec!["ACJM01000001.1".to_string(), "ACJM01000002.1".to_string()];

    let resolved = Row::resolved("Q9X2H4", &refs, &segments, Some(&hit), &matches);
    let errored = Row::error(
        "P00001",
        &CrossRefs::default(),
        markers.len(),
        table::ERROR_NO_NUCLEOTIDE,
    );
    (markers, vec![resolved, errored])
}

#[test]
fn write_then_read_round_trips_every_cell() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("report.tsv")).unwrap();

    let (markers, rows) = sample_rows();
    table::write_table(&path, &markers, &rows).unwrap();

    let (header, cells) = table::read_table(&path).unwrap();
    assert_eq!(header, table::header(&markers));
    assert_eq!(cells.len(), rows.len());
    for (read, row) in cells.iter().zip(&rows) {
        assert_eq!(read, &row.cells());
    }
}

#[test]
fn checkpoint_overwrites_wholesale() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("report.tsv")).unwrap();

    let (markers, rows) = sample_rows();
    table::write_table(&path, &markers, &rows[..1]).unwrap();
    table::write_table(&path, &markers, &rows).unwrap();

    let (_, cells) = table::read_table(&path).unwrap();
    assert_eq!(cells.len(), 2);
}

#[test]
fn identifier_list_skips_blank_lines() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("ids.txt")).unwrap();
    std::fs::write(path.as_std_path(), "Q9X2H4\n\n  P69905  \n").unwrap();

    let ids = table::read_identifiers(&path).unwrap();
    assert_eq!(ids, vec!["Q9X2H4".to_string(), "P69905".to_string()]);
}

#[test]
fn unreadable_input_is_fatal() {
    let path = Utf8PathBuf::from("does/not/exist.txt");
    assert!(table::read_identifiers(&path).is_err());
}
