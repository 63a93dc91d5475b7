use std::fs;

use synscan::domain::Strand;
use synscan::features::features_of_record;
use synscan::genbank::{field_block, parse_records};
use synscan::segments::segment_accessions;

#[test]
fn scaffold_contig_block_lists_segments_in_order() {
    let text = fs::read_to_string("tests/fixtures/scaffold.gb").unwrap();
    let block = field_block(&text, "CONTIG").unwrap();
    assert_eq!(
        segment_accessions(&block),
        vec!["ACJM01000001.1", "ACJM01000002.1"]
    );

    // Re-parsing the same text yields the same list.
    let again = field_block(&text, "CONTIG").unwrap();
    assert_eq!(segment_accessions(&block), segment_accessions(&again));
}

#[test]
fn segment_fixture_splits_into_two_records() {
    let text = fs::read_to_string("tests/fixtures/segment.gb").unwrap();
    let records = parse_records(&text).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].accession, "ACJM01000001.1");
    assert_eq!(records[1].accession, "ACJM01000002.1");
}

#[test]
fn cds_features_carry_qualifiers_and_positions() {
    let text = fs::read_to_string("tests/fixtures/segment.gb").unwrap();
    let records = parse_records(&text).unwrap();

    let features = features_of_record(&records[0]);
    assert_eq!(features.len(), 3);

    let egt_a = &features[0];
    assert_eq!(egt_a.gene.as_deref(), Some("egtA"));
    assert_eq!(egt_a.locus_tag.as_deref(), Some("MEX_0001"));
    assert_eq!(egt_a.protein_id.as_deref(), Some("CAA10001.1"));
    assert_eq!(egt_a.embl_protein_id.as_deref(), Some("CAA10001.1"));
    assert_eq!(egt_a.start, 99);
    assert_eq!(egt_a.end, 400);
    assert_eq!(egt_a.strand, Strand::Forward);
    assert_eq!(egt_a.index, 0);
    assert_eq!(egt_a.segment, "ACJM01000001.1");

    let egt_b = &features[1];
    assert_eq!(egt_b.gene.as_deref(), Some("egtB"));
    assert_eq!(egt_b.strand, Strand::Reverse);
    // Multi-line product value is rejoined.
    assert_eq!(
        egt_b.product.as_deref(),
        Some("5-histidylcysteine sulfoxide synthase EgtB, an iron(II)-dependent sulfur transferase")
    );
    // protein_id db_xref outranks the GeneID one.
    assert_eq!(egt_b.embl_protein_id.as_deref(), Some("CAA10002.1"));

    let unnamed = &features[2];
    assert_eq!(unnamed.gene, None);
    assert_eq!(unnamed.index, 2);
}

#[test]
fn joined_location_collapses_to_outer_bounds() {
    let text = fs::read_to_string("tests/fixtures/segment.gb").unwrap();
    let records = parse_records(&text).unwrap();

    let features = features_of_record(&records[1]);
    let egt_d = features
        .iter()
        .find(|f| f.gene.as_deref() == Some("egtD"))
        .unwrap();
    assert_eq!(egt_d.start, 399);
    assert_eq!(egt_d.end, 900);
    // Ordinal index restarts per sub-record.
    assert_eq!(egt_d.index, 1);
}

#[test]
fn record_without_contig_has_no_block() {
    let text = fs::read_to_string("tests/fixtures/segment.gb").unwrap();
    assert_eq!(field_block(&text, "CONTIG"), None);
}
