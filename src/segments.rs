use std::sync::OnceLock;

use regex::Regex;

use crate::entrez::{EntrezClient, RecordFormat};
use crate::genbank;
use crate::retry::RetryPolicy;

/// Segment accession token: four uppercase letters, eight digits, a
/// version suffix. The shape of WGS member accessions referenced by a
/// scaffold's CONTIG directive.
fn segment_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]{4}\d{8}\.\d+").expect("valid segment token pattern"))
}

/// Every segment accession referenced by a CONTIG block, in appearance
/// order. Pure, so re-parsing the same text always yields the same list.
pub fn segment_accessions(contig: &str) -> Vec<String> {
    segment_token()
        .find_iter(contig)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Resolve a nucleotide context to its ordered segment list.
///
/// A context record is either monolithic (its coordinates are directly
/// usable, no CONTIG) or a scaffold whose CONTIG directive names the
/// member segments. The fallback ladder guarantees the caller always gets
/// at least one accession to query:
/// fetch failure -> `[fallback]`; CONTIG absent or empty -> `[primary]`;
/// CONTIG present but without segment tokens -> `[fallback]`.
pub fn resolve_segments<E: EntrezClient>(
    client: &E,
    retry: &RetryPolicy,
    primary: &str,
    fallback: &str,
) -> Vec<String> {
    let text = match retry.run(primary, || client.fetch_record(primary, RecordFormat::Brief)) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(accession = primary, error = %err, "segment record unavailable, using fallback accession");
            return vec![fallback.to_string()];
        }
    };

    match genbank::field_block(&text, "CONTIG") {
        None => vec![primary.to_string()],
        Some(block) if block.is_empty() => vec![primary.to_string()],
        Some(block) => {
            let segments = segment_accessions(&block);
            if segments.is_empty() {
                tracing::warn!(
                    accession = primary,
                    "CONTIG block carries no segment accessions, using fallback accession"
                );
                vec![fallback.to_string()]
            } else {
                segments
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_in_appearance_order() {
        let contig = "join(AAAA12345678.1:1..500,gap(100),BBBB87654321.2:1..800)";
        assert_eq!(
            segment_accessions(contig),
            vec!["AAAA12345678.1", "BBBB87654321.2"]
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let contig = "join(AAAA12345678.1:1..500,BBBB87654321.2:1..800)";
        assert_eq!(segment_accessions(contig), segment_accessions(contig));
    }

    #[test]
    fn rejects_malformed_tokens() {
        // Too few letters, too few digits, missing version.
        let contig = "join(AAA12345678.1:1..5,AAAA1234567.1:1..5,CCCC12345678:1..5)";
        assert!(segment_accessions(contig).is_empty());
    }
}
