use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::domain::UniprotAccession;
use crate::error::ScanError;

/// Cross-references resolved for one protein accession. Fields stay `None`
/// when the registry lists no matching entry; rendering absence as an empty
/// cell is the report layer's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossRefs {
    /// Primary nucleotide context: RefSeq `NucleotideSequenceId` property.
    pub genomic: Option<String>,
    /// Fallback nucleotide context: EMBL entry accession.
    pub embl_nucleotide: Option<String>,
    /// Coding-sequence accession: RefSeq entry id.
    pub cds: Option<String>,
    /// Linked protein accession: EMBL protein-id property. Anchors the hit
    /// lookup against CDS `protein_id` qualifiers.
    pub embl_protein: Option<String>,
}

pub trait UniprotClient: Send + Sync {
    fn fetch_entry(&self, accession: &UniprotAccession) -> Result<Value, ScanError>;
}

#[derive(Clone)]
pub struct UniprotHttpClient {
    client: Client,
}

impl UniprotHttpClient {
    pub fn new() -> Result<Self, ScanError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("synscan/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ScanError::UniprotHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| ScanError::UniprotHttp(err.to_string()))?;
        Ok(Self { client })
    }

    fn entry_url(accession: &UniprotAccession) -> String {
        format!(
            "https://rest.uniprot.org/uniprotkb/{}.json",
            accession.as_str()
        )
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ScanError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "UniProt request failed".to_string());
        Err(ScanError::UniprotStatus { status, message })
    }
}

impl UniprotClient for UniprotHttpClient {
    fn fetch_entry(&self, accession: &UniprotAccession) -> Result<Value, ScanError> {
        let url = Self::entry_url(accession);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| ScanError::UniprotHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .json()
            .map_err(|err| ScanError::UniprotHttp(err.to_string()))
    }
}

/// Property keys accepted as synonyms of "protein sequence id" on EMBL
/// cross-references, compared case-insensitively.
const PROTEIN_ID_KEYS: [&str; 3] = ["proteinid", "protein_id", "protein sequence id"];

const NUCLEOTIDE_ID_KEY: &str = "nucleotidesequenceid";

/// Scan the entry's cross-reference list for the four linked identifiers.
/// When a database lists several matching entries the last one wins; this
/// is a deliberate policy, matching the upstream record order.
pub fn extract_cross_refs(raw: &Value) -> CrossRefs {
    let mut refs = CrossRefs::default();
    let Some(xrefs) = raw
        .get("uniProtKBCrossReferences")
        .and_then(|v| v.as_array())
    else {
        return refs;
    };

    for xref in xrefs {
        let db = xref.get("database").and_then(|v| v.as_str()).unwrap_or("");
        let id = xref.get("id").and_then(|v| v.as_str());
        match db {
            "RefSeq" => {
                if let Some(id) = id {
                    refs.cds = Some(id.to_string());
                }
                if let Some(value) = property_value(xref, |key| key == NUCLEOTIDE_ID_KEY) {
                    refs.genomic = Some(value);
                }
            }
            "EMBL" => {
                if let Some(id) = id {
                    refs.embl_nucleotide = Some(id.to_string());
                }
                if let Some(value) =
                    property_value(xref, |key| PROTEIN_ID_KEYS.contains(&key.as_str()))
                {
                    refs.embl_protein = Some(value);
                }
            }
            _ => {}
        }
    }

    refs
}

fn property_value<F>(xref: &Value, mut matches: F) -> Option<String>
where
    F: FnMut(&String) -> bool,
{
    let props = xref.get("properties").and_then(|v| v.as_array())?;
    let mut found = None;
    for prop in props {
        let Some(key) = prop.get("key").and_then(|v| v.as_str()) else {
            continue;
        };
        let key = key.to_lowercase();
        if matches(&key) {
            if let Some(value) = prop.get("value").and_then(|v| v.as_str()) {
                found = Some(value.to_string());
            }
        }
    }
    found
}
