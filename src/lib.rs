pub mod config;
pub mod domain;
pub mod entrez;
pub mod error;
pub mod features;
pub mod genbank;
pub mod pipeline;
pub mod retry;
pub mod segments;
pub mod synteny;
pub mod table;
pub mod uniprot;
