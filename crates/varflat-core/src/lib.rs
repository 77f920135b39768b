//! # varflat-core
//!
//! Flattens parsed VCF (Variant Call Format) records into streams of flat,
//! self-describing JSON documents ready for bulk indexing into a document
//! store. Every emitted document already carries its full scalar context
//! (chromosome, position, reference, quality, filter, per-allele,
//! per-sample, per-annotation), so no downstream joins are needed.
//!
//! ## Pipeline
//!
//! 1. [`VcfReader`] parses the header once, then pulls one
//!    [`VariantRecord`] at a time.
//! 2. [`Flattener`] expands each record into one document per relevant
//!    (allele, sample, annotation) tuple, coercing every field to its
//!    header-declared type and decoding the packed `ANN` annotation field.
//! 3. [`index_mapping`] and [`sample_metadata`] derive the static
//!    index-mapping document and the per-sample metadata documents from the
//!    header alone.
//!
//! ## Quick Start
//!
//! ```rust
//! use varflat_core::{Flattener, VcfReader};
//! use std::io::Cursor;
//!
//! let vcf = "##fileformat=VCFv4.2\n\
//! ###INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">\n\
//! #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
//! 20\t14370\trs6054257\tG\tA\t29\tPASS\tDP=14\n";
//!
//! let mut reader = VcfReader::new(Cursor::new(vcf.as_bytes()))?;
//! let header = reader.header().clone();
//! let flattener = Flattener::new(&header);
//!
//! while let Some(record) = reader.next_record()? {
//!     for doc in flattener.flatten(&record)? {
//!         println!("{}", serde_json::to_string(&doc)?);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error model
//!
//! Decode and coercion failures are fail-fast: they abort the whole stream
//! rather than skipping a record. An annotation whose allele matches none of
//! the record's alternates is not an error; it simply links to no document.

pub mod annotation;
pub mod coerce;
pub mod document;
pub mod error;
pub mod flatten;
pub mod mapping;
pub mod meta;
pub mod parser;
pub mod types;

pub use document::Document;
pub use error::{Result, VarflatError};
pub use flatten::Flattener;
pub use mapping::index_mapping;
pub use meta::sample_metadata;
pub use parser::VcfReader;
pub use types::{FieldDef, FieldType, SampleEntry, VariantRecord, VcfHeader};
