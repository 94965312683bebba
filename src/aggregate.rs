//! # Case Aggregation Module
//!
//! ## Purpose
//! Groups all normalized filings (after expansion) under their case
//! identifier into a read-view aggregate: one case per case id with ordered,
//! deduplicated documents, plus summary statistics over the whole corpus.
//! This is a projection; nothing here is separately persisted by the core.
//!
//! ## Input/Output Specification
//! - **Input**: Normalized filings
//! - **Output**: [`Aggregation`] with sorted cases, unmatched filings, and
//!   summary statistics
//! - **Ordering**: Documents within a case sort by `(doc_number, date)`
//!   ascending, `doc_number` defaulting to 0 when absent
//! - **Unmatched**: Filings whose reference never resolved to a case id are
//!   emitted separately, never merged into a case

use crate::reference::CaseReference;
use crate::NormalizedFiling;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One document within an aggregated case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDocument {
    /// Document number within the case (1 = complaint, 2 = settlement, ...)
    pub doc_number: Option<u32>,
    pub document_type: String,
    pub date: String,
    pub filing_year: i32,
    pub respondent: String,
    pub title: String,
    pub source_url: String,
    pub relative_path: Option<String>,
}

/// A case: the logical unit identified by a case id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub case_id: String,
    /// Most frequently occurring non-empty respondent across the documents
    pub respondent: String,
    pub document_count: usize,
    pub documents: Vec<CaseDocument>,
}

/// Count of one document type across the corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTypeCount {
    pub document_type: String,
    pub count: usize,
}

/// Summary statistics over an aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSummary {
    pub total_cases: usize,
    pub total_documents: usize,
    pub unmatched_filings: usize,
    /// Distribution of cases by their document count
    pub cases_by_document_count: BTreeMap<usize, usize>,
    /// Document types ordered by frequency (descending, then name)
    pub document_types: Vec<DocumentTypeCount>,
}

/// Result of aggregating a normalized corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregation {
    pub cases: Vec<Case>,
    pub unmatched: Vec<NormalizedFiling>,
    pub summary: AggregationSummary,
}

/// Sort key for documents within a case. The raw date string is kept as the
/// final tiebreaker so unparseable dates still order deterministically.
fn document_order_key(doc: &CaseDocument) -> (u32, NaiveDate, String) {
    let parsed = NaiveDate::parse_from_str(&doc.date, "%m/%d/%Y").unwrap_or(NaiveDate::MIN);
    (doc.doc_number.unwrap_or(0), parsed, doc.date.clone())
}

/// Elect the case respondent: most frequent non-empty string, ties broken by
/// first occurrence.
fn elect_respondent(documents: &[CaseDocument]) -> String {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (index, doc) in documents.iter().enumerate() {
        if doc.respondent.is_empty() {
            continue;
        }
        let entry = counts.entry(doc.respondent.as_str()).or_insert((0, index));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .max_by_key(|(_, (count, first_index))| (*count, std::cmp::Reverse(*first_index)))
        .map(|(respondent, _)| respondent.to_string())
        .unwrap_or_default()
}

/// Aggregate normalized filings into cases.
pub fn aggregate_cases(filings: &[NormalizedFiling]) -> Aggregation {
    let mut cases_map: BTreeMap<String, Vec<CaseDocument>> = BTreeMap::new();
    let mut unmatched: Vec<NormalizedFiling> = Vec::new();

    for filing in filings {
        let case_key = match &filing.reference {
            CaseReference::Standard { case_id, .. }
            | CaseReference::Remediation { case_id, .. }
            | CaseReference::Denial { case_id, .. } => case_id.clone(),
            // License filings aggregate under their canonical string as
            // single-document cases.
            CaseReference::License { .. } => filing.case_number(),
            CaseReference::Raw { .. } => {
                unmatched.push(filing.clone());
                continue;
            }
        };

        cases_map.entry(case_key).or_default().push(CaseDocument {
            doc_number: filing.reference.doc_number(),
            document_type: filing.document_type.clone(),
            date: filing.date.clone(),
            filing_year: filing.year,
            respondent: filing.respondent.clone(),
            title: filing.title.clone(),
            source_url: filing.source_url.clone(),
            relative_path: filing.relative_path.clone(),
        });
    }

    let cases: Vec<Case> = cases_map
        .into_iter()
        .map(|(case_id, mut documents)| {
            let respondent = elect_respondent(&documents);
            documents.sort_by_key(document_order_key);
            Case {
                case_id,
                respondent,
                document_count: documents.len(),
                documents,
            }
        })
        .collect();

    let summary = summarize(&cases, &unmatched);

    Aggregation {
        cases,
        unmatched,
        summary,
    }
}

fn summarize(cases: &[Case], unmatched: &[NormalizedFiling]) -> AggregationSummary {
    let total_documents = cases.iter().map(|c| c.document_count).sum();

    let mut cases_by_document_count: BTreeMap<usize, usize> = BTreeMap::new();
    for case in cases {
        *cases_by_document_count.entry(case.document_count).or_insert(0) += 1;
    }

    let mut type_counts: HashMap<&str, usize> = HashMap::new();
    for case in cases {
        for doc in &case.documents {
            *type_counts.entry(doc.document_type.as_str()).or_insert(0) += 1;
        }
    }
    let mut document_types: Vec<DocumentTypeCount> = type_counts
        .into_iter()
        .map(|(document_type, count)| DocumentTypeCount {
            document_type: document_type.to_string(),
            count,
        })
        .collect();
    document_types.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.document_type.cmp(&b.document_type))
    });

    AggregationSummary {
        total_cases: cases.len(),
        total_documents,
        unmatched_filings: unmatched.len(),
        cases_by_document_count,
        document_types,
    }
}
