use crate::catalogue::CatalogueRecord;
use crate::config::FilterRules;
use std::collections::HashSet;

/// How records are chosen from the catalogue for one run.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Keep records passing the category, size and deny-list rules.
    Filtered(FilterRules),
    /// Keep exactly the requested codes. The rules are not consulted at all.
    Explicit(Vec<String>),
}

impl Selection {
    /// Explicit when any codes were requested, otherwise filtered by `rules`.
    pub fn from_request(rules: &FilterRules, codes: &[String]) -> Self {
        if codes.is_empty() {
            Self::Filtered(rules.clone())
        } else {
            Self::Explicit(codes.iter().map(|code| code.to_lowercase()).collect())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    /// Matching records in catalogue order.
    pub selected: Vec<CatalogueRecord>,
    /// Requested codes the catalogue does not know, in request order.
    pub unknown: Vec<String>,
}

pub fn filter_catalogue(records: &[CatalogueRecord], selection: &Selection) -> FilterOutcome {
    match selection {
        Selection::Filtered(rules) => FilterOutcome {
            selected: records
                .iter()
                .filter(|record| passes_rules(record, rules))
                .cloned()
                .collect(),
            unknown: Vec::new(),
        },
        Selection::Explicit(codes) => {
            let requested: HashSet<String> = codes.iter().map(|code| code.to_lowercase()).collect();
            let known: HashSet<String> = records.iter().map(|r| r.code.to_lowercase()).collect();
            let mut seen = HashSet::new();
            let unknown = codes
                .iter()
                .map(|code| code.to_lowercase())
                .filter(|code| !known.contains(code) && seen.insert(code.clone()))
                .collect();
            FilterOutcome {
                selected: records
                    .iter()
                    .filter(|record| requested.contains(&record.code.to_lowercase()))
                    .cloned()
                    .collect(),
                unknown,
            }
        }
    }
}

fn passes_rules(record: &CatalogueRecord, rules: &FilterRules) -> bool {
    let code = record.code.to_lowercase();
    !rules.ignored_sets.iter().any(|ignored| ignored.eq_ignore_ascii_case(&code))
        && record.size >= rules.minimum_set_size
        && (rules.set_types.is_empty() || rules.set_types.iter().any(|t| *t == record.category))
}
