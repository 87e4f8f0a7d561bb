use serde::Serialize;

use crate::models::{Artist, Venue};

pub trait Named {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
}

impl Named for Venue {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Artist {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<SearchHit>,
}

/// Case-insensitive substring match on the name. An empty term matches everything.
pub fn search<T: Named>(records: &[T], term: &str) -> SearchResults {
    let needle = term.to_lowercase();
    let data: Vec<SearchHit> = records
        .iter()
        .filter(|record| record.name().to_lowercase().contains(&needle))
        .map(|record| SearchHit {
            id: record.id(),
            name: record.name().to_string(),
        })
        .collect();
    SearchResults {
        count: data.len(),
        data,
    }
}
