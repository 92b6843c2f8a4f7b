use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

pub type DocId = u32;

/// Ascending, de-duplicated set of documents containing one term.
pub type PostingSet = BTreeSet<DocId>;

/// Term -> posting set mapping with ascending-term iteration.
///
/// One dictionary is the unit of work of a block: it is filled document by
/// document and written out as a sub-index when the block is flushed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dictionary {
    terms: BTreeMap<String, PostingSet>,
}

impl Dictionary {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, term: String, doc_id: DocId) {
        self.terms.entry(term).or_default().insert(doc_id);
    }

    /// Union every posting set of `other` into this dictionary.
    pub fn merge(&mut self, other: Dictionary) {
        for (term, postings) in other.terms {
            match self.terms.entry(term) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(postings);
                }
                btree_map::Entry::Occupied(mut slot) => slot.get_mut().extend(postings),
            }
        }
    }

    pub fn get(&self, term: &str) -> Option<&PostingSet> { self.terms.get(term) }

    pub fn contains(&self, term: &str) -> bool { self.terms.contains_key(term) }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// Entries in ascending term order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PostingSet)> + '_ {
        self.terms.iter().map(|(t, p)| (t.as_str(), p))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ { self.terms.keys().map(String::as_str) }

    /// Leave an empty dictionary behind and return the current contents.
    pub fn take(&mut self) -> Dictionary { std::mem::take(self) }
}
