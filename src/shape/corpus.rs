use std::collections::VecDeque;

use rayon::prelude::*;

use crate::data::{document::CanonicalDocument, osm::RawElement};
use crate::errors::Result;

use super::element::ElementTransformer;

pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Lazily shapes a stream of raw elements into documents.
///
/// Elements are pulled from the source in batches and each batch is transformed on
/// the rayon pool. Documents come out in source order; elements that aren't nodes
/// or ways are skipped. A source error is yielded once and ends the sequence.
pub struct Corpus<'a, I> {
    elements: I,
    transformer: &'a ElementTransformer,
    batch_size: usize,
    ready: VecDeque<CanonicalDocument>,
    pending_error: Option<crate::errors::Error>,
    finished: bool,
}

impl<'a, I> Corpus<'a, I>
where
    I: Iterator<Item = Result<RawElement>>,
{
    pub fn new(elements: I, transformer: &'a ElementTransformer, batch_size: usize) -> Corpus<'a, I> {
        Corpus {
            elements,
            transformer,
            batch_size: batch_size.max(1),
            ready: VecDeque::new(),
            pending_error: None,
            finished: false,
        }
    }

    fn fill(&mut self) {
        let mut batch: Vec<RawElement> = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.elements.next() {
                Some(Ok(element)) => batch.push(element),
                Some(Err(err)) => {
                    self.pending_error = Some(err);
                    self.finished = true;
                    break;
                },
                None => {
                    self.finished = true;
                    break;
                },
            }
        }

        let transformer = self.transformer;
        let documents: Vec<Option<CanonicalDocument>> = batch.par_iter()
            .map(|element| transformer.transform(element))
            .collect();
        self.ready.extend(documents.into_iter().flatten());
    }
}

impl<I> Iterator for Corpus<'_, I>
where
    I: Iterator<Item = Result<RawElement>>,
{
    type Item = Result<CanonicalDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(doc) = self.ready.pop_front() {
                return Some(Ok(doc));
            }
            if let Some(err) = self.pending_error.take() {
                return Some(Err(err));
            }
            if self.finished {
                return None;
            }
            self.fill();
        }
    }
}

/// Shapes every element of `elements`, stopping at the first source error.
pub fn build<I>(elements: I, transformer: &ElementTransformer, batch_size: usize) -> Result<Vec<CanonicalDocument>>
where
    I: Iterator<Item = Result<RawElement>>,
{
    Corpus::new(elements, transformer, batch_size).collect()
}
