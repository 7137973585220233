pub(crate) mod assignment;
pub(crate) mod rebalance;

use crate::{Developer, Task};

/// One developer's share of a single week while the week is being built.
#[derive(Debug, Clone)]
pub(crate) struct Bucket<'a> {
    pub developer: &'a Developer,
    pub tasks: Vec<&'a Task>,
    pub workload: f64,
}

impl<'a> Bucket<'a> {
    pub fn new(developer: &'a Developer) -> Self {
        Self {
            developer,
            tasks: Vec::new(),
            workload: 0.0,
        }
    }
}
