use crate::filter::NameFilter;

/// Options to control what an extraction run records and how far it descends.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Block names to record; an empty filter records everything
    pub filters: NameFilter,
    /// Also walk paper space layouts after model space
    pub include_paper_space: bool,
    /// Stop descending below this many nested instances (unbounded when None)
    pub max_depth: Option<usize>,
}

impl ExtractOptions {
    pub fn with_filters(mut self, filters: NameFilter) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_paper_space(mut self, include: bool) -> Self {
        self.include_paper_space = include;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}
