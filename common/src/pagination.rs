//! Abstractions for pagination.

/// A page of `N`odes selected by some [`Selector`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<N> {
    /// Nodes on this [`Page`].
    pub nodes: Vec<N>,

    /// Total count of nodes matching the [`Selector`], across all pages.
    pub total: u64,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

impl<N> Page<N> {
    /// Creates a new [`Page`] from the provided nodes.
    pub fn new(
        arguments: Arguments,
        nodes: impl IntoIterator<Item = impl Into<N>>,
        total: u64,
    ) -> Self {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            total,
            arguments,
        }
    }

    /// Indicates whether more nodes follow this [`Page`].
    #[must_use]
    pub fn has_more(&self) -> bool {
        let seen = self.arguments.offset() + self.nodes.len() as u64;
        seen < self.total
    }
}

/// Pagination arguments: a zero-based page number and a page size.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Zero-based number of the requested page.
    page: u32,

    /// Number of nodes per page.
    per_page: u32,
}

impl Arguments {
    /// Default number of nodes per page.
    pub const DEFAULT_PER_PAGE: u32 = 20;

    /// Maximum allowed number of nodes per page.
    pub const MAX_PER_PAGE: u32 = 100;

    /// Creates new [`Arguments`], normalizing the provided values.
    ///
    /// An absent `per_page` falls back to [`DEFAULT_PER_PAGE`], and is capped
    /// at [`MAX_PER_PAGE`]. A zero `per_page` is treated as absent.
    ///
    /// [`DEFAULT_PER_PAGE`]: Self::DEFAULT_PER_PAGE
    /// [`MAX_PER_PAGE`]: Self::MAX_PER_PAGE
    #[must_use]
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(0),
            per_page: per_page
                .filter(|n| *n > 0)
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .min(Self::MAX_PER_PAGE),
        }
    }

    /// Returns the number of nodes to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.per_page)
    }

    /// Returns the maximum number of nodes to return.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Sorting of a [`Page`] by the `K`ey.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Sorting<K> {
    /// Key to sort by.
    pub key: K,

    /// [`Direction`] of the sorting.
    pub direction: Direction,
}

/// Direction of a [`Sorting`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Direction {
    /// Ascending order.
    #[default]
    Ascending,

    /// Descending order.
    Descending,
}

impl Direction {
    #[cfg(feature = "postgres")]
    /// Returns SQL operator representing this [`Direction`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// [`Page`] selector: pagination [`Arguments`] along with a filter and a
/// [`Sorting`].
#[derive(Clone, Debug, Default)]
pub struct Selector<F, K> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,

    /// [`Sorting`] being applied to the result.
    pub sorting: Sorting<K>,
}

/// Defines pagination types.
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty, $sort_key:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter, $sort_key>;

        #[doc = "Sorting of a [`Page`]."]
        pub type Sorting = $crate::pagination::Sorting<$sort_key>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Page};

    #[test]
    fn arguments_normalization() {
        let args = Arguments::new(None, None);
        assert_eq!(args.offset(), 0);
        assert_eq!(args.limit(), u64::from(Arguments::DEFAULT_PER_PAGE));

        let args = Arguments::new(Some(3), Some(10));
        assert_eq!(args.offset(), 30);
        assert_eq!(args.limit(), 10);

        let args = Arguments::new(None, Some(0));
        assert_eq!(args.limit(), u64::from(Arguments::DEFAULT_PER_PAGE));

        let args = Arguments::new(None, Some(10_000));
        assert_eq!(args.limit(), u64::from(Arguments::MAX_PER_PAGE));
    }

    #[test]
    fn page_has_more() {
        let args = Arguments::new(Some(0), Some(2));
        let page = Page::<u8>::new(args, [1, 2], 5);
        assert!(page.has_more());

        let args = Arguments::new(Some(2), Some(2));
        let page = Page::<u8>::new(args, [5], 5);
        assert!(!page.has_more());

        let page = Page::<u8>::new(Arguments::default(), Vec::<u8>::new(), 0);
        assert!(!page.has_more());
    }
}
