//! Search, filter, sort and paginate an in-memory collection.
//!
//! Every list view drives the same projection: free-text search over the
//! record's [`Searchable`] fields, AND-combined filter predicates, an
//! optional stable sort, then a 1-based page slice. Changing the search term
//! or the filters puts the controller back on page 1.

use std::cmp::Ordering;
use thiserror::Error;

use crate::models::Searchable;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListError {
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

type Predicate<T> = Box<dyn Fn(&T) -> bool>;
type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering>;

struct NamedFilter<T> {
    name: String,
    predicate: Predicate<T>,
}

/// One page of a projected list
#[derive(Debug)]
pub struct Page<'a, T> {
    pub rows: Vec<&'a T>,
    /// 1-based page number that was requested
    pub number: usize,
    pub page_size: usize,
    /// Records left after search and filters
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Requested page lies past the last page of a non-empty result
    pub fn is_out_of_range(&self) -> bool {
        self.total_items > 0 && self.number > self.total_pages
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    /// 1-based index of the first row on this page, for "showing x-y of n"
    pub fn first_index(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.number - 1) * self.page_size + 1
        }
    }

    pub fn last_index(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            self.first_index() + self.rows.len() - 1
        }
    }
}

/// Number of pages needed for `items` rows
pub fn total_pages(items: usize, page_size: usize) -> usize {
    items.div_ceil(page_size.max(1))
}

pub struct ListController<T> {
    search_term: String,
    filters: Vec<NamedFilter<T>>,
    sort: Option<(Comparator<T>, SortOrder)>,
    current_page: usize,
    page_size: usize,
}

impl<T: Searchable> ListController<T> {
    pub fn new(page_size: usize) -> Result<Self, ListError> {
        if page_size == 0 {
            return Err(ListError::ZeroPageSize);
        }
        Ok(Self {
            search_term: String::new(),
            filters: Vec::new(),
            sort: None,
            current_page: 1,
            page_size,
        })
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.search_term {
            self.search_term = term;
            self.current_page = 1;
        }
    }

    /// Add or replace the filter called `name`
    pub fn set_filter<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&T) -> bool + 'static,
    {
        let name = name.into();
        self.filters.retain(|f| f.name != name);
        self.filters.push(NamedFilter {
            name,
            predicate: Box::new(predicate),
        });
        self.current_page = 1;
    }

    pub fn remove_filter(&mut self, name: &str) {
        let before = self.filters.len();
        self.filters.retain(|f| f.name != name);
        if self.filters.len() != before {
            self.current_page = 1;
        }
    }

    pub fn clear_filters(&mut self) {
        if !self.filters.is_empty() {
            self.filters.clear();
            self.current_page = 1;
        }
    }

    /// Sort by a key; ties keep collection order
    pub fn sort_by_key<K, F>(&mut self, key: F, order: SortOrder)
    where
        K: Ord,
        F: Fn(&T) -> K + 'static,
    {
        self.sort = Some((Box::new(move |a: &T, b: &T| key(a).cmp(&key(b))), order));
    }

    /// Jump to a page. Page 0 is treated as page 1; pages past the end are
    /// kept and produce an empty, out-of-range page.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), ListError> {
        if page_size == 0 {
            return Err(ListError::ZeroPageSize);
        }
        self.page_size = page_size;
        self.current_page = 1;
        Ok(())
    }

    /// Advance if there is a next page for `items`; returns whether it moved
    pub fn next_page(&mut self, items: &[T]) -> bool {
        let pages = total_pages(self.filtered(items).len(), self.page_size);
        if self.current_page < pages {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn matches(&self, item: &T) -> bool {
        self.matches_search(item) && self.filters.iter().all(|f| (f.predicate)(item))
    }

    fn matches_search(&self, item: &T) -> bool {
        let needle = self.search_term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        item.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Every matching record, sorted if a sort is set
    pub fn filtered<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        let mut rows: Vec<&T> = items.iter().filter(|item| self.matches(item)).collect();
        if let Some((ref compare, order)) = self.sort {
            rows.sort_by(|a, b| match order {
                SortOrder::Asc => compare(*a, *b),
                SortOrder::Desc => compare(*b, *a),
            });
        }
        rows
    }

    /// The current page of `items`
    pub fn page<'a>(&self, items: &'a [T]) -> Page<'a, T> {
        self.page_at(items, self.current_page)
    }

    /// Every page in order; a single empty page for an empty result
    pub fn pages<'a>(&self, items: &'a [T]) -> Vec<Page<'a, T>> {
        let filtered = self.filtered(items);
        let count = total_pages(filtered.len(), self.page_size).max(1);
        (1..=count).map(|n| self.slice(&filtered, n)).collect()
    }

    fn page_at<'a>(&self, items: &'a [T], number: usize) -> Page<'a, T> {
        let filtered = self.filtered(items);
        self.slice(&filtered, number)
    }

    fn slice<'a>(&self, filtered: &[&'a T], number: usize) -> Page<'a, T> {
        let start = (number - 1).saturating_mul(self.page_size);
        let rows = filtered
            .iter()
            .skip(start)
            .take(self.page_size)
            .copied()
            .collect();
        Page {
            rows,
            number,
            page_size: self.page_size,
            total_items: filtered.len(),
            total_pages: total_pages(filtered.len(), self.page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: String,
        team: &'static str,
        rank: u32,
    }

    impl Searchable for Item {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.name.as_str(), self.team]
        }
    }

    fn items(n: u32) -> Vec<Item> {
        let teams = ["Engineering", "Design", "Sales"];
        (0..n)
            .map(|i| Item {
                name: format!("Person {}", i),
                team: teams[(i % 3) as usize],
                rank: (i * 7) % 5,
            })
            .collect()
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert_eq!(ListController::<Item>::new(0).err(), Some(ListError::ZeroPageSize));
        let mut list = ListController::<Item>::new(5).unwrap();
        assert!(list.set_page_size(0).is_err());
        assert_eq!(list.page_size(), 5);
    }

    #[test]
    fn test_search_is_case_insensitive_subset() {
        let data = items(30);
        for term in ["design", "PERSON 1", "eng", "zzz", "", "  sales "] {
            let mut list = ListController::new(10).unwrap();
            list.set_search(term);
            let needle = term.trim().to_lowercase();
            let found = list.filtered(&data);

            for row in &found {
                assert!(data.contains(row));
                assert!(row
                    .search_fields()
                    .iter()
                    .any(|f| f.to_lowercase().contains(&needle)));
            }
            let expected = data
                .iter()
                .filter(|i| i.search_fields().iter().any(|f| f.to_lowercase().contains(&needle)))
                .count();
            assert_eq!(found.len(), expected, "term {:?}", term);
        }
    }

    #[test]
    fn test_pages_partition_filtered_rows() {
        let data = items(23);
        for size in 1..=25 {
            let mut list = ListController::new(size).unwrap();
            list.set_filter("no-sales", |i: &Item| i.team != "Sales");
            let filtered = list.filtered(&data);
            let pages = list.pages(&data);

            let total: usize = pages.iter().map(|p| p.rows.len()).sum();
            assert_eq!(total, filtered.len());
            assert!(pages.iter().all(|p| p.rows.len() <= size));

            let (last, full) = pages.split_last().unwrap();
            assert!(full.iter().all(|p| p.rows.len() == size));
            assert!(!last.rows.is_empty());

            let flattened: Vec<&Item> = pages.iter().flat_map(|p| p.rows.iter().copied()).collect();
            assert_eq!(flattened, filtered);
        }
    }

    #[test]
    fn test_filters_are_and_combined() {
        let data = items(30);
        let mut list = ListController::new(100).unwrap();
        list.set_filter("team", |i: &Item| i.team == "Design");
        list.set_filter("rank", |i: &Item| i.rank >= 3);

        let rows = list.filtered(&data);
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|i| i.team == "Design" && i.rank >= 3));

        // Replacing a filter by name does not stack it
        list.set_filter("team", |i: &Item| i.team == "Sales");
        assert_eq!(list.filter_names(), vec!["rank", "team"]);
        assert!(list.filtered(&data).iter().all(|i| i.team == "Sales"));
    }

    #[test]
    fn test_insertion_order_without_sort() {
        let data = items(9);
        let list = ListController::new(4).unwrap();
        let page = list.page(&data);
        let names: Vec<&str> = page.rows.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Person 0", "Person 1", "Person 2", "Person 3"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let data = items(10);
        let mut list = ListController::new(10).unwrap();
        list.sort_by_key(|i: &Item| i.rank, SortOrder::Asc);
        let rows = list.filtered(&data);
        for pair in rows.windows(2) {
            assert!(pair[0].rank <= pair[1].rank);
            if pair[0].rank == pair[1].rank {
                let a = data.iter().position(|i| i == pair[0]).unwrap();
                let b = data.iter().position(|i| i == pair[1]).unwrap();
                assert!(a < b);
            }
        }

        list.sort_by_key(|i: &Item| i.rank, SortOrder::Desc);
        let rows = list.filtered(&data);
        assert!(rows.windows(2).all(|p| p[0].rank >= p[1].rank));
    }

    #[test]
    fn test_search_and_filter_changes_reset_page() {
        let data = items(50);
        let mut list = ListController::new(5).unwrap();
        list.set_page(4);
        assert_eq!(list.current_page(), 4);

        list.set_search("person");
        assert_eq!(list.current_page(), 1);

        list.set_page(3);
        list.set_search("person");
        assert_eq!(list.current_page(), 3, "same term keeps the page");

        list.set_filter("design", |i: &Item| i.team == "Design");
        assert_eq!(list.current_page(), 1);

        list.set_page(2);
        list.remove_filter("missing");
        assert_eq!(list.current_page(), 2);
        list.clear_filters();
        assert_eq!(list.current_page(), 1);
        assert_eq!(list.page(&data).rows.len(), 5);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let data = items(7);
        let mut list = ListController::new(5).unwrap();
        list.set_page(9);
        let page = list.page(&data);
        assert!(page.is_empty());
        assert!(page.is_out_of_range());
        assert_eq!(page.total_pages, 2);

        list.set_page(0);
        assert_eq!(list.current_page(), 1);
    }

    #[test]
    fn test_navigation() {
        let data = items(12);
        let mut list = ListController::new(5).unwrap();
        assert!(!list.prev_page());
        assert!(list.next_page(&data));
        assert!(list.next_page(&data));
        assert!(!list.next_page(&data));
        assert_eq!(list.current_page(), 3);

        let page = list.page(&data);
        assert_eq!((page.first_index(), page.last_index()), (11, 12));
        assert!(page.has_prev());
        assert!(!page.has_next());
    }

    #[test]
    fn test_empty_collection() {
        let data: Vec<Item> = Vec::new();
        let list = ListController::new(10).unwrap();
        let page = list.page(&data);
        assert_eq!(page.total_pages, 0);
        assert!(!page.is_out_of_range());
        assert_eq!(list.pages(&data).len(), 1);
    }
}
