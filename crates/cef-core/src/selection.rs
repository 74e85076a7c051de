//! Selection and scroll positions
//!
//! Maps global filtered indices to where a card sits in the pagination
//! scheme, and back, and tracks the single highlighted card.

use serde::{Deserialize, Serialize};

/// Pagination scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pagination {
    /// Infinite scroll
    #[default]
    Continuous,
    /// Numbered pages, first page is 1
    Paged { page_size: usize },
}

/// Where a card sits for the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Position {
    Continuous { index: usize },
    Paged { page: usize, offset: usize },
}

impl Pagination {
    /// Position of a global index
    #[must_use]
    pub fn position(self, index: usize) -> Position {
        match self {
            Self::Continuous => Position::Continuous { index },
            Self::Paged { page_size } => {
                let page_size = page_size.max(1);
                Position::Paged {
                    page: index / page_size + 1,
                    offset: index % page_size,
                }
            }
        }
    }

    /// Global index of a page-relative offset
    ///
    /// Continuous scroll has a single implicit page. Returns `None` for page
    /// 0 or an offset past the page end.
    #[must_use]
    pub fn global_index(self, page: usize, offset: usize) -> Option<usize> {
        match self {
            Self::Continuous => (page == 1).then_some(offset),
            Self::Paged { page_size } => {
                if page == 0 || offset >= page_size {
                    return None;
                }
                (page - 1).checked_mul(page_size)?.checked_add(offset)
            }
        }
    }
}

/// Single highlighted card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    highlighted: Option<usize>,
}

impl Selection {
    /// Highlighted index
    #[inline]
    #[must_use]
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Toggle `index`: selecting the highlighted card clears it, any other
    /// index replaces it
    pub fn toggle(&mut self, index: usize) -> Option<usize> {
        self.highlighted = if self.highlighted == Some(index) {
            None
        } else {
            Some(index)
        };
        self.highlighted
    }

    /// Clear highlight
    #[inline]
    pub fn clear(&mut self) {
        self.highlighted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_positions_start_at_page_one() {
        let paged = Pagination::Paged { page_size: 10 };
        assert_eq!(paged.position(0), Position::Paged { page: 1, offset: 0 });
        assert_eq!(paged.position(35), Position::Paged { page: 4, offset: 5 });
        assert_eq!(Pagination::Continuous.position(35), Position::Continuous { index: 35 });
    }

    #[test]
    fn global_index_inverts_position() {
        let paged = Pagination::Paged { page_size: 10 };
        for index in [0, 9, 10, 35, 99] {
            let Position::Paged { page, offset } = paged.position(index) else {
                unreachable!();
            };
            assert_eq!(paged.global_index(page, offset), Some(index));
        }
        assert_eq!(paged.global_index(0, 3), None);
        assert_eq!(paged.global_index(2, 10), None);
        assert_eq!(Pagination::Continuous.global_index(1, 42), Some(42));
    }

    #[test]
    fn toggle_semantics() {
        let mut selection = Selection::default();
        assert_eq!(selection.toggle(3), Some(3));
        assert_eq!(selection.toggle(3), None);
        selection.toggle(3);
        assert_eq!(selection.toggle(7), Some(7));
        selection.clear();
        assert_eq!(selection.highlighted(), None);
    }
}
