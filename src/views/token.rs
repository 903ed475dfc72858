use crate::query::descriptor::QueryDescriptor;

/// Identifies one selection. A response is only applied if it carries the
/// token of the view's current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionToken(u64);

impl SelectionToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hands out strictly increasing tokens.
#[derive(Debug, Default)]
pub struct TokenCounter {
    last: u64,
}

impl TokenCounter {
    pub fn next(&mut self) -> SelectionToken {
        self.last += 1;
        SelectionToken(self.last)
    }
}

/// A request a view wants made on its behalf.
///
/// The caller performs the fetch and hands the outcome back to the view
/// together with `token`; the view drops it if a newer ticket has been issued
/// in the meantime.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub token: SelectionToken,
    pub query: QueryDescriptor,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase() {
        let mut counter = TokenCounter::default();
        let a = counter.next();
        let b = counter.next();
        assert!(b > a);
        assert_ne!(a, b);
    }
}
