// ABOUTME: Defines ReadingList, the in-memory ordered collection of books.
// ABOUTME: Exposes set_all/add/update/snapshot plus apply() for folding Mutations into the list.

use crate::event::Mutation;
use crate::model::Book;

/// The authoritative in-memory reading list. Order is the user's manual
/// ranking and is never changed except by `set_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingList {
    books: Vec<Book>,
    revision: u64,
}

impl ReadingList {
    /// Create an empty list at revision 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from an ordered sequence, as if by one `set_all`.
    pub fn from_books(books: Vec<Book>) -> Self {
        let mut list = Self::new();
        list.set_all(books);
        list
    }

    /// Replace the entire collection with `books`, in the given order.
    /// Duplicate ids are not checked; the caller's sequence is trusted.
    pub fn set_all(&mut self, books: Vec<Book>) {
        self.books = books;
        self.revision += 1;
    }

    /// Append a book to the end. A book whose id is already present is
    /// refused and the list is left as it was. Returns whether it was added.
    pub fn add(&mut self, book: Book) -> bool {
        if self.contains(&book.id) {
            return false;
        }
        self.books.push(book);
        self.revision += 1;
        true
    }

    /// Replace the first book whose id matches, keeping its position.
    /// An unknown id leaves the list untouched. Returns whether a book was replaced.
    pub fn update(&mut self, book: Book) -> bool {
        match self.position(&book.id) {
            Some(index) => {
                self.books[index] = book;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Move the book at `from` so it ends up at index `to`, committed as a
    /// `set_all` of the reordered list. Out-of-range indices and `from == to`
    /// leave the list untouched.
    pub fn move_book(&mut self, from: usize, to: usize) -> bool {
        match self.reordered(from, to) {
            Some(books) => {
                self.set_all(books);
                true
            }
            None => false,
        }
    }

    /// The reordered collection `move_book` would commit, or None when the
    /// move is out of range or does nothing.
    pub fn reordered(&self, from: usize, to: usize) -> Option<Vec<Book>> {
        let len = self.books.len();
        if from >= len || to >= len || from == to {
            return None;
        }
        let mut books = self.books.clone();
        let book = books.remove(from);
        books.insert(to, book);
        Some(books)
    }

    /// Apply a resolved mutation. Returns whether the list changed.
    pub fn apply(&mut self, mutation: &Mutation) -> bool {
        match mutation {
            Mutation::SetAll { books } => {
                self.set_all(books.clone());
                true
            }
            Mutation::Add { book } => self.add(book.clone()),
            Mutation::Update { book } => self.update(book.clone()),
        }
    }

    /// The current ordered collection.
    pub fn snapshot(&self) -> &[Book] {
        &self.books
    }

    /// Counter bumped by every mutation that changed the list.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Books that have been read, in list order.
    pub fn read_books(&self) -> impl Iterator<Item = &Book> {
        self.books.iter().filter(|b| b.is_read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn book(id: &str, title: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: "Anon".to_string(),
            status: Status::Waiting,
            summary: None,
        }
    }

    fn ids(list: &ReadingList) -> Vec<&str> {
        list.snapshot().iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn new_list_is_empty() {
        let list = ReadingList::new();
        assert!(list.is_empty());
        assert_eq!(list.revision(), 0);
    }

    #[test]
    fn add_appends_in_call_order() {
        let mut list = ReadingList::new();
        assert!(list.add(book("1", "Dune")));
        assert!(list.add(book("2", "Emma")));
        assert!(list.add(book("3", "Ulysses")));

        assert_eq!(ids(&list), vec!["1", "2", "3"]);
        assert_eq!(list.revision(), 3);
    }

    #[test]
    fn add_refuses_duplicate_id() {
        let mut list = ReadingList::new();
        list.add(book("1", "Dune"));
        let before = list.clone();

        assert!(!list.add(book("1", "Another Dune")));
        assert_eq!(list, before);
        assert_eq!(list.get("1").unwrap().title, "Dune");
    }

    #[test]
    fn update_replaces_in_place() {
        let mut list = ReadingList::from_books(vec![book("1", "A"), book("2", "B"), book("3", "C")]);

        let updated = list.get("2").unwrap().with_status(Status::Read).with_summary("short");
        assert!(list.update(updated));

        assert_eq!(ids(&list), vec!["1", "2", "3"]);
        let b = list.get("2").unwrap();
        assert_eq!(b.status, Status::Read);
        assert_eq!(b.summary.as_deref(), Some("short"));
    }

    #[test]
    fn update_unknown_id_is_a_no_op() {
        let mut list = ReadingList::from_books(vec![book("1", "A"), book("2", "B")]);
        let before = list.clone();

        assert!(!list.update(book("9", "Ghost")));
        assert_eq!(list, before);
    }

    #[test]
    fn update_touches_only_first_match() {
        // set_all trusts the caller, so duplicates can exist
        let mut list = ReadingList::from_books(vec![book("1", "A"), book("1", "B")]);

        list.update(book("1", "Z"));

        let titles: Vec<_> = list.snapshot().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Z", "B"]);
    }

    #[test]
    fn set_all_replaces_and_keeps_order() {
        let mut list = ReadingList::from_books(vec![book("1", "A"), book("2", "B")]);

        list.set_all(vec![book("2", "B"), book("1", "A")]);
        assert_eq!(ids(&list), vec!["2", "1"]);

        list.set_all(Vec::new());
        assert!(list.is_empty());
    }

    #[test]
    fn mixed_sequence_preserves_positions() {
        let mut list = ReadingList::new();
        list.add(book("a", "A"));
        list.add(book("b", "B"));
        list.update(book("a", "A2"));
        list.add(book("c", "C"));
        list.update(book("c", "C2"));
        list.update(book("b", "B2"));

        assert_eq!(ids(&list), vec!["a", "b", "c"]);
        let titles: Vec<_> = list.snapshot().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["A2", "B2", "C2"]);
    }

    #[test]
    fn move_book_reorders() {
        let mut list = ReadingList::from_books(vec![book("1", "A"), book("2", "B"), book("3", "C")]);

        assert!(list.move_book(0, 2));
        assert_eq!(ids(&list), vec!["2", "3", "1"]);

        assert!(list.move_book(2, 0));
        assert_eq!(ids(&list), vec!["1", "2", "3"]);
    }

    #[test]
    fn move_book_out_of_range_is_a_no_op() {
        let mut list = ReadingList::from_books(vec![book("1", "A"), book("2", "B")]);
        let before = list.clone();

        assert!(!list.move_book(0, 5));
        assert!(!list.move_book(3, 0));
        assert!(!list.move_book(1, 1));
        assert_eq!(list, before);
    }

    #[test]
    fn apply_reports_whether_list_changed() {
        let mut list = ReadingList::new();

        assert!(list.apply(&Mutation::Add { book: book("1", "A") }));
        assert!(!list.apply(&Mutation::Update { book: book("2", "B") }));
        assert!(list.apply(&Mutation::SetAll { books: vec![] }));
        assert!(list.is_empty());
    }

    #[test]
    fn read_books_filters_by_status() {
        let mut list = ReadingList::from_books(vec![book("1", "A"), book("2", "B"), book("3", "C")]);
        list.update(book("3", "C").with_status(Status::Read));
        list.update(book("1", "A").with_status(Status::Read));

        let read: Vec<_> = list.read_books().map(|b| b.id.as_str()).collect();
        assert_eq!(read, vec!["1", "3"]);
    }
}
