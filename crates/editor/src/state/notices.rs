//! Dismissible user-facing notices

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
    next_id: u64,
}

impl Notices {
    pub fn push(&mut self, level: NoticeLevel, text: impl Into<String>) -> u64 {
        self.next_id += 1;
        self.items.push(Notice {
            id: self.next_id,
            level,
            text: text.into(),
        });
        self.next_id
    }

    pub fn info(&mut self, text: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, text)
    }

    pub fn warning(&mut self, text: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Warning, text)
    }

    pub fn error(&mut self, text: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, text)
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn all(&self) -> &[Notice] {
        &self.items
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.items.last()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Notices pushed after the notice with id `after`
    pub fn since(&self, after: u64) -> impl Iterator<Item = &Notice> {
        self.items.iter().filter(move |n| n.id > after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut n = Notices::default();
        let a = n.warning("No walls detected");
        let b = n.error("Backend unreachable");
        assert_eq!(n.all().len(), 2);
        assert!(n.dismiss(a));
        assert!(!n.dismiss(a));
        assert_eq!(n.latest().map(|x| x.id), Some(b));
    }

    #[test]
    fn test_since() {
        let mut n = Notices::default();
        let a = n.info("one");
        n.info("two");
        n.info("three");
        let texts: Vec<_> = n.since(a).map(|x| x.text.as_str()).collect();
        assert_eq!(texts, ["two", "three"]);
    }
}
