use super::error::ProblemError;

/// The three parts encoded in a locale title: `"<category> <code> <name>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleTitle<'a> {
    pub category: &'a str,
    pub code: &'a str,
    pub name: &'a str,
}

impl<'a> LocaleTitle<'a> {
    /// Splits on the first two single spaces; everything after the second
    /// belongs to `name`, so names may contain spaces.
    ///
    /// Fails with [`ProblemError::Title`] when the title has fewer than two
    /// spaces. Nothing is guessed or truncated.
    pub fn parse(title: &'a str) -> Result<Self, ProblemError> {
        let mut parts = title.splitn(3, ' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(category), Some(code), Some(name)) => Ok(Self {
                category,
                code,
                name,
            }),
            _ => Err(ProblemError::Title {
                title: title.to_string(),
            }),
        }
    }

    /// Directory name of a single problem: `<code>_<name>`.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.code, self.name)
    }

    /// Removes every leading character of `set_name` that also appears in the
    /// category, then trims whitespace. This is character-set stripping, so
    /// `"Python"` strips `"Pyth Basics"` down to `"Basics"`.
    pub fn strip_category<'s>(&self, set_name: &'s str) -> &'s str {
        set_name
            .trim_start_matches(|c: char| self.category.contains(c))
            .trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_keeps_its_spaces() {
        let title = LocaleTitle::parse("Algorithms A1 Binary Search Tree").unwrap();
        assert_eq!(title.category, "Algorithms");
        assert_eq!(title.code, "A1");
        assert_eq!(title.name, "Binary Search Tree");
        assert_eq!(title.dir_name(), "A1_Binary Search Tree");
    }

    #[test]
    fn exactly_three_tokens() {
        let title = LocaleTitle::parse("Python 101 Sum").unwrap();
        assert_eq!(
            title,
            LocaleTitle {
                category: "Python",
                code: "101",
                name: "Sum"
            }
        );
    }

    #[test]
    fn category_with_spaces_splits_at_first_space() {
        // a right-hand split would give ("Intro to C", "1", "Hello")
        let title = LocaleTitle::parse("Intro to C 1 Hello").unwrap();
        assert_eq!(title.category, "Intro");
        assert_eq!(title.code, "to");
        assert_eq!(title.name, "C 1 Hello");
    }

    #[test]
    fn too_few_tokens_is_an_error() {
        for bad in ["", "Python", "Python 101"] {
            match LocaleTitle::parse(bad) {
                Err(ProblemError::Title { title }) => assert_eq!(title, bad),
                other => panic!("expected title error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn strip_category_removes_characters_not_prefix() {
        let title = LocaleTitle::parse("Python 101 Sum").unwrap();
        assert_eq!(title.strip_category("Python TQC+ 第1類"), "TQC+ 第1類");
        // every leading char in {P,y,t,h,o,n} goes, not just the word
        assert_eq!(title.strip_category("thony basics"), "basics");
        assert_eq!(title.strip_category("  Other"), "Other");
    }

    #[test]
    fn strip_category_can_consume_everything() {
        let title = LocaleTitle::parse("abc 1 x").unwrap();
        assert_eq!(title.strip_category("cab"), "");
    }
}
