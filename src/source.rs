use once_cell::unsync::OnceCell;
use std::fmt::{Display, Formatter};

/// 1-based line and column of a position in [`Source`].
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl Display for LineColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The input being parsed, together with a lazily-built newline index used to
/// translate a byte position into a line/column pair.
pub struct Source<'s> {
    pub value: &'s str,
    line_ends: OnceCell<Vec<usize>>,
}

impl<'s> From<&'s str> for Source<'s> {
    fn from(value: &'s str) -> Self {
        Source::new(value)
    }
}

impl<'s> Source<'s> {
    pub fn new(value: &'s str) -> Self {
        Self {
            value,
            line_ends: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    fn obtain_line_ends(&self) -> &Vec<usize> {
        self.line_ends.get_or_init(|| {
            self.value
                .char_indices()
                .filter_map(|(index, c)| if c == '\n' { Some(index) } else { None })
                .collect()
        })
    }

    /// 1-based (line, column) for a byte position in [`Source::value`].
    pub fn position_to_line_column(&self, position: usize) -> LineColumn {
        let line_ends = self.obtain_line_ends();
        let index = match line_ends.binary_search(&position) {
            Ok(index) | Err(index) => index,
        };

        if index == 0 {
            LineColumn {
                line: 1,
                column: self.value[..position].chars().count() + 1,
            }
        } else {
            let line_start = line_ends[index - 1] + 1;
            LineColumn {
                line: index + 1,
                column: self.value[line_start..position].chars().count() + 1,
            }
        }
    }
}
