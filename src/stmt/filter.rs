use crate::stmt::Value;

/// How the conditions of a [`Filter`] combine in the WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combine {
    #[default]
    And,
    Or,
}

/// An ordered list of `column = value` conditions.
///
/// Column names are interpolated verbatim and are not validated against the
/// record type's schema; they are trusted caller input, never user input.
/// An empty filter produces no WHERE clause at all.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    combine: Combine,
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// A filter whose conditions are ANDed together.
    pub fn new() -> Filter {
        Filter::default()
    }

    /// A filter whose conditions are ORed together.
    pub fn any() -> Filter {
        Filter {
            combine: Combine::Or,
            ..Filter::default()
        }
    }

    /// Adds a `column = value` condition.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Filter {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The WHERE clause including the leading keyword, or an empty string.
    pub(crate) fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }

        let joiner = match self.combine {
            Combine::And => " AND ",
            Combine::Or => " OR ",
        };
        let conditions = self
            .conditions
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(joiner);

        format!(" WHERE {conditions}")
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Value> {
        self.conditions.iter().map(|(_, value)| value)
    }
}
