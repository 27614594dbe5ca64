//! Fluent construction of parameterized SELECT statements
//!
//! An alternative to hand-written SQL for the simple listing queries the
//! API serves. Identifiers are validated at construction time instead of
//! regex post-hoc, and placeholder numbering is a single strictly
//! increasing counter across all clauses, so anything this builder emits
//! satisfies the query guard's contiguous-sequence invariant by
//! construction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::driver::SqlValue;
use crate::error::BuilderError;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

const OPERATORS: &[&str] = &["=", "!=", "<", ">", "<=", ">=", "LIKE", "ILIKE", "IN"];

/// Upper bound accepted by [`SafeQueryBuilder::limit`]
const MAX_LIMIT: i64 = 1000;

/// Value accepted by a WHERE clause
///
/// `List` is only meaningful with the `IN` operator, where it expands to
/// one placeholder per element.
#[derive(Debug, Clone)]
pub enum WhereValue {
    Single(SqlValue),
    List(Vec<SqlValue>),
}

impl From<SqlValue> for WhereValue {
    fn from(value: SqlValue) -> Self {
        WhereValue::Single(value)
    }
}

impl From<&str> for WhereValue {
    fn from(value: &str) -> Self {
        WhereValue::Single(value.into())
    }
}

impl From<String> for WhereValue {
    fn from(value: String) -> Self {
        WhereValue::Single(value.into())
    }
}

impl From<i64> for WhereValue {
    fn from(value: i64) -> Self {
        WhereValue::Single(value.into())
    }
}

impl From<f64> for WhereValue {
    fn from(value: f64) -> Self {
        WhereValue::Single(value.into())
    }
}

impl From<bool> for WhereValue {
    fn from(value: bool) -> Self {
        WhereValue::Single(value.into())
    }
}

impl From<Vec<SqlValue>> for WhereValue {
    fn from(values: Vec<SqlValue>) -> Self {
        WhereValue::List(values)
    }
}

/// Finished statement: text plus its ordered parameter values
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub text: String,
    pub values: Vec<SqlValue>,
}

/// Fluent builder for parameterized SELECTs over validated identifiers
///
/// Every method validates its inputs and fails with a
/// [`BuilderError`] on a bad identifier, operator, or bound. These are
/// programmer errors, caught before any SQL text exists.
///
/// # Examples
///
/// ```
/// use palisade::builder::SafeQueryBuilder;
///
/// # fn example() -> Result<(), palisade::error::BuilderError> {
/// let query = SafeQueryBuilder::new()
///     .select(&["id", "title"])?
///     .from("ads")?
///     .where_clause("state", "=", "SP")?
///     .limit(10)?
///     .build();
///
/// assert_eq!(
///     query.text,
///     "SELECT id, title FROM ads WHERE state = $1 LIMIT $2"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SafeQueryBuilder {
    fields: Vec<String>,
    table: Option<String>,
    conditions: Vec<String>,
    order: Vec<String>,
    limit_clause: Option<String>,
    offset_clause: Option<String>,
    values: Vec<SqlValue>,
    next_placeholder: usize,
}

impl SafeQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the selected columns; each must be `*` or a valid identifier
    pub fn select(mut self, fields: &[&str]) -> Result<Self, BuilderError> {
        for field in fields {
            if *field != "*" && !IDENTIFIER.is_match(field) {
                return Err(BuilderError::InvalidColumn(field.to_string()));
            }
            self.fields.push(field.to_string());
        }
        Ok(self)
    }

    /// Sets the table to select from
    pub fn from(mut self, table: &str) -> Result<Self, BuilderError> {
        if !IDENTIFIER.is_match(table) {
            return Err(BuilderError::InvalidTable(table.to_string()));
        }
        self.table = Some(table.to_string());
        Ok(self)
    }

    /// Adds a condition; successive calls are joined with `AND`
    ///
    /// A `Null` value emits `IS NULL` and consumes no parameter. `IN`
    /// requires a list value and emits one placeholder per element. Any
    /// other operator takes a single value and one placeholder.
    pub fn where_clause(
        mut self,
        field: &str,
        operator: &str,
        value: impl Into<WhereValue>,
    ) -> Result<Self, BuilderError> {
        if !IDENTIFIER.is_match(field) {
            return Err(BuilderError::InvalidColumn(field.to_string()));
        }

        let operator = operator.to_uppercase();
        if !OPERATORS.contains(&operator.as_str()) {
            return Err(BuilderError::InvalidOperator(operator));
        }

        match value.into() {
            WhereValue::Single(SqlValue::Null) => {
                self.conditions.push(format!("{} IS NULL", field));
            }
            WhereValue::List(items) => {
                if operator != "IN" {
                    return Err(BuilderError::InvalidOperator(operator));
                }
                let placeholders: Vec<String> = items
                    .iter()
                    .map(|_| format!("${}", self.take_placeholder()))
                    .collect();
                self.values.extend(items);
                self.conditions
                    .push(format!("{} IN ({})", field, placeholders.join(", ")));
            }
            WhereValue::Single(value) => {
                if operator == "IN" {
                    return Err(BuilderError::InvalidOperator(operator));
                }
                let placeholder = self.take_placeholder();
                self.values.push(value);
                self.conditions
                    .push(format!("{} {} ${}", field, operator, placeholder));
            }
        }

        Ok(self)
    }

    /// Adds an ORDER BY term; direction must be `ASC` or `DESC`
    pub fn order_by(mut self, field: &str, direction: &str) -> Result<Self, BuilderError> {
        if !IDENTIFIER.is_match(field) {
            return Err(BuilderError::InvalidColumn(field.to_string()));
        }
        let direction = direction.to_uppercase();
        if direction != "ASC" && direction != "DESC" {
            return Err(BuilderError::InvalidDirection(direction));
        }
        self.order.push(format!("{} {}", field, direction));
        Ok(self)
    }

    /// Caps the result set; bounded to `0..=1000`
    pub fn limit(mut self, n: i64) -> Result<Self, BuilderError> {
        if !(0..=MAX_LIMIT).contains(&n) {
            return Err(BuilderError::InvalidLimit(n));
        }
        let placeholder = self.take_placeholder();
        self.values.push(SqlValue::Int(n));
        self.limit_clause = Some(format!("LIMIT ${}", placeholder));
        Ok(self)
    }

    /// Skips the first `n` rows; must be non-negative
    pub fn offset(mut self, n: i64) -> Result<Self, BuilderError> {
        if n < 0 {
            return Err(BuilderError::InvalidOffset(n));
        }
        let placeholder = self.take_placeholder();
        self.values.push(SqlValue::Int(n));
        self.offset_clause = Some(format!("OFFSET ${}", placeholder));
        Ok(self)
    }

    /// Assembles the statement from the accumulated clauses
    pub fn build(self) -> BuiltQuery {
        let fields = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(", ")
        };

        let mut text = format!(
            "SELECT {} FROM {}",
            fields,
            self.table.as_deref().unwrap_or_default()
        );

        if !self.conditions.is_empty() {
            text.push_str(" WHERE ");
            text.push_str(&self.conditions.join(" AND "));
        }
        if !self.order.is_empty() {
            text.push_str(" ORDER BY ");
            text.push_str(&self.order.join(", "));
        }
        if let Some(clause) = &self.limit_clause {
            text.push(' ');
            text.push_str(clause);
        }
        if let Some(clause) = &self.offset_clause {
            text.push(' ');
            text.push_str(clause);
        }

        BuiltQuery {
            text,
            values: self.values,
        }
    }

    fn take_placeholder(&mut self) -> usize {
        self.next_placeholder += 1;
        self.next_placeholder
    }
}
