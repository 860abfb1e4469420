//! CREATE TABLE builder
//!
//! Column types and defaults are schema constants written into the statement
//! text, so both are restricted: types must match a conservative type grammar
//! and defaults are a closed set.

/// Literal a column may default to
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    Null,
    Integer(i64),
    Boolean(bool),
    CurrentTimestamp,
    CurrentDate,
    /// Rendered as a quoted literal after validation
    Text(String),
}

/// One column of a CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub(crate) name: String,
    pub(crate) data_type: String,
    pub(crate) not_null: bool,
    pub(crate) default: Option<ColumnDefault>,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            not_null: false,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default_value(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// `FOREIGN KEY (column) REFERENCES table(referenced_column)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

/// Structured CREATE TABLE request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTableQuery {
    pub(crate) table: String,
    pub(crate) if_not_exists: bool,
    pub(crate) columns: Vec<ColumnDefinition>,
    pub(crate) primary_key: Vec<String>,
    pub(crate) foreign_keys: Vec<ForeignKey>,
}

impl CreateTableQuery {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Self::default()
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a primary key constraint
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a foreign key constraint
    pub fn foreign_key(
        mut self,
        column: &str,
        references_table: &str,
        references_column: &str,
    ) -> Self {
        self.foreign_keys.push(ForeignKey {
            column: column.to_string(),
            references_table: references_table.to_string(),
            references_column: references_column.to_string(),
        });
        self
    }

    /// Whether `name` is one of the declared columns
    pub fn declares(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }
}
