//! `PostgREST` query strings.
//!
//! Only the operators the screens use are modelled: column selection with
//! embedded relations, equality, and set exclusion.

use std::fmt;

/// Tables the client reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Shops,
    ShopHours,
    Products,
    ShopProducts,
}

impl Table {
    /// Table name as exposed by the REST endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shops => "shops",
            Self::ShopHours => "shop_hours",
            Self::Products => "products",
            Self::ShopProducts => "shop_products",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: String },
    /// `column NOT IN (values)`. Never empty.
    NotIn { column: String, values: Vec<String> },
}

impl Filter {
    /// Equality filter.
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Set-exclusion filter, or `None` when `values` is empty.
    ///
    /// An empty exclusion list has no valid rendering, so callers fall back
    /// to an unfiltered read instead.
    pub fn not_in<I, V>(column: impl Into<String>, values: I) -> Option<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            None
        } else {
            Some(Self::NotIn {
                column: column.into(),
                values,
            })
        }
    }

    /// The `(column, operator.value)` query pair.
    #[must_use]
    pub fn to_pair(&self) -> (String, String) {
        match self {
            Self::Eq { column, value } => (column.clone(), format!("eq.{value}")),
            Self::NotIn { column, values } => {
                let list = values
                    .iter()
                    .map(|v| quote_list_value(v))
                    .collect::<Vec<_>>()
                    .join(",");
                (column.clone(), format!("not.in.({list})"))
            }
        }
    }
}

/// A read, update or delete target: a table plus filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: Table,
    select: Option<String>,
    filters: Vec<Filter>,
}

impl Query {
    /// Start a query on `table`.
    #[must_use]
    pub const fn new(table: Table) -> Self {
        Self {
            table,
            select: None,
            filters: Vec::new(),
        }
    }

    /// Columns to return, e.g. `*,hours:shop_hours(*)`.
    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    /// Add `column = value`.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    /// Add an already-built filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Target table.
    #[must_use]
    pub const fn table(&self) -> Table {
        self.table
    }

    /// Filters in insertion order.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Query-string pairs, `select` first.
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.select
            .iter()
            .map(|columns| ("select".to_string(), columns.clone()))
            .chain(self.filters.iter().map(Filter::to_pair))
            .collect()
    }
}

/// Quote a value for an `in.(…)` list when it contains reserved characters.
fn quote_list_value(value: &str) -> String {
    let reserved =
        |c: char| matches!(c, ',' | '(' | ')' | '"' | '\\' | ':' | '.') || c.is_whitespace();

    if value.is_empty() || value.contains(reserved) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_select_with_embedded_relation() {
        let query = Query::new(Table::Shops).select("*,hours:shop_hours(*)");
        assert_eq!(query.pairs(), vec![pair("select", "*,hours:shop_hours(*)")]);
    }

    #[test]
    fn test_eq_filters_keep_order() {
        let query = Query::new(Table::ShopProducts)
            .eq("product_id", "p-1")
            .eq("shop_id", "s-1");
        assert_eq!(
            query.pairs(),
            vec![pair("product_id", "eq.p-1"), pair("shop_id", "eq.s-1")]
        );
    }

    #[test]
    fn test_not_in_renders_list() {
        let filter = Filter::not_in("id", ["a1", "b2"]).unwrap();
        assert_eq!(filter.to_pair(), pair("id", "not.in.(a1,b2)"));
    }

    #[test]
    fn test_not_in_quotes_reserved_values() {
        let filter = Filter::not_in("id", ["plain", "with,comma", "say \"hi\""]).unwrap();
        assert_eq!(
            filter.to_pair(),
            pair("id", r#"not.in.(plain,"with,comma","say \"hi\"")"#)
        );
    }

    #[test]
    fn test_not_in_empty_is_none() {
        assert!(Filter::not_in("id", Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_uuid_values_are_not_quoted() {
        let filter = Filter::not_in("id", ["0b7a9c4e-1f2d-4e5a-9b8c-7d6e5f4a3b2c"]).unwrap();
        assert_eq!(
            filter.to_pair().1,
            "not.in.(0b7a9c4e-1f2d-4e5a-9b8c-7d6e5f4a3b2c)"
        );
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Shops.as_str(), "shops");
        assert_eq!(Table::ShopHours.as_str(), "shop_hours");
        assert_eq!(Table::Products.as_str(), "products");
        assert_eq!(Table::ShopProducts.to_string(), "shop_products");
    }
}
