//! SQL dialect descriptor.
//!
//! Repository SQL is written once with `?` placeholders and rendered per
//! dialect: Postgres gets `$1, $2, ...`, MySQL and SQLite keep `?`. Upserts
//! use the dialect's native clause.

/// Placeholder style used by a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?` for every parameter.
    Positional,
    /// `$1`, `$2`, ... in order.
    Numbered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Infer the dialect from a database URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "sqlite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    pub fn placeholder(self) -> Placeholder {
        match self {
            Dialect::Postgres => Placeholder::Numbered,
            Dialect::MySql | Dialect::Sqlite => Placeholder::Positional,
        }
    }

    /// Render a `?`-placeholder template for this dialect.
    ///
    /// Templates must not contain `?` inside string literals.
    pub fn sql(self, template: &str) -> String {
        match self.placeholder() {
            Placeholder::Positional => template.to_string(),
            Placeholder::Numbered => {
                let mut out = String::with_capacity(template.len() + 8);
                let mut n = 0;
                for ch in template.chars() {
                    if ch == '?' {
                        n += 1;
                        out.push('$');
                        out.push_str(&n.to_string());
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }

    /// Render an insert-or-update statement keyed on `key`.
    ///
    /// `columns` lists every inserted column including `key`; all non-key
    /// columns are overwritten on conflict.
    pub fn upsert(self, table: &str, key: &str, columns: &[&str]) -> String {
        let placeholders = vec!["?"; columns.len()].join(", ");
        let insert = format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            columns.join(", ")
        );
        let updated: Vec<&str> = columns.iter().copied().filter(|c| *c != key).collect();

        let template = match self {
            Dialect::MySql => {
                let set = updated
                    .iter()
                    .map(|c| format!("{c} = VALUES({c})"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{insert} ON DUPLICATE KEY UPDATE {set}")
            }
            Dialect::Postgres | Dialect::Sqlite => {
                let set = updated
                    .iter()
                    .map(|c| format!("{c} = EXCLUDED.{c}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{insert} ON CONFLICT ({key}) DO UPDATE SET {set}")
            }
        };
        self.sql(&template)
    }
}
