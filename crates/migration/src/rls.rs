//! Row-level security SQL helpers.
//!
//! sea-query has no statement builder for `CREATE POLICY`, so these render
//! the SQL directly; migrations run it with `execute_unprepared`.

use std::fmt;

/// SQL command an RLS policy restricts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RlsCommand {
    All,
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for RlsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RlsCommand::All => write!(f, "ALL"),
            RlsCommand::Select => write!(f, "SELECT"),
            RlsCommand::Insert => write!(f, "INSERT"),
            RlsCommand::Update => write!(f, "UPDATE"),
            RlsCommand::Delete => write!(f, "DELETE"),
        }
    }
}

/// Role a policy applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlsRole {
    Authenticated,
    Anon,
    Public,
    Custom(String),
}

impl fmt::Display for RlsRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RlsRole::Authenticated => write!(f, "authenticated"),
            RlsRole::Anon => write!(f, "anon"),
            RlsRole::Public => write!(f, "public"),
            RlsRole::Custom(role) => write!(f, "\"{}\"", role),
        }
    }
}

/// One `CREATE POLICY` definition.
#[derive(Debug, Clone)]
pub struct RlsPolicy {
    pub name: String,
    pub table: String,
    pub command: RlsCommand,
    pub role: RlsRole,
    /// `USING` expression: which existing rows are visible or modifiable.
    pub using: String,
    /// `WITH CHECK` expression: which new rows may be written.
    pub check: Option<String>,
    /// Defaults to `public`.
    pub schema: Option<String>,
}

impl RlsPolicy {
    /// A policy for every command where reads and writes share one ownership test.
    pub fn owner_only(table: &str, ownership: &str) -> Self {
        Self {
            name: format!("{} are owned by their user", table),
            table: table.to_string(),
            command: RlsCommand::All,
            role: RlsRole::Authenticated,
            using: ownership.to_string(),
            check: Some(ownership.to_string()),
            schema: None,
        }
    }

    fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or("public")
    }

    pub fn create_policy_sql(&self) -> String {
        let check_clause = self
            .check
            .as_ref()
            .map_or(String::new(), |c| format!(" WITH CHECK ({})", c));
        format!(
            "CREATE POLICY \"{name}\" ON \"{schema}\".\"{table}\" FOR {command} TO {role} USING ({using}){check_clause};",
            name = self.name,
            schema = self.schema(),
            table = self.table,
            command = self.command,
            role = self.role,
            using = self.using,
            check_clause = check_clause
        )
    }

    pub fn drop_policy_sql(&self) -> String {
        format!(
            "DROP POLICY IF EXISTS \"{name}\" ON \"{schema}\".\"{table}\";",
            name = self.name,
            schema = self.schema(),
            table = self.table
        )
    }
}

pub fn enable_rls_sql(table: &str, schema: Option<&str>) -> String {
    format!(
        "ALTER TABLE \"{schema}\".\"{table}\" ENABLE ROW LEVEL SECURITY;",
        schema = schema.unwrap_or("public"),
        table = table
    )
}

pub fn disable_rls_sql(table: &str, schema: Option<&str>) -> String {
    format!(
        "ALTER TABLE \"{schema}\".\"{table}\" DISABLE ROW LEVEL SECURITY;",
        schema = schema.unwrap_or("public"),
        table = table
    )
}
