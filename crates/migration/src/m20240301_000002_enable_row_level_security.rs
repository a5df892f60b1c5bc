use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

use crate::rls::{disable_rls_sql, enable_rls_sql, RlsPolicy};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Ownership test per table. Child tables are owned through their parent row.
pub fn policies() -> Vec<RlsPolicy> {
    vec![
        RlsPolicy::owner_only("profiles", "auth.uid() = id"),
        RlsPolicy::owner_only("coops", "auth.uid() = user_id"),
        RlsPolicy::owner_only("chickens", "auth.uid() = user_id"),
        RlsPolicy::owner_only(
            "egg_production",
            "EXISTS (SELECT 1 FROM chickens c WHERE c.id = chicken_id AND c.user_id = auth.uid())",
        ),
        RlsPolicy::owner_only(
            "feed",
            "EXISTS (SELECT 1 FROM coops k WHERE k.id = coop_id AND k.user_id = auth.uid())",
        ),
        RlsPolicy::owner_only(
            "health_records",
            "EXISTS (SELECT 1 FROM chickens c WHERE c.id = chicken_id AND c.user_id = auth.uid())",
        ),
        RlsPolicy::owner_only("sales", "auth.uid() = user_id"),
    ]
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for policy in policies() {
            db.execute_unprepared(&enable_rls_sql(&policy.table, policy.schema.as_deref()))
                .await?;
            db.execute_unprepared(&policy.create_policy_sql()).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for policy in policies() {
            db.execute_unprepared(&policy.drop_policy_sql()).await?;
            db.execute_unprepared(&disable_rls_sql(&policy.table, policy.schema.as_deref()))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_has_a_policy() {
        let tables: Vec<String> = policies().into_iter().map(|p| p.table).collect();
        for table in [
            "profiles",
            "coops",
            "chickens",
            "egg_production",
            "feed",
            "health_records",
            "sales",
        ] {
            assert!(tables.iter().any(|t| t == table), "no policy for {}", table);
        }
    }

    #[test]
    fn test_child_tables_check_their_parent_owner() {
        let production = policies()
            .into_iter()
            .find(|p| p.table == "egg_production")
            .unwrap();
        let sql = production.create_policy_sql();
        assert!(sql.contains("FROM chickens c"));
        assert!(sql.contains("WITH CHECK (EXISTS"));
    }
}
