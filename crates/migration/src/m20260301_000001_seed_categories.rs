use chrono::Utc;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum GroupCategories {
    Table,
    Name,
    CreatedAt,
}

const DEFAULT_CATEGORIES: [&str; 4] = ["Trip", "Home", "Couple", "Other"];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = Utc::now();
        let mut insert = Query::insert();
        insert
            .into_table(GroupCategories::Table)
            .columns([GroupCategories::Name, GroupCategories::CreatedAt]);
        for name in DEFAULT_CATEGORIES {
            insert
                .values([name.into(), now.into()])
                .map_err(|err| DbErr::Custom(err.to_string()))?;
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(GroupCategories::Table)
            .and_where(Expr::col(GroupCategories::Name).is_in(DEFAULT_CATEGORIES))
            .to_owned();
        manager.exec_stmt(delete).await
    }
}
