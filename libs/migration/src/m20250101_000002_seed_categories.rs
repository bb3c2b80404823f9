use sea_orm_migration::prelude::*;

use crate::m20250101_000000_create_categories::Categories;

/// Categories are referenced but never written by the API, so a fresh
/// database needs a starting set.
pub(crate) const SEED_CATEGORIES: [&str; 5] = [
    "Electronics",
    "Books",
    "Clothing",
    "Home & Garden",
    "Toys",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert
            .into_table(Categories::Table)
            .columns([Categories::Name])
            .on_conflict(OnConflict::column(Categories::Name).do_nothing().to_owned());

        for name in SEED_CATEGORIES {
            insert.values_panic([name.into()]);
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Categories::Table)
            .and_where(Expr::col(Categories::Name).is_in(SEED_CATEGORIES))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}
