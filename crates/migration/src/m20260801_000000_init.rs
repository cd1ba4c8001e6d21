//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Bottega:
//!
//! - `users`: accounts, role and the denormalized expense total
//! - `inventory_items`: the merchant's priced catalog
//! - `expenses`: settled and timer-based expense records

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Password,
    Role,
    TotalExpenses,
}

#[derive(Iden)]
enum InventoryItems {
    Table,
    Id,
    Name,
    Description,
    Price,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    OwnerUserId,
    Description,
    Amount,
    OccurredAt,
    IsTimerBased,
    TimerStart,
    TimerEnd,
    InventoryItemId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(
                        ColumnDef::new(Users::TotalExpenses)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-username-unique")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Inventory items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(InventoryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryItems::Name).string().not_null())
                    .col(
                        ColumnDef::new(InventoryItems::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::Price)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::OwnerUserId).string())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::OccurredAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(Expenses::IsTimerBased)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::TimerStart).timestamp())
                    .col(ColumnDef::new(Expenses::TimerEnd).timestamp())
                    .col(ColumnDef::new(Expenses::InventoryItemId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-owner_user_id")
                            .from(Expenses::Table, Expenses::OwnerUserId)
                            .to(Users::Table, Users::Id),
                    )
                    // Deleting a catalog item keeps the expense; name and
                    // price were snapshotted at creation.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-inventory_item_id")
                            .from(Expenses::Table, Expenses::InventoryItemId)
                            .to(InventoryItems::Table, InventoryItems::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-owner_user_id")
                    .table(Expenses::Table)
                    .col(Expenses::OwnerUserId)
                    .to_owned(),
            )
            .await?;

        // Open-timer lookups filter on these two columns.
        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-timer-state")
                    .table(Expenses::Table)
                    .col(Expenses::IsTimerBased)
                    .col(Expenses::TimerEnd)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
