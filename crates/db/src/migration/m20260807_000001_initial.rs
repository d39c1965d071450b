//! Initial database migration.
//!
//! Creates all enums, tables, constraints, and indexes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: IDENTITY
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: ACCOUNTS & TRANSACTIONS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 4: INVOICES
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_ITEMS_SQL).await?;

        // ============================================================
        // PART 5: INDEXES
        // ============================================================
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- User roles
CREATE TYPE user_role AS ENUM ('admin', 'accountant', 'staff');

-- Account classification
CREATE TYPE account_type AS ENUM ('asset', 'liability', 'income', 'expense');

-- Transaction kinds
CREATE TYPE transaction_kind AS ENUM ('income', 'expense', 'loan', 'investment');

-- Invoice payment status
CREATE TYPE payment_status AS ENUM ('pending', 'paid');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'staff',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    account_type account_type NOT NULL,
    name VARCHAR(255) NOT NULL UNIQUE,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    subtype VARCHAR(255) NOT NULL DEFAULT '',
    lock_version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    kind transaction_kind NOT NULL,
    category VARCHAR(255) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    tax_rate NUMERIC(7, 4) NOT NULL DEFAULT 0,
    tax_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total NUMERIC(19, 4) NOT NULL,
    payment_mode VARCHAR(64) NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    txn_date DATE NOT NULL,
    description TEXT,
    created_by UUID NOT NULL REFERENCES users(id),
    is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    invoice_number VARCHAR(64) NOT NULL UNIQUE,
    customer_name VARCHAR(255) NOT NULL,
    customer_email VARCHAR(255) NOT NULL,
    sub_total NUMERIC(19, 4) NOT NULL DEFAULT 0,
    tax_total NUMERIC(19, 4) NOT NULL DEFAULT 0,
    grand_total NUMERIC(19, 4) NOT NULL DEFAULT 0,
    status payment_status NOT NULL DEFAULT 'pending',
    payment_method VARCHAR(64) NOT NULL,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INVOICE_ITEMS_SQL: &str = r"
CREATE TABLE invoice_items (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    description TEXT NOT NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,
    tax_rate NUMERIC(7, 4) NOT NULL,
    tax_amount NUMERIC(19, 4) NOT NULL,
    line_total NUMERIC(19, 4) NOT NULL,
    UNIQUE (invoice_id, position)
);
";

const INDEXES_SQL: &str = r"
CREATE INDEX idx_transactions_account ON transactions(account_id);
CREATE INDEX idx_transactions_kind ON transactions(kind);
CREATE INDEX idx_transactions_date ON transactions(txn_date);
CREATE INDEX idx_transactions_visible ON transactions(is_deleted) WHERE is_deleted = FALSE;
CREATE INDEX idx_invoice_items_invoice ON invoice_items(invoice_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS invoice_items;
DROP TABLE IF EXISTS invoices;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS users;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS transaction_kind;
DROP TYPE IF EXISTS account_type;
DROP TYPE IF EXISTS user_role;
";
