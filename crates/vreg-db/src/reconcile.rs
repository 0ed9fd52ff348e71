//! # Owner-Registry Reconciliation
//!
//! The owners table is a deduplicated address registry with manual
//! reference counting:
//!
//! > For every address string currently used by at least one natural
//! > person, legal entity or registration document, exactly one Owner row
//! > exists with that address; for every address used by none, no Owner
//! > row exists.
//!
//! There is no foreign key from the referencing tables — a registration
//! document is allowed to keep a historical address that diverges from its
//! owner's current one after an owner change, so addresses are reconciled
//! by VALUE.
//!
//! ## The routine (party address change)
//! ```text
//! PATCH /v1/persons/{passport} { "address": "B" }   (was "A")
//!      │
//!      ▼ one transaction
//!  1. ensure_owner("B")          INSERT .. ON CONFLICT(address) DO NOTHING
//!  2. reassign_documents(K,"B")  only docs whose document_owner == K;
//!                                returns the addresses they vacated
//!  3. UPDATE natural_persons ..  the party's own row
//!  4. sweep_owner("A") and       recount refs; delete each Owner row
//!     each vacated address       iff zero (a doc's address may have
//!                                diverged from its owner's)
//!      │
//!      ▼
//!  commit — or rollback of all four steps on any error
//! ```
//!
//! The find-or-create in step 1 is backed by the UNIQUE constraint on
//! `owners.address` with a conflict-tolerant insert, so two concurrent
//! transactions racing toward the same new address cannot create a
//! duplicate row.
//!
//! The same two helpers guard every other code path that writes an
//! address column (party create/delete, document create/update/delete),
//! which is what keeps the registry invariant global instead of a special
//! case of the party update handlers.

use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// Ensures an Owner row exists for `address` (find-or-create).
///
/// Idempotent under concurrency: the UNIQUE constraint plus
/// `ON CONFLICT DO NOTHING` means the row is created at most once, and a
/// lost race is not an error.
pub async fn ensure_owner(conn: &mut SqliteConnection, address: &str) -> DbResult<()> {
    sqlx::query("INSERT INTO owners (id, address) VALUES (?1, ?2) ON CONFLICT(address) DO NOTHING")
        .bind(Uuid::new_v4().to_string())
        .bind(address)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Rewrites the address on the registration documents OWNED by the party
/// with key `party_key` (passport or tax number).
///
/// Documents that merely share the old address string but belong to a
/// different party are deliberately untouched.
///
/// Returns the distinct addresses the party's documents held BEFORE the
/// rewrite (excluding `new_address`). A document's address may have
/// diverged from its owner's, so each of these is a sweep candidate after
/// the party row itself is updated.
pub async fn reassign_documents(
    conn: &mut SqliteConnection,
    party_key: &str,
    new_address: &str,
) -> DbResult<Vec<String>> {
    let old_addresses: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT address FROM registration_docs
         WHERE document_owner = ?1 AND address != ?2",
    )
    .bind(party_key)
    .bind(new_address)
    .fetch_all(&mut *conn)
    .await?;

    let result = sqlx::query("UPDATE registration_docs SET address = ?1 WHERE document_owner = ?2")
        .bind(new_address)
        .bind(party_key)
        .execute(&mut *conn)
        .await?;

    debug!(
        party_key = %party_key,
        rewritten = result.rows_affected(),
        vacated = old_addresses.len(),
        "Reassigned own documents to new address"
    );

    Ok(old_addresses)
}

/// Garbage-collects the Owner row for `address` if nothing references it
/// anymore.
///
/// Recounts references across all three referencing tables; the Owner row
/// is deleted only when the total is zero. Returns whether a row was
/// deleted.
pub async fn sweep_owner(conn: &mut SqliteConnection, address: &str) -> DbResult<bool> {
    let references: i64 = sqlx::query_scalar(
        r#"
        SELECT
            (SELECT COUNT(*) FROM natural_persons   WHERE address = ?1) +
            (SELECT COUNT(*) FROM legal_entities    WHERE address = ?1) +
            (SELECT COUNT(*) FROM registration_docs WHERE address = ?1)
        "#,
    )
    .bind(address)
    .fetch_one(&mut *conn)
    .await?;

    if references > 0 {
        debug!(address = %address, references, "Address still referenced, owner row kept");
        return Ok(false);
    }

    let result = sqlx::query("DELETE FROM owners WHERE address = ?1")
        .bind(address)
        .execute(&mut *conn)
        .await?;

    debug!(address = %address, "Orphaned address swept from owner registry");
    Ok(result.rows_affected() > 0)
}

/// Counts registration documents whose owner-of-record is `party_key`.
///
/// Used both by the reconciliation flow and by the immutable-field policy
/// check ("identity fields freeze once documents exist").
pub async fn count_party_documents(
    conn: &mut SqliteConnection,
    party_key: &str,
) -> DbResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM registration_docs WHERE document_owner = ?1")
            .bind(party_key)
            .fetch_one(&mut *conn)
            .await?;

    Ok(count)
}

/// Whether any party (natural person or legal entity) exists with the
/// given key. Used when issuing or reassigning documents.
pub async fn party_exists(conn: &mut SqliteConnection, party_key: &str) -> DbResult<bool> {
    let found: i64 = sqlx::query_scalar(
        r#"
        SELECT
            (SELECT COUNT(*) FROM natural_persons WHERE passport   = ?1) +
            (SELECT COUNT(*) FROM legal_entities  WHERE tax_number = ?1)
        "#,
    )
    .bind(party_key)
    .fetch_one(&mut *conn)
    .await?;

    Ok(found > 0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn owner_count(db: &Database, address: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM owners WHERE address = ?1")
            .bind(address)
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ensure_owner_is_idempotent() {
        let db = test_db().await;
        let mut tx = db.pool().begin().await.unwrap();

        ensure_owner(&mut tx, "Lenina st. 1").await.unwrap();
        ensure_owner(&mut tx, "Lenina st. 1").await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(owner_count(&db, "Lenina st. 1").await, 1);
    }

    #[tokio::test]
    async fn test_sweep_deletes_unreferenced_owner() {
        let db = test_db().await;
        let mut tx = db.pool().begin().await.unwrap();

        ensure_owner(&mut tx, "Orphan st. 9").await.unwrap();
        let swept = sweep_owner(&mut tx, "Orphan st. 9").await.unwrap();
        tx.commit().await.unwrap();

        assert!(swept);
        assert_eq!(owner_count(&db, "Orphan st. 9").await, 0);
    }

    #[tokio::test]
    async fn test_sweep_keeps_referenced_owner() {
        let db = test_db().await;
        let mut tx = db.pool().begin().await.unwrap();

        ensure_owner(&mut tx, "Shared st. 2").await.unwrap();
        sqlx::query(
            "INSERT INTO natural_persons (passport, last_name, first_name, address)
             VALUES ('1234 567890', 'Ivanov', 'Ivan', 'Shared st. 2')",
        )
        .execute(&mut *tx)
        .await
        .unwrap();

        let swept = sweep_owner(&mut tx, "Shared st. 2").await.unwrap();
        tx.commit().await.unwrap();

        assert!(!swept);
        assert_eq!(owner_count(&db, "Shared st. 2").await, 1);
    }

    #[tokio::test]
    async fn test_party_exists_sees_both_kinds() {
        let db = test_db().await;
        let mut tx = db.pool().begin().await.unwrap();

        sqlx::query(
            "INSERT INTO natural_persons (passport, last_name, first_name, address)
             VALUES ('1234 567890', 'Ivanov', 'Ivan', 'A')",
        )
        .execute(&mut *tx)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO legal_entities (tax_number, company_name, address)
             VALUES ('1234567890', 'Vector LLC', 'B')",
        )
        .execute(&mut *tx)
        .await
        .unwrap();

        assert!(party_exists(&mut tx, "1234 567890").await.unwrap());
        assert!(party_exists(&mut tx, "1234567890").await.unwrap());
        assert!(!party_exists(&mut tx, "0000 000000").await.unwrap());
    }
}
