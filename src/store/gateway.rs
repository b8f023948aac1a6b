use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, QueryBuilder};

use crate::error::IndexError;
use crate::store::types::Checkpoint;
use crate::store::validation::{normalize_address, normalize_hash, normalize_uint256};

/// State store gateway: one async method per tracked entity operation,
/// written over a `sqlx::PgPool` in the teacher's `db/repository.rs`
/// style (hand-written SQL, `QueryBuilder` for batch inserts,
/// `ON CONFLICT` matching each entity's natural unique key).
///
/// `schema` is applied as every pooled connection's `search_path` at
/// connect time, giving "testnet"/"mainnet" isolation without
/// schema-qualifying every query.
pub struct Gateway {
    pool: PgPool,
    schema: String,
}

impl Gateway {
    pub async fn connect(database_url: &str, schema: &str, max_connections: u32) -> Result<Self, IndexError> {
        let search_path = schema.to_string();
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    sqlx::query(&format!("SET search_path TO \"{}\", public", search_path))
                        .execute(conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;

        Ok(Self { pool, schema: schema.to_string() })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    // ---- Wallet ----------------------------------------------------

    pub async fn upsert_wallet(
        &self,
        wallet: &str,
        threshold: &str,
        owner_count: i32,
        created_at_block: i64,
        created_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let created_at_tx = normalize_hash("createdAtTx", created_at_tx)?;
        let threshold: i64 = threshold.parse().map_err(|_| IndexError::validation("threshold", threshold))?;

        sqlx::query(
            "INSERT INTO wallets (address, threshold, owner_count, created_at_block, created_at_tx)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (address) DO NOTHING",
        )
        .bind(&wallet)
        .bind(threshold)
        .bind(owner_count)
        .bind(created_at_block)
        .bind(&created_at_tx)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn increment_owner_count(&self, wallet: &str, delta: i32) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        sqlx::query("UPDATE wallets SET owner_count = owner_count + $1 WHERE address = $2")
            .bind(delta)
            .bind(&wallet)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_threshold(&self, wallet: &str, threshold: &str) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let threshold: i64 = threshold.parse().map_err(|_| IndexError::validation("threshold", threshold))?;
        sqlx::query("UPDATE wallets SET threshold = $1 WHERE address = $2")
            .bind(threshold)
            .bind(&wallet)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Every wallet address ever discovered, used to repopulate the
    /// scanner's tracked set. Paginates in pages of 1000 so a large
    /// table doesn't come back as one unbounded fetch.
    pub async fn get_all_wallet_addresses(&self) -> Result<Vec<String>, IndexError> {
        let mut out = Vec::new();
        let mut offset: i64 = 0;
        const PAGE: i64 = 1000;

        loop {
            let page: Vec<(String,)> =
                sqlx::query_as("SELECT address FROM wallets ORDER BY address LIMIT $1 OFFSET $2")
                    .bind(PAGE)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?;

            let len = page.len();
            out.extend(page.into_iter().map(|(a,)| a));

            if (len as i64) < PAGE {
                break;
            }
            offset += PAGE;
        }

        Ok(out)
    }

    // ---- WalletOwner -------------------------------------------------

    pub async fn insert_owner(
        &self,
        wallet: &str,
        owner: &str,
        added_at_block: i64,
        added_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let owner = normalize_address("owner", owner)?;
        let added_at_tx = normalize_hash("addedAtTx", added_at_tx)?;

        sqlx::query(
            "INSERT INTO wallet_owners (wallet_address, owner_address, added_at_block, added_at_tx)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (wallet_address, owner_address, added_at_block) DO NOTHING",
        )
        .bind(&wallet)
        .bind(&owner)
        .bind(added_at_block)
        .bind(&added_at_tx)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Batch-insert the initial owner set for a newly discovered wallet
    /// (`WalletCreated` / `WalletRegistered`).
    pub async fn insert_owners_batch(
        &self,
        wallet: &str,
        owners: &[String],
        added_at_block: i64,
        added_at_tx: &str,
    ) -> Result<(), IndexError> {
        if owners.is_empty() {
            return Ok(());
        }
        let wallet = normalize_address("wallet", wallet)?;
        let added_at_tx = normalize_hash("addedAtTx", added_at_tx)?;
        let owners: Vec<String> = owners
            .iter()
            .map(|o| normalize_address("owner", o))
            .collect::<Result<_, _>>()?;

        for chunk in owners.chunks(1000) {
            let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
                "INSERT INTO wallet_owners (wallet_address, owner_address, added_at_block, added_at_tx) ",
            );
            qb.push_values(chunk, |mut b, owner| {
                b.push_bind(&wallet)
                    .push_bind(owner)
                    .push_bind(added_at_block)
                    .push_bind(&added_at_tx);
            });
            qb.push(" ON CONFLICT (wallet_address, owner_address, added_at_block) DO NOTHING");
            qb.build().execute(&self.pool).await?;
        }

        Ok(())
    }

    pub async fn mark_owner_inactive(
        &self,
        wallet: &str,
        owner: &str,
        removed_at_block: i64,
        removed_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let owner = normalize_address("owner", owner)?;
        let removed_at_tx = normalize_hash("removedAtTx", removed_at_tx)?;

        sqlx::query(
            "UPDATE wallet_owners SET is_active = FALSE, removed_at_block = $1, removed_at_tx = $2
             WHERE wallet_address = $3 AND owner_address = $4 AND is_active",
        )
        .bind(removed_at_block)
        .bind(&removed_at_tx)
        .bind(&wallet)
        .bind(&owner)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- Module ------------------------------------------------------

    pub async fn upsert_module_enabled(
        &self,
        wallet: &str,
        module: &str,
        enabled_at_block: i64,
        enabled_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let module = normalize_address("module", module)?;
        let enabled_at_tx = normalize_hash("enabledAtTx", enabled_at_tx)?;

        sqlx::query(
            "INSERT INTO modules (wallet_address, module_address, enabled_at_block, enabled_at_tx, is_active)
             VALUES ($1, $2, $3, $4, TRUE)
             ON CONFLICT (wallet_address, module_address) DO UPDATE
             SET is_active = TRUE, enabled_at_block = EXCLUDED.enabled_at_block,
                 enabled_at_tx = EXCLUDED.enabled_at_tx, disabled_at_block = NULL, disabled_at_tx = NULL",
        )
        .bind(&wallet)
        .bind(&module)
        .bind(enabled_at_block)
        .bind(&enabled_at_tx)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn disable_module(
        &self,
        wallet: &str,
        module: &str,
        disabled_at_block: i64,
        disabled_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let module = normalize_address("module", module)?;
        let disabled_at_tx = normalize_hash("disabledAtTx", disabled_at_tx)?;

        sqlx::query(
            "UPDATE modules SET is_active = FALSE, disabled_at_block = $1, disabled_at_tx = $2
             WHERE wallet_address = $3 AND module_address = $4",
        )
        .bind(disabled_at_block)
        .bind(&disabled_at_tx)
        .bind(&wallet)
        .bind(&module)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- Transaction ---------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_transaction_pending(
        &self,
        wallet: &str,
        tx_hash: &str,
        to: &str,
        value: &str,
        data: &str,
        transaction_type: &str,
        decoded_params: serde_json::Value,
        submitted_by: &str,
        submitted_at_block: i64,
        submitted_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let tx_hash = normalize_hash("txHash", tx_hash)?;
        let to = normalize_address("to", to)?;
        let submitted_by = normalize_address("submittedBy", submitted_by)?;
        let submitted_at_tx = normalize_hash("submittedAtTx", submitted_at_tx)?;
        let value = normalize_uint256("value", value)?;

        sqlx::query(
            "INSERT INTO transactions
                (wallet_address, tx_hash, to_address, value, data, transaction_type, decoded_params,
                 status, confirmation_count, submitted_by, submitted_at_block, submitted_at_tx)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', 0, $8, $9, $10)
             ON CONFLICT (wallet_address, tx_hash) DO NOTHING",
        )
        .bind(&wallet)
        .bind(&tx_hash)
        .bind(&to)
        .bind(&value)
        .bind(data)
        .bind(transaction_type)
        .bind(decoded_params)
        .bind(&submitted_by)
        .bind(submitted_at_block)
        .bind(&submitted_at_tx)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_transaction_executed(
        &self,
        wallet: &str,
        tx_hash: &str,
        executed_at_block: i64,
        executed_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let tx_hash = normalize_hash("txHash", tx_hash)?;
        let executed_at_tx = normalize_hash("executedAtTx", executed_at_tx)?;

        sqlx::query(
            "UPDATE transactions SET status = 'executed', executed_at_block = $1, executed_at_tx = $2
             WHERE wallet_address = $3 AND tx_hash = $4 AND status = 'pending'",
        )
        .bind(executed_at_block)
        .bind(&executed_at_tx)
        .bind(&wallet)
        .bind(&tx_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_transaction_cancelled(
        &self,
        wallet: &str,
        tx_hash: &str,
        cancelled_at_block: i64,
        cancelled_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let tx_hash = normalize_hash("txHash", tx_hash)?;
        let cancelled_at_tx = normalize_hash("cancelledAtTx", cancelled_at_tx)?;

        sqlx::query(
            "UPDATE transactions SET status = 'cancelled', cancelled_at_block = $1, cancelled_at_tx = $2
             WHERE wallet_address = $3 AND tx_hash = $4 AND status = 'pending'",
        )
        .bind(cancelled_at_block)
        .bind(&cancelled_at_tx)
        .bind(&wallet)
        .bind(&tx_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- Confirmation --------------------------------------------------

    pub async fn insert_confirmation(
        &self,
        wallet: &str,
        tx_hash: &str,
        owner: &str,
        confirmed_at_block: i64,
        confirmed_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let tx_hash = normalize_hash("txHash", tx_hash)?;
        let owner = normalize_address("owner", owner)?;
        let confirmed_at_tx = normalize_hash("confirmedAtTx", confirmed_at_tx)?;

        sqlx::query(
            "INSERT INTO confirmations (wallet_address, tx_hash, owner_address, confirmed_at_block, confirmed_at_tx)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (wallet_address, tx_hash, owner_address, confirmed_at_block) DO NOTHING",
        )
        .bind(&wallet)
        .bind(&tx_hash)
        .bind(&owner)
        .bind(confirmed_at_block)
        .bind(&confirmed_at_tx)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn revoke_confirmation(
        &self,
        wallet: &str,
        tx_hash: &str,
        owner: &str,
        revoked_at_block: i64,
        revoked_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let tx_hash = normalize_hash("txHash", tx_hash)?;
        let owner = normalize_address("owner", owner)?;
        let revoked_at_tx = normalize_hash("revokedAtTx", revoked_at_tx)?;

        sqlx::query(
            "UPDATE confirmations SET is_active = FALSE, revoked_at_block = $1, revoked_at_tx = $2
             WHERE wallet_address = $3 AND tx_hash = $4 AND owner_address = $5 AND is_active",
        )
        .bind(revoked_at_block)
        .bind(&revoked_at_tx)
        .bind(&wallet)
        .bind(&tx_hash)
        .bind(&owner)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- Deposit ---------------------------------------------------

    pub async fn insert_deposit(
        &self,
        wallet: &str,
        sender: &str,
        amount: &str,
        block: i64,
        tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let sender = normalize_address("sender", sender)?;
        let tx = normalize_hash("depositedAtTx", tx)?;
        let amount = normalize_uint256("amount", amount)?;

        sqlx::query(
            "INSERT INTO deposits (wallet_address, sender_address, amount, deposited_at_block, deposited_at_tx)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (wallet_address, deposited_at_tx) DO NOTHING",
        )
        .bind(&wallet)
        .bind(&sender)
        .bind(&amount)
        .bind(block)
        .bind(&tx)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- RecoveryConfig / RecoveryGuardian --------------------------

    pub async fn upsert_recovery_setup(
        &self,
        wallet: &str,
        threshold: &str,
        recovery_period: &str,
        guardians: &[String],
        setup_at_block: i64,
        setup_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let setup_at_tx = normalize_hash("setupAtTx", setup_at_tx)?;
        let threshold: i64 = threshold.parse().map_err(|_| IndexError::validation("threshold", threshold))?;
        let recovery_period: i64 = recovery_period
            .parse()
            .map_err(|_| IndexError::validation("recoveryPeriod", recovery_period))?;
        let guardians: Vec<String> = guardians
            .iter()
            .map(|g| normalize_address("guardian", g))
            .collect::<Result<_, _>>()?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO recovery_configs (wallet_address, threshold, recovery_period, setup_at_block, setup_at_tx)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (wallet_address) DO UPDATE
             SET threshold = EXCLUDED.threshold, recovery_period = EXCLUDED.recovery_period,
                 setup_at_block = EXCLUDED.setup_at_block, setup_at_tx = EXCLUDED.setup_at_tx",
        )
        .bind(&wallet)
        .bind(threshold)
        .bind(recovery_period)
        .bind(setup_at_block)
        .bind(&setup_at_tx)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE recovery_guardians SET is_active = FALSE WHERE wallet_address = $1")
            .bind(&wallet)
            .execute(&mut *tx)
            .await?;

        if !guardians.is_empty() {
            let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
                "INSERT INTO recovery_guardians (wallet_address, guardian_address, added_at_block, added_at_tx) ",
            );
            qb.push_values(&guardians, |mut b, guardian| {
                b.push_bind(&wallet).push_bind(guardian).push_bind(setup_at_block).push_bind(&setup_at_tx);
            });
            qb.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Guardian threshold and recovery period set by the most recent
    /// `RecoverySetup`, used to compute a `RecoveryInitiated`'s
    /// `executionTime`.
    pub async fn get_recovery_config(&self, wallet: &str) -> Result<Option<(i64, i64)>, IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let row: Option<(i64, i64)> = sqlx::query_as(
            "SELECT threshold, recovery_period FROM recovery_configs WHERE wallet_address = $1",
        )
        .bind(&wallet)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // ---- Recovery / RecoveryApproval --------------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_recovery(
        &self,
        wallet: &str,
        recovery_hash: &str,
        new_owners: &[String],
        new_threshold: &str,
        initiator: &str,
        required_threshold: &str,
        execution_time: i64,
        initiated_at_block: i64,
        initiated_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let recovery_hash = normalize_hash("recoveryHash", recovery_hash)?;
        let initiator = normalize_address("initiator", initiator)?;
        let initiated_at_tx = normalize_hash("initiatedAtTx", initiated_at_tx)?;
        let new_threshold: i64 =
            new_threshold.parse().map_err(|_| IndexError::validation("newThreshold", new_threshold))?;
        let required_threshold: i64 = required_threshold
            .parse()
            .map_err(|_| IndexError::validation("requiredThreshold", required_threshold))?;
        let new_owners: Vec<String> = new_owners
            .iter()
            .map(|o| normalize_address("newOwner", o))
            .collect::<Result<_, _>>()?;

        sqlx::query(
            "INSERT INTO recoveries
                (wallet_address, recovery_hash, new_owners, new_threshold, initiator, approval_count,
                 required_threshold, execution_time, status, initiated_at_block, initiated_at_tx)
             VALUES ($1, $2, $3, $4, $5, 0, $6, $7, 'pending', $8, $9)
             ON CONFLICT (wallet_address, recovery_hash) DO NOTHING",
        )
        .bind(&wallet)
        .bind(&recovery_hash)
        .bind(serde_json::json!(new_owners))
        .bind(new_threshold)
        .bind(&initiator)
        .bind(required_threshold)
        .bind(execution_time)
        .bind(initiated_at_block)
        .bind(&initiated_at_tx)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_recovery_executed(
        &self,
        wallet: &str,
        recovery_hash: &str,
        executed_at_block: i64,
        executed_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let recovery_hash = normalize_hash("recoveryHash", recovery_hash)?;
        let executed_at_tx = normalize_hash("executedAtTx", executed_at_tx)?;

        sqlx::query(
            "UPDATE recoveries SET status = 'executed', executed_at_block = $1, executed_at_tx = $2
             WHERE wallet_address = $3 AND recovery_hash = $4 AND status = 'pending'",
        )
        .bind(executed_at_block)
        .bind(&executed_at_tx)
        .bind(&wallet)
        .bind(&recovery_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_recovery_cancelled(
        &self,
        wallet: &str,
        recovery_hash: &str,
        cancelled_at_block: i64,
        cancelled_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let recovery_hash = normalize_hash("recoveryHash", recovery_hash)?;
        let cancelled_at_tx = normalize_hash("cancelledAtTx", cancelled_at_tx)?;

        sqlx::query(
            "UPDATE recoveries SET status = 'cancelled', cancelled_at_block = $1, cancelled_at_tx = $2
             WHERE wallet_address = $3 AND recovery_hash = $4 AND status = 'pending'",
        )
        .bind(cancelled_at_block)
        .bind(&cancelled_at_tx)
        .bind(&wallet)
        .bind(&recovery_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_recovery_approval(
        &self,
        wallet: &str,
        recovery_hash: &str,
        guardian: &str,
        approved_at_block: i64,
        approved_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let recovery_hash = normalize_hash("recoveryHash", recovery_hash)?;
        let guardian = normalize_address("guardian", guardian)?;
        let approved_at_tx = normalize_hash("approvedAtTx", approved_at_tx)?;

        sqlx::query(
            "INSERT INTO recovery_approvals (wallet_address, recovery_hash, guardian_address, approved_at_block, approved_at_tx)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (wallet_address, recovery_hash, guardian_address, approved_at_block) DO NOTHING",
        )
        .bind(&wallet)
        .bind(&recovery_hash)
        .bind(&guardian)
        .bind(approved_at_block)
        .bind(&approved_at_tx)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn revoke_recovery_approval(
        &self,
        wallet: &str,
        recovery_hash: &str,
        guardian: &str,
        revoked_at_block: i64,
        revoked_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let recovery_hash = normalize_hash("recoveryHash", recovery_hash)?;
        let guardian = normalize_address("guardian", guardian)?;
        let revoked_at_tx = normalize_hash("revokedAtTx", revoked_at_tx)?;

        sqlx::query(
            "UPDATE recovery_approvals SET is_active = FALSE, revoked_at_block = $1, revoked_at_tx = $2
             WHERE wallet_address = $3 AND recovery_hash = $4 AND guardian_address = $5 AND is_active",
        )
        .bind(revoked_at_block)
        .bind(&revoked_at_tx)
        .bind(&wallet)
        .bind(&recovery_hash)
        .bind(&guardian)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- DailyLimitState ---------------------------------------------

    pub async fn upsert_daily_limit_set(&self, wallet: &str, daily_limit: &str) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let daily_limit = normalize_uint256("dailyLimit", daily_limit)?;

        sqlx::query(
            "INSERT INTO daily_limit_state (wallet_address, daily_limit, spent_today, last_reset_day)
             VALUES ($1, $2, '0', CURRENT_DATE)
             ON CONFLICT (wallet_address) DO UPDATE
             SET daily_limit = EXCLUDED.daily_limit, spent_today = '0', last_reset_day = CURRENT_DATE",
        )
        .bind(&wallet)
        .bind(&daily_limit)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn reset_daily_limit(&self, wallet: &str) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        sqlx::query(
            "UPDATE daily_limit_state SET spent_today = '0', last_reset_day = CURRENT_DATE
             WHERE wallet_address = $1",
        )
        .bind(&wallet)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// `spentToday = max(0, dailyLimit - remainingLimit)`, clamped at zero
    /// so a mid-day limit increase never drives it negative. Both columns
    /// are decimal-string TEXT, so the arithmetic happens on a `numeric`
    /// cast and the result is cast back before storing.
    pub async fn apply_daily_limit_spend(&self, wallet: &str, remaining_limit: &str) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let remaining_limit = normalize_uint256("remainingLimit", remaining_limit)?;

        sqlx::query(
            "UPDATE daily_limit_state
             SET spent_today = GREATEST(0, daily_limit::numeric - $1::numeric)::text
             WHERE wallet_address = $2",
        )
        .bind(&remaining_limit)
        .bind(&wallet)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- WhitelistEntry ------------------------------------------------

    pub async fn insert_whitelist_entry(
        &self,
        wallet: &str,
        whitelisted: &str,
        limit: &str,
        added_at_block: i64,
        added_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let whitelisted = normalize_address("whitelisted", whitelisted)?;
        let added_at_tx = normalize_hash("addedAtTx", added_at_tx)?;
        let limit = normalize_uint256("limit", limit)?;

        sqlx::query(
            "INSERT INTO whitelist_entries (wallet_address, whitelisted_address, limit_amount, added_at_block, added_at_tx)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (wallet_address, whitelisted_address, added_at_block) DO NOTHING",
        )
        .bind(&wallet)
        .bind(&whitelisted)
        .bind(&limit)
        .bind(added_at_block)
        .bind(&added_at_tx)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove_whitelist_entry(
        &self,
        wallet: &str,
        whitelisted: &str,
        removed_at_block: i64,
        removed_at_tx: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let whitelisted = normalize_address("whitelisted", whitelisted)?;
        let removed_at_tx = normalize_hash("removedAtTx", removed_at_tx)?;

        sqlx::query(
            "UPDATE whitelist_entries SET is_active = FALSE, removed_at_block = $1, removed_at_tx = $2
             WHERE wallet_address = $3 AND whitelisted_address = $4 AND is_active",
        )
        .bind(removed_at_block)
        .bind(&removed_at_tx)
        .bind(&wallet)
        .bind(&whitelisted)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- ModuleTransaction ---------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_module_transaction(
        &self,
        wallet: &str,
        module_type: &str,
        module_address: &str,
        to: &str,
        value: &str,
        remaining_limit: Option<&str>,
        block_number: i64,
        tx_hash: &str,
    ) -> Result<(), IndexError> {
        let wallet = normalize_address("wallet", wallet)?;
        let module_address = normalize_address("moduleAddress", module_address)?;
        let to = normalize_address("to", to)?;
        let tx_hash = normalize_hash("txHash", tx_hash)?;
        let value = normalize_uint256("value", value)?;
        let remaining_limit: Option<String> =
            remaining_limit.map(|r| normalize_uint256("remainingLimit", r)).transpose()?;

        sqlx::query(
            "INSERT INTO module_transactions
                (wallet_address, module_type, module_address, to_address, value, remaining_limit, block_number, tx_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&wallet)
        .bind(module_type)
        .bind(&module_address)
        .bind(&to)
        .bind(&value)
        .bind(&remaining_limit)
        .bind(block_number)
        .bind(&tx_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- IndexerCheckpoint -------------------------------------------

    pub async fn get_checkpoint(&self) -> Result<Checkpoint, IndexError> {
        let row: (i64, bool) =
            sqlx::query_as("SELECT last_indexed_block, is_syncing FROM indexer_checkpoint WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;
        Ok(Checkpoint { last_indexed_block: row.0, is_syncing: row.1 })
    }

    pub async fn advance_checkpoint(&self, to_block: i64) -> Result<(), IndexError> {
        sqlx::query(
            "UPDATE indexer_checkpoint SET last_indexed_block = $1, last_indexed_at = NOW() WHERE id = 1",
        )
        .bind(to_block)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_syncing(&self, syncing: bool) -> Result<(), IndexError> {
        sqlx::query("UPDATE indexer_checkpoint SET is_syncing = $1 WHERE id = 1")
            .bind(syncing)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
