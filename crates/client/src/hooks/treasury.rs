use serde_json::json;

use ceramerp_accounting::{
    BankAccount, BankAccountId, BankAccountInput, BankBalance, FinancialTransaction,
    TransactionId, TransactionInput, TransactionStatus, bank_balances,
};
use ceramerp_backend::schema::{BANK_ACCOUNTS, FINANCIAL_TRANSACTIONS};
use ceramerp_backend::{Filter, Query};

use crate::cache::{DASHBOARD, QueryKey};
use crate::client::ErpClient;
use crate::error::ClientResult;
use crate::hooks::{Mutation, ensure_deleted, validate};

const TRANSACTION_SELECT: &str = "*, bank_account:bank_accounts(id, name)";

const ACCOUNT_WRITE: Mutation = Mutation {
    success: "Bank account saved",
    failure: "Could not save bank account",
    invalidates: &[BANK_ACCOUNTS],
};
const ACCOUNT_DELETE: Mutation = Mutation {
    success: "Bank account deactivated",
    failure: "Could not delete bank account",
    invalidates: &[BANK_ACCOUNTS],
};
const TRANSACTION_WRITE: Mutation = Mutation {
    success: "Transaction saved",
    failure: "Could not save transaction",
    invalidates: &[FINANCIAL_TRANSACTIONS, DASHBOARD],
};
const TRANSACTION_DELETE: Mutation = Mutation {
    success: "Transaction deleted",
    failure: "Could not delete transaction",
    invalidates: &[FINANCIAL_TRANSACTIONS, DASHBOARD],
};

pub struct TreasuryHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> TreasuryHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// Active bank accounts by name.
    pub async fn bank_accounts(&self) -> ClientResult<Vec<BankAccount>> {
        self.client
            .cached_rows(
                QueryKey::new(BANK_ACCOUNTS),
                BANK_ACCOUNTS,
                Query::new().eq("active", true).order_asc("name"),
            )
            .await
    }

    pub async fn create_bank_account(&self, input: BankAccountInput) -> ClientResult<BankAccount> {
        validate(&input)?;
        self.client
            .mutate(&ACCOUNT_WRITE, async {
                Ok(self.client.table(BANK_ACCOUNTS).insert(&input).await?)
            })
            .await
    }

    pub async fn update_bank_account(
        &self,
        id: BankAccountId,
        input: BankAccountInput,
    ) -> ClientResult<BankAccount> {
        validate(&input)?;
        self.client
            .mutate(&ACCOUNT_WRITE, async {
                Ok(self
                    .client
                    .table(BANK_ACCOUNTS)
                    .update_one(&[Filter::eq("id", id)], &input)
                    .await?)
            })
            .await
    }

    /// Marks the account inactive; its transactions keep pointing at it.
    pub async fn delete_bank_account(&self, id: BankAccountId) -> ClientResult<BankAccount> {
        self.client
            .mutate(&ACCOUNT_DELETE, async {
                Ok(self
                    .client
                    .table(BANK_ACCOUNTS)
                    .update_one(&[Filter::eq("id", id)], &json!({ "active": false }))
                    .await?)
            })
            .await
    }

    pub async fn transactions(&self) -> ClientResult<Vec<FinancialTransaction>> {
        self.client
            .cached_rows(
                QueryKey::new(FINANCIAL_TRANSACTIONS),
                FINANCIAL_TRANSACTIONS,
                Query::new()
                    .select(TRANSACTION_SELECT)
                    .order_desc("transaction_date")
                    .order_desc("created_at"),
            )
            .await
    }

    pub async fn create_transaction(
        &self,
        input: TransactionInput,
    ) -> ClientResult<FinancialTransaction> {
        validate(&input)?;
        self.client
            .mutate(&TRANSACTION_WRITE, async {
                Ok(self.client.table(FINANCIAL_TRANSACTIONS).insert(&input).await?)
            })
            .await
    }

    pub async fn update_transaction(
        &self,
        id: TransactionId,
        input: TransactionInput,
    ) -> ClientResult<FinancialTransaction> {
        validate(&input)?;
        self.client
            .mutate(&TRANSACTION_WRITE, async {
                Ok(self
                    .client
                    .table(FINANCIAL_TRANSACTIONS)
                    .update_one(&[Filter::eq("id", id)], &input)
                    .await?)
            })
            .await
    }

    pub async fn delete_transaction(&self, id: TransactionId) -> ClientResult<()> {
        self.client
            .mutate(&TRANSACTION_DELETE, async {
                let removed = self
                    .client
                    .table(FINANCIAL_TRANSACTIONS)
                    .delete(&[Filter::eq("id", id)])
                    .await?;
                ensure_deleted(removed, format!("transaction {id}"))
            })
            .await
    }

    pub async fn mark_completed(&self, id: TransactionId) -> ClientResult<FinancialTransaction> {
        self.client
            .mutate(&TRANSACTION_WRITE, async {
                Ok(self
                    .client
                    .table(FINANCIAL_TRANSACTIONS)
                    .update_one(
                        &[Filter::eq("id", id)],
                        &json!({ "status": TransactionStatus::Completed }),
                    )
                    .await?)
            })
            .await
    }

    /// Opening, current and projected balance of every active account.
    pub async fn balances(&self) -> ClientResult<Vec<BankBalance>> {
        let accounts = self.bank_accounts().await?;
        let transactions = self.transactions().await?;
        Ok(bank_balances(&accounts, &transactions))
    }
}
