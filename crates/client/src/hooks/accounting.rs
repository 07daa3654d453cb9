use ceramerp_accounting::{
    AccountBalance, AccountId, AccountingEntry, AccountingEntryInput, ChartAccount,
    ChartAccountInput, EntryId, trial_balance,
};
use ceramerp_backend::schema::{ACCOUNTING_ENTRIES, CHART_OF_ACCOUNTS};
use ceramerp_backend::{Filter, Query};

use crate::cache::QueryKey;
use crate::client::ErpClient;
use crate::error::ClientResult;
use crate::hooks::{Mutation, ensure_deleted, validate};

const ENTRY_SELECT: &str = "*, account:chart_of_accounts(id, code, name, account_type)";

const ENTRY_WRITE: Mutation = Mutation {
    success: "Entry saved",
    failure: "Could not save entry",
    invalidates: &[ACCOUNTING_ENTRIES],
};
const ENTRY_DELETE: Mutation = Mutation {
    success: "Entry deleted",
    failure: "Could not delete entry",
    invalidates: &[ACCOUNTING_ENTRIES],
};
// Entries embed their account, so renaming an account refreshes them too.
const ACCOUNT_WRITE: Mutation = Mutation {
    success: "Account saved",
    failure: "Could not save account",
    invalidates: &[CHART_OF_ACCOUNTS, ACCOUNTING_ENTRIES],
};

pub struct AccountingHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> AccountingHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// Chart of accounts by code.
    pub async fn chart(&self) -> ClientResult<Vec<ChartAccount>> {
        self.client
            .cached_rows(
                QueryKey::new(CHART_OF_ACCOUNTS),
                CHART_OF_ACCOUNTS,
                Query::new().order_asc("code"),
            )
            .await
    }

    pub async fn create_account(&self, input: ChartAccountInput) -> ClientResult<ChartAccount> {
        validate(&input)?;
        self.client
            .mutate(&ACCOUNT_WRITE, async {
                Ok(self.client.table(CHART_OF_ACCOUNTS).insert(&input).await?)
            })
            .await
    }

    pub async fn update_account(
        &self,
        id: AccountId,
        input: ChartAccountInput,
    ) -> ClientResult<ChartAccount> {
        validate(&input)?;
        self.client
            .mutate(&ACCOUNT_WRITE, async {
                Ok(self
                    .client
                    .table(CHART_OF_ACCOUNTS)
                    .update_one(&[Filter::eq("id", id)], &input)
                    .await?)
            })
            .await
    }

    /// Journal entries with their account, newest first.
    pub async fn entries(&self) -> ClientResult<Vec<AccountingEntry>> {
        self.client
            .cached_rows(
                QueryKey::new(ACCOUNTING_ENTRIES),
                ACCOUNTING_ENTRIES,
                Query::new()
                    .select(ENTRY_SELECT)
                    .order_desc("entry_date")
                    .order_desc("created_at"),
            )
            .await
    }

    pub async fn create_entry(&self, input: AccountingEntryInput) -> ClientResult<AccountingEntry> {
        validate(&input)?;
        self.client
            .mutate(&ENTRY_WRITE, async {
                Ok(self.client.table(ACCOUNTING_ENTRIES).insert(&input).await?)
            })
            .await
    }

    pub async fn update_entry(
        &self,
        id: EntryId,
        input: AccountingEntryInput,
    ) -> ClientResult<AccountingEntry> {
        validate(&input)?;
        self.client
            .mutate(&ENTRY_WRITE, async {
                Ok(self
                    .client
                    .table(ACCOUNTING_ENTRIES)
                    .update_one(&[Filter::eq("id", id)], &input)
                    .await?)
            })
            .await
    }

    pub async fn delete_entry(&self, id: EntryId) -> ClientResult<()> {
        self.client
            .mutate(&ENTRY_DELETE, async {
                let removed = self
                    .client
                    .table(ACCOUNTING_ENTRIES)
                    .delete(&[Filter::eq("id", id)])
                    .await?;
                ensure_deleted(removed, format!("entry {id}"))
            })
            .await
    }

    /// Debit and credit totals per account over all entries.
    pub async fn trial_balance(&self) -> ClientResult<Vec<AccountBalance>> {
        let chart = self.chart().await?;
        let entries = self.entries().await?;
        Ok(trial_balance(&chart, &entries))
    }
}
