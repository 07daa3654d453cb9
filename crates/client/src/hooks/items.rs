use ceramerp_backend::schema::ITEMS;
use ceramerp_backend::{Filter, Query};
use ceramerp_products::{Item, ItemId, ItemInput};

use crate::cache::{DASHBOARD, QueryKey};
use crate::client::ErpClient;
use crate::error::ClientResult;
use crate::hooks::{Mutation, ensure_deleted, validate};

const SELECT: &str = "*, category:item_categories(id, name)";

const CREATE: Mutation = Mutation {
    success: "Item created",
    failure: "Could not create item",
    invalidates: &[ITEMS, DASHBOARD],
};
const UPDATE: Mutation = Mutation {
    success: "Item updated",
    failure: "Could not update item",
    invalidates: &[ITEMS, DASHBOARD],
};
const DELETE: Mutation = Mutation {
    success: "Item deleted",
    failure: "Could not delete item",
    invalidates: &[ITEMS, DASHBOARD],
};

pub struct ItemHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> ItemHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// Items by code, with their category.
    pub async fn list(&self) -> ClientResult<Vec<Item>> {
        self.client
            .cached_rows(
                QueryKey::new(ITEMS),
                ITEMS,
                Query::new().select(SELECT).order_asc("code"),
            )
            .await
    }

    pub async fn get(&self, id: ItemId) -> ClientResult<Item> {
        self.client
            .find(
                ITEMS,
                &Query::new().select(SELECT).eq("id", id),
                format!("item {id}"),
            )
            .await
    }

    pub async fn create(&self, input: ItemInput) -> ClientResult<Item> {
        validate(&input)?;
        self.client
            .mutate(&CREATE, async {
                Ok(self.client.table(ITEMS).insert(&input).await?)
            })
            .await
    }

    pub async fn update(&self, id: ItemId, input: ItemInput) -> ClientResult<Item> {
        validate(&input)?;
        self.client
            .mutate(&UPDATE, async {
                Ok(self
                    .client
                    .table(ITEMS)
                    .update_one(&[Filter::eq("id", id)], &input)
                    .await?)
            })
            .await
    }

    pub async fn delete(&self, id: ItemId) -> ClientResult<()> {
        self.client
            .mutate(&DELETE, async {
                let removed = self
                    .client
                    .table(ITEMS)
                    .delete(&[Filter::eq("id", id)])
                    .await?;
                ensure_deleted(removed, format!("item {id}"))
            })
            .await
    }
}
