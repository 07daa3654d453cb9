use ceramerp_backend::schema::{ITEM_CATEGORIES, ITEMS};
use ceramerp_backend::{Filter, Query};
use ceramerp_products::{CategoryId, CategoryInput, ItemCategory};

use crate::cache::QueryKey;
use crate::client::ErpClient;
use crate::error::ClientResult;
use crate::hooks::{Mutation, ensure_deleted, validate};

const CREATE: Mutation = Mutation {
    success: "Category created",
    failure: "Could not create category",
    invalidates: &[ITEM_CATEGORIES, ITEMS],
};
const UPDATE: Mutation = Mutation {
    success: "Category updated",
    failure: "Could not update category",
    invalidates: &[ITEM_CATEGORIES, ITEMS],
};
const DELETE: Mutation = Mutation {
    success: "Category deleted",
    failure: "Could not delete category",
    invalidates: &[ITEM_CATEGORIES, ITEMS],
};

pub struct CategoryHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> CategoryHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Vec<ItemCategory>> {
        self.client
            .cached_rows(
                QueryKey::new(ITEM_CATEGORIES),
                ITEM_CATEGORIES,
                Query::new().order_asc("name"),
            )
            .await
    }

    pub async fn create(&self, input: CategoryInput) -> ClientResult<ItemCategory> {
        validate(&input)?;
        self.client
            .mutate(&CREATE, async {
                Ok(self.client.table(ITEM_CATEGORIES).insert(&input).await?)
            })
            .await
    }

    pub async fn update(&self, id: CategoryId, input: CategoryInput) -> ClientResult<ItemCategory> {
        validate(&input)?;
        self.client
            .mutate(&UPDATE, async {
                Ok(self
                    .client
                    .table(ITEM_CATEGORIES)
                    .update_one(&[Filter::eq("id", id)], &input)
                    .await?)
            })
            .await
    }

    /// Hard delete. Items embed their category, so the item list is dropped
    /// from the cache too.
    pub async fn delete(&self, id: CategoryId) -> ClientResult<()> {
        self.client
            .mutate(&DELETE, async {
                let removed = self
                    .client
                    .table(ITEM_CATEGORIES)
                    .delete(&[Filter::eq("id", id)])
                    .await?;
                ensure_deleted(removed, format!("category {id}"))
            })
            .await
    }
}
