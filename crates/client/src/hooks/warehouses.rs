use serde_json::json;

use ceramerp_backend::schema::WAREHOUSES;
use ceramerp_backend::{Filter, Query};
use ceramerp_inventory::{Warehouse, WarehouseId, WarehouseInput};

use crate::cache::QueryKey;
use crate::client::ErpClient;
use crate::error::ClientResult;
use crate::hooks::{Mutation, validate};

const CREATE: Mutation = Mutation {
    success: "Warehouse created",
    failure: "Could not create warehouse",
    invalidates: &[WAREHOUSES],
};
const UPDATE: Mutation = Mutation {
    success: "Warehouse updated",
    failure: "Could not update warehouse",
    invalidates: &[WAREHOUSES],
};
const DELETE: Mutation = Mutation {
    success: "Warehouse deactivated",
    failure: "Could not delete warehouse",
    invalidates: &[WAREHOUSES],
};

pub struct WarehouseHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> WarehouseHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// Active warehouses by code.
    pub async fn list(&self) -> ClientResult<Vec<Warehouse>> {
        self.client
            .cached_rows(
                QueryKey::new(WAREHOUSES),
                WAREHOUSES,
                Query::new().eq("active", true).order_asc("code"),
            )
            .await
    }

    pub async fn create(&self, input: WarehouseInput) -> ClientResult<Warehouse> {
        validate(&input)?;
        self.client
            .mutate(&CREATE, async {
                Ok(self.client.table(WAREHOUSES).insert(&input).await?)
            })
            .await
    }

    pub async fn update(&self, id: WarehouseId, input: WarehouseInput) -> ClientResult<Warehouse> {
        validate(&input)?;
        self.client
            .mutate(&UPDATE, async {
                Ok(self
                    .client
                    .table(WAREHOUSES)
                    .update_one(&[Filter::eq("id", id)], &input)
                    .await?)
            })
            .await
    }

    /// Soft delete; stock rows and movements keep referring to the warehouse.
    pub async fn delete(&self, id: WarehouseId) -> ClientResult<Warehouse> {
        self.client
            .mutate(&DELETE, async {
                Ok(self
                    .client
                    .table(WAREHOUSES)
                    .update_one(&[Filter::eq("id", id)], &json!({ "active": false }))
                    .await?)
            })
            .await
    }
}
