use serde_json::json;

use ceramerp_backend::schema::SUPPLIERS;
use ceramerp_backend::{Filter, Query};
use ceramerp_parties::{Supplier, SupplierId, SupplierInput};

use crate::cache::QueryKey;
use crate::client::ErpClient;
use crate::error::ClientResult;
use crate::hooks::{Mutation, validate};

const CREATE: Mutation = Mutation {
    success: "Supplier created",
    failure: "Could not create supplier",
    invalidates: &[SUPPLIERS],
};
const UPDATE: Mutation = Mutation {
    success: "Supplier updated",
    failure: "Could not update supplier",
    invalidates: &[SUPPLIERS],
};
const DELETE: Mutation = Mutation {
    success: "Supplier deactivated",
    failure: "Could not delete supplier",
    invalidates: &[SUPPLIERS],
};

pub struct SupplierHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> SupplierHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// Active suppliers by code.
    pub async fn list(&self) -> ClientResult<Vec<Supplier>> {
        self.client
            .cached_rows(
                QueryKey::new(SUPPLIERS),
                SUPPLIERS,
                Query::new().eq("active", true).order_asc("code"),
            )
            .await
    }

    pub async fn get(&self, id: SupplierId) -> ClientResult<Supplier> {
        self.client
            .find(SUPPLIERS, &Query::new().eq("id", id), format!("supplier {id}"))
            .await
    }

    pub async fn create(&self, input: SupplierInput) -> ClientResult<Supplier> {
        let input = input.normalized();
        validate(&input)?;
        self.client
            .mutate(&CREATE, async {
                Ok(self.client.table(SUPPLIERS).insert(&input).await?)
            })
            .await
    }

    pub async fn update(&self, id: SupplierId, input: SupplierInput) -> ClientResult<Supplier> {
        let input = input.normalized();
        validate(&input)?;
        self.client
            .mutate(&UPDATE, async {
                Ok(self
                    .client
                    .table(SUPPLIERS)
                    .update_one(&[Filter::eq("id", id)], &input)
                    .await?)
            })
            .await
    }

    /// Soft delete: the row stays, marked inactive, so past purchase orders
    /// keep their supplier.
    pub async fn delete(&self, id: SupplierId) -> ClientResult<Supplier> {
        self.client
            .mutate(&DELETE, async {
                Ok(self
                    .client
                    .table(SUPPLIERS)
                    .update_one(&[Filter::eq("id", id)], &json!({ "active": false }))
                    .await?)
            })
            .await
    }
}
