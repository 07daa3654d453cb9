use ceramerp_backend::schema::CUSTOMERS;
use ceramerp_backend::{Filter, Query};
use ceramerp_parties::{Customer, CustomerId, CustomerInput};

use crate::cache::{DASHBOARD, QueryKey};
use crate::client::ErpClient;
use crate::error::ClientResult;
use crate::hooks::{Mutation, ensure_deleted, validate};

const CREATE: Mutation = Mutation {
    success: "Customer created",
    failure: "Could not create customer",
    invalidates: &[CUSTOMERS, DASHBOARD],
};
const UPDATE: Mutation = Mutation {
    success: "Customer updated",
    failure: "Could not update customer",
    invalidates: &[CUSTOMERS, DASHBOARD],
};
const DELETE: Mutation = Mutation {
    success: "Customer deleted",
    failure: "Could not delete customer",
    invalidates: &[CUSTOMERS, DASHBOARD],
};

pub struct CustomerHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> CustomerHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// All customers by code.
    pub async fn list(&self) -> ClientResult<Vec<Customer>> {
        self.client
            .cached_rows(
                QueryKey::new(CUSTOMERS),
                CUSTOMERS,
                Query::new().order_asc("code"),
            )
            .await
    }

    pub async fn get(&self, id: CustomerId) -> ClientResult<Customer> {
        self.client
            .find(CUSTOMERS, &Query::new().eq("id", id), format!("customer {id}"))
            .await
    }

    pub async fn create(&self, input: CustomerInput) -> ClientResult<Customer> {
        let input = input.normalized();
        validate(&input)?;
        self.client
            .mutate(&CREATE, async {
                Ok(self.client.table(CUSTOMERS).insert(&input).await?)
            })
            .await
    }

    pub async fn update(&self, id: CustomerId, input: CustomerInput) -> ClientResult<Customer> {
        let input = input.normalized();
        validate(&input)?;
        self.client
            .mutate(&UPDATE, async {
                Ok(self
                    .client
                    .table(CUSTOMERS)
                    .update_one(&[Filter::eq("id", id)], &input)
                    .await?)
            })
            .await
    }

    /// Hard delete.
    pub async fn delete(&self, id: CustomerId) -> ClientResult<()> {
        self.client
            .mutate(&DELETE, async {
                let removed = self
                    .client
                    .table(CUSTOMERS)
                    .delete(&[Filter::eq("id", id)])
                    .await?;
                ensure_deleted(removed, format!("customer {id}"))
            })
            .await
    }
}
