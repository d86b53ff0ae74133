//! Users repository

use crate::{
    error::StoreResult,
    models::user::{NewUserAccount, Role, UserAccount},
    store::{Envelope, RemoteStore, TableHandle},
};

use super::tables::USERS;

#[derive(Clone)]
pub struct UsersRepository {
    store: RemoteStore,
}

impl UsersRepository {
    pub fn new(store: RemoteStore) -> Self {
        Self { store }
    }

    fn table(&self) -> TableHandle {
        self.store.table(USERS)
    }

    /// Get account by e-mail
    pub async fn get_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let envelope = self.table().eq("email", email).limit(1).try_fetch().await?;
        Ok(envelope.first())
    }

    /// Create an account, returning the stored row
    pub async fn create(&self, account: &NewUserAccount<'_>) -> StoreResult<Envelope> {
        self.table().try_insert(account).await
    }

    /// Delete every account that is not an administrator
    pub async fn delete_non_admins(&self) -> Envelope {
        self.table().neq("role", Role::Admin.as_str()).remove().await
    }
}
