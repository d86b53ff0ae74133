//! Members repository

use serde::Deserialize;

use crate::{
    error::StoreResult,
    models::member::{CreateMember, Member},
    store::{Envelope, RemoteStore, TableHandle},
};

use super::{every_row, tables::MEMBERS};

#[derive(Deserialize)]
struct MemberId {
    id: String,
}

#[derive(Clone)]
pub struct MembersRepository {
    store: RemoteStore,
}

impl MembersRepository {
    pub fn new(store: RemoteStore) -> Self {
        Self { store }
    }

    fn table(&self) -> TableHandle {
        self.store.table(MEMBERS)
    }

    /// List members
    pub async fn list(&self, limit: usize) -> Vec<Member> {
        self.table().limit(limit).fetch().await.decode()
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Member>> {
        let envelope = self.table().eq("id", id).try_fetch().await?;
        Ok(envelope.first())
    }

    /// Resolve the member record linked to a login e-mail
    pub async fn find_id_by_email(&self, email: &str) -> StoreResult<Option<String>> {
        let envelope = self.table().select("id").eq("email", email).try_fetch().await?;
        Ok(envelope.first::<MemberId>().map(|m| m.id))
    }

    /// Create a member
    pub async fn create(&self, member: &CreateMember) -> Vec<Member> {
        self.table().insert(member).await.decode()
    }

    /// Delete a member
    pub async fn delete(&self, id: &str) -> Envelope {
        self.table().eq("id", id).remove().await
    }

    /// Delete every member
    pub async fn delete_all(&self) -> Envelope {
        self.table().neq("id", every_row()).remove().await
    }
}
