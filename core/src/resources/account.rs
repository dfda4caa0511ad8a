//! The authenticated account.

use crate::client::{Call, HarvestClient};
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::Account;

/// The authenticated account.
pub struct AccountResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> AccountResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    /// Company and user behind the current credentials.
    pub fn who_am_i(&self) -> Call<'c, T, Account> {
        let path = format!("{}/{}", params::ACCOUNT, params::WHO_AM_I);
        self.client.call(Ok(Operation::one(ApiRequest::get(path))))
    }
}
