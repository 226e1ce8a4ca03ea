//! Borrower callbacks keyed by address.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use super::FlashBorrower;
use crate::domain::Address;
use crate::error::GatewayError;

/// Registered borrower as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BorrowerInfo {
    /// Address loan requests use to name this borrower.
    #[schema(value_type = String)]
    pub address: Address,
    /// Strategy name.
    pub strategy: String,
}

/// Central store of borrower callbacks.
///
/// A flash-loan request names its borrower by address; the service resolves
/// the callback here before opening a settlement unit.
#[derive(Debug, Default)]
pub struct BorrowerRegistry {
    borrowers: RwLock<HashMap<Address, Arc<dyn FlashBorrower>>>,
}

impl BorrowerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `borrower` under `address`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the address is already
    /// taken or is the zero address.
    pub async fn register(
        &self,
        address: Address,
        borrower: Arc<dyn FlashBorrower>,
    ) -> Result<(), GatewayError> {
        if address.is_zero() {
            return Err(GatewayError::InvalidRequest(
                "borrower address must not be zero".to_string(),
            ));
        }
        let mut map = self.borrowers.write().await;
        if map.contains_key(&address) {
            return Err(GatewayError::InvalidRequest(format!(
                "borrower {address} already registered"
            )));
        }
        tracing::info!(%address, strategy = borrower.name(), "borrower registered");
        map.insert(address, borrower);
        Ok(())
    }

    /// Returns the callback registered under `address`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BorrowerNotFound`] if nothing is registered.
    pub async fn get(&self, address: Address) -> Result<Arc<dyn FlashBorrower>, GatewayError> {
        let map = self.borrowers.read().await;
        map.get(&address)
            .map(Arc::clone)
            .ok_or(GatewayError::BorrowerNotFound(address))
    }

    /// Returns every registered borrower, ordered by address.
    pub async fn list(&self) -> Vec<BorrowerInfo> {
        let map = self.borrowers.read().await;
        let mut infos: Vec<BorrowerInfo> = map
            .iter()
            .map(|(address, borrower)| BorrowerInfo {
                address: *address,
                strategy: borrower.name().to_string(),
            })
            .collect();
        infos.sort_by(|a, b| a.address.cmp(&b.address));
        infos
    }

    /// Returns the number of registered borrowers.
    pub async fn len(&self) -> usize {
        self.borrowers.read().await.len()
    }

    /// Returns `true` if no borrower is registered.
    pub async fn is_empty(&self) -> bool {
        self.borrowers.read().await.is_empty()
    }
}
