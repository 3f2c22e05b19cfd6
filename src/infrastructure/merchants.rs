use crate::domain::merchant::MerchantMeta;
use crate::domain::ports::MerchantDirectory;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Merchants keyed by id, fixed at startup from the configuration file and
/// shared read-only between requests.
#[derive(Default, Clone)]
pub struct InMemoryMerchantDirectory {
    merchants: Arc<HashMap<String, MerchantMeta>>,
}

impl InMemoryMerchantDirectory {
    pub fn from_merchants(merchants: impl IntoIterator<Item = MerchantMeta>) -> Self {
        let merchants = merchants
            .into_iter()
            .map(|meta| (meta.merchant_id.clone(), meta))
            .collect();
        Self {
            merchants: Arc::new(merchants),
        }
    }
}

#[async_trait]
impl MerchantDirectory for InMemoryMerchantDirectory {
    async fn lookup_merchant_meta(&self, merchant_id: &str) -> Option<MerchantMeta> {
        self.merchants.get(merchant_id).cloned()
    }
}
