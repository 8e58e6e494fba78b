//! Full retrieval of a table's registered partitions

use crate::error::Result;
use crate::lister::{CatalogPartitionLister, PartitionRecord};
use tracing::{debug, info, instrument};

/// Reads every partition the catalog has registered, across all pages
pub struct CatalogPartitionReconciler<L> {
    lister: L,
    filter: Option<String>,
}

impl<L: CatalogPartitionLister> CatalogPartitionReconciler<L> {
    pub fn new(lister: L) -> Self {
        Self {
            lister,
            filter: None,
        }
    }

    /// Restrict the listing with a catalog-side filter expression
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn lister(&self) -> &L {
        &self.lister
    }

    /// Every partition record, in the order the catalog returned them
    ///
    /// Follows continuation tokens until a page arrives without one; there is
    /// no page cap. A failure on any page fails the whole call so callers
    /// never see a partial view. An empty-string token counts as absent.
    #[instrument(skip(self))]
    pub async fn get_partition_values(&self) -> Result<Vec<PartitionRecord>> {
        let mut records = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .lister
                .list_partitions_page(self.filter.as_deref(), token.as_deref())
                .await?;
            pages += 1;
            debug!(
                page = pages,
                records = page.records.len(),
                more = page.next_token.is_some(),
                "Fetched partition page"
            );
            records.extend(page.records);

            match page.next_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }

        info!(pages, partitions = records.len(), "Loaded catalog partitions");
        Ok(records)
    }
}
