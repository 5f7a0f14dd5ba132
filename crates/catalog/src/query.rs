//! Read side of the catalog: filtered search and distinct values.
//!
//! Every read goes to the mirror. Distinct-value lists are cached per field
//! for the configured TTL and are not invalidated by a resync.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use spice_core::cache::TtlCache;
use spice_core::error::CoreError;
use spice_core::filter::{FilterField, FilterSpec};
use spice_core::types::DbId;
use spice_db::models::restaurant::{Restaurant, RestaurantName};
use spice_db::repositories::MirrorRepo;

use crate::sync::Synchronizer;
use crate::mirror_unavailable;

/// Distinct values keyed by field. Values are shared with the cache.
pub type DistinctValues = BTreeMap<FilterField, Arc<Vec<String>>>;

pub struct QueryService {
    sync: Arc<Synchronizer>,
    cache: TtlCache<FilterField, Arc<Vec<String>>>,
}

impl QueryService {
    pub fn new(sync: Arc<Synchronizer>, cache_ttl: Duration) -> Self {
        Self {
            sync,
            cache: TtlCache::new(cache_ttl),
        }
    }

    /// Restaurants matching every constraint in `spec`.
    ///
    /// Brings the mirror up to date first (see
    /// [`Synchronizer::ensure_ready`]).
    pub async fn search(&self, spec: FilterSpec) -> Result<Vec<Restaurant>, CoreError> {
        let spec = spec.normalized();
        spec.validate()?;
        self.sync.ensure_ready().await?;

        self.sync
            .monitor()
            .measure("search", async {
                MirrorRepo::search(self.sync.mirror(), &spec)
                    .await
                    .map_err(mirror_unavailable)
            })
            .await
    }

    /// One mirrored restaurant with its offerings.
    pub async fn restaurant(&self, id: DbId) -> Result<Restaurant, CoreError> {
        self.sync.ensure_ready().await?;
        let restaurant = self
            .sync
            .monitor()
            .measure("restaurant", async {
                MirrorRepo::find_by_id(self.sync.mirror(), id)
                    .await
                    .map_err(mirror_unavailable)
            })
            .await?;
        restaurant.ok_or(CoreError::NotFound {
            entity: "restaurant",
            id,
        })
    }

    /// Id/name pairs sorted by name.
    pub async fn restaurant_names(&self) -> Result<Vec<RestaurantName>, CoreError> {
        self.sync.ensure_ready().await?;
        self.sync
            .monitor()
            .measure("restaurant_names", async {
                MirrorRepo::list_names(self.sync.mirror())
                    .await
                    .map_err(mirror_unavailable)
            })
            .await
    }

    /// Distinct values for each requested field.
    ///
    /// Served from the cache when every requested field is cached and
    /// fresh. Otherwise all fields are recomputed in one statement and every
    /// cache entry is refreshed.
    pub async fn distinct_values(&self, fields: &[FilterField]) -> Result<DistinctValues, CoreError> {
        let cached: Option<DistinctValues> = fields
            .iter()
            .map(|field| self.cache.get(field).map(|values| (*field, values)))
            .collect();
        if let Some(values) = cached {
            tracing::debug!(fields = fields.len(), "Distinct values served from cache");
            return Ok(values);
        }

        self.sync.ensure_ready().await?;

        let all: DistinctValues = self
            .sync
            .monitor()
            .measure("distinct_values", async {
                MirrorRepo::distinct_values(self.sync.mirror())
                    .await
                    .map_err(mirror_unavailable)
            })
            .await?
            .into_iter()
            .map(|(field, values)| (field, Arc::new(values)))
            .collect();

        self.cache
            .insert_many(all.iter().map(|(field, values)| (*field, Arc::clone(values))));

        Ok(fields
            .iter()
            .filter_map(|field| all.get(field).map(|values| (*field, Arc::clone(values))))
            .collect())
    }
}
