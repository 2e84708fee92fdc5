//! Product variant subscriber - mirrors subscription variants into the
//! billing provider's catalog.
//!
//! Listens for `product-variant.created/updated/deleted`; variants not
//! flagged `is_subscription` are left alone.

use futures::FutureExt;
use std::sync::Arc;

use crate::domain::foundation::VariantId;
use crate::ports::{BillingProvider, EventSubscriber, VariantService};

pub const PRODUCT_VARIANT_CREATED: &str = "product-variant.created";
pub const PRODUCT_VARIANT_UPDATED: &str = "product-variant.updated";
pub const PRODUCT_VARIANT_DELETED: &str = "product-variant.deleted";

/// Registers catalog-sync callbacks on the event bus.
pub struct ProductVariantSubscriber {
    variant_service: Arc<dyn VariantService>,
    billing_provider: Arc<dyn BillingProvider>,
}

#[derive(Clone, Copy)]
enum SyncAction {
    Create,
    Update,
}

impl ProductVariantSubscriber {
    pub fn new(
        variant_service: Arc<dyn VariantService>,
        billing_provider: Arc<dyn BillingProvider>,
    ) -> Self {
        Self {
            variant_service,
            billing_provider,
        }
    }

    /// Attaches this subscriber's callbacks to the bus.
    pub async fn attach(self: Arc<Self>, bus: &dyn EventSubscriber) {
        let on_created = self.clone();
        bus.subscribe(
            PRODUCT_VARIANT_CREATED,
            Arc::new(move |event| {
                let subscriber = on_created.clone();
                async move {
                    subscriber
                        .sync_variant(&event.aggregate_id, SyncAction::Create)
                        .await;
                }
                .boxed()
            }),
        )
        .await;

        let on_updated = self.clone();
        bus.subscribe(
            PRODUCT_VARIANT_UPDATED,
            Arc::new(move |event| {
                let subscriber = on_updated.clone();
                async move {
                    subscriber
                        .sync_variant(&event.aggregate_id, SyncAction::Update)
                        .await;
                }
                .boxed()
            }),
        )
        .await;

        let on_deleted = self.clone();
        bus.subscribe(
            PRODUCT_VARIANT_DELETED,
            Arc::new(move |event| {
                let subscriber = on_deleted.clone();
                async move {
                    subscriber.remove_variant(&event.aggregate_id).await;
                }
                .boxed()
            }),
        )
        .await;
    }

    async fn sync_variant(&self, variant_id: &str, action: SyncAction) {
        let Ok(id) = VariantId::new(variant_id) else {
            tracing::warn!(%variant_id, "variant event with empty id");
            return;
        };

        let variant = match self.variant_service.retrieve(&id).await {
            Ok(Some(variant)) => variant,
            Ok(None) => {
                tracing::warn!(%variant_id, "variant event for unknown variant");
                return;
            }
            Err(e) => {
                tracing::error!(%variant_id, error = %e, "failed to load variant");
                return;
            }
        };

        if !variant.is_subscription {
            return;
        }

        let result = match action {
            SyncAction::Create => self.billing_provider.create_product(&variant).await,
            SyncAction::Update => self.billing_provider.update_product(&variant).await,
        };

        if let Err(e) = result {
            tracing::error!(%variant_id, error = %e, "failed to sync variant to provider catalog");
        }
    }

    async fn remove_variant(&self, variant_id: &str) {
        let Ok(id) = VariantId::new(variant_id) else {
            return;
        };

        // The platform row may already be gone; delete in the provider
        // catalog regardless and let a 404 surface as a log line.
        if let Err(e) = self.billing_provider.delete_product(&id).await {
            tracing::error!(%variant_id, error = %e, "failed to remove variant from provider catalog");
        }
    }
}
