//! Records one inbound product view: session resolution, dedup check, event
//! persistence, session touch.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use shoplytics_catalog::CatalogStore;
use tracing::debug;

use crate::event::{product_view_key, TrackOutcome, TrackRefusal, TrackRequest, VisitorEvent};
use crate::session::{synthesize_session_token, VisitorSession};
use crate::store::AnalyticsStore;

/// Handles inbound tracking calls. One instance serves all channels; calls
/// run concurrently and the store's unique constraints are the only
/// serialization point.
#[derive(Clone)]
pub struct TrackingService {
    store: Arc<dyn AnalyticsStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl TrackingService {
    pub fn new(store: Arc<dyn AnalyticsStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { store, catalog }
    }

    /// Records a product view against the session identified by the request's
    /// token, synthesizing a token when none is supplied.
    ///
    /// Refusals (`duplicate`, `product_not_found`, `channel_not_found`) are
    /// ordinary outcomes; only storage failures propagate. Writes are
    /// cumulative — a refusal at a later step still leaves the session row
    /// created or updated by the earlier ones.
    pub async fn track_view(&self, req: &TrackRequest) -> Result<TrackOutcome> {
        let now = Utc::now();
        let session = self.resolve_session(req, now).await?;

        let event_key = product_view_key(&req.product_id);
        if self.store.event_exists(&session.id, &event_key).await? {
            debug!(
                session_id = %session.id,
                event_key = %event_key,
                "Duplicate event, skipping"
            );
            return Ok(TrackOutcome::refused(TrackRefusal::Duplicate));
        }

        if !self.catalog.product_exists(&req.product_id).await? {
            debug!(product_id = %req.product_id, "Product not found, skipping event");
            return Ok(TrackOutcome::refused(TrackRefusal::ProductNotFound));
        }

        if !self.catalog.channel_exists(&req.channel_id).await? {
            debug!(channel_id = %req.channel_id, "Channel not found, skipping event");
            return Ok(TrackOutcome::refused(TrackRefusal::ChannelNotFound));
        }

        let event = VisitorEvent::product_view(
            session.id.clone(),
            req.channel_id.clone(),
            req.product_id.clone(),
            now,
        );
        // A concurrent insert losing on the (session, key) constraint is the
        // same outcome as a dedup hit, never an error.
        if !self.store.insert_event(&event).await? {
            return Ok(TrackOutcome::refused(TrackRefusal::Duplicate));
        }

        self.store.touch_session(&session.id, now).await?;
        Ok(TrackOutcome::recorded())
    }

    /// Looks the session up by token, creating it on first contact. A known
    /// session gains its customer link the first time an authenticated
    /// request arrives for it.
    async fn resolve_session(
        &self,
        req: &TrackRequest,
        now: DateTime<Utc>,
    ) -> Result<VisitorSession> {
        let token = match req.session_token.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => synthesize_session_token(now),
        };

        if let Some(session) = self.store.find_session_by_token(&token).await? {
            if session.customer_id.is_none() {
                if let Some(customer_id) = self.resolve_customer(req).await? {
                    self.store
                        .link_session_customer(&session.id, &customer_id)
                        .await?;
                    return Ok(VisitorSession {
                        customer_id: Some(customer_id),
                        ..session
                    });
                }
            }
            return Ok(session);
        }

        let customer_id = self.resolve_customer(req).await?;
        let session = VisitorSession::new(token, req.channel_id.clone(), customer_id, now);
        self.store.insert_session(&session).await
    }

    /// An unknown customer id is skipped silently, not an error.
    async fn resolve_customer(&self, req: &TrackRequest) -> Result<Option<String>> {
        let Some(customer_id) = req.customer_id.as_deref() else {
            return Ok(None);
        };
        if self.catalog.customer_exists(customer_id).await? {
            Ok(Some(customer_id.to_string()))
        } else {
            Ok(None)
        }
    }
}
