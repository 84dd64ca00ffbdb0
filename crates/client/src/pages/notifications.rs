use std::{sync::Arc, time::Duration};

use futures::FutureExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Notices;
use crate::{
    error::Result,
    models::Notification,
    optimistic::{commit_or_revert, OptimisticList, Settled},
    polling::PollHandle,
    services::NotificationService,
};

/// The bell menu: a polled list with optimistic read marks.
pub struct NotificationCenter {
    service: NotificationService,
    list: RwLock<OptimisticList<Notification>>,
    pub notices: Notices,
}

impl NotificationCenter {
    pub fn new(service: NotificationService) -> Arc<Self> {
        Arc::new(Self {
            service,
            list: RwLock::new(OptimisticList::default()),
            notices: Notices::default(),
        })
    }

    pub async fn mount(self: &Arc<Self>, period: Duration) -> PollHandle {
        if let Err(e) = self.load().await {
            tracing::warn!("Failed to load notifications: {}", e);
        }
        let center = Arc::clone(self);
        PollHandle::spawn("notifications", period, move || {
            let center = center.clone();
            async move { center.load().await }.boxed()
        })
    }

    pub async fn load(&self) -> Result<()> {
        let fetched = self.service.list().await?;
        self.list.write().await.replace_all(fetched);
        Ok(())
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.list.read().await.items().to_vec()
    }

    pub async fn unread_count(&self) -> usize {
        self.list
            .read()
            .await
            .items()
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Settled> {
        let service = self.service.clone();
        commit_or_revert(
            &self.list,
            &id,
            |n| n.read = true,
            |_| async move { service.mark_read(id).await.map(|_| None) },
        )
        .await
    }

    /// Marks everything read locally, then refetches once the backend agrees. A failure
    /// restores the previous flags.
    pub async fn mark_all_read(&self) -> Result<()> {
        let snapshot = {
            let mut list = self.list.write().await;
            let snapshot = list.items().to_vec();
            for mut n in snapshot.iter().cloned() {
                n.read = true;
                list.upsert(n);
            }
            snapshot
        };

        match self.service.mark_all_read().await {
            Ok(()) => {
                if let Err(e) = self.load().await {
                    tracing::warn!("Reload after mark-all-read failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                self.list.write().await.replace_all(snapshot);
                self.notices.error("Failed to mark all as read");
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        match self.service.delete(id).await {
            Ok(()) => {
                self.notices.success("Notification deleted");
                self.load().await
            }
            Err(e) => {
                self.notices.error("Error deleting notification");
                Err(e)
            }
        }
    }
}
