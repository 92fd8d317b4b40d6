//! Runtime wiring
//!
//! Builds the MySQL repositories, the quota checker, the notification queue
//! and worker, and the verification service from an [`AppConfig`].

use std::sync::Arc;
use tokio::task::JoinHandle;

use kg_core::services::notification::{
    ChannelNotificationQueue, DeliveryStats, MessageRenderer, NotificationWorker,
};
use kg_core::services::rate_limit::QuotaChecker;
use kg_core::services::verification::{
    ServiceDependencies, VerificationService, VerificationServiceConfig,
};

use crate::config::AppConfig;
use crate::database::{DatabasePool, MySqlUserRepository, MySqlVerificationRepository};
use crate::email::create_email_sender;
use crate::InfrastructureError;

/// Verification service backed by MySQL
pub type MySqlVerificationService =
    VerificationService<MySqlUserRepository, MySqlVerificationRepository>;

/// Running infrastructure
pub struct InfrastructureServices {
    pub database: DatabasePool,
    pub verification: Arc<MySqlVerificationService>,
    notification_worker: JoinHandle<DeliveryStats>,
}

impl InfrastructureServices {
    /// Stop accepting notifications, wait for the queue to drain and close
    /// the pool
    ///
    /// The worker finishes once every handle to the verification service is
    /// gone, so callers must drop their clones of `verification` first.
    pub async fn shutdown(self) -> DeliveryStats {
        drop(self.verification);

        let stats = match self.notification_worker.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "Notification worker ended abnormally");
                DeliveryStats::default()
            }
        };
        tracing::info!(
            delivered = stats.delivered,
            failed = stats.failed,
            "Notification worker stopped"
        );

        self.database.close().await;
        stats
    }
}

/// Initialize infrastructure services
///
/// Connects to MySQL (running migrations when `database.run_migrations` is
/// set), builds the quota checker and email transport, and spawns the
/// notification worker on the current tokio runtime.
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(environment = %config.environment, "Initializing infrastructure services");

    let database = DatabasePool::new(config.database.clone()).await?;
    if config.database.run_migrations {
        database.run_migrations().await?;
    }

    let users = Arc::new(MySqlUserRepository::new(database.get_pool().clone()));
    let records = Arc::new(MySqlVerificationRepository::new(database.get_pool().clone()));
    let quota = build_quota_checker(config).await?;

    let (queue, receiver) = ChannelNotificationQueue::new(config.notification.queue_capacity);
    let sender = create_email_sender(&config.notification, config.environment.is_development())?;
    let notification_worker = NotificationWorker::new(
        receiver,
        users.clone(),
        sender,
        MessageRenderer::from_config(&config.notification),
    )
    .spawn();

    let deps = ServiceDependencies::new(Arc::new(queue)).with_quota(quota);
    let verification = Arc::new(VerificationService::new(
        users,
        records,
        deps,
        VerificationServiceConfig::from(&config.verification),
    ));

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        database,
        verification,
        notification_worker,
    })
}

#[cfg(feature = "redis-cache")]
async fn build_quota_checker(
    config: &AppConfig,
) -> Result<Arc<dyn QuotaChecker>, InfrastructureError> {
    use crate::cache::{RedisClient, RedisQuotaChecker};

    let client = RedisClient::new(config.cache.clone()).await?;
    Ok(Arc::new(RedisQuotaChecker::new(
        Arc::new(client),
        config.rate_limit.clone(),
    )))
}

#[cfg(not(feature = "redis-cache"))]
async fn build_quota_checker(
    config: &AppConfig,
) -> Result<Arc<dyn QuotaChecker>, InfrastructureError> {
    use kg_core::services::rate_limit::InMemoryQuotaChecker;

    tracing::warn!("Redis support disabled, quotas are tracked per process");
    Ok(Arc::new(InMemoryQuotaChecker::new(config.rate_limit.clone())))
}
