//! Business services containing domain logic and use cases.

pub mod clock;
pub mod notification;
pub mod password;
pub mod rate_limit;
pub mod verification;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use notification::{
    ChannelNotificationQueue, DeliveryStats, EmailMessage, EmailSender, MessageRenderer,
    Notification, NotificationError, NotificationKind, NotificationQueue, NotificationWorker,
};
pub use password::{DefaultPasswordPolicy, PasswordHasher, PasswordPolicy};
pub use rate_limit::{quota_key, InMemoryQuotaChecker, QuotaChecker, UnlimitedQuota};
pub use verification::{
    CodeGenerator, ConfirmationEffect, ConfirmationFlow, ConfirmationKey, ConfirmationReceipt,
    IssuancePolicy, IssueAcknowledgement, ServiceDependencies, VerificationService,
    VerificationServiceConfig,
};
