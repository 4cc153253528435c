//! Notification sink that records notifications as structured tracing events

use shared::NotificationImage;
use tracing::{info, warn};

use crate::traits::Notifier;

#[derive(Debug, Default)]
pub struct RealNotifier;

impl RealNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for RealNotifier {
    fn notify(&self, message: &str, title: &str, image: NotificationImage) {
        match image {
            NotificationImage::Failed => warn!(title = title, image = %image, "🔔 {}", message),
            NotificationImage::Success => info!(title = title, image = %image, "🔔 {}", message),
        }
    }
}
