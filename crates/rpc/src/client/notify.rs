use api_types::notification::{EmailAccepted, EmailEvent};
use async_trait::async_trait;
use notification::{NotificationError, Notifier, ResultNotification};

use super::{ClientOptions, HttpClient};

/// Remote notification bridge.
#[derive(Clone, Debug)]
pub struct NotificationClient {
    http: HttpClient,
}

impl NotificationClient {
    pub fn new(options: ClientOptions) -> ResultNotification<Self> {
        let http = HttpClient::new(options).map_err(|err| {
            NotificationError::Unavailable(format!("notification client: {err}"))
        })?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Notifier for NotificationClient {
    async fn send_email(&self, email: EmailEvent) -> ResultNotification<()> {
        let res: EmailAccepted = self.http.post_json("/notification/email", &email).await?;
        if !res.accepted {
            return Err(NotificationError::Unavailable(
                "email event was not accepted".to_string(),
            ));
        }
        Ok(())
    }
}
