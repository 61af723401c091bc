use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JSON error body returned by every HTTP surface.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod trip {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripNew {
        pub name: String,
        #[serde(default)]
        pub description: String,
    }

    /// Returned once every step of the creation saga succeeded.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripCreated {
        pub trip_id: Uuid,
        pub whiteboards: Vec<Uuid>,
    }

    /// Request body for adding a day (whiteboard) to an existing trip.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WhiteboardNew {
        pub day: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WhiteboardCreated {
        pub whiteboard_id: Uuid,
        pub pin_id: Uuid,
    }
}

pub mod pin {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PinCreated {
        pub pin_id: Uuid,
    }
}

pub mod membership {
    use super::*;

    /// Request body for adding users to a trip.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersNew {
        pub user_ids: Vec<Uuid>,
    }

    /// Request body for the avatar lookup.
    ///
    /// An empty `user_ids` selects every member of the trip.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AvatarRequest {
        #[serde(default)]
        pub user_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DisplayNameUpdate {
        pub name: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
        #[serde(default)]
        pub profile: String,
    }
}

pub mod notification {
    use super::*;

    /// Message body published on the email queue.
    ///
    /// The JSON shape `{to, subject, body}` is the wire contract with the
    /// consumer and must stay stable.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct EmailEvent {
        pub to: String,
        pub subject: String,
        pub body: String,
    }

    /// Synchronous answer of `SendEmail`: the event was accepted by the
    /// broker, not delivered.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmailAccepted {
        pub accepted: bool,
    }
}
