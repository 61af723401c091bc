//! Member avatars: the name and picture shown for each member of a trip.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Membership, ResultEngine, User, UserStore};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    pub user_id: Uuid,
    pub name: String,
    pub profile: String,
}

/// Merge canonical profiles with per-trip overrides.
///
/// The override wins when non-empty. Output follows `users` order; memberships
/// of users not in `users` are ignored.
pub fn merge_avatars(users: &[User], memberships: &[Membership]) -> Vec<Avatar> {
    let overrides: HashMap<Uuid, &str> = memberships
        .iter()
        .map(|m| (m.user_id, m.display_name.as_str()))
        .collect();

    users
        .iter()
        .map(|user| {
            let name = match overrides.get(&user.id) {
                Some(name) if !name.trim().is_empty() => (*name).to_string(),
                _ => user.name.clone(),
            };
            Avatar {
                user_id: user.id,
                name,
                profile: user.profile.clone(),
            }
        })
        .collect()
}

/// Avatars of `user_ids` in `trip_id`; an empty `user_ids` means every member.
///
/// Users that are not members of the trip are left out.
pub async fn trip_avatars<S>(
    store: &S,
    trip_id: Uuid,
    user_ids: &[Uuid],
) -> ResultEngine<Vec<Avatar>>
where
    S: UserStore + ?Sized,
{
    let members = store.members_for_trip(trip_id).await?;
    let wanted: Vec<Uuid> = if user_ids.is_empty() {
        members.iter().map(|m| m.user_id).collect()
    } else {
        user_ids
            .iter()
            .copied()
            .filter(|id| members.iter().any(|m| m.user_id == *id))
            .collect()
    };
    if wanted.is_empty() {
        return Err(EngineError::KeyNotFound(format!(
            "no users found for trip {trip_id}"
        )));
    }

    let users = store.find_users(&wanted).await?;
    Ok(merge_avatars(&users, &members))
}
