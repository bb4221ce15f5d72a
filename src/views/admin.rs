//! Administration screens: dashboard and user directory.

use tracing::info;

use super::Loadable;
use crate::error::Result;
use crate::gateway::{ActivityGateway, DonationGateway, UserGateway};
use crate::models::{total_donated, ActivityStatus, Amount, NewUser, ResourceId, User};
use crate::validation::UserForm;

pub const LOAD_USERS_FAILED: &str = "Failed to load users. Please try again.";
pub const LOAD_USER_FAILED: &str = "Failed to load user information";
pub const UPDATE_USER_FAILED: &str = "Failed to update user";
pub const DELETE_USER_FAILED: &str = "Failed to delete user. Please try again.";
pub const LOAD_DASHBOARD_FAILED: &str = "Failed to load dashboard";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub users: usize,
    pub activities: usize,
    pub donations: usize,
    pub amount: Amount,
    pub open: usize,
    pub closed: usize,
}

impl DashboardStats {
    /// Fetch users, activities and donations concurrently and aggregate
    pub async fn load(
        users: &UserGateway,
        activities: &ActivityGateway,
        donations: &DonationGateway,
    ) -> Result<Self> {
        let (users, activities, donations) =
            tokio::try_join!(users.list(), activities.list(), donations.list())?;

        let count = |status: ActivityStatus| activities.iter().filter(|a| a.status == status).count();
        Ok(Self {
            users: users.len(),
            activities: activities.len(),
            donations: donations.len(),
            amount: total_donated(&donations),
            open: count(ActivityStatus::Open),
            closed: count(ActivityStatus::Closed),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    pub users: Vec<User>,
}

impl UserDirectory {
    pub async fn load(gateway: &UserGateway) -> Loadable<Self> {
        Loadable::from_result(
            gateway.list().await.map(|users| Self { users }),
            LOAD_USERS_FAILED,
        )
    }

    pub fn find(&self, id: &ResourceId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    pub async fn create(&mut self, gateway: &UserGateway, user: &NewUser) -> Result<User> {
        let created = gateway.create(user).await?;
        info!(user = %created.id, "User created");
        self.users.push(created.clone());
        Ok(created)
    }

    /// Validate and save an edit, replacing the cached entry on success
    pub async fn update(
        &mut self,
        gateway: &UserGateway,
        id: &ResourceId,
        form: UserForm,
    ) -> Result<User> {
        let update = form.into_update()?;
        let saved = gateway.update(id, &update).await?;
        if let Some(existing) = self.users.iter_mut().find(|u| &u.id == id) {
            *existing = saved.clone();
        }
        info!(user = %id, "User updated");
        Ok(saved)
    }

    /// Delete on the server, then drop the entry
    pub async fn delete(&mut self, gateway: &UserGateway, id: &ResourceId) -> Result<()> {
        gateway.delete(id).await?;
        self.users.retain(|u| &u.id != id);
        info!(user = %id, "User deleted");
        Ok(())
    }
}
