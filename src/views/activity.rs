//! Activity detail and activity lists.

use tokio::task::JoinHandle;
use tracing::info;

use super::{spawn_load, Loadable, ViewSlot};
use crate::donation::{CachedActivity, DonationDialog, DonationFlow, SubmitOutcome};
use crate::error::{ClientError, Result};
use crate::gateway::ActivityGateway;
use crate::models::{Activity, ResourceId};
use crate::navigation::{Navigator, Route};
use crate::session::SessionState;

pub const LOAD_ACTIVITY_FAILED: &str = "Failed to load activity details";
pub const LOAD_ACTIVITIES_FAILED: &str = "Failed to load activities. Please try again.";
pub const LOAD_MY_ACTIVITIES_FAILED: &str = "Failed to load your activities";
pub const DELETE_ACTIVITY_FAILED: &str = "Failed to delete activity. Please try again.";

/// One activity page with its donation dialog
#[derive(Debug, Clone)]
pub struct ActivityDetail {
    pub cache: CachedActivity,
    pub dialog: DonationDialog,
}

impl ActivityDetail {
    pub fn new(activity: Activity) -> Self {
        Self {
            cache: CachedActivity::from_server(activity),
            dialog: DonationDialog::new(),
        }
    }

    /// Mount the page and fetch it in the background. The fetch only holds
    /// a weak handle, so dropping the slot discards a late response.
    pub fn mount(activities: ActivityGateway, id: ResourceId) -> (ViewSlot<Self>, JoinHandle<bool>) {
        let slot = ViewSlot::new();
        let task = spawn_load(&slot, LOAD_ACTIVITY_FAILED, async move {
            activities.get(&id).await.map(Self::new)
        });
        (slot, task)
    }

    pub fn activity(&self) -> &Activity {
        &self.cache.activity
    }

    /// "Donate" pressed. Without a session the navigator is sent to the
    /// login page and `false` is returned.
    pub fn open_donation(&mut self, session: SessionState, navigator: &mut Navigator) -> bool {
        match self.dialog.open(session, &self.cache.activity) {
            Ok(()) => true,
            Err(required) => {
                navigator.redirect_to_login(required.from);
                false
            }
        }
    }

    pub async fn donate(&mut self, flow: &DonationFlow, amount: &str) -> SubmitOutcome {
        self.dialog.set_amount(amount);
        flow.submit(&mut self.dialog, &mut self.cache).await
    }
}

/// A list of activities with confirmed deletion
#[derive(Debug, Clone, Default)]
pub struct ActivityList {
    pub activities: Vec<Activity>,
}

impl ActivityList {
    pub async fn load_all(gateway: &ActivityGateway) -> Loadable<Self> {
        Loadable::from_result(
            gateway.list().await.map(|activities| Self { activities }),
            LOAD_ACTIVITIES_FAILED,
        )
    }

    pub async fn load_mine(gateway: &ActivityGateway) -> Loadable<Self> {
        Loadable::from_result(
            gateway.list_mine().await.map(|activities| Self { activities }),
            LOAD_MY_ACTIVITIES_FAILED,
        )
    }

    pub fn find(&self, id: &ResourceId) -> Option<&Activity> {
        self.activities.iter().find(|a| &a.id == id)
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Delete on the server; the entry is removed only once the server has
    /// confirmed. A rejection leaves the list as it was.
    pub async fn delete(&mut self, gateway: &ActivityGateway, id: &ResourceId) -> Result<()> {
        gateway.delete(id).await?;
        self.activities.retain(|a| &a.id != id);
        info!(activity = %id, "Activity deleted");
        Ok(())
    }

    /// Message for a failed delete
    pub fn delete_error_message(err: &ClientError) -> String {
        err.user_message_or(DELETE_ACTIVITY_FAILED)
    }

    pub fn edit_route(id: &ResourceId, as_admin: bool) -> Route {
        if as_admin {
            Route::AdminEditActivity(id.clone())
        } else {
            Route::EditActivity(id.clone())
        }
    }
}
