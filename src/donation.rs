//! Donation submission flow.
//!
//! A [`DonationDialog`] walks one donation attempt through
//! `Idle -> Editing -> Submitting -> Idle` (with a success notice) or
//! `Error`, from which the user can edit and retry. [`DonationFlow`] does the
//! network part and reconciles the locally cached activity total.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::gateway::{ActivityGateway, DonationGateway};
use crate::models::{Activity, Amount, AmountError, Donation, NewDonation};
use crate::navigation::Route;
use crate::session::SessionState;

pub const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid donation amount";
pub const TOO_PRECISE_MESSAGE: &str = "Donation amount cannot have more than 2 decimal places";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to process your donation. Please try again.";
pub const THANK_YOU_MESSAGE: &str = "Thank you for your donation!";

/// Validate a donation amount typed by the user
pub fn parse_donation_amount(input: &str) -> Result<Amount, String> {
    match Amount::parse(input) {
        Ok(amount) if amount.is_positive() => Ok(amount),
        Ok(_) | Err(AmountError::Invalid) => Err(INVALID_AMOUNT_MESSAGE.to_string()),
        Err(AmountError::TooPrecise) => Err(TOO_PRECISE_MESSAGE.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    Idle,
    Editing,
    Submitting,
    Error(String),
}

/// How the cached activity total follows a successful donation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcilePolicy {
    /// Add the donated amount to the cached total
    #[default]
    Patch,
    /// Reload the activity; patch if the reload fails
    Refetch,
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcilePolicy::Patch => f.write_str("patch"),
            ReconcilePolicy::Refetch => f.write_str("refetch"),
        }
    }
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patch" => Ok(ReconcilePolicy::Patch),
            "refetch" => Ok(ReconcilePolicy::Refetch),
            other => Err(format!(
                "unknown reconcile policy '{}', expected 'patch' or 'refetch'",
                other
            )),
        }
    }
}

/// Where the cached total came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalSource {
    Server,
    LocallyPatched,
}

/// Client-side copy of a server-owned activity
#[derive(Debug, Clone, PartialEq)]
pub struct CachedActivity {
    pub activity: Activity,
    pub source: TotalSource,
}

impl CachedActivity {
    pub fn from_server(activity: Activity) -> Self {
        Self {
            activity,
            source: TotalSource::Server,
        }
    }

    pub fn total(&self) -> Amount {
        self.activity.total_donations
    }

    fn patch(&mut self, amount: Amount) {
        self.activity.total_donations = self.activity.total_donations.saturating_add(amount);
        self.source = TotalSource::LocallyPatched;
    }

    fn replace(&mut self, activity: Activity) {
        self.activity = activity;
        self.source = TotalSource::Server;
    }
}

/// Opening the dialog requires a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequired {
    /// Page to come back to after logging in
    pub from: Route,
}

#[derive(Debug, Clone)]
pub struct DonationDialog {
    state: DialogState,
    input: String,
    notice: Option<String>,
}

impl Default for DonationDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl DonationDialog {
    pub fn new() -> Self {
        Self {
            state: DialogState::Idle,
            input: String::new(),
            notice: None,
        }
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_open(&self) -> bool {
        self.state != DialogState::Idle
    }

    /// Open the dialog for `activity`, or ask the caller to log in first
    pub fn open(&mut self, session: SessionState, activity: &Activity) -> Result<(), LoginRequired> {
        if !session.authenticated {
            return Err(LoginRequired {
                from: Route::Activity(activity.id.clone()),
            });
        }
        if self.state == DialogState::Idle {
            self.state = DialogState::Editing;
            self.notice = None;
        }
        Ok(())
    }

    /// Replace the typed amount; ignored while a submission is in flight
    pub fn set_amount(&mut self, input: &str) {
        match self.state {
            DialogState::Submitting | DialogState::Idle => {}
            DialogState::Error(_) => {
                self.input = input.to_string();
                self.state = DialogState::Editing;
            }
            DialogState::Editing => self.input = input.to_string(),
        }
    }

    /// Whether the submit control is active
    pub fn submit_enabled(&self) -> bool {
        matches!(self.state, DialogState::Editing | DialogState::Error(_))
    }

    /// Validate the input and enter `Submitting`.
    ///
    /// Returns `None` when nothing should be sent: the dialog is closed,
    /// already submitting, or the amount is invalid (then it is in `Error`).
    pub fn begin_submit(&mut self) -> Option<Amount> {
        if !self.submit_enabled() {
            return None;
        }
        match parse_donation_amount(&self.input) {
            Ok(amount) => {
                self.state = DialogState::Submitting;
                Some(amount)
            }
            Err(message) => {
                self.state = DialogState::Error(message);
                None
            }
        }
    }

    /// Settle an in-flight submission
    pub fn finish_submit(&mut self, outcome: Result<(), String>) {
        if self.state != DialogState::Submitting {
            return;
        }
        match outcome {
            Ok(()) => {
                self.input.clear();
                self.state = DialogState::Idle;
                self.notice = Some(THANK_YOU_MESSAGE.to_string());
            }
            Err(message) => self.state = DialogState::Error(message),
        }
    }

    /// Close without donating; refused while submitting
    pub fn close(&mut self) -> bool {
        if self.state == DialogState::Submitting {
            return false;
        }
        self.state = DialogState::Idle;
        self.input.clear();
        true
    }

    /// Pop the confirmation notice, if any
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Input rejected locally, nothing was sent
    Rejected(String),
    /// The dialog was not in a state that allows submitting
    Ignored,
    Donated {
        amount: Amount,
        donation: Option<Donation>,
    },
    Failed(ClientError),
}

#[derive(Clone)]
pub struct DonationFlow {
    donations: DonationGateway,
    activities: ActivityGateway,
    policy: ReconcilePolicy,
}

impl DonationFlow {
    pub fn new(
        donations: DonationGateway,
        activities: ActivityGateway,
        policy: ReconcilePolicy,
    ) -> Self {
        Self {
            donations,
            activities,
            policy,
        }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Submit the dialog's amount for the cached activity
    pub async fn submit(
        &self,
        dialog: &mut DonationDialog,
        cache: &mut CachedActivity,
    ) -> SubmitOutcome {
        if !dialog.submit_enabled() {
            return SubmitOutcome::Ignored;
        }
        let Some(amount) = dialog.begin_submit() else {
            let message = match dialog.state() {
                DialogState::Error(message) => message.clone(),
                _ => INVALID_AMOUNT_MESSAGE.to_string(),
            };
            debug!(message = %message, "Donation rejected locally");
            return SubmitOutcome::Rejected(message);
        };

        let request = NewDonation {
            activity: cache.activity.id.clone(),
            amount,
        };
        let donation = match self.donations.create(&request).await {
            Ok(donation) => donation,
            // The server answered 2xx, so the donation is recorded
            Err(ClientError::Decode(detail)) => {
                warn!(
                    activity = %request.activity,
                    error = %detail,
                    "Donation recorded but the response could not be decoded"
                );
                None
            }
            Err(e) => {
                warn!(activity = %request.activity, error = %e, "Donation failed");
                dialog.finish_submit(Err(e.user_message_or(SUBMIT_FAILED_MESSAGE)));
                return SubmitOutcome::Failed(e);
            }
        };

        self.reconcile(cache, amount).await;
        dialog.finish_submit(Ok(()));
        info!(activity = %request.activity, amount = %amount, "Donation recorded");
        SubmitOutcome::Donated { amount, donation }
    }

    async fn reconcile(&self, cache: &mut CachedActivity, amount: Amount) {
        match self.policy {
            ReconcilePolicy::Patch => cache.patch(amount),
            ReconcilePolicy::Refetch => match self.activities.get(&cache.activity.id).await {
                Ok(fresh) => cache.replace(fresh),
                Err(e) => {
                    warn!(
                        activity = %cache.activity.id,
                        error = %e,
                        "Reload after donation failed, patching cached total"
                    );
                    cache.patch(amount);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{activity_json, client, donation_json, logged_in_jar, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    const LOGGED_IN: SessionState = SessionState {
        authenticated: true,
        is_admin: false,
    };

    fn flow(transport: &Arc<MockTransport>, policy: ReconcilePolicy) -> DonationFlow {
        let http = client(transport, logged_in_jar());
        DonationFlow::new(
            DonationGateway::new(http.clone()),
            ActivityGateway::new(http),
            policy,
        )
    }

    fn cached(goal: f64, total: f64) -> CachedActivity {
        CachedActivity::from_server(serde_json::from_value(activity_json("a1", goal, total)).unwrap())
    }

    fn editing(amount: &str) -> DonationDialog {
        let mut dialog = DonationDialog::new();
        dialog.open(LOGGED_IN, &cached(1000.0, 250.0).activity).unwrap();
        dialog.set_amount(amount);
        dialog
    }

    #[test]
    fn test_parse_donation_amount() {
        assert_eq!(parse_donation_amount("50"), Ok(Amount::from_units(50)));
        assert_eq!(parse_donation_amount(" 12.5 "), Ok(Amount::from_cents(1250)));
        for bad in ["", "-5", "0", "0.00", "abc", "1e3", "5,00"] {
            assert_eq!(parse_donation_amount(bad), Err(INVALID_AMOUNT_MESSAGE.to_string()), "{bad:?}");
        }
        assert_eq!(parse_donation_amount("1.005"), Err(TOO_PRECISE_MESSAGE.to_string()));
    }

    #[test]
    fn test_open_requires_login() {
        let activity = cached(1000.0, 250.0).activity;
        let mut dialog = DonationDialog::new();
        let err = dialog.open(SessionState::ANONYMOUS, &activity).unwrap_err();
        assert_eq!(err.from.path(), "/activity/a1");
        assert!(!dialog.is_open());
    }

    #[tokio::test]
    async fn test_invalid_amount_sends_nothing() {
        let transport = MockTransport::new();
        let mut dialog = editing("-5");
        let mut cache = cached(1000.0, 250.0);

        let outcome = flow(&transport, ReconcilePolicy::Patch).submit(&mut dialog, &mut cache).await;
        assert!(matches!(outcome, SubmitOutcome::Rejected(ref m) if m == INVALID_AMOUNT_MESSAGE));
        assert_eq!(dialog.state(), &DialogState::Error(INVALID_AMOUNT_MESSAGE.to_string()));
        assert!(transport.requests().is_empty());
        assert_eq!(cache.total(), Amount::from_units(250));
    }

    #[tokio::test]
    async fn test_successful_donation_patches_total_and_closes() {
        let transport = MockTransport::new();
        transport.reply(
            "POST",
            "/donations",
            201,
            json!({"status": "success", "data": {"donation": donation_json("d1", "a1", 50.0)}}),
        );
        let mut dialog = editing("50");
        let mut cache = cached(1000.0, 250.0);

        let outcome = flow(&transport, ReconcilePolicy::Patch).submit(&mut dialog, &mut cache).await;
        assert!(matches!(outcome, SubmitOutcome::Donated { .. }));
        assert_eq!(cache.total(), Amount::from_units(300));
        assert_eq!(cache.source, TotalSource::LocallyPatched);
        assert!(!dialog.is_open());
        assert_eq!(dialog.input(), "");
        assert_eq!(dialog.take_notice().as_deref(), Some(THANK_YOU_MESSAGE));
        assert_eq!(transport.count("POST", "/donations"), 1);
    }

    #[tokio::test]
    async fn test_undecodable_echo_still_counts_as_donated() {
        let transport = MockTransport::new();
        transport.reply(
            "POST",
            "/donations",
            201,
            json!({"data": {"donation": {"_id": "d1", "amount": "not-a-number"}}}),
        );
        let mut dialog = editing("50");
        let mut cache = cached(1000.0, 250.0);

        let outcome = flow(&transport, ReconcilePolicy::Patch).submit(&mut dialog, &mut cache).await;
        assert!(matches!(outcome, SubmitOutcome::Donated { donation: None, .. }));
        assert_eq!(cache.total(), Amount::from_units(300));
        assert!(!dialog.is_open());
        assert_eq!(dialog.take_notice().as_deref(), Some(THANK_YOU_MESSAGE));
    }

    #[test]
    fn test_non_ascii_digits_are_invalid() {
        assert_eq!(parse_donation_amount("١.٥٥"), Err(INVALID_AMOUNT_MESSAGE.to_string()));
        assert_eq!(parse_donation_amount("５０"), Err(INVALID_AMOUNT_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_server_failure_keeps_dialog_editable() {
        let transport = MockTransport::new();
        transport.reply("POST", "/donations", 400, json!({"message": "Activity is closed"}));
        let mut dialog = editing("20");
        let mut cache = cached(1000.0, 250.0);
        let flow = flow(&transport, ReconcilePolicy::Patch);

        let outcome = flow.submit(&mut dialog, &mut cache).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(dialog.state(), &DialogState::Error("Activity is closed".to_string()));
        assert_eq!(cache.total(), Amount::from_units(250));
        assert!(dialog.submit_enabled());

        dialog.set_amount("25");
        assert_eq!(dialog.state(), &DialogState::Editing);
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_fallback() {
        let transport = MockTransport::new();
        transport.reply("POST", "/donations", 500, json!({}));
        let mut dialog = editing("20");
        let mut cache = cached(1000.0, 250.0);

        flow(&transport, ReconcilePolicy::Patch).submit(&mut dialog, &mut cache).await;
        assert_eq!(dialog.state(), &DialogState::Error(SUBMIT_FAILED_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_refetch_uses_server_total() {
        let transport = MockTransport::new();
        transport.reply("POST", "/donations", 201, json!({"status": "success"}));
        transport.reply(
            "GET",
            "/activities/a1",
            200,
            json!({"data": {"activity": activity_json("a1", 1000.0, 320.0)}}),
        );
        let mut dialog = editing("50");
        let mut cache = cached(1000.0, 250.0);

        flow(&transport, ReconcilePolicy::Refetch).submit(&mut dialog, &mut cache).await;
        assert_eq!(cache.total(), Amount::from_units(320));
        assert_eq!(cache.source, TotalSource::Server);
    }

    #[tokio::test]
    async fn test_refetch_failure_falls_back_to_patch() {
        let transport = MockTransport::new();
        transport.reply("POST", "/donations", 201, json!({"status": "success"}));
        transport.fail("GET", "/activities/a1", "timed out");
        let mut dialog = editing("50");
        let mut cache = cached(1000.0, 250.0);

        let outcome = flow(&transport, ReconcilePolicy::Refetch).submit(&mut dialog, &mut cache).await;
        assert!(matches!(outcome, SubmitOutcome::Donated { .. }));
        assert_eq!(cache.total(), Amount::from_units(300));
        assert_eq!(cache.source, TotalSource::LocallyPatched);
    }

    #[test]
    fn test_second_submit_while_submitting_is_refused() {
        let mut dialog = editing("10");
        assert_eq!(dialog.begin_submit(), Some(Amount::from_units(10)));
        assert!(!dialog.submit_enabled());
        assert_eq!(dialog.begin_submit(), None);
        assert!(!dialog.close());

        dialog.set_amount("99");
        assert_eq!(dialog.input(), "10");

        dialog.finish_submit(Ok(()));
        assert_eq!(dialog.state(), &DialogState::Idle);
    }

    #[tokio::test]
    async fn test_submit_on_closed_dialog_is_ignored() {
        let transport = MockTransport::new();
        let mut dialog = DonationDialog::new();
        let mut cache = cached(1000.0, 250.0);

        let outcome = flow(&transport, ReconcilePolicy::Patch).submit(&mut dialog, &mut cache).await;
        assert!(matches!(outcome, SubmitOutcome::Ignored));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Refetch".parse::<ReconcilePolicy>(), Ok(ReconcilePolicy::Refetch));
        assert!("sometimes".parse::<ReconcilePolicy>().is_err());
        assert_eq!(ReconcilePolicy::default(), ReconcilePolicy::Patch);
    }
}
