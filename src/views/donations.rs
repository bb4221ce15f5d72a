//! Donation history.

use super::Loadable;
use crate::gateway::DonationGateway;
use crate::models::{total_donated, Amount, Donation};

pub const LOAD_MY_DONATIONS_FAILED: &str = "Failed to load your donations";
pub const LOAD_DONATIONS_FAILED: &str = "Failed to load donations. Please try again.";

#[derive(Debug, Clone, Default)]
pub struct DonationHistory {
    pub donations: Vec<Donation>,
}

impl DonationHistory {
    pub fn new(donations: Vec<Donation>) -> Self {
        Self { donations }
    }

    pub async fn load_mine(gateway: &DonationGateway) -> Loadable<Self> {
        Loadable::from_result(gateway.list_mine().await.map(Self::new), LOAD_MY_DONATIONS_FAILED)
    }

    pub async fn load_all(gateway: &DonationGateway) -> Loadable<Self> {
        Loadable::from_result(gateway.list().await.map(Self::new), LOAD_DONATIONS_FAILED)
    }

    pub fn total(&self) -> Amount {
        total_donated(&self.donations)
    }

    /// Total with two decimals, e.g. `12.50`
    pub fn total_label(&self) -> String {
        format!("{:.2}", self.total().as_f64())
    }

    pub fn count_label(&self) -> String {
        match self.donations.len() {
            1 => "1 donation".to_string(),
            n => format!("{} donations", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client, donation_json, logged_in_jar, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_history_totals() {
        let transport = MockTransport::new();
        transport.reply(
            "GET",
            "/donations/my-donations",
            200,
            json!({"data": {"donations": [donation_json("d1", "a1", 10.0), donation_json("d2", "a2", 2.5)]}}),
        );
        let gateway = DonationGateway::new(client(&transport, logged_in_jar()));

        let history = DonationHistory::load_mine(&gateway).await.into_result().unwrap();
        assert_eq!(history.total_label(), "12.50");
        assert_eq!(history.count_label(), "2 donations");
    }

    #[test]
    fn test_empty_and_single_labels() {
        let empty = DonationHistory::default();
        assert_eq!(empty.total_label(), "0.00");
        assert_eq!(empty.count_label(), "0 donations");

        let one = DonationHistory::new(vec![serde_json::from_value(donation_json("d1", "a1", 5.0)).unwrap()]);
        assert_eq!(one.count_label(), "1 donation");
    }

    #[tokio::test]
    async fn test_load_failure_message() {
        let transport = MockTransport::new();
        transport.reply("GET", "/donations", 500, json!({}));
        let gateway = DonationGateway::new(client(&transport, logged_in_jar()));
        let loaded = DonationHistory::load_all(&gateway).await;
        assert_eq!(loaded.error(), Some(LOAD_DONATIONS_FAILED));
    }
}
