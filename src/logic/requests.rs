//! Bookkeeping for calls to the farm API.
//!
//! One request may be outstanding at a time; the screen disables the
//! triggering keys while it is. Responses arrive on a channel and are only
//! applied if their ticket is still current and the crop they were issued
//! for is still attached.

use crate::datasources::FarmApiClient;
use crate::error::Result;
use crate::models::{
    Feedback, PredictionRequest, PredictionResponse, ValveOverride, ValveStatus, ValveToggle,
};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Prediction,
    Feedback,
    ValveList,
    ValveToggle,
    ValveOverride,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Prediction => "prediction",
            RequestKind::Feedback => "feedback",
            RequestKind::ValveList => "valve list",
            RequestKind::ValveToggle => "valve toggle",
            RequestKind::ValveOverride => "valve override",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub id: u64,
    pub kind: RequestKind,
    pub crop_id: i64,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    next_id: u64,
    outstanding: Option<RequestTicket>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn outstanding(&self) -> Option<&RequestTicket> {
        self.outstanding.as_ref()
    }

    /// Issue a ticket, or `None` while another request is in flight.
    pub fn begin(&mut self, kind: RequestKind, crop_id: i64) -> Option<RequestTicket> {
        if self.outstanding.is_some() {
            return None;
        }
        self.next_id += 1;
        let ticket = RequestTicket {
            id: self.next_id,
            kind,
            crop_id,
        };
        self.outstanding = Some(ticket.clone());
        Some(ticket)
    }

    /// Settle a response. Returns true if it should be applied.
    pub fn complete(&mut self, ticket_id: u64, attached_crop: Option<i64>) -> bool {
        match &self.outstanding {
            Some(t) if t.id == ticket_id => {
                let crop_id = t.crop_id;
                self.outstanding = None;
                attached_crop == Some(crop_id)
            }
            _ => false,
        }
    }

    /// Forget the outstanding request; its response will be ignored.
    pub fn cancel(&mut self) {
        if let Some(t) = self.outstanding.take() {
            tracing::debug!(ticket = t.id, kind = %t.kind, "Cancelled outstanding request");
        }
    }
}

#[derive(Debug, Clone)]
pub enum ApiCall {
    Predict(PredictionRequest),
    Feedback(Feedback),
    ListValves,
    ToggleValve(ValveToggle),
    OverrideValve(ValveOverride),
}

impl ApiCall {
    pub fn kind(&self) -> RequestKind {
        match self {
            ApiCall::Predict(_) => RequestKind::Prediction,
            ApiCall::Feedback(_) => RequestKind::Feedback,
            ApiCall::ListValves => RequestKind::ValveList,
            ApiCall::ToggleValve(_) => RequestKind::ValveToggle,
            ApiCall::OverrideValve(_) => RequestKind::ValveOverride,
        }
    }
}

#[derive(Debug)]
pub enum ApiReply {
    Prediction(PredictionResponse),
    FeedbackSent,
    Valves(Vec<ValveStatus>),
    ValveUpdated(ValveStatus),
}

#[derive(Debug)]
pub struct ApiEvent {
    pub ticket: RequestTicket,
    pub result: Result<ApiReply>,
}

/// Run `call` on a background task and report the result on `events`.
pub fn dispatch(
    client: Arc<FarmApiClient>,
    ticket: RequestTicket,
    call: ApiCall,
    events: mpsc::UnboundedSender<ApiEvent>,
) {
    tokio::spawn(async move {
        let result = match call {
            ApiCall::Predict(req) => client.predict(&req).await.map(ApiReply::Prediction),
            ApiCall::Feedback(fb) => {
                client.send_feedback(&fb).await.map(|_| ApiReply::FeedbackSent)
            }
            ApiCall::ListValves => client.list_valves(ticket.crop_id).await.map(ApiReply::Valves),
            ApiCall::ToggleValve(t) => client.toggle_valve(&t).await.map(ApiReply::ValveUpdated),
            ApiCall::OverrideValve(o) => {
                client.override_valve(&o).await.map(ApiReply::ValveUpdated)
            }
        };

        if let Err(ref e) = result {
            tracing::warn!(kind = %ticket.kind, "Farm API call failed: {}", e);
        }

        // The receiver is gone once the app has shut down
        let _ = events.send(ApiEvent { ticket, result });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_request_at_a_time() {
        let mut tracker = RequestTracker::new();
        let first = tracker.begin(RequestKind::Prediction, 1).unwrap();
        assert!(tracker.is_busy());
        assert!(tracker.begin(RequestKind::ValveList, 1).is_none());

        assert!(tracker.complete(first.id, Some(1)));
        assert!(!tracker.is_busy());
        assert!(tracker.begin(RequestKind::ValveList, 1).is_some());
    }

    #[test]
    fn ticket_ids_increase() {
        let mut tracker = RequestTracker::new();
        let a = tracker.begin(RequestKind::Prediction, 1).unwrap();
        tracker.cancel();
        let b = tracker.begin(RequestKind::Prediction, 1).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn response_after_detach_is_stale() {
        let mut tracker = RequestTracker::new();
        let ticket = tracker.begin(RequestKind::Prediction, 4).unwrap();
        assert!(!tracker.complete(ticket.id, None));
        assert!(!tracker.is_busy());
    }

    #[test]
    fn response_for_another_crop_is_stale() {
        let mut tracker = RequestTracker::new();
        let ticket = tracker.begin(RequestKind::Prediction, 4).unwrap();
        assert!(!tracker.complete(ticket.id, Some(5)));
    }

    #[test]
    fn response_after_cancel_is_ignored() {
        let mut tracker = RequestTracker::new();
        let old = tracker.begin(RequestKind::Prediction, 4).unwrap();
        tracker.cancel();
        let current = tracker.begin(RequestKind::ValveList, 4).unwrap();

        assert!(!tracker.complete(old.id, Some(4)));
        // The newer request is still outstanding
        assert_eq!(tracker.outstanding(), Some(&current));
        assert!(tracker.complete(current.id, Some(4)));
    }

    #[test]
    fn call_kinds() {
        assert_eq!(ApiCall::ListValves.kind(), RequestKind::ValveList);
        let req = PredictionRequest {
            soil_moisture: 1.0,
            temperature: 1.0,
            humidity: 1.0,
            rain_forecast: false,
        };
        assert_eq!(ApiCall::Predict(req).kind(), RequestKind::Prediction);
    }
}
