// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DispatchError, DomainEvent, EventDispatcher, EventHandler, EventSink, HandlerError,
    LoggingEventHandler, VisitScheduled,
};
use fieldvisit_domain::{
    CustomerId, DeviceId, EngineerId, TicketNumber, VisitId, VisitOrigin,
};
use std::sync::{Arc, Mutex};
use time::macros::{date, datetime};

fn event(suffix: u16) -> DomainEvent {
    DomainEvent::VisitScheduled(VisitScheduled {
        visit_id: VisitId::generate(),
        ticket_number: TicketNumber::compose("MV", date!(2026 - 06 - 01), suffix).unwrap(),
        customer_id: CustomerId::new(1),
        device_id: DeviceId::new(100),
        scheduled_for: datetime!(2026-06-01 09:00 UTC),
        origin: VisitOrigin::Sales,
        engineer_ids: vec![EngineerId::new(1)],
    })
}

#[derive(Clone, Default)]
struct Collector {
    seen: Arc<Mutex<Vec<DomainEvent>>>,
    fail_first: bool,
}

impl EventHandler for Collector {
    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let mut seen = self.seen.lock().unwrap();
        seen.push(event.clone());
        if self.fail_first && seen.len() == 1 {
            return Err("first delivery fails".into());
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_events_are_delivered_in_order() {
    let collector = Collector::default();
    let (dispatcher, worker) = EventDispatcher::spawn(collector.clone(), 8);
    let sent: Vec<DomainEvent> = (1..=3).map(event).collect();

    for e in &sent {
        dispatcher.dispatch(e.clone()).unwrap();
    }
    drop(dispatcher);
    worker.await.unwrap();

    assert_eq!(*collector.seen.lock().unwrap(), sent);
}

#[tokio::test]
async fn test_full_queue_is_reported_without_blocking() {
    let collector = Collector::default();
    let (dispatcher, worker) = EventDispatcher::spawn(collector.clone(), 1);

    dispatcher.dispatch(event(1)).unwrap();
    assert_eq!(dispatcher.dispatch(event(2)), Err(DispatchError::QueueFull));

    drop(dispatcher);
    worker.await.unwrap();
    assert_eq!(collector.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_closed_queue_is_reported() {
    let (dispatcher, worker) = EventDispatcher::spawn(Collector::default(), 4);
    worker.abort();
    let _ = worker.await;

    assert_eq!(dispatcher.dispatch(event(1)), Err(DispatchError::Closed));
}

#[tokio::test]
async fn test_handler_failure_does_not_stop_delivery() {
    let collector = Collector {
        fail_first: true,
        ..Collector::default()
    };
    let (dispatcher, worker) = EventDispatcher::spawn(collector.clone(), 4);

    dispatcher.dispatch(event(1)).unwrap();
    dispatcher.dispatch(event(2)).unwrap();
    drop(dispatcher);
    worker.await.unwrap();

    assert_eq!(collector.seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_logging_handler_accepts_events() {
    let (dispatcher, worker) = EventDispatcher::spawn(LoggingEventHandler, 4);
    dispatcher.dispatch(event(1)).unwrap();
    drop(dispatcher);
    worker.await.unwrap();
}

#[test]
fn test_event_serializes_with_type_tag() {
    let json: serde_json::Value = serde_json::to_value(event(5)).unwrap();

    assert_eq!(json["type"], "visit_scheduled");
    assert_eq!(json["ticket_number"], "MV-20260601-0005");
    assert_eq!(json["origin"], "sales");
}
