use std::sync::{Arc, Mutex};

use super::*;

fn recorder(hub: &EventHub) -> (Arc<Mutex<Vec<AudioEvent>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let sub = hub.subscribe(Box::new(move |ev| sink.lock().unwrap().push(ev)));
    (seen, sub)
}

#[test]
fn sanitize_seconds_collapses_non_finite_and_negative() {
    assert_eq!(sanitize_seconds(f64::NAN), 0.0);
    assert_eq!(sanitize_seconds(f64::INFINITY), 0.0);
    assert_eq!(sanitize_seconds(f64::NEG_INFINITY), 0.0);
    assert_eq!(sanitize_seconds(-2.0), 0.0);
    assert_eq!(sanitize_seconds(12.5), 12.5);
}

#[test]
fn hub_delivers_to_every_listener_in_order() {
    let hub = EventHub::new();
    let (a, _sa) = recorder(&hub);
    let (b, _sb) = recorder(&hub);

    hub.emit(AudioEvent::Play);
    hub.emit(AudioEvent::TimeUpdate(1.5));

    let expected = vec![AudioEvent::Play, AudioEvent::TimeUpdate(1.5)];
    assert_eq!(*a.lock().unwrap(), expected);
    assert_eq!(*b.lock().unwrap(), expected);
}

#[test]
fn dropping_subscription_unregisters_listener() {
    let hub = EventHub::new();
    let (seen, sub) = recorder(&hub);
    let (_other, _keep) = recorder(&hub);
    assert_eq!(hub.listener_count(), 2);

    sub.unsubscribe();
    assert_eq!(hub.listener_count(), 1);

    hub.emit(AudioEvent::Ended);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn subscription_outliving_hub_is_harmless() {
    let hub = EventHub::new();
    let (_seen, sub) = recorder(&hub);
    drop(hub);
    drop(sub);
}
