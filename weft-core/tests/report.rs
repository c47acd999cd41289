//! Integration tests for the render-reporting channel.
//!
//! Reporting here is enabled per definition via `ObserveOptions`, so
//! these tests never touch the process-wide flag.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use weft_core::report::{self, ReportEvent};
use weft_core::{observe, observe_with, Component, ComponentDef, Node, ObserveOptions, Value};

fn reported_def(name: &str) -> ComponentDef {
    ComponentDef::new(name, |c: &Component| {
        Ok(Node::text(c.props().get("count").to_string()).shared())
    })
}

fn reporting_options() -> ObserveOptions {
    ObserveOptions {
        static_rendering: None,
        render_reporting: Some(true),
    }
}

#[test]
fn render_and_destroy_events_flow() {
    let events: Arc<Mutex<Vec<ReportEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    let _sub = report::render_reporter().subscribe(move |event| {
        events_clone.lock().push(event.clone());
    });

    let def = observe_with(&reported_def("Reported"), reporting_options()).unwrap();
    let component = def
        .mount(Value::from(json!({"count": 1})), Value::Null)
        .unwrap();
    let id = component.id();

    component
        .set_props(Value::from(json!({"count": 2})))
        .unwrap();
    component.unmount();

    let events = events.lock();
    let mine: Vec<&ReportEvent> = events
        .iter()
        .filter(|event| match event {
            ReportEvent::Render { component, .. } => *component == id,
            ReportEvent::Destroy { component, .. } => *component == id,
        })
        .collect();

    assert_eq!(mine.len(), 3, "mount render, update render, destroy");
    match mine[0] {
        ReportEvent::Render {
            name,
            render_duration,
            total_duration,
            node,
            ..
        } => {
            assert_eq!(name, "Reported");
            assert!(total_duration >= render_duration);
            assert_eq!(node.as_ref().unwrap().text_content(), "1");
        }
        other => panic!("expected a render event, got {other:?}"),
    }
    match mine[1] {
        ReportEvent::Render { node, .. } => {
            assert_eq!(node.as_ref().unwrap().text_content(), "2");
        }
        other => panic!("expected a render event, got {other:?}"),
    }
    match mine[2] {
        ReportEvent::Destroy { name, node, .. } => {
            assert_eq!(name, "Reported");
            assert_eq!(node.as_ref().unwrap().text_content(), "2");
        }
        other => panic!("expected a destroy event, got {other:?}"),
    }
}

#[test]
fn node_registry_maps_output_to_component_until_unmount() {
    let def = observe_with(&reported_def("Registered"), reporting_options()).unwrap();
    let component = def
        .mount(Value::from(json!({"count": 1})), Value::Null)
        .unwrap();

    let output = component.output().unwrap();
    assert_eq!(report::component_for_node(&output), Some(component.id()));

    component.unmount();
    assert_eq!(report::component_for_node(&output), None);
}

#[test]
fn reporting_disabled_emits_nothing() {
    let def_name = "Silent";
    let hits = Arc::new(AtomicI32::new(0));
    let hits_clone = hits.clone();
    let _sub = report::render_reporter().subscribe(move |event| {
        let name = match event {
            ReportEvent::Render { name, .. } => name,
            ReportEvent::Destroy { name, .. } => name,
        };
        if name == def_name {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        }
    });

    let def = observe(&reported_def(def_name)).unwrap();
    let component = def
        .mount(Value::from(json!({"count": 1})), Value::Null)
        .unwrap();
    component.unmount();

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn dropped_subscription_stops_delivery() {
    let hits = Arc::new(AtomicI32::new(0));
    let hits_clone = hits.clone();
    let sub = report::render_reporter().subscribe(move |event| {
        let name = match event {
            ReportEvent::Render { name, .. } => name,
            ReportEvent::Destroy { name, .. } => name,
        };
        if name == "Short" {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        }
    });

    let def = observe_with(&reported_def("Short"), reporting_options()).unwrap();
    let component = def
        .mount(Value::from(json!({"count": 1})), Value::Null)
        .unwrap();
    let seen = hits.load(Ordering::SeqCst);
    assert!(seen >= 1);

    drop(sub);
    component.unmount();
    assert_eq!(hits.load(Ordering::SeqCst), seen);
}

/// A panicking report subscriber never disturbs rendering.
#[test]
fn report_failures_do_not_affect_rendering() {
    let _bad = report::render_reporter().subscribe(|_| panic!("broken subscriber"));

    let def = observe_with(&reported_def("Sturdy"), reporting_options()).unwrap();
    let component = def
        .mount(Value::from(json!({"count": 1})), Value::Null)
        .unwrap();
    component
        .set_props(Value::from(json!({"count": 2})))
        .unwrap();

    assert_eq!(component.output().unwrap().text_content(), "2");
    component.unmount();
}
