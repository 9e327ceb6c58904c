//! Shared collaborators for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use sonos_device::{
    Action, ActionDispatcher, ActionResponse, Description, DescriptionFetcher, Device,
    DeviceError, DeviceEvent, DeviceSeed, ParamValue, Result,
};
use tokio::sync::broadcast;

pub const ADDRESS: &str = "10.0.0.5";
pub const LOCATION: &str = "http://10.0.0.5/desc.xml";

/// One dispatched action as seen by [`RecordingDispatcher`]
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub address: String,
    pub action: String,
    pub params: Vec<(String, ParamValue)>,
}

impl Dispatched {
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|(n, _)| n.as_str()).collect()
    }
}

/// Dispatcher that records every call and answers from a fixed response
pub struct RecordingDispatcher {
    calls: Mutex<Vec<Dispatched>>,
    response: Mutex<Result<ActionResponse>>,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Self::responding(Ok(ActionResponse::new()))
    }

    pub fn responding(response: Result<ActionResponse>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            response: Mutex::new(response),
        })
    }

    pub fn calls(&self) -> Vec<Dispatched> {
        self.calls.lock().clone()
    }

    pub fn last(&self) -> Option<Dispatched> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl ActionDispatcher for RecordingDispatcher {
    async fn dispatch(&self, address: &str, action: Action) -> Result<ActionResponse> {
        self.calls.lock().push(Dispatched {
            address: address.to_string(),
            action: action.name.to_string(),
            params: action
                .params
                .iter()
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect(),
        });
        self.response.lock().clone()
    }
}

/// Fetcher answering with scripted results in order; the last one repeats
pub struct ScriptedFetcher {
    results: Mutex<VecDeque<Result<Description>>>,
    locations: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedFetcher {
    pub fn new(results: Vec<Result<Description>>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into()),
            locations: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    pub fn succeeding(device: Value) -> Arc<Self> {
        Self::new(vec![Ok(description(device))])
    }

    pub fn failing(error: DeviceError) -> Arc<Self> {
        Self::new(vec![Err(error)])
    }

    /// Answer after `delay`, holding the device in `Initializing`
    pub fn delayed(device: Value, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(vec![Ok(description(device))].into()),
            locations: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    pub fn locations(&self) -> Vec<String> {
        self.locations.lock().clone()
    }
}

#[async_trait]
impl DescriptionFetcher for ScriptedFetcher {
    async fn fetch(&self, location: &str) -> Result<Description> {
        self.locations.lock().push(location.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut results = self.results.lock();
        if results.len() > 1 {
            results
                .pop_front()
                .unwrap_or_else(|| Err(DeviceError::NetworkError("no scripted result".to_string())))
        } else {
            results
                .front()
                .cloned()
                .unwrap_or_else(|| Err(DeviceError::NetworkError("no scripted result".to_string())))
        }
    }
}

pub fn description(device: Value) -> Description {
    match device {
        Value::Object(map) => Description::new(map),
        other => panic!("description must be an object, got {}", other),
    }
}

pub fn seed() -> DeviceSeed {
    DeviceSeed::new(ADDRESS, LOCATION)
}

pub fn device(dispatcher: Arc<RecordingDispatcher>, fetcher: Arc<ScriptedFetcher>) -> Device {
    Device::new(seed(), dispatcher, fetcher)
}

/// Wait for the next event, failing the test after five (virtual) seconds
pub async fn next_event(events: &mut broadcast::Receiver<DeviceEvent>) -> DeviceEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for device event")
        .expect("event channel closed")
}

/// Drain everything currently queued without waiting
pub fn drain(events: &mut broadcast::Receiver<DeviceEvent>) -> Vec<DeviceEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

/// Load a description document from `tests/fixtures`
pub fn fixture(filename: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(filename);

    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", filename, e))
}
