#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use editable_grid::{
    ApiResponse, DataGrid, Editable, Event, EventKind, RequestError, RequestTarget, RowData,
    RowToken, Transport,
};
use futures::future::BoxFuture;
use serde_json::Value;

/// In-memory stand-in for the host grid component: ordered rows behind
/// tokens, new rows inserted at the top, draw calls counted.
#[derive(Default)]
pub struct MemoryGrid {
    rows: Vec<(RowToken, RowData)>,
    next: u64,
    pub draws: usize,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(rows: Vec<RowData>) -> Self {
        let mut grid = Self::new();
        for data in rows {
            let token = grid.next_token();
            grid.rows.push((token, data));
        }
        grid
    }

    pub fn tokens(&self) -> Vec<RowToken> {
        self.rows.iter().map(|(token, _)| *token).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row: RowToken) -> Option<&RowData> {
        self.rows
            .iter()
            .find(|(token, _)| *token == row)
            .map(|(_, data)| data)
    }

    fn next_token(&mut self) -> RowToken {
        self.next += 1;
        RowToken(self.next)
    }
}

impl DataGrid for MemoryGrid {
    fn data(&self, row: RowToken) -> Option<RowData> {
        self.get(row).cloned()
    }

    fn set_data(&mut self, row: RowToken, data: RowData) {
        if let Some(slot) = self
            .rows
            .iter_mut()
            .find(|(token, _)| *token == row)
            .map(|(_, data)| data)
        {
            *slot = data;
        }
    }

    fn id(&self, _row: RowToken) -> Option<Value> {
        None
    }

    fn index(&self, row: RowToken) -> Option<usize> {
        self.rows.iter().position(|(token, _)| *token == row)
    }

    fn add(&mut self, data: RowData) -> RowToken {
        let token = self.next_token();
        self.rows.insert(0, (token, data));
        token
    }

    fn remove(&mut self, row: RowToken) {
        self.rows.retain(|(token, _)| *token != row);
    }

    fn draw(&mut self, _redraw_paging: bool) {
        self.draws += 1;
    }
}

/// One request as the fake backend recorded it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub url: String,
    pub body: RowData,
}

#[derive(Default)]
struct FakeInner {
    script: Mutex<VecDeque<Result<ApiResponse, RequestError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Scripted in-memory backend. Responses are consumed in push order; a
/// call past the end of the script fails as an unknown error.
#[derive(Clone, Default)]
pub struct FakeTransport {
    inner: Arc<FakeInner>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, data: Value) {
        self.inner.script.lock().unwrap().push_back(Ok(ApiResponse {
            url: "http://api.test".to_string(),
            status: 200,
            status_text: "OK".to_string(),
            data,
        }));
    }

    pub fn push_status(&self, status: u16) {
        let status_text = match status {
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "",
        };
        self.inner
            .script
            .lock()
            .unwrap()
            .push_back(Err(RequestError::Status {
                status,
                status_text: status_text.to_string(),
                url: "http://api.test".to_string(),
            }));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn dispatch<'a>(
        &'a self,
        target: &'a RequestTarget,
        body: &'a RowData,
    ) -> BoxFuture<'a, Result<ApiResponse, RequestError>> {
        self.inner.calls.lock().unwrap().push(RecordedCall {
            method: target.method.to_string(),
            url: target.url.clone(),
            body: body.clone(),
        });
        let next = self.inner.script.lock().unwrap().pop_front();
        Box::pin(async move {
            next.unwrap_or_else(|| {
                Err(RequestError::Unknown {
                    message: "no scripted response".to_string(),
                })
            })
        })
    }
}

/// Records every emitted event so tests can assert on order and counts.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach<G: DataGrid>(&self, engine: &Editable<G>) {
        let events = Arc::clone(&self.events);
        engine.on_any(move |event| {
            events.lock().unwrap().push(event.clone());
        });
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(Event::kind).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}
