//! In-memory resource service for pipeline tests
//!
//! [`FakeService`] serves scripted listing pages and tag sets, fails the
//! identifiers it is told to fail, and records every call it receives so
//! tests can assert on ordering. Resources are reported gone on the first
//! describe unless configured otherwise.

use crate::nuke::{ListedResource, Page, ResourceService, ServiceError};
use chrono::{DateTime, TimeZone, Utc};
use snapsweep_common::{Provenance, ResourceKind};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

/// A manual snapshot created 2023-01-01, tag handle `arn:{id}`
pub fn listed(identifier: &str) -> ListedResource {
    listed_at(identifier, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
}

pub fn listed_at(identifier: &str, created_at: DateTime<Utc>) -> ListedResource {
    ListedResource {
        identifier: identifier.to_string(),
        tag_handle: format!("arn:{identifier}"),
        created_at: Some(created_at),
        provenance: Provenance::Manual,
    }
}

/// In-memory log sink for a test subscriber
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Await `fut` with a plain-text subscriber installed on this thread and
/// return its output alongside the result
pub async fn capture_logs<T>(fut: impl Future<Output = T>) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let output = {
        let _guard = tracing::subscriber::set_default(subscriber);
        fut.await
    };
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (output, logs)
}

#[derive(Debug, Clone)]
enum Call {
    List(Option<String>),
    Tags(String),
    Delete(String),
    Describe(String),
}

#[derive(Debug)]
pub struct FakeService {
    kind: ResourceKind,
    pages: Vec<Result<Vec<ListedResource>, ServiceError>>,
    tags: HashMap<String, Result<HashMap<String, String>, ServiceError>>,
    delete_errors: HashMap<String, ServiceError>,
    describe_errors: HashMap<String, ServiceError>,
    always_present: HashSet<String>,
    calls: RefCell<Vec<Call>>,
}

impl Default for FakeService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            kind: ResourceKind::RdsSnapshot,
            pages: Vec::new(),
            tags: HashMap::new(),
            delete_errors: HashMap::new(),
            describe_errors: HashMap::new(),
            always_present: HashSet::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Append a listing page
    pub fn with_page(mut self, items: Vec<ListedResource>) -> Self {
        self.pages.push(Ok(items));
        self
    }

    /// Make the page at `index` fail, padding with empty pages if needed
    pub fn with_page_error(mut self, index: usize, error: ServiceError) -> Self {
        while self.pages.len() <= index {
            self.pages.push(Ok(Vec::new()));
        }
        self.pages[index] = Err(error);
        self
    }

    pub fn with_tags(mut self, handle: &str, tags: &[(&str, &str)]) -> Self {
        let tags = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.tags.insert(handle.to_string(), Ok(tags));
        self
    }

    pub fn with_tag_error(mut self, handle: &str, error: ServiceError) -> Self {
        self.tags.insert(handle.to_string(), Err(error));
        self
    }

    pub fn with_delete_error(mut self, identifier: &str, error: ServiceError) -> Self {
        self.delete_errors.insert(identifier.to_string(), error);
        self
    }

    /// Every describe of `identifier` fails with `error`
    pub fn with_describe_error(mut self, identifier: &str, error: ServiceError) -> Self {
        self.describe_errors.insert(identifier.to_string(), error);
        self
    }

    /// `identifier` never disappears after deletion
    pub fn with_always_present(mut self, identifier: &str) -> Self {
        self.always_present.insert(identifier.to_string());
        self
    }

    /// Tokens passed to `list_page`, in call order
    pub fn list_tokens(&self) -> Vec<Option<String>> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::List(token) => Some(token.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn tag_calls(&self) -> Vec<String> {
        self.collect_calls(|call| match call {
            Call::Tags(handle) => Some(handle.clone()),
            _ => None,
        })
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.collect_calls(|call| match call {
            Call::Delete(id) => Some(id.clone()),
            _ => None,
        })
    }

    pub fn describe_calls(&self) -> Vec<String> {
        self.collect_calls(|call| match call {
            Call::Describe(id) => Some(id.clone()),
            _ => None,
        })
    }

    /// Delete and describe calls interleaved, as `delete:{id}` / `describe:{id}`
    pub fn deletion_calls(&self) -> Vec<String> {
        self.collect_calls(|call| match call {
            Call::Delete(id) => Some(format!("delete:{id}")),
            Call::Describe(id) => Some(format!("describe:{id}")),
            _ => None,
        })
    }

    fn collect_calls(&self, f: impl Fn(&Call) -> Option<String>) -> Vec<String> {
        self.calls.borrow().iter().filter_map(f).collect()
    }

    fn page_index(token: Option<&str>) -> usize {
        token
            .and_then(|t| t.strip_prefix("page-"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}

impl ResourceService for FakeService {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn list_page(&self, token: Option<String>) -> Result<Page, ServiceError> {
        let index = Self::page_index(token.as_deref());
        self.calls.borrow_mut().push(Call::List(token));

        let Some(page) = self.pages.get(index) else {
            return Ok(Page::default());
        };
        let items = page.clone()?;
        let next_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(Page { items, next_token })
    }

    async fn get_tags(&self, tag_handle: &str) -> Result<HashMap<String, String>, ServiceError> {
        self.calls
            .borrow_mut()
            .push(Call::Tags(tag_handle.to_string()));
        self.tags
            .get(tag_handle)
            .cloned()
            .unwrap_or_else(|| Ok(HashMap::new()))
    }

    async fn delete(&self, identifier: &str) -> Result<(), ServiceError> {
        self.calls
            .borrow_mut()
            .push(Call::Delete(identifier.to_string()));
        match self.delete_errors.get(identifier) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn describe(&self, identifier: &str) -> Result<(), ServiceError> {
        self.calls
            .borrow_mut()
            .push(Call::Describe(identifier.to_string()));
        if let Some(error) = self.describe_errors.get(identifier) {
            return Err(error.clone());
        }
        if self.always_present.contains(identifier) {
            return Ok(());
        }
        Err(ServiceError::NotFound {
            identifier: identifier.to_string(),
        })
    }
}
