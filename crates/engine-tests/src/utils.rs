use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use futures_util::stream;
use serde_json::{Value as JsonValue, json};
use std::{
    collections::HashMap,
    io,
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, task::JoinHandle};

/// Path the stub serves the list endpoint on.
pub const LIST_PATH: &str = "/api/list";

/// A request as seen by the stub.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// What the stub answers.
#[derive(Debug, Clone)]
pub enum StubReply {
    Json(JsonValue),
    Status(u16, String),
    /// 200 with a body that is not a list page.
    Raw(String),
    /// Break the connection off before the body is delivered.
    Drop,
}

type Responder = dyn Fn(&Recorded, usize) -> StubReply + Send + Sync;

#[derive(Clone)]
struct StubState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responder: Arc<Responder>,
}

/// HTTP server on an ephemeral port answering every path through one
/// responder. Requests are recorded before they are answered.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// `responder` gets the request and its 0-based arrival index.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Recorded, usize) -> StubReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new().fallback(respond).with_state(StubState {
            requests: requests.clone(),
            responder: Arc::new(responder),
        });
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        StubServer {
            addr,
            requests,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn list_url(&self) -> String {
        format!("{}{LIST_PATH}", self.base_url())
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests that reached the list endpoint.
    pub fn list_requests(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == LIST_PATH)
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let request = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    };

    let index = {
        let mut requests = state.requests.lock().unwrap();
        requests.push(request.clone());
        requests.len() - 1
    };

    match (state.responder)(&request, index) {
        StubReply::Json(value) => (StatusCode::OK, Json(value)).into_response(),
        StubReply::Status(status, body) => {
            let status = StatusCode::from_u16(status).unwrap();
            (status, body).into_response()
        }
        StubReply::Raw(body) => {
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        StubReply::Drop => {
            let broken = stream::once(async {
                Err::<Bytes, _>(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection dropped",
                ))
            });
            Response::new(Body::from_stream(broken))
        }
    }
}

/// Serves `pages` behind continuation tokens `p1`, `p2`, ...; the last page
/// carries a null token.
pub fn paged_table(pages: Vec<Vec<JsonValue>>) -> impl Fn(&Recorded, usize) -> StubReply {
    move |request: &Recorded, _: usize| {
        let index = match request.param("token") {
            None => 0,
            Some(token) => match token.strip_prefix('p').and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if n < pages.len() => n,
                _ => return StubReply::Status(400, format!("unknown token {token}")),
            },
        };

        let next = (index + 1 < pages.len()).then(|| format!("p{}", index + 1));
        StubReply::Json(json!({
            "items": pages[index],
            "continuationToken": next,
        }))
    }
}

/// An entity as the table store returns it, system fields included.
pub fn entity(id: i64, name: &str, score: f64) -> JsonValue {
    json!({
        "PartitionKey": "players",
        "RowKey": format!("{id:04}"),
        "Timestamp": "2024-05-01T10:00:00Z",
        "etag": format!("W/\"{id}\""),
        "Id": id,
        "Name": name,
        "Score": score,
    })
}

/// Three pages of two entities; ids 2 and 5 are the only "match" rows.
pub fn six_entities() -> Vec<Vec<JsonValue>> {
    vec![
        vec![entity(1, "alpha", 10.0), entity(2, "match-two", 20.0)],
        vec![entity(3, "gamma", 30.0), entity(4, "delta", 40.0)],
        vec![entity(5, "Match-five", 50.0), entity(6, "zeta", 60.0)],
    ]
}
