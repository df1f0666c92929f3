// SSE relay for diagnostic command sessions

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::wrappers::ReceiverStream;

use crate::commands::{self, StreamEvent};

#[derive(Deserialize)]
pub(super) struct RunQuery {
    target: Option<String>,
    args: Option<String>,
}

/// GET /run/{command}?target=&args= — validate against the allow-list,
/// spawn, and relay output line-by-line as server-sent events. The final
/// event is the sentinel `[exit {code}]`. Validation failures are 400s
/// raised before any process is spawned; dropping the response stream
/// (client disconnect) terminates the subprocess.
pub(super) async fn run_handler(
    Path(command): Path<String>,
    Query(query): Query<RunQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)> {
    let (program, args) =
        commands::build_argv(&command, query.target.as_deref(), query.args.as_deref())
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    tracing::info!(program, ?args, "starting diagnostic stream");

    let session = commands::stream_command(program, &args);
    let events = ReceiverStream::new(session.events).map(|event| {
        let data = match event {
            StreamEvent::Line(line) => line,
            StreamEvent::Exit(code) => format!("[exit {}]", code),
        };
        Ok::<_, Infallible>(Event::default().data(data))
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
