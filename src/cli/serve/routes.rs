//! Request routing for the preview server.
//!
//! | route                     | reply                                       |
//! |---------------------------|---------------------------------------------|
//! | `GET /`                   | host page                                   |
//! | `GET /preview/{cycle}`    | document of the current cycle, 410 for any other |
//! | `POST /__prevue/refresh`  | start a new cycle, `{cycle, address}`       |
//! | `POST /__prevue/outcome`  | accept `{cycle, outcome}`, 409 when stale   |
//! | `GET /__prevue/state`     | `{cycle, address, outcome}`                 |

use serde::{Deserialize, Serialize};
use tiny_http::Method;

use super::response::Reply;
use super::{ServeState, get_actual_ws_port};
use crate::embed::serve::{SHELL_HTML, ShellVars};
use crate::preview::{ExecutionOutcome, RenderCycle};
use crate::utils::html;

/// Upper bound for a reported outcome body.
pub const MAX_REPORT_BYTES: usize = 64 * 1024;

/// The parts of a request routing looks at.
pub struct Incoming<'a> {
    pub method: Method,
    pub url: &'a str,
    pub content_type: Option<&'a str>,
    pub origin: Option<&'a str>,
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
struct CycleInfo {
    cycle: RenderCycle,
    address: String,
}

#[derive(Debug, Serialize)]
struct StateInfo {
    cycle: RenderCycle,
    address: String,
    outcome: Option<ExecutionOutcome>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShellState {
    cycle: RenderCycle,
    ws_port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct OutcomeReport {
    cycle: RenderCycle,
    outcome: ExecutionOutcome,
}

pub fn route(state: &ServeState, req: &Incoming<'_>) -> Reply {
    let path = req.url.split(['?', '#']).next().unwrap_or_default();
    let read = matches!(req.method, Method::Get | Method::Head);

    match path {
        "/" | "/index.html" if read => shell(state),
        "/__prevue/state" if read => current_state(state),
        "/__prevue/refresh" if req.method == Method::Post => refresh(state),
        "/__prevue/outcome" if req.method == Method::Post => outcome(state, req),
        "/" | "/index.html" | "/__prevue/state" | "/__prevue/refresh" | "/__prevue/outcome" => {
            Reply::method_not_allowed()
        }
        _ => match path.strip_prefix("/preview/") {
            Some(cycle) if read => preview(state, cycle),
            Some(_) => Reply::method_not_allowed(),
            None => Reply::not_found(),
        },
    }
}

fn shell(state: &ServeState) -> Reply {
    let selection = state.session.selection();
    let shell_state = ShellState {
        cycle: state.session.current(),
        ws_port: get_actual_ws_port(),
    };
    let Ok(state_json) = html::json_for_script(&shell_state) else {
        return Reply::plain(500, "500 Internal Server Error");
    };
    let address = html::escape(&selection.address);
    Reply::html(SHELL_HTML.render(&ShellVars {
        address: &address,
        state_json: &state_json,
    }))
    .without_cache()
}

/// Serve the document of the current cycle only; a frame that asks for an
/// older cycle belongs to a discarded boundary.
fn preview(state: &ServeState, cycle: &str) -> Reply {
    let Ok(requested) = cycle.parse::<u64>() else {
        return Reply::not_found();
    };
    let current = state.session.current();
    if requested != current.get() {
        crate::debug!("serve"; "cycle {} requested, current is {}", requested, current);
        return Reply::gone();
    }

    state.board.begin(current);
    let document = state.session.document(current);
    if document.is_placeholder() {
        let _ = state.board.publish(current, ExecutionOutcome::Empty);
    }
    Reply::html(document.html()).without_cache()
}

fn refresh(state: &ServeState) -> Reply {
    let cycle = state.session.refresh();
    state.board.begin(cycle);
    Reply::json(&CycleInfo {
        cycle,
        address: state.session.selection().address,
    })
}

fn current_state(state: &ServeState) -> Reply {
    let cycle = state.session.current();
    let board = state.board.latest();
    Reply::json(&StateInfo {
        cycle,
        address: state.session.selection().address,
        outcome: board.outcome.filter(|_| board.cycle == cycle),
    })
}

/// Accept a report relayed by the host page.
///
/// Sandboxed frames have an opaque origin and send `Origin: null`; they
/// can reach the server directly, so their requests are refused here and
/// only the host page's relay is accepted.
fn outcome(state: &ServeState, req: &Incoming<'_>) -> Reply {
    if req.origin == Some("null") {
        return Reply::plain(403, "403 Forbidden");
    }
    let is_json = req
        .content_type
        .is_some_and(|ct| ct.split(';').next().is_some_and(|m| m.trim() == "application/json"));
    if !is_json {
        return Reply::plain(415, "415 Unsupported Media Type");
    }
    let report: OutcomeReport = match serde_json::from_str(req.body) {
        Ok(report) => report,
        Err(e) => return Reply::plain(400, &format!("400 Bad Request: {e}")),
    };

    state.board.begin(state.session.current());
    match state.board.publish(report.cycle, report.outcome) {
        Ok(()) => Reply::no_content(),
        Err(rejected) => {
            crate::debug!("serve"; "outcome rejected: {}", rejected);
            Reply::plain(409, &rejected.to_string())
        }
    }
}
