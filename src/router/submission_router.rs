use axum::{extract::{Request, State}, routing::{post, MethodRouter}, Router};
use crate::handler::submission_handler::{submit_handler, SubmissionState};
use crate::model::FormKind;

fn form_route(kind: FormKind) -> MethodRouter<SubmissionState> {
    post(move |state: State<SubmissionState>, request: Request| submit_handler(kind, state, request))
}

/// Form endpoints, mounted at the root and again under `/api`.
pub fn submission_router(service: SubmissionState) -> Router {
    let forms: Router = Router::new()
        .route("/contact", form_route(FormKind::Contact))
        .route("/writer", form_route(FormKind::WriterApplication))
        .route("/writer-application", form_route(FormKind::WriterApplication))
        .route("/request", form_route(FormKind::GenericRequest))
        .route("/order", form_route(FormKind::GenericRequest))
        .route("/generic-request", form_route(FormKind::GenericRequest))
        .with_state(service);

    Router::new()
        .merge(forms.clone())
        .nest("/api", forms)
}
