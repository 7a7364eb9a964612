use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EmployeeId, OrderId, OrderStatus};
use super::repository::{CompanyDirectory, EmployeeDirectory, OrderStore, ProductCatalog};
use super::service::{OrderService, OrderServiceError, OrderSubmission};
use super::BulkOrderBatch;

/// Router builder exposing the ordering endpoints.
pub fn order_router<E, P, O, C>(service: Arc<OrderService<E, P, O, C>>) -> Router
where
    E: EmployeeDirectory + 'static,
    P: ProductCatalog + 'static,
    O: OrderStore + 'static,
    C: CompanyDirectory + 'static,
{
    Router::new()
        .route("/api/v1/orders", post(submit_order_handler::<E, P, O, C>))
        .route("/api/v1/orders/bulk", post(bulk_order_handler::<E, P, O, C>))
        .route(
            "/api/v1/orders/:order_id/actions",
            post(order_action_handler::<E, P, O, C>),
        )
        .route(
            "/api/v1/employees/:employee_id/eligibility",
            get(eligibility_handler::<E, P, O, C>),
        )
        .with_state(service)
}

/// Role-gated actions a caller can apply to an existing order.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OrderAction {
    #[serde(rename_all = "camelCase")]
    Approve { admin_email: String },
    UpdateStatus { status: OrderStatus },
}

pub(crate) async fn submit_order_handler<E, P, O, C>(
    State(service): State<Arc<OrderService<E, P, O, C>>>,
    axum::Json(submission): axum::Json<OrderSubmission>,
) -> Response
where
    E: EmployeeDirectory + 'static,
    P: ProductCatalog + 'static,
    O: OrderStore + 'static,
    C: CompanyDirectory + 'static,
{
    match service.submit_order(submission) {
        Ok(order) => (StatusCode::CREATED, axum::Json(order)).into_response(),
        Err(error @ (OrderServiceError::Item(_) | OrderServiceError::EmployeeNotFound(_))) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

/// Bulk submission never fails partially at the HTTP level: a structurally
/// valid batch always yields 200 with one outcome per row.
pub(crate) async fn bulk_order_handler<E, P, O, C>(
    State(service): State<Arc<OrderService<E, P, O, C>>>,
    axum::Json(batch): axum::Json<BulkOrderBatch>,
) -> Response
where
    E: EmployeeDirectory + 'static,
    P: ProductCatalog + 'static,
    O: OrderStore + 'static,
    C: CompanyDirectory + 'static,
{
    let outcome = service.process_batch(batch);
    let payload = json!({
        "success": true,
        "results": outcome.results,
        "summary": outcome.summary,
    });

    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn order_action_handler<E, P, O, C>(
    State(service): State<Arc<OrderService<E, P, O, C>>>,
    Path(order_id): Path<String>,
    axum::Json(action): axum::Json<OrderAction>,
) -> Response
where
    E: EmployeeDirectory + 'static,
    P: ProductCatalog + 'static,
    O: OrderStore + 'static,
    C: CompanyDirectory + 'static,
{
    let id = OrderId(order_id);
    let result = match action {
        OrderAction::Approve { admin_email } => service.approve(&id, &admin_email),
        OrderAction::UpdateStatus { status } => service.update_status(&id, status),
    };

    match result {
        Ok(order) => (StatusCode::OK, axum::Json(order)).into_response(),
        Err(error @ OrderServiceError::OrderNotFound(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error @ OrderServiceError::ApprovalDenied { .. }) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
        }
        Err(error @ OrderServiceError::Transition(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn eligibility_handler<E, P, O, C>(
    State(service): State<Arc<OrderService<E, P, O, C>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    E: EmployeeDirectory + 'static,
    P: ProductCatalog + 'static,
    O: OrderStore + 'static,
    C: CompanyDirectory + 'static,
{
    match service.consumed_eligibility(&EmployeeId(employee_id)) {
        Ok(consumed) => (StatusCode::OK, axum::Json(consumed)).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
