mod request;
mod response;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::settlement::request::{SettlementRequest, SettlementTransformer};
use crate::route::settlement::response::{ReconcilePresenter, SettlementPresenter};
use application::service::{ProcessSettlementService, ReconcileSettlementService};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

pub trait SettlementRouter {
    fn route_settlement(self) -> Self;
}

impl SettlementRouter for Router<AppModule> {
    fn route_settlement(self) -> Self {
        self.route(
            "/settlements",
            post(
                |State(handler): State<AppModule>,
                 Json(req): Json<SettlementRequest>| async move {
                    Controller::new(SettlementTransformer, SettlementPresenter)
                        .intake(req)
                        .handle(|dto| handler.process_settlement(dto))
                        .await
                        .map(Json)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/settlements/reconcile",
            post(|State(handler): State<AppModule>| async move {
                Controller::new((), ReconcilePresenter)
                    .bypass(|| handler.reconcile_settlements())
                    .await
                    .map(Json)
                    .map_err(ErrorStatus::from)
            }),
        )
    }
}
