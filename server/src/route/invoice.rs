mod request;
mod response;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::invoice::request::{
    GenerateInvoicesRequest, InvoiceTransformer, ListInvoicesRequest,
};
use crate::route::invoice::response::{InvoiceListPresenter, InvoiceRunPresenter};
use application::service::{ComposeInvoiceService, ListInvoiceService};
use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};

pub trait InvoiceRouter {
    fn route_invoice(self) -> Self;
}

impl InvoiceRouter for Router<AppModule> {
    fn route_invoice(self) -> Self {
        self.route(
            "/invoices",
            post(
                |State(handler): State<AppModule>,
                 Json(req): Json<GenerateInvoicesRequest>| async move {
                    Controller::new(InvoiceTransformer, InvoiceRunPresenter)
                        .intake(req)
                        .handle(|dto| handler.generate_invoices(dto))
                        .await
                        .map(Json)
                        .map_err(ErrorStatus::from)
                },
            )
            .get(
                |State(handler): State<AppModule>,
                 Query(req): Query<ListInvoicesRequest>| async move {
                    Controller::new(InvoiceTransformer, InvoiceListPresenter)
                        .intake(req)
                        .handle(|dto| handler.list_invoices(dto))
                        .await
                        .map(Json)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
