mod request;
mod response;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::withdrawal::request::{WithdrawalRequest, WithdrawalTransformer};
use crate::route::withdrawal::response::WithdrawalPresenter;
use application::service::AutoWithdrawalService;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

pub trait WithdrawalRouter {
    fn route_withdrawal(self) -> Self;
}

impl WithdrawalRouter for Router<AppModule> {
    fn route_withdrawal(self) -> Self {
        self.route(
            "/withdrawals",
            post(
                |State(handler): State<AppModule>,
                 Json(req): Json<WithdrawalRequest>| async move {
                    Controller::new(WithdrawalTransformer, WithdrawalPresenter)
                        .intake(req)
                        .handle(|dto| handler.execute_withdrawal(dto))
                        .await
                        .map(Json)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
