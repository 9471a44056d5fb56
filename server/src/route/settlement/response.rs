use serde::Serialize;

use application::transfer::{ReconciliationReportDto, SettlementReportDto};

use crate::controller::Exhaust;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResponse {
    success: bool,
    processed_count: usize,
}

pub struct SettlementPresenter;

impl Exhaust<SettlementReportDto> for SettlementPresenter {
    type To = SettlementResponse;
    fn emit(&self, input: SettlementReportDto) -> Self::To {
        SettlementResponse {
            success: true,
            processed_count: input.processed_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    success: bool,
    examined: usize,
    completed: usize,
    failed: usize,
}

pub struct ReconcilePresenter;

impl Exhaust<ReconciliationReportDto> for ReconcilePresenter {
    type To = ReconcileResponse;
    fn emit(&self, input: ReconciliationReportDto) -> Self::To {
        ReconcileResponse {
            success: true,
            examined: input.examined,
            completed: input.completed,
            failed: input.failed,
        }
    }
}
