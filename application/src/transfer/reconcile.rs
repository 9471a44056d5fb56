pub struct ReconciliationReportDto {
    pub examined: usize,
    pub completed: usize,
    pub failed: usize,
}
